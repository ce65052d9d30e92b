//! Federate configuration.
//!
//! [`FederateConfig`] is checked by [`FederateConfig::validate`] before a
//! [`Federate`](crate::Federate) is built; a config that fails validation
//! never produces a federate.

use std::error::Error;
use std::fmt;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`FederateConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The federate name is empty or only whitespace.
    EmptyName,
    /// The separator cannot delimit names.
    InvalidSeparator {
        /// The rejected separator.
        separator: char,
    },
    /// The federate name contains the separator, so local keys would be
    /// ambiguous.
    NameContainsSeparator {
        /// The federate name.
        name: String,
        /// The configured separator.
        separator: char,
    },
    /// `endpoint_queue_capacity` is zero.
    QueueCapacityZero,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "federate name must not be empty"),
            Self::InvalidSeparator { separator } => {
                write!(f, "separator {separator:?} must be printable punctuation")
            }
            Self::NameContainsSeparator { name, separator } => {
                write!(f, "federate name '{name}' contains the separator {separator:?}")
            }
            Self::QueueCapacityZero => write!(f, "endpoint_queue_capacity must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

// ── FederateConfig ─────────────────────────────────────────────────

/// Configuration for one [`Federate`](crate::Federate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FederateConfig {
    /// Federate name. Local interface names are prefixed with it.
    pub name: String,
    /// Separator between the federate name and a local interface name.
    /// Default: `'/'`.
    pub separator: char,
    /// Reject sends between endpoints whose declared type tags differ.
    pub strict_type_checking: bool,
    /// Accept connections whose units are not convertible, for every input.
    pub ignore_unit_mismatch: bool,
    /// Maximum queued messages per endpoint; later arrivals are dropped.
    /// Default: 4096.
    pub endpoint_queue_capacity: usize,
}

impl FederateConfig {
    /// A default config with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let sep = self.separator;
        if !sep.is_ascii_punctuation() {
            return Err(ConfigError::InvalidSeparator { separator: sep });
        }
        if self.name.contains(sep) {
            return Err(ConfigError::NameContainsSeparator {
                name: self.name.clone(),
                separator: sep,
            });
        }
        if self.endpoint_queue_capacity == 0 {
            return Err(ConfigError::QueueCapacityZero);
        }
        Ok(())
    }

    /// The key of a local interface name: `"<name><separator><local>"`.
    pub fn local_key(&self, local: &str) -> String {
        format!("{}{}{}", self.name, self.separator, local)
    }
}

impl Default for FederateConfig {
    fn default() -> Self {
        Self {
            name: String::from("federate"),
            separator: '/',
            strict_type_checking: false,
            ignore_unit_mismatch: false,
            endpoint_queue_capacity: 4096,
        }
    }
}
