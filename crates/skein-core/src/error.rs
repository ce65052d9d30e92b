//! Error types for the Skein interface layer.
//!
//! Two levels: [`ConversionError`] for the pure value machinery (conversion
//! matrix, codec, units) and [`InterfaceError`] for every operation on an
//! input, publication, or endpoint. Conversion errors lift into interface
//! errors via `From`, so `?` works across the boundary.

use std::error::Error;
use std::fmt;

use crate::id::InterfaceHandle;
use crate::value::ValueKind;

/// Errors from value conversion, decoding, and unit scaling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionError {
    /// No conversion is defined from `from` to `to`.
    TypeMismatch {
        /// Kind of the stored value.
        from: ValueKind,
        /// Kind that was requested.
        to: ValueKind,
    },
    /// The two unit descriptors are not dimensionally compatible.
    UnitMismatch {
        /// Source units.
        from: String,
        /// Requested units.
        to: String,
    },
    /// A raw payload or a text value could not be decoded as its declared kind.
    MalformedValue {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A unit string could not be parsed.
    UnknownUnit {
        /// The unparseable unit string.
        unit: String,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { from, to } => {
                write!(f, "no conversion from {from} to {to}")
            }
            Self::UnitMismatch { from, to } => {
                write!(f, "units '{from}' and '{to}' are not compatible")
            }
            Self::MalformedValue { detail } => write!(f, "malformed value: {detail}"),
            Self::UnknownUnit { unit } => write!(f, "unknown unit '{unit}'"),
        }
    }
}

impl Error for ConversionError {}

/// Errors from operations on interface objects and their manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterfaceError {
    /// The handle is closed, stale, from another manager, or was never valid.
    InvalidHandle {
        /// The handle that failed to resolve.
        handle: InterfaceHandle,
    },
    /// The requested conversion is not defined for the stored type.
    TypeMismatch {
        /// The type that was available.
        from: String,
        /// The type that was requested or expected.
        to: String,
    },
    /// Incompatible unit dimensions.
    UnitMismatch {
        /// Source units.
        from: String,
        /// Requested units.
        to: String,
    },
    /// A raw payload failed to decode as its declared type.
    MalformedValue {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A send had no explicit destination and the endpoint has no default.
    NoDestination {
        /// Name of the sending endpoint.
        endpoint: String,
    },
    /// Configuration rejected at registration (e.g. aggregation mode vs
    /// source count).
    ConfigurationError {
        /// Description of the rejected configuration.
        reason: String,
    },
    /// The operation is not allowed in the federate's current lifecycle state.
    InvalidState {
        /// Description of the violated state requirement.
        reason: String,
    },
    /// No interface is registered under the given name or index.
    UnknownInterface {
        /// The name (or index) that was looked up.
        name: String,
    },
    /// An interface with this name is already registered.
    DuplicateName {
        /// The duplicated name.
        name: String,
    },
}

impl fmt::Display for InterfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHandle { handle } => write!(f, "invalid interface handle {handle}"),
            Self::TypeMismatch { from, to } => write!(f, "type mismatch: {from} -> {to}"),
            Self::UnitMismatch { from, to } => {
                write!(f, "units '{from}' and '{to}' are not compatible")
            }
            Self::MalformedValue { detail } => write!(f, "malformed value: {detail}"),
            Self::NoDestination { endpoint } => {
                write!(f, "endpoint '{endpoint}' has no destination for send")
            }
            Self::ConfigurationError { reason } => write!(f, "configuration error: {reason}"),
            Self::InvalidState { reason } => write!(f, "invalid state: {reason}"),
            Self::UnknownInterface { name } => write!(f, "unknown interface '{name}'"),
            Self::DuplicateName { name } => write!(f, "duplicate interface name '{name}'"),
        }
    }
}

impl Error for InterfaceError {}

impl From<ConversionError> for InterfaceError {
    fn from(e: ConversionError) -> Self {
        match e {
            ConversionError::TypeMismatch { from, to } => Self::TypeMismatch {
                from: from.name().to_owned(),
                to: to.name().to_owned(),
            },
            ConversionError::UnitMismatch { from, to } => Self::UnitMismatch { from, to },
            ConversionError::MalformedValue { detail } => Self::MalformedValue { detail },
            ConversionError::UnknownUnit { unit } => Self::UnitMismatch {
                from: unit,
                to: String::new(),
            },
        }
    }
}
