//! Per-interface options.

use std::fmt;

/// An option that can be read or set on a registered interface.
///
/// Each option has a stable integer code for interop with callers that
/// identify options numerically. Values are integers too; flags use
/// `0`/`1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleOption {
    /// Inputs only report an update when the value changed.
    OnlyUpdateOnChange,
    /// Publications only transmit when the value changed.
    OnlyTransmitOnChange,
    /// The interface must be connected before execution.
    ConnectionRequired,
    /// The interface may stay unconnected.
    ConnectionOptional,
    /// Multi-input aggregation mode, as a
    /// [`MultiInputMode`](crate::MultiInputMode) code.
    MultiInputHandling,
    /// Reject sources whose declared type differs from the input's.
    StrictTypeMatching,
    /// Accept sources whose units are not convertible.
    IgnoreUnitMismatch,
}

impl HandleOption {
    /// Every option.
    pub const ALL: [HandleOption; 7] = [
        HandleOption::OnlyUpdateOnChange,
        HandleOption::OnlyTransmitOnChange,
        HandleOption::ConnectionRequired,
        HandleOption::ConnectionOptional,
        HandleOption::MultiInputHandling,
        HandleOption::StrictTypeMatching,
        HandleOption::IgnoreUnitMismatch,
    ];

    /// Stable integer code.
    pub fn code(self) -> i32 {
        match self {
            Self::OnlyTransmitOnChange => 452,
            Self::OnlyUpdateOnChange => 454,
            Self::ConnectionRequired => 397,
            Self::ConnectionOptional => 402,
            Self::MultiInputHandling => 507,
            Self::StrictTypeMatching => 414,
            Self::IgnoreUnitMismatch => 447,
        }
    }

    /// Look up an option by its integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.code() == code)
    }

    /// Value an interface reports for this option before it is set.
    pub fn default_value(self) -> i32 {
        match self {
            Self::ConnectionOptional => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for HandleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OnlyUpdateOnChange => "only_update_on_change",
            Self::OnlyTransmitOnChange => "only_transmit_on_change",
            Self::ConnectionRequired => "connection_required",
            Self::ConnectionOptional => "connection_optional",
            Self::MultiInputHandling => "multi_input_handling",
            Self::StrictTypeMatching => "strict_type_matching",
            Self::IgnoreUnitMismatch => "ignore_unit_mismatch",
        };
        f.write_str(s)
    }
}
