//! Core value types, conversions, and identifiers for Skein.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Skein workspace:
//! interface handles, simulation time, the closed [`Value`] variant and
//! its conversion matrix, the raw payload codec, unit descriptors, and
//! the error taxonomy shared by every interface object.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod change;
pub mod codec;
pub mod convert;
pub mod error;
pub mod id;
pub mod text;
pub mod time;
pub mod units;
pub mod value;

pub use change::change_detected;
pub use convert::convert;
pub use error::{ConversionError, InterfaceError};
pub use id::{FederateInstanceId, InterfaceHandle, InterfaceKind};
pub use time::Time;
pub use units::Unit;
pub use value::{Complex, NamedPoint, Value, ValueKind};
