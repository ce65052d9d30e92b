//! Skein: typed value and message interfaces for time-synchronized
//! co-simulation.
//!
//! This is the top-level facade crate that re-exports the public API from the
//! Skein sub-crates. Most users only need `skein` as a dependency.
//!
//! # Quick start
//!
//! ```rust
//! use skein::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut fed = Federate::new(FederateConfig::new("grid"))?;
//! let volts = fed.register_publication("volts", "double", "V")?;
//! let mut kilovolts = fed.register_subscription("volts", "kV")?;
//! let relay = fed.register_endpoint("relay", "")?;
//! fed.enter_executing_mode()?;
//!
//! volts.publish(&mut fed, 11_000.0)?;
//! relay.send_to(&mut fed, "relay", "trip")?;
//! fed.request_time(Time::from_secs_f64(1.0))?;
//!
//! assert!((kilovolts.value::<f64, _>(&mut fed)? - 11.0).abs() < 1e-9);
//! let message = relay.get_message(&mut fed)?.expect("message delivered");
//! assert_eq!(message.as_str(), Some("trip"));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `skein-core` | Values, conversion, units, time, handles, errors |
//! | [`interface`] | `skein-interface` | `Input`, `Endpoint`, messages, callbacks, manager traits |
//! | [`federate`] | `skein-federate` | The in-process `Federate` manager and `Publication` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Values, conversion, units, time and handles (`skein-core`).
///
/// The conversion matrix lives in [`types::convert`], the byte encoding in
/// [`types::codec`] and unit handling in [`types::units`].
pub use skein_core as types;

/// Interface objects and the manager traits they talk to (`skein-interface`).
///
/// [`interface::Input`] and [`interface::Endpoint`] hold only a local cache;
/// implement [`interface::ValueManager`] and [`interface::MessageManager`] to
/// host them outside [`federate::Federate`].
pub use skein_interface as interface;

/// The in-process federate (`skein-federate`).
pub use skein_federate as federate;

/// Common imports for typical Skein usage.
///
/// ```rust
/// use skein::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use skein_core::{
        Complex, InterfaceError, InterfaceHandle, InterfaceKind, NamedPoint, Time, Unit, Value,
        ValueKind,
    };

    // Interfaces
    pub use skein_interface::{
        Endpoint, HandleOption, Input, InputCallback, InterfaceManager, Message, MessageManager,
        MultiInputMode, PrimaryValue, TypedInput, ValueManager,
    };

    // Federate
    pub use skein_federate::{
        ConfigError, Federate, FederateConfig, FederateMetrics, FederateState, Publication,
    };
}
