//! In-process reference federate manager for Skein interfaces.
//!
//! A [`Federate`] owns the handle tables, buffered values, message queues
//! and callbacks behind the [`Input`](skein_interface::Input) and
//! [`Endpoint`](skein_interface::Endpoint) objects it hands out, and
//! implements the [`ValueManager`](skein_interface::ValueManager) and
//! [`MessageManager`](skein_interface::MessageManager) contracts they are
//! driven through. Publications loop back into inputs and messages into
//! endpoints of the same federate; [`Federate::request_time`] is the single
//! point where deliveries become visible and callbacks run.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod federate;
pub mod metrics;
pub mod publication;

mod messages;
mod options;
mod slot;
mod values;

pub use config::{ConfigError, FederateConfig};
pub use federate::{EndpointFilters, Federate, FederateState};
pub use metrics::FederateMetrics;
pub use publication::Publication;
