//! Interface objects for Skein federates.
//!
//! [`Input`] and [`Endpoint`] are cheap, clonable views identified by an
//! [`InterfaceHandle`](skein_core::InterfaceHandle). They own only a private
//! cache; authoritative state lives in a manager implementing
//! [`ValueManager`] or [`MessageManager`], which every operation takes as an
//! explicit argument.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod callback;
pub mod endpoint;
pub mod input;
pub mod manager;
pub mod message;
pub mod options;
pub mod typed;

#[cfg(test)]
pub(crate) mod mock;

pub use aggregate::{aggregate, MultiInputMode};
pub use callback::{EndpointCallback, InputCallback};
pub use endpoint::Endpoint;
pub use input::Input;
pub use manager::{InputSource, InterfaceManager, MessageManager, SourceData, ValueManager};
pub use message::Message;
pub use options::HandleOption;
pub use typed::{PrimaryValue, TypedInput};
