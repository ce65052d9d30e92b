//! Contracts between interface objects and the manager that owns them.
//!
//! A manager owns every buffered value, message queue, and callback, and is
//! the single serialization point for a federate's interfaces. Inputs and
//! endpoints reach that state only through these traits, always naming
//! themselves by handle. Every handle-taking method fails with
//! [`InterfaceError::InvalidHandle`] for a closed, stale, or foreign handle.
//!
//! Methods that only the interface objects call (reading an input's
//! sources, clearing its update flag, installing callbacks, handing over a
//! message) are hidden from the rendered docs. Manager implementations
//! still provide them; applications go through [`Input`] and [`Endpoint`].

use skein_core::{InterfaceError, InterfaceHandle, Time, Value, ValueKind};

use crate::callback::{EndpointCallback, InputCallback};
use crate::endpoint::Endpoint;
use crate::input::Input;
use crate::message::Message;
use crate::options::HandleOption;

/// Operations shared by every interface family.
pub trait InterfaceManager {
    /// Full registered name (key) of an interface.
    fn interface_name(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError>;

    /// Free-form info string attached to an interface.
    fn info(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError>;

    /// Replace the info string.
    fn set_info(&mut self, handle: InterfaceHandle, info: &str) -> Result<(), InterfaceError>;

    /// Current value of an option.
    fn option(&self, handle: InterfaceHandle, option: HandleOption) -> Result<i32, InterfaceError>;

    /// Set an option. Fails with [`InterfaceError::ConfigurationError`] when
    /// the value is incompatible with the interface's current configuration.
    fn set_option(
        &mut self,
        handle: InterfaceHandle,
        option: HandleOption,
        value: i32,
    ) -> Result<(), InterfaceError>;

    /// Close an interface. Immediate: queued deliveries for it are dropped
    /// and the handle never resolves again.
    fn close_interface(&mut self, handle: InterfaceHandle) -> Result<(), InterfaceError>;
}

/// Latest delivery from one source of an input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceData<'a> {
    /// Kind the payload is encoded as.
    pub kind: ValueKind,
    /// Raw payload, see [`skein_core::codec`].
    pub payload: &'a [u8],
}

/// The view of an input's sources a manager lends during a read.
pub trait InputSource {
    /// Whether a delivery arrived since the last consuming read.
    fn source_updated(&self) -> bool;

    /// Counter bumped whenever the set of sources changes.
    fn source_epoch(&self) -> u64;

    /// Number of sources (targets), delivered or not.
    fn source_count(&self) -> usize;

    /// Declared units of source `index`; empty when none.
    fn source_units(&self, index: usize) -> &str;

    /// Latest delivery from source `index`, if it has delivered.
    fn source_data(&self, index: usize) -> Option<SourceData<'_>>;
}

/// Value-side manager operations used by [`Input`].
pub trait ValueManager: InterfaceManager {
    /// Borrow the source view of an input.
    #[doc(hidden)]
    fn input_source(&self, handle: InterfaceHandle) -> Result<&dyn InputSource, InterfaceError>;

    /// Clear the manager-side update flag after a consuming read.
    #[doc(hidden)]
    fn clear_input_update(&mut self, handle: InterfaceHandle) -> Result<(), InterfaceError>;

    /// Record a default value for wrappers built from this handle later.
    fn set_default_value(
        &mut self,
        handle: InterfaceHandle,
        value: &Value,
    ) -> Result<(), InterfaceError>;

    /// Register the update callback for an input, replacing any previous one.
    ///
    /// The manager keeps its own copy of `input` to read through when the
    /// callback fires.
    #[doc(hidden)]
    fn set_input_callback(
        &mut self,
        input: &Input,
        callback: InputCallback,
    ) -> Result<(), InterfaceError>;

    /// Add a source by publication name.
    fn add_target(&mut self, handle: InterfaceHandle, target: &str) -> Result<(), InterfaceError>;

    /// Remove a source by publication name. Removing an absent target is a no-op.
    fn remove_target(
        &mut self,
        handle: InterfaceHandle,
        target: &str,
    ) -> Result<(), InterfaceError>;

    /// Name of the first source, or empty.
    fn target(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError>;

    /// Declared type of the first source, or empty.
    fn injection_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError>;

    /// Declared units of the first source, or empty.
    fn injection_units(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError>;

    /// Type the input was registered with.
    fn extraction_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError>;

    /// Units the input was registered with.
    fn extraction_units(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError>;

    /// Time of the most recent delivery to the input.
    fn last_update_time(&self, handle: InterfaceHandle) -> Result<Time, InterfaceError>;
}

/// Message-side manager operations used by [`Endpoint`].
pub trait MessageManager: InterfaceManager {
    /// Hand a message to the manager for delivery. The manager stamps the
    /// send time as no earlier than its current time.
    #[doc(hidden)]
    fn send_message(
        &mut self,
        source: InterfaceHandle,
        message: Message,
    ) -> Result<(), InterfaceError>;

    /// Whether the endpoint has a queued message.
    fn has_message(&self, handle: InterfaceHandle) -> Result<bool, InterfaceError>;

    /// Queue depth of one endpoint.
    fn pending_count(&self, handle: InterfaceHandle) -> Result<usize, InterfaceError>;

    /// Whether any endpoint has a queued message.
    fn has_any_message(&self) -> bool;

    /// Total queued messages across endpoints.
    fn pending_total(&self) -> usize;

    /// Dequeue the oldest message for one endpoint. Never blocks.
    fn dequeue_message(
        &mut self,
        handle: InterfaceHandle,
    ) -> Result<Option<Message>, InterfaceError>;

    /// Dequeue from the first endpoint, in registration order, that has a
    /// message. Never blocks.
    fn dequeue_any(&mut self) -> Option<Message>;

    /// Register the arrival callback for one endpoint, replacing any previous one.
    #[doc(hidden)]
    fn set_endpoint_callback(
        &mut self,
        endpoint: &Endpoint,
        callback: EndpointCallback,
    ) -> Result<(), InterfaceError>;

    /// Register the arrival callback for endpoints without their own.
    fn set_federate_endpoint_callback(&mut self, callback: EndpointCallback);

    /// Associate a named filter with messages leaving the endpoint.
    fn add_source_filter(
        &mut self,
        handle: InterfaceHandle,
        filter: &str,
    ) -> Result<(), InterfaceError>;

    /// Associate a named filter with messages entering the endpoint.
    fn add_destination_filter(
        &mut self,
        handle: InterfaceHandle,
        filter: &str,
    ) -> Result<(), InterfaceError>;

    /// Declared type tag of the endpoint, or empty.
    fn endpoint_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError>;

    /// Receive every value published under `publication` as a message.
    fn subscribe(
        &mut self,
        handle: InterfaceHandle,
        publication: &str,
    ) -> Result<(), InterfaceError>;
}
