//! The message [`Endpoint`].

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use skein_core::{InterfaceError, InterfaceHandle, Time};

use crate::manager::MessageManager;
use crate::message::Message;

/// A named mailbox for byte messages.
///
/// Holds no messages itself: queues live in the manager and the endpoint
/// only sends, peeks and drains through it. Equality, ordering and hashing
/// use the handle only.
#[derive(Clone, Debug)]
pub struct Endpoint {
    handle: InterfaceHandle,
    name: String,
    default_destination: Option<String>,
}

impl Endpoint {
    /// Build a wrapper for a registered endpoint. Called by managers.
    #[doc(hidden)]
    pub fn new(handle: InterfaceHandle, name: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
            default_destination: None,
        }
    }

    /// The interface handle.
    pub fn handle(&self) -> InterfaceHandle {
        self.handle
    }

    /// Whether the handle is not the invalid sentinel.
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Full registered name; used as the source of sent messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Destination used when a send names none.
    pub fn set_default_destination(&mut self, destination: impl Into<String>) {
        let destination = destination.into();
        self.default_destination = (!destination.is_empty()).then_some(destination);
    }

    /// The default destination, if set.
    pub fn default_destination(&self) -> Option<&str> {
        self.default_destination.as_deref()
    }

    /// The destination to use. A closed handle reports `InvalidHandle`
    /// ahead of a missing destination.
    fn resolve<'a, M: MessageManager + ?Sized>(
        &'a self,
        manager: &M,
        destination: &'a str,
    ) -> Result<&'a str, InterfaceError> {
        if !destination.is_empty() {
            return Ok(destination);
        }
        match self.default_destination.as_deref() {
            Some(default) => Ok(default),
            None => {
                manager.endpoint_type(self.handle)?;
                Err(InterfaceError::NoDestination {
                    endpoint: self.name.clone(),
                })
            }
        }
    }

    // ── Sending ─────────────────────────────────────────────────

    /// Send to the default destination at the manager's current time.
    pub fn send<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), InterfaceError> {
        self.send_to_at(manager, "", data, Time::ZERO)
    }

    /// Send to `destination` at the manager's current time. An empty
    /// destination means the default one.
    pub fn send_to<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        destination: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), InterfaceError> {
        self.send_to_at(manager, destination, data, Time::ZERO)
    }

    /// Send to the default destination at `time`.
    pub fn send_at<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        data: impl Into<Vec<u8>>,
        time: Time,
    ) -> Result<(), InterfaceError> {
        self.send_to_at(manager, "", data, time)
    }

    /// Send to `destination` at `time`. The manager never stamps a send
    /// time earlier than its current time.
    pub fn send_to_at<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        destination: &str,
        data: impl Into<Vec<u8>>,
        time: Time,
    ) -> Result<(), InterfaceError> {
        let destination = self.resolve(&*manager, destination)?;
        let message = Message::new(self.name.as_str(), destination, data, time);
        manager.send_message(self.handle, message)
    }

    /// Send a prebuilt message. An empty destination means the default one;
    /// the source is always this endpoint.
    pub fn send_message<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        message: Message,
    ) -> Result<(), InterfaceError> {
        let destination = self.resolve(&*manager, message.destination())?.to_owned();
        let message = message
            .with_destination(destination)
            .with_source(self.name.as_str());
        manager.send_message(self.handle, message)
    }

    // ── Receiving ───────────────────────────────────────────────

    /// Whether a message is queued.
    pub fn has_message<M: MessageManager + ?Sized>(&self, manager: &M) -> Result<bool, InterfaceError> {
        manager.has_message(self.handle)
    }

    /// Number of queued messages.
    pub fn pending_messages<M: MessageManager + ?Sized>(
        &self,
        manager: &M,
    ) -> Result<usize, InterfaceError> {
        manager.pending_count(self.handle)
    }

    /// Take the oldest queued message, or `None`. Never blocks.
    pub fn get_message<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
    ) -> Result<Option<Message>, InterfaceError> {
        manager.dequeue_message(self.handle)
    }

    /// Register an arrival callback, replacing any previous one.
    pub fn set_callback<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        f: impl FnMut(&Endpoint, Time) + Send + 'static,
    ) -> Result<(), InterfaceError> {
        manager.set_endpoint_callback(self, Box::new(f))
    }

    /// Receive values published under `publication` as messages.
    pub fn subscribe<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        publication: &str,
    ) -> Result<(), InterfaceError> {
        manager.subscribe(self.handle, publication)
    }

    // ── Filters and metadata ────────────────────────────────────

    /// Record a filter applied to messages leaving this endpoint.
    pub fn add_source_filter<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        filter: &str,
    ) -> Result<(), InterfaceError> {
        manager.add_source_filter(self.handle, filter)
    }

    /// Record a filter applied to messages entering this endpoint.
    pub fn add_destination_filter<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        filter: &str,
    ) -> Result<(), InterfaceError> {
        manager.add_destination_filter(self.handle, filter)
    }

    /// Declared type tag, or empty.
    pub fn endpoint_type<'m, M: MessageManager + ?Sized>(
        &self,
        manager: &'m M,
    ) -> Result<&'m str, InterfaceError> {
        manager.endpoint_type(self.handle)
    }

    /// Info string.
    pub fn info<'m, M: MessageManager + ?Sized>(&self, manager: &'m M) -> Result<&'m str, InterfaceError> {
        manager.info(self.handle)
    }

    /// Replace the info string.
    pub fn set_info<M: MessageManager + ?Sized>(
        &self,
        manager: &mut M,
        info: &str,
    ) -> Result<(), InterfaceError> {
        manager.set_info(self.handle, info)
    }

    /// Close the endpoint. Queued messages are dropped and every later
    /// operation fails with [`InterfaceError::InvalidHandle`].
    pub fn close<M: MessageManager + ?Sized>(&self, manager: &mut M) -> Result<(), InterfaceError> {
        manager.close_interface(self.handle)
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Endpoint {}

impl PartialOrd for Endpoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Endpoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.handle.cmp(&other.handle)
    }
}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}
