//! The [`Message`] envelope.

use skein_core::Time;

/// An immutable message envelope.
///
/// Messages are moved, never shared: the sender gives one up on send and
/// the receiver owns it after dequeue. The payload is opaque bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct Message {
    source: String,
    destination: String,
    original_source: String,
    original_destination: String,
    data: Vec<u8>,
    time: Time,
    receive_time: Option<Time>,
    id: u64,
}

impl Message {
    /// Build a message. The original source and destination start equal to
    /// `source` and `destination`.
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        data: impl Into<Vec<u8>>,
        time: Time,
    ) -> Self {
        let source = source.into();
        let destination = destination.into();
        Self {
            original_source: source.clone(),
            original_destination: destination.clone(),
            source,
            destination,
            data: data.into(),
            time,
            receive_time: None,
            id: 0,
        }
    }

    /// Replace the id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Stamp the time the message reached its destination.
    pub fn with_receive_time(mut self, time: Time) -> Self {
        self.receive_time = Some(time);
        self
    }

    /// Replace the send time.
    pub fn with_time(mut self, time: Time) -> Self {
        self.time = time;
        self
    }

    /// Re-address the message, keeping the original destination.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Re-attribute the message, keeping the original source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Name of the sending endpoint.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Name of the destination endpoint.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Source before any filter re-attributed the message.
    pub fn original_source(&self) -> &str {
        &self.original_source
    }

    /// Destination before any filter re-addressed the message.
    pub fn original_destination(&self) -> &str {
        &self.original_destination
    }

    /// Payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload as UTF-8 text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Take the payload.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Send time.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Receive time, once delivered.
    pub fn receive_time(&self) -> Option<Time> {
        self.receive_time
    }

    /// Message id assigned by the sending manager.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the message has no payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
