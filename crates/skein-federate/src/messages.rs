//! Message-side storage: endpoint queues, outbound messages, callbacks.

use std::collections::VecDeque;

use tracing::debug;

use skein_core::{FederateInstanceId, InterfaceError, InterfaceHandle, InterfaceKind, Time};
use skein_interface::{Endpoint, EndpointCallback, Message, MessageManager};

use crate::federate::Federate;
use crate::options::OptionSet;
use crate::slot::SlotTable;

pub(crate) struct EndpointSlot {
    pub type_tag: String,
    pub queue: VecDeque<Message>,
    /// Set when a message arrived during the current grant.
    pub arrived: bool,
    pub callback: Option<EndpointCallback>,
    pub source_filters: Vec<String>,
    pub destination_filters: Vec<String>,
    pub subscriptions: Vec<String>,
    pub options: OptionSet,
    pub info: String,
}

impl EndpointSlot {
    pub fn new(type_tag: &str) -> Self {
        Self {
            type_tag: type_tag.to_owned(),
            queue: VecDeque::new(),
            arrived: false,
            callback: None,
            source_filters: Vec::new(),
            destination_filters: Vec::new(),
            subscriptions: Vec::new(),
            options: OptionSet::default(),
            info: String::new(),
        }
    }
}

/// A sent message waiting for its delivery time.
pub(crate) struct Outbound {
    pub source: InterfaceHandle,
    pub message: Message,
}

pub(crate) struct MessageStore {
    pub endpoints: SlotTable<EndpointSlot>,
    pub outbound: Vec<Outbound>,
    pub federate_callback: Option<EndpointCallback>,
    next_id: u64,
}

impl MessageStore {
    pub fn new(federate: FederateInstanceId) -> Self {
        Self {
            endpoints: SlotTable::new(federate, InterfaceKind::Endpoint),
            outbound: Vec::new(),
            federate_callback: None,
            next_id: 1,
        }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Remove and return outbound messages due at or before `time`,
    /// ordered by send time and then by send order.
    pub fn take_ready(&mut self, time: Time) -> Vec<Outbound> {
        let (mut ready, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.outbound)
            .into_iter()
            .partition(|o| o.message.time() <= time);
        self.outbound = later;
        ready.sort_by_key(|o| (o.message.time(), o.message.id()));
        ready
    }

    /// Drop outbound messages sent by one endpoint. Returns how many.
    pub fn drop_outbound_from(&mut self, source: InterfaceHandle) -> usize {
        let before = self.outbound.len();
        self.outbound.retain(|o| o.source != source);
        before - self.outbound.len()
    }

    /// Endpoints subscribed to `publication`, with their names, in
    /// registration order.
    pub fn subscribers(&self, publication: &str) -> Vec<(InterfaceHandle, String)> {
        self.endpoints
            .iter()
            .filter(|(_, slot)| slot.subscriptions.iter().any(|p| p == publication))
            .filter_map(|(handle, _)| {
                let name = self.endpoints.name(handle).ok()?;
                Some((handle, name.to_owned()))
            })
            .collect()
    }
}

fn add_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_owned());
    }
}

// ── MessageManager ─────────────────────────────────────────────────

impl MessageManager for Federate {
    fn send_message(&mut self, source: InterfaceHandle, message: Message) -> Result<(), InterfaceError> {
        self.require_active("send")?;
        let source_tag = &self.messages.endpoints.get(source)?.type_tag;
        if self.config.strict_type_checking && !source_tag.is_empty() {
            if let Some(destination) = self.find_endpoint(message.destination()) {
                let dest_tag = &self.messages.endpoints.get(destination)?.type_tag;
                if !dest_tag.is_empty() && dest_tag != source_tag {
                    return Err(InterfaceError::TypeMismatch {
                        from: source_tag.clone(),
                        to: dest_tag.clone(),
                    });
                }
            }
        }
        let time = message.time().max(self.current_time);
        let id = self.messages.next_id();
        let message = message.with_time(time).with_id(id);
        debug!(
            source = message.source(),
            destination = message.destination(),
            id,
            "message queued"
        );
        self.messages.outbound.push(Outbound { source, message });
        self.metrics.messages_sent += 1;
        Ok(())
    }

    fn has_message(&self, handle: InterfaceHandle) -> Result<bool, InterfaceError> {
        Ok(!self.messages.endpoints.get(handle)?.queue.is_empty())
    }

    fn pending_count(&self, handle: InterfaceHandle) -> Result<usize, InterfaceError> {
        Ok(self.messages.endpoints.get(handle)?.queue.len())
    }

    fn has_any_message(&self) -> bool {
        self.messages
            .endpoints
            .iter()
            .any(|(_, slot)| !slot.queue.is_empty())
    }

    fn pending_total(&self) -> usize {
        self.messages
            .endpoints
            .iter()
            .map(|(_, slot)| slot.queue.len())
            .sum()
    }

    fn dequeue_message(&mut self, handle: InterfaceHandle) -> Result<Option<Message>, InterfaceError> {
        Ok(self.messages.endpoints.get_mut(handle)?.queue.pop_front())
    }

    fn dequeue_any(&mut self) -> Option<Message> {
        let handle = self
            .messages
            .endpoints
            .iter()
            .find(|(_, slot)| !slot.queue.is_empty())
            .map(|(handle, _)| handle)?;
        self.messages.endpoints.get_mut(handle).ok()?.queue.pop_front()
    }

    fn set_endpoint_callback(
        &mut self,
        endpoint: &Endpoint,
        callback: EndpointCallback,
    ) -> Result<(), InterfaceError> {
        self.messages.endpoints.get_mut(endpoint.handle())?.callback = Some(callback);
        Ok(())
    }

    fn set_federate_endpoint_callback(&mut self, callback: EndpointCallback) {
        self.messages.federate_callback = Some(callback);
    }

    fn add_source_filter(&mut self, handle: InterfaceHandle, filter: &str) -> Result<(), InterfaceError> {
        let slot = self.messages.endpoints.get_mut(handle)?;
        add_unique(&mut slot.source_filters, filter);
        Ok(())
    }

    fn add_destination_filter(
        &mut self,
        handle: InterfaceHandle,
        filter: &str,
    ) -> Result<(), InterfaceError> {
        let slot = self.messages.endpoints.get_mut(handle)?;
        add_unique(&mut slot.destination_filters, filter);
        Ok(())
    }

    fn endpoint_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        Ok(&self.messages.endpoints.get(handle)?.type_tag)
    }

    fn subscribe(&mut self, handle: InterfaceHandle, publication: &str) -> Result<(), InterfaceError> {
        self.messages.endpoints.get(handle)?;
        let key = match self.find_publication(publication) {
            Some(p) => self.values.publications.name(p)?.to_owned(),
            None => publication.to_owned(),
        };
        let slot = self.messages.endpoints.get_mut(handle)?;
        add_unique(&mut slot.subscriptions, &key);
        debug!(%handle, publication = %key, "endpoint subscribed");
        Ok(())
    }
}
