//! Minimal single-interface managers for unit tests.

use skein_core::codec::encode;
use skein_core::{
    FederateInstanceId, InterfaceError, InterfaceHandle, InterfaceKind, Time, Value, ValueKind,
};

use crate::aggregate::MultiInputMode;
use crate::callback::{EndpointCallback, InputCallback};
use crate::endpoint::Endpoint;
use crate::input::Input;
use crate::manager::{InputSource, InterfaceManager, MessageManager, SourceData, ValueManager};
use crate::message::Message;
use crate::options::HandleOption;

fn check(own: InterfaceHandle, closed: bool, handle: InterfaceHandle) -> Result<(), InterfaceError> {
    if closed || own != handle {
        Err(InterfaceError::InvalidHandle { handle })
    } else {
        Ok(())
    }
}

pub(crate) struct MockSource {
    pub updated: bool,
    pub epoch: u64,
    pub units: Vec<String>,
    pub data: Vec<Option<(ValueKind, Vec<u8>)>>,
}

impl InputSource for MockSource {
    fn source_updated(&self) -> bool {
        self.updated
    }

    fn source_epoch(&self) -> u64 {
        self.epoch
    }

    fn source_count(&self) -> usize {
        self.data.len()
    }

    fn source_units(&self, index: usize) -> &str {
        self.units.get(index).map_or("", String::as_str)
    }

    fn source_data(&self, index: usize) -> Option<SourceData<'_>> {
        self.data.get(index)?.as_ref().map(|(kind, payload)| SourceData {
            kind: *kind,
            payload,
        })
    }
}

pub(crate) struct MockValues {
    pub handle: InterfaceHandle,
    pub closed: bool,
    pub source: MockSource,
    pub mode: i32,
    pub default_value: Option<Value>,
    pub callback: Option<InputCallback>,
}

impl MockValues {
    pub fn single(kind: Option<ValueKind>, units: &str) -> (Self, Input) {
        Self::build(1, kind, units)
    }

    pub fn with_sources(count: usize, kind: Option<ValueKind>) -> (Self, Input) {
        Self::build(count, kind, "")
    }

    fn build(count: usize, kind: Option<ValueKind>, units: &str) -> (Self, Input) {
        let handle = InterfaceHandle::new(FederateInstanceId::next(), InterfaceKind::Input, 0, 0);
        let mock = Self {
            handle,
            closed: false,
            source: MockSource {
                updated: false,
                epoch: 0,
                units: vec![String::new(); count],
                data: vec![None; count],
            },
            mode: 0,
            default_value: None,
            callback: None,
        };
        (mock, Input::new(handle, "fed/in", kind, units))
    }

    pub fn deliver(&mut self, index: usize, value: Value) {
        self.deliver_raw(index, value.kind(), encode(&value));
    }

    pub fn deliver_raw(&mut self, index: usize, kind: ValueKind, payload: Vec<u8>) {
        self.source.data[index] = Some((kind, payload));
        self.source.updated = true;
    }
}

impl InterfaceManager for MockValues {
    fn interface_name(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("fed/in")
    }

    fn info(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("")
    }

    fn set_info(&mut self, handle: InterfaceHandle, _info: &str) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)
    }

    fn option(&self, handle: InterfaceHandle, option: HandleOption) -> Result<i32, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok(match option {
            HandleOption::MultiInputHandling => self.mode,
            other => other.default_value(),
        })
    }

    fn set_option(
        &mut self,
        handle: InterfaceHandle,
        option: HandleOption,
        value: i32,
    ) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)?;
        if option == HandleOption::MultiInputHandling {
            if MultiInputMode::from_code(value) == Some(MultiInputMode::None)
                && self.source.data.len() > 1
            {
                return Err(InterfaceError::ConfigurationError {
                    reason: "several sources need an aggregation mode".into(),
                });
            }
            self.mode = value;
        }
        Ok(())
    }

    fn close_interface(&mut self, handle: InterfaceHandle) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)?;
        self.closed = true;
        Ok(())
    }
}

impl ValueManager for MockValues {
    fn input_source(&self, handle: InterfaceHandle) -> Result<&dyn InputSource, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok(&self.source)
    }

    fn clear_input_update(&mut self, handle: InterfaceHandle) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)?;
        self.source.updated = false;
        Ok(())
    }

    fn set_default_value(
        &mut self,
        handle: InterfaceHandle,
        value: &Value,
    ) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)?;
        self.default_value = Some(value.clone());
        Ok(())
    }

    fn set_input_callback(
        &mut self,
        input: &Input,
        callback: InputCallback,
    ) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, input.handle())?;
        self.callback = Some(callback);
        Ok(())
    }

    fn add_target(&mut self, handle: InterfaceHandle, _target: &str) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)?;
        self.source.units.push(String::new());
        self.source.data.push(None);
        self.source.epoch += 1;
        Ok(())
    }

    fn remove_target(&mut self, handle: InterfaceHandle, _target: &str) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)?;
        self.source.units.pop();
        self.source.data.pop();
        self.source.epoch += 1;
        Ok(())
    }

    fn target(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("fed/pub")
    }

    fn injection_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("")
    }

    fn injection_units(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok(self.source_units_or_empty())
    }

    fn extraction_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("")
    }

    fn extraction_units(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("")
    }

    fn last_update_time(&self, handle: InterfaceHandle) -> Result<Time, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok(Time::ZERO)
    }
}

impl MockValues {
    fn source_units_or_empty(&self) -> &str {
        self.source.units.first().map_or("", String::as_str)
    }
}

pub(crate) struct MockMessages {
    pub handle: InterfaceHandle,
    pub closed: bool,
    pub sent: Vec<Message>,
}

impl MockMessages {
    pub fn single(name: &str) -> (Self, Endpoint) {
        let handle = InterfaceHandle::new(FederateInstanceId::next(), InterfaceKind::Endpoint, 0, 0);
        let mock = Self {
            handle,
            closed: false,
            sent: Vec::new(),
        };
        (mock, Endpoint::new(handle, name))
    }
}

impl InterfaceManager for MockMessages {
    fn interface_name(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("fed/a")
    }

    fn info(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("")
    }

    fn set_info(&mut self, handle: InterfaceHandle, _info: &str) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)
    }

    fn option(&self, handle: InterfaceHandle, option: HandleOption) -> Result<i32, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok(option.default_value())
    }

    fn set_option(
        &mut self,
        handle: InterfaceHandle,
        _option: HandleOption,
        _value: i32,
    ) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)
    }

    fn close_interface(&mut self, handle: InterfaceHandle) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)?;
        self.closed = true;
        Ok(())
    }
}

impl MessageManager for MockMessages {
    fn send_message(&mut self, source: InterfaceHandle, message: Message) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, source)?;
        self.sent.push(message);
        Ok(())
    }

    fn has_message(&self, handle: InterfaceHandle) -> Result<bool, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok(false)
    }

    fn pending_count(&self, handle: InterfaceHandle) -> Result<usize, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok(0)
    }

    fn has_any_message(&self) -> bool {
        false
    }

    fn pending_total(&self) -> usize {
        0
    }

    fn dequeue_message(&mut self, handle: InterfaceHandle) -> Result<Option<Message>, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok(None)
    }

    fn dequeue_any(&mut self) -> Option<Message> {
        None
    }

    fn set_endpoint_callback(
        &mut self,
        endpoint: &Endpoint,
        _callback: EndpointCallback,
    ) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, endpoint.handle())
    }

    fn set_federate_endpoint_callback(&mut self, _callback: EndpointCallback) {}

    fn add_source_filter(&mut self, handle: InterfaceHandle, _filter: &str) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)
    }

    fn add_destination_filter(
        &mut self,
        handle: InterfaceHandle,
        _filter: &str,
    ) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)
    }

    fn endpoint_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        check(self.handle, self.closed, handle)?;
        Ok("")
    }

    fn subscribe(&mut self, handle: InterfaceHandle, _publication: &str) -> Result<(), InterfaceError> {
        check(self.handle, self.closed, handle)
    }
}
