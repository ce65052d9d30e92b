//! The value [`Publication`].

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use skein_core::{InterfaceError, InterfaceHandle, Value, ValueKind};
use skein_interface::{HandleOption, InterfaceManager};

use crate::federate::Federate;

/// A named source of values for inputs.
///
/// Values are queued on [`Publication::publish`] and delivered at the next
/// time grant. Equality, ordering and hashing use the handle only.
#[derive(Clone, Debug)]
pub struct Publication {
    handle: InterfaceHandle,
    name: String,
    kind: Option<ValueKind>,
    units: String,
}

impl Publication {
    pub(crate) fn new(
        handle: InterfaceHandle,
        name: impl Into<String>,
        kind: Option<ValueKind>,
        units: &str,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            kind,
            units: units.to_owned(),
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

    /// Full registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind; `None` publishes values as given.
    pub fn kind(&self) -> Option<ValueKind> {
        self.kind
    }

    /// Declared units, or empty.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Queue a value for the next time grant.
    pub fn publish(&self, federate: &mut Federate, value: impl Into<Value>) -> Result<(), InterfaceError> {
        federate.publish(self.handle, value.into())
    }

    /// Only transmit values that moved by at least `delta`; a negative
    /// delta transmits every value.
    pub fn set_minimum_change(&self, federate: &mut Federate, delta: f64) -> Result<(), InterfaceError> {
        federate.set_publication_minimum_change(self.handle, delta)
    }

    /// Set an option.
    pub fn set_option(
        &self,
        federate: &mut Federate,
        option: HandleOption,
        value: i32,
    ) -> Result<(), InterfaceError> {
        federate.set_option(self.handle, option, value)
    }

    /// Read an option.
    pub fn option(&self, federate: &Federate, option: HandleOption) -> Result<i32, InterfaceError> {
        federate.option(self.handle, option)
    }

    /// Info string.
    pub fn info<'f>(&self, federate: &'f Federate) -> Result<&'f str, InterfaceError> {
        federate.info(self.handle)
    }

    /// Replace the info string.
    pub fn set_info(&self, federate: &mut Federate, info: &str) -> Result<(), InterfaceError> {
        federate.set_info(self.handle, info)
    }

    /// Close the publication, dropping values not yet delivered.
    pub fn close(&self, federate: &mut Federate) -> Result<(), InterfaceError> {
        federate.close_interface(self.handle)
    }
}

impl PartialEq for Publication {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Publication {}

impl PartialOrd for Publication {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Publication {
    fn cmp(&self, other: &Self) -> Ordering {
        self.handle.cmp(&other.handle)
    }
}

impl Hash for Publication {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}
