//! Value-side storage: inputs, publications, and queued value deliveries.

use smallvec::SmallVec;
use tracing::debug;

use skein_core::{
    FederateInstanceId, InterfaceError, InterfaceHandle, InterfaceKind, Time, Unit, Value,
    ValueKind,
};
use skein_interface::{
    HandleOption, Input, InputCallback, InputSource, MultiInputMode, SourceData, ValueManager,
};

use crate::federate::Federate;
use crate::options::OptionSet;
use crate::slot::SlotTable;

// ── Slots ──────────────────────────────────────────────────────────

/// One source of an input: a publication it listens to.
#[derive(Debug)]
pub(crate) struct SourceSlot {
    pub target: String,
    pub type_name: String,
    pub units: String,
    pub data: Option<(ValueKind, Vec<u8>)>,
}

impl SourceSlot {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            type_name: String::new(),
            units: String::new(),
            data: None,
        }
    }
}

pub(crate) struct InputSlot {
    pub kind: Option<ValueKind>,
    pub type_name: String,
    pub units: String,
    pub sources: SmallVec<[SourceSlot; 2]>,
    pub updated: bool,
    pub epoch: u64,
    pub default: Option<Value>,
    /// The manager's own copy of the input, read through when the callback fires.
    pub callback: Option<(Input, InputCallback)>,
    pub options: OptionSet,
    pub info: String,
    pub last_update: Time,
}

impl InputSlot {
    pub fn new(type_name: &str, units: &str) -> Self {
        Self {
            kind: ValueKind::from_type_name(type_name),
            type_name: type_name.to_owned(),
            units: units.to_owned(),
            sources: SmallVec::new(),
            updated: false,
            epoch: 0,
            default: None,
            callback: None,
            options: OptionSet::default(),
            info: String::new(),
            last_update: Time::ZERO,
        }
    }

    pub fn mode(&self) -> MultiInputMode {
        MultiInputMode::from_code(self.options.get(HandleOption::MultiInputHandling))
            .unwrap_or_default()
    }

    /// A fresh wrapper carrying the manager-side default, mode and
    /// change-detection option.
    pub fn wrapper(&self, handle: InterfaceHandle, name: &str) -> Input {
        let mut input = Input::new(handle, name, self.kind, &self.units)
            .with_mode(self.mode())
            .with_change_detection(self.options.flag(HandleOption::OnlyUpdateOnChange));
        if let Some(default) = &self.default {
            input = input.with_default(default.clone());
        }
        input
    }

    /// Check a source against this input's type and unit declarations.
    pub fn check_connection(
        &self,
        source: &SourceSlot,
        ignore_units: bool,
    ) -> Result<(), InterfaceError> {
        if self.options.flag(HandleOption::StrictTypeMatching) {
            if let (Some(want), Some(have)) =
                (self.kind, ValueKind::from_type_name(&source.type_name))
            {
                if want != have {
                    return Err(InterfaceError::TypeMismatch {
                        from: have.name().to_owned(),
                        to: want.name().to_owned(),
                    });
                }
            }
        }
        if ignore_units
            || self.options.flag(HandleOption::IgnoreUnitMismatch)
            || self.units.trim().is_empty()
            || source.units.trim().is_empty()
        {
            return Ok(());
        }
        // Unparseable units are ignored by the input itself.
        if let (Ok(from), Ok(to)) = (Unit::parse(&source.units), Unit::parse(&self.units)) {
            if !from.is_compatible(&to) {
                return Err(InterfaceError::UnitMismatch {
                    from: source.units.clone(),
                    to: self.units.clone(),
                });
            }
        }
        Ok(())
    }
}

impl InputSource for InputSlot {
    fn source_updated(&self) -> bool {
        self.updated
    }

    fn source_epoch(&self) -> u64 {
        self.epoch
    }

    fn source_count(&self) -> usize {
        self.sources.len()
    }

    fn source_units(&self, index: usize) -> &str {
        self.sources.get(index).map_or("", |s| s.units.as_str())
    }

    fn source_data(&self, index: usize) -> Option<SourceData<'_>> {
        let (kind, payload) = self.sources.get(index)?.data.as_ref()?;
        Some(SourceData {
            kind: *kind,
            payload,
        })
    }
}

pub(crate) struct PublicationSlot {
    pub kind: Option<ValueKind>,
    pub type_name: String,
    pub units: String,
    pub last_sent: Option<Value>,
    pub delta: f64,
    pub options: OptionSet,
    pub info: String,
}

impl PublicationSlot {
    pub fn new(type_name: &str, units: &str) -> Self {
        Self {
            kind: ValueKind::from_type_name(type_name),
            type_name: type_name.to_owned(),
            units: units.to_owned(),
            last_sent: None,
            delta: 0.0,
            options: OptionSet::default(),
            info: String::new(),
        }
    }
}

/// A published value waiting for the next time grant.
pub(crate) struct PendingValue {
    pub publication: InterfaceHandle,
    pub name: String,
    pub type_name: String,
    pub units: String,
    pub kind: ValueKind,
    pub payload: Vec<u8>,
}

// ── ValueStore ─────────────────────────────────────────────────────

pub(crate) struct ValueStore {
    pub inputs: SlotTable<InputSlot>,
    pub publications: SlotTable<PublicationSlot>,
    pub pending: Vec<PendingValue>,
}

impl ValueStore {
    pub fn new(federate: FederateInstanceId) -> Self {
        Self {
            inputs: SlotTable::new(federate, InterfaceKind::Input),
            publications: SlotTable::new(federate, InterfaceKind::Publication),
            pending: Vec::new(),
        }
    }

    /// Apply one published value to every input listening to it. Returns
    /// the number of inputs updated.
    pub fn deliver(&mut self, delivery: &PendingValue, time: Time) -> u64 {
        let mut delivered = 0;
        for input in self.inputs.values_mut() {
            let mut hit = false;
            let mut described = false;
            for source in input.sources.iter_mut().filter(|s| s.target == delivery.name) {
                if source.type_name != delivery.type_name || source.units != delivery.units {
                    source.type_name.clone_from(&delivery.type_name);
                    source.units.clone_from(&delivery.units);
                    described = true;
                }
                source.data = Some((delivery.kind, delivery.payload.clone()));
                hit = true;
            }
            if described {
                input.epoch += 1;
            }
            if hit {
                input.updated = true;
                input.last_update = time;
                delivered += 1;
            }
        }
        delivered
    }

    /// Drop queued values from one publication. Returns how many.
    pub fn drop_pending_from(&mut self, publication: InterfaceHandle) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.publication != publication);
        before - self.pending.len()
    }

    /// Whether any input lists `publication` as a source.
    pub fn has_listener(&self, publication: &str) -> bool {
        self.inputs
            .iter()
            .any(|(_, input)| input.sources.iter().any(|s| s.target == publication))
    }
}

// ── ValueManager ───────────────────────────────────────────────────

impl ValueManager for Federate {
    fn input_source(&self, handle: InterfaceHandle) -> Result<&dyn InputSource, InterfaceError> {
        let slot: &InputSlot = self.values.inputs.get(handle)?;
        Ok(slot as &dyn InputSource)
    }

    fn clear_input_update(&mut self, handle: InterfaceHandle) -> Result<(), InterfaceError> {
        self.values.inputs.get_mut(handle)?.updated = false;
        Ok(())
    }

    fn set_default_value(
        &mut self,
        handle: InterfaceHandle,
        value: &Value,
    ) -> Result<(), InterfaceError> {
        self.values.inputs.get_mut(handle)?.default = Some(value.clone());
        Ok(())
    }

    fn set_input_callback(
        &mut self,
        input: &Input,
        callback: InputCallback,
    ) -> Result<(), InterfaceError> {
        let slot = self.values.inputs.get_mut(input.handle())?;
        slot.callback = Some((input.clone(), callback));
        Ok(())
    }

    fn add_target(&mut self, handle: InterfaceHandle, target: &str) -> Result<(), InterfaceError> {
        self.values.inputs.get(handle)?;
        let mut source = SourceSlot::new(target);
        if let Some(publication) = self.find_publication(target) {
            source.target = self.values.publications.name(publication)?.to_owned();
            let slot = self.values.publications.get(publication)?;
            source.type_name.clone_from(&slot.type_name);
            source.units.clone_from(&slot.units);
        }
        let ignore_units = self.config.ignore_unit_mismatch;
        let slot = self.values.inputs.get_mut(handle)?;
        if slot.sources.iter().any(|s| s.target == source.target) {
            return Ok(());
        }
        if slot.mode() == MultiInputMode::None && !slot.sources.is_empty() {
            return Err(InterfaceError::ConfigurationError {
                reason: format!(
                    "adding target '{}' needs a multi-input mode other than none",
                    source.target
                ),
            });
        }
        slot.check_connection(&source, ignore_units)?;
        debug!(%handle, target = %source.target, "target added");
        slot.sources.push(source);
        slot.epoch += 1;
        Ok(())
    }

    fn remove_target(&mut self, handle: InterfaceHandle, target: &str) -> Result<(), InterfaceError> {
        self.values.inputs.get(handle)?;
        let full = self
            .find_publication(target)
            .and_then(|p| self.values.publications.name(p).ok())
            .map(str::to_owned);
        let slot = self.values.inputs.get_mut(handle)?;
        let before = slot.sources.len();
        slot.sources
            .retain(|s| s.target != target && Some(&s.target) != full.as_ref());
        if slot.sources.len() != before {
            slot.epoch += 1;
            debug!(%handle, target, "target removed");
        }
        Ok(())
    }

    fn target(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        let slot = self.values.inputs.get(handle)?;
        Ok(slot.sources.first().map_or("", |s| s.target.as_str()))
    }

    fn injection_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        let slot = self.values.inputs.get(handle)?;
        let Some(source) = slot.sources.first() else {
            return Ok("");
        };
        if !source.type_name.is_empty() {
            return Ok(&source.type_name);
        }
        Ok(source.data.as_ref().map_or("", |(kind, _)| kind.name()))
    }

    fn injection_units(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        let slot = self.values.inputs.get(handle)?;
        Ok(slot.sources.first().map_or("", |s| s.units.as_str()))
    }

    fn extraction_type(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        Ok(&self.values.inputs.get(handle)?.type_name)
    }

    fn extraction_units(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        Ok(&self.values.inputs.get(handle)?.units)
    }

    fn last_update_time(&self, handle: InterfaceHandle) -> Result<Time, InterfaceError> {
        Ok(self.values.inputs.get(handle)?.last_update)
    }
}
