//! The [`Federate`]: an in-process manager for inputs, publications and
//! endpoints.
//!
//! # Lifecycle
//!
//! A federate starts in [`FederateState::Startup`], where interfaces are
//! registered. [`Federate::enter_executing_mode`] checks connections,
//! delivers everything queued during startup at time zero, and moves to
//! [`FederateState::Executing`]. Each [`Federate::request_time`] then grants
//! a time, applies every value and message due by it, and dispatches
//! callbacks before returning. [`Federate::finalize`] ends the run.
//!
//! Publications loop back into inputs of the same federate, and messages
//! into its endpoints; there is no transport.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use skein_core::change::change_detected;
use skein_core::codec::encode;
use skein_core::convert::convert_owned;
use skein_core::{FederateInstanceId, InterfaceError, InterfaceHandle, InterfaceKind, Time, Value};
use skein_interface::{
    Endpoint, HandleOption, Input, InterfaceManager, Message, MultiInputMode, PrimaryValue,
    TypedInput,
};

use crate::config::{ConfigError, FederateConfig};
use crate::messages::{EndpointSlot, MessageStore, Outbound};
use crate::metrics::FederateMetrics;
use crate::publication::Publication;
use crate::slot::SlotTable;
use crate::values::{InputSlot, PendingValue, PublicationSlot, ValueStore};

/// Lifecycle state of a [`Federate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FederateState {
    /// Registering interfaces.
    Startup,
    /// Advancing time.
    Executing,
    /// Finished; no further time requests, publications or sends.
    Finalized,
}

impl fmt::Display for FederateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Startup => "startup",
            Self::Executing => "executing",
            Self::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

/// Filters recorded on an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointFilters<'a> {
    /// Filters applied to messages leaving the endpoint.
    pub source: &'a [String],
    /// Filters applied to messages entering the endpoint.
    pub destination: &'a [String],
}

/// An in-process federate manager.
///
/// Owns every handle table, buffered value, message queue and callback for
/// its interfaces, and is the single serialization point for them: every
/// mutating operation takes `&mut self`. `Send` but not `Sync`.
pub struct Federate {
    pub(crate) config: FederateConfig,
    id: FederateInstanceId,
    state: FederateState,
    pub(crate) current_time: Time,
    pub(crate) values: ValueStore,
    pub(crate) messages: MessageStore,
    pub(crate) metrics: FederateMetrics,
}

impl Federate {
    /// Build a federate from a validated config.
    pub fn new(config: FederateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let id = FederateInstanceId::next();
        info!(federate = %config.name, %id, "federate created");
        Ok(Self {
            config,
            id,
            state: FederateState::Startup,
            current_time: Time::ZERO,
            values: ValueStore::new(id),
            messages: MessageStore::new(id),
            metrics: FederateMetrics::default(),
        })
    }

    /// Federate name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The config the federate was built with.
    pub fn config(&self) -> &FederateConfig {
        &self.config
    }

    /// Instance id carried by every handle this federate mints.
    pub fn id(&self) -> FederateInstanceId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FederateState {
        self.state
    }

    /// The most recently granted time.
    pub fn current_time(&self) -> Time {
        self.current_time
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &FederateMetrics {
        &self.metrics
    }

    fn require_startup(&self, operation: &str) -> Result<(), InterfaceError> {
        if self.state == FederateState::Startup {
            return Ok(());
        }
        Err(InterfaceError::InvalidState {
            reason: format!("{operation} is only allowed during startup, federate is {}", self.state),
        })
    }

    pub(crate) fn require_active(&self, operation: &str) -> Result<(), InterfaceError> {
        if self.state == FederateState::Finalized {
            return Err(InterfaceError::InvalidState {
                reason: format!("{operation} after finalize"),
            });
        }
        Ok(())
    }

    // ── Name resolution ─────────────────────────────────────────

    /// Look a name up as given, then as a local name of this federate.
    fn resolve<T>(&self, table: &SlotTable<T>, name: &str) -> Option<InterfaceHandle> {
        table
            .lookup(name)
            .or_else(|| table.lookup(&self.config.local_key(name)))
    }

    pub(crate) fn find_publication(&self, name: &str) -> Option<InterfaceHandle> {
        self.resolve(&self.values.publications, name)
    }

    pub(crate) fn find_endpoint(&self, name: &str) -> Option<InterfaceHandle> {
        self.resolve(&self.messages.endpoints, name)
    }

    fn unknown(name: impl Into<String>) -> InterfaceError {
        InterfaceError::UnknownInterface { name: name.into() }
    }

    // ── Registration ────────────────────────────────────────────

    fn add_input(&mut self, key: String, type_name: &str, units: &str) -> Result<Input, InterfaceError> {
        self.require_startup("input registration")?;
        let slot = InputSlot::new(type_name, units);
        let kind = slot.kind;
        let handle = self.values.inputs.insert(key.clone(), slot)?;
        debug!(%handle, name = %key, type_name, units, "input registered");
        Ok(Input::new(handle, key, kind, units))
    }

    /// Register an input named `"<federate>/<name>"`.
    pub fn register_input(
        &mut self,
        name: &str,
        type_name: &str,
        units: &str,
    ) -> Result<Input, InterfaceError> {
        let key = self.config.local_key(name);
        self.add_input(key, type_name, units)
    }

    /// Register an input under `name` as given.
    pub fn register_global_input(
        &mut self,
        name: &str,
        type_name: &str,
        units: &str,
    ) -> Result<Input, InterfaceError> {
        self.add_input(name.to_owned(), type_name, units)
    }

    /// Register an input named `"<federate>/<name>_<index>"`.
    pub fn register_input_indexed(
        &mut self,
        name: &str,
        index: usize,
        type_name: &str,
        units: &str,
    ) -> Result<Input, InterfaceError> {
        self.register_input(&format!("{name}_{index}"), type_name, units)
    }

    /// Register an input typed as `X`.
    pub fn register_typed_input<X: PrimaryValue>(
        &mut self,
        name: &str,
        units: &str,
    ) -> Result<TypedInput<X>, InterfaceError> {
        self.register_input(name, X::KIND.name(), units).map(TypedInput::new)
    }

    /// Register an anonymous input connected to `target`.
    pub fn register_subscription(&mut self, target: &str, units: &str) -> Result<Input, InterfaceError> {
        let mut input = self.add_input(String::new(), "", units)?;
        input.add_target(self, target)?;
        Ok(input)
    }

    fn add_publication(
        &mut self,
        key: String,
        type_name: &str,
        units: &str,
    ) -> Result<Publication, InterfaceError> {
        self.require_startup("publication registration")?;
        let slot = PublicationSlot::new(type_name, units);
        let kind = slot.kind;
        let handle = self.values.publications.insert(key.clone(), slot)?;
        debug!(%handle, name = %key, type_name, units, "publication registered");
        Ok(Publication::new(handle, key, kind, units))
    }

    /// Register a publication named `"<federate>/<name>"`.
    pub fn register_publication(
        &mut self,
        name: &str,
        type_name: &str,
        units: &str,
    ) -> Result<Publication, InterfaceError> {
        let key = self.config.local_key(name);
        self.add_publication(key, type_name, units)
    }

    /// Register a publication under `name` as given.
    pub fn register_global_publication(
        &mut self,
        name: &str,
        type_name: &str,
        units: &str,
    ) -> Result<Publication, InterfaceError> {
        self.add_publication(name.to_owned(), type_name, units)
    }

    /// Register a publication named `"<federate>/<name>_<index>"`.
    pub fn register_publication_indexed(
        &mut self,
        name: &str,
        index: usize,
        type_name: &str,
        units: &str,
    ) -> Result<Publication, InterfaceError> {
        self.register_publication(&format!("{name}_{index}"), type_name, units)
    }

    fn add_endpoint(&mut self, key: String, type_tag: &str) -> Result<Endpoint, InterfaceError> {
        self.require_startup("endpoint registration")?;
        let handle = self
            .messages
            .endpoints
            .insert(key.clone(), EndpointSlot::new(type_tag))?;
        debug!(%handle, name = %key, type_tag, "endpoint registered");
        Ok(Endpoint::new(handle, key))
    }

    /// Register an endpoint named `"<federate>/<name>"`.
    pub fn register_endpoint(&mut self, name: &str, type_tag: &str) -> Result<Endpoint, InterfaceError> {
        let key = self.config.local_key(name);
        self.add_endpoint(key, type_tag)
    }

    /// Register an endpoint under `name` as given.
    pub fn register_global_endpoint(
        &mut self,
        name: &str,
        type_tag: &str,
    ) -> Result<Endpoint, InterfaceError> {
        self.add_endpoint(name.to_owned(), type_tag)
    }

    // ── Lookup ──────────────────────────────────────────────────

    fn input_for(&self, handle: InterfaceHandle) -> Result<Input, InterfaceError> {
        let slot = self.values.inputs.get(handle)?;
        Ok(slot.wrapper(handle, self.values.inputs.name(handle)?))
    }

    /// A fresh wrapper for the input registered as `name` (full or local).
    pub fn input(&self, name: &str) -> Result<Input, InterfaceError> {
        let handle = self
            .resolve(&self.values.inputs, name)
            .ok_or_else(|| Self::unknown(name))?;
        self.input_for(handle)
    }

    /// A fresh wrapper for the `index`-th live input in registration order.
    pub fn input_at(&self, index: usize) -> Result<Input, InterfaceError> {
        let handle = self
            .values
            .inputs
            .handle_at(index)
            .ok_or_else(|| Self::unknown(format!("input #{index}")))?;
        self.input_for(handle)
    }

    /// A fresh wrapper for the first input whose first source is `target`.
    pub fn subscription(&self, target: &str) -> Result<Input, InterfaceError> {
        let full = self
            .find_publication(target)
            .and_then(|p| self.values.publications.name(p).ok());
        let handle = self
            .values
            .inputs
            .iter()
            .find(|(_, slot)| {
                slot.sources
                    .first()
                    .is_some_and(|s| s.target == target || Some(s.target.as_str()) == full)
            })
            .map(|(handle, _)| handle)
            .ok_or_else(|| Self::unknown(target))?;
        self.input_for(handle)
    }

    fn publication_for(&self, handle: InterfaceHandle) -> Result<Publication, InterfaceError> {
        let slot = self.values.publications.get(handle)?;
        let name = self.values.publications.name(handle)?;
        Ok(Publication::new(handle, name, slot.kind, &slot.units))
    }

    /// A fresh wrapper for the publication registered as `name`.
    pub fn publication(&self, name: &str) -> Result<Publication, InterfaceError> {
        let handle = self.find_publication(name).ok_or_else(|| Self::unknown(name))?;
        self.publication_for(handle)
    }

    /// A fresh wrapper for the `index`-th live publication.
    pub fn publication_at(&self, index: usize) -> Result<Publication, InterfaceError> {
        let handle = self
            .values
            .publications
            .handle_at(index)
            .ok_or_else(|| Self::unknown(format!("publication #{index}")))?;
        self.publication_for(handle)
    }

    fn endpoint_for(&self, handle: InterfaceHandle) -> Result<Endpoint, InterfaceError> {
        Ok(Endpoint::new(handle, self.messages.endpoints.name(handle)?))
    }

    /// A fresh wrapper for the endpoint registered as `name`.
    pub fn endpoint(&self, name: &str) -> Result<Endpoint, InterfaceError> {
        let handle = self.find_endpoint(name).ok_or_else(|| Self::unknown(name))?;
        self.endpoint_for(handle)
    }

    /// A fresh wrapper for the `index`-th live endpoint.
    pub fn endpoint_at(&self, index: usize) -> Result<Endpoint, InterfaceError> {
        let handle = self
            .messages
            .endpoints
            .handle_at(index)
            .ok_or_else(|| Self::unknown(format!("endpoint #{index}")))?;
        self.endpoint_for(handle)
    }

    /// Number of live inputs.
    pub fn input_count(&self) -> usize {
        self.values.inputs.len()
    }

    /// Number of live publications.
    pub fn publication_count(&self) -> usize {
        self.values.publications.len()
    }

    /// Number of live endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.messages.endpoints.len()
    }

    /// Filters recorded on an endpoint.
    pub fn filters(&self, endpoint: &Endpoint) -> Result<EndpointFilters<'_>, InterfaceError> {
        let slot = self.messages.endpoints.get(endpoint.handle())?;
        Ok(EndpointFilters {
            source: &slot.source_filters,
            destination: &slot.destination_filters,
        })
    }

    // ── Publishing ──────────────────────────────────────────────

    /// Queue a value from a publication for the next time grant.
    ///
    /// The value is converted to the publication's declared kind. With
    /// only-transmit-on-change set, a value within the publication's
    /// minimum change of the last one sent is dropped.
    pub fn publish(&mut self, publication: InterfaceHandle, value: Value) -> Result<(), InterfaceError> {
        self.require_active("publish")?;
        let name = self.values.publications.name(publication)?.to_owned();
        let slot = self.values.publications.get_mut(publication)?;
        let value = match slot.kind {
            Some(kind) => convert_owned(value, kind)?,
            None => value,
        };
        if slot.options.flag(HandleOption::OnlyTransmitOnChange) {
            if let Some(last) = &slot.last_sent {
                if !change_detected(last, &value, slot.delta) {
                    self.metrics.publications_suppressed += 1;
                    return Ok(());
                }
            }
        }
        let pending = PendingValue {
            publication,
            name,
            type_name: slot.type_name.clone(),
            units: slot.units.clone(),
            kind: value.kind(),
            payload: encode(&value),
        };
        slot.last_sent = Some(value);
        debug!(publication = %pending.name, kind = %pending.kind, "value queued");
        self.values.pending.push(pending);
        self.metrics.values_published += 1;
        Ok(())
    }

    /// Set the minimum change a publication must see before it transmits.
    ///
    /// A non-negative delta turns only-transmit-on-change on; a negative
    /// one turns it off.
    pub fn set_publication_minimum_change(
        &mut self,
        publication: InterfaceHandle,
        delta: f64,
    ) -> Result<(), InterfaceError> {
        let slot = self.values.publications.get_mut(publication)?;
        slot.delta = delta.max(0.0);
        slot.options
            .set(HandleOption::OnlyTransmitOnChange, i32::from(delta >= 0.0));
        Ok(())
    }

    // ── Lifecycle and time ──────────────────────────────────────

    /// Leave startup: check connections, deliver everything queued so far
    /// at time zero and dispatch callbacks.
    #[instrument(skip(self), fields(federate = %self.config.name))]
    pub fn enter_executing_mode(&mut self) -> Result<(), InterfaceError> {
        self.require_startup("enter_executing_mode")?;
        self.check_connections()?;
        self.state = FederateState::Executing;
        info!("entered executing mode");
        self.apply_deliveries(Time::ZERO);
        self.dispatch_callbacks(Time::ZERO);
        Ok(())
    }

    /// Advance to `requested` (never backwards), apply every delivery due by
    /// then, and run callbacks. Returns the granted time.
    ///
    /// Called in startup, enters executing mode first. A failing input
    /// callback read does not fail the grant; see
    /// [`FederateMetrics::callback_errors`].
    #[instrument(skip(self), fields(federate = %self.config.name))]
    pub fn request_time(&mut self, requested: Time) -> Result<Time, InterfaceError> {
        self.require_active("request_time")?;
        if self.state == FederateState::Startup {
            self.enter_executing_mode()?;
        }
        let granted = requested.max(self.current_time);
        self.current_time = granted;
        self.apply_deliveries(granted);
        self.dispatch_callbacks(granted);
        self.metrics.time_grants += 1;
        debug!(%granted, "time granted");
        Ok(granted)
    }

    /// End the run. Queued values and messages that were never delivered
    /// are discarded. Idempotent.
    pub fn finalize(&mut self) {
        if self.state == FederateState::Finalized {
            return;
        }
        let undelivered = self.values.pending.len() + self.messages.outbound.len();
        self.values.pending.clear();
        self.messages.outbound.clear();
        self.state = FederateState::Finalized;
        info!(federate = %self.config.name, undelivered, "federate finalized");
    }

    /// Resolve every input source against local publications and check
    /// type, unit and connection-required constraints.
    fn check_connections(&mut self) -> Result<(), InterfaceError> {
        let ignore_units = self.config.ignore_unit_mismatch;
        let resolved: Vec<_> = self
            .values
            .inputs
            .handles()
            .into_iter()
            .filter_map(|handle| {
                let slot = self.values.inputs.get(handle).ok()?;
                let found = slot
                    .sources
                    .iter()
                    .map(|s| self.find_publication(&s.target))
                    .collect::<Vec<_>>();
                Some((handle, found))
            })
            .collect();
        for (handle, found) in resolved {
            let mut described = Vec::with_capacity(found.len());
            for publication in &found {
                described.push(match publication {
                    Some(p) => {
                        let slot = self.values.publications.get(*p)?;
                        let name = self.values.publications.name(*p)?;
                        Some((name.to_owned(), slot.type_name.clone(), slot.units.clone()))
                    }
                    None => None,
                });
            }
            let name = self.values.inputs.name(handle)?.to_owned();
            let slot = self.values.inputs.get_mut(handle)?;
            let mut changed = false;
            for (source, info) in slot.sources.iter_mut().zip(&described) {
                let Some((target, type_name, units)) = info else {
                    continue;
                };
                if source.target != *target || source.type_name != *type_name || source.units != *units {
                    source.target.clone_from(target);
                    source.type_name.clone_from(type_name);
                    source.units.clone_from(units);
                    changed = true;
                }
            }
            if changed {
                slot.epoch += 1;
            }
            for source in &slot.sources {
                slot.check_connection(source, ignore_units)?;
            }
            let connected = described.iter().any(Option::is_some);
            if !connected && slot.options.flag(HandleOption::ConnectionRequired) {
                return Err(InterfaceError::ConfigurationError {
                    reason: format!("input '{name}' requires a connection"),
                });
            }
        }
        for (handle, slot) in self.values.publications.iter() {
            if !slot.options.flag(HandleOption::ConnectionRequired) {
                continue;
            }
            let name = self.values.publications.name(handle)?;
            if !self.values.has_listener(name) && self.messages.subscribers(name).is_empty() {
                return Err(InterfaceError::ConfigurationError {
                    reason: format!("publication '{name}' requires a connection"),
                });
            }
        }
        Ok(())
    }

    fn apply_deliveries(&mut self, time: Time) {
        let pending = std::mem::take(&mut self.values.pending);
        for delivery in &pending {
            self.metrics.values_delivered += self.values.deliver(delivery, time);
            for (handle, name) in self.messages.subscribers(&delivery.name) {
                let id = self.messages.next_id();
                let message =
                    Message::new(delivery.name.as_str(), name, delivery.payload.clone(), time)
                        .with_id(id);
                self.enqueue(handle, message, time);
            }
        }
        for Outbound { message, .. } in self.messages.take_ready(time) {
            match self.find_endpoint(message.destination()) {
                Some(handle) => self.enqueue(handle, message, time),
                None => {
                    warn!(
                        source = message.source(),
                        destination = message.destination(),
                        "dropping message for unknown endpoint"
                    );
                    self.metrics.messages_dropped += 1;
                }
            }
        }
    }

    fn enqueue(&mut self, handle: InterfaceHandle, message: Message, time: Time) {
        let capacity = self.config.endpoint_queue_capacity;
        let Ok(slot) = self.messages.endpoints.get_mut(handle) else {
            self.metrics.messages_dropped += 1;
            return;
        };
        if slot.queue.len() >= capacity {
            warn!(
                destination = message.destination(),
                capacity, "endpoint queue full, dropping message"
            );
            self.metrics.messages_dropped += 1;
            return;
        }
        slot.queue.push_back(message.with_receive_time(time));
        slot.arrived = true;
        self.metrics.messages_delivered += 1;
    }

    /// Input callbacks in registration order, then endpoint callbacks for
    /// endpoints that received messages. An endpoint without its own
    /// callback falls back to the federate-wide one. An input callback whose
    /// read fails is skipped and counted; the rest still run.
    fn dispatch_callbacks(&mut self, time: Time) {
        for handle in self.values.inputs.handles() {
            let Ok(slot) = self.values.inputs.get_mut(handle) else {
                continue;
            };
            let mode: MultiInputMode = slot.mode();
            let Some((input, mut callback)) = slot.callback.take() else {
                continue;
            };
            let mut input = input.with_mode(mode);
            let fired = input.handle_callback(self, &mut callback, time);
            if let Ok(slot) = self.values.inputs.get_mut(handle) {
                if slot.callback.is_none() {
                    slot.callback = Some((input, callback));
                }
            }
            match fired {
                Ok(true) => self.metrics.callbacks_fired += 1,
                Ok(false) => {}
                Err(e) => {
                    self.metrics.callback_errors += 1;
                    warn!(%handle, %time, error = %e, "input callback read failed");
                }
            }
        }
        for handle in self.messages.endpoints.handles() {
            let Ok(slot) = self.messages.endpoints.get_mut(handle) else {
                continue;
            };
            if !std::mem::take(&mut slot.arrived) {
                continue;
            }
            let own = slot.callback.take();
            let Ok(endpoint) = self.endpoint_for(handle) else {
                continue;
            };
            match own {
                Some(mut callback) => {
                    callback(&endpoint, time);
                    if let Ok(slot) = self.messages.endpoints.get_mut(handle) {
                        if slot.callback.is_none() {
                            slot.callback = Some(callback);
                        }
                    }
                }
                None => match self.messages.federate_callback.as_mut() {
                    Some(callback) => callback(&endpoint, time),
                    None => continue,
                },
            }
            self.metrics.callbacks_fired += 1;
        }
    }
}

impl fmt::Debug for Federate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Federate")
            .field("name", &self.config.name)
            .field("id", &self.id)
            .field("state", &self.state)
            .field("current_time", &self.current_time)
            .field("inputs", &self.values.inputs.len())
            .field("publications", &self.values.publications.len())
            .field("endpoints", &self.messages.endpoints.len())
            .finish()
    }
}

// ── InterfaceManager ───────────────────────────────────────────────

impl InterfaceManager for Federate {
    fn interface_name(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        match handle.kind() {
            InterfaceKind::Input => self.values.inputs.name(handle),
            InterfaceKind::Publication => self.values.publications.name(handle),
            InterfaceKind::Endpoint => self.messages.endpoints.name(handle),
        }
    }

    fn info(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        Ok(match handle.kind() {
            InterfaceKind::Input => self.values.inputs.get(handle)?.info.as_str(),
            InterfaceKind::Publication => self.values.publications.get(handle)?.info.as_str(),
            InterfaceKind::Endpoint => self.messages.endpoints.get(handle)?.info.as_str(),
        })
    }

    fn set_info(&mut self, handle: InterfaceHandle, info: &str) -> Result<(), InterfaceError> {
        let target = match handle.kind() {
            InterfaceKind::Input => &mut self.values.inputs.get_mut(handle)?.info,
            InterfaceKind::Publication => &mut self.values.publications.get_mut(handle)?.info,
            InterfaceKind::Endpoint => &mut self.messages.endpoints.get_mut(handle)?.info,
        };
        info.clone_into(target);
        Ok(())
    }

    fn option(&self, handle: InterfaceHandle, option: HandleOption) -> Result<i32, InterfaceError> {
        Ok(match handle.kind() {
            InterfaceKind::Input => self.values.inputs.get(handle)?.options.get(option),
            InterfaceKind::Publication => self.values.publications.get(handle)?.options.get(option),
            InterfaceKind::Endpoint => self.messages.endpoints.get(handle)?.options.get(option),
        })
    }

    fn set_option(
        &mut self,
        handle: InterfaceHandle,
        option: HandleOption,
        value: i32,
    ) -> Result<(), InterfaceError> {
        match handle.kind() {
            InterfaceKind::Input => {
                let slot = self.values.inputs.get_mut(handle)?;
                if option == HandleOption::MultiInputHandling {
                    let mode = MultiInputMode::from_code(value).ok_or_else(|| {
                        InterfaceError::ConfigurationError {
                            reason: format!("unknown multi-input mode code {value}"),
                        }
                    })?;
                    if mode == MultiInputMode::None && slot.sources.len() > 1 {
                        return Err(InterfaceError::ConfigurationError {
                            reason: format!(
                                "input with {} sources needs a multi-input mode other than none",
                                slot.sources.len()
                            ),
                        });
                    }
                }
                slot.options.set(option, value);
            }
            InterfaceKind::Publication => {
                self.values.publications.get_mut(handle)?.options.set(option, value);
            }
            InterfaceKind::Endpoint => {
                self.messages.endpoints.get_mut(handle)?.options.set(option, value);
            }
        }
        Ok(())
    }

    fn close_interface(&mut self, handle: InterfaceHandle) -> Result<(), InterfaceError> {
        let dropped = match handle.kind() {
            InterfaceKind::Input => usize::from(self.values.inputs.remove(handle)?.updated),
            InterfaceKind::Publication => {
                self.values.publications.remove(handle)?;
                self.values.drop_pending_from(handle)
            }
            InterfaceKind::Endpoint => {
                let slot = self.messages.endpoints.remove(handle)?;
                slot.queue.len() + self.messages.drop_outbound_from(handle)
            }
        };
        self.metrics.deliveries_dropped_on_close += dropped as u64;
        debug!(%handle, dropped, "interface closed");
        Ok(())
    }
}
