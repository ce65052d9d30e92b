//! The value [`Input`] and its read/update protocol.
//!
//! # Read protocol
//!
//! A typed read ([`Input::get_value`]) consults the manager's update flag
//! for the input. When no delivery is pending, and no locally noted update
//! may be taken directly, the cached value is converted to the requested
//! kind and returned. Otherwise the input:
//!
//! 1. refreshes its cached source information if the source set changed,
//! 2. decodes the latest delivery (or aggregates every source's latest
//!    delivery), scaling numeric values between source and output units,
//! 3. with change detection on, converts the candidate to the requested
//!    kind and replaces the cache only if it moved by at least the
//!    minimum delta; with change detection off, always replaces the cache,
//! 4. clears the manager's update flag.
//!
//! [`Input::is_updated`] and [`Input::check_update`] may consume a delivery
//! in the same way. [`Input::peek_updated`] never does: with change
//! detection on it can report an update that a subsequent read would
//! discard as too small.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;
use tracing::warn;

use skein_core::change::change_detected;
use skein_core::codec;
use skein_core::convert::{convert, to_bool, to_double};
use skein_core::{InterfaceError, InterfaceHandle, Time, Unit, Value, ValueKind};

use crate::aggregate::{aggregate, MultiInputMode};
use crate::callback::InputCallback;
use crate::manager::{InputSource, SourceData, ValueManager};
use crate::options::HandleOption;
use crate::typed::PrimaryValue;

/// A subscription that consumes published values.
///
/// Cheap to clone. Each clone keeps its own cache (last value, thresholds,
/// pending-update flag), so two clones of one interface may disagree until
/// each reads. Equality, ordering and hashing use the handle only.
#[derive(Clone, Debug)]
pub struct Input {
    handle: InterfaceHandle,
    name: String,
    target_kind: Option<ValueKind>,
    injection_kind: Option<ValueKind>,
    last_value: Value,
    change_detection: bool,
    delta: f64,
    threshold: Option<f64>,
    output_units: Option<Unit>,
    source_units: SmallVec<[Option<Unit>; 2]>,
    source_epoch: Option<u64>,
    mode: MultiInputMode,
    has_update: bool,
}

fn parse_units(text: &str) -> Option<Unit> {
    if text.trim().is_empty() {
        return None;
    }
    match Unit::parse(text) {
        Ok(unit) => Some(unit),
        Err(e) => {
            warn!(units = text, error = %e, "ignoring unparseable units");
            None
        }
    }
}

impl Input {
    /// Build a wrapper for a registered input. Called by managers.
    ///
    /// `target_kind` is the kind the input was registered with (`None` for
    /// an unspecified type); the cache starts at that kind's zero value.
    #[doc(hidden)]
    pub fn new(
        handle: InterfaceHandle,
        name: impl Into<String>,
        target_kind: Option<ValueKind>,
        units: &str,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            target_kind,
            injection_kind: None,
            last_value: Value::zero(target_kind.unwrap_or(ValueKind::Double)),
            change_detection: false,
            delta: 0.0,
            threshold: None,
            output_units: parse_units(units),
            source_units: SmallVec::new(),
            source_epoch: None,
            mode: MultiInputMode::None,
            has_update: false,
        }
    }

    /// Set the aggregation mode without consulting a manager.
    #[doc(hidden)]
    pub fn with_mode(mut self, mode: MultiInputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Seed the cache without consulting a manager.
    #[doc(hidden)]
    pub fn with_default(mut self, value: Value) -> Self {
        self.last_value = value;
        self
    }

    /// Enable change detection without consulting a manager.
    #[doc(hidden)]
    pub fn with_change_detection(mut self, enabled: bool) -> Self {
        self.change_detection = enabled;
        self
    }

    // ── Identity ────────────────────────────────────────────────

    /// The interface handle.
    pub fn handle(&self) -> InterfaceHandle {
        self.handle
    }

    /// Whether the handle is not the invalid sentinel.
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// The registered name; empty for anonymous subscriptions.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered name, or the first target for anonymous inputs.
    pub fn display_name<'m, M: ValueManager + ?Sized>(&'m self, manager: &'m M) -> &'m str {
        if self.name.is_empty() {
            manager.target(self.handle).unwrap_or_default()
        } else {
            &self.name
        }
    }

    /// Kind requested at registration, if any.
    pub fn target_kind(&self) -> Option<ValueKind> {
        self.target_kind
    }

    /// Kind of the current source, once a read has inspected it.
    pub fn injection_kind(&self) -> Option<ValueKind> {
        self.injection_kind
    }

    /// Output units, if declared and parseable.
    pub fn output_units(&self) -> Option<&Unit> {
        self.output_units.as_ref()
    }

    /// The aggregation mode.
    pub fn multi_input_mode(&self) -> MultiInputMode {
        self.mode
    }

    /// The cached value, without consulting the manager.
    pub fn last_value(&self) -> &Value {
        &self.last_value
    }

    // ── Local configuration ─────────────────────────────────────

    /// Set the minimum change that counts as an update.
    ///
    /// A non-negative delta enables change detection; a negative one
    /// disables it.
    pub fn set_minimum_change(&mut self, delta: f64) {
        self.change_detection = delta >= 0.0;
        self.delta = delta.max(0.0);
    }

    /// The minimum change that counts as an update.
    pub fn minimum_change(&self) -> f64 {
        self.delta
    }

    /// Turn change detection on or off, keeping the delta.
    pub fn enable_change_detection(&mut self, enabled: bool) {
        self.change_detection = enabled;
    }

    /// Whether change detection is on.
    pub fn change_detection_enabled(&self) -> bool {
        self.change_detection
    }

    /// Threshold for reading numbers as booleans: with one set, a number is
    /// true when strictly greater than it; otherwise when nonzero.
    pub fn set_threshold(&mut self, threshold: Option<f64>) {
        self.threshold = threshold;
    }

    /// The boolean threshold.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    // ── Manager-backed configuration ────────────────────────────

    /// Set the value returned before the first update. Stored as given.
    pub fn set_default<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        value: impl Into<Value>,
    ) -> Result<(), InterfaceError> {
        let value = value.into();
        manager.set_default_value(self.handle, &value)?;
        self.last_value = value;
        Ok(())
    }

    /// Set the aggregation mode.
    ///
    /// [`MultiInputMode::None`] on an input with several sources fails with
    /// [`InterfaceError::ConfigurationError`].
    pub fn set_multi_input_mode<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        mode: MultiInputMode,
    ) -> Result<(), InterfaceError> {
        self.set_option(manager, HandleOption::MultiInputHandling, mode.code())
    }

    /// Set an option. Options that affect reading are mirrored locally.
    pub fn set_option<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        option: HandleOption,
        value: i32,
    ) -> Result<(), InterfaceError> {
        manager.set_option(self.handle, option, value)?;
        match option {
            HandleOption::MultiInputHandling => {
                if let Some(mode) = MultiInputMode::from_code(value) {
                    self.mode = mode;
                }
            }
            HandleOption::OnlyUpdateOnChange => self.change_detection = value != 0,
            _ => {}
        }
        Ok(())
    }

    /// Read an option.
    pub fn option<M: ValueManager + ?Sized>(
        &self,
        manager: &M,
        option: HandleOption,
    ) -> Result<i32, InterfaceError> {
        manager.option(self.handle, option)
    }

    /// Add a source by publication name.
    pub fn add_target<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        target: &str,
    ) -> Result<(), InterfaceError> {
        manager.add_target(self.handle, target)?;
        self.source_epoch = None;
        Ok(())
    }

    /// Remove a source by publication name.
    pub fn remove_target<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        target: &str,
    ) -> Result<(), InterfaceError> {
        manager.remove_target(self.handle, target)?;
        self.source_epoch = None;
        Ok(())
    }

    /// Register an update callback, replacing any previous one.
    pub fn set_callback<M: ValueManager + ?Sized>(
        &self,
        manager: &mut M,
        callback: InputCallback,
    ) -> Result<(), InterfaceError> {
        manager.set_input_callback(self, callback)
    }

    /// Register a plain notification callback.
    pub fn set_notification_callback<M: ValueManager + ?Sized>(
        &self,
        manager: &mut M,
        f: impl FnMut(Time) + Send + 'static,
    ) -> Result<(), InterfaceError> {
        manager.set_input_callback(self, InputCallback::notify(f))
    }

    /// Register a callback receiving the value as `X`.
    pub fn set_value_callback<X: PrimaryValue, M: ValueManager + ?Sized>(
        &self,
        manager: &mut M,
        f: impl FnMut(X, Time) + Send + 'static,
    ) -> Result<(), InterfaceError> {
        manager.set_input_callback(self, X::callback(f))
    }

    /// Close the input. Every later operation fails with
    /// [`InterfaceError::InvalidHandle`].
    pub fn close<M: ValueManager + ?Sized>(&self, manager: &mut M) -> Result<(), InterfaceError> {
        manager.close_interface(self.handle)
    }

    // ── Manager-backed queries ──────────────────────────────────

    /// Full registered name.
    pub fn key<'m, M: ValueManager + ?Sized>(&self, manager: &'m M) -> Result<&'m str, InterfaceError> {
        manager.interface_name(self.handle)
    }

    /// First source name, or empty.
    pub fn target<'m, M: ValueManager + ?Sized>(
        &self,
        manager: &'m M,
    ) -> Result<&'m str, InterfaceError> {
        manager.target(self.handle)
    }

    /// Declared type of the first source.
    pub fn injection_type<'m, M: ValueManager + ?Sized>(
        &self,
        manager: &'m M,
    ) -> Result<&'m str, InterfaceError> {
        manager.injection_type(self.handle)
    }

    /// Declared units of the first source.
    pub fn injection_units<'m, M: ValueManager + ?Sized>(
        &self,
        manager: &'m M,
    ) -> Result<&'m str, InterfaceError> {
        manager.injection_units(self.handle)
    }

    /// Registered type of this input.
    pub fn extraction_type<'m, M: ValueManager + ?Sized>(
        &self,
        manager: &'m M,
    ) -> Result<&'m str, InterfaceError> {
        manager.extraction_type(self.handle)
    }

    /// Registered units of this input.
    pub fn units<'m, M: ValueManager + ?Sized>(
        &self,
        manager: &'m M,
    ) -> Result<&'m str, InterfaceError> {
        manager.extraction_units(self.handle)
    }

    /// Info string.
    pub fn info<'m, M: ValueManager + ?Sized>(&self, manager: &'m M) -> Result<&'m str, InterfaceError> {
        manager.info(self.handle)
    }

    /// Replace the info string.
    pub fn set_info<M: ValueManager + ?Sized>(
        &self,
        manager: &mut M,
        info: &str,
    ) -> Result<(), InterfaceError> {
        manager.set_info(self.handle, info)
    }

    /// Time of the most recent delivery.
    pub fn last_update_time<M: ValueManager + ?Sized>(
        &self,
        manager: &M,
    ) -> Result<Time, InterfaceError> {
        manager.last_update_time(self.handle)
    }

    // ── Update protocol ─────────────────────────────────────────

    fn allow_direct_update(&self) -> bool {
        self.has_update && !self.change_detection && self.mode == MultiInputMode::None
    }

    /// Check for an update, loading it into the cache when change detection
    /// is on. With `assume_update`, skip asking whether a delivery arrived.
    pub fn check_update<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        assume_update: bool,
    ) -> Result<bool, InterfaceError> {
        let updated = manager.input_source(self.handle)?.source_updated();
        if self.change_detection {
            if (assume_update || updated) && self.load(manager, self.last_value.kind())? {
                self.has_update = true;
            }
        } else {
            self.has_update = self.has_update || assume_update || updated;
        }
        Ok(self.has_update)
    }

    /// Whether an update is available. May consume the delivery when change
    /// detection is on.
    pub fn is_updated<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
    ) -> Result<bool, InterfaceError> {
        if self.has_update {
            manager.input_source(self.handle)?;
            return Ok(true);
        }
        self.check_update(manager, false)
    }

    /// Whether an update is available, without touching any state.
    pub fn peek_updated<M: ValueManager + ?Sized>(&self, manager: &M) -> Result<bool, InterfaceError> {
        let updated = manager.input_source(self.handle)?.source_updated();
        Ok(self.has_update || updated)
    }

    /// Drop any pending update, locally and in the manager.
    pub fn clear_update<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
    ) -> Result<(), InterfaceError> {
        self.has_update = false;
        manager.clear_input_update(self.handle)
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Read the value as `kind`.
    pub fn get_value<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        kind: ValueKind,
    ) -> Result<Value, InterfaceError> {
        let updated = manager.input_source(self.handle)?.source_updated();
        if updated || self.allow_direct_update() {
            self.load(manager, kind)?;
        }
        self.has_update = false;
        self.convert_for(&self.last_value, kind)
    }

    /// Read the value as `X`.
    pub fn value<X: PrimaryValue, M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
    ) -> Result<X, InterfaceError> {
        let value = self.get_value(manager, X::KIND)?;
        X::from_value(value).ok_or_else(|| InterfaceError::TypeMismatch {
            from: String::from("value"),
            to: X::KIND.name().to_owned(),
        })
    }

    /// Take the raw payload of the first source that has delivered,
    /// consuming the update.
    pub fn raw_value<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
    ) -> Result<Option<(ValueKind, Vec<u8>)>, InterfaceError> {
        let raw = first_delivery(manager.input_source(self.handle)?)
            .map(|(_, data)| (data.kind, data.payload.to_vec()));
        manager.clear_input_update(self.handle)?;
        self.has_update = false;
        Ok(raw)
    }

    /// Size of the first source's raw payload; `0` before any delivery.
    pub fn raw_size<M: ValueManager + ?Sized>(&self, manager: &M) -> Result<usize, InterfaceError> {
        let source = manager.input_source(self.handle)?;
        Ok(first_delivery(source).map_or(0, |(_, data)| data.payload.len()))
    }

    /// Length of the value's text form, without consuming the update.
    pub fn string_size<M: ValueManager + ?Sized>(&self, manager: &M) -> Result<usize, InterfaceError> {
        let source = manager.input_source(self.handle)?;
        match first_delivery(source) {
            Some((_, data)) if source.source_updated() => {
                Ok(codec::string_size(data.kind, data.payload)?)
            }
            _ => Ok(self.convert_for(&self.last_value, ValueKind::String).map_or(0, |v| match v {
                Value::String(s) => s.len(),
                _ => 0,
            })),
        }
    }

    /// Element count of the value read as a vector, without consuming the
    /// update.
    pub fn vector_size<M: ValueManager + ?Sized>(&self, manager: &M) -> Result<usize, InterfaceError> {
        let source = manager.input_source(self.handle)?;
        match first_delivery(source) {
            Some((_, data)) if source.source_updated() && self.mode == MultiInputMode::None => {
                Ok(codec::vector_size(data.kind, data.payload)?)
            }
            _ => match self.convert_for(&self.last_value, ValueKind::Vector)? {
                Value::Vector(v) => Ok(v.len()),
                _ => Ok(0),
            },
        }
    }

    // ── Callback dispatch ───────────────────────────────────────

    /// Run `callback` if this input has an update satisfying its change
    /// detection. Called by the manager on its own copy of the input once
    /// all deliveries for `time` are applied.
    ///
    /// Typed callbacks consume the update; plain notifications leave it for
    /// the caller's own read. Returns whether the callback ran.
    #[doc(hidden)]
    pub fn handle_callback<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        callback: &mut InputCallback,
        time: Time,
    ) -> Result<bool, InterfaceError> {
        let Some(kind) = callback.kind() else {
            if !self.update_passes(&*manager)? {
                return Ok(false);
            }
            if let InputCallback::Notify(f) = callback {
                f(time);
            }
            return Ok(true);
        };
        if !self.is_updated(manager)? {
            return Ok(false);
        }
        let value = self.get_value(manager, kind)?;
        match (callback, value) {
            (InputCallback::Double(f), Value::Double(v)) => f(v, time),
            (InputCallback::Int(f), Value::Int(v)) => f(v, time),
            (InputCallback::String(f), Value::String(v)) => f(v, time),
            (InputCallback::Complex(f), Value::Complex(v)) => f(v, time),
            (InputCallback::Bool(f), Value::Bool(v)) => f(v, time),
            (InputCallback::Time(f), Value::Time(v)) => f(v, time),
            (InputCallback::NamedPoint(f), Value::NamedPoint(v)) => f(v, time),
            (InputCallback::Vector(f), Value::Vector(v)) => f(v, time),
            (InputCallback::ComplexVector(f), Value::ComplexVector(v)) => f(v, time),
            // get_value always yields the requested kind
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Whether a pending delivery passes change detection, without clearing
    /// the manager's flag.
    fn update_passes<M: ValueManager + ?Sized>(&mut self, manager: &M) -> Result<bool, InterfaceError> {
        let source = manager.input_source(self.handle)?;
        if !source.source_updated() {
            return Ok(false);
        }
        if !self.change_detection {
            return Ok(true);
        }
        let compare = self.last_value.kind();
        match self.fetch(source)? {
            Some(candidate) => self.store(candidate, compare),
            None => Ok(false),
        }
    }

    // ── Internals ───────────────────────────────────────────────

    /// Fetch, store, and clear the manager's flag. Returns whether the cache
    /// changed.
    fn load<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        compare: ValueKind,
    ) -> Result<bool, InterfaceError> {
        let candidate = self.fetch(manager.input_source(self.handle)?)?;
        manager.clear_input_update(self.handle)?;
        match candidate {
            Some(candidate) => self.store(candidate, compare),
            None => Ok(false),
        }
    }

    fn store(&mut self, candidate: Value, compare: ValueKind) -> Result<bool, InterfaceError> {
        if !self.change_detection {
            self.last_value = candidate;
            return Ok(true);
        }
        let candidate = self.convert_for(&candidate, compare)?;
        if change_detected(&self.last_value, &candidate, self.delta) {
            self.last_value = candidate;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// The candidate value from the current deliveries, if any.
    fn fetch(&mut self, source: &dyn InputSource) -> Result<Option<Value>, InterfaceError> {
        self.load_source_information(source);
        if self.mode == MultiInputMode::None {
            let Some((index, data)) = first_delivery(source) else {
                return Ok(None);
            };
            self.injection_kind = Some(data.kind);
            return self.decode_source(index, data).map(Some);
        }
        let mut values: SmallVec<[Value; 4]> = SmallVec::new();
        for index in 0..source.source_count() {
            if let Some(data) = source.source_data(index) {
                if self.injection_kind.is_none() {
                    self.injection_kind = Some(data.kind);
                }
                values.push(self.decode_source(index, data)?);
            }
        }
        aggregate(self.mode, &values, self.threshold).map(Some)
    }

    fn load_source_information(&mut self, source: &dyn InputSource) {
        let epoch = source.source_epoch();
        if self.source_epoch == Some(epoch) {
            return;
        }
        self.source_epoch = Some(epoch);
        self.injection_kind = None;
        self.source_units = (0..source.source_count())
            .map(|i| parse_units(source.source_units(i)))
            .collect();
    }

    fn decode_source(&self, index: usize, data: SourceData<'_>) -> Result<Value, InterfaceError> {
        let value = codec::decode(data.kind, data.payload)?;
        let from = self.source_units.get(index).and_then(Option::as_ref);
        match (from, &self.output_units) {
            (Some(from), Some(to)) if value.kind().is_numeric() && from != to => {
                Ok(Value::Double(from.convert(to_double(&value)?, to)?))
            }
            _ => Ok(value),
        }
    }

    fn convert_for(&self, value: &Value, kind: ValueKind) -> Result<Value, InterfaceError> {
        if kind == ValueKind::Bool {
            return Ok(Value::Bool(to_bool(value, self.threshold)?));
        }
        Ok(convert(value, kind)?)
    }
}

fn first_delivery(source: &dyn InputSource) -> Option<(usize, SourceData<'_>)> {
    (0..source.source_count()).find_map(|i| source.source_data(i).map(|d| (i, d)))
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Input {}

impl PartialOrd for Input {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Input {
    fn cmp(&self, other: &Self) -> Ordering {
        self.handle.cmp(&other.handle)
    }
}

impl Hash for Input {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockValues;
    use skein_core::{Complex, NamedPoint};

    #[test]
    fn reads_default_before_any_delivery() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "");
        input.set_default(&mut m, 2.5).unwrap();
        assert_eq!(input.get_value(&mut m, ValueKind::Double), Ok(Value::Double(2.5)));
        assert_eq!(input.get_value(&mut m, ValueKind::Int), Ok(Value::Int(2)));
        assert!(!input.peek_updated(&m).unwrap());
    }

    #[test]
    fn default_keeps_the_given_kind() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "");
        input.set_default(&mut m, "idle").unwrap();
        assert_eq!(input.last_value(), &Value::String("idle".into()));
        assert_eq!(m.default_value, Some(Value::String("idle".into())));
    }

    #[test]
    fn delivery_converts_to_any_requested_kind() {
        let (mut m, mut input) = MockValues::single(None, "");
        m.deliver(0, Value::Int(42));
        assert!(input.is_updated(&mut m).unwrap());
        assert_eq!(input.get_value(&mut m, ValueKind::String), Ok(Value::String("42".into())));
        assert_eq!(input.injection_kind(), Some(ValueKind::Int));
        assert!(!input.is_updated(&mut m).unwrap());
        assert_eq!(input.value::<f64, _>(&mut m), Ok(42.0));
        assert_eq!(
            input.value::<Vec<Complex>, _>(&mut m),
            Ok(vec![Complex::new(42.0, 0.0)])
        );
    }

    #[test]
    fn undefined_conversion_is_a_type_mismatch() {
        let (mut m, mut input) = MockValues::single(None, "");
        m.deliver(0, Value::NamedPoint(NamedPoint::new("x", 1.0)));
        assert_eq!(
            input.get_value(&mut m, ValueKind::Complex),
            Err(InterfaceError::TypeMismatch {
                from: "named_point".into(),
                to: "complex".into()
            })
        );
    }

    #[test]
    fn change_detection_suppresses_small_moves() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "");
        input.set_minimum_change(0.5);
        m.deliver(0, Value::Double(1.0));
        assert!(input.is_updated(&mut m).unwrap());
        assert_eq!(input.get_value(&mut m, ValueKind::Double), Ok(Value::Double(1.0)));

        for v in [1.1, 1.3, 0.8, 1.45] {
            m.deliver(0, Value::Double(v));
            assert!(!input.is_updated(&mut m).unwrap(), "{v}");
            assert_eq!(input.get_value(&mut m, ValueKind::Double), Ok(Value::Double(1.0)));
        }

        m.deliver(0, Value::Double(1.5));
        assert!(input.is_updated(&mut m).unwrap());
        assert_eq!(input.get_value(&mut m, ValueKind::Double), Ok(Value::Double(1.5)));
    }

    #[test]
    fn peek_does_not_consume() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "");
        input.set_minimum_change(10.0);
        m.deliver(0, Value::Double(1.0));
        // The delivery is below the delta, but peeking cannot know that.
        assert!(input.peek_updated(&m).unwrap());
        assert!(input.peek_updated(&m).unwrap());
        assert!(!input.is_updated(&mut m).unwrap());
        assert!(!input.peek_updated(&m).unwrap());
    }

    #[test]
    fn clones_keep_separate_caches() {
        let (mut m, mut a) = MockValues::single(Some(ValueKind::Double), "");
        let mut b = a.clone();
        m.deliver(0, Value::Double(3.0));
        assert_eq!(a.get_value(&mut m, ValueKind::Double), Ok(Value::Double(3.0)));
        assert_eq!(b.last_value(), &Value::Double(0.0));
        assert_eq!(a, b);
        // `a` consumed the manager flag, so `b` sees no update.
        assert_eq!(b.get_value(&mut m, ValueKind::Double), Ok(Value::Double(0.0)));
    }

    #[test]
    fn check_update_without_change_detection_defers_the_read() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Int), "");
        m.deliver(0, Value::Int(5));
        assert!(input.check_update(&mut m, false).unwrap());
        assert!(m.source.updated);
        m.source.updated = false;
        // The noted update is still taken directly.
        assert_eq!(input.get_value(&mut m, ValueKind::Int), Ok(Value::Int(5)));
        input.clear_update(&mut m).unwrap();
        assert!(!input.is_updated(&mut m).unwrap());
    }

    #[test]
    fn units_scale_numeric_reads() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "W");
        m.source.units[0] = "kW".into();
        m.deliver(0, Value::Int(2));
        assert_eq!(input.get_value(&mut m, ValueKind::Double), Ok(Value::Double(2000.0)));
        m.deliver(0, Value::Vector(vec![1.0]));
        assert_eq!(input.get_value(&mut m, ValueKind::Vector), Ok(Value::Vector(vec![1.0])));
    }

    #[test]
    fn incompatible_units_fail() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "m");
        m.source.units[0] = "s".into();
        m.deliver(0, Value::Double(1.0));
        assert!(matches!(
            input.get_value(&mut m, ValueKind::Double),
            Err(InterfaceError::UnitMismatch { .. })
        ));
    }

    #[test]
    fn unknown_units_are_ignored() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "W");
        m.source.units[0] = "bogons".into();
        m.deliver(0, Value::Double(7.0));
        assert_eq!(input.get_value(&mut m, ValueKind::Double), Ok(Value::Double(7.0)));
    }

    #[test]
    fn threshold_applies_to_bool_reads() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Bool), "");
        input.set_threshold(Some(0.5));
        m.deliver(0, Value::Double(0.3));
        assert_eq!(input.value::<bool, _>(&mut m), Ok(false));
        m.deliver(0, Value::Double(0.7));
        assert_eq!(input.value::<bool, _>(&mut m), Ok(true));
    }

    #[test]
    fn malformed_payload_is_surfaced() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "");
        m.deliver_raw(0, ValueKind::Double, vec![1, 2, 3]);
        assert!(matches!(
            input.get_value(&mut m, ValueKind::Double),
            Err(InterfaceError::MalformedValue { .. })
        ));
    }

    #[test]
    fn aggregates_every_delivered_source() {
        let (mut m, mut input) = MockValues::with_sources(3, None);
        input.set_multi_input_mode(&mut m, MultiInputMode::Average).unwrap();
        m.deliver(0, Value::Double(2.0));
        m.deliver(1, Value::Int(4));
        m.deliver(2, Value::String("6".into()));
        assert_eq!(input.get_value(&mut m, ValueKind::Double), Ok(Value::Double(4.0)));

        input.set_multi_input_mode(&mut m, MultiInputMode::Vectorize).unwrap();
        m.source.updated = true;
        assert_eq!(
            input.get_value(&mut m, ValueKind::Vector),
            Ok(Value::Vector(vec![2.0, 4.0, 6.0]))
        );
    }

    #[test]
    fn mode_none_rejected_with_several_sources() {
        let (mut m, mut input) = MockValues::with_sources(2, None);
        input.set_multi_input_mode(&mut m, MultiInputMode::Sum).unwrap();
        assert!(matches!(
            input.set_multi_input_mode(&mut m, MultiInputMode::None),
            Err(InterfaceError::ConfigurationError { .. })
        ));
        assert_eq!(input.multi_input_mode(), MultiInputMode::Sum);
    }

    #[test]
    fn injection_kind_resets_when_sources_change() {
        let (mut m, mut input) = MockValues::single(None, "");
        m.deliver(0, Value::Int(1));
        input.get_value(&mut m, ValueKind::Double).unwrap();
        assert_eq!(input.injection_kind(), Some(ValueKind::Int));
        input.add_target(&mut m, "other").unwrap();
        assert_eq!(m.source.epoch, 1);
        m.source.data[0] = None;
        m.source.updated = true;
        input.get_value(&mut m, ValueKind::Double).unwrap();
        assert_eq!(input.injection_kind(), None);
    }

    #[test]
    fn closed_input_fails_every_time() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "");
        input.close(&mut m).unwrap();
        for _ in 0..3 {
            assert!(matches!(
                input.get_value(&mut m, ValueKind::Double),
                Err(InterfaceError::InvalidHandle { .. })
            ));
            assert!(input.is_updated(&mut m).is_err());
            assert!(input.peek_updated(&m).is_err());
            assert!(input.check_update(&mut m, true).is_err());
        }
    }

    #[test]
    fn typed_callback_respects_change_detection() {
        use std::sync::{Arc, Mutex};

        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "");
        input.set_minimum_change(1.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut cb = InputCallback::Double(Box::new(move |v, t| {
            sink.lock().unwrap().push((v, t));
        }));

        m.deliver(0, Value::Double(5.0));
        assert!(input.handle_callback(&mut m, &mut cb, Time::from_nanos(1)).unwrap());
        m.deliver(0, Value::Double(5.5));
        assert!(!input.handle_callback(&mut m, &mut cb, Time::from_nanos(2)).unwrap());
        m.deliver(0, Value::Double(7.0));
        assert!(input.handle_callback(&mut m, &mut cb, Time::from_nanos(3)).unwrap());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(5.0, Time::from_nanos(1)), (7.0, Time::from_nanos(3))]
        );
    }

    #[test]
    fn registering_a_callback_hands_it_to_the_manager() {
        let (mut m, input) = MockValues::single(Some(ValueKind::Double), "");
        input
            .set_value_callback::<NamedPoint, _>(&mut m, |_, _| {})
            .unwrap();
        assert_eq!(
            m.callback.as_ref().and_then(InputCallback::kind),
            Some(ValueKind::NamedPoint)
        );
        input.set_notification_callback(&mut m, |_| {}).unwrap();
        assert!(matches!(m.callback, Some(InputCallback::Notify(_))));
    }

    #[test]
    fn notification_leaves_the_update_pending() {
        let (mut m, mut input) = MockValues::single(Some(ValueKind::Double), "");
        let mut cb = InputCallback::notify(|_| {});
        m.deliver(0, Value::Double(1.0));
        assert!(input.handle_callback(&mut m, &mut cb, Time::ZERO).unwrap());
        assert!(m.source.updated);
    }
}
