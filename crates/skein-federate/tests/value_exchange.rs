//! Integration test: publications delivered to inputs of the same federate.
//!
//! Covers conversion on read, unit scaling, change detection, defaults,
//! and input callbacks dispatched from `request_time`.

use skein_core::convert::is_defined;
use skein_core::{Complex, InterfaceError, Time, Value, ValueKind};
use skein_federate::{Federate, FederateConfig};
use skein_interface::{HandleOption, InputCallback, TypedInput};
use skein_test_utils::fixtures::{federate, loopback, sample_value, sample_values};
use skein_test_utils::{init_tracing, Recorder};

fn t(ns: i64) -> Time {
    Time::from_nanos(ns)
}

// ── Conversion on read ─────────────────────────────────────────────

#[test]
fn every_kind_reads_back_as_every_defined_kind() {
    init_tracing();
    for value in sample_values() {
        let (mut fed, publication, mut input) = loopback("conv");
        publication.publish(&mut fed, value.clone()).unwrap();
        fed.request_time(t(1)).unwrap();
        for to in ValueKind::ALL {
            let read = input.get_value(&mut fed, to);
            if is_defined(value.kind(), to) {
                let read = read.unwrap_or_else(|e| panic!("{} -> {to}: {e}", value.kind()));
                assert_eq!(read.kind(), to);
            } else {
                assert!(
                    matches!(read, Err(InterfaceError::TypeMismatch { .. })),
                    "{} -> {to} should be a type mismatch",
                    value.kind()
                );
            }
        }
        assert_eq!(input.injection_kind(), Some(value.kind()));
    }
}

#[test]
fn canonical_text_round_trips() {
    let (mut fed, publication, mut input) = loopback("text");
    for value in sample_values() {
        publication.publish(&mut fed, value.clone()).unwrap();
        let next = fed.current_time() + t(1);
        fed.request_time(next).unwrap();
        let text = input.get_value(&mut fed, ValueKind::String).unwrap();
        let back = skein_core::convert(&text, value.kind()).unwrap();
        assert_eq!(back, value);
    }
}

#[test]
fn float_to_int_truncates() {
    let (mut fed, publication, mut input) = loopback("trunc");
    publication.publish(&mut fed, -7.9).unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.value::<i64, _>(&mut fed), Ok(-7));
    assert_eq!(input.value::<f64, _>(&mut fed), Ok(-7.9));
}

#[test]
fn typed_publications_convert_before_sending() {
    let mut fed = federate("typed");
    let publication = fed.register_publication("count", "int", "").unwrap();
    let mut input = fed.register_subscription("count", "").unwrap();
    fed.enter_executing_mode().unwrap();
    publication.publish(&mut fed, 3.7).unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.get_value(&mut fed, ValueKind::Double), Ok(Value::Double(3.0)));
    assert_eq!(input.injection_type(&fed), Ok("int"));
    assert_eq!(input.injection_kind(), Some(ValueKind::Int));
}

// ── Units ──────────────────────────────────────────────────────────

#[test]
fn units_scale_between_publication_and_input() {
    let mut fed = federate("units");
    let volts = fed.register_publication("volts", "double", "V").unwrap();
    let mut kilovolts = fed.register_subscription("volts", "kV").unwrap();
    fed.enter_executing_mode().unwrap();
    volts.publish(&mut fed, 11_000.0).unwrap();
    fed.request_time(t(1)).unwrap();
    let read = kilovolts.value::<f64, _>(&mut fed).unwrap();
    assert!((read - 11.0).abs() < 1e-9);
    assert_eq!(kilovolts.injection_units(&fed), Ok("V"));
    assert_eq!(kilovolts.units(&fed), Ok("kV"));
}

#[test]
fn incompatible_units_are_rejected_at_connection() {
    let mut fed = federate("units");
    fed.register_publication("len", "double", "m").unwrap();
    let mut input = fed.register_input("dur", "double", "s").unwrap();
    assert!(matches!(
        input.add_target(&mut fed, "len"),
        Err(InterfaceError::UnitMismatch { .. })
    ));
    input
        .set_option(&mut fed, HandleOption::IgnoreUnitMismatch, 1)
        .unwrap();
    assert_eq!(input.add_target(&mut fed, "len"), Ok(()));
}

#[test]
fn overflowing_unit_powers_are_left_unscaled() {
    let mut fed = federate("units");
    let source = fed.register_publication("area", "double", "m^200").unwrap();
    let mut input = fed.register_input("area_in", "double", "m^100*m^100").unwrap();
    assert_eq!(input.output_units(), None);
    input.add_target(&mut fed, "area").unwrap();
    fed.enter_executing_mode().unwrap();
    source.publish(&mut fed, 3.0).unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.value::<f64, _>(&mut fed), Ok(3.0));
}

#[test]
fn strict_type_matching_rejects_other_types() {
    let mut fed = federate("strict");
    fed.register_publication("name", "string", "").unwrap();
    let mut input = fed.register_input("x", "double", "").unwrap();
    input
        .set_option(&mut fed, HandleOption::StrictTypeMatching, 1)
        .unwrap();
    assert_eq!(
        input.add_target(&mut fed, "name"),
        Err(InterfaceError::TypeMismatch {
            from: "string".into(),
            to: "double".into()
        })
    );
}

// ── Change detection ───────────────────────────────────────────────

#[test]
fn small_moves_leave_the_cache_alone() {
    let (mut fed, publication, mut input) = loopback("delta");
    input.set_minimum_change(1.0);

    publication.publish(&mut fed, 10.0).unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.is_updated(&mut fed), Ok(true));
    assert_eq!(input.value::<f64, _>(&mut fed), Ok(10.0));

    for (i, v) in [10.3, 9.8, 10.5, 9.2].into_iter().enumerate() {
        publication.publish(&mut fed, v).unwrap();
        fed.request_time(t(2 + i as i64)).unwrap();
        assert_eq!(input.is_updated(&mut fed), Ok(false), "value {v}");
        assert_eq!(input.value::<f64, _>(&mut fed), Ok(10.0));
    }

    publication.publish(&mut fed, 11.0).unwrap();
    fed.request_time(t(10)).unwrap();
    assert_eq!(input.is_updated(&mut fed), Ok(true));
    assert_eq!(input.value::<f64, _>(&mut fed), Ok(11.0));
}

#[test]
fn mixed_numeric_reads_share_one_cache() {
    let (mut fed, publication, mut input) = loopback("mixed");
    input.set_minimum_change(0.5);

    publication.publish(&mut fed, 1.0).unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.value::<f64, _>(&mut fed), Ok(1.0));

    publication.publish(&mut fed, 1.1).unwrap();
    fed.request_time(t(2)).unwrap();
    assert_eq!(input.value::<i64, _>(&mut fed), Ok(1));
    assert_eq!(input.last_value(), &Value::Double(1.0));

    publication.publish(&mut fed, 1.2).unwrap();
    fed.request_time(t(3)).unwrap();
    assert_eq!(input.value::<f64, _>(&mut fed), Ok(1.0));

    publication.publish(&mut fed, 2.0).unwrap();
    fed.request_time(t(4)).unwrap();
    assert_eq!(input.value::<i64, _>(&mut fed), Ok(2));
    assert_eq!(input.value::<f64, _>(&mut fed), Ok(2.0));
}

#[test]
fn only_update_on_change_option_enables_detection() {
    let (mut fed, publication, mut input) = loopback("delta");
    input
        .set_option(&mut fed, HandleOption::OnlyUpdateOnChange, 1)
        .unwrap();
    assert!(input.change_detection_enabled());
    publication.publish(&mut fed, 4.0).unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.is_updated(&mut fed), Ok(true));
    input.clear_update(&mut fed).unwrap();
    publication.publish(&mut fed, 4.0).unwrap();
    fed.request_time(t(2)).unwrap();
    assert_eq!(input.is_updated(&mut fed), Ok(false));
}

#[test]
fn peek_never_consumes() {
    let (mut fed, publication, mut input) = loopback("peek");
    publication.publish(&mut fed, 1.0).unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.peek_updated(&fed), Ok(true));
    assert_eq!(input.peek_updated(&fed), Ok(true));
    input.value::<f64, _>(&mut fed).unwrap();
    assert_eq!(input.peek_updated(&fed), Ok(false));
}

// ── Defaults and metadata ──────────────────────────────────────────

#[test]
fn default_value_before_first_delivery() {
    let mut fed = federate("defaults");
    let mut input = fed.register_input("in", "", "").unwrap();
    input.set_default(&mut fed, 5.0).unwrap();
    assert_eq!(input.value::<i64, _>(&mut fed), Ok(5));
    let mut fresh = fed.input("in").unwrap();
    assert_eq!(fresh.value::<String, _>(&mut fed), Ok("5".to_owned()));
}

#[test]
fn last_update_time_tracks_deliveries() {
    let (mut fed, publication, input) = loopback("time");
    assert_eq!(input.last_update_time(&fed), Ok(Time::ZERO));
    publication.publish(&mut fed, 1).unwrap();
    fed.request_time(t(7)).unwrap();
    fed.request_time(t(9)).unwrap();
    assert_eq!(input.last_update_time(&fed), Ok(t(7)));
}

#[test]
fn anonymous_subscriptions_show_their_target() {
    let (fed, _, input) = loopback("anon");
    assert_eq!(input.display_name(&fed), "anon/out");
    assert_eq!(input.key(&fed), Ok(""));
    assert_eq!(fed.subscription("out").unwrap(), input);
}

#[test]
fn raw_reads_take_the_payload() {
    let (mut fed, publication, mut input) = loopback("raw");
    assert_eq!(input.raw_size(&fed), Ok(0));
    publication.publish(&mut fed, vec![1.0, 2.0]).unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.raw_size(&fed), Ok(16));
    assert_eq!(input.vector_size(&fed), Ok(2));
    let (kind, bytes) = input.raw_value(&mut fed).unwrap().unwrap();
    assert_eq!(kind, ValueKind::Vector);
    assert_eq!(bytes.len(), 16);
    assert_eq!(input.peek_updated(&fed), Ok(false));
}

// ── Callbacks ──────────────────────────────────────────────────────

#[test]
fn typed_callbacks_fire_once_per_update() {
    let (mut fed, publication, input) = loopback("cb");
    let rec = Recorder::new();
    let sink = rec.clone();
    input
        .set_value_callback::<f64, _>(&mut fed, move |v, time| sink.push((v, time)))
        .unwrap();
    publication.publish(&mut fed, 3.0).unwrap();
    fed.request_time(t(5)).unwrap();
    fed.request_time(t(6)).unwrap();
    assert_eq!(rec.entries(), vec![(3.0, t(5))]);
    assert_eq!(fed.metrics().callbacks_fired, 1);
}

#[test]
fn notification_callbacks_leave_the_update_for_the_caller() {
    let (mut fed, publication, mut input) = loopback("notify");
    let rec = Recorder::new();
    let sink = rec.clone();
    input
        .set_notification_callback(&mut fed, move |time| sink.push(time))
        .unwrap();
    publication.publish(&mut fed, "on").unwrap();
    fed.request_time(t(3)).unwrap();
    assert_eq!(rec.entries(), vec![t(3)]);
    assert_eq!(input.is_updated(&mut fed), Ok(true));
    assert_eq!(input.value::<bool, _>(&mut fed), Ok(true));
}

#[test]
fn callbacks_respect_change_detection() {
    let (mut fed, publication, mut input) = loopback("cbdelta");
    input.set_minimum_change(0.5);
    let rec = Recorder::new();
    let sink = rec.clone();
    input
        .set_callback(
            &mut fed,
            InputCallback::Double(Box::new(move |v, _| sink.push(v))),
        )
        .unwrap();
    for (i, v) in [1.0, 1.1, 1.2, 2.0].into_iter().enumerate() {
        publication.publish(&mut fed, v).unwrap();
        fed.request_time(t(i as i64 + 1)).unwrap();
    }
    assert_eq!(rec.entries(), vec![1.0, 2.0]);
}

#[test]
fn a_failing_callback_read_does_not_stop_the_grant() {
    let mut fed = federate("cberr");
    let point = fed.register_publication("point", "", "").unwrap();
    let as_complex = fed.register_subscription("point", "").unwrap();
    let as_double = fed.register_subscription("point", "").unwrap();
    let a = fed.register_endpoint("a", "").unwrap();
    let b = fed.register_endpoint("b", "").unwrap();
    fed.enter_executing_mode().unwrap();

    let complexes = Recorder::new();
    let doubles = Recorder::new();
    let arrivals = Recorder::new();
    let (c, d, m) = (complexes.clone(), doubles.clone(), arrivals.clone());
    as_complex
        .set_value_callback::<Complex, _>(&mut fed, move |v, _| c.push(v))
        .unwrap();
    as_double
        .set_value_callback::<f64, _>(&mut fed, move |v, time| d.push((v, time)))
        .unwrap();
    b.set_callback(&mut fed, move |_, time| m.push(time)).unwrap();

    point
        .publish(&mut fed, sample_value(ValueKind::NamedPoint))
        .unwrap();
    a.send_to(&mut fed, "b", "x").unwrap();
    assert_eq!(fed.request_time(t(5)), Ok(t(5)));
    assert!(complexes.is_empty());
    assert_eq!(doubles.entries(), vec![(1.5, t(5))]);
    assert_eq!(arrivals.entries(), vec![t(5)]);
    assert_eq!(fed.metrics().callback_errors, 1);
    assert_eq!(fed.metrics().callbacks_fired, 2);
    assert_eq!(fed.metrics().time_grants, 1);

    assert_eq!(fed.request_time(t(9)), Ok(t(9)));
    assert_eq!(arrivals.entries(), vec![t(5)]);
    assert_eq!(fed.metrics().callback_errors, 1);
    assert_eq!(fed.metrics().time_grants, 2);
}

#[test]
fn replacing_a_callback_drops_the_old_one() {
    let (mut fed, publication, input) = loopback("replace");
    let first = Recorder::new();
    let second = Recorder::new();
    let (a, b) = (first.clone(), second.clone());
    input
        .set_value_callback::<i64, _>(&mut fed, move |v, _| a.push(v))
        .unwrap();
    input
        .set_value_callback::<String, _>(&mut fed, move |v, _| b.push(v))
        .unwrap();
    publication.publish(&mut fed, 12).unwrap();
    fed.request_time(t(1)).unwrap();
    assert!(first.is_empty());
    assert_eq!(second.entries(), vec!["12".to_owned()]);
}

#[test]
fn typed_inputs_register_with_their_kind() {
    let mut fed = Federate::new(FederateConfig::new("typed")).unwrap();
    let publication = fed.register_publication("p", "", "").unwrap();
    let mut input: TypedInput<bool> = fed.register_typed_input("flag", "").unwrap();
    input.add_target(&mut fed, "p").unwrap();
    assert_eq!(input.extraction_type(&fed), Ok("bool"));
    assert_eq!(input.value(&mut fed), Ok(false));
    publication
        .publish(&mut fed, sample_value(ValueKind::Int))
        .unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(input.value(&mut fed), Ok(true));
}
