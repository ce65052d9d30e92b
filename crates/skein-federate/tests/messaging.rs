//! Integration test: messages between endpoints of one federate.

use skein_core::codec::decode;
use skein_core::{InterfaceError, Time, Value, ValueKind};
use skein_federate::{Federate, FederateConfig};
use skein_interface::{Message, MessageManager};
use skein_test_utils::fixtures::{endpoint_pair, federate};
use skein_test_utils::{init_tracing, Recorder};

fn t(ns: i64) -> Time {
    Time::from_nanos(ns)
}

fn build(config: FederateConfig) -> Federate {
    Federate::new(config).unwrap()
}

// ── Delivery ───────────────────────────────────────────────────────

#[test]
fn payload_arrives_unchanged() {
    init_tracing();
    let (mut fed, a, b) = endpoint_pair("msg");
    let payload = vec![0u8, 1, 2, 255, b'x'];
    a.send_to(&mut fed, "b", payload.clone()).unwrap();
    assert_eq!(b.pending_messages(&fed), Ok(0));
    fed.request_time(t(1)).unwrap();
    assert_eq!(b.pending_messages(&fed), Ok(1));
    assert_eq!(b.has_message(&fed), Ok(true));

    let message = b.get_message(&mut fed).unwrap().unwrap();
    assert_eq!(message.data(), payload.as_slice());
    assert_eq!(message.source(), "msg/a");
    assert_eq!(message.destination(), "b");
    assert_eq!(message.receive_time(), Some(t(1)));
    assert_eq!(b.pending_messages(&fed), Ok(0));
    assert_eq!(b.get_message(&mut fed), Ok(None));
    assert_eq!(fed.metrics().messages_sent, 1);
    assert_eq!(fed.metrics().messages_delivered, 1);
}

#[test]
fn messages_keep_send_order() {
    let (mut fed, a, b) = endpoint_pair("order");
    for text in ["one", "two", "three"] {
        a.send_to(&mut fed, "order/b", text).unwrap();
    }
    fed.request_time(t(1)).unwrap();
    let got: Vec<String> = std::iter::from_fn(|| b.get_message(&mut fed).unwrap())
        .map(|m| m.as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(got, ["one", "two", "three"]);
}

#[test]
fn federate_wide_dequeue_follows_registration_order() {
    let (mut fed, a, b) = endpoint_pair("any");
    b.send_to(&mut fed, "a", "for a").unwrap();
    a.send_to(&mut fed, "b", "for b").unwrap();
    fed.request_time(t(1)).unwrap();
    assert!(fed.has_any_message());
    assert_eq!(fed.pending_total(), 2);
    let first = fed.dequeue_any().unwrap();
    assert_eq!(first.as_str(), Some("for a"));
    let second = fed.dequeue_any().unwrap();
    assert_eq!(second.as_str(), Some("for b"));
    assert_eq!(fed.dequeue_any(), None);
    assert!(!fed.has_any_message());
}

#[test]
fn default_destination_is_used_when_none_is_named() {
    let (mut fed, mut a, b) = endpoint_pair("dest");
    assert_eq!(
        a.send(&mut fed, "lost"),
        Err(InterfaceError::NoDestination {
            endpoint: "dest/a".into()
        })
    );
    a.set_default_destination("dest/b");
    a.send(&mut fed, "found").unwrap();
    a.send_message(&mut fed, Message::new("", "", "built", Time::ZERO))
        .unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(b.pending_messages(&fed), Ok(2));
    let built = fed.dequeue_message(b.handle()).unwrap();
    assert_eq!(built.map(|m| m.source().to_owned()), Some("dest/a".into()));
}

#[test]
fn future_sends_wait_for_their_time() {
    let (mut fed, a, b) = endpoint_pair("later");
    a.send_to_at(&mut fed, "b", "late", t(10)).unwrap();
    a.send_to_at(&mut fed, "b", "early", t(3)).unwrap();
    fed.request_time(t(5)).unwrap();
    assert_eq!(b.pending_messages(&fed), Ok(1));
    fed.request_time(t(10)).unwrap();
    let got: Vec<Message> = std::iter::from_fn(|| b.get_message(&mut fed).unwrap()).collect();
    assert_eq!(got[0].as_str(), Some("early"));
    assert_eq!(got[0].time(), t(3));
    assert_eq!(got[1].as_str(), Some("late"));
    assert_eq!(got[1].receive_time(), Some(t(10)));
}

#[test]
fn sends_are_never_stamped_in_the_past() {
    let (mut fed, a, b) = endpoint_pair("past");
    fed.request_time(t(20)).unwrap();
    a.send_to_at(&mut fed, "b", "old", t(5)).unwrap();
    fed.request_time(t(21)).unwrap();
    let message = b.get_message(&mut fed).unwrap().unwrap();
    assert_eq!(message.time(), t(20));
}

#[test]
fn unknown_destinations_are_dropped_and_counted() {
    let (mut fed, a, _) = endpoint_pair("drop");
    a.send_to(&mut fed, "nowhere", "void").unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(fed.metrics().messages_dropped, 1);
    assert_eq!(fed.pending_total(), 0);
}

#[test]
fn strict_type_tags_must_agree() {
    let mut config = FederateConfig::new("strict");
    config.strict_type_checking = true;
    let mut fed = build(config);
    let json = fed.register_endpoint("json", "json").unwrap();
    let xml = fed.register_endpoint("xml", "xml").unwrap();
    let plain = fed.register_endpoint("plain", "").unwrap();
    fed.enter_executing_mode().unwrap();
    assert_eq!(json.endpoint_type(&fed), Ok("json"));
    assert_eq!(
        json.send_to(&mut fed, "xml", "{}"),
        Err(InterfaceError::TypeMismatch {
            from: "json".into(),
            to: "xml".into()
        })
    );
    json.send_to(&mut fed, "plain", "{}").unwrap();
    xml.send_to(&mut fed, "strict/plain", "<a/>").unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(plain.pending_messages(&fed), Ok(2));
}

#[test]
fn full_queues_drop_new_messages() {
    let mut config = FederateConfig::new("cap");
    config.endpoint_queue_capacity = 2;
    let mut fed = build(config);
    let a = fed.register_endpoint("a", "").unwrap();
    let b = fed.register_endpoint("b", "").unwrap();
    for i in 0..3u8 {
        a.send_to(&mut fed, "b", vec![i]).unwrap();
    }
    fed.request_time(t(1)).unwrap();
    assert_eq!(b.pending_messages(&fed), Ok(2));
    assert_eq!(fed.metrics().messages_dropped, 1);
    let kept: Vec<Vec<u8>> = std::iter::from_fn(|| b.get_message(&mut fed).unwrap())
        .map(Message::into_data)
        .collect();
    assert_eq!(kept, vec![vec![0], vec![1]]);
}

// ── Subscriptions and filters ──────────────────────────────────────

#[test]
fn endpoints_receive_subscribed_publications() {
    let mut fed = federate("sub");
    let publication = fed.register_publication("temp", "double", "").unwrap();
    let monitor = fed.register_endpoint("monitor", "").unwrap();
    monitor.subscribe(&mut fed, "temp").unwrap();
    fed.enter_executing_mode().unwrap();
    publication.publish(&mut fed, 21.5).unwrap();
    fed.request_time(t(4)).unwrap();
    let message = monitor.get_message(&mut fed).unwrap().unwrap();
    assert_eq!(message.source(), "sub/temp");
    assert_eq!(message.destination(), "sub/monitor");
    assert_eq!(message.time(), t(4));
    assert_eq!(
        decode(ValueKind::Double, message.data()),
        Ok(Value::Double(21.5))
    );
}

#[test]
fn filters_are_recorded_once() {
    let (mut fed, a, _) = endpoint_pair("filters");
    a.add_source_filter(&mut fed, "delay").unwrap();
    a.add_source_filter(&mut fed, "delay").unwrap();
    a.add_destination_filter(&mut fed, "drop").unwrap();
    let filters = fed.filters(&a).unwrap();
    assert_eq!(filters.source, ["delay"]);
    assert_eq!(filters.destination, ["drop"]);
}

// ── Callbacks ──────────────────────────────────────────────────────

#[test]
fn endpoint_callbacks_run_once_per_grant_with_arrivals() {
    let (mut fed, a, b) = endpoint_pair("cb");
    let rec = Recorder::new();
    let sink = rec.clone();
    b.set_callback(&mut fed, move |endpoint, time| {
        sink.push((endpoint.name().to_owned(), time))
    })
    .unwrap();
    a.send_to(&mut fed, "b", "x").unwrap();
    a.send_to(&mut fed, "b", "y").unwrap();
    fed.request_time(t(2)).unwrap();
    fed.request_time(t(3)).unwrap();
    assert_eq!(rec.entries(), vec![("cb/b".to_owned(), t(2))]);
    assert_eq!(b.pending_messages(&fed), Ok(2));
}

#[test]
fn federate_callback_covers_endpoints_without_their_own() {
    let (mut fed, a, b) = endpoint_pair("fallback");
    let own = Recorder::new();
    let shared = Recorder::new();
    let (own_sink, shared_sink) = (own.clone(), shared.clone());
    a.set_callback(&mut fed, move |_, _| own_sink.push(()))
        .unwrap();
    fed.set_federate_endpoint_callback(Box::new(move |endpoint, _| {
        shared_sink.push(endpoint.name().to_owned())
    }));
    a.send_to(&mut fed, "b", "to b").unwrap();
    b.send_to(&mut fed, "a", "to a").unwrap();
    fed.request_time(t(1)).unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(shared.entries(), vec!["fallback/b".to_owned()]);
    assert_eq!(fed.metrics().callbacks_fired, 2);
}
