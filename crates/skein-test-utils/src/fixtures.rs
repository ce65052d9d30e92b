//! Ready-made federates and representative values.

use skein_core::{Complex, NamedPoint, Time, Value, ValueKind};
use skein_federate::{Federate, FederateConfig, Publication};
use skein_interface::{Endpoint, Input};

/// A federate in startup with the default config.
pub fn federate(name: &str) -> Federate {
    Federate::new(FederateConfig::new(name)).unwrap()
}

/// A publication and an input subscribed to it, both untyped and
/// unitless, in a federate already executing.
pub fn loopback(name: &str) -> (Federate, Publication, Input) {
    let mut fed = federate(name);
    let publication = fed.register_publication("out", "", "").unwrap();
    let input = fed.register_subscription("out", "").unwrap();
    fed.enter_executing_mode().unwrap();
    (fed, publication, input)
}

/// Two endpoints `a` and `b` in a federate already executing.
pub fn endpoint_pair(name: &str) -> (Federate, Endpoint, Endpoint) {
    let mut fed = federate(name);
    let a = fed.register_endpoint("a", "").unwrap();
    let b = fed.register_endpoint("b", "").unwrap();
    fed.enter_executing_mode().unwrap();
    (fed, a, b)
}

/// One representative value per kind, in [`ValueKind::ALL`] order.
pub fn sample_values() -> Vec<Value> {
    vec![
        Value::Double(-2.5),
        Value::Int(42),
        Value::String("7.25".into()),
        Value::Complex(Complex::new(3.0, -4.0)),
        Value::Bool(true),
        Value::Time(Time::from_nanos(1_500_000_000)),
        Value::NamedPoint(NamedPoint::new("v", 1.5)),
        Value::Vector(vec![1.0, 2.0, 3.0]),
        Value::ComplexVector(vec![Complex::new(1.0, 1.0)]),
    ]
}

/// The representative value of one kind.
pub fn sample_value(kind: ValueKind) -> Value {
    sample_values()
        .into_iter()
        .find(|v| v.kind() == kind)
        .unwrap()
}
