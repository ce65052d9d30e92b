//! Stepped exchange example.
//!
//! Demonstrates: register interfaces → enter executing mode → publish →
//! request time → read converted values and drain messages → repeat.

use skein_bench::exchange_profile;
use skein_core::Time;
use skein_interface::MessageManager;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Skein Grid Exchange Example ===\n");

    let mut profile = exchange_profile(4).unwrap();
    let fed = &mut profile.federate;

    for step in 1..=5i64 {
        for (i, p) in profile.publications.iter().enumerate() {
            let watts = 250.0 * (step as f64) * (i as f64 + 1.0);
            p.publish(fed, watts).unwrap();
        }
        profile
            .sender
            .send_to(fed, profile.receiver.name(), format!("step {step}"))
            .unwrap();

        let granted = fed.request_time(Time::from_secs_f64(step as f64)).unwrap();
        let readings: Vec<f64> = profile
            .inputs
            .iter_mut()
            .map(|input| input.value::<f64, _>(fed).unwrap())
            .collect();
        println!("t={granted}: {readings:?} kW");

        while let Some(message) = fed.dequeue_any() {
            println!(
                "  {} -> {}: {}",
                message.source(),
                message.destination(),
                message.as_str().unwrap_or("<binary>")
            );
        }
    }

    fed.finalize();
    let metrics = fed.metrics();
    println!(
        "\nvalues delivered: {}, messages delivered: {}, grants: {}",
        metrics.values_delivered, metrics.messages_delivered, metrics.time_grants
    );
}
