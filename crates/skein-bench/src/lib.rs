//! Benchmark profiles for the Skein interface layer.
//!
//! - [`fan_in_profile`]: one input aggregating many publications
//! - [`exchange_profile`]: paired publications and subscriptions plus an
//!   endpoint pair, for whole-grant round trips

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use skein_core::InterfaceError;
use skein_federate::{Federate, FederateConfig, Publication};
use skein_interface::{Endpoint, Input, MultiInputMode};

/// One input aggregating `sources` untyped publications with `mode`, in a
/// federate already executing.
pub fn fan_in_profile(
    sources: usize,
    mode: MultiInputMode,
) -> Result<(Federate, Vec<Publication>, Input), InterfaceError> {
    let mut fed = federate("fan_in")?;
    let pubs = (0..sources)
        .map(|i| fed.register_publication_indexed("src", i, "double", ""))
        .collect::<Result<Vec<_>, _>>()?;
    let mut input = fed.register_input("sink", "double", "")?;
    input.set_multi_input_mode(&mut fed, mode)?;
    for p in &pubs {
        input.add_target(&mut fed, p.name())?;
    }
    fed.enter_executing_mode()?;
    Ok((fed, pubs, input))
}

/// A federate exchanging values and messages each grant.
pub struct ExchangeProfile {
    /// The federate, already executing.
    pub federate: Federate,
    /// Publications, one per channel.
    pub publications: Vec<Publication>,
    /// Subscriptions in channel order; the `i`-th reads publication `i` in
    /// kilo-units.
    pub inputs: Vec<Input>,
    /// Sending endpoint.
    pub sender: Endpoint,
    /// Receiving endpoint.
    pub receiver: Endpoint,
}

/// `channels` publications in `W`, each read back by a subscription in `kW`,
/// plus two endpoints.
pub fn exchange_profile(channels: usize) -> Result<ExchangeProfile, InterfaceError> {
    let mut federate = federate("exchange")?;
    let mut publications = Vec::with_capacity(channels);
    let mut inputs = Vec::with_capacity(channels);
    for i in 0..channels {
        let publication = federate.register_publication_indexed("power", i, "double", "W")?;
        inputs.push(federate.register_subscription(publication.name(), "kW")?);
        publications.push(publication);
    }
    let sender = federate.register_endpoint("sender", "")?;
    let receiver = federate.register_endpoint("receiver", "")?;
    federate.enter_executing_mode()?;
    Ok(ExchangeProfile {
        federate,
        publications,
        inputs,
        sender,
        receiver,
    })
}

fn federate(name: &str) -> Result<Federate, InterfaceError> {
    Federate::new(FederateConfig::new(name)).map_err(|e| InterfaceError::ConfigurationError {
        reason: e.to_string(),
    })
}
