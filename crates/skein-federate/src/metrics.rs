//! Cumulative counters for a federate.
//!
//! [`FederateMetrics`] is updated by the federate as values and messages
//! move through it and read with [`Federate::metrics`](crate::Federate::metrics).

/// Cumulative delivery and dispatch counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FederateMetrics {
    /// Values queued by publications.
    pub values_published: u64,
    /// Publications suppressed by only-transmit-on-change.
    pub publications_suppressed: u64,
    /// Value deliveries applied to inputs (one per receiving input).
    pub values_delivered: u64,
    /// Messages accepted for sending.
    pub messages_sent: u64,
    /// Messages placed in an endpoint queue.
    pub messages_delivered: u64,
    /// Messages dropped for an unknown destination or a full queue.
    pub messages_dropped: u64,
    /// Queued values and messages discarded because their interface closed.
    pub deliveries_dropped_on_close: u64,
    /// Input and endpoint callbacks invoked.
    pub callbacks_fired: u64,
    /// Input callbacks skipped because reading the value failed.
    pub callback_errors: u64,
    /// Completed time requests.
    pub time_grants: u64,
}
