//! Strongly-typed identifiers for federates and their interfaces.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Counter for unique [`FederateInstanceId`] allocation.
///
/// Starts at 1; 0 is reserved for [`FederateInstanceId::NONE`].
static FEDERATE_INSTANCE_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Unique per-instance identifier for a federate manager.
///
/// Every handle minted by a manager carries the manager's instance ID,
/// so a handle presented to a different manager (including a new manager
/// built after the original was dropped) never resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FederateInstanceId(u32);

impl FederateInstanceId {
    /// The sentinel carried by [`InterfaceHandle::INVALID`].
    pub const NONE: Self = Self(0);

    /// Allocate a fresh, unique instance ID. Thread-safe.
    pub fn next() -> Self {
        Self(FEDERATE_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FederateInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which family of interface a handle names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InterfaceKind {
    /// A value subscription.
    Input,
    /// A value publication.
    Publication,
    /// A message endpoint.
    Endpoint,
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Input => "input",
            Self::Publication => "publication",
            Self::Endpoint => "endpoint",
        };
        f.write_str(s)
    }
}

/// Opaque identifier for one registered interface.
///
/// A handle is an index into a manager-owned slot table plus the slot
/// generation at registration time. Closing the interface bumps the slot
/// generation, so every copy of the old handle becomes stale and resolves
/// to [`InterfaceError::InvalidHandle`](crate::InterfaceError::InvalidHandle)
/// instead of aliasing whatever is registered in the slot later.
///
/// Ordering is total and purely structural; it carries no meaning beyond
/// giving interface objects a stable sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceHandle {
    federate: FederateInstanceId,
    kind: InterfaceKind,
    index: u32,
    generation: u32,
}

impl InterfaceHandle {
    /// The invalid sentinel. Never resolves in any manager.
    pub const INVALID: Self = Self {
        federate: FederateInstanceId::NONE,
        kind: InterfaceKind::Input,
        index: u32::MAX,
        generation: 0,
    };

    /// Build a handle. Only managers mint handles.
    pub fn new(
        federate: FederateInstanceId,
        kind: InterfaceKind,
        index: u32,
        generation: u32,
    ) -> Self {
        Self {
            federate,
            kind,
            index,
            generation,
        }
    }

    /// Whether this handle is not the invalid sentinel.
    ///
    /// A valid-looking handle may still be stale; only the owning manager
    /// can tell.
    pub fn is_valid(&self) -> bool {
        self.federate != FederateInstanceId::NONE
    }

    /// The manager instance that minted this handle.
    pub fn federate(&self) -> FederateInstanceId {
        self.federate
    }

    /// The interface family.
    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// Slot index inside the manager's table for this interface family.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation at registration time.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Default for InterfaceHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for InterfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("invalid");
        }
        write!(
            f,
            "{}:{}#{}@{}",
            self.federate, self.kind, self.index, self.generation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_ids_are_unique() {
        let a = FederateInstanceId::next();
        let b = FederateInstanceId::next();
        assert_ne!(a, b);
        assert_ne!(a, FederateInstanceId::NONE);
    }

    #[test]
    fn invalid_sentinel() {
        assert!(!InterfaceHandle::INVALID.is_valid());
        assert!(!InterfaceHandle::default().is_valid());
        assert_eq!(InterfaceHandle::INVALID.to_string(), "invalid");
    }

    #[test]
    fn ordering_follows_index_within_a_federate() {
        let fed = FederateInstanceId::next();
        let a = InterfaceHandle::new(fed, InterfaceKind::Endpoint, 0, 0);
        let b = InterfaceHandle::new(fed, InterfaceKind::Endpoint, 1, 0);
        assert!(a < b);
        assert!(a.is_valid());
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn generation_distinguishes_reused_slots() {
        let fed = FederateInstanceId::next();
        let old = InterfaceHandle::new(fed, InterfaceKind::Input, 3, 0);
        let new = InterfaceHandle::new(fed, InterfaceKind::Input, 3, 1);
        assert_ne!(old, new);
    }
}
