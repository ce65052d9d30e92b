//! Generation-checked slot tables for registered interfaces.
//!
//! Each interface family lives in its own [`SlotTable`]. A handle names a
//! slot index plus the slot's generation at registration; closing the
//! interface empties the slot and bumps its generation, so every copy of
//! the old handle stops resolving even after the slot is reused.

use indexmap::IndexMap;

use skein_core::{FederateInstanceId, InterfaceError, InterfaceHandle, InterfaceKind};

struct Slot<T> {
    generation: u32,
    name: String,
    entry: Option<T>,
}

/// Slab of interface entries with a free list and a registration-ordered
/// live map.
pub(crate) struct SlotTable<T> {
    federate: FederateInstanceId,
    kind: InterfaceKind,
    /// All slots, live and closed.
    slots: Vec<Slot<T>>,
    /// Indices of closed slots available for reuse.
    free_list: Vec<usize>,
    /// Slot index → handle of every live entry, in registration order.
    live_map: IndexMap<usize, InterfaceHandle>,
    /// Name → slot index. Unnamed entries are absent.
    by_name: IndexMap<String, usize>,
}

impl<T> SlotTable<T> {
    pub fn new(federate: FederateInstanceId, kind: InterfaceKind) -> Self {
        Self {
            federate,
            kind,
            slots: Vec::new(),
            free_list: Vec::new(),
            live_map: IndexMap::new(),
            by_name: IndexMap::new(),
        }
    }

    /// Register an entry. An empty name registers it anonymously.
    pub fn insert(&mut self, name: String, entry: T) -> Result<InterfaceHandle, InterfaceError> {
        if !name.is_empty() && self.by_name.contains_key(&name) {
            return Err(InterfaceError::DuplicateName { name });
        }
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    name: String::new(),
                    entry: None,
                });
                self.slots.len() - 1
            }
        };
        let Ok(raw_index) = u32::try_from(index) else {
            self.slots.truncate(index);
            return Err(InterfaceError::ConfigurationError {
                reason: format!("too many {} interfaces", self.kind),
            });
        };
        let slot = &mut self.slots[index];
        let handle = InterfaceHandle::new(self.federate, self.kind, raw_index, slot.generation);
        slot.entry = Some(entry);
        if !name.is_empty() {
            self.by_name.insert(name.clone(), index);
        }
        slot.name = name;
        self.live_map.insert(index, handle);
        Ok(handle)
    }

    fn index_of(&self, handle: InterfaceHandle) -> Result<usize, InterfaceError> {
        let invalid = InterfaceError::InvalidHandle { handle };
        if handle.federate() != self.federate || handle.kind() != self.kind {
            return Err(invalid);
        }
        let index = handle.index() as usize;
        match self.slots.get(index) {
            Some(slot) if slot.generation == handle.generation() && slot.entry.is_some() => {
                Ok(index)
            }
            _ => Err(invalid),
        }
    }

    #[cfg(test)]
    pub fn contains(&self, handle: InterfaceHandle) -> bool {
        self.index_of(handle).is_ok()
    }

    pub fn get(&self, handle: InterfaceHandle) -> Result<&T, InterfaceError> {
        let index = self.index_of(handle)?;
        self.slots[index]
            .entry
            .as_ref()
            .ok_or(InterfaceError::InvalidHandle { handle })
    }

    pub fn get_mut(&mut self, handle: InterfaceHandle) -> Result<&mut T, InterfaceError> {
        let index = self.index_of(handle)?;
        self.slots[index]
            .entry
            .as_mut()
            .ok_or(InterfaceError::InvalidHandle { handle })
    }

    /// Registered name; empty for anonymous entries.
    pub fn name(&self, handle: InterfaceHandle) -> Result<&str, InterfaceError> {
        let index = self.index_of(handle)?;
        Ok(&self.slots[index].name)
    }

    /// Close an entry, returning it. The handle never resolves again.
    pub fn remove(&mut self, handle: InterfaceHandle) -> Result<T, InterfaceError> {
        let index = self.index_of(handle)?;
        let slot = &mut self.slots[index];
        let entry = slot
            .entry
            .take()
            .ok_or(InterfaceError::InvalidHandle { handle })?;
        slot.generation = slot.generation.wrapping_add(1);
        let name = std::mem::take(&mut slot.name);
        if !name.is_empty() {
            self.by_name.shift_remove(&name);
        }
        self.live_map.shift_remove(&index);
        self.free_list.push(index);
        Ok(entry)
    }

    pub fn lookup(&self, name: &str) -> Option<InterfaceHandle> {
        let index = self.by_name.get(name)?;
        self.live_map.get(index).copied()
    }

    /// Handle of the `position`-th live entry in registration order.
    pub fn handle_at(&self, position: usize) -> Option<InterfaceHandle> {
        self.live_map.get_index(position).map(|(_, handle)| *handle)
    }

    pub fn len(&self) -> usize {
        self.live_map.len()
    }

    /// Live handles in registration order.
    pub fn handles(&self) -> Vec<InterfaceHandle> {
        self.live_map.values().copied().collect()
    }

    /// Live entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (InterfaceHandle, &T)> + '_ {
        self.live_map.iter().filter_map(move |(&index, &handle)| {
            self.slots[index].entry.as_ref().map(|entry| (handle, entry))
        })
    }

    /// Live entries in slot order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.entry.as_mut())
    }
}
