//! Canonicalizes [`StateKey`]s into a dense, monotonically assigned address
//! space, tracking each address's parent so the whole space forms a forest
//! rooted at the null address.
//!
//! Grounded on the teacher's generic resource [`Cache`](crate) idiom
//! (`HashMap::entry` idempotent get-or-create), specialized here to also
//! resolve and assign a key's parent address before assigning the key's
//! own address, which is what guarantees testable property 1: a parent is
//! always assigned strictly before its child.

use std::collections::HashMap;

use crate::key::StateKey;

/// A dense, nonnegative address identifying one abstract state cell.
/// Address `0` is reserved: it is the null address, and is its own parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateAddress(pub(crate) u32);

impl StateAddress {
    pub const NULL: StateAddress = StateAddress(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for StateAddress {
    fn default() -> Self {
        StateAddress::NULL
    }
}

/// Canonicalizes [`StateKey`]s to [`StateAddress`]es.
///
/// `address_of` is idempotent and pure with respect to key equality: the
/// same key always maps to the same address, and unrelated keys never
/// collide (handle keys compare by `(tag, value)`; composite keys compare
/// by identity, see [`crate::key`]).
#[derive(Debug, Default)]
pub struct AddressMap {
    by_key: HashMap<StateKey, StateAddress>,
    // Indexed by `address.0 - 1`, since address 0 (null) has no entry.
    keys: Vec<StateKey>,
    parents: Vec<StateAddress>,
}

impl AddressMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this key's address, assigning a fresh one (and recursively
    /// assigning its parent's address first) if this is the first time the
    /// key has been seen.
    pub fn address_of(&mut self, key: StateKey) -> StateAddress {
        if let Some(&addr) = self.by_key.get(&key) {
            return addr;
        }
        let parent = match key.parent_key() {
            Some(parent_key) => self.address_of(parent_key),
            None => StateAddress::NULL,
        };
        let addr = StateAddress(self.keys.len() as u32 + 1);
        self.by_key.insert(key, addr);
        self.keys.push(key);
        self.parents.push(parent);
        addr
    }

    /// Inverse lookup: the key an address was assigned to, or `None` for
    /// the null address or an address this map never produced.
    pub fn key_of(&self, addr: StateAddress) -> Option<StateKey> {
        if addr.is_null() {
            return None;
        }
        self.keys.get(addr.0 as usize - 1).copied()
    }

    /// `O(1)` parent lookup. The null address is its own parent.
    pub fn parent_of(&self, addr: StateAddress) -> StateAddress {
        if addr.is_null() {
            return StateAddress::NULL;
        }
        self.parents.get(addr.0 as usize - 1).copied().unwrap_or(StateAddress::NULL)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
