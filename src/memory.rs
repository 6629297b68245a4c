//! Device memories, their bindings, and the coarse interval-overlap query
//! used throughout the dispatcher (§4.2).
//!
//! Grounded on the teacher's suballocation bookkeeping in
//! `allocator/scratch_allocator.rs` (append-only offset tracking within an
//! allocation), generalized here to the append-only, never-merged binding
//! history the design calls for, plus the degenerate zero-size-binding
//! overlap caveat.

use std::collections::HashMap;

use ash::vk;
use log::error;
use multimap::MultiMap;

use crate::key::{BindingId, MemoryId};
use crate::state::ReferenceState;

struct BindingRecord {
    id: BindingId,
    start: vk::DeviceSize,
    end: vk::DeviceSize,
}

impl BindingRecord {
    fn is_degenerate(&self) -> bool {
        self.end == self.start
    }
}

struct MemoryEntry {
    handle: vk::DeviceMemory,
    next_binding_seq: u64,
    // offset -> bindings created at that offset, in creation order. Never
    // merged, never removed (invariant 3).
    by_offset: MultiMap<vk::DeviceSize, BindingId>,
    bindings: HashMap<BindingId, BindingRecord>,
}

/// Tracks device memories, their bind events, and answers overlap queries
/// against them. Never merges or removes a binding once created.
#[derive(Default)]
pub struct MemoryModel {
    by_handle: HashMap<vk::DeviceMemory, MemoryId>,
    memories: HashMap<MemoryId, MemoryEntry>,
    next_memory_id: u64,
}

/// `[start, end)` overlap, per §4.2, with the documented caveat: a
/// degenerate (zero-size) binding is treated as covered by any nonempty
/// query range that begins at or spans its start.
fn overlaps(binding: &BindingRecord, query_start: vk::DeviceSize, query_end: vk::DeviceSize) -> bool {
    if binding.is_degenerate() {
        query_start <= binding.start && binding.start < query_end
    } else {
        binding.start < query_end && query_start < binding.end
    }
}

impl MemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent per handle.
    pub fn get_or_create_memory(&mut self, handle: vk::DeviceMemory) -> MemoryId {
        if let Some(&id) = self.by_handle.get(&handle) {
            return id;
        }
        let id = MemoryId(self.next_memory_id);
        self.next_memory_id += 1;
        self.by_handle.insert(handle, id);
        self.memories.insert(id, MemoryEntry {
            handle,
            next_binding_seq: 0,
            by_offset: MultiMap::new(),
            bindings: HashMap::new(),
        });
        id
    }

    pub fn handle_of(&self, memory: MemoryId) -> vk::DeviceMemory {
        self.memories.get(&memory).map(|e| e.handle).unwrap_or(vk::DeviceMemory::null())
    }

    /// Appends a new binding; never merges with, or removes, an existing
    /// one, even at the same offset (invariant 3).
    pub fn add_binding(&mut self, memory: MemoryId, offset: vk::DeviceSize, size: vk::DeviceSize) -> BindingId {
        let entry = self.memories.get_mut(&memory).expect("memory id must come from get_or_create_memory");
        let id = BindingId { memory, seq: entry.next_binding_seq };
        entry.next_binding_seq += 1;
        entry.bindings.insert(id, BindingRecord { id, start: offset, end: offset + size });
        entry.by_offset.insert(offset, id);
        id
    }

    /// Every binding ever created at exactly `offset` on `memory`, in
    /// creation order — the `offset → bindings` reachability the data model
    /// requires (§3, §8 property 2). Never merged, never removed.
    pub fn bindings_at_offset(&self, memory: MemoryId, offset: vk::DeviceSize) -> &[BindingId] {
        self.memories
            .get(&memory)
            .and_then(|entry| entry.by_offset.get_vec(&offset))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn binding_range(&self, binding: BindingId) -> (vk::DeviceSize, vk::DeviceSize) {
        let entry = &self.memories[&binding.memory];
        let record = &entry.bindings[&binding];
        (record.start, record.end)
    }

    pub fn binding_is_degenerate(&self, binding: BindingId) -> bool {
        let (start, end) = self.binding_range(binding);
        start == end
    }

    /// Every existing binding on `memory` whose range intersects
    /// `[offset, offset+size)`, per the half-open overlap predicate.
    pub fn overlapping_bindings(&self, memory: MemoryId, offset: vk::DeviceSize, size: vk::DeviceSize) -> Vec<BindingId> {
        let Some(entry) = self.memories.get(&memory) else { return Vec::new(); };
        let query_end = offset + size;
        let mut found: Vec<BindingId> = entry
            .bindings
            .values()
            .filter(|b| overlaps(b, offset, query_end))
            .map(|b| b.id)
            .collect();
        // Deterministic order: by offset bucket insertion, then by seq.
        found.sort_by_key(|b| b.seq);
        found
    }

    /// Whether a binding fully contains `[offset, offset+size)` — used by
    /// `Flush` to decide between `write` and `modify` (§4.5).
    pub fn binding_fully_contains(&self, binding: BindingId, offset: vk::DeviceSize, size: vk::DeviceSize) -> bool {
        let (start, end) = self.binding_range(binding);
        offset <= start && end <= offset + size
    }

    /// Resolves `image`'s current binding via the reference state, then
    /// delegates to [`Self::overlapping_bindings`]. Swapchain images and
    /// unbound resources return empty (and the latter logs a diagnostic).
    pub fn bindings_for_image(&self, image: vk::Image, state: &impl ReferenceState) -> Vec<BindingId> {
        if state.is_swapchain_image(image) {
            return Vec::new();
        }
        match state.image_binding(image) {
            Some((memory, offset, size)) => {
                let Some(&memory_id) = self.by_handle.get(&memory) else {
                    error!("image {:?} bound to untracked memory {:?}", image, memory);
                    return Vec::new();
                };
                self.overlapping_bindings(memory_id, offset, size)
            }
            None => {
                error!("image {:?} has no memory binding in reference state", image);
                Vec::new()
            }
        }
    }

    /// Resolves `buffer`'s current binding via the reference state, then
    /// delegates to [`Self::overlapping_bindings`]. Unbound buffers return
    /// empty and log a diagnostic.
    pub fn bindings_for_buffer(&self, buffer: vk::Buffer, state: &impl ReferenceState) -> Vec<BindingId> {
        match state.buffer_binding(buffer) {
            Some((memory, offset, size)) => {
                let Some(&memory_id) = self.by_handle.get(&memory) else {
                    error!("buffer {:?} bound to untracked memory {:?}", buffer, memory);
                    return Vec::new();
                };
                self.overlapping_bindings(memory_id, offset, size)
            }
            None => {
                error!("buffer {:?} has no memory binding in reference state", buffer);
                Vec::new()
            }
        }
    }
}
