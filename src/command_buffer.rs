//! Command buffers and the deferred closures recorded into them, replayed
//! when the command buffer is submitted (§4.3, §9).
//!
//! The deferred closure is represented the way §9 recommends: a small
//! tagged struct, interpreted rather than invoked as a first-class
//! function, so a captured closure can outlive the transient reference
//! state it was resolved against. This plays the same structural role as
//! the teacher's recorded `GpuTask::execute` closures in
//! `task_graph.rs`/`graph/record.rs`, but without closing over borrowed
//! state: only [`StateAddress`]es, already resolved at record time.

use std::collections::HashMap;

use ash::vk;

use crate::address::StateAddress;
use crate::behavior::BehaviorRecord;
use crate::key::CmdBufId;

/// An effect recorded into a command buffer at `vkCmd*`/`RecreateCmd*`
/// time, replayed against a submit's [`BehaviorRecord`] when the command
/// buffer is submitted. May be replayed zero or many times (data model
/// invariant 4).
#[derive(Debug, Clone)]
pub enum DeferredClosure {
    AddRead(StateAddress),
    AddModify(StateAddress),
    AddWrite(StateAddress),
    ReadBindings(Vec<StateAddress>),
    ModifyBindings(Vec<StateAddress>),
    WriteBindings(Vec<StateAddress>),
    /// Replays a secondary command buffer's entire record list in place,
    /// registered by `vkCmdExecuteCommands`.
    InvokeSubrecord(CmdBufId),
}

impl DeferredClosure {
    /// Applies this closure's effect to `behavior`, recursing through
    /// `commands` for [`DeferredClosure::InvokeSubrecord`].
    pub fn replay(&self, behavior: &mut BehaviorRecord, commands: &CommandBufferModel) {
        match self {
            DeferredClosure::AddRead(a) => behavior.read(*a),
            DeferredClosure::AddModify(a) => behavior.modify(*a),
            DeferredClosure::AddWrite(a) => behavior.write(*a),
            DeferredClosure::ReadBindings(addrs) => addrs.iter().for_each(|a| behavior.read(*a)),
            DeferredClosure::ModifyBindings(addrs) => addrs.iter().for_each(|a| behavior.modify(*a)),
            DeferredClosure::WriteBindings(addrs) => addrs.iter().for_each(|a| behavior.write(*a)),
            DeferredClosure::InvokeSubrecord(secondary) => {
                for closure in commands.records(*secondary) {
                    closure.replay(behavior, commands);
                }
            }
        }
    }
}

/// One `VkCommandBuffer`'s ordered list of deferred closures.
#[derive(Default)]
struct CommandBufferEntry {
    handle: vk::CommandBuffer,
    records: Vec<DeferredClosure>,
}

/// Tracks command buffers and their recorded closures.
#[derive(Default)]
pub struct CommandBufferModel {
    by_handle: HashMap<vk::CommandBuffer, CmdBufId>,
    buffers: HashMap<CmdBufId, CommandBufferEntry>,
    next_id: u64,
}

impl CommandBufferModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent per handle.
    pub fn get_or_create(&mut self, handle: vk::CommandBuffer) -> CmdBufId {
        if let Some(&id) = self.by_handle.get(&handle) {
            return id;
        }
        let id = CmdBufId(self.next_id);
        self.next_id += 1;
        self.by_handle.insert(handle, id);
        self.buffers.insert(id, CommandBufferEntry { handle, records: Vec::new() });
        id
    }

    pub fn handle_of(&self, id: CmdBufId) -> vk::CommandBuffer {
        self.buffers.get(&id).map(|e| e.handle).unwrap_or(vk::CommandBuffer::null())
    }

    /// Pushes a closure onto `id`'s record list.
    pub fn append_record(&mut self, id: CmdBufId, closure: DeferredClosure) {
        self.buffers.get_mut(&id).expect("cmdbuf id must come from get_or_create").records.push(closure);
    }

    /// Replaces `id`'s record list with an empty one. Old records are
    /// dropped: `Begin`/`RecreateAndBegin` itself writes the records cell,
    /// so DCE observes the replacement through the usual address-write
    /// bookkeeping rather than through this method's return value.
    pub fn reset(&mut self, id: CmdBufId) {
        if let Some(entry) = self.buffers.get_mut(&id) {
            entry.records.clear();
        }
    }

    pub fn records(&self, id: CmdBufId) -> &[DeferredClosure] {
        self.buffers.get(&id).map(|e| e.records.as_slice()).unwrap_or(&[])
    }
}
