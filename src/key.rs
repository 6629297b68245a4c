//! State keys: the opaque identities of every abstract state cell the
//! dependency graph tracks, before they are canonicalized into dense
//! [`StateAddress`](crate::address::StateAddress)es.
//!
//! See the data model: handle keys carry tag + raw value equality, while
//! composite keys (bindings, command-buffer records) carry identity
//! equality through their owning [`MemoryId`]/[`CmdBufId`] and a
//! per-owner sequence number, so two binding events with the same
//! `(offset, size)` on the same memory are always distinct keys.

use ash::vk;
use ash::vk::Handle as _;

/// Which kind of Vulkan object a [`Handle`] key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Image,
    Buffer,
    Memory,
    ImageView,
    BufferView,
    Pipeline,
    Framebuffer,
    RenderPass,
    DescriptorSet,
    Sampler,
    ShaderModule,
    Queue,
}

/// A raw Vulkan handle, tagged with its object type. Two handles compare
/// equal iff their `(kind, raw value)` pair matches, per the data model's
/// "Handle keys compare by (tag, 64-bit value)".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub kind: HandleKind,
    pub raw: u64,
}

impl Handle {
    pub fn image(h: vk::Image) -> Self {
        Handle { kind: HandleKind::Image, raw: h.as_raw() }
    }
    pub fn buffer(h: vk::Buffer) -> Self {
        Handle { kind: HandleKind::Buffer, raw: h.as_raw() }
    }
    pub fn memory(h: vk::DeviceMemory) -> Self {
        Handle { kind: HandleKind::Memory, raw: h.as_raw() }
    }
    pub fn image_view(h: vk::ImageView) -> Self {
        Handle { kind: HandleKind::ImageView, raw: h.as_raw() }
    }
    pub fn buffer_view(h: vk::BufferView) -> Self {
        Handle { kind: HandleKind::BufferView, raw: h.as_raw() }
    }
    pub fn pipeline(h: vk::Pipeline) -> Self {
        Handle { kind: HandleKind::Pipeline, raw: h.as_raw() }
    }
    pub fn framebuffer(h: vk::Framebuffer) -> Self {
        Handle { kind: HandleKind::Framebuffer, raw: h.as_raw() }
    }
    pub fn render_pass(h: vk::RenderPass) -> Self {
        Handle { kind: HandleKind::RenderPass, raw: h.as_raw() }
    }
    pub fn descriptor_set(h: vk::DescriptorSet) -> Self {
        Handle { kind: HandleKind::DescriptorSet, raw: h.as_raw() }
    }
    pub fn sampler(h: vk::Sampler) -> Self {
        Handle { kind: HandleKind::Sampler, raw: h.as_raw() }
    }
    pub fn shader_module(h: vk::ShaderModule) -> Self {
        Handle { kind: HandleKind::ShaderModule, raw: h.as_raw() }
    }
    pub fn queue(h: vk::Queue) -> Self {
        Handle { kind: HandleKind::Queue, raw: h.as_raw() }
    }
}

/// Identity of a `DeviceMemory` composite key, assigned once per distinct
/// `VkDeviceMemory` handle by [`MemoryModel::get_or_create_memory`](crate::memory::MemoryModel::get_or_create_memory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryId(pub(crate) u64);

/// Identity of a `DeviceMemoryBinding` composite key. Carries its owning
/// memory plus a sequence number that is never reused, so rebinding the
/// same `(offset, size)` always produces a fresh, distinct identity (data
/// model invariant 3: historical bindings are never removed or merged).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId {
    pub(crate) memory: MemoryId,
    pub(crate) seq: u64,
}

impl BindingId {
    pub fn memory(&self) -> MemoryId {
        self.memory
    }
}

/// Identity of a `CommandBuffer` composite key, assigned once per distinct
/// `VkCommandBuffer` handle by [`CommandBufferModel::get_or_create`](crate::command_buffer::CommandBufferModel::get_or_create).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CmdBufId(pub(crate) u64);

/// An abstract state cell, before address assignment. Composite variants
/// carry just enough information (an owner id or sequence number) to be
/// identity-distinct even when their structural payload coincides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// A raw Vulkan handle (image, buffer, memory, view, pipeline, ...).
    Handle(Handle),
    /// A `VkDeviceMemory` allocation, as a whole.
    Memory(MemoryId),
    /// The handle sub-key owned by a `DeviceMemory`.
    MemoryHandle(MemoryId),
    /// One bind event `(offset, size)` against a `DeviceMemory`.
    Binding(BindingId),
    /// The data bytes covered by a [`StateKey::Binding`].
    BindingData(BindingId),
    /// A `VkCommandBuffer`, as a whole.
    CommandBuffer(CmdBufId),
    /// The handle sub-key owned by a `CommandBuffer`.
    CommandBufferHandle(CmdBufId),
    /// The ordered deferred-closure list owned by a `CommandBuffer`.
    CommandBufferRecords(CmdBufId),
}

impl StateKey {
    /// The key's parent, per the data model's parent/child relations.
    /// `None` means the parent is the null address.
    pub(crate) fn parent_key(&self) -> Option<StateKey> {
        match self {
            StateKey::Handle(_) => None,
            StateKey::Memory(_) => None,
            StateKey::MemoryHandle(id) => Some(StateKey::Memory(*id)),
            StateKey::Binding(id) => Some(StateKey::Memory(id.memory)),
            StateKey::BindingData(id) => Some(StateKey::Binding(*id)),
            StateKey::CommandBuffer(_) => None,
            StateKey::CommandBufferHandle(id) => Some(StateKey::CommandBuffer(*id)),
            StateKey::CommandBufferRecords(id) => Some(StateKey::CommandBuffer(*id)),
        }
    }
}

impl From<Handle> for StateKey {
    fn from(h: Handle) -> Self {
        StateKey::Handle(h)
    }
}
