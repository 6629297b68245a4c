//! The external collaborators named but deliberately left unimplemented by
//! this crate: the capture loader, the Vulkan state-mutator, and the atom
//! parameter decoder. Only their interfaces live here; a real integration
//! provides the implementations (typically backed by a trace-replay layer
//! driving an actual `ash::Device`, or in tests, the fakes under
//! `tests/framework`).

use ash::vk;

use crate::atom::Atom;
use crate::error::Result;

/// A resource bound into a descriptor set, as observed in the reference
/// state. Shared between [`crate::atom::DescriptorWrite`] (what an atom
/// writes) and [`ReferenceState::descriptor_set_resources`] (what a set
/// currently holds, used to hoist `BindDescriptorSets` reads, see §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorResource {
    Sampler(vk::Sampler),
    ImageView(vk::ImageView),
    Buffer(vk::Buffer),
    BufferView(vk::BufferView),
    /// A descriptor type this crate does not recognize.
    Unsupported,
}

/// Read-only queries against the evolving Vulkan state snapshot that the
/// external state-mutator maintains. The dispatcher uses this only to
/// resolve atom parameters into bindings and attachment descriptions,
/// never to decide liveness itself (§9's "Reference state" glossary
/// entry).
pub trait ReferenceState {
    /// The `(memory, offset, size)` an image is currently bound to, or
    /// `None` if it is unbound or this is a swapchain image.
    fn image_binding(&self, image: vk::Image) -> Option<(vk::DeviceMemory, vk::DeviceSize, vk::DeviceSize)>;
    /// The `(memory, offset, size)` a buffer is currently bound to, or
    /// `None` if it is unbound.
    fn buffer_binding(&self, buffer: vk::Buffer) -> Option<(vk::DeviceMemory, vk::DeviceSize, vk::DeviceSize)>;
    /// Whether `image` is a swapchain image (these have no explicit
    /// memory binding and always report no bindings).
    fn is_swapchain_image(&self, image: vk::Image) -> bool;
    /// The image an image view was created from.
    fn image_view_image(&self, view: vk::ImageView) -> Option<vk::Image>;
    /// The buffer a buffer view was created from.
    fn buffer_view_buffer(&self, view: vk::BufferView) -> Option<vk::Buffer>;
    /// The attached image views of a framebuffer, in attachment order.
    fn framebuffer_attachments(&self, framebuffer: vk::Framebuffer) -> Option<Vec<vk::ImageView>>;
    /// The `(loadOp, storeOp)` of each attachment of a render pass, in
    /// attachment order.
    fn render_pass_attachment_ops(&self, render_pass: vk::RenderPass) -> Option<Vec<(vk::AttachmentLoadOp, vk::AttachmentStoreOp)>>;
    /// The resources currently written into a descriptor set.
    fn descriptor_set_resources(&self, set: vk::DescriptorSet) -> Option<Vec<DescriptorResource>>;
}

/// Applies an atom's effect to the reference Vulkan state. A real
/// implementation mirrors what the corresponding Vulkan call would do to
/// device state; this crate never executes Vulkan or emulates GPU work
/// itself (see the Non-goals).
pub trait StateMutator: ReferenceState {
    /// Apply `atom`'s effect. An `Err` here is the `MutationFailed`
    /// condition: the caller localizes it to that atom's behavior record
    /// rather than propagating it.
    fn mutate(&mut self, atom: &Atom) -> Result<()>;
}

/// Supplies the atom stream and constructs a fresh reference-state
/// instance to replay it against. The capture file format itself (trace
/// loading, atom parameter decoding) is out of scope for this crate.
pub trait Capture {
    type State: StateMutator;

    /// The atom stream, in capture order.
    fn atoms(&self) -> Result<&[Atom]>;
    /// A fresh, empty reference-state instance for this capture.
    fn new_state(&self) -> Self::State;
}
