//! A fake `Capture`/`ReferenceState`/`StateMutator` trio, tracking just
//! enough fake Vulkan state for the dependency-graph scenarios in
//! `tests/graph.rs` to exercise real bind/flush/render-pass behavior
//! without a live device.

use std::collections::HashMap;

use ash::vk;
use ash::vk::Handle as _;

use vk_depgraph::prelude::*;

#[derive(Default, Clone)]
pub struct FakeState {
    image_bindings: HashMap<u64, (vk::DeviceMemory, vk::DeviceSize, vk::DeviceSize)>,
    buffer_bindings: HashMap<u64, (vk::DeviceMemory, vk::DeviceSize, vk::DeviceSize)>,
    swapchain_images: Vec<u64>,
    image_view_images: HashMap<u64, vk::Image>,
    buffer_view_buffers: HashMap<u64, vk::Buffer>,
    framebuffer_attachments: HashMap<u64, Vec<vk::ImageView>>,
    render_pass_ops: HashMap<u64, Vec<(vk::AttachmentLoadOp, vk::AttachmentStoreOp)>>,
    descriptor_sets: HashMap<u64, Vec<DescriptorResource>>,
}

impl FakeState {
    pub fn mark_swapchain_image(&mut self, image: vk::Image) {
        self.swapchain_images.push(image.as_raw());
    }

    pub fn set_image_view(&mut self, view: vk::ImageView, image: vk::Image) {
        self.image_view_images.insert(view.as_raw(), image);
    }

    pub fn set_framebuffer(&mut self, framebuffer: vk::Framebuffer, attachments: Vec<vk::ImageView>) {
        self.framebuffer_attachments.insert(framebuffer.as_raw(), attachments);
    }

    pub fn set_render_pass(&mut self, render_pass: vk::RenderPass, ops: Vec<(vk::AttachmentLoadOp, vk::AttachmentStoreOp)>) {
        self.render_pass_ops.insert(render_pass.as_raw(), ops);
    }
}

impl ReferenceState for FakeState {
    fn image_binding(&self, image: vk::Image) -> Option<(vk::DeviceMemory, vk::DeviceSize, vk::DeviceSize)> {
        self.image_bindings.get(&image.as_raw()).copied()
    }

    fn buffer_binding(&self, buffer: vk::Buffer) -> Option<(vk::DeviceMemory, vk::DeviceSize, vk::DeviceSize)> {
        self.buffer_bindings.get(&buffer.as_raw()).copied()
    }

    fn is_swapchain_image(&self, image: vk::Image) -> bool {
        self.swapchain_images.contains(&image.as_raw())
    }

    fn image_view_image(&self, view: vk::ImageView) -> Option<vk::Image> {
        self.image_view_images.get(&view.as_raw()).copied()
    }

    fn buffer_view_buffer(&self, view: vk::BufferView) -> Option<vk::Buffer> {
        self.buffer_view_buffers.get(&view.as_raw()).copied()
    }

    fn framebuffer_attachments(&self, framebuffer: vk::Framebuffer) -> Option<Vec<vk::ImageView>> {
        self.framebuffer_attachments.get(&framebuffer.as_raw()).cloned()
    }

    fn render_pass_attachment_ops(&self, render_pass: vk::RenderPass) -> Option<Vec<(vk::AttachmentLoadOp, vk::AttachmentStoreOp)>> {
        self.render_pass_ops.get(&render_pass.as_raw()).cloned()
    }

    fn descriptor_set_resources(&self, set: vk::DescriptorSet) -> Option<Vec<DescriptorResource>> {
        self.descriptor_sets.get(&set.as_raw()).cloned()
    }
}

impl StateMutator for FakeState {
    fn mutate(&mut self, atom: &Atom) -> Result<()> {
        match atom {
            Atom::BindImageMemory { image, memory, offset, size } => {
                self.image_bindings.insert(image.as_raw(), (*memory, *offset, *size));
            }
            Atom::BindBufferMemory { buffer, memory, offset, size } => {
                self.buffer_bindings.insert(buffer.as_raw(), (*memory, *offset, *size));
            }
            Atom::CreateImageView { view, image } => {
                self.image_view_images.insert(view.as_raw(), *image);
            }
            Atom::CreateBufferView { view, buffer } => {
                self.buffer_view_buffers.insert(view.as_raw(), *buffer);
            }
            Atom::CreateFramebuffer { framebuffer, attachments, .. } => {
                self.framebuffer_attachments.insert(framebuffer.as_raw(), attachments.clone());
            }
            Atom::DestroyImage { image } => {
                self.image_bindings.remove(&image.as_raw());
            }
            Atom::DestroyBuffer { buffer } => {
                self.buffer_bindings.remove(&buffer.as_raw());
            }
            _ => {}
        }
        Ok(())
    }
}

pub struct FakeCapture {
    atoms: Vec<Atom>,
    template: FakeState,
}

impl FakeCapture {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms, template: FakeState::default() }
    }

    /// Pre-seeds the reference state a fresh build starts from, for
    /// state the atom stream itself cannot establish (e.g. render pass
    /// load/store ops, which have no dedicated atom in this model).
    pub fn with_template(atoms: Vec<Atom>, template: FakeState) -> Self {
        Self { atoms, template }
    }
}

impl Capture for FakeCapture {
    type State = FakeState;

    fn atoms(&self) -> Result<&[Atom]> {
        Ok(&self.atoms)
    }

    fn new_state(&self) -> FakeState {
        self.template.clone()
    }
}

pub fn handle_image(raw: u64) -> vk::Image {
    vk::Image::from_raw(raw)
}

pub fn handle_buffer(raw: u64) -> vk::Buffer {
    vk::Buffer::from_raw(raw)
}

pub fn handle_memory(raw: u64) -> vk::DeviceMemory {
    vk::DeviceMemory::from_raw(raw)
}

pub fn handle_cmdbuf(raw: u64) -> vk::CommandBuffer {
    vk::CommandBuffer::from_raw(raw)
}

pub fn handle_queue(raw: u64) -> vk::Queue {
    vk::Queue::from_raw(raw)
}

/// A `Capture` whose atom stream can never be fetched, for exercising the
/// capture-level `Error::InputUnavailable` path (§7).
pub struct FailingCapture;

impl Capture for FailingCapture {
    type State = FakeState;

    fn atoms(&self) -> Result<&[Atom]> {
        Err(Error::InputUnavailable("capture stream unavailable".to_string()))
    }

    fn new_state(&self) -> FakeState {
        FakeState::default()
    }
}
