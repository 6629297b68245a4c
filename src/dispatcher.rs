//! The atom dispatcher: for every atom variant, produces the
//! [`BehaviorRecord`] the graph builder accumulates (§4.5). This is the
//! bulk of the crate — a large, flat match over [`Atom`] grounded
//! directly on the structure of the data model in §3-4.
//!
//! Every call assumes the state-mutator has already applied the atom
//! (invariant 5): reference-state queries here see post-effect state.

use std::collections::HashSet;

use ash::vk;
use log::debug;
#[cfg(feature = "log-objects")]
use log::trace;

use crate::address::StateAddress;
use crate::address::AddressMap;
use crate::atom::{Atom, DedicatedResource};
use crate::behavior::BehaviorRecord;
use crate::command_buffer::{CommandBufferModel, DeferredClosure};
use crate::key::{BindingId, CmdBufId, Handle, StateKey};
use crate::memory::MemoryModel;
use crate::state::{DescriptorResource, ReferenceState};

/// Bundles the mutable collaborators a dispatch needs, so `dispatch`'s
/// signature stays readable despite touching all of them.
pub struct DispatchContext<'a, S: ReferenceState> {
    pub addresses: &'a mut AddressMap,
    pub memory: &'a mut MemoryModel,
    pub commands: &'a mut CommandBufferModel,
    pub roots: &'a mut HashSet<StateAddress>,
    pub state: &'a S,
    pub diagnostics: bool,
}

#[derive(Clone, Copy)]
enum Resource {
    Image(vk::Image),
    Buffer(vk::Buffer),
}

impl Resource {
    fn handle_key(self) -> StateKey {
        match self {
            Resource::Image(i) => Handle::image(i).into(),
            Resource::Buffer(b) => Handle::buffer(b).into(),
        }
    }

    fn bindings<S: ReferenceState>(self, memory: &MemoryModel, state: &S) -> Vec<BindingId> {
        match self {
            Resource::Image(i) => memory.bindings_for_image(i, state),
            Resource::Buffer(b) => memory.bindings_for_buffer(b, state),
        }
    }
}

/// Produces behaviors for every atom variant this crate recognizes.
#[derive(Default)]
pub struct AtomDispatcher;

impl AtomDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch<S: ReferenceState>(&self, atom: &Atom, ctx: &mut DispatchContext<'_, S>) -> BehaviorRecord {
        let mut behavior = BehaviorRecord::new();
        self.dispatch_into(atom, ctx, &mut behavior);
        if ctx.diagnostics {
            debug!(
                "atom {:?} -> reads={:?} modifies={:?} writes={:?} keep_alive={} aborted={}",
                atom, behavior.reads, behavior.modifies, behavior.writes, behavior.keep_alive, behavior.aborted
            );
        }
        behavior
    }

    fn dispatch_into<S: ReferenceState>(&self, atom: &Atom, ctx: &mut DispatchContext<'_, S>, behavior: &mut BehaviorRecord) {
        use Atom::*;
        match atom {
            // --- Object creation ---
            CreateImage { image } => {
                #[cfg(feature = "log-objects")]
                trace!("observed VkImage {:?}", image);
                behavior.write(ctx.addresses.address_of(Handle::image(*image).into()));
            }
            CreateBuffer { buffer } => {
                #[cfg(feature = "log-objects")]
                trace!("observed VkBuffer {:?}", buffer);
                behavior.write(ctx.addresses.address_of(Handle::buffer(*buffer).into()));
            }
            CreateImageView { view, image } => {
                behavior.write(ctx.addresses.address_of(Handle::image_view(*view).into()));
                behavior.read(ctx.addresses.address_of(Handle::image(*image).into()));
            }
            CreateBufferView { view, buffer } => {
                behavior.write(ctx.addresses.address_of(Handle::buffer_view(*view).into()));
                behavior.read(ctx.addresses.address_of(Handle::buffer(*buffer).into()));
            }
            CreateFramebuffer { framebuffer, render_pass, attachments } => {
                behavior.write(ctx.addresses.address_of(Handle::framebuffer(*framebuffer).into()));
                behavior.read(ctx.addresses.address_of(Handle::render_pass(*render_pass).into()));
                for view in attachments {
                    behavior.read(ctx.addresses.address_of(Handle::image_view(*view).into()));
                }
            }
            CreateRenderPass { render_pass } => {
                behavior.write(ctx.addresses.address_of(Handle::render_pass(*render_pass).into()));
            }
            CreateGraphicsPipelines { pipelines, shader_modules, render_pass } => {
                for pipeline in pipelines {
                    behavior.write(ctx.addresses.address_of(Handle::pipeline(*pipeline).into()));
                }
                for module in shader_modules {
                    behavior.read(ctx.addresses.address_of(Handle::shader_module(*module).into()));
                }
                behavior.read(ctx.addresses.address_of(Handle::render_pass(*render_pass).into()));
            }
            CreateComputePipelines { pipelines, shader_modules } => {
                for pipeline in pipelines {
                    behavior.write(ctx.addresses.address_of(Handle::pipeline(*pipeline).into()));
                }
                for module in shader_modules {
                    behavior.read(ctx.addresses.address_of(Handle::shader_module(*module).into()));
                }
            }
            CreateShaderModule { module } => {
                behavior.write(ctx.addresses.address_of(Handle::shader_module(*module).into()));
            }

            // --- Memory allocation ---
            AllocateMemory { memory, dedicated } => {
                #[cfg(feature = "log-objects")]
                trace!("observed VkDeviceMemory {:?}", memory);
                let id = ctx.memory.get_or_create_memory(*memory);
                behavior.write(ctx.addresses.address_of(StateKey::Memory(id)));
                match dedicated {
                    DedicatedResource::None => {}
                    DedicatedResource::Image(image) => {
                        behavior.read(ctx.addresses.address_of(Handle::image(*image).into()));
                    }
                    DedicatedResource::Buffer(buffer) => {
                        behavior.read(ctx.addresses.address_of(Handle::buffer(*buffer).into()));
                    }
                }
            }

            // --- Binding ---
            BindImageMemory { image, memory, offset, size } => {
                behavior.modify(ctx.addresses.address_of(Handle::image(*image).into()));
                let memory_id = ctx.memory.get_or_create_memory(*memory);
                behavior.read(ctx.addresses.address_of(StateKey::MemoryHandle(memory_id)));
                if ctx.state.image_binding(*image).is_some() {
                    let binding = ctx.memory.add_binding(memory_id, *offset, *size);
                    behavior.write(ctx.addresses.address_of(StateKey::Binding(binding)));
                }
            }
            BindBufferMemory { buffer, memory, offset, size } => {
                behavior.modify(ctx.addresses.address_of(Handle::buffer(*buffer).into()));
                let memory_id = ctx.memory.get_or_create_memory(*memory);
                behavior.read(ctx.addresses.address_of(StateKey::MemoryHandle(memory_id)));
                if ctx.state.buffer_binding(*buffer).is_some() {
                    let binding = ctx.memory.add_binding(memory_id, *offset, *size);
                    behavior.write(ctx.addresses.address_of(StateKey::Binding(binding)));
                }
            }

            // --- Raw recreated data ---
            RecreateImageData { image } => {
                behavior.modify(ctx.addresses.address_of(Handle::image(*image).into()));
                for binding in ctx.memory.bindings_for_image(*image, ctx.state) {
                    behavior.write(ctx.addresses.address_of(StateKey::BindingData(binding)));
                }
            }
            RecreateBufferData { buffer } => {
                behavior.modify(ctx.addresses.address_of(Handle::buffer(*buffer).into()));
                for binding in ctx.memory.bindings_for_buffer(*buffer, ctx.state) {
                    behavior.write(ctx.addresses.address_of(StateKey::BindingData(binding)));
                }
            }

            // --- Destroy / Free: anchor as roots by keeping the destroy alive ---
            DestroyImage { image } => {
                #[cfg(feature = "log-objects")]
                trace!("destroying VkImage {:?}", image);
                behavior.modify(ctx.addresses.address_of(Handle::image(*image).into()));
                behavior.mark_keep_alive();
            }
            DestroyBuffer { buffer } => {
                #[cfg(feature = "log-objects")]
                trace!("destroying VkBuffer {:?}", buffer);
                behavior.modify(ctx.addresses.address_of(Handle::buffer(*buffer).into()));
                behavior.mark_keep_alive();
            }
            FreeMemory { memory } => {
                #[cfg(feature = "log-objects")]
                trace!("freeing VkDeviceMemory {:?}", memory);
                let id = ctx.memory.get_or_create_memory(*memory);
                behavior.modify(ctx.addresses.address_of(StateKey::Memory(id)));
                behavior.mark_keep_alive();
            }

            // --- Map/Unmap ---
            MapMemory { memory } => {
                let id = ctx.memory.get_or_create_memory(*memory);
                behavior.modify(ctx.addresses.address_of(StateKey::Memory(id)));
            }
            UnmapMemory { memory } => {
                let id = ctx.memory.get_or_create_memory(*memory);
                behavior.modify(ctx.addresses.address_of(StateKey::Memory(id)));
            }

            // --- Flush / Invalidate ---
            FlushMappedMemoryRanges { ranges } => {
                for &(memory, offset, size) in ranges {
                    let id = ctx.memory.get_or_create_memory(memory);
                    for binding in ctx.memory.overlapping_bindings(id, offset, size) {
                        let addr = ctx.addresses.address_of(StateKey::BindingData(binding));
                        let fully_contained = ctx.memory.binding_fully_contains(binding, offset, size);
                        let degenerate = ctx.memory.binding_is_degenerate(binding);
                        if fully_contained && !degenerate {
                            behavior.write(addr);
                        } else {
                            behavior.modify(addr);
                        }
                    }
                }
            }
            InvalidateMappedMemoryRanges { ranges } => {
                for &(memory, offset, size) in ranges {
                    let id = ctx.memory.get_or_create_memory(memory);
                    for binding in ctx.memory.overlapping_bindings(id, offset, size) {
                        behavior.read(ctx.addresses.address_of(StateKey::BindingData(binding)));
                    }
                }
            }

            // --- Descriptor updates ---
            UpdateDescriptorSets { writes, copies } => {
                for write in writes {
                    dispatch_descriptor_write(ctx, behavior, write);
                }
                for copy in copies {
                    behavior.read(ctx.addresses.address_of(Handle::descriptor_set(copy.src_set).into()));
                    behavior.modify(ctx.addresses.address_of(Handle::descriptor_set(copy.dst_set).into()));
                }
            }
            RecreateDescriptorSet { writes } => {
                for write in writes {
                    dispatch_descriptor_write(ctx, behavior, write);
                }
            }

            // --- Command-buffer lifecycle ---
            BeginCommandBuffer { command_buffer } => {
                let id = ctx.commands.get_or_create(*command_buffer);
                behavior.read(ctx.addresses.address_of(StateKey::CommandBufferHandle(id)));
                behavior.write(ctx.addresses.address_of(StateKey::CommandBufferRecords(id)));
                ctx.commands.reset(id);
            }
            EndCommandBuffer { command_buffer } => {
                let id = ctx.commands.get_or_create(*command_buffer);
                behavior.modify(ctx.addresses.address_of(StateKey::CommandBuffer(id)));
            }
            RecreateAndBeginCommandBuffer { command_buffer } => {
                let id = ctx.commands.get_or_create(*command_buffer);
                behavior.write(ctx.addresses.address_of(StateKey::CommandBuffer(id)));
                ctx.commands.reset(id);
            }
            RecreateEndCommandBuffer { command_buffer } => {
                let id = ctx.commands.get_or_create(*command_buffer);
                behavior.modify(ctx.addresses.address_of(StateKey::CommandBuffer(id)));
            }

            // --- Pure recorded commands: no-op closure ---
            CmdDraw { .. }
            | CmdDrawIndexed { .. }
            | CmdDispatch { .. }
            | CmdEndRenderPass { .. }
            | CmdPushConstants { .. }
            | CmdSetViewport { .. }
            | CmdSetScissor { .. }
            | CmdSetLineWidth { .. }
            | CmdSetDepthBias { .. }
            | CmdSetBlendConstants { .. }
            | CmdClearAttachments { .. }
            | CmdClearColorImage { .. }
            | CmdClearDepthStencilImage { .. }
            | CmdBeginQuery { .. }
            | CmdEndQuery { .. }
            | CmdResetQueryPool { .. }
            | CmdPipelineBarrier { .. }
            | CmdNextSubpass { .. } => {
                record_common(ctx, behavior, atom.command_buffer().expect("pure recorded atom carries a command buffer"));
            }

            // --- Indirect draws: read the indirect buffer at record time ---
            CmdDrawIndirect { buffer, .. } | CmdDrawIndexedIndirect { buffer, .. } | CmdDispatchIndirect { buffer, .. } => {
                record_common(ctx, behavior, atom.command_buffer().expect("indirect atom carries a command buffer"));
                behavior.read(ctx.addresses.address_of(Handle::buffer(*buffer).into()));
            }

            // --- Recorded with deferred memory access ---
            CmdCopyImage { src, dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, Some(Resource::Image(*src)), Resource::Image(*dst));
            }
            CmdBlitImage { src, dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, Some(Resource::Image(*src)), Resource::Image(*dst));
            }
            CmdResolveImage { src, dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, Some(Resource::Image(*src)), Resource::Image(*dst));
            }
            CmdCopyBuffer { src, dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, Some(Resource::Buffer(*src)), Resource::Buffer(*dst));
            }
            CmdCopyBufferToImage { src, dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, Some(Resource::Buffer(*src)), Resource::Image(*dst));
            }
            CmdCopyImageToBuffer { src, dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, Some(Resource::Image(*src)), Resource::Buffer(*dst));
            }
            CmdFillBuffer { dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, None, Resource::Buffer(*dst));
            }
            CmdUpdateBuffer { dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, None, Resource::Buffer(*dst));
            }
            CmdCopyQueryPoolResults { dst, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_copy(ctx, behavior, id, None, Resource::Buffer(*dst));
            }

            // --- Vertex/index buffer bind: hoisted reads, see §9 ---
            CmdBindVertexBuffers { buffers, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                for buffer in buffers {
                    register_buffer_bind(ctx, behavior, id, *buffer);
                }
            }
            CmdBindIndexBuffer { buffer, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                register_buffer_bind(ctx, behavior, id, *buffer);
            }

            // --- Descriptor set bind: hoisted reads, see §9 ---
            CmdBindDescriptorSets { sets, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                for set in sets {
                    register_descriptor_bind(ctx, behavior, id, *set);
                }
            }

            // --- Pipeline bind ---
            CmdBindPipeline { pipeline, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                let addr = ctx.addresses.address_of(Handle::pipeline(*pipeline).into());
                behavior.read(addr);
                ctx.commands.append_record(id, DeferredClosure::AddRead(addr));
            }

            // --- Secondary command buffer replay ---
            CmdExecuteCommands { secondary, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                for handle in secondary {
                    let secondary_id = ctx.commands.get_or_create(*handle);
                    let addr = ctx.addresses.address_of(StateKey::CommandBuffer(secondary_id));
                    behavior.read(addr);
                    ctx.commands.append_record(id, DeferredClosure::InvokeSubrecord(secondary_id));
                }
            }

            // --- Render pass begin ---
            CmdBeginRenderPass { framebuffer, render_pass, .. } | RecreateCmdBeginRenderPass { framebuffer, render_pass, .. } => {
                let id = record_common(ctx, behavior, atom.command_buffer().unwrap());
                behavior.read(ctx.addresses.address_of(Handle::framebuffer(*framebuffer).into()));
                behavior.read(ctx.addresses.address_of(Handle::render_pass(*render_pass).into()));
                register_render_pass_begin(ctx, id, *framebuffer, *render_pass);
            }

            // --- Submission / presentation ---
            QueueSubmit { queue, command_buffers } => {
                behavior.mark_keep_alive();
                behavior.modify(ctx.addresses.address_of(Handle::queue(*queue).into()));
                for handle in command_buffers {
                    let id = ctx.commands.get_or_create(*handle);
                    behavior.read(ctx.addresses.address_of(StateKey::CommandBuffer(id)));
                    for closure in ctx.commands.records(id) {
                        closure.replay(behavior, ctx.commands);
                    }
                }
            }
            QueuePresentKHR { queue } => {
                let addr = ctx.addresses.address_of(Handle::queue(*queue).into());
                behavior.read(addr);
                ctx.roots.insert(addr);
                behavior.mark_keep_alive();
            }

            Unknown => {
                behavior.mark_keep_alive();
            }
        }
    }
}

/// The effect every `VkCmd*`/`RecreateCmd*` atom has in common: a read of
/// the command buffer's handle sub-key and a modify of its records
/// sub-key (§4.5 "Recorded commands"). Returns the command buffer's id so
/// callers can append further closures without re-resolving the handle.
fn record_common<S: ReferenceState>(ctx: &mut DispatchContext<'_, S>, behavior: &mut BehaviorRecord, handle: vk::CommandBuffer) -> CmdBufId {
    let id = ctx.commands.get_or_create(handle);
    behavior.read(ctx.addresses.address_of(StateKey::CommandBufferHandle(id)));
    behavior.modify(ctx.addresses.address_of(StateKey::CommandBufferRecords(id)));
    id
}

fn dispatch_descriptor_write<S: ReferenceState>(ctx: &mut DispatchContext<'_, S>, behavior: &mut BehaviorRecord, write: &crate::atom::DescriptorWrite) {
    behavior.modify(ctx.addresses.address_of(Handle::descriptor_set(write.dst_set).into()));
    if write.unknown_type {
        behavior.mark_aborted();
        return;
    }
    for sampler in &write.samplers {
        behavior.read(ctx.addresses.address_of(Handle::sampler(*sampler).into()));
    }
    for view in &write.image_views {
        behavior.read(ctx.addresses.address_of(Handle::image_view(*view).into()));
    }
    for buffer in &write.buffers {
        behavior.read(ctx.addresses.address_of(Handle::buffer(*buffer).into()));
    }
    for view in &write.buffer_views {
        behavior.read(ctx.addresses.address_of(Handle::buffer_view(*view).into()));
    }
}

/// Registers the deferred closures for a copy-like recorded command: read
/// the source (if any) and destination handles now, resolve their current
/// bindings now, and replay as `read` of source data / `modify` of
/// destination data (never `write`: the copied region is not tracked, see
/// the overlap rationale in §4.2).
fn register_copy<S: ReferenceState>(ctx: &mut DispatchContext<'_, S>, behavior: &mut BehaviorRecord, id: CmdBufId, src: Option<Resource>, dst: Resource) {
    if let Some(src) = src {
        behavior.read(ctx.addresses.address_of(src.handle_key()));
        let addrs: Vec<StateAddress> = src
            .bindings(ctx.memory, ctx.state)
            .into_iter()
            .map(|b| ctx.addresses.address_of(StateKey::BindingData(b)))
            .collect();
        ctx.commands.append_record(id, DeferredClosure::ReadBindings(addrs));
    }
    behavior.read(ctx.addresses.address_of(dst.handle_key()));
    let addrs: Vec<StateAddress> = dst
        .bindings(ctx.memory, ctx.state)
        .into_iter()
        .map(|b| ctx.addresses.address_of(StateKey::BindingData(b)))
        .collect();
    ctx.commands.append_record(id, DeferredClosure::ModifyBindings(addrs));
}

/// Registers a vertex/index buffer bind's hoisted effect (§9): read the
/// handle now; at replay, modify the handle and read every binding's data.
fn register_buffer_bind<S: ReferenceState>(ctx: &mut DispatchContext<'_, S>, behavior: &mut BehaviorRecord, id: CmdBufId, buffer: vk::Buffer) {
    let handle_addr = ctx.addresses.address_of(Handle::buffer(buffer).into());
    behavior.read(handle_addr);
    let data_addrs: Vec<StateAddress> = ctx
        .memory
        .bindings_for_buffer(buffer, ctx.state)
        .into_iter()
        .map(|b| ctx.addresses.address_of(StateKey::BindingData(b)))
        .collect();
    ctx.commands.append_record(id, DeferredClosure::AddModify(handle_addr));
    ctx.commands.append_record(id, DeferredClosure::ReadBindings(data_addrs));
}

/// Registers a descriptor set bind's hoisted effect (§9): read the set's
/// handle now; for every resource the set currently holds, resolve its
/// handle and bindings now and replay the appropriate effect.
fn register_descriptor_bind<S: ReferenceState>(ctx: &mut DispatchContext<'_, S>, behavior: &mut BehaviorRecord, id: CmdBufId, set: vk::DescriptorSet) {
    let set_addr = ctx.addresses.address_of(Handle::descriptor_set(set).into());
    behavior.read(set_addr);
    let Some(resources) = ctx.state.descriptor_set_resources(set) else {
        log::error!("descriptor set {:?} not found in reference state", set);
        return;
    };
    for resource in resources {
        match resource {
            DescriptorResource::Buffer(buffer) => {
                let handle_addr = ctx.addresses.address_of(Handle::buffer(buffer).into());
                let data_addrs: Vec<StateAddress> = ctx
                    .memory
                    .bindings_for_buffer(buffer, ctx.state)
                    .into_iter()
                    .map(|b| ctx.addresses.address_of(StateKey::BindingData(b)))
                    .collect();
                ctx.commands.append_record(id, DeferredClosure::AddModify(handle_addr));
                ctx.commands.append_record(id, DeferredClosure::ModifyBindings(data_addrs));
            }
            DescriptorResource::ImageView(view) => {
                let handle_addr = ctx.addresses.address_of(Handle::image_view(view).into());
                ctx.commands.append_record(id, DeferredClosure::AddRead(handle_addr));
                if let Some(image) = ctx.state.image_view_image(view) {
                    let data_addrs: Vec<StateAddress> = ctx
                        .memory
                        .bindings_for_image(image, ctx.state)
                        .into_iter()
                        .map(|b| ctx.addresses.address_of(StateKey::BindingData(b)))
                        .collect();
                    ctx.commands.append_record(id, DeferredClosure::ReadBindings(data_addrs));
                }
            }
            DescriptorResource::BufferView(view) => {
                let handle_addr = ctx.addresses.address_of(Handle::buffer_view(view).into());
                ctx.commands.append_record(id, DeferredClosure::AddRead(handle_addr));
                if let Some(buffer) = ctx.state.buffer_view_buffer(view) {
                    let data_addrs: Vec<StateAddress> = ctx
                        .memory
                        .bindings_for_buffer(buffer, ctx.state)
                        .into_iter()
                        .map(|b| ctx.addresses.address_of(StateKey::BindingData(b)))
                        .collect();
                    ctx.commands.append_record(id, DeferredClosure::ReadBindings(data_addrs));
                }
            }
            // Samplers carry no backing memory and aren't among the
            // resource kinds §4.5's BindDescriptorSets paragraph enumerates
            // (buffer/image/buffer-view bindings only): no replay effect.
            DescriptorResource::Sampler(_) => {}
            DescriptorResource::Unsupported => {}
        }
    }
}

/// Registers a render pass begin's per-attachment effect (§4.5): load/store
/// op pairs select between write/modify/read/no-op, resolved against the
/// framebuffer's attachments now but replayed at submit.
fn register_render_pass_begin<S: ReferenceState>(ctx: &mut DispatchContext<'_, S>, id: CmdBufId, framebuffer: vk::Framebuffer, render_pass: vk::RenderPass) {
    let Some(attachments) = ctx.state.framebuffer_attachments(framebuffer) else {
        log::error!("framebuffer {:?} not found in reference state", framebuffer);
        return;
    };
    let Some(ops) = ctx.state.render_pass_attachment_ops(render_pass) else {
        log::error!("render pass {:?} not found in reference state", render_pass);
        return;
    };
    for (view, (load_op, store_op)) in attachments.into_iter().zip(ops.into_iter()) {
        let Some(image) = ctx.state.image_view_image(view) else { continue };
        let data_addrs: Vec<StateAddress> = ctx
            .memory
            .bindings_for_image(image, ctx.state)
            .into_iter()
            .map(|b| ctx.addresses.address_of(StateKey::BindingData(b)))
            .collect();
        let load_is_load = load_op == vk::AttachmentLoadOp::LOAD;
        let store_is_dont_care = store_op == vk::AttachmentStoreOp::DONT_CARE;
        let closure = match (load_is_load, store_is_dont_care) {
            (false, false) => Some(DeferredClosure::WriteBindings(data_addrs)),
            (true, false) => Some(DeferredClosure::ModifyBindings(data_addrs)),
            (true, true) => Some(DeferredClosure::ReadBindings(data_addrs)),
            (false, true) => None,
        };
        if let Some(closure) = closure {
            ctx.commands.append_record(id, closure);
        }
    }
}
