//! The atom type: one captured Vulkan API call with its decoded
//! parameters.
//!
//! Parameter decoding itself (reading pointer/slice fields out of the
//! capture's backing bytes) is the `AtomDecoder` collaborator's job and is
//! out of scope here: by the time an [`Atom`] reaches the dispatcher its
//! fields are already plain values, carrying exactly what each dispatch
//! branch in [`crate::dispatcher`] needs and nothing else.

use ash::vk;

/// A resource referenced by a `VK_STRUCTURE_TYPE_DEDICATED_ALLOCATION_MEMORY_ALLOCATE_INFO_NV`
/// chained off `AllocateMemory`, if one was present and non-null (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedicatedResource {
    None,
    Image(vk::Image),
    Buffer(vk::Buffer),
}

/// One write entry of `UpdateDescriptorSets`/`RecreateDescriptorSet`.
#[derive(Debug, Clone)]
pub struct DescriptorWrite {
    pub dst_set: vk::DescriptorSet,
    pub samplers: Vec<vk::Sampler>,
    pub image_views: Vec<vk::ImageView>,
    pub buffers: Vec<vk::Buffer>,
    pub buffer_views: Vec<vk::BufferView>,
    /// `true` if this write named a descriptor type this crate does not
    /// recognize (§4.5, `UnknownDescriptorType`).
    pub unknown_type: bool,
}

/// One copy entry of `UpdateDescriptorSets` (unsupported in the Recreate
/// variant, §9).
#[derive(Debug, Clone, Copy)]
pub struct DescriptorCopy {
    pub src_set: vk::DescriptorSet,
    pub dst_set: vk::DescriptorSet,
}

/// One captured Vulkan call, decoded. Recreate-twins of a `VkCmd*`/state
/// command share the same variant as their live counterpart except where
/// the data model says their behavior genuinely differs (Begin/End
/// command buffer, descriptor writes).
#[derive(Debug, Clone)]
pub enum Atom {
    // --- Object creation (§4.5 "Object creation") ---
    CreateImage { image: vk::Image },
    CreateBuffer { buffer: vk::Buffer },
    CreateImageView { view: vk::ImageView, image: vk::Image },
    CreateBufferView { view: vk::BufferView, buffer: vk::Buffer },
    CreateFramebuffer { framebuffer: vk::Framebuffer, render_pass: vk::RenderPass, attachments: Vec<vk::ImageView> },
    CreateRenderPass { render_pass: vk::RenderPass },
    CreateGraphicsPipelines { pipelines: Vec<vk::Pipeline>, shader_modules: Vec<vk::ShaderModule>, render_pass: vk::RenderPass },
    CreateComputePipelines { pipelines: Vec<vk::Pipeline>, shader_modules: Vec<vk::ShaderModule> },
    CreateShaderModule { module: vk::ShaderModule },

    // --- Memory allocation ---
    AllocateMemory { memory: vk::DeviceMemory, dedicated: DedicatedResource },

    // --- Binding ---
    BindImageMemory { image: vk::Image, memory: vk::DeviceMemory, offset: vk::DeviceSize, size: vk::DeviceSize },
    BindBufferMemory { buffer: vk::Buffer, memory: vk::DeviceMemory, offset: vk::DeviceSize, size: vk::DeviceSize },

    // --- Raw recreated data ---
    RecreateImageData { image: vk::Image },
    RecreateBufferData { buffer: vk::Buffer },

    // --- Destroy / Free ---
    DestroyImage { image: vk::Image },
    DestroyBuffer { buffer: vk::Buffer },
    FreeMemory { memory: vk::DeviceMemory },

    // --- Map/Unmap ---
    MapMemory { memory: vk::DeviceMemory },
    UnmapMemory { memory: vk::DeviceMemory },

    // --- Flush/Invalidate ---
    FlushMappedMemoryRanges { ranges: Vec<(vk::DeviceMemory, vk::DeviceSize, vk::DeviceSize)> },
    InvalidateMappedMemoryRanges { ranges: Vec<(vk::DeviceMemory, vk::DeviceSize, vk::DeviceSize)> },

    // --- Descriptor updates ---
    UpdateDescriptorSets { writes: Vec<DescriptorWrite>, copies: Vec<DescriptorCopy> },
    RecreateDescriptorSet { writes: Vec<DescriptorWrite> },

    // --- Command-buffer lifecycle ---
    BeginCommandBuffer { command_buffer: vk::CommandBuffer },
    EndCommandBuffer { command_buffer: vk::CommandBuffer },
    RecreateAndBeginCommandBuffer { command_buffer: vk::CommandBuffer },
    RecreateEndCommandBuffer { command_buffer: vk::CommandBuffer },

    // --- Pure recorded commands: a no-op closure, just cmdbuf read/modify ---
    CmdDraw { command_buffer: vk::CommandBuffer },
    CmdDrawIndexed { command_buffer: vk::CommandBuffer },
    CmdDispatch { command_buffer: vk::CommandBuffer },
    CmdEndRenderPass { command_buffer: vk::CommandBuffer },
    CmdPushConstants { command_buffer: vk::CommandBuffer },
    CmdSetViewport { command_buffer: vk::CommandBuffer },
    CmdSetScissor { command_buffer: vk::CommandBuffer },
    CmdSetLineWidth { command_buffer: vk::CommandBuffer },
    CmdSetDepthBias { command_buffer: vk::CommandBuffer },
    CmdSetBlendConstants { command_buffer: vk::CommandBuffer },
    CmdClearAttachments { command_buffer: vk::CommandBuffer },
    CmdClearColorImage { command_buffer: vk::CommandBuffer },
    CmdClearDepthStencilImage { command_buffer: vk::CommandBuffer },
    CmdBeginQuery { command_buffer: vk::CommandBuffer },
    CmdEndQuery { command_buffer: vk::CommandBuffer },
    CmdResetQueryPool { command_buffer: vk::CommandBuffer },
    CmdPipelineBarrier { command_buffer: vk::CommandBuffer },
    CmdNextSubpass { command_buffer: vk::CommandBuffer },

    // --- Recorded commands that read the indirect buffer at record time
    // (§9 open question: preserved deliberately) ---
    CmdDrawIndirect { command_buffer: vk::CommandBuffer, buffer: vk::Buffer },
    CmdDrawIndexedIndirect { command_buffer: vk::CommandBuffer, buffer: vk::Buffer },
    CmdDispatchIndirect { command_buffer: vk::CommandBuffer, buffer: vk::Buffer },

    // --- Recorded with deferred memory access ---
    CmdCopyImage { command_buffer: vk::CommandBuffer, src: vk::Image, dst: vk::Image },
    CmdBlitImage { command_buffer: vk::CommandBuffer, src: vk::Image, dst: vk::Image },
    CmdResolveImage { command_buffer: vk::CommandBuffer, src: vk::Image, dst: vk::Image },
    CmdCopyBuffer { command_buffer: vk::CommandBuffer, src: vk::Buffer, dst: vk::Buffer },
    CmdCopyBufferToImage { command_buffer: vk::CommandBuffer, src: vk::Buffer, dst: vk::Image },
    CmdCopyImageToBuffer { command_buffer: vk::CommandBuffer, src: vk::Image, dst: vk::Buffer },
    CmdFillBuffer { command_buffer: vk::CommandBuffer, dst: vk::Buffer },
    CmdUpdateBuffer { command_buffer: vk::CommandBuffer, dst: vk::Buffer },
    CmdCopyQueryPoolResults { command_buffer: vk::CommandBuffer, dst: vk::Buffer },

    // --- Vertex/index buffer bind ---
    CmdBindVertexBuffers { command_buffer: vk::CommandBuffer, buffers: Vec<vk::Buffer> },
    CmdBindIndexBuffer { command_buffer: vk::CommandBuffer, buffer: vk::Buffer },

    // --- Descriptor set bind ---
    CmdBindDescriptorSets { command_buffer: vk::CommandBuffer, sets: Vec<vk::DescriptorSet> },

    // --- Pipeline bind ---
    CmdBindPipeline { command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline },

    // --- Secondary command buffer replay ---
    CmdExecuteCommands { command_buffer: vk::CommandBuffer, secondary: Vec<vk::CommandBuffer> },

    // --- Render pass begin ---
    CmdBeginRenderPass { command_buffer: vk::CommandBuffer, framebuffer: vk::Framebuffer, render_pass: vk::RenderPass },
    RecreateCmdBeginRenderPass { command_buffer: vk::CommandBuffer, framebuffer: vk::Framebuffer, render_pass: vk::RenderPass },

    // --- Submission / presentation ---
    QueueSubmit { queue: vk::Queue, command_buffers: Vec<vk::CommandBuffer> },
    QueuePresentKHR { queue: vk::Queue },

    /// Any atom variant this crate does not recognize. Always conservative
    /// (§4.5 "Default (unhandled atom)").
    Unknown,
}

impl Atom {
    /// The command buffer a recorded (`VkCmd*`/`RecreateCmd*`) atom was
    /// issued against, if this atom is one.
    pub fn command_buffer(&self) -> Option<vk::CommandBuffer> {
        use Atom::*;
        match self {
            BeginCommandBuffer { command_buffer }
            | EndCommandBuffer { command_buffer }
            | RecreateAndBeginCommandBuffer { command_buffer }
            | RecreateEndCommandBuffer { command_buffer }
            | CmdDraw { command_buffer }
            | CmdDrawIndexed { command_buffer }
            | CmdDispatch { command_buffer }
            | CmdEndRenderPass { command_buffer }
            | CmdPushConstants { command_buffer }
            | CmdSetViewport { command_buffer }
            | CmdSetScissor { command_buffer }
            | CmdSetLineWidth { command_buffer }
            | CmdSetDepthBias { command_buffer }
            | CmdSetBlendConstants { command_buffer }
            | CmdClearAttachments { command_buffer }
            | CmdClearColorImage { command_buffer }
            | CmdClearDepthStencilImage { command_buffer }
            | CmdBeginQuery { command_buffer }
            | CmdEndQuery { command_buffer }
            | CmdResetQueryPool { command_buffer }
            | CmdPipelineBarrier { command_buffer }
            | CmdNextSubpass { command_buffer }
            | CmdDrawIndirect { command_buffer, .. }
            | CmdDrawIndexedIndirect { command_buffer, .. }
            | CmdDispatchIndirect { command_buffer, .. }
            | CmdCopyImage { command_buffer, .. }
            | CmdBlitImage { command_buffer, .. }
            | CmdResolveImage { command_buffer, .. }
            | CmdCopyBuffer { command_buffer, .. }
            | CmdCopyBufferToImage { command_buffer, .. }
            | CmdCopyImageToBuffer { command_buffer, .. }
            | CmdFillBuffer { command_buffer, .. }
            | CmdUpdateBuffer { command_buffer, .. }
            | CmdCopyQueryPoolResults { command_buffer, .. }
            | CmdBindVertexBuffers { command_buffer, .. }
            | CmdBindIndexBuffer { command_buffer, .. }
            | CmdBindDescriptorSets { command_buffer, .. }
            | CmdBindPipeline { command_buffer, .. }
            | CmdExecuteCommands { command_buffer, .. }
            | CmdBeginRenderPass { command_buffer, .. }
            | RecreateCmdBeginRenderPass { command_buffer, .. } => Some(*command_buffer),
            _ => None,
        }
    }
}
