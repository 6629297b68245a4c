//! Re-exports the types most consumers need.

pub use ash::vk;

pub use crate::address::{AddressMap, StateAddress};
pub use crate::atom::{Atom, DedicatedResource, DescriptorCopy, DescriptorWrite};
pub use crate::behavior::BehaviorRecord;
pub use crate::command_buffer::{CommandBufferModel, DeferredClosure};
pub use crate::dispatcher::{AtomDispatcher, DispatchContext};
pub use crate::error::{Error, Result};
pub use crate::graph_builder::{BenchmarkSink, CancellationToken, DependencyGraph, GraphBuilder, GraphBuilderConfig, NullBenchmarkSink};
pub use crate::key::{BindingId, CmdBufId, Handle, HandleKind, MemoryId, StateKey};
pub use crate::memory::MemoryModel;
pub use crate::state::{Capture, DescriptorResource, ReferenceState, StateMutator};
