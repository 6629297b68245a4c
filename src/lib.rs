//! Dependency-graph builder over a captured Vulkan API trace.
//!
//! Given an ordered stream of *atoms* (decoded Vulkan calls), this crate
//! builds, for every atom, a [`BehaviorRecord`](crate::behavior::BehaviorRecord)
//! describing which abstract state cells that atom reads, modifies, and
//! writes. The result is a [`DependencyGraph`](crate::graph_builder::DependencyGraph):
//! the substrate a downstream dead-code-eliminator walks backward from a
//! set of roots to decide which atoms are live.
//!
//! This crate never executes Vulkan or emulates GPU work. The reference
//! Vulkan state used to resolve atom parameters is maintained by an
//! external [`StateMutator`](crate::state::StateMutator) implementation,
//! and the atom stream itself comes from an external
//! [`Capture`](crate::state::Capture) implementation — both are named
//! interfaces, not provided here.
//!
//! ```
//! use vk_depgraph::prelude::*;
//!
//! # fn build<C: Capture>(capture: &C) -> Result<()> {
//! let graph = GraphBuilder::new().build_graph(capture)?;
//! for root in graph.keep_alive_roots() {
//!     let _ = graph.address_map().key_of(root);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Module map:
//! - [`key`] / [`address`] — state keys and their canonicalized addresses.
//! - [`memory`] — device memories, bindings, and the overlap query.
//! - [`command_buffer`] — command buffers and their deferred closures.
//! - [`behavior`] — the per-atom read/modify/write record.
//! - [`atom`] — the decoded atom type.
//! - [`state`] — the external `Capture`/`StateMutator`/`ReferenceState` interfaces.
//! - [`dispatcher`] — the per-atom-variant behavior extractor.
//! - [`graph_builder`] — the top-level pipeline and the finished graph.

#[macro_use]
extern crate log;

pub mod address;
pub mod atom;
pub mod behavior;
pub mod command_buffer;
pub mod dispatcher;
pub mod error;
pub mod graph_builder;
pub mod key;
pub mod memory;
pub mod prelude;
pub mod state;

pub use crate::prelude::*;
