//! The top-level pipeline: replays a capture's atoms through a state
//! mutator, dispatches each one, and assembles the resulting
//! [`DependencyGraph`] (§4.6).

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{error, warn};

use crate::address::{AddressMap, StateAddress};
use crate::atom::Atom;
use crate::behavior::BehaviorRecord;
use crate::command_buffer::CommandBufferModel;
use crate::dispatcher::{AtomDispatcher, DispatchContext};
use crate::error::{Error, Result};
use crate::memory::MemoryModel;
use crate::state::Capture;

/// A cooperative cancellation flag shared between the caller and the
/// running build. Checked once between every atom (§5).
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Where build timing is reported (§6 "Benchmark sink"). A real
/// integration plugs in its own counters; [`NullBenchmarkSink`] discards
/// everything, and is the default.
pub trait BenchmarkSink {
    fn record_duration(&self, counter: &str, duration: std::time::Duration);
}

/// Discards every recorded duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBenchmarkSink;

impl BenchmarkSink for NullBenchmarkSink {
    fn record_duration(&self, _counter: &str, _duration: std::time::Duration) {}
}

const BUILD_COUNTER: &str = "dependencyGraph.build";

/// The finished product of [`GraphBuilder::build`]: per-atom behaviors,
/// the canonicalized address space, and the live collaborators needed to
/// walk it (§3 "DependencyGraph").
pub struct DependencyGraph {
    behaviors: Vec<BehaviorRecord>,
    addresses: AddressMap,
    memory: MemoryModel,
    commands: CommandBufferModel,
    roots: HashSet<StateAddress>,
}

impl DependencyGraph {
    pub fn behaviors(&self) -> &[BehaviorRecord] {
        &self.behaviors
    }

    pub fn behavior(&self, atom_index: usize) -> Option<&BehaviorRecord> {
        self.behaviors.get(atom_index)
    }

    pub fn roots(&self) -> &HashSet<StateAddress> {
        &self.roots
    }

    pub fn address_map(&self) -> &AddressMap {
        &self.addresses
    }

    pub fn memory_model(&self) -> &MemoryModel {
        &self.memory
    }

    pub fn command_buffer_model(&self) -> &CommandBufferModel {
        &self.commands
    }

    /// Every address a behavior marked `keep_alive`, unioned with the
    /// explicit roots — the full live-set seed a downstream DCE consumer
    /// walks backward from via `address_map().parent_of`.
    pub fn keep_alive_roots(&self) -> impl Iterator<Item = StateAddress> + '_ {
        self.roots.iter().copied().chain(
            self.behaviors
                .iter()
                .filter(|b| b.keep_alive)
                .flat_map(|b| b.reads.iter().chain(b.modifies.iter()).chain(b.writes.iter()).copied()),
        )
    }

    /// Renders the address forest's parent edges as Graphviz dot, for
    /// diagnostics only — never on a correctness-critical path.
    pub fn address_forest_dot(&self) -> String {
        use petgraph::dot::{Config, Dot};
        use petgraph::graph::DiGraph;

        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes = Vec::with_capacity(self.addresses.len() + 1);
        nodes.push(graph.add_node("null".to_string()));
        for i in 0..self.addresses.len() {
            let addr = StateAddress(i as u32 + 1);
            let label = self.addresses.key_of(addr).map(|k| format!("{:?}", k)).unwrap_or_else(|| "?".to_string());
            nodes.push(graph.add_node(label));
        }
        for i in 0..self.addresses.len() {
            let addr = StateAddress(i as u32 + 1);
            let parent = self.addresses.parent_of(addr);
            graph.add_edge(nodes[parent.as_u32() as usize], nodes[addr.as_u32() as usize], ());
        }
        format!("{:?}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }
}

/// Builder-pattern configuration for [`GraphBuilder`], grounded on the
/// teacher's settings-builder idiom.
#[derive(Clone, Default)]
pub struct GraphBuilderConfig {
    diagnostics: bool,
    cancellation: Option<CancellationToken>,
}

impl GraphBuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gates per-atom debug logging of every read/modify/write (§6).
    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Attaches an ambient cancellation signal the build checks between
    /// atoms.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn build(self) -> GraphBuilder<NullBenchmarkSink> {
        GraphBuilder {
            config: self,
            benchmarks: NullBenchmarkSink,
        }
    }

    /// Builds a [`GraphBuilder`] reporting timing to a caller-supplied
    /// sink rather than the default no-op.
    pub fn build_with_benchmarks<B: BenchmarkSink>(self, benchmarks: B) -> GraphBuilder<B> {
        GraphBuilder { config: self, benchmarks }
    }
}

/// Owns the full build pipeline (§4.6, §5). Stateless between calls:
/// `build` may be invoked repeatedly over different captures.
pub struct GraphBuilder<B: BenchmarkSink = NullBenchmarkSink> {
    config: GraphBuilderConfig,
    benchmarks: B,
}

impl GraphBuilder<NullBenchmarkSink> {
    pub fn new() -> Self {
        GraphBuilderConfig::new().build()
    }
}

impl Default for GraphBuilder<NullBenchmarkSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BenchmarkSink> GraphBuilder<B> {
    pub fn build_graph<C: Capture>(&self, capture: &C) -> Result<DependencyGraph> {
        let start = Instant::now();
        let result = self.build_graph_inner(capture);
        self.benchmarks.record_duration(BUILD_COUNTER, start.elapsed());
        result
    }

    fn build_graph_inner<C: Capture>(&self, capture: &C) -> Result<DependencyGraph> {
        let atoms = capture.atoms()?;
        let mut state = capture.new_state();

        let mut addresses = AddressMap::new();
        let mut memory = MemoryModel::new();
        let mut commands = CommandBufferModel::new();
        let mut roots = HashSet::new();
        let mut behaviors = Vec::with_capacity(atoms.len());
        let dispatcher = AtomDispatcher::new();

        for atom in atoms {
            if let Some(token) = &self.config.cancellation {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
            }

            let behavior = match state.mutate(atom) {
                Ok(()) => {
                    let mut ctx = DispatchContext {
                        addresses: &mut addresses,
                        memory: &mut memory,
                        commands: &mut commands,
                        roots: &mut roots,
                        state: &state,
                        diagnostics: self.config.diagnostics,
                    };
                    dispatcher.dispatch(atom, &mut ctx)
                }
                Err(e) => {
                    error!("mutation failed for atom {:?}: {}", atom, e);
                    let mut behavior = BehaviorRecord::new();
                    behavior.mark_aborted();
                    behavior
                }
            };

            if matches!(atom, Atom::Unknown) {
                warn!("unrecognized atom retained conservatively");
            }

            behaviors.push(behavior);
        }

        Ok(DependencyGraph { behaviors, addresses, memory, commands, roots })
    }
}
