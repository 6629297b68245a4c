//! End-to-end scenarios over the fake capture/state framework, covering
//! the data-model walkthroughs from the design's testable-properties
//! section: allocate+bind+write, record-and-submit, dual submit, destroy
//! retention, render-pass load/store, and unknown-atom retention.

mod framework;

use ash::vk;
use ash::vk::Handle as _;

use framework::{handle_buffer, handle_cmdbuf, handle_image, handle_memory, handle_queue, FailingCapture, FakeCapture, FakeState};
use vk_depgraph::prelude::*;

fn build(atoms: Vec<Atom>) -> DependencyGraph {
    GraphBuilder::new().build_graph(&FakeCapture::new(atoms)).expect("fake capture build should not fail")
}

fn only_key(graph: &DependencyGraph, addrs: &[StateAddress]) -> StateKey {
    assert_eq!(addrs.len(), 1, "expected exactly one address, got {:?}", addrs);
    graph.address_map().key_of(addrs[0]).expect("address should resolve to a key")
}

#[test]
fn s1_allocate_bind_and_recreate_data() {
    let memory = handle_memory(1);
    let buffer = handle_buffer(1);
    let atoms = vec![
        Atom::AllocateMemory { memory, dedicated: DedicatedResource::None },
        Atom::CreateBuffer { buffer },
        Atom::BindBufferMemory { buffer, memory, offset: 0, size: 64 },
        Atom::RecreateBufferData { buffer },
    ];
    let graph = build(atoms);

    let b0 = graph.behavior(0).unwrap();
    assert!(matches!(only_key(&graph, &b0.writes), StateKey::Memory(_)));

    let b1 = graph.behavior(1).unwrap();
    let buffer_addr = b1.writes[0];
    assert!(matches!(graph.address_map().key_of(buffer_addr).unwrap(), StateKey::Handle(h) if h == Handle::buffer(buffer)));

    let b2 = graph.behavior(2).unwrap();
    assert_eq!(b2.modifies, vec![buffer_addr]);
    assert_eq!(b2.reads.len(), 1);
    assert!(matches!(graph.address_map().key_of(b2.reads[0]).unwrap(), StateKey::MemoryHandle(_)));
    assert_eq!(b2.writes.len(), 1);
    let binding_addr = b2.writes[0];
    assert!(matches!(graph.address_map().key_of(binding_addr).unwrap(), StateKey::Binding(_)));

    let b3 = graph.behavior(3).unwrap();
    assert_eq!(b3.modifies, vec![buffer_addr]);
    assert_eq!(b3.writes.len(), 1);
    let data_addr = b3.writes[0];
    assert!(matches!(graph.address_map().key_of(data_addr).unwrap(), StateKey::BindingData(_)));
    assert_eq!(graph.address_map().parent_of(data_addr), binding_addr);
}

#[test]
fn s2_record_and_submit_materializes_fill_buffer() {
    let memory = handle_memory(1);
    let buffer = handle_buffer(1);
    let cmdbuf = handle_cmdbuf(1);
    let queue = handle_queue(1);
    let atoms = vec![
        Atom::AllocateMemory { memory, dedicated: DedicatedResource::None },
        Atom::CreateBuffer { buffer },
        Atom::BindBufferMemory { buffer, memory, offset: 0, size: 64 },
        Atom::BeginCommandBuffer { command_buffer: cmdbuf },
        Atom::CmdFillBuffer { command_buffer: cmdbuf, dst: buffer },
        Atom::EndCommandBuffer { command_buffer: cmdbuf },
        Atom::QueueSubmit { queue, command_buffers: vec![cmdbuf] },
    ];
    let graph = build(atoms);

    let record_behavior = graph.behavior(4).unwrap();
    assert!(matches!(graph.address_map().key_of(record_behavior.reads[0]).unwrap(), StateKey::CommandBufferHandle(_)));
    assert!(matches!(graph.address_map().key_of(record_behavior.modifies[0]).unwrap(), StateKey::CommandBufferRecords(_)));

    let submit_behavior = graph.behavior(6).unwrap();
    assert!(submit_behavior.keep_alive);
    assert!(submit_behavior.reads.iter().any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::CommandBuffer(_)))));
    assert!(submit_behavior
        .modifies
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
}

#[test]
fn s3_dual_submit_replays_closures_each_time() {
    let memory = handle_memory(1);
    let buffer = handle_buffer(1);
    let cmdbuf = handle_cmdbuf(1);
    let queue = handle_queue(1);
    let atoms = vec![
        Atom::AllocateMemory { memory, dedicated: DedicatedResource::None },
        Atom::CreateBuffer { buffer },
        Atom::BindBufferMemory { buffer, memory, offset: 0, size: 64 },
        Atom::BeginCommandBuffer { command_buffer: cmdbuf },
        Atom::CmdFillBuffer { command_buffer: cmdbuf, dst: buffer },
        Atom::EndCommandBuffer { command_buffer: cmdbuf },
        Atom::QueueSubmit { queue, command_buffers: vec![cmdbuf] },
        Atom::QueueSubmit { queue, command_buffers: vec![cmdbuf] },
    ];
    let graph = build(atoms);

    let first = graph.behavior(6).unwrap();
    let second = graph.behavior(7).unwrap();
    let first_data: Vec<StateKey> = first
        .modifies
        .iter()
        .filter_map(|a| graph.address_map().key_of(*a))
        .filter(|k| matches!(k, StateKey::BindingData(_)))
        .collect();
    let second_data: Vec<StateKey> = second
        .modifies
        .iter()
        .filter_map(|a| graph.address_map().key_of(*a))
        .filter(|k| matches!(k, StateKey::BindingData(_)))
        .collect();
    assert!(!first_data.is_empty());
    assert_eq!(first_data, second_data);
}

#[test]
fn s4_destroy_marks_keep_alive() {
    let image = handle_image(1);
    let atoms = vec![Atom::CreateImage { image }, Atom::DestroyImage { image }];
    let graph = build(atoms);

    let created = graph.behavior(0).unwrap();
    let destroyed = graph.behavior(1).unwrap();
    assert!(!created.is_empty());
    assert!(!destroyed.is_empty());
    assert!(destroyed.keep_alive);
}

#[test]
fn s5_render_pass_load_store_modifies_attachment() {
    let memory = handle_memory(1);
    let image = handle_image(1);
    let view = vk::ImageView::from_raw(1);
    let framebuffer = vk::Framebuffer::from_raw(1);
    let render_pass = vk::RenderPass::from_raw(1);
    let cmdbuf = handle_cmdbuf(1);
    let queue = handle_queue(1);

    let mut template = FakeState::default();
    template.set_render_pass(render_pass, vec![(vk::AttachmentLoadOp::LOAD, vk::AttachmentStoreOp::STORE)]);

    let atoms = vec![
        Atom::CreateImage { image },
        Atom::BindImageMemory { image, memory, offset: 0, size: 256 },
        Atom::CreateImageView { view, image },
        Atom::CreateFramebuffer { framebuffer, render_pass, attachments: vec![view] },
        Atom::CreateRenderPass { render_pass },
        Atom::BeginCommandBuffer { command_buffer: cmdbuf },
        Atom::CmdBeginRenderPass { command_buffer: cmdbuf, framebuffer, render_pass },
        Atom::CmdEndRenderPass { command_buffer: cmdbuf },
        Atom::EndCommandBuffer { command_buffer: cmdbuf },
        Atom::QueueSubmit { queue, command_buffers: vec![cmdbuf] },
    ];
    let graph = GraphBuilder::new()
        .build_graph(&FakeCapture::with_template(atoms, template))
        .expect("fake capture build should not fail");

    let submit_behavior = graph.behavior(9).unwrap();
    assert!(submit_behavior
        .modifies
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
}

#[test]
fn s6_unknown_atom_is_retained_with_empty_behavior() {
    let graph = build(vec![Atom::Unknown]);
    let behavior = graph.behavior(0).unwrap();
    assert!(behavior.keep_alive);
    assert!(behavior.is_empty());
}

fn render_pass_scenario(ops: (vk::AttachmentLoadOp, vk::AttachmentStoreOp)) -> DependencyGraph {
    let memory = handle_memory(1);
    let image = handle_image(1);
    let view = vk::ImageView::from_raw(1);
    let framebuffer = vk::Framebuffer::from_raw(1);
    let render_pass = vk::RenderPass::from_raw(1);
    let cmdbuf = handle_cmdbuf(1);
    let queue = handle_queue(1);

    let mut template = FakeState::default();
    template.set_render_pass(render_pass, vec![ops]);

    let atoms = vec![
        Atom::CreateImage { image },
        Atom::BindImageMemory { image, memory, offset: 0, size: 256 },
        Atom::CreateImageView { view, image },
        Atom::CreateFramebuffer { framebuffer, render_pass, attachments: vec![view] },
        Atom::CreateRenderPass { render_pass },
        Atom::BeginCommandBuffer { command_buffer: cmdbuf },
        Atom::CmdBeginRenderPass { command_buffer: cmdbuf, framebuffer, render_pass },
        Atom::CmdEndRenderPass { command_buffer: cmdbuf },
        Atom::EndCommandBuffer { command_buffer: cmdbuf },
        Atom::QueueSubmit { queue, command_buffers: vec![cmdbuf] },
    ];
    GraphBuilder::new()
        .build_graph(&FakeCapture::with_template(atoms, template))
        .expect("fake capture build should not fail")
}

#[test]
fn s5_render_pass_clear_and_store_writes_attachment() {
    let graph = render_pass_scenario((vk::AttachmentLoadOp::CLEAR, vk::AttachmentStoreOp::STORE));
    let submit_behavior = graph.behavior(9).unwrap();
    assert!(submit_behavior
        .writes
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
    assert!(!submit_behavior
        .modifies
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
}

#[test]
fn s5_render_pass_load_and_dont_care_reads_attachment() {
    let graph = render_pass_scenario((vk::AttachmentLoadOp::LOAD, vk::AttachmentStoreOp::DONT_CARE));
    let submit_behavior = graph.behavior(9).unwrap();
    assert!(submit_behavior
        .reads
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
    assert!(!submit_behavior
        .modifies
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
    assert!(!submit_behavior
        .writes
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
}

#[test]
fn s5_render_pass_clear_and_dont_care_has_no_attachment_effect() {
    let graph = render_pass_scenario((vk::AttachmentLoadOp::CLEAR, vk::AttachmentStoreOp::DONT_CARE));
    let submit_behavior = graph.behavior(9).unwrap();
    assert!(!submit_behavior
        .reads
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
    assert!(!submit_behavior
        .modifies
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
    assert!(!submit_behavior
        .writes
        .iter()
        .any(|a| matches!(graph.address_map().key_of(*a), Some(StateKey::BindingData(_)))));
}

#[test]
fn cancellation_aborts_build_with_no_graph() {
    let token = CancellationToken::new();
    token.cancel();
    let builder = GraphBuilderConfig::new().cancellation(token).build();
    let atoms = vec![Atom::CreateBuffer { buffer: handle_buffer(1) }];
    let result = builder.build_graph(&FakeCapture::new(atoms));
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn input_unavailable_propagates_from_capture() {
    let result = GraphBuilder::new().build_graph(&FailingCapture);
    assert!(matches!(result, Err(Error::InputUnavailable(_))));
}
