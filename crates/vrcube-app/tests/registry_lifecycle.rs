//! Lifecycle of per-context resources, driven through a recording backend.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use glam::{Mat4, Vec3};

use vrcube_app::config::{ColorScheme, RenderMode, SceneConfig};
use vrcube_app::error::RenderError;
use vrcube_app::gpu::{
    BufferKind, DrawCall, FrameUniforms, GpuBackend, ResourceBundle, ShaderSource, ShaderStage,
    VertexLayout, compile, link,
};
use vrcube_app::registry::{ContextResourceRegistry, SlotState};
use vrcube_app::scene::{CubeGeometry, MAX_LIGHTS, PointLight, SceneState};
use vrcube_engine::core::ContextId;

// ── recording backend ─────────────────────────────────────────────────────

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn next_handle() -> u64 {
    NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateProgram(u64),
    CreateBuffer { handle: u64, kind: BufferKind, size: u64 },
    Write { buffer: u64, offset: u64, len: u64 },
    CreateVertexArray(u64),
    Release(u64),
}

#[derive(Debug, Clone, Default)]
struct Ledger(Arc<Mutex<Vec<Call>>>);

impl Ledger {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DrawRecord {
    vertex_array: u64,
    draw: DrawCall,
    light_count: u32,
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
}

struct RecordingBackend {
    ledger: Ledger,
    fail_link: bool,
}

impl RecordingBackend {
    fn new(ledger: &Ledger) -> Self {
        Self {
            ledger: ledger.clone(),
            fail_link: false,
        }
    }

    fn failing_link(ledger: &Ledger) -> Self {
        Self {
            ledger: ledger.clone(),
            fail_link: true,
        }
    }
}

impl GpuBackend for RecordingBackend {
    type Program = u64;
    type Buffer = u64;
    type VertexArray = u64;
    type Target<'t> = Vec<DrawRecord>;

    fn create_program(&self, vertex: &ShaderSource, fragment: &ShaderSource) -> Result<u64, RenderError> {
        let vs = compile(vertex)?;
        let fs = compile(fragment)?;
        link(&vs, &fs)?;
        if self.fail_link {
            return Err(RenderError::ProgramLink {
                log: "driver refused the program".into(),
            });
        }

        let handle = next_handle();
        self.ledger.push(Call::CreateProgram(handle));
        Ok(handle)
    }

    fn create_buffer(&self, kind: BufferKind, size: u64, _label: &str) -> Result<u64, RenderError> {
        let handle = next_handle();
        self.ledger.push(Call::CreateBuffer { handle, kind, size });
        Ok(handle)
    }

    fn write_buffer(&self, buffer: &u64, offset: u64, bytes: &[u8]) -> Result<(), RenderError> {
        self.ledger.push(Call::Write {
            buffer: *buffer,
            offset,
            len: bytes.len() as u64,
        });
        Ok(())
    }

    fn create_vertex_array(&self, _program: &u64, layout: &VertexLayout) -> Result<u64, RenderError> {
        assert_eq!(layout.attributes.len(), 3);
        let handle = next_handle();
        self.ledger.push(Call::CreateVertexArray(handle));
        Ok(handle)
    }

    fn draw(
        &self,
        target: &mut Vec<DrawRecord>,
        resources: &ResourceBundle<Self>,
        uniforms: &FrameUniforms,
    ) -> Result<(), RenderError> {
        target.push(DrawRecord {
            vertex_array: resources.vertex_array,
            draw: resources.draw,
            light_count: uniforms.light_count,
            model: uniforms.model,
            view: uniforms.view,
        });
        Ok(())
    }

    fn take_driver_errors(&self) -> Vec<String> {
        Vec::new()
    }

    fn release(&self, resources: ResourceBundle<Self>) {
        for handle in [
            resources.program,
            resources.vertex_buffer,
            resources.index_buffer,
            resources.instance_buffer,
            resources.vertex_array,
        ] {
            self.ledger.push(Call::Release(handle));
        }
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

fn scene_with(config: SceneConfig) -> SceneState {
    let mut scene = SceneState::initialize(&config, &CubeGeometry::new(config.color_scheme)).unwrap();
    scene.update(0.0).unwrap();
    scene
}

fn white_scene() -> SceneState {
    scene_with(SceneConfig {
        color_scheme: ColorScheme::Uniform,
        ..SceneConfig::default()
    })
}

fn handles(registry: &ContextResourceRegistry<RecordingBackend>, id: ContextId) -> [u64; 5] {
    registry
        .with_resources(id, |b| {
            [
                b.program,
                b.vertex_buffer,
                b.index_buffer,
                b.instance_buffer,
                b.vertex_array,
            ]
        })
        .unwrap()
}

fn draw(
    registry: &ContextResourceRegistry<RecordingBackend>,
    id: ContextId,
    scene: &SceneState,
) -> Result<Vec<DrawRecord>, RenderError> {
    let mut target = Vec::new();
    registry.draw_context(id, &mut target, Mat4::IDENTITY, Mat4::IDENTITY, scene)?;
    Ok(target)
}

// ── concurrency ───────────────────────────────────────────────────────────

#[test]
fn concurrent_contexts_get_disjoint_handles() {
    let registry = ContextResourceRegistry::new();
    let scene = white_scene();
    let ledger = Ledger::default();

    std::thread::scope(|s| {
        for i in 0..4 {
            let (registry, scene, ledger) = (&registry, &scene, &ledger);
            s.spawn(move || {
                registry
                    .initialize_context(ContextId(i), RecordingBackend::new(ledger), scene)
                    .unwrap();
            });
        }
    });

    assert_eq!(registry.len(), 4);

    let mut seen = HashSet::new();
    for i in 0..4 {
        assert_eq!(registry.state(ContextId(i)), SlotState::Initialized);
        for handle in handles(&registry, ContextId(i)) {
            assert!(seen.insert(handle), "handle {handle} shared between contexts");
        }
    }
}

#[test]
fn failed_context_leaves_others_untouched() {
    let registry = ContextResourceRegistry::new();
    let scene = white_scene();
    let ledger = Ledger::default();

    registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap();
    let err = registry
        .initialize_context(ContextId(1), RecordingBackend::failing_link(&ledger), &scene)
        .unwrap_err();

    assert!(matches!(err, RenderError::ProgramLink { .. }));
    assert!(err.is_fatal());
    assert_eq!(registry.state(ContextId(1)), SlotState::Unallocated);
    assert_eq!(draw(&registry, ContextId(0), &scene).unwrap().len(), 1);
}

// ── state machine ─────────────────────────────────────────────────────────

#[test]
fn draw_before_initialize_fails_fast() {
    let registry = ContextResourceRegistry::<RecordingBackend>::new();
    let scene = white_scene();

    let err = draw(&registry, ContextId(7), &scene).unwrap_err();
    assert!(matches!(err, RenderError::NotInitialized(ContextId(7))));
    assert_eq!(registry.state(ContextId(7)), SlotState::Unallocated);
}

#[test]
fn second_initialize_is_rejected() {
    let registry = ContextResourceRegistry::new();
    let scene = white_scene();
    let ledger = Ledger::default();

    registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap();
    let before = handles(&registry, ContextId(0));

    let err = registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap_err();
    assert!(matches!(err, RenderError::AlreadyInitialized(ContextId(0))));
    assert_eq!(handles(&registry, ContextId(0)), before);
}

#[test]
fn retry_after_failed_initialize_reports_the_failure() {
    let registry = ContextResourceRegistry::new();
    let scene = white_scene();
    let ledger = Ledger::default();

    registry
        .initialize_context(ContextId(2), RecordingBackend::failing_link(&ledger), &scene)
        .unwrap_err();

    let err = registry
        .initialize_context(ContextId(2), RecordingBackend::new(&ledger), &scene)
        .unwrap_err();
    assert!(matches!(err, RenderError::InitializationFailed(ContextId(2))));
    assert!(err.to_string().contains("failed to initialize"));
    assert_eq!(registry.state(ContextId(2)), SlotState::Unallocated);
}

#[test]
fn release_all_is_terminal() {
    let registry = ContextResourceRegistry::new();
    let scene = white_scene();
    let ledger = Ledger::default();

    for i in 0..2 {
        registry
            .initialize_context(ContextId(i), RecordingBackend::new(&ledger), &scene)
            .unwrap();
    }
    let owned: HashSet<u64> = (0..2).flat_map(|i| handles(&registry, ContextId(i))).collect();

    assert_eq!(registry.release_all(), 2);

    let released: HashSet<u64> = ledger
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Release(h) => Some(h),
            _ => None,
        })
        .collect();
    assert_eq!(released, owned);

    for i in 0..2 {
        assert_eq!(registry.state(ContextId(i)), SlotState::Released);
        assert!(matches!(
            draw(&registry, ContextId(i), &scene),
            Err(RenderError::Released(_))
        ));
    }
    assert!(matches!(
        registry.initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene),
        Err(RenderError::Released(ContextId(0)))
    ));

    // Nothing left to release.
    assert_eq!(registry.release_all(), 0);
}

// ── resource layout ───────────────────────────────────────────────────────

#[test]
fn vertex_attributes_are_uploaded_as_three_blocks() {
    let registry = ContextResourceRegistry::new();
    let scene = white_scene();
    let ledger = Ledger::default();

    registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap();
    let [_, vbo, ibo, instances, _] = handles(&registry, ContextId(0));
    let calls = ledger.calls();

    assert!(calls.contains(&Call::CreateBuffer {
        handle: vbo,
        kind: BufferKind::Vertex,
        size: 3 * 24 * 12,
    }));

    let vbo_writes: Vec<(u64, u64)> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Write { buffer, offset, len } if *buffer == vbo => Some((*offset, *len)),
            _ => None,
        })
        .collect();
    assert_eq!(vbo_writes, vec![(0, 288), (288, 288), (576, 288)]);

    assert!(calls.contains(&Call::Write {
        buffer: ibo,
        offset: 0,
        len: 36 * 4,
    }));
    assert!(calls.contains(&Call::Write {
        buffer: instances,
        offset: 0,
        len: 64,
    }));
}

#[test]
fn draw_covers_whole_index_buffer() {
    let registry = ContextResourceRegistry::new();
    let scene = white_scene();
    let ledger = Ledger::default();

    registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap();
    let records = draw(&registry, ContextId(0), &scene).unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(
        record.draw,
        DrawCall {
            index_count: 36,
            instance_count: 1
        }
    );
    assert_eq!(record.light_count, 3);
    assert_eq!(record.model, scene.model_transform().to_cols_array_2d());
}

#[test]
fn each_draw_in_a_frame_keeps_its_own_view() {
    let registry = ContextResourceRegistry::new();
    let scene = white_scene();
    let ledger = Ledger::default();

    registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap();

    let left = Mat4::from_translation(Vec3::new(0.03, 0.0, 0.0));
    let right = Mat4::from_translation(Vec3::new(-0.03, 0.0, 0.0));
    let mut target = Vec::new();
    for view in [left, right] {
        registry
            .draw_context(ContextId(0), &mut target, view, Mat4::IDENTITY, &scene)
            .unwrap();
    }

    let views: Vec<_> = target.iter().map(|r| r.view).collect();
    assert_eq!(views, vec![left.to_cols_array_2d(), right.to_cols_array_2d()]);
}

#[test]
fn instanced_mode_draws_every_instance() {
    let registry = ContextResourceRegistry::new();
    let scene = scene_with(SceneConfig {
        render_mode: RenderMode::Instanced {
            columns: 4,
            rows: 3,
            spacing: 3.0,
        },
        ..SceneConfig::default()
    });
    let ledger = Ledger::default();

    registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap();
    let [_, _, _, instances, _] = handles(&registry, ContextId(0));

    assert!(ledger.calls().contains(&Call::CreateBuffer {
        handle: instances,
        kind: BufferKind::Instance,
        size: 12 * 64,
    }));
    let records = draw(&registry, ContextId(0), &scene).unwrap();
    assert_eq!(records[0].draw.instance_count, 12);
}

#[test]
fn light_count_is_capped_at_shader_maximum() {
    let registry = ContextResourceRegistry::new();
    let mut scene = white_scene();
    while scene.push_light(PointLight::new(Vec3::X, Vec3::ONE)).is_ok() {}
    let ledger = Ledger::default();

    registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap();
    let records = draw(&registry, ContextId(0), &scene).unwrap();
    assert_eq!(records[0].light_count as usize, MAX_LIGHTS);
}

// ── shader failures ───────────────────────────────────────────────────────

#[test]
fn broken_shader_is_fatal_and_allocates_nothing() {
    let broken = ShaderSource::new(
        ShaderStage::Vertex,
        "broken",
        "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return undefined_name; }",
    );
    let registry = ContextResourceRegistry::with_shaders(broken, ShaderSource::cube_fragment());
    let scene = white_scene();
    let ledger = Ledger::default();

    let err = registry
        .initialize_context(ContextId(0), RecordingBackend::new(&ledger), &scene)
        .unwrap_err();

    match &err {
        RenderError::ShaderCompile { stage, log } => {
            assert_eq!(*stage, ShaderStage::Vertex);
            assert!(log.contains("undefined_name"));
        }
        other => panic!("expected compile error, got {other}"),
    }
    assert!(err.is_fatal());
    assert!(ledger.calls().is_empty());
    assert!(matches!(
        draw(&registry, ContextId(0), &scene),
        Err(RenderError::NotInitialized(_))
    ));
}
