//! Per-context GPU resources.
//!
//! Every rendering context owns one [`ResourceBundle`], created on its own
//! thread the first time the context initializes and released once at
//! shutdown. Entries move through
//! `Unallocated -> Initialized -> Released`; `Released` is terminal.
//!
//! The map itself is shared. Inserting a new context takes the map write lock
//! for the insertion only; shader compilation and uploads run outside it, so
//! one slow context never blocks another. Each entry has its own lock, which
//! only its owning thread takes while drawing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};

use glam::{Mat4, Vec3};
use vrcube_engine::core::ContextId;

use crate::error::RenderError;
use crate::gpu::{
    BufferKind, DrawCall, FrameUniforms, GpuBackend, ResourceBundle, ShaderSource, VertexLayout,
};
use crate::scene::SceneState;

/// Lifecycle state of one context's resources.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotState {
    Unallocated,
    Initialized,
    Released,
}

struct ContextResources<B: GpuBackend> {
    backend: B,
    bundle: ResourceBundle<B>,
}

enum Slot<B: GpuBackend> {
    /// `failed` is set once an initialization attempt has returned an error.
    Unallocated { failed: bool },
    Initialized(ContextResources<B>),
    Released,
}

impl<B: GpuBackend> Slot<B> {
    fn state(&self) -> SlotState {
        match self {
            Slot::Unallocated { .. } => SlotState::Unallocated,
            Slot::Initialized(_) => SlotState::Initialized,
            Slot::Released => SlotState::Released,
        }
    }
}

type SharedSlot<B> = Arc<Mutex<Slot<B>>>;

pub struct ContextResourceRegistry<B: GpuBackend> {
    slots: RwLock<HashMap<ContextId, SharedSlot<B>>>,
    vertex_shader: ShaderSource,
    fragment_shader: ShaderSource,
}

impl<B: GpuBackend> Default for ContextResourceRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GpuBackend> ContextResourceRegistry<B> {
    /// Registry using the built-in cube shaders.
    pub fn new() -> Self {
        Self::with_shaders(ShaderSource::cube_vertex(), ShaderSource::cube_fragment())
    }

    pub fn with_shaders(vertex_shader: ShaderSource, fragment_shader: ShaderSource) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            vertex_shader,
            fragment_shader,
        }
    }

    /// Creates the resources of context `id` with `backend`.
    ///
    /// Must run on the thread that owns `backend`'s device. Every step runs
    /// once; on failure the entry stays `Unallocated` and later attempts
    /// return [`RenderError::InitializationFailed`]. Compile, link and
    /// allocation failures are fatal (see [`RenderError::is_fatal`]).
    pub fn initialize_context(
        &self,
        id: ContextId,
        backend: B,
        scene: &SceneState,
    ) -> Result<(), RenderError> {
        let slot = self.claim(id)?;
        let mut slot = lock(&slot);

        let bundle = self.create_resources(&backend, scene).inspect_err(|err| {
            log::error!("{id}: resource creation failed: {err}");
            *slot = Slot::Unallocated { failed: true };
        })?;

        log::info!(
            "{id}: resources ready ({} vertices, {} indices, {} instance(s))",
            scene.geometry().vertex_count(),
            bundle.draw.index_count,
            bundle.draw.instance_count,
        );

        report_driver_errors(id, &backend);
        *slot = Slot::Initialized(ContextResources { backend, bundle });
        Ok(())
    }

    /// Draws `scene` for context `id` through the given camera matrices.
    ///
    /// Only valid once `id` is initialized, and only from its owning thread.
    pub fn draw_context(
        &self,
        id: ContextId,
        target: &mut B::Target<'_>,
        view: Mat4,
        proj: Mat4,
        scene: &SceneState,
    ) -> Result<(), RenderError> {
        let slot = self.slot(id).ok_or(RenderError::NotInitialized(id))?;
        let slot = lock(&slot);

        match &*slot {
            Slot::Initialized(res) => {
                let uniforms = FrameUniforms::from_scene(scene, view, proj);
                res.backend.draw(target, &res.bundle, &uniforms)?;
                report_driver_errors(id, &res.backend);
                Ok(())
            }
            Slot::Unallocated { .. } => Err(RenderError::NotInitialized(id)),
            Slot::Released => Err(RenderError::Released(id)),
        }
    }

    /// Releases the resources of every context and marks every entry
    /// `Released`. Returns how many bundles were released.
    ///
    /// Call once, after every render thread has stopped drawing.
    pub fn release_all(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);

        let mut released = 0;
        for (id, slot) in slots.iter() {
            let previous = std::mem::replace(&mut *lock(slot), Slot::Released);
            if let Slot::Initialized(ContextResources { backend, bundle }) = previous {
                backend.release(bundle);
                report_driver_errors(*id, &backend);
                released += 1;
                log::debug!("{id}: resources released");
            }
        }
        released
    }

    pub fn state(&self, id: ContextId) -> SlotState {
        let Some(slot) = self.slot(id) else {
            return SlotState::Unallocated;
        };
        let state = lock(&slot).state();
        state
    }

    /// Number of contexts that have started initialization.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` on the resources of an initialized context.
    pub fn with_resources<R>(
        &self,
        id: ContextId,
        f: impl FnOnce(&ResourceBundle<B>) -> R,
    ) -> Option<R> {
        let slot = self.slot(id)?;
        let slot = lock(&slot);
        match &*slot {
            Slot::Initialized(res) => Some(f(&res.bundle)),
            _ => None,
        }
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn slot(&self, id: ContextId) -> Option<SharedSlot<B>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Inserts an `Unallocated` entry for `id`. The map lock covers only this.
    fn claim(&self, id: ContextId) -> Result<SharedSlot<B>, RenderError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        match slots.entry(id) {
            Entry::Vacant(vacant) => Ok(vacant
                .insert(Arc::new(Mutex::new(Slot::Unallocated { failed: false })))
                .clone()),
            Entry::Occupied(occupied) => {
                // try_lock: an entry still being initialized must not stall the map.
                let err = match occupied.get().try_lock() {
                    Ok(slot) => match &*slot {
                        Slot::Unallocated { failed: true } => RenderError::InitializationFailed(id),
                        Slot::Unallocated { failed: false } => RenderError::InitializationPending(id),
                        Slot::Initialized(_) => RenderError::AlreadyInitialized(id),
                        Slot::Released => RenderError::Released(id),
                    },
                    // The owning attempt panicked mid-initialization.
                    Err(TryLockError::Poisoned(_)) => RenderError::InitializationFailed(id),
                    Err(TryLockError::WouldBlock) => RenderError::InitializationPending(id),
                };
                Err(err)
            }
        }
    }

    fn create_resources(
        &self,
        backend: &B,
        scene: &SceneState,
    ) -> Result<ResourceBundle<B>, RenderError> {
        scene.check_invariants()?;
        let geometry = scene.geometry();

        let program = backend.create_program(&self.vertex_shader, &self.fragment_shader)?;

        // Positions, normals and colors back to back, not interleaved.
        let layout = VertexLayout::packed(geometry.vertex_count());
        let blocks: [&[Vec3]; 3] = [&geometry.vertices, &geometry.normals, &geometry.colors];
        let vertex_size: u64 = layout.attributes.iter().map(|a| a.size).sum();
        let vertex_buffer = backend.create_buffer(BufferKind::Vertex, vertex_size, "vrcube vertices")?;
        for (attr, block) in layout.attributes.iter().zip(blocks) {
            upload(
                backend,
                &vertex_buffer,
                "vertex buffer",
                vertex_size,
                attr.offset,
                bytemuck::cast_slice(block),
            )?;
        }

        let indices: &[u8] = bytemuck::cast_slice(&geometry.indices);
        let index_size = indices.len() as u64;
        let index_buffer = backend.create_buffer(BufferKind::Index, index_size, "vrcube indices")?;
        upload(backend, &index_buffer, "index buffer", index_size, 0, indices)?;

        let instances: &[u8] = bytemuck::cast_slice(scene.instances());
        let instance_size = instances.len() as u64;
        let instance_buffer =
            backend.create_buffer(BufferKind::Instance, instance_size, "vrcube instances")?;
        upload(backend, &instance_buffer, "instance buffer", instance_size, 0, instances)?;

        let vertex_array = backend.create_vertex_array(&program, &layout)?;

        Ok(ResourceBundle {
            program,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            vertex_array,
            draw: DrawCall {
                index_count: geometry.index_count() as u32,
                instance_count: scene.instances().len() as u32,
            },
        })
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn upload<B: GpuBackend>(
    backend: &B,
    buffer: &B::Buffer,
    label: &str,
    size: u64,
    offset: u64,
    bytes: &[u8],
) -> Result<(), RenderError> {
    let len = bytes.len() as u64;
    if offset + len > size {
        return Err(RenderError::BufferOverflow {
            label: label.to_string(),
            offset,
            len,
            size,
        });
    }
    backend.write_buffer(buffer, offset, bytes)
}

/// Driver errors never stop rendering; they are logged and dropped.
fn report_driver_errors<B: GpuBackend>(id: ContextId, backend: &B) {
    for message in backend.take_driver_errors() {
        log::warn!("{id}: driver error: {message}");
    }
}
