//! Device-side mirror of scene buffers

use crate::buffer::{AllocationId, AttributeBuffer};
use crate::graph::SceneGraph;
use livecad_core::{Error, Result};
use std::collections::{HashMap, HashSet};
use wgpu::util::DeviceExt;

/// GPU device and queue used to mirror scene buffers
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter: wgpu::Adapter,
}

impl GpuContext {
    /// Create a new GPU context
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::Gpu("Failed to find suitable adapter".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("livecad device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| Error::Gpu(format!("Failed to create device: {}", e)))?;

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    /// Create a buffer initialised with `bytes`
    pub fn create_buffer_init(
        &self,
        label: &str,
        bytes: &[u8],
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage,
            })
    }
}

struct Mirrored {
    buffer: wgpu::Buffer,
    version: u64,
}

/// Counters of one mirror pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    /// Buffers created for new allocations
    pub created: usize,
    /// Buffers overwritten in place
    pub written: usize,
    /// Buffers dropped because their allocation no longer exists
    pub pruned: usize,
}

/// Keeps one wgpu buffer per live scene allocation.
///
/// A reused allocation whose version changed is overwritten with
/// `Queue::write_buffer`; a new allocation gets a fresh buffer. Buffers of
/// allocations that disappeared from the scene are dropped.
#[derive(Default)]
pub struct GpuMirror {
    buffers: HashMap<AllocationId, Mirrored>,
}

impl GpuMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the device buffers up to date with `scene`
    pub fn sync(&mut self, ctx: &GpuContext, scene: &SceneGraph) -> MirrorStats {
        let mut stats = MirrorStats::default();
        let mut live = HashSet::new();
        let vertex = wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST;
        let index = wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST;

        for (_, node) in scene.iter_meshes() {
            if let Some(mesh) = &node.mesh {
                self.mirror(ctx, &node.name, mesh.positions(), vertex, &mut live, &mut stats);
                self.mirror(ctx, &node.name, mesh.normals(), vertex, &mut live, &mut stats);
                self.mirror(ctx, &node.name, mesh.indices(), index, &mut live, &mut stats);
            }
            if let Some(edges) = &node.edges {
                self.mirror(ctx, &node.name, edges.segments(), vertex, &mut live, &mut stats);
            }
        }

        let before = self.buffers.len();
        self.buffers.retain(|id, _| live.contains(id));
        stats.pruned = before - self.buffers.len();
        stats
    }

    /// Device buffer for an allocation, if mirrored
    pub fn buffer(&self, allocation: AllocationId) -> Option<&wgpu::Buffer> {
        self.buffers.get(&allocation).map(|m| &m.buffer)
    }

    /// Number of mirrored buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    fn mirror<T: bytemuck::Pod>(
        &mut self,
        ctx: &GpuContext,
        label: &str,
        source: &AttributeBuffer<T>,
        usage: wgpu::BufferUsages,
        live: &mut HashSet<AllocationId>,
        stats: &mut MirrorStats,
    ) {
        if source.is_released() || source.is_empty() {
            return;
        }
        let allocation = source.allocation();
        live.insert(allocation);

        match self.buffers.get_mut(&allocation) {
            Some(mirrored) if mirrored.version == source.version() => {}
            Some(mirrored) => {
                ctx.queue.write_buffer(&mirrored.buffer, 0, source.as_bytes());
                mirrored.version = source.version();
                stats.written += 1;
            }
            None => {
                let buffer = ctx.create_buffer_init(label, source.as_bytes(), usage);
                self.buffers.insert(
                    allocation,
                    Mirrored {
                        buffer,
                        version: source.version(),
                    },
                );
                stats.created += 1;
            }
        }
    }
}
