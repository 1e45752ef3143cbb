use super::device::RenderDevice;
use super::mesh::Mesh;
use crate::loader::material_library::MaterialLibrary;
use crate::loader::obj_loader::{parse_obj, ModelData};
use anyhow::{Context, Result};
use glam::Mat4;
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// An ordered set of meshes sharing one vertex buffer and one transform.
pub struct Model<D: RenderDevice> {
    vertex_buffer: Arc<D::Buffer>,
    vertex_count: usize,
    meshes: Vec<Mesh<D>>,
    transform: Mat4,
}

impl<D: RenderDevice> Model<D> {
    pub fn meshes(&self) -> &[Mesh<D>] {
        &self.meshes
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// The model transform. Drawing doesn't apply it; callers upload it with their own
    /// per-model state.
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Draws every mesh in order. The active program must be set by the caller.
    pub fn draw(&self, device: &D, pass: &mut D::Pass<'_>) {
        for mesh in &self.meshes {
            mesh.draw(device, pass);
        }
    }

    /// Releases all index buffers, then the shared vertex buffer.
    pub fn release(self, device: &D) {
        for mesh in self.meshes {
            drop(mesh.release(device));
        }
        match Arc::try_unwrap(self.vertex_buffer) {
            Ok(vertex_buffer) => device.release_buffer(vertex_buffer),
            Err(_) => warn!("Vertex buffer is still referenced, not releasing it"),
        }
    }
}

/// Turns OBJ source into a [`Model`] on one device.
pub struct ModelBuilder<D: RenderDevice> {
    device: Arc<D>,
}

impl<D: RenderDevice> ModelBuilder<D> {
    pub fn new(device: &Arc<D>) -> Self {
        Self {
            device: Arc::clone(device),
        }
    }

    /// Parses `source` and uploads the result. Fails only if a buffer can't be allocated.
    pub fn build(&self, source: &str, materials: &MaterialLibrary) -> Result<Model<D>> {
        let data = parse_obj(source, materials);
        self.upload(&data)
    }

    /// Uploads one vertex buffer and one index buffer per face group.
    #[instrument(skip_all)]
    pub fn upload(&self, data: &ModelData) -> Result<Model<D>> {
        let vertex_buffer = self
            .device
            .create_vertex_buffer("model vertices", &data.vertices)
            .context("Failed to allocate vertex buffer")?;
        let vertex_buffer = Arc::new(vertex_buffer);

        let mut meshes: Vec<Mesh<D>> = Vec::with_capacity(data.groups.len());
        for (index, group) in data.groups.iter().enumerate() {
            let index_buffer = self
                .device
                .create_index_buffer(&format!("model group {index}"), &group.indices)
                .with_context(|| format!("Failed to allocate index buffer for group {index}"));
            let index_buffer = match index_buffer {
                Ok(index_buffer) => index_buffer,
                Err(err) => {
                    for mesh in meshes.drain(..) {
                        drop(mesh.release(&self.device));
                    }
                    if let Ok(vertex_buffer) = Arc::try_unwrap(vertex_buffer) {
                        self.device.release_buffer(vertex_buffer);
                    }
                    return Err(err);
                }
            };
            meshes.push(Mesh::new(
                Arc::clone(&vertex_buffer),
                index_buffer,
                group.indices.len() as u32,
                group.material.clone(),
            ));
        }

        debug!(
            "Uploaded {} vertices, groups: [{}]",
            data.vertex_count(),
            data.groups
                .iter()
                .map(|group| group.material.as_ref().map_or("<none>", |m| m.name.as_str()))
                .join(", ")
        );

        Ok(Model {
            vertex_buffer,
            vertex_count: data.vertex_count(),
            meshes,
            transform: Mat4::IDENTITY,
        })
    }
}
