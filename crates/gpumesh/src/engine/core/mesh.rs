use super::device::RenderDevice;
use crate::loader::material_library::Material;
use std::sync::Arc;

/// One draw group of a model: an index buffer over the model's shared vertex buffer.
pub struct Mesh<D: RenderDevice> {
    vertex_buffer: Arc<D::Buffer>,
    index_buffer: D::Buffer,
    index_count: u32,
    material: Option<Arc<Material>>,
}

impl<D: RenderDevice> Mesh<D> {
    pub fn new(
        vertex_buffer: Arc<D::Buffer>,
        index_buffer: D::Buffer,
        index_count: u32,
        material: Option<Arc<Material>>,
    ) -> Self {
        Self {
            vertex_buffer,
            index_buffer,
            index_count,
            material,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn vertex_buffer(&self) -> &Arc<D::Buffer> {
        &self.vertex_buffer
    }

    /// Issues an indexed triangle-list draw over the whole index buffer.
    ///
    /// Binds no program or material state. The caller activates the program (and whatever
    /// material state it needs) beforehand.
    pub fn draw(&self, device: &D, pass: &mut D::Pass<'_>) {
        device.draw_indexed(pass, &self.vertex_buffer, &self.index_buffer, self.index_count);
    }

    /// Releases the index buffer. Returns the shared vertex buffer reference so the owner
    /// can release it once no mesh uses it.
    pub fn release(self, device: &D) -> Arc<D::Buffer> {
        device.release_buffer(self.index_buffer);
        self.vertex_buffer
    }
}
