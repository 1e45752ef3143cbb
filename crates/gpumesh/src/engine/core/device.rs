use super::MeshIndex;
use anyhow::Result;
use strum::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// The graphics driver calls that meshes, models and programs are built on.
///
/// All calls are blocking and made from a single thread. Every object a device creates is owned
/// by the caller, which hands buffers back through [`RenderDevice::release_buffer`].
pub trait RenderDevice {
    type Buffer;
    type Shader;
    type Program;

    /// The per-frame recording target that draw calls go into.
    type Pass<'p>;

    fn create_vertex_buffer(&self, label: &str, vertices: &[f32]) -> Result<Self::Buffer>;

    fn create_index_buffer(&self, label: &str, indices: &[MeshIndex]) -> Result<Self::Buffer>;

    fn release_buffer(&self, buffer: Self::Buffer);

    /// Compiles one stage. The error carries the compiler's diagnostic log.
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader>;

    /// Links two compiled stages into a program with the fixed vertex layout.
    fn link_program(
        &self,
        vertex_shader: &Self::Shader,
        fragment_shader: &Self::Shader,
    ) -> Result<Self::Program>;

    fn use_program(&self, pass: &mut Self::Pass<'_>, program: &Self::Program);

    /// Binds both buffers and draws `index_count` indices as a triangle list.
    fn draw_indexed(
        &self,
        pass: &mut Self::Pass<'_>,
        vertex_buffer: &Self::Buffer,
        index_buffer: &Self::Buffer,
        index_count: u32,
    );
}
