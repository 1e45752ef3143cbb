use super::device::{RenderDevice, ShaderStage};
use super::{MeshIndex, Size2D, VERTEX_FORMAT, VERTEX_STRIDE};
use anyhow::{anyhow, bail, ensure, Context, Result};
use futures::executor::block_on;
use tracing::{debug, error, info, instrument};
use wgpu::util::DeviceExt;

/// Color format of the offscreen render target and of every linked pipeline.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Clone, Copy, Debug, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub size: Size2D,
}

pub struct GpuContext {
    #[allow(dead_code)]
    pub adapter: wgpu::Adapter,
    pub queue: wgpu::Queue,
    pub device: wgpu::Device,
    pub color_format: wgpu::TextureFormat,
    pub viewport: Viewport,
}

/// A shader module together with the entry points found in it.
pub struct CompiledShader {
    module: wgpu::ShaderModule,
    vertex_entry_point: Option<String>,
    fragment_entry_point: Option<String>,
}

impl GpuContext {
    pub async fn new_for_offscreen(size: Size2D) -> Result<Self> {
        ensure!(size[0] > 0 && size[1] > 0, "Viewport has zero size");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .context("No suitable adapter found")?;
        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("gpumesh device"),
            ..Default::default()
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor, None)
            .await
            .context("Failed to create device")?;
        device.on_uncaptured_error(Box::new(|err| error!("Uncaptured GPU error: {err}")));
        info!("Using adapter '{}'", adapter.get_info().name);

        Ok(GpuContext {
            adapter,
            queue,
            device,
            color_format: COLOR_FORMAT,
            viewport: Viewport { x: 0, y: 0, size },
        })
    }

    /// Creates a texture matching the viewport that passes can render into.
    pub fn create_render_target(&self) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("render target"),
            size: wgpu::Extent3d {
                width: self.viewport.size[0],
                height: self.viewport.size[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.color_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    pub fn apply_viewport(&self, pass: &mut wgpu::RenderPass) {
        let Viewport { x, y, size } = self.viewport;
        pass.set_viewport(x as f32, y as f32, size[0] as f32, size[1] as f32, 0.0, 1.0);
    }

    /// Runs `f` inside validation and out-of-memory error scopes.
    fn scoped<T>(&self, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        let validation_error = block_on(self.device.pop_error_scope());
        let out_of_memory_error = block_on(self.device.pop_error_scope());
        (value, validation_error.or(out_of_memory_error))
    }

    fn create_buffer(
        &self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<wgpu::Buffer> {
        let (buffer, error) = self.scoped(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
        });
        if let Some(error) = error {
            buffer.destroy();
            bail!("Failed to create buffer '{label}': {error}");
        }
        Ok(buffer)
    }
}

/// Picks `preferred` if the module has it for `stage`, otherwise the first entry point of
/// that stage.
fn find_entry_point(
    module: &naga::Module,
    stage: naga::ShaderStage,
    preferred: &str,
) -> Option<String> {
    let candidates = module.entry_points.iter().filter(|ep| ep.stage == stage);
    candidates
        .clone()
        .find(|ep| ep.name == preferred)
        .or_else(|| candidates.clone().next())
        .map(|ep| ep.name.clone())
}

impl RenderDevice for GpuContext {
    type Buffer = wgpu::Buffer;
    type Shader = CompiledShader;
    type Program = wgpu::RenderPipeline;
    type Pass<'p> = wgpu::RenderPass<'p>;

    fn create_vertex_buffer(&self, label: &str, vertices: &[f32]) -> Result<wgpu::Buffer> {
        self.create_buffer(label, bytemuck::cast_slice(vertices), wgpu::BufferUsages::VERTEX)
    }

    fn create_index_buffer(&self, label: &str, indices: &[MeshIndex]) -> Result<wgpu::Buffer> {
        self.create_buffer(label, bytemuck::cast_slice(indices), wgpu::BufferUsages::INDEX)
    }

    fn release_buffer(&self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    #[instrument(skip(self, source))]
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<CompiledShader> {
        let now = std::time::Instant::now();
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|err| anyhow!(err.emit_to_string(source)))?;
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|err| anyhow!(err.emit_to_string(source)))?;

        let vertex_entry_point = find_entry_point(&module, naga::ShaderStage::Vertex, "vs_main");
        let fragment_entry_point =
            find_entry_point(&module, naga::ShaderStage::Fragment, "fs_main");
        let has_stage = match stage {
            ShaderStage::Vertex => vertex_entry_point.is_some(),
            ShaderStage::Fragment => fragment_entry_point.is_some(),
        };
        ensure!(has_stage, "No @{stage} entry point in shader source");

        let (module, error) = self.scoped(|| {
            self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{stage} shader")),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });
        if let Some(error) = error {
            bail!("{error}");
        }
        debug!("compiled in {:?}.", now.elapsed());

        Ok(CompiledShader {
            module,
            vertex_entry_point,
            fragment_entry_point,
        })
    }

    fn link_program(
        &self,
        vertex_shader: &CompiledShader,
        fragment_shader: &CompiledShader,
    ) -> Result<wgpu::RenderPipeline> {
        let vertex_entry_point = vertex_shader
            .vertex_entry_point
            .as_deref()
            .context("Vertex shader has no @vertex entry point")?;
        let fragment_entry_point = fragment_shader
            .fragment_entry_point
            .as_deref()
            .context("Fragment shader has no @fragment entry point")?;

        let vertex_buffer_layout = wgpu::VertexBufferLayout {
            array_stride: VERTEX_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_FORMAT,
        };
        let targets = [Some(wgpu::ColorTargetState {
            format: self.color_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let (pipeline, error) = self.scoped(|| {
            self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("program"),
                layout: None,
                vertex: wgpu::VertexState {
                    module: &vertex_shader.module,
                    entry_point: Some(vertex_entry_point),
                    buffers: &[vertex_buffer_layout],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_shader.module,
                    entry_point: Some(fragment_entry_point),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &targets,
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });
        if let Some(error) = error {
            bail!("{error}");
        }
        Ok(pipeline)
    }

    fn use_program(&self, pass: &mut wgpu::RenderPass<'_>, program: &wgpu::RenderPipeline) {
        pass.set_pipeline(program);
    }

    fn draw_indexed(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        vertex_buffer: &wgpu::Buffer,
        index_buffer: &wgpu::Buffer,
        index_count: u32,
    ) {
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..index_count, 0, 0..1);
    }
}
