pub mod app_config;

use crate::engine::camera::Camera;
use crate::engine::light::Light;
use crate::engine::scene::Scene;
use crate::engine::{GpuContext, ModelBuilder, ProgramCache};
use crate::loader::MaterialLibrary;
use anyhow::{Context, Result};
use app_config::AppConfig;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_VERTEX_SHADER: &str = include_str!("shaders/default_vertex.wgsl");
pub const DEFAULT_FRAGMENT_SHADER: &str = include_str!("shaders/default_fragment.wgsl");

const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_3;

/// Everything read from disk before rendering starts.
struct Sources {
    model: String,
    material: Option<String>,
    vertex_shader: String,
    fragment_shader: String,
}

impl Sources {
    async fn load(config: &AppConfig) -> Result<Self> {
        let (model, material, vertex_shader, fragment_shader) = futures::try_join!(
            read(Some(config.model_path.as_str())),
            read(config.material_path.as_deref()),
            read(config.vertex_shader_path.as_deref()),
            read(config.fragment_shader_path.as_deref()),
        )?;
        Ok(Sources {
            model: model.unwrap_or_default(),
            material,
            vertex_shader: vertex_shader.unwrap_or_else(|| DEFAULT_VERTEX_SHADER.to_string()),
            fragment_shader: fragment_shader
                .unwrap_or_else(|| DEFAULT_FRAGMENT_SHADER.to_string()),
        })
    }
}

async fn read(path: Option<&str>) -> Result<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read '{path}'"))?;
    Ok(Some(content))
}

/// Loads the configured model and shaders and renders a single frame offscreen.
pub fn run_app(config: &AppConfig) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let context = rt.block_on(GpuContext::new_for_offscreen(config.viewport))?;
    let context = Arc::new(context);
    let sources = rt.block_on(Sources::load(config))?;

    let now = Instant::now();
    let materials = sources
        .material
        .as_deref()
        .map(MaterialLibrary::from_mtl)
        .unwrap_or_default();
    let model = ModelBuilder::new(&context)
        .build(&sources.model, &materials)
        .with_context(|| format!("Failed to load '{}'", config.model_path))?;
    info!(
        "Loaded '{}': {} vertices, {} meshes in {:?}",
        config.model_path,
        model.vertex_count(),
        model.meshes().len(),
        now.elapsed()
    );

    let mut programs = ProgramCache::new(&context);
    let program = programs.compile(&sources.vertex_shader, &sources.fragment_shader)?;

    let mut camera = Camera::new();
    let [width, height] = config.viewport;
    camera.set_projection(FIELD_OF_VIEW, width as f32 / height as f32, 0.1, 100.0);
    debug!("Projection from world: {:?}", camera.projection_from_world());

    let mut scene = Scene::new();
    scene.add_model(model);
    scene.add_light(Light::default());

    let render_target = context.create_render_target();
    let view = render_target.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("frame") });
    {
        let [r, g, b, a] = config.clear_color.map(f64::from);
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        context.apply_viewport(&mut pass);
        match &program {
            Some(program) => {
                program.activate(&context, &mut pass);
                scene.draw(&context, &mut pass);
            }
            None => warn!("No usable program, the frame is only cleared"),
        }
    }
    context.queue.submit(Some(encoder.finish()));
    context.device.poll(wgpu::Maintain::Wait);
    info!(
        "Rendered {} meshes into a {width}x{height} target",
        scene.models().map(|model| model.meshes().len()).sum::<usize>()
    );

    scene.release(&context);
    render_target.destroy();
    Ok(())
}
