use super::device::{RenderDevice, ShaderStage};
use crate::loader::cache::Cache;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, trace};

/// A linked vertex + fragment program.
///
/// There is no uniform binding here; programs only know how to become the active one.
pub struct Program<D: RenderDevice> {
    handle: D::Program,
}

impl<D: RenderDevice> Program<D> {
    /// Makes this the program used by subsequent draws in `pass`.
    pub fn activate(&self, device: &D, pass: &mut D::Pass<'_>) {
        device.use_program(pass, &self.handle);
    }

    pub fn handle(&self) -> &D::Program {
        &self.handle
    }
}

/// Compiles and links shader pairs, compiling each distinct source text only once.
///
/// A cache belongs to exactly one device, since compiled shaders can't be shared between
/// graphics contexts.
pub struct ProgramCache<D: RenderDevice> {
    device: Arc<D>,
    shaders_by_source: Cache<String, D::Shader>,
}

impl<D: RenderDevice> ProgramCache<D> {
    pub fn new(device: &Arc<D>) -> Self {
        Self {
            device: Arc::clone(device),
            shaders_by_source: Cache::new(),
        }
    }

    /// Compiles (or reuses) both stages and links them into a new program.
    ///
    /// A compile error aborts with the stage and the compiler log. A link error is logged and
    /// gives `Ok(None)`. Linking runs on every call, even when both stages came from the cache.
    pub fn compile(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Option<Program<D>>> {
        self.ensure_compiled(ShaderStage::Vertex, vertex_source)?;
        self.ensure_compiled(ShaderStage::Fragment, fragment_source)?;

        let vertex_shader = self
            .shaders_by_source
            .get(vertex_source)
            .context("Vertex shader missing from cache")?;
        let fragment_shader = self
            .shaders_by_source
            .get(fragment_source)
            .context("Fragment shader missing from cache")?;

        match self.device.link_program(vertex_shader, fragment_shader) {
            Ok(handle) => Ok(Some(Program { handle })),
            Err(err) => {
                error!("Unable to link shaders: {err:#}");
                Ok(None)
            }
        }
    }

    /// Number of distinct compiled shader sources.
    pub fn len(&self) -> usize {
        self.shaders_by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders_by_source.is_empty()
    }

    /// Drops every cached shader, e.g. after the device was lost.
    pub fn clear(&mut self) {
        self.shaders_by_source.drain().for_each(drop);
    }

    fn ensure_compiled(&mut self, stage: ShaderStage, source: &str) -> Result<()> {
        if self.shaders_by_source.contains_key(source) {
            trace!("Cache hit for {stage} shader");
            return Ok(());
        }
        trace!("Cache miss for {stage} shader");
        let device = &self.device;
        self.shaders_by_source
            .get_or_try_insert_with_key(source.to_owned(), |source| {
                device
                    .compile_shader(stage, source)
                    .with_context(|| format!("Error compiling {stage} shader"))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::recording_device::{Command, RecordingDevice};

    #[test]
    fn shared_vertex_source_compiles_once() {
        let device = Arc::new(RecordingDevice::new());
        let mut cache = ProgramCache::new(&device);

        let first = cache.compile("A", "B").unwrap().unwrap();
        let second = cache.compile("A", "C").unwrap().unwrap();

        assert_eq!(device.compile_count(ShaderStage::Vertex), 1);
        assert_eq!(device.compile_count(ShaderStage::Fragment), 2);
        assert_ne!(first.handle(), second.handle());
        assert_eq!(device.link_count.get(), 2);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn full_cache_hit_still_links() {
        let device = Arc::new(RecordingDevice::new());
        let mut cache = ProgramCache::new(&device);

        cache.compile("A", "B").unwrap().unwrap();
        cache.compile("A", "B").unwrap().unwrap();

        assert_eq!(device.compiled.borrow().len(), 2);
        assert_eq!(device.link_count.get(), 2);
    }

    #[test]
    fn compile_error_names_the_stage_and_keeps_the_cache_usable() {
        let device = Arc::new(RecordingDevice::with_compile_error("broken"));
        let mut cache = ProgramCache::new(&device);

        cache.compile("A", "B").unwrap().unwrap();
        let err = cache.compile("A", "broken").err().unwrap();
        let message = format!("{err:#}");
        assert!(message.contains("Error compiling fragment shader"), "{message}");
        assert!(message.contains("syntax error"), "{message}");
        assert_eq!(cache.len(), 2);

        cache.compile("A", "C").unwrap().unwrap();
        assert_eq!(device.compile_count(ShaderStage::Vertex), 1);

        // the failed source is retried, not remembered
        assert!(cache.compile("A", "broken").is_err());
        assert_eq!(device.compile_count(ShaderStage::Fragment), 4);
    }

    #[test]
    fn vertex_compile_error_aborts_before_fragment() {
        let device = Arc::new(RecordingDevice::with_compile_error("broken"));
        let mut cache = ProgramCache::new(&device);

        let err = cache.compile("broken", "B").err().unwrap();
        assert!(format!("{err:#}").contains("Error compiling vertex shader"));
        assert_eq!(device.compile_count(ShaderStage::Fragment), 0);
        assert_eq!(device.link_count.get(), 0);
    }

    #[test]
    fn link_failure_gives_no_program() {
        let device = Arc::new(RecordingDevice::new());
        device.fail_link.set(true);
        let mut cache = ProgramCache::new(&device);

        assert!(cache.compile("A", "B").unwrap().is_none());
        assert!(cache.compile("A", "B").unwrap().is_none());
        assert_eq!(device.link_count.get(), 2);
        assert_eq!(device.compiled.borrow().len(), 2);

        device.fail_link.set(false);
        assert!(cache.compile("A", "B").unwrap().is_some());
    }

    #[test]
    fn activate_selects_the_program() {
        let device = Arc::new(RecordingDevice::new());
        let mut cache = ProgramCache::new(&device);
        let program = cache.compile("A", "B").unwrap().unwrap();

        let mut pass = vec![];
        program.activate(&device, &mut pass);
        assert_eq!(pass, vec![Command::UseProgram(program.handle().0)]);
    }

    #[test]
    fn clear_forces_recompilation() {
        let device = Arc::new(RecordingDevice::new());
        let mut cache = ProgramCache::new(&device);
        cache.compile("A", "B").unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.compile("A", "B").unwrap();
        assert_eq!(device.compiled.borrow().len(), 4);
    }
}
