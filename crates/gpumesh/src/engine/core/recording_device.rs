//! A [`RenderDevice`] that records every call instead of talking to a GPU.

use super::device::{RenderDevice, ShaderStage};
use super::MeshIndex;
use anyhow::{bail, Result};
use std::cell::{Cell, RefCell};

#[derive(Debug, PartialEq, Eq)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum BufferContents {
    Vertices(Vec<f32>),
    Indices(Vec<MeshIndex>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBuffer {
    pub id: u32,
    pub label: String,
    pub contents: BufferContents,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RecordedShader {
    pub id: u32,
    pub stage: ShaderStage,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    UseProgram(u32),
    DrawIndexed {
        vertex_buffer: u32,
        index_buffer: u32,
        index_count: u32,
    },
}

#[derive(Default)]
pub struct RecordingDevice {
    next_id: Cell<u32>,
    pub compiled: RefCell<Vec<(ShaderStage, String)>>,
    pub link_count: Cell<usize>,
    pub buffers: RefCell<Vec<RecordedBuffer>>,
    pub released: RefCell<Vec<u32>>,
    /// Sources containing this text fail to compile.
    compile_error_marker: Option<&'static str>,
    pub fail_link: Cell<bool>,
    /// 1-based buffer allocation that fails.
    fail_allocation_at: Option<usize>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compile_error(marker: &'static str) -> Self {
        Self {
            compile_error_marker: Some(marker),
            ..Self::default()
        }
    }

    pub fn failing_allocation(attempt: usize) -> Self {
        Self {
            fail_allocation_at: Some(attempt),
            ..Self::default()
        }
    }

    pub fn compile_count(&self, stage: ShaderStage) -> usize {
        self.compiled.borrow().iter().filter(|(s, _)| *s == stage).count()
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn create_buffer(&self, label: &str, contents: BufferContents) -> Result<BufferId> {
        let attempt = self.buffers.borrow().len() + 1;
        if self.fail_allocation_at == Some(attempt) {
            bail!("Out of memory allocating '{label}'");
        }
        let id = self.next_id();
        self.buffers.borrow_mut().push(RecordedBuffer {
            id,
            label: label.to_owned(),
            contents,
        });
        Ok(BufferId(id))
    }
}

impl RenderDevice for RecordingDevice {
    type Buffer = BufferId;
    type Shader = RecordedShader;
    type Program = ProgramId;
    type Pass<'p> = Vec<Command>;

    fn create_vertex_buffer(&self, label: &str, vertices: &[f32]) -> Result<BufferId> {
        self.create_buffer(label, BufferContents::Vertices(vertices.to_vec()))
    }

    fn create_index_buffer(&self, label: &str, indices: &[MeshIndex]) -> Result<BufferId> {
        self.create_buffer(label, BufferContents::Indices(indices.to_vec()))
    }

    fn release_buffer(&self, buffer: BufferId) {
        self.released.borrow_mut().push(buffer.0);
    }

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<RecordedShader> {
        self.compiled.borrow_mut().push((stage, source.to_owned()));
        if let Some(marker) = self.compile_error_marker {
            if source.contains(marker) {
                bail!("0:1: syntax error near '{marker}'");
            }
        }
        Ok(RecordedShader {
            id: self.next_id(),
            stage,
        })
    }

    fn link_program(
        &self,
        _vertex_shader: &RecordedShader,
        _fragment_shader: &RecordedShader,
    ) -> Result<ProgramId> {
        self.link_count.set(self.link_count.get() + 1);
        if self.fail_link.get() {
            bail!("varying mismatch");
        }
        Ok(ProgramId(self.next_id()))
    }

    fn use_program(&self, pass: &mut Vec<Command>, program: &ProgramId) {
        pass.push(Command::UseProgram(program.0));
    }

    fn draw_indexed(
        &self,
        pass: &mut Vec<Command>,
        vertex_buffer: &BufferId,
        index_buffer: &BufferId,
        index_count: u32,
    ) {
        pass.push(Command::DrawIndexed {
            vertex_buffer: vertex_buffer.0,
            index_buffer: index_buffer.0,
            index_count,
        });
    }
}
