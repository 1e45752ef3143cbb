//! Wavefront OBJ meshes turned into deduplicated GPU vertex and index buffers, plus a shader
//! program cache keyed by source text.

pub mod engine;
pub mod loader;
pub mod tool;
