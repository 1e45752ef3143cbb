use crate::engine::core::{MeshIndex, FLOATS_PER_VERTEX};
use crate::loader::face_grouper::{FaceGroup, FaceGrouper};
use crate::loader::material_library::MaterialLibrary;
use crate::loader::vertex_dedup::{VertexDeduplicator, VertexStore};
use smallvec::SmallVec;
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

/// CPU-side result of reading an OBJ file.
#[derive(Debug, Clone)]
pub struct ModelData {
    /// Interleaved `[position, normal, tex_coord]`, [`FLOATS_PER_VERTEX`] floats per vertex.
    pub vertices: Vec<f32>,
    pub groups: Vec<FaceGroup>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn index_count(&self) -> usize {
        self.groups.iter().map(|group| group.indices.len()).sum()
    }

    /// The interleaved attributes of one slot.
    pub fn vertex(&self, slot: MeshIndex) -> Option<&[f32]> {
        let start = slot as usize * FLOATS_PER_VERTEX;
        self.vertices.get(start..start + FLOATS_PER_VERTEX)
    }
}

/// Reads OBJ source text into deduplicated, interleaved vertex data and per-material groups.
///
/// Only `v`, `vn`, `vt`, `f` and `usemtl` records are read, everything else is skipped. Material
/// names are resolved through `materials`; names it doesn't know give groups without material.
#[instrument(skip_all)]
pub fn parse_obj(source: &str, materials: &MaterialLibrary) -> ModelData {
    let now = Instant::now();
    let mut store = VertexStore::new();
    let mut dedup = VertexDeduplicator::new();
    let mut grouper = FaceGrouper::new();

    for line in source.lines() {
        let line = line.trim();
        let (keyword, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match keyword {
            "v" => store.push_position(parse_floats(args)),
            "vn" => store.push_normal(parse_floats(args)),
            "vt" => store.push_tex_coord(parse_floats(args)),
            "f" => {
                let slots = args
                    .split_whitespace()
                    .map(|token| dedup.slot_for(store.key_for(token), &store))
                    .collect::<SmallVec<[MeshIndex; 4]>>();
                if slots.len() != 3 {
                    debug!("Face with {} vertices is not a triangle", slots.len());
                }
                grouper.push_face(&slots);
            }
            "usemtl" => {
                let name = args.trim();
                let material = materials.get(name);
                if material.is_none() {
                    trace!("Material '{name}' not found in library");
                }
                grouper.use_material(material);
            }
            _ => {}
        }
    }

    let data = ModelData {
        vertices: dedup.into_vertices(),
        groups: grouper.finish(),
    };
    info!(
        "Parsed {} positions into {} vertices, {} groups in {:?}",
        store.position_count(),
        data.vertex_count(),
        data.groups.len(),
        now.elapsed()
    );
    data
}

/// Reads up to `N` whitespace separated numbers; missing or unparsable ones are zero.
fn parse_floats<const N: usize>(args: &str) -> [f32; N] {
    let mut values = [0.0; N];
    for (value, text) in values.iter_mut().zip(args.split_whitespace()) {
        *value = text.parse().unwrap_or(0.0);
    }
    values
}
