use crate::engine::core::{MeshIndex, FLOATS_PER_VERTEX};
use ahash::AHashMap;
use std::collections::hash_map::Entry;
use tracing::trace;

/// Raw vertex attributes in source order.
///
/// Each list starts with an all-zero entry at index 0, so that face tokens without a texture
/// coordinate or normal still resolve to something, and source indices (which start at 1) can
/// be used directly.
pub struct VertexStore {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
}

impl VertexStore {
    pub fn new() -> Self {
        Self {
            positions: vec![[0.0; 3]],
            normals: vec![[0.0; 3]],
            tex_coords: vec![[0.0; 2]],
        }
    }

    pub fn push_position(&mut self, position: [f32; 3]) {
        self.positions.push(position);
    }

    pub fn push_normal(&mut self, normal: [f32; 3]) {
        self.normals.push(normal);
    }

    pub fn push_tex_coord(&mut self, tex_coord: [f32; 2]) {
        self.tex_coords.push(tex_coord);
    }

    /// Number of positions read so far, not counting the default entry.
    pub fn position_count(&self) -> usize {
        self.positions.len() - 1
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len() - 1
    }

    pub fn tex_coord_count(&self) -> usize {
        self.tex_coords.len() - 1
    }

    /// Builds the key for a face-vertex token of the form `p`, `p/t`, `p//n` or `p/t/n`.
    pub fn key_for(&self, token: &str) -> FaceVertexKey {
        let mut parts = token.split('/');
        let position = resolve_index(parts.next(), self.position_count());
        let tex_coord = resolve_index(parts.next(), self.tex_coord_count());
        let normal = resolve_index(parts.next(), self.normal_count());
        FaceVertexKey {
            position,
            tex_coord,
            normal,
        }
    }

    /// Appends the attributes of `key` in interleaved order: position, normal, texcoord.
    fn append_interleaved(&self, key: FaceVertexKey, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.positions[key.position as usize]);
        out.extend_from_slice(&self.normals[key.normal as usize]);
        out.extend_from_slice(&self.tex_coords[key.tex_coord as usize]);
    }
}

impl Default for VertexStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves one component of a face-vertex token to an index into a [`VertexStore`] list.
///
/// Negative values count back from the last entry read so far. Missing, zero, unparsable and
/// out-of-range values resolve to the default entry.
fn resolve_index(component: Option<&str>, count: usize) -> u32 {
    let Some(component) = component.map(str::trim).filter(|c| !c.is_empty()) else {
        return 0;
    };
    let Ok(raw) = component.parse::<i64>() else {
        trace!("Unparsable face index '{component}'");
        return 0;
    };
    let count = count as i64;
    let index = if raw < 0 { count + 1 + raw } else { raw };
    if (1..=count).contains(&index) {
        index as u32
    } else {
        if raw != 0 {
            trace!("Face index {raw} out of range (1..={count})");
        }
        0
    }
}

/// Identifies one interleaved output vertex by its resolved attribute indices.
#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub struct FaceVertexKey {
    pub position: u32,
    pub tex_coord: u32,
    pub normal: u32,
}

/// Emits each distinct attribute combination exactly once into an interleaved vertex buffer.
#[derive(Default)]
pub struct VertexDeduplicator {
    slots: AHashMap<FaceVertexKey, MeshIndex>,
    vertices: Vec<f32>,
}

impl VertexDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `key`, appending its attributes on first sight.
    pub fn slot_for(&mut self, key: FaceVertexKey, store: &VertexStore) -> MeshIndex {
        let next_slot = self.slots.len() as MeshIndex;
        match self.slots.entry(key) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                store.append_interleaved(key, &mut self.vertices);
                *entry.insert(next_slot)
            }
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn into_vertices(self) -> Vec<f32> {
        self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VertexStore {
        let mut store = VertexStore::new();
        store.push_position([1.0, 2.0, 3.0]);
        store.push_position([4.0, 5.0, 6.0]);
        store.push_tex_coord([0.25, 0.75]);
        store.push_normal([0.0, 1.0, 0.0]);
        store
    }

    fn key(position: u32, tex_coord: u32, normal: u32) -> FaceVertexKey {
        FaceVertexKey {
            position,
            tex_coord,
            normal,
        }
    }

    #[test]
    fn parses_all_token_forms() {
        let store = store();
        assert_eq!(store.key_for("2"), key(2, 0, 0));
        assert_eq!(store.key_for("2/1"), key(2, 1, 0));
        assert_eq!(store.key_for("2//1"), key(2, 0, 1));
        assert_eq!(store.key_for("1/1/1"), key(1, 1, 1));
    }

    #[test]
    fn bad_components_fall_back_to_default_entry() {
        let store = store();
        assert_eq!(store.key_for("9/1/1"), key(0, 1, 1));
        assert_eq!(store.key_for("x/y/z"), key(0, 0, 0));
        assert_eq!(store.key_for("0/0/0"), key(0, 0, 0));
        assert_eq!(store.key_for("1/5"), key(1, 0, 0));
    }

    #[test]
    fn negative_indices_are_relative_to_the_end() {
        let store = store();
        assert_eq!(store.key_for("-1/-1/-1"), key(2, 1, 1));
        assert_eq!(store.key_for("-2"), key(1, 0, 0));
        assert_eq!(store.key_for("-3"), key(0, 0, 0));
    }

    #[test]
    fn equal_keys_share_one_slot() {
        let store = store();
        let mut dedup = VertexDeduplicator::new();
        let a = dedup.slot_for(store.key_for("1/1/1"), &store);
        let b = dedup.slot_for(store.key_for("2"), &store);
        let c = dedup.slot_for(store.key_for("1/1/1"), &store);
        let d = dedup.slot_for(store.key_for("-2/-1/-1"), &store);
        assert_eq!((a, b, c, d), (0, 1, 0, 0));
        assert_eq!(dedup.vertex_count(), 2);
    }

    #[test]
    fn interleaves_position_normal_tex_coord() {
        let store = store();
        let mut dedup = VertexDeduplicator::new();
        dedup.slot_for(store.key_for("1/1/1"), &store);
        dedup.slot_for(store.key_for("2"), &store);
        assert_eq!(
            dedup.into_vertices(),
            vec![
                1.0, 2.0, 3.0, 0.0, 1.0, 0.0, 0.25, 0.75, //
                4.0, 5.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            ]
        );
    }
}
