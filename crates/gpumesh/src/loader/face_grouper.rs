use crate::engine::core::MeshIndex;
use crate::loader::material_library::Material;
use std::sync::Arc;

/// A run of faces declared while one material was active.
#[derive(Debug, Clone)]
pub struct FaceGroup {
    pub indices: Vec<MeshIndex>,
    pub material: Option<Arc<Material>>,
}

/// Splits the face stream into [`FaceGroup`]s at every material change.
#[derive(Default)]
pub struct FaceGrouper {
    pending: Vec<MeshIndex>,
    active_material: Option<Arc<Material>>,
    groups: Vec<FaceGroup>,
}

impl FaceGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_face(&mut self, slots: &[MeshIndex]) {
        self.pending.extend_from_slice(slots);
    }

    /// Seals the pending faces under the previous material and activates `material`.
    pub fn use_material(&mut self, material: Option<Arc<Material>>) {
        self.seal();
        self.active_material = material;
    }

    pub fn active_material(&self) -> Option<&Arc<Material>> {
        self.active_material.as_ref()
    }

    /// Seals whatever is still pending and returns all groups in source order.
    pub fn finish(mut self) -> Vec<FaceGroup> {
        self.seal();
        self.groups
    }

    fn seal(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.groups.push(FaceGroup {
            indices: std::mem::take(&mut self.pending),
            material: self.active_material.clone(),
        });
    }
}
