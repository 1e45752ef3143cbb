use ahash::AHashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A material record as found in an MTL file.
///
/// The geometry pipeline never looks inside; it only keeps references per face group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    /// Every `keyword value...` line of the material block, in source order.
    pub properties: Vec<(String, String)>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            properties: vec![],
        }
    }

    pub fn property(&self, keyword: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == keyword)
            .map(|(_, value)| value.as_str())
    }
}

/// Lookup from material name to material.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: AHashMap<String, Arc<Material>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `newmtl` blocks from MTL source text.
    ///
    /// Property lines before the first `newmtl` are dropped. A repeated name replaces the
    /// earlier material.
    pub fn from_mtl(source: &str) -> Self {
        let mut library = Self::new();
        let mut current: Option<Material> = None;

        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            if keyword == "newmtl" {
                if let Some(material) = current.take() {
                    library.insert(material);
                }
                current = Some(Material::new(rest));
            } else if let Some(material) = &mut current {
                material.properties.push((keyword.to_owned(), rest.to_owned()));
            } else {
                warn!("Ignoring MTL property '{keyword}' outside of a material block");
            }
        }
        if let Some(material) = current {
            library.insert(material);
        }
        debug!("Loaded {} materials", library.len());
        library
    }

    pub fn insert(&mut self, material: Material) -> Arc<Material> {
        let material = Arc::new(material);
        self.materials.insert(material.name.clone(), Arc::clone(&material));
        material
    }

    pub fn get(&self, name: &str) -> Option<Arc<Material>> {
        self.materials.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
