use crate::engine::Size2D;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const APP_CONFIG_FILE: &str = "config.ron";

fn default_model_path() -> String {
    "model.obj".to_string()
}

fn default_viewport() -> Size2D {
    [1024, 768]
}

fn default_clear_color() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,

    #[serde(default)]
    pub material_path: Option<String>,

    /// WGSL source for the vertex stage. The built-in shader is used when unset.
    #[serde(default)]
    pub vertex_shader_path: Option<String>,

    #[serde(default)]
    pub fragment_shader_path: Option<String>,

    #[serde(default = "default_viewport")]
    pub viewport: Size2D,

    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],

    /// `tracing_subscriber::EnvFilter` directives, e.g. "info,wgpu_core=warn".
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            material_path: None,
            vertex_shader_path: None,
            fragment_shader_path: None,
            viewport: default_viewport(),
            clear_color: default_clear_color(),
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Reads the config file, falling back to defaults if it doesn't exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path.unwrap_or(APP_CONFIG_FILE);
        match std::fs::read_to_string(path) {
            Ok(config_str) => {
                Self::from_ron(&config_str).with_context(|| format!("Failed to parse '{path}'"))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("Failed to read '{path}'")),
        }
    }

    pub fn from_ron(config_str: &str) -> Result<Self> {
        let config: Self = ron::de::from_str(config_str)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = ron::ser::to_string_pretty(&self, Default::default())?;
        std::fs::write(path, config_str)?;
        Ok(())
    }
}
