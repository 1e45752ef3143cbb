pub mod camera;
pub mod core;
pub mod light;
pub mod scene;

pub use self::core::context::GpuContext;
pub use self::core::device::{RenderDevice, ShaderStage};
pub use self::core::mesh::Mesh;
pub use self::core::model::{Model, ModelBuilder};
pub use self::core::program::{Program, ProgramCache};
pub use self::core::MeshIndex;
pub use self::core::Size2D;
