pub mod cache;
pub mod face_grouper;
pub mod material_library;
pub mod obj_loader;
pub mod vertex_dedup;

pub use material_library::{Material, MaterialLibrary};
pub use obj_loader::{parse_obj, ModelData};
