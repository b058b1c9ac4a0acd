pub mod curves;
pub mod engine;
pub mod revolve;

pub use engine::{MeshEngine, MeshResult, RenderStats, ShapeKind};
pub use revolve::{MeshError, RevolvedMesh, revolve, revolve_polar};
