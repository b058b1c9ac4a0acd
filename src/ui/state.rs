use crate::mesh::ShapeKind;
use crate::renderer::CameraMode;

/// The six demo scenes, switchable with the number keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scene {
    Wireframe,
    Normals,
    Lit,
    PointLight,
    Chase,
    Swarm,
}

impl Scene {
    pub const ALL: [Scene; 6] = [
        Scene::Wireframe,
        Scene::Normals,
        Scene::Lit,
        Scene::PointLight,
        Scene::Chase,
        Scene::Swarm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Scene::Wireframe => "Wireframe",
            Scene::Normals => "Normals",
            Scene::Lit => "Lit",
            Scene::PointLight => "Point Light",
            Scene::Chase => "Chase",
            Scene::Swarm => "Swarm",
        }
    }

    pub fn key_hint(self) -> &'static str {
        match self {
            Scene::Wireframe => "1",
            Scene::Normals => "2",
            Scene::Lit => "3",
            Scene::PointLight => "4",
            Scene::Chase => "5",
            Scene::Swarm => "6",
        }
    }
}

pub struct UiState {
    pub scene: Scene,

    /// (vertical, rotation) segments per shape, indexed by `ShapeKind::index`.
    pub resolutions: [(u32, u32); 4],
    pub mesh_needs_rebuild: bool,

    pub camera_mode: CameraMode,
    pub vsync_enabled: bool,

    pub animate: bool,
    pub show_grid: bool,
    pub show_stats: bool,

    pub fps_cap_enabled: bool,
    pub fps_cap: u32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            scene: Scene::Lit,

            resolutions: ShapeKind::ALL.map(|s| s.default_resolution()),
            mesh_needs_rebuild: true,

            camera_mode: CameraMode::Orbital,
            vsync_enabled: true,

            animate: true,
            show_grid: true,
            show_stats: true,

            fps_cap_enabled: false,
            fps_cap: 144,
        }
    }
}
