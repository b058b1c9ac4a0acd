use glam::{Mat4, Quat, Vec3};
use tracing::warn;

use crate::mesh::{RevolvedMesh, ShapeKind};
use crate::renderer::gpu::{
    DrawCall, DrawUniform, MAX_DRAW_SLOTS, SHADE_NORMALS, SHADE_PHONG, SHADE_PHONG_POINT,
    SHADE_SOLID, SwarmInstance,
};
use crate::ui::Scene;

/// Base color and shininess for each shape in the lit scenes.
fn material(shape: ShapeKind) -> ([f32; 3], f32) {
    match shape {
        ShapeKind::Sphere => ([0.5, 0.5, 0.5], 128.0),
        ShapeKind::Torus => ([0.8, 0.15, 0.15], 32.0),
        ShapeKind::SpikedTorus => ([0.15, 0.8, 0.15], 256.0),
        ShapeKind::SpikeBall => ([0.2, 0.3, 0.9], 512.0),
    }
}

/// Where each shape sits in the four-shape showcase scenes.
fn showcase_position(shape: ShapeKind) -> Vec3 {
    match shape {
        ShapeKind::Sphere => Vec3::new(-0.5, 0.5, 0.0),
        ShapeKind::Torus => Vec3::new(0.5, 0.5, 0.0),
        ShapeKind::SpikedTorus => Vec3::new(-0.5, -0.5, 0.0),
        ShapeKind::SpikeBall => Vec3::new(0.5, -0.5, 0.0),
    }
}

const SHOWCASE_SCALE: f32 = 0.4;
const SPIN_DEGREES_PER_SEC: f32 = 10.0;

const CHASE_SCALE: f32 = 0.3;
const CHASE_NEAR_DISTANCE: f32 = 0.6;
/// Per-frame retention factor, so the chaser eases toward the cursor.
pub const CHASE_RETENTION: f32 = 0.99;

const SWARM_SHELL_SCALE: f32 = 1.2;
const SWARM_SHAPE_SCALE: f32 = 0.05;

pub struct FrameInput {
    pub time: f32,
    pub cursor_world: Vec3,
    pub chase_pos: Vec3,
}

/// The uniforms and draw calls for one frame; `draws[i]` reads
/// `uniforms[i]` through its dynamic-offset slot.
#[derive(Default)]
pub struct SceneFrame {
    pub uniforms: Vec<DrawUniform>,
    pub draws: Vec<DrawCall>,
}

impl SceneFrame {
    /// Claims the next uniform slot, or `None` once all dynamic-offset
    /// slots are taken; overflowing draws are dropped rather than written
    /// past the uniform buffer.
    fn next_slot(&mut self, uniform: DrawUniform) -> Option<u32> {
        if self.uniforms.len() >= MAX_DRAW_SLOTS as usize {
            warn!(draws = self.draws.len(), "out of draw uniform slots, dropping draw");
            return None;
        }
        let slot = self.uniforms.len() as u32;
        self.uniforms.push(uniform);
        Some(slot)
    }

    fn push_mesh(&mut self, shape: ShapeKind, uniform: DrawUniform, wireframe: bool) {
        if let Some(slot) = self.next_slot(uniform) {
            self.draws.push(DrawCall::Mesh {
                shape,
                slot,
                wireframe,
            });
        }
    }

    fn push_swarm(&mut self, shape: ShapeKind, uniform: DrawUniform) {
        if let Some(slot) = self.next_slot(uniform) {
            self.draws.push(DrawCall::Swarm { shape, slot });
        }
    }
}

fn spin(time: f32) -> Quat {
    Quat::from_rotation_y(time * SPIN_DEGREES_PER_SEC.to_radians())
}

fn draw_uniform(model: Mat4, color: [f32; 3], shininess: f32, light: Vec3, mode: u32) -> DrawUniform {
    DrawUniform {
        model: model.to_cols_array_2d(),
        color: [color[0], color[1], color[2], shininess],
        light: [light.x, light.y, light.z, 0.0],
        mode: [mode, 0, 0, 0],
    }
}

fn showcase(frame: &mut SceneFrame, input: &FrameInput, mode: u32, wireframe: bool) {
    let rotation = spin(input.time);
    for shape in ShapeKind::ALL {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(SHOWCASE_SCALE),
            rotation,
            showcase_position(shape),
        );
        let (color, shininess) = if mode == SHADE_SOLID {
            ([0.85, 0.85, 0.85], 1.0)
        } else {
            material(shape)
        };
        frame.push_mesh(
            shape,
            draw_uniform(model, color, shininess, input.cursor_world, mode),
            wireframe,
        );
    }
}

fn chase(frame: &mut SceneFrame, input: &FrameInput) {
    let target_model = Mat4::from_scale_rotation_translation(
        Vec3::splat(CHASE_SCALE),
        Quat::IDENTITY,
        input.cursor_world,
    );
    let (sphere_color, sphere_shininess) = material(ShapeKind::Sphere);
    frame.push_mesh(
        ShapeKind::Sphere,
        draw_uniform(
            target_model,
            sphere_color,
            sphere_shininess,
            input.cursor_world,
            SHADE_PHONG,
        ),
        false,
    );

    let distance = input.chase_pos.distance(input.cursor_world);
    let chaser_color = if distance > CHASE_NEAR_DISTANCE {
        [0.15, 0.8, 0.15]
    } else {
        [0.8, 0.15, 0.15]
    };
    let chaser_model = Mat4::from_scale_rotation_translation(
        Vec3::splat(CHASE_SCALE),
        spin(input.time),
        input.chase_pos,
    );
    frame.push_mesh(
        ShapeKind::Torus,
        draw_uniform(
            chaser_model,
            chaser_color,
            32.0,
            input.cursor_world,
            SHADE_PHONG,
        ),
        false,
    );
}

fn swarm(frame: &mut SceneFrame, input: &FrameInput) {
    // One torus per sphere vertex; the offset and color come from the
    // instance buffer, the model only spins and shrinks the torus.
    let model = Mat4::from_rotation_translation(
        spin(input.time) * Quat::from_rotation_x(90.0_f32.to_radians()),
        Vec3::ZERO,
    ) * Mat4::from_scale(Vec3::splat(SWARM_SHAPE_SCALE));
    frame.push_swarm(
        ShapeKind::Torus,
        draw_uniform(model, [1.0, 1.0, 1.0], 32.0, input.cursor_world, SHADE_PHONG),
    );
}

pub fn build_scene(scene: Scene, input: &FrameInput) -> SceneFrame {
    let mut frame = SceneFrame::default();

    match scene {
        Scene::Wireframe => showcase(&mut frame, input, SHADE_SOLID, true),
        Scene::Normals => showcase(&mut frame, input, SHADE_NORMALS, false),
        Scene::Lit => showcase(&mut frame, input, SHADE_PHONG, false),
        Scene::PointLight => showcase(&mut frame, input, SHADE_PHONG_POINT, false),
        Scene::Chase => chase(&mut frame, input),
        Scene::Swarm => swarm(&mut frame, input),
    }

    frame
}

/// Instance data for the swarm scene: one torus per vertex of the
/// sphere mesh, pushed out to a larger shell and tinted by position.
pub fn swarm_instances(sphere: &RevolvedMesh) -> Vec<SwarmInstance> {
    sphere
        .positions
        .iter()
        .map(|p| {
            let offset = *p * SWARM_SHELL_SCALE;
            let color = (*p + Vec3::splat(0.3)).clamp(Vec3::ZERO, Vec3::ONE);
            SwarmInstance {
                offset: offset.to_array(),
                color: color.to_array(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::revolve;
    use crate::mesh::curves;

    #[test]
    fn showcase_scenes_draw_all_four_shapes() {
        let input = FrameInput {
            time: 1.0,
            cursor_world: Vec3::ZERO,
            chase_pos: Vec3::ZERO,
        };

        for scene in [Scene::Wireframe, Scene::Normals, Scene::Lit, Scene::PointLight] {
            let frame = build_scene(scene, &input);
            assert_eq!(frame.draws.len(), 4);
            assert_eq!(frame.uniforms.len(), 4);
        }
    }

    #[test]
    fn chase_scene_colors_by_distance() {
        let far = FrameInput {
            time: 0.0,
            cursor_world: Vec3::new(2.0, 0.0, 0.0),
            chase_pos: Vec3::ZERO,
        };
        let frame = build_scene(Scene::Chase, &far);
        assert_eq!(frame.uniforms[1].color[1], 0.8); // green when far

        let near = FrameInput {
            time: 0.0,
            cursor_world: Vec3::new(0.1, 0.0, 0.0),
            chase_pos: Vec3::ZERO,
        };
        let frame = build_scene(Scene::Chase, &near);
        assert_eq!(frame.uniforms[1].color[0], 0.8); // red when close
    }

    #[test]
    fn draw_list_never_outgrows_the_uniform_slots() {
        let mut frame = SceneFrame::default();
        let uniform = draw_uniform(Mat4::IDENTITY, [1.0, 1.0, 1.0], 1.0, Vec3::ZERO, SHADE_SOLID);

        for _ in 0..MAX_DRAW_SLOTS + 4 {
            frame.push_mesh(ShapeKind::Sphere, uniform, false);
        }

        assert_eq!(frame.draws.len(), MAX_DRAW_SLOTS as usize);
        assert_eq!(frame.uniforms.len(), MAX_DRAW_SLOTS as usize);
        for draw in &frame.draws {
            let DrawCall::Mesh { slot, .. } = *draw else {
                panic!("unexpected draw kind");
            };
            assert!(slot < MAX_DRAW_SLOTS);
        }
    }

    #[test]
    fn swarm_instances_cover_every_sphere_vertex() {
        let sphere = revolve(curves::half_circle, 8, 8).unwrap();
        let instances = swarm_instances(&sphere);
        assert_eq!(instances.len(), sphere.vertex_count());

        for inst in &instances {
            for c in inst.color {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }
}
