use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::{Vec2, Vec3, Vec4};

mod mesh;
mod renderer;
mod scenes;
mod ui;

use mesh::{MeshEngine, MeshResult, ShapeKind};
use renderer::{Camera, GpuState, gpu::generate_grid_vertices};
use scenes::{CHASE_RETENTION, FrameInput, build_scene, swarm_instances};
use ui::{Scene, UiActions, UiState, draw_help_overlay, draw_side_panel, theme::apply_theme};

struct InputState {
    forward: f32,
    right: f32,
    up: f32,
    mouse_captured: bool,
    mouse_delta: Vec2,
    cursor_ndc: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            forward: 0.0,
            right: 0.0,
            up: 0.0,
            mouse_captured: false,
            mouse_delta: Vec2::ZERO,
            cursor_ndc: Vec2::ZERO,
        }
    }
}

/// Projects the cursor onto the z = 0 plane the shapes live in.
fn cursor_to_world(camera: &Camera, ndc: Vec2) -> Vec3 {
    let inv = camera.view_projection_matrix().inverse();

    let near = inv * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
    let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
    let near = near.truncate() / near.w;
    let far = far.truncate() / far.w;

    let dir = far - near;
    if dir.z.abs() < 1e-6 {
        return Vec3::new(ndc.x, ndc.y, 0.0);
    }
    let t = -near.z / dir.z;
    near + dir * t
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    camera: Camera,
    mesh_engine: MeshEngine,
    ui_state: UiState,
    input: InputState,

    start_time: Instant,
    animation_time: f32,
    last_frame: Instant,
    frame_count: u32,
    fps_timer: Instant,
    last_frame_time: Instant,
    last_vsync_state: bool,

    chase_pos: Vec3,
    cursor_world: Vec3,

    /// (vertices, triangles) per shape, indexed by `ShapeKind::index`.
    shape_counts: [(usize, usize); 4],
    grid_uploaded: bool,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            camera: Camera::default(),
            mesh_engine: MeshEngine::new(),
            ui_state: UiState::default(),
            input: InputState::default(),

            start_time: Instant::now(),
            animation_time: 0.0,
            last_frame: Instant::now(),
            frame_count: 0,
            fps_timer: Instant::now(),
            last_frame_time: Instant::now(),
            last_vsync_state: true,

            chase_pos: Vec3::new(1.0, 1.0, 0.0),
            cursor_world: Vec3::ZERO,

            shape_counts: [(0, 0); 4],
            grid_uploaded: false,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) {
        let gpu = pollster::block_on(GpuState::new(window.clone()));

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        if self.ui_state.mesh_needs_rebuild {
            self.rebuild_all();
            self.ui_state.mesh_needs_rebuild = false;
        }
    }

    fn rebuild_all(&self) {
        for shape in ShapeKind::ALL {
            let (vertical, rotation) = self.ui_state.resolutions[shape.index()];
            self.mesh_engine.rebuild(shape, vertical, rotation);
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.ui_state.animate {
            self.animation_time = self.start_time.elapsed().as_secs_f32();
        }

        self.frame_count += 1;
        if self.fps_timer.elapsed().as_secs_f32() >= 1.0 {
            let fps = self.frame_count as f32 / self.fps_timer.elapsed().as_secs_f32();
            *self.mesh_engine.stats().fps.lock() = fps;
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        self.camera.set_mode(self.ui_state.camera_mode);
        self.camera
            .move_by(self.input.forward, self.input.right, self.input.up, dt);

        if self.input.mouse_captured {
            self.camera.process_mouse_movement(self.input.mouse_delta);
        }
        self.input.mouse_delta = Vec2::ZERO;

        self.cursor_world = cursor_to_world(&self.camera, self.input.cursor_ndc);
        self.chase_pos = self.cursor_world.lerp(self.chase_pos, CHASE_RETENTION);

        while let Some(result) = self.mesh_engine.try_recv_result() {
            match result {
                MeshResult::Built { shape, mesh } => {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.buffers.upload_shape(&gpu.queue, shape, &mesh);
                        if shape == ShapeKind::Sphere {
                            let instances = swarm_instances(&mesh);
                            gpu.buffers.upload_swarm(&gpu.queue, &instances);
                        }
                    }
                    self.shape_counts[shape.index()] =
                        (mesh.vertex_count(), mesh.triangle_count());
                }
                MeshResult::Error(_) => {
                    // Already surfaced through MeshEngine::last_error.
                }
            }
        }

        let stats = self.mesh_engine.stats();
        let vertices: usize = self.shape_counts.iter().map(|(v, _)| v).sum();
        let triangles: usize = self.shape_counts.iter().map(|(_, t)| t).sum();
        stats.vertices.store(vertices, Ordering::Relaxed);
        stats.triangles.store(triangles, Ordering::Relaxed);

        if self.ui_state.show_grid && !self.grid_uploaded {
            if let Some(gpu) = &mut self.gpu {
                let grid_verts = generate_grid_vertices(2.0, 20);
                gpu.buffers.upload_grid(&gpu.queue, &grid_verts);
                self.grid_uploaded = true;
            }
        }
    }

    fn render(&mut self) {
        if self.ui_state.fps_cap_enabled {
            let frame_duration = Duration::from_secs_f64(1.0 / self.ui_state.fps_cap as f64);
            let elapsed = self.last_frame_time.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
        self.last_frame_time = Instant::now();

        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let stats = Arc::clone(self.mesh_engine.stats());
        let last_error = self.mesh_engine.last_error();
        let camera_pos = self.camera.position.to_array();
        let camera_mode = self.ui_state.camera_mode;

        let mut ui_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &stats, &last_error);
            draw_help_overlay(ctx, camera_pos, camera_mode);
        });

        if ui_actions.rebuild_meshes {
            self.rebuild_all();
        }

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            gpu.set_vsync(self.ui_state.vsync_enabled);
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                panic!("Out of GPU memory");
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.update_camera(&self.camera);

        let frame_input = FrameInput {
            time: self.animation_time,
            cursor_world: self.cursor_world,
            chase_pos: self.chase_pos,
        };
        let scene_frame = build_scene(self.ui_state.scene, &frame_input);
        for (slot, uniform) in scene_frame.uniforms.iter().enumerate() {
            gpu.write_draw_uniform(slot as u32, uniform);
        }

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_scene(
            &view,
            &mut encoder,
            &scene_frame.draws,
            self.ui_state.show_grid,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let value = if pressed { 1.0 } else { 0.0 };

        match key {
            KeyCode::KeyW => self.input.forward = value,
            KeyCode::KeyS => self.input.forward = -value,
            KeyCode::KeyA => self.input.right = -value,
            KeyCode::KeyD => self.input.right = value,
            KeyCode::Space => self.input.up = value,
            KeyCode::ShiftLeft | KeyCode::ControlLeft => self.input.up = -value,
            KeyCode::Digit1 if pressed => self.ui_state.scene = Scene::Wireframe,
            KeyCode::Digit2 if pressed => self.ui_state.scene = Scene::Normals,
            KeyCode::Digit3 if pressed => self.ui_state.scene = Scene::Lit,
            KeyCode::Digit4 if pressed => self.ui_state.scene = Scene::PointLight,
            KeyCode::Digit5 if pressed => self.ui_state.scene = Scene::Chase,
            KeyCode::Digit6 if pressed => self.ui_state.scene = Scene::Swarm,
            KeyCode::Escape if pressed => {
                self.input.mouse_captured = false;
                if let Some(window) = &self.window {
                    let _ = window.set_cursor_grab(winit::window::CursorGrabMode::None);
                    window.set_cursor_visible(true);
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = Window::default_attributes()
            .with_title("Lathe 3D")
            .with_inner_size(PhysicalSize::new(1600, 900));

        let window = Arc::new(event_loop.create_window(window_attrs).unwrap());
        self.init_gpu(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.mesh_engine.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(gpu) = &self.gpu {
                    let w = gpu.config.width.max(1) as f32;
                    let h = gpu.config.height.max(1) as f32;
                    self.input.cursor_ndc = Vec2::new(
                        position.x as f32 / w * 2.0 - 1.0,
                        1.0 - position.y as f32 / h * 2.0,
                    );
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.input.mouse_captured = state == ElementState::Pressed;

                if let Some(window) = &self.window {
                    if self.input.mouse_captured {
                        let _ = window.set_cursor_grab(winit::window::CursorGrabMode::Confined);
                        window.set_cursor_visible(false);
                    } else {
                        let _ = window.set_cursor_grab(winit::window::CursorGrabMode::None);
                        window.set_cursor_visible(true);
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.camera.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
            }

            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.mouse_captured {
                self.input.mouse_delta.x += delta.0 as f32;
                self.input.mouse_delta.y += delta.1 as f32;
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).unwrap();
}
