use egui::{Color32, Context, RichText, ScrollArea, Ui};
use std::sync::atomic::Ordering;

use crate::mesh::{RenderStats, ShapeKind};
use crate::renderer::CameraMode;
use crate::renderer::gpu::MAX_SEGMENTS;
use crate::ui::state::{Scene, UiState};
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub rebuild_meshes: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    stats: &RenderStats,
    last_error: &Option<String>,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(300.0)
        .max_width(380.0)
        .default_width(320.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("LATHE 3D").strong());
                ui.add_space(4.0);
                ui.label(
                    RichText::new("Surfaces of Revolution")
                        .color(TEXT_MUTED)
                        .size(11.0),
                );
                ui.add_space(16.0);

                section_header(ui, "SCENE");
                for scene in Scene::ALL {
                    let selected = state.scene == scene;
                    let text = format!("[{}] {}", scene.key_hint(), scene.label());
                    if ui.selectable_label(selected, text).clicked() {
                        state.scene = scene;
                    }
                }
                ui.add_space(16.0);

                ui.separator();
                ui.add_space(12.0);

                section_header(ui, "RESOLUTION");
                for shape in ShapeKind::ALL {
                    let res = &mut state.resolutions[shape.index()];
                    ui.label(RichText::new(shape.label()).color(TEXT_BRIGHT).size(12.0));
                    let mut changed = false;
                    ui.horizontal(|ui| {
                        ui.label("Vert:");
                        changed |= ui
                            .add(egui::Slider::new(&mut res.0, 1..=MAX_SEGMENTS).logarithmic(true))
                            .changed();
                    });
                    ui.horizontal(|ui| {
                        ui.label("Rot:");
                        changed |= ui
                            .add(egui::Slider::new(&mut res.1, 3..=MAX_SEGMENTS).logarithmic(true))
                            .changed();
                    });
                    if changed {
                        state.mesh_needs_rebuild = true;
                    }
                    ui.add_space(6.0);
                }

                let (btn_text, btn_color, text_color) = if state.mesh_needs_rebuild {
                    ("Rebuild Meshes", ACCENT_GREEN, BG_PURE_BLACK)
                } else {
                    ("Up to date", BG_WIDGET, ACCENT_GREEN)
                };
                if ui
                    .add(
                        egui::Button::new(RichText::new(btn_text).color(text_color))
                            .fill(btn_color)
                            .min_size(egui::vec2(ui.available_width(), 32.0)),
                    )
                    .clicked()
                    && state.mesh_needs_rebuild
                {
                    actions.rebuild_meshes = true;
                    state.mesh_needs_rebuild = false;
                }

                if let Some(err) = last_error {
                    ui.add_space(6.0);
                    egui::Frame::default()
                        .fill(Color32::from_rgb(40, 15, 15))
                        .stroke(egui::Stroke::new(1.0, ACCENT_RED))
                        .rounding(4.0)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.label(RichText::new(err).color(ACCENT_RED).size(11.0));
                        });
                }
                ui.add_space(16.0);

                ui.separator();
                ui.add_space(12.0);

                section_header(ui, "VIEW");
                camera_controls(ui, &mut state.camera_mode);
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.animate, "Animate");
                    ui.checkbox(&mut state.show_grid, "Grid");
                });
                ui.add_space(16.0);

                section_header(ui, "PERFORMANCE");
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.vsync_enabled, "VSync");
                    ui.checkbox(&mut state.show_stats, "Stats");
                });
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.fps_cap_enabled, "FPS Cap:");
                    ui.add_enabled(
                        state.fps_cap_enabled,
                        egui::DragValue::new(&mut state.fps_cap)
                            .range(30..=500)
                            .suffix(" fps"),
                    );
                });
                ui.add_space(16.0);

                ui.separator();
                ui.add_space(12.0);

                if state.show_stats {
                    stats_panel(ui, stats);
                }
            });
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn camera_controls(ui: &mut Ui, mode: &mut CameraMode) {
    ui.horizontal(|ui| {
        ui.label("Camera:");
        if ui
            .selectable_label(*mode == CameraMode::Free, "Free")
            .clicked()
        {
            *mode = CameraMode::Free;
        }
        if ui
            .selectable_label(*mode == CameraMode::Orbital, "Orbital")
            .clicked()
        {
            *mode = CameraMode::Orbital;
        }
    });
}

fn stats_panel(ui: &mut Ui, stats: &RenderStats) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id =
                Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps = *stats.fps.lock();
            let fps_color = if fps >= 60.0 {
                ACCENT_GREEN
            } else if fps >= 30.0 {
                ACCENT_ORANGE
            } else {
                ACCENT_RED
            };

            egui::Grid::new("stats")
                .num_columns(2)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("FPS").color(TEXT_MUTED));
                    ui.label(RichText::new(format!("{:.0}", fps)).color(fps_color));
                    ui.end_row();

                    ui.label(RichText::new("Vertices").color(TEXT_MUTED));
                    ui.label(
                        RichText::new(fmt_num(stats.vertices.load(Ordering::Relaxed)))
                            .color(ACCENT_BLUE),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Triangles").color(TEXT_MUTED));
                    ui.label(
                        RichText::new(fmt_num(stats.triangles.load(Ordering::Relaxed)))
                            .color(ACCENT_BLUE),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Rebuilds").color(TEXT_MUTED));
                    ui.label(
                        RichText::new(format!("{}", stats.rebuilds.load(Ordering::Relaxed)))
                            .color(TEXT_PRIMARY),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Rebuild ms").color(TEXT_MUTED));
                    ui.label(
                        RichText::new(format!("{:.2}", *stats.last_rebuild_ms.lock()))
                            .color(TEXT_PRIMARY),
                    );
                    ui.end_row();
                });
        });
}

pub fn draw_help_overlay(ctx: &Context, pos: [f32; 3], camera_mode: CameraMode) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id =
                        Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    let controls = match camera_mode {
                        CameraMode::Free => "1-6 Scene | WASD Move | RMB+Drag Look | Scroll Speed",
                        CameraMode::Orbital => "1-6 Scene | RMB+Drag Orbit | Scroll Zoom",
                    };
                    ui.label(RichText::new(controls).color(TEXT_MUTED));
                    ui.label(
                        RichText::new(format!(
                            "Pos: ({:.1}, {:.1}, {:.1})",
                            pos[0], pos[1], pos[2]
                        ))
                        .color(TEXT_MUTED),
                    );
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}
