use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

use crate::mesh::revolve::{MeshError, RevolvedMesh, revolve, revolve_polar};
use crate::mesh::curves;

/// The four demo shapes and the generator variant each one uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Sphere,
    Torus,
    SpikedTorus,
    SpikeBall,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Sphere,
        ShapeKind::Torus,
        ShapeKind::SpikedTorus,
        ShapeKind::SpikeBall,
    ];

    pub fn index(self) -> usize {
        match self {
            ShapeKind::Sphere => 0,
            ShapeKind::Torus => 1,
            ShapeKind::SpikedTorus => 2,
            ShapeKind::SpikeBall => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Torus => "Torus",
            ShapeKind::SpikedTorus => "Spiked Torus",
            ShapeKind::SpikeBall => "Spike Ball",
        }
    }

    /// The spiky profiles need a much denser grid to resolve their bumps.
    pub fn default_resolution(self) -> (u32, u32) {
        match self {
            ShapeKind::Sphere | ShapeKind::Torus => (16, 16),
            ShapeKind::SpikedTorus | ShapeKind::SpikeBall => (100, 100),
        }
    }

    pub fn build(
        self,
        vertical_segments: u32,
        rotation_segments: u32,
    ) -> Result<RevolvedMesh, MeshError> {
        match self {
            ShapeKind::Sphere => revolve(curves::half_circle, vertical_segments, rotation_segments),
            ShapeKind::Torus => revolve(curves::circle, vertical_segments, rotation_segments),
            ShapeKind::SpikedTorus => {
                revolve(curves::spikes, vertical_segments, rotation_segments)
            }
            ShapeKind::SpikeBall => {
                revolve_polar(curves::spikes, vertical_segments, rotation_segments)
            }
        }
    }
}

#[derive(Default)]
pub struct RenderStats {
    pub fps: Mutex<f32>,
    pub vertices: AtomicUsize,
    pub triangles: AtomicUsize,
    pub rebuilds: AtomicU64,
    pub last_rebuild_ms: Mutex<f32>,
}

pub enum MeshCommand {
    Rebuild {
        shape: ShapeKind,
        vertical_segments: u32,
        rotation_segments: u32,
    },
    Stop,
}

pub enum MeshResult {
    Built { shape: ShapeKind, mesh: RevolvedMesh },
    Error(String),
}

/// Rebuilds meshes off the render thread so resolution changes never stall
/// a frame. Generation itself is pure; this is only plumbing around it.
pub struct MeshEngine {
    tx_cmd: Sender<MeshCommand>,
    rx_result: Receiver<MeshResult>,
    stats: Arc<RenderStats>,
    last_error: Arc<Mutex<Option<String>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl MeshEngine {
    pub fn new() -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<MeshCommand>();
        let (tx_result, rx_result) = channel::bounded::<MeshResult>(8);
        let stats = Arc::new(RenderStats::default());
        let last_error = Arc::new(Mutex::new(None));

        let stats_clone = Arc::clone(&stats);
        let last_error_clone = Arc::clone(&last_error);

        let thread_handle = thread::spawn(move || {
            mesh_thread(rx_cmd, tx_result, stats_clone, last_error_clone);
        });

        Self {
            tx_cmd,
            rx_result,
            stats,
            last_error,
            thread_handle: Some(thread_handle),
        }
    }

    pub fn rebuild(&self, shape: ShapeKind, vertical_segments: u32, rotation_segments: u32) {
        let _ = self.tx_cmd.send(MeshCommand::Rebuild {
            shape,
            vertical_segments,
            rotation_segments,
        });
    }

    pub fn try_recv_result(&self) -> Option<MeshResult> {
        self.rx_result.try_recv().ok()
    }

    pub fn stats(&self) -> &Arc<RenderStats> {
        &self.stats
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(MeshCommand::Stop);
    }
}

impl Drop for MeshEngine {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(MeshCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn mesh_thread(
    rx_cmd: Receiver<MeshCommand>,
    tx_result: Sender<MeshResult>,
    stats: Arc<RenderStats>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    use std::sync::atomic::Ordering;

    loop {
        let cmd = match rx_cmd.recv() {
            Ok(c) => c,
            Err(_) => return,
        };

        match cmd {
            MeshCommand::Rebuild {
                shape,
                vertical_segments,
                rotation_segments,
            } => {
                *last_error.lock() = None;

                let start = std::time::Instant::now();
                match shape.build(vertical_segments, rotation_segments) {
                    Ok(mesh) => {
                        let elapsed_ms = start.elapsed().as_secs_f32() * 1000.0;
                        info!(
                            shape = shape.label(),
                            vertical_segments,
                            rotation_segments,
                            vertices = mesh.vertex_count(),
                            triangles = mesh.triangle_count(),
                            elapsed_ms,
                            "mesh rebuilt"
                        );
                        *stats.last_rebuild_ms.lock() = elapsed_ms;
                        stats.rebuilds.fetch_add(1, Ordering::Relaxed);
                        let _ = tx_result.send(MeshResult::Built { shape, mesh });
                    }
                    Err(e) => {
                        warn!(shape = shape.label(), error = %e, "mesh rebuild failed");
                        let msg = format!("{}: {}", shape.label(), e);
                        *last_error.lock() = Some(msg.clone());
                        let _ = tx_result.send(MeshResult::Error(msg));
                    }
                }
            }
            MeshCommand::Stop => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn default_resolutions_build() {
        for shape in ShapeKind::ALL {
            let (vertical, rotation) = shape.default_resolution();
            let mesh = shape.build(vertical, rotation).unwrap();
            assert!(mesh.triangle_count() > 0, "{} built empty", shape.label());
        }
    }

    #[test]
    fn engine_round_trips_a_rebuild() {
        let engine = MeshEngine::new();
        engine.rebuild(ShapeKind::Torus, 16, 16);

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match engine.try_recv_result() {
                Some(MeshResult::Built { shape, mesh }) => {
                    assert_eq!(shape, ShapeKind::Torus);
                    assert_eq!(mesh.triangle_count(), 512);
                    assert!(engine.last_error().is_none());
                    break;
                }
                Some(MeshResult::Error(e)) => panic!("unexpected error: {e}"),
                None => {
                    assert!(Instant::now() < deadline, "no result within deadline");
                    std::thread::sleep(Duration::from_millis(5));
                }
            }
        }
    }

    #[test]
    fn engine_reports_invalid_resolution() {
        let engine = MeshEngine::new();
        engine.rebuild(ShapeKind::Sphere, 16, 2);

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match engine.try_recv_result() {
                Some(MeshResult::Error(e)) => {
                    assert!(e.contains("invalid resolution"));
                    assert!(engine.last_error().is_some());
                    break;
                }
                Some(MeshResult::Built { .. }) => panic!("build should have failed"),
                None => {
                    assert!(Instant::now() < deadline, "no result within deadline");
                    std::thread::sleep(Duration::from_millis(5));
                }
            }
        }
    }
}
