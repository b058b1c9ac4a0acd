use glam::{DVec2, DVec3, Vec3};
use std::f64::consts::{PI, TAU};
use thiserror::Error;

pub const MIN_VERTICAL_SEGMENTS: u32 = 1;
pub const MIN_ROTATION_SEGMENTS: u32 = 3;

/// Ring radii below this collapse to a pole and get fan triangulation.
const POLE_EPSILON: f64 = 1e-9;
/// Profiles whose endpoints are closer than this are treated as closed.
const CLOSED_EPSILON: f64 = 1e-9;
/// Cross products shorter than this fall back to the radial direction.
const DEGENERATE_NORMAL_EPSILON: f64 = 1e-12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error(
        "invalid resolution {vertical}x{rotation}: need at least 1 vertical and 3 rotation segments"
    )]
    InvalidResolution { vertical: u32, rotation: u32 },
}

/// Triangulated surface of revolution. `normals[i]` is the outward surface
/// normal at `positions[i]`; `indices` groups positions into triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevolvedMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl RevolvedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Revolves a 2D profile curve around the vertical axis.
///
/// `curve` maps `t in [0, 1]` to `(radius, height)`. The curve is sampled at
/// `vertical_segments + 1` parameters and each sample is rotated through
/// `rotation_segments + 1` angles; the last column reuses the first column's
/// samples bit-for-bit so the seam closes exactly. Closed profiles (endpoints
/// coincide) additionally reuse the first row for the last row and wrap the
/// vertical axis when computing normals.
///
/// Rings whose radius collapses to zero (poles) are fan-triangulated instead
/// of quad-split, and their normals fall back to the radial direction.
pub fn revolve<F>(
    curve: F,
    vertical_segments: u32,
    rotation_segments: u32,
) -> Result<RevolvedMesh, MeshError>
where
    F: Fn(f64) -> DVec2,
{
    check_resolution(vertical_segments, rotation_segments)?;

    let rows = vertical_segments as usize + 1;
    let mut profile: Vec<DVec2> = (0..rows)
        .map(|i| curve(i as f64 / vertical_segments as f64))
        .collect();

    let closed = profile[0].distance(profile[rows - 1]) < CLOSED_EPSILON;
    if closed {
        profile[rows - 1] = profile[0];
    }

    let grid = SurfaceGrid::build(vertical_segments, rotation_segments, closed, |i, theta| {
        let p = profile[i];
        DVec3::new(p.x * theta.cos(), p.y, p.x * theta.sin())
    });

    Ok(grid.into_mesh())
}

/// Alternate-topology variant: instead of revolving `(radius, height)`
/// around the vertical axis, the curve's distance from the origin becomes a
/// radial displacement along sphere directions. The row parameter maps to
/// the polar angle (bottom pole to top pole), the column to the azimuth. A
/// spiky profile turns into a free-standing spiked blob.
pub fn revolve_polar<F>(
    curve: F,
    vertical_segments: u32,
    rotation_segments: u32,
) -> Result<RevolvedMesh, MeshError>
where
    F: Fn(f64) -> DVec2,
{
    check_resolution(vertical_segments, rotation_segments)?;

    let rows = vertical_segments as usize + 1;
    let radii: Vec<f64> = (0..rows)
        .map(|i| curve(i as f64 / vertical_segments as f64).length())
        .collect();

    let grid = SurfaceGrid::build(vertical_segments, rotation_segments, false, |i, theta| {
        let phi = PI * i as f64 / vertical_segments as f64;
        radii[i]
            * DVec3::new(
                phi.sin() * theta.cos(),
                -phi.cos(),
                phi.sin() * theta.sin(),
            )
    });

    Ok(grid.into_mesh())
}

fn check_resolution(vertical: u32, rotation: u32) -> Result<(), MeshError> {
    if vertical < MIN_VERTICAL_SEGMENTS || rotation < MIN_ROTATION_SEGMENTS {
        return Err(MeshError::InvalidResolution { vertical, rotation });
    }
    Ok(())
}

/// Row-major grid of sample points shared by both generator variants.
/// `rows == vertical_segments + 1`, `cols == rotation_segments + 1`, and the
/// last column always duplicates the first (the azimuth wraps). `wrap_rows`
/// marks grids built from a closed profile, where the last row duplicates
/// the first as well.
struct SurfaceGrid {
    rows: usize,
    cols: usize,
    wrap_rows: bool,
    points: Vec<DVec3>,
}

impl SurfaceGrid {
    fn build<F>(vertical_segments: u32, rotation_segments: u32, wrap_rows: bool, point_at: F) -> Self
    where
        F: Fn(usize, f64) -> DVec3,
    {
        let rows = vertical_segments as usize + 1;
        let cols = rotation_segments as usize + 1;
        let mut points = Vec::with_capacity(rows * cols);

        for i in 0..rows {
            for j in 0..cols {
                // j == rotation_segments evaluates at theta = 0, not 2*pi,
                // so the seam column is bit-identical to column zero.
                let theta = TAU * (j % (cols - 1)) as f64 / rotation_segments as f64;
                points.push(point_at(i, theta));
            }
        }

        Self {
            rows,
            cols,
            wrap_rows,
            points,
        }
    }

    fn at(&self, i: usize, j: usize) -> DVec3 {
        self.points[i * self.cols + j]
    }

    /// Difference of the vertical neighbors: central where possible,
    /// one-sided at open ends, wrapping for closed profiles.
    fn row_tangent(&self, i: usize, j: usize) -> DVec3 {
        if self.wrap_rows {
            let period = self.rows - 1;
            let up = (i + 1) % period;
            let down = (i + period - 1) % period;
            self.at(up, j) - self.at(down, j)
        } else if i == 0 {
            self.at(1, j) - self.at(0, j)
        } else if i == self.rows - 1 {
            self.at(i, j) - self.at(i - 1, j)
        } else {
            self.at(i + 1, j) - self.at(i - 1, j)
        }
    }

    /// Difference of the azimuthal neighbors; the rotation axis always wraps.
    fn col_tangent(&self, i: usize, j: usize) -> DVec3 {
        let period = self.cols - 1;
        let right = (j + 1) % period;
        let left = (j + period - 1) % period;
        self.at(i, right) - self.at(i, left)
    }

    fn normals(&self) -> Vec<DVec3> {
        let mut normals = vec![DVec3::ZERO; self.points.len()];

        for i in 0..self.rows {
            for j in 0..self.cols - 1 {
                let n = self.row_tangent(i, j).cross(self.col_tangent(i, j));
                normals[i * self.cols + j] = if n.length_squared() > DEGENERATE_NORMAL_EPSILON {
                    n.normalize()
                } else {
                    fallback_normal(self.at(i, j))
                };
            }
            // seam column shares column zero's normal exactly
            normals[i * self.cols + self.cols - 1] = normals[i * self.cols];
        }

        normals
    }

    /// Distance of each ring from the vertical axis, used to detect poles.
    fn ring_radii(&self) -> Vec<f64> {
        (0..self.rows)
            .map(|i| {
                let p = self.at(i, 0);
                (p.x * p.x + p.z * p.z).sqrt()
            })
            .collect()
    }

    fn triangulate(&self) -> Vec<u32> {
        let radii = self.ring_radii();
        let mut indices = Vec::with_capacity((self.rows - 1) * (self.cols - 1) * 6);

        for i in 0..self.rows - 1 {
            let pole_here = radii[i] < POLE_EPSILON;
            let pole_next = radii[i + 1] < POLE_EPSILON;

            for j in 0..self.cols - 1 {
                let a = (i * self.cols + j) as u32;
                let b = ((i + 1) * self.cols + j) as u32;
                let c = (i * self.cols + j + 1) as u32;
                let d = ((i + 1) * self.cols + j + 1) as u32;

                // Counter-clockwise seen from outside; pole rings collapse a
                // cell to a single fan triangle, and a cell between two pole
                // rings has no area at all.
                match (pole_here, pole_next) {
                    (true, true) => {}
                    (true, false) => indices.extend_from_slice(&[a, b, d]),
                    (false, true) => indices.extend_from_slice(&[a, b, c]),
                    (false, false) => {
                        indices.extend_from_slice(&[a, b, c]);
                        indices.extend_from_slice(&[b, d, c]);
                    }
                }
            }
        }

        indices
    }

    fn into_mesh(self) -> RevolvedMesh {
        let indices = self.triangulate();
        let normals = self.normals().iter().map(|n| n.as_vec3()).collect();
        let positions = self.points.iter().map(|p| p.as_vec3()).collect();

        RevolvedMesh {
            positions,
            normals,
            indices,
        }
    }
}

fn fallback_normal(position: DVec3) -> DVec3 {
    if position.length_squared() > DEGENERATE_NORMAL_EPSILON {
        position.normalize()
    } else {
        DVec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::curves;
    use std::collections::HashMap;

    const NORMAL_TOLERANCE: f32 = 1e-4;

    fn assert_valid(mesh: &RevolvedMesh, vertical: u32, rotation: u32) {
        let expected = (vertical as usize + 1) * (rotation as usize + 1);
        assert_eq!(mesh.positions.len(), expected);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_eq!(mesh.indices.len() % 3, 0);

        for &index in &mesh.indices {
            assert!((index as usize) < mesh.positions.len());
        }
        for p in &mesh.positions {
            assert!(p.is_finite());
        }
        for n in &mesh.normals {
            assert!(n.is_finite());
            assert!((n.length() - 1.0).abs() < NORMAL_TOLERANCE, "normal {n} not unit");
        }
    }

    /// Canonical edge key from quantized endpoint positions, so seam and
    /// pole duplicates count as the same geometric edge.
    fn edge_key(mesh: &RevolvedMesh, a: u32, b: u32) -> ([i64; 3], [i64; 3]) {
        let quantize = |v: Vec3| {
            [
                (v.x as f64 * 1e5).round() as i64,
                (v.y as f64 * 1e5).round() as i64,
                (v.z as f64 * 1e5).round() as i64,
            ]
        };
        let pa = quantize(mesh.positions[a as usize]);
        let pb = quantize(mesh.positions[b as usize]);
        if pa <= pb { (pa, pb) } else { (pb, pa) }
    }

    fn edge_counts(mesh: &RevolvedMesh) -> HashMap<([i64; 3], [i64; 3]), u32> {
        let mut counts = HashMap::new();
        for tri in mesh.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                *counts.entry(edge_key(mesh, a, b)).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn sphere_grid_dimensions_and_pole_fans() {
        let mesh = revolve(curves::half_circle, 16, 16).unwrap();
        assert_valid(&mesh, 16, 16);
        // two triangles per cell, minus one per pole-adjacent cell on each
        // of the two pole rings
        assert_eq!(mesh.triangle_count(), 2 * 16 * 16 - 16 - 16);
    }

    #[test]
    fn torus_is_fully_quadrangulated() {
        let mesh = revolve(curves::circle, 16, 16).unwrap();
        assert_valid(&mesh, 16, 16);
        assert_eq!(mesh.triangle_count(), 2 * 16 * 16);
    }

    #[test]
    fn torus_has_no_open_edges() {
        let mesh = revolve(curves::circle, 16, 16).unwrap();
        for (edge, count) in edge_counts(&mesh) {
            assert_eq!(count, 2, "edge {edge:?} shared by {count} triangles");
        }
    }

    #[test]
    fn sphere_has_no_open_edges() {
        let mesh = revolve(curves::half_circle, 12, 9).unwrap();
        for (edge, count) in edge_counts(&mesh) {
            assert_eq!(count, 2, "edge {edge:?} shared by {count} triangles");
        }
    }

    #[test]
    fn seam_column_reuses_first_column() {
        let mesh = revolve(curves::circle, 16, 16).unwrap();
        let cols = 17;
        for i in 0..17 {
            assert_eq!(mesh.positions[i * cols], mesh.positions[i * cols + 16]);
            assert_eq!(mesh.normals[i * cols], mesh.normals[i * cols + 16]);
        }
    }

    #[test]
    fn closed_profile_reuses_first_row() {
        let mesh = revolve(curves::circle, 16, 16).unwrap();
        let cols = 17;
        for j in 0..cols {
            assert_eq!(mesh.positions[j], mesh.positions[16 * cols + j]);
        }
    }

    #[test]
    fn pole_normals_fall_back_to_radial() {
        let mesh = revolve(curves::half_circle, 16, 16).unwrap();
        let cols = 17;
        for j in 0..cols {
            let bottom = mesh.normals[j];
            assert!(bottom.is_finite());
            assert!((bottom - Vec3::NEG_Y).length() < 1e-3, "bottom pole normal {bottom}");
            let top = mesh.normals[16 * cols + j];
            assert!(top.is_finite());
            assert!((top - Vec3::Y).length() < 1e-3, "top pole normal {top}");
        }
    }

    #[test]
    fn sphere_normals_point_outward() {
        let mesh = revolve(curves::half_circle, 32, 32).unwrap();
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            // on a unit sphere the normal is the position itself
            assert!(p.normalize_or_zero().dot(*n) > 0.95 || p.length() < 1e-6);
        }
    }

    #[test]
    fn output_is_deterministic() {
        let a = revolve(curves::spikes, 100, 100).unwrap();
        let b = revolve(curves::spikes, 100, 100).unwrap();
        assert_eq!(a, b);

        let c = revolve_polar(curves::spikes, 100, 100).unwrap();
        let d = revolve_polar(curves::spikes, 100, 100).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn polar_variant_produces_valid_blob() {
        let mesh = revolve_polar(curves::spikes, 100, 100).unwrap();
        assert_valid(&mesh, 100, 100);
        // both polar caps collapse, like the sphere's
        assert_eq!(mesh.triangle_count(), 2 * 100 * 100 - 100 - 100);
    }

    #[test]
    fn rejects_too_few_rotation_segments() {
        let err = revolve(curves::half_circle, 16, 2).unwrap_err();
        assert_eq!(
            err,
            MeshError::InvalidResolution {
                vertical: 16,
                rotation: 2
            }
        );
    }

    #[test]
    fn rejects_zero_vertical_segments() {
        let err = revolve(curves::circle, 0, 16).unwrap_err();
        assert_eq!(
            err,
            MeshError::InvalidResolution {
                vertical: 0,
                rotation: 16
            }
        );
        assert!(revolve_polar(curves::spikes, 0, 3).is_err());
    }

    #[test]
    fn minimal_resolution_is_accepted() {
        let mesh = revolve(|_| DVec2::new(1.0, 0.0), 1, 3).unwrap();
        assert_valid(&mesh, 1, 3);
    }
}
