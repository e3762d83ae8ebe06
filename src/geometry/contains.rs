//! Point-in-cell tests: recover the local coordinates of a position.
//!
//! Which cell shapes can be tested depends on the spatial dimension. The
//! [`Embedding`] trait is implemented for `[f64; 1]`, `[f64; 2]` and
//! `[f64; 3]`; each implementation lists the shapes it supports and every
//! other shape simply fails the test.
//!
//! | space | supported shapes                                               |
//! |-------|----------------------------------------------------------------|
//! | 1D    | line and its quadratic variants                                |
//! | 2D    | triangle, quad and their quadratic variants                    |
//! | 3D    | triangle, quad, tetrahedron, pyramid, prism, hexahedron, and the quadratic tetrahedron and hexahedron variants |
//!
//! Full-dimensional simplices are solved in closed form. Everything else,
//! including surfaces embedded in 3D, runs a Gauss-Newton iteration on the
//! isoparametric map and then checks the residual.

use super::linalg::{least_squares, lift, norm, sub, EPS};
use super::shape::{evaluate, map_to_space};
use crate::topology::cell_type::CellType;

/// Slack allowed outside the reference domain.
pub const LOCAL_TOLERANCE: f64 = 1e-9;

const MAX_NEWTON_ITERATIONS: usize = 20;

/// Spatial dimensions cells can be located in.
pub trait Embedding: Copy + Send + Sync + 'static {
    /// Number of coordinates.
    const DIM: usize;

    /// Whether [`locate_in_cell`](Self::locate_in_cell) can ever succeed for `cell_type`.
    fn supports(cell_type: CellType) -> bool;

    /// Local coordinates of `p` in the cell spanned by `vertices`, or `None`
    /// when `p` lies outside (or the shape is unsupported here).
    ///
    /// `vertices` are the geometric control points of the cell, in catalog
    /// order; `cell_type` may be any catalog type.
    fn locate_in_cell(cell_type: CellType, vertices: &[Self], p: &Self) -> Option<[f64; 3]>;
}

impl Embedding for [f64; 1] {
    const DIM: usize = 1;

    fn supports(cell_type: CellType) -> bool {
        use CellType::*;
        matches!(cell_type, Line | SubparametricQuadraticLine | QuadraticLine)
    }

    fn locate_in_cell(cell_type: CellType, vertices: &[Self], p: &Self) -> Option<[f64; 3]> {
        match cell_type.geometry_type() {
            CellType::Line => line_coords(vertices[0][0], vertices[1][0], p[0]),
            CellType::QuadraticLine => newton(cell_type, &lifted(vertices), lift(p)),
            _ => None,
        }
    }
}

impl Embedding for [f64; 2] {
    const DIM: usize = 2;

    fn supports(cell_type: CellType) -> bool {
        cell_type.dimension() == 2
    }

    fn locate_in_cell(cell_type: CellType, vertices: &[Self], p: &Self) -> Option<[f64; 3]> {
        use CellType::*;
        let v = lifted(vertices);
        match cell_type.geometry_type() {
            Triangle => triangle_coords_2d(&v, lift(p)),
            Quad | QuadraticTriangle | QuadraticQuad => newton(cell_type, &v, lift(p)),
            _ => None,
        }
    }
}

impl Embedding for [f64; 3] {
    const DIM: usize = 3;

    fn supports(cell_type: CellType) -> bool {
        use CellType::*;
        matches!(
            cell_type,
            Triangle
                | Quad
                | SubparametricQuadraticTriangle
                | SubparametricQuadraticQuad
                | Tetrahedron
                | Pyramid
                | Prism
                | Hexahedron
                | SubparametricQuadraticTetrahedron
                | SubparametricQuadraticHexahedron
                | QuadraticTetrahedron
                | QuadraticHexahedron
        )
    }

    fn locate_in_cell(cell_type: CellType, vertices: &[Self], p: &Self) -> Option<[f64; 3]> {
        use CellType::*;
        if !Self::supports(cell_type) {
            return None;
        }
        match cell_type.geometry_type() {
            Tetrahedron => tetrahedron_coords(vertices, *p),
            _ => newton(cell_type, vertices, *p),
        }
    }
}

fn lifted<const D: usize>(vertices: &[[f64; D]]) -> Vec<[f64; 3]> {
    vertices.iter().map(lift).collect()
}

fn inside(cell_type: CellType, local: [f64; 3]) -> Option<[f64; 3]> {
    cell_type
        .reference_domain()
        .contains(&local, LOCAL_TOLERANCE)
        .then_some(local)
}

fn line_coords(a: f64, b: f64, p: f64) -> Option<[f64; 3]> {
    let len = b - a;
    if len == 0.0 || !len.is_finite() {
        return None;
    }
    inside(CellType::Line, [(p - a) / len, 0.0, 0.0])
}

fn triangle_coords_2d(v: &[[f64; 3]], p: [f64; 3]) -> Option<[f64; 3]> {
    let e1 = sub(v[1], v[0]);
    let e2 = sub(v[2], v[0]);
    let d = sub(p, v[0]);
    let det = e1[0] * e2[1] - e1[1] * e2[0];
    if det.abs() <= EPS * norm(e1) * norm(e2) {
        return None;
    }
    let r = (d[0] * e2[1] - d[1] * e2[0]) / det;
    let s = (e1[0] * d[1] - e1[1] * d[0]) / det;
    inside(CellType::Triangle, [r, s, 0.0])
}

fn tetrahedron_coords(v: &[[f64; 3]], p: [f64; 3]) -> Option<[f64; 3]> {
    let cols = [sub(v[1], v[0]), sub(v[2], v[0]), sub(v[3], v[0])];
    let local = least_squares(&cols, sub(p, v[0]))?;
    inside(CellType::Tetrahedron, local)
}

/// Gauss-Newton inversion of the geometric map, started from the center of
/// the reference domain. Accepts the result only when the mapped point is
/// within a relative tolerance of `p`.
fn newton(cell_type: CellType, vertices: &[[f64; 3]], p: [f64; 3]) -> Option<[f64; 3]> {
    let geometry = cell_type.geometry_type();
    let dim = geometry.dimension();
    let scale = diameter(vertices);
    if !(scale > 0.0 && scale.is_finite()) {
        return None;
    }
    let tol = 1e-10 * scale;

    let mut local = geometry.reference_domain().center();
    let mut cols = [[0.0; 3]; 3];
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let residual = sub(map_to_space(geometry, vertices, &local), p);
        let eval = evaluate(geometry, &local);
        for (d, col) in cols.iter_mut().enumerate().take(dim) {
            *col = [0.0; 3];
            for (g, v) in eval.gradients().iter().zip(vertices) {
                for k in 0..3 {
                    col[k] += g[d] * v[k];
                }
            }
        }
        let step = least_squares(&cols[..dim], residual)?;
        for d in 0..dim {
            local[d] -= step[d];
        }
        if !local.iter().all(|x| x.is_finite()) {
            return None;
        }
        if norm(step) <= 1e-13 {
            break;
        }
    }
    if norm(sub(map_to_space(geometry, vertices, &local), p)) > tol {
        return None;
    }
    inside(geometry, local)
}

fn diameter(vertices: &[[f64; 3]]) -> f64 {
    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for v in vertices {
        for d in 0..3 {
            lo[d] = lo[d].min(v[d]);
            hi[d] = hi[d].max(v[d]);
        }
    }
    norm(sub(hi, lo))
}
