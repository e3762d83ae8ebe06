//! Shape functions and their reference-space gradients.
//!
//! One evaluation routine per basis family:
//! - tensor-product linear (quad, hexahedron),
//! - serendipity quadratic (quadratic line, 8-node quad, 20-node hexahedron),
//! - barycentric (linear and quadratic triangle and tetrahedron),
//! - pyramid and prism, which combine the two.
//!
//! Subparametric types evaluate their quadratic value basis; callers that
//! need the geometric map pass [`CellType::geometry_type`] instead.

use crate::topology::cell_type::{CellType, MAX_VALUES_PER_CELL};

/// Shape function values and gradients at one local position.
#[derive(Clone, Debug)]
pub struct ShapeEval {
    len: usize,
    values: [f64; MAX_VALUES_PER_CELL],
    gradients: [[f64; 3]; MAX_VALUES_PER_CELL],
}

impl ShapeEval {
    fn with_len(len: usize) -> Self {
        Self {
            len,
            values: [0.0; MAX_VALUES_PER_CELL],
            gradients: [[0.0; 3]; MAX_VALUES_PER_CELL],
        }
    }

    /// One weight per node of the basis.
    pub fn values(&self) -> &[f64] {
        &self.values[..self.len]
    }

    /// `d N_k / d (r, s, t)` per node; unused reference directions are zero.
    pub fn gradients(&self) -> &[[f64; 3]] {
        &self.gradients[..self.len]
    }
}

/// Evaluates the basis of `cell_type` at `local`.
pub fn evaluate(cell_type: CellType, local: &[f64; 3]) -> ShapeEval {
    use CellType::*;
    let basis = cell_type.value_type();
    let nodes = node_coordinates(basis);
    let mut out = ShapeEval::with_len(nodes.len());
    match basis {
        Point => out.values[0] = 1.0,
        Line => tensor_linear(nodes, local, 1, &mut out),
        Quad => tensor_linear(nodes, local, 2, &mut out),
        Hexahedron => tensor_linear(nodes, local, 3, &mut out),
        QuadraticLine => serendipity(nodes, local, 1, &mut out),
        QuadraticQuad => serendipity(nodes, local, 2, &mut out),
        QuadraticHexahedron => serendipity(nodes, local, 3, &mut out),
        Triangle | Tetrahedron => {
            let (l, dl, n) = barycentric(basis, local);
            for k in 0..n {
                out.values[k] = l[k];
                out.gradients[k] = dl[k];
            }
        }
        QuadraticTriangle => quadratic_simplex(local, Triangle, &TRIANGLE_EDGES, &mut out),
        QuadraticTetrahedron => quadratic_simplex(local, Tetrahedron, &TETRAHEDRON_EDGES, &mut out),
        Pyramid => pyramid(local, &mut out),
        Prism => prism(local, &mut out),
        // value_type() never yields a subparametric type
        SubparametricQuadraticLine
        | SubparametricQuadraticTriangle
        | SubparametricQuadraticQuad
        | SubparametricQuadraticTetrahedron
        | SubparametricQuadraticHexahedron => unreachable!("subparametric basis"),
    }
    out
}

/// Maps `local` through the geometric shape of `cell_type`.
///
/// `vertices` holds the geometric control points (lifted to 3D).
pub fn map_to_space(cell_type: CellType, vertices: &[[f64; 3]], local: &[f64; 3]) -> [f64; 3] {
    let eval = evaluate(cell_type.geometry_type(), local);
    let mut x = [0.0; 3];
    for (w, v) in eval.values().iter().zip(vertices) {
        for d in 0..3 {
            x[d] += w * v[d];
        }
    }
    x
}

/// Reference coordinates of every node of a basis.
pub fn node_coordinates(cell_type: CellType) -> &'static [[f64; 3]] {
    use CellType::*;
    match cell_type.value_type() {
        Point => &[[0.0; 3]],
        Line => &QUADRATIC_LINE_NODES[..2],
        QuadraticLine => &QUADRATIC_LINE_NODES,
        Triangle => &QUADRATIC_TRIANGLE_NODES[..3],
        QuadraticTriangle => &QUADRATIC_TRIANGLE_NODES,
        Quad => &QUADRATIC_QUAD_NODES[..4],
        QuadraticQuad => &QUADRATIC_QUAD_NODES,
        Tetrahedron => &QUADRATIC_TETRAHEDRON_NODES[..4],
        QuadraticTetrahedron => &QUADRATIC_TETRAHEDRON_NODES,
        Hexahedron => &QUADRATIC_HEXAHEDRON_NODES[..8],
        QuadraticHexahedron => &QUADRATIC_HEXAHEDRON_NODES,
        Pyramid => &PYRAMID_NODES,
        Prism => &PRISM_NODES,
        _ => &[],
    }
}

const QUADRATIC_LINE_NODES: [[f64; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.0, 0.0]];

const QUADRATIC_TRIANGLE_NODES: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.5, 0.0, 0.0],
    [0.5, 0.5, 0.0],
    [0.0, 0.5, 0.0],
];

const QUADRATIC_QUAD_NODES: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.5, 0.0, 0.0],
    [1.0, 0.5, 0.0],
    [0.5, 1.0, 0.0],
    [0.0, 0.5, 0.0],
];

const QUADRATIC_TETRAHEDRON_NODES: [[f64; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.5, 0.0, 0.0],
    [0.5, 0.5, 0.0],
    [0.0, 0.5, 0.0],
    [0.0, 0.0, 0.5],
    [0.5, 0.0, 0.5],
    [0.0, 0.5, 0.5],
];

const QUADRATIC_HEXAHEDRON_NODES: [[f64; 3]; 20] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0],
    [0.5, 0.0, 0.0],
    [1.0, 0.5, 0.0],
    [0.5, 1.0, 0.0],
    [0.0, 0.5, 0.0],
    [0.5, 1.0, 1.0],
    [1.0, 0.5, 1.0],
    [0.5, 0.0, 1.0],
    [0.0, 0.5, 1.0],
    [0.0, 0.0, 0.5],
    [1.0, 0.0, 0.5],
    [1.0, 1.0, 0.5],
    [0.0, 1.0, 0.5],
];

const PYRAMID_NODES: [[f64; 3]; 5] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.5, 0.5, 1.0],
];

const PRISM_NODES: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0],
];

const TRIANGLE_EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];
const TETRAHEDRON_EDGES: [(usize, usize); 6] = [(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)];

fn tensor_linear(nodes: &[[f64; 3]], local: &[f64; 3], dim: usize, out: &mut ShapeEval) {
    for (k, node) in nodes.iter().enumerate() {
        let mut f = [1.0; 3];
        let mut df = [0.0; 3];
        for d in 0..dim {
            if node[d] > 0.5 {
                f[d] = local[d];
                df[d] = 1.0;
            } else {
                f[d] = 1.0 - local[d];
                df[d] = -1.0;
            }
        }
        out.values[k] = f[0] * f[1] * f[2];
        out.gradients[k] = [df[0] * f[1] * f[2], f[0] * df[1] * f[2], f[0] * f[1] * df[2]];
    }
}

/// Serendipity family on `[0, 1]^dim`, written in `xi = 2r - 1` coordinates.
fn serendipity(nodes: &[[f64; 3]], local: &[f64; 3], dim: usize, out: &mut ShapeEval) {
    let mut xi = [0.0; 3];
    for d in 0..dim {
        xi[d] = 2.0 * local[d] - 1.0;
    }
    for (k, node) in nodes.iter().enumerate() {
        let mut ni = [0.0; 3];
        let mut a = [1.0; 3];
        let mut mid = None;
        for d in 0..dim {
            ni[d] = 2.0 * node[d] - 1.0;
            if ni[d] == 0.0 {
                mid = Some(d);
            } else {
                a[d] = 1.0 + xi[d] * ni[d];
            }
        }
        let mut grad_xi = [0.0; 3];
        match mid {
            None => {
                let c = 1.0 / f64::from(1u32 << dim);
                let s = (0..dim).map(|d| xi[d] * ni[d]).sum::<f64>() - (dim as f64 - 1.0);
                out.values[k] = c * a[0] * a[1] * a[2] * s;
                for d in 0..dim {
                    let others: f64 = (0..3).filter(|&e| e != d).map(|e| a[e]).product();
                    grad_xi[d] = c * ni[d] * others * (s + a[d]);
                }
            }
            Some(m) => {
                let c = 1.0 / f64::from(1u32 << (dim - 1));
                let bubble = 1.0 - xi[m] * xi[m];
                let rest: f64 = (0..3).filter(|&e| e != m).map(|e| a[e]).product();
                out.values[k] = c * bubble * rest;
                for d in 0..dim {
                    grad_xi[d] = if d == m {
                        c * -2.0 * xi[m] * rest
                    } else {
                        let others: f64 = (0..3).filter(|&e| e != m && e != d).map(|e| a[e]).product();
                        c * bubble * ni[d] * others
                    };
                }
            }
        }
        out.gradients[k] = [2.0 * grad_xi[0], 2.0 * grad_xi[1], 2.0 * grad_xi[2]];
    }
}

fn barycentric(simplex: CellType, local: &[f64; 3]) -> ([f64; 4], [[f64; 3]; 4], usize) {
    let [r, s, t] = *local;
    if simplex == CellType::Triangle {
        (
            [1.0 - r - s, r, s, 0.0],
            [[-1.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0; 3]],
            3,
        )
    } else {
        (
            [1.0 - r - s - t, r, s, t],
            [
                [-1.0, -1.0, -1.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            4,
        )
    }
}

fn quadratic_simplex(
    local: &[f64; 3],
    simplex: CellType,
    edges: &[(usize, usize)],
    out: &mut ShapeEval,
) {
    let (l, dl, n) = barycentric(simplex, local);
    for k in 0..n {
        out.values[k] = l[k] * (2.0 * l[k] - 1.0);
        let f = 4.0 * l[k] - 1.0;
        out.gradients[k] = [f * dl[k][0], f * dl[k][1], f * dl[k][2]];
    }
    for (e, &(i, j)) in edges.iter().enumerate() {
        out.values[n + e] = 4.0 * l[i] * l[j];
        out.gradients[n + e] = [
            4.0 * (l[j] * dl[i][0] + l[i] * dl[j][0]),
            4.0 * (l[j] * dl[i][1] + l[i] * dl[j][1]),
            4.0 * (l[j] * dl[i][2] + l[i] * dl[j][2]),
        ];
    }
}

fn pyramid(local: &[f64; 3], out: &mut ShapeEval) {
    let t = local[2];
    let mut base = ShapeEval::with_len(4);
    tensor_linear(&QUADRATIC_QUAD_NODES[..4], local, 2, &mut base);
    for k in 0..4 {
        let q = base.values[k];
        let dq = base.gradients[k];
        out.values[k] = q * (1.0 - t);
        out.gradients[k] = [dq[0] * (1.0 - t), dq[1] * (1.0 - t), -q];
    }
    out.values[4] = t;
    out.gradients[4] = [0.0, 0.0, 1.0];
}

fn prism(local: &[f64; 3], out: &mut ShapeEval) {
    let t = local[2];
    let (l, dl, _) = barycentric(CellType::Triangle, local);
    for k in 0..3 {
        out.values[k] = l[k] * (1.0 - t);
        out.gradients[k] = [dl[k][0] * (1.0 - t), dl[k][1] * (1.0 - t), -l[k]];
        // top vertices run in reverse: 3 above 2, 4 above 1, 5 above 0
        let m = 2 - k;
        out.values[3 + k] = l[m] * t;
        out.gradients[3 + k] = [dl[m][0] * t, dl[m][1] * t, l[m]];
    }
}
