//! Structured mesh generators emitting explicit (unstructured) connectivity.
//!
//! Every generator lays points out on a regular lattice over a box and
//! stores cells the way [`CellComplex::unstructured`] expects them, so the
//! output can be located through a celltree. [`GeneratedMesh::jitter`]
//! perturbs interior points with a seeded `SmallRng` to produce irregular
//! but reproducible meshes.
//!
//! [`CellComplex::unstructured`]: crate::topology::CellComplex::unstructured

use crate::geometry::{Aabb, Embedding};
use crate::grid::UnstructuredGrid;
use crate::grid_error::GridError;
use crate::topology::CellType;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Points plus grouped cell connectivity, ready for
/// [`UnstructuredGrid::from_cells`].
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedMesh<const D: usize> {
    pub points: Vec<[f64; D]>,
    pub counts: Vec<(CellType, usize)>,
    pub indices: Vec<usize>,
    /// Lattice shape the points were generated on.
    pub extent: [usize; D],
    pub bounds: Aabb<D>,
}

impl<const D: usize> GeneratedMesh<D> {
    pub fn num_cells(&self) -> usize {
        self.counts.iter().map(|&(_, n)| n).sum()
    }

    /// Lattice spacing along axis `d`.
    pub fn spacing(&self, d: usize) -> f64 {
        self.bounds.extent(d) / (self.extent[d] - 1) as f64
    }

    /// Applies `f` to every point position.
    pub fn map_points(mut self, f: impl Fn([f64; D]) -> [f64; D]) -> Self {
        for p in &mut self.points {
            *p = f(*p);
        }
        self
    }

    /// Moves every interior lattice point by up to `amplitude` times the
    /// local spacing along each axis. Boundary points stay put, so the
    /// domain is unchanged. Amplitudes below 0.25 keep every cell valid.
    pub fn jitter(mut self, amplitude: f64, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let spacing: [f64; D] = std::array::from_fn(|d| self.spacing(d));
        let extent = self.extent;
        for (i, p) in self.points.iter_mut().enumerate() {
            let mut rest = i;
            let mut interior = true;
            for &e in &extent {
                let x = rest % e;
                rest /= e;
                interior &= x > 0 && x < e - 1;
            }
            if !interior {
                continue;
            }
            for d in 0..D {
                p[d] += amplitude * spacing[d] * rng.gen_range(-1.0..=1.0);
            }
        }
        self
    }

    pub fn into_grid(self) -> Result<UnstructuredGrid<D>, GridError>
    where
        [f64; D]: Embedding,
    {
        UnstructuredGrid::from_cells(self.points, self.counts, self.indices)
    }
}

fn lattice<const D: usize>(cells: [usize; D], bounds: &Aabb<D>) -> Result<Vec<[f64; D]>, GridError> {
    for (dimension, &n) in cells.iter().enumerate() {
        if n == 0 {
            return Err(GridError::InvalidExtent {
                dimension,
                extent: n + 1,
            });
        }
    }
    for dimension in 0..D {
        let spacing = bounds.extent(dimension) / cells[dimension] as f64;
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(GridError::InvalidSpacing { dimension, spacing });
        }
    }
    let extent: [usize; D] = std::array::from_fn(|d| cells[d] + 1);
    let total = extent.iter().product();
    let mut points = Vec::with_capacity(total);
    for i in 0..total {
        let mut rest = i;
        points.push(std::array::from_fn(|d| {
            let x = rest % extent[d];
            rest /= extent[d];
            bounds.min[d] + bounds.extent(d) * x as f64 / cells[d] as f64
        }));
    }
    Ok(points)
}

/// Corner point indices of lattice cell `(i, j)`, counterclockwise.
fn quad_corners(nx: usize, i: usize, j: usize) -> [usize; 4] {
    let row = nx + 1;
    let v0 = j * row + i;
    [v0, v0 + 1, v0 + row + 1, v0 + row]
}

/// Corner point indices of lattice cell `(i, j, k)` in catalog order: the
/// bottom face counterclockwise, then the top face with corner `4 + m`
/// above corner `3 - m`.
fn hex_corners(nx: usize, ny: usize, i: usize, j: usize, k: usize) -> [usize; 8] {
    let row = nx + 1;
    let slab = row * (ny + 1);
    let v0 = k * slab + j * row + i;
    let bottom = [v0, v0 + 1, v0 + row + 1, v0 + row];
    [
        bottom[0],
        bottom[1],
        bottom[2],
        bottom[3],
        bottom[3] + slab,
        bottom[2] + slab,
        bottom[1] + slab,
        bottom[0] + slab,
    ]
}

/// `nx`×`ny` quadrilaterals over `bounds`.
pub fn quad_mesh(cells: [usize; 2], bounds: Aabb<2>) -> Result<GeneratedMesh<2>, GridError> {
    let points = lattice(cells, &bounds)?;
    let [nx, ny] = cells;
    let mut indices = Vec::with_capacity(4 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            indices.extend(quad_corners(nx, i, j));
        }
    }
    Ok(GeneratedMesh {
        points,
        counts: vec![(CellType::Quad, nx * ny)],
        indices,
        extent: [nx + 1, ny + 1],
        bounds,
    })
}

/// Each lattice quad split along its `v0`-`v2` diagonal.
pub fn triangle_mesh(cells: [usize; 2], bounds: Aabb<2>) -> Result<GeneratedMesh<2>, GridError> {
    let points = lattice(cells, &bounds)?;
    let [nx, ny] = cells;
    let mut indices = Vec::with_capacity(6 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let [v0, v1, v2, v3] = quad_corners(nx, i, j);
            indices.extend([v0, v1, v2, v0, v2, v3]);
        }
    }
    Ok(GeneratedMesh {
        points,
        counts: vec![(CellType::Triangle, 2 * nx * ny)],
        indices,
        extent: [nx + 1, ny + 1],
        bounds,
    })
}

/// `nx`×`ny`×`nz` hexahedra over `bounds`.
pub fn hex_mesh(cells: [usize; 3], bounds: Aabb<3>) -> Result<GeneratedMesh<3>, GridError> {
    let points = lattice(cells, &bounds)?;
    let [nx, ny, nz] = cells;
    let mut indices = Vec::with_capacity(8 * nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                indices.extend(hex_corners(nx, ny, i, j, k));
            }
        }
    }
    Ok(GeneratedMesh {
        points,
        counts: vec![(CellType::Hexahedron, nx * ny * nz)],
        indices,
        extent: [nx + 1, ny + 1, nz + 1],
        bounds,
    })
}

/// Positions within a hex cell, addressed by `x + 2y + 4z` bits.
const KUHN_CORNER: [usize; 8] = [0, 1, 3, 2, 7, 6, 4, 5];

/// Each lattice hex split into six tetrahedra sharing its main diagonal.
///
/// All cells use the same split, so faces between neighbours match.
pub fn tet_mesh(cells: [usize; 3], bounds: Aabb<3>) -> Result<GeneratedMesh<3>, GridError> {
    let points = lattice(cells, &bounds)?;
    let [nx, ny, nz] = cells;
    // axis orders with their permutation parity
    const ORDERS: [([usize; 3], bool); 6] = [
        ([0, 1, 2], true),
        ([1, 2, 0], true),
        ([2, 0, 1], true),
        ([0, 2, 1], false),
        ([2, 1, 0], false),
        ([1, 0, 2], false),
    ];
    let mut indices = Vec::with_capacity(24 * nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let hex = hex_corners(nx, ny, i, j, k);
                let at = |bits: usize| hex[KUHN_CORNER[bits]];
                for (order, even) in ORDERS {
                    let a = 1 << order[0];
                    let b = a | (1 << order[1]);
                    if even {
                        indices.extend([at(0), at(a), at(b), at(7)]);
                    } else {
                        indices.extend([at(0), at(b), at(a), at(7)]);
                    }
                }
            }
        }
    }
    Ok(GeneratedMesh {
        points,
        counts: vec![(CellType::Tetrahedron, 6 * nx * ny * nz)],
        indices,
        extent: [nx + 1, ny + 1, nz + 1],
        bounds,
    })
}
