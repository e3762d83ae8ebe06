//! Point geometry: the positions cells refer to by index.
//!
//! Structured point sets (uniform, rectilinear, curvilinear) number their
//! points with the first axis running fastest:
//! `i = x0 + e0 * (x1 + e1 * x2)`.

use crate::debug_invariants::checks_enabled;
use crate::grid_error::GridError;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb<const D: usize> {
    #[serde(with = "serde_array")]
    pub min: [f64; D],
    #[serde(with = "serde_array")]
    pub max: [f64; D],
}

impl<const D: usize> Aabb<D> {
    /// A box containing nothing; extending it with a point yields that point.
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; D],
            max: [f64::NEG_INFINITY; D],
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f64; D]>) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.extend(p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        (0..D).any(|d| self.min[d] > self.max[d])
    }

    pub fn extend(&mut self, p: &[f64; D]) {
        for d in 0..D {
            self.min[d] = self.min[d].min(p[d]);
            self.max[d] = self.max[d].max(p[d]);
        }
    }

    pub fn contains(&self, p: &[f64; D]) -> bool {
        (0..D).all(|d| p[d] >= self.min[d] && p[d] <= self.max[d])
    }

    pub fn center(&self) -> [f64; D] {
        std::array::from_fn(|d| 0.5 * (self.min[d] + self.max[d]))
    }

    pub fn extent(&self, d: usize) -> f64 {
        self.max[d] - self.min[d]
    }
}

/// Indexed access to point positions.
pub trait PointSet<const D: usize>: Send + Sync {
    /// Number of points.
    fn len(&self) -> usize;

    /// Position of point `i`. Panics if `i >= len()`.
    fn point(&self, i: usize) -> [f64; D];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bounding_box(&self) -> Aabb<D> {
        let mut b = Aabb::empty();
        for i in 0..self.len() {
            b.extend(&self.point(i));
        }
        b
    }

    /// The structured extent (points per axis), if the set is structured.
    fn extent(&self) -> Option<&[usize]> {
        None
    }
}

fn check_extent(extent: &[usize]) -> Result<usize, GridError> {
    if extent.is_empty() || extent.len() > 3 {
        return Err(GridError::UnsupportedStructuredDimension(extent.len()));
    }
    for (dimension, &e) in extent.iter().enumerate() {
        if e < 2 {
            return Err(GridError::InvalidExtent { dimension, extent: e });
        }
    }
    Ok(extent.iter().product())
}

fn check_finite<const D: usize>(points: &[[f64; D]]) -> Result<(), GridError> {
    for (point, p) in points.iter().enumerate() {
        if let Some(dimension) = p.iter().position(|x| !x.is_finite()) {
            return Err(GridError::NonFiniteCoordinate {
                point,
                dimension,
                value: p[dimension],
            });
        }
    }
    Ok(())
}

/// Decomposes a structured index into per-axis positions.
pub(crate) fn unravel<const D: usize>(mut i: usize, extent: &[usize; D]) -> [usize; D] {
    let mut out = [0; D];
    for d in 0..D {
        out[d] = i % extent[d];
        i /= extent[d];
    }
    out
}

/// Regular lattice: `origin + x * spacing` per axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniformPoints<const D: usize> {
    #[serde(with = "serde_array")]
    extent: [usize; D],
    #[serde(with = "serde_array")]
    origin: [f64; D],
    #[serde(with = "serde_array")]
    spacing: [f64; D],
}

impl<const D: usize> UniformPoints<D> {
    pub fn new(extent: [usize; D], origin: [f64; D], spacing: [f64; D]) -> Result<Self, GridError> {
        check_extent(&extent)?;
        for dimension in 0..D {
            let h = spacing[dimension];
            if !(h.is_finite() && h > 0.0) {
                return Err(GridError::InvalidSpacing { dimension, spacing: h });
            }
        }
        check_finite(&[origin])?;
        Ok(Self { extent, origin, spacing })
    }

    /// Lattice with `extent` points spanning `[min, max]` along each axis.
    pub fn spanning(extent: [usize; D], min: [f64; D], max: [f64; D]) -> Result<Self, GridError> {
        check_extent(&extent)?;
        let spacing = std::array::from_fn(|d| (max[d] - min[d]) / (extent[d] - 1) as f64);
        Self::new(extent, min, spacing)
    }

    pub fn origin(&self) -> &[f64; D] {
        &self.origin
    }

    pub fn spacing(&self) -> &[f64; D] {
        &self.spacing
    }

    pub fn dims(&self) -> &[usize; D] {
        &self.extent
    }
}

impl<const D: usize> PointSet<D> for UniformPoints<D> {
    fn len(&self) -> usize {
        self.extent.iter().product()
    }

    fn point(&self, i: usize) -> [f64; D] {
        assert!(i < self.len(), "point index {i} out of range");
        let x = unravel(i, &self.extent);
        std::array::from_fn(|d| self.origin[d] + x[d] as f64 * self.spacing[d])
    }

    fn bounding_box(&self) -> Aabb<D> {
        Aabb {
            min: self.origin,
            max: std::array::from_fn(|d| {
                self.origin[d] + (self.extent[d] - 1) as f64 * self.spacing[d]
            }),
        }
    }

    fn extent(&self) -> Option<&[usize]> {
        Some(&self.extent)
    }
}

/// Tensor product of strictly increasing per-axis coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectilinearPoints<const D: usize> {
    axes: Vec<Vec<f64>>,
    #[serde(with = "serde_array")]
    extent: [usize; D],
}

impl<const D: usize> RectilinearPoints<D> {
    pub fn new(axes: [Vec<f64>; D]) -> Result<Self, GridError> {
        let extent = std::array::from_fn(|d| axes[d].len());
        check_extent(&extent)?;
        for (dimension, axis) in axes.iter().enumerate() {
            if !axis[0].is_finite() {
                return Err(GridError::NonFiniteCoordinate {
                    point: 0,
                    dimension,
                    value: axis[0],
                });
            }
            for (position, w) in axis.windows(2).enumerate() {
                if !(w[1] > w[0]) || !w[1].is_finite() {
                    return Err(GridError::NonMonotonicAxis {
                        dimension,
                        position: position + 1,
                    });
                }
            }
        }
        Ok(Self {
            axes: axes.into_iter().collect(),
            extent,
        })
    }

    pub fn axis(&self, d: usize) -> &[f64] {
        &self.axes[d]
    }

    pub fn dims(&self) -> &[usize; D] {
        &self.extent
    }
}

impl<const D: usize> PointSet<D> for RectilinearPoints<D> {
    fn len(&self) -> usize {
        self.extent.iter().product()
    }

    fn point(&self, i: usize) -> [f64; D] {
        assert!(i < self.len(), "point index {i} out of range");
        let x = unravel(i, &self.extent);
        std::array::from_fn(|d| self.axes[d][x[d]])
    }

    fn bounding_box(&self) -> Aabb<D> {
        Aabb {
            min: std::array::from_fn(|d| self.axes[d][0]),
            max: std::array::from_fn(|d| self.axes[d][self.extent[d] - 1]),
        }
    }

    fn extent(&self) -> Option<&[usize]> {
        Some(&self.extent)
    }
}

/// Explicit positions arranged on a structured lattice of topological
/// dimension at most `D`.
#[derive(Clone, Debug, PartialEq)]
pub struct CurvilinearPoints<const D: usize> {
    extent: Vec<usize>,
    points: Vec<[f64; D]>,
}

impl<const D: usize> CurvilinearPoints<D> {
    pub fn new(extent: Vec<usize>, points: Vec<[f64; D]>) -> Result<Self, GridError> {
        if extent.len() > D {
            return Err(GridError::TopologyExceedsEmbedding {
                topological: extent.len(),
                spatial: D,
            });
        }
        let expected = check_extent(&extent)?;
        if expected != points.len() {
            return Err(GridError::PointCountMismatch {
                expected,
                found: points.len(),
            });
        }
        if checks_enabled() {
            check_finite(&points)?;
        }
        Ok(Self { extent, points })
    }

    pub fn as_slice(&self) -> &[[f64; D]] {
        &self.points
    }
}

impl<const D: usize> PointSet<D> for CurvilinearPoints<D> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, i: usize) -> [f64; D] {
        self.points[i]
    }

    fn extent(&self) -> Option<&[usize]> {
        Some(&self.extent)
    }
}

/// Arbitrary positions, typically the vertices of an unstructured mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExplicitPoints<const D: usize> {
    points: Vec<[f64; D]>,
}

impl<const D: usize> ExplicitPoints<D> {
    pub fn new(points: Vec<[f64; D]>) -> Result<Self, GridError> {
        if checks_enabled() {
            check_finite(&points)?;
        }
        Ok(Self { points })
    }

    pub fn as_slice(&self) -> &[[f64; D]] {
        &self.points
    }
}

impl<const D: usize> PointSet<D> for ExplicitPoints<D> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, i: usize) -> [f64; D] {
        self.points[i]
    }
}

/// serde only derives arrays up to a fixed length and not for const-generic
/// ones; go through a sequence.
pub(crate) mod serde_array {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T, const N: usize>(v: &[T; N], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        v.as_slice().serialize(s)
    }

    pub fn deserialize<'de, D, T, const N: usize>(d: D) -> Result<[T; N], D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let v = Vec::<T>::deserialize(d)?;
        let len = v.len();
        v.try_into()
            .map_err(|_| D::Error::invalid_length(len, &"an array of the grid dimension"))
    }
}
