//! Small fixed-size vector helpers shared by the shape and containment code.
//!
//! Everything works on `[f64; 3]`; lower-dimensional positions are lifted by
//! padding with zeros.

pub(crate) const EPS: f64 = 1e-12;

#[inline]
pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub(crate) fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Pads a `D`-dimensional position to three components.
#[inline]
pub fn lift<const D: usize>(p: &[f64; D]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (o, v) in out.iter_mut().zip(p.iter()) {
        *o = *v;
    }
    out
}

pub(crate) fn determinant_3x3(m: [[f64; 3]; 3]) -> f64 {
    dot(m[0], cross(m[1], m[2]))
}

/// Solves `sum_j x_j * cols[j] = rhs` in the least-squares sense through the
/// normal equations. Returns `None` when the columns are (nearly) dependent.
///
/// `cols.len()` is the reference dimension (1 to 3).
pub(crate) fn least_squares(cols: &[[f64; 3]], rhs: [f64; 3]) -> Option<[f64; 3]> {
    match cols.len() {
        1 => {
            let denom = dot(cols[0], cols[0]);
            if denom <= f64::MIN_POSITIVE {
                return None;
            }
            Some([dot(cols[0], rhs) / denom, 0.0, 0.0])
        }
        2 => {
            let a = dot(cols[0], cols[0]);
            let b = dot(cols[0], cols[1]);
            let c = dot(cols[1], cols[1]);
            let det = a * c - b * b;
            if det.abs() <= EPS * a * c || a * c == 0.0 {
                return None;
            }
            let r0 = dot(cols[0], rhs);
            let r1 = dot(cols[1], rhs);
            Some([(c * r0 - b * r1) / det, (a * r1 - b * r0) / det, 0.0])
        }
        3 => {
            // Square system: Cramer's rule on the columns directly.
            let det = determinant_3x3([cols[0], cols[1], cols[2]]);
            let scale = norm(cols[0]) * norm(cols[1]) * norm(cols[2]);
            if det.abs() <= EPS * scale.max(EPS) {
                return None;
            }
            Some([
                determinant_3x3([rhs, cols[1], cols[2]]) / det,
                determinant_3x3([cols[0], rhs, cols[2]]) / det,
                determinant_3x3([cols[0], cols[1], rhs]) / det,
            ])
        }
        _ => None,
    }
}
