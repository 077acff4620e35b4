//! Fractional → cartesian/reciprocal coordinate transform.

use crate::data::model::{BasisMatrix, KPointSet, TransformedKPoints};

/// Map every fractional point through the basis:
/// `p0·basis[0] + p1·basis[1] + p2·basis[2]` (row vector times basis rows).
///
/// Pure and linear; point order and count are preserved, so the grid
/// traversal invariant of the input carries over to the result.
pub fn transform(kpoints: &KPointSet, basis: &BasisMatrix) -> TransformedKPoints {
    // Row-vector convention: p' = pᵀ·M, i.e. Mᵀ·p for column vectors.
    let m_t = basis.matrix().transpose();
    TransformedKPoints::new(kpoints.points().iter().map(|p| m_t * p).collect())
}
