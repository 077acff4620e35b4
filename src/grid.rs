//! Regular-grid reconstruction and layer slicing.
//!
//! The k-point list is flat but was produced by a cubic S×S×S traversal with
//! axis 0 slowest-varying and axis 2 fastest-varying. Everything in this
//! module leans on that ordering: flat index `idx` maps to grid coordinates
//! `(idx/S/S mod S, idx/S mod S, idx mod S)`.

use crate::data::model::{EigenvalueTable, KPointSet};
use crate::error::{BandError, Result};

/// Grid side length implied by a flat point count, by cube-root rounding.
///
/// Never fails on its own; whether the rounding is honest is checked by
/// [`GridShape::from_point_count`] before any index is reconstructed.
pub fn side_length(point_count: usize) -> usize {
    (point_count as f64).cbrt().round() as usize
}

// ---------------------------------------------------------------------------
// GridShape – validated side-length descriptor
// ---------------------------------------------------------------------------

/// Descriptor of the reconstructed cubic grid, attached to a k-point set at
/// load time so slicing never re-derives the side length ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    side: usize,
}

impl GridShape {
    /// Reconstruct the grid from a flat point count. Fails with
    /// `MalformedGrid` when the count is not a perfect cube — a wrong side
    /// length would silently alias unrelated points into a layer.
    pub fn from_point_count(point_count: usize) -> Result<Self> {
        let side = side_length(point_count);
        if side == 0 || side * side * side != point_count {
            return Err(BandError::MalformedGrid {
                count: point_count,
                side,
            });
        }
        Ok(GridShape { side })
    }

    pub fn side(self) -> usize {
        self.side
    }

    pub fn point_count(self) -> usize {
        self.side * self.side * self.side
    }

    /// Grid coordinates of a flat index, axes (0, 1, 2) with 2 fastest.
    pub fn coords(self, idx: usize) -> [usize; 3] {
        let s = self.side;
        [(idx / s / s) % s, (idx / s) % s, idx % s]
    }

    /// Flat index of grid coordinates; inverse of [`GridShape::coords`].
    pub fn flat_index(self, coords: [usize; 3]) -> usize {
        let s = self.side;
        coords[0] * s * s + coords[1] * s + coords[2]
    }

    /// Boolean mask selecting the points whose grid coordinate along `axis`
    /// equals `layer`.
    pub fn layer_mask(self, axis: usize, layer: usize) -> Result<Vec<bool>> {
        if axis > 2 {
            return Err(BandError::AxisOutOfRange { axis });
        }
        if layer >= self.side {
            return Err(BandError::LayerOutOfRange {
                layer,
                max: self.side - 1,
            });
        }
        Ok((0..self.point_count())
            .map(|idx| self.coords(idx)[axis] == layer)
            .collect())
    }
}

/// Convenience form of [`GridShape::layer_mask`] starting from a raw point
/// count.
pub fn layer_mask(point_count: usize, axis: usize, layer: usize) -> Result<Vec<bool>> {
    GridShape::from_point_count(point_count)?.layer_mask(axis, layer)
}

// ---------------------------------------------------------------------------
// CrossSection – one 2D layer of points plus its energy slice
// ---------------------------------------------------------------------------

/// A 2D layer cut out of the sampling grid: the two free coordinates of the
/// selected points and their full per-band energy rows.
#[derive(Debug, Clone)]
pub struct CrossSection {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Row-major `len × nbands` energy slice; row i belongs to point i.
    energies: Vec<f64>,
    nbands: usize,
}

impl CrossSection {
    /// Assemble a cross-section from raw columns. `energies` is row-major
    /// `x.len() × nbands`.
    pub fn from_parts(
        x: Vec<f64>,
        y: Vec<f64>,
        energies: Vec<f64>,
        nbands: usize,
    ) -> Result<Self> {
        if y.len() != x.len() || energies.len() != x.len() * nbands {
            return Err(BandError::DimensionMismatch {
                expected: format!("{0} y values and {0}x{nbands} energies", x.len()),
                got: format!("{} y values, {} energies", y.len(), energies.len()),
            });
        }
        Ok(CrossSection {
            x,
            y,
            energies,
            nbands,
        })
    }

    /// Number of selected points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn nbands(&self) -> usize {
        self.nbands
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Energy of `band` at point `point`.
    pub fn energy(&self, point: usize, band: usize) -> f64 {
        self.energies[point * self.nbands + band]
    }

    /// One band's energies across all selected points.
    pub fn band_energies(&self, band: usize) -> Vec<f64> {
        (0..self.len()).map(|p| self.energy(p, band)).collect()
    }

    /// Shift the exported coordinates and every energy by a uniform offset,
    /// so several datasets can share one plotting coordinate space.
    pub fn apply_offset(&mut self, offset: [f64; 3]) {
        for v in &mut self.x {
            *v += offset[0];
        }
        for v in &mut self.y {
            *v += offset[1];
        }
        for v in &mut self.energies {
            *v += offset[2];
        }
    }
}

/// Cut the layer `(axis, layer)` out of the grid and export the two free
/// coordinate columns in cyclic order: axis 0 held ⇒ (1, 2), axis 1 held ⇒
/// (2, 0), axis 2 held ⇒ (0, 1). Eigenvalue rows are carried over unchanged.
pub fn slice(
    kpoints: &KPointSet,
    eigenvalues: &EigenvalueTable,
    axis: usize,
    layer: usize,
    offset: Option<[f64; 3]>,
) -> Result<CrossSection> {
    if eigenvalues.nkpoints() != kpoints.len() {
        return Err(BandError::DimensionMismatch {
            expected: format!("{} eigenvalue rows", kpoints.len()),
            got: format!("{}", eigenvalues.nkpoints()),
        });
    }
    let shape = kpoints.grid_shape()?;
    let mask = shape.layer_mask(axis, layer)?;
    let (col_x, col_y) = free_columns(axis);

    let nbands = eigenvalues.nbands();
    let mut section = CrossSection {
        x: Vec::new(),
        y: Vec::new(),
        energies: Vec::new(),
        nbands,
    };
    for (idx, point) in kpoints.points().iter().enumerate() {
        if !mask[idx] {
            continue;
        }
        section.x.push(point[col_x]);
        section.y.push(point[col_y]);
        section.energies.extend_from_slice(eigenvalues.row(idx));
    }
    if let Some(offset) = offset {
        section.apply_offset(offset);
    }
    Ok(section)
}

/// The two coordinate columns left free when `axis` is held constant.
fn free_columns(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    }
}
