//! Band-energy surfaces by triangulated linear interpolation.
//!
//! The cross-section's (x, y) scatter is Delaunay-triangulated once; each
//! requested band is then resampled onto a regular R×R mesh by barycentric
//! interpolation inside the containing triangle. Sample points outside the
//! convex hull stay `NaN` (holes).

use delaunator::{triangulate, Point};

use crate::error::{BandError, Result};
use crate::grid::CrossSection;

/// Barycentric weights down to this slightly negative value still count as
/// inside, so hull edges and vertices are not lost to rounding.
const EDGE_TOLERANCE: f64 = 1.0e-9;

// ---------------------------------------------------------------------------
// InterpolatedSurface – one band on a regular mesh
// ---------------------------------------------------------------------------

/// One band's energies interpolated onto a regular mesh spanning the
/// bounding box of the cross-section. `values` is row-major with y as the
/// row axis; holes are `NaN`.
#[derive(Debug, Clone)]
pub struct InterpolatedSurface {
    pub band: usize,
    x_axis: Vec<f64>,
    y_axis: Vec<f64>,
    values: Vec<f64>,
}

impl InterpolatedSurface {
    pub fn resolution(&self) -> usize {
        self.x_axis.len()
    }

    pub fn x_axis(&self) -> &[f64] {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &[f64] {
        &self.y_axis
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at mesh position (row = y index, col = x index).
    pub fn value_at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.x_axis.len() + col]
    }

    /// Min/max over the finite mesh values; `None` when every sample is a
    /// hole.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for &v in &self.values {
            if v.is_nan() {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        range
    }
}

// ---------------------------------------------------------------------------
// SurfaceBuilder – triangulate once, interpolate per band
// ---------------------------------------------------------------------------

/// Holds the triangulation of one cross-section. Building it on an empty
/// selection is rejected up front; interpolation is then repeated per band
/// against the same triangles.
pub struct SurfaceBuilder<'a> {
    section: &'a CrossSection,
    triangles: Vec<[usize; 3]>,
}

impl<'a> SurfaceBuilder<'a> {
    pub fn new(section: &'a CrossSection) -> Result<Self> {
        if section.is_empty() {
            return Err(BandError::EmptyCrossSection);
        }
        let sites: Vec<Point> = section
            .x()
            .iter()
            .zip(section.y())
            .map(|(&x, &y)| Point { x, y })
            .collect();
        let triangulation = triangulate(&sites);
        let triangles = triangulation
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        Ok(SurfaceBuilder { section, triangles })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Resample `band` onto a `resolution × resolution` mesh spanning the
    /// bounding box of the scatter.
    ///
    /// Panics if `band` is not a valid band index of the cross-section.
    pub fn interpolate(&self, band: usize, resolution: usize) -> InterpolatedSurface {
        let energies = self.section.band_energies(band);
        let x_axis = linspace(min_of(self.section.x()), max_of(self.section.x()), resolution);
        let y_axis = linspace(min_of(self.section.y()), max_of(self.section.y()), resolution);

        let mut values = Vec::with_capacity(resolution * resolution);
        for &y in &y_axis {
            for &x in &x_axis {
                values.push(self.sample(x, y, &energies));
            }
        }
        InterpolatedSurface {
            band,
            x_axis,
            y_axis,
            values,
        }
    }

    /// Linear interpolation at one query point; `NaN` outside the hull.
    fn sample(&self, x: f64, y: f64, energies: &[f64]) -> f64 {
        let xs = self.section.x();
        let ys = self.section.y();
        for &[a, b, c] in &self.triangles {
            let denom = (ys[b] - ys[c]) * (xs[a] - xs[c]) + (xs[c] - xs[b]) * (ys[a] - ys[c]);
            if denom == 0.0 {
                continue;
            }
            let wa = ((ys[b] - ys[c]) * (x - xs[c]) + (xs[c] - xs[b]) * (y - ys[c])) / denom;
            let wb = ((ys[c] - ys[a]) * (x - xs[c]) + (xs[a] - xs[c]) * (y - ys[c])) / denom;
            let wc = 1.0 - wa - wb;
            if wa >= -EDGE_TOLERANCE && wb >= -EDGE_TOLERANCE && wc >= -EDGE_TOLERANCE {
                return wa * energies[a] + wb * energies[b] + wc * energies[c];
            }
        }
        f64::NAN
    }
}

fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{EigenvalueTable, KPointSet};
    use crate::grid::slice;

    /// Cross-section of the 4 corners of the unit square with band energies
    /// 0, 1, 1, 2 at (0,0), (1,0), (0,1), (1,1).
    fn unit_square_section() -> CrossSection {
        // A 2×2×2 grid sliced at axis 2, layer 0 leaves exactly the four
        // corner points in (x, y) = (col0, col1).
        let mut rows = Vec::new();
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    rows.push(vec![i as f64, j as f64, k as f64]);
                }
            }
        }
        let kpoints = KPointSet::try_from_rows(rows).unwrap();
        let energies: Vec<Vec<f64>> = (0..8)
            .map(|idx| {
                let (i, j) = (idx / 4, (idx / 2) % 2);
                vec![(i + j) as f64]
            })
            .collect();
        let eigen = EigenvalueTable::try_from_rows(energies).unwrap();
        slice(&kpoints, &eigen, 2, 0, None).unwrap()
    }

    #[test]
    fn empty_section_is_rejected_before_triangulation() {
        let section = CrossSection::from_parts(Vec::new(), Vec::new(), Vec::new(), 1).unwrap();
        assert!(matches!(
            SurfaceBuilder::new(&section),
            Err(BandError::EmptyCrossSection)
        ));
    }

    #[test]
    fn corner_values_are_reproduced_exactly() {
        let section = unit_square_section();
        let builder = SurfaceBuilder::new(&section).unwrap();
        let surface = builder.interpolate(0, 2);

        assert_eq!(surface.resolution(), 2);
        assert_eq!(surface.x_axis(), &[0.0, 1.0]);
        assert_eq!(surface.y_axis(), &[0.0, 1.0]);
        // Mesh rows follow y: (0,0)=0, (1,0)=1, (0,1)=1, (1,1)=2.
        assert!((surface.value_at(0, 0) - 0.0).abs() < 1e-12);
        assert!((surface.value_at(0, 1) - 1.0).abs() < 1e-12);
        assert!((surface.value_at(1, 0) - 1.0).abs() < 1e-12);
        assert!((surface.value_at(1, 1) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn interior_samples_interpolate_linearly() {
        let section = unit_square_section();
        let builder = SurfaceBuilder::new(&section).unwrap();
        let surface = builder.interpolate(0, 3);
        // The plane z = x + y passes through all four corners, so every
        // interior sample must sit on it too.
        let x_axis = surface.x_axis().to_vec();
        let y_axis = surface.y_axis().to_vec();
        for (row, &y) in y_axis.iter().enumerate() {
            for (col, &x) in x_axis.iter().enumerate() {
                let v = surface.value_at(row, col);
                assert!((v - (x + y)).abs() < 1e-9, "({x},{y}) -> {v}");
            }
        }
    }

    #[test]
    fn finite_range_spans_the_mesh() {
        let section = unit_square_section();
        let builder = SurfaceBuilder::new(&section).unwrap();
        let surface = builder.interpolate(0, 5);
        let (lo, hi) = surface.finite_range().unwrap();
        assert!((lo - 0.0).abs() < 1e-12);
        assert!((hi - 2.0).abs() < 1e-12);
    }

    #[test]
    fn triangulation_is_reused_across_bands() {
        let section = unit_square_section();
        let builder = SurfaceBuilder::new(&section).unwrap();
        assert!(builder.triangle_count() >= 2);
        let first = builder.interpolate(0, 4);
        let second = builder.interpolate(0, 4);
        assert_eq!(first.values(), second.values());
    }
}
