//! Plot orchestration: slices the dataset, interpolates, and feeds payloads
//! to a render sink.
//!
//! Every call receives its full configuration as an explicit request value;
//! there are no stored per-plotter defaults to fall back on, so two calls
//! can never interact through hidden state.

use crate::color::wireframe_grey;
use crate::data::model::{EigenvalueTable, KPointSet, TransformedKPoints};
use crate::error::{BandError, Result};
use crate::grid::slice;
use crate::render::RenderSink;
use crate::surface::SurfaceBuilder;

// ---------------------------------------------------------------------------
// Request configuration
// ---------------------------------------------------------------------------

/// Which grid layer to restrict a k-point scatter to.
#[derive(Debug, Clone, Copy)]
pub struct LayerSelect {
    pub axis: usize,
    pub layer: usize,
}

/// Full configuration of one band-surface (or wireframe) pass.
#[derive(Debug, Clone)]
pub struct SurfaceRequest {
    pub axis: usize,
    pub layer: usize,
    pub resolution: usize,
    pub band_indices: Vec<usize>,
    /// Uniform shift applied to (x, y, energy) after slicing, for composing
    /// several datasets in one coordinate space.
    pub offset: Option<[f64; 3]>,
}

/// Configuration of one raw band-scatter pass (no interpolation).
#[derive(Debug, Clone)]
pub struct BandScatterRequest {
    pub axis: usize,
    pub layer: usize,
    pub band_indices: Vec<usize>,
    pub offset: Option<[f64; 3]>,
}

// ---------------------------------------------------------------------------
// Plotter
// ---------------------------------------------------------------------------

/// Drives a render sink from dataset arrays. Holds nothing but the sink.
pub struct Plotter<S: RenderSink> {
    sink: S,
}

impl<S: RenderSink> Plotter<S> {
    pub fn new(sink: S) -> Self {
        Plotter { sink }
    }

    /// Scatter the k-point cloud, optionally restricted to one grid layer.
    /// A layer selection permutes the coordinates cyclically so the held
    /// axis always points out of the screen.
    pub fn add_kpoints_scatter(
        &mut self,
        kpoints: &KPointSet,
        select: Option<LayerSelect>,
        offset: Option<[f64; 3]>,
    ) -> Result<()> {
        let order = match select {
            Some(LayerSelect { axis, .. }) => cyclic_order(axis)?,
            None => [0, 1, 2],
        };
        let mask = match select {
            Some(LayerSelect { axis, layer }) => {
                Some(kpoints.grid_shape()?.layer_mask(axis, layer)?)
            }
            None => None,
        };

        let mut columns = [Vec::new(), Vec::new(), Vec::new()];
        for (idx, point) in kpoints.points().iter().enumerate() {
            if let Some(mask) = &mask {
                if !mask[idx] {
                    continue;
                }
            }
            for (slot, &coord) in columns.iter_mut().zip(order.iter()) {
                slot.push(point[coord]);
            }
        }
        if let Some(offset) = offset {
            for (slot, shift) in columns.iter_mut().zip(offset) {
                for v in slot.iter_mut() {
                    *v += shift;
                }
            }
        }
        self.sink.scatter3d(&columns[0], &columns[1], &columns[2]);
        Ok(())
    }

    /// Scatter an already transformed point cloud (cartesian or reciprocal
    /// coordinates).
    pub fn add_points_scatter(
        &mut self,
        points: &TransformedKPoints,
        offset: Option<[f64; 3]>,
    ) {
        let shift = offset.unwrap_or([0.0; 3]);
        let mut columns = [points.column(0), points.column(1), points.column(2)];
        for (slot, shift) in columns.iter_mut().zip(shift) {
            for v in slot.iter_mut() {
                *v += shift;
            }
        }
        self.sink.scatter3d(&columns[0], &columns[1], &columns[2]);
    }

    /// Raw per-point band energies of one layer, one scatter per band.
    pub fn add_bands_scatter(
        &mut self,
        kpoints: &KPointSet,
        eigenvalues: &EigenvalueTable,
        request: &BandScatterRequest,
    ) -> Result<()> {
        check_bands(&request.band_indices, eigenvalues.nbands())?;
        let section = slice(
            kpoints,
            eigenvalues,
            request.axis,
            request.layer,
            request.offset,
        )?;
        for &band in &request.band_indices {
            let z = section.band_energies(band);
            self.sink.scatter3d(section.x(), section.y(), &z);
        }
        Ok(())
    }

    /// Interpolated energy surface of one layer, one mesh per band, colored
    /// by each mesh's own finite value range.
    pub fn add_bands_surface(
        &mut self,
        kpoints: &KPointSet,
        eigenvalues: &EigenvalueTable,
        request: &SurfaceRequest,
    ) -> Result<()> {
        check_bands(&request.band_indices, eigenvalues.nbands())?;
        let section = slice(
            kpoints,
            eigenvalues,
            request.axis,
            request.layer,
            request.offset,
        )?;
        let builder = SurfaceBuilder::new(&section)?;
        log::debug!(
            "surface pass: {} points, {} triangles, {} bands",
            section.len(),
            builder.triangle_count(),
            request.band_indices.len(),
        );
        for &band in &request.band_indices {
            let surface = builder.interpolate(band, request.resolution);
            let range = surface.finite_range().unwrap_or((0.0, 0.0));
            self.sink
                .surface(surface.x_axis(), surface.y_axis(), surface.values(), range);
        }
        Ok(())
    }

    /// Same meshes as [`Plotter::add_bands_surface`], rendered un-shaded
    /// with a greyscale band-rank gradient.
    pub fn add_bands_wireframe(
        &mut self,
        kpoints: &KPointSet,
        eigenvalues: &EigenvalueTable,
        request: &SurfaceRequest,
    ) -> Result<()> {
        check_bands(&request.band_indices, eigenvalues.nbands())?;
        let section = slice(
            kpoints,
            eigenvalues,
            request.axis,
            request.layer,
            request.offset,
        )?;
        let builder = SurfaceBuilder::new(&section)?;
        for &band in &request.band_indices {
            let surface = builder.interpolate(band, request.resolution);
            let rgb = wireframe_grey(band, &request.band_indices);
            self.sink
                .wireframe(surface.x_axis(), surface.y_axis(), surface.values(), rgb);
        }
        Ok(())
    }

    /// Finalize the sink (equal aspect, show / write-out).
    pub fn show(&mut self) -> Result<()> {
        self.sink.finish()
    }

    /// Recover the sink, e.g. to inspect recorded calls.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Coordinate order putting the held axis last: the two free axes keep the
/// cyclic orientation of the slicer's coordinate export.
fn cyclic_order(axis: usize) -> Result<[usize; 3]> {
    match axis {
        0 => Ok([1, 2, 0]),
        1 => Ok([2, 0, 1]),
        2 => Ok([0, 1, 2]),
        _ => Err(BandError::AxisOutOfRange { axis }),
    }
}

fn check_bands(band_indices: &[usize], nbands: usize) -> Result<()> {
    match band_indices.iter().find(|&&b| b >= nbands) {
        Some(&band) => Err(BandError::DimensionMismatch {
            expected: format!("band index below {nbands}"),
            got: format!("{band}"),
        }),
        None => Ok(()),
    }
}
