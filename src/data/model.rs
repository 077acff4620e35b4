use std::path::Path;

use nalgebra::{Matrix3, Vector3};

use crate::data::orbitals::{classify, OrbitalCharacter};
use crate::error::{BandError, Result};
use crate::grid::{side_length, GridShape};
use crate::transform::transform;
use crate::xml;

/// Orbital-projection channels per ion: 1 s + 3 p + 5 d.
pub const NUM_CHANNELS: usize = 9;

// ---------------------------------------------------------------------------
// BasisMatrix – one set of lattice basis vectors
// ---------------------------------------------------------------------------

/// A 3×3 basis whose rows are basis vectors, either of the cartesian cell or
/// of the reciprocal cell. Immutable once read from the source dataset.
#[derive(Debug, Clone, Copy)]
pub struct BasisMatrix {
    rows: Matrix3<f64>,
}

/// Below this determinant magnitude a basis is treated as degenerate.
const DEGENERACY_TOLERANCE: f64 = 1.0e-12;

impl BasisMatrix {
    /// Build from three row vectors, rejecting linearly dependent rows.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self> {
        let m = Matrix3::new(
            rows[0][0], rows[0][1], rows[0][2],
            rows[1][0], rows[1][1], rows[1][2],
            rows[2][0], rows[2][1], rows[2][2],
        );
        if m.determinant().abs() < DEGENERACY_TOLERANCE {
            return Err(BandError::MalformedRecord {
                field: "basis".into(),
                detail: "basis vectors are linearly dependent or zero".into(),
            });
        }
        Ok(BasisMatrix { rows: m })
    }

    /// Shape-checked variant for callers holding raw parsed rows.
    pub fn try_from_nested(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.len() != 3 || rows.iter().any(|r| r.len() != 3) {
            return Err(BandError::DimensionMismatch {
                expected: "3x3 basis".into(),
                got: format!("{} rows", rows.len()),
            });
        }
        let mut fixed = [[0.0; 3]; 3];
        for (i, row) in rows.iter().enumerate() {
            fixed[i].copy_from_slice(row);
        }
        Self::from_rows(fixed)
    }

    /// Basis vector `i` (a row of the matrix).
    pub fn row(&self, i: usize) -> Vector3<f64> {
        self.rows.row(i).transpose()
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.rows
    }
}

// ---------------------------------------------------------------------------
// KPointSet – ordered fractional sampling points
// ---------------------------------------------------------------------------

/// The ordered fractional k-points exactly as the upstream sampler produced
/// them. The order is load-bearing: it is the S×S×S traversal order with
/// axis 2 fastest-varying, and every layer mask assumes it.
#[derive(Debug, Clone)]
pub struct KPointSet {
    points: Vec<Vector3<f64>>,
    shape: Option<GridShape>,
}

impl KPointSet {
    pub fn new(points: Vec<Vector3<f64>>) -> Self {
        let shape = GridShape::from_point_count(points.len()).ok();
        if shape.is_none() {
            log::warn!(
                "{} k-points do not form a cubic grid; layer slicing will be rejected",
                points.len()
            );
        }
        KPointSet { points, shape }
    }

    /// Shape-checked variant for callers holding raw parsed rows.
    pub fn try_from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let mut points = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() != 3 {
                return Err(BandError::DimensionMismatch {
                    expected: "3-component k-points".into(),
                    got: format!("{} components", row.len()),
                });
            }
            points.push(Vector3::new(row[0], row[1], row[2]));
        }
        Ok(Self::new(points))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// The cubic grid descriptor attached at load time. Fails with
    /// `MalformedGrid` when the point count was not a perfect cube.
    pub fn grid_shape(&self) -> Result<GridShape> {
        self.shape.ok_or(BandError::MalformedGrid {
            count: self.points.len(),
            side: side_length(self.points.len()),
        })
    }
}

/// A k-point set mapped through a basis: same ordering invariant, different
/// coordinate system.
#[derive(Debug, Clone)]
pub struct TransformedKPoints {
    points: Vec<Vector3<f64>>,
}

impl TransformedKPoints {
    pub fn new(points: Vec<Vector3<f64>>) -> Self {
        TransformedKPoints { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// One coordinate column across all points, for scatter payloads.
    pub fn column(&self, i: usize) -> Vec<f64> {
        self.points.iter().map(|p| p[i]).collect()
    }
}

// ---------------------------------------------------------------------------
// EigenvalueTable – N×B band energies
// ---------------------------------------------------------------------------

/// Per-k-point, per-band energies. Row i corresponds to k-point i.
#[derive(Debug, Clone)]
pub struct EigenvalueTable {
    values: Vec<f64>,
    nkpoints: usize,
    nbands: usize,
}

impl EigenvalueTable {
    /// Build from per-k-point rows; all rows must have the same band count.
    pub fn try_from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let nkpoints = rows.len();
        let nbands = rows.first().map_or(0, |r| r.len());
        let mut values = Vec::with_capacity(nkpoints * nbands);
        for row in &rows {
            if row.len() != nbands {
                return Err(BandError::DimensionMismatch {
                    expected: format!("{nbands} bands per k-point"),
                    got: format!("{}", row.len()),
                });
            }
            values.extend_from_slice(row);
        }
        Ok(EigenvalueTable {
            values,
            nkpoints,
            nbands,
        })
    }

    pub fn nkpoints(&self) -> usize {
        self.nkpoints
    }

    pub fn nbands(&self) -> usize {
        self.nbands
    }

    /// All band energies at k-point `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.nbands..(i + 1) * self.nbands]
    }

    pub fn get(&self, kpoint: usize, band: usize) -> f64 {
        self.values[kpoint * self.nbands + band]
    }
}

// ---------------------------------------------------------------------------
// OrbitalProjection – per-band, per-ion orbital weights
// ---------------------------------------------------------------------------

/// Orbital-projection weights over the 9 channels `[0]=s, [1..4)=p,
/// [4..9)=d`, per band and ion, sampled at the source's first spin/k-point
/// block (band character is treated as k-independent for classification).
#[derive(Debug, Clone)]
pub struct OrbitalProjection {
    /// `[band][ion][channel]` flattened row-major.
    weights: Vec<f64>,
    nbands: usize,
    nions: usize,
}

impl OrbitalProjection {
    /// Build from per-band rows of per-ion channel weights; every ion row
    /// must carry exactly [`NUM_CHANNELS`] weights.
    pub fn try_from_bands(bands: Vec<Vec<Vec<f64>>>) -> Result<Self> {
        let nbands = bands.len();
        let nions = bands.first().map_or(0, |b| b.len());
        let mut weights = Vec::with_capacity(nbands * nions * NUM_CHANNELS);
        for band in &bands {
            if band.len() != nions {
                return Err(BandError::DimensionMismatch {
                    expected: format!("{nions} ions per band"),
                    got: format!("{}", band.len()),
                });
            }
            for ion in band {
                if ion.len() != NUM_CHANNELS {
                    return Err(BandError::DimensionMismatch {
                        expected: format!("{NUM_CHANNELS} orbital channels"),
                        got: format!("{}", ion.len()),
                    });
                }
                weights.extend_from_slice(ion);
            }
        }
        Ok(OrbitalProjection {
            weights,
            nbands,
            nions,
        })
    }

    pub fn nbands(&self) -> usize {
        self.nbands
    }

    pub fn nions(&self) -> usize {
        self.nions
    }

    pub fn weight(&self, band: usize, ion: usize, channel: usize) -> f64 {
        self.weights[(band * self.nions + ion) * NUM_CHANNELS + channel]
    }

    /// Channel weights of one band summed over all ions.
    pub fn aggregate(&self, band: usize) -> [f64; NUM_CHANNELS] {
        let mut agg = [0.0; NUM_CHANNELS];
        for ion in 0..self.nions {
            for (channel, slot) in agg.iter_mut().enumerate() {
                *slot += self.weight(band, ion, channel);
            }
        }
        agg
    }
}

// ---------------------------------------------------------------------------
// Dataset – the loaded, immutable aggregate
// ---------------------------------------------------------------------------

/// Everything extracted from one vasprun.xml. Created once per load and
/// read-only thereafter; slices and surfaces derived from it hold no
/// back-reference.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub bases_cartesian: BasisMatrix,
    pub bases_reciprocal: BasisMatrix,
    pub kpoints: KPointSet,
    pub kpoints_cartesian: TransformedKPoints,
    pub kpoints_reciprocal: TransformedKPoints,
    pub eigenvalues: EigenvalueTable,
    projections: Option<OrbitalProjection>,
    orbitals: Option<Vec<OrbitalCharacter>>,
}

impl Dataset {
    /// Read and extract a vasprun.xml file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let document = xml::parse(&text)?;
        Self::from_document(&document)
    }

    /// Extract a dataset from an already parsed source tree.
    pub fn from_document(document: &xml::Document) -> Result<Self> {
        let bases_cartesian = super::accessor::bases_cartesian(document)?;
        let bases_reciprocal = super::accessor::bases_reciprocal(document)?;
        let kpoints = super::accessor::kpoints(document)?;
        let eigenvalues = super::accessor::eigenvalues(document)?;
        let projections = super::accessor::orbital_projections(document)?;

        let kpoints_cartesian = transform(&kpoints, &bases_cartesian);
        let kpoints_reciprocal = transform(&kpoints, &bases_reciprocal);
        let orbitals = projections.as_ref().map(classify);

        log::info!(
            "loaded dataset: {} k-points, {} bands, projections {}",
            kpoints.len(),
            eigenvalues.nbands(),
            if projections.is_some() { "present" } else { "absent" },
        );

        Ok(Dataset {
            bases_cartesian,
            bases_reciprocal,
            kpoints,
            kpoints_cartesian,
            kpoints_reciprocal,
            eigenvalues,
            projections,
            orbitals,
        })
    }

    /// Orbital projections, or `ProjectionUnavailable` when the calculation
    /// was run without them. Distinct from an all-zero projection.
    pub fn projections(&self) -> Result<&OrbitalProjection> {
        self.projections
            .as_ref()
            .ok_or(BandError::ProjectionUnavailable)
    }

    /// Per-band orbital character labels, derived once at load.
    pub fn orbital_characters(&self) -> Result<&[OrbitalCharacter]> {
        self.orbitals
            .as_deref()
            .ok_or(BandError::ProjectionUnavailable)
    }

    /// Ascending indices of the bands whose orbital character satisfies the
    /// predicate.
    pub fn band_indices(
        &self,
        predicate: impl Fn(OrbitalCharacter) -> bool,
    ) -> Result<Vec<usize>> {
        let labels = self.orbital_characters()?;
        Ok(super::orbitals::band_indices(labels, predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_rejects_degenerate_rows() {
        let err = BasisMatrix::from_rows([
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
        ])
        .unwrap_err();
        assert!(matches!(err, BandError::MalformedRecord { .. }));
    }

    #[test]
    fn basis_rejects_wrong_shape() {
        let err = BasisMatrix::try_from_nested(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, BandError::DimensionMismatch { .. }));
    }

    #[test]
    fn kpoints_reject_non_3_wide_rows() {
        let err = KPointSet::try_from_rows(vec![vec![0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, BandError::DimensionMismatch { .. }));
    }

    #[test]
    fn kpoint_grid_shape_attached_at_load() {
        let rows: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64, 0.0, 0.0]).collect();
        let kpoints = KPointSet::try_from_rows(rows).unwrap();
        assert_eq!(kpoints.grid_shape().unwrap().side(), 2);

        let rows: Vec<Vec<f64>> = (0..7).map(|i| vec![i as f64, 0.0, 0.0]).collect();
        let kpoints = KPointSet::try_from_rows(rows).unwrap();
        assert!(matches!(
            kpoints.grid_shape(),
            Err(BandError::MalformedGrid { count: 7, .. })
        ));
    }

    #[test]
    fn eigenvalue_table_rejects_ragged_rows() {
        let err =
            EigenvalueTable::try_from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, BandError::DimensionMismatch { .. }));
    }

    #[test]
    fn eigenvalue_rows_are_addressable() {
        let table =
            EigenvalueTable::try_from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(table.nkpoints(), 2);
        assert_eq!(table.nbands(), 2);
        assert_eq!(table.row(1), &[3.0, 4.0]);
        assert_eq!(table.get(0, 1), 2.0);
    }

    #[test]
    fn projection_aggregates_over_ions() {
        let band0_ion0 = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let band0_ion1 = vec![0.5, 0.0, 0.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let proj =
            OrbitalProjection::try_from_bands(vec![vec![band0_ion0, band0_ion1]]).unwrap();
        let agg = proj.aggregate(0);
        assert_eq!(agg[0], 1.5);
        assert_eq!(agg[2], 0.2);
    }

    #[test]
    fn projection_rejects_short_channel_rows() {
        let err =
            OrbitalProjection::try_from_bands(vec![vec![vec![1.0, 2.0, 3.0]]]).unwrap_err();
        assert!(matches!(err, BandError::DimensionMismatch { .. }));
    }
}
