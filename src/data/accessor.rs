//! Extraction of typed numeric arrays from the parsed vasprun tree.
//!
//! Each accessor knows one path into the document and the shape of the
//! records found there. Missing required records surface as `DataNotFound`;
//! text that does not parse to the expected float count surfaces as
//! `MalformedRecord` naming the offending field.

use crate::data::model::{
    BasisMatrix, EigenvalueTable, KPointSet, OrbitalProjection, NUM_CHANNELS,
};
use crate::error::{BandError, Result};
use crate::xml::Document;

const CRYSTAL_BASIS_PATH: &str = "structure/crystal/varray";
const KPOINTS_PATH: &str = "kpoints/varray";
const EIGENVALUES_PATH: &str = "calculation/eigenvalues/array/set/set/set";
const PROJECTED_PATH: &str = "calculation/projected";
const PROJECTED_BANDS_PATH: &str = "array/set/set/set";

// ---------------------------------------------------------------------------
// Bases
// ---------------------------------------------------------------------------

/// The cartesian cell basis: first varray under `structure/crystal`.
pub fn bases_cartesian(document: &Document) -> Result<BasisMatrix> {
    crystal_basis(document, 0, "basis (cartesian)")
}

/// The reciprocal cell basis: second varray under `structure/crystal`.
pub fn bases_reciprocal(document: &Document) -> Result<BasisMatrix> {
    crystal_basis(document, 1, "basis (reciprocal)")
}

fn crystal_basis(document: &Document, index: usize, field: &str) -> Result<BasisMatrix> {
    let varrays = document.find_all(CRYSTAL_BASIS_PATH);
    let varray = varrays.get(index).ok_or_else(|| BandError::DataNotFound {
        path: format!("{CRYSTAL_BASIS_PATH}[{index}]"),
    })?;
    let mut rows = Vec::with_capacity(3);
    for child in &varray.children {
        rows.push(parse_floats(&child.text, 3, field)?);
    }
    if rows.len() != 3 {
        return Err(BandError::MalformedRecord {
            field: field.into(),
            detail: format!("expected 3 basis vectors, found {}", rows.len()),
        });
    }
    BasisMatrix::try_from_nested(&rows)
}

// ---------------------------------------------------------------------------
// K-points
// ---------------------------------------------------------------------------

/// The fractional k-point list: one record per point under the first
/// `kpoints/varray`, in sampler traversal order.
pub fn kpoints(document: &Document) -> Result<KPointSet> {
    let varray = document.find(KPOINTS_PATH).ok_or_else(|| BandError::DataNotFound {
        path: KPOINTS_PATH.into(),
    })?;
    let mut rows = Vec::with_capacity(varray.children.len());
    for child in &varray.children {
        rows.push(parse_floats(&child.text, 3, "kpoints")?);
    }
    if rows.is_empty() {
        return Err(BandError::DataNotFound {
            path: KPOINTS_PATH.into(),
        });
    }
    KPointSet::try_from_rows(rows)
}

// ---------------------------------------------------------------------------
// Eigenvalues
// ---------------------------------------------------------------------------

/// The N×B eigenvalue table. Record sets are nested three levels deep, one
/// set per spin/k-point; within a set, each record's first token is the band
/// energy (the occupation that follows is ignored).
pub fn eigenvalues(document: &Document) -> Result<EigenvalueTable> {
    let record_sets = document.find_all(EIGENVALUES_PATH);
    if record_sets.is_empty() {
        return Err(BandError::DataNotFound {
            path: EIGENVALUES_PATH.into(),
        });
    }
    let mut rows = Vec::with_capacity(record_sets.len());
    for set in record_sets {
        let mut row = Vec::with_capacity(set.children.len());
        for record in &set.children {
            row.push(first_float(&record.text, "eigenvalues")?);
        }
        rows.push(row);
    }
    let nbands = rows[0].len();
    if rows.iter().any(|r| r.len() != nbands) {
        return Err(BandError::MalformedRecord {
            field: "eigenvalues".into(),
            detail: "band count differs between k-points".into(),
        });
    }
    EigenvalueTable::try_from_rows(rows)
}

// ---------------------------------------------------------------------------
// Orbital projections
// ---------------------------------------------------------------------------

/// Per-band, per-ion orbital projection weights, when the calculation wrote
/// them. An absent `calculation/projected` block is a valid state and
/// returns `Ok(None)` so classification can short-circuit; it is never
/// collapsed into an empty array.
pub fn orbital_projections(document: &Document) -> Result<Option<OrbitalProjection>> {
    let projected = match document.find(PROJECTED_PATH) {
        Some(el) => el,
        None => return Ok(None),
    };
    let first_kpoint = projected
        .find(PROJECTED_BANDS_PATH)
        .ok_or_else(|| BandError::DataNotFound {
            path: format!("{PROJECTED_PATH}/{PROJECTED_BANDS_PATH}"),
        })?;

    let mut bands = Vec::new();
    for band_set in first_kpoint.children_tagged("set") {
        let mut ions = Vec::new();
        for record in band_set.children_tagged("r") {
            ions.push(parse_floats(&record.text, NUM_CHANNELS, "projections")?);
        }
        bands.push(ions);
    }
    if bands.is_empty() {
        return Err(BandError::DataNotFound {
            path: format!("{PROJECTED_PATH}/{PROJECTED_BANDS_PATH}/set"),
        });
    }
    Ok(Some(OrbitalProjection::try_from_bands(bands)?))
}

// ---------------------------------------------------------------------------
// Text-field helpers
// ---------------------------------------------------------------------------

/// Parse a whitespace-separated text field into exactly `want` floats.
fn parse_floats(text: &str, want: usize, field: &str) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(want);
    for token in text.split_whitespace() {
        let value = token.parse::<f64>().map_err(|_| BandError::MalformedRecord {
            field: field.into(),
            detail: format!("'{token}' is not a number"),
        })?;
        values.push(value);
    }
    if values.len() != want {
        return Err(BandError::MalformedRecord {
            field: field.into(),
            detail: format!("expected {want} values, found {}", values.len()),
        });
    }
    Ok(values)
}

/// Parse the first whitespace-separated token of a text field as a float;
/// remaining tokens are ignored.
fn first_float(text: &str, field: &str) -> Result<f64> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| BandError::MalformedRecord {
            field: field.into(),
            detail: "empty record".into(),
        })?;
    token.parse::<f64>().map_err(|_| BandError::MalformedRecord {
        field: field.into(),
        detail: format!("'{token}' is not a number"),
    })
}
