//! KPOINTS grid-definition file writer.
//!
//! Emits an explicit (2H+1)³ k-point grid with coordinates `i/H, j/H, k/H`
//! for `i, j, k ∈ [-H, H]`, i slowest-varying and k fastest — the same
//! traversal order the loader's grid reconstruction assumes, so files
//! written here and datasets read back interoperate.

use std::io::{self, Write};

/// Coordinate style tag of the generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridStyle {
    /// Fractions of the cartesian cell.
    CartesianFraction,
    /// Fractions of the reciprocal cell.
    ReciprocalFraction,
}

impl GridStyle {
    pub fn tag(self) -> char {
        match self {
            GridStyle::CartesianFraction => 'C',
            GridStyle::ReciprocalFraction => 'R',
        }
    }
}

/// Write the grid definition: header line, point-count line, style line,
/// then one `"<x> <y> <z> 1."` line per point with 5 significant digits.
pub fn write_grid<W: Write>(writer: &mut W, half_extent: u32, style: GridStyle) -> io::Result<()> {
    if half_extent == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "half extent must be at least 1",
        ));
    }
    let full = 2 * half_extent as i64 + 1;
    let scale = 1.0 / half_extent as f64;

    writeln!(writer, "KPOINTS {full}x{full}x{full}")?;
    writeln!(writer, "{}", full * full * full)?;
    writeln!(writer, "{}", style.tag())?;

    let h = half_extent as i64;
    for i in -h..=h {
        for j in -h..=h {
            for k in -h..=h {
                writeln!(
                    writer,
                    "{} {} {} 1.",
                    format_coord(i as f64 * scale),
                    format_coord(j as f64 * scale),
                    format_coord(k as f64 * scale),
                )?;
            }
        }
    }
    Ok(())
}

/// Format to 5 significant digits, trailing zeros trimmed but always with a
/// decimal point (`-1` prints as `-1.0`).
fn format_coord(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (4 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.contains('.') {
        trimmed.to_string()
    } else {
        format!("{trimmed}.0")
    }
}
