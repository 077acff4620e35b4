use std::fs::File;
use std::io::BufWriter;

use bandsurf::kgrid::{write_grid, GridStyle};

/// Writes an explicit KPOINTS grid file for the upstream calculation:
/// `generate_kgrid [half_extent] [C|R] [path]`.
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let half_extent: u32 = args
        .next()
        .map(|a| a.parse().expect("half extent must be a positive integer"))
        .unwrap_or(4);
    let style = match args.next().as_deref() {
        None | Some("C") => GridStyle::CartesianFraction,
        Some("R") => GridStyle::ReciprocalFraction,
        Some(other) => panic!("unknown style '{other}', expected C or R"),
    };
    let path = args.next().unwrap_or_else(|| "KPOINTS".to_string());

    let file = File::create(&path).expect("failed to create output file");
    let mut writer = BufWriter::new(file);
    write_grid(&mut writer, half_extent, style).expect("failed to write grid");

    let full = 2 * half_extent + 1;
    println!("Wrote {full}x{full}x{full} k-point grid to {path}");
}
