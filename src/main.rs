use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use bandsurf::plot::{LayerSelect, Plotter, SurfaceRequest};
use bandsurf::render::JsonSink;
use bandsurf::{Dataset, OrbitalCharacter};

/// Parsed command line: `bandsurf <vasprun.xml> <axis> <layer> [resolution] [out.json]`.
struct Args {
    vasprun: PathBuf,
    axis: usize,
    layer: usize,
    resolution: usize,
    output: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let vasprun = match args.next() {
        Some(p) => PathBuf::from(p),
        None => bail!(
            "usage: bandsurf <vasprun.xml> <axis 0-2> <layer> [resolution] [out.json]"
        ),
    };
    let axis = args
        .next()
        .context("missing axis argument (0, 1 or 2)")?
        .parse()
        .context("axis must be an integer")?;
    let layer = args
        .next()
        .context("missing layer argument")?
        .parse()
        .context("layer must be an integer")?;
    let resolution = match args.next() {
        Some(r) => r.parse().context("resolution must be an integer")?,
        None => 64,
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("bands.json"));
    Ok(Args {
        vasprun,
        axis,
        layer,
        resolution,
        output,
    })
}

fn run(args: Args) -> Result<()> {
    let dataset = Dataset::load(&args.vasprun)
        .with_context(|| format!("loading {}", args.vasprun.display()))?;

    // Prefer the d-character bands when the calculation wrote projections;
    // fall back to every band otherwise.
    let band_indices = match dataset.band_indices(|c| c == OrbitalCharacter::D) {
        Ok(d_bands) if !d_bands.is_empty() => {
            log::info!("selected {} d-character bands", d_bands.len());
            d_bands
        }
        Ok(_) | Err(_) => {
            log::info!("no orbital selection available, plotting all bands");
            (0..dataset.eigenvalues.nbands()).collect()
        }
    };

    let out = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut plotter = Plotter::new(JsonSink::new(BufWriter::new(out)));

    plotter.add_kpoints_scatter(
        &dataset.kpoints,
        Some(LayerSelect {
            axis: args.axis,
            layer: args.layer,
        }),
        None,
    )?;
    plotter.add_bands_surface(
        &dataset.kpoints,
        &dataset.eigenvalues,
        &SurfaceRequest {
            axis: args.axis,
            layer: args.layer,
            resolution: args.resolution,
            band_indices,
            offset: None,
        },
    )?;
    plotter.show()?;

    println!("wrote {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = run(args) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
