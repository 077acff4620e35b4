use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// An RGB triple with components in [0, 1], the form the render sink takes.
pub type Rgb = [f32; 3];

/// Generates `n` visually distinct colours using evenly spaced hues, for
/// per-band scatter series.
pub fn band_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [rgb.red, rgb.green, rgb.blue]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Wireframe greyscale gradient
// ---------------------------------------------------------------------------

/// Greyscale shade for one band of a wireframe stack: higher bands render
/// darker, scaled by 1.5 so the top band is not pure white.
pub fn wireframe_grey(band: usize, band_indices: &[usize]) -> Rgb {
    let max = band_indices.iter().copied().max().unwrap_or(band);
    let min = band_indices.iter().copied().min().unwrap_or(band);
    let range = if band_indices.len() > 1 { max - min } else { 1 };
    let grey = (max.saturating_sub(band)) as f32 / range as f32 / 1.5;
    [grey, grey, grey]
}
