//! Rendering sink interface and payload exporters.
//!
//! The core never inspects rendering state: it hands finished payloads to a
//! [`RenderSink`] and moves on. Three sinks are provided — a JSON document
//! writer, a flat CSV sample writer, and an in-memory recorder for tests.

use std::io::Write;

use serde::Serialize;

use crate::color::Rgb;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Sink interface
// ---------------------------------------------------------------------------

/// Consumer of finished plot payloads.
///
/// `surface` and `wireframe` receive two 1D axis arrays and a row-major
/// `y_axis.len() × x_axis.len()` value mesh (`NaN` marks holes); `scatter3d`
/// receives three equal-length coordinate arrays. `finish` corresponds to
/// the equal-aspect/show call of an interactive backend.
pub trait RenderSink {
    fn scatter3d(&mut self, x: &[f64], y: &[f64], z: &[f64]);

    fn surface(&mut self, x_axis: &[f64], y_axis: &[f64], values: &[f64], color_range: (f64, f64));

    fn wireframe(&mut self, x_axis: &[f64], y_axis: &[f64], values: &[f64], rgb: Rgb);

    fn finish(&mut self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Payload records
// ---------------------------------------------------------------------------

/// One captured render call. Mesh values are serialized as `null` where the
/// interpolator produced a hole, since JSON has no NaN.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderCall {
    Scatter {
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    },
    Surface {
        x_axis: Vec<f64>,
        y_axis: Vec<f64>,
        values: Vec<Option<f64>>,
        color_min: f64,
        color_max: f64,
    },
    Wireframe {
        x_axis: Vec<f64>,
        y_axis: Vec<f64>,
        values: Vec<Option<f64>>,
        rgb: Rgb,
    },
}

fn mesh_values(values: &[f64]) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|&v| if v.is_finite() { Some(v) } else { None })
        .collect()
}

// ---------------------------------------------------------------------------
// RecordingSink – in-memory capture
// ---------------------------------------------------------------------------

/// Captures every call for inspection; used by tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<RenderCall>,
    pub finished: bool,
}

impl RenderSink for RecordingSink {
    fn scatter3d(&mut self, x: &[f64], y: &[f64], z: &[f64]) {
        self.calls.push(RenderCall::Scatter {
            x: x.to_vec(),
            y: y.to_vec(),
            z: z.to_vec(),
        });
    }

    fn surface(&mut self, x_axis: &[f64], y_axis: &[f64], values: &[f64], color_range: (f64, f64)) {
        self.calls.push(RenderCall::Surface {
            x_axis: x_axis.to_vec(),
            y_axis: y_axis.to_vec(),
            values: mesh_values(values),
            color_min: color_range.0,
            color_max: color_range.1,
        });
    }

    fn wireframe(&mut self, x_axis: &[f64], y_axis: &[f64], values: &[f64], rgb: Rgb) {
        self.calls.push(RenderCall::Wireframe {
            x_axis: x_axis.to_vec(),
            y_axis: y_axis.to_vec(),
            values: mesh_values(values),
            rgb,
        });
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonSink – one JSON document on finish
// ---------------------------------------------------------------------------

/// Accumulates calls and writes them as a single JSON array on `finish`,
/// ready for an external 3D viewer.
pub struct JsonSink<W: Write> {
    calls: Vec<RenderCall>,
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        JsonSink {
            calls: Vec::new(),
            writer,
        }
    }
}

impl<W: Write> RenderSink for JsonSink<W> {
    fn scatter3d(&mut self, x: &[f64], y: &[f64], z: &[f64]) {
        self.calls.push(RenderCall::Scatter {
            x: x.to_vec(),
            y: y.to_vec(),
            z: z.to_vec(),
        });
    }

    fn surface(&mut self, x_axis: &[f64], y_axis: &[f64], values: &[f64], color_range: (f64, f64)) {
        self.calls.push(RenderCall::Surface {
            x_axis: x_axis.to_vec(),
            y_axis: y_axis.to_vec(),
            values: mesh_values(values),
            color_min: color_range.0,
            color_max: color_range.1,
        });
    }

    fn wireframe(&mut self, x_axis: &[f64], y_axis: &[f64], values: &[f64], rgb: Rgb) {
        self.calls.push(RenderCall::Wireframe {
            x_axis: x_axis.to_vec(),
            y_axis: y_axis.to_vec(),
            values: mesh_values(values),
            rgb,
        });
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.calls)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        log::info!("wrote {} render calls as JSON", self.calls.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CsvSink – flat sample rows
// ---------------------------------------------------------------------------

/// Writes every sample as a flat `call,kind,x,y,z` row; holes become empty
/// z cells. Handy for spreadsheet-side inspection of a mesh.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    call_index: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        CsvSink {
            writer: csv::Writer::from_writer(writer),
            call_index: 0,
        }
    }

    fn write_mesh(&mut self, kind: &str, x_axis: &[f64], y_axis: &[f64], values: &[f64]) {
        for (row, &y) in y_axis.iter().enumerate() {
            for (col, &x) in x_axis.iter().enumerate() {
                let z = values[row * x_axis.len() + col];
                let z_cell = if z.is_finite() {
                    z.to_string()
                } else {
                    String::new()
                };
                let record = [
                    self.call_index.to_string(),
                    kind.to_string(),
                    x.to_string(),
                    y.to_string(),
                    z_cell,
                ];
                if let Err(e) = self.writer.write_record(&record) {
                    log::warn!("csv write failed: {e}");
                    return;
                }
            }
        }
    }
}

impl<W: Write> RenderSink for CsvSink<W> {
    fn scatter3d(&mut self, x: &[f64], y: &[f64], z: &[f64]) {
        for i in 0..x.len() {
            let record = [
                self.call_index.to_string(),
                "scatter".to_string(),
                x[i].to_string(),
                y[i].to_string(),
                z[i].to_string(),
            ];
            if let Err(e) = self.writer.write_record(&record) {
                log::warn!("csv write failed: {e}");
                break;
            }
        }
        self.call_index += 1;
    }

    fn surface(&mut self, x_axis: &[f64], y_axis: &[f64], values: &[f64], _color_range: (f64, f64)) {
        self.write_mesh("surface", x_axis, y_axis, values);
        self.call_index += 1;
    }

    fn wireframe(&mut self, x_axis: &[f64], y_axis: &[f64], values: &[f64], _rgb: Rgb) {
        self.write_mesh("wireframe", x_axis, y_axis, values);
        self.call_index += 1;
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_captures_in_order() {
        let mut sink = RecordingSink::default();
        sink.scatter3d(&[0.0], &[1.0], &[2.0]);
        sink.surface(&[0.0, 1.0], &[0.0, 1.0], &[0.0, 1.0, 1.0, 2.0], (0.0, 2.0));
        sink.finish().unwrap();

        assert!(sink.finished);
        assert_eq!(sink.calls.len(), 2);
        assert!(matches!(sink.calls[0], RenderCall::Scatter { .. }));
        match &sink.calls[1] {
            RenderCall::Surface {
                color_min,
                color_max,
                ..
            } => {
                assert_eq!(*color_min, 0.0);
                assert_eq!(*color_max, 2.0);
            }
            other => panic!("expected surface, got {other:?}"),
        }
    }

    #[test]
    fn json_sink_writes_holes_as_null() {
        let mut buf = Vec::new();
        {
            let mut sink = JsonSink::new(&mut buf);
            sink.surface(&[0.0, 1.0], &[0.0], &[1.5, f64::NAN], (0.0, 1.5));
            sink.finish().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let values = &parsed[0]["values"];
        assert_eq!(values[0], 1.5);
        assert!(values[1].is_null());
        assert_eq!(parsed[0]["kind"], "surface");
    }

    #[test]
    fn csv_sink_flattens_meshes() {
        let mut buf = Vec::new();
        {
            let mut sink = CsvSink::new(&mut buf);
            sink.wireframe(&[0.0, 1.0], &[0.0], &[3.0, f64::NAN], [0.5, 0.5, 0.5]);
            sink.finish().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0,wireframe,0,0,3");
        assert_eq!(lines[1], "0,wireframe,1,0,");
    }
}
