use crate::engine::grid::SurfaceSet;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV writing error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

/// One long-format row of exported surface data.
#[derive(Debug, Serialize)]
struct SurfaceRecord<'a> {
    phase: &'a str,
    composition: f64,
    temperature_k: f64,
    gibbs_j_per_mol: f64,
}

/// Writes a [`SurfaceSet`] in long format: one row per
/// (phase, composition, temperature) sample.
pub fn write_csv<W: Write>(set: &SurfaceSet, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for surface in &set.surfaces {
        for (i, &composition) in set.compositions.iter().enumerate() {
            for (j, &temperature_k) in set.temperatures.iter().enumerate() {
                csv_writer.serialize(SurfaceRecord {
                    phase: &surface.phase,
                    composition,
                    temperature_k,
                    gibbs_j_per_mol: surface.values[(i, j)],
                })?;
            }
        }
    }
    csv_writer.flush().map_err(|e| ExportError::Io {
        path: "<writer>".to_string(),
        source: e,
    })?;
    Ok(())
}

pub fn write_csv_to_path(set: &SurfaceSet, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    write_csv(set, file)
}
