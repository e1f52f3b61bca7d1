use super::config::{CompositionRange, TemperatureRange};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::model::gibbs::GibbsModel;
use nalgebra::DMatrix;

/// Composition samples: `min..=max` stepped by `interval`, with the endpoint
/// included via a half-interval tolerance (arange semantics, so 0..1 at 0.05
/// yields 21 samples).
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionGrid {
    values: Vec<f64>,
}

impl CompositionGrid {
    pub fn from_range(range: &CompositionRange) -> Self {
        let mut values = Vec::new();
        let mut x = range.min;
        let stop = range.max + range.interval / 2.0;
        while x < stop {
            values.push(x.min(1.0));
            x += range.interval;
        }
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Evenly spaced temperature samples over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureGrid {
    values: Vec<f64>,
}

impl TemperatureGrid {
    pub fn from_range(range: &TemperatureRange) -> Self {
        let n = range.points;
        let step = (range.max - range.min) / (n - 1) as f64;
        let values = (0..n).map(|i| range.min + step * i as f64).collect();
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Free-energy values for one phase: rows are composition samples, columns
/// are temperature samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSurface {
    pub phase: String,
    pub values: DMatrix<f64>,
}

/// All computed surfaces plus the grids they share. Recomputed wholesale on
/// every parameter change; nothing is cached.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSet {
    pub compositions: Vec<f64>,
    pub temperatures: Vec<f64>,
    pub surfaces: Vec<PhaseSurface>,
}

impl SurfaceSet {
    /// Smallest finite free energy across all surfaces, used as the shared
    /// z-axis floor (the ceiling is fixed at 0).
    pub fn global_min(&self) -> f64 {
        self.surfaces
            .iter()
            .flat_map(|surface| surface.values.iter())
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::INFINITY, f64::min)
            .min(0.0)
    }
}

/// Evaluates one phase model over the full grid.
pub fn evaluate_surface(
    model: &GibbsModel,
    compositions: &CompositionGrid,
    temperatures: &TemperatureGrid,
    reporter: &ProgressReporter,
) -> Result<PhaseSurface, EngineError> {
    let phase = model.phase_name().to_string();
    reporter.report(Progress::SurfaceStart {
        phase: phase.clone(),
        rows: compositions.len() as u64,
    });

    let mut values = DMatrix::zeros(compositions.len(), temperatures.len());
    for (i, &x) in compositions.values().iter().enumerate() {
        for (j, &t) in temperatures.values().iter().enumerate() {
            values[(i, j)] =
                model
                    .molar_gibbs(x, t)
                    .map_err(|source| EngineError::Evaluation {
                        phase: phase.clone(),
                        composition: x,
                        temperature: t,
                        source,
                    })?;
        }
        reporter.report(Progress::RowComplete);
    }
    reporter.report(Progress::SurfaceFinish);

    Ok(PhaseSurface { phase, values })
}
