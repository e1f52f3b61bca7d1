use crate::core::model::gibbs::GibbsModel;
use crate::core::tdb::database::Database;
use crate::engine::config::SurfaceConfig;
use crate::engine::error::EngineError;
use crate::engine::grid::{self, CompositionGrid, SurfaceSet, TemperatureGrid};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Computes the Gibbs free-energy surface of every configured phase over a
/// shared composition × temperature grid.
///
/// `elements` are the two substitutional constituents; the first one is the
/// composition axis (its mole fraction runs over the configured range).
#[instrument(skip_all, name = "surface_workflow")]
pub fn run(
    db: &Database,
    elements: [&str; 2],
    config: &SurfaceConfig,
    reporter: &ProgressReporter,
) -> Result<SurfaceSet, EngineError> {
    config.validate()?;

    let compositions = CompositionGrid::from_range(&config.composition);
    let temperatures = TemperatureGrid::from_range(&config.temperature);
    info!(
        compositions = compositions.len(),
        temperatures = temperatures.len(),
        phases = config.phases.len(),
        "Starting surface computation"
    );

    let mut surfaces = Vec::with_capacity(config.phases.len());
    for phase in &config.phases {
        reporter.report(Progress::ModelStart {
            phase: phase.clone(),
        });
        let model =
            GibbsModel::from_database(db, phase, elements).map_err(|source| EngineError::Model {
                phase: phase.clone(),
                source,
            })?;
        let surface = grid::evaluate_surface(&model, &compositions, &temperatures, reporter)?;
        info!(phase = %phase, "Surface complete");
        surfaces.push(surface);
    }

    Ok(SurfaceSet {
        compositions: compositions.values().to_vec(),
        temperatures: temperatures.values().to_vec(),
        surfaces,
    })
}
