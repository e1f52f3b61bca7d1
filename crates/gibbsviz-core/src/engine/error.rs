use thiserror::Error;

use super::config::ConfigError;
use crate::core::model::gibbs::ModelError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Model construction failed for phase '{phase}': {source}")]
    Model {
        phase: String,
        #[source]
        source: ModelError,
    },

    #[error("Evaluation failed for phase '{phase}' at x = {composition}, T = {temperature} K: {source}")]
    Evaluation {
        phase: String,
        composition: f64,
        temperature: f64,
        #[source]
        source: ModelError,
    },
}
