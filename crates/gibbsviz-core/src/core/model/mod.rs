pub mod gibbs;
pub mod magnetic;

pub use gibbs::{GibbsModel, ModelError, STANDARD_PRESSURE_PA, VACANCY};
