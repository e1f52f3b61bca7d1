pub mod inspect;
pub mod plot;
