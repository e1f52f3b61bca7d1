pub mod database;
pub mod keywords;
pub mod lexer;
pub mod parser;

pub use database::{
    Database, Element, MagneticHint, Parameter, ParameterKind, Phase, Sublattice, TdbError,
};
