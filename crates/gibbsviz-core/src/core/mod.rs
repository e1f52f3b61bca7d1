pub mod expr;
pub mod io;
pub mod model;
pub mod tdb;
