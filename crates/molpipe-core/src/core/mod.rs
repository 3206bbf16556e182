pub mod elements;
pub mod featurize;
pub mod io;
pub mod models;
