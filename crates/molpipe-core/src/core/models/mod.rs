pub mod dataset;
pub mod molecule;
