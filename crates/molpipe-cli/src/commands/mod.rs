pub mod featurize;
pub mod run;
