pub mod config;
pub mod error;
pub mod estimators;
pub mod grid;
pub mod metric;
pub mod progress;
pub mod search;
pub mod split;
pub mod transform;
