//! # molpipe Core Library
//!
//! A featurization and model-selection pipeline for molecular property
//! regression: load structured chemical files, derive fixed-length numeric
//! descriptors, split and normalize the resulting dataset, and select model
//! hyperparameters by validation-set grid search.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`Molecule`, `Dataset`), the element table, record-oriented file I/O,
//!   and the featurizers that turn structures into fixed-length vectors.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer holds the pipeline
//!   machinery: configuration, dataset splitting, normalization statistics,
//!   scoring metrics, reference estimators, and the hyperparameter grid
//!   search with its failure-tolerant trial table.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties `engine` and `core` together into complete procedures, such as
//!   the end-to-end training workflow. It provides a simple and powerful
//!   entry point for end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
