//! depmatrix - Cross-project dependency compatibility library
//!
//! This library provides:
//! - A version-constraint algebra (parse, normalize, combine, compare)
//! - Cross-project aggregation into jointly allowed ranges
//! - A project x dependency compatibility matrix with baseline compliance
//! - Concurrent dependency discovery through an external tree command

pub mod baseline;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod resolve;
