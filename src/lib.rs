//! Commit Advisor - bug risk prediction for commits
//!
//! Trains a gradient-boosted tree classifier on a labelled commit history,
//! scores a proposed commit and searches its neighborhood for variants with
//! lower predicted risk. Also summarizes each author's clean commits.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod profile;
pub mod reporters;
pub mod search;
pub mod stats;

pub use error::{AdvisorError, AdvisorResult};
pub use pipeline::{run_analysis, AnalysisResult, UserInput};
