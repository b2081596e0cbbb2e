//! Configuration module for commit-advisor
//!
//! This module handles:
//! - Dataset column roles (label, categorical, author)
//! - Model training parameters
//! - Neighborhood search policy and limits
//! - Synthetic generator defaults

mod advisor_config;

pub use advisor_config::{
    AdvisorConfig, CandidatePolicy, DatasetConfig, DeveloperRate, GeneratorConfig, ModelConfig,
    OverflowPolicy, SearchConfig, CONFIG_FILENAME,
};
