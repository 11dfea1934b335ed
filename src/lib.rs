//! Flowcast - ensemble streamflow forecast lookup and aggregation.
//!
//! Flowcast reads the netCDF output of repeated ensemble streamflow forecast
//! runs, organized one directory per forecast cycle, and answers two
//! questions for a river reach: which cycles have data for it, and what the
//! ensemble looks like over time for one cycle.
//!
//! # Features
//!
//! - Newest-first cycle discovery with best-effort skipping of bad directories
//! - Reach index resolution with a verified cache fast path
//! - Ensemble mean, min, max and spread bands over split-step horizons
//! - Deterministic and auxiliary products carried alongside the ensemble
//!
//! # Example
//!
//! ```ignore
//! use flowcast::config::ProductConfig;
//! use flowcast::query::get_hydrograph;
//! use std::path::Path;
//!
//! let response = get_hydrograph(
//!     Path::new("/data/rapid_output"),
//!     "texas_gulf",
//!     "upper_basin",
//!     "900123",
//!     "most_recent",
//!     None,
//!     &ProductConfig::default(),
//! );
//! println!("{}", serde_json::to_string(&response)?);
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod config;
pub mod data;
pub mod error;
pub mod forecast;
pub mod query;
pub mod util;

pub use error::{FlowcastError, Result};
