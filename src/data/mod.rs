//! Data reading.
//!
//! This module opens forecast output files and decodes the reach identifier
//! vector and discharge matrix they contain.

mod reader;
mod variable_data;

pub use reader::ForecastFile;
pub use variable_data::{numeric_attribute, read_values, unpack_cf, Selection};
