//! NetCDF forecast file reader.

use super::variable_data::{read_values, unpack_cf, Selection};
use crate::error::{FlowcastError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// An open forecast output file.
///
/// The underlying netCDF handle is closed when the value is dropped, so every
/// early return through `?` releases it.
pub struct ForecastFile {
    path: PathBuf,
    file: netcdf::File,
}

impl fmt::Debug for ForecastFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ForecastFile {
    /// Open a NetCDF file.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::metadata(path).map_err(|e| FlowcastError::io(path, e))?;

        let file = netcdf::open(path)
            .map_err(|e| FlowcastError::file_format(path, format!("cannot open: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the handle.
    pub fn close(self) {
        drop(self);
    }

    /// Whether a variable with this name exists.
    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Dimension names of a variable, outermost first.
    pub fn dimension_names(&self, name: &str) -> Result<Vec<String>> {
        let var = self.variable(name)?;
        Ok(var.dimensions().iter().map(|d| d.name().to_string()).collect())
    }

    /// Read a whole 1D variable.
    pub fn read_vector(&self, name: &str) -> Result<Vec<f64>> {
        let var = self.variable_of_rank(name, 1)?;
        read_values(&var, Selection::All)
    }

    /// Read one element of a 1D variable.
    pub fn read_element(&self, name: &str, index: usize) -> Result<f64> {
        let var = self.variable_of_rank(name, 1)?;
        let len = var.dimensions()[0].len();
        if index >= len {
            return Err(FlowcastError::file_format(
                &self.path,
                format!("index {} out of range for '{}' of length {}", index, name, len),
            ));
        }

        let values = read_values(&var, Selection::Element(index))?;
        values.first().copied().ok_or_else(|| {
            FlowcastError::file_format(&self.path, format!("'{}' returned no value", name))
        })
    }

    /// Read one column of a time × reach matrix: the time series of one reach.
    pub fn read_matrix_column(&self, name: &str, column_index: usize) -> Result<Vec<f64>> {
        self.read_matrix_line(name, 1, column_index)
    }

    /// Read the line of a 2D variable with `index` fixed on `axis`.
    ///
    /// CF packing attributes are applied to the returned values.
    pub fn read_matrix_line(&self, name: &str, axis: usize, index: usize) -> Result<Vec<f64>> {
        let var = self.variable_of_rank(name, 2)?;
        if axis > 1 {
            return Err(FlowcastError::file_format(
                &self.path,
                format!("axis {} out of range for 2D '{}'", axis, name),
            ));
        }

        let len = var.dimensions()[axis].len();
        if index >= len {
            return Err(FlowcastError::file_format(
                &self.path,
                format!(
                    "index {} out of range for axis {} of '{}' (length {})",
                    index, axis, name, len
                ),
            ));
        }

        let mut values = read_values(&var, Selection::Line { axis, index })?;
        unpack_cf(&var, &mut values);
        Ok(values)
    }

    fn variable(&self, name: &str) -> Result<netcdf::Variable<'_>> {
        self.file.variable(name).ok_or_else(|| {
            FlowcastError::file_format(&self.path, format!("variable '{}' not found", name))
        })
    }

    fn variable_of_rank(&self, name: &str, rank: usize) -> Result<netcdf::Variable<'_>> {
        let var = self.variable(name)?;
        let actual = var.dimensions().len();
        if actual != rank {
            return Err(FlowcastError::file_format(
                &self.path,
                format!("variable '{}' has rank {}, expected {}", name, actual, rank),
            ));
        }
        Ok(var)
    }
}
