//! Variable data reading and decoding.

use crate::error::{FlowcastError, Result};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;

/// Part of a variable to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every value of the variable.
    All,
    /// A single element of a 1D variable.
    Element(usize),
    /// One line of a 2D variable: `index` is fixed on `axis`, the other axis varies.
    Line {
        /// Axis held fixed (0 or 1).
        axis: usize,
        /// Position on the fixed axis.
        index: usize,
    },
}

// Reads `$var` as `$t` according to `$sel` and widens to f64.
macro_rules! read_as {
    ($var:expr, $sel:expr, $t:ty) => {{
        let values: Vec<$t> = match $sel {
            Selection::All => $var.get_values::<$t, _>(..)?,
            Selection::Element(i) => vec![$var.get_value::<$t, _>(i)?],
            Selection::Line { axis: 0, index } => $var.get_values::<$t, _>((index, ..))?,
            Selection::Line { index, .. } => $var.get_values::<$t, _>((.., index))?,
        };
        values.into_iter().map(|x| x as f64).collect::<Vec<f64>>()
    }};
}

/// Read part of a numeric variable as f64, whatever its stored type.
pub fn read_values(var: &netcdf::Variable<'_>, selection: Selection) -> Result<Vec<f64>> {
    let vartype = var.vartype();

    let values = match vartype {
        NcVariableType::Float(FloatType::F64) => read_as!(var, selection, f64),
        NcVariableType::Float(FloatType::F32) => read_as!(var, selection, f32),
        NcVariableType::Int(IntType::I64) => read_as!(var, selection, i64),
        NcVariableType::Int(IntType::I32) => read_as!(var, selection, i32),
        NcVariableType::Int(IntType::I16) => read_as!(var, selection, i16),
        NcVariableType::Int(IntType::I8) => read_as!(var, selection, i8),
        NcVariableType::Int(IntType::U64) => read_as!(var, selection, u64),
        NcVariableType::Int(IntType::U32) => read_as!(var, selection, u32),
        NcVariableType::Int(IntType::U16) => read_as!(var, selection, u16),
        NcVariableType::Int(IntType::U8) => read_as!(var, selection, u8),
        NcVariableType::Char | NcVariableType::String => {
            return Err(FlowcastError::NetCDF(format!(
                "Variable '{}' holds character data, expected numbers",
                var.name()
            )))
        }
        _ => {
            return Err(FlowcastError::NetCDF(format!(
                "Unsupported variable type: {:?}",
                vartype
            )))
        }
    };

    Ok(values)
}

/// Apply CF packing attributes (`_FillValue`, `scale_factor`, `add_offset`) in place.
///
/// Fill values become NaN so they drop out of statistics instead of being
/// treated as real discharge.
pub fn unpack_cf(var: &netcdf::Variable<'_>, values: &mut [f64]) {
    let fill_value = numeric_attribute(var, "_FillValue");
    let scale_factor = numeric_attribute(var, "scale_factor").unwrap_or(1.0);
    let add_offset = numeric_attribute(var, "add_offset").unwrap_or(0.0);

    let rescale = (scale_factor - 1.0).abs() > 0.0 || add_offset != 0.0;
    if fill_value.is_none() && !rescale {
        return;
    }

    for v in values.iter_mut() {
        if fill_value == Some(*v) {
            *v = f64::NAN;
        } else if rescale {
            *v = *v * scale_factor + add_offset;
        }
    }
}

/// Read a scalar numeric attribute of a variable.
pub fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    let value = var.attribute(name)?.value().ok()?;

    match value {
        AttributeValue::Uchar(v) => Some(v as f64),
        AttributeValue::Schar(v) => Some(v as f64),
        AttributeValue::Ushort(v) => Some(v as f64),
        AttributeValue::Short(v) => Some(v as f64),
        AttributeValue::Uint(v) => Some(v as f64),
        AttributeValue::Int(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Float(v) => Some(v as f64),
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Floats(v) => v.first().map(|x| *x as f64),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Ints(v) => v.first().map(|x| *x as f64),
        AttributeValue::Shorts(v) => v.first().map(|x| *x as f64),
        _ => None,
    }
}
