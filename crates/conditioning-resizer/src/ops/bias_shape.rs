//! # Attention Bias Shape Checks

use crate::conditioning::{CondValue, DynTensor};
use crate::errors::{ResizeError, Result};
use bimm_contracts::{ShapeContract, shape_contract};
use burn::prelude::{Backend, Tensor};

/// Input bias contract: ``[batch, heads, seq, seq]``.
pub static BIAS_CONTRACT: ShapeContract = shape_contract!["batch", "heads", "seq", "seq"];

/// Resized bias contract: ``[batch, heads, rows, cols]``.
pub static RESIZED_BIAS_CONTRACT: ShapeContract =
    shape_contract!["batch", "heads", "rows", "cols"];

/// Extract a ``[batch, heads, seq, seq]`` attention bias from a conditioning value.
///
/// # Arguments
///
/// - `value`: the ``attention_bias`` value; must be a non-null tensor.
///
/// # Returns
///
/// The bias tensor handle (shares storage with `value`).
///
/// # Errors
///
/// [`ResizeError::InvalidShape`] if `value` is not a tensor, is not rank 4,
/// has unequal trailing axes, or has an empty axis.
pub fn square_bias<B: Backend>(value: &CondValue<B>) -> Result<Tensor<B, 4>> {
    let tensor = match value {
        CondValue::Tensor(DynTensor::Rank4(tensor)) => tensor,
        CondValue::Tensor(other) => {
            return Err(ResizeError::InvalidShape(format!(
                "expected rank 4 [batch, heads, seq, seq], found rank {} {:?}",
                other.rank(),
                other.dims(),
            )));
        }
        other => {
            return Err(ResizeError::InvalidShape(format!(
                "expected a tensor, found {}",
                other.type_name(),
            )));
        }
    };

    let dims = tensor.dims();
    let [_, _, rows, cols] = dims;
    if rows != cols {
        return Err(ResizeError::InvalidShape(format!(
            "expected square trailing axes [batch, heads, seq, seq], found {dims:?}"
        )));
    }
    if dims.contains(&0) {
        return Err(ResizeError::InvalidShape(format!(
            "empty axis in {dims:?}"
        )));
    }

    Ok(tensor.clone())
}
