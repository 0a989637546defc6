//! # Pad / Trim Resize
//!
//! Keeps the overlapping top-left block of each ``[seq, seq]`` plane verbatim and
//! fills everything else with a constant.

use crate::ops::bias_shape::{BIAS_CONTRACT, RESIZED_BIAS_CONTRACT};
use bimm_contracts::run_every_nth;
use burn::prelude::{Backend, Tensor};

/// Pad or trim a square attention bias to ``target_length``.
///
/// # Arguments
///
/// - `bias`: ``[batch, heads, seq, seq]``.
/// - `target_length`: the new sequence length, must be > 0.
/// - `pad_value`: the fill value for cells outside the copied block.
///
/// # Returns
///
/// A ``[batch, heads, target_length, target_length]`` tensor on the same device, where
/// ``out[:, :, :k, :k] == bias[:, :, :k, :k]`` for ``k = min(seq, target_length)``
/// and every other cell is `pad_value`.
///
/// # Panics
///
/// If `bias` is not square in its trailing axes, or `target_length` is 0.
/// Use [`crate::ops::bias_shape::square_bias`] to check untrusted inputs first.
pub fn pad_or_trim_bias<B: Backend>(
    bias: Tensor<B, 4>,
    target_length: usize,
    pad_value: f64,
) -> Tensor<B, 4> {
    assert!(target_length > 0, "target_length must be > 0");
    let [batch, heads, seq_len] =
        BIAS_CONTRACT.unpack_shape(&bias, &["batch", "heads", "seq"], &[]);

    let copy_len = seq_len.min(target_length);
    let fill = target_length - copy_len;

    let out = bias
        .slice([0..batch, 0..heads, 0..copy_len, 0..copy_len])
        .pad((0, fill, 0, fill), pad_value);

    run_every_nth!(RESIZED_BIAS_CONTRACT.assert_shape(
        &out,
        &[
            ("batch", batch),
            ("heads", heads),
            ("rows", target_length),
            ("cols", target_length),
        ]
    ));

    out
}
