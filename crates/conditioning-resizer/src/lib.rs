#![warn(missing_docs)]
//!# conditioning-resizer - Attention Bias Resizing for Conditioning
//!
//! Stretches or truncates the square ``cross_attn_kwargs.attention_bias`` tensor
//! carried inside image-model conditioning payloads to a new sequence length.
//!
//! ## Notable Components
//!
//! * [`conditioning`] - the dynamic conditioning value model.
//!   * [`conditioning::kind`] - ``Structured`` / ``Opaque`` payload classification.
//! * [`ops`] - tensor operations on ``[batch, heads, seq, seq]`` biases.
//!   * [`ops::pad_or_trim`] - constant-fill pad / top-left trim.
//!   * [`ops::interpolate`] - bilinear resampling with pixel-center alignment.
//!   * [`ops::bias_shape`] - checked extraction of square rank-4 biases.
//! * [`resizer`] - the [`resizer::ConditioningResizer`] and its config.
//! * [`errors`] - the [`errors::ResizeError`] taxonomy.

/// Test-only macro import.
#[cfg(test)]
#[allow(unused_imports)]
#[macro_use]
extern crate hamcrest;

#[cfg(test)]
#[allow(dead_code)]
pub(crate) mod testing;

pub mod conditioning;
pub mod errors;
pub mod ops;
pub mod resizer;

pub use conditioning::{CondMap, CondValue, ConditioningEntry, DynTensor};
pub use errors::{ResizeError, Result};
pub use resizer::{
    ConditioningResizer, ConditioningResizerConfig, ResizeMethod, resize_conditioning,
};
