//! Tensor operations on ``[batch, heads, seq, seq]`` attention biases.
pub mod bias_shape;
pub mod interpolate;
pub mod pad_or_trim;

pub use bias_shape::square_bias;
pub use interpolate::{bilinear_resample_weights, interpolate_bias};
pub use pad_or_trim::pad_or_trim_bias;
