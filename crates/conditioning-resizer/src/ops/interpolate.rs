//! # Bilinear Bias Interpolation
//!
//! Resamples every ``[seq, seq]`` plane of an attention bias as a single-channel
//! image, using bilinear interpolation on the pixel-center grid
//! (``align_corners=False`` in ``torch.nn.functional.interpolate`` terms).
//!
//! Bilinear resampling is separable, so each plane ``X`` maps to ``W @ X @ W^T``
//! where ``W`` is the ``[target, seq]`` 1-d weight matrix from
//! [`bilinear_resample_weights`].

use crate::ops::bias_shape::{BIAS_CONTRACT, RESIZED_BIAS_CONTRACT};
use bimm_contracts::run_every_nth;
use burn::prelude::{Backend, Tensor};
use burn::tensor::TensorData;

/// Build the 1-d bilinear resampling matrix, row-major ``[out_len, in_len]``.
///
/// Output coordinate ``o`` samples input coordinate
/// ``(o + 0.5) * in_len / out_len - 0.5``, clamped to ``[0, in_len - 1]``,
/// blending its two nearest input samples. Each row sums to 1.
///
/// # Arguments
///
/// - `in_len`: the source length, must be > 0.
/// - `out_len`: the target length, must be > 0.
///
/// # Panics
///
/// If `in_len` or `out_len` is 0.
pub fn bilinear_resample_weights(
    in_len: usize,
    out_len: usize,
) -> Vec<f64> {
    assert!(in_len > 0, "in_len must be > 0");
    assert!(out_len > 0, "out_len must be > 0");

    let scale = in_len as f64 / out_len as f64;
    let max_src = (in_len - 1) as f64;

    let mut weights = vec![0.0; out_len * in_len];
    for o in 0..out_len {
        let src = ((o as f64 + 0.5) * scale - 0.5).clamp(0.0, max_src);
        let lo = src.floor() as usize;
        let hi = (lo + 1).min(in_len - 1);
        let frac = src - lo as f64;

        let row = &mut weights[o * in_len..(o + 1) * in_len];
        row[lo] += 1.0 - frac;
        row[hi] += frac;
    }
    weights
}

/// Bilinearly resample a square attention bias to ``target_length``.
///
/// # Arguments
///
/// - `bias`: ``[batch, heads, seq, seq]``.
/// - `target_length`: the new sequence length, must be > 0.
///
/// # Returns
///
/// A ``[batch, heads, target_length, target_length]`` tensor on the same device.
///
/// # Panics
///
/// If `bias` is not square in its trailing axes, or `target_length` is 0.
pub fn interpolate_bias<B: Backend>(
    bias: Tensor<B, 4>,
    target_length: usize,
) -> Tensor<B, 4> {
    let [batch, heads, seq_len] =
        BIAS_CONTRACT.unpack_shape(&bias, &["batch", "heads", "seq"], &[]);
    let planes = batch * heads;
    let device = bias.device();

    let weights: Tensor<B, 2> = Tensor::from_data(
        TensorData::new(
            bilinear_resample_weights(seq_len, target_length),
            [target_length, seq_len],
        ),
        &device,
    );
    // [planes, target, seq]
    let rows = weights.unsqueeze::<3>().repeat_dim(0, planes);
    // [planes, seq, target]
    let cols = rows.clone().transpose();

    let x = bias.reshape([planes, seq_len, seq_len]);
    let out = rows
        .matmul(x)
        .matmul(cols)
        .reshape([batch, heads, target_length, target_length]);

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_close;
    use burn::backend::NdArray;
    use hamcrest::prelude::*;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_weights_identity() {
        let weights = bilinear_resample_weights(3, 3);
        assert_eq!(weights, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_weights_upsample() {
        // 2 -> 4: sources -0.25 (clamped), 0.25, 0.75, 1.25 (clamped).
        let weights = bilinear_resample_weights(2, 4);
        assert_eq!(
            weights,
            vec![1.0, 0.0, 0.75, 0.25, 0.25, 0.75, 0.0, 1.0]
        );
    }

    #[test]
    fn test_weights_downsample() {
        // 4 -> 2: sources 0.5, 2.5.
        let weights = bilinear_resample_weights(4, 2);
        assert_eq!(weights, vec![0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5]);
    }

    #[test]
    fn test_weights_fractional_ratio() {
        // 3 -> 5: sources -0.2 (clamped), 0.4, 1.0, 1.6, 2.2 (clamped).
        let weights = bilinear_resample_weights(3, 5);
        let expected = [
            1.0, 0.0, 0.0, //
            0.6, 0.4, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.4, 0.6, //
            0.0, 0.0, 1.0,
        ];
        assert_eq!(weights.len(), expected.len());
        for (actual, expected) in weights.iter().zip(expected) {
            assert_that!(*actual, close_to(expected, 1e-12));
        }
    }

    #[test]
    fn test_weights_rows_sum_to_one() {
        for (in_len, out_len) in [(1, 5), (5, 1), (7, 3), (3, 7), (64, 77)] {
            let weights = bilinear_resample_weights(in_len, out_len);
            for row in weights.chunks(in_len) {
                let total: f64 = row.iter().sum();
                assert_that!(total, close_to(1.0, 1e-12));
            }
        }
    }

    #[test]
    fn test_interpolate_upsample_matches_reference() {
        let device = Default::default();
        let bias: Tensor<TestBackend, 4> = Tensor::from_data([[[[1.0, 2.0], [3.0, 4.0]]]], &device);

        let out = interpolate_bias(bias, 4);
        assert_eq!(out.dims(), [1, 1, 4, 4]);

        // torch.nn.functional.interpolate(x, size=(4, 4), mode="bilinear", align_corners=False)
        assert_close(
            &out.to_data().to_vec::<f32>().unwrap(),
            &[
                1.0, 1.25, 1.75, 2.0, //
                1.5, 1.75, 2.25, 2.5, //
                2.5, 2.75, 3.25, 3.5, //
                3.0, 3.25, 3.75, 4.0,
            ],
            1e-6,
        );
    }

    #[test]
    fn test_interpolate_fractional_upsample_matches_reference() {
        let device = Default::default();
        let bias: Tensor<TestBackend, 4> = Tensor::from_data(
            [[[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]]],
            &device,
        );

        let out = interpolate_bias(bias, 5);
        assert_eq!(out.dims(), [1, 1, 5, 5]);

        // torch.nn.functional.interpolate(x, size=(5, 5), mode="bilinear", align_corners=False)
        assert_close(
            &out.to_data().to_vec::<f32>().unwrap(),
            &[
                1.0, 1.4, 2.0, 2.6, 3.0, //
                2.2, 2.6, 3.2, 3.8, 4.2, //
                4.0, 4.4, 5.0, 5.6, 6.0, //
                5.8, 6.2, 6.8, 7.4, 7.8, //
                7.0, 7.4, 8.0, 8.6, 9.0,
            ],
            1e-5,
        );
    }

    #[test]
    #[should_panic(expected = "in_len must be > 0")]
    fn test_weights_empty_input() {
        let _ = bilinear_resample_weights(0, 3);
    }

    #[test]
    #[should_panic(expected = "out_len must be > 0")]
    fn test_weights_empty_output() {
        let _ = bilinear_resample_weights(3, 0);
    }

    #[test]
    fn test_interpolate_downsample() {
        let device = Default::default();
        let bias: Tensor<TestBackend, 4> = Tensor::from_data(
            [[[
                [1.0, 2.0, 3.0, 4.0],
                [5.0, 6.0, 7.0, 8.0],
                [9.0, 10.0, 11.0, 12.0],
                [13.0, 14.0, 15.0, 16.0],
            ]]],
            &device,
        );

        let out = interpolate_bias(bias, 2);
        assert_close(
            &out.to_data().to_vec::<f32>().unwrap(),
            &[3.5, 5.5, 11.5, 13.5],
            1e-6,
        );
    }

    #[test]
    fn test_interpolate_same_length_is_identity() {
        let device = Default::default();
        let bias: Tensor<TestBackend, 4> = Tensor::from_data(
            [
                [[[0.5, -1.0, 2.0], [3.0, 0.0, -4.5], [1.0, 1.0, 7.25]]],
                [[[9.0, 8.0, 7.0], [6.0, 5.0, 4.0], [3.0, 2.0, 1.0]]],
            ],
            &device,
        );

        let out = interpolate_bias(bias.clone(), 3);
        assert_eq!(out.dims(), [2, 1, 3, 3]);
        assert_close(
            &out.to_data().to_vec::<f32>().unwrap(),
            &bias.to_data().to_vec::<f32>().unwrap(),
            1e-6,
        );
    }

    #[test]
    fn test_interpolate_planes_are_independent() {
        let device = Default::default();
        let ones: Tensor<TestBackend, 4> = Tensor::ones([1, 1, 3, 3], &device);
        let bias = Tensor::cat(vec![ones.clone(), ones.clone() * 2.0, ones * 3.0], 1)
            .repeat_dim(0, 2);
        assert_eq!(bias.dims(), [2, 3, 3, 3]);

        let out = interpolate_bias(bias, 5);
        assert_eq!(out.dims(), [2, 3, 5, 5]);

        let values = out.to_data().to_vec::<f32>().unwrap();
        for (plane, chunk) in values.chunks(25).enumerate() {
            let expected = (plane % 3 + 1) as f32;
            assert_close(chunk, &[expected; 25], 1e-6);
        }
    }
}
