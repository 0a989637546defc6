//! Shared test helpers.
use crate::conditioning::{CondValue, DynTensor};
use burn::prelude::Backend;

/// Assert two float slices are element-wise within `tolerance`.
pub fn assert_close(
    actual: &[f32],
    expected: &[f32],
    tolerance: f32,
) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (idx, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "index {idx}: {a} != {e} (tolerance {tolerance})"
        );
    }
}

/// Assert two tensors have the same rank, shape and values.
pub fn assert_same_tensor<B: Backend>(
    actual: &DynTensor<B>,
    expected: &DynTensor<B>,
) {
    assert_eq!(actual.dims(), expected.dims(), "shape mismatch");
    let (a, e) = match (actual, expected) {
        (DynTensor::Rank1(a), DynTensor::Rank1(e)) => (a.to_data(), e.to_data()),
        (DynTensor::Rank2(a), DynTensor::Rank2(e)) => (a.to_data(), e.to_data()),
        (DynTensor::Rank3(a), DynTensor::Rank3(e)) => (a.to_data(), e.to_data()),
        (DynTensor::Rank4(a), DynTensor::Rank4(e)) => (a.to_data(), e.to_data()),
        (DynTensor::Rank5(a), DynTensor::Rank5(e)) => (a.to_data(), e.to_data()),
        _ => unreachable!("dims matched but ranks differ"),
    };
    a.assert_eq(&e, true);
}

/// Assert two conditioning values are equal by value.
pub fn assert_same_value<B: Backend>(
    actual: &CondValue<B>,
    expected: &CondValue<B>,
) {
    match (actual, expected) {
        (CondValue::Null, CondValue::Null) => {}
        (CondValue::Bool(a), CondValue::Bool(e)) => assert_eq!(a, e),
        (CondValue::Int(a), CondValue::Int(e)) => assert_eq!(a, e),
        (CondValue::Float(a), CondValue::Float(e)) => assert_eq!(a.to_bits(), e.to_bits()),
        (CondValue::Text(a), CondValue::Text(e)) => assert_eq!(a, e),
        (CondValue::Tensor(a), CondValue::Tensor(e)) => assert_same_tensor(a, e),
        (CondValue::List(a), CondValue::List(e)) => {
            assert_eq!(a.len(), e.len(), "list length mismatch");
            for (a, e) in a.iter().zip(e) {
                assert_same_value(a, e);
            }
        }
        (CondValue::Map(a), CondValue::Map(e)) => {
            assert_eq!(
                a.keys().collect::<Vec<_>>(),
                e.keys().collect::<Vec<_>>(),
                "map keys mismatch"
            );
            for (key, a) in a {
                assert_same_value(a, &e[key]);
            }
        }
        (a, e) => panic!("{} != {}", a.type_name(), e.type_name()),
    }
}
