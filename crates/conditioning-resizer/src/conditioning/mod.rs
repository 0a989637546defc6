//! # Conditioning Value Model
//!
//! Conditioning payloads are loosely structured trees of tensors and scalars.
//! [`CondValue`] is the dynamic value type for those trees; [`ConditioningEntry`]
//! pairs a payload with its auxiliary value.
//!
//! Cloning a [`CondValue`] builds new maps and lists, but tensor handles share
//! storage with the source; burn tensors are never mutated in place, so the
//! clone is a shallow copy in the sense the resizer needs.

pub mod kind;

use burn::prelude::{Backend, Tensor};
use std::collections::BTreeMap;

/// Payload key: pooled text-encoder output.
pub const POOLED_OUTPUT_KEY: &str = "pooled_output";

/// Payload key: pooled conditioning.
pub const COND_POOLED_KEY: &str = "cond_pooled";

/// Payload key: cross-attention keyword arguments.
pub const CROSS_ATTN_KWARGS_KEY: &str = "cross_attn_kwargs";

/// ``cross_attn_kwargs`` key: the attention bias tensor.
pub const ATTENTION_BIAS_KEY: &str = "attention_bias";

/// Mapping node of a conditioning tree.
pub type CondMap<B> = BTreeMap<String, CondValue<B>>;

/// A float tensor of rank 1 through 5, with the rank known only at runtime.
#[derive(Debug, Clone)]
pub enum DynTensor<B: Backend> {
    /// Rank-1 tensor.
    Rank1(Tensor<B, 1>),

    /// Rank-2 tensor.
    Rank2(Tensor<B, 2>),

    /// Rank-3 tensor.
    Rank3(Tensor<B, 3>),

    /// Rank-4 tensor.
    Rank4(Tensor<B, 4>),

    /// Rank-5 tensor.
    Rank5(Tensor<B, 5>),
}

impl<B: Backend> DynTensor<B> {
    /// The number of dimensions.
    pub fn rank(&self) -> usize {
        match self {
            DynTensor::Rank1(_) => 1,
            DynTensor::Rank2(_) => 2,
            DynTensor::Rank3(_) => 3,
            DynTensor::Rank4(_) => 4,
            DynTensor::Rank5(_) => 5,
        }
    }

    /// The dimensions, outermost first.
    pub fn dims(&self) -> Vec<usize> {
        match self {
            DynTensor::Rank1(t) => t.dims().to_vec(),
            DynTensor::Rank2(t) => t.dims().to_vec(),
            DynTensor::Rank3(t) => t.dims().to_vec(),
            DynTensor::Rank4(t) => t.dims().to_vec(),
            DynTensor::Rank5(t) => t.dims().to_vec(),
        }
    }

    /// The device the tensor lives on.
    pub fn device(&self) -> B::Device {
        match self {
            DynTensor::Rank1(t) => t.device(),
            DynTensor::Rank2(t) => t.device(),
            DynTensor::Rank3(t) => t.device(),
            DynTensor::Rank4(t) => t.device(),
            DynTensor::Rank5(t) => t.device(),
        }
    }
}

macro_rules! impl_dyn_tensor_from {
    ($rank:literal, $variant:ident) => {
        impl<B: Backend> From<Tensor<B, $rank>> for DynTensor<B> {
            fn from(tensor: Tensor<B, $rank>) -> Self {
                DynTensor::$variant(tensor)
            }
        }

        impl<B: Backend> From<Tensor<B, $rank>> for CondValue<B> {
            fn from(tensor: Tensor<B, $rank>) -> Self {
                CondValue::Tensor(DynTensor::$variant(tensor))
            }
        }
    };
}

impl_dyn_tensor_from!(1, Rank1);
impl_dyn_tensor_from!(2, Rank2);
impl_dyn_tensor_from!(3, Rank3);
impl_dyn_tensor_from!(4, Rank4);
impl_dyn_tensor_from!(5, Rank5);

/// A node in a conditioning tree.
#[derive(Debug, Clone, Default)]
pub enum CondValue<B: Backend> {
    /// Explicit null.
    #[default]
    Null,

    /// Boolean flag.
    Bool(bool),

    /// Integer scalar.
    Int(i64),

    /// Float scalar.
    Float(f64),

    /// String value.
    Text(String),

    /// Float tensor.
    Tensor(DynTensor<B>),

    /// Ordered sequence.
    List(Vec<CondValue<B>>),

    /// String-keyed mapping.
    Map(CondMap<B>),
}

impl<B: Backend> CondValue<B> {
    /// Is this [`CondValue::Null`]?
    pub fn is_null(&self) -> bool {
        matches!(self, CondValue::Null)
    }

    /// View as a mapping, if this is one.
    pub fn as_map(&self) -> Option<&CondMap<B>> {
        match self {
            CondValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// View as a tensor, if this is one.
    pub fn as_tensor(&self) -> Option<&DynTensor<B>> {
        match self {
            CondValue::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    /// Short variant name, for logs and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CondValue::Null => "null",
            CondValue::Bool(_) => "bool",
            CondValue::Int(_) => "int",
            CondValue::Float(_) => "float",
            CondValue::Text(_) => "text",
            CondValue::Tensor(_) => "tensor",
            CondValue::List(_) => "list",
            CondValue::Map(_) => "map",
        }
    }
}

impl<B: Backend> From<CondMap<B>> for CondValue<B> {
    fn from(map: CondMap<B>) -> Self {
        CondValue::Map(map)
    }
}

impl<B: Backend> From<DynTensor<B>> for CondValue<B> {
    fn from(tensor: DynTensor<B>) -> Self {
        CondValue::Tensor(tensor)
    }
}

impl<B: Backend> From<bool> for CondValue<B> {
    fn from(value: bool) -> Self {
        CondValue::Bool(value)
    }
}

impl<B: Backend> From<i64> for CondValue<B> {
    fn from(value: i64) -> Self {
        CondValue::Int(value)
    }
}

impl<B: Backend> From<f64> for CondValue<B> {
    fn from(value: f64) -> Self {
        CondValue::Float(value)
    }
}

impl<B: Backend> From<&str> for CondValue<B> {
    fn from(value: &str) -> Self {
        CondValue::Text(value.to_string())
    }
}

impl<B: Backend> From<String> for CondValue<B> {
    fn from(value: String) -> Self {
        CondValue::Text(value)
    }
}

impl<B: Backend, V: Into<CondValue<B>>> From<Vec<V>> for CondValue<B> {
    fn from(values: Vec<V>) -> Self {
        CondValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// One guidance signal: a payload and its auxiliary value.
#[derive(Debug, Clone)]
pub struct ConditioningEntry<B: Backend> {
    /// The conditioning payload; inspected by the resizer.
    pub payload: CondValue<B>,

    /// Auxiliary data; always passed through untouched.
    pub auxiliary: CondValue<B>,
}

impl<B: Backend> ConditioningEntry<B> {
    /// Create a new entry.
    pub fn new<P, A>(
        payload: P,
        auxiliary: A,
    ) -> Self
    where
        P: Into<CondValue<B>>,
        A: Into<CondValue<B>>,
    {
        Self {
            payload: payload.into(),
            auxiliary: auxiliary.into(),
        }
    }
}

impl<B: Backend, P, A> From<(P, A)> for ConditioningEntry<B>
where
    P: Into<CondValue<B>>,
    A: Into<CondValue<B>>,
{
    fn from((payload, auxiliary): (P, A)) -> Self {
        Self::new(payload, auxiliary)
    }
}
