//! # Conditioning Payload Kinds
//!
//! A payload is [`ConditioningKind::Structured`] when it is a mapping holding all of
//! ``pooled_output``, ``cond_pooled`` and ``cross_attn_kwargs``; everything else is
//! [`ConditioningKind::Opaque`] and is never touched.

use crate::conditioning::{
    ATTENTION_BIAS_KEY, COND_POOLED_KEY, CROSS_ATTN_KWARGS_KEY, CondMap, CondValue,
    POOLED_OUTPUT_KEY,
};
use burn::prelude::Backend;

/// Keys whose joint presence marks a payload as structured.
pub const STRUCTURED_KEYS: [&str; 3] = [POOLED_OUTPUT_KEY, COND_POOLED_KEY, CROSS_ATTN_KWARGS_KEY];

/// Classification of a conditioning payload.
#[derive(Debug)]
pub enum ConditioningKind<'a, B: Backend> {
    /// A text-encoder payload eligible for bias resizing.
    Structured(StructuredPayload<'a, B>),

    /// Anything else.
    Opaque,
}

impl<'a, B: Backend> ConditioningKind<'a, B> {
    /// Classify a payload.
    pub fn of(payload: &'a CondValue<B>) -> Self {
        match payload.as_map() {
            Some(fields) if STRUCTURED_KEYS.iter().all(|k| fields.contains_key(*k)) => {
                ConditioningKind::Structured(StructuredPayload { fields })
            }
            _ => ConditioningKind::Opaque,
        }
    }
}

/// Borrowed view of a structured payload.
#[derive(Debug)]
pub struct StructuredPayload<'a, B: Backend> {
    fields: &'a CondMap<B>,
}

impl<'a, B: Backend> StructuredPayload<'a, B> {
    /// All payload fields.
    pub fn fields(&self) -> &'a CondMap<B> {
        self.fields
    }

    /// The ``cross_attn_kwargs`` mapping.
    ///
    /// ``None`` when the field is null, or is not a mapping.
    pub fn cross_attn_kwargs(&self) -> Option<&'a CondMap<B>> {
        self.fields.get(CROSS_ATTN_KWARGS_KEY).and_then(CondValue::as_map)
    }

    /// The ``cross_attn_kwargs.attention_bias`` value, skipping null.
    pub fn attention_bias(&self) -> Option<&'a CondValue<B>> {
        self.cross_attn_kwargs()?
            .get(ATTENTION_BIAS_KEY)
            .filter(|v| !v.is_null())
    }
}
