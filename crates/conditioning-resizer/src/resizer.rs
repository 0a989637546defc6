//! # Conditioning Resizer
//!
//! [`ConditioningResizer`] rewrites ``cross_attn_kwargs.attention_bias`` in every
//! structured conditioning payload to ``[batch, heads, target_length, target_length]``.
//!
//! Per entry:
//! * [`ConditioningKind::Opaque`] payloads are returned as-is.
//! * Structured payloads are copied; a null ``cross_attn_kwargs`` stays null.
//! * Otherwise ``cross_attn_kwargs`` is copied, and a non-null ``attention_bias``
//!   is replaced by its resized version.
//!
//! The auxiliary value is always carried through unchanged.

use crate::conditioning::kind::{ConditioningKind, StructuredPayload};
use crate::conditioning::{
    ATTENTION_BIAS_KEY, CROSS_ATTN_KWARGS_KEY, CondMap, CondValue, ConditioningEntry,
};
use crate::errors::ResizeError;
use crate::ops::{interpolate_bias, pad_or_trim_bias, square_bias};
use burn::config::Config;
use burn::prelude::{Backend, Tensor};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Default ``target_length``.
pub const DEFAULT_TARGET_LENGTH: usize = 5273;

/// Largest ``target_length`` accepted by [`ConditioningResizerConfig::init`].
pub const MAX_TARGET_LENGTH: usize = 10000;

/// Bound on ``|pad_value|`` accepted by [`ConditioningResizerConfig::init`].
pub const PAD_VALUE_LIMIT: f64 = 100.0;

/// Attention bias resize policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMethod {
    /// Copy the overlapping top-left block; fill the rest with ``pad_value``.
    #[default]
    PadOrTrim,

    /// Bilinear resampling with pixel-center alignment.
    Interpolate,
}

impl ResizeMethod {
    /// All methods, in declaration order.
    pub const ALL: [ResizeMethod; 2] = [ResizeMethod::PadOrTrim, ResizeMethod::Interpolate];

    /// The literal name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMethod::PadOrTrim => "pad_or_trim",
            ResizeMethod::Interpolate => "interpolate",
        }
    }
}

impl Display for ResizeMethod {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeMethod {
    type Err = ResizeError;

    fn from_str(s: &str) -> crate::errors::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                ResizeError::InvalidParameter(format!(
                    "unknown resize_method {s:?}; expected one of \"pad_or_trim\", \"interpolate\""
                ))
            })
    }
}

/// [`ConditioningResizer`] Config.
///
/// The defaults and ranges are those a host pipeline exposes:
/// * ``target_length``: default 5273, range ``[1, 10000]``.
/// * ``resize_method``: default ``pad_or_trim``.
/// * ``pad_value``: default 0.0, range ``[-100.0, 100.0]``.
#[derive(Config, Debug)]
pub struct ConditioningResizerConfig {
    /// The sequence length of the resized bias.
    #[config(default = 5273)]
    pub target_length: usize,

    /// The resize policy.
    #[config(default = "ResizeMethod::PadOrTrim")]
    pub resize_method: ResizeMethod,

    /// The fill value for [`ResizeMethod::PadOrTrim`].
    #[config(default = 0.0)]
    pub pad_value: f64,
}

impl ConditioningResizerConfig {
    /// Check the parameters against the boundary ranges.
    ///
    /// # Errors
    ///
    /// [`ResizeError::InvalidParameter`] for an out-of-range parameter.
    pub fn validate(&self) -> crate::errors::Result<()> {
        if !(1..=MAX_TARGET_LENGTH).contains(&self.target_length) {
            return Err(ResizeError::InvalidParameter(format!(
                "target_length={} outside [1, {MAX_TARGET_LENGTH}]",
                self.target_length
            )));
        }
        if !(-PAD_VALUE_LIMIT..=PAD_VALUE_LIMIT).contains(&self.pad_value) {
            return Err(ResizeError::InvalidParameter(format!(
                "pad_value={} outside [-{PAD_VALUE_LIMIT}, {PAD_VALUE_LIMIT}]",
                self.pad_value
            )));
        }
        Ok(())
    }

    /// Initialize a [`ConditioningResizer`].
    ///
    /// # Errors
    ///
    /// [`ResizeError::InvalidParameter`] for an out-of-range parameter.
    pub fn init(&self) -> crate::errors::Result<ConditioningResizer> {
        self.validate()?;
        ConditioningResizer::new(self.target_length, self.resize_method, self.pad_value)
    }
}

/// Attention bias resizer for conditioning lists.
///
/// Stateless; one resizer may be reused across calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditioningResizer {
    target_length: usize,
    resize_method: ResizeMethod,
    pad_value: f64,
}

impl ConditioningResizer {
    /// Create a resizer.
    ///
    /// Unlike [`ConditioningResizerConfig::init`], only the hard preconditions are
    /// checked: ``target_length >= 1`` and a finite ``pad_value``.
    ///
    /// # Errors
    ///
    /// [`ResizeError::InvalidParameter`] if a precondition fails.
    pub fn new(
        target_length: usize,
        resize_method: ResizeMethod,
        pad_value: f64,
    ) -> crate::errors::Result<Self> {
        if target_length < 1 {
            return Err(ResizeError::InvalidParameter(format!(
                "target_length={target_length} must be >= 1"
            )));
        }
        if !pad_value.is_finite() {
            return Err(ResizeError::InvalidParameter(format!(
                "pad_value={pad_value} must be finite"
            )));
        }
        Ok(Self {
            target_length,
            resize_method,
            pad_value,
        })
    }

    /// The target sequence length.
    pub fn target_length(&self) -> usize {
        self.target_length
    }

    /// The resize policy.
    pub fn resize_method(&self) -> ResizeMethod {
        self.resize_method
    }

    /// The pad fill value.
    pub fn pad_value(&self) -> f64 {
        self.pad_value
    }

    /// Resize every entry of a conditioning list.
    ///
    /// # Returns
    ///
    /// A new list, same length and order as `entries`.
    ///
    /// # Errors
    ///
    /// The first [`ResizeError::InvalidShape`] hit; no partial list is returned.
    #[tracing::instrument(
        skip_all,
        fields(
            entries = entries.len(),
            target_length = self.target_length,
            method = %self.resize_method,
        )
    )]
    pub fn resize<B: Backend>(
        &self,
        entries: &[ConditioningEntry<B>],
    ) -> crate::errors::Result<Vec<ConditioningEntry<B>>> {
        entries
            .iter()
            .map(|entry| self.resize_entry(entry))
            .collect()
    }

    /// Resize a single conditioning entry.
    ///
    /// # Errors
    ///
    /// [`ResizeError::InvalidShape`] if the entry carries a malformed bias.
    pub fn resize_entry<B: Backend>(
        &self,
        entry: &ConditioningEntry<B>,
    ) -> crate::errors::Result<ConditioningEntry<B>> {
        match ConditioningKind::of(&entry.payload) {
            ConditioningKind::Opaque => {
                tracing::trace!(payload = entry.payload.type_name(), "passing through");
                Ok(entry.clone())
            }
            ConditioningKind::Structured(payload) => Ok(ConditioningEntry {
                payload: self.resize_payload(&payload)?.into(),
                auxiliary: entry.auxiliary.clone(),
            }),
        }
    }

    fn resize_payload<B: Backend>(
        &self,
        payload: &StructuredPayload<'_, B>,
    ) -> crate::errors::Result<CondMap<B>> {
        let mut resized = payload.fields().clone();

        let Some(cross_attn) = payload.cross_attn_kwargs() else {
            return Ok(resized);
        };
        let mut cross_attn = cross_attn.clone();

        if let Some(bias) = payload.attention_bias() {
            let bias = self.resize_bias(bias)?;
            cross_attn.insert(ATTENTION_BIAS_KEY.to_string(), bias.into());
        }

        resized.insert(CROSS_ATTN_KWARGS_KEY.to_string(), cross_attn.into());
        Ok(resized)
    }

    /// Resize one attention bias value.
    ///
    /// # Arguments
    ///
    /// - `bias`: must be a ``[batch, heads, seq, seq]`` tensor.
    ///
    /// # Returns
    ///
    /// A new ``[batch, heads, target_length, target_length]`` tensor, same device.
    ///
    /// # Errors
    ///
    /// [`ResizeError::InvalidShape`] if `bias` is malformed.
    pub fn resize_bias<B: Backend>(
        &self,
        bias: &CondValue<B>,
    ) -> crate::errors::Result<Tensor<B, 4>> {
        let bias = square_bias(bias)?;
        let source = bias.dims();

        let resized = match self.resize_method {
            ResizeMethod::PadOrTrim => pad_or_trim_bias(bias, self.target_length, self.pad_value),
            ResizeMethod::Interpolate => interpolate_bias(bias, self.target_length),
        };

        tracing::debug!(
            ?source,
            target = ?resized.dims(),
            method = %self.resize_method,
            "resized attention bias"
        );
        Ok(resized)
    }
}

/// Resize the attention biases of a conditioning list.
///
/// Shorthand for [`ConditioningResizer::new`] followed by [`ConditioningResizer::resize`].
///
/// # Errors
///
/// [`ResizeError::InvalidParameter`] before any work is done, or the first
/// [`ResizeError::InvalidShape`].
pub fn resize_conditioning<B: Backend>(
    entries: &[ConditioningEntry<B>],
    target_length: usize,
    resize_method: ResizeMethod,
    pad_value: f64,
) -> crate::errors::Result<Vec<ConditioningEntry<B>>> {
    ConditioningResizer::new(target_length, resize_method, pad_value)?.resize(entries)
}
