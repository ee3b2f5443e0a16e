//! Threshold selection over bracketed histograms.
//!
//! [`compute_bin`] is the single dispatch point for the computed methods.
//! [`ThresholdSelector`] adds the guards shared by every method and maps a
//! bracketed-local result back to the original intensity domain.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::histogram::BracketedHistogram;
use crate::method::{ThresholdConfigError, ThresholdMethod};
use crate::methods;

/// Threshold value that makes the binarizer pass its input through.
pub const NO_THRESHOLD: f64 = -1.0;

/// Outcome of [`ThresholdSelector::select`], local to the bracketed range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Selection {
    /// 0-based index into the bracketed counts.
    Bin(usize),
    /// User-supplied value, never offset.
    Manual(f64),
    /// The method could not split the histogram.
    Unresolved,
}

impl Selection {
    /// Bracketed-local value; `Unresolved` maps to [`NO_THRESHOLD`].
    pub fn value(self) -> f64 {
        match self {
            Self::Bin(b) => b as f64,
            Self::Manual(v) => v,
            Self::Unresolved => NO_THRESHOLD,
        }
    }
}

/// Run one computed method on bracketed counts.
///
/// Returns `None` for [`ThresholdMethod::Manual`], which has nothing to
/// compute, and for histograms the method cannot split.
pub fn compute_bin(method: ThresholdMethod, counts: &[u64]) -> Option<usize> {
    match method {
        ThresholdMethod::Manual => None,
        ThresholdMethod::IJDefault => methods::ij_default(counts),
        ThresholdMethod::Huang => methods::huang(counts),
        ThresholdMethod::Huang2 => methods::huang2(counts),
        ThresholdMethod::Intermodes => methods::intermodes(counts),
        ThresholdMethod::IsoData => methods::iso_data(counts),
        ThresholdMethod::Li => methods::li(counts),
        ThresholdMethod::MaxEntropy => methods::max_entropy(counts),
        ThresholdMethod::Mean => methods::mean(counts),
        ThresholdMethod::MinErrorI => methods::min_error_i(counts),
        ThresholdMethod::Minimum => methods::minimum(counts),
        ThresholdMethod::Moments => methods::moments(counts),
        ThresholdMethod::Otsu => methods::otsu(counts),
        ThresholdMethod::Percentile => methods::percentile(counts),
        ThresholdMethod::RenyiEntropy => methods::renyi_entropy(counts),
        ThresholdMethod::Shanbhag => methods::shanbhag(counts),
        ThresholdMethod::Triangle => methods::triangle(counts),
        ThresholdMethod::Yen => methods::yen(counts),
    }
    .filter(|&b| b < counts.len())
}

/// A validated method together with its manual value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdSelector {
    method: ThresholdMethod,
    manual_value: Option<f64>,
}

impl ThresholdSelector {
    /// Fails when `Manual` has no finite value. A value given with a computed
    /// method is ignored.
    pub fn new(
        method: ThresholdMethod,
        manual_value: Option<f64>,
    ) -> Result<Self, ThresholdConfigError> {
        if method.is_manual() {
            match manual_value {
                None => return Err(ThresholdConfigError::MissingManualValue),
                Some(v) if !v.is_finite() => {
                    return Err(ThresholdConfigError::NonFiniteManualValue(v))
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            method,
            manual_value: manual_value.filter(|_| method.is_manual()),
        })
    }

    pub fn method(&self) -> ThresholdMethod {
        self.method
    }

    pub fn manual_value(&self) -> Option<f64> {
        self.manual_value
    }

    /// Bracketed-local selection. Fewer than two bins yield `Bin(0)` for
    /// every method, Manual included.
    pub fn select(&self, counts: &[u64]) -> Selection {
        if counts.len() < 2 {
            return Selection::Bin(0);
        }
        match (self.method, self.manual_value) {
            (ThresholdMethod::Manual, Some(v)) => Selection::Manual(v),
            (method, _) => {
                compute_bin(method, counts).map_or(Selection::Unresolved, Selection::Bin)
            }
        }
    }

    /// Threshold in the original intensity domain.
    ///
    /// The fewer-than-two-bins guard comes first for every method, so Manual
    /// yields `0` on a single-valued or empty histogram and its value
    /// otherwise, never offset. Computed methods yield `bin + min_bin`, or
    /// [`NO_THRESHOLD`] when the histogram is empty or the method is
    /// unresolved.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, hist), fields(method = %self.method))
    )]
    pub fn resolve(&self, hist: Option<&BracketedHistogram>) -> f64 {
        let manual = self.method.is_manual();
        let Some(hist) = hist else {
            log::debug!("{}: empty histogram, no threshold", self.method);
            return if manual { 0.0 } else { NO_THRESHOLD };
        };
        match self.select(hist.counts()) {
            Selection::Bin(b) if manual => b as f64,
            Selection::Bin(b) => (b + hist.min_bin()) as f64,
            Selection::Manual(v) => v,
            Selection::Unresolved => {
                log::debug!(
                    "{}: histogram over [{}, {}] not separable",
                    self.method,
                    hist.min_bin(),
                    hist.max_bin()
                );
                NO_THRESHOLD
            }
        }
    }
}

/// One-shot bracketed-local selection: validates the method and returns the
/// raw value (`-1` when unresolved).
pub fn select(
    method: ThresholdMethod,
    hist: &BracketedHistogram,
    manual_value: Option<f64>,
) -> Result<f64, ThresholdConfigError> {
    let selector = ThresholdSelector::new(method, manual_value)?;
    Ok(selector.select(hist.counts()).value())
}
