//! The closed set of threshold methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Threshold selection method.
///
/// Names match the classical ImageJ auto-threshold family and parse
/// case-sensitively (`"Otsu"`, `"IJDefault"`, `"MinErrorI"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ThresholdMethod {
    /// Externally supplied value, used verbatim.
    Manual,
    /// ImageJ's modified IsoData ("Default" in the threshold dialog).
    IJDefault,
    Huang,
    /// Huang's method with cumulative sums, fast on 16-bit histograms.
    Huang2,
    Intermodes,
    IsoData,
    Li,
    MaxEntropy,
    Mean,
    MinErrorI,
    Minimum,
    Moments,
    Otsu,
    Percentile,
    RenyiEntropy,
    Shanbhag,
    Triangle,
    Yen,
}

impl ThresholdMethod {
    pub const ALL: [ThresholdMethod; 18] = [
        Self::Manual,
        Self::IJDefault,
        Self::Huang,
        Self::Huang2,
        Self::Intermodes,
        Self::IsoData,
        Self::Li,
        Self::MaxEntropy,
        Self::Mean,
        Self::MinErrorI,
        Self::Minimum,
        Self::Moments,
        Self::Otsu,
        Self::Percentile,
        Self::RenyiEntropy,
        Self::Shanbhag,
        Self::Triangle,
        Self::Yen,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::IJDefault => "IJDefault",
            Self::Huang => "Huang",
            Self::Huang2 => "Huang2",
            Self::Intermodes => "Intermodes",
            Self::IsoData => "IsoData",
            Self::Li => "Li",
            Self::MaxEntropy => "MaxEntropy",
            Self::Mean => "Mean",
            Self::MinErrorI => "MinErrorI",
            Self::Minimum => "Minimum",
            Self::Moments => "Moments",
            Self::Otsu => "Otsu",
            Self::Percentile => "Percentile",
            Self::RenyiEntropy => "RenyiEntropy",
            Self::Shanbhag => "Shanbhag",
            Self::Triangle => "Triangle",
            Self::Yen => "Yen",
        }
    }

    pub fn is_manual(self) -> bool {
        self == Self::Manual
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Invalid threshold configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ThresholdConfigError {
    #[error("unknown threshold method '{0}'")]
    UnknownMethod(String),
    #[error("threshold method Manual requires a threshold value")]
    MissingManualValue,
    #[error("manual threshold value must be finite, got {0}")]
    NonFiniteManualValue(f64),
}

impl FromStr for ThresholdMethod {
    type Err = ThresholdConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| ThresholdConfigError::UnknownMethod(s.to_string()))
    }
}

impl TryFrom<String> for ThresholdMethod {
    type Error = ThresholdConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_parses_back() {
        for m in ThresholdMethod::ALL {
            assert_eq!(m.name().parse::<ThresholdMethod>().unwrap(), m);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert_eq!(
            "otsu".parse::<ThresholdMethod>(),
            Err(ThresholdConfigError::UnknownMethod("otsu".into()))
        );
        assert!("Invalid".parse::<ThresholdMethod>().is_err());
    }

    #[test]
    fn serde_uses_method_names() {
        let json = serde_json::to_string(&ThresholdMethod::MinErrorI).unwrap();
        assert_eq!(json, "\"MinErrorI\"");
        let m: ThresholdMethod = serde_json::from_str("\"RenyiEntropy\"").unwrap();
        assert_eq!(m, ThresholdMethod::RenyiEntropy);
    }
}
