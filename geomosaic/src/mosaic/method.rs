//! Mosaic methods (overlap resolution rules).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Error parsing a mosaic method keyword or label.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown mosaic method '{0}' - expected one of LAST, FIRST, BLEND, MEAN, MINIMUM, MAXIMUM")]
pub struct ParseMethodError(pub String);

/// Rule used to resolve cells where input rasters overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MosaicMethod {
    /// The last input covering a cell wins.
    #[default]
    Last,
    /// The first input covering a cell wins.
    First,
    /// Distance-weighted blend across the overlap.
    Blend,
    /// Mean of the overlapping values.
    Mean,
    /// Smallest overlapping value.
    Minimum,
    /// Largest overlapping value.
    Maximum,
}

impl MosaicMethod {
    /// All methods in dropdown order.
    pub const ALL: [MosaicMethod; 6] = [
        MosaicMethod::Last,
        MosaicMethod::First,
        MosaicMethod::Blend,
        MosaicMethod::Mean,
        MosaicMethod::Minimum,
        MosaicMethod::Maximum,
    ];

    /// Tool keyword for this method.
    pub fn keyword(self) -> &'static str {
        match self {
            MosaicMethod::Last => "LAST",
            MosaicMethod::First => "FIRST",
            MosaicMethod::Blend => "BLEND",
            MosaicMethod::Mean => "MEAN",
            MosaicMethod::Minimum => "MINIMUM",
            MosaicMethod::Maximum => "MAXIMUM",
        }
    }

    /// Dropdown label: keyword followed by a short description.
    pub fn label(self) -> &'static str {
        match self {
            MosaicMethod::Last => "LAST - 后值覆盖前值",
            MosaicMethod::First => "FIRST - 前值优先",
            MosaicMethod::Blend => "BLEND - 混合",
            MosaicMethod::Mean => "MEAN - 平均值",
            MosaicMethod::Minimum => "MINIMUM - 最小值",
            MosaicMethod::Maximum => "MAXIMUM - 最大值",
        }
    }

    /// All dropdown labels in order.
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.label()).collect()
    }

    /// Parse a dropdown label by its leading token.
    ///
    /// Everything after the first space is descriptive text and ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use geomosaic::mosaic::MosaicMethod;
    ///
    /// assert_eq!(MosaicMethod::from_label("MEAN - 平均值").unwrap(), MosaicMethod::Mean);
    /// assert_eq!(MosaicMethod::from_label("FIRST").unwrap(), MosaicMethod::First);
    /// ```
    pub fn from_label(label: &str) -> Result<Self, ParseMethodError> {
        leading_token(label).parse()
    }
}

/// The first space-delimited token of a label.
fn leading_token(label: &str) -> &str {
    label.trim_start().split(' ').next().unwrap_or_default()
}

impl FromStr for MosaicMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LAST" => Ok(MosaicMethod::Last),
            "FIRST" => Ok(MosaicMethod::First),
            "BLEND" => Ok(MosaicMethod::Blend),
            "MEAN" => Ok(MosaicMethod::Mean),
            "MINIMUM" => Ok(MosaicMethod::Minimum),
            "MAXIMUM" => Ok(MosaicMethod::Maximum),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}

impl fmt::Display for MosaicMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_label_reduces_to_keyword() {
        let method = MosaicMethod::from_label("MEAN - 平均值").unwrap();
        assert_eq!(method.keyword(), "MEAN");
    }

    #[test]
    fn test_all_labels_round_trip() {
        for method in MosaicMethod::ALL {
            let parsed = MosaicMethod::from_label(method.label()).unwrap();
            assert_eq!(parsed, method);
            assert_eq!(parsed.keyword(), method.label().split(' ').next().unwrap());
        }
    }

    #[test]
    fn test_default_is_last() {
        assert_eq!(MosaicMethod::default(), MosaicMethod::Last);
        assert_eq!(MosaicMethod::labels()[0], "LAST - 后值覆盖前值");
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert!("mean".parse::<MosaicMethod>().is_err());
        assert!(MosaicMethod::from_label("Mean - average").is_err());
    }

    #[test]
    fn test_unknown_label() {
        let err = MosaicMethod::from_label("MEDIAN - 中值").unwrap_err();
        assert_eq!(err, ParseMethodError("MEDIAN".to_string()));
        assert!(MosaicMethod::from_label("").is_err());
    }

    #[test]
    fn test_display_is_keyword() {
        assert_eq!(MosaicMethod::Maximum.to_string(), "MAXIMUM");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_trailing_description_is_ignored(
                index in 0usize..6,
                description in "[^ ]{0,12}( [^ ]{0,12}){0,3}"
            ) {
                let method = MosaicMethod::ALL[index];
                let label = format!("{} {}", method.keyword(), description);
                prop_assert_eq!(MosaicMethod::from_label(&label)?, method);
            }
        }
    }
}
