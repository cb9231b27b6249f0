//! Output pixel types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Error parsing a pixel type keyword.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown pixel type '{0}' - expected one of 8_BIT_UNSIGNED, 8_BIT_SIGNED, 16_BIT_UNSIGNED, 16_BIT_SIGNED, 32_BIT_UNSIGNED, 32_BIT_SIGNED, 32_BIT_FLOAT, 64_BIT")]
pub struct ParsePixelTypeError(pub String);

/// Bit depth and sample format of the output raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PixelType {
    #[serde(rename = "8_BIT_UNSIGNED")]
    Unsigned8,
    #[serde(rename = "8_BIT_SIGNED")]
    Signed8,
    #[serde(rename = "16_BIT_UNSIGNED")]
    Unsigned16,
    #[serde(rename = "16_BIT_SIGNED")]
    Signed16,
    #[serde(rename = "32_BIT_UNSIGNED")]
    Unsigned32,
    #[serde(rename = "32_BIT_SIGNED")]
    Signed32,
    #[default]
    #[serde(rename = "32_BIT_FLOAT")]
    Float32,
    #[serde(rename = "64_BIT")]
    Float64,
}

impl PixelType {
    pub const ALL: [PixelType; 8] = [
        PixelType::Unsigned8,
        PixelType::Signed8,
        PixelType::Unsigned16,
        PixelType::Signed16,
        PixelType::Unsigned32,
        PixelType::Signed32,
        PixelType::Float32,
        PixelType::Float64,
    ];

    /// Tool keyword for this pixel type.
    pub fn keyword(self) -> &'static str {
        match self {
            PixelType::Unsigned8 => "8_BIT_UNSIGNED",
            PixelType::Signed8 => "8_BIT_SIGNED",
            PixelType::Unsigned16 => "16_BIT_UNSIGNED",
            PixelType::Signed16 => "16_BIT_SIGNED",
            PixelType::Unsigned32 => "32_BIT_UNSIGNED",
            PixelType::Signed32 => "32_BIT_SIGNED",
            PixelType::Float32 => "32_BIT_FLOAT",
            PixelType::Float64 => "64_BIT",
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, PixelType::Float32 | PixelType::Float64)
    }

    /// Value range representable by this type.
    pub fn range(self) -> (f64, f64) {
        match self {
            PixelType::Unsigned8 => (0.0, u8::MAX as f64),
            PixelType::Signed8 => (i8::MIN as f64, i8::MAX as f64),
            PixelType::Unsigned16 => (0.0, u16::MAX as f64),
            PixelType::Signed16 => (i16::MIN as f64, i16::MAX as f64),
            PixelType::Unsigned32 => (0.0, u32::MAX as f64),
            PixelType::Signed32 => (i32::MIN as f64, i32::MAX as f64),
            PixelType::Float32 => (f32::MIN as f64, f32::MAX as f64),
            PixelType::Float64 => (f64::MIN, f64::MAX),
        }
    }

    /// Value written to cells no input covers.
    ///
    /// NaN for float types, the maximum for unsigned types and the minimum
    /// for signed types.
    pub fn nodata(self) -> f64 {
        match self {
            PixelType::Float32 | PixelType::Float64 => f64::NAN,
            PixelType::Unsigned8 | PixelType::Unsigned16 | PixelType::Unsigned32 => {
                self.range().1
            }
            PixelType::Signed8 | PixelType::Signed16 | PixelType::Signed32 => self.range().0,
        }
    }

    /// Convert a mosaic value to this type's domain.
    ///
    /// Integer types round to nearest and clamp; NaN maps to nodata.
    pub fn quantize(self, value: f64) -> f64 {
        if value.is_nan() {
            return self.nodata();
        }
        if self.is_float() {
            return value;
        }
        let (min, max) = self.range();
        value.round().clamp(min, max)
    }
}

impl FromStr for PixelType {
    type Err = ParsePixelTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        PixelType::ALL
            .into_iter()
            .find(|p| p.keyword() == upper)
            .ok_or_else(|| ParsePixelTypeError(s.to_string()))
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_float32() {
        assert_eq!(PixelType::default(), PixelType::Float32);
        assert_eq!(PixelType::default().keyword(), "32_BIT_FLOAT");
    }

    #[test]
    fn test_parse_keywords() {
        for pixel in PixelType::ALL {
            assert_eq!(pixel.keyword().parse::<PixelType>().unwrap(), pixel);
        }
        assert_eq!("32_bit_float".parse::<PixelType>().unwrap(), PixelType::Float32);
        assert!("128_BIT".parse::<PixelType>().is_err());
    }

    #[test]
    fn test_quantize_integer_types() {
        assert_eq!(PixelType::Unsigned8.quantize(12.6), 13.0);
        assert_eq!(PixelType::Unsigned8.quantize(300.0), 255.0);
        assert_eq!(PixelType::Unsigned8.quantize(-4.0), 0.0);
        assert_eq!(PixelType::Signed16.quantize(-40000.0), -32768.0);
    }

    #[test]
    fn test_quantize_float_passthrough() {
        assert_eq!(PixelType::Float32.quantize(1.25), 1.25);
        assert!(PixelType::Float64.quantize(f64::NAN).is_nan());
    }

    #[test]
    fn test_nodata_values() {
        assert!(PixelType::Float32.nodata().is_nan());
        assert_eq!(PixelType::Unsigned8.nodata(), 255.0);
        assert_eq!(PixelType::Signed32.nodata(), i32::MIN as f64);
        assert_eq!(PixelType::Unsigned16.quantize(f64::NAN), 65535.0);
    }
}
