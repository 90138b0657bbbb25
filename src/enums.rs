use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample width of a volume's pixel data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitDepth {
    #[default]
    Eight,
    Sixteen,
}

impl BitDepth {
    /// Largest sample value representable at this depth
    pub fn max_value(self) -> u16 {
        match self {
            BitDepth::Eight => u8::MAX as u16,
            BitDepth::Sixteen => u16::MAX,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unsupported bit depth: {0} (expected 8 or 16)")]
pub struct UnsupportedBitDepth(pub u8);

impl TryFrom<u8> for BitDepth {
    type Error = UnsupportedBitDepth;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            other => Err(UnsupportedBitDepth(other)),
        }
    }
}

/// How the samples of a volume should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelKind {
    /// 8-bit data holding only 0 and 255
    Binary,
    Grayscale,
}
