use crate::{
    catalog::RoiCatalog,
    enums::{BitDepth, PixelKind, UnsupportedBitDepth},
    volume::{Calibration, Volume},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VolumeFractionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<UnsupportedBitDepth> for VolumeFractionError {
    fn from(err: UnsupportedBitDepth) -> Self {
        VolumeFractionError::UnsupportedFormat(err.to_string())
    }
}

/// Inclusive band of sample values counted as foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub min: u16,
    pub max: u16,
}

impl ThresholdBand {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// White pixels of a binary {0, 255} volume
    pub const fn binary() -> Self {
        Self::new(128, 255)
    }

    /// Every value representable at `bit_depth`
    pub fn full_range(bit_depth: BitDepth) -> Self {
        Self::new(0, bit_depth.max_value())
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn validate(&self, bit_depth: BitDepth) -> Result<(), VolumeFractionError> {
        if self.min > self.max {
            return Err(VolumeFractionError::InvalidThreshold(format!(
                "minimum {} is greater than maximum {}",
                self.min, self.max
            )));
        }
        let limit = bit_depth.max_value();
        if self.max > limit {
            return Err(VolumeFractionError::InvalidThreshold(format!(
                "maximum {} is outside the {}-bit range 0..={}",
                self.max,
                bit_depth.bits(),
                limit
            )));
        }
        Ok(())
    }
}

/// Foreground and total volume of a region, in calibrated units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeFractionResult {
    pub foreground_volume: f64,
    pub total_volume: f64,
    /// `foreground_volume / total_volume`, NaN when the total is 0
    pub ratio: f64,
}

impl VolumeFractionResult {
    pub fn new(foreground_volume: f64, total_volume: f64) -> Self {
        let ratio = if total_volume == 0.0 {
            f64::NAN
        } else {
            foreground_volume / total_volume
        };
        Self {
            foreground_volume,
            total_volume,
            ratio,
        }
    }

    /// Rows for a results table, labelled with `label`.
    pub fn to_rows(&self, label: &str, calibration: &Calibration) -> Vec<ResultRow> {
        let unit = &calibration.unit;
        vec![
            ResultRow::new(label, format!("BV ({unit}³)"), self.foreground_volume),
            ResultRow::new(label, format!("TV ({unit}³)"), self.total_volume),
            ResultRow::new(label, "BV/TV", self.ratio),
        ]
    }
}

/// One (label, metric, value) entry handed to a results sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub label: String,
    pub metric: String,
    pub value: f64,
}

impl ResultRow {
    pub fn new(label: impl Into<String>, metric: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            metric: metric.into(),
            value,
        }
    }
}

/// Common interface of the voxel and surface estimators.
pub trait VolumeFractionEstimator {
    /// Measure the foreground fraction of `volume`, restricted to the regions
    /// of `catalog` when one is given.
    fn estimate(
        &self,
        volume: &Volume,
        catalog: Option<&dyn RoiCatalog>,
    ) -> Result<VolumeFractionResult, VolumeFractionError>;
}

/// Checks every estimator runs before touching any voxel.
///
/// Returns whether the volume is binary or grayscale.
pub(crate) fn validate_input(
    volume: &Volume,
    thresholds: &ThresholdBand,
    catalog: Option<&dyn RoiCatalog>,
) -> Result<PixelKind, VolumeFractionError> {
    if volume.is_empty() {
        return Err(VolumeFractionError::InvalidInput(format!(
            "volume has no voxels (dimensions {:?})",
            volume.dim()
        )));
    }

    let bit_depth = volume.bit_depth();
    let max_value = volume.max_value();
    if max_value > bit_depth.max_value() {
        return Err(VolumeFractionError::UnsupportedFormat(format!(
            "{}-bit volume holds value {}",
            bit_depth.bits(),
            max_value
        )));
    }

    thresholds.validate(bit_depth)?;

    if catalog.is_some_and(|catalog| catalog.is_empty()) {
        return Err(VolumeFractionError::InvalidParameter(
            "ROI catalog is empty".to_string(),
        ));
    }

    let kind = volume.pixel_kind();
    tracing::debug!(
        ?kind,
        dim = ?volume.dim(),
        min = thresholds.min,
        max = thresholds.max,
        "estimator input accepted"
    );
    Ok(kind)
}
