use crate::{
    bounds::clamp,
    catalog::RoiCatalog,
    volume::Volume,
    volume_fraction::{
        ThresholdBand, VolumeFractionError, VolumeFractionEstimator, VolumeFractionResult,
        validate_input,
    },
};

use ndarray::{ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

/// Foreground and total voxel counts of one or more planes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VoxelCount {
    pub foreground: u64,
    pub total: u64,
}

impl Add for VoxelCount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            foreground: self.foreground + rhs.foreground,
            total: self.total + rhs.total,
        }
    }
}

impl Sum for VoxelCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Volume fraction by counting voxels.
///
/// Every voxel inside the measured region adds to the total; those whose
/// value lies in `thresholds` add to the foreground. A pixel covered by two
/// regions on the same plane is counted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelVolumeFraction {
    pub thresholds: ThresholdBand,
}

impl VoxelVolumeFraction {
    pub fn new(thresholds: ThresholdBand) -> Self {
        Self { thresholds }
    }

    /// Count voxels plane by plane; element `i` holds plane `i + 1`.
    ///
    /// Planes without an active region count as zero when a catalog is
    /// given.
    pub fn count_voxels(
        &self,
        volume: &Volume,
        catalog: Option<&dyn RoiCatalog>,
    ) -> Result<Vec<VoxelCount>, VolumeFractionError> {
        validate_input(volume, &self.thresholds, catalog)?;

        let counts = (1..=volume.depth())
            .into_par_iter()
            .map(|z| {
                let plane = volume.data().index_axis(Axis(0), z - 1);
                let count = match catalog {
                    Some(catalog) => self.count_plane_rois(&plane, catalog, z),
                    None => self.count_plane(&plane),
                };
                tracing::trace!(plane = z, ?count, "plane voxel count");
                count
            })
            .collect();

        Ok(counts)
    }

    fn count_plane(&self, plane: &ArrayView2<'_, u16>) -> VoxelCount {
        let foreground = plane
            .iter()
            .filter(|&&v| self.thresholds.contains(v))
            .count();
        VoxelCount {
            foreground: foreground as u64,
            total: plane.len() as u64,
        }
    }

    fn count_plane_rois(
        &self,
        plane: &ArrayView2<'_, u16>,
        catalog: &dyn RoiCatalog,
        z: usize,
    ) -> VoxelCount {
        let (height, width) = plane.dim();
        let mut count = VoxelCount::default();

        for roi in catalog.rois_on_plane(z) {
            if !clamp(roi.rect, width, height).1 {
                tracing::debug!(name = %roi.name, plane = z, "region outside plane, skipped");
                continue;
            }
            for (x, y) in roi.pixels(width, height) {
                count.total += 1;
                if self.thresholds.contains(plane[[y, x]]) {
                    count.foreground += 1;
                }
            }
        }

        count
    }
}

impl VolumeFractionEstimator for VoxelVolumeFraction {
    fn estimate(
        &self,
        volume: &Volume,
        catalog: Option<&dyn RoiCatalog>,
    ) -> Result<VolumeFractionResult, VolumeFractionError> {
        let count: VoxelCount = self.count_voxels(volume, catalog)?.into_iter().sum();

        let voxel_volume = volume.calibration().voxel_volume();
        let result = VolumeFractionResult::new(
            count.foreground as f64 * voxel_volume,
            count.total as f64 * voxel_volume,
        );
        tracing::info!(
            foreground = result.foreground_volume,
            total = result.total_volume,
            ratio = result.ratio,
            "voxel volume fraction"
        );
        Ok(result)
    }
}
