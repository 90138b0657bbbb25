use crate::{
    catalog::RoiCatalog,
    enums::BitDepth,
    mesh::SurfaceMesher,
    volume::Volume,
    volume_fraction::{
        ThresholdBand, VolumeFractionError, VolumeFractionEstimator, VolumeFractionResult,
        validate_input,
    },
    volume_loader::VolumeLoader,
};

use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;

/// Isosurface level used on the {0, 255} indicator volumes.
pub const ISOVALUE: u16 = 128;

const INSIDE: u16 = 255;

/// Volume fraction from the volumes enclosed by two isosurfaces.
///
/// One indicator volume marks foreground inside the region, the other marks
/// the region itself; an external [`SurfaceMesher`] turns both into closed
/// surfaces whose enclosed volumes give the foreground and total volume.
#[derive(Debug, Clone)]
pub struct SurfaceVolumeFraction<M> {
    pub thresholds: ThresholdBand,
    /// Sample every n-th voxel when triangulating; must be at least 1
    pub resampling: u32,
    pub mesher: M,
}

/// Indicator volumes handed to the mesher.
#[derive(Debug, Clone)]
pub struct IndicatorVolumes {
    /// White where a voxel is in the region and inside the threshold band
    pub foreground: Volume,
    /// White wherever a voxel is in the region
    pub region: Volume,
}

impl<M: SurfaceMesher> SurfaceVolumeFraction<M> {
    pub fn new(thresholds: ThresholdBand, resampling: u32, mesher: M) -> Self {
        Self {
            thresholds,
            resampling,
            mesher,
        }
    }

    fn validate(
        &self,
        volume: &Volume,
        catalog: Option<&dyn RoiCatalog>,
    ) -> Result<(), VolumeFractionError> {
        validate_input(volume, &self.thresholds, catalog)?;
        if self.resampling == 0 {
            return Err(VolumeFractionError::InvalidParameter(
                "resampling factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the two 8-bit indicator volumes for `volume`.
    ///
    /// Without a catalog every voxel belongs to the region.
    pub fn indicator_volumes(
        &self,
        volume: &Volume,
        catalog: Option<&dyn RoiCatalog>,
    ) -> Result<IndicatorVolumes, VolumeFractionError> {
        self.validate(volume, catalog)?;

        let (foreground_planes, region_planes): (Vec<_>, Vec<_>) = (1..=volume.depth())
            .into_par_iter()
            .map(|z| {
                let plane = volume.data().index_axis(Axis(0), z - 1);
                self.indicator_planes(&plane, catalog, z)
            })
            .unzip();

        let calibration = volume.calibration();
        let build = |planes: &[Array2<u16>]| {
            VolumeLoader::load_from_planes(planes, BitDepth::Eight, calibration.clone())
                .map_err(|err| VolumeFractionError::InvalidInput(err.to_string()))
        };

        Ok(IndicatorVolumes {
            foreground: build(foreground_planes.as_slice())?,
            region: build(region_planes.as_slice())?,
        })
    }

    fn indicator_planes(
        &self,
        plane: &ArrayView2<'_, u16>,
        catalog: Option<&dyn RoiCatalog>,
        z: usize,
    ) -> (Array2<u16>, Array2<u16>) {
        let Some(catalog) = catalog else {
            let foreground = plane.mapv(|v| if self.thresholds.contains(v) { INSIDE } else { 0 });
            let region = Array2::from_elem(plane.dim(), INSIDE);
            return (foreground, region);
        };

        let (height, width) = plane.dim();
        let mut foreground = Array2::zeros(plane.dim());
        let mut region = Array2::zeros(plane.dim());
        for roi in catalog.rois_on_plane(z) {
            for (x, y) in roi.pixels(width, height) {
                region[[y, x]] = INSIDE;
                if self.thresholds.contains(plane[[y, x]]) {
                    foreground[[y, x]] = INSIDE;
                }
            }
        }
        (foreground, region)
    }
}

impl<M: SurfaceMesher> VolumeFractionEstimator for SurfaceVolumeFraction<M> {
    fn estimate(
        &self,
        volume: &Volume,
        catalog: Option<&dyn RoiCatalog>,
    ) -> Result<VolumeFractionResult, VolumeFractionError> {
        let indicators = self.indicator_volumes(volume, catalog)?;

        let foreground_volume =
            self.mesher
                .enclosed_volume(&indicators.foreground, ISOVALUE, self.resampling);
        let total_volume = self
            .mesher
            .enclosed_volume(&indicators.region, ISOVALUE, self.resampling);

        let result = VolumeFractionResult::new(foreground_volume, total_volume);
        tracing::info!(
            foreground = result.foreground_volume,
            total = result.total_volume,
            ratio = result.ratio,
            resampling = self.resampling,
            "surface volume fraction"
        );
        Ok(result)
    }
}
