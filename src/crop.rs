use crate::{
    bounds::{Limits, region_limits},
    catalog::RoiCatalog,
    roi::Region,
    volume::Volume,
};

use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the area around the copied regions is filled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    /// Paint every pixel not covered by a region with `fill_value`
    /// instead of 0
    pub fill_background: bool,
    pub fill_value: u16,
    /// Border added on every side, in pixels and planes
    pub padding: usize,
}

impl CropOptions {
    fn background(&self, volume: &Volume) -> u16 {
        if self.fill_background {
            self.fill_value.min(volume.bit_depth().max_value())
        } else {
            0
        }
    }
}

/// Cuts the part of a volume covered by a catalog's regions.
pub struct VolumeCropper;

impl VolumeCropper {
    /// Crop `volume` to the box around the regions of `catalog`.
    ///
    /// Only pixels inside a region active on their plane are copied; the
    /// rest of each output plane is background. Every plane between the
    /// first and last region plane is emitted, with or without regions.
    ///
    /// Returns `None` when the catalog has no region overlapping the volume.
    pub fn crop(
        volume: &Volume,
        catalog: &dyn RoiCatalog,
        options: &CropOptions,
    ) -> Option<Volume> {
        let (depth, height, width) = volume.dim();
        let limits = region_limits(catalog, width, height, depth)?;

        let padding = options.padding;
        let target_dim = (
            limits.height() + 2 * padding,
            limits.width() + 2 * padding,
        );
        let background = options.background(volume);

        let planes: Vec<Array2<u16>> = (limits.z_min..=limits.z_max)
            .into_par_iter()
            .map(|z| {
                let source = volume.data().index_axis(Axis(0), z - 1);
                let rois = catalog.rois_on_plane(z);
                Self::crop_plane(&source, &rois, &limits, padding, target_dim, background)
            })
            .collect();

        let blank = Array2::from_elem(target_dim, background);
        let mut views: Vec<ArrayView2<'_, u16>> = Vec::with_capacity(planes.len() + 2 * padding);
        views.extend(std::iter::repeat_n(blank.view(), padding));
        views.extend(planes.iter().map(|plane| plane.view()));
        views.extend(std::iter::repeat_n(blank.view(), padding));

        let data = ndarray::stack(Axis(0), &views).ok()?;
        tracing::debug!(
            depth = data.dim().0,
            height = data.dim().1,
            width = data.dim().2,
            "cropped volume"
        );

        Some(Volume::new(
            data,
            volume.bit_depth(),
            volume.calibration().clone(),
        ))
    }

    fn crop_plane(
        source: &ArrayView2<'_, u16>,
        rois: &[&Region],
        limits: &Limits,
        padding: usize,
        target_dim: (usize, usize),
        background: u16,
    ) -> Array2<u16> {
        let (height, width) = source.dim();
        let mut target = Array2::from_elem(target_dim, background);

        for roi in rois {
            for (x, y) in roi.pixels(width, height) {
                let target_x = x - limits.x_min + padding;
                let target_y = y - limits.y_min + padding;
                target[[target_y, target_x]] = source[[y, x]];
            }
        }

        target
    }
}
