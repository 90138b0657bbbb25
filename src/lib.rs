//! # ROI-volume library
//!
//! This crate measures how much of a 3D image volume is foreground inside
//! regions of interest drawn on its planes.
//!
//! Regions come from a catalog owned by the host application (an
//! interactive region manager, a segmentation step, ...). Each region is a
//! rectangle with an optional shape mask, tagged with the plane it was drawn
//! on or marked as active on every plane. On top of such a catalog the crate
//! provides:
//!  - Bounds-safe clipping of regions to the volume
//!  - The 3D box enclosing all usable regions
//!  - Cropping a volume down to its regions, with optional fill and padding
//!  - Volume fraction (BV/TV) by voxel counting
//!  - Volume fraction from isosurfaces, with triangulation delegated to an
//!    external [`mesh::SurfaceMesher`]
//!
//! Planes are processed in parallel using rayon. Volumes are never modified
//! in place, and a catalog must not change while an operation is running.
//!
//! Planes are numbered from 1. Region names following the `SSSS-YYYY-XXXX`
//! label convention carry their plane number; any other name puts the
//! region on every plane.
//!
//! # Examples
//!
//! ## Measuring a region
//!
//! Build a volume, draw a region on its second plane and count the voxels in
//! the threshold band.
//!
//! ```
//! # use roi_volume::{
//! #     enums::BitDepth, roi::{Rect, Region}, volume::{Calibration, Volume},
//! #     volume_fraction::{ThresholdBand, VolumeFractionEstimator},
//! #     voxel_fraction::VoxelVolumeFraction,
//! # };
//! # use ndarray::Array3;
//! let volume = Volume::new(
//!     Array3::from_elem((3, 8, 8), 255),
//!     BitDepth::Eight,
//!     Calibration::new(0.5, 0.5, 0.5, "mm"),
//! );
//! let catalog = vec![Region::from_name("0002-0004-0004", Rect::new(2, 2, 4, 4))];
//!
//! let result = VoxelVolumeFraction::new(ThresholdBand::binary())
//!     .estimate(&volume, Some(&catalog))
//!     .expect("volume and thresholds should be valid");
//! assert_eq!(result.total_volume, 16.0 * 0.125);
//! assert_eq!(result.ratio, 1.0);
//! ```

pub mod bounds;
pub mod catalog;
pub mod crop;
pub mod enums;
pub mod mesh;
pub mod roi;
pub mod surface_fraction;
pub mod volume;
pub mod volume_fraction;
pub mod volume_loader;
pub mod voxel_fraction;

#[cfg(test)]
pub(crate) mod test_utils;
