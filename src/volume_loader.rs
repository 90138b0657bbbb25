use crate::{
    enums::BitDepth,
    volume::{Calibration, Volume},
};

use image::{GrayImage, ImageBuffer, Luma};
use ndarray::{Array2, Array3, s};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("Plane {plane} holds value {value} which exceeds the {bits}-bit range")]
    ValueOutOfRange { plane: usize, value: u16, bits: u8 },
}

/// Assembles [`Volume`]s from planes handed over by a host application.
pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from raw planes
    ///
    /// # Arguments
    ///
    /// * `planes` - Planes in stack order, each laid out (height, width)
    /// * `bit_depth` - Sample width the planes were acquired with
    /// * `calibration` - Physical voxel size
    ///
    /// # Errors
    ///
    /// Returns error if no planes were given, dimensions are inconsistent or
    /// a sample does not fit `bit_depth`
    pub fn load_from_planes(
        planes: &[Array2<u16>],
        bit_depth: BitDepth,
        calibration: Calibration,
    ) -> Result<Volume, VolumeLoaderError> {
        if planes.is_empty() || planes[0].is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::validate_dimensions(planes)?;
        Self::validate_range(planes, bit_depth)?;

        let volume_array = Self::build_volume_array(planes);
        Ok(Volume::new(volume_array, bit_depth, calibration))
    }

    /// Load an 8-bit volume from grayscale images
    pub fn load_from_images(
        images: &[GrayImage],
        calibration: Calibration,
    ) -> Result<Volume, VolumeLoaderError> {
        let planes: Vec<_> = images.iter().map(Self::image_to_plane).collect();
        Self::load_from_planes(&planes, BitDepth::Eight, calibration)
    }

    /// Load a 16-bit volume from grayscale images
    pub fn load_from_images_16(
        images: &[ImageBuffer<Luma<u16>, Vec<u16>>],
        calibration: Calibration,
    ) -> Result<Volume, VolumeLoaderError> {
        let planes: Vec<_> = images.iter().map(Self::image_to_plane).collect();
        Self::load_from_planes(&planes, BitDepth::Sixteen, calibration)
    }

    fn image_to_plane<T>(image: &ImageBuffer<Luma<T>, Vec<T>>) -> Array2<u16>
    where
        T: image::Primitive + Into<u16>,
    {
        let (width, height) = image.dimensions();
        Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            image.get_pixel(x as u32, y as u32)[0].into()
        })
    }

    fn validate_dimensions(planes: &[Array2<u16>]) -> Result<(), VolumeLoaderError> {
        let first_dim = planes[0].dim();
        if planes.iter().any(|plane| plane.dim() != first_dim) {
            return Err(VolumeLoaderError::InconsistentDimensions);
        }
        Ok(())
    }

    fn validate_range(planes: &[Array2<u16>], bit_depth: BitDepth) -> Result<(), VolumeLoaderError> {
        let limit = bit_depth.max_value();
        for (i, plane) in planes.iter().enumerate() {
            if let Some(&value) = plane.iter().find(|&&v| v > limit) {
                return Err(VolumeLoaderError::ValueOutOfRange {
                    plane: i + 1,
                    value,
                    bits: bit_depth.bits(),
                });
            }
        }
        Ok(())
    }

    fn build_volume_array(planes: &[Array2<u16>]) -> Array3<u16> {
        let (height, width) = planes[0].dim();
        let depth = planes.len();
        let mut volume = Array3::<u16>::zeros((depth, height, width));

        for (i, plane) in planes.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(plane);
        }

        volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_planes_in_order() {
        let planes = vec![Array2::from_elem((2, 3), 1u16), Array2::from_elem((2, 3), 2u16)];
        let volume =
            VolumeLoader::load_from_planes(&planes, BitDepth::Eight, Calibration::default())
                .unwrap();
        assert_eq!(volume.dim(), (2, 2, 3));
        assert_eq!(volume.plane(1).unwrap()[[1, 2]], 1);
        assert_eq!(volume.plane(2).unwrap()[[0, 0]], 2);
    }

    #[test]
    fn rejects_empty_input() {
        let result = VolumeLoader::load_from_planes(&[], BitDepth::Eight, Calibration::default());
        assert!(matches!(result, Err(VolumeLoaderError::NoValidImages)));
    }

    #[test]
    fn rejects_mismatched_planes() {
        let planes = vec![Array2::<u16>::zeros((2, 3)), Array2::<u16>::zeros((3, 2))];
        let result = VolumeLoader::load_from_planes(&planes, BitDepth::Eight, Calibration::default());
        assert!(matches!(
            result,
            Err(VolumeLoaderError::InconsistentDimensions)
        ));
    }

    #[test]
    fn rejects_values_beyond_bit_depth() {
        let mut plane = Array2::<u16>::zeros((2, 2));
        plane[[1, 0]] = 300;
        let result =
            VolumeLoader::load_from_planes(&[plane.clone()], BitDepth::Eight, Calibration::default());
        assert!(matches!(
            result,
            Err(VolumeLoaderError::ValueOutOfRange {
                plane: 1,
                value: 300,
                bits: 8
            })
        ));
        assert!(
            VolumeLoader::load_from_planes(&[plane], BitDepth::Sixteen, Calibration::default())
                .is_ok()
        );
    }

    #[test]
    fn loads_gray_images() {
        let mut image = GrayImage::new(4, 2);
        image.put_pixel(3, 1, Luma([255]));
        let calibration = Calibration::new(0.1, 0.1, 0.2, "mm");
        let volume = VolumeLoader::load_from_images(&[image.clone(), image], calibration.clone())
            .unwrap();
        assert_eq!(volume.dim(), (2, 2, 4));
        assert_eq!(volume.plane(2).unwrap()[[1, 3]], 255);
        assert_eq!(volume.calibration(), &calibration);
    }

    #[test]
    fn loads_sixteen_bit_images() {
        let mut image = ImageBuffer::<Luma<u16>, Vec<u16>>::new(2, 2);
        image.put_pixel(0, 1, Luma([4000]));
        let volume = VolumeLoader::load_from_images_16(&[image], Calibration::default()).unwrap();
        assert_eq!(volume.bit_depth(), BitDepth::Sixteen);
        assert_eq!(volume.plane(1).unwrap()[[1, 0]], 4000);
    }
}
