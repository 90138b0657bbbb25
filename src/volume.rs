use crate::enums::{BitDepth, PixelKind};

use image::{GrayImage, ImageBuffer};
use ndarray::{Array3, ArrayView2, ArrayViewMut2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Physical size of one voxel along each axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub unit: String,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            unit: "pixel".to_string(),
        }
    }
}

impl Calibration {
    pub fn new(width: f64, height: f64, depth: f64, unit: impl Into<String>) -> Self {
        Self {
            width,
            height,
            depth,
            unit: unit.into(),
        }
    }

    /// Physical volume of a single voxel
    pub fn voxel_volume(&self) -> f64 {
        self.width * self.height * self.depth
    }
}

/// A stack of equally sized planes.
///
/// Samples are stored as `u16` regardless of [`BitDepth`]; the bit depth
/// only decides which values are representable. Planes are addressed
/// 1-based, matching the plane tags carried by regions.
#[derive(Debug, Clone, Default)]
pub struct Volume {
    pub data: Array3<u16>,
    pub bit_depth: BitDepth,
    pub calibration: Calibration,
}

impl Volume {
    pub fn new(data: Array3<u16>, bit_depth: BitDepth, calibration: Calibration) -> Self {
        Self {
            data,
            bit_depth,
            calibration,
        }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn depth(&self) -> usize {
        self.data.dim().0
    }

    /// True if any of the three dimensions is zero
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    /// Get a mutable reference to the underlying data
    pub fn data_mut(&mut self) -> &mut Array3<u16> {
        &mut self.data
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// View of plane `index` (1-based), or `None` when out of range
    pub fn plane(&self, index: usize) -> Option<ArrayView2<'_, u16>> {
        if !self.is_valid_plane(index) {
            return None;
        }
        Some(self.data.index_axis(Axis(0), index - 1))
    }

    /// Mutable view of plane `index` (1-based), or `None` when out of range
    pub fn plane_mut(&mut self, index: usize) -> Option<ArrayViewMut2<'_, u16>> {
        if !self.is_valid_plane(index) {
            return None;
        }
        Some(self.data.index_axis_mut(Axis(0), index - 1))
    }

    pub fn is_valid_plane(&self, index: usize) -> bool {
        index >= 1 && index <= self.depth()
    }

    /// Largest sample in the volume, 0 for an empty volume
    pub fn max_value(&self) -> u16 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Binary volumes are 8-bit and hold nothing but 0 and 255.
    pub fn pixel_kind(&self) -> PixelKind {
        let binary = self.bit_depth == BitDepth::Eight
            && self.data.iter().all(|&v| v == 0 || v == u8::MAX as u16);
        if binary {
            PixelKind::Binary
        } else {
            PixelKind::Grayscale
        }
    }

    #[inline]
    fn normalize_to_u8(value: u16, bit_depth: BitDepth) -> u8 {
        match bit_depth {
            BitDepth::Eight => value.min(u8::MAX as u16) as u8,
            BitDepth::Sixteen => ((value as f32 / 65535.0) * 255.0).clamp(0.0, 255.0) as u8,
        }
    }

    // Extract plane to image conversion
    fn plane_to_image(plane: &ArrayView2<'_, u16>, bit_depth: BitDepth) -> Option<GrayImage> {
        let (height, width) = plane.dim();
        let pixel_data: Vec<u8> = plane
            .into_par_iter()
            .map(|&v| Self::normalize_to_u8(v, bit_depth))
            .collect();
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }

    /// Render plane `index` (1-based) as an 8-bit image for display.
    pub fn get_image_from_plane(&self, index: usize) -> Option<GrayImage> {
        let plane = self.plane(index)?;
        Self::plane_to_image(&plane, self.bit_depth)
    }
}
