use crate::{
    enums::BitDepth,
    mesh::{SurfaceMesher, TriangleMesh},
    volume::{Calibration, Volume},
};

use nalgebra::Point3;
use ndarray::{Array2, Array3};

/// 8-bit volume of `value` everywhere.
pub(crate) fn filled_volume(width: usize, height: usize, depth: usize, value: u16) -> Volume {
    Volume::new(
        Array3::from_elem((depth, height, width), value),
        BitDepth::Eight,
        Calibration::default(),
    )
}

/// 16-bit volume where voxel (x, y, z) holds `100 z + 10 y + x` (0-based).
pub(crate) fn ramp_volume(width: usize, height: usize, depth: usize) -> Volume {
    let data = Array3::from_shape_fn((depth, height, width), |(z, y, x)| {
        (z * 100 + y * 10 + x) as u16
    });
    Volume::new(data, BitDepth::Sixteen, Calibration::default())
}

/// Binary cube of side `size` surrounded by `padding` background voxels on
/// every side.
pub(crate) fn cuboid_volume(size: usize, padding: usize) -> Volume {
    let side = size + 2 * padding;
    let inside = padding..padding + size;
    let data = Array3::from_shape_fn((side, side, side), |(z, y, x)| {
        if inside.contains(&z) && inside.contains(&y) && inside.contains(&x) {
            255
        } else {
            0
        }
    });
    Volume::new(data, BitDepth::Eight, Calibration::default())
}

/// Mask with the bottom-right quadrant cut away; covers 3/4 of an even sized
/// rectangle.
pub(crate) fn l_mask(width: usize, height: usize) -> Array2<bool> {
    Array2::from_shape_fn((height, width), |(y, x)| x < width / 2 || y < height / 2)
}

/// Emits the outward faces of every voxel at or above the isovalue, giving a
/// closed surface whose enclosed volume equals the voxel count.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CuberilleMesher;

impl SurfaceMesher for CuberilleMesher {
    fn triangulate(&self, volume: &Volume, isovalue: u16, _resampling: u32) -> TriangleMesh {
        let (depth, height, width) = volume.dim();
        let calibration = volume.calibration();
        let scale = [calibration.width, calibration.height, calibration.depth];
        let data = volume.data();

        let inside = |p: [i64; 3]| {
            p[0] >= 0
                && p[1] >= 0
                && p[2] >= 0
                && (p[0] as usize) < width
                && (p[1] as usize) < height
                && (p[2] as usize) < depth
                && data[[p[2] as usize, p[1] as usize, p[0] as usize]] >= isovalue
        };

        let mut triangles = Vec::new();
        for ((z, y, x), &value) in data.indexed_iter() {
            if value < isovalue {
                continue;
            }
            let voxel = [x as i64, y as i64, z as i64];
            for axis in 0..3 {
                for step in [-1, 1] {
                    let mut neighbour = voxel;
                    neighbour[axis] += step;
                    if !inside(neighbour) {
                        triangles.extend(face(voxel, axis, step, scale));
                    }
                }
            }
        }
        TriangleMesh::new(triangles)
    }
}

fn face(
    voxel: [i64; 3],
    axis: usize,
    step: i64,
    scale: [f64; 3],
) -> [[Point3<f64>; 3]; 2] {
    let (b, c) = ((axis + 1) % 3, (axis + 2) % 3);
    let mut base = voxel;
    if step > 0 {
        base[axis] += 1;
    }
    let corner = |db: i64, dc: i64| {
        let mut q = base;
        q[b] += db;
        q[c] += dc;
        Point3::new(
            q[0] as f64 * scale[0],
            q[1] as f64 * scale[1],
            q[2] as f64 * scale[2],
        )
    };
    let quad = [corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)];
    if step > 0 {
        [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]]
    } else {
        [[quad[0], quad[2], quad[1]], [quad[0], quad[3], quad[2]]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cuberille_single_voxel_is_unit_cube() {
        let volume = filled_volume(1, 1, 1, 255);
        let mesh = CuberilleMesher.triangulate(&volume, 128, 1);
        assert_eq!(mesh.len(), 12);
        assert_relative_eq!(mesh.signed_volume(), 1.0);
    }

    #[test]
    fn cuberille_respects_calibration() {
        let mut volume = cuboid_volume(3, 1);
        volume.calibration = Calibration::new(2.0, 1.0, 0.5, "um");
        let mesh = CuberilleMesher.triangulate(&volume, 128, 1);
        assert_relative_eq!(mesh.volume(), 27.0);
    }
}
