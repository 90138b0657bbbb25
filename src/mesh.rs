use crate::volume::Volume;

use nalgebra::Point3;

/// Triangle soup in physical units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub triangles: Vec<[Point3<f64>; 3]>,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<[Point3<f64>; 3]>) -> Self {
        Self { triangles }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Signed volume enclosed by the surface (divergence theorem).
    ///
    /// Only meaningful for a closed, consistently wound surface; the sign
    /// follows the winding.
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
            .sum::<f64>()
            / 6.0
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }
}

/// Turns a binary indicator volume into a closed surface.
///
/// Triangulation (marching cubes or similar) lives outside this crate; the
/// estimators only consume the resulting closed surface.
pub trait SurfaceMesher: Sync {
    /// Triangulate the isosurface of `volume` at `isovalue`, sampling every
    /// `resampling`-th voxel. Coordinates are scaled by the volume's
    /// calibration.
    fn triangulate(&self, volume: &Volume, isovalue: u16, resampling: u32) -> TriangleMesh;

    /// Absolute volume enclosed by the isosurface.
    fn enclosed_volume(&self, volume: &Volume, isovalue: u16, resampling: u32) -> f64 {
        self.triangulate(volume, isovalue, resampling).volume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tetrahedron(scale: f64) -> TriangleMesh {
        let o = Point3::origin();
        let x = Point3::new(scale, 0.0, 0.0);
        let y = Point3::new(0.0, scale, 0.0);
        let z = Point3::new(0.0, 0.0, scale);
        TriangleMesh::new(vec![[o, y, x], [o, x, z], [o, z, y], [x, y, z]])
    }

    #[test]
    fn tetrahedron_volume() {
        let mesh = tetrahedron(3.0);
        assert_eq!(mesh.len(), 4);
        assert_relative_eq!(mesh.signed_volume(), 4.5);
        assert_relative_eq!(mesh.volume(), 4.5);
    }

    #[test]
    fn reversed_winding_flips_sign() {
        let mut mesh = tetrahedron(1.0);
        for triangle in &mut mesh.triangles {
            triangle.swap(1, 2);
        }
        assert_relative_eq!(mesh.signed_volume(), -1.0 / 6.0);
        assert_relative_eq!(mesh.volume(), 1.0 / 6.0);
    }

    #[test]
    fn translated_closed_surface_keeps_volume() {
        let offset = nalgebra::Vector3::new(10.0, -4.0, 2.5);
        let mut mesh = tetrahedron(3.0);
        for triangle in &mut mesh.triangles {
            for vertex in triangle.iter_mut() {
                *vertex += offset;
            }
        }
        assert_relative_eq!(mesh.signed_volume(), 4.5, epsilon = 1e-9);
    }

    #[test]
    fn empty_mesh_has_no_volume() {
        let mesh = TriangleMesh::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.volume(), 0.0);
    }
}
