use crate::catalog::RoiCatalog;
use crate::roi::{PlaneTag, Rect};

use serde::{Deserialize, Serialize};

/// Clip `rect` to a `width` x `height` plane.
///
/// Returns the clipped rectangle and whether it still covers any pixel. A
/// rectangle fully outside the plane collapses to a zero-size rectangle at
/// the nearest edge.
pub fn clamp(rect: Rect, width: usize, height: usize) -> (Rect, bool) {
    let width = width.min(i32::MAX as usize) as i32;
    let height = height.min(i32::MAX as usize) as i32;

    let x_min = rect.x.clamp(0, width);
    let x_max = rect.right().clamp(0, width);
    let y_min = rect.y.clamp(0, height);
    let y_max = rect.bottom().clamp(0, height);

    let clamped = Rect::new(x_min, y_min, x_max - x_min, y_max - y_min);
    let valid = clamped.width > 0 && clamped.height > 0;
    (clamped, valid)
}

/// Box enclosing the valid regions of a catalog.
///
/// `x` and `y` bounds are pixel edges (max exclusive), `z` bounds are
/// 1-based inclusive plane numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limits {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
    pub z_min: usize,
    pub z_max: usize,
}

impl Limits {
    pub fn width(&self) -> usize {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> usize {
        self.y_max - self.y_min
    }

    /// Number of planes spanned
    pub fn depth(&self) -> usize {
        self.z_max - self.z_min + 1
    }
}

/// Compute the box enclosing every region of `catalog` that overlaps a
/// `width` x `height` x `depth` volume.
///
/// Returns `None` for an empty catalog, or when no region both clamps to a
/// non-empty rectangle and lands on a plane of the volume. A single region
/// active on every plane stretches `z` over the whole depth.
///
/// A region tagged with a plane outside the volume still widens `x`/`y` if
/// its rectangle overlaps the plane, it just never validates the result on
/// its own.
pub fn region_limits(
    catalog: &dyn RoiCatalog,
    width: usize,
    height: usize,
    depth: usize,
) -> Option<Limits> {
    if catalog.is_empty() {
        return None;
    }

    let mut x_min = width;
    let mut x_max = 0;
    let mut y_min = height;
    let mut y_max = 0;
    let mut z_min = depth;
    let mut z_max = 1;
    let mut found_plane_roi = false;
    let mut found_all_planes_roi = false;

    for roi in catalog.all_rois() {
        let (rect, valid) = clamp(roi.rect, width, height);
        if !valid {
            tracing::debug!(name = %roi.name, rect = ?roi.rect, "region outside volume bounds, skipped");
            continue;
        }

        x_min = x_min.min(rect.x as usize);
        x_max = x_max.max(rect.right() as usize);
        y_min = y_min.min(rect.y as usize);
        y_max = y_max.max(rect.bottom() as usize);

        if let Some(plane) = roi.plane.in_range(depth) {
            z_min = z_min.min(plane);
            z_max = z_max.max(plane);
            found_plane_roi = true;
        } else if roi.plane == PlaneTag::AllPlanes {
            found_all_planes_roi = true;
        }
    }

    if !found_plane_roi && !found_all_planes_roi {
        return None;
    }

    if found_all_planes_roi {
        z_min = 1;
        z_max = depth;
    }

    let limits = Limits {
        x_min,
        x_max,
        y_min,
        y_max,
        z_min,
        z_max,
    };
    tracing::debug!(?limits, "region limits");
    Some(limits)
}
