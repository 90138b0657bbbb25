use crate::bounds::clamp;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in plane pixel coordinates.
///
/// The right and bottom edges are exclusive. Coordinates are signed because
/// regions drawn by a host may hang over the plane's edges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// The plane(s) a region is active on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneTag {
    /// Active on a single 1-based plane. Values below 1 are kept as parsed
    /// and simply never match a plane.
    Plane(i32),
    /// Active on every plane of the volume
    AllPlanes,
}

/// Value the label convention uses for "no plane".
const NO_PLANE: i32 = -1;

impl PlaneTag {
    /// Parse the plane tag encoded in a catalog label.
    ///
    /// Labels follow the `SSSS-YYYY-XXXX` convention (or its 5 and 6 digit
    /// widths), where the leading field is the plane number. Labels in any
    /// other shape, and leading fields that don't parse, are active on every
    /// plane.
    pub fn from_name(name: &str) -> Self {
        let chars: Vec<char> = name.chars().collect();
        let field_width = [(4, 9, 14), (5, 11, 17), (6, 13, 20)]
            .into_iter()
            .find(|&(first, second, min_len)| {
                chars.len() >= min_len && chars[first] == '-' && chars[second] == '-'
            })
            .map(|(first, _, _)| first);

        let number = match field_width {
            Some(width) => {
                let field: String = chars[..width].iter().collect();
                parse_plane_field(&field)
            }
            None => NO_PLANE,
        };

        if number == NO_PLANE {
            PlaneTag::AllPlanes
        } else {
            PlaneTag::Plane(number)
        }
    }

    /// True if the region is active on `plane` (1-based)
    pub fn is_on(&self, plane: usize) -> bool {
        match *self {
            PlaneTag::Plane(tag) => tag >= 1 && tag as usize == plane,
            PlaneTag::AllPlanes => true,
        }
    }

    /// The concrete plane, if the tag names one inside `1..=depth`
    pub fn in_range(&self, depth: usize) -> Option<usize> {
        match *self {
            PlaneTag::Plane(tag) if tag >= 1 && tag as usize <= depth => Some(tag as usize),
            _ => None,
        }
    }
}

/// Reads the plane field the way host catalogs write and read it: a decimal
/// number with an optional `d`/`f` type suffix, or `NaN`/`Infinity`,
/// truncated toward zero with saturation (NaN becomes 0).
fn parse_plane_field(field: &str) -> i32 {
    let field = field.trim_matches(|c: char| c <= ' ');
    let unsigned = field.strip_prefix(['+', '-']).unwrap_or(field);
    let parsed = if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        match unsigned {
            "NaN" | "Infinity" => field.parse::<f64>().ok(),
            _ => None,
        }
    } else {
        let number = field.strip_suffix(['d', 'D', 'f', 'F']).unwrap_or(field);
        number.parse::<f64>().ok()
    };

    match parsed {
        Some(value) => value as i32,
        None => NO_PLANE,
    }
}

/// Build a conventional `SSSS-YYYY-XXXX` label for a region on `plane`
/// centred at (`x`, `y`).
pub fn plane_label(plane: usize, x: i32, y: i32) -> String {
    format!("{plane:04}-{y:04}-{x:04}")
}

/// A planar region of interest.
///
/// An axis-aligned rectangle in plane pixel coordinates, optionally narrowed
/// by a boolean mask of the same size, and tagged with the plane it belongs
/// to.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub rect: Rect,
    /// Optional shape mask, laid out (height, width) like the rectangle.
    pub mask: Option<Array2<bool>>,
    pub plane: PlaneTag,
}

impl Region {
    /// Rectangular region with an explicit plane tag.
    pub fn new(rect: Rect, plane: PlaneTag) -> Self {
        Self {
            name: String::new(),
            rect,
            mask: None,
            plane,
        }
    }

    /// Region whose plane tag is read from `name` once, at construction.
    pub fn from_name(name: impl Into<String>, rect: Rect) -> Self {
        let name = name.into();
        let plane = PlaneTag::from_name(&name);
        Self {
            name,
            rect,
            mask: None,
            plane,
        }
    }

    pub fn with_mask(mut self, mask: Array2<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// True if pixel (`x`, `y`) lies inside the region's shape.
    ///
    /// Mask offsets are relative to the unclamped rectangle; offsets outside
    /// the mask count as outside.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        if x < self.rect.x || y < self.rect.y || x >= self.rect.right() || y >= self.rect.bottom()
        {
            return false;
        }
        match &self.mask {
            None => true,
            Some(mask) => {
                let mx = (x - self.rect.x) as usize;
                let my = (y - self.rect.y) as usize;
                mask.get((my, mx)).copied().unwrap_or(false)
            }
        }
    }

    /// Pixels of the region that fall inside a `width` x `height` plane,
    /// in row-major order.
    pub fn pixels(&self, width: usize, height: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (clamped, valid) = clamp(self.rect, width, height);
        let rows = if valid {
            clamped.y..clamped.bottom()
        } else {
            0..0
        };
        let cols = clamped.x..clamped.right();
        rows.flat_map(move |y| cols.clone().map(move |x| (x, y)))
            .filter(move |&(x, y)| self.contains(x, y))
            .map(|(x, y)| (x as usize, y as usize))
    }
}
