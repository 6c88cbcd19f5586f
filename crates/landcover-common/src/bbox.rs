//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box (left, bottom, right, top).
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (UTM, Web Mercator), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box enclosing every point. Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let mut bbox = BoundingBox::new(x0, y0, x0, y0);
        for (x, y) in iter {
            bbox.expand_to_include(x, y);
        }
        Some(bbox)
    }

    /// Grow the box so that it contains the given point.
    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Midpoint of the box as (x, y).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// The four corners, counter-clockwise from bottom-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.contains_point(other.min_x, other.min_y) && self.contains_point(other.max_x, other.max_y)
    }

    /// All coordinates finite and min <= max on both axes.
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center() {
        let bbox = BoundingBox::new(-54.0, -28.0, -53.0, -27.0);
        assert_eq!(bbox.center(), (-53.5, -27.5));
    }

    #[test]
    fn test_from_points() {
        let bbox = BoundingBox::from_points(vec![(1.0, 5.0), (-2.0, 3.0), (4.0, -1.0)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, -1.0, 4.0, 5.0));
        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_validity() {
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!BoundingBox::new(2.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_valid());
    }
}
