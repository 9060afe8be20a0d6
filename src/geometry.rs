//! Core geometry types: Point, Size, Region, Spacing.
//!
//! All coordinates are logical pixels in `f32`. Regions are positioned in the
//! editor's coordinate space (origin top-left), not relative to their parent.

use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A position in logical pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A width/height pair in logical pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert to a [`Region`] positioned at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region { x: 0.0, y: 0.0, width: self.width, height: self.height }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangle defined by its top-left corner and size.
///
/// Widths and heights produced by the shrinking and splitting operations are
/// never negative.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// The right edge (exclusive).
    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive).
    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    /// The top-left corner.
    #[inline]
    pub const fn origin(self) -> Point {
        Point { x: self.x, y: self.y }
    }

    /// The dimensions as a [`Size`].
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// The centre point.
    #[inline]
    pub fn centre(self) -> Point {
        Point { x: self.x + self.width * 0.5, y: self.y + self.height * 0.5 }
    }

    /// Whether the region has no area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether the point lies inside this region.
    #[inline]
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Translate the region by a [`Point`] offset.
    #[inline]
    pub fn translate(self, offset: Point) -> Region {
        Region { x: self.x + offset.x, y: self.y + offset.y, ..self }
    }

    /// Contract the region inward by the given [`Spacing`].
    ///
    /// Width and height are clamped to zero.
    #[inline]
    pub fn shrink(self, spacing: Spacing) -> Region {
        let w = self.width - spacing.left - spacing.right;
        let h = self.height - spacing.top - spacing.bottom;
        Region {
            x: self.x + spacing.left,
            y: self.y + spacing.top,
            width: w.max(0.0),
            height: h.max(0.0),
        }
    }

    /// Cut a strip of `amount` pixels off the top.
    ///
    /// Returns `(strip, rest)`. The amount is clamped to `[0, height]`.
    #[inline]
    pub fn split_top(self, amount: f32) -> (Region, Region) {
        let a = amount.clamp(0.0, self.height.max(0.0));
        (
            Region { height: a, ..self },
            Region { y: self.y + a, height: self.height - a, ..self },
        )
    }

    /// Cut a strip of `amount` pixels off the bottom.
    ///
    /// Returns `(strip, rest)`.
    #[inline]
    pub fn split_bottom(self, amount: f32) -> (Region, Region) {
        let a = amount.clamp(0.0, self.height.max(0.0));
        (
            Region { y: self.bottom() - a, height: a, ..self },
            Region { height: self.height - a, ..self },
        )
    }

    /// Cut a strip of `amount` pixels off the left edge.
    ///
    /// Returns `(strip, rest)`.
    #[inline]
    pub fn split_left(self, amount: f32) -> (Region, Region) {
        let a = amount.clamp(0.0, self.width.max(0.0));
        (
            Region { width: a, ..self },
            Region { x: self.x + a, width: self.width - a, ..self },
        )
    }

    /// Cut a strip of `amount` pixels off the right edge.
    ///
    /// Returns `(strip, rest)`.
    #[inline]
    pub fn split_right(self, amount: f32) -> (Region, Region) {
        let a = amount.clamp(0.0, self.width.max(0.0));
        (
            Region { x: self.right() - a, width: a, ..self },
            Region { width: self.width - a, ..self },
        )
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Spacing around the four sides of a rectangle: margin, border, padding.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Spacing {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Spacing {
    /// Zero spacing on all sides.
    pub const ZERO: Spacing = Spacing { top: 0.0, right: 0.0, bottom: 0.0, left: 0.0 };

    /// Create spacing with explicit values for each side.
    #[inline]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// All four sides set to the same value.
    #[inline]
    pub const fn all(value: f32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Symmetric spacing: `vertical` for top/bottom, `horizontal` for left/right.
    #[inline]
    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self { top: vertical, right: horizontal, bottom: vertical, left: horizontal }
    }

    /// Build from one to four values in CSS shorthand order.
    ///
    /// - 1 value: all sides
    /// - 2 values: vertical, horizontal
    /// - 3 values: top, horizontal, bottom
    /// - 4 values: top, right, bottom, left
    ///
    /// Returns `None` for an empty slice or more than four values.
    pub fn from_shorthand(values: &[f32]) -> Option<Self> {
        match *values {
            [a] => Some(Self::all(a)),
            [v, h] => Some(Self::symmetric(v, h)),
            [t, h, b] => Some(Self::new(t, h, b, h)),
            [t, r, b, l] => Some(Self::new(t, r, b, l)),
            _ => None,
        }
    }

    /// Total horizontal extent: `left + right`.
    #[inline]
    pub fn width(self) -> f32 {
        self.left + self.right
    }

    /// Total vertical extent: `top + bottom`.
    #[inline]
    pub fn height(self) -> f32 {
        self.top + self.bottom
    }
}

impl Add for Spacing {
    type Output = Spacing;
    #[inline]
    fn add(self, rhs: Spacing) -> Spacing {
        Spacing {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -- Point --------------------------------------------------------------

    #[test]
    fn point_add_sub() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 5.0);
        assert_eq!(a + b, Point::new(4.0, 7.0));
        assert_eq!(b - a, Point::new(2.0, 3.0));
    }

    // -- Region -------------------------------------------------------------

    #[test]
    fn region_edges_and_centre() {
        let r = Region::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert_eq!(r.centre(), Point::new(60.0, 45.0));
        assert_eq!(r.size(), Size::new(100.0, 50.0));
    }

    #[test]
    fn region_contains_is_half_open() {
        let r = Region::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.5, 9.5)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains(Point::new(5.0, -0.1)));
    }

    #[test]
    fn region_shrink() {
        let r = Region::new(0.0, 0.0, 100.0, 60.0);
        let s = r.shrink(Spacing::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(s, Region::new(4.0, 1.0, 94.0, 56.0));
    }

    #[test]
    fn region_shrink_clamps_to_zero() {
        let r = Region::new(0.0, 0.0, 6.0, 6.0);
        let s = r.shrink(Spacing::all(5.0));
        assert_eq!(s.width, 0.0);
        assert_eq!(s.height, 0.0);
        assert!(s.is_empty());
    }

    #[test]
    fn region_split_top_and_bottom() {
        let r = Region::new(0.0, 0.0, 100.0, 100.0);
        let (strip, rest) = r.split_top(20.0);
        assert_eq!(strip, Region::new(0.0, 0.0, 100.0, 20.0));
        assert_eq!(rest, Region::new(0.0, 20.0, 100.0, 80.0));

        let (strip, rest) = r.split_bottom(30.0);
        assert_eq!(strip, Region::new(0.0, 70.0, 100.0, 30.0));
        assert_eq!(rest, Region::new(0.0, 0.0, 100.0, 70.0));
    }

    #[test]
    fn region_split_left_and_right() {
        let r = Region::new(10.0, 0.0, 50.0, 10.0);
        let (strip, rest) = r.split_left(15.0);
        assert_eq!(strip, Region::new(10.0, 0.0, 15.0, 10.0));
        assert_eq!(rest, Region::new(25.0, 0.0, 35.0, 10.0));

        let (strip, rest) = r.split_right(100.0);
        assert_eq!(strip, r);
        assert!(rest.is_empty());
    }

    #[test]
    fn region_translate() {
        let r = Region::new(1.0, 1.0, 5.0, 5.0).translate(Point::new(2.0, 3.0));
        assert_eq!(r, Region::new(3.0, 4.0, 5.0, 5.0));
    }

    // -- Spacing ------------------------------------------------------------

    #[test]
    fn spacing_shorthand() {
        assert_eq!(Spacing::from_shorthand(&[5.0]), Some(Spacing::all(5.0)));
        assert_eq!(
            Spacing::from_shorthand(&[1.0, 2.0]),
            Some(Spacing::new(1.0, 2.0, 1.0, 2.0))
        );
        assert_eq!(
            Spacing::from_shorthand(&[1.0, 2.0, 3.0]),
            Some(Spacing::new(1.0, 2.0, 3.0, 2.0))
        );
        assert_eq!(
            Spacing::from_shorthand(&[1.0, 2.0, 3.0, 4.0]),
            Some(Spacing::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(Spacing::from_shorthand(&[]), None);
        assert_eq!(Spacing::from_shorthand(&[1.0; 5]), None);
    }

    #[test]
    fn spacing_extent_and_add() {
        let s = Spacing::new(1.0, 2.0, 3.0, 4.0) + Spacing::all(1.0);
        assert_eq!(s, Spacing::new(2.0, 3.0, 4.0, 5.0));
        assert_eq!(s.width(), 8.0);
        assert_eq!(s.height(), 6.0);
    }
}
