use derive_more::{Add, Sub};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Add, Sub, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle stored as origin plus size.
///
/// Scripts describe rectangles in two conventions that take the same four
/// integers: [`Rect::grp`] reads them as inclusive corners, [`Rect::rec`] as
/// an origin followed by a size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Corners `(x1, y1)`..=`(x2, y2)`, both inclusive. Extents that do not
    /// fit in an `i32` wrap, like the rest of script arithmetic.
    pub fn grp(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            origin: Point::new(x1, y1),
            size: Size::new(
                x2.wrapping_sub(x1).wrapping_add(1),
                y2.wrapping_sub(y1).wrapping_add(1),
            ),
        }
    }

    /// Origin `(x, y)` and extent `width` x `height`.
    pub fn rec(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> i32 {
        self.origin.x
    }

    pub fn y(&self) -> i32 {
        self.origin.y
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.origin.x.wrapping_add(self.size.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.origin.y.wrapping_add(self.size.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size.width <= 0 || self.size.height <= 0
    }

    pub fn contains(&self, point: Point) -> bool {
        let (px, py) = (i64::from(point.x), i64::from(point.y));
        let (x, y) = (i64::from(self.x()), i64::from(self.y()));
        px >= x
            && px < x + i64::from(self.width())
            && py >= y
            && py < y + i64::from(self.height())
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {} {}x{}]",
            self.origin.x, self.origin.y, self.size.width, self.size.height
        )
    }
}
