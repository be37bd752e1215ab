//! Logical-space geometry primitives
//!
//! All coordinates handled by the core live in the global logical space that
//! monitors are arranged in. Values are `f64` so that fractional scales and
//! cross-monitor translations round-trip without accumulating error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// A point (or vector) in logical space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when interpreted as a vector
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    /// Unit vector in the same direction, or the zero vector for zero input
    pub fn normalize(&self) -> Point {
        let len = self.length();
        if len == 0.0 {
            return Point::default();
        }
        Point::new(self.x / len, self.y / len)
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x as f64, y as f64)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A size in logical space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

impl From<(f64, f64)> for Size {
    fn from((w, h): (f64, f64)) -> Self {
        Size::new(w, h)
    }
}

impl From<(i32, i32)> for Size {
    fn from((w, h): (i32, i32)) -> Self {
        Size::new(w as f64, h as f64)
    }
}

impl Mul<f64> for Size {
    type Output = Size;
    fn mul(self, rhs: f64) -> Size {
        Size::new(self.w * rhs, self.h * rhs)
    }
}

impl Div<f64> for Size {
    type Output = Size;
    fn div(self, rhs: f64) -> Size {
        Size::new(self.w / rhs, self.h / rhs)
    }
}

/// An axis-aligned rectangle, half-open on the right and bottom edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub loc: Point,
    pub size: Size,
}

impl Rectangle {
    pub fn new(loc: impl Into<Point>, size: impl Into<Size>) -> Self {
        Self {
            loc: loc.into(),
            size: size.into(),
        }
    }

    /// Convenience constructor from `x, y, w, h`
    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(w, h))
    }

    pub fn right(&self) -> f64 {
        self.loc.x + self.size.w
    }

    pub fn bottom(&self) -> f64 {
        self.loc.y + self.size.h
    }

    /// Bottom-right corner
    pub fn extent(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.loc.x + self.size.w / 2.0,
            self.loc.y + self.size.h / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.loc.x
            && point.y >= self.loc.y
            && point.x < self.right()
            && point.y < self.bottom()
    }

    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.loc.x < other.right()
            && other.loc.x < self.right()
            && self.loc.y < other.bottom()
            && other.loc.y < self.bottom()
    }

    /// Grow the rectangle by `amount` on every side
    pub fn expand(&self, amount: f64) -> Rectangle {
        Rectangle::from_xywh(
            self.loc.x - amount,
            self.loc.y - amount,
            self.size.w + amount * 2.0,
            self.size.h + amount * 2.0,
        )
    }

    pub fn translate(&self, offset: Point) -> Rectangle {
        Rectangle {
            loc: self.loc + offset,
            size: self.size,
        }
    }

    /// Squared distance from `point` to the closest point of this rectangle.
    ///
    /// Zero when the point lies inside.
    pub fn distance_squared_to(&self, point: Point) -> f64 {
        let dx = (self.loc.x - point.x).max(0.0).max(point.x - self.right());
        let dy = (self.loc.y - point.y).max(0.0).max(point.y - self.bottom());
        dx * dx + dy * dy
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {} {}x{}]",
            self.loc.x, self.loc.y, self.size.w, self.size.h
        )
    }
}

/// Cardinal direction used by directional focus and monitor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Parse a direction token.
    ///
    /// Accepts the single-letter forms `l r u d t b` (`t`/`b` being aliases for
    /// up/down) as well as the full words.
    pub fn parse(token: &str) -> Option<Direction> {
        match token {
            "l" | "left" => Some(Direction::Left),
            "r" | "right" => Some(Direction::Right),
            "u" | "t" | "up" | "top" => Some(Direction::Up),
            "d" | "b" | "down" | "bottom" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Unit vector pointing in this direction (y grows downwards)
    pub fn vector(self) -> Point {
        match self {
            Direction::Left => Point::new(-1.0, 0.0),
            Direction::Right => Point::new(1.0, 0.0),
            Direction::Up => Point::new(0.0, -1.0),
            Direction::Down => Point::new(0.0, 1.0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let rect = Rectangle::from_xywh(0.0, 0.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(99.9, 49.9)));
        assert!(!rect.contains(Point::new(100.0, 10.0)));
        assert!(!rect.contains(Point::new(10.0, 50.0)));
    }

    #[test]
    fn distance_squared_is_zero_inside() {
        let rect = Rectangle::from_xywh(10.0, 10.0, 20.0, 20.0);
        assert_eq!(rect.distance_squared_to(Point::new(15.0, 15.0)), 0.0);
        assert_eq!(rect.distance_squared_to(Point::new(0.0, 15.0)), 100.0);
        // corner: 3-4-5 triangle
        assert_eq!(rect.distance_squared_to(Point::new(33.0, 34.0)), 25.0);
    }

    #[test]
    fn expand_grows_every_side() {
        let rect = Rectangle::from_xywh(10.0, 10.0, 20.0, 20.0).expand(5.0);
        assert_eq!(rect, Rectangle::from_xywh(5.0, 5.0, 30.0, 30.0));
    }

    #[test]
    fn direction_tokens() {
        assert_eq!(Direction::parse("t"), Some(Direction::Up));
        assert_eq!(Direction::parse("b"), Some(Direction::Down));
        assert_eq!(Direction::parse("left"), Some(Direction::Left));
        assert_eq!(Direction::parse("x"), None);
    }

    #[test]
    fn normalize_zero_vector() {
        assert_eq!(Point::default().normalize(), Point::default());
        let n = Point::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-9);
    }
}
