use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed interval on the real line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub left: f64,
    pub right: f64,
}

impl Interval {
    pub fn new(left: f64, right: f64) -> Self {
        assert!(left <= right, "interval [{}, {}] is reversed", left, right);
        Self { left, right }
    }

    /// Two closed intervals overlap when they share at least one point
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.left <= other.right && other.left <= self.right
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.left, self.right)
    }
}

/// The interval assigned to one vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexInterval<V> {
    pub vertex: V,
    pub interval: Interval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlaps() {
        let a = Interval::new(0.0, 2.0);
        let b = Interval::new(1.5, 3.0);
        let c = Interval::new(2.0, 4.0);
        let d = Interval::new(2.5, 3.5);

        assert!(a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(!a.overlaps(&d));
        assert!(d.overlaps(&b));
    }

    #[test]
    fn test_display() {
        let a = Interval::new(0.0, 2.0);
        assert_eq!(a.to_string(), "[0, 2]");
        assert_eq!(Interval::new(1.5, 2.5).to_string(), "[1.5, 2.5]");
    }
}
