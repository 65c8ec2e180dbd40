/// A closed range of ray parameters or coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Interval starting at `min` and running to infinity.
    pub fn from_min(min: f32) -> Self {
        Self::new(min, f32::INFINITY)
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Same lower bound, upper bound replaced by `max`.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }

    /// Expands the interval by delta/2 on each side.
    pub fn expand(&self, delta: f32) -> Interval {
        let padding = delta / 2.0;
        Interval::new(self.min - padding, self.max + padding)
    }

    /// Adds a scalar displacement to both min and max.
    pub fn add_scalar(&self, displacement: f32) -> Interval {
        Interval::new(self.min + displacement, self.max + displacement)
    }

    /// Creates an interval that surrounds two other intervals.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains_is_inclusive() {
        let interval = Interval::new(0.001, 10.0);

        assert!(interval.contains(0.001));
        assert!(interval.contains(10.0));
        assert!(!interval.contains(0.0));
        assert!(!interval.contains(10.1));
    }

    #[test]
    fn test_interval_expand() {
        let expanded = Interval::new(0.0, 10.0).expand(4.0);

        assert_eq!(expanded.min, -2.0);
        assert_eq!(expanded.max, 12.0);
    }

    #[test]
    fn test_interval_narrowing() {
        let ray_t = Interval::from_min(0.001);
        assert_eq!(ray_t.max, f32::INFINITY);

        let narrowed = ray_t.with_max(3.0);
        assert_eq!(narrowed, Interval::new(0.001, 3.0));
    }

    #[test]
    fn test_interval_empty() {
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(Interval::from_min(0.0).contains(1e10));

        let merged = Interval::surrounding(&Interval::EMPTY, &Interval::new(1.0, 2.0));
        assert_eq!(merged, Interval::new(1.0, 2.0));
    }
}
