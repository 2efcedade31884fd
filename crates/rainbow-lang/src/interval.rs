use std::fmt::{self, Display, Formatter};
use std::ops::Range;

/// A half-open byte range `[beg, end)` of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    pub beg: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(beg: usize, end: usize) -> Self {
        debug_assert!(beg <= end, "interval begins after its end: [{beg}, {end})");
        Self { beg, end }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.end - self.beg
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.beg >= self.end
    }

    #[inline(always)]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.beg < other.end && self.end > other.beg
    }

    pub fn range(&self) -> Range<usize> {
        self.beg..self.end
    }
}

impl From<Range<usize>> for Interval {
    fn from(range: Range<usize>) -> Self {
        Interval::new(range.start, range.end)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.beg, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::disjoint(Interval::new(0, 3), Interval::new(5, 8), false)]
    #[case::adjacent(Interval::new(0, 3), Interval::new(3, 8), false)]
    #[case::nested(Interval::new(0, 10), Interval::new(3, 4), true)]
    #[case::partial(Interval::new(2, 6), Interval::new(4, 9), true)]
    #[case::empty_inside(Interval::new(0, 10), Interval::new(4, 4), true)]
    #[case::empty_at_end(Interval::new(0, 10), Interval::new(10, 10), false)]
    fn test_overlaps(#[case] a: Interval, #[case] b: Interval, #[case] expected: bool) {
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[rstest]
    #[case(Interval::new(0, 0), 0, true)]
    #[case(Interval::new(3, 8), 5, false)]
    fn test_len(#[case] interval: Interval, #[case] len: usize, #[case] empty: bool) {
        assert_eq!(interval.len(), len);
        assert_eq!(interval.is_empty(), empty);
    }

    #[test]
    fn test_from_range_and_display() {
        let interval = Interval::from(2..7);
        assert_eq!(interval.range(), 2..7);
        assert_eq!(interval.to_string(), "[2, 7)");
    }
}
