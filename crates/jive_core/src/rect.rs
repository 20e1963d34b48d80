//! Axis-aligned rectangles used by layout code.

/// An axis-aligned box: `(x, y)` is the top-left origin, `w`/`h` the extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const EMPTY: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Far x edge, `x + w`. Computed in `i64` so extreme coordinates cannot overflow.
    #[inline]
    pub fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both `self` and `other`.
    ///
    /// Extents that do not fit in `i32` saturate at `i32::MAX`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());

        Rect::new(x0, y0, extent(x0, x1), extent(y0, y1))
    }

    /// Overlap of `self` and `other`.
    ///
    /// When the inputs are disjoint on either axis the result is `(0, 0, 0, 0)`,
    /// anchored at the origin rather than at either input. Rectangles that only
    /// touch along an edge overlap with zero width (or height) at that edge.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 < x0 as i64 || y1 < y0 as i64 {
            return Rect::EMPTY;
        }
        Rect::new(x0, y0, extent(x0, x1), extent(y0, y1))
    }
}

#[inline]
fn extent(from: i32, to: i64) -> i32 {
    (to - from as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl From<(i32, i32, i32, i32)> for Rect {
    fn from((x, y, w, h): (i32, i32, i32, i32)) -> Self {
        Rect::new(x, y, w, h)
    }
}

impl From<Rect> for [i32; 4] {
    fn from(r: Rect) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}
