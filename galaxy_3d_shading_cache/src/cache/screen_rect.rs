/// Screen rectangle - axis-aligned pixel-space bounds.
///
/// Inclusive on both ends. A rect is valid iff `max_x >= min_x && max_y >= min_y`.
/// The canonical empty rect is `ScreenRect::EMPTY` (`max_x = -1`), a sentinel
/// distinct from any clamped zero-area rect.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Default for ScreenRect {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl ScreenRect {
    /// Canonical empty rect
    pub const EMPTY: ScreenRect = ScreenRect { min_x: 0, min_y: 0, max_x: -1, max_y: -1 };

    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Whole canvas `[0, width-1] x [0, height-1]`
    pub fn full(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::EMPTY;
        }
        Self::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    pub fn is_valid(&self) -> bool {
        self.max_x >= self.min_x && self.max_y >= self.min_y
    }

    /// Width in pixels (0 when invalid, saturating at `u32::MAX`)
    pub fn width(&self) -> u32 {
        self.span_x().min(u32::MAX as u64) as u32
    }

    /// Height in pixels (0 when invalid, saturating at `u32::MAX`)
    pub fn height(&self) -> u32 {
        self.span_y().min(u32::MAX as u64) as u32
    }

    /// Pixel count (0 when invalid, saturating at `u64::MAX`)
    pub fn area(&self) -> u64 {
        self.span_x().saturating_mul(self.span_y())
    }

    fn span_x(&self) -> u64 {
        if self.is_valid() { (self.max_x as i64 - self.min_x as i64 + 1) as u64 } else { 0 }
    }

    fn span_y(&self) -> u64 {
        if self.is_valid() { (self.max_y as i64 - self.min_y as i64 + 1) as u64 } else { 0 }
    }

    /// Smallest rect covering both. An invalid operand is ignored.
    pub fn union(&self, other: &ScreenRect) -> ScreenRect {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => Self::EMPTY,
            (false, true) => *other,
            (true, false) => *self,
            (true, true) => Self::new(
                self.min_x.min(other.min_x),
                self.min_y.min(other.min_y),
                self.max_x.max(other.max_x),
                self.max_y.max(other.max_y),
            ),
        }
    }

    /// Union of every rect in `rects` (EMPTY if none is valid)
    pub fn union_all<'a, I>(rects: I) -> ScreenRect
    where
        I: IntoIterator<Item = &'a ScreenRect>,
    {
        rects.into_iter().fold(Self::EMPTY, |acc, r| acc.union(r))
    }

    /// Whether the two rects share at least one pixel
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.is_valid() && other.is_valid()
            && self.min_x <= other.max_x && other.min_x <= self.max_x
            && self.min_y <= other.max_y && other.min_y <= self.max_y
    }

    /// Whether the two rects overlap or share an edge (no pixel gap between them)
    pub fn touches(&self, other: &ScreenRect) -> bool {
        self.is_valid() && other.is_valid()
            && self.min_x as i64 <= other.max_x as i64 + 1
            && other.min_x as i64 <= self.max_x as i64 + 1
            && self.min_y as i64 <= other.max_y as i64 + 1
            && other.min_y as i64 <= self.max_y as i64 + 1
    }

    /// Whether `other` lies entirely inside `self`
    pub fn contains(&self, other: &ScreenRect) -> bool {
        self.is_valid() && other.is_valid()
            && self.min_x <= other.min_x && self.max_x >= other.max_x
            && self.min_y <= other.min_y && self.max_y >= other.max_y
    }

    /// Grow by `px` on every side, without clamping
    pub fn expand(&self, px: i32) -> ScreenRect {
        if !self.is_valid() {
            return Self::EMPTY;
        }
        Self::new(
            self.min_x.saturating_sub(px),
            self.min_y.saturating_sub(px),
            self.max_x.saturating_add(px),
            self.max_y.saturating_add(px),
        )
    }

    /// Intersect with the canvas. Returns EMPTY when nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> ScreenRect {
        self.clamp_to_canvas(&Self::full(width, height))
    }

    fn clamp_to_canvas(&self, canvas: &ScreenRect) -> ScreenRect {
        if !self.intersects(canvas) {
            return Self::EMPTY;
        }
        Self::new(
            self.min_x.max(canvas.min_x),
            self.min_y.max(canvas.min_y),
            self.max_x.min(canvas.max_x),
            self.max_y.min(canvas.max_y),
        )
    }

    /// Whether the rect lies within `[0, width-1] x [0, height-1]`
    pub fn fits(&self, width: u32, height: u32) -> bool {
        Self::full(width, height).contains(self)
    }
}

/// Merge overlapping or adjacent rects until every remaining pair is disjoint
/// with at least one pixel gap. Invalid rects are dropped.
///
/// The result covers every pixel of the input and never more than the union
/// of each merged group's bounding boxes.
pub fn merge_regions(rects: &[ScreenRect]) -> Vec<ScreenRect> {
    let mut merged: Vec<ScreenRect> = rects.iter().copied().filter(ScreenRect::is_valid).collect();

    'restart: loop {
        for i in 0..merged.len() {
            for j in (i + 1)..merged.len() {
                if merged[i].touches(&merged[j]) {
                    let other = merged.swap_remove(j);
                    merged[i] = merged[i].union(&other);
                    continue 'restart;
                }
            }
        }
        break;
    }

    merged
}

#[cfg(test)]
#[path = "screen_rect_tests.rs"]
mod tests;
