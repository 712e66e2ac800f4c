//! Grid geometry for the page builder.

use serde::{Deserialize, Serialize};

/// Builder grid pitch in pixels.
pub const GRID_SIZE: u32 = 20;

/// Default footprint of a newly added field.
pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 80;

/// A field's box on the builder canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for GridRect {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl GridRect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rounds every edge to the nearest grid line; sizes never drop below one cell.
    #[must_use]
    pub fn snapped(self) -> Self {
        Self {
            x: snap(self.x),
            y: snap(self.y),
            width: snap(self.width).max(GRID_SIZE),
            height: snap(self.height).max(GRID_SIZE),
        }
    }

    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// True when the interiors intersect; touching edges do not count.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Rounds to the nearest multiple of [`GRID_SIZE`], halves rounding up.
/// Values past the last grid line round down to it.
#[must_use]
pub const fn snap(value: u32) -> u32 {
    value.saturating_add(GRID_SIZE / 2) / GRID_SIZE * GRID_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_rounds_to_nearest_line() {
        assert_eq!(snap(0), 0);
        assert_eq!(snap(9), 0);
        assert_eq!(snap(10), 20);
        assert_eq!(snap(47), 40);
        assert_eq!(snap(51), 60);
    }

    #[test]
    fn snap_saturates_at_the_top_of_the_range() {
        let last_line = u32::MAX / GRID_SIZE * GRID_SIZE;
        assert_eq!(snap(u32::MAX), last_line);

        let rect = GridRect::new(u32::MAX, 0, u32::MAX, 40).snapped();
        assert_eq!(rect.right(), u32::MAX);
    }

    #[test]
    fn snapped_rect_keeps_one_cell_minimum() {
        let rect = GridRect::new(33, 71, 4, 118).snapped();
        assert_eq!(rect, GridRect::new(40, 80, 20, 120));
    }

    #[test]
    fn overlap_ignores_shared_edges() {
        let a = GridRect::new(0, 0, 100, 40);
        let b = GridRect::new(100, 0, 100, 40);
        let c = GridRect::new(80, 20, 100, 40);

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }
}
