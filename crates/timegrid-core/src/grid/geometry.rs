//! Grid coordinates, item rectangles and pixel conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete cell address, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub row: i32,
    pub col: i32,
}

impl GridCoord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Number of rows and columns an item covers. Both must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSize {
    pub rowspan: i32,
    pub colspan: i32,
}

impl ItemSize {
    pub fn new(rowspan: i32, colspan: i32) -> Self {
        Self { rowspan, colspan }
    }

    pub fn is_single_cell(&self) -> bool {
        self.rowspan == 1 && self.colspan == 1
    }

    pub fn is_well_formed(&self) -> bool {
        self.rowspan >= 1 && self.colspan >= 1
    }
}

/// Logical placement of an item. The only input to its pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemPosition {
    pub coord: GridCoord,
    pub size: ItemSize,
}

impl ItemPosition {
    pub fn new(row: i32, col: i32, rowspan: i32, colspan: i32) -> Self {
        Self {
            coord: GridCoord::new(row, col),
            size: ItemSize::new(rowspan, colspan),
        }
    }

    /// Every cell in `[row, row + rowspan) x [col, col + colspan)`.
    pub fn expand_to_coords(&self) -> Vec<GridCoord> {
        debug_assert!(
            self.size.rowspan >= 0 && self.size.colspan >= 0,
            "negative span {:?}",
            self.size
        );
        let (row_end, col_end) = (self.row_end(), self.col_end());
        (self.coord.row..row_end)
            .flat_map(|row| (self.coord.col..col_end).map(move |col| GridCoord { row, col }))
            .collect()
    }

    /// Exclusive end row, saturating at `i32::MAX`.
    pub fn row_end(&self) -> i32 {
        self.coord.row.saturating_add(self.size.rowspan)
    }

    /// Exclusive end column, saturating at `i32::MAX`.
    pub fn col_end(&self) -> i32 {
        self.coord.col.saturating_add(self.size.colspan)
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.row >= self.coord.row
            && coord.row < self.row_end()
            && coord.col >= self.coord.col
            && coord.col < self.col_end()
    }

    pub fn intersects(&self, other: &ItemPosition) -> bool {
        self.coord.row < other.row_end()
            && other.coord.row < self.row_end()
            && self.coord.col < other.col_end()
            && other.coord.col < self.col_end()
    }

    /// Same size, moved to `coord`.
    pub fn at(&self, coord: GridCoord) -> Self {
        Self {
            coord,
            size: self.size,
        }
    }
}

/// Grid size in cells and cell size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub rows: i32,
    pub cols: i32,
    pub row_height: f64,
    pub col_width: f64,
}

impl GridDimensions {
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.row >= 0 && coord.row < self.rows && coord.col >= 0 && coord.col < self.cols
    }

    pub fn cell_count(&self) -> usize {
        (self.rows.max(0) as usize) * (self.cols.max(0) as usize)
    }
}

/// Pixel rectangle as reported by drag/resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Absolute pixel placement of a rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemStyle {
    pub top: f64,
    pub left: f64,
    pub height: f64,
    pub width: f64,
}

impl ItemStyle {
    /// Page rectangle of this style when the grid starts `vertical_offset`
    /// pixels below the page top.
    pub fn to_rectangle(&self, vertical_offset: f64) -> Rectangle {
        Rectangle {
            top: self.top + vertical_offset,
            left: self.left,
            width: self.width,
            height: self.height,
        }
    }
}

impl fmt::Display for ItemStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "position: absolute; top: {}px; left: {}px; height: {}px; width: {}px",
            self.top, self.left, self.height, self.width
        )
    }
}

/// Snap a page rectangle to the grid.
///
/// `vertical_offset` is the height of whatever sits above the grid (the
/// calendar header); it is removed before snapping rows.
pub fn pixel_to_item_position(
    rect: &Rectangle,
    dims: &GridDimensions,
    vertical_offset: f64,
) -> ItemPosition {
    ItemPosition::new(
        ((rect.top - vertical_offset) / dims.row_height).round() as i32,
        (rect.left / dims.col_width).round() as i32,
        (rect.height / dims.row_height).round() as i32,
        (rect.width / dims.col_width).round() as i32,
    )
}

/// Pixel style of a logical position. Exact inverse of
/// [`pixel_to_item_position`] for integral positions.
pub fn item_position_to_style(position: &ItemPosition, dims: &GridDimensions) -> ItemStyle {
    ItemStyle {
        top: f64::from(position.coord.row) * dims.row_height,
        left: f64::from(position.coord.col) * dims.col_width,
        height: f64::from(position.size.rowspan) * dims.row_height,
        width: f64::from(position.size.colspan) * dims.col_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> GridDimensions {
        GridDimensions {
            rows: 10,
            cols: 35,
            row_height: 50.0,
            col_width: 200.0 / 7.0,
        }
    }

    #[test]
    fn expand_covers_rectangle() {
        let coords = ItemPosition::new(1, 2, 2, 3).expand_to_coords();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords.first(), Some(&GridCoord::new(1, 2)));
        assert_eq!(coords.last(), Some(&GridCoord::new(2, 4)));
    }

    #[test]
    fn intersects_matches_expanded_cells() {
        let a = ItemPosition::new(0, 0, 1, 2);
        assert!(a.intersects(&ItemPosition::new(0, 1, 1, 1)));
        assert!(!a.intersects(&ItemPosition::new(1, 0, 1, 1)));
        assert!(!a.intersects(&ItemPosition::new(0, 2, 1, 1)));
        assert!(a.contains(GridCoord::new(0, 1)));
        assert!(!a.contains(GridCoord::new(0, 2)));
    }

    #[test]
    fn style_from_position() {
        let style = item_position_to_style(&ItemPosition::new(2, 7, 1, 4), &dims());
        assert_eq!(style.top, 100.0);
        assert!((style.left - 200.0).abs() < 1e-9);
        assert_eq!(style.height, 50.0);
        assert!((style.width - 800.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn pixel_conversion_removes_vertical_offset() {
        let rect = Rectangle {
            top: 100.0 + 150.0,
            left: 60.0,
            width: 90.0,
            height: 50.0,
        };
        let grid = GridDimensions {
            rows: 10,
            cols: 20,
            row_height: 50.0,
            col_width: 30.0,
        };
        assert_eq!(
            pixel_to_item_position(&rect, &grid, 100.0),
            ItemPosition::new(3, 2, 1, 3)
        );
    }

    #[test]
    fn round_trip_through_style() {
        let position = ItemPosition::new(4, 13, 1, 5);
        let style = item_position_to_style(&position, &dims());
        let back = pixel_to_item_position(&style.to_rectangle(100.0), &dims(), 100.0);
        assert_eq!(back, position);
    }

    #[test]
    fn style_renders_as_css() {
        let style = ItemStyle {
            top: 50.0,
            left: 0.0,
            height: 50.0,
            width: 120.0,
        };
        assert_eq!(
            style.to_string(),
            "position: absolute; top: 50px; left: 0px; height: 50px; width: 120px"
        );
    }
}
