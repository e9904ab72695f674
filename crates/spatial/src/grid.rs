use std::collections::BTreeSet;
use std::fmt;

use foundation::math::Vec2;

/// Integer address of a square grid cell: `(floor(x / size), floor(y / size))`.
///
/// Displays as `"{x}.{y}"`, the textual key used when exporting tiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
}

impl GridCell {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Cell containing `pos` on a grid with the given cell size.
    pub fn of(pos: Vec2, cell_size: f64) -> Self {
        Self::new(cell_index(pos.x, cell_size), cell_index(pos.y, cell_size))
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The 3x3 block centred on this cell, column by column.
    pub fn neighbourhood(self) -> impl Iterator<Item = GridCell> {
        (-1..=1).flat_map(move |dx| (-1..=1).map(move |dy| self.offset(dx, dy)))
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.x, self.y)
    }
}

pub fn cell_index(coord: f64, cell_size: f64) -> i64 {
    (coord / cell_size).floor() as i64
}

/// Cells crossed by the segment `a -> b`.
///
/// Walks the vertical and horizontal cell boundaries between the endpoints
/// independently, adding one cell per crossing plus the cell of the leftmost
/// endpoint. A horizontal boundary crossed while moving down (left to right)
/// is attributed to the cell below it.
///
/// Vertical segments have no defined slope and cover the column of cells
/// between their endpoints.
pub fn segment_cells(a: Vec2, b: Vec2, cell_size: f64) -> BTreeSet<GridCell> {
    let mut cells = BTreeSet::new();

    let (left, right) = if a.x < b.x { (a, b) } else { (b, a) };
    cells.insert(GridCell::of(left, cell_size));

    let y_min = cell_index(a.y.min(b.y), cell_size);
    let y_max = cell_index(a.y.max(b.y), cell_size);

    if left.x == right.x {
        let column = cell_index(left.x, cell_size);
        for y in y_min..=y_max {
            cells.insert(GridCell::new(column, y));
        }
        return cells;
    }

    let x_min = cell_index(left.x, cell_size);
    let x_max = cell_index(right.x, cell_size);
    let slope = (right.y - left.y) / (right.x - left.x);
    // Intercept in cell units, so `y0 + x * slope` is the cell-space height at
    // cell column boundary `x`.
    let y0 = (left.y - left.x * slope) / cell_size;
    let downwards = right.y < left.y;

    for x in (x_min + 1)..=x_max {
        let y = y0 + x as f64 * slope;
        cells.insert(GridCell::new(x, y.floor() as i64));
    }

    for y in (y_min + 1)..=y_max {
        let x = (y as f64 - y0) / slope;
        let row = if downwards { y - 1 } else { y };
        cells.insert(GridCell::new(x.floor() as i64, row));
    }

    cells
}
