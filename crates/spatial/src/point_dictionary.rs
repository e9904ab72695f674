use std::collections::{BTreeMap, BTreeSet, HashMap};

use foundation::math::Vec2;
use tracing::debug;

use crate::error::{Result, SpatialError};
use crate::grid::GridCell;

/// Predicate deciding whether an entry takes part in proximity queries.
pub type ActivePredicate<T> = Box<dyn Fn(&T) -> bool>;

#[derive(Debug, Clone, PartialEq)]
pub struct PointEntry<T> {
    pub id: u64,
    pub value: T,
    pub position: Vec2,
}

/// Grid-hashed set of points with a fixed display radius.
///
/// A point is registered in its home cell and in every neighbouring cell its
/// radius reaches into, so queries only ever inspect the home cell of the
/// query position.
///
/// Ordering contract:
/// - Ids start at 1, increase by one per `add` and are never reused.
/// - Within a cell, candidates are visited in ascending id order, so the
///   first of several equally close points is the oldest one.
pub struct PointDictionary<T> {
    merge_threshold: f64,
    grid_size: f64,
    radius: f64,
    tiles: HashMap<GridCell, BTreeSet<u64>>,
    points: BTreeMap<u64, PointEntry<T>>,
    is_active: Option<ActivePredicate<T>>,
    seq: u64,
}

impl<T> PointDictionary<T> {
    /// Fails when `grid_size < radius`.
    pub fn new(merge_threshold: f64, grid_size: f64, radius: f64) -> Result<Self> {
        if grid_size < radius {
            return Err(SpatialError::GridSmallerThanRadius { grid_size, radius });
        }
        Ok(Self {
            merge_threshold,
            grid_size,
            radius,
            tiles: HashMap::new(),
            points: BTreeMap::new(),
            is_active: None,
            seq: 0,
        })
    }

    pub fn with_active_test(mut self, is_active: impl Fn(&T) -> bool + 'static) -> Self {
        self.is_active = Some(Box::new(is_active));
        self
    }

    pub fn merge_threshold(&self) -> f64 {
        self.merge_threshold
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&PointEntry<T>> {
        self.points.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointEntry<T>> {
        self.points.values()
    }

    pub fn add(&mut self, position: Vec2, value: T) -> u64 {
        self.seq += 1;
        let id = self.seq;
        for cell in self.cells_for(position) {
            self.tiles.entry(cell).or_default().insert(id);
        }
        self.points.insert(
            id,
            PointEntry {
                id,
                value,
                position,
            },
        );
        id
    }

    /// Cells a point at `pos` is registered in, home cell first.
    ///
    /// Edge neighbours are added when the point lies within `radius` of that
    /// edge. At most one diagonal is considered (left before right, up before
    /// down) and it is added only when the cell-local distance to the shared
    /// corner is below `radius`.
    pub fn cells_for(&self, pos: Vec2) -> Vec<GridCell> {
        let grid = self.grid_size;
        let radius = self.radius;
        let home = GridCell::of(pos, grid);
        let local = Vec2::new(pos.x - home.x as f64 * grid, pos.y - home.y as f64 * grid);

        let mut cells = vec![home];
        let left = local.x < radius;
        let right = local.x > grid - radius;
        let down = local.y < radius;
        let up = local.y > grid - radius;

        if left {
            cells.push(home.offset(-1, 0));
        }
        if right {
            cells.push(home.offset(1, 0));
        }
        if down {
            cells.push(home.offset(0, -1));
        }
        if up {
            cells.push(home.offset(0, 1));
        }

        let diagonal = match (left, right, up, down) {
            (true, _, true, _) => Some((Vec2::new(0.0, grid), -1, 1)),
            (true, _, false, true) => Some((Vec2::new(0.0, 0.0), -1, -1)),
            (false, true, true, _) => Some((Vec2::new(grid, grid), 1, 1)),
            (false, true, false, true) => Some((Vec2::new(grid, 0.0), 1, -1)),
            _ => None,
        };
        if let Some((corner, dx, dy)) = diagonal {
            if local.distance(corner) < radius {
                cells.push(home.offset(dx, dy));
            }
        }

        cells
    }

    /// First point (by id) within the merge threshold of `pos`, home cell only.
    pub fn get_overlapping(&self, pos: Vec2) -> Option<&PointEntry<T>> {
        let ids = self.tiles.get(&GridCell::of(pos, self.grid_size))?;
        ids.iter()
            .filter_map(|id| self.points.get(id))
            .find(|p| pos.distance(p.position) < self.merge_threshold)
    }

    /// Nearest active point strictly within `radius` of `pos`.
    pub fn get_closest_under(&self, pos: Vec2, radius: f64) -> Option<&PointEntry<T>> {
        self.get_closest_under_where(pos, radius, |v| self.test_active(v))
    }

    /// Like [`get_closest_under`](Self::get_closest_under) with a caller
    /// supplied activity test, for values whose state lives elsewhere.
    pub fn get_closest_under_where(
        &self,
        pos: Vec2,
        radius: f64,
        is_active: impl Fn(&T) -> bool,
    ) -> Option<&PointEntry<T>> {
        let ids = self.tiles.get(&GridCell::of(pos, self.grid_size))?;
        let mut closest: Option<(&PointEntry<T>, f64)> = None;
        for point in ids.iter().filter_map(|id| self.points.get(id)) {
            let distance = pos.distance(point.position);
            if distance >= radius || !is_active(&point.value) {
                continue;
            }
            if closest.is_none_or(|(_, min)| distance < min) {
                closest = Some((point, distance));
            }
        }
        closest.map(|(p, _)| p)
    }

    fn test_active(&self, value: &T) -> bool {
        self.is_active.as_ref().is_none_or(|f| f(value))
    }

    /// Drop every point.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.points.clear();
    }

    /// Remove the points matching `filter` from every cell they occupy,
    /// deleting cells left empty. Returns the number of removed points.
    pub fn clear_where(&mut self, mut filter: impl FnMut(&T, u64) -> bool) -> usize {
        let doomed: Vec<(u64, Vec2)> = self
            .points
            .values()
            .filter(|p| filter(&p.value, p.id))
            .map(|p| (p.id, p.position))
            .collect();

        for (id, position) in &doomed {
            for cell in self.cells_for(*position) {
                if let Some(tile) = self.tiles.get_mut(&cell) {
                    tile.remove(id);
                    if tile.is_empty() {
                        self.tiles.remove(&cell);
                    }
                }
            }
            self.points.remove(id);
        }

        if !doomed.is_empty() {
            debug!(removed = doomed.len(), remaining = self.points.len(), "point dictionary cleared");
        }
        doomed.len()
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Number of points registered in `cell`.
    pub fn cell_len(&self, cell: GridCell) -> usize {
        self.tiles.get(&cell).map_or(0, BTreeSet::len)
    }

    /// Occupied cells in ascending order.
    pub fn cells(&self) -> Vec<GridCell> {
        let mut cells: Vec<GridCell> = self.tiles.keys().copied().collect();
        cells.sort();
        cells
    }
}
