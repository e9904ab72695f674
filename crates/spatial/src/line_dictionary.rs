use std::collections::{BTreeMap, HashMap, HashSet};

use foundation::math::Vec2;
use tracing::debug;

use crate::error::{Result, SpatialError};
use crate::grid::{GridCell, segment_cells};
use crate::line_point::distance_to_line;
use crate::point_dictionary::ActivePredicate;

/// A single straight piece of an indexed line.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Segment {
    pub line_id: u64,
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn distance_to(&self, target: Vec2) -> f64 {
        distance_to_line(target, self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineEntry<T> {
    pub id: u64,
    pub value: T,
    pub segments: Vec<Segment>,
}

/// Position of a segment inside its line, as stored in the tiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct SegmentRef {
    line_id: u64,
    index: usize,
}

/// Grid-hashed polylines answering nearest-line queries.
///
/// Every segment is registered in each cell it crosses (see
/// [`segment_cells`]); queries gather segments from the 3x3 block of cells
/// around the target.
///
/// Ordering contract:
/// - Line ids start at 1 and are never reused.
/// - Candidate segments are visited column by column over the 3x3 block and
///   in insertion order within a cell; ties on distance keep the first one
///   visited.
pub struct LineDictionary<T> {
    grid_size: f64,
    tiles: HashMap<GridCell, Vec<SegmentRef>>,
    lines: BTreeMap<u64, LineEntry<T>>,
    is_active: Option<ActivePredicate<T>>,
    seq: u64,
}

impl<T> LineDictionary<T> {
    pub fn new(grid_size: f64) -> Self {
        Self {
            grid_size,
            tiles: HashMap::new(),
            lines: BTreeMap::new(),
            is_active: None,
            seq: 0,
        }
    }

    pub fn with_active_test(mut self, is_active: impl Fn(&T) -> bool + 'static) -> Self {
        self.is_active = Some(Box::new(is_active));
        self
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&LineEntry<T>> {
        self.lines.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineEntry<T>> {
        self.lines.values()
    }

    /// Index the polyline through `points`. A single point is accepted and
    /// produces a line without segments.
    pub fn add(&mut self, points: &[Vec2], value: T) -> Result<u64> {
        if points.is_empty() {
            return Err(SpatialError::EmptyPath);
        }
        self.seq += 1;
        let line_id = self.seq;

        let segments: Vec<Segment> = points
            .windows(2)
            .map(|w| Segment {
                line_id,
                start: w[0],
                end: w[1],
            })
            .collect();

        for (index, seg) in segments.iter().enumerate() {
            for cell in segment_cells(seg.start, seg.end, self.grid_size) {
                self.tiles
                    .entry(cell)
                    .or_default()
                    .push(SegmentRef { line_id, index });
            }
        }

        self.lines.insert(
            line_id,
            LineEntry {
                id: line_id,
                value,
                segments,
            },
        );
        Ok(line_id)
    }

    fn segment(&self, r: SegmentRef) -> Option<&Segment> {
        self.lines.get(&r.line_id)?.segments.get(r.index)
    }

    fn test_active(&self, value: &T) -> bool {
        self.is_active.as_ref().is_none_or(|f| f(value))
    }

    /// Unique segments of active lines in the 3x3 block around `target`.
    pub fn segments_near(&self, target: Vec2, is_active: impl Fn(&T) -> bool) -> Vec<&Segment> {
        let mut seen: HashSet<SegmentRef> = HashSet::new();
        let mut out = Vec::new();
        for cell in GridCell::of(target, self.grid_size).neighbourhood() {
            let Some(refs) = self.tiles.get(&cell) else {
                continue;
            };
            for r in refs {
                if !seen.insert(*r) {
                    continue;
                }
                let Some(line) = self.lines.get(&r.line_id) else {
                    continue;
                };
                if !is_active(&line.value) {
                    continue;
                }
                if let Some(seg) = self.segment(*r) {
                    out.push(seg);
                }
            }
        }
        out
    }

    /// Value of the line closest to `target`, if within `max_dist` cells.
    pub fn get_closest(&self, target: Vec2, max_dist: f64) -> Option<&T> {
        self.get_closest_where(target, max_dist, |v| self.test_active(v))
    }

    pub fn get_closest_where(
        &self,
        target: Vec2,
        max_dist: f64,
        is_active: impl Fn(&T) -> bool,
    ) -> Option<&T> {
        let mut best: Option<(u64, f64)> = None;
        for seg in self.segments_near(target, is_active) {
            let d = seg.distance_to(target);
            if best.is_none_or(|(_, min)| d < min) {
                best = Some((seg.line_id, d));
            }
        }
        let (line_id, min) = best?;
        if min > max_dist * self.grid_size {
            return None;
        }
        self.lines.get(&line_id).map(|l| &l.value)
    }

    /// The closest line followed by every other line within `epsilon` of it.
    ///
    /// Ties are collected against the running minimum while scanning: when a
    /// strictly closer segment shows up, earlier candidates survive only if
    /// they fall inside the new `[min, min + epsilon]` window. Results are
    /// unique per line; `filter(min, other)` can veto any of the extras.
    pub fn get_all_closest(
        &self,
        target: Vec2,
        epsilon: f64,
        max_dist: f64,
        filter: Option<&dyn Fn(&T, &T) -> bool>,
    ) -> Vec<&T> {
        self.get_all_closest_where(target, epsilon, max_dist, filter, |v| self.test_active(v))
    }

    pub fn get_all_closest_where(
        &self,
        target: Vec2,
        epsilon: f64,
        max_dist: f64,
        filter: Option<&dyn Fn(&T, &T) -> bool>,
        is_active: impl Fn(&T) -> bool,
    ) -> Vec<&T> {
        let mut min: Option<(u64, f64)> = None;
        let mut extras: Vec<(u64, f64)> = Vec::new();

        for seg in self.segments_near(target, is_active) {
            let d = seg.distance_to(target);
            let min_dist = min.map_or(f64::INFINITY, |(_, m)| m);
            if d >= min_dist + epsilon {
                continue;
            }
            if d < min_dist {
                let upper = d + epsilon;
                let mut kept: Vec<(u64, f64)> = Vec::new();
                if let Some(prev) = min.filter(|(_, m)| *m <= upper) {
                    kept.push(prev);
                }
                kept.extend(extras.iter().copied().filter(|(_, e)| *e <= upper));
                extras = kept;
                min = Some((seg.line_id, d));
            } else {
                extras.push((seg.line_id, d));
            }
        }

        let Some((min_id, min_dist)) = min else {
            return Vec::new();
        };
        if min_dist > max_dist * self.grid_size {
            return Vec::new();
        }
        let Some(min_value) = self.lines.get(&min_id).map(|l| &l.value) else {
            return Vec::new();
        };

        let mut unique: HashSet<u64> = HashSet::from([min_id]);
        let mut out = vec![min_value];
        for (id, _) in extras {
            if !unique.insert(id) {
                continue;
            }
            let Some(value) = self.lines.get(&id).map(|l| &l.value) else {
                continue;
            };
            if filter.is_none_or(|f| f(min_value, value)) {
                out.push(value);
            }
        }
        out
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.lines.clear();
    }

    /// Remove the lines matching `filter` from every cell, deleting cells left
    /// empty. Returns the number of removed lines.
    pub fn clear_where(&mut self, mut filter: impl FnMut(&T, u64) -> bool) -> usize {
        let doomed: HashSet<u64> = self
            .lines
            .values()
            .filter(|l| filter(&l.value, l.id))
            .map(|l| l.id)
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        self.lines.retain(|id, _| !doomed.contains(id));
        self.tiles.retain(|_, refs| {
            refs.retain(|r| !doomed.contains(&r.line_id));
            !refs.is_empty()
        });

        debug!(removed = doomed.len(), remaining = self.lines.len(), "line dictionary cleared");
        doomed.len()
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Occupied cells in ascending order.
    pub fn cells(&self) -> Vec<GridCell> {
        let mut cells: Vec<GridCell> = self.tiles.keys().copied().collect();
        cells.sort();
        cells
    }

    /// Number of segment registrations in `cell`.
    pub fn cell_len(&self, cell: GridCell) -> usize {
        self.tiles.get(&cell).map_or(0, Vec::len)
    }
}
