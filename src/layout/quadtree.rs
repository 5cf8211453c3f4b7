use std::ops::Range;

use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: u32 = 12;
const NO_CHILD: usize = usize::MAX;

fn axis_gap(a_low: f32, a_high: f32, b_low: f32, b_high: f32) -> f32 {
    (b_low - a_high).max(a_low - b_high).max(0.0)
}

#[derive(Clone, Debug)]
pub(super) struct Cell {
    pub(super) min: Vec2,
    pub(super) side: f32,
    pub(super) mass: f32,
    pub(super) centroid: Vec2,
    pub(super) max_radius: f32,
    children: [usize; 4],
    items: Range<usize>,
}

impl Cell {
    fn max(&self) -> Vec2 {
        self.min + vec2(self.side, self.side)
    }

    pub(super) fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }

    pub(super) fn gap_sq_to_point(&self, point: Vec2) -> f32 {
        let max = self.max();
        let dx = axis_gap(self.min.x, max.x, point.x, point.x);
        let dy = axis_gap(self.min.y, max.y, point.y, point.y);
        dx * dx + dy * dy
    }

    pub(super) fn gap_sq_to(&self, other: &Cell) -> f32 {
        let (max, other_max) = (self.max(), other.max());
        let dx = axis_gap(self.min.x, max.x, other.min.x, other_max.x);
        let dy = axis_gap(self.min.y, max.y, other.min.y, other_max.y);
        dx * dx + dy * dy
    }
}

fn quadrant(point: Vec2, mid: Vec2) -> usize {
    usize::from(point.x >= mid.x) | (usize::from(point.y >= mid.y) << 1)
}

/// Arena quadtree; cell 0 is the root and leaves own a run of `order`.
pub(super) struct QuadTree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

impl QuadTree {
    pub(super) const ROOT: usize = 0;

    pub(super) fn build(points: &[Vec2], radius: impl Fn(usize) -> f32) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut low, mut high) = (*first, *first);
        for point in rest {
            low = low.min(*point);
            high = high.max(*point);
        }
        if !(low.x.is_finite() && low.y.is_finite() && high.x.is_finite() && high.y.is_finite()) {
            return None;
        }

        let span = high - low;
        let side = span.x.max(span.y) + 2.0;
        let mut tree = Self {
            cells: Vec::new(),
            order: (0..points.len()).collect(),
        };
        tree.split(points, &radius, 0..points.len(), low - vec2(1.0, 1.0), side, 0);
        Some(tree)
    }

    fn split(
        &mut self,
        points: &[Vec2],
        radius: &impl Fn(usize) -> f32,
        items: Range<usize>,
        min: Vec2,
        side: f32,
        depth: u32,
    ) -> usize {
        let members = &self.order[items.clone()];
        let mass = members.len() as f32;
        let centroid = members.iter().fold(Vec2::ZERO, |sum, &index| sum + points[index]) / mass;
        let max_radius = members
            .iter()
            .map(|&index| radius(index))
            .fold(0.0_f32, f32::max);

        let id = self.cells.len();
        self.cells.push(Cell {
            min,
            side,
            mass,
            centroid,
            max_radius,
            children: [NO_CHILD; 4],
            items: items.clone(),
        });
        if items.len() <= LEAF_CAPACITY || depth >= MAX_DEPTH {
            return id;
        }

        let half = side * 0.5;
        let mid = min + vec2(half, half);
        self.order[items.clone()].sort_by_key(|&index| quadrant(points[index], mid));

        let mut counts = [0usize; 4];
        for &index in &self.order[items.clone()] {
            counts[quadrant(points[index], mid)] += 1;
        }
        if counts.iter().any(|&count| count == items.len()) {
            return id;
        }

        let mut start = items.start;
        for (slot, count) in counts.into_iter().enumerate() {
            if count == 0 {
                continue;
            }
            let offset = vec2((slot & 1) as f32, (slot >> 1) as f32) * half;
            let child = self.split(points, radius, start..start + count, min + offset, half, depth + 1);
            self.cells[id].children[slot] = child;
            start += count;
        }
        id
    }

    pub(super) fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    pub(super) fn is_leaf(&self, id: usize) -> bool {
        self.cells[id].children.iter().all(|&child| child == NO_CHILD)
    }

    pub(super) fn children(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.cells[id]
            .children
            .iter()
            .copied()
            .filter(|&child| child != NO_CHILD)
    }

    pub(super) fn items(&self, id: usize) -> &[usize] {
        &self.order[self.cells[id].items.clone()]
    }
}
