//! Cardinal (von Neumann) neighbourhoods on a bounded grid.
//!
//! Both solvers walk neighbours in the order of [NEUMANN_OFFSETS], so ties between
//! equally cheap tiles are broken the same way every run.
use grid_util::point::Point;
use smallvec::SmallVec;

/// West, south, north, east.
pub const NEUMANN_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Maximum number of neighbours of a cell on a 4-grid.
pub const N_NEIGHBOURS: usize = 4;

pub fn in_bounds(point: Point, width: usize, height: usize) -> bool {
    point.x >= 0 && point.y >= 0 && (point.x as usize) < width && (point.y as usize) < height
}

/// Row-major index of a point. The point is assumed to be in bounds.
pub fn index_of(point: Point, width: usize) -> usize {
    point.y as usize * width + point.x as usize
}

pub fn point_of(index: usize, width: usize) -> Point {
    Point::new((index % width) as i32, (index / width) as i32)
}

/// The in-bounds cardinal neighbours of `point`. Offsets leaving the grid are dropped
/// rather than reported.
pub fn neumann_neighbours(
    point: Point,
    width: usize,
    height: usize,
) -> SmallVec<[Point; N_NEIGHBOURS]> {
    NEUMANN_OFFSETS
        .iter()
        .map(|&(dx, dy)| Point::new(point.x + dx, point.y + dy))
        .filter(|&p| in_bounds(p, width, height))
        .collect()
}

/// Computes the neighbour indices of every cell, in row-major order.
pub fn neighbour_index(width: usize, height: usize) -> Vec<SmallVec<[usize; N_NEIGHBOURS]>> {
    (0..width * height)
        .map(|ix| {
            neumann_neighbours(point_of(ix, width), width, height)
                .into_iter()
                .map(|p| index_of(p, width))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_two_neighbours() {
        let n = neumann_neighbours(Point::new(0, 0), 3, 3);
        assert_eq!(n.as_slice(), &[Point::new(0, 1), Point::new(1, 0)]);
    }

    #[test]
    fn interior_order_is_west_south_north_east() {
        let n = neumann_neighbours(Point::new(1, 1), 3, 3);
        assert_eq!(
            n.as_slice(),
            &[
                Point::new(0, 1),
                Point::new(1, 0),
                Point::new(1, 2),
                Point::new(2, 1)
            ]
        );
    }

    #[test]
    fn out_of_bounds_lookups_are_absent() {
        assert!(!in_bounds(Point::new(-1, 0), 4, 4));
        assert!(!in_bounds(Point::new(0, 4), 4, 4));
        assert!(in_bounds(Point::new(3, 3), 4, 4));
        assert!(neumann_neighbours(Point::new(0, 0), 1, 1).is_empty());
    }

    /// Every neighbour is in bounds and exactly one step away.
    #[test]
    fn index_is_cardinal_and_in_bounds() {
        let (w, h) = (5, 3);
        let index = neighbour_index(w, h);
        assert_eq!(index.len(), w * h);
        for (ix, neighbours) in index.iter().enumerate() {
            let p = point_of(ix, w);
            for &n in neighbours {
                let q = point_of(n, w);
                assert!(in_bounds(q, w, h));
                assert_eq!(p.manhattan_distance(&q), 1);
            }
        }
    }

    #[test]
    fn index_round_trips_points() {
        let p = Point::new(3, 2);
        assert_eq!(index_of(p, 7), 17);
        assert_eq!(point_of(17, 7), p);
    }

    #[test]
    fn empty_grid_has_empty_index() {
        assert!(neighbour_index(0, 5).is_empty());
    }
}
