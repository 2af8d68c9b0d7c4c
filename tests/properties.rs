use std::collections::VecDeque;

use grid_astar_layouts::{
    manhattan, FlatSolver, GeneratorConfig, Level, LevelGenerator, ObjectSolver, Pathfinder,
    Point,
};

/// Breadth-first distances from `origin` over walkable tiles; [None] where unreachable.
fn true_distances(level: &Level, origin: Point) -> Vec<Option<i32>> {
    let mut distances = vec![None; level.len()];
    let origin = level.tile_id(origin).unwrap();
    distances[origin.index()] = Some(0);
    let mut queue = VecDeque::from([origin]);
    while let Some(id) = queue.pop_front() {
        let d = distances[id.index()].unwrap();
        for &n in level.neighbours(id) {
            if level.tile(n).walkable && distances[n.index()].is_none() {
                distances[n.index()] = Some(d + 1);
                queue.push_back(n);
            }
        }
    }
    distances
}

fn generated_levels() -> Vec<Level> {
    let mut levels = Vec::new();
    for (size, wall_probability, room_density, min_doors, max_doors) in [
        (10, 0.0, 0.1, 0, 4),
        (20, 0.1, 0.1, 0, 4),
        (30, 0.15, 0.2, 4, 10),
    ] {
        let config = GeneratorConfig {
            wall_probability,
            room_density,
            min_doors,
            max_doors,
            ..GeneratorConfig::default()
        }
        .with_size(size, size);
        let mut generator = LevelGenerator::new(config, size as u64).unwrap();
        levels.extend((0..20).map(|_| generator.next_level()));
    }
    levels
}

#[test]
fn generated_corners_are_walkable() {
    for level in generated_levels() {
        let far = Point::new(level.width() as i32 - 1, level.height() as i32 - 1);
        assert!(level.is_walkable(Point::new(0, 0)));
        assert!(level.is_walkable(far));
    }
}

#[test]
fn neighbours_are_in_bounds_and_adjacent() {
    for level in generated_levels() {
        for tile in level.tiles() {
            for &n in &tile.neighbours {
                let p = level.tile(n).position;
                assert!(level.in_bounds(p));
                assert_eq!(tile.position.manhattan_distance(&p), 1);
            }
        }
    }
}

#[test]
fn heuristic_never_overestimates() {
    for level in generated_levels() {
        let target = Point::new(level.width() as i32 - 1, level.height() as i32 - 1);
        let distances = true_distances(&level, target);
        for (tile, distance) in level.tiles().iter().zip(distances) {
            if let Some(d) = distance {
                assert!(manhattan(&tile.position, &target) <= d);
            }
        }
    }
}

#[test]
fn path_lengths_are_optimal() {
    let mut object = ObjectSolver::new();
    let mut flat = FlatSolver::new();
    for mut level in generated_levels() {
        let start = Point::new(0, 0);
        let target = Point::new(level.width() as i32 - 1, level.height() as i32 - 1);
        let expected = true_distances(&level, start)[level.tile_id(target).unwrap().index()]
            .map(|d| d as usize);
        let a = object.find_path(&mut level, start, target).unwrap();
        let b = flat.find_path(&mut level, start, target).unwrap();
        assert_eq!(a.path_length, expected);
        assert_eq!(b.path_length, expected);
        assert_eq!(a.found_path, expected.is_some());
    }
}

#[test]
fn open_grid_corner_to_corner() {
    for n in [1, 2, 5, 17, 40] {
        let mut level = Level::open(n, n);
        let target = Point::new(n as i32 - 1, n as i32 - 1);
        let mut solvers: [Box<dyn Pathfinder>; 2] =
            [Box::new(ObjectSolver::new()), Box::new(FlatSolver::new())];
        for solver in solvers.iter_mut() {
            let result = solver
                .find_path(&mut level, Point::new(0, 0), target)
                .unwrap();
            assert!(result.found_path);
            assert_eq!(result.path_length, Some(2 * (n - 1)));
        }
    }
}

#[test]
fn enclosed_target_is_not_found() {
    // A ring of walls around the target in the middle of a 9x9 level.
    let mut level = Level::open(9, 9);
    for x in 3..=5 {
        for y in 3..=5 {
            if (x, y) != (4, 4) {
                level.set_walkable(Point::new(x, y), false);
            }
        }
    }
    let start = Point::new(0, 0);
    let target = Point::new(4, 4);
    let reachable = level.component_size(start);
    assert_eq!(reachable, 81 - 9);
    let mut solvers: [Box<dyn Pathfinder>; 2] =
        [Box::new(ObjectSolver::new()), Box::new(FlatSolver::new())];
    for solver in solvers.iter_mut() {
        let result = solver.find_path(&mut level, start, target).unwrap();
        assert!(!result.found_path, "{}", solver.name());
        assert_eq!(result.path_length, None);
        assert_eq!(result.closed_size, reachable);
    }
}

#[test]
fn flat_search_is_idempotent() {
    let mut solver = FlatSolver::new();
    for mut level in generated_levels() {
        let start = Point::new(0, 0);
        let target = Point::new(level.width() as i32 - 1, level.height() as i32 - 1);
        let first = solver.find_path(&mut level, start, target).unwrap();
        let second = solver.find_path(&mut level, start, target).unwrap();
        assert_eq!(first.path_length, second.path_length);
        assert_eq!(first.found_path, second.found_path);
        assert_eq!(first.open_size, second.open_size);
        assert_eq!(first.closed_size, second.closed_size);
    }
}

#[test]
fn three_by_three() {
    let mut level = Level::open(3, 3);
    let mut solvers: [Box<dyn Pathfinder>; 2] =
        [Box::new(ObjectSolver::new()), Box::new(FlatSolver::new())];
    for solver in solvers.iter_mut() {
        let result = solver
            .find_path(&mut level, Point::new(0, 0), Point::new(2, 2))
            .unwrap();
        assert!(result.found_path);
        assert_eq!(result.path_length, Some(4));
        assert!(result.time_to_finish >= 0.0);
    }
}

#[test]
fn arbitrary_endpoints() {
    let mut level = Level::open(6, 6);
    let start = Point::new(4, 1);
    let target = Point::new(1, 5);
    let mut solvers: [Box<dyn Pathfinder>; 2] =
        [Box::new(ObjectSolver::new()), Box::new(FlatSolver::new())];
    for solver in solvers.iter_mut() {
        let route = solver.find_route(&mut level, start, target).unwrap();
        assert_eq!(route.result.path_length, Some(7));
        let path = route.path.unwrap();
        assert_eq!(path[0], start);
        assert_eq!(path[7], target);
    }
}
