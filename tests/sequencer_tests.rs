mod common;

use approx::assert_relative_eq;
use astarviz::path::{is_connected, path_cost};
use astarviz::{Engine, EngineStatus, Error, Grid, InvalidConfiguration, Position, SequencerStep};
use common::{assert_walkable, begin, run, run_recording, scene, visualize_route};
use std::f64::consts::SQRT_2;

fn p(row: i32, col: i32) -> Position {
    Position::new(row, col)
}

#[test]
fn test_waypoint_visited_in_order() {
    let scene = scene(&[
        "S.....G.",
        "........",
        "........",
        "........",
        "1.......",
        "........",
        "........",
        "........",
    ]);
    let (mut engine, grid) = begin(&scene);

    let results = run_recording(&mut engine);
    let leg_completions = results
        .iter()
        .filter(|&&r| r == SequencerStep::LegCompleted)
        .count();
    assert_eq!(leg_completions, 1);
    assert_eq!(results.last(), Some(&SequencerStep::AllCompleted));

    let route = engine.route().to_vec();
    println!("{}", visualize_route(&scene, &route));

    // Start -> waypoint is a straight drop down the first column
    assert_eq!(&route[..5], &[p(0, 0), p(1, 0), p(2, 0), p(3, 0), p(4, 0)]);
    // Waypoint -> goal needs 6 moves, and the junction appears once
    assert_eq!(route.len(), 11);
    assert_eq!(route.last(), Some(&p(0, 6)));
    assert_eq!(route.iter().filter(|&&c| c == p(4, 0)).count(), 1);
    assert_walkable(&grid, &route);
    assert_relative_eq!(engine.route_cost(), 6.0 + 4.0 * SQRT_2, epsilon = 1e-9);
}

#[test]
fn test_route_is_concatenation_of_leg_paths() {
    let scene = scene(&[
        "S...■.....",
        "....■..2..",
        "....■.....",
        "....■■■■..",
        "..1.......",
        "........3.",
        "■■■■■■■...",
        "G.........",
    ]);
    let (mut engine, grid) = begin(&scene);
    assert_eq!(engine.legs().len(), 4);
    assert_eq!(run(&mut engine), SequencerStep::AllCompleted);

    let legs = engine.completed_legs();
    assert_eq!(legs.len(), 4);

    let mut stitched: Vec<Position> = Vec::new();
    for summary in legs {
        assert_eq!(summary.path.first(), Some(&summary.leg.origin));
        assert_eq!(summary.path.last(), Some(&summary.leg.target));
        assert!(is_connected(&summary.path));
        assert_relative_eq!(summary.cost, path_cost(&summary.path), epsilon = 1e-9);

        let skip = usize::from(stitched.last() == summary.path.first());
        stitched.extend_from_slice(&summary.path[skip..]);
    }

    assert_eq!(engine.route(), stitched.as_slice());
    assert_walkable(&grid, engine.route());

    let total: f64 = legs.iter().map(|s| s.cost).sum();
    assert_relative_eq!(engine.route_cost(), total, epsilon = 1e-9);
}

#[test]
fn test_enclosed_goal_keeps_completed_legs() {
    let scene = scene(&[
        "S......",
        ".......",
        "...■■■.",
        "...■G■.",
        "...■■■.",
        ".1.....",
        ".......",
    ]);
    let (mut engine, _grid) = begin(&scene);

    let results = run_recording(&mut engine);
    assert_eq!(results.last(), Some(&SequencerStep::Exhausted));
    assert_eq!(
        results
            .iter()
            .filter(|&&r| r == SequencerStep::LegCompleted)
            .count(),
        1
    );
    assert_eq!(engine.status(), EngineStatus::Exhausted);

    // Only the start -> waypoint leg made it into the route
    let route = engine.route();
    assert_eq!(route.first(), Some(&p(0, 0)));
    assert_eq!(route.last(), Some(&p(5, 1)));
    assert_eq!(route.len(), 6);
    assert_eq!(engine.completed_legs().len(), 1);
    assert_eq!(engine.snapshot().route, route.to_vec());

    // The second leg searched everything reachable and left nothing open
    let snapshot = engine.snapshot();
    assert!(snapshot.open.is_empty());
    assert_eq!(snapshot.leg_index, 1);
    assert_eq!(snapshot.closed.len(), 49 - 9);

    // Terminal result repeats without further work
    let expansions = engine.total_expansions();
    assert_eq!(engine.step().unwrap(), SequencerStep::Exhausted);
    assert_eq!(engine.total_expansions(), expansions);
}

#[test]
fn test_unreachable_first_leg_yields_empty_route() {
    let scene = scene(&[
        "S.■...",
        "..■...",
        "■■■...",
        ".....G",
    ]);
    let (mut engine, _grid) = begin(&scene);
    assert_eq!(run(&mut engine), SequencerStep::Exhausted);
    assert!(engine.route().is_empty());
    assert!(engine.completed_legs().is_empty());
    assert_eq!(engine.total_expansions(), 4);
}

#[test]
fn test_repeated_runs_are_identical() {
    let scene = scene(&[
        "S.........",
        "..■■■■■...",
        "......■...",
        "..1...■...",
        "......■..G",
        "..■■■■■...",
        "..........",
    ]);

    let (mut first, _) = begin(&scene);
    assert_eq!(run(&mut first), SequencerStep::AllCompleted);
    let (mut second, _) = begin(&scene);
    assert_eq!(run(&mut second), SequencerStep::AllCompleted);

    assert_eq!(first.route(), second.route());
    assert_eq!(first.total_expansions(), second.total_expansions());
    assert_eq!(first.snapshot(), second.snapshot());

    // Restarting the same engine gives the same answer again
    let grid = scene.restore_grid().unwrap();
    first
        .begin(&grid, scene.start, &scene.waypoints, scene.goal)
        .unwrap();
    assert_eq!(run(&mut first), SequencerStep::AllCompleted);
    assert_eq!(first.route(), second.route());
}

#[test]
fn test_checkpoint_repeated_does_not_duplicate_cells() {
    let grid = Grid::new(5, 5);
    let mut engine = Engine::new();
    engine
        .begin(&grid, Some(p(0, 0)), &[p(0, 0), p(2, 2), p(2, 2)], Some(p(2, 4)))
        .unwrap();
    assert_eq!(run(&mut engine), SequencerStep::AllCompleted);
    assert_eq!(engine.completed_legs().len(), 4);
    assert_eq!(engine.route(), &[p(0, 0), p(1, 1), p(2, 2), p(2, 3), p(2, 4)]);
}

#[test]
fn test_begin_rejects_invalid_checkpoints() {
    let scene = scene(&[
        "S..",
        ".■.",
        "..G",
    ]);
    let grid = scene.restore_grid().unwrap();
    let mut engine = Engine::new();

    let err = engine
        .begin(&grid, scene.start, &[p(1, 1)], scene.goal)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidConfiguration(InvalidConfiguration::Blocked { .. })
    ));
    assert_eq!(
        err.to_string(),
        "Invalid configuration: waypoint 1 (1,1) is on a blocked cell"
    );

    let err = engine.begin(&grid, None, &[], scene.goal).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidConfiguration(InvalidConfiguration::MissingStart)
    ));

    let err = engine
        .begin(&grid, scene.start, &[], Some(p(-1, 2)))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidConfiguration(InvalidConfiguration::OutOfBounds { .. })
    ));

    // Nothing was started by the failed calls
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert_eq!(engine.step().unwrap(), SequencerStep::Idle);
}

#[test]
fn test_reset_abandons_search() {
    let scene = scene(&[
        "S.....",
        "......",
        ".....G",
    ]);
    let (mut engine, _grid) = begin(&scene);
    for _ in 0..2 {
        assert_eq!(engine.step().unwrap(), SequencerStep::InProgress);
    }
    assert!(!engine.snapshot().closed.is_empty());

    engine.reset();
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert!(engine.snapshot().open.is_empty());
    assert!(engine.snapshot().costs.is_empty());
    assert_eq!(engine.step().unwrap(), SequencerStep::Idle);
}
