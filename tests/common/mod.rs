#![allow(dead_code)]

use astarviz::path::is_connected;
use astarviz::{Engine, Grid, Position, Scene, SequencerStep};

/// Safety net for loops that drive the engine
pub const MAX_STEPS: usize = 100_000;

/// Build a scene from layout rows (`■` wall, `.` free, `S`/`G`, `1`..`3`)
pub fn scene(rows: &[&str]) -> Scene {
    Scene::parse_layout(&rows.join("\n")).expect("test layout should parse")
}

/// Engine already started on the scene's grid and checkpoints
pub fn begin(scene: &Scene) -> (Engine, Grid) {
    let grid = scene.restore_grid().expect("test scene should fit a grid");
    let mut engine = Engine::new();
    engine
        .begin(&grid, scene.start, &scene.waypoints, scene.goal)
        .expect("test scene should be a valid configuration");
    (engine, grid)
}

/// Step until a terminal result, collecting every result along the way
pub fn run_recording(engine: &mut Engine) -> Vec<SequencerStep> {
    let mut results = Vec::new();
    for _ in 0..MAX_STEPS {
        let result = engine.step().expect("engine step should not fail");
        results.push(result);
        match result {
            SequencerStep::InProgress | SequencerStep::LegCompleted => continue,
            _ => return results,
        }
    }
    panic!("search did not finish within {} steps", MAX_STEPS);
}

/// Step until a terminal result and return it
pub fn run(engine: &mut Engine) -> SequencerStep {
    *run_recording(engine).last().expect("at least one step")
}

/// Route drawn over the scene, for failure messages
pub fn visualize_route(scene: &Scene, route: &[Position]) -> String {
    format!("\n{}", scene.render_route(route))
}

/// A route is walkable if it is 8-connected, avoids walls and never repeats a cell back to back
pub fn assert_walkable(grid: &Grid, route: &[Position]) {
    assert!(is_connected(route), "route is not 8-connected: {:?}", route);
    for pos in route {
        assert!(!grid.is_blocked(*pos), "route crosses wall at {}", pos);
    }
}
