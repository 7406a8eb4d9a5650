use arboard::Clipboard;
use astarviz::config::{SearchConfig, CONFIG_PATH};
use astarviz::path::format_path;
use astarviz::{
    CellState, Config, Engine, EngineSnapshot, EngineStatus, Error, Grid, Position, Result, Scene,
    SequencerStep, MAX_WAYPOINTS,
};
use log::{debug, error, info, warn};
use macroquad::prelude::*;

/// What the next left click on the grid does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Paint,
    Start,
    Goal,
    Waypoint,
}

fn rgb(c: [u8; 3]) -> Color {
    Color::from_rgba(c[0], c[1], c[2], 255)
}

/// Visualization state
struct VisState {
    config: Config,
    grid: Grid,
    start: Option<Position>,
    waypoints: Vec<Position>,
    goal: Option<Position>,
    engine: Engine,
    snapshot: EngineSnapshot,
    placement: Placement,
    running: bool,
    paused: bool,
    speed: u32,
    last_step_time: f64,
    show_costs: bool,
    status: String,
}

impl VisState {
    fn new(config: Config) -> Self {
        let grid = Grid::new(config.grid.rows, config.grid.cols);
        let speed = config.search.clamped_speed();
        let show_costs = config.visual.show_costs;

        VisState {
            config,
            grid,
            start: None,
            waypoints: Vec::new(),
            goal: None,
            engine: Engine::new(),
            snapshot: EngineSnapshot::empty(),
            placement: Placement::Paint,
            running: false,
            paused: false,
            speed,
            last_step_time: 0.0,
            show_costs,
            status: "Set start (S) and goal (G), then press Space".to_string(),
        }
    }

    fn cell_size(&self) -> f32 {
        self.config.grid.cell_size
    }

    fn mouse_cell(&self) -> Option<Position> {
        let (mouse_x, mouse_y) = mouse_position();
        if mouse_x < 0.0 || mouse_y < 0.0 {
            return None;
        }
        let pos = Position::new(
            (mouse_y / self.cell_size()) as i32,
            (mouse_x / self.cell_size()) as i32,
        );
        self.grid.in_bounds(pos).then_some(pos)
    }

    fn handle_mouse(&mut self) {
        let Some(pos) = self.mouse_cell() else {
            return;
        };

        match self.placement {
            Placement::Paint => {
                if is_mouse_button_down(MouseButton::Left) {
                    self.grid.set_cell(pos, CellState::Blocked);
                } else if is_mouse_button_down(MouseButton::Right) {
                    self.grid.set_cell(pos, CellState::Free);
                }
            }
            placement if is_mouse_button_pressed(MouseButton::Left) => {
                match placement {
                    Placement::Start => self.start = Some(pos),
                    Placement::Goal => self.goal = Some(pos),
                    Placement::Waypoint => self.waypoints.push(pos),
                    Placement::Paint => {}
                }
                info!("{:?} set at {}", placement, pos);
                self.placement = Placement::Paint;
            }
            _ => {}
        }
    }

    fn handle_keys(&mut self) {
        if is_key_pressed(KeyCode::S) {
            self.start = None;
            self.placement = Placement::Start;
            self.status = "Click a cell to place the start".to_string();
        }
        if is_key_pressed(KeyCode::G) {
            self.goal = None;
            self.placement = Placement::Goal;
            self.status = "Click a cell to place the goal".to_string();
        }
        if is_key_pressed(KeyCode::W) {
            if self.waypoints.len() < MAX_WAYPOINTS {
                self.placement = Placement::Waypoint;
                self.status = format!("Click a cell to place waypoint {}", self.waypoints.len() + 1);
            } else {
                warn!("Maximum number of waypoints ({}) reached", MAX_WAYPOINTS);
                self.status = format!("Maximum number of waypoints ({}) reached", MAX_WAYPOINTS);
            }
        }
        if is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Enter) {
            self.visualize();
        }
        if is_key_pressed(KeyCode::R) {
            self.reset();
        }
        if is_key_pressed(KeyCode::P) && self.running {
            self.paused = !self.paused;
            self.last_step_time = get_time();
        }
        if is_key_pressed(KeyCode::N) && self.running && self.paused {
            self.advance(1);
        }
        if is_key_pressed(KeyCode::T) {
            self.show_costs = !self.show_costs;
        }
        if is_key_pressed(KeyCode::Up) {
            self.speed = (self.speed + 5).min(SearchConfig::MAX_SPEED);
        }
        if is_key_pressed(KeyCode::Down) {
            self.speed = self.speed.saturating_sub(5).max(SearchConfig::MIN_SPEED);
        }
        if is_key_pressed(KeyCode::C) {
            match self.copy_to_clipboard() {
                Ok(()) => self.status = "Layout copied to clipboard".to_string(),
                Err(e) => self.report(e),
            }
        }
        if is_key_pressed(KeyCode::V) {
            match self.paste_from_clipboard() {
                Ok(()) => self.status = "Layout pasted from clipboard".to_string(),
                Err(e) => self.report(e),
            }
        }
        if is_key_pressed(KeyCode::F5) {
            let path = self.config.scene.path.clone();
            match self.current_scene().save_to_file(&path) {
                Ok(()) => {
                    info!("Scene saved to {}", path);
                    self.status = format!("Saved {}", path);
                }
                Err(e) => self.report(e),
            }
        }
        if is_key_pressed(KeyCode::F9) {
            let path = self.config.scene.path.clone();
            match Scene::load_from_file(&path) {
                Ok(scene) => match self.apply_scene(scene) {
                    Ok(()) => {
                        info!("Scene loaded from {}", path);
                        self.status = format!("Loaded {}", path);
                    }
                    Err(e) => self.report(e),
                },
                Err(e) => self.report(e),
            }
        }
    }

    fn report(&mut self, e: Error) {
        warn!("{}", e);
        self.status = e.to_string();
    }

    fn visualize(&mut self) {
        match self
            .engine
            .begin(&self.grid, self.start, &self.waypoints, self.goal)
        {
            Ok(()) => {
                self.running = true;
                self.paused = false;
                self.last_step_time = get_time();
                self.snapshot = self.engine.snapshot();
                self.status = "Searching...".to_string();
            }
            Err(e) => self.report(e),
        }
    }

    fn reset(&mut self) {
        self.grid.clear();
        self.start = None;
        self.goal = None;
        self.waypoints.clear();
        self.engine.reset();
        self.snapshot = EngineSnapshot::empty();
        self.running = false;
        self.paused = false;
        self.placement = Placement::Paint;
        self.status = "Reset".to_string();
    }

    /// Take up to `steps` engine steps, stopping at a terminal result
    fn advance(&mut self, steps: u32) {
        for _ in 0..steps {
            match self.engine.step() {
                Ok(SequencerStep::InProgress) | Ok(SequencerStep::LegCompleted) => {}
                Ok(SequencerStep::AllCompleted) => {
                    self.running = false;
                    self.status = format!(
                        "Route found: {} cells, cost {:.2}",
                        self.engine.route().len(),
                        self.engine.route_cost()
                    );
                    info!("{}", self.status);
                    debug!("Route: {}", format_path(self.engine.route()));
                    break;
                }
                Ok(SequencerStep::Exhausted) => {
                    self.running = false;
                    let leg = self.engine.leg_index() + 1;
                    self.status = format!("No path for leg {}", leg);
                    warn!("{}", self.status);
                    break;
                }
                Ok(SequencerStep::Idle) => {
                    self.running = false;
                    break;
                }
                Err(e) => {
                    error!("Search aborted: {}", e);
                    self.running = false;
                    self.status = e.to_string();
                    break;
                }
            }
        }
        self.snapshot = self.engine.snapshot();
    }

    /// Step the engine at the configured cadence
    fn tick(&mut self) {
        if !self.running || self.paused {
            return;
        }
        let interval = SearchConfig {
            speed: self.speed,
            ..self.config.search.clone()
        }
        .step_interval()
        .as_secs_f64();
        let now = get_time();
        let due = ((now - self.last_step_time) / interval).floor() as u32;
        if due == 0 {
            return;
        }
        let cap = self.config.search.steps_per_frame_cap.max(1);
        if due > cap {
            self.last_step_time = now;
        } else {
            self.last_step_time += f64::from(due) * interval;
        }
        self.advance(due.min(cap));
    }

    fn current_scene(&self) -> Scene {
        Scene::from_parts(&self.grid, self.start, &self.waypoints, self.goal)
    }

    fn apply_scene(&mut self, scene: Scene) -> Result<()> {
        let grid = scene.restore_grid()?;
        if scene.grid_rows != self.grid.rows || scene.grid_cols != self.grid.cols {
            info!(
                "Scene grid is {}x{}, window grid was {}x{}",
                scene.grid_rows, scene.grid_cols, self.grid.rows, self.grid.cols
            );
        }
        self.grid = grid;
        self.start = scene.start;
        self.goal = scene.goal;
        self.waypoints = scene.waypoints;
        self.waypoints.truncate(MAX_WAYPOINTS);
        self.engine.reset();
        self.snapshot = EngineSnapshot::empty();
        self.running = false;
        self.paused = false;
        Ok(())
    }

    fn copy_to_clipboard(&self) -> Result<()> {
        let layout = self.current_scene().to_layout()?;
        let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        clipboard
            .set_text(layout)
            .map_err(|e| Error::Clipboard(e.to_string()))?;
        info!("Grid layout copied to clipboard");
        // Keep clipboard alive for a moment so clipboard managers can capture it
        std::thread::sleep(std::time::Duration::from_millis(100));
        Ok(())
    }

    fn paste_from_clipboard(&mut self) -> Result<()> {
        let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        let text = clipboard
            .get_text()
            .map_err(|e| Error::Clipboard(e.to_string()))?;
        let scene = Scene::parse_layout(&text)?;
        info!(
            "Pasted {}x{} layout from clipboard",
            scene.grid_rows, scene.grid_cols
        );
        self.apply_scene(scene)
    }

    fn cell_center(&self, pos: Position) -> (f32, f32) {
        let size = self.cell_size();
        (
            (pos.col as f32 + 0.5) * size,
            (pos.row as f32 + 0.5) * size,
        )
    }

    fn draw(&self) {
        let colors = &self.config.visual.colors;
        let size = self.cell_size();
        clear_background(rgb(colors.background));

        // Draw cells
        for row in 0..self.grid.rows {
            for col in 0..self.grid.cols {
                let pos = Position::new(row, col);
                let color = if self.grid.is_blocked(pos) {
                    rgb(colors.obstacle)
                } else if self.snapshot.is_closed(pos) {
                    rgb(colors.closed_set)
                } else if self.snapshot.is_open(pos) {
                    rgb(colors.open_set)
                } else {
                    continue;
                };
                draw_rectangle(col as f32 * size, row as f32 * size, size, size, color);
            }
        }

        // Draw grid
        let width = self.grid.cols as f32 * size;
        let height = self.grid.rows as f32 * size;
        for row in 0..=self.grid.rows {
            let y = row as f32 * size;
            draw_line(0.0, y, width, y, 1.0, rgb(colors.grid_lines));
        }
        for col in 0..=self.grid.cols {
            let x = col as f32 * size;
            draw_line(x, 0.0, x, height, 1.0, rgb(colors.grid_lines));
        }

        // Draw route
        for pair in self.snapshot.route.windows(2) {
            let (x1, y1) = self.cell_center(pair[0]);
            let (x2, y2) = self.cell_center(pair[1]);
            draw_line(x1, y1, x2, y2, 3.0, rgb(colors.path));
        }

        // Draw special nodes
        let radius = size * 0.4;
        if let Some(start) = self.start {
            let (x, y) = self.cell_center(start);
            draw_circle(x, y, radius, rgb(colors.start));
        }
        if let Some(goal) = self.goal {
            let (x, y) = self.cell_center(goal);
            draw_circle(x, y, radius, rgb(colors.goal));
        }
        for (i, &waypoint) in self.waypoints.iter().enumerate() {
            let (x, y) = self.cell_center(waypoint);
            draw_circle(x, y, radius, rgb(colors.waypoint));
            draw_text(&(i + 1).to_string(), x - radius * 0.5, y + radius * 0.5, size, BLACK);
        }

        if self.show_costs {
            self.draw_costs();
        }
        self.draw_panel(width);
    }

    /// f on the top line, g and h below
    fn draw_costs(&self) {
        let size = self.cell_size();
        let font_size = (size / 3.0).max(6.0);
        for (pos, cost) in &self.snapshot.costs {
            let x = pos.col as f32 * size;
            let y = pos.row as f32 * size;
            draw_text(&format!("{:.1}", cost.f), x + 1.0, y + font_size, font_size, WHITE);
            draw_text(&format!("{:.1}", cost.g), x + 1.0, y + 2.0 * font_size, font_size, WHITE);
            draw_text(
                &format!("{:.1}", cost.h),
                x + size / 2.0,
                y + 2.0 * font_size,
                font_size,
                WHITE,
            );
        }
    }

    fn draw_panel(&self, left: f32) {
        let x = left + 10.0;
        let accent = Color::from_rgba(255, 127, 80, 255);
        let state = match self.engine.status() {
            EngineStatus::Idle => "idle",
            EngineStatus::Running if self.paused => "paused",
            EngineStatus::Running => "running",
            EngineStatus::Completed => "completed",
            EngineStatus::Exhausted => "no path",
        };

        let mut lines = vec![
            format!("Search: {}", state),
            format!(
                "Leg: {}/{}",
                (self.snapshot.leg_index + 1).min(self.snapshot.leg_count),
                self.snapshot.leg_count
            ),
            format!("Speed: {}", self.speed),
            format!("Expanded: {}", self.engine.total_expansions()),
            format!(
                "Open: {}  Closed: {}",
                self.snapshot.open.len(),
                self.snapshot.closed.len()
            ),
            format!(
                "Route: {} cells, cost {:.2}",
                self.snapshot.route.len(),
                self.engine.route_cost()
            ),
            format!("Waypoints: {}/{}", self.waypoints.len(), MAX_WAYPOINTS),
            String::new(),
            "S/G/W: place start/goal/waypoint".to_string(),
            "LMB/RMB drag: paint/erase walls".to_string(),
            "Space: visualize  R: reset".to_string(),
            "P: pause  N: step  T: costs".to_string(),
            "Up/Down: speed".to_string(),
            "C/V: copy/paste layout".to_string(),
            "F5/F9: save/load scene".to_string(),
            "Esc: quit".to_string(),
            String::new(),
        ];

        if let Some(revision) = self.engine.grid_revision() {
            if revision != self.grid.get_revision() {
                lines.push("Grid edited since start;".to_string());
                lines.push("press Space to rerun".to_string());
            }
        }

        let mut y = 24.0;
        for line in &lines {
            draw_text(line, x, y, 18.0, accent);
            y += 20.0;
        }
        draw_text(&self.status, x, y + 10.0, 18.0, WHITE);
    }
}

fn window_conf() -> Conf {
    let config = Config::load_from(CONFIG_PATH).unwrap_or_default();
    let size = config.grid.cell_size;
    Conf {
        window_title: config.visual.window_title.clone(),
        window_width: (config.grid.cols as f32 * size + config.visual.panel_width) as i32,
        window_height: (config.grid.rows as f32 * size).max(480.0) as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let loaded = Config::load_from(CONFIG_PATH);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    let config = Config::resolve(loaded);

    let mut state = VisState::new(config);

    loop {
        // Close window on Escape
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        state.handle_keys();
        state.handle_mouse();
        state.tick();
        state.draw();

        next_frame().await
    }
}
