mod app;
mod braille;
mod map;
mod ui;

use anyhow::{Context, Result};
use app::{App, ROTATE_STEP_DEGREES};
use clap::{Parser, ValueEnum};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use log::{info, warn};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tui_atlas::{data, GeoPoint, MapContext, MapProjection, ProjectionKind};

/// Terminal world map with switchable projections
#[derive(Parser, Debug)]
#[command(name = "tui-atlas", version, about)]
struct Args {
    /// Directory holding Natural Earth GeoJSON files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Projection to start with
    #[arg(long, value_enum, default_value_t = ProjectionArg::Mercator)]
    projection: ProjectionArg,

    /// Starting center longitude in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    center_lon: f64,

    /// Starting center latitude in degrees (azimuthal projections only)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    center_lat: f64,

    /// Log output file; the terminal is owned by the UI
    #[arg(long, default_value = "tui-atlas.log")]
    log_file: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProjectionArg {
    Mercator,
    Orthographic,
    Mollweide,
    Lambert,
}

impl From<ProjectionArg> for ProjectionKind {
    fn from(arg: ProjectionArg) -> Self {
        match arg {
            ProjectionArg::Mercator => ProjectionKind::Mercator,
            ProjectionArg::Orthographic => ProjectionKind::Orthographic,
            ProjectionArg::Mollweide => ProjectionKind::Mollweide,
            ProjectionArg::Lambert => ProjectionKind::Lambert,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    // Reject a bad center before touching the terminal
    let center = GeoPoint::from_degrees(args.center_lon, args.center_lat);
    let projection = MapProjection::new(args.projection.into(), center)
        .context("invalid projection center")?;
    let context = Arc::new(load_context(&args.data_dir));

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, context, projection);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Load all available GeoJSON data, falling back to the built-in world
fn load_context(data_dir: &Path) -> MapContext {
    let mut context = MapContext::new();
    if data_dir.exists() {
        if let Err(e) = data::load_all_geojson(&mut context, data_dir) {
            warn!("loading {} failed: {:#}", data_dir.display(), e);
        }
    }

    if !context.has_regions() {
        info!("no region data found, using built-in world");
        data::generate_simple_world(&mut context);
    }
    context
}

/// Handle mouse events for hovering, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker and hover
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    context: Arc<MapContext>,
    projection: MapProjection,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(context, projection, size.width as usize, size.height as usize);

    // Main loop
    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Projection and center
                            KeyCode::Char('m') | KeyCode::Char('M') => app.cycle_projection(),
                            KeyCode::Char('[') => app.rotate(-ROTATE_STEP_DEGREES, 0.0),
                            KeyCode::Char(']') => app.rotate(ROTATE_STEP_DEGREES, 0.0),
                            KeyCode::Char('{') => app.rotate(0.0, -ROTATE_STEP_DEGREES),
                            KeyCode::Char('}') => app.rotate(0.0, ROTATE_STEP_DEGREES),

                            // Layer toggles
                            KeyCode::Char('o') | KeyCode::Char('O') => {
                                app.map_renderer.toggle_outline();
                            }
                            KeyCode::Char('g') | KeyCode::Char('G') => {
                                app.map_renderer.toggle_regions();
                            }
                            KeyCode::Char('c') | KeyCode::Char('C') => {
                                app.map_renderer.toggle_cities();
                            }
                            KeyCode::Char('L') => {
                                app.map_renderer.toggle_labels();
                            }

                            // Reset view
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("cache at exit: {:?}", app.cache.stats());
    Ok(())
}
