use std::sync::Arc;

use log::{debug, warn};
use tui_atlas::{
    GeoPoint, MapContext, MapProjection, Picker, ProjectedShape, Projection, RegionFeature,
    ShapeCache,
};

use crate::map::{MapRenderer, View};

/// Degrees the projection center moves per rotate key press
pub const ROTATE_STEP_DEGREES: f64 = 10.0;

/// Application state
pub struct App {
    pub context: Arc<MapContext>,
    pub projection: MapProjection,
    pub cache: ShapeCache,
    pub view: View,
    pub map_renderer: MapRenderer,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Region under the mouse cursor
    pub hovered: Option<Arc<RegionFeature>>,
    /// Geographic position under the mouse cursor
    pub cursor_geo: Option<GeoPoint>,
    /// Center the app started with, restored on reset
    home: GeoPoint,
}

impl App {
    pub fn new(
        context: Arc<MapContext>,
        projection: MapProjection,
        width: usize,
        height: usize,
    ) -> Self {
        let (pixel_width, pixel_height) = canvas_pixels(width, height);
        let view = View::new(projection.bounds(), pixel_width, pixel_height);
        let home = projection.center();

        Self {
            cache: ShapeCache::new(Arc::clone(&context)),
            context,
            projection,
            view,
            map_renderer: MapRenderer::new(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            hovered: None,
            cursor_geo: None,
            home,
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = canvas_pixels(width, height);
        self.view.set_size(pixel_width, pixel_height);
    }

    /// Current shapes, rebuilt if the projection changed since last time
    pub fn shapes(&mut self) -> Arc<Vec<ProjectedShape>> {
        self.cache.get_shapes(&self.projection)
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.view.pan(dx, dy);
        self.update_hover();
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
        self.update_hover();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
        self.update_hover();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = to_pixel_pos(col, row);
        self.view.zoom_in_at(px, py);
        self.update_hover();
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = to_pixel_pos(col, row);
        self.view.zoom_out_at(px, py);
        self.update_hover();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Switch to the next projection kind around the same center.
    ///
    /// The new instance has a fresh id, so the cache rebuilds on its own.
    pub fn cycle_projection(&mut self) {
        let kind = self.projection.kind().next();
        match MapProjection::new(kind, self.projection.center()) {
            Ok(projection) => {
                debug!("switching to {} projection {}", kind.name(), projection.id());
                self.projection = projection;
                self.view.fit(self.projection.bounds());
                self.update_hover();
            }
            Err(e) => warn!("cannot switch to {}: {}", kind.name(), e),
        }
    }

    /// Move the projection center by whole degrees.
    ///
    /// Cylindrical projections ignore the latitude part.
    pub fn rotate(&mut self, dlon: f64, dlat: f64) {
        let center = self.projection.center();
        let lat = if self.projection.kind().is_azimuthal() {
            (center.lat_degrees() + dlat).clamp(-90.0, 90.0)
        } else {
            0.0
        };
        self.recenter(GeoPoint::from_degrees(center.lon_degrees() + dlon, lat));
    }

    fn recenter(&mut self, center: GeoPoint) {
        if let Err(e) = self.projection.recenter(center) {
            warn!("recenter rejected: {}", e);
            return;
        }
        self.cache.invalidate();
        self.update_hover();
    }

    /// Back to the starting center and a fitted view
    pub fn reset(&mut self) {
        self.recenter(self.home);
        self.view.fit(self.projection.bounds());
        self.update_hover();
    }

    /// Handle mouse drag: pans flat maps, turns the globe for azimuthal ones
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if self.projection.kind().is_azimuthal() {
                // Character cells are 2x4 braille pixels
                let degrees_per_pixel = (1.0 / self.view.scale()).to_degrees();
                self.rotate(
                    dx as f64 * 2.0 * degrees_per_pixel,
                    -(dy as f64) * 4.0 * degrees_per_pixel,
                );
            } else {
                self.pan(dx * 2, dy * 4);
            }
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Update mouse cursor position and what lies under it
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.update_hover();
    }

    /// Get mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| to_pixel_pos(col, row))
    }

    /// Re-run picking for the current cursor position
    fn update_hover(&mut self) {
        let Some((px, py)) = self.mouse_pixel_pos() else {
            return;
        };
        let world = self.view.to_world(px, py);

        self.cursor_geo = if self.projection.is_on_map(world) {
            self.projection.inverse(world)
        } else {
            None
        };
        self.hovered = Picker::new(&mut self.cache).pick(world, &self.projection);
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.view.zoom)
    }

    pub fn projection_name(&self) -> &'static str {
        self.projection.kind().name()
    }

    /// Projection center as a string
    pub fn center_coords(&self) -> String {
        format_geo(self.projection.center())
    }

    /// Cursor position as a string, "off map" outside the projection
    pub fn cursor_coords(&self) -> String {
        self.cursor_geo
            .map(format_geo)
            .unwrap_or_else(|| "off map".to_string())
    }

    /// Hovered region as "Name (CODE)"
    pub fn hovered_label(&self) -> Option<String> {
        self.hovered.as_ref().map(|region| {
            if region.code.is_empty() {
                region.name.clone()
            } else {
                format!("{} ({})", region.name, region.code)
            }
        })
    }

    pub fn cache_summary(&self) -> String {
        let stats = self.cache.stats();
        format!("{} shapes/{} pts", stats.shapes, stats.points)
    }
}

/// Braille pixel size of the map area, leaving room for border and status bar
fn canvas_pixels(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    (inner_width * 2, inner_height * 4)
}

/// Terminal cell to braille pixel, accounting for the 1 cell border
fn to_pixel_pos(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

fn format_geo(point: GeoPoint) -> String {
    let lat = point.lat_degrees();
    let lon = point.lon_degrees();
    format!(
        "{:.1}°{}, {:.1}°{}",
        lat.abs(),
        if lat >= 0.0 { "N" } else { "S" },
        lon.abs(),
        if lon >= 0.0 { "E" } else { "W" }
    )
}
