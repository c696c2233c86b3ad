use tui_atlas::{Bounds, ProjPoint};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 100.0;
const ZOOM_STEP: f64 = 1.5;

/// Affine transform between projection space and braille pixels.
///
/// At zoom 1 the projection's whole bounding rectangle fits the canvas.
#[derive(Clone, Debug)]
pub struct View {
    /// Projection-space point shown at the canvas center
    pub center: ProjPoint,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    /// Extent of the current projection, limits panning
    world: Bounds,
}

impl View {
    pub fn new(world: Bounds, width: usize, height: usize) -> Self {
        Self {
            center: world.center(),
            zoom: 1.0,
            width,
            height,
            world,
        }
    }

    /// Show the whole of `world` again
    pub fn fit(&mut self, world: Bounds) {
        self.world = world;
        self.center = world.center();
        self.zoom = 1.0;
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Pixels per projection-space unit
    pub fn scale(&self) -> f64 {
        let sx = self.width as f64 / self.world.width();
        let sy = self.height as f64 / self.world.height();
        let fit = sx.min(sy);
        if fit.is_finite() && fit > 0.0 {
            fit * self.zoom
        } else {
            self.zoom
        }
    }

    /// Projection-space point to pixel coordinates
    pub fn to_pixel(&self, p: ProjPoint) -> (i32, i32) {
        let scale = self.scale();
        let px = (p.x - self.center.x) * scale + self.width as f64 / 2.0;
        let py = self.height as f64 / 2.0 - (p.y - self.center.y) * scale;
        (px.round() as i32, py.round() as i32)
    }

    /// Pixel coordinates to projection space
    pub fn to_world(&self, px: i32, py: i32) -> ProjPoint {
        let scale = self.scale();
        ProjPoint::new(
            (px as f64 - self.width as f64 / 2.0) / scale + self.center.x,
            (self.height as f64 / 2.0 - py as f64) / scale + self.center.y,
        )
    }

    /// Pan the view by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.scale();
        let moved = ProjPoint::new(
            self.center.x + dx as f64 / scale,
            self.center.y - dy as f64 / scale,
        );
        self.center = self.world.clamp(moved);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    /// Zoom by factor, keeping the world point under (px, py) in place
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let anchor = self.to_world(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        let scale = self.scale();
        let center = ProjPoint::new(
            anchor.x - (px as f64 - self.width as f64 / 2.0) / scale,
            anchor.y - (self.height as f64 / 2.0 - py as f64) / scale,
        );
        self.center = self.world.clamp(center);
    }

    /// Projection-space rectangle currently on screen
    pub fn visible_world(&self) -> Bounds {
        let a = self.to_world(0, self.height as i32);
        let b = self.to_world(self.width as i32, 0);
        Bounds::new(a.x, a.y, b.x, b.y)
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10
            && px < self.width as i32 + 10
            && py >= -10
            && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}
