use std::sync::Arc;

use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_ring};
use crate::map::view::View;
use tui_atlas::{MapContext, Projection, ProjectedShape, RegionFeature};

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_outline: bool,
    pub show_regions: bool,
    pub show_cities: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_outline: true,
            show_regions: true,
            show_cities: true,
            show_labels: true,
        }
    }
}

/// Separate canvases so each layer can get its own color
pub struct MapLayers {
    pub outline: BrailleCanvas,
    pub regions: BrailleCanvas,
    pub highlight: BrailleCanvas,
    pub cities: BrailleCanvas,
    /// (column, row, text) in character cells
    pub labels: Vec<(u16, u16, String)>,
}

impl MapLayers {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            outline: BrailleCanvas::new(cols, rows),
            regions: BrailleCanvas::new(cols, rows),
            highlight: BrailleCanvas::new(cols, rows),
            cities: BrailleCanvas::new(cols, rows),
            labels: Vec::new(),
        }
    }
}

/// Draws projected shapes and city points onto braille layers
#[derive(Default)]
pub struct MapRenderer {
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render all layers for a `cols` x `rows` character area
    #[allow(clippy::too_many_arguments)]
    pub fn render<P: Projection + ?Sized>(
        &self,
        cols: usize,
        rows: usize,
        shapes: &[ProjectedShape],
        context: &MapContext,
        projection: &P,
        view: &View,
        hovered: Option<&Arc<RegionFeature>>,
    ) -> MapLayers {
        let mut layers = MapLayers::new(cols, rows);

        if self.settings.show_outline {
            draw_ring(&mut layers.outline, &projection.outline(), view);
        }

        let visible = view.visible_world();
        for shape in shapes {
            let bounds = shape.bounds();
            if bounds.max_x < visible.min_x
                || bounds.min_x > visible.max_x
                || bounds.max_y < visible.min_y
                || bounds.min_y > visible.max_y
            {
                continue;
            }

            let is_hovered = hovered.is_some_and(|h| Arc::ptr_eq(h, shape.feature()));
            let canvas = if is_hovered {
                &mut layers.highlight
            } else if self.settings.show_regions {
                &mut layers.regions
            } else {
                continue;
            };

            for polygon in shape.polygons() {
                draw_ring(canvas, polygon.points(), view);
            }
        }

        if self.settings.show_cities {
            self.render_cities(&mut layers, context, projection, view);
        }

        layers
    }

    fn render_cities<P: Projection + ?Sized>(
        &self,
        layers: &mut MapLayers,
        context: &MapContext,
        projection: &P,
        view: &View,
    ) {
        let radius = if view.zoom > 10.0 {
            2
        } else {
            1
        };

        for city in context.cities_above(min_population(view.zoom)) {
            if !projection.is_visible(city.point) {
                continue;
            }
            let Some(projected) = projection.forward(city.point) else {
                continue;
            };
            let (px, py) = view.to_pixel(projected);
            if !view.is_visible(px, py) {
                continue;
            }
            draw_circle(&mut layers.cities, px, py, radius);

            // Convert braille coords to char coords
            if self.settings.show_labels && px >= 0 && py >= 0 {
                let char_x = (px / 2) as u16;
                let char_y = (py / 4) as u16;
                if let Some(label_x) = char_x.checked_add(2) {
                    layers.labels.push((label_x, char_y, city.name.clone()));
                }
            }
        }
    }

    pub fn toggle_outline(&mut self) {
        self.settings.show_outline = !self.settings.show_outline;
    }

    pub fn toggle_regions(&mut self) {
        self.settings.show_regions = !self.settings.show_regions;
    }

    pub fn toggle_cities(&mut self) {
        self.settings.show_cities = !self.settings.show_cities;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }
}

/// Smallest population drawn at a zoom level
fn min_population(zoom: f64) -> u64 {
    if zoom > 15.0 {
        0
    } else if zoom > 6.0 {
        200_000
    } else if zoom > 2.0 {
        1_000_000
    } else {
        5_000_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_atlas::{GeoPoint, Mercator, ShapeCache};

    fn context() -> Arc<MapContext> {
        let mut context = MapContext::new();
        context.add_region(RegionFeature::from_degrees(
            "Square",
            "SQR",
            &[(-30.0, -30.0), (30.0, -30.0), (30.0, 30.0), (-30.0, 30.0)],
        ));
        context.add_city(GeoPoint::new(0.0, 0.0), "Origin", 10_000_000);
        Arc::new(context)
    }

    fn has_dots(canvas: &BrailleCanvas) -> bool {
        (0..10).any(|row| (0..40).any(|col| canvas.cell(col, row).is_some()))
    }

    #[test]
    fn test_hovered_region_goes_to_highlight() {
        let context = context();
        let mut cache = ShapeCache::new(Arc::clone(&context));
        let projection = Mercator::new();
        let shapes = cache.get_shapes(&projection);
        let view = View::new(projection.bounds(), 80, 40);
        let renderer = MapRenderer::new();

        let plain = renderer.render(40, 10, &shapes, &context, &projection, &view, None);
        assert!(has_dots(&plain.regions));
        assert_eq!(plain.labels.len(), 1);

        let hovered = Arc::clone(shapes[0].feature());
        let lit = renderer.render(40, 10, &shapes, &context, &projection, &view, Some(&hovered));
        assert!(!has_dots(&lit.regions));
        assert!(has_dots(&lit.highlight));
    }

    #[test]
    fn test_min_population_drops_with_zoom() {
        assert!(min_population(1.0) > min_population(5.0));
        assert_eq!(min_population(20.0), 0);
    }
}
