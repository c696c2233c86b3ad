use crate::braille::BrailleCanvas;
use crate::map::view::View;
use tui_atlas::ProjPoint;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a closed ring of projection-space points, culling off-screen edges
pub fn draw_ring(canvas: &mut BrailleCanvas, points: &[ProjPoint], view: &View) {
    let Some(&last) = points.last() else {
        return;
    };

    let mut prev = view.to_pixel(last);
    for &point in points {
        let next = view.to_pixel(point);
        if view.line_might_be_visible(prev, next) {
            draw_line(canvas, prev.0, prev.1, next.0, next.1);
        }
        prev = next;
    }
}

/// Draw a filled circle (for city markers)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}
