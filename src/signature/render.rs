use crate::signature::model::{Color, SignatureCanvas, StrokePath};

/// Rasterize the canvas (plus an optional in-progress stroke) into a fresh
/// RGBA buffer of `width` x `height` device pixels. Logical coordinates are
/// scaled by `pixel_ratio`, as is the stroke width, so ink keeps the same
/// apparent weight at any density. The background is fully transparent.
pub fn rasterize(
    canvas: &SignatureCanvas,
    active: Option<&StrokePath>,
    width: u32,
    height: u32,
    pixel_ratio: f32,
    stroke_width: f32,
    color: Color,
) -> Vec<u8> {
    let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
    let radius = brush_radius(stroke_width, pixel_ratio);

    for stroke in &canvas.strokes {
        draw_polyline(stroke, pixel_ratio, color, radius, &mut pixels, width, height);
    }
    if let Some(stroke) = active {
        draw_polyline(stroke, pixel_ratio, color, radius, &mut pixels, width, height);
    }
    pixels
}

fn brush_radius(stroke_width: f32, pixel_ratio: f32) -> i32 {
    ((stroke_width * pixel_ratio.max(1.0)) / 2.0).round().max(1.0) as i32
}

fn to_device(point: (f32, f32), pixel_ratio: f32) -> (i32, i32) {
    (
        (point.0 * pixel_ratio).round() as i32,
        (point.1 * pixel_ratio).round() as i32,
    )
}

fn draw_polyline(
    stroke: &StrokePath,
    pixel_ratio: f32,
    color: Color,
    radius: i32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    if stroke.points.is_empty() {
        return;
    }
    if stroke.points.len() == 1 {
        // A tap leaves a round dot, same cap as a segment endpoint.
        draw_brush(
            to_device(stroke.points[0], pixel_ratio),
            color,
            radius,
            pixels,
            width,
            height,
        );
        return;
    }

    for segment in stroke.points.windows(2) {
        draw_segment(
            to_device(segment[0], pixel_ratio),
            to_device(segment[1], pixel_ratio),
            color,
            radius,
            pixels,
            width,
            height,
        );
    }
}

/// Bresenham walk stamping a circular brush at each step. Stamping circles
/// gives rounded caps and joins without a separate cap pass.
fn draw_segment(
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    radius: i32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    let mut x0 = start.0;
    let mut y0 = start.1;
    let x1 = end.0;
    let y1 = end.1;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        draw_brush((x0, y0), color, radius, pixels, width, height);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_brush(
    center: (i32, i32),
    color: Color,
    radius: i32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    for y in (center.1 - radius)..=(center.1 + radius) {
        for x in (center.0 - radius)..=(center.0 + radius) {
            let dx = x - center.0;
            let dy = y - center.1;
            if dx * dx + dy * dy <= radius * radius {
                set_pixel(pixels, width, height, x, y, color);
            }
        }
    }
}

fn set_pixel(pixels: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let idx = ((y as u32 * width + x as u32) * 4) as usize;
    if idx + 3 >= pixels.len() {
        return;
    }
    pixels[idx] = color.r;
    pixels[idx + 1] = color.g;
    pixels[idx + 2] = color.b;
    pixels[idx + 3] = color.a;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::model::{INK, STROKE_WIDTH};

    fn inked_pixels(pixels: &[u8]) -> usize {
        pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    #[test]
    fn empty_canvas_rasterizes_fully_transparent() {
        let pixels = rasterize(
            &SignatureCanvas::default(),
            None,
            16,
            16,
            1.0,
            STROKE_WIDTH,
            INK,
        );
        assert_eq!(pixels.len(), 16 * 16 * 4);
        assert_eq!(inked_pixels(&pixels), 0);
    }

    #[test]
    fn polyline_writes_ink_pixels() {
        let mut canvas = SignatureCanvas::default();
        canvas.push(StrokePath::from_points(vec![
            (2.0, 2.0),
            (10.0, 10.0),
            (14.0, 4.0),
        ]));

        let pixels = rasterize(&canvas, None, 16, 16, 1.0, STROKE_WIDTH, INK);
        assert!(inked_pixels(&pixels) > 0);
    }

    #[test]
    fn single_point_leaves_a_round_dot() {
        let mut canvas = SignatureCanvas::default();
        canvas.push(StrokePath::from_points(vec![(8.0, 8.0)]));

        let pixels = rasterize(&canvas, None, 16, 16, 1.0, STROKE_WIDTH, INK);
        let idx = ((8 * 16 + 8) * 4) as usize;
        assert_eq!(&pixels[idx..idx + 4], &[INK.r, INK.g, INK.b, INK.a]);
    }

    #[test]
    fn active_stroke_is_previewed() {
        let active = StrokePath::from_points(vec![(1.0, 1.0), (10.0, 1.0)]);
        let pixels = rasterize(
            &SignatureCanvas::default(),
            Some(&active),
            16,
            16,
            1.0,
            STROKE_WIDTH,
            INK,
        );
        assert!(inked_pixels(&pixels) > 0);
    }

    #[test]
    fn out_of_bounds_geometry_is_clipped_safely() {
        let mut canvas = SignatureCanvas::default();
        canvas.push(StrokePath::from_points(vec![
            (-100.0, -100.0),
            (100.0, 100.0),
        ]));

        let pixels = rasterize(&canvas, None, 8, 8, 1.0, STROKE_WIDTH, INK);
        assert_eq!(pixels.len(), 8 * 8 * 4);
        assert!(inked_pixels(&pixels) > 0);
    }

    #[test]
    fn rasterization_is_deterministic() {
        let mut canvas = SignatureCanvas::default();
        canvas.push(StrokePath::from_points(vec![(2.0, 3.0), (12.0, 9.0)]));

        let a = rasterize(&canvas, None, 32, 32, 2.0, STROKE_WIDTH, INK);
        let b = rasterize(&canvas, None, 32, 32, 2.0, STROKE_WIDTH, INK);
        assert_eq!(a, b);
    }

    #[test]
    fn higher_pixel_ratio_scales_ink_coverage() {
        let mut canvas = SignatureCanvas::default();
        canvas.push(StrokePath::from_points(vec![(2.0, 2.0), (12.0, 12.0)]));

        let at_1x = rasterize(&canvas, None, 16, 16, 1.0, STROKE_WIDTH, INK);
        let at_2x = rasterize(&canvas, None, 32, 32, 2.0, STROKE_WIDTH, INK);
        assert!(inked_pixels(&at_2x) > inked_pixels(&at_1x));
    }
}
