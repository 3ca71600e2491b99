// Software drawing onto an RGBA raster: pixels, thick rectangle outlines,
// square point markers and the translucent mask layer.
use image::Rgba;

use crate::types::{Point, Raster, Rect};

/// Put a pixel on the raster if (x,y) is inside bounds.
#[inline]
fn put_pixel(img: &mut Raster, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= img.width() || y >= img.height() {
        return;
    }
    img.put_pixel(x, y, color);
}

/// Draw a 1-pixel line between (x0,y0) and (x1,y1) using Bresenham.
fn draw_line(img: &mut Raster, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba<u8>) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(img, x0, y0, color);
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

const MAX_PEN: u32 = 1 << 12;

/// Offsets a pen of `width` pixels covers around the centre line: `[-(w/2), (w-1)/2]`.
fn pen_span(width: u32) -> std::ops::RangeInclusive<i32> {
    let w = width.clamp(1, MAX_PEN) as i32;
    -(w / 2)..=(w - 1) / 2
}

/// Pull the corners to within `pad` pixels of the raster. Edges that were
/// off-raster stay off-raster; the visible part of the outline is unchanged.
fn clip_to_raster(img: &Raster, rect: Rect, pad: i32) -> Rect {
    let max_x = i32::try_from(img.width()).unwrap_or(i32::MAX).saturating_add(pad);
    let max_y = i32::try_from(img.height()).unwrap_or(i32::MAX).saturating_add(pad);
    Rect::new(
        rect.x0.clamp(-pad, max_x),
        rect.y0.clamp(-pad, max_y),
        rect.x1.clamp(-pad, max_x),
        rect.y1.clamp(-pad, max_y),
    )
}

/// Outline `rect` with a pen of `width` pixels. Pixels off the raster are skipped.
pub fn stroke_rect(img: &mut Raster, rect: Rect, width: u32, color: Rgba<u8>) {
    let pad = width.clamp(1, MAX_PEN) as i32 + 1;
    let rect = clip_to_raster(img, rect, pad);
    for d in pen_span(width) {
        // d < 0 insets the outline, d > 0 grows it
        let (x0, y0, x1, y1) = (rect.x0 - d, rect.y0 - d, rect.x1 + d, rect.y1 + d);
        if x0 > x1 || y0 > y1 {
            continue;
        }
        draw_line(img, x0, y0, x1, y0, color);
        draw_line(img, x1, y0, x1, y1, color);
        draw_line(img, x1, y1, x0, y1, color);
        draw_line(img, x0, y1, x0, y0, color);
    }
}

/// Plot every point as a `width` x `width` square.
pub fn plot_points(img: &mut Raster, points: &[Point], width: u32, color: Rgba<u8>) {
    for p in points {
        for dy in pen_span(width) {
            for dx in pen_span(width) {
                put_pixel(img, p.x.saturating_add(dx), p.y.saturating_add(dy), color);
            }
        }
    }
}

/// Source-over of `color` at coverage `alpha` (0..=255) onto an opaque pixel.
/// Integer blend, truncating: `c' = (c * (255 - a) + m * a) / 255`.
#[inline]
pub fn blend_over(dst: &mut Rgba<u8>, color: Rgba<u8>, alpha: u8) {
    let a = alpha as u32;
    let inv = 255 - a;
    for c in 0..3 {
        dst.0[c] = ((dst.0[c] as u32 * inv + color.0[c] as u32 * a) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn blank(w: u32, h: u32) -> Raster {
        Raster::from_pixel(w, h, Rgba([0, 0, 0, 255]))
    }

    fn painted(img: &Raster) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| **p == RED)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn two_pixel_outline_covers_edge_and_inner_ring() {
        let mut img = blank(10, 10);
        stroke_rect(&mut img, Rect::new(2, 2, 7, 7), 2, RED);
        assert_eq!(img.get_pixel(2, 2), &RED);
        assert_eq!(img.get_pixel(3, 3), &RED);
        assert_eq!(img.get_pixel(7, 5), &RED);
        assert_eq!(img.get_pixel(6, 5), &RED);
        assert_ne!(img.get_pixel(1, 1), &RED);
        assert_ne!(img.get_pixel(4, 4), &RED);
    }

    #[test]
    fn outline_hanging_off_the_raster_is_clipped() {
        let mut img = blank(4, 4);
        stroke_rect(&mut img, Rect::new(-3, -3, 10, 10), 1, RED);
        assert!(painted(&img).is_empty());
    }

    #[test]
    fn huge_outline_only_draws_its_visible_edges() {
        let mut img = blank(8, 8);
        stroke_rect(&mut img, Rect::new(i32::MIN, 0, i32::MAX, 5), 2, RED);
        for y in [0, 1, 4, 5] {
            assert_eq!(img.get_pixel(3, y), &RED);
        }
        assert_ne!(img.get_pixel(3, 2), &RED);
        assert_ne!(img.get_pixel(0, 3), &RED);
    }

    #[test]
    fn points_at_the_i32_limits_are_skipped() {
        let mut img = blank(4, 4);
        plot_points(&mut img, &[Point::new(i32::MAX, i32::MIN)], 4, RED);
        assert!(painted(&img).is_empty());
    }

    #[test]
    fn points_are_four_pixel_squares() {
        let mut img = blank(10, 10);
        plot_points(&mut img, &[Point::new(5, 5)], 4, RED);
        let px = painted(&img);
        assert_eq!(px.len(), 16);
        assert!(px.contains(&(3, 3)));
        assert!(px.contains(&(6, 6)));
        assert!(!px.contains(&(7, 7)));
    }

    #[test]
    fn blend_over_spans_untouched_to_fully_covered() {
        let black = Rgba([0, 0, 0, 255]);
        let mut p = Rgba([200, 100, 50, 255]);
        blend_over(&mut p, black, 0);
        assert_eq!(p, Rgba([200, 100, 50, 255]));
        blend_over(&mut p, black, 255);
        assert_eq!(p, Rgba([0, 0, 0, 255]));

        let mut p = Rgba([255, 255, 255, 255]);
        blend_over(&mut p, black, 128);
        assert_eq!(p, Rgba([127, 127, 127, 255]));
    }
}
