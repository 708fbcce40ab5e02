use kurbo::Point;

use crate::error::{InkpadError, InkpadResult};

pub type PremulRgba8 = [u8; 4];

/// Punches a transparent hole of the given radius into a premultiplied rgba8
/// buffer: destination-out with binary coverage. A pixel is cleared when its
/// center lies within `radius` of `center`; every other pixel is untouched.
pub fn cut_circle_in_place(
    dst: &mut [u8],
    width: u32,
    height: u32,
    center: Point,
    radius: f64,
) -> InkpadResult<()> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| InkpadError::raster("cutout buffer size overflow"))?;
    if dst.len() != expected_len {
        return Err(InkpadError::raster(
            "cut_circle_in_place expects a buffer matching width*height*4",
        ));
    }
    if !(radius > 0.0) {
        return Err(InkpadError::validation("cutout radius must be > 0"));
    }

    let x0 = ((center.x - radius - 1.0).floor().max(0.0)) as u32;
    let y0 = ((center.y - radius - 1.0).floor().max(0.0)) as u32;
    let x1 = (((center.x + radius + 1.0).ceil()).max(0.0) as u32).min(width);
    let y1 = (((center.y + radius + 1.0).ceil()).max(0.0) as u32).min(height);
    let r2 = radius * radius;

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = (x as f64 + 0.5) - center.x;
            let dy = (y as f64 + 0.5) - center.y;
            if dx * dx + dy * dy <= r2 {
                let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
                dst[idx..idx + 4].copy_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    Ok(())
}

pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u32 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u32 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u32 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: u32, height: u32, px: PremulRgba8) -> Vec<u8> {
        px.repeat((width * height) as usize)
    }

    #[test]
    fn cut_zeroes_inside_and_preserves_outside() {
        let (w, h) = (32u32, 32u32);
        let mut buf = filled(w, h, [10, 20, 30, 255]);
        let center = Point::new(16.0, 16.0);
        let radius = 6.0;

        cut_circle_in_place(&mut buf, w, h, center, radius).unwrap();

        for y in 0..h {
            for x in 0..w {
                let idx = ((y * w + x) * 4) as usize;
                let d = ((x as f64 + 0.5) - center.x).hypot((y as f64 + 0.5) - center.y);
                let px = &buf[idx..idx + 4];
                if d <= radius {
                    assert_eq!(px, &[0, 0, 0, 0], "pixel ({x},{y}) inside radius");
                } else {
                    assert_eq!(px, &[10, 20, 30, 255], "pixel ({x},{y}) outside radius");
                }
            }
        }
    }

    #[test]
    fn cut_clips_to_buffer_bounds() {
        let (w, h) = (8u32, 8u32);
        let mut buf = filled(w, h, [0, 0, 0, 255]);
        // Center far outside the buffer; only the overlapping corner clears.
        cut_circle_in_place(&mut buf, w, h, Point::new(-2.0, -2.0), 4.0).unwrap();
        assert_eq!(buf[3], 0); // (0,0) cleared
        assert_eq!(buf[((7 * w + 7) * 4 + 3) as usize], 255); // (7,7) untouched
    }

    #[test]
    fn cut_rejects_bad_shapes() {
        let mut buf = vec![0u8; 16];
        assert!(cut_circle_in_place(&mut buf, 3, 3, Point::ZERO, 1.0).is_err());
        let mut buf = vec![0u8; 4];
        assert!(cut_circle_in_place(&mut buf, 1, 1, Point::ZERO, 0.0).is_err());
    }

    #[test]
    fn premultiply_then_unpremultiply_is_close() {
        let mut px = vec![200u8, 100, 40, 128];
        premultiply_rgba8_in_place(&mut px);
        assert!(px[0] <= 128 && px[1] <= 128 && px[2] <= 128);
        unpremultiply_rgba8_in_place(&mut px);
        assert!((px[0] as i16 - 200).abs() <= 1);
        assert!((px[1] as i16 - 100).abs() <= 1);
        assert!((px[2] as i16 - 40).abs() <= 1);
        assert_eq!(px[3], 128);
    }

    #[test]
    fn zero_alpha_normalizes_to_zero() {
        let mut px = vec![9u8, 9, 9, 0];
        premultiply_rgba8_in_place(&mut px);
        assert_eq!(px, &[0, 0, 0, 0]);
        let mut px = vec![9u8, 9, 9, 0];
        unpremultiply_rgba8_in_place(&mut px);
        assert_eq!(px, &[0, 0, 0, 0]);
    }
}
