use crate::modules::history::Edits;
use image::{DynamicImage, ImageBuffer, Rgba};

// Filter order is a fixed contract: brightness, contrast, saturate,
// hue-rotate, grayscale. Composition is not commutative.
pub fn apply_edits(img: &DynamicImage, edits: &Edits) -> DynamicImage {
    if edits.is_identity() {
        return img.clone();
    }

    let brightness: f32 = edits.brightness as f32 / 100.0;
    let contrast: f32 = edits.contrast as f32 / 100.0;
    let saturation: f32 = edits.saturation as f32 / 100.0;
    let hue_shift: f32 = edits.hue as f32;
    let gray_mix: f32 = edits.grayscale as f32 / 100.0;

    let mut buf: ImageBuffer<Rgba<u8>, Vec<u8>> = img.to_rgba8();
    for pixel in buf.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let mut rf: f32 = r as f32;
        let mut gf: f32 = g as f32;
        let mut bf: f32 = b as f32;

        rf = (rf * brightness).clamp(0.0, 255.0);
        gf = (gf * brightness).clamp(0.0, 255.0);
        bf = (bf * brightness).clamp(0.0, 255.0);

        rf = ((rf - 128.0) * contrast + 128.0).clamp(0.0, 255.0);
        gf = ((gf - 128.0) * contrast + 128.0).clamp(0.0, 255.0);
        bf = ((bf - 128.0) * contrast + 128.0).clamp(0.0, 255.0);

        if saturation != 1.0 || hue_shift != 0.0 {
            let (h, s, v) = rgb_to_hsv(rf / 255.0, gf / 255.0, bf / 255.0);
            let (nr, ng, nb) = hsv_to_rgb(
                (h + hue_shift).rem_euclid(360.0),
                (s * saturation).clamp(0.0, 1.0),
                v,
            );
            rf = nr * 255.0;
            gf = ng * 255.0;
            bf = nb * 255.0;
        }

        if gray_mix > 0.0 {
            // Rec.601 luma
            let luma: f32 = rf * 0.299 + gf * 0.587 + bf * 0.114;
            rf = rf + (luma - rf) * gray_mix;
            gf = gf + (luma - gf) * gray_mix;
            bf = bf + (luma - bf) * gray_mix;
        }

        pixel.0 = [
            rf.clamp(0.0, 255.0).round() as u8,
            gf.clamp(0.0, 255.0).round() as u8,
            bf.clamp(0.0, 255.0).round() as u8,
            a,
        ];
    }
    DynamicImage::ImageRgba8(buf)
}

pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, String> {
    let mut bytes: Vec<u8> = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
        std::io::Cursor::new(&mut bytes),
        quality,
    );
    // JPEG has no alpha channel
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| format!("Failed to encode JPEG: {}", e))?;
    Ok(bytes)
}

fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max: f32 = r.max(g).max(b);
    let min: f32 = r.min(g).min(b);
    let delta: f32 = max - min;
    let v: f32 = max;
    let s: f32 = if max == 0.0 { 0.0 } else { delta / max };
    let h: f32 = if delta == 0.0 { 0.0 }
        else if max == r { 60.0 * (((g - b) / delta) % 6.0) }
        else if max == g { 60.0 * ((b - r) / delta + 2.0) }
        else { 60.0 * ((r - g) / delta + 4.0) };
    (if h < 0.0 { h + 360.0 } else { h }, s, v)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c: f32 = v * s;
    let x: f32 = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m: f32 = v - c;
    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::history::Edits;
    use image::GenericImageView;

    fn test_image() -> DynamicImage {
        let buf: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(4, 4, |x, y| {
            Rgba([(x * 60) as u8, (y * 60) as u8, 90, 255])
        });
        DynamicImage::ImageRgba8(buf)
    }

    #[test]
    fn identity_edits_leave_pixels_unchanged() {
        let img: DynamicImage = test_image();
        let out: DynamicImage = apply_edits(&img, &Edits::default());
        assert_eq!(img.to_rgba8().as_raw(), out.to_rgba8().as_raw());
    }

    #[test]
    fn zero_brightness_blacks_out() {
        let img: DynamicImage = test_image();
        let out: DynamicImage = apply_edits(&img, &Edits { brightness: 0, ..Edits::default() });
        for (_, _, p) in out.pixels() {
            assert_eq!([p.0[0], p.0[1], p.0[2]], [0, 0, 0]);
            assert_eq!(p.0[3], 255);
        }
    }

    #[test]
    fn full_grayscale_equalizes_channels() {
        let img: DynamicImage = test_image();
        let out: DynamicImage = apply_edits(&img, &Edits { grayscale: 100, ..Edits::default() });
        for (_, _, p) in out.pixels() {
            assert!(p.0[0].abs_diff(p.0[1]) <= 1);
            assert!(p.0[1].abs_diff(p.0[2]) <= 1);
        }
    }

    #[test]
    fn contrast_pushes_away_from_midpoint() {
        let img: DynamicImage = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            2, 2, Rgba([200, 60, 128, 255]),
        ));
        let out: DynamicImage = apply_edits(&img, &Edits { contrast: 200, ..Edits::default() });
        let p: Rgba<u8> = out.to_rgba8().get_pixel(0, 0).clone();
        assert!(p.0[0] > 200);
        assert!(p.0[1] < 60);
        assert_eq!(p.0[2], 128);
    }

    #[test]
    fn hue_rotation_full_circle_is_identity() {
        let img: DynamicImage = test_image();
        let out: DynamicImage = apply_edits(&img, &Edits { hue: 360, ..Edits::default() });
        for ((_, _, a), (_, _, b)) in img.pixels().zip(out.pixels()) {
            for i in 0..3 {
                assert!(a.0[i].abs_diff(b.0[i]) <= 2);
            }
        }
    }

    #[test]
    fn jpeg_encoding_round_trips() {
        let img: DynamicImage = test_image();
        let bytes: Vec<u8> = encode_jpeg(&img, 90).unwrap();
        let decoded: DynamicImage = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }
}
