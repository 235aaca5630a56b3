use anyhow::{bail, Context};
use glam::Vec3;
use image::{Rgba, RgbaImage};

pub const GRADIENT_WIDTH: u32 = 256;

/// A `width × 1` strip with the colors spread evenly from left to right.
pub struct GradientTexture {
    pub image: RgbaImage,
}

impl GradientTexture {
    pub fn from_hex(colors: &[&str], width: u32) -> anyhow::Result<Self> {
        let stops = colors
            .iter()
            .map(|color| parse_hex_color(color))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Self::from_colors(&stops, width)
    }

    pub fn from_colors(stops: &[Vec3], width: u32) -> anyhow::Result<Self> {
        if stops.len() < 2 {
            bail!("A gradient needs at least two colors, got {}", stops.len());
        }
        if width == 0 {
            bail!("Gradient width must be positive");
        }

        let image = RgbaImage::from_fn(width, 1, |x, _| {
            let t = (x as f32 + 0.5) / width as f32;
            let color = sample(stops, t);
            let [r, g, b] = (color * 255.0).round().to_array().map(|c| c as u8);
            Rgba([r, g, b, 255])
        });

        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn texel(&self, x: u32) -> [u8; 4] {
        self.image.get_pixel(x, 0).0
    }
}

/// Linear interpolation between evenly spaced stops, `t` in `[0, 1]`.
fn sample(stops: &[Vec3], t: f32) -> Vec3 {
    let segments = (stops.len() - 1) as f32;
    let scaled = t.clamp(0.0, 1.0) * segments;
    let index = (scaled.floor() as usize).min(stops.len() - 2);
    let local = scaled - index as f32;

    stops[index].lerp(stops[index + 1], local)
}

/// Parses `#RRGGBB` into linear 0..1 components.
pub fn parse_hex_color(color: &str) -> anyhow::Result<Vec3> {
    let hex = color
        .strip_prefix('#')
        .with_context(|| format!("Color {color:?} does not start with '#'"))?;

    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        bail!("Color {color:?} is not in #RRGGBB form");
    }

    let value = u32::from_str_radix(hex, 16)
        .with_context(|| format!("Color {color:?} is not valid hexadecimal"))?;

    Ok(from_rgb_u32(value))
}

/// `0xRRGGBB` to 0..1 components.
pub fn from_rgb_u32(value: u32) -> Vec3 {
    Vec3::new(
        ((value >> 16) & 0xff) as f32,
        ((value >> 8) & 0xff) as f32,
        (value & 0xff) as f32,
    ) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: [&str; 5] = ["#FEAC5E", "#C779D0", "#4BC0C8", "#C779D0", "#FEAC5E"];

    #[test]
    fn endpoints_match_first_and_last_color() {
        let gradient = GradientTexture::from_hex(&COLORS, GRADIENT_WIDTH).unwrap();

        assert_eq!(gradient.width(), 256);
        let first = gradient.texel(0);
        let last = gradient.texel(255);
        // Texel centres sit half a texel inside the stops.
        for (channel, expected) in first.iter().zip([0xFE, 0xAC, 0x5E]) {
            assert!((*channel as i32 - expected).abs() <= 2);
        }
        assert_eq!(first, last);
    }

    #[test]
    fn middle_stop_is_reached() {
        let gradient = GradientTexture::from_hex(&["#000000", "#FF0000", "#000000"], 257).unwrap();

        assert_eq!(gradient.texel(128), [255, 0, 0, 255]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(GradientTexture::from_hex(&["#FFFFFF"], 256).is_err());
        assert!(parse_hex_color("FEAC5E").is_err());
        assert!(parse_hex_color("#FEAC").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
        assert!(parse_hex_color("#+FFFFF").is_err());
        assert!(parse_hex_color("#-00000").is_err());
    }

    #[test]
    fn parses_hex() {
        let color = parse_hex_color("#4BC0C8").unwrap();
        assert_eq!(color, from_rgb_u32(0x4BC0C8));
        assert!((color.x - 75.0 / 255.0).abs() < 1e-6);
    }
}
