//! Colors for the scene.
//!
//! Colors are straight-alpha RGBA in `glam::Vec4`, components in `0.0..=1.0`,
//! interpreted in sRGB space the way a 2D canvas blends them.
//!
//! ```ignore
//! let sky = Palette::default().sky_top;
//! let ember = hex(0xFF7F66);
//! ```

use glam::Vec4;

/// Opaque color from a `0xRRGGBB` literal.
pub fn hex(rgb: u32) -> Vec4 {
    rgb8(
        ((rgb >> 16) & 0xFF) as u8,
        ((rgb >> 8) & 0xFF) as u8,
        (rgb & 0xFF) as u8,
        1.0,
    )
}

/// Color from 8-bit channels and a float alpha, like CSS `rgba()`.
pub fn rgb8(r: u8, g: u8, b: u8, alpha: f32) -> Vec4 {
    Vec4::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        alpha,
    )
}

/// Same color with a different alpha, clamped into `0.0..=1.0`.
pub fn with_alpha(color: Vec4, alpha: f32) -> Vec4 {
    Vec4::new(color.x, color.y, color.z, alpha.clamp(0.0, 1.0))
}

/// Convert a color to 8-bit RGBA.
pub fn to_rgba8(color: Vec4) -> [u8; 4] {
    let c = color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    [
        c.x.round() as u8,
        c.y.round() as u8,
        c.z.round() as u8,
        c.w.round() as u8,
    ]
}

/// Every fixed color the scene uses.
///
/// Mountain colors live on [`MountainLayer`](crate::background::MountainLayer)
/// since they travel with each layer's geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Top of the sky gradient.
    pub sky_top: Vec4,
    /// Bottom of the sky gradient.
    pub sky_bottom: Vec4,
    /// Falling stars and background stars.
    pub star: Vec4,
    /// Shadow glow around every star and fragment.
    pub glow: Vec4,
    /// Fragment tint; alpha is replaced by the fragment's opacity.
    pub fragment: Vec4,
    /// Solid band at the bottom of the surface.
    pub ground: Vec4,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            sky_top: hex(0x171E26),
            sky_bottom: hex(0x3F586B),
            star: Vec4::ONE,
            glow: hex(0xE3EAEF),
            fragment: rgb8(227, 234, 239, 1.0),
            ground: hex(0x182028),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_channels() {
        let c = hex(0xFF8000);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
        assert_eq!(c.w, 1.0);
    }

    #[test]
    fn test_with_alpha_clamps() {
        let c = with_alpha(Vec4::ONE, -2.5);
        assert_eq!(c.w, 0.0);
        let c = with_alpha(Vec4::ONE, 4.0);
        assert_eq!(c.w, 1.0);
    }

    #[test]
    fn test_to_rgba8_roundtrip_of_hex() {
        assert_eq!(to_rgba8(hex(0x182028)), [0x18, 0x20, 0x28, 0xFF]);
    }
}
