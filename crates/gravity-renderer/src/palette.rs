//! Catppuccin Mocha colors for bodies and the background

use catppuccin::PALETTE;
use gravity_physics::BodyKind;

/// Convert an sRGB channel (0-255) to linear space
fn srgb_to_linear(c: u8) -> f32 {
    let x = c as f32 / 255.0;
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

fn srgb(color: &catppuccin::Color) -> [u8; 3] {
    [color.rgb.r, color.rgb.g, color.rgb.b]
}

fn linear([r, g, b]: [u8; 3]) -> [f32; 4] {
    [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), 1.0]
}

/// sRGB bytes of a body category color, for UI drawing
pub fn body_color_srgb(kind: BodyKind) -> [u8; 3] {
    let colors = &PALETTE.mocha.colors;
    srgb(match kind {
        BodyKind::Star => &colors.yellow,
        BodyKind::Planet => &colors.blue,
        BodyKind::Moon => &colors.overlay2,
        BodyKind::Projectile => &colors.red,
        BodyKind::Custom => &colors.mauve,
    })
}

/// Linear RGBA fill color for a body category
pub fn body_color(kind: BodyKind) -> [f32; 4] {
    linear(body_color_srgb(kind))
}

/// sRGB bytes for status banners such as the pause indicator
pub fn warning_srgb() -> [u8; 3] {
    srgb(&PALETTE.mocha.colors.peach)
}

/// Clear color (Mocha base)
pub fn background() -> wgpu::Color {
    let [r, g, b, a] = linear(srgb(&PALETTE.mocha.colors.base));
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}
