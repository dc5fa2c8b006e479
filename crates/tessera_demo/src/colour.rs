//! Integer HSV to RGB conversion for ball colours.

/// 8-bit RGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Creates a colour from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// 8-bit HSV colour. Hue spans the full `0..=255` range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hsv {
    /// Hue
    pub h: u8,
    /// Saturation
    pub s: u8,
    /// Value
    pub v: u8,
}

/// Converts `hsv` to RGB using six hue regions of 43 steps each.
#[must_use]
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let Hsv { h, s, v } = hsv;
    if s == 0 {
        return Rgb::new(v, v, v);
    }

    let (h, s, v) = (u32::from(h), u32::from(s), u32::from(v));
    let region = h / 43;
    let remainder = (h - region * 43) * 6;

    // Each term stays within 0..=255 after the final shift
    let channel = |x: u32| u8::try_from(x).unwrap_or(u8::MAX);
    let p = channel((v * (255 - s)) >> 8);
    let q = channel((v * (255 - ((s * remainder) >> 8))) >> 8);
    let t = channel((v * (255 - ((s * (255 - remainder)) >> 8))) >> 8);
    let v = channel(v);

    match region {
        0 => Rgb::new(v, t, p),
        1 => Rgb::new(q, v, p),
        2 => Rgb::new(p, v, t),
        3 => Rgb::new(p, q, v),
        4 => Rgb::new(t, p, v),
        _ => Rgb::new(v, p, q),
    }
}
