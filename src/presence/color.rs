use std::fmt;

/// Number of discrete hues identities are spread over.
pub const HUE_BUCKETS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, 1)", self.r, self.g, self.b)
    }
}

/// Maps participant identities to stable colors.
///
/// Every client derives the same color for the same identity, so no color ever has
/// to travel over the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAssigner {
    buckets: u32,
    saturation: f64,
    value: f64,
}

impl ColorAssigner {
    #[cfg(test)]
    pub(crate) fn new(buckets: u32) -> Self {
        Self {
            buckets: buckets.max(1),
            ..Self::default()
        }
    }

    pub fn assign<'a>(&self, identity: impl Into<Option<&'a str>>) -> Rgb {
        let magnitude = (identity_hash(identity) as i64).unsigned_abs();
        let hue = (magnitude % self.buckets as u64) as f64 / self.buckets as f64;
        hsv_to_rgb(hue, self.saturation, self.value)
    }
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self {
            buckets: HUE_BUCKETS,
            saturation: 1.0,
            value: 0.8,
        }
    }
}

/// Color for `identity` with the default assigner.
pub fn assign_color<'a>(identity: impl Into<Option<&'a str>>) -> Rgb {
    ColorAssigner::default().assign(identity)
}

/// 32-bit polynomial hash (`h = h * 31 + unit`) over the UTF-16 code units.
pub fn identity_hash<'a>(identity: impl Into<Option<&'a str>>) -> i32 {
    identity
        .into()
        .unwrap_or_default()
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Sector based HSV -> RGB, all components in [0, 1].
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgb {
        r: channel(r),
        g: channel(g),
        b: channel(b),
    }
}

fn channel(component: f64) -> u8 {
    (component * 255.0).floor().clamp(0.0, 255.0) as u8
}
