use crate::page::Document;

pub const PRIMARY_VAR: &str = "--heroui-primary-400";
pub const SECONDARY_VAR: &str = "--heroui-secondary-400";
const PRIMARY_FALLBACK: &str = "222 47% 50%";
const SECONDARY_FALLBACK: &str = "280 60% 55%";

/// Ink colour in light mode
pub const LIGHT_INK: Rgba = Rgba::rgb(2, 6, 23);
pub const DARK_BACKGROUND: Rgba = Rgba::rgb(0x0b, 0x10, 0x20);
pub const LIGHT_BACKGROUND: Rgba = Rgba::rgb(0xff, 0xff, 0xff);

/// An sRGB colour with straight alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// `h` in degrees, `s` and `l` in percent
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let s = (s / 100.0).clamp(0.0, 1.0);
        let l = (l / 100.0).clamp(0.0, 1.0);
        let h = h.rem_euclid(360.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }

    /// Composite over an opaque background
    pub fn over(self, background: Rgba) -> Rgba {
        let mix = |fg: u8, bg: u8| {
            (f64::from(fg) * self.a + f64::from(bg) * (1.0 - self.a)).round() as u8
        };
        Rgba::rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

/// Parse a space separated HSL triplet such as `222 47% 50%`
pub fn parse_hsl_triplet(value: &str) -> Option<Rgba> {
    let mut parts = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .map(|p| p.trim_end_matches('%').trim_end_matches("deg").parse::<f64>());

    let h = parts.next()?.ok()?;
    let s = parts.next()?.ok()?;
    let l = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgba::from_hsl(h, s, l))
}

fn accent(doc: &Document, var: &str, fallback: &str) -> Rgba {
    doc.root_property(var)
        .and_then(parse_hsl_triplet)
        .or_else(|| parse_hsl_triplet(fallback))
        .unwrap_or(LIGHT_INK)
}

/// Colours and opacities for one draw, read from the page at draw time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub is_dark: bool,
    pub snake: Rgba,
    pub food: Rgba,
    pub background: Rgba,
}

impl Palette {
    pub fn resolve(doc: &Document) -> Self {
        let is_dark = doc.is_dark();
        if is_dark {
            Self {
                is_dark,
                snake: accent(doc, PRIMARY_VAR, PRIMARY_FALLBACK),
                food: accent(doc, SECONDARY_VAR, SECONDARY_FALLBACK),
                background: DARK_BACKGROUND,
            }
        } else {
            Self {
                is_dark,
                snake: LIGHT_INK,
                food: LIGHT_INK,
                background: LIGHT_BACKGROUND,
            }
        }
    }

    pub fn body_alpha(&self) -> f64 {
        if self.is_dark {
            0.30
        } else {
            0.24
        }
    }

    pub fn head_alpha(&self) -> f64 {
        (self.body_alpha() + 0.10).min(1.0)
    }

    pub fn food_alpha(&self) -> f64 {
        if self.is_dark {
            0.40
        } else {
            0.30
        }
    }

    pub fn plan_alpha(&self) -> f64 {
        if self.is_dark {
            0.55
        } else {
            0.40
        }
    }
}
