//! CSS color values for `@color` entities.
//!
//! Accepts hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()`/`rgba()`,
//! `hsl()`/`hsla()` and the CSS named colors. Tokenizing is done by
//! `cssparser`; channel math lives here.

use cssparser::{Color, Parser, ParserInput, RGBA, Token, parse_color_keyword};
use serde::Serialize;

/// Lightness factor applied for the `darker` variant.
const DARKEN_FACTOR: f64 = 0.9;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

/// Presentation strings derived from a color value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorValues {
    /// Upper-case `#RRGGBB`.
    pub hex: String,
    /// `rgba(r, g, b, a)` with integer channels.
    pub rgba: String,
    /// Same hue with reduced lightness, as hex.
    pub darker: String,
}

impl Rgba {
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    pub fn to_rgba_string(self) -> String {
        let alpha = (self.alpha * 100.0).round() / 100.0;
        format!("rgba({}, {}, {}, {alpha})", self.red, self.green, self.blue)
    }

    /// Scale HSL lightness by `factor`.
    pub fn darken(self, factor: f64) -> Self {
        let (h, s, l) = rgb_to_hsl(self.red, self.green, self.blue);
        let (red, green, blue) = hsl_to_rgb(h, s, (l * factor).clamp(0.0, 1.0));
        Self {
            red,
            green,
            blue,
            alpha: self.alpha,
        }
    }

    pub fn values(self) -> ColorValues {
        ColorValues {
            hex: self.to_hex(),
            rgba: self.to_rgba_string(),
            darker: self.darken(DARKEN_FACTOR).to_hex(),
        }
    }
}

/// Parse a CSS color value. Returns `None` for anything unrecognized,
/// including trailing garbage after a valid color.
pub fn parse(value: &str) -> Option<Rgba> {
    let mut input = ParserInput::new(value.trim());
    let mut parser = Parser::new(&mut input);

    let token = parser.next().ok()?.clone();
    let color = match token {
        Token::Hash(ref digits) | Token::IDHash(ref digits) => from_hex(digits)?,
        Token::Ident(ref name) => named(&name.to_ascii_lowercase())?,
        Token::Function(ref name) => {
            let name = name.to_ascii_lowercase();
            let args = parser
                .parse_nested_block(|p| {
                    let mut args = Vec::new();
                    loop {
                        let token = match p.next() {
                            Ok(token) => token.clone(),
                            Err(_) => break,
                        };
                        match token {
                            Token::Number { value, .. } => args.push(Channel::Number(value)),
                            Token::Dimension { value, .. } => args.push(Channel::Number(value)),
                            Token::Percentage { unit_value, .. } => {
                                args.push(Channel::Percent(unit_value))
                            }
                            Token::Comma | Token::Delim('/') => {}
                            _ => return Err(p.new_custom_error::<(), ()>(())),
                        }
                    }
                    Ok(args)
                })
                .ok()?;
            from_function(&name, &args)?
        }
        _ => return None,
    };

    parser.is_exhausted().then_some(color)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Channel {
    Number(f32),
    Percent(f32),
}

impl Channel {
    /// As an 8-bit RGB channel.
    fn to_byte(self) -> u8 {
        let v = match self {
            Self::Number(n) => n,
            Self::Percent(p) => p * 255.0,
        };
        v.round().clamp(0.0, 255.0) as u8
    }

    /// As a fraction in [0, 1] (alpha, saturation, lightness).
    fn to_unit(self) -> f32 {
        match self {
            Self::Number(n) => n,
            Self::Percent(p) => p,
        }
        .clamp(0.0, 1.0)
    }

    fn raw(self) -> f32 {
        match self {
            Self::Number(n) | Self::Percent(n) => n,
        }
    }
}

fn from_hex(digits: &str) -> Option<Rgba> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

    let (red, green, blue, alpha) = match digits.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };

    Some(Rgba {
        red,
        green,
        blue,
        alpha: f32::from(alpha) / 255.0,
    })
}

fn from_function(name: &str, args: &[Channel]) -> Option<Rgba> {
    let alpha = match args.get(3) {
        Some(a) => a.to_unit(),
        None => 1.0,
    };
    if args.len() < 3 || args.len() > 4 {
        return None;
    }

    match name {
        "rgb" | "rgba" => Some(Rgba {
            red: args[0].to_byte(),
            green: args[1].to_byte(),
            blue: args[2].to_byte(),
            alpha,
        }),
        "hsl" | "hsla" => {
            let hue = f64::from(args[0].raw()).rem_euclid(360.0);
            let (red, green, blue) = hsl_to_rgb(
                hue,
                f64::from(args[1].to_unit()),
                f64::from(args[2].to_unit()),
            );
            Some(Rgba {
                red,
                green,
                blue,
                alpha,
            })
        }
        _ => None,
    }
}

/// CSS color keywords, from the table cssparser ships. `currentcolor` has no
/// fixed value and is rejected.
fn named(name: &str) -> Option<Rgba> {
    match parse_color_keyword::<Color>(name).ok()? {
        Color::Rgba(RGBA {
            red,
            green,
            blue,
            alpha,
        }) => Some(Rgba {
            red: red.unwrap_or(0),
            green: green.unwrap_or(0),
            blue: blue.unwrap_or(0),
            alpha: alpha.unwrap_or(1.0),
        }),
        _ => None,
    }
}

/// RGB bytes to (hue degrees, saturation, lightness).
fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta == 0.0 {
        return (0.0, 0.0, l);
    }

    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (h, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}
