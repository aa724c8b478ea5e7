//! Colors for the guides, resolved per light/dark mode.

use tracing::warn;

use crate::config::{
  ConfigError,
  GuideColors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Mode {
  #[default]
  Light,
  Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl Rgba {
  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b, a: 0xff }
  }

  /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
  pub fn from_hex(s: &str) -> Option<Self> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
      return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    let nibble = |i: usize| {
      let value = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
      Some(value * 0x11)
    };

    match hex.len() {
      3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
      6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
      8 => {
        Some(Self {
          r: byte(0)?,
          g: byte(2)?,
          b: byte(4)?,
          a: byte(6)?,
        })
      },
      _ => None,
    }
  }
}

/// Resolved colors for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidePalette {
  pub marker:           Rgba,
  pub active_marker:    Rgba,
  pub hover_marker:     Rgba,
  pub background:       Rgba,
  pub hover_background: Rgba,
}

impl GuideColors {
  pub fn palette(&self, mode: Mode) -> Result<GuidePalette, ConfigError> {
    let parse = |key: &'static str, value: &str| {
      Rgba::from_hex(value).ok_or_else(|| {
        ConfigError::InvalidColor {
          key,
          value: value.to_string(),
        }
      })
    };

    Ok(match mode {
      Mode::Light => {
        GuidePalette {
          marker:           parse("light", &self.light)?,
          active_marker:    parse("active-light", &self.active_light)?,
          hover_marker:     parse("hover-light", &self.hover_light)?,
          background:       parse("background-light", &self.background_light)?,
          hover_background: parse("background-hover-light", &self.background_hover_light)?,
        }
      },
      Mode::Dark => {
        GuidePalette {
          marker:           parse("dark", &self.dark)?,
          active_marker:    parse("active-dark", &self.active_dark)?,
          hover_marker:     parse("hover-dark", &self.hover_dark)?,
          background:       parse("background-dark", &self.background_dark)?,
          hover_background: parse("background-hover-dark", &self.background_hover_dark)?,
        }
      },
    })
  }

  /// Like [`GuideColors::palette`], falling back to the default colors when a
  /// configured one is malformed.
  pub fn palette_or_default(&self, mode: Mode) -> GuidePalette {
    self.palette(mode).unwrap_or_else(|err| {
      warn!(%err, "falling back to default guide colors");
      GuideColors::default().palette(mode).unwrap_or(FALLBACK)
    })
  }
}

const FALLBACK: GuidePalette = GuidePalette {
  marker:           Rgba::rgb(0x80, 0x80, 0x80),
  active_marker:    Rgba::rgb(0xa0, 0xa0, 0xa0),
  hover_marker:     Rgba::rgb(0xa0, 0xa0, 0xa0),
  background:       Rgba::rgb(0x40, 0x40, 0x40),
  hover_background: Rgba::rgb(0x40, 0x40, 0x40),
};
