//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.
//!
//! Tile colours form a gradient across the tile values 2..=2048, built from
//! three anchor colours; anything above 2048 uses the `super_tile` colour.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Distinct tile shades: 2, 4, 8, ..., 2048.
pub const TILE_SHADES: usize = 11;

/// Gradient anchors for the tile palette plus the UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile background per exponent (index 0 = value 2).
    pub tiles: [Color; TILE_SHADES],
    /// Tiles beyond 2048.
    pub super_tile: Color,
    /// Empty board slot.
    pub empty: Color,
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, status).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (hints, disconnected feed).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Anchor colours of a palette: low tiles, mid tiles, high tiles, past the target.
#[derive(Debug, Clone, Copy)]
struct Anchors {
    low: Color,
    mid: Color,
    high: Color,
    beyond: Color,
}

const ONEDARK: Anchors = Anchors {
    low: rgb(0x56B6C2),
    mid: rgb(0xE5C07B),
    high: rgb(0xE06C75),
    beyond: rgb(0xC678DD),
};

const HIGH_CONTRAST: Anchors = Anchors {
    low: rgb(0x00FFFF),
    mid: rgb(0xFFFF00),
    high: rgb(0xFF0000),
    beyond: rgb(0xFF00FF),
};

const COLORBLIND: Anchors = Anchors {
    low: rgb(0x0077BB),
    mid: rgb(0xBBBB00),
    high: rgb(0xEE7733),
    beyond: rgb(0xEE3377),
};

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark: hex values from onedark.theme.
    pub fn onedark_default() -> Self {
        Self {
            tiles: gradient(ONEDARK.low, ONEDARK.mid, ONEDARK.high),
            super_tile: ONEDARK.beyond,
            empty: rgb(0x3F444F),
            bg: rgb(0x31353F),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` selects the tile colour variant.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        let anchors = match palette {
            crate::Palette::Normal => return,
            crate::Palette::HighContrast => HIGH_CONTRAST,
            crate::Palette::Colorblind => COLORBLIND,
        };
        self.tiles = gradient(anchors.low, anchors.mid, anchors.high);
        self.super_tile = anchors.beyond;
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        let low = get("hi_fg").or_else(|| get("cpu_start")).unwrap_or(ONEDARK.low);
        let mid = get("title").or_else(|| get("cpu_mid")).unwrap_or(ONEDARK.mid);
        let high = get("cpu_end").or_else(|| get("temp_end")).unwrap_or(ONEDARK.high);
        Self {
            tiles: gradient(low, mid, high),
            super_tile: get("net_box").unwrap_or(ONEDARK.beyond),
            empty: get("div_line").unwrap_or(d.empty),
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Background colour for a tile value (0 = empty slot).
    pub fn tile_color(&self, value: u32) -> Color {
        if value == 0 {
            return self.empty;
        }
        let exponent = value.trailing_zeros() as usize;
        match exponent.checked_sub(1) {
            Some(i) if i < TILE_SHADES => self.tiles[i],
            Some(_) => self.super_tile,
            None => self.tiles[0],
        }
    }

    /// Dark text on light tiles, light text on dark ones.
    pub fn tile_fg(&self, value: u32) -> Color {
        match self.tile_color(value) {
            Color::Rgb(r, g, b) if luminance(r, g, b) > 150.0 => self.bg,
            _ => Color::White,
        }
    }
}

fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)
}

fn lerp(a: Color, b: Color, t: f32) -> Color {
    match (a, b) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ if t < 0.5 => a,
        _ => b,
    }
}

/// `TILE_SHADES` colours running low → mid → high.
fn gradient(low: Color, mid: Color, high: Color) -> [Color; TILE_SHADES] {
    let half = (TILE_SHADES - 1) as f32 / 2.0;
    std::array::from_fn(|i| {
        let i = i as f32;
        if i <= half {
            lerp(low, mid, i / half)
        } else {
            lerp(mid, high, (i - half) / half)
        }
    })
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    match s.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
