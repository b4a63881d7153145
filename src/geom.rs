pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Straight (non-premultiplied) RGBA8. Host colors arrive as CSS hex
/// strings on seat groups; everything downstream works on this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    /// Returns `None` for anything else; callers fall back to a neutral
    /// color rather than failing.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match s.len() {
            3 => {
                let mut c = [0u8; 3];
                for (i, ch) in s.bytes().enumerate() {
                    let v = hex_nibble(ch);
                    c[i] = v << 4 | v;
                }
                Some(Self::rgb(c[0], c[1], c[2]))
            }
            6 | 8 => {
                let mut c = [255u8; 4];
                for (i, pair) in s.as_bytes().chunks(2).enumerate() {
                    c[i] = hex_nibble(pair[0]) << 4 | hex_nibble(pair[1]);
                }
                Some(Self::rgba(c[0], c[1], c[2], c[3]))
            }
            _ => None,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

fn hex_nibble(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}
