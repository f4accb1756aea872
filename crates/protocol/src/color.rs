use serde::{Deserialize, Serialize};

/// A canonical `#rrggbb` color (lowercase, always six hex digits).
///
/// Every constructor funnels through [`HexColor::normalize`], so a value of
/// this type can never hold an unparseable string. Deserialization is lossy
/// in the same way: `"#ABC"` becomes `#aabbcc`, garbage becomes black.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn black() -> Self {
        HexColor("#000000".to_string())
    }

    /// Canonicalize `#rgb`, `#rrggbb` or `rgb(r, g, b)` input.
    ///
    /// Anything else (including channels above 255) maps to `#000000`.
    pub fn normalize(input: &str) -> Self {
        let s = input.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#')
            && hex.chars().all(|c| c.is_ascii_hexdigit())
        {
            match hex.len() {
                6 => return HexColor(s),
                3 => {
                    let mut out = String::with_capacity(7);
                    out.push('#');
                    for c in hex.chars() {
                        out.push(c);
                        out.push(c);
                    }
                    return HexColor(out);
                }
                _ => {}
            }
        }
        if let Some((r, g, b)) = parse_rgb_function(&s) {
            return Self::from_rgb(r, g, b);
        }
        Self::black()
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        HexColor(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    /// True if `input` is already a `#rgb` / `#rrggbb` literal (any case).
    pub fn is_hex_literal(input: &str) -> bool {
        let s = input.trim();
        s.strip_prefix('#').is_some_and(|hex| {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }
}

fn parse_rgb_function(s: &str) -> Option<(u8, u8, u8)> {
    let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut parts = inner.split(',');
    let mut next = || -> Option<u8> {
        let part = parts.next()?.trim();
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        part.parse::<u8>().ok()
    };
    let rgb = (next()?, next()?, next()?);
    if parts.next().is_some() {
        return None;
    }
    Some(rgb)
}

impl Default for HexColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<String> for HexColor {
    fn from(s: String) -> Self {
        Self::normalize(&s)
    }
}

impl From<&str> for HexColor {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.0
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_short_hex() {
        assert_eq!(HexColor::normalize("#ABC").as_str(), "#aabbcc");
    }

    #[test]
    fn lowercases_long_hex() {
        assert_eq!(HexColor::normalize("  #FF8800 ").as_str(), "#ff8800");
    }

    #[test]
    fn converts_rgb_function() {
        assert_eq!(HexColor::normalize("rgb(255,0,0)").as_str(), "#ff0000");
        assert_eq!(HexColor::normalize("rgb(1, 2, 3)").as_str(), "#010203");
    }

    #[test]
    fn garbage_is_black() {
        assert_eq!(HexColor::normalize("garbage").as_str(), "#000000");
        assert_eq!(HexColor::normalize("").as_str(), "#000000");
        assert_eq!(HexColor::normalize("#12345").as_str(), "#000000");
        assert_eq!(HexColor::normalize("rgb(300,0,0)").as_str(), "#000000");
    }

    #[test]
    fn splits_channels() {
        assert_eq!(HexColor::normalize("#10ff7f").to_rgb(), (16, 255, 127));
    }

    #[test]
    fn serde_normalizes_on_read() {
        let c: HexColor = serde_json::from_str("\"#ABC\"").unwrap_or_default();
        assert_eq!(c.as_str(), "#aabbcc");
        let json = serde_json::to_string(&c).unwrap_or_default();
        assert_eq!(json, "\"#aabbcc\"");
    }
}
