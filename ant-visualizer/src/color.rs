use image::Rgba;
use log::warn;
use palette::Srgb;

/// Parse a CSS color name or `#rrggbb` / `#rgb` hex string to RGBA.
/// Unrecognized input falls back to `fallback`.
pub fn parse_color(spec: &str, fallback: Rgba<u8>) -> Rgba<u8> {
    let spec = spec.trim();
    let lowered = spec.to_ascii_lowercase();
    if let Some(named) = palette::named::from_str(&lowered) {
        return to_rgba(named);
    }
    match spec.parse::<Srgb<u8>>() {
        Ok(rgb) => to_rgba(rgb),
        Err(_) => {
            warn!("Color '{}' not recognized, using {:?}.", spec, fallback.0);
            fallback
        }
    }
}

fn to_rgba(rgb: Srgb<u8>) -> Rgba<u8> {
    Rgba([rgb.red, rgb.green, rgb.blue, 255])
}

/// Colors used to paint one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Colors {
    pub background: Rgba<u8>,
    pub cell: Rgba<u8>,
    pub ant: Rgba<u8>,
    pub outline: Rgba<u8>,
    pub heading: Rgba<u8>,
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            background: Rgba([255, 255, 255, 255]),
            cell: Rgba([255, 0, 0, 255]),
            ant: Rgba([0, 102, 255, 255]),
            outline: Rgba([0, 0, 0, 255]),
            heading: Rgba([0, 255, 0, 255]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGENTA: Rgba<u8> = Rgba([255, 0, 255, 255]);

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(parse_color("Red", MAGENTA), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_color("white", MAGENTA), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn hex_strings_parse() {
        assert_eq!(parse_color("#0066ff", MAGENTA), Rgba([0, 102, 255, 255]));
        assert_eq!(parse_color("#00ff00", MAGENTA), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn unknown_falls_back() {
        assert_eq!(parse_color("not-a-color", MAGENTA), MAGENTA);
    }
}
