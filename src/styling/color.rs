use once_cell::sync::Lazy;
use regex::Regex;

// @module: Colour conversion to the ASS representation

/// Opaque white, used for anything unparseable
pub const DEFAULT_COLOR: &str = "&H00FFFFFF";

// @const: #RRGGBB or RRGGBB
static RGB_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#?([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})$").expect("valid RGB regex")
});

// @const: Native &HAABBGGRR
static NATIVE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&H[0-9A-Fa-f]{8}$").expect("valid ASS colour regex"));

/// Normalize a user colour to `&HAABBGGRR`.
///
/// `#RRGGBB` and `RRGGBB` become opaque `&H00BBGGRR` in upper case; an
/// already-native value is returned unchanged; anything else yields
/// [`DEFAULT_COLOR`].
pub fn normalize_color(input: &str) -> String {
    let trimmed = input.trim();

    if trimmed.starts_with("&H") {
        return if NATIVE_REGEX.is_match(trimmed) {
            trimmed.to_string()
        } else {
            DEFAULT_COLOR.to_string()
        };
    }

    match RGB_REGEX.captures(trimmed) {
        Some(caps) => format!("&H00{}{}{}", &caps[3], &caps[2], &caps[1]).to_uppercase(),
        None => DEFAULT_COLOR.to_string(),
    }
}

/// Override-tag form of a 24-bit BGR value (`\c&HBBGGRR&`)
pub fn bgr_tag(bgr: u32) -> String {
    format!("&H{:06X}&", bgr & 0x00FF_FFFF)
}

/// Style-table form of a 24-bit BGR value, fully opaque
pub fn bgr_style(bgr: u32) -> String {
    format!("&H00{:06X}", bgr & 0x00FF_FFFF)
}

/// Override-tag alpha (`\alpha&HAA&`), 0x00 opaque, 0xFF transparent
pub fn alpha_tag(alpha: u8) -> String {
    format!("&H{:02X}&", alpha)
}
