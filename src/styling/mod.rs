/*!
 * Styled-event (ASS) subtitle generation.
 *
 * This module turns caption units into an ASS script with positioning,
 * colours, glow layers and entry/exit animation. It is split into:
 *
 * - `color`: colour normalization to the ASS `&HAABBGGRR` form
 * - `glow`: the declarative glow layer table
 * - `placement`: position keywords to alignment and vertical margin
 * - `animation`: entry/exit transform windows and tags
 * - `document`: the script writer
 */

// Re-export main types for easier usage
pub use self::animation::AnimationWindows;
pub use self::color::{normalize_color, DEFAULT_COLOR};
pub use self::document::AssDocument;
pub use self::glow::{default_glow_layers, GlowKind, GlowLayer, PROFESSIONAL_GLOW};
pub use self::placement::Placement;

// Submodules
pub mod animation;
pub mod color;
pub mod document;
pub mod glow;
pub mod placement;

/// Format a number for an override tag: at most two decimals, no trailing zeros
pub(crate) fn fmt_decimal(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
