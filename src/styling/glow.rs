/*!
 * Glow layer table.
 *
 * A glow is drawn as a stack of blurred copies of the caption behind the
 * main text. The stack is plain data and can be replaced from
 * configuration.
 */

use serde::{Deserialize, Serialize};

/// Role of a glow pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlowKind {
    /// Soft halo spreading outwards
    Outer,
    /// Rim light inside the glyph edges (negative border)
    Inner,
    /// Hard contrast outline
    Outline,
}

/// One rendering pass drawn behind or around the main text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowLayer {
    /// Gaussian blur strength (`\blur`)
    pub blur: f32,
    /// Border width (`\bord`); negative values pull the glow inwards
    pub border: f32,
    /// Target alpha while visible, 0x00 opaque to 0xFF transparent
    pub alpha: u8,
    /// Colour as 24-bit BGR
    pub color: u32,
    /// Event layer; lower values are drawn first
    pub draw_order: u32,
    /// Pass role
    pub kind: GlowKind,
}

const WHITE: u32 = 0xFF_FF_FF;
const BLACK: u32 = 0x00_00_00;

/// Default glow: five outer halos from wide and faint to close and
/// bright, two inner rim passes and a black contrast outline.
pub const PROFESSIONAL_GLOW: [GlowLayer; 8] = [
    GlowLayer { blur: 20.0, border: 3.0, alpha: 0xD0, color: WHITE, draw_order: 0, kind: GlowKind::Outer },
    GlowLayer { blur: 16.0, border: 2.5, alpha: 0xC0, color: WHITE, draw_order: 1, kind: GlowKind::Outer },
    GlowLayer { blur: 12.0, border: 2.0, alpha: 0xAA, color: WHITE, draw_order: 2, kind: GlowKind::Outer },
    GlowLayer { blur: 8.0, border: 1.5, alpha: 0x90, color: WHITE, draw_order: 3, kind: GlowKind::Outer },
    GlowLayer { blur: 5.0, border: 1.0, alpha: 0x70, color: WHITE, draw_order: 4, kind: GlowKind::Outer },
    GlowLayer { blur: 2.0, border: -0.5, alpha: 0x40, color: WHITE, draw_order: 5, kind: GlowKind::Inner },
    GlowLayer { blur: 1.0, border: -1.0, alpha: 0x30, color: WHITE, draw_order: 6, kind: GlowKind::Inner },
    GlowLayer { blur: 1.0, border: 3.5, alpha: 0x00, color: BLACK, draw_order: 7, kind: GlowKind::Outline },
];

/// The default table as an owned list
pub fn default_glow_layers() -> Vec<GlowLayer> {
    PROFESSIONAL_GLOW.to_vec()
}

/// Layers sorted back-to-front; equal draw orders keep table order
pub fn sorted_by_draw_order(mut layers: Vec<GlowLayer>) -> Vec<GlowLayer> {
    layers.sort_by_key(|layer| layer.draw_order);
    layers
}
