/*!
 * Tests for colours, placement and the glow table
 */

use capburn::styling::{default_glow_layers, normalize_color, GlowKind, GlowLayer, Placement, DEFAULT_COLOR};

/// Test hex colour conversion to BGR order
#[test]
fn test_normalizeColor_withHexInput_shouldSwapToBgr() {
    assert_eq!(normalize_color("#FF8800"), "&H000088FF");
    assert_eq!(normalize_color("ff8800"), "&H000088FF");
    assert_eq!(normalize_color("#000000"), "&H00000000");
    assert_eq!(normalize_color("  #1a2B3c "), "&H003C2B1A");
}

/// Test native values and garbage
#[test]
fn test_normalizeColor_withNativeOrInvalidInput_shouldPassOrDefault() {
    assert_eq!(normalize_color("&H80102030"), "&H80102030");
    assert_eq!(normalize_color("&H102030"), DEFAULT_COLOR);
    assert_eq!(normalize_color("red"), DEFAULT_COLOR);
    assert_eq!(normalize_color("#GG0000"), DEFAULT_COLOR);
    assert_eq!(normalize_color(""), DEFAULT_COLOR);
}

/// Test that normalizing twice changes nothing
#[test]
fn test_normalizeColor_appliedTwice_shouldBeIdempotent() {
    for input in ["#FFFFFF", "00ff7f", "&H00ABCDEF", "&H7F000000", "nonsense", "#12345"] {
        let once = normalize_color(input);
        assert_eq!(normalize_color(&once), once, "{}", input);
    }
}

/// Test the position keywords and their margins
#[test]
fn test_placement_withKeywords_shouldResolveAlignmentAndMargin() {
    let at = |k: &str| {
        let p = Placement::from_keyword(k, 1000);
        (p.alignment, p.margin_v)
    };

    assert_eq!(at("bottom"), (2, 40));
    assert_eq!(at("Lower"), (2, 40));
    assert_eq!(at("lower-center"), (2, 300));
    assert_eq!(at("middle"), (5, 450));
    assert_eq!(at("center-center"), (5, 450));
    assert_eq!(at("slightly-below-center"), (5, 550));
    assert_eq!(at("upper"), (8, 20));
    assert_eq!(at("7"), (7, 40));
}

/// Test unknown positions
#[test]
fn test_placement_withUnknownKeyword_shouldFallBackToBottom() {
    assert_eq!(Placement::from_keyword("sideways", 1080), Placement { alignment: 2, margin_v: 40 });
    assert_eq!(Placement::from_keyword("0", 1080), Placement { alignment: 2, margin_v: 40 });
}

/// Test the built-in glow table
#[test]
fn test_defaultGlowLayers_shouldBeOrderedBackToFront() {
    let layers = default_glow_layers();

    let orders: Vec<u32> = layers.iter().map(|l| l.draw_order).collect();
    assert_eq!(orders, (0..8).collect::<Vec<u32>>());

    let blurs: Vec<f32> = layers.iter().take(5).map(|l| l.blur).collect();
    assert!(blurs.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(layers[7].kind, GlowKind::Outline);
    assert_eq!(layers[7].alpha, 0x00);
}

/// Test loading a glow layer from JSON
#[test]
fn test_glowLayer_fromJson_shouldDeserialize() -> anyhow::Result<()> {
    let layer: GlowLayer = serde_json::from_str(
        r#"{"blur":4.0,"border":-1.0,"alpha":64,"color":16777215,"draw_order":2,"kind":"inner"}"#,
    )?;
    assert_eq!(layer.kind, GlowKind::Inner);
    assert_eq!(layer.border, -1.0);
    assert_eq!(layer.color, 0xFFFFFF);
    Ok(())
}
