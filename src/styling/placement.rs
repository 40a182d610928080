use log::warn;

// @module: Caption placement on the frame

/// ASS alignment (numpad layout) plus vertical margin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    // @field: 1 = bottom-left ... 5 = middle-center ... 9 = top-right
    pub alignment: u8,
    // @field: Vertical margin in script pixels
    pub margin_v: u32,
}

const EDGE_MARGIN_BOTTOM: u32 = 40;
const EDGE_MARGIN_TOP: u32 = 20;

impl Placement {
    /// Resolve a position keyword for a frame of the given height.
    ///
    /// Unknown keywords fall back to bottom-center with a warning.
    pub fn from_keyword(keyword: &str, height: u32) -> Self {
        let fraction = |f: f64| (height as f64 * f) as u32;
        let key = keyword.trim().to_lowercase();

        if let Ok(code) = key.parse::<u8>() {
            if (1..=9).contains(&code) {
                return Self { alignment: code, margin_v: EDGE_MARGIN_BOTTOM };
            }
        }

        match key.as_str() {
            "bottom" | "bottom-center" | "lower" => Self { alignment: 2, margin_v: EDGE_MARGIN_BOTTOM },
            "lower-center" => Self { alignment: 2, margin_v: fraction(0.30) },
            "center" | "middle" | "middle-center" | "center-center" => {
                Self { alignment: 5, margin_v: fraction(0.45) }
            }
            "below-center" | "slightly-below-center" => Self { alignment: 5, margin_v: fraction(0.55) },
            "top" | "top-center" | "upper" => Self { alignment: 8, margin_v: EDGE_MARGIN_TOP },
            _ => {
                warn!("Unknown caption position '{}', using bottom.", keyword);
                Self { alignment: 2, margin_v: EDGE_MARGIN_BOTTOM }
            }
        }
    }
}
