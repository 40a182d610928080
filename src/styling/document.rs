use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fmt::{self, Write as _};
use std::path::Path;

use crate::app_config::StyleConfig;
use crate::caption_builder::CaptionUnit;
use crate::file_utils::FileManager;
use crate::media_probe::Resolution;
use crate::styling::animation::AnimationWindows;
use crate::styling::color::{bgr_style, bgr_tag, normalize_color};
use crate::styling::glow::{default_glow_layers, sorted_by_draw_order, GlowLayer};
use crate::styling::placement::Placement;
use crate::styling::fmt_decimal;

// @module: ASS script writer

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENT_FORMAT: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

// @const: Semi-transparent black box colour
const BACK_COLOR: &str = "&H64000000";
const MAIN_STYLE: &str = "Default";
const SHADOW_ALPHA: u8 = 0x80;
const OPAQUE: u8 = 0x00;
const BACKSLASH_LOOKALIKE: &str = "\u{29F5}";

/// ASS script for a list of caption units
#[derive(Debug, Clone)]
pub struct AssDocument<'a> {
    style: &'a StyleConfig,
    resolution: Resolution,
    // Glow passes plus entry/exit animation; otherwise one static event per caption
    animated: bool,
    glow_layers: Vec<GlowLayer>,
}

impl<'a> AssDocument<'a> {
    /// Create a document using the style's glow settings
    pub fn new(style: &'a StyleConfig, resolution: Resolution) -> Self {
        let glow_layers = if style.glow {
            style.glow_layers.clone().unwrap_or_else(default_glow_layers)
        } else {
            Vec::new()
        };

        Self {
            style,
            resolution,
            animated: style.glow,
            glow_layers: sorted_by_draw_order(glow_layers),
        }
    }

    /// Replace the glow table
    pub fn with_glow_layers(mut self, layers: Vec<GlowLayer>) -> Self {
        self.glow_layers = sorted_by_draw_order(layers);
        self
    }

    /// Active glow passes, back to front; none when glow is off
    pub fn glow_layers(&self) -> &[GlowLayer] {
        if self.animated { &self.glow_layers[..] } else { &[] }
    }

    /// Alignment and margin used by every style
    pub fn placement(&self) -> Placement {
        Placement::from_keyword(&self.style.position, self.resolution.height)
    }

    /// Format seconds as an ASS timestamp (H:MM:SS.cc)
    pub fn format_timestamp(seconds: f64) -> String {
        let total_cs = if seconds.is_finite() && seconds > 0.0 {
            (seconds * 100.0).round() as u64
        } else {
            0
        };
        let cs = total_cs % 100;
        let total_secs = total_cs / 100;
        let s = total_secs % 60;
        let m = (total_secs / 60) % 60;
        let h = total_secs / 3600;
        format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
    }

    /// Parse an ASS timestamp into centiseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let (hms, cs) = timestamp
            .trim()
            .split_once('.')
            .ok_or_else(|| anyhow!("Invalid ASS timestamp: {}", timestamp))?;
        let parts: Vec<&str> = hms.split(':').collect();
        if parts.len() != 3 || cs.len() != 2 {
            return Err(anyhow!("Invalid ASS timestamp: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let centis: u64 = cs.parse().context("Failed to parse centiseconds")?;
        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(((hours * 60 + minutes) * 60 + seconds) * 100 + centis)
    }

    /// Caption text for a dialogue line: `\N` between lines, braces and
    /// backslashes neutralized.
    ///
    /// libass has no escape for a literal backslash (`\\N` still breaks the
    /// line), so backslashes become the lookalike U+29F5.
    pub fn escape_text(unit: &CaptionUnit) -> String {
        unit.lines
            .iter()
            .map(|line| {
                line.replace('\\', BACKSLASH_LOOKALIKE)
                    .replace('{', "(")
                    .replace('}', ")")
            })
            .collect::<Vec<_>>()
            .join("\\N")
    }

    /// Render the whole script
    pub fn render(&self, units: &[CaptionUnit]) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_script(&mut out, units);
        out
    }

    /// Write the script to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, units: &[CaptionUnit], path: P) -> Result<()> {
        FileManager::write_to_file(&path, &self.render(units))?;
        debug!(
            "Wrote ASS script with {} captions and {} glow layers to {}",
            units.len(),
            self.glow_layers().len(),
            path.as_ref().display()
        );
        Ok(())
    }

    fn write_script<W: fmt::Write>(&self, out: &mut W, units: &[CaptionUnit]) -> fmt::Result {
        self.write_script_info(out)?;
        self.write_styles(out)?;
        self.write_events(out, units)
    }

    fn write_script_info<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "[Script Info]")?;
        writeln!(out, "ScriptType: v4.00+")?;
        writeln!(out, "PlayResX: {}", self.resolution.width)?;
        writeln!(out, "PlayResY: {}", self.resolution.height)?;
        writeln!(out, "ScaledBorderAndShadow: yes")?;
        writeln!(out)
    }

    fn write_styles<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        let placement = self.placement();
        let font_name = self.style.font_name_or_default().replace(',', " ");
        let font_size = self.style.font_size_for(self.resolution.height);

        writeln!(out, "[V4+ Styles]")?;
        writeln!(out, "{}", STYLE_FORMAT)?;

        for (i, layer) in self.glow_layers().iter().enumerate() {
            let color = bgr_style(layer.color);
            writeln!(
                out,
                "Style: GlowLayer{},{},{},{c},{c},{c},{},0,0,0,0,100,100,0,0,1,{},0,{},0,0,{},0",
                i,
                font_name,
                font_size,
                BACK_COLOR,
                fmt_decimal(layer.border.abs() as f64),
                placement.alignment,
                placement.margin_v,
                c = color
            )?;
        }

        let primary = normalize_color(&self.style.font_color);
        let outline = normalize_color(&self.style.outline_color);
        writeln!(
            out,
            "Style: {},{},{},{p},{p},{},{},{},{},0,0,100,100,0,0,1,{},{},{},0,0,{},0",
            MAIN_STYLE,
            font_name,
            font_size,
            outline,
            BACK_COLOR,
            ass_flag(self.style.bold),
            ass_flag(self.style.italic),
            fmt_decimal(self.style.outline as f64),
            fmt_decimal(self.style.shadow as f64),
            placement.alignment,
            placement.margin_v,
            p = primary
        )?;
        writeln!(out)
    }

    fn write_events<W: fmt::Write>(&self, out: &mut W, units: &[CaptionUnit]) -> fmt::Result {
        writeln!(out, "[Events]")?;
        writeln!(out, "{}", EVENT_FORMAT)?;

        for (idx, unit) in units.iter().enumerate() {
            let next_start = units.get(idx + 1).map(|next| next.start);
            if self.animated {
                self.write_animated_unit(out, unit, next_start)?;
            } else {
                write_dialogue(out, 0, unit, MAIN_STYLE, "")?;
            }
        }
        Ok(())
    }

    // @writes: Glow passes, drop shadow and main text for one caption
    fn write_animated_unit<W: fmt::Write>(
        &self,
        out: &mut W,
        unit: &CaptionUnit,
        next_start: Option<f64>,
    ) -> fmt::Result {
        let anim = &self.style.animation;
        let windows = AnimationWindows::compute(unit.start, unit.end, next_start, anim);
        let start_state = AnimationWindows::start_state(anim);
        let exit = windows.exit_tag(anim);

        let top_layer = self.glow_layers.iter().map(|l| l.draw_order).max();

        for (i, layer) in self.glow_layers.iter().enumerate() {
            let mut tags = format!("{}{}{}", start_state, windows.entry_tag(anim, layer.alpha), exit);
            if layer.blur != 0.0 {
                tags.push_str(&format!("\\blur{}", fmt_decimal(layer.blur as f64)));
            }
            let color = bgr_tag(layer.color);
            tags.push_str(&format!(
                "\\bord{}\\c{c}\\3c{c}",
                fmt_decimal(layer.border as f64),
                c = color
            ));
            write_dialogue(out, layer.draw_order, unit, &format!("GlowLayer{}", i), &tags)?;
        }

        let main_layer = match (top_layer, self.glow_layers.first()) {
            (Some(top), Some(farthest)) => {
                let shadow_layer = top + 1;
                let shadow_px = ((self.style.shadow as f64) * 2.0).round().max(1.0) as i64;
                let shadow_blur = (farthest.blur as f64 / 3.0).max(1.0);
                let black = bgr_tag(0);
                let tags = format!(
                    "{}{}{}\\blur{}\\c{b}\\3c{b}\\shad{}",
                    start_state,
                    windows.entry_tag(anim, SHADOW_ALPHA),
                    exit,
                    fmt_decimal(shadow_blur),
                    shadow_px,
                    b = black
                );
                write_dialogue(out, shadow_layer, unit, MAIN_STYLE, &tags)?;
                shadow_layer + 1
            }
            _ => 0,
        };

        let tags = format!("{}{}{}", start_state, windows.entry_tag(anim, OPAQUE), exit);
        write_dialogue(out, main_layer, unit, MAIN_STYLE, &tags)
    }
}

// @returns: ASS boolean (-1 true, 0 false)
fn ass_flag(value: bool) -> i8 {
    if value { -1 } else { 0 }
}

fn write_dialogue<W: fmt::Write>(
    out: &mut W,
    layer: u32,
    unit: &CaptionUnit,
    style: &str,
    tags: &str,
) -> fmt::Result {
    let overrides = if tags.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", tags)
    };
    writeln!(
        out,
        "Dialogue: {},{},{},{},,0,0,0,,{}{}",
        layer,
        AssDocument::format_timestamp(unit.start),
        AssDocument::format_timestamp(unit.end),
        style,
        overrides,
        AssDocument::escape_text(unit)
    )
}
