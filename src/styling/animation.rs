/*!
 * Entry/exit animation windows.
 *
 * Every animated event scales up from a small size while fading in, then
 * scales past 100% while fading out. The windows are offsets in
 * milliseconds from the event start, as used by the ASS `\t` tag.
 */

use crate::app_config::AnimationConfig;
use crate::styling::fmt_decimal;
use crate::styling::color::alpha_tag;

/// Fully transparent alpha
pub const TRANSPARENT: u8 = 0xFF;

/// Transform windows for one caption, relative to its start (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationWindows {
    pub entry_start: i64,
    pub entry_end: i64,
    pub exit_start: i64,
    pub exit_end: i64,
}

impl AnimationWindows {
    /// Compute the windows for a caption spanning `start..end` seconds.
    ///
    /// When `next_start` is given the exit is clamped to end no later than
    /// `safety_margin_ms` before the next caption. If that leaves the exit
    /// starting before the entry ends, the entry is shrunk first (down to
    /// 1 ms) and only then the exit window.
    pub fn compute(start: f64, end: f64, next_start: Option<f64>, anim: &AnimationConfig) -> Self {
        let duration = (((end - start) * 1000.0).round() as i64).max(1);
        let preempt = anim.preempt_ms as i64;
        let fast = (anim.entry_exit_ms as i64).min((duration / 2).max(1));

        let mut exit_end = (duration - preempt).max(0);
        let mut exit_start = (exit_end - fast).max(0);
        let entry_start = 0;
        let mut entry_end = fast.min((duration - fast - preempt).max(1));

        if let Some(next) = next_start {
            let next_rel = ((next - start) * 1000.0).round() as i64;
            let allowed_end = next_rel - anim.safety_margin_ms as i64;

            exit_end = exit_end.min(allowed_end).max(0);
            exit_start = (exit_end - fast).max(0);

            if entry_end >= exit_start {
                entry_end = entry_end.min((exit_start - 1).max(1));
            }
            if exit_start < entry_end {
                exit_start = entry_end.min(exit_end);
            }
        }

        Self {
            entry_start,
            entry_end,
            exit_start,
            exit_end,
        }
    }

    /// Initial state: shrunk and invisible
    pub fn start_state(anim: &AnimationConfig) -> String {
        format!(
            "\\fscx{pct}\\fscy{pct}\\alpha{alpha}",
            pct = anim.entry_scale_pct,
            alpha = alpha_tag(TRANSPARENT)
        )
    }

    /// Entry transform towards full size and the pass's target alpha
    pub fn entry_tag(&self, anim: &AnimationConfig, target_alpha: u8) -> String {
        format!(
            "\\t({},{},{},\\fscx100\\fscy100\\alpha{})",
            self.entry_start,
            self.entry_end,
            fmt_decimal(anim.accel as f64),
            alpha_tag(target_alpha)
        )
    }

    /// Exit transform towards the exit scale and full transparency
    pub fn exit_tag(&self, anim: &AnimationConfig) -> String {
        format!(
            "\\t({},{},{},\\fscx{pct}\\fscy{pct}\\alpha{})",
            self.exit_start,
            self.exit_end,
            fmt_decimal(anim.accel as f64),
            alpha_tag(TRANSPARENT),
            pct = anim.exit_scale_pct
        )
    }
}
