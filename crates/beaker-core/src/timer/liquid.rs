//! Liquid color and progress math for the beaker display.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::plan::SessionKind;

/// Hue (0..360) of the liquid for one session. Bubbles use the opposite hue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidColor {
    hue: u16,
}

impl LiquidColor {
    pub fn new(hue: u16) -> Self {
        Self { hue: hue % 360 }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen_range(0..360))
    }

    pub fn hue(self) -> u16 {
        self.hue
    }

    pub fn bubble_hue(self) -> u16 {
        (self.hue + 180) % 360
    }

    pub fn css(self) -> String {
        format!("hsl({}, 80%, 60%)", self.hue)
    }

    pub fn bubble_css(self) -> String {
        format!("hsla({}, 90%, 70%, 0.7)", self.bubble_hue())
    }
}

/// How full the beaker is, in `0.0..=1.0`.
///
/// Work drains the beaker as time passes; breaks fill it back up.
pub fn completion_fraction(kind: SessionKind, remaining_secs: u64, total_secs: u64) -> f64 {
    if total_secs == 0 {
        return 0.0;
    }
    let remaining = remaining_secs.min(total_secs) as f64;
    let total = total_secs as f64;
    match kind {
        SessionKind::Work => remaining / total,
        SessionKind::ShortBreak | SessionKind::LongBreak => (total - remaining) / total,
    }
}

/// `MM:SS`, minutes are not wrapped into hours.
pub fn format_clock(remaining_secs: u64) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}
