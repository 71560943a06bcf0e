use crate::{ChainOutcome, Grid, COLORS, COLOR_NAMES, SYMBOLS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One colour's quota inside a [`Goal::ClearMulti`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorQuota {
    pub color: u8,
    pub target: u32,
    pub remaining: u32,
}

impl ColorQuota {
    pub fn new(color: u8, target: u32) -> Self {
        Self {
            color,
            target,
            remaining: target,
        }
    }
}

/// Win condition of a level.
///
/// Counters only ever count down and stop at zero. `DensityBelow` has no
/// counter: it is checked against the live board every time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Goal {
    /// Pop `target` tiles of any colour
    PopTotal { target: u32, remaining: u32 },
    /// Pop `target` tiles of one colour
    ClearColor { color: u8, target: u32, remaining: u32 },
    /// Independent per-colour quotas, all of which must be met
    ClearMulti { items: Vec<ColorQuota> },
    /// Bring the fill fraction down to `threshold` or lower
    DensityBelow { threshold: f64 },
}

impl Goal {
    pub fn pop_total(target: u32) -> Self {
        Goal::PopTotal {
            target,
            remaining: target,
        }
    }

    pub fn clear_color(color: u8, target: u32) -> Self {
        Goal::ClearColor {
            color,
            target,
            remaining: target,
        }
    }

    pub fn clear_multi(quotas: &[(u8, u32)]) -> Self {
        Goal::ClearMulti {
            items: quotas
                .iter()
                .map(|&(color, target)| ColorQuota::new(color, target))
                .collect(),
        }
    }

    pub fn density_below(threshold: f64) -> Self {
        Goal::DensityBelow { threshold }
    }

    /// Tag used in saved state and host events
    pub fn kind(&self) -> &'static str {
        match self {
            Goal::PopTotal { .. } => "popTotal",
            Goal::ClearColor { .. } => "clearColor",
            Goal::ClearMulti { .. } => "clearMulti",
            Goal::DensityBelow { .. } => "densityBelow",
        }
    }

    /// Whether the goal is met on `grid`
    pub fn is_satisfied(&self, grid: &Grid) -> bool {
        match self {
            Goal::PopTotal { remaining, .. } | Goal::ClearColor { remaining, .. } => *remaining == 0,
            Goal::ClearMulti { items } => items.iter().all(|it| it.remaining == 0),
            Goal::DensityBelow { threshold } => grid.fill_fraction() <= *threshold,
        }
    }

    /// Count popped tiles against the goal's counters
    pub fn apply_progress(&mut self, popped_total: u32, popped_by_color: &[u32; COLORS]) {
        match self {
            Goal::PopTotal { remaining, .. } => {
                *remaining = remaining.saturating_sub(popped_total);
            }
            Goal::ClearColor { color, remaining, .. } => {
                let hit = popped_by_color.get(*color as usize).copied().unwrap_or(0);
                *remaining = remaining.saturating_sub(hit);
            }
            Goal::ClearMulti { items } => {
                for it in items.iter_mut() {
                    let hit = popped_by_color.get(it.color as usize).copied().unwrap_or(0);
                    it.remaining = it.remaining.saturating_sub(hit);
                }
            }
            Goal::DensityBelow { .. } => {}
        }
    }

    pub fn apply_chain(&mut self, outcome: &ChainOutcome) {
        self.apply_progress(outcome.total_popped, &outcome.popped_by_color);
    }

    /// Every referenced colour is on the palette
    pub fn colors_in_range(&self) -> bool {
        let ok = |c: u8| (c as usize) < COLORS;
        match self {
            Goal::ClearColor { color, .. } => ok(*color),
            Goal::ClearMulti { items } => items.iter().all(|it| ok(it.color)),
            Goal::PopTotal { .. } => true,
            Goal::DensityBelow { threshold } => threshold.is_finite(),
        }
    }

    /// Progress line for display, e.g. `◆:3  ▲:0`
    pub fn remaining_text(&self, grid: &Grid) -> String {
        match self {
            Goal::PopTotal { remaining, .. } | Goal::ClearColor { remaining, .. } => remaining.to_string(),
            Goal::ClearMulti { items } => items
                .iter()
                .map(|it| format!("{}:{}", symbol(it.color), it.remaining))
                .collect::<Vec<_>>()
                .join("  "),
            Goal::DensityBelow { .. } => format!("{}%", percent(grid.fill_fraction())),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::PopTotal { target, .. } => write!(f, "Pop {} tiles", target),
            Goal::ClearColor { color, target, .. } => {
                write!(f, "Clear {} {} ({})", target, name(*color), symbol(*color))
            }
            Goal::ClearMulti { items } => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|it| format!("{} {} ({})", it.target, name(it.color), symbol(it.color)))
                    .collect();
                f.write_str(&parts.join(" + "))
            }
            Goal::DensityBelow { threshold } => {
                write!(f, "Reduce board to ≤ {}% filled", percent(*threshold))
            }
        }
    }
}

fn name(color: u8) -> &'static str {
    COLOR_NAMES.get(color as usize).copied().unwrap_or("?")
}

fn symbol(color: u8) -> &'static str {
    SYMBOLS.get(color as usize).copied().unwrap_or("?")
}

fn percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}
