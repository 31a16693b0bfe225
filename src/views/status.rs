use std::collections::HashMap;

use crate::state::Snapshot;
use crate::thingspeak::Reading;

use super::{format_timestamp, GRAY, GREEN, MEASUREMENTS, RED, YELLOW};

// Fixed alert thresholds; the panel is not configurable.
const CO2_WARN_PPM: f64 = 1000.0;
const NOISE_WARN_DB: f64 = 85.0;
const PRESSURE_MIN_HPA: f64 = 980.0;
const PRESSURE_MAX_HPA: f64 = 1020.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Normal,
    Warning,
}

/// Threshold check for one measurement slot (positional, 0-based).
/// Luminosity and wind speed have no alert thresholds.
pub fn measurement_status(slot: usize, value: f64) -> Status {
    let warning = match slot {
        0 => value > CO2_WARN_PPM,
        1 => value > NOISE_WARN_DB,
        3 => value < PRESSURE_MIN_HPA || value > PRESSURE_MAX_HPA,
        _ => false,
    };
    if warning { Status::Warning } else { Status::Normal }
}

fn warning_count(reading: &Reading) -> usize {
    MEASUREMENTS
        .iter()
        .enumerate()
        .filter(|(slot, m)| measurement_status(*slot, (m.value)(reading)) == Status::Warning)
        .count()
}

/// The system-status panel: the newest reading's five measurements with
/// their warning state, plus the last-updated stamp and any pending error.
pub fn render(snapshot: &Snapshot) -> Result<String, Box<dyn std::error::Error>> {
    let latest = snapshot.readings.last();

    let text = match latest {
        Some(reading) => match warning_count(reading) {
            0 => format!("<span foreground=\"{GREEN}\">● OK</span>"),
            n => format!("<span foreground=\"{YELLOW}\">● {n} warn</span>"),
        },
        None => format!("<span foreground=\"{GRAY}\">● --</span>"),
    };

    let mut tooltip = "<span size=\"xx-large\">System Status</span>\n".to_string();
    tooltip += &format!(
        "Last updated: {}\n",
        snapshot
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    );
    if snapshot.loading {
        tooltip += &format!("<span foreground=\"{GRAY}\">refreshing...</span>\n");
    }
    if let Some(err) = &snapshot.last_error {
        tooltip += &format!("<span foreground=\"{RED}\">connection trouble: {err}</span>\n");
    }
    tooltip.push('\n');

    match latest {
        Some(reading) => {
            for (slot, m) in MEASUREMENTS.iter().enumerate() {
                let value = (m.value)(reading);
                let color = match measurement_status(slot, value) {
                    Status::Warning => YELLOW,
                    Status::Normal => GREEN,
                };
                tooltip += &format!(
                    "  {label: <12} <span foreground=\"{color}\">{value} {unit}</span>\n",
                    label = m.label,
                    unit = m.unit,
                );
            }
            tooltip += &format!("\n  measured at {}\n", format_timestamp(reading.timestamp.as_deref()));
        }
        None => tooltip += "  no readings yet\n",
    }

    let mut result = HashMap::new();
    result.insert("text", text);
    result.insert("tooltip", format!("<tt>{tooltip}</tt>"));
    Ok(serde_json::to_string(&result)?)
}
