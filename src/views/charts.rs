use std::collections::HashMap;

use crate::state::Snapshot;

use super::{format_time_short, GRAY, MEASUREMENTS};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One glyph per value, scaled between the series min and max. A flat series
/// renders at the lowest level.
pub(crate) fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|value| {
            let level = if span > 0.0 {
                (((value - min) / span) * (BARS.len() - 1) as f64).round() as usize
            } else {
                0
            };
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

/// Time-series panel: one sparkline per measurement, points in the feed's
/// ascending order, spanning the first to the newest reading.
pub fn render(snapshot: &Snapshot) -> Result<String, Box<dyn std::error::Error>> {
    let readings = &snapshot.readings;

    let mut tooltip = "<span size=\"xx-large\">Sensor Charts</span>\n".to_string();
    let text;

    if readings.is_empty() {
        text = format!("<span foreground=\"{GRAY}\">┄</span>");
        tooltip += "  no readings yet\n";
    } else {
        let from = format_time_short(readings.first().and_then(|r| r.timestamp.as_deref()));
        let to = format_time_short(readings.last().and_then(|r| r.timestamp.as_deref()));
        tooltip += &format!("{} points, {from} → {to}\n", readings.len());

        for m in &MEASUREMENTS {
            let values: Vec<f64> = readings.iter().map(m.value).collect();
            let latest = *values.last().unwrap();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            tooltip += &format!("\n<b>{label} ({unit})</b>\n", label = m.label, unit = m.unit);
            tooltip += &format!(
                "  {spark}  min {min}, max {max}, latest {latest}\n",
                spark = sparkline(&values),
            );
        }

        let co2: Vec<f64> = readings.iter().map(|r| r.co2).collect();
        text = format!("<span size=\"x-small\">{}</span>", sparkline(&co2));
    }

    let mut result = HashMap::new();
    result.insert("text", text);
    result.insert("tooltip", format!("<tt>{tooltip}</tt>"));
    Ok(serde_json::to_string(&result)?)
}
