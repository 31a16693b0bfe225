use std::collections::HashMap;

use crate::state::Snapshot;

use super::{format_time_short, format_timestamp, GRAY, MEASUREMENTS};

const HISTORY_ROWS: usize = 5;

/// The table tab: the newest reading as a key/value block, then up to five
/// most recent rows, newest first.
pub fn render(snapshot: &Snapshot) -> Result<String, Box<dyn std::error::Error>> {
    let mut tooltip = "<span size=\"xx-large\">Sensor Data</span>\n".to_string();
    if snapshot.loading {
        tooltip += &format!("<span foreground=\"{GRAY}\">loading...</span>\n");
    }

    let text = match snapshot.readings.last() {
        Some(latest) => {
            tooltip += "\n<b>Latest reading</b>\n";
            for m in &MEASUREMENTS {
                tooltip += &format!(
                    "  {label: <12} {value} {unit}\n",
                    label = m.label,
                    value = (m.value)(latest),
                    unit = m.unit,
                );
            }
            tooltip += &format!("  {: <12} {}\n", "Timestamp", format_timestamp(latest.timestamp.as_deref()));

            tooltip += "\n<b>History</b>\n";
            tooltip += &format!(
                "  {: <9} {: >8} {: >7} {: >8} {: >9} {: >7}\n",
                "time", "co2", "noise", "lux", "hPa", "km/h"
            );
            for reading in snapshot.readings.iter().rev().take(HISTORY_ROWS) {
                tooltip += &format!(
                    "  {: <9} {: >8} {: >7} {: >8} {: >9} {: >7}\n",
                    format_time_short(reading.timestamp.as_deref()),
                    reading.co2,
                    reading.noise,
                    reading.luminosity,
                    reading.pressure,
                    reading.wind_speed,
                );
            }

            format!("{} ppm", latest.co2)
        }
        None => {
            tooltip += "  no readings yet\n";
            "--".to_string()
        }
    };

    let mut result = HashMap::new();
    result.insert("text", text);
    result.insert("tooltip", format!("<tt>{tooltip}</tt>"));
    Ok(serde_json::to_string(&result)?)
}

/// The JSON tab: the full readings array, pretty-printed, canonical keys.
pub fn render_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&snapshot.readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thingspeak::Reading;

    fn reading(co2: f64, second: u32) -> Reading {
        Reading {
            co2,
            noise: 45.1,
            luminosity: 500.0,
            pressure: 1013.25,
            wind_speed: 10.0,
            timestamp: Some(format!("2026-08-01T10:00:{second:02}Z")),
        }
    }

    fn snapshot(readings: Vec<Reading>) -> Snapshot {
        Snapshot { readings, loading: false, last_updated: None, last_error: None }
    }

    #[test]
    fn table_shows_latest_values_and_caps_history() {
        let readings: Vec<Reading> = (0..8).map(|i| reading(400.0 + i as f64, i)).collect();
        let payload = render(&snapshot(readings)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let tooltip = parsed["tooltip"].as_str().unwrap();

        // Newest reading (co2 407) leads; rows older than the 5-row window
        // (co2 400..402) are not listed.
        assert_eq!(parsed["text"], "407 ppm");
        assert!(tooltip.contains("407"));
        assert!(tooltip.contains("403"));
        assert!(!tooltip.contains("10:00:02"));
    }

    #[test]
    fn json_tab_round_trips_the_array() {
        let original = vec![reading(412.5, 0), reading(418.0, 30)];
        let dumped = render_json(&snapshot(original.clone())).unwrap();
        let parsed: Vec<Reading> = serde_json::from_str(&dumped).unwrap();
        assert_eq!(parsed, original);
    }
}
