//! Stateless dashboard views. Each renderer takes a state snapshot and
//! produces the provider payload: JSON with `text` (one-line bar summary)
//! and `tooltip` (full pango-markup panel). The raw-JSON tab is the one
//! exception and returns the readings array itself.
mod charts;
mod fields;
mod status;
mod table;

pub use charts::render as render_charts;
pub use fields::render as render_field;
pub use status::render as render_status;
pub use table::{render as render_table, render_json};

use chrono::{DateTime, Local};

use crate::thingspeak::Reading;

// Catppuccin Frappe palette for status color coding
pub(crate) const GREEN: &str = "#a6d189";
pub(crate) const YELLOW: &str = "#e5c890";
pub(crate) const RED: &str = "#e78284";
pub(crate) const GRAY: &str = "#949cbb";

pub(crate) struct Measurement {
    pub label: &'static str,
    pub unit: &'static str,
    pub value: fn(&Reading) -> f64,
}

/// The five channel fields in positional order, with their display units.
pub(crate) const MEASUREMENTS: [Measurement; 5] = [
    Measurement { label: "CO2", unit: "ppm", value: |r| r.co2 },
    Measurement { label: "Noise", unit: "dB", value: |r| r.noise },
    Measurement { label: "Luminosity", unit: "lux", value: |r| r.luminosity },
    Measurement { label: "Pressure", unit: "hPa", value: |r| r.pressure },
    Measurement { label: "Wind speed", unit: "km/h", value: |r| r.wind_speed },
];

/// Feed timestamps come in as RFC 3339 UTC; views show them in local time.
pub(crate) fn format_timestamp(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub(crate) fn format_time_short(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_timestamps_render_as_na() {
        assert_eq!(format_timestamp(None), "N/A");
        assert_eq!(format_timestamp(Some("yesterday-ish")), "N/A");
    }

    #[test]
    fn rfc3339_timestamps_render() {
        // Exact local rendering depends on the host timezone; shape is enough.
        let rendered = format_timestamp(Some("2026-08-01T10:00:00Z"));
        assert_eq!(rendered.len(), "2026-08-01 10:00:00".len());
        assert_ne!(rendered, "N/A");
    }
}
