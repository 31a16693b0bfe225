use chrono::DateTime;

use super::{FeedEntry, FeedResponse, FieldResponse, FieldSample, Reading};

/// Convert a raw feed response into readings sorted oldest-to-newest.
///
/// Field slots map positionally: field1 CO2, field2 noise, field3 luminosity,
/// field4 pressure, field5 wind speed. A missing or unparseable field value
/// becomes 0.0 so every reading carries five finite measurements. The sort is
/// explicit (parsed `created_at`, then `entry_id`) so no view ever has to
/// guess which end of the array is newest: it is always the last element.
pub fn convert_feed(response: FeedResponse) -> Vec<Reading> {
    let mut entries = response.feeds;
    entries.sort_by_key(|entry| (timestamp_sort_key(&entry.created_at), entry.entry_id));
    entries.into_iter().map(to_reading).collect()
}

/// Single-field analog of [`convert_feed`].
pub fn convert_field(response: FieldResponse) -> Vec<FieldSample> {
    let mut entries = response.feeds;
    entries.sort_by_key(|entry| (timestamp_sort_key(&entry.created_at), entry.entry_id));
    entries
        .into_iter()
        .map(|entry| FieldSample {
            value: parse_field(entry.field1.as_deref()),
            timestamp: Some(entry.created_at),
        })
        .collect()
}

fn to_reading(entry: FeedEntry) -> Reading {
    Reading {
        co2: parse_field(entry.field1.as_deref()),
        noise: parse_field(entry.field2.as_deref()),
        luminosity: parse_field(entry.field3.as_deref()),
        pressure: parse_field(entry.field4.as_deref()),
        wind_speed: parse_field(entry.field5.as_deref()),
        timestamp: Some(entry.created_at),
    }
}

fn parse_field(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

// Entries with timestamps we cannot parse sort first, in their wire order.
fn timestamp_sort_key(created_at: &str) -> i64 {
    DateTime::parse_from_rfc3339(created_at)
        .map(|parsed| parsed.timestamp_millis())
        .unwrap_or(i64::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thingspeak::FieldEntry;

    fn entry(created_at: &str, entry_id: i64, fields: [Option<&str>; 5]) -> FeedEntry {
        FeedEntry {
            created_at: created_at.to_string(),
            entry_id,
            field1: fields[0].map(str::to_string),
            field2: fields[1].map(str::to_string),
            field3: fields[2].map(str::to_string),
            field4: fields[3].map(str::to_string),
            field5: fields[4].map(str::to_string),
        }
    }

    fn response(feeds: Vec<FeedEntry>) -> FeedResponse {
        FeedResponse { feeds }
    }

    #[test]
    fn converts_every_entry_with_positional_fields() {
        let readings = convert_feed(response(vec![
            entry(
                "2026-08-01T10:00:00Z",
                1,
                [Some("900"), Some("40"), Some("300"), Some("1010"), Some("5")],
            ),
            entry(
                "2026-08-01T10:00:30Z",
                2,
                [Some("905.5"), Some("41.2"), Some("310"), Some("1011"), Some("6")],
            ),
        ]));

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].co2, 900.0);
        assert_eq!(readings[0].noise, 40.0);
        assert_eq!(readings[0].luminosity, 300.0);
        assert_eq!(readings[0].pressure, 1010.0);
        assert_eq!(readings[0].wind_speed, 5.0);
        assert_eq!(readings[0].timestamp.as_deref(), Some("2026-08-01T10:00:00Z"));
        assert_eq!(readings[1].co2, 905.5);
    }

    #[test]
    fn missing_and_garbage_fields_default_to_zero() {
        let readings = convert_feed(response(vec![entry(
            "2026-08-01T10:00:00Z",
            1,
            [None, Some("not-a-number"), Some(""), Some("  1010 "), None],
        )]));

        let reading = &readings[0];
        assert_eq!(reading.co2, 0.0);
        assert_eq!(reading.noise, 0.0);
        assert_eq!(reading.luminosity, 0.0);
        assert_eq!(reading.pressure, 1010.0);
        assert_eq!(reading.wind_speed, 0.0);
        assert!(
            [reading.co2, reading.noise, reading.luminosity, reading.pressure, reading.wind_speed]
                .iter()
                .all(|v| v.is_finite())
        );
    }

    #[test]
    fn sorts_ascending_regardless_of_wire_order() {
        let readings = convert_feed(response(vec![
            entry("2026-08-01T10:01:00Z", 3, [Some("3"), None, None, None, None]),
            entry("2026-08-01T10:00:00Z", 1, [Some("1"), None, None, None, None]),
            entry("2026-08-01T10:00:30Z", 2, [Some("2"), None, None, None, None]),
        ]));

        let order: Vec<f64> = readings.iter().map(|r| r.co2).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
        // Newest is always the last element.
        assert_eq!(readings.last().unwrap().co2, 3.0);
    }

    #[test]
    fn json_round_trip_preserves_values_and_timestamp() {
        let readings = convert_feed(response(vec![entry(
            "2026-08-01T10:00:00Z",
            1,
            [Some("412.5"), Some("45.1"), Some("500"), Some("1013.25"), Some("10")],
        )]));

        let dumped = serde_json::to_string(&readings).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&dumped).unwrap();
        assert_eq!(parsed[0]["co2"], 412.5);
        assert_eq!(parsed[0]["noise"], 45.1);
        assert_eq!(parsed[0]["luminosity"], 500.0);
        assert_eq!(parsed[0]["pressure"], 1013.25);
        assert_eq!(parsed[0]["windSpeed"], 10.0);
        assert_eq!(parsed[0]["timestamp"], "2026-08-01T10:00:00Z");
    }

    #[test]
    fn deserializes_the_wire_shape_ignoring_the_channel_header() {
        let raw = r#"{
            "channel": {"id": 2934236, "name": "enviro", "field1": "CO2", "last_entry_id": 42},
            "feeds": [
                {"created_at": "2026-08-01T10:00:00Z", "entry_id": 42, "field1": "900", "field3": "300"}
            ]
        }"#;
        let readings = convert_feed(serde_json::from_str(raw).unwrap());
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].co2, 900.0);
        assert_eq!(readings[0].noise, 0.0);
        assert_eq!(readings[0].luminosity, 300.0);
    }

    #[test]
    fn converts_single_field_history() {
        let samples = convert_field(FieldResponse {
            feeds: vec![
                FieldEntry {
                    created_at: "2026-08-01T10:00:30Z".to_string(),
                    entry_id: 2,
                    field1: Some("41.2".to_string()),
                },
                FieldEntry {
                    created_at: "2026-08-01T10:00:00Z".to_string(),
                    entry_id: 1,
                    field1: None,
                },
            ],
        });

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 0.0);
        assert_eq!(samples[1].value, 41.2);
    }
}
