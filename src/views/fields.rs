use std::collections::HashMap;

use crate::thingspeak::FieldSample;

use super::charts::sparkline;
use super::{format_time_short, MEASUREMENTS};

/// Single-field history view: sparkline plus one row per sample, fed by the
/// narrow per-field read path.
pub fn render(field_index: u8, samples: &[FieldSample]) -> Result<String, Box<dyn std::error::Error>> {
    let slot = match field_index {
        1..=5 => (field_index - 1) as usize,
        _ => return Err(format!("field index {field_index} out of range (1-5)").into()),
    };
    let m = &MEASUREMENTS[slot];

    let mut tooltip = format!(
        "<span size=\"xx-large\">{label} ({unit})</span>\n",
        label = m.label,
        unit = m.unit
    );

    let text;
    if samples.is_empty() {
        text = "--".to_string();
        tooltip += "  no samples yet\n";
    } else {
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        tooltip += &format!("  {}\n\n", sparkline(&values));
        for sample in samples.iter().rev() {
            tooltip += &format!(
                "  {: <9} {value} {unit}\n",
                format_time_short(sample.timestamp.as_deref()),
                value = sample.value,
                unit = m.unit,
            );
        }
        text = format!("{} {}", values.last().unwrap(), m.unit);
    }

    let mut result = HashMap::new();
    result.insert("text", text);
    result.insert("tooltip", format!("<tt>{tooltip}</tt>"));
    Ok(serde_json::to_string(&result)?)
}
