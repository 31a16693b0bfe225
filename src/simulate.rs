//! Synthetic reading source for the submit path: the form defaults, the
//! randomizer, and the explicit-values constructor.

use rand::Rng;

use crate::thingspeak::Reading;

/// Plausible indoor baseline; what the submit path sends when no values are
/// given.
pub fn default_reading() -> Reading {
    Reading {
        co2: 400.0,
        noise: 45.0,
        luminosity: 500.0,
        pressure: 1013.25,
        wind_speed: 10.0,
        timestamp: None,
    }
}

/// Draw all five measurements from domain-plausible ranges: CO2 in whole ppm
/// within [300, 2000), noise/luminosity/wind at one decimal within [0, 100),
/// [0, 1000) and [0, 100), pressure at two decimals within [1000, 1030).
pub fn random_reading() -> Reading {
    let mut rng = rand::thread_rng();
    Reading {
        co2: rng.gen_range(300.0f64..2000.0).floor(),
        noise: round_to(rng.gen_range(0.0..100.0), 1),
        luminosity: round_to(rng.gen_range(0.0..1000.0), 1),
        pressure: round_to(1000.0 + rng.gen_range(0.0..30.0), 2),
        wind_speed: round_to(rng.gen_range(0.0..100.0), 1),
        timestamp: None,
    }
}

pub fn reading_from_values(values: [f64; 5]) -> Reading {
    Reading {
        co2: values[0],
        noise: values[1],
        luminosity: values[2],
        pressure: values[3],
        wind_speed: values[4],
        timestamp: None,
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_form_baseline() {
        let reading = default_reading();
        assert_eq!(reading.co2, 400.0);
        assert_eq!(reading.noise, 45.0);
        assert_eq!(reading.luminosity, 500.0);
        assert_eq!(reading.pressure, 1013.25);
        assert_eq!(reading.wind_speed, 10.0);
        assert!(reading.timestamp.is_none());
    }

    #[test]
    fn random_readings_stay_in_range() {
        for _ in 0..200 {
            let reading = random_reading();
            assert!((300.0..2000.0).contains(&reading.co2));
            assert_eq!(reading.co2.fract(), 0.0);
            // Rounding can land exactly on the open upper bound.
            assert!((0.0..=100.0).contains(&reading.noise));
            assert!((0.0..=1000.0).contains(&reading.luminosity));
            assert!((1000.0..=1030.0).contains(&reading.pressure));
            assert!((0.0..=100.0).contains(&reading.wind_speed));
        }
    }

    #[test]
    fn explicit_values_map_positionally() {
        let reading = reading_from_values([900.0, 40.0, 300.0, 1010.0, 5.0]);
        assert_eq!(reading.pressure, 1010.0);
        assert_eq!(reading.wind_speed, 5.0);
    }
}
