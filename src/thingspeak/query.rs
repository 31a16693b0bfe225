use core::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};

use super::{FeedResponse, FieldResponse, GatewayError, Reading, WriteOutcome};
use crate::config::Config;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Blocking HTTP gateway to one ThingSpeak channel. Holds the credentials and
/// a reused client; every call hits the network (no caching, no retries).
pub struct Gateway {
    client: Client,
    base_url: String,
    channel_id: String,
    read_api_key: String,
    write_api_key: String,
}

impl Gateway {
    pub fn new(config: &Config) -> Result<Gateway, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::new(REQUEST_TIMEOUT_SECS, 0))
            .build()?;
        Ok(Gateway {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            channel_id: config.channel_id.clone(),
            read_api_key: config.read_api_key.clone(),
            write_api_key: config.write_api_key.clone(),
        })
    }

    /// Push one reading to the channel's update endpoint. Only a transport
    /// failure is an `Err`; a non-2xx answer comes back in the outcome.
    pub fn send_reading(&self, reading: &Reading) -> Result<WriteOutcome, GatewayError> {
        let response = self.update_request(reading).send()?;
        let status = response.status();
        Ok(WriteOutcome {
            ok: status.is_success(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }

    /// Fetch the last `results` entries of the whole feed.
    pub fn fetch_feed(&self, results: usize) -> Result<FeedResponse, GatewayError> {
        let url = format!(
            "{base}/channels/{id}/feeds.json",
            base = self.base_url,
            id = self.channel_id
        );
        let raw = self
            .client
            .get(url)
            .query(&[("api_key", self.read_api_key.clone()), ("results", results.to_string())])
            .send()?
            .text()?;
        Ok(serde_json::from_str::<FeedResponse>(&raw)?)
    }

    /// Fetch the last `results` entries of a single field (1 through 5).
    pub fn fetch_field(&self, field_index: u8, results: usize) -> Result<FieldResponse, GatewayError> {
        let url = format!(
            "{base}/channels/{id}/fields/{field_index}.json",
            base = self.base_url,
            id = self.channel_id
        );
        let raw = self
            .client
            .get(url)
            .query(&[("api_key", self.read_api_key.clone()), ("results", results.to_string())])
            .send()?
            .text()?;
        Ok(serde_json::from_str::<FieldResponse>(&raw)?)
    }

    fn update_request(&self, reading: &Reading) -> RequestBuilder {
        self.client
            .get(format!("{base}/update", base = self.base_url))
            .query(&[
                ("api_key", self.write_api_key.clone()),
                ("field1", fmt_field(reading.co2)),
                ("field2", fmt_field(reading.noise)),
                ("field3", fmt_field(reading.luminosity)),
                ("field4", fmt_field(reading.pressure)),
                ("field5", fmt_field(reading.wind_speed)),
            ])
    }
}

// f64 Display gives the shortest representation: 900.0 -> "900",
// 1013.25 -> "1013.25". Matches what the channel expects in query params.
fn fmt_field(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_gateway() -> Gateway {
        let config = Config {
            base_url: "https://api.thingspeak.com".to_string(),
            channel_id: "2934236".to_string(),
            read_api_key: "READKEY".to_string(),
            write_api_key: "WRITEKEY".to_string(),
            ..Config::default()
        };
        Gateway::new(&config).expect("client should build")
    }

    fn query_map(request: reqwest::blocking::Request) -> HashMap<String, String> {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn update_request_encodes_measurements_positionally() {
        let gateway = test_gateway();
        let reading = Reading {
            co2: 900.0,
            noise: 40.0,
            luminosity: 300.0,
            pressure: 1010.0,
            wind_speed: 5.0,
            timestamp: None,
        };

        let request = gateway.update_request(&reading).build().unwrap();
        assert_eq!(request.url().path(), "/update");

        let params = query_map(request);
        assert_eq!(params["api_key"], "WRITEKEY");
        assert_eq!(params["field1"], "900");
        assert_eq!(params["field2"], "40");
        assert_eq!(params["field3"], "300");
        assert_eq!(params["field4"], "1010");
        assert_eq!(params["field5"], "5");
    }

    #[test]
    fn update_request_keeps_fractional_precision() {
        let gateway = test_gateway();
        let reading = Reading {
            co2: 412.5,
            noise: 45.1,
            luminosity: 500.0,
            pressure: 1013.25,
            wind_speed: 10.0,
            timestamp: None,
        };

        let params = query_map(gateway.update_request(&reading).build().unwrap());
        assert_eq!(params["field1"], "412.5");
        assert_eq!(params["field4"], "1013.25");
    }
}
