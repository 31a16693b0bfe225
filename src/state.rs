//! The one shared mutable resource in the process: current readings plus the
//! loading/last-updated bookkeeping around them. Refresh cycles are the only
//! writers; views take snapshots.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

use crate::thingspeak::{GatewayError, Reading};

pub type SharedDashboard = Arc<Mutex<Dashboard>>;

pub fn shared() -> SharedDashboard {
    Arc::new(Mutex::new(Dashboard::new()))
}

/// Read-only copy of the fields the views render from.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub readings: Vec<Reading>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Local>>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct Dashboard {
    readings: Vec<Reading>,
    last_updated: Option<DateTime<Local>>,
    last_error: Option<String>,
    in_flight: usize,
    next_seq: u64,
    accepted_seq: u64,
}

impl Dashboard {
    pub fn new() -> Dashboard {
        Dashboard {
            readings: Vec::new(),
            last_updated: None,
            last_error: None,
            in_flight: 0,
            next_seq: 0,
            accepted_seq: 0,
        }
    }

    /// Start a refresh: raises the loading count and hands out a monotonic
    /// sequence token. Concurrent refreshes each get their own token.
    pub fn begin(&mut self) -> u64 {
        self.in_flight += 1;
        self.next_seq += 1;
        self.next_seq
    }

    /// Finish the refresh that was started with `seq`. The loading count
    /// drops no matter what, so the loading indicator cannot stick. A result
    /// carrying a token at or below the last accepted one is stale (a newer
    /// refresh already landed) and is discarded. A failure keeps the previous
    /// readings: stale data beats a blank panel.
    pub fn finish(&mut self, seq: u64, result: Result<Vec<Reading>, GatewayError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(readings) if seq > self.accepted_seq => {
                self.readings = readings;
                self.last_updated = Some(Local::now());
                self.last_error = None;
                self.accepted_seq = seq;
            }
            Ok(_) => {}
            Err(err) => {
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            readings: self.readings.clone(),
            loading: self.is_loading(),
            last_updated: self.last_updated,
            last_error: self.last_error.clone(),
        }
    }
}
