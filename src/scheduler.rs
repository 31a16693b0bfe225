//! Refresh loop: the interval job plus the manual and post-submit triggers.
//! Triggers are allowed to overlap; the sequence token handed out by the
//! dashboard state decides which response lands (see `state::Dashboard`).

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::state::SharedDashboard;
use crate::thingspeak::{convert_feed, Gateway};

/// How long a write takes to become visible to reads on the remote service.
/// A heuristic, not a guarantee.
const WRITE_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// One refresh cycle: fetch the feed, convert, publish into the shared state.
/// The state transition in `finish` runs on success and failure alike, so
/// the loading flag is always released.
pub fn refresh(gateway: &Gateway, state: &SharedDashboard, results: usize) {
    let seq = state.lock().unwrap().begin();
    debug!("refresh #{seq}: fetching last {results} entries");

    let result = gateway.fetch_feed(results).map(convert_feed);
    if let Err(err) = &result {
        warn!("refresh #{seq} failed: {err}");
    }
    state.lock().unwrap().finish(seq, result);
}

/// Interval-driven refresh worker. Runs once immediately on start, then every
/// `interval` until the process exits.
pub struct RefreshJob {
    interval: Duration,
    gateway: Arc<Gateway>,
    state: SharedDashboard,
    results: usize,
}

impl RefreshJob {
    pub fn new(
        interval: Duration,
        gateway: Arc<Gateway>,
        state: SharedDashboard,
        results: usize,
    ) -> RefreshJob {
        RefreshJob { interval, gateway, state, results }
    }

    pub fn run(self) {
        thread::Builder::new()
            .name("feed-refresh".to_string())
            .spawn(move || {
                info!("refresh job started, interval {:?}", self.interval);
                loop {
                    refresh(&self.gateway, &self.state, self.results);
                    thread::sleep(self.interval);
                }
            })
            .expect("Error spawning refresh job thread");
    }
}

/// User-initiated refresh: same path as the interval tick, just now.
pub fn spawn_refresh(gateway: Arc<Gateway>, state: SharedDashboard, results: usize) {
    thread::spawn(move || refresh(&gateway, &state, results));
}

/// After a successful submit, give the service a moment to make the write
/// visible, then refresh once.
pub fn spawn_post_submit_refresh(gateway: Arc<Gateway>, state: SharedDashboard, results: usize) {
    thread::spawn(move || {
        thread::sleep(WRITE_SETTLE_DELAY);
        refresh(&gateway, &state, results);
    });
}

pub fn write_settle_delay() -> Duration {
    WRITE_SETTLE_DELAY
}
