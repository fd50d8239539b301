// SPDX-License-Identifier: PMPL-1.0-or-later

//! Countdown to the ceremony.
//!
//! [`CountdownSnapshot`] is derived from `target - now` and never stored.
//! [`CountdownClock`] recomputes it once per period on a timer thread.
//! There is at most one timer per clock: `start` cancels and joins the
//! previous one, `stop` is idempotent, and dropping the clock stops it.
//!
//! Once the target has passed the timer publishes the expired snapshot a
//! single time and then exits on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSnapshot {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_expired: bool,
}

impl CountdownSnapshot {
    pub const EXPIRED: CountdownSnapshot = CountdownSnapshot {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        is_expired: true,
    };

    /// Split a remaining duration in milliseconds. `diff <= 0` is expired.
    pub fn from_millis(diff: i64) -> Self {
        if diff <= 0 {
            return Self::EXPIRED;
        }
        Self {
            days: (diff / MS_PER_DAY) as u64,
            hours: ((diff % MS_PER_DAY) / MS_PER_HOUR) as u64,
            minutes: ((diff % MS_PER_HOUR) / MS_PER_MINUTE) as u64,
            seconds: ((diff % MS_PER_MINUTE) / MS_PER_SECOND) as u64,
            is_expired: false,
        }
    }

    pub fn between(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_millis((target - now).num_milliseconds())
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for CountdownSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_expired {
            return f.write_str("expired");
        }
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Where "now" comes from.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualTime {
    now: Mutex<DateTime<Utc>>,
}

impl ManualTime {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += by;
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type Listener = Arc<dyn Fn(CountdownSnapshot) + Send + Sync>;

struct Shared {
    target: Option<DateTime<Utc>>,
    snapshot: CountdownSnapshot,
}

struct Timer {
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct CountdownClock {
    time: Arc<dyn TimeSource>,
    period: Duration,
    shared: Arc<Mutex<Shared>>,
    listener: Option<Listener>,
    timer: Option<Timer>,
}

impl fmt::Debug for CountdownClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownClock")
            .field("period", &self.period)
            .field("target", &self.target())
            .field("snapshot", &self.snapshot())
            .field("running", &self.is_running())
            .finish()
    }
}

impl CountdownClock {
    pub fn new(time: Arc<dyn TimeSource>, period: Duration) -> Self {
        Self {
            time,
            period,
            shared: Arc::new(Mutex::new(Shared {
                target: None,
                snapshot: CountdownSnapshot::default(),
            })),
            listener: None,
            timer: None,
        }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemTime), DEFAULT_TICK)
    }

    /// Called with every snapshot the timer publishes. Takes effect on the
    /// next `start`.
    pub fn on_tick<F>(&mut self, listener: F)
    where
        F: Fn(CountdownSnapshot) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
    }

    /// Count down to `target`. Any running timer is cancelled first.
    pub fn start(&mut self, target: DateTime<Utc>) -> CountdownSnapshot {
        self.stop();
        self.lock().target = Some(target);
        let first = self.tick();
        if first.is_expired {
            debug!(%target, "countdown target already passed, timer not started");
            return first;
        }

        let (cancel, cancelled) = mpsc::channel::<()>();
        let time = Arc::clone(&self.time);
        let shared = Arc::clone(&self.shared);
        let listener = self.listener.clone();
        let period = self.period;
        let spawned = thread::Builder::new()
            .name("countdown-timer".to_string())
            .spawn(move || loop {
                match cancelled.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                let snapshot = CountdownSnapshot::between(target, time.now());
                shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .snapshot = snapshot;
                if let Some(listener) = &listener {
                    listener(snapshot);
                }
                if snapshot.is_expired {
                    debug!(%target, "countdown expired, timer stopping");
                    break;
                }
            });
        match spawned {
            Ok(handle) => self.timer = Some(Timer { cancel, handle }),
            Err(err) => warn!(%err, "could not start countdown timer"),
        }
        first
    }

    /// Cancel the timer if one is running. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            let _ = timer.cancel.send(());
            if timer.handle.join().is_err() {
                warn!("countdown timer panicked");
            }
        }
    }

    /// Recompute the snapshot against the current target now.
    pub fn tick(&self) -> CountdownSnapshot {
        let snapshot = {
            let mut shared = self.lock();
            let snapshot = match shared.target {
                Some(target) => CountdownSnapshot::between(target, self.time.now()),
                None => CountdownSnapshot::default(),
            };
            shared.snapshot = snapshot;
            snapshot
        };
        if let Some(listener) = &self.listener {
            listener(snapshot);
        }
        snapshot
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        self.lock().snapshot
    }

    pub fn target(&self) -> Option<DateTime<Utc>> {
        self.lock().target
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| !timer.handle.is_finished())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn one_of_each_unit() {
        let snap = CountdownSnapshot::from_millis(90_061_000);
        assert_eq!(
            snap,
            CountdownSnapshot {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1,
                is_expired: false
            }
        );
        assert_eq!(snap.total_seconds(), 90_061);
        assert_eq!(snap.to_string(), "1d 01h 01m 01s");
    }

    #[test]
    fn past_and_present_targets_are_expired() {
        assert_eq!(CountdownSnapshot::from_millis(-1_000), CountdownSnapshot::EXPIRED);
        assert_eq!(CountdownSnapshot::from_millis(0), CountdownSnapshot::EXPIRED);
        assert_eq!(CountdownSnapshot::EXPIRED.to_string(), "expired");
    }

    #[test]
    fn sub_second_remainder_is_not_expired() {
        let snap = CountdownSnapshot::from_millis(999);
        assert!(!snap.is_expired);
        assert_eq!(snap.total_seconds(), 0);
    }

    #[test]
    fn start_computes_immediately() {
        let time = Arc::new(ManualTime::new(base()));
        let mut clock = CountdownClock::new(time.clone(), Duration::from_secs(60));
        let target = base() + chrono::Duration::milliseconds(90_061_000);
        let first = clock.start(target);
        assert_eq!(first.days, 1);
        assert_eq!(clock.snapshot(), first);
        assert_eq!(clock.target(), Some(target));
        assert!(clock.is_running());
        clock.stop();
        assert!(!clock.is_running());
    }

    #[test]
    fn timer_publishes_and_stops_after_expiry() {
        let time = Arc::new(ManualTime::new(base()));
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut clock = CountdownClock::new(time.clone(), Duration::from_millis(10));
        let counter = ticks.clone();
        clock.on_tick(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        clock.start(base() + chrono::Duration::seconds(30));
        assert!(wait_until(|| ticks.load(Ordering::SeqCst) >= 2));
        assert_eq!(clock.snapshot().seconds, 30);

        time.advance(chrono::Duration::seconds(31));
        assert!(wait_until(|| clock.snapshot().is_expired));
        assert!(wait_until(|| !clock.is_running()));
        assert_eq!(clock.snapshot(), CountdownSnapshot::EXPIRED);
    }

    #[test]
    fn expired_target_never_spawns_timer() {
        let time = Arc::new(ManualTime::new(base()));
        let mut clock = CountdownClock::new(time, Duration::from_millis(10));
        let snap = clock.start(base() - chrono::Duration::seconds(1));
        assert!(snap.is_expired);
        assert!(!clock.is_running());
    }

    #[test]
    fn restart_replaces_timer() {
        let time = Arc::new(ManualTime::new(base()));
        let mut clock = CountdownClock::new(time, Duration::from_millis(10));
        clock.start(base() + chrono::Duration::days(3));
        let snap = clock.start(base() + chrono::Duration::hours(5));
        assert_eq!(snap.days, 0);
        assert_eq!(snap.hours, 5);
        assert!(wait_until(|| clock.snapshot().hours == 5));
        assert_eq!(clock.snapshot().days, 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut clock = CountdownClock::new(Arc::new(ManualTime::new(base())), DEFAULT_TICK);
        clock.stop();
        clock.start(base() + chrono::Duration::minutes(1));
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
    }

    #[test]
    fn tick_without_target_is_zeroed() {
        let clock = CountdownClock::new(Arc::new(ManualTime::new(base())), DEFAULT_TICK);
        assert_eq!(clock.tick(), CountdownSnapshot::default());
    }
}
