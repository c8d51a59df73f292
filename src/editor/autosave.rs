//! Debounced autosave.
//!
//! Every edit cancels the pending deadline and arms a new one; a save is only
//! handed out once the quiet period has elapsed and no earlier save is still
//! in flight. Time is passed in by the caller so the host's event loop owns
//! the clock.

use std::time::{Duration, Instant};

use crate::settings::schema::AutoSaveInterval;

const MIN_DELAY: Duration = Duration::from_secs(1);

/// Handle for one in-flight save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Pending { deadline: Instant },
    Saving { ticket: SaveTicket, rearm: Option<Instant> },
}

#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    delay: Option<Duration>,
    phase: Phase,
    next_ticket: u64,
}

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self::from_interval(AutoSaveInterval::default())
    }
}

impl AutosaveTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            phase: Phase::Idle,
            next_ticket: 1,
        }
    }

    pub fn disabled() -> Self {
        Self {
            delay: None,
            phase: Phase::Idle,
            next_ticket: 1,
        }
    }

    pub fn from_interval(interval: AutoSaveInterval) -> Self {
        match interval.as_seconds() {
            Some(secs) => Self::new(Duration::from_secs(secs).max(MIN_DELAY)),
            None => Self::disabled(),
        }
    }

    /// Switching the interval drops any pending deadline.
    pub fn set_interval(&mut self, interval: AutoSaveInterval) {
        self.delay = interval
            .as_seconds()
            .map(|secs| Duration::from_secs(secs).max(MIN_DELAY));
        self.cancel();
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    pub fn is_enabled(&self) -> bool {
        self.delay.is_some()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
            || matches!(self.phase, Phase::Saving { rearm: Some(_), .. })
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.phase, Phase::Saving { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Pending { deadline } => Some(deadline),
            Phase::Saving { rearm, .. } => rearm,
            Phase::Idle => None,
        }
    }

    /// Cancel-and-reschedule. While a save is in flight the new deadline is
    /// held back until that save completes.
    pub fn schedule(&mut self, now: Instant) {
        let Some(delay) = self.delay else {
            return;
        };
        let deadline = now + delay;
        match &mut self.phase {
            Phase::Saving { rearm, .. } => *rearm = Some(deadline),
            phase => *phase = Phase::Pending { deadline },
        }
    }

    /// Drops the pending deadline. An in-flight save keeps running but will
    /// not re-arm the timer when it completes.
    pub fn cancel(&mut self) {
        match &mut self.phase {
            Phase::Saving { rearm, .. } => *rearm = None,
            phase => *phase = Phase::Idle,
        }
    }

    /// Hands out a ticket once the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SaveTicket> {
        let Phase::Pending { deadline } = self.phase else {
            return None;
        };
        if now < deadline {
            return None;
        }

        let ticket = SaveTicket(self.next_ticket);
        self.next_ticket += 1;
        self.phase = Phase::Saving {
            ticket,
            rearm: None,
        };
        Some(ticket)
    }

    /// Marks `ticket` finished. Returns false for tickets that are not the
    /// one in flight.
    pub fn complete(&mut self, ticket: SaveTicket) -> bool {
        match self.phase {
            Phase::Saving {
                ticket: current,
                rearm,
            } if current == ticket => {
                self.phase = match rearm {
                    Some(deadline) => Phase::Pending { deadline },
                    None => Phase::Idle,
                };
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(10);

    #[test]
    fn burst_of_changes_yields_one_save_timed_from_last() {
        let t0 = Instant::now();
        let mut timer = AutosaveTimer::new(DELAY);

        timer.schedule(t0);
        timer.schedule(t0 + Duration::from_secs(3));

        assert_eq!(timer.poll(t0 + DELAY), None);
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(13)));

        let ticket = timer.poll(t0 + Duration::from_secs(13)).expect("due");
        assert_eq!(timer.poll(t0 + Duration::from_secs(60)), None);
        assert!(timer.complete(ticket));
        assert_eq!(timer.poll(t0 + Duration::from_secs(120)), None);
    }

    #[test]
    fn never_fires_while_a_save_is_in_flight() {
        let t0 = Instant::now();
        let mut timer = AutosaveTimer::new(DELAY);

        timer.schedule(t0);
        let first = timer.poll(t0 + DELAY).expect("due");

        timer.schedule(t0 + Duration::from_secs(11));
        assert_eq!(timer.poll(t0 + Duration::from_secs(30)), None);
        assert!(timer.is_saving());

        assert!(timer.complete(first));
        let second = timer.poll(t0 + Duration::from_secs(30)).expect("rearmed");
        assert_ne!(first, second);
    }

    #[test]
    fn cancel_drops_pending_and_rearm() {
        let t0 = Instant::now();
        let mut timer = AutosaveTimer::new(DELAY);

        timer.schedule(t0);
        timer.cancel();
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(t0 + DELAY * 2), None);

        timer.schedule(t0);
        let ticket = timer.poll(t0 + DELAY).expect("due");
        timer.schedule(t0 + DELAY);
        timer.cancel();
        assert!(timer.complete(ticket));
        assert_eq!(timer.poll(t0 + DELAY * 5), None);
    }

    #[test]
    fn stale_tickets_are_ignored() {
        let t0 = Instant::now();
        let mut timer = AutosaveTimer::new(DELAY);
        assert!(!timer.complete(SaveTicket(42)));

        timer.schedule(t0);
        let ticket = timer.poll(t0 + DELAY).expect("due");
        assert!(!timer.complete(SaveTicket(ticket.0 + 1)));
        assert!(timer.complete(ticket));
        assert!(!timer.complete(ticket));
    }

    #[test]
    fn disabled_timer_never_schedules() {
        let t0 = Instant::now();
        let mut timer = AutosaveTimer::from_interval(AutoSaveInterval::Off);
        timer.schedule(t0);
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(t0 + Duration::from_secs(3600)), None);

        timer.set_interval(AutoSaveInterval::Seconds(0));
        assert_eq!(timer.delay(), Some(MIN_DELAY));
    }
}
