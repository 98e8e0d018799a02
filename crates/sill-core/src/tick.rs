use std::time::{Duration, Instant};

pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);
pub const REMINDER_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Autosave,
    Reminder,
}

#[derive(Debug)]
struct Interval {
    kind: TickKind,
    period: Duration,
    next: Instant,
}

#[derive(Debug)]
pub struct Ticker {
    intervals: Vec<Interval>,
}

impl Ticker {
    pub fn new(start: Instant) -> Self {
        Self {
            intervals: vec![
                Interval {
                    kind: TickKind::Autosave,
                    period: AUTOSAVE_INTERVAL,
                    next: start + AUTOSAVE_INTERVAL,
                },
                Interval {
                    kind: TickKind::Reminder,
                    period: REMINDER_INTERVAL,
                    next: start + REMINDER_INTERVAL,
                },
            ],
        }
    }

    pub fn due(&mut self, now: Instant) -> Vec<TickKind> {
        let mut fired = Vec::new();
        for interval in &mut self.intervals {
            if interval.next <= now {
                fired.push(interval.kind);
                while interval.next <= now {
                    interval.next += interval.period;
                }
            }
        }
        fired
    }

    pub fn next_deadline(&self) -> Instant {
        self.intervals
            .iter()
            .map(|interval| interval.next)
            .min()
            .unwrap_or_else(Instant::now)
    }
}
