use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_AUTOSAVE_SECS: i64 = 30;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<DateTime<Utc>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Periodic save, driven by whoever owns it calling `poll` with the time.
#[derive(Debug, Clone)]
pub struct Autosave {
    interval: Duration,
    next_due: Option<DateTime<Utc>>,
}

impl Autosave {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.next_due = Some(self.due_after(now));
    }

    // Saturates instead of overflowing for very long intervals
    fn due_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// True when a save is due. Missed intervals collapse into one save.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(self.due_after(now));
                true
            }
            _ => false,
        }
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_AUTOSAVE_SECS))
    }
}
