use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// One second of challenge countdown has passed.
    CountdownTick,
    /// The answer feedback window has closed.
    FeedbackElapsed,
}

/// Ownership token for a scheduled timer. Not `Clone`, so exactly one owner
/// can cancel it.
#[derive(Debug, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Entry {
    id: u64,
    due: Duration,
    period: Option<Duration>,
    kind: TimerKind,
}

/// Timers over simulated time. The owner feeds elapsed time in, so nothing
/// fires unless the owner lets time flow.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, kind: TimerKind, after: Duration) -> TimerHandle {
        self.insert(kind, after, None)
    }

    pub fn schedule_repeating(&mut self, kind: TimerKind, period: Duration) -> TimerHandle {
        // A zero period would fire forever within a single advance.
        let period = period.max(Duration::from_millis(1));
        self.insert(kind, period, Some(period))
    }

    fn insert(&mut self, kind: TimerKind, after: Duration, period: Option<Duration>) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: self.now + after,
            period,
            kind,
        });
        TimerHandle(id)
    }

    /// Returns false if the timer already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != handle.0);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Remaining time until the given timer fires.
    pub fn remaining(&self, handle: &TimerHandle) -> Option<Duration> {
        self.entries
            .iter()
            .find(|entry| entry.id == handle.0)
            .map(|entry| entry.due.saturating_sub(self.now))
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its due time. Repeating timers are rescheduled one period later.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerKind> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.id))
            .map(|(index, _)| index)?;
        let entry = &mut self.entries[index];
        self.now = self.now.max(entry.due);
        let kind = entry.kind;
        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some(kind)
    }

    /// Moves the clock to `until` once every due timer has been popped.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
