use time::{Duration, OffsetDateTime};

/// Wall-clock source for session timestamps; fixed in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(OffsetDateTime),
}

impl Clock {
    pub fn fixed(at: OffsetDateTime) -> Self {
        Self::Fixed(at)
    }

    pub fn now(&self) -> OffsetDateTime {
        match self {
            Clock::System => OffsetDateTime::now_utc(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Moves a fixed clock forward. Has no effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

pub fn fixed_now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(FIXED_TEST_TIMESTAMP).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
