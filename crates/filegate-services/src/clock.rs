//! Time source for token expiry.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-utils"))]
mod manual {
    use super::Clock;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;
    use std::time::Duration;

    /// A clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub fn advance(&self, by: Duration) {
            let by = chrono::Duration::from_std(by).expect("duration out of range");
            let mut now = self.now.lock().unwrap();
            *now += by;
        }

        pub fn set(&self, to: DateTime<Utc>) {
            *self.now.lock().unwrap() = to;
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new(Utc::now())
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
