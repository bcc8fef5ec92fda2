//! Time source abstraction
//!
//! Controllers never call `Instant::now()` directly; they read a [`Clock`]
//! so timers can be driven deterministically (see
//! [`ManualClock`](crate::infra::testing::ManualClock)).

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

pub trait Clock: Send + Sync + Debug + 'static {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `std::time::Instant`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub type SharedClock = Arc<dyn Clock>;
