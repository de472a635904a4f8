use async_trait::async_trait;
use sprout_core::{
    Profile, SubjectId,
    interface::seed::{SeedError, SeedGenerator},
};
use std::{
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
    task::Poll,
};

///
/// SeedBehavior
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SeedBehavior {
    Succeed,
    Fail(String),
    /// Never completes; only cancellation or dropping ends the call.
    Hang,
}

///
/// RecordingSeeder
///
/// Seed generator that records every profile it was asked to populate.
///

pub struct RecordingSeeder {
    behavior: Mutex<SeedBehavior>,
    calls: Mutex<Vec<SubjectId>>,
}

impl RecordingSeeder {
    #[must_use]
    pub const fn new(behavior: SeedBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn succeeding() -> Self {
        Self::new(SeedBehavior::Succeed)
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::new(SeedBehavior::Fail(message.to_string()))
    }

    #[must_use]
    pub const fn hanging() -> Self {
        Self::new(SeedBehavior::Hang)
    }

    pub fn set_behavior(&self, behavior: SeedBehavior) {
        *lock(&self.behavior) = behavior;
    }

    /// Profiles passed to `generate`, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<SubjectId> {
        lock(&self.calls).clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl Default for RecordingSeeder {
    fn default() -> Self {
        Self::succeeding()
    }
}

#[async_trait]
impl SeedGenerator for RecordingSeeder {
    async fn generate(&self, profile: &Profile) -> Result<(), SeedError> {
        lock(&self.calls).push(profile.id.clone());
        let behavior = lock(&self.behavior).clone();

        match behavior {
            SeedBehavior::Succeed => Ok(()),
            SeedBehavior::Fail(message) => Err(SeedError::new(message)),
            SeedBehavior::Hang => futures::future::pending().await,
        }
    }
}

/// Cancellation signal that stays pending until its `n`th poll.
///
/// A seed checks its cancel signal once before claiming, so `n = 1` cancels
/// before any claim and `n >= 2` fires while populate is running.
#[must_use]
pub fn cancel_on_poll(n: usize) -> impl Future<Output = ()> + Send {
    let mut polls = 0;
    futures::future::poll_fn(move |cx| {
        polls += 1;
        if polls >= n {
            Poll::Ready(())
        } else {
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
