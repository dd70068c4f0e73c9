//! Cooperative cancellation for the decision core.
//!
//! Search polls a `CancellationToken` at every node. The token trips when the
//! shared stop flag is raised by another thread or when its deadline passes;
//! search then unwinds through ordinary returns.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    stop: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token observing an externally owned stop flag.
    pub fn from_flag(stop: Arc<AtomicBool>) -> Self {
        Self {
            stop,
            deadline: None,
        }
    }

    /// Same stop flag, with a deadline. An earlier existing deadline wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing <= deadline => existing,
            _ => deadline,
        };
        Self {
            stop: Arc::clone(&self.stop),
            deadline: Some(deadline),
        }
    }

    #[inline]
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Lower the stop flag so the token can be reused for the next decision.
    #[inline]
    pub fn reset(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        self.deadline.is_some_and(|limit| Instant::now() >= limit)
    }

    #[inline]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Background timer that raises a stop flag after a budget, the way a host
/// interrupts a player that is still thinking.
#[derive(Debug)]
pub struct HostTimer {
    disarmed: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl HostTimer {
    pub fn spawn(stop: Arc<AtomicBool>, budget: Duration) -> Self {
        let disarmed = Arc::new(AtomicBool::new(false));
        let thread_disarmed = Arc::clone(&disarmed);
        let handle = thread::spawn(move || {
            thread::sleep(budget);
            if !thread_disarmed.load(Ordering::Relaxed) {
                stop.store(true, Ordering::Relaxed);
            }
        });
        Self { disarmed, handle }
    }

    /// Keep the timer from firing. The sleeping thread is left to finish on
    /// its own.
    pub fn disarm(&self) {
        self.disarmed.store(true, Ordering::Relaxed);
    }

    /// Block until the timer thread has finished.
    pub fn join(self) {
        // A panicking timer thread has nothing to report.
        let _ = self.handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::{CancellationToken, HostTimer};
    use std::time::{Duration, Instant};

    #[test]
    fn flag_is_shared_between_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
        token.reset();
        assert!(!observer.is_cancelled());
    }

    #[test]
    fn past_deadline_cancels() {
        let token = CancellationToken::new().with_deadline(Instant::now());
        assert!(token.is_cancelled());

        let later = Instant::now() + Duration::from_secs(60);
        let earlier = Instant::now() + Duration::from_secs(30);
        let token = CancellationToken::new().with_deadline(earlier).with_deadline(later);
        assert_eq!(token.deadline(), Some(earlier));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn host_timer_raises_the_flag() {
        let token = CancellationToken::new();
        let timer = HostTimer::spawn(token.flag(), Duration::from_millis(5));
        timer.join();
        assert!(token.is_cancelled());
    }

    #[test]
    fn disarmed_timer_stays_quiet() {
        let token = CancellationToken::new();
        let timer = HostTimer::spawn(token.flag(), Duration::from_millis(5));
        timer.disarm();
        timer.join();
        assert!(!token.is_cancelled());
    }
}
