//! Deadline-based debouncing.
//!
//! The caller supplies the clock (milliseconds, e.g. `performance.now()` in
//! the browser) and polls; nothing here spawns timers. A burst of
//! notifications inside the quiet period collapses into one call.

/// Tracks a single pending deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Record an event at `now_ms`, pushing the deadline back.
    pub fn notify(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// True exactly once per burst, when the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consume a pending deadline without waiting for it.
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// A plain function call behind a `Debouncer`.
pub struct Debounced<F> {
    debouncer: Debouncer,
    func: F,
}

impl<F> Debounced<F> {
    pub fn new(delay_ms: f64, func: F) -> Self {
        Self {
            debouncer: Debouncer::new(delay_ms),
            func,
        }
    }

    pub fn trigger(&mut self, now_ms: f64) {
        self.debouncer.notify(now_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }

    /// Run the function if the quiet period ended by `now_ms`.
    pub fn tick<A, R>(&mut self, now_ms: f64, arg: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        self.debouncer
            .poll(now_ms)
            .then(|| (self.func)(arg))
    }

    /// Run the function now if a call is pending.
    pub fn flush<A, R>(&mut self, arg: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        self.debouncer.take_pending().then(|| (self.func)(arg))
    }
}

impl<F> std::fmt::Debug for Debounced<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounced")
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}
