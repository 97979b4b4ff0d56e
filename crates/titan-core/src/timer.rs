//! Deferred-callback scheduling ("run this after N milliseconds").
//!
//! Everything in the shell runs on one thread. Callbacks are queued with a
//! delay relative to the queue's current time and receive the context that
//! owns the queue when they fire. Time never advances on its own: the host
//! feeds its monotonic clock into [`run_due`], and tests use [`run_until`]
//! to step a virtual clock.
//!
//! Ordering: callbacks fire by due time, ties broken by submission order, so
//! equal delays run FIFO while a later, shorter delay may overtake an earlier,
//! longer one.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A queued callback.
pub type Callback<C> = Box<dyn FnOnce(&mut C)>;

/// Handle for cancelling a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Pending callbacks keyed by `(due_ms, submission_seq)`.
pub struct TimerQueue<C> {
    now_ms: u64,
    next_seq: u64,
    pending: BTreeMap<(u64, u64), Callback<C>>,
    due_by_seq: HashMap<u64, u64>,
}

impl<C> Default for TimerQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TimerQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now_ms", &self.now_ms)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<C> TimerQueue<C> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            pending: BTreeMap::new(),
            due_by_seq: HashMap::new(),
        }
    }

    /// The time of the most recent pass.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Queue `callback` to run `delay_ms` after the current time.
    pub fn schedule(&mut self, delay_ms: u64, callback: impl FnOnce(&mut C) + 'static) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.pending.insert((due, seq), Box::new(callback));
        self.due_by_seq.insert(seq, due);
        TimerId(seq)
    }

    /// Cancel a pending callback. Returns `false` if it already fired or was
    /// already cancelled; that is not an error.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_by_seq.remove(&id.0) {
            Some(due) => self.pending.remove(&(due, id.0)).is_some(),
            None => false,
        }
    }

    /// Whether `id` is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.due_by_seq.contains_key(&id.0)
    }

    /// Number of queued callbacks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest queued callback.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|&(due, _)| due)
    }

    /// Start a pass at `now_ms` and return the submission bound for it:
    /// only callbacks queued before the pass began are eligible.
    fn begin_pass(&mut self, now_ms: u64) -> u64 {
        self.now_ms = self.now_ms.max(now_ms);
        self.next_seq
    }

    /// Remove the next callback that is due and was queued before `seq_bound`.
    ///
    /// Anything queued during a pass is due no earlier than `now_ms` with a
    /// larger sequence number, so it always sorts after every eligible entry
    /// and the first key decides.
    fn pop_due(&mut self, seq_bound: u64) -> Option<Callback<C>> {
        let &(due, seq) = self.pending.keys().next()?;
        if due > self.now_ms || seq >= seq_bound {
            return None;
        }
        self.due_by_seq.remove(&seq);
        self.pending.remove(&(due, seq))
    }
}

/// A context that owns the queue its callbacks run against.
pub trait TimerHost: Sized {
    fn timers(&mut self) -> &mut TimerQueue<Self>;
}

/// Run every callback due at `now_ms`. Returns how many ran.
pub fn run_due<C: TimerHost>(ctx: &mut C, now_ms: u64) -> usize {
    let bound = ctx.timers().begin_pass(now_ms);
    let mut ran = 0;
    while let Some(callback) = ctx.timers().pop_due(bound) {
        callback(ctx);
        ran += 1;
    }
    ran
}

/// Step the clock through every due time up to `target_ms`, running callbacks
/// in order as if real time had passed. Returns how many ran.
///
/// Each instant gets one pass. Anything re-queued with zero delay during a
/// pass runs a millisecond later, so the clock always moves forward.
pub fn run_until<C: TimerHost>(ctx: &mut C, target_ms: u64) -> usize {
    let mut ran = 0;
    let mut last_pass: Option<u64> = None;
    while let Some(due) = ctx.timers().next_due() {
        let at = match last_pass {
            Some(prev) if due <= prev => prev + 1,
            _ => due,
        };
        if at > target_ms {
            break;
        }
        ran += run_due(ctx, at);
        last_pass = Some(at);
    }
    ctx.timers().begin_pass(target_ms);
    ran
}
