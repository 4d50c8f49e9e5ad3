//! Event scheduler
//!
//! One global cycle counter drives the whole system. Components schedule
//! events at absolute cycle times; the frame loop drains everything that has
//! come due between CPU instructions. The counter is 32-bit and allowed to
//! wrap, so every comparison of scheduled times goes through a signed
//! difference.

/// Kinds of scheduled events. Timer and DMA events carry the index of the
/// unit they belong to, which also makes cancellation exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Sentinel pushed by the frame loop; ends `run_frame`.
    FrameEnd,
    /// Start of the horizontal blanking interval on a visible line.
    HBlankStart,
    /// End of horizontal blanking; advances VCOUNT.
    HBlankEnd,
    /// HBlank start during the vertical blanking lines.
    VBlankLineStart,
    /// HBlank end during the vertical blanking lines.
    VBlankLineEnd,
    /// Timer `i` reached 0x10000.
    TimerOverflow(usize),
    /// DMA channel `i` becomes the active transfer.
    DmaActivate(usize),
    /// Re-check interrupt deliverability.
    Irq,
}

/// A pending event.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub kind: EventKind,
    /// Absolute cycle time this event fires at.
    pub time: u32,
}

/// Cycle counter plus the pending event queue, ordered by scheduled time
/// with FIFO on ties.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Pending events, earliest first. Insertion keeps the order; ties go
    /// after existing entries so equal-time events fire in push order.
    queue: Vec<Event>,
    now: u32,
}

/// Wrap-safe "a is before b" comparison of cycle times.
#[inline]
fn before(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            queue: Vec::with_capacity(16),
            now: 0,
        }
    }

    /// Current cycle time.
    pub fn now(&self) -> u32 {
        self.now
    }

    /// Add `cycles` to the counter. Never dispatches; popping due events is
    /// the frame loop's job.
    pub fn advance(&mut self, cycles: u32) {
        self.now = self.now.wrapping_add(cycles);
    }

    /// Schedule `kind` to fire `delta` cycles from now.
    pub fn push(&mut self, kind: EventKind, delta: u32) {
        let time = self.now.wrapping_add(delta);
        let idx = self.queue.partition_point(|ev| !before(time, ev.time));
        self.queue.insert(idx, Event { kind, time });
    }

    /// Remove every pending event matching `kind` exactly (including the
    /// timer/channel index it carries).
    pub fn cancel(&mut self, kind: EventKind) {
        self.queue.retain(|ev| ev.kind != kind);
    }

    /// Pop the earliest event whose time has been reached, if any.
    pub fn pop_due(&mut self) -> Option<Event> {
        let head = self.queue.first()?;
        if before(self.now, head.time) {
            return None;
        }
        Some(self.queue.remove(0))
    }

    /// Scheduled time of the earliest pending event.
    pub fn next_time(&self) -> Option<u32> {
        self.queue.first().map(|ev| ev.time)
    }

    /// Jump the counter to the next event's time. Used while the CPU is
    /// halted instead of stepping instructions.
    pub fn fast_forward(&mut self) {
        if let Some(t) = self.next_time() {
            if before(self.now, t) {
                self.now = t;
            }
        }
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
