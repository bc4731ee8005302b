//! Bounded, lock-free hand-off of input events from the input ISR to the
//! control loop.
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`post()`](EventQueue::post) (the input ISR or callback).
//! - Only ONE context may call [`take()`](EventQueue::take) (the control loop).

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use embedded_hal::delay::DelayNs;

use super::{InputEvent, InputSource, Key, PressKind};
use crate::constants::EVENT_QUEUE_SLOTS;

/// Granularity of the timed wait in [`QueueInput::poll`].
const POLL_STEP_MS: u32 = 1;

/// Fixed-capacity single-producer single-consumer event queue.
///
/// Holds up to `N - 1` events; one slot separates full from empty.
pub struct EventQueue<const N: usize = EVENT_QUEUE_SLOTS> {
    slots: [UnsafeCell<InputEvent>; N],
    /// Next slot to write (producer only).
    head: AtomicUsize,
    /// Next slot to read (consumer only).
    tail: AtomicUsize,
}

// SAFETY: under the SPSC contract each slot is written by the producer only
// while it is outside [tail, head) and read by the consumer only while inside.
// Release/Acquire on head and tail order the slot accesses.
unsafe impl<const N: usize> Sync for EventQueue<N> {}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        assert!(N >= 2, "event queue needs at least 2 slots (1 usable)");
        EventQueue {
            slots: [const { UnsafeCell::new(InputEvent::new(Key::Back, PressKind::Short)) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Usable capacity.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Enqueue without blocking (producer side).
    ///
    /// Returns the event back if the queue is full; it is the caller's to drop.
    pub fn post(&self, event: InputEvent) -> Result<(), InputEvent> {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) % N;
        if next == self.tail.load(Ordering::Acquire) {
            warn!("input queue full, dropping {}", event);
            return Err(event);
        }
        // SAFETY: sole producer; `next != tail` means the consumer is not reading this slot.
        unsafe {
            *self.slots[head].get() = event;
        }
        self.head.store(next, Ordering::Release);
        Ok(())
    }

    /// Dequeue without blocking (consumer side).
    pub fn take(&self) -> Option<InputEvent> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: sole consumer; `tail != head` means the producer has published this slot.
        let event = unsafe { *self.slots[tail].get() };
        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(event)
    }

    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Acquire) == self.head.load(Ordering::Acquire)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }
}

/// Consumer end of an [`EventQueue`] with a blocking-with-timeout receive.
///
/// Waits in 1 ms steps on a [`DelayNs`] provider, so the timeout resolution
/// is one millisecond.
pub struct QueueInput<'q, D, const N: usize = EVENT_QUEUE_SLOTS> {
    queue: &'q EventQueue<N>,
    delay: D,
}

impl<'q, D, const N: usize> QueueInput<'q, D, N>
where
    D: DelayNs,
{
    pub fn new(queue: &'q EventQueue<N>, delay: D) -> Self {
        QueueInput { queue, delay }
    }

    /// Give back the delay provider.
    pub fn release(self) -> D {
        self.delay
    }
}

impl<'q, D, const N: usize> InputSource for QueueInput<'q, D, N>
where
    D: DelayNs,
{
    fn poll(&mut self, timeout_ms: u32) -> Option<InputEvent> {
        let mut waited = 0;
        loop {
            if let Some(event) = self.queue.take() {
                return Some(event);
            }
            if waited >= timeout_ms {
                return None;
            }
            self.delay.delay_ms(POLL_STEP_MS);
            waited += POLL_STEP_MS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP: InputEvent = InputEvent::short(Key::Up);
    const DOWN: InputEvent = InputEvent::short(Key::Down);
    const OK_LONG: InputEvent = InputEvent::long(Key::Ok);

    /// Delay that records the total requested wait.
    struct CountingDelay {
        waited_ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waited_ns += ns as u64;
        }
    }

    #[test]
    fn post_and_take_in_order() {
        let q: EventQueue<4> = EventQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.capacity(), 3);

        q.post(UP).unwrap();
        q.post(DOWN).unwrap();
        q.post(OK_LONG).unwrap();
        assert_eq!(q.len(), 3);

        assert_eq!(q.post(UP), Err(UP));

        assert_eq!(q.take(), Some(UP));
        assert_eq!(q.take(), Some(DOWN));
        assert_eq!(q.take(), Some(OK_LONG));
        assert_eq!(q.take(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn default_capacity_is_eight() {
        let q: EventQueue = EventQueue::new();
        for _ in 0..8 {
            q.post(UP).unwrap();
        }
        assert!(q.post(DOWN).is_err());
        assert_eq!(q.len(), 8);
    }

    #[test]
    fn indices_wrap_around() {
        let q: EventQueue<3> = EventQueue::new();
        for _ in 0..10 {
            q.post(UP).unwrap();
            q.post(DOWN).unwrap();
            assert_eq!(q.take(), Some(UP));
            assert_eq!(q.take(), Some(DOWN));
            assert!(q.is_empty());
        }
    }

    #[test]
    fn static_queue_is_usable() {
        static EVENTS: EventQueue = EventQueue::new();
        EVENTS.post(OK_LONG).unwrap();
        assert_eq!(EVENTS.take(), Some(OK_LONG));
    }

    #[test]
    fn poll_returns_pending_event_without_waiting() {
        let q: EventQueue = EventQueue::new();
        q.post(UP).unwrap();
        let mut input = QueueInput::new(&q, CountingDelay { waited_ns: 0 });

        assert_eq!(input.poll(100), Some(UP));
        assert_eq!(input.release().waited_ns, 0);
    }

    #[test]
    fn poll_waits_for_the_full_timeout_when_empty() {
        let q: EventQueue = EventQueue::new();
        let mut input = QueueInput::new(&q, CountingDelay { waited_ns: 0 });

        assert_eq!(input.poll(100), None);
        assert_eq!(input.release().waited_ns, 100 * 1_000_000);
    }

    #[test]
    fn poll_with_zero_timeout_does_not_wait() {
        let q: EventQueue = EventQueue::new();
        let mut input = QueueInput::new(&q, CountingDelay { waited_ns: 0 });

        assert_eq!(input.poll(0), None);
        assert_eq!(input.release().waited_ns, 0);
    }
}
