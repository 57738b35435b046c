//! Bounded event queue with an atomic check-then-enqueue gate.

use crate::{CONFIG_SECTION, MAX_QUEUE_SIZE_KEY};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use waymark_common_config::{ConfigError, ConfigSource};
use waymark_event_types::UserEvent;

/// Maximum number of events the queue may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueBound {
    /// At most this many events.
    Bounded(NonZeroUsize),
    /// No limit.
    Unbounded,
}

impl QueueBound {
    /// Read the bound from `MaxEventQueueSize` in the `UserEventRecorder` section.
    ///
    /// An absent key means unbounded. Zero, negative or non-integer values are
    /// configuration errors.
    pub fn from_config(config: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let Some(size) = config.get_int(CONFIG_SECTION, MAX_QUEUE_SIZE_KEY)? else {
            return Ok(Self::Unbounded);
        };

        usize::try_from(size)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self::Bounded)
            .ok_or_else(|| {
                ConfigError::invalid(
                    CONFIG_SECTION,
                    MAX_QUEUE_SIZE_KEY,
                    format!("must be a positive integer, got {size}"),
                )
            })
    }

    /// The bound as a plain count, if any.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Self::Bounded(n) => Some(n.get()),
            Self::Unbounded => None,
        }
    }
}

/// Result of offering an event to the queue.
#[derive(Debug)]
pub(crate) enum Offer {
    Accepted,
    /// The queue was full. `warn` is set for the first rejection after the
    /// warning was re-armed.
    Rejected { event: UserEvent, warn: bool },
}

/// What the consumer got while waiting.
#[derive(Debug)]
pub(crate) enum WaitOutcome {
    Item(UserEvent),
    Cancelled,
    /// Only from [`EventQueue::try_wait`].
    WouldBlock,
}

pub(crate) struct EventQueue {
    sender: Sender<UserEvent>,
    receiver: Receiver<UserEvent>,
    bound: QueueBound,
    /// Overflow warning armed flag; also serialises submitters.
    gate: Mutex<bool>,
}

impl EventQueue {
    /// Storage grows on demand; the bound is enforced in [`EventQueue::offer`].
    pub(crate) fn new(bound: QueueBound) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();

        Self {
            sender,
            receiver,
            bound,
            gate: Mutex::new(true),
        }
    }

    pub(crate) fn bound(&self) -> QueueBound {
        self.bound
    }

    /// Enqueue if there is room. Never blocks on a full queue.
    pub(crate) fn offer(&self, event: UserEvent) -> Offer {
        let mut armed = self.gate.lock();

        // Only the consumer runs outside the gate, and it only shrinks the queue.
        let full = self
            .bound
            .capacity()
            .is_some_and(|cap| self.receiver.len() >= cap);

        let rejected = if full {
            event
        } else {
            match self.sender.try_send(event) {
                Ok(()) => {
                    *armed = true;
                    return Offer::Accepted;
                }
                Err(err) => err.into_inner(),
            }
        };

        let warn = std::mem::replace(&mut *armed, false);
        Offer::Rejected { event: rejected, warn }
    }

    /// Take the next event or the cancellation signal without blocking.
    ///
    /// Queued events win over cancellation.
    pub(crate) fn try_wait(&self, cancel: &Receiver<()>) -> WaitOutcome {
        if let Ok(event) = self.receiver.try_recv() {
            return WaitOutcome::Item(event);
        }

        match cancel.try_recv() {
            Err(TryRecvError::Empty) => WaitOutcome::WouldBlock,
            _ => WaitOutcome::Cancelled,
        }
    }

    /// Block until the next event or the cancellation signal.
    ///
    /// Queued events win over cancellation.
    pub(crate) fn wait(&self, cancel: &Receiver<()>) -> WaitOutcome {
        if let Ok(event) = self.receiver.try_recv() {
            return WaitOutcome::Item(event);
        }

        crossbeam_channel::select! {
            recv(self.receiver) -> msg => match msg {
                Ok(event) => WaitOutcome::Item(event),
                Err(_) => WaitOutcome::Cancelled,
            },
            recv(cancel) -> _ => WaitOutcome::Cancelled,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};
    use test_case::test_case;
    use waymark_common_config::MemoryConfig;
    use waymark_event_types::SubjectId;

    fn event(name: &str) -> UserEvent {
        UserEvent::login(SubjectId::new(), name, "Lobby")
    }

    fn bounded(n: usize) -> EventQueue {
        EventQueue::new(QueueBound::Bounded(NonZeroUsize::new(n).unwrap()))
    }

    #[test_case("1", Some(1) ; "one")]
    #[test_case("500", Some(500) ; "five hundred")]
    #[test_case(" 42 ", Some(42) ; "whitespace trimmed")]
    fn test_bound_from_config(raw: &str, expected: Option<usize>) {
        let config = MemoryConfig::new().with(CONFIG_SECTION, MAX_QUEUE_SIZE_KEY, raw);
        assert_eq!(QueueBound::from_config(&config).unwrap().capacity(), expected);
    }

    #[test_case("0" ; "zero")]
    #[test_case("-3" ; "negative")]
    #[test_case("lots" ; "not a number")]
    fn test_bound_rejects(raw: &str) {
        let config = MemoryConfig::new().with(CONFIG_SECTION, MAX_QUEUE_SIZE_KEY, raw);
        assert!(matches!(
            QueueBound::from_config(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_absent_bound_is_unbounded() {
        let bound = QueueBound::from_config(&MemoryConfig::new()).unwrap();
        assert_eq!(bound, QueueBound::Unbounded);
        assert_eq!(bound.capacity(), None);
    }

    #[test]
    fn test_offer_respects_bound() {
        let queue = bounded(2);
        assert!(matches!(queue.offer(event("a")), Offer::Accepted));
        assert!(matches!(queue.offer(event("b")), Offer::Accepted));

        match queue.offer(event("c")) {
            Offer::Rejected { event, warn } => {
                assert_eq!(event.subject_name(), "c");
                assert!(warn);
            }
            Offer::Accepted => panic!("queue over bound"),
        }
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_warning_rearms_after_success() {
        let queue = bounded(1);
        let (_cancel_tx, cancel) = crossbeam_channel::bounded::<()>(1);

        assert!(matches!(queue.offer(event("e1")), Offer::Accepted));
        assert!(matches!(queue.offer(event("e2")), Offer::Rejected { warn: true, .. }));
        assert!(matches!(queue.offer(event("e3")), Offer::Rejected { warn: false, .. }));

        assert!(matches!(queue.wait(&cancel), WaitOutcome::Item(_)));
        assert!(matches!(queue.offer(event("e4")), Offer::Accepted));
        assert!(matches!(queue.offer(event("e5")), Offer::Rejected { warn: true, .. }));
    }

    #[test]
    fn test_wait_is_fifo() {
        let queue = bounded(3);
        let (cancel_tx, cancel) = crossbeam_channel::bounded::<()>(1);
        for name in ["a", "b", "c"] {
            assert!(matches!(queue.offer(event(name)), Offer::Accepted));
        }
        cancel_tx.send(()).unwrap();

        let mut seen = Vec::new();
        while let WaitOutcome::Item(e) = queue.wait(&cancel) {
            seen.push(e.subject_name().to_string());
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_wait_outcomes() {
        let queue = Arc::new(EventQueue::new(QueueBound::Unbounded));
        let (cancel_tx, cancel) = crossbeam_channel::bounded::<()>(1);

        let start = Instant::now();
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                assert!(matches!(queue.offer(event("late")), Offer::Accepted));
            })
        };
        match queue.wait(&cancel) {
            WaitOutcome::Item(e) => assert_eq!(e.subject_name(), "late"),
            other => panic!("woke without an item: {other:?}"),
        }
        assert!(start.elapsed() >= Duration::from_millis(20));
        producer.join().unwrap();

        assert!(matches!(queue.try_wait(&cancel), WaitOutcome::WouldBlock));
        cancel_tx.send(()).unwrap();
        assert!(matches!(queue.wait(&cancel), WaitOutcome::Cancelled));

        assert!(matches!(queue.offer(event("queued")), Offer::Accepted));
        drop(cancel_tx);
        assert!(matches!(queue.try_wait(&cancel), WaitOutcome::Item(_)));
        assert!(matches!(queue.try_wait(&cancel), WaitOutcome::Cancelled));
    }

    #[test]
    fn test_items_win_over_cancellation() {
        let queue = bounded(1);
        let (cancel_tx, cancel) = crossbeam_channel::bounded::<()>(1);
        cancel_tx.send(()).unwrap();
        assert!(matches!(queue.offer(event("late")), Offer::Accepted));

        assert!(matches!(queue.wait(&cancel), WaitOutcome::Item(_)));
    }

    #[test]
    fn test_huge_bound_reserves_nothing_up_front() {
        let queue = bounded(1 << 40);
        assert!(matches!(queue.offer(event("a")), Offer::Accepted));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_unbounded_accepts_many() {
        let queue = EventQueue::new(QueueBound::Unbounded);
        for i in 0..10_000 {
            assert!(matches!(queue.offer(event(&i.to_string())), Offer::Accepted));
        }
        assert_eq!(queue.len(), 10_000);
    }
}
