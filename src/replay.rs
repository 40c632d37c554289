//! Notification id assignment and bounded replay history.
//!
//! The peer processes items in order and reports at most one failure before
//! hanging up. Keeping the most recent submissions, newest first, is enough
//! to work out after the fact which notification failed and which were never
//! attempted. History is bounded; once entries have been evicted the report
//! can no longer be complete, and [`CloseResult::unsent_buffer_overflow`]
//! says so.

use std::collections::VecDeque;

use crate::{frame::NotificationId, status::ErrorEvent};

/// Hands out notification ids for one connection.
///
/// Ids start at 1, increase by one per call and wrap past `u32::MAX` back to
/// 1, never yielding zero.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Option<NotificationId>,
}

impl IdGenerator {
    /// Create a generator whose first id is 1.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a generator that continues after `last`.
    #[must_use]
    pub fn after(last: NotificationId) -> Self { Self { last: Some(last) } }

    /// Return the next id.
    pub fn next_id(&mut self) -> NotificationId {
        let id = self.last.map_or(NotificationId::FIRST, NotificationId::next);
        self.last = Some(id);
        id
    }
}

/// A submitted payload and the id it was sent under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentifiedPayload<P> {
    /// Id embedded in the payload's item.
    pub id: NotificationId,
    /// The payload as submitted.
    pub payload: P,
}

impl<P> IdentifiedPayload<P> {
    /// Pair `payload` with `id`.
    pub fn new(id: NotificationId, payload: P) -> Self { Self { id, payload } }
}

/// Terminal report delivered once per connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseResult<P> {
    /// The event that ended the connection.
    pub error: ErrorEvent,
    /// Payloads that were definitely not processed, oldest first. Safe to
    /// resend on a new connection.
    pub unsent_payloads: Vec<P>,
    /// The payload the peer reported as failed, if it was still retained.
    pub error_payload: Option<P>,
    /// Set when the failure could not be located in the retained history and
    /// older entries had already been evicted, so more notifications than
    /// those listed may have been lost.
    pub unsent_buffer_overflow: bool,
}

/// Bounded, newest-first history of submitted payloads.
///
/// # Examples
///
/// ```
/// use pushframe::{
///     ErrorEvent,
///     replay::{IdGenerator, IdentifiedPayload, ReplayBuffer},
/// };
///
/// let mut ids = IdGenerator::new();
/// let mut history = ReplayBuffer::new(8);
/// for name in ["a", "b", "c"] {
///     history.record(IdentifiedPayload::new(ids.next_id(), name));
/// }
///
/// // The peer rejected notification 2.
/// let close = history.resolve(ErrorEvent::from_response([8, 8, 0, 0, 0, 2]));
/// assert_eq!(close.error_payload, Some("b"));
/// assert_eq!(close.unsent_payloads, vec!["c"]);
/// assert!(!close.unsent_buffer_overflow);
/// ```
#[derive(Debug)]
pub struct ReplayBuffer<P> {
    entries: VecDeque<IdentifiedPayload<P>>,
    capacity: usize,
    evicted: u64,
}

impl<P> ReplayBuffer<P> {
    /// Create an empty history retaining at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1_024)),
            capacity,
            evicted: 0,
        }
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Return `true` if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Number of entries dropped to stay within capacity.
    #[must_use]
    pub fn evicted(&self) -> u64 { self.evicted }

    /// Iterate over retained entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &IdentifiedPayload<P>> { self.entries.iter() }

    /// Record a newly submitted payload, returning the oldest entry if it had
    /// to be evicted. Evicted entries cannot be reported later.
    pub fn record(&mut self, entry: IdentifiedPayload<P>) -> Option<IdentifiedPayload<P>> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.evicted += 1;
            return self.entries.pop_back();
        }
        None
    }

    /// Partition the history around `error` and build the terminal report.
    ///
    /// Entries newer than the one matching the reported id are unsent; the
    /// match itself is the error payload. When the id is absent or not
    /// retained, every retained entry is unsent and the overflow flag records
    /// whether anything had been evicted beforehand.
    #[must_use]
    pub fn resolve(self, error: ErrorEvent) -> CloseResult<P> {
        let target = error.notification_id;
        let mut unsent = Vec::with_capacity(self.entries.len());
        let mut error_payload = None;
        for entry in self.entries {
            if target == Some(entry.id) {
                error_payload = Some(entry.payload);
                break;
            }
            unsent.push(entry.payload);
        }
        unsent.reverse();

        let unsent_buffer_overflow = error_payload.is_none() && self.evicted > 0;
        CloseResult {
            error,
            unsent_payloads: unsent,
            error_payload,
            unsent_buffer_overflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::status::ErrorCode;

    fn filled(capacity: usize, count: u32) -> ReplayBuffer<u32> {
        let mut ids = IdGenerator::new();
        let mut history = ReplayBuffer::new(capacity);
        for n in 1..=count {
            let id = ids.next_id();
            assert_eq!(id.get(), n);
            history.record(IdentifiedPayload::new(id, n));
        }
        history
    }

    fn peer_error(code: u8, id: u32) -> ErrorEvent {
        let id = id.to_be_bytes();
        ErrorEvent::from_response([8, code, id[0], id[1], id[2], id[3]])
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut ids = IdGenerator::new();
        let drawn: Vec<u32> = (0..4).map(|_| ids.next_id().get()).collect();
        assert_eq!(drawn, vec![1, 2, 3, 4]);
    }

    #[test]
    fn ids_wrap_to_one() {
        let last = NotificationId::new(u32::MAX - 1).expect("non-zero id");
        let mut ids = IdGenerator::after(last);
        assert_eq!(ids.next_id().get(), u32::MAX);
        assert_eq!(ids.next_id().get(), 1);
        assert_eq!(ids.next_id().get(), 2);
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let mut history = ReplayBuffer::new(3);
        let mut ids = IdGenerator::new();
        let mut evicted = Vec::new();
        for n in 1..=5u32 {
            if let Some(old) = history.record(IdentifiedPayload::new(ids.next_id(), n)) {
                evicted.push(old.payload);
            }
            assert!(history.len() <= 3);
        }
        assert_eq!(evicted, vec![1, 2]);
        assert_eq!(history.evicted(), 2);
        let retained: Vec<u32> = history.iter().map(|e| e.payload).collect();
        assert_eq!(retained, vec![5, 4, 3]);
    }

    #[rstest]
    #[case::first(1, vec![2, 3, 4, 5])]
    #[case::middle(3, vec![4, 5])]
    #[case::newest(5, vec![])]
    fn matching_id_splits_history(#[case] failed: u32, #[case] unsent: Vec<u32>) {
        let close = filled(10, 5).resolve(peer_error(8, failed));
        assert_eq!(close.error_payload, Some(failed));
        assert_eq!(close.unsent_payloads, unsent);
        assert!(!close.unsent_buffer_overflow);
        assert_eq!(close.error.code, ErrorCode::InvalidToken);
    }

    #[test]
    fn shutdown_reports_everything_retained() {
        let close = filled(10, 3).resolve(ErrorEvent::shutdown("eof"));
        assert_eq!(close.error_payload, None);
        assert_eq!(close.unsent_payloads, vec![1, 2, 3]);
        assert!(!close.unsent_buffer_overflow);
    }

    #[test]
    fn evicted_error_id_sets_overflow() {
        let close = filled(2, 4).resolve(peer_error(8, 1));
        assert_eq!(close.error_payload, None);
        assert_eq!(close.unsent_payloads, vec![3, 4]);
        assert!(close.unsent_buffer_overflow);
    }

    #[test]
    fn shutdown_after_eviction_sets_overflow() {
        let close = filled(2, 3).resolve(ErrorEvent::shutdown("reset"));
        assert_eq!(close.unsent_payloads, vec![2, 3]);
        assert!(close.unsent_buffer_overflow);
    }

    #[test]
    fn unknown_id_without_eviction_keeps_overflow_clear() {
        let close = filled(10, 3).resolve(peer_error(1, 99));
        assert_eq!(close.error_payload, None);
        assert_eq!(close.unsent_payloads, vec![1, 2, 3]);
        assert!(!close.unsent_buffer_overflow);
    }

    #[test]
    fn retained_error_id_after_eviction_is_not_overflow() {
        let close = filled(2, 4).resolve(peer_error(8, 3));
        assert_eq!(close.error_payload, Some(3));
        assert_eq!(close.unsent_payloads, vec![4]);
        assert!(!close.unsent_buffer_overflow);
    }

    #[test]
    fn empty_history_resolves_cleanly() {
        let close = ReplayBuffer::<u32>::new(4).resolve(ErrorEvent::shutdown("closed"));
        assert!(close.unsent_payloads.is_empty());
        assert_eq!(close.error_payload, None);
        assert!(!close.unsent_buffer_overflow);
    }
}
