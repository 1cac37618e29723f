use thiserror::Error;

/// The error returned by the throwing accessor tier when the deque holds no
/// elements.
///
/// Only [`front`], [`back`], [`front_mut`], [`back_mut`], [`pop_front`] and
/// [`pop_back`] produce this error. The sentinel tier ([`peek_front`],
/// [`peek_back`], [`poll_front`], [`poll_back`]) never fails and reads the
/// deque's default value instead.
///
/// [`front`]: crate::RingDeque::front
/// [`back`]: crate::RingDeque::back
/// [`front_mut`]: crate::RingDeque::front_mut
/// [`back_mut`]: crate::RingDeque::back_mut
/// [`pop_front`]: crate::RingDeque::pop_front
/// [`pop_back`]: crate::RingDeque::pop_back
/// [`peek_front`]: crate::RingDeque::peek_front
/// [`peek_back`]: crate::RingDeque::peek_back
/// [`poll_front`]: crate::RingDeque::poll_front
/// [`poll_back`]: crate::RingDeque::poll_back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the deque is empty")]
pub struct EmptyError;

/// The error returned by every [`Cursor`] operation after the deque was
/// structurally modified through anything other than the cursor itself.
///
/// The deque keeps a monotonically increasing generation counter, bumped on
/// every structural modification. Each cursor snapshots the counter when it
/// is created (and re-synchronizes after mutations it performs itself); a
/// mismatch is reported on the very next cursor operation rather than
/// silently yielding stale or shifted elements.
///
/// [`Cursor`]: crate::Cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deque was structurally modified while a cursor was active (cursor generation {expected}, deque generation {found})")]
pub struct CursorInvalidated {
  /// The generation the cursor last synchronized with.
  pub expected: u64,
  /// The deque's generation at the time of the failed cursor operation.
  pub found: u64,
}
