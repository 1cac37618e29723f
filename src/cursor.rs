use core::mem;

use super::RingDeque;
use crate::errors::CursorInvalidated;

impl<T> RingDeque<T> {
  /// Returns a front-to-back [`Cursor`] positioned before the first element.
  ///
  /// Unlike [`iter`](RingDeque::iter), a cursor borrows nothing: it is a
  /// plain value holding a logical position and a snapshot of the deque's
  /// generation counter, and every cursor operation takes the deque as an
  /// argument. This makes it possible to interleave cursor traversal with
  /// direct mutation of the deque — which is exactly the situation the
  /// generation check guards against. Any structural modification not
  /// performed through the cursor itself makes every subsequent cursor
  /// operation fail with [`CursorInvalidated`].
  ///
  /// Using a cursor with a deque other than the one it was created from is a
  /// logic error; it is detected whenever the generations differ, which is
  /// not guaranteed.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ring_deque::RingDeque;
  ///
  /// let mut deque = RingDeque::from([1, 2, 3]);
  /// let mut cursor = deque.cursor();
  ///
  /// assert_eq!(cursor.next(&deque), Ok(Some(&1)));
  /// assert_eq!(cursor.remove_current(&mut deque), Ok(Some(1)));
  /// assert_eq!(cursor.next(&deque), Ok(Some(&2)));
  ///
  /// // Out-of-band mutation invalidates the cursor.
  /// deque.push_back(4);
  /// assert!(cursor.next(&deque).is_err());
  /// ```
  pub fn cursor(&self) -> Cursor {
    Cursor {
      index: 0,
      last: None,
      generation: self.generation,
      reversed: false,
    }
  }

  /// Returns a back-to-front [`Cursor`] positioned after the last element.
  ///
  /// See [`cursor`](RingDeque::cursor) for the traversal and invalidation
  /// contract.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ring_deque::RingDeque;
  ///
  /// let deque = RingDeque::from([1, 2, 3]);
  /// let mut cursor = deque.cursor_back();
  ///
  /// assert_eq!(cursor.next(&deque), Ok(Some(&3)));
  /// assert_eq!(cursor.next(&deque), Ok(Some(&2)));
  /// ```
  pub fn cursor_back(&self) -> Cursor {
    Cursor {
      index: self.len,
      last: None,
      generation: self.generation,
      reversed: true,
    }
  }
}

/// A detached, mutation-aware cursor over a [`RingDeque`].
///
/// Created by [`RingDeque::cursor`] (front-to-back) or
/// [`RingDeque::cursor_back`] (back-to-front). Cursors are cheap plain
/// values; any number of them may exist for the same deque at once, and
/// dropping one has no effect on the deque.
///
/// Every operation first compares the cursor's generation snapshot with the
/// deque's current generation, failing fast with [`CursorInvalidated`] if
/// the deque was structurally modified through anything other than this
/// cursor.
#[derive(Debug, Clone)]
pub struct Cursor {
  /// Logical index of the next element to yield (front-to-back), or one past
  /// it (back-to-front).
  index: usize,
  /// Logical index of the most recently yielded element, cleared once it is
  /// removed through the cursor.
  last: Option<usize>,
  generation: u64,
  reversed: bool,
}

impl Cursor {
  /// Yields a reference to the next element in the cursor's direction, or
  /// `Ok(None)` once the traversal is exhausted.
  pub fn next<'a, T>(&mut self, deque: &'a RingDeque<T>) -> Result<Option<&'a T>, CursorInvalidated> {
    self.check(deque)?;
    if self.reversed {
      if self.index == 0 {
        return Ok(None);
      }
      self.index -= 1;
      self.last = Some(self.index);
      Ok(deque.get(self.index))
    } else {
      if self.index >= deque.len() {
        return Ok(None);
      }
      let item = deque.get(self.index);
      self.last = Some(self.index);
      self.index += 1;
      Ok(item)
    }
  }

  /// Removes and returns the element most recently yielded by
  /// [`next`](Cursor::next), re-synchronizing the cursor with the deque so
  /// that traversal continues where it left off.
  ///
  /// Returns `Ok(None)` if nothing has been yielded yet, or if the current
  /// element was already removed.
  pub fn remove_current<T>(
    &mut self,
    deque: &mut RingDeque<T>,
  ) -> Result<Option<T>, CursorInvalidated> {
    self.check(deque)?;
    let last = match self.last.take() {
      Some(last) => last,
      None => return Ok(None),
    };
    let removed = deque.remove(last);
    if !self.reversed {
      // The element that followed the removed one slid into its slot.
      self.index -= 1;
    }
    self.generation = deque.generation;
    Ok(removed)
  }

  /// Replaces the element most recently yielded by [`next`](Cursor::next),
  /// returning the previous value.
  ///
  /// Replacement is not a structural modification: neither this cursor nor
  /// any other is invalidated by it.
  ///
  /// Returns `Ok(None)` if nothing has been yielded yet, or if the current
  /// element was removed.
  pub fn replace_current<T>(
    &mut self,
    deque: &mut RingDeque<T>,
    value: T,
  ) -> Result<Option<T>, CursorInvalidated> {
    self.check(deque)?;
    let last = match self.last {
      Some(last) => last,
      None => return Ok(None),
    };
    Ok(deque.get_mut(last).map(|slot| mem::replace(slot, value)))
  }

  fn check<T>(&self, deque: &RingDeque<T>) -> Result<(), CursorInvalidated> {
    if self.generation == deque.generation {
      Ok(())
    } else {
      Err(CursorInvalidated {
        expected: self.generation,
        found: deque.generation,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::RingDeque;

  #[test]
  fn forward_cursor_yields_in_order() {
    let deque = RingDeque::from([1, 2, 3]);
    let mut cursor = deque.cursor();
    assert_eq!(cursor.next(&deque), Ok(Some(&1)));
    assert_eq!(cursor.next(&deque), Ok(Some(&2)));
    assert_eq!(cursor.next(&deque), Ok(Some(&3)));
    assert_eq!(cursor.next(&deque), Ok(None));
    assert_eq!(cursor.next(&deque), Ok(None));
  }

  #[test]
  fn reverse_cursor_yields_in_reverse_order() {
    let deque = RingDeque::from([1, 2, 3]);
    let mut cursor = deque.cursor_back();
    assert_eq!(cursor.next(&deque), Ok(Some(&3)));
    assert_eq!(cursor.next(&deque), Ok(Some(&2)));
    assert_eq!(cursor.next(&deque), Ok(Some(&1)));
    assert_eq!(cursor.next(&deque), Ok(None));
  }

  #[test]
  fn remove_current_removes_exactly_last_yielded() {
    let mut deque = RingDeque::from([1, 2, 3, 4]);
    let mut cursor = deque.cursor();
    cursor.next(&deque).unwrap();
    cursor.next(&deque).unwrap();
    assert_eq!(cursor.remove_current(&mut deque), Ok(Some(2)));
    // Traversal continues with the element that followed the removed one.
    assert_eq!(cursor.next(&deque), Ok(Some(&3)));
    assert_eq!(cursor.next(&deque), Ok(Some(&4)));
    assert_eq!(deque, [1, 3, 4]);

    // A second removal without an intervening `next` is a no-op.
    let mut cursor = deque.cursor();
    cursor.next(&deque).unwrap();
    assert_eq!(cursor.remove_current(&mut deque), Ok(Some(1)));
    assert_eq!(cursor.remove_current(&mut deque), Ok(None));
  }

  #[test]
  fn remove_current_on_reverse_cursor() {
    let mut deque = RingDeque::from([1, 2, 3, 4]);
    let mut cursor = deque.cursor_back();
    cursor.next(&deque).unwrap();
    cursor.next(&deque).unwrap();
    assert_eq!(cursor.remove_current(&mut deque), Ok(Some(3)));
    assert_eq!(cursor.next(&deque), Ok(Some(&2)));
    assert_eq!(cursor.next(&deque), Ok(Some(&1)));
    assert_eq!(cursor.next(&deque), Ok(None));
    assert_eq!(deque, [1, 2, 4]);
  }

  #[test]
  fn replace_current_does_not_invalidate() {
    let mut deque = RingDeque::from([1, 2, 3]);
    let mut cursor = deque.cursor();
    cursor.next(&deque).unwrap();
    assert_eq!(cursor.replace_current(&mut deque, 10), Ok(Some(1)));
    assert_eq!(cursor.next(&deque), Ok(Some(&2)));
    assert_eq!(deque, [10, 2, 3]);

    // Another cursor created before the replacement is also still valid.
    let mut other = deque.cursor();
    assert_eq!(cursor.replace_current(&mut deque, 20), Ok(Some(2)));
    assert_eq!(other.next(&deque), Ok(Some(&10)));
  }

  #[test]
  fn out_of_band_mutation_invalidates() {
    let mut deque = RingDeque::from([1, 2, 3]);
    let mut cursor = deque.cursor();
    assert_eq!(cursor.next(&deque), Ok(Some(&1)));

    deque.push_back(4);
    let err = cursor.next(&deque).unwrap_err();
    assert_eq!(err.found, err.expected + 1);
    // The failure is sticky: the cursor stays invalid.
    assert!(cursor.next(&deque).is_err());
    assert!(cursor.remove_current(&mut deque).is_err());
    assert!(cursor.replace_current(&mut deque, 9).is_err());
  }

  #[test]
  fn cursor_removal_does_not_invalidate_itself_but_invalidates_others() {
    let mut deque = RingDeque::from([1, 2, 3]);
    let mut a = deque.cursor();
    let mut b = deque.cursor();
    a.next(&deque).unwrap();
    b.next(&deque).unwrap();

    assert_eq!(a.remove_current(&mut deque), Ok(Some(1)));
    assert_eq!(a.next(&deque), Ok(Some(&2)));
    assert!(b.next(&deque).is_err());
  }

  #[test]
  fn replace_before_first_next_is_noop() {
    let mut deque = RingDeque::from([1]);
    let mut cursor = deque.cursor();
    assert_eq!(cursor.replace_current(&mut deque, 5), Ok(None));
    assert_eq!(cursor.remove_current(&mut deque), Ok(None));
    assert_eq!(deque, [1]);
  }
}
