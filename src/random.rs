/// A source of uniformly distributed integers, as required by
/// [`shuffle`](crate::RingDeque::shuffle) and
/// [`random_element`](crate::RingDeque::random_element).
///
/// The deque does not ship a generator of its own; callers inject whatever
/// implementation suits them. The `rand` feature provides [`RandSource`],
/// an adapter for any [`rand::Rng`].
///
/// ## Examples
///
/// ```
/// use ring_deque::{RingDeque, UniformSource};
///
/// // A fixed-sequence source, e.g. for deterministic tests.
/// struct Fixed(u64);
///
/// impl UniformSource for Fixed {
///   fn next_below(&mut self, bound: usize) -> usize {
///     self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
///     ((self.0 >> 33) as usize) % bound
///   }
/// }
///
/// let deque = RingDeque::from([10, 20, 30]);
/// let mut source = Fixed(42);
/// assert!(deque.random_element(&mut source).is_some());
/// ```
pub trait UniformSource {
  /// Returns a uniformly distributed integer in `[0, bound)`.
  ///
  /// The deque never calls this with `bound == 0`.
  fn next_below(&mut self, bound: usize) -> usize;
}

/// Adapts any [`rand::Rng`] into a [`UniformSource`].
///
/// ## Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use ring_deque::{RandSource, RingDeque};
///
/// let mut deque = RingDeque::from([1, 2, 3, 4, 5]);
/// let mut source = RandSource(StdRng::seed_from_u64(7));
/// deque.shuffle(&mut source);
/// assert_eq!(deque.len(), 5);
/// ```
#[cfg(feature = "rand")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
pub struct RandSource<R>(
  /// The wrapped generator.
  pub R,
);

#[cfg(feature = "rand")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
impl<R: rand::Rng> UniformSource for RandSource<R> {
  fn next_below(&mut self, bound: usize) -> usize {
    self.0.gen_range(0..bound)
  }
}
