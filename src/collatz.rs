//! The Collatz recurrence and the [`StepCounter`] seam the caches call into.
//!
//! [`StepCounter`]: trait.StepCounter.html

/// Returns the number of iterations of `n -> n / 2` (even) or `n -> 3n + 1` (odd)
/// needed to reach `1`. `steps(1)` is `0`.
///
/// # Panics
///
/// Panics if `n` is `0`, or if `3n + 1` overflows a `u64` along the way.
/// Use [`checked_steps`] to get `None` instead.
///
/// # Example
///
/// ```rust
/// use collatz_arc::collatz;
///
/// assert_eq!(collatz::steps(1), 0);
/// assert_eq!(collatz::steps(6), 8);
/// assert_eq!(collatz::steps(27), 111);
/// ```
///
/// [`checked_steps`]: fn.checked_steps.html
pub fn steps(n: u64) -> u64 {
    assert!(n > 0, "collatz steps are undefined for 0");
    match checked_steps(n) {
        Some(steps) => steps,
        None => panic!("collatz trajectory of {} overflows u64", n),
    }
}

/// Like [`steps`], but returns `None` for `0` or when the trajectory overflows a `u64`.
///
/// # Example
///
/// ```rust
/// use collatz_arc::collatz;
///
/// assert_eq!(collatz::checked_steps(27), Some(111));
/// assert_eq!(collatz::checked_steps(0), None);
/// ```
///
/// [`steps`]: fn.steps.html
pub fn checked_steps(mut n: u64) -> Option<u64> {
    if n == 0 {
        return None;
    }

    let mut steps = 0u64;
    while n != 1 {
        n = if n % 2 == 0 {
            n / 2
        } else {
            n.checked_mul(3)?.checked_add(1)?
        };
        steps += 1;
    }
    Some(steps)
}

/// `StepCounter` computes the step count of a key on a cache miss.
///
/// The caches in this crate never compute step counts themselves, they always
/// go through a `StepCounter`. [`Collatz`] is the default one; any
/// `FnMut(u64) -> u64` closure works too, which is handy for counting or
/// stubbing calls.
///
/// # Example
///
/// ```rust
/// use collatz_arc::AdaptiveCache;
///
/// let mut calls = 0;
/// let mut cache = AdaptiveCache::with_step_counter(4, |n: u64| {
///     calls += 1;
///     collatz_arc::collatz::steps(n)
/// });
///
/// assert_eq!(cache.lookup(6), 8);
/// assert_eq!(cache.lookup(6), 8);
/// drop(cache);
/// assert_eq!(calls, 1);
/// ```
///
/// [`Collatz`]: struct.Collatz.html
pub trait StepCounter {
    /// Returns the step count of `n`.
    fn steps(&mut self, n: u64) -> u64;

    /// Returns the step count of `n`, or `None` if `n` has none.
    ///
    /// The default implementation never fails.
    #[inline]
    fn checked_steps(&mut self, n: u64) -> Option<u64> {
        Some(self.steps(n))
    }
}

/// `Collatz` is the default [`StepCounter`], backed by [`steps`].
///
/// [`StepCounter`]: trait.StepCounter.html
/// [`steps`]: fn.steps.html
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Collatz;

impl StepCounter for Collatz {
    #[inline]
    fn steps(&mut self, n: u64) -> u64 {
        steps(n)
    }

    #[inline]
    fn checked_steps(&mut self, n: u64) -> Option<u64> {
        checked_steps(n)
    }
}

impl<F: FnMut(u64) -> u64> StepCounter for F {
    #[inline]
    fn steps(&mut self, n: u64) -> u64 {
        self(n)
    }
}
