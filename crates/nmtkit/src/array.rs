//! # Array and Selection Utilities
//!
//! Heap-based sorting and k-best selection with caller-supplied comparators.
//!
//! The heap discipline is fixed so that tie-breaks among equal elements are
//! a deterministic function of the heap shape; callers relying on a
//! particular order between equal elements get the same answer every run.

use crate::{NmtError, NmtResult, random::Random};

/// Shuffle `items` in place (Fisher-Yates).
///
/// Iterates `i` upward from `0` to `n - 2`, drawing `j` from ``[i, n)``
/// and swapping when `j != i`; the draw sequence is part of the contract.
pub fn shuffle<T>(
    items: &mut [T],
    rng: &mut Random,
) {
    let n = items.len();
    if n < 2 {
        return;
    }
    for i in 0..n - 1 {
        let j = rng.uniform_index(i, n);
        if j != i {
            items.swap(i, j);
        }
    }
}

/// Restore the max-heap property below `root`, for a heap over ``[0, end)``.
///
/// `above(a, b)` is true when `a` must sit above `b` in the heap.
fn sift_down<F>(
    mut root: usize,
    end: usize,
    above: &mut F,
    swap: &mut impl FnMut(usize, usize),
) where
    F: FnMut(usize, usize) -> bool,
{
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return;
        }
        if child + 1 < end && above(child + 1, child) {
            child += 1;
        }
        if !above(child, root) {
            return;
        }
        swap(root, child);
        root = child;
    }
}

/// Sort `items` ascending by `less`, using heap sort.
///
/// Builds a max-heap by `less`, then repeatedly moves the root to the end
/// of the shrinking heap.
pub fn sort<T, F>(
    items: &mut [T],
    mut less: F,
) where
    F: FnMut(&T, &T) -> bool,
{
    let n = items.len();
    if n < 2 {
        return;
    }

    // The sift closures both need `items`; share it through one RefCell.
    let cell = core::cell::RefCell::new(items);
    let mut above = |a: usize, b: usize| {
        let items = cell.borrow();
        less(&items[b], &items[a])
    };
    let mut swap = |a: usize, b: usize| cell.borrow_mut().swap(a, b);

    for start in (0..n / 2).rev() {
        sift_down(start, n, &mut above, &mut swap);
    }
    for end in (1..n).rev() {
        swap(0, end);
        sift_down(0, end, &mut above, &mut swap);
    }
}

/// Return the index of the greatest element by `greater`.
///
/// `greater` must be a strict ordering; the first of several equal maxima wins.
pub fn argmax<T, F>(
    items: &[T],
    mut greater: F,
) -> NmtResult<usize>
where
    F: FnMut(&T, &T) -> bool,
{
    if items.is_empty() {
        return Err(NmtError::invariant("argmax over an empty sequence"));
    }
    let mut best = 0;
    for i in 1..items.len() {
        if greater(&items[i], &items[best]) {
            best = i;
        }
    }
    Ok(best)
}

/// Return the indices of the `k` greatest elements by `greater`, best first.
///
/// This is a partial heap sort over an index array: build a heap, then
/// perform exactly `k` extract-max steps. Equal elements come out in
/// heap-shape order, which need not match a stable sort.
///
/// ## Errors
/// [`NmtError::InvariantViolation`] if `k > items.len()`.
pub fn kbest<T, F>(
    items: &[T],
    k: usize,
    mut greater: F,
) -> NmtResult<Vec<usize>>
where
    F: FnMut(&T, &T) -> bool,
{
    let n = items.len();
    if k > n {
        return Err(NmtError::invariant(format!(
            "kbest: requested {k} results from {n} elements"
        )));
    }

    let cell = core::cell::RefCell::new((0..n).collect::<Vec<usize>>());
    let mut above = |a: usize, b: usize| {
        let ids = cell.borrow();
        greater(&items[ids[a]], &items[ids[b]])
    };
    let mut swap = |a: usize, b: usize| cell.borrow_mut().swap(a, b);

    for start in (0..n / 2).rev() {
        sift_down(start, n, &mut above, &mut swap);
    }

    let mut results = Vec::with_capacity(k);
    let mut end = n;
    for _ in 0..k {
        end -= 1;
        swap(0, end);
        results.push(cell.borrow()[end]);
        sift_down(0, end, &mut above, &mut swap);
    }
    Ok(results)
}
