//! Sorted dynamic array used for liker sets.
//!
//! `OrderedSet` keeps its elements in strictly ascending order under a
//! caller-supplied 3-way comparator and answers membership with a binary
//! search. Positional operations (`insert`, `remove`, `remove_range`,
//! `truncate`) are available for callers that already know where an element
//! belongs; they panic on out-of-range indices.
//!
//! The comparator must stay the same for the lifetime of an instance.
//! Switching comparators breaks the ordering every search relies on.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Deserializer, Serialize};

/// Ascending, duplicate-free sequence with O(log n) membership queries.
///
/// Serializes as a plain sequence. Deserializing sorts and deduplicates, so
/// input from elsewhere cannot break the ordering.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderedSet<T> {
    elems: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self { elems: Vec::new() }
    }
}

impl<T> OrderedSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elems: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elems
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elems.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elems.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.elems.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.elems.last()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elems
    }

    /// Binary search for `value` using a 3-way comparator.
    ///
    /// `cmp(element, value)` must report how a stored element orders against
    /// the probe. Returns `Ok(index)` of an equal element, or `Err(index)`
    /// with the insertion point: the smallest index whose predecessors all
    /// compare less than `value`. An empty set yields `Err(0)`.
    pub fn bi_search_by<F>(&self, value: &T, mut cmp: F) -> Result<usize, usize>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let (mut start, mut end) = (0, self.elems.len());
        while start < end {
            let mid = start + (end - start) / 2;
            match cmp(&self.elems[mid], value) {
                Ordering::Equal => return Ok(mid),
                Ordering::Greater => end = mid,
                Ordering::Less => start = mid + 1,
            }
        }
        Err(start)
    }

    /// Inserts `value` at its sorted position and returns that index.
    ///
    /// Does not check for duplicates: inserting a value already present
    /// places a second equal element next to it. Check with
    /// [`bi_search_by`](Self::bi_search_by) first when that matters.
    pub fn bi_insert_by<F>(&mut self, value: T, cmp: F) -> usize
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let index = match self.bi_search_by(&value, cmp) {
            Ok(i) | Err(i) => i,
        };
        self.elems.insert(index, value);
        index
    }

    /// Inserts `value` at `index`, shifting later elements right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        self.elems.insert(index, value);
    }

    /// Inserts all of `values` starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_slice(&mut self, index: usize, values: &[T])
    where
        T: Clone,
    {
        self.elems.splice(index..index, values.iter().cloned());
    }

    /// Removes and returns the element at `index`, shifting later elements
    /// left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        self.elems.remove(index)
    }

    /// Removes elements in `start..end` with a single shift.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > len`.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        self.elems.drain(start..end);
    }

    /// Shrinks to `len` elements, dropping everything past it so no stale
    /// values stay reachable. No-op when `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        self.elems.truncate(len);
    }

    /// Appends `values` at the end. The caller keeps them ascending or calls
    /// [`sort_by`](Self::sort_by) afterwards.
    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.elems.extend(values);
    }

    /// Removes the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.elems.pop()
    }

    /// Removes the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.elems.is_empty() {
            None
        } else {
            Some(self.elems.remove(0))
        }
    }

    /// Equivalent to `truncate(0)`.
    pub fn clear(&mut self) {
        self.elems.clear();
    }

    /// Reverses the element order in place.
    ///
    /// The set is then ordered by the reversed comparator: later searches
    /// must go through [`bi_search_by`](Self::bi_search_by) with that
    /// comparator, not [`bi_search`](Self::bi_search) or `contains`.
    pub fn reverse(&mut self) {
        self.elems.reverse();
    }

    /// Returns the first element matching `predicate` with its index.
    pub fn find<P>(&self, mut predicate: P) -> Option<(usize, &T)>
    where
        P: FnMut(&T) -> bool,
    {
        self.elems.iter().enumerate().find(|(_, e)| predicate(e))
    }

    /// Keeps only the elements matching `predicate`, preserving their order.
    pub fn filter<P>(&mut self, mut predicate: P)
    where
        P: FnMut(&T) -> bool,
    {
        self.elems.retain(|e| predicate(e));
    }

    /// In-place quicksort using `less` as the strict ordering.
    ///
    /// Iterative Lomuto partitioning over an explicit range stack: the last
    /// element of each range is the pivot, and the smaller side is always
    /// processed first so the stack stays logarithmic in `len`. Not stable.
    pub fn sort_by<F>(&mut self, mut less: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let len = self.elems.len();
        if len < 2 {
            return;
        }

        let mut ranges: Vec<(usize, usize)> = vec![(0, len - 1)];
        while let Some((low, high)) = ranges.pop() {
            let mut store = low;
            for j in low..high {
                if less(&self.elems[j], &self.elems[high]) {
                    self.elems.swap(store, j);
                    store += 1;
                }
            }
            self.elems.swap(store, high);

            let left = (store > low + 1).then(|| (low, store - 1));
            let right = (store + 1 < high).then(|| (store + 1, high));
            match (left, right) {
                (Some(l), Some(r)) => {
                    if l.1 - l.0 < r.1 - r.0 {
                        ranges.push(r);
                        ranges.push(l);
                    } else {
                        ranges.push(l);
                        ranges.push(r);
                    }
                }
                (Some(side), None) | (None, Some(side)) => ranges.push(side),
                (None, None) => {}
            }
        }
    }

    /// Whether every adjacent pair compares `Less` under `cmp`.
    pub fn is_sorted_by<F>(&self, mut cmp: F) -> bool
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.elems
            .windows(2)
            .all(|w| cmp(&w[0], &w[1]) == Ordering::Less)
    }
}

impl<T: Ord> OrderedSet<T> {
    /// Builds a set from arbitrary values, sorting and dropping duplicates.
    #[must_use]
    pub fn from_unsorted(values: Vec<T>) -> Self {
        let mut set = Self { elems: values };
        set.sort();
        set.elems.dedup();
        set
    }

    /// [`bi_search_by`](Self::bi_search_by) with the natural ordering.
    pub fn bi_search(&self, value: &T) -> Result<usize, usize> {
        self.bi_search_by(value, Ord::cmp)
    }

    /// [`bi_insert_by`](Self::bi_insert_by) with the natural ordering.
    pub fn bi_insert(&mut self, value: T) -> usize {
        self.bi_insert_by(value, Ord::cmp)
    }

    /// [`sort_by`](Self::sort_by) with the natural ordering.
    pub fn sort(&mut self) {
        self.sort_by(|a, b| a < b);
    }

    pub fn contains(&self, value: &T) -> bool {
        self.bi_search(value).is_ok()
    }

    pub fn is_sorted(&self) -> bool {
        self.is_sorted_by(Ord::cmp)
    }
}

impl<T> Index<usize> for OrderedSet<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.elems[index]
    }
}

impl<T: Ord> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

impl<'de, T: Ord + Deserialize<'de>> Deserialize<'de> for OrderedSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from_unsorted)
    }
}

impl<T> From<OrderedSet<T>> for Vec<T> {
    fn from(set: OrderedSet<T>) -> Self {
        set.elems
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.elems.iter()).finish()
    }
}
