//! Lazy iterator combinators over an explicit-state protocol
//!
//! An iterator value is immutable: progress lives in a `State` token that the
//! caller threads through successive `next` calls. Adaptors embed their
//! child's state in their own, so chains stay statically typed and
//! allocation-free.
//!
//! ```
//! use lazytrace::iter::{self, Iterate};
//!
//! let evens = iter::filter(|x: &i64| x % 2 == 0, iter::span(1, 11));
//! let squares = iter::map(|x| x * x, evens);
//! assert_eq!(squares.walk().collect::<Vec<_>>(), vec![4, 16, 36, 64, 100]);
//! ```

mod accumulate;
mod derived;
mod enumerate;
mod error;
mod flatten;
mod map;
mod partition;
mod product;
mod repeat;
mod reverse;
mod size;
mod slice;
mod source;
mod stateful;
mod zip;

pub use accumulate::{accumulate, accumulate_from, Accumulate, AccumulateState};
pub use derived::{first, last, length, nth, only, peel};
pub use enumerate::{enumerate, pairs, Enumerate, Pairs};
pub use error::IterError;
pub use flatten::{flatmap, flatten, Flatten, FlattenState};
pub use map::{filter, map, map_n, Filter, Map};
pub use partition::{partition, Partition, PartitionState, SeqChunks};
pub use product::{product, Product, ProductSources, ProductState};
pub use repeat::{count, cycle, cycle_n, repeated, repeated_n, Count, Cycle, CycleState, Repeated};
pub use reverse::{reverse, Reverse};
pub use size::{
    drop_size, flatten_size, partition_size, product_size, take_size, zip_size, ElementType,
    SizeCategory,
};
pub use slice::{
    drop, drop_while, take, take_while, Drop, DropState, DropWhile, DropWhileState, Take,
    TakeWhile,
};
pub use source::{seq, span, Seq, Span};
pub use stateful::{rest, Rest, Stateful};
pub use zip::{zip, Zip, ZipReversible, ZipSources};

pub(crate) use error::checked_count;

/// The iteration protocol.
///
/// `next(state)` returns the next element together with the state that
/// resumes after it, or `None` once exhausted. Re-calling `next` with a state
/// that already produced `None` must produce `None` again.
pub trait Iterate {
    /// Element type.
    type Item;
    /// Progress token threaded through `next`.
    type State: Clone;

    /// State for the first call.
    fn start(&self) -> Self::State;

    /// Advance from `state`.
    fn next(&self, state: Self::State) -> Option<(Self::Item, Self::State)>;

    /// Static size category.
    fn size(&self) -> SizeCategory {
        SizeCategory::Unknown
    }

    /// Static element-type category.
    fn element_type(&self) -> ElementType {
        ElementType::Unknown
    }

    /// Three-valued exhaustion check: `Some(true)` / `Some(false)` when it can
    /// be answered without advancing, `None` when only `next` can tell.
    fn is_done(&self, _state: &Self::State) -> Option<bool> {
        None
    }

    /// Length every value of this type has, if the type alone fixes it.
    fn fixed_len() -> Option<usize>
    where
        Self: Sized,
    {
        None
    }

    /// The single value every element equals, for constant sequences.
    fn constant_item(&self) -> Option<Self::Item> {
        None
    }

    /// Number of elements; fails unless the size category is finite.
    fn length(&self) -> Result<usize, IterError> {
        self.size().length()
    }

    /// The `n`-th element, 1-based.
    fn nth(&self, n: usize) -> Result<Self::Item, IterError> {
        nth_by_stepping(self, n)
    }

    /// The last element, or `None` when empty.
    fn last_value(&self) -> Result<Option<Self::Item>, IterError> {
        last_by_stepping(self)
    }

    /// Borrowing bridge to `std::iter::Iterator`.
    fn walk(&self) -> Walk<'_, Self>
    where
        Self: Sized,
    {
        Walk {
            iter: self,
            state: Some(self.start()),
        }
    }
}

/// Iterators that define an independent backwards traversal.
pub trait Reversible: Iterate {
    /// Progress token for the backwards traversal.
    type RevState: Clone;

    /// Run-time part of the capability check (length agreement and the like).
    fn check_reversible(&self) -> Result<(), IterError> {
        Ok(())
    }

    /// State for the first backwards call.
    fn rev_start(&self) -> Self::RevState;

    /// Advance backwards from `state`.
    fn rev_next(&self, state: Self::RevState) -> Option<(Self::Item, Self::RevState)>;
}

/// Random access by 0-based index.
pub trait Indexed: Iterate {
    /// Element at `index`, if in range.
    fn get(&self, index: usize) -> Option<Self::Item>;

    /// Number of valid indices.
    fn index_len(&self) -> usize;
}

impl<T: Iterate + ?Sized> Iterate for &T {
    type Item = T::Item;
    type State = T::State;

    fn start(&self) -> T::State {
        (**self).start()
    }

    fn next(&self, state: T::State) -> Option<(T::Item, T::State)> {
        (**self).next(state)
    }

    fn size(&self) -> SizeCategory {
        (**self).size()
    }

    fn element_type(&self) -> ElementType {
        (**self).element_type()
    }

    fn is_done(&self, state: &T::State) -> Option<bool> {
        (**self).is_done(state)
    }

    fn constant_item(&self) -> Option<T::Item> {
        (**self).constant_item()
    }

    fn length(&self) -> Result<usize, IterError> {
        (**self).length()
    }

    fn nth(&self, n: usize) -> Result<T::Item, IterError> {
        (**self).nth(n)
    }

    fn last_value(&self) -> Result<Option<T::Item>, IterError> {
        (**self).last_value()
    }
}

impl<T: Reversible + ?Sized> Reversible for &T {
    type RevState = T::RevState;

    fn check_reversible(&self) -> Result<(), IterError> {
        (**self).check_reversible()
    }

    fn rev_start(&self) -> T::RevState {
        (**self).rev_start()
    }

    fn rev_next(&self, state: T::RevState) -> Option<(T::Item, T::RevState)> {
        (**self).rev_next(state)
    }
}

/// `std::iter::Iterator` view over an [`Iterate`] value.
pub struct Walk<'a, I: Iterate> {
    iter: &'a I,
    state: Option<I::State>,
}

impl<I: Iterate> std::fmt::Debug for Walk<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("exhausted", &self.state.is_none())
            .finish_non_exhaustive()
    }
}

impl<I: Iterate> Iterator for Walk<'_, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.state.take()?;
        let (value, next_state) = self.iter.next(state)?;
        self.state = Some(next_state);
        Some(value)
    }
}

/// Linear `nth`: advance `n - 1` times and take the next element.
pub(crate) fn nth_by_stepping<I: Iterate + ?Sized>(
    it: &I,
    n: usize,
) -> Result<I::Item, IterError> {
    if n == 0 {
        return Err(IterError::out_of_bounds("index 0 (indices start at 1)"));
    }
    let mut state = it.start();
    let mut seen = 0usize;
    while let Some((value, next_state)) = it.next(state) {
        seen += 1;
        if seen == n {
            return Ok(value);
        }
        state = next_state;
    }
    Err(IterError::out_of_bounds(format!(
        "index {} beyond the end ({} elements)",
        n, seen
    )))
}

/// Linear `last`: walk to the end, refusing infinite iterators.
pub(crate) fn last_by_stepping<I: Iterate + ?Sized>(it: &I) -> Result<Option<I::Item>, IterError> {
    if it.size() == SizeCategory::Infinite {
        return Err(IterError::UndefinedLength(
            "cannot take the last element of an infinite iterator".to_string(),
        ));
    }
    let mut state = it.start();
    let mut last = None;
    while let Some((value, next_state)) = it.next(state) {
        last = Some(value);
        state = next_state;
    }
    Ok(last)
}

/// Shared 1-based range check for random-access `nth`.
pub(crate) fn nth_index(n: usize, len: usize) -> Result<usize, IterError> {
    if n == 0 {
        return Err(IterError::out_of_bounds("index 0 (indices start at 1)"));
    }
    if n > len {
        return Err(IterError::out_of_bounds(format!(
            "index {} beyond the end ({} elements)",
            n, len
        )));
    }
    Ok(n - 1)
}
