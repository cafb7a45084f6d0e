//! Prefix/suffix selection: take, drop, take-while, drop-while

use std::fmt;

use super::{
    checked_count, drop_size, last_by_stepping, take_size, ElementType, IterError, Iterate,
    Reversible, SizeCategory,
};

/// At most `n` elements of the source.
#[derive(Debug, Clone)]
pub struct Take<I> {
    inner: I,
    n: usize,
}

/// First `n` elements of `it`; negative `n` is rejected.
pub fn take<I: Iterate>(it: I, n: isize) -> Result<Take<I>, IterError> {
    let n = checked_count("take", n)?;
    Ok(Take { inner: it, n })
}

impl<I> Take<I> {
    /// Upper bound on produced elements.
    pub fn limit(&self) -> usize {
        self.n
    }

    /// `take(take(it, n), k)` collapses to `take(it, min(n, k))`.
    pub fn take(self, k: isize) -> Result<Take<I>, IterError> {
        let k = checked_count("take", k)?;
        Ok(Take {
            inner: self.inner,
            n: self.n.min(k),
        })
    }

    /// `drop(take(it, n), k)` becomes `take(drop(it, k), n - k)` instead of
    /// wrapping twice.
    pub fn drop(self, k: isize) -> Result<Take<Drop<I>>, IterError> {
        let k = checked_count("drop", k)?;
        Ok(Take {
            n: self.n.saturating_sub(k),
            inner: Drop {
                inner: self.inner,
                n: k,
            },
        })
    }
}

impl<I: Iterate> Iterate for Take<I> {
    type Item = I::Item;
    type State = (usize, I::State);

    fn start(&self) -> Self::State {
        (self.n, self.inner.start())
    }

    fn next(&self, (remaining, state): Self::State) -> Option<(I::Item, Self::State)> {
        if remaining == 0 {
            return None;
        }
        let (value, state) = self.inner.next(state)?;
        Some((value, (remaining - 1, state)))
    }

    fn size(&self) -> SizeCategory {
        take_size(&self.inner.size(), self.n)
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn is_done(&self, (remaining, state): &Self::State) -> Option<bool> {
        if *remaining == 0 {
            Some(true)
        } else {
            self.inner.is_done(state)
        }
    }

    fn constant_item(&self) -> Option<I::Item> {
        if self.n == 0 {
            None
        } else {
            self.inner.constant_item()
        }
    }

    fn nth(&self, n: usize) -> Result<I::Item, IterError> {
        if n > self.n {
            return Err(IterError::out_of_bounds(format!(
                "index {} beyond take limit {}",
                n, self.n
            )));
        }
        self.inner.nth(n)
    }

    fn last_value(&self) -> Result<Option<I::Item>, IterError> {
        if self.n == 0 {
            return Ok(None);
        }
        match self.inner.constant_item() {
            Some(value) => Ok(Some(value)),
            None => last_by_stepping(self),
        }
    }
}

impl<I: Reversible> Reversible for Take<I> {
    type RevState = (usize, I::RevState);

    /// Needs the source length to know how much of the tail to skip, except
    /// for constant sources where every element is the same.
    fn check_reversible(&self) -> Result<(), IterError> {
        self.inner.check_reversible()?;
        if self.inner.constant_item().is_some() {
            return Ok(());
        }
        self.inner.length().map(|_| ()).map_err(|_| {
            IterError::UnsupportedReverse(format!(
                "take over an iterator of size {}",
                self.inner.size()
            ))
        })
    }

    fn rev_start(&self) -> Self::RevState {
        let mut state = self.inner.rev_start();
        if self.inner.constant_item().is_some() {
            return (self.n, state);
        }
        let len = self.inner.length().unwrap_or(0);
        for _ in 0..len.saturating_sub(self.n) {
            match self.inner.rev_next(state.clone()) {
                Some((_, next)) => state = next,
                None => return (0, state),
            }
        }
        (len.min(self.n), state)
    }

    fn rev_next(&self, (remaining, state): Self::RevState) -> Option<(I::Item, Self::RevState)> {
        if remaining == 0 {
            return None;
        }
        let (value, state) = self.inner.rev_next(state)?;
        Some((value, (remaining - 1, state)))
    }
}

/// Everything after the first `n` elements.
///
/// Construction is O(1); the skip is paid on the first `next` call.
#[derive(Debug, Clone)]
pub struct Drop<I> {
    inner: I,
    n: usize,
}

/// Drop state: the skip is still owed, or has been paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropState<S> {
    /// Skip not yet performed.
    Pending(S),
    /// Positioned inside the kept suffix.
    Ready(S),
}

/// All but the first `n` elements of `it`; negative `n` is rejected.
///
/// Over a [`Take`], prefer [`Take::drop`], which rewrites the pair into
/// `take(drop(it, k), n - k)` instead of nesting a `Drop` around the `Take`.
pub fn drop<I: Iterate>(it: I, n: isize) -> Result<Drop<I>, IterError> {
    let n = checked_count("drop", n)?;
    Ok(Drop { inner: it, n })
}

impl<I: Iterate> Iterate for Drop<I> {
    type Item = I::Item;
    type State = DropState<I::State>;

    fn start(&self) -> Self::State {
        DropState::Pending(self.inner.start())
    }

    fn next(&self, state: Self::State) -> Option<(I::Item, Self::State)> {
        let state = match state {
            DropState::Ready(state) => state,
            DropState::Pending(mut state) => {
                for _ in 0..self.n {
                    let (_, next) = self.inner.next(state)?;
                    state = next;
                }
                state
            }
        };
        let (value, state) = self.inner.next(state)?;
        Some((value, DropState::Ready(state)))
    }

    fn size(&self) -> SizeCategory {
        drop_size(&self.inner.size(), self.n)
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn is_done(&self, state: &Self::State) -> Option<bool> {
        match state {
            DropState::Ready(state) => self.inner.is_done(state),
            DropState::Pending(state) => match self.inner.is_done(state) {
                Some(true) => Some(true),
                _ if self.n == 0 => self.inner.is_done(state),
                _ => None,
            },
        }
    }

    /// Only while something survives the skip.
    fn constant_item(&self) -> Option<I::Item> {
        let survives = match self.inner.size() {
            SizeCategory::Infinite => true,
            SizeCategory::Unknown => self.n == 0,
            finite => finite.length().map_or(false, |len| len > self.n),
        };
        if survives {
            self.inner.constant_item()
        } else {
            None
        }
    }

    fn nth(&self, n: usize) -> Result<I::Item, IterError> {
        if n == 0 {
            return Err(IterError::out_of_bounds("index 0 (indices start at 1)"));
        }
        let shifted = n
            .checked_add(self.n)
            .ok_or_else(|| IterError::ArithmeticOverflow("shifted index".to_string()))?;
        self.inner.nth(shifted)
    }
}

impl<I: Reversible> Reversible for Drop<I> {
    type RevState = (usize, I::RevState);

    fn check_reversible(&self) -> Result<(), IterError> {
        self.inner.check_reversible()?;
        self.inner.length().map(|_| ()).map_err(|_| {
            IterError::UnsupportedReverse(format!(
                "drop over an iterator of size {}",
                self.inner.size()
            ))
        })
    }

    fn rev_start(&self) -> Self::RevState {
        let len = self.inner.length().unwrap_or(0);
        (len.saturating_sub(self.n), self.inner.rev_start())
    }

    fn rev_next(&self, (remaining, state): Self::RevState) -> Option<(I::Item, Self::RevState)> {
        if remaining == 0 {
            return None;
        }
        let (value, state) = self.inner.rev_next(state)?;
        Some((value, (remaining - 1, state)))
    }
}

/// Elements while the predicate holds; the first failure ends the sequence.
#[derive(Clone)]
pub struct TakeWhile<I, P> {
    inner: I,
    predicate: P,
}

impl<I: fmt::Debug, P> fmt::Debug for TakeWhile<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TakeWhile")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Longest prefix of `it` satisfying `predicate`.
pub fn take_while<I, P>(predicate: P, it: I) -> TakeWhile<I, P>
where
    I: Iterate,
    P: Fn(&I::Item) -> bool,
{
    TakeWhile {
        inner: it,
        predicate,
    }
}

impl<I, P> Iterate for TakeWhile<I, P>
where
    I: Iterate,
    P: Fn(&I::Item) -> bool,
{
    type Item = I::Item;
    type State = I::State;

    fn start(&self) -> I::State {
        self.inner.start()
    }

    fn next(&self, state: I::State) -> Option<(I::Item, I::State)> {
        let (value, state) = self.inner.next(state)?;
        (self.predicate)(&value).then_some((value, state))
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn is_done(&self, state: &I::State) -> Option<bool> {
        match self.inner.is_done(state) {
            Some(true) => Some(true),
            _ => None,
        }
    }
}

/// Skips a prefix while the predicate holds, then yields everything.
#[derive(Clone)]
pub struct DropWhile<I, P> {
    inner: I,
    predicate: P,
}

impl<I: fmt::Debug, P> fmt::Debug for DropWhile<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropWhile")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Drop-while state: still skipping, or passing everything through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropWhileState<S> {
    /// Predicate still consulted.
    Skipping(S),
    /// Predicate failed once; never consulted again.
    Passing(S),
}

/// `it` without its longest prefix satisfying `predicate`.
pub fn drop_while<I, P>(predicate: P, it: I) -> DropWhile<I, P>
where
    I: Iterate,
    P: Fn(&I::Item) -> bool,
{
    DropWhile {
        inner: it,
        predicate,
    }
}

impl<I, P> Iterate for DropWhile<I, P>
where
    I: Iterate,
    P: Fn(&I::Item) -> bool,
{
    type Item = I::Item;
    type State = DropWhileState<I::State>;

    fn start(&self) -> Self::State {
        DropWhileState::Skipping(self.inner.start())
    }

    fn next(&self, state: Self::State) -> Option<(I::Item, Self::State)> {
        match state {
            DropWhileState::Passing(state) => {
                let (value, state) = self.inner.next(state)?;
                Some((value, DropWhileState::Passing(state)))
            }
            DropWhileState::Skipping(mut state) => loop {
                let (value, next) = self.inner.next(state)?;
                if !(self.predicate)(&value) {
                    return Some((value, DropWhileState::Passing(next)));
                }
                state = next;
            },
        }
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn is_done(&self, state: &Self::State) -> Option<bool> {
        match state {
            DropWhileState::Passing(state) => self.inner.is_done(state),
            DropWhileState::Skipping(state) => match self.inner.is_done(state) {
                Some(true) => Some(true),
                _ => None,
            },
        }
    }
}
