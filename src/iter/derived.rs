//! Whole-iterator queries built on the protocol

use super::{rest, IterError, Iterate, Rest};

/// First element and the iterator resumed after it, or `None` when empty.
pub fn peel<I: Iterate>(it: I) -> Option<(I::Item, Rest<I>)> {
    let (value, state) = it.next(it.start())?;
    Some((value, rest(it, state)))
}

/// The `n`-th element (1-based).
///
/// Random-access sources, cycles and repeat-exactly-`n` compositions answer
/// in O(1); everything else steps.
pub fn nth<I: Iterate>(it: &I, n: usize) -> Result<I::Item, IterError> {
    it.nth(n)
}

/// The sole element; fails for zero or several elements after looking at no
/// more than two.
pub fn only<I: Iterate>(it: &I) -> Result<I::Item, IterError> {
    let Some((value, state)) = it.next(it.start()) else {
        return Err(IterError::out_of_bounds("only: iterator is empty"));
    };
    if it.is_done(&state) == Some(true) || it.next(state).is_none() {
        return Ok(value);
    }
    Err(IterError::out_of_bounds("only: iterator has multiple elements"))
}

/// First element, or `None` when empty.
pub fn first<I: Iterate>(it: &I) -> Option<I::Item> {
    it.next(it.start()).map(|(value, _)| value)
}

/// Last element; refuses infinite iterators.
pub fn last<I: Iterate>(it: &I) -> Result<Option<I::Item>, IterError> {
    it.last_value()
}

/// Number of elements, when the size category makes it known.
pub fn length<I: Iterate>(it: &I) -> Result<usize, IterError> {
    it.length()
}
