//! Base sources: owned vectors, fixed arrays, shared views and integer spans

use std::ops::Range;
use std::sync::Arc;

use super::{nth_index, ElementType, Indexed, IterError, Iterate, Reversible, SizeCategory};

impl<T: Clone> Iterate for Vec<T> {
    type Item = T;
    type State = usize;

    fn start(&self) -> usize {
        0
    }

    fn next(&self, state: usize) -> Option<(T, usize)> {
        self.as_slice().get(state).cloned().map(|v| (v, state + 1))
    }

    fn size(&self) -> SizeCategory {
        SizeCategory::HasLength(self.len())
    }

    fn element_type(&self) -> ElementType {
        ElementType::of::<T>()
    }

    fn is_done(&self, state: &usize) -> Option<bool> {
        Some(*state >= self.len())
    }

    fn nth(&self, n: usize) -> Result<T, IterError> {
        let idx = nth_index(n, self.len())?;
        Ok(self[idx].clone())
    }
}

impl<T: Clone> Reversible for Vec<T> {
    type RevState = usize;

    fn rev_start(&self) -> usize {
        self.len()
    }

    fn rev_next(&self, remaining: usize) -> Option<(T, usize)> {
        let idx = remaining.checked_sub(1)?;
        self.as_slice().get(idx).cloned().map(|v| (v, idx))
    }
}

impl<T: Clone> Indexed for Vec<T> {
    fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).cloned()
    }

    fn index_len(&self) -> usize {
        self.len()
    }
}

impl<T: Clone, const N: usize> Iterate for [T; N] {
    type Item = T;
    type State = usize;

    fn start(&self) -> usize {
        0
    }

    fn next(&self, state: usize) -> Option<(T, usize)> {
        self.as_slice().get(state).cloned().map(|v| (v, state + 1))
    }

    fn size(&self) -> SizeCategory {
        SizeCategory::HasLength(N)
    }

    fn element_type(&self) -> ElementType {
        ElementType::of::<T>()
    }

    fn is_done(&self, state: &usize) -> Option<bool> {
        Some(*state >= N)
    }

    fn fixed_len() -> Option<usize> {
        Some(N)
    }

    fn nth(&self, n: usize) -> Result<T, IterError> {
        let idx = nth_index(n, N)?;
        Ok(self[idx].clone())
    }
}

impl<T: Clone, const N: usize> Reversible for [T; N] {
    type RevState = usize;

    fn rev_start(&self) -> usize {
        N
    }

    fn rev_next(&self, remaining: usize) -> Option<(T, usize)> {
        let idx = remaining.checked_sub(1)?;
        self.as_slice().get(idx).cloned().map(|v| (v, idx))
    }
}

impl<T: Clone, const N: usize> Indexed for [T; N] {
    fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).cloned()
    }

    fn index_len(&self) -> usize {
        N
    }
}

/// Shared, cheaply sliceable sequence.
///
/// Cloning or slicing a `Seq` never copies elements: every view points into
/// the same `Arc<[T]>`. A `Seq` built with [`Seq::with_shape`] reports
/// `HasShape`; views taken from it are plain one-dimensional sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seq<T> {
    data: Arc<[T]>,
    range: Range<usize>,
    shape: Option<Vec<usize>>,
}

impl<T> Seq<T> {
    /// Wrap an owned vector.
    pub fn new(values: Vec<T>) -> Self {
        let len = values.len();
        Self {
            data: Arc::from(values.into_boxed_slice()),
            range: 0..len,
            shape: None,
        }
    }

    /// Wrap an owned vector laid out row-major with the given dimensions.
    pub fn with_shape(values: Vec<T>, dims: Vec<usize>) -> Result<Self, IterError> {
        let expected = super::size::checked_product(&dims)?;
        if expected != values.len() {
            return Err(IterError::InvalidArgument {
                operation: "seq",
                reason: format!(
                    "shape {:?} describes {} elements but {} were supplied",
                    dims,
                    expected,
                    values.len()
                ),
            });
        }
        let mut seq = Self::new(values);
        seq.shape = Some(dims);
        Ok(seq)
    }

    /// Number of elements in this view.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Elements of this view.
    pub fn as_slice(&self) -> &[T] {
        &self.data[self.range.clone()]
    }

    /// Sub-view over `range` (relative to this view), clamped to its bounds.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let start = (self.range.start + range.start).min(self.range.end);
        let end = (self.range.start + range.end).clamp(start, self.range.end);
        Self {
            data: Arc::clone(&self.data),
            range: start..end,
            shape: None,
        }
    }

    /// Whether two views share the same backing storage.
    pub fn shares_storage(&self, other: &Seq<T>) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl<T> From<Vec<T>> for Seq<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

/// Shared sequence over `values`.
pub fn seq<T>(values: Vec<T>) -> Seq<T> {
    Seq::new(values)
}

impl<T: Clone> Iterate for Seq<T> {
    type Item = T;
    type State = usize;

    fn start(&self) -> usize {
        0
    }

    fn next(&self, state: usize) -> Option<(T, usize)> {
        self.as_slice().get(state).cloned().map(|v| (v, state + 1))
    }

    fn size(&self) -> SizeCategory {
        match &self.shape {
            Some(dims) => SizeCategory::HasShape(dims.clone()),
            None => SizeCategory::HasLength(self.len()),
        }
    }

    fn element_type(&self) -> ElementType {
        ElementType::of::<T>()
    }

    fn is_done(&self, state: &usize) -> Option<bool> {
        Some(*state >= self.len())
    }

    fn nth(&self, n: usize) -> Result<T, IterError> {
        let idx = nth_index(n, self.len())?;
        Ok(self.as_slice()[idx].clone())
    }
}

impl<T: Clone> Reversible for Seq<T> {
    type RevState = usize;

    fn rev_start(&self) -> usize {
        self.len()
    }

    fn rev_next(&self, remaining: usize) -> Option<(T, usize)> {
        let idx = remaining.checked_sub(1)?;
        self.as_slice().get(idx).cloned().map(|v| (v, idx))
    }
}

impl<T: Clone> Indexed for Seq<T> {
    fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).cloned()
    }

    fn index_len(&self) -> usize {
        self.len()
    }
}

/// Arithmetic integer range `start, start + step, ...` stopping before `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    start: i64,
    step: i64,
    len: usize,
}

impl Span {
    /// Range with an explicit non-zero step.
    pub fn stepped(start: i64, stop: i64, step: i64) -> Result<Self, IterError> {
        if step == 0 {
            return Err(IterError::InvalidArgument {
                operation: "span",
                reason: "step must be non-zero".to_string(),
            });
        }
        let len = usize::try_from(span_length(start, stop, step))
            .map_err(|_| IterError::ArithmeticOverflow("span length".to_string()))?;
        Ok(Self { start, step, len })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn value_at(&self, index: usize) -> i64 {
        // index < len puts the true value between start and stop, so the
        // result is exact modulo 2^64 even when index exceeds i64::MAX
        self.start.wrapping_add(self.step.wrapping_mul(index as i64))
    }
}

/// Element count of `start, start + step, ...` before `stop`, in i128 so
/// the full i64 range is representable.
fn span_length(start: i64, stop: i64, step: i64) -> i128 {
    let distance = i128::from(stop) - i128::from(start);
    let step = i128::from(step);
    if distance == 0 || (distance > 0) != (step > 0) {
        return 0;
    }
    let stride = step.abs();
    (distance.abs() + stride - 1) / stride
}

/// Unit-step range `start..stop`.
///
/// On targets where `usize` is narrower than 64 bits the length clamps to
/// `usize::MAX`.
pub fn span(start: i64, stop: i64) -> Span {
    let len = usize::try_from(span_length(start, stop, 1)).unwrap_or(usize::MAX);
    Span { start, step: 1, len }
}

impl Iterate for Span {
    type Item = i64;
    type State = usize;

    fn start(&self) -> usize {
        0
    }

    fn next(&self, state: usize) -> Option<(i64, usize)> {
        (state < self.len).then(|| (self.value_at(state), state + 1))
    }

    fn size(&self) -> SizeCategory {
        SizeCategory::HasLength(self.len)
    }

    fn element_type(&self) -> ElementType {
        ElementType::of::<i64>()
    }

    fn is_done(&self, state: &usize) -> Option<bool> {
        Some(*state >= self.len)
    }

    fn nth(&self, n: usize) -> Result<i64, IterError> {
        nth_index(n, self.len).map(|idx| self.value_at(idx))
    }

    fn last_value(&self) -> Result<Option<i64>, IterError> {
        Ok(self.len.checked_sub(1).map(|idx| self.value_at(idx)))
    }
}

impl Reversible for Span {
    type RevState = usize;

    fn rev_start(&self) -> usize {
        self.len
    }

    fn rev_next(&self, remaining: usize) -> Option<(i64, usize)> {
        let idx = remaining.checked_sub(1)?;
        Some((self.value_at(idx), idx))
    }
}

impl Indexed for Span {
    fn get(&self, index: usize) -> Option<i64> {
        (index < self.len).then(|| self.value_at(index))
    }

    fn index_len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::reverse;
    use test_case::test_case;

    #[test]
    fn vec_walks_in_order() {
        let v = vec![1, 2, 3];
        assert_eq!(v.walk().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(v.is_done(&3), Some(true));
        assert_eq!(v.nth(2), Ok(2));
    }

    #[test]
    fn arrays_have_type_level_length() {
        assert_eq!(<[u8; 4] as Iterate>::fixed_len(), Some(4));
        assert_eq!(<Vec<u8> as Iterate>::fixed_len(), None);
    }

    #[test]
    fn seq_slices_share_storage() {
        let s = seq(vec![10, 20, 30, 40, 50]);
        let view = s.slice(1..4);
        assert_eq!(view.as_slice(), &[20, 30, 40]);
        assert!(view.shares_storage(&s));
        assert_eq!(view.slice(2..10).as_slice(), &[40]);
    }

    #[test]
    fn shaped_seq_reports_shape() {
        let s = Seq::with_shape((0..6).collect(), vec![2, 3]).expect("shape matches");
        assert_eq!(s.size(), SizeCategory::HasShape(vec![2, 3]));
        assert_eq!(s.length(), Ok(6));
        assert!(Seq::with_shape(vec![1, 2, 3], vec![2, 2]).is_err());
    }

    #[test_case(0, 10, 3, vec![0, 3, 6, 9]; "ascending")]
    #[test_case(10, 0, -4, vec![10, 6, 2]; "descending")]
    #[test_case(5, 5, 1, vec![]; "empty")]
    #[test_case(0, 5, -1, vec![]; "wrong direction")]
    #[test_case(i64::MAX - 1, i64::MIN, -(1 << 62), vec![i64::MAX - 1, (1 << 62) - 2, -2, -(1 << 62) - 2]; "descending across zero with huge step")]
    fn stepped_spans(start: i64, stop: i64, step: i64, expected: Vec<i64>) {
        let s = Span::stepped(start, stop, step).expect("valid step");
        assert_eq!(s.walk().collect::<Vec<_>>(), expected);
        assert_eq!(s.len(), expected.len());
    }

    #[test_case(span(i64::MIN, i64::MAX); "unit")]
    #[test_case(Span::stepped(i64::MIN, i64::MAX, 1).expect("valid step"); "stepped")]
    fn full_i64_range(s: Span) {
        assert_eq!(s.len(), u64::MAX as usize);
        assert_eq!(s.nth(1), Ok(i64::MIN));
        assert_eq!(s.last_value(), Ok(Some(i64::MAX - 1)));
        assert_eq!(s.get(1 << 63), Some(0));
        let back = reverse(s).expect("spans reverse");
        assert_eq!(back.walk().take(2).collect::<Vec<_>>(), vec![i64::MAX - 1, i64::MAX - 2]);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(matches!(
            Span::stepped(0, 3, 0),
            Err(IterError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn span_random_access() {
        let s = span(1, 101);
        assert_eq!(s.nth(50), Ok(50));
        assert_eq!(s.last_value(), Ok(Some(100)));
        assert!(s.nth(101).is_err());
    }
}
