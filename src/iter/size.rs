//! Size and element-type lattices
//!
//! Composition rules are pure functions of the operand categories so callers
//! can decide whether `length()` is legal without touching any element.

use std::fmt;

use super::IterError;

/// Static knowledge about how many elements an iterator produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeCategory {
    /// Nothing is known; the only way to count is to iterate.
    Unknown,
    /// Exactly this many elements.
    HasLength(usize),
    /// Row-major dimensions; length is the (checked) product.
    HasShape(Vec<usize>),
    /// Never exhausts.
    Infinite,
}

impl SizeCategory {
    /// Finite length, failing for Unknown/Infinite or on overflow.
    pub fn length(&self) -> Result<usize, IterError> {
        match self {
            SizeCategory::HasLength(n) => Ok(*n),
            SizeCategory::HasShape(dims) => checked_product(dims),
            SizeCategory::Unknown | SizeCategory::Infinite => {
                Err(IterError::UndefinedLength(self.to_string()))
            }
        }
    }

    /// Whether a finite length is statically known.
    pub fn is_finite(&self) -> bool {
        matches!(self, SizeCategory::HasLength(_) | SizeCategory::HasShape(_))
    }

    /// Whether the category is known to describe zero elements.
    pub fn is_empty(&self) -> bool {
        match self {
            SizeCategory::HasLength(n) => *n == 0,
            SizeCategory::HasShape(dims) => dims.contains(&0),
            _ => false,
        }
    }

    /// Finite length saturating at `usize::MAX` instead of failing.
    fn saturating_length(&self) -> Option<usize> {
        match self {
            SizeCategory::HasLength(n) => Some(*n),
            SizeCategory::HasShape(dims) => Some(
                dims.iter()
                    .fold(1usize, |acc, &d| acc.saturating_mul(d)),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeCategory::Unknown => write!(f, "Unknown"),
            SizeCategory::HasLength(n) => write!(f, "HasLength({})", n),
            SizeCategory::HasShape(dims) => write!(f, "HasShape({:?})", dims),
            SizeCategory::Infinite => write!(f, "Infinite"),
        }
    }
}

/// Whether the element type of an iterator is statically described.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// Nothing recorded (e.g. after `map`).
    Unknown,
    /// Element type name as reported by `std::any::type_name`.
    Known(&'static str),
}

impl ElementType {
    /// Describe `T`.
    pub fn of<T>() -> Self {
        ElementType::Known(std::any::type_name::<T>())
    }

    /// Known only when every operand is known.
    pub fn all_known<T>(parts: &[ElementType]) -> Self {
        if parts.iter().all(|p| matches!(p, ElementType::Known(_))) {
            ElementType::of::<T>()
        } else {
            ElementType::Unknown
        }
    }
}

pub(crate) fn checked_product(dims: &[usize]) -> Result<usize, IterError> {
    dims.iter().try_fold(1usize, |acc, &d| {
        acc.checked_mul(d)
            .ok_or_else(|| IterError::ArithmeticOverflow(format!("length of shape {:?}", dims)))
    })
}

/// Size of a synchronized traversal.
///
/// A zero-length operand wins; any Unknown operand makes the result Unknown
/// (it might be shorter than every known one); otherwise the shortest finite
/// operand decides, keeping the shape when all finite shapes agree. No
/// operands, or only infinite ones, is Infinite.
pub fn zip_size(parts: &[SizeCategory]) -> SizeCategory {
    if parts.iter().any(SizeCategory::is_empty) {
        return SizeCategory::HasLength(0);
    }
    if parts.iter().any(|p| *p == SizeCategory::Unknown) {
        return SizeCategory::Unknown;
    }

    let finite: Vec<&SizeCategory> = parts.iter().filter(|p| p.is_finite()).collect();
    let Some(first) = finite.first() else {
        return SizeCategory::Infinite;
    };

    if let SizeCategory::HasShape(dims) = first {
        if finite
            .iter()
            .all(|p| matches!(p, SizeCategory::HasShape(d) if d == dims))
        {
            return SizeCategory::HasShape(dims.clone());
        }
    }

    let shortest = finite
        .iter()
        .filter_map(|p| p.saturating_length())
        .min()
        .unwrap_or(0);
    SizeCategory::HasLength(shortest)
}

/// Size of a Cartesian product.
///
/// Zero length takes precedence over everything (including infinite
/// operands); then Unknown, then Infinite; otherwise the shape is the list of
/// operand lengths with the first operand varying fastest.
pub fn product_size(parts: &[SizeCategory]) -> SizeCategory {
    if parts.iter().any(SizeCategory::is_empty) {
        return SizeCategory::HasLength(0);
    }
    if parts.iter().any(|p| *p == SizeCategory::Unknown) {
        return SizeCategory::Unknown;
    }
    if parts.iter().any(|p| *p == SizeCategory::Infinite) {
        return SizeCategory::Infinite;
    }
    let mut dims = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            SizeCategory::HasLength(n) => dims.push(*n),
            SizeCategory::HasShape(d) => dims.extend_from_slice(d),
            _ => return SizeCategory::Unknown,
        }
    }
    SizeCategory::HasShape(dims)
}

/// Size of a flattened iterator whose inner iterables have a type-level
/// constant length `inner` (if any).
pub fn flatten_size(outer: &SizeCategory, inner: Option<usize>) -> SizeCategory {
    match (outer, inner) {
        (_, Some(0)) => SizeCategory::HasLength(0),
        (o, _) if o.is_empty() => SizeCategory::HasLength(0),
        (SizeCategory::HasLength(n), Some(k)) => SizeCategory::HasShape(vec![k, *n]),
        (SizeCategory::HasShape(dims), Some(k)) => {
            let mut shape = Vec::with_capacity(dims.len() + 1);
            shape.push(k);
            shape.extend_from_slice(dims);
            SizeCategory::HasShape(shape)
        }
        (SizeCategory::Infinite, Some(_)) => SizeCategory::Infinite,
        _ => SizeCategory::Unknown,
    }
}

/// Size after keeping at most `n` elements.
pub fn take_size(inner: &SizeCategory, n: usize) -> SizeCategory {
    match inner {
        SizeCategory::Infinite => SizeCategory::HasLength(n),
        SizeCategory::Unknown => SizeCategory::Unknown,
        finite => SizeCategory::HasLength(finite.saturating_length().unwrap_or(0).min(n)),
    }
}

/// Size after skipping `n` elements.
pub fn drop_size(inner: &SizeCategory, n: usize) -> SizeCategory {
    match inner {
        SizeCategory::Infinite => SizeCategory::Infinite,
        SizeCategory::Unknown => SizeCategory::Unknown,
        finite => {
            SizeCategory::HasLength(finite.saturating_length().unwrap_or(0).saturating_sub(n))
        }
    }
}

/// Number of chunks of width `n`.
pub fn partition_size(inner: &SizeCategory, n: usize) -> SizeCategory {
    match inner {
        SizeCategory::Infinite => SizeCategory::Infinite,
        SizeCategory::Unknown => SizeCategory::Unknown,
        finite => {
            let len = finite.saturating_length().unwrap_or(0);
            SizeCategory::HasLength(len / n + usize::from(len % n > 0))
        }
    }
}
