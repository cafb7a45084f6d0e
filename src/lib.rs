//! # Lazy iterators and compact backtraces
//!
//! Two independent subsystems:
//!
//! - [`iter`]: composable, lazily evaluated sequence adaptors over an
//!   explicit-state iteration protocol ([`Iterate`]). Every adaptor reports
//!   a static size category and element type, supports a three-valued
//!   exhaustion check, and is reversible when its sources are.
//! - [`diagnostics`]: turns a raw stack trace into a readable report by
//!   merging repeated frames, hiding runtime noise and compressing repeated
//!   blocks from deep recursion.
//!
//! ## Usage Example
//!
//! ```
//! use lazytrace::iter::{self, Iterate};
//!
//! let pairs = iter::zip((iter::span(1, 4), iter::repeated("x")));
//! let items: Vec<_> = pairs.walk().collect();
//! assert_eq!(items, vec![(1, "x"), (2, "x"), (3, "x")]);
//! ```
//!
//! ```
//! use lazytrace::diagnostics::{
//!     parse_trace, render_report, ErrorFormatter, ErrorValue, PlainSink, RenderConfig,
//!     RenderSession,
//! };
//!
//! let frames = parse_trace("f(Int64)\tmain.jl:3\tMain\n").unwrap();
//! let mut sink = PlainSink::new();
//! render_report(
//!     &ErrorValue::Divide,
//!     &frames,
//!     &ErrorFormatter::new(),
//!     &RenderConfig::default(),
//!     &mut RenderSession::new(),
//!     &mut sink,
//! );
//! assert!(sink.as_str().starts_with("ERROR: DivideError"));
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod diagnostics; // Backtrace collapsing, cycle compression, rendering
pub mod iter; // Lazy iterator protocol and adaptors

// Re-exports for convenience
pub use diagnostics::{
    render_report, BacktraceRenderer, CycleDetector, ErrorFormatter, ErrorValue, Frame,
    FrameCollapser, RenderConfig, RenderSession,
};
pub use iter::{IterError, Iterate, Reversible};
