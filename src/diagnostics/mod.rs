//! Backtrace diagnostics
//!
//! The pipeline turns a raw frame list into a compact report:
//!
//! 1. [`FrameCollapser`] merges repeated frames and drops runtime noise;
//! 2. [`CycleDetector`] compresses repeated blocks in long traces;
//! 3. [`BacktraceRenderer`] writes the frames with cycle brackets.
//!
//! [`render_report`] runs all three after the error message produced by an
//! [`ErrorFormatter`].

pub mod collapse;
pub mod config;
pub mod cycles;
pub mod error_format;
pub mod frame;
pub mod render;
pub mod sink;

pub use collapse::{collapse_wrapper_pairs, run_length, FrameCollapser};
pub use config::{CollapseConfig, ConfigError, RenderConfig};
pub use cycles::{CycleDetector, CycleRecord, CycleReport, DisplayedFrame};
pub use error_format::{ErrorFormatter, ErrorValue, HintError, HintProvider, MethodCatalog};
pub use frame::{parse_trace, Frame, FrameParseError, FrameRun, FunctionDescriptor, ModuleId};
pub use render::{BacktraceRenderer, RenderSession};
pub use sink::{Color, OutputSink, PlainSink, SpanSink, Style, StyledSpan};

use tracing::debug;

/// Collapse `frames` and detect cycles according to `config`.
pub fn compress_frames(frames: &[Frame], config: &RenderConfig) -> CycleReport {
    let runs = FrameCollapser::new(config.collapse.clone()).collapse(frames);
    CycleDetector::new(config.cycle_threshold).detect(&runs)
}

/// Write a full error report: `ERROR: ...`, hints, then the stacktrace.
///
/// The stacktrace section is omitted when no frame survives collapsing.
/// Returns the cycle report that was rendered.
pub fn render_report(
    error: &ErrorValue,
    frames: &[Frame],
    formatter: &ErrorFormatter,
    config: &RenderConfig,
    session: &mut RenderSession,
    sink: &mut dyn OutputSink,
) -> CycleReport {
    formatter.write_to(error, sink);

    let report = compress_frames(frames, config);
    debug!(
        raw = frames.len(),
        collapsed = report.total_runs,
        displayed = report.displayed.len(),
        cycles = report.cycles.len(),
        "rendering report"
    );
    if !report.displayed.is_empty() {
        sink.write_styled("Stacktrace:", Style::colored(Color::Red).with_bold(true));
        sink.write_str("\n");
        BacktraceRenderer::new(config.clone()).render(&report, session, sink);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_starts_with_error_then_stacktrace() {
        let frames = parse_trace(
            "inner(Int64)\tlib.jl:4\tMain\n\
             inner(Int64)\tlib.jl:4\tMain\n\
             outer()\tmain.jl:1\tMain\n",
        )
        .expect("valid trace");
        let mut sink = PlainSink::new();
        let report = render_report(
            &ErrorValue::Message("failed".into()),
            &frames,
            &ErrorFormatter::new(),
            &RenderConfig::default(),
            &mut RenderSession::new(),
            &mut sink,
        );
        assert_eq!(report.total_runs, 2);
        assert_eq!(
            sink.as_str(),
            "ERROR: failed\nStacktrace:\n [1] inner(Int64) (repeats 2 times)\n   @ Main lib.jl:4\n [2] outer()\n   @ Main main.jl:1\n"
        );
    }

    #[test]
    fn empty_trace_prints_only_the_error() {
        let mut sink = PlainSink::new();
        render_report(
            &ErrorValue::Divide,
            &[],
            &ErrorFormatter::new(),
            &RenderConfig::default(),
            &mut RenderSession::new(),
            &mut sink,
        );
        assert_eq!(sink.as_str(), "ERROR: DivideError: integer division error\n");
    }
}
