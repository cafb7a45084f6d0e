//! Full report rendering: collapse, cycle detection and formatting together

#[path = "common/mod.rs"]
mod common;
use common::{assert_snapshot, recursive_trace};

use lazytrace::diagnostics::{
    compress_frames, parse_trace, render_report, Color, CycleDetector, ErrorFormatter,
    ErrorValue, Frame, FrameCollapser, FunctionDescriptor, HintError, MethodCatalog, ModuleId,
    PlainSink, RenderConfig, RenderSession, SpanSink, Style,
};

fn render(
    error: &ErrorValue,
    frames: &[Frame],
    formatter: &ErrorFormatter,
    config: &RenderConfig,
) -> String {
    let mut sink = PlainSink::new();
    render_report(error, frames, formatter, config, &mut RenderSession::new(), &mut sink);
    sink.into_string()
}

#[test]
fn test_deep_recursion_is_compressed_once() {
    let frames = recursive_trace(75, 5, 10, 75);
    assert_eq!(frames.len(), 200);

    let config = RenderConfig::default();
    let report = compress_frames(&frames, &config);
    assert_eq!(report.total_runs, 200);
    assert_eq!(report.displayed.len(), 155);
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].period, 5);
    assert_eq!(report.cycles[0].repetitions, 10);

    let text = render(&ErrorValue::StackOverflow, &frames, &ErrorFormatter::new(), &config);
    assert_eq!(text.matches("repeated 10 times").count(), 1);
    assert_eq!(text.matches("repeated").count(), 1);
    assert!(text.contains("\n  [  1] inner0(Int64)\n"));
    assert!(text.contains("\n┌ [ 76] step0(Int64)\n"));
    assert!(text.contains("\n  [126] outer0(Int64)\n"));
    assert!(text.contains("\n  [200] outer74(Int64)\n"));
}

#[test]
fn test_threshold_is_exclusive() {
    let config = RenderConfig::default();

    let at_threshold = recursive_trace(0, 2, 25, 0);
    assert_eq!(at_threshold.len(), 50);
    let report = compress_frames(&at_threshold, &config);
    assert!(report.cycles.is_empty());
    assert_eq!(report.displayed.len(), 50);

    let above = recursive_trace(0, 2, 25, 1);
    let report = compress_frames(&above, &config);
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].repetitions, 25);
    assert_eq!(report.displayed.len(), 3);
}

#[test]
fn test_small_cycle_snapshot() {
    let frames = recursive_trace(1, 2, 3, 1);
    let config = RenderConfig::default().with_cycle_threshold(0);
    let text = render(&ErrorValue::StackOverflow, &frames, &ErrorFormatter::new(), &config);
    assert_snapshot("reports/small_cycle.txt", &text);
}

const SCRIPT_TRACE: &str = "\
describe(Any)\tscript.jl:4\tMain
jl_apply(Ptr)\tjulia.h:1982\t-\tnative
summarize(Int64; Bool)\tscript.jl:9\tMain
kwcall(NamedTuple, typeof(summarize), Int64)\tboot.jl:1\tCore
summarize(Int64)\tscript.jl:9\tMain
eval(Module, Any)\tboot.jl:385\tCore
include_string(Function, Module, String, String)\tloading.jl:2070\tBase
_include(Function, Module, String)\tloading.jl:2136\tBase
include(Module, String)\tBase.jl:495\tBase
exec_options(JLOptions)\tclient.jl:318\tBase
_start()\tclient.jl:552\tBase
";

fn shapes_catalog() -> MethodCatalog {
    let def = |param: &str, line| {
        Frame::new(FunctionDescriptor::new("area", [param]), "shapes.jl", line)
            .with_module(ModuleId::new("Shapes"))
    };
    MethodCatalog::default()
        .with_method(def("Circle", 3))
        .with_method(def("Square", 7))
}

fn load_error() -> ErrorValue {
    ErrorValue::Load {
        file: "script.jl".into(),
        line: 4,
        error: Box::new(ErrorValue::Method {
            function: "area".into(),
            args: vec!["String".into()],
        }),
    }
}

#[test]
fn test_loader_noise_and_hints_snapshot() {
    let frames = parse_trace(SCRIPT_TRACE).expect("valid trace");
    assert_eq!(frames.len(), 11);
    let formatter = ErrorFormatter::new().with_provider(shapes_catalog());
    let text = render(&load_error(), &frames, &formatter, &RenderConfig::default());
    assert_snapshot("reports/loader_and_hints.txt", &text);
}

#[test]
fn test_keeping_native_frames() {
    let frames = parse_trace(SCRIPT_TRACE).expect("valid trace");
    let mut config = RenderConfig::default();
    config.collapse = config.collapse.with_skip_native(false);
    let runs = FrameCollapser::new(config.collapse.clone()).collapse(&frames);
    assert!(runs.iter().any(|r| r.frame.native));
    assert_eq!(CycleDetector::default().detect(&runs).displayed.len(), 6);
}

#[test]
fn test_failing_hint_keeps_the_report() {
    let frames = parse_trace(SCRIPT_TRACE).expect("valid trace");
    let formatter = ErrorFormatter::new()
        .with_provider(|_: &ErrorValue| -> Result<Option<String>, HintError> {
            Err(HintError::failed("flaky", "index unavailable"))
        });
    let text = render(&load_error(), &frames, &formatter, &RenderConfig::default());
    assert!(text.starts_with("ERROR: LoadError: MethodError: no method matching area(::String)\n"));
    assert!(!text.contains("Closest candidates"));
    assert!(text.contains("Stacktrace:\n [1] describe(Any)\n"));
}

#[test]
fn test_iterator_errors_flow_through_the_formatter() {
    let err = lazytrace::iter::take(lazytrace::iter::span(0, 3), -1)
        .map(|_| ())
        .expect_err("negative count");
    let text = render(&err.into(), &[], &ErrorFormatter::new(), &RenderConfig::default());
    assert_eq!(
        text,
        "ERROR: ArgumentError: invalid argument to take: count must be non-negative, got -1\n"
    );
}

#[test]
fn test_styles_reach_styled_sinks() {
    let frames = parse_trace("f(Int64)\tmain.jl:1\tMain\tinlined\n").expect("valid trace");
    let mut sink = SpanSink::new();
    render_report(
        &ErrorValue::Divide,
        &frames,
        &ErrorFormatter::new(),
        &RenderConfig::default(),
        &mut RenderSession::new(),
        &mut sink,
    );
    let fragments: Vec<(&str, Style)> = sink.styled_fragments().collect();
    assert_eq!(fragments[0], ("ERROR: ", Style::colored(Color::Red).with_bold(true)));
    assert!(fragments.contains(&("f", Style::plain().with_bold(true))));
    assert!(fragments.contains(&(" [inlined]", Style::colored(Color::LightBlack))));
    assert!(sink.text().ends_with("@ Main main.jl:1 [inlined]\n"));
}

#[test]
fn test_parse_errors_carry_line_numbers() {
    let err = parse_trace("f()\ta.jl:1\tMain\nbroken line\n").expect_err("second line is invalid");
    assert_eq!(err.to_string(), "line 2: missing location column");
}
