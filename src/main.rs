use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use lazytrace::diagnostics::{
    parse_trace, render_report, CollapseConfig, ErrorFormatter, ErrorValue, Frame,
    FunctionDescriptor, ModuleId, PlainSink, RenderConfig, RenderSession,
};
use lazytrace::iter::{self, Iterate};

#[derive(Parser, Debug)]
#[command(name = "lazytrace", about = "Collapse and render stack traces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a tab-separated trace file (`-` reads stdin).
    Render {
        /// Trace file, innermost frame first.
        trace: PathBuf,
        /// Error message printed above the stacktrace.
        #[arg(long)]
        message: Option<String>,
        /// Collapsed traces longer than this are searched for cycles.
        #[arg(long, default_value_t = 50)]
        cycle_threshold: usize,
        /// Only consider the first N frames.
        #[arg(long)]
        max_frames: Option<usize>,
        /// Keep frames from native code.
        #[arg(long)]
        keep_native: bool,
        /// Blank line between frames.
        #[arg(long)]
        line_breaks: bool,
    },
    /// Print a synthetic trace with an embedded repeated block.
    Synth {
        /// Distinct frames before the repeated block.
        #[arg(long, default_value_t = 75)]
        prefix: usize,
        /// Frames in one repetition.
        #[arg(long, default_value_t = 5)]
        period: usize,
        /// Number of repetitions.
        #[arg(long, default_value_t = 10)]
        repeats: isize,
        /// Distinct frames after the repeated block.
        #[arg(long, default_value_t = 75)]
        suffix: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lazytrace=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            trace,
            message,
            cycle_threshold,
            max_frames,
            keep_native,
            line_breaks,
        } => {
            let collapse = CollapseConfig::default()
                .with_max_frames(max_frames)
                .with_skip_native(!keep_native);
            let config = RenderConfig::default()
                .with_cycle_threshold(cycle_threshold)
                .with_line_breaks(line_breaks)
                .with_collapse(collapse);
            let error = message.map_or(ErrorValue::StackOverflow, ErrorValue::Message);
            run_render(trace, &error, &config)?
        }
        Commands::Synth {
            prefix,
            period,
            repeats,
            suffix,
        } => run_synth(prefix, period, repeats, suffix)?,
    }

    Ok(())
}

fn run_render(path: PathBuf, error: &ErrorValue, config: &RenderConfig) -> Result<()> {
    let text = read_input(&path)
        .with_context(|| format!("failed to read trace from {}", path.display()))?;
    let frames = parse_trace(&text)
        .with_context(|| format!("failed to parse trace {}", path.display()))?;
    info!(frames = frames.len(), "loaded trace");

    let mut sink = PlainSink::new();
    let report = render_report(
        error,
        &frames,
        &ErrorFormatter::new(),
        config,
        &mut RenderSession::new(),
        &mut sink,
    );
    info!(
        collapsed = report.total_runs,
        displayed = report.displayed.len(),
        cycles = report.cycles.len(),
        "rendered trace"
    );
    io::stdout()
        .write_all(sink.as_str().as_bytes())
        .context("failed to write report")?;
    Ok(())
}

fn read_input(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}

fn run_synth(prefix: usize, period: usize, repeats: isize, suffix: usize) -> Result<()> {
    if period == 0 {
        bail!("period must be at least one frame");
    }
    let frames = |name: &str, n: usize| -> Vec<Frame> {
        (0..n)
            .map(|i| {
                let line = u32::try_from(i + 1).unwrap_or(u32::MAX);
                Frame::new(
                    FunctionDescriptor::new(&format!("{}{}", name, i), ["Int64"]),
                    "synth.jl",
                    line,
                )
                .with_module(ModuleId::new("Main"))
            })
            .collect()
    };
    let block = iter::cycle_n(iter::seq(frames("recurse", period)), repeats)
        .context("invalid repeat count")?;

    let mut trace = frames("inner", prefix);
    trace.extend(block.walk());
    trace.extend(frames("outer", suffix));
    info!(frames = trace.len(), "synthesized trace");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for frame in &trace {
        writeln!(out, "{}", frame)?;
    }
    Ok(())
}
