//! Backtrace rendering
//!
//! Each displayed frame becomes a two-line block:
//!
//! ```text
//!  [3] f(Int64) (repeats 2 times)
//!    @ Main script.jl:12 [inlined]
//! ```
//!
//! Frames inside a repeated block are prefixed by a gutter with one column
//! per nesting level: `┌` on the first line of a block, `│` while it is open
//! and `└` on the closing `repeated N times` line.

use std::collections::HashMap;

use super::config::RenderConfig;
use super::cycles::{CycleRecord, CycleReport, DisplayedFrame};
use super::frame::ModuleId;
use super::sink::{Color, OutputSink, Style};

/// Module colour assignments for one rendering session.
///
/// Colours are handed out from the palette in first-seen order and reused
/// for the lifetime of the session, so a module keeps its colour across
/// every report rendered with the same session.
#[derive(Debug, Clone, Default)]
pub struct RenderSession {
    colors: HashMap<ModuleId, Color>,
    next: usize,
}

impl RenderSession {
    /// Session with no assignments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour for `module`, assigning the next palette entry on first use.
    pub fn color_for(&mut self, module: &ModuleId, palette: &[Color]) -> Option<Color> {
        if let Some(color) = self.colors.get(module) {
            return Some(*color);
        }
        let color = *palette.get(self.next % palette.len().max(1))?;
        self.next += 1;
        self.colors.insert(module.clone(), color);
        Some(color)
    }

    /// Number of modules seen so far.
    pub fn assigned(&self) -> usize {
        self.colors.len()
    }
}

const DIM: Style = Style {
    color: Some(Color::LightBlack),
    bold: false,
    underline: false,
};

/// Writes a [`CycleReport`] to a sink.
#[derive(Debug, Clone, Default)]
pub struct BacktraceRenderer {
    config: RenderConfig,
}

impl BacktraceRenderer {
    /// Renderer with the given settings.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Active settings.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render every displayed frame with its cycle brackets.
    pub fn render(
        &self,
        report: &CycleReport,
        session: &mut RenderSession,
        sink: &mut dyn OutputSink,
    ) {
        let width = digits(report.total_runs.max(1));
        let levels = report.max_nested;
        // open cycles, outermost first
        let mut open: Vec<&CycleRecord> = Vec::new();
        let mut pending = report.cycles.iter().peekable();

        for (idx, shown) in report.displayed.iter().enumerate() {
            if idx > 0 && self.config.line_breaks {
                sink.write_str("\n");
            }
            let mut opened = 0;
            while let Some(cycle) = pending.next_if(|c| c.start == idx) {
                open.push(cycle);
                opened += 1;
            }

            let first_new = open.len() - opened;
            let header: Vec<char> = (0..open.len())
                .map(|level| if level >= first_new { '┌' } else { '│' })
                .collect();
            self.write_gutter(sink, &header, levels);
            self.write_header(sink, shown, width);

            let body = vec!['│'; open.len()];
            self.write_gutter(sink, &body, levels);
            self.write_location(sink, shown, width, session);

            while let Some(&cycle) = open.last() {
                if cycle.end() != idx + 1 {
                    break;
                }
                open.pop();
                let depth = open.len();
                let mut glyphs = vec!['│'; depth];
                glyphs.push('└');
                glyphs.extend(std::iter::repeat('─').take(levels.saturating_sub(depth + 1)));
                sink.write_styled(&glyphs.iter().collect::<String>(), DIM);
                sink.write_str(" ");
                sink.write_styled(&format!("repeated {} times", cycle.repetitions), DIM);
                sink.write_str("\n");
            }
        }
    }

    fn write_gutter(&self, sink: &mut dyn OutputSink, glyphs: &[char], levels: usize) {
        if levels == 0 {
            return;
        }
        let mut gutter: String = glyphs.iter().collect();
        gutter.extend(std::iter::repeat(' ').take(levels.saturating_sub(glyphs.len())));
        sink.write_styled(&gutter, DIM);
    }

    fn write_header(&self, sink: &mut dyn OutputSink, shown: &DisplayedFrame, width: usize) {
        let function = &shown.run.frame.function;
        sink.write_str(&format!(" [{:>width$}] ", shown.position + 1, width = width));
        sink.write_styled(&function.name, Style::plain().with_bold(true));
        sink.write_str(&format!("({}", function.params.join(", ")));
        if !function.keywords.is_empty() {
            sink.write_str(&format!("; {}", function.keywords.join(", ")));
        }
        sink.write_str(")");
        if shown.run.count > 1 {
            sink.write_styled(&format!(" (repeats {} times)", shown.run.count), DIM);
        }
        sink.write_str("\n");
    }

    fn write_location(
        &self,
        sink: &mut dyn OutputSink,
        shown: &DisplayedFrame,
        width: usize,
        session: &mut RenderSession,
    ) {
        let frame = &shown.run.frame;
        sink.write_str(&" ".repeat(width + 2));
        sink.write_styled("@", DIM);
        sink.write_str(" ");
        if let Some(module) = &frame.module {
            let style = if self.config.module_colors {
                session
                    .color_for(module, &self.config.palette)
                    .map_or_else(Style::plain, Style::colored)
            } else {
                Style::plain()
            };
            sink.write_styled(module.as_str(), style);
            sink.write_str(" ");
        }
        sink.write_styled(
            &format!("{}:{}", frame.file, frame.line),
            DIM.with_underline(true),
        );
        if frame.inlined {
            sink.write_styled(" [inlined]", DIM);
        }
        sink.write_str("\n");
    }
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}
