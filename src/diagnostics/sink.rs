//! Append-only output sinks with optional styling
//!
//! The renderer only ever appends text. Styling is advisory: a sink may drop
//! it entirely ([`PlainSink`]) or record it next to the text ([`SpanSink`]).

use std::ops::Range;

/// Terminal colour names understood by sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Color {
    /// Red (errors).
    Red,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Blue.
    Blue,
    /// Magenta.
    Magenta,
    /// Cyan.
    Cyan,
    /// Dimmed grey (secondary text).
    LightBlack,
    /// Bright blue.
    LightBlue,
    /// Bright magenta.
    LightMagenta,
    /// Bright cyan.
    LightCyan,
    /// Bright green.
    LightGreen,
    /// Bright yellow.
    LightYellow,
}

/// Styling attached to a written span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    /// Foreground colour, if any.
    pub color: Option<Color>,
    /// Bold weight.
    pub bold: bool,
    /// Underline.
    pub underline: bool,
}

impl Style {
    /// Unstyled text.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Coloured text.
    pub fn colored(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Set bold.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set underline.
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Whether this style changes anything.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Destination for rendered diagnostics.
pub trait OutputSink {
    /// Append unstyled text.
    fn write_str(&mut self, text: &str);

    /// Append styled text; sinks without styling support ignore `style`.
    fn write_styled(&mut self, text: &str, style: Style) {
        let _ = style;
        self.write_str(text);
    }
}

impl OutputSink for String {
    fn write_str(&mut self, text: &str) {
        self.push_str(text);
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_str(&mut self, text: &str) {
        (**self).write_str(text);
    }

    fn write_styled(&mut self, text: &str, style: Style) {
        (**self).write_styled(text, style);
    }
}

/// Plain-text sink that discards styling.
#[derive(Debug, Clone, Default)]
pub struct PlainSink {
    buffer: String,
}

impl PlainSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Take the accumulated text.
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl OutputSink for PlainSink {
    fn write_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// A styled region of a [`SpanSink`]'s text (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// Byte range in the sink text.
    pub range: Range<usize>,
    /// Style applied to the range.
    pub style: Style,
}

/// Sink that keeps plain text plus the list of styled byte ranges.
#[derive(Debug, Clone, Default)]
pub struct SpanSink {
    text: String,
    spans: Vec<StyledSpan>,
}

impl SpanSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Styled ranges, in write order.
    pub fn spans(&self) -> &[StyledSpan] {
        &self.spans
    }

    /// Styled substrings paired with their style.
    pub fn styled_fragments(&self) -> impl Iterator<Item = (&str, Style)> + '_ {
        self.spans
            .iter()
            .filter_map(|span| self.text.get(span.range.clone()).map(|s| (s, span.style)))
    }
}

impl OutputSink for SpanSink {
    fn write_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn write_styled(&mut self, text: &str, style: Style) {
        let begin = self.text.len();
        self.text.push_str(text);
        if !style.is_plain() && !text.is_empty() {
            self.spans.push(StyledSpan {
                range: begin..self.text.len(),
                style,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_sink_drops_styles() {
        let mut sink = PlainSink::new();
        sink.write_styled("ERROR", Style::colored(Color::Red).with_bold(true));
        sink.write_str(": boom");
        assert_eq!(sink.as_str(), "ERROR: boom");
    }

    #[test]
    fn span_sink_records_ranges() {
        let mut sink = SpanSink::new();
        sink.write_str("at ");
        sink.write_styled("Main", Style::colored(Color::Cyan));
        sink.write_styled(" ", Style::plain());
        assert_eq!(sink.text(), "at Main ");
        assert_eq!(sink.spans().len(), 1);
        let fragments: Vec<_> = sink.styled_fragments().collect();
        assert_eq!(fragments, vec![("Main", Style::colored(Color::Cyan))]);
    }
}
