//! Primary error text and optional hints
//!
//! [`ErrorFormatter`] always produces the primary message for an
//! [`ErrorValue`]. Hints come from registered [`HintProvider`]s; a provider
//! that fails is logged and skipped so the primary message is never lost.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use super::frame::Frame;
use super::sink::{Color, OutputSink, Style};
use crate::iter::IterError;

/// Runtime error values the formatter understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValue {
    /// Indexing outside a collection.
    Bounds {
        /// Description of the collection (`3-element Vector{Int64}`).
        collection: String,
        /// Offending index, if known.
        index: Option<String>,
    },
    /// A function received an invalid argument.
    Argument(String),
    /// A dictionary lookup missed.
    Key(String),
    /// A value outside a function's domain.
    Domain {
        /// The offending value.
        value: String,
        /// Explanation.
        message: String,
    },
    /// No method matches the argument types of a call.
    Method {
        /// Called function.
        function: String,
        /// Argument types of the failed call.
        args: Vec<String>,
    },
    /// Use of an undefined variable.
    UndefVar {
        /// Variable name.
        name: String,
        /// Scope searched, if known.
        scope: Option<String>,
    },
    /// Integer division by zero.
    Divide,
    /// Arithmetic overflow.
    Overflow(String),
    /// A value cannot be converted exactly.
    Inexact {
        /// Conversion function.
        function: String,
        /// Target type.
        target: String,
        /// Source value.
        value: String,
    },
    /// Recursion exhausted the stack.
    StackOverflow,
    /// A value has the wrong type.
    Type {
        /// Function or construct performing the check.
        function: String,
        /// Optional context (argument name, field...).
        context: Option<String>,
        /// Expected type.
        expected: String,
        /// Actual type.
        got: String,
    },
    /// Read past the end of a stream.
    Eof,
    /// A failed assertion.
    Assertion(String),
    /// A plain error message.
    Message(String),
    /// An error raised while loading a file.
    Load {
        /// File being loaded.
        file: String,
        /// Line of the expression being evaluated.
        line: u32,
        /// Underlying error.
        error: Box<ErrorValue>,
    },
    /// Failure from the iterator library.
    Iteration(IterError),
}

impl ErrorValue {
    /// Short type name shown before the message.
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorValue::Bounds { .. } => "BoundsError",
            ErrorValue::Argument(_) => "ArgumentError",
            ErrorValue::Key(_) => "KeyError",
            ErrorValue::Domain { .. } => "DomainError",
            ErrorValue::Method { .. } => "MethodError",
            ErrorValue::UndefVar { .. } => "UndefVarError",
            ErrorValue::Divide => "DivideError",
            ErrorValue::Overflow(_) => "OverflowError",
            ErrorValue::Inexact { .. } => "InexactError",
            ErrorValue::StackOverflow => "StackOverflowError",
            ErrorValue::Type { .. } => "TypeError",
            ErrorValue::Eof => "EOFError",
            ErrorValue::Assertion(_) => "AssertionError",
            ErrorValue::Message(_) => "ErrorException",
            ErrorValue::Load { .. } => "LoadError",
            ErrorValue::Iteration(err) => iteration_kind(err),
        }
    }

    /// Innermost error, looking through `Load` wrappers.
    pub fn root(&self) -> &ErrorValue {
        match self {
            ErrorValue::Load { error, .. } => error.root(),
            other => other,
        }
    }
}

fn iteration_kind(err: &IterError) -> &'static str {
    match err {
        IterError::InvalidArgument { .. } => "ArgumentError",
        IterError::UndefinedLength(_) | IterError::UnsupportedReverse(_) => "MethodError",
        IterError::EndOfSequence => "EOFError",
        IterError::OutOfBounds(_) => "BoundsError",
        IterError::ArithmeticOverflow(_) => "OverflowError",
    }
}

impl From<IterError> for ErrorValue {
    fn from(err: IterError) -> Self {
        ErrorValue::Iteration(err)
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorValue::Bounds { collection, index } => {
                write!(f, "BoundsError: attempt to access {}", collection)?;
                if let Some(index) = index {
                    write!(f, " at index [{}]", index)?;
                }
                Ok(())
            }
            ErrorValue::Argument(msg) => write!(f, "ArgumentError: {}", msg),
            ErrorValue::Key(key) => write!(f, "KeyError: key {} not found", key),
            ErrorValue::Domain { value, message } => {
                write!(f, "DomainError with {}:\n{}", value, message)
            }
            ErrorValue::Method { function, args } => {
                let args: Vec<String> = args.iter().map(|a| format!("::{}", a)).collect();
                write!(
                    f,
                    "MethodError: no method matching {}({})",
                    function,
                    args.join(", ")
                )
            }
            ErrorValue::UndefVar { name, scope } => {
                write!(f, "UndefVarError: `{}` not defined", name)?;
                if let Some(scope) = scope {
                    write!(f, " in `{}`", scope)?;
                }
                Ok(())
            }
            ErrorValue::Divide => f.write_str("DivideError: integer division error"),
            ErrorValue::Overflow(msg) => write!(f, "OverflowError: {}", msg),
            ErrorValue::Inexact {
                function,
                target,
                value,
            } => write!(f, "InexactError: {}({}, {})", function, target, value),
            ErrorValue::StackOverflow => f.write_str("StackOverflowError:"),
            ErrorValue::Type {
                function,
                context,
                expected,
                got,
            } => {
                write!(f, "TypeError: in {}, ", function)?;
                if let Some(context) = context {
                    write!(f, "in {}, ", context)?;
                }
                write!(f, "expected {}, got a value of type {}", expected, got)
            }
            ErrorValue::Eof => f.write_str("EOFError: read end of file"),
            ErrorValue::Assertion(msg) => write!(f, "AssertionError: {}", msg),
            ErrorValue::Message(msg) => f.write_str(msg),
            ErrorValue::Load { file, line, error } => write!(
                f,
                "LoadError: {}\nin expression starting at {}:{}",
                error, file, line
            ),
            ErrorValue::Iteration(err) => write!(f, "{}: {}", iteration_kind(err), err),
        }
    }
}

/// Failure while computing a hint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    /// The provider could not compute its hint.
    #[error("hint provider '{provider}' failed: {reason}")]
    Failed {
        /// Provider name.
        provider: String,
        /// What went wrong.
        reason: String,
    },

    /// An iterator operation used by the provider failed.
    #[error(transparent)]
    Iteration(#[from] IterError),
}

impl HintError {
    /// Helper for provider failures.
    pub fn failed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        HintError::Failed {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

/// Source of auxiliary text appended after the primary message.
pub trait HintProvider {
    /// Name used in logs.
    fn name(&self) -> &str {
        "hint"
    }

    /// Hint for `error`, `Ok(None)` when the provider has nothing to add.
    fn hint(&self, error: &ErrorValue) -> Result<Option<String>, HintError>;
}

impl<F> HintProvider for F
where
    F: Fn(&ErrorValue) -> Result<Option<String>, HintError>,
{
    fn hint(&self, error: &ErrorValue) -> Result<Option<String>, HintError> {
        self(error)
    }
}

/// Formats errors and collects hints.
#[derive(Default)]
pub struct ErrorFormatter {
    providers: Vec<Box<dyn HintProvider>>,
}

impl fmt::Debug for ErrorFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("ErrorFormatter")
            .field("providers", &names)
            .finish()
    }
}

impl ErrorFormatter {
    /// Formatter without hint providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hint provider; hints appear in registration order.
    pub fn with_provider<P: HintProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// The primary message.
    pub fn primary(&self, error: &ErrorValue) -> String {
        error.to_string()
    }

    /// Hints from every provider that succeeds.
    pub fn hints(&self, error: &ErrorValue) -> Vec<String> {
        let mut hints = Vec::new();
        for provider in &self.providers {
            match provider.hint(error) {
                Ok(Some(hint)) => hints.push(hint),
                Ok(None) => {}
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "hint omitted");
                }
            }
        }
        hints
    }

    /// Primary message followed by the hints, separated by blank lines.
    pub fn format(&self, error: &ErrorValue) -> String {
        let mut text = self.primary(error);
        for hint in self.hints(error) {
            text.push_str("\n\n");
            text.push_str(&hint);
        }
        text
    }

    /// Write `ERROR: <message>` plus hints to `sink`, ending with a newline.
    pub fn write_to(&self, error: &ErrorValue, sink: &mut dyn OutputSink) {
        sink.write_styled("ERROR: ", Style::colored(Color::Red).with_bold(true));
        sink.write_str(&self.primary(error));
        sink.write_str("\n");
        for hint in self.hints(error) {
            sink.write_str("\n");
            sink.write_styled(&hint, Style::colored(Color::LightBlack));
            sink.write_str("\n");
        }
    }
}

/// Known methods, used to suggest the closest candidates for a
/// [`ErrorValue::Method`] error.
#[derive(Debug, Clone)]
pub struct MethodCatalog {
    methods: Vec<Frame>,
    max_candidates: usize,
}

/// Default number of suggested candidates.
pub const DEFAULT_MAX_CANDIDATES: usize = 3;

impl Default for MethodCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CANDIDATES)
    }
}

impl MethodCatalog {
    /// Empty catalog suggesting at most `max_candidates` methods.
    pub fn new(max_candidates: usize) -> Self {
        Self {
            methods: Vec::new(),
            max_candidates,
        }
    }

    /// Register a method definition; the frame's function is the signature
    /// and its location is where the method was defined.
    pub fn register(&mut self, definition: Frame) {
        self.methods.push(definition);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_method(mut self, definition: Frame) -> Self {
        self.register(definition);
        self
    }

    /// Methods of `function` ranked by how many argument types they accept
    /// positionally, then by arity distance; ties keep registration order.
    pub fn candidates(&self, function: &str, args: &[String]) -> Vec<&Frame> {
        let mut ranked: Vec<(usize, usize, &Frame)> = self
            .methods
            .iter()
            .filter(|m| m.function.name == function)
            .map(|m| {
                let params = &m.function.params;
                let matching = params
                    .iter()
                    .zip(args)
                    .filter(|(p, a)| p == a || p.as_str() == "Any")
                    .count();
                (matching, params.len().abs_diff(args.len()), m)
            })
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked
            .into_iter()
            .take(self.max_candidates)
            .map(|(_, _, m)| m)
            .collect()
    }
}

impl HintProvider for MethodCatalog {
    fn name(&self) -> &str {
        "method-candidates"
    }

    fn hint(&self, error: &ErrorValue) -> Result<Option<String>, HintError> {
        let ErrorValue::Method { function, args } = error.root() else {
            return Ok(None);
        };
        let candidates = self.candidates(function, args);
        if candidates.is_empty() {
            return Ok(None);
        }
        let mut text = String::from("Closest candidates are:");
        for method in candidates {
            let params: Vec<String> = method
                .function
                .params
                .iter()
                .map(|p| format!("::{}", p))
                .collect();
            text.push_str(&format!("\n  {}({})", method.function.name, params.join(", ")));
            text.push_str("\n   @ ");
            if let Some(module) = method.module_name() {
                text.push_str(module);
                text.push(' ');
            }
            text.push_str(&format!("{}:{}", method.file, method.line));
        }
        Ok(Some(text))
    }
}
