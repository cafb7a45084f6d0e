//! Stack frame records and the tab-separated trace format
//!
//! One frame per line:
//!
//! ```text
//! name(P1, P2; K1)<TAB>file:line<TAB>Module|-[<TAB>inlined,native]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored by [`parse_trace`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// Failures while reading a textual trace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameParseError {
    /// A required tab-separated column is absent.
    #[error("missing {0} column")]
    MissingField(&'static str),

    /// The function signature is malformed.
    #[error("malformed function signature '{0}'")]
    InvalidSignature(String),

    /// The `file:line` column is malformed.
    #[error("malformed location '{0}', expected file:line")]
    InvalidLocation(String),

    /// The flags column contains something other than `inlined`/`native`.
    #[error("unknown frame flag '{0}'")]
    UnknownFlag(String),

    /// Wraps an error with the 1-based line it occurred on.
    #[error("line {line}: {source}")]
    AtLine {
        /// Line number in the input.
        line: usize,
        /// Underlying failure.
        #[source]
        source: Box<FrameParseError>,
    },
}

/// Identity of the module owning a frame. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(Arc<str>);

impl ModuleId {
    /// Module with the given name.
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Module name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "visualize")]
impl serde::Serialize for ModuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Function name plus the declared parameter types of the called method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct FunctionDescriptor {
    /// Function name; compiler-generated bodies start with `#`.
    pub name: String,
    /// Positional parameter types.
    pub params: Vec<String>,
    /// Keyword parameter types (non-empty for keyword-sugar wrappers).
    pub keywords: Vec<String>,
}

impl FunctionDescriptor {
    /// Descriptor with positional parameters only.
    pub fn new<I, S>(name: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            params: params.into_iter().map(Into::into).collect(),
            keywords: Vec::new(),
        }
    }

    /// Add keyword parameter types.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the name marks a compiler-generated body.
    pub fn is_generated(&self) -> bool {
        self.name.starts_with('#')
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}", self.name, self.params.join(", "))?;
        if !self.keywords.is_empty() {
            write!(f, "; {}", self.keywords.join(", "))?;
        }
        f.write_str(")")
    }
}

impl FromStr for FunctionDescriptor {
    type Err = FrameParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let invalid = || FrameParseError::InvalidSignature(text.to_string());
        let Some(open) = text.find('(') else {
            if text.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::new(text, Vec::<String>::new()));
        };
        let name = &text[..open];
        let args = text[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }
        let (positional, keywords) = match split_top_level(args, ';').as_slice() {
            [positional] => (*positional, ""),
            [positional, keywords] => (*positional, *keywords),
            _ => return Err(invalid()),
        };
        Ok(Self {
            name: name.to_string(),
            params: split_params(positional),
            keywords: split_params(keywords),
        })
    }
}

/// Split on `sep` outside of any bracket pair.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut begin = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[begin..i]);
                begin = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[begin..]);
    parts
}

fn split_params(text: &str) -> Vec<String> {
    split_top_level(text, ',')
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// One stack frame as supplied by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Frame {
    /// Source file.
    pub file: String,
    /// Source line.
    pub line: u32,
    /// Called method.
    pub function: FunctionDescriptor,
    /// Owning module, when known.
    pub module: Option<ModuleId>,
    /// Inlined into its caller.
    pub inlined: bool,
    /// Native (non-managed) code.
    pub native: bool,
}

impl Frame {
    /// Managed, non-inlined frame without a module.
    pub fn new(function: FunctionDescriptor, file: &str, line: u32) -> Self {
        Self {
            file: file.to_string(),
            line,
            function,
            module: None,
            inlined: false,
            native: false,
        }
    }

    /// Set the owning module.
    pub fn with_module(mut self, module: ModuleId) -> Self {
        self.module = Some(module);
        self
    }

    /// Mark as inlined.
    pub fn with_inlined(mut self, inlined: bool) -> Self {
        self.inlined = inlined;
        self
    }

    /// Mark as native.
    pub fn with_native(mut self, native: bool) -> Self {
        self.native = native;
        self
    }

    /// Same source location (file and line).
    pub fn same_location(&self, other: &Frame) -> bool {
        self.line == other.line && self.file == other.file
    }

    /// Module name, if any.
    pub fn module_name(&self) -> Option<&str> {
        self.module.as_ref().map(ModuleId::as_str)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}:{}\t{}",
            self.function,
            self.file,
            self.line,
            self.module_name().unwrap_or("-")
        )?;
        let flags: Vec<&str> = [(self.inlined, "inlined"), (self.native, "native")]
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
            .collect();
        if !flags.is_empty() {
            write!(f, "\t{}", flags.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for Frame {
    type Err = FrameParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut columns = text.split('\t');
        let signature = columns
            .next()
            .filter(|c| !c.trim().is_empty())
            .ok_or(FrameParseError::MissingField("function"))?;
        let location = columns
            .next()
            .ok_or(FrameParseError::MissingField("location"))?
            .trim();
        let module = columns
            .next()
            .ok_or(FrameParseError::MissingField("module"))?
            .trim();

        let (file, line) = location
            .rsplit_once(':')
            .and_then(|(file, line)| Some((file, line.parse::<u32>().ok()?)))
            .filter(|(file, _)| !file.is_empty())
            .ok_or_else(|| FrameParseError::InvalidLocation(location.to_string()))?;

        let mut frame = Frame::new(signature.parse()?, file, line);
        if module != "-" && !module.is_empty() {
            frame.module = Some(ModuleId::new(module));
        }
        for flag in columns.flat_map(|c| c.split(',')).map(str::trim) {
            match flag {
                "" => {}
                "inlined" => frame.inlined = true,
                "native" => frame.native = true,
                other => return Err(FrameParseError::UnknownFlag(other.to_string())),
            }
        }
        Ok(frame)
    }
}

/// Parse a whole trace, innermost frame first.
pub fn parse_trace(text: &str) -> Result<Vec<Frame>, FrameParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            line.parse::<Frame>().map_err(|err| FrameParseError::AtLine {
                line: idx + 1,
                source: Box::new(err),
            })
        })
        .collect()
}

/// A frame together with the number of consecutive times it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct FrameRun {
    /// The repeated frame.
    pub frame: Frame,
    /// Consecutive occurrences (at least 1).
    pub count: usize,
}

impl FrameRun {
    /// A single occurrence.
    pub fn single(frame: Frame) -> Self {
        Self { frame, count: 1 }
    }
}
