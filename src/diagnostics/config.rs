//! Pipeline configuration

use thiserror::Error;

use super::sink::Color;

/// Collapsed traces longer than this go through cycle detection.
pub const DEFAULT_CYCLE_THRESHOLD: usize = 50;

/// How many frames before a loader entry frame are searched for its `eval`.
pub const DEFAULT_LOADER_LOOKBACK: usize = 5;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A setting is out of range.
    #[error("invalid diagnostics configuration: {0}")]
    Invalid(String),
}

/// Settings for [`FrameCollapser`](super::FrameCollapser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseConfig {
    /// Keep at most this many raw frames (after native filtering).
    pub max_frames: Option<usize>,
    /// Drop frames from native code.
    pub skip_native: bool,
    /// Function names of dispatch wrappers that never carry user context.
    pub noise_functions: Vec<String>,
    /// Function names that start a file load.
    pub loader_entry: Vec<String>,
    /// Function names that evaluate loaded code.
    pub loader_exit: Vec<String>,
    /// Modules whose frames count as runtime internals for loader detection.
    pub internal_modules: Vec<String>,
    /// Frames searched before a loader entry for its matching exit.
    pub loader_lookback: usize,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            max_frames: None,
            skip_native: true,
            noise_functions: vec!["kwcall".to_string(), "invokelatest".to_string()],
            loader_entry: vec!["_include".to_string(), "include_string".to_string()],
            loader_exit: vec!["eval".to_string()],
            internal_modules: vec!["Base".to_string(), "Core".to_string()],
            loader_lookback: DEFAULT_LOADER_LOOKBACK,
        }
    }
}

impl CollapseConfig {
    /// Limit the number of raw frames considered.
    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Keep or drop native frames.
    pub fn with_skip_native(mut self, enabled: bool) -> Self {
        self.skip_native = enabled;
        self
    }

    /// Replace the noise function list.
    pub fn with_noise_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.noise_functions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the loader lookback window; must be at least one frame.
    pub fn with_loader_lookback(mut self, frames: usize) -> Result<Self, ConfigError> {
        if frames == 0 {
            return Err(ConfigError::Invalid(
                "loader lookback must be > 0".to_string(),
            ));
        }
        self.loader_lookback = frames;
        Ok(self)
    }

    pub(crate) fn is_noise(&self, function: &str) -> bool {
        self.noise_functions.iter().any(|n| n == function)
    }

    pub(crate) fn is_loader_entry(&self, function: &str) -> bool {
        self.loader_entry.iter().any(|n| n == function)
    }

    pub(crate) fn is_loader_exit(&self, function: &str) -> bool {
        self.loader_exit.iter().any(|n| n == function)
    }

    pub(crate) fn is_internal(&self, module: &str) -> bool {
        self.internal_modules.iter().any(|m| m == module)
    }
}

/// Settings for rendering a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Collapsed traces longer than this are searched for cycles.
    pub cycle_threshold: usize,
    /// Blank line between frame blocks.
    pub line_breaks: bool,
    /// Colour module names (rotating palette per module).
    pub module_colors: bool,
    /// Palette used for module colours.
    pub palette: Vec<Color>,
    /// Collapse settings applied before rendering.
    pub collapse: CollapseConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cycle_threshold: DEFAULT_CYCLE_THRESHOLD,
            line_breaks: false,
            module_colors: true,
            palette: vec![
                Color::LightCyan,
                Color::LightGreen,
                Color::LightYellow,
                Color::LightMagenta,
                Color::LightBlue,
                Color::Cyan,
                Color::Green,
                Color::Yellow,
                Color::Magenta,
            ],
            collapse: CollapseConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Change the cycle detection threshold.
    pub fn with_cycle_threshold(mut self, frames: usize) -> Self {
        self.cycle_threshold = frames;
        self
    }

    /// Separate frame blocks with blank lines.
    pub fn with_line_breaks(mut self, enabled: bool) -> Self {
        self.line_breaks = enabled;
        self
    }

    /// Toggle module colouring.
    pub fn with_module_colors(mut self, enabled: bool) -> Self {
        self.module_colors = enabled;
        self
    }

    /// Replace the module palette; it must not be empty.
    pub fn with_palette(mut self, palette: Vec<Color>) -> Result<Self, ConfigError> {
        if palette.is_empty() {
            return Err(ConfigError::Invalid("palette must not be empty".to_string()));
        }
        self.palette = palette;
        Ok(self)
    }

    /// Replace the collapse settings.
    pub fn with_collapse(mut self, collapse: CollapseConfig) -> Self {
        self.collapse = collapse;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_runtime_constants() {
        let config = RenderConfig::default();
        assert_eq!(config.cycle_threshold, 50);
        assert_eq!(config.collapse.loader_lookback, 5);
        assert!(config.collapse.is_noise("kwcall"));
        assert!(config.collapse.is_internal("Base"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(CollapseConfig::default().with_loader_lookback(0).is_err());
        assert!(RenderConfig::default().with_palette(Vec::new()).is_err());
    }
}
