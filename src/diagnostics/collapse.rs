//! Frame collapsing: run-length merging and noise removal
//!
//! Every pass maps a `(frame, count)` sequence to a shorter one and keeps the
//! innermost-first order of the input.

use tracing::trace;

use super::config::CollapseConfig;
use super::frame::{Frame, FrameRun};

/// Turns a raw frame sequence into the runs that are displayed.
#[derive(Debug, Clone, Default)]
pub struct FrameCollapser {
    config: CollapseConfig,
}

impl FrameCollapser {
    /// Collapser with the given settings.
    pub fn new(config: CollapseConfig) -> Self {
        Self { config }
    }

    /// Active settings.
    pub fn config(&self) -> &CollapseConfig {
        &self.config
    }

    /// Apply every pass in order: frame selection, run-length merging, noise
    /// removal, loader simplification and wrapper-pair collapsing.
    pub fn collapse(&self, frames: &[Frame]) -> Vec<FrameRun> {
        let selected = self.select(frames);
        let runs = run_length(selected);
        let runs = self.remove_noise(runs);
        let runs = self.simplify_loader_frames(runs);
        let runs = collapse_wrapper_pairs(runs);
        // removals can leave equal runs next to each other
        merge_adjacent(runs)
    }

    /// Drop native frames (when configured) and honour `max_frames`.
    pub fn select<'a>(&self, frames: &'a [Frame]) -> Vec<&'a Frame> {
        let limit = self.config.max_frames.unwrap_or(usize::MAX);
        let selected: Vec<&Frame> = frames
            .iter()
            .filter(|f| !(self.config.skip_native && f.native))
            .take(limit)
            .collect();
        trace!(raw = frames.len(), selected = selected.len(), "frame selection");
        selected
    }

    /// Remove dispatch-wrapper frames that carry no user context.
    pub fn remove_noise(&self, runs: Vec<FrameRun>) -> Vec<FrameRun> {
        let before = runs.len();
        let kept: Vec<FrameRun> = runs
            .into_iter()
            .filter(|run| !self.config.is_noise(&run.frame.function.name))
            .collect();
        trace!(before, after = kept.len(), "noise removal");
        kept
    }

    /// Hide file-loading machinery.
    ///
    /// Scanning from the outermost frame inwards, a loader entry frame in an
    /// internal module opens a hidden range. The range closes (and is hidden)
    /// at an `eval` frame found within the lookback window while every frame
    /// in between is internal (or has no module). Any other frame bails out
    /// and keeps everything. A range still open at the innermost frame hides
    /// everything up to its entry frame.
    pub fn simplify_loader_frames(&self, runs: Vec<FrameRun>) -> Vec<FrameRun> {
        let mut keep = vec![true; runs.len()];
        let mut open: Option<usize> = None;
        for i in (0..runs.len()).rev() {
            let frame = &runs[i].frame;
            let internal = frame.module_name().map_or(true, |m| self.config.is_internal(m));
            match open {
                None => {
                    if frame.module_name().is_some_and(|m| self.config.is_internal(m))
                        && self.config.is_loader_entry(&frame.function.name)
                    {
                        open = Some(i);
                    }
                }
                Some(entry) => {
                    if internal && entry - i < self.config.loader_lookback {
                        if self.config.is_loader_exit(&frame.function.name) {
                            keep[i..=entry].iter_mut().for_each(|k| *k = false);
                            open = None;
                        }
                    } else {
                        open = None;
                    }
                }
            }
        }
        if let Some(entry) = open {
            keep[..=entry].iter_mut().for_each(|k| *k = false);
        }
        let before = runs.len();
        let kept: Vec<FrameRun> = runs
            .into_iter()
            .zip(keep)
            .filter_map(|(run, keep)| keep.then_some(run))
            .collect();
        trace!(before, after = kept.len(), "loader simplification");
        kept
    }
}

/// Merge maximal runs of consecutive identical frames.
pub fn run_length<'a, I>(frames: I) -> Vec<FrameRun>
where
    I: IntoIterator<Item = &'a Frame>,
{
    let mut runs: Vec<FrameRun> = Vec::new();
    for frame in frames {
        match runs.last_mut() {
            Some(last) if last.frame == *frame => last.count += 1,
            _ => runs.push(FrameRun::single(frame.clone())),
        }
    }
    runs
}

fn merge_adjacent(runs: Vec<FrameRun>) -> Vec<FrameRun> {
    let mut merged: Vec<FrameRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if last.frame == run.frame => last.count += run.count,
            _ => merged.push(run),
        }
    }
    merged
}

/// Collapse pairs of frames reported at the same source location where one
/// of them is an artefact of the calling convention:
///
/// - a compiler-generated body (`#f#3`) directly inside its wrapper: the body
///   is dropped;
/// - a keyword-sugar frame whose positional signature equals the next frame's
///   signature: the outer (desugared) frame is dropped;
/// - a default-argument wrapper whose signature is a strict prefix of the
///   frame it forwards to: the wrapper is dropped.
pub fn collapse_wrapper_pairs(runs: Vec<FrameRun>) -> Vec<FrameRun> {
    let mut keep = vec![true; runs.len()];
    for i in 1..runs.len() {
        let (prev, cur) = (&runs[i - 1].frame, &runs[i].frame);
        if !cur.same_location(prev) {
            continue;
        }
        if prev.function.is_generated() {
            keep[i - 1] = false;
        }
        if !prev.function.keywords.is_empty() && prev.function.params == cur.function.params {
            keep[i] = false;
        }
        if prev.function.params.len() > cur.function.params.len()
            && prev.function.params.starts_with(&cur.function.params)
        {
            keep[i] = false;
        }
    }
    let before = runs.len();
    let kept: Vec<FrameRun> = runs
        .into_iter()
        .zip(keep)
        .filter_map(|(run, keep)| keep.then_some(run))
        .collect();
    trace!(before, after = kept.len(), "wrapper pair collapsing");
    kept
}
