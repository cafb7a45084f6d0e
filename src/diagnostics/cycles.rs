//! Detection of repeated frame blocks in long traces
//!
//! Deep recursion produces traces where the same block of frames repeats many
//! times. The detector keeps the first occurrence of such a block on display,
//! records how often it repeats, and skips the copies.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use super::config::DEFAULT_CYCLE_THRESHOLD;
use super::frame::FrameRun;

/// A repeated block, in displayed-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct CycleRecord {
    /// Index of the first displayed frame of the block.
    pub start: usize,
    /// Number of displayed frames the block occupies.
    pub span: usize,
    /// Length of one repetition in collapsed (input) frames.
    pub period: usize,
    /// Total number of occurrences, the displayed one included.
    pub repetitions: usize,
}

impl CycleRecord {
    /// One past the last displayed frame of the block.
    pub fn end(&self) -> usize {
        self.start + self.span
    }
}

/// A run that survived cycle compression.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct DisplayedFrame {
    /// The run itself.
    pub run: FrameRun,
    /// Index of the run in the collapsed input; numbering follows it so
    /// skipped repetitions still consume frame numbers.
    pub position: usize,
}

/// Detector output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct CycleReport {
    /// Runs to render, in order.
    pub displayed: Vec<DisplayedFrame>,
    /// Cycles sorted by `(start, -span)`: enclosing blocks first.
    pub cycles: Vec<CycleRecord>,
    /// Deepest simultaneous nesting of cycles.
    pub max_nested: usize,
    /// Length of the collapsed input.
    pub total_runs: usize,
}

impl CycleReport {
    /// Report that displays every run and has no cycles.
    pub fn uncompressed(runs: &[FrameRun]) -> Self {
        Self {
            displayed: runs
                .iter()
                .enumerate()
                .map(|(position, run)| DisplayedFrame {
                    run: run.clone(),
                    position,
                })
                .collect(),
            cycles: Vec::new(),
            max_nested: 0,
            total_runs: runs.len(),
        }
    }
}

/// Finds repeated blocks in a collapsed trace.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    threshold: usize,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_THRESHOLD)
    }
}

type Fingerprint = blake3::Hash;

fn fingerprint(run: &FrameRun) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();
    hasher.update(run.frame.to_string().as_bytes());
    hasher.update(&(run.count as u64).to_le_bytes());
    hasher.finalize()
}

/// Best repetition found at one input position.
struct Candidate {
    origin: usize,
    displayed_start: usize,
    period: usize,
    extra: usize,
}

impl CycleDetector {
    /// Detector that only runs on traces longer than `threshold` runs.
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Minimum trace length (exclusive) that triggers detection.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Compress `runs` if it is longer than the threshold; otherwise display
    /// everything unchanged.
    pub fn detect(&self, runs: &[FrameRun]) -> CycleReport {
        if runs.len() > self.threshold {
            self.find_cycles(runs)
        } else {
            CycleReport::uncompressed(runs)
        }
    }

    /// Unconditional detection.
    ///
    /// Every displayed run is indexed by fingerprint. At each input position,
    /// earlier occurrences of the same run are tried most recent first; the
    /// block between that occurrence and here is extended forward one whole
    /// period at a time, and the occurrence covering the most repeated input
    /// wins. A block may not start strictly inside an already recorded cycle,
    /// so brackets always nest.
    pub fn find_cycles(&self, runs: &[FrameRun]) -> CycleReport {
        let mut seen: HashMap<Fingerprint, Vec<(usize, usize)>> = HashMap::new();
        let mut displayed: Vec<DisplayedFrame> = Vec::new();
        let mut cycles: Vec<CycleRecord> = Vec::new();

        let mut pos = 0;
        while pos < runs.len() {
            let key = fingerprint(&runs[pos]);
            let best = seen
                .get(&key)
                .and_then(|earlier| best_candidate(runs, pos, earlier, &cycles));

            if let Some(found) = best {
                cycles.push(CycleRecord {
                    start: found.displayed_start,
                    span: displayed.len() - found.displayed_start,
                    period: found.period,
                    repetitions: found.extra + 1,
                });
                debug!(
                    origin = found.origin,
                    period = found.period,
                    repetitions = found.extra + 1,
                    "repeated frame block"
                );
                pos += found.extra * found.period;
                continue;
            }

            seen.entry(key).or_default().push((pos, displayed.len()));
            displayed.push(DisplayedFrame {
                run: runs[pos].clone(),
                position: pos,
            });
            pos += 1;
        }

        cycles.sort_by_key(|c| (c.start, Reverse(c.span)));
        let max_nested = max_nesting(&cycles);
        debug!(
            input = runs.len(),
            displayed = displayed.len(),
            cycles = cycles.len(),
            max_nested,
            "cycle detection finished"
        );
        CycleReport {
            displayed,
            cycles,
            max_nested,
            total_runs: runs.len(),
        }
    }
}

fn best_candidate(
    runs: &[FrameRun],
    pos: usize,
    earlier: &[(usize, usize)],
    cycles: &[CycleRecord],
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for &(origin, displayed_start) in earlier.iter().rev() {
        if cycles
            .iter()
            .any(|c| c.start < displayed_start && displayed_start < c.end())
        {
            continue;
        }
        let period = pos - origin;
        let block = &runs[origin..pos];
        let extra = runs[pos..]
            .chunks_exact(period)
            .take_while(|chunk| *chunk == block)
            .count();
        if extra == 0 {
            continue;
        }
        let better = best
            .as_ref()
            .map_or(true, |b| extra * period > b.extra * b.period);
        if better {
            best = Some(Candidate {
                origin,
                displayed_start,
                period,
                extra,
            });
        }
    }
    best
}

/// Deepest stack of simultaneously open cycles, for cycles sorted by
/// `(start, -span)`.
fn max_nesting(cycles: &[CycleRecord]) -> usize {
    let mut open: Vec<usize> = Vec::new();
    let mut deepest = 0;
    for cycle in cycles {
        while open.last().is_some_and(|&end| end <= cycle.start) {
            open.pop();
        }
        open.push(cycle.end());
        deepest = deepest.max(open.len());
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::frame::{Frame, FunctionDescriptor};

    fn run(name: &str) -> FrameRun {
        FrameRun::single(Frame::new(
            FunctionDescriptor::new(name, Vec::<String>::new()),
            "t.jl",
            1,
        ))
    }

    fn runs(names: &[&str]) -> Vec<FrameRun> {
        names.iter().map(|n| run(n)).collect()
    }

    fn shown(report: &CycleReport) -> Vec<String> {
        report
            .displayed
            .iter()
            .map(|d| d.run.frame.function.name.clone())
            .collect()
    }

    #[test]
    fn short_traces_are_left_alone() {
        let trace = runs(&["a", "b", "a", "b"]);
        let report = CycleDetector::new(50).detect(&trace);
        assert!(report.cycles.is_empty());
        assert_eq!(report.displayed.len(), 4);
    }

    #[test]
    fn simple_repeat() {
        let trace = runs(&["x", "a", "b", "a", "b", "a", "b", "y"]);
        let report = CycleDetector::new(0).detect(&trace);
        assert_eq!(shown(&report), vec!["x", "a", "b", "y"]);
        assert_eq!(
            report.cycles,
            vec![CycleRecord {
                start: 1,
                span: 2,
                period: 2,
                repetitions: 3
            }]
        );
        assert_eq!(report.max_nested, 1);
        assert_eq!(report.displayed[3].position, 7);
    }

    #[test]
    fn prefers_the_longest_covered_repeat() {
        // at the fourth frame "a" repeats with period 1 (covering one frame)
        // and with period 3 (covering three)
        let trace = runs(&["a", "b", "a", "a", "b", "a"]);
        let report = CycleDetector::new(0).detect(&trace);
        assert_eq!(shown(&report), vec!["a", "b", "a"]);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].period, 3);
        assert_eq!(report.cycles[0].repetitions, 2);
    }

    #[test]
    fn nested_cycles_are_sorted_outer_first() {
        // outer block: p q q q r, repeated twice
        let trace = runs(&["p", "q", "q", "q", "r", "p", "q", "q", "q", "r"]);
        let report = CycleDetector::new(0).detect(&trace);
        assert_eq!(shown(&report), vec!["p", "q", "r"]);
        assert_eq!(report.cycles.len(), 2);
        assert_eq!(report.cycles[0].start, 0);
        assert_eq!(report.cycles[0].span, 3);
        assert_eq!(report.cycles[0].repetitions, 2);
        assert_eq!(report.cycles[1].start, 1);
        assert_eq!(report.cycles[1].span, 1);
        assert_eq!(report.cycles[1].repetitions, 3);
        assert_eq!(report.max_nested, 2);
    }

    #[test]
    fn embedded_period_five_block() {
        let mut names: Vec<String> = (0..75).map(|i| format!("pre{}", i)).collect();
        for _ in 0..10 {
            names.extend((0..5).map(|i| format!("loop{}", i)));
        }
        names.extend((0..75).map(|i| format!("post{}", i)));
        let trace: Vec<FrameRun> = names.iter().map(|n| run(n)).collect();
        assert_eq!(trace.len(), 200);

        let report = CycleDetector::default().detect(&trace);
        assert_eq!(
            report.cycles,
            vec![CycleRecord {
                start: 75,
                span: 5,
                period: 5,
                repetitions: 10
            }]
        );
        assert_eq!(report.displayed.len(), 155);
        assert_eq!(report.total_runs, 200);
    }
}
