//! Optimal line break selection
//!
//! This module chooses the break set that minimizes a global cost over the
//! candidate sequence produced by
//! [`populate_candidates`](crate::candidates::populate_candidates).
//!
//! # Algorithm
//!
//! The candidates form a DAG: every candidate is both a possible end of
//! one line and the start of the next, so the optimum is a single-source
//! shortest path computed by dynamic programming. For each candidate `i`
//! the algorithm scans previous candidates `j` as potential starts of the
//! line ending at `i`, scoring the line by its squared slack plus any
//! break penalties, and keeps the cheapest predecessor.
//!
//! Two prunings keep the inner scan short without changing the result:
//!
//! - An **active frontier**: once a line from `j` to `i` is overfull it
//!   stays overfull for every later `i` (line widths grow with `i` because
//!   `post_break` is non-decreasing), so `j` is dropped from the scan for
//!   good.
//! - **bestHope**: once `delta` is non-negative the width score grows
//!   monotonically as `j` advances at a fixed line width, so a running
//!   lower bound lets whole suffixes of the scan be skipped.
//!
//! Overfull lines are never an error; they score `SCORE_OVERFULL` and
//! survive only when nothing cheaper exists. In justified mode a slightly
//! overfull line can instead pay the shrink penalty if its word spaces can
//! absorb the deficit (up to a third of a space each).

use crate::candidates::{OptimizeContext, SCORE_INFTY, SCORE_OVERFULL};
use crate::error::Result;
use crate::hyphen::{
    edit_for_next_line, edit_for_this_line, pack_hyphen_edit, HyphenEdit, HyphenationFrequency,
};
use crate::measure::{LineWidth, MeasuredText, VerticalExtent};
use crate::word_break::{UaxWordBreaker, WordBreaker};

// Multiplier for the hyphen penalty on the last line.
const LAST_LINE_PENALTY_MULTIPLIER: f32 = 4.0;

// Penalty assigned to shrinking the whitespace.
const SHRINK_PENALTY_MULTIPLIER: f32 = 4.0;

// Maximum fraction by which a word space can shrink in justified text.
const SHRINKABILITY: f32 = 1.0 / 3.0;

/// Strategy for distributing text across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakStrategy {
    /// First-fit, one pass. Not handled by the optimal breaker; when
    /// passed here it behaves like `HighQuality`.
    Greedy,

    /// Minimize the variance of line lengths, including the last line.
    Balanced,

    /// Minimize raggedness but leave the last line out of the width score.
    HighQuality,
}

/// Chosen line breaks, as parallel arrays with one entry per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBreakResult {
    /// Exclusive end offset of each line, in code units.
    pub break_points: Vec<u32>,

    /// Measured width of each line, trailing whitespace excluded and any
    /// hyphen edit included.
    pub widths: Vec<f32>,

    /// Maximum ascent over each line.
    pub ascents: Vec<f32>,

    /// Maximum descent over each line.
    pub descents: Vec<f32>,

    /// Packed start/end hyphen edits for each line; see
    /// [`pack_hyphen_edit`].
    pub flags: Vec<HyphenEdit>,
}

impl LineBreakResult {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.break_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.break_points.is_empty()
    }

    fn reverse(&mut self) {
        self.break_points.reverse();
        self.widths.reverse();
        self.ascents.reverse();
        self.descents.reverse();
        self.flags.reverse();
    }
}

// Per-candidate DP state.
struct OptimalBreaksData {
    // Best score found for breaking here.
    score: f32,

    // Index of the previous break on the best path.
    prev: u32,

    // Line number of this break on the best path.
    line_number: u32,
}

// The needed extent over [start, end) of the source string.
fn compute_max_extent(measured: &MeasuredText, start: u32, end: u32) -> VerticalExtent {
    let mut result = VerticalExtent::default();
    for extent in &measured.extents[start as usize..end as usize] {
        result.extend_by(extent);
    }
    result
}

// Follow prev links back from the last candidate and copy each hop into
// the result arrays.
fn finish_breaks(
    measured: &MeasuredText,
    breaks_data: &[OptimalBreaksData],
    context: &OptimizeContext,
) -> LineBreakResult {
    let candidates = &context.candidates;
    let mut result = LineBreakResult::default();
    let mut i = candidates.len() - 1;
    while i > 0 {
        let prev_index = breaks_data[i].prev as usize;
        let cand = &candidates[i];
        let prev = &candidates[prev_index];

        result.break_points.push(cand.offset);
        result.widths.push((cand.post_break - prev.pre_break) as f32);
        let extent = compute_max_extent(measured, prev.offset, cand.offset);
        result.ascents.push(extent.ascent);
        result.descents.push(extent.descent);
        result.flags.push(pack_hyphen_edit(
            edit_for_next_line(prev.hyphen_type),
            edit_for_this_line(cand.hyphen_type),
        ));

        i = prev_index;
    }
    result.reverse();
    result
}

/// Run the dynamic program over an [`OptimizeContext`] and reconstruct the
/// chosen lines.
pub fn compute_optimal_breaks(
    context: &OptimizeContext,
    measured: &MeasuredText,
    line_width: &dyn LineWidth,
    strategy: BreakStrategy,
    justified: bool,
) -> LineBreakResult {
    let candidates = &context.candidates;
    let n_cand = candidates.len();
    if n_cand < 2 {
        // Only the sentinel: no breakable content.
        return LineBreakResult::default();
    }

    let max_shrink = if justified {
        SHRINKABILITY * context.space_width
    } else {
        0.0
    };

    let mut breaks_data: Vec<OptimalBreaksData> = Vec::with_capacity(n_cand);
    breaks_data.push(OptimalBreaksData {
        score: 0.0,
        prev: 0,
        line_number: 0,
    });
    let mut active = 0usize;

    // "i" iterates through candidates for the end of the line.
    for i in 1..n_cand {
        let at_end = i == n_cand - 1;
        let mut best = SCORE_INFTY;
        let mut best_prev = 0usize;

        let mut line_number_last = breaks_data[active].line_number;
        let mut width = line_width.at(line_number_last);
        let mut left_edge = candidates[i].post_break - f64::from(width);
        let mut best_hope = 0.0f32;

        // "j" iterates through candidates for the beginning of the line.
        for j in active..i {
            let line_number = breaks_data[j].line_number;
            if line_number != line_number_last {
                let width_new = line_width.at(line_number);
                if width_new != width {
                    width = width_new;
                    left_edge = candidates[i].post_break - f64::from(width);
                    best_hope = 0.0;
                }
                line_number_last = line_number;
            }
            let j_score = breaks_data[j].score;
            if j_score + best_hope >= best {
                continue;
            }
            let delta = (candidates[j].pre_break - left_edge) as f32;

            // Width score for the line from j to i. bestHope assumes the
            // width score grows monotonically across successive j once
            // delta is non-negative.
            let mut width_score = 0.0f32;
            let mut additional_penalty = 0.0f32;
            if (at_end || !justified) && delta < 0.0 {
                width_score = SCORE_OVERFULL;
            } else if at_end && strategy != BreakStrategy::Balanced {
                // Increase penalty for a hyphen on the last line.
                additional_penalty = LAST_LINE_PENALTY_MULTIPLIER * candidates[j].penalty;
            } else {
                width_score = delta * delta;
                if delta < 0.0 {
                    let shrinkable = max_shrink
                        * (candidates[i].post_space_count as f32
                            - candidates[j].pre_space_count as f32);
                    if -delta < shrinkable {
                        width_score *= SHRINK_PENALTY_MULTIPLIER;
                    } else {
                        width_score = SCORE_OVERFULL;
                    }
                }
            }

            if delta < 0.0 {
                active = j + 1;
            } else {
                best_hope = width_score;
            }

            let score = j_score + width_score + additional_penalty;
            if score <= best {
                best = score;
                best_prev = j;
            }
        }
        breaks_data.push(OptimalBreaksData {
            score: best + candidates[i].penalty + context.line_penalty,
            prev: best_prev as u32,
            line_number: breaks_data[best_prev].line_number + 1,
        });
    }
    finish_breaks(measured, &breaks_data, context)
}

/// Break a measured paragraph into lines with minimal global cost.
///
/// Word boundaries come from the built-in UAX #14 breaker; use
/// [`break_line_optimal_with_breaker`] to supply a tailored one.
///
/// # Errors
///
/// Fails if the text contains a TAB (see
/// [`BreakError::UnsupportedChar`](crate::error::BreakError)).
pub fn break_line_optimal(
    text: &[u16],
    measured: &MeasuredText,
    line_width: &dyn LineWidth,
    strategy: BreakStrategy,
    frequency: HyphenationFrequency,
    justified: bool,
) -> Result<LineBreakResult> {
    let mut breaker = UaxWordBreaker::new();
    break_line_optimal_with_breaker(
        text, measured, line_width, strategy, frequency, justified, &mut breaker,
    )
}

/// [`break_line_optimal`] with a caller-provided word boundary iterator.
#[allow(clippy::too_many_arguments)]
pub fn break_line_optimal_with_breaker(
    text: &[u16],
    measured: &MeasuredText,
    line_width: &dyn LineWidth,
    strategy: BreakStrategy,
    frequency: HyphenationFrequency,
    justified: bool,
    breaker: &mut dyn WordBreaker,
) -> Result<LineBreakResult> {
    if text.is_empty() {
        return Ok(LineBreakResult::default());
    }
    let context = crate::candidates::populate_candidates(
        text, measured, line_width, frequency, justified, breaker,
    )?;
    Ok(compute_optimal_breaks(
        &context, measured, line_width, strategy, justified,
    ))
}
