//! Break candidate enumeration
//!
//! This module scans a measured paragraph once and emits the ordered
//! sequence of admissible break candidates the optimizer works over:
//!
//! - **Word breaks** at boundaries reported by the
//!   [`WordBreaker`](crate::word_break::WordBreaker).
//! - **Hyphenation breaks** inside words, when the run allows them, with
//!   both sub-piece widths measured through the run (a hyphenated piece is
//!   reshaped, so its width is not just a sum of advances).
//! - **Desperate breaks** at every grapheme boundary of a word that cannot
//!   fit the narrowest line by itself.
//!
//! Each candidate carries two cumulative widths: `pre_break` (width of the
//! paragraph up to the candidate if the line does NOT end here) and
//! `post_break` (the width if it does, with line-end whitespace dropped).
//! The width of a line between candidates `i < j` is then simply
//! `candidates[j].post_break - candidates[i].pre_break`, which is what
//! makes the downstream dynamic program cheap.
//!
//! When a hyphenation break and a desperate break land on the same offset,
//! the desperate one is emitted first: it contributes no hyphen width, so
//! it is the strictly shorter line, and the optimizer's pruning relies on
//! `post_break` being non-decreasing in candidate order.

use crate::error::{BreakError, Result};
use crate::hyphen::{
    edit_for_next_line, edit_for_this_line, EndHyphenEdit, HyphenationFrequency, HyphenationType,
    Hyphenator, HyphenatorMap, StartHyphenEdit,
};
use crate::locale::{LocaleListRegistry, INVALID_LOCALE_LIST_ID};
use crate::measure::{
    is_line_end_space, is_word_space, LineWidth, MeasuredText, Range, Run, CHAR_TAB,
};
use crate::word_break::WordBreaker;
use std::sync::Arc;

// Large scores in a hierarchy; a desperate break is preferred to an
// overfull line. All of these are larger than any realistic width score.
pub(crate) const SCORE_INFTY: f32 = f32::MAX;
pub(crate) const SCORE_OVERFULL: f32 = 1e12;
pub(crate) const SCORE_DESPERATE: f32 = 1e10;

// Each line costs this multiple of the hyphen penalty, to keep the line
// count down in ragged-right mode.
const LINE_PENALTY_MULTIPLIER: f32 = 2.0;

/// A single break candidate.
///
/// Cumulative widths are `f64`: precision must hold up over very long
/// paragraphs where per-line `f32` would drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Offset into the text buffer, in code units. The line ending at this
    /// candidate excludes the offset itself.
    pub offset: u32,

    /// Paragraph width up to this point if the line does not break here.
    pub pre_break: f64,

    /// Paragraph width up to this point if the line does break here
    /// (trailing line-end whitespace excluded).
    pub post_break: f64,

    /// Additive cost of using this break (e.g. hyphen penalty).
    pub penalty: f32,

    /// Word spaces before this candidate, counting any trailing ones.
    pub pre_space_count: u32,

    /// Word spaces before this candidate, not counting trailing ones that
    /// disappear when the line breaks here.
    pub post_space_count: u32,

    /// The kind of break, including any hyphen edits it implies.
    pub hyphen_type: HyphenationType,

    /// Direction of the bidi run containing or ending in this candidate.
    pub is_rtl: bool,
}

/// The candidate sequence plus the paragraph-level scalars the optimizer
/// needs.
#[derive(Debug, Clone)]
pub struct OptimizeContext {
    /// The break candidates, starting with a synthetic sentinel at
    /// offset 0.
    pub candidates: Vec<Candidate>,

    /// Penalty added per line; the maximum across run contributions.
    pub line_penalty: f32,

    /// One representative word-space advance, for shrink calculations.
    /// Zero if the paragraph has no spaces; if runs disagree, the last
    /// observed width wins.
    pub space_width: f32,
}

impl OptimizeContext {
    /// Create a context holding only the sentinel candidate.
    pub fn new() -> Self {
        Self {
            candidates: vec![Candidate {
                offset: 0,
                pre_break: 0.0,
                post_break: 0.0,
                penalty: 0.0,
                pre_space_count: 0,
                post_space_count: 0,
                hyphen_type: HyphenationType::DontBreak,
                is_rtl: false,
            }],
            line_penalty: 0.0,
            space_width: 0.0,
        }
    }

    /// Append a desperate break point.
    pub fn push_desperate(
        &mut self,
        offset: u32,
        sum_of_char_widths: f64,
        space_count: u32,
        is_rtl: bool,
    ) {
        self.candidates.push(Candidate {
            offset,
            pre_break: sum_of_char_widths,
            post_break: sum_of_char_widths,
            penalty: SCORE_DESPERATE,
            pre_space_count: space_count,
            post_space_count: space_count,
            hyphen_type: HyphenationType::BreakAndDontInsertHyphen,
            is_rtl,
        });
    }

    /// Append a hyphenation break point.
    #[allow(clippy::too_many_arguments)]
    pub fn push_hyphenation(
        &mut self,
        offset: u32,
        pre_break: f64,
        post_break: f64,
        penalty: f32,
        space_count: u32,
        hyphen_type: HyphenationType,
        is_rtl: bool,
    ) {
        self.candidates.push(Candidate {
            offset,
            pre_break,
            post_break,
            penalty,
            pre_space_count: space_count,
            post_space_count: space_count,
            hyphen_type,
            is_rtl,
        });
    }

    /// Append a word break point.
    #[allow(clippy::too_many_arguments)]
    pub fn push_word_break(
        &mut self,
        offset: u32,
        pre_break: f64,
        post_break: f64,
        penalty: f32,
        pre_space_count: u32,
        post_space_count: u32,
        is_rtl: bool,
    ) {
        self.candidates.push(Candidate {
            offset,
            pre_break,
            post_break,
            penalty,
            pre_space_count,
            post_space_count,
            hyphen_type: HyphenationType::DontBreak,
            is_rtl,
        });
    }
}

impl Default for OptimizeContext {
    fn default() -> Self {
        Self::new()
    }
}

// Penalties for a hyphenating run: (hyphen penalty, line penalty).
fn compute_penalties(
    run: &dyn Run,
    line_width: &dyn LineWidth,
    frequency: HyphenationFrequency,
    justified: bool,
) -> (f32, f32) {
    let mut line_penalty = 0.0;
    let paint = run.paint();
    // a heuristic that performs well in practice
    let mut hyphen_penalty = 0.5 * paint.size * paint.scale_x * line_width.at(0);
    if frequency == HyphenationFrequency::Normal {
        hyphen_penalty *= 4.0;
    }

    if justified {
        // Hyphenate fully justified text more aggressively, so that
        // "normal" justified behaves like "full" ragged-right.
        hyphen_penalty *= 0.25;
    } else {
        // Line penalty is zero for justified text.
        line_penalty = hyphen_penalty * LINE_PENALTY_MULTIPLIER;
    }

    (hyphen_penalty, line_penalty)
}

// Streaming per-character state for the paragraph scan.
struct CharProcessor<'a> {
    // The number of word spaces seen so far.
    raw_space_count: u32,

    // The number of word spaces, minus trailing line-end spaces.
    effective_space_count: u32,

    // The sum of character widths from the paragraph start.
    sum_of_char_widths: f64,

    // The sum of character widths minus trailing line-end spaces; this is
    // the line width from the paragraph start if we broke right now.
    effective_width: f64,

    // sum_of_char_widths as it stood at the previous word break.
    sum_of_char_widths_at_prev_word_break: f64,

    // The next word break offset. Seeded by the first
    // update_locale_if_necessary call.
    next_word_break: u32,

    // The previous word break offset.
    prev_word_break: u32,

    // The most recently observed word-space advance.
    space_width: f32,

    // The hyphenator for the current locale. Seeded by the first
    // update_locale_if_necessary call.
    hyphenator: Option<Arc<dyn Hyphenator>>,

    locale_list_id: u32,

    breaker: &'a mut dyn WordBreaker,
}

impl<'a> CharProcessor<'a> {
    fn new(text: &[u16], breaker: &'a mut dyn WordBreaker) -> Self {
        breaker.set_text(text);
        Self {
            raw_space_count: 0,
            effective_space_count: 0,
            sum_of_char_widths: 0.0,
            effective_width: 0.0,
            sum_of_char_widths_at_prev_word_break: 0.0,
            next_word_break: 0,
            prev_word_break: 0,
            space_width: 0.0,
            hyphenator: None,
            locale_list_id: INVALID_LOCALE_LIST_ID,
            breaker,
        }
    }

    // The current word, trimmed of surrounding whitespace.
    fn word_range(&self) -> Range {
        self.breaker.word_range()
    }

    // The span between the previous and next word breaks.
    fn context_range(&self) -> Range {
        Range::new(self.prev_word_break, self.next_word_break)
    }

    // Width accumulated since the last word break.
    fn width_from_last_word_break(&self) -> f64 {
        self.effective_width - self.sum_of_char_widths_at_prev_word_break
    }

    fn update_locale_if_necessary(&mut self, run: &dyn Run) {
        let new_locale_list_id = run.locale_list_id();
        if self.locale_list_id != new_locale_list_id {
            let locale = LocaleListRegistry::effective_locale(new_locale_list_id);
            log::trace!(
                "word break locale changes to {} at offset {}",
                locale,
                run.range().start()
            );
            self.next_word_break = self
                .breaker
                .following_with_locale(&locale, run.range().start());
            self.hyphenator = Some(HyphenatorMap::lookup(&locale));
            self.locale_list_id = new_locale_list_id;
        }
    }

    // Process one character.
    fn feed_char(&mut self, idx: u32, c: u16, w: f32) -> Result<()> {
        if c == CHAR_TAB {
            return Err(BreakError::UnsupportedChar {
                offset: idx,
                code_unit: c,
            }
            .into());
        }
        if idx == self.next_word_break {
            self.prev_word_break = self.next_word_break;
            self.next_word_break = self.breaker.next();
            self.sum_of_char_widths_at_prev_word_break = self.sum_of_char_widths;
        }
        if is_word_space(c) {
            self.raw_space_count += 1;
            if self.space_width != 0.0 && self.space_width != w {
                log::debug!(
                    "word space width changes from {} to {}; keeping the last observed",
                    self.space_width,
                    w
                );
            }
            self.space_width = w;
        }
        self.sum_of_char_widths += f64::from(w);
        if !is_line_end_space(c) {
            // A line-end space vanishes when the line breaks right after
            // it, so post_break width and count stay frozen across it.
            self.effective_space_count = self.raw_space_count;
            self.effective_width = self.sum_of_char_widths;
        }
        Ok(())
    }
}

// A hyphenation break point within the current word.
struct HyphenBreak {
    offset: u32,
    hyphen_type: HyphenationType,

    // Width of the piece before the break, with its end edit applied.
    first: f32,

    // Width of the piece after the break, with its start edit applied.
    second: f32,
}

// A desperate break point within the current context range.
struct DesperateBreak {
    offset: u32,

    // Sum of character widths from the start of the context.
    sum_of_chars: f64,
}

// Hyphenation break points for the current word, with both sub-piece
// widths measured through the run. A word whose measured sub-ranges
// escape the run or context is dropped whole.
fn populate_hyphenation_points(
    text: &[u16],
    run: &dyn Run,
    hyphenator: &dyn Hyphenator,
    context_range: Range,
    word_range: Range,
) -> Vec<HyphenBreak> {
    if !run.range().contains(context_range) || !context_range.contains(word_range) {
        log::debug!(
            "dropping hyphenation candidates: word [{}, {}) escapes its context",
            word_range.start(),
            word_range.end()
        );
        return Vec::new();
    }

    let word = &text[word_range.start() as usize..word_range.end() as usize];
    let hyphen_result = hyphenator.hyphenate(word);
    let mut out = Vec::new();
    for i in word_range.iter() {
        let hyph = hyphen_result[word_range.to_range_offset(i)];
        if hyph == HyphenationType::DontBreak {
            continue;
        }

        let (first_piece, second_piece) = context_range.split(i);
        let first = run.measure_hyphen_piece(
            text,
            first_piece,
            StartHyphenEdit::NoEdit,
            edit_for_this_line(hyph),
        );
        let second = run.measure_hyphen_piece(
            text,
            second_piece,
            edit_for_next_line(hyph),
            EndHyphenEdit::NoEdit,
        );
        out.push(HyphenBreak {
            offset: i,
            hyphen_type: hyph,
            first,
            second,
        });
    }
    out
}

// Desperate break points: every interior grapheme boundary of the range.
fn populate_desperate_points(measured: &MeasuredText, range: Range) -> Vec<DesperateBreak> {
    let mut out = Vec::new();
    if range.is_empty() {
        return out;
    }
    let mut width = f64::from(measured.widths[range.start() as usize]);
    for i in range.start() + 1..range.end() {
        let w = measured.widths[i as usize];
        if w == 0.0 {
            continue; // not a grapheme boundary
        }
        out.push(DesperateBreak {
            offset: i,
            sum_of_chars: width,
        });
        width += f64::from(w);
    }
    out
}

// Merge hyphenation and desperate break points into the candidate list.
// At equal offsets the desperate break goes first: its line is the shorter
// one, and the optimizer requires post_break to be non-decreasing.
fn append_with_merging(
    hyphens: &[HyphenBreak],
    desperates: &[DesperateBreak],
    proc: &CharProcessor<'_>,
    hyphen_penalty: f32,
    is_rtl: bool,
    out: &mut OptimizeContext,
) {
    let mut h = hyphens.iter().peekable();
    let mut d = desperates.iter().peekable();
    while h.peek().is_some() || d.peek().is_some() {
        let take_desperate = match (d.peek(), h.peek()) {
            (Some(desperate), Some(hyphen)) => desperate.offset <= hyphen.offset,
            (Some(_), None) => true,
            _ => false,
        };
        if take_desperate {
            let desperate = d.next().unwrap();
            out.push_desperate(
                desperate.offset,
                proc.sum_of_char_widths_at_prev_word_break + desperate.sum_of_chars,
                proc.effective_space_count,
                is_rtl,
            );
        } else {
            let hyphen = h.next().unwrap();
            out.push_hyphenation(
                hyphen.offset,
                proc.sum_of_char_widths - f64::from(hyphen.second),
                proc.sum_of_char_widths_at_prev_word_break + f64::from(hyphen.first),
                hyphen_penalty,
                proc.effective_space_count,
                hyphen.hyphen_type,
                is_rtl,
            );
        }
    }
}

/// Enumerate all break candidates for a measured paragraph.
///
/// # Errors
///
/// Fails with [`BreakError::UnsupportedChar`] if the text contains a TAB.
pub fn populate_candidates(
    text: &[u16],
    measured: &MeasuredText,
    line_width: &dyn LineWidth,
    frequency: HyphenationFrequency,
    justified: bool,
    breaker: &mut dyn WordBreaker,
) -> Result<OptimizeContext> {
    let min_line_width = f64::from(line_width.min_width());
    let mut proc = CharProcessor::new(text, breaker);

    let mut result = OptimizeContext::new();

    for run in &measured.runs {
        let run = run.as_ref();
        let is_rtl = run.is_rtl();
        let range = run.range();

        let mut hyphen_penalty = 0.0f32;
        if run.can_hyphenate() {
            let (hyphen, line) = compute_penalties(run, line_width, frequency, justified);
            hyphen_penalty = hyphen;
            result.line_penalty = result.line_penalty.max(line);
        }

        proc.update_locale_if_necessary(run);

        for i in range.iter() {
            proc.feed_char(i, text[i as usize], measured.widths[i as usize])?;

            let next_char_offset = i + 1;
            if next_char_offset != proc.next_word_break {
                continue; // wait until the word break point
            }

            let context_range = proc.context_range();
            let mut hyphen_breaks = Vec::new();
            let mut desperate_breaks = Vec::new();
            if run.can_hyphenate() && frequency != HyphenationFrequency::None {
                if let Some(hyphenator) = proc.hyphenator.clone() {
                    hyphen_breaks = populate_hyphenation_points(
                        text,
                        run,
                        hyphenator.as_ref(),
                        context_range,
                        proc.word_range(),
                    );
                }
            }
            if proc.width_from_last_word_break() > min_line_width {
                desperate_breaks = populate_desperate_points(measured, context_range);
            }
            append_with_merging(
                &hyphen_breaks,
                &desperate_breaks,
                &proc,
                hyphen_penalty,
                is_rtl,
                &mut result,
            );

            // Zero-width positions inside replacement spans do not get a
            // word break candidate.
            if next_char_offset == range.end() || measured.widths[next_char_offset as usize] > 0.0 {
                let penalty = hyphen_penalty * proc.breaker.break_badness();
                result.push_word_break(
                    next_char_offset,
                    proc.sum_of_char_widths,
                    proc.effective_width,
                    penalty,
                    proc.raw_space_count,
                    proc.effective_space_count,
                    is_rtl,
                );
            }
        }
    }
    result.space_width = proc.space_width;
    Ok(result)
}
