//! Word boundary iteration for break candidate enumeration
//!
//! The candidate builder consumes word boundaries from an ICU-like
//! iterator: seeded once per paragraph, re-positioned when a run changes
//! locale, and advanced boundary by boundary as characters stream past.
//! The [`WordBreaker`] trait captures exactly that surface so callers can
//! plug in a platform break iterator.
//!
//! The crate ships [`UaxWordBreaker`], which derives boundaries from the
//! Unicode Line Breaking Algorithm (UAX #14) via the `unicode-linebreak`
//! crate. Offsets on the trait are UTF-16 code unit offsets; the adapter
//! maps them to and from the UTF-8 positions the crate reports.
//!
//! # References
//!
//! - Unicode Standard Annex #14: <https://www.unicode.org/reports/tr14/>

use crate::locale::LocaleTag;
use crate::measure::{is_line_end_space, is_word_space, Range};
use rustc_hash::FxHashMap;
use unicode_linebreak::linebreaks;

/// An ICU-like word boundary iterator over UTF-16 text.
///
/// All offsets are code unit offsets into the text given to `set_text`.
pub trait WordBreaker {
    /// Attach the iterator to a paragraph. Resets all positions.
    fn set_text(&mut self, text: &[u16]);

    /// Re-seed the iterator for a run with the given locale and return the
    /// first boundary at or after `from`.
    fn following_with_locale(&mut self, locale: &LocaleTag, from: u32) -> u32;

    /// Advance to the next boundary and return it. Past the last boundary,
    /// keeps returning the text length.
    fn next(&mut self) -> u32;

    /// The current word: the span between the previous and current
    /// boundaries, trimmed of breakable whitespace on both sides.
    fn word_range(&self) -> Range;

    /// Extra cost of breaking at the current boundary, multiplied into the
    /// word break penalty. Zero for an unremarkable boundary; an
    /// implementation may tax breaks it considers poor (e.g. inside URLs).
    fn break_badness(&self) -> f32;
}

/// [`WordBreaker`] backed by UAX #14 break opportunities.
#[derive(Debug, Default)]
pub struct UaxWordBreaker {
    text: Vec<u16>,
    boundaries: Vec<u32>,
    pos: usize,
    last: u32,
}

impl UaxWordBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> u32 {
        self.boundaries
            .get(self.pos)
            .copied()
            .unwrap_or(self.text.len() as u32)
    }
}

impl WordBreaker for UaxWordBreaker {
    fn set_text(&mut self, text: &[u16]) {
        self.text = text.to_vec();
        self.boundaries.clear();
        self.pos = 0;
        self.last = 0;

        // Decode to UTF-8 for the UAX #14 pass, keeping a byte-to-code-unit
        // map so reported boundaries translate back. Unpaired surrogates
        // decode to U+FFFD, which occupies one code unit on both sides.
        let mut decoded = String::with_capacity(text.len());
        let mut unit_at_byte = FxHashMap::default();
        let mut unit_offset = 0u32;
        for item in char::decode_utf16(text.iter().copied()) {
            let c = item.unwrap_or(char::REPLACEMENT_CHARACTER);
            unit_at_byte.insert(decoded.len(), unit_offset);
            decoded.push(c);
            unit_offset += c.len_utf16() as u32;
        }
        unit_at_byte.insert(decoded.len(), unit_offset);

        for (byte_offset, _opportunity) in linebreaks(&decoded) {
            if let Some(&unit) = unit_at_byte.get(&byte_offset) {
                self.boundaries.push(unit);
            }
        }
    }

    fn following_with_locale(&mut self, _locale: &LocaleTag, from: u32) -> u32 {
        // UAX #14 opportunities are locale-independent; the locale is part
        // of the trait surface for tailored implementations.
        self.last = from;
        self.pos = self.boundaries.partition_point(|&b| b < from);
        self.current()
    }

    fn next(&mut self) -> u32 {
        self.last = self.current();
        if self.pos < self.boundaries.len() {
            self.pos += 1;
        }
        self.current()
    }

    fn word_range(&self) -> Range {
        let mut start = self.last as usize;
        let mut end = self.current() as usize;
        while start < end && is_breakable_space(self.text[start]) {
            start += 1;
        }
        while end > start && is_breakable_space(self.text[end - 1]) {
            end -= 1;
        }
        Range::new(start as u32, end as u32)
    }

    fn break_badness(&self) -> f32 {
        0.0
    }
}

fn is_breakable_space(c: u16) -> bool {
    is_word_space(c) || is_line_end_space(c)
}
