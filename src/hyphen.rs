//! Hyphenation types, edits, and hyphenator lookup
//!
//! This module defines the vocabulary the break engine uses to talk about
//! hyphenation: what kind of break a position admits
//! ([`HyphenationType`]), which glyph edit each end of a broken line needs
//! ([`StartHyphenEdit`] / [`EndHyphenEdit`]), and the packed form of those
//! edits that travels in [`LineBreakResult`](crate::optimizer::LineBreakResult)
//! flags.
//!
//! Pattern evaluation itself is delegated to a [`Hyphenator`]. The crate
//! ships [`PatternHyphenator`], a dictionary-based implementation using the
//! TeX hyphenation algorithm by Frank Liang (via the `hyphenation` crate),
//! and [`NullHyphenator`] for scripts without patterns. Hyphenators are
//! selected per run locale through the process-wide [`HyphenatorMap`].
//!
//! # Example
//!
//! ```rust,ignore
//! use parabreak::hyphen::{HyphenatorMap, PatternHyphenator};
//! use parabreak::locale::LocaleTag;
//! use std::sync::Arc;
//!
//! let en = LocaleTag::new("en-US");
//! HyphenatorMap::add(&en, Arc::new(PatternHyphenator::for_locale(&en)?));
//! let hyphenator = HyphenatorMap::lookup(&en);
//! ```

use crate::error::{BreakError, Result};
use crate::locale::{LocaleTag, SubtagBits};
use hyphenation::{Language, Load, Standard};
use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock, RwLock};

const CHAR_SOFT_HYPHEN: u16 = 0x00AD;

/// How aggressively hyphenation break candidates are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HyphenationFrequency {
    /// No hyphenation candidates at all.
    None,

    /// Conservative hyphenation (higher hyphen penalty).
    Normal,

    /// Hyphenate wherever the patterns allow.
    Full,
}

/// The kind of break a position admits, as reported by a hyphenator.
///
/// Everything except `DontBreak` and `BreakAndDontInsertHyphen` implies a
/// glyph edit on at least one side of the cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HyphenationType {
    /// No break is admitted at this position.
    DontBreak = 0,

    /// Break and insert a hyphen at the end of the first piece.
    BreakAndInsertHyphen = 1,

    /// Break and insert an Armenian hyphen (U+058A) at the end of the
    /// first piece.
    BreakAndInsertArmenianHyphen = 2,

    /// Break and insert a maqaf (Hebrew hyphen, U+05BE) at the end of the
    /// first piece.
    BreakAndInsertMaqaf = 3,

    /// Break and insert a Canadian Syllabics hyphen (U+1400) at the end of
    /// the first piece.
    BreakAndInsertUcasHyphen = 4,

    /// Break with no glyph edits (used for desperate breaks and for
    /// scripts that hyphenate without a visible mark).
    BreakAndDontInsertHyphen = 5,

    /// Break and replace the code unit before the cut with a hyphen.
    BreakAndReplaceWithHyphen = 6,

    /// Break and insert a hyphen at the start of the second piece
    /// (e.g. before a stem in some orthographies).
    BreakAndInsertHyphenAtNextLine = 7,

    /// Break, insert a ZWJ plus hyphen at the end of the first piece, and
    /// a ZWJ at the start of the second (cursive scripts).
    BreakAndInsertHyphenAndZwj = 8,
}

/// Edit applied at the start of a line that begins mid-word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StartHyphenEdit {
    NoEdit = 0,
    InsertHyphen = 1,
    InsertZwj = 2,
}

/// Edit applied at the end of a line that breaks mid-word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EndHyphenEdit {
    NoEdit = 0,
    ReplaceWithHyphen = 1,
    InsertHyphen = 2,
    InsertArmenianHyphen = 3,
    InsertMaqaf = 4,
    InsertUcasHyphen = 5,
    InsertZwjAndHyphen = 6,
}

/// The edit the line ENDING at a break of this type needs.
pub fn edit_for_this_line(hyphen_type: HyphenationType) -> EndHyphenEdit {
    match hyphen_type {
        HyphenationType::BreakAndInsertHyphen => EndHyphenEdit::InsertHyphen,
        HyphenationType::BreakAndInsertArmenianHyphen => EndHyphenEdit::InsertArmenianHyphen,
        HyphenationType::BreakAndInsertMaqaf => EndHyphenEdit::InsertMaqaf,
        HyphenationType::BreakAndInsertUcasHyphen => EndHyphenEdit::InsertUcasHyphen,
        HyphenationType::BreakAndReplaceWithHyphen => EndHyphenEdit::ReplaceWithHyphen,
        HyphenationType::BreakAndInsertHyphenAndZwj => EndHyphenEdit::InsertZwjAndHyphen,
        HyphenationType::DontBreak
        | HyphenationType::BreakAndDontInsertHyphen
        | HyphenationType::BreakAndInsertHyphenAtNextLine => EndHyphenEdit::NoEdit,
    }
}

/// The edit the line STARTING at a break of this type needs.
pub fn edit_for_next_line(hyphen_type: HyphenationType) -> StartHyphenEdit {
    match hyphen_type {
        HyphenationType::BreakAndInsertHyphenAtNextLine => StartHyphenEdit::InsertHyphen,
        HyphenationType::BreakAndInsertHyphenAndZwj => StartHyphenEdit::InsertZwj,
        _ => StartHyphenEdit::NoEdit,
    }
}

/// Packed pair of hyphen edits, as stored in result flags.
///
/// The start edit lives in the high byte and the end edit in the low byte;
/// [`unpack_hyphen_edit`] is the exact inverse of [`pack_hyphen_edit`].
pub type HyphenEdit = u16;

const END_EDIT_BITS: u32 = 8;

/// Pack a (start, end) edit pair into a [`HyphenEdit`].
#[inline]
pub fn pack_hyphen_edit(start: StartHyphenEdit, end: EndHyphenEdit) -> HyphenEdit {
    ((start as u16) << END_EDIT_BITS) | end as u16
}

/// Unpack a [`HyphenEdit`] into its (start, end) edit pair.
pub fn unpack_hyphen_edit(edit: HyphenEdit) -> (StartHyphenEdit, EndHyphenEdit) {
    let start = match edit >> END_EDIT_BITS {
        1 => StartHyphenEdit::InsertHyphen,
        2 => StartHyphenEdit::InsertZwj,
        _ => StartHyphenEdit::NoEdit,
    };
    let end = match edit & ((1 << END_EDIT_BITS) - 1) {
        1 => EndHyphenEdit::ReplaceWithHyphen,
        2 => EndHyphenEdit::InsertHyphen,
        3 => EndHyphenEdit::InsertArmenianHyphen,
        4 => EndHyphenEdit::InsertMaqaf,
        5 => EndHyphenEdit::InsertUcasHyphen,
        6 => EndHyphenEdit::InsertZwjAndHyphen,
        _ => EndHyphenEdit::NoEdit,
    };
    (start, end)
}

/// A hyphenation pattern evaluator.
///
/// Given one word, reports the admissible break type at every code unit
/// position of that word. Position 0 is always `DontBreak` (a break there
/// would produce an empty piece). Implementations must be safe for
/// concurrent reads; the engine shares them across paragraphs.
pub trait Hyphenator: Send + Sync {
    /// Hyphenate one word, given as UTF-16 code units.
    ///
    /// The returned vector has exactly `word.len()` entries, one per code
    /// unit position.
    fn hyphenate(&self, word: &[u16]) -> Vec<HyphenationType>;
}

/// A hyphenator that never admits a break. Used for locales with no
/// registered patterns.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHyphenator;

impl Hyphenator for NullHyphenator {
    fn hyphenate(&self, word: &[u16]) -> Vec<HyphenationType> {
        vec![HyphenationType::DontBreak; word.len()]
    }
}

static PATTERN_CACHE: OnceLock<RwLock<FxHashMap<Language, Arc<Standard>>>> = OnceLock::new();

fn cached_dictionary(language: Language) -> Result<Arc<Standard>> {
    let cache = PATTERN_CACHE.get_or_init(|| RwLock::new(FxHashMap::default()));
    if let Some(existing) = cache
        .read()
        .expect("pattern cache poisoned")
        .get(&language)
        .cloned()
    {
        return Ok(existing);
    }

    let dictionary = Standard::from_embedded(language).map_err(|e| BreakError::HyphenationFailed {
        language: format!("{:?}", language),
        reason: format!("Failed to load embedded patterns: {:?}", e),
    })?;
    let loaded = Arc::new(dictionary);
    let mut guard = cache.write().expect("pattern cache poisoned");
    Ok(guard.entry(language).or_insert(loaded).clone())
}

/// Dictionary-based hyphenator using Liang patterns.
///
/// Soft hyphens take precedence: if the word contains U+00AD, the break
/// points are exactly the positions after each soft hyphen and the
/// patterns are not consulted.
#[derive(Clone)]
pub struct PatternHyphenator {
    dictionary: Arc<Standard>,

    /// Minimum code units kept before the first hyphen.
    left_min: usize,

    /// Minimum code units kept after the last hyphen.
    right_min: usize,

    /// Words shorter than this are never hyphenated.
    min_word_length: usize,
}

impl std::fmt::Debug for PatternHyphenator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternHyphenator")
            .field("left_min", &self.left_min)
            .field("right_min", &self.right_min)
            .field("min_word_length", &self.min_word_length)
            .finish_non_exhaustive()
    }
}

impl PatternHyphenator {
    /// Default minimum characters before the first hyphen.
    pub const DEFAULT_LEFT_MIN: usize = 2;

    /// Default minimum characters after the last hyphen.
    pub const DEFAULT_RIGHT_MIN: usize = 2;

    /// Default minimum word length for hyphenation.
    pub const DEFAULT_MIN_WORD_LENGTH: usize = 5;

    /// Create a hyphenator for an embedded pattern language.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded patterns cannot be loaded.
    pub fn new(language: Language) -> Result<Self> {
        Ok(Self {
            dictionary: cached_dictionary(language)?,
            left_min: Self::DEFAULT_LEFT_MIN,
            right_min: Self::DEFAULT_RIGHT_MIN,
            min_word_length: Self::DEFAULT_MIN_WORD_LENGTH,
        })
    }

    /// Create a hyphenator with custom minima.
    pub fn with_settings(
        language: Language,
        left_min: usize,
        right_min: usize,
        min_word_length: usize,
    ) -> Result<Self> {
        let mut hyphenator = Self::new(language)?;
        hyphenator.left_min = left_min.max(1);
        hyphenator.right_min = right_min.max(1);
        hyphenator.min_word_length = min_word_length.max(2);
        Ok(hyphenator)
    }

    /// Create a hyphenator for a locale tag, choosing the pattern language
    /// from the tag's language, region, and orthography variant.
    ///
    /// # Errors
    ///
    /// Returns an error if no pattern language matches the tag or the
    /// patterns cannot be loaded.
    pub fn for_locale(locale: &LocaleTag) -> Result<Self> {
        let language = pattern_language_for(locale).ok_or_else(|| BreakError::HyphenationFailed {
            language: locale.to_string(),
            reason: "No embedded patterns for this locale".to_string(),
        })?;
        Self::new(language)
    }

    fn hyphenate_with_patterns(&self, word: &[u16], out: &mut [HyphenationType]) {
        // Pattern dictionaries only understand well-formed alphabetic words.
        let chars: std::result::Result<Vec<char>, _> =
            char::decode_utf16(word.iter().copied()).collect();
        let chars = match chars {
            Ok(chars) => chars,
            Err(_) => return,
        };
        if !chars.iter().all(|c| c.is_alphabetic()) {
            return;
        }
        let word_str: String = chars.iter().collect();

        use hyphenation::Hyphenator as HyphenatorTrait;
        let breaks = self.dictionary.hyphenate(&word_str).breaks.to_vec();

        // Map the dictionary's byte offsets back to code unit offsets.
        let mut byte_offset = 0usize;
        let mut unit_offset = 0usize;
        let mut unit_at_byte = FxHashMap::default();
        for c in &chars {
            unit_at_byte.insert(byte_offset, unit_offset);
            byte_offset += c.len_utf8();
            unit_offset += c.len_utf16();
        }

        for b in breaks {
            let Some(&unit) = unit_at_byte.get(&b) else {
                continue;
            };
            if unit < self.left_min || word.len() - unit < self.right_min {
                continue;
            }
            out[unit] = HyphenationType::BreakAndInsertHyphen;
        }
    }
}

impl Hyphenator for PatternHyphenator {
    fn hyphenate(&self, word: &[u16]) -> Vec<HyphenationType> {
        let mut out = vec![HyphenationType::DontBreak; word.len()];
        if word.len() < self.min_word_length {
            return out;
        }

        if word.contains(&CHAR_SOFT_HYPHEN) {
            // Soft hyphens override the patterns entirely.
            for (i, &c) in word.iter().enumerate() {
                if c == CHAR_SOFT_HYPHEN && i + 1 < word.len() && i + 1 >= self.left_min {
                    out[i + 1] = HyphenationType::BreakAndInsertHyphen;
                }
            }
            return out;
        }

        self.hyphenate_with_patterns(word, &mut out);
        out
    }
}

/// Map a locale tag to an embedded pattern language.
///
/// Pre-reform German (de-1901) falls back to the 1996 patterns; the
/// pattern set does not ship the traditional orthography.
fn pattern_language_for(locale: &LocaleTag) -> Option<Language> {
    let language = locale.language_code()?;
    match language.as_str() {
        "en" => match locale.region_code().as_deref() {
            Some("GB") => Some(Language::EnglishGB),
            _ => Some(Language::EnglishUS),
        },
        "de" => Some(Language::German1996),
        "fr" => Some(Language::French),
        "es" => Some(Language::Spanish),
        "it" => Some(Language::Italian),
        "pt" => Some(Language::Portuguese),
        "nl" => Some(Language::Dutch),
        "pl" => Some(Language::Polish),
        "ru" => Some(Language::Russian),
        "sv" => Some(Language::Swedish),
        "nb" | "no" => Some(Language::NorwegianBokmal),
        "da" => Some(Language::Danish),
        "fi" => Some(Language::Finnish),
        "hu" => Some(Language::Hungarian),
        "cs" => Some(Language::Czech),
        "sk" => Some(Language::Slovak),
        "hr" => Some(Language::Croatian),
        "ca" => Some(Language::Catalan),
        "tr" => Some(Language::Turkish),
        "el" => Some(Language::GreekMono),
        "uk" => Some(Language::Ukrainian),
        "la" => Some(Language::Latin),
        _ => None,
    }
}

static HYPHENATOR_MAP: OnceLock<RwLock<FxHashMap<u64, Arc<dyn Hyphenator>>>> = OnceLock::new();
static NULL_HYPHENATOR: OnceLock<Arc<dyn Hyphenator>> = OnceLock::new();

/// Process-wide map from locale to hyphenator.
///
/// Registration is expected to happen once at startup; lookups are
/// read-locked and cheap. Lookup falls back through successively less
/// specific forms of the requested tag: the exact tag, language plus
/// orthography variant, bare language, and finally [`NullHyphenator`].
pub struct HyphenatorMap;

impl HyphenatorMap {
    fn map() -> &'static RwLock<FxHashMap<u64, Arc<dyn Hyphenator>>> {
        HYPHENATOR_MAP.get_or_init(|| RwLock::new(FxHashMap::default()))
    }

    /// Register a hyphenator for a locale.
    pub fn add(locale: &LocaleTag, hyphenator: Arc<dyn Hyphenator>) {
        Self::map()
            .write()
            .expect("hyphenator map poisoned")
            .insert(locale.identifier(), hyphenator);
    }

    /// Look up the hyphenator for a locale, falling back to less specific
    /// forms and finally to a non-hyphenating stub.
    pub fn lookup(locale: &LocaleTag) -> Arc<dyn Hyphenator> {
        let map = Self::map().read().expect("hyphenator map poisoned");
        let keys = [
            locale.identifier(),
            locale
                .partial_locale(SubtagBits::LANGUAGE | SubtagBits::VARIANT)
                .identifier(),
            locale.partial_locale(SubtagBits::LANGUAGE).identifier(),
        ];
        for key in keys {
            if let Some(found) = map.get(&key) {
                return Arc::clone(found);
            }
        }
        log::trace!("no hyphenator registered for {}", locale);
        Arc::clone(NULL_HYPHENATOR.get_or_init(|| Arc::new(NullHyphenator)))
    }
}
