//! Compact locale tags for run tagging and hyphenator selection
//!
//! This module implements a copy-cheap value type for the BCP-47 subset
//! the break engine cares about: language, script, region, the two German
//! orthography variants, and an emoji style. Subtags are bit-packed so a
//! [`LocaleTag`] is a plain 12-byte value that can be compared, hashed,
//! and stored in run metadata without allocation.
//!
//! # Overview
//!
//! Tags are parsed leniently: anything that is not a valid language code
//! produces the unpopulated tag (`und`), and unknown intermediate subtags
//! are skipped. The canonical string form round-trips through
//! [`LocaleTag::new`] / `Display`.
//!
//! Beyond identity, a tag knows which script families it can represent
//! (`subScriptBits`): `Jpan` covers Han, Hiragana, and Katakana; `Kore`
//! covers Han and Hangul; and so on. [`LocaleTag::match_score`] uses those
//! bits to rank how well a list of supported locales serves a requested
//! one, which is what font fallback and hyphenator lookup key on.
//!
//! # Example
//!
//! ```
//! use parabreak::locale::LocaleTag;
//!
//! let tag = LocaleTag::new("de-Latn-DE-1996");
//! assert_eq!(tag.to_string(), "de-Latn-DE-1996");
//! assert!(tag.supports_script_code("Latn"));
//! ```

use crate::error::LocaleError;
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, RwLock};

// ============================================================================
// Subtag packing
// ============================================================================

const FIVE_BITS: u32 = 0x1f;

const NO_LANGUAGE: u16 = 0;
const NO_SCRIPT: u32 = 0;
const NO_REGION: u16 = 0;

// Letters pack into 5 bits each. A two-letter code stores the full-bit
// sentinel 0x1f in the high 5 bits; a three-letter code uses all three
// slots. Region codes reuse the scheme with digits for the 3-digit form.
fn pack_language_or_region(code: &str, two_letter_base: u8, three_letter_base: u8) -> u16 {
    let bytes = code.as_bytes();
    if bytes.len() == 2 {
        0x7c00
            | (u16::from(bytes[0] - two_letter_base) << 5)
            | u16::from(bytes[1] - two_letter_base)
    } else {
        (u16::from(bytes[0] - three_letter_base) << 10)
            | (u16::from(bytes[1] - three_letter_base) << 5)
            | u16::from(bytes[2] - three_letter_base)
    }
}

fn unpack_language_or_region(packed: u16, two_letter_base: u8, three_letter_base: u8) -> String {
    let first = (u32::from(packed) >> 10) & FIVE_BITS;
    let second = (u32::from(packed) >> 5) & FIVE_BITS;
    let third = u32::from(packed) & FIVE_BITS;

    if first == FIVE_BITS {
        let out = [
            second as u8 + two_letter_base,
            third as u8 + two_letter_base,
        ];
        String::from_utf8_lossy(&out).into_owned()
    } else {
        let out = [
            first as u8 + three_letter_base,
            second as u8 + three_letter_base,
            third as u8 + three_letter_base,
        ];
        String::from_utf8_lossy(&out).into_owned()
    }
}

fn pack_language(code: &str) -> u16 {
    pack_language_or_region(code, b'a', b'a')
}

fn unpack_language(packed: u16) -> String {
    unpack_language_or_region(packed, b'a', b'a')
}

fn pack_region(code: &str) -> u16 {
    pack_language_or_region(code, b'A', b'0')
}

fn unpack_region(packed: u16) -> String {
    unpack_language_or_region(packed, b'A', b'0')
}

// Scripts pack (upper, lower, lower, lower) into 20 bits.
const fn pack_script(code: [u8; 4]) -> u32 {
    ((code[0] - b'A') as u32) << 15
        | ((code[1] - b'a') as u32) << 10
        | ((code[2] - b'a') as u32) << 5
        | (code[3] - b'a') as u32
}

fn unpack_script(packed: u32) -> String {
    let out = [
        ((packed >> 15) & FIVE_BITS) as u8 + b'A',
        ((packed >> 10) & FIVE_BITS) as u8 + b'a',
        ((packed >> 5) & FIVE_BITS) as u8 + b'a',
        (packed & FIVE_BITS) as u8 + b'a',
    ];
    String::from_utf8_lossy(&out).into_owned()
}

const SCRIPT_BOPO: u32 = pack_script(*b"Bopo");
const SCRIPT_HANG: u32 = pack_script(*b"Hang");
const SCRIPT_HANB: u32 = pack_script(*b"Hanb");
const SCRIPT_HANI: u32 = pack_script(*b"Hani");
const SCRIPT_HANS: u32 = pack_script(*b"Hans");
const SCRIPT_HANT: u32 = pack_script(*b"Hant");
const SCRIPT_HIRA: u32 = pack_script(*b"Hira");
const SCRIPT_HRKT: u32 = pack_script(*b"Hrkt");
const SCRIPT_JPAN: u32 = pack_script(*b"Jpan");
const SCRIPT_KANA: u32 = pack_script(*b"Kana");
const SCRIPT_KORE: u32 = pack_script(*b"Kore");
const SCRIPT_ZSYE: u32 = pack_script(*b"Zsye");
const SCRIPT_ZSYM: u32 = pack_script(*b"Zsym");

const BOPOMOFO_FLAG: u8 = 1;
const HAN_FLAG: u8 = 1 << 1;
const HANGUL_FLAG: u8 = 1 << 2;
const HIRAGANA_FLAG: u8 = 1 << 3;
const KATAKANA_FLAG: u8 = 1 << 4;
const SIMPLIFIED_CHINESE_FLAG: u8 = 1 << 5;
const TRADITIONAL_CHINESE_FLAG: u8 = 1 << 6;

// Fixed table mapping a script to the script families it implies.
fn script_to_sub_script_bits(script: u32) -> u8 {
    match script {
        SCRIPT_BOPO => BOPOMOFO_FLAG,
        SCRIPT_HANG => HANGUL_FLAG,
        // Bopomofo is almost exclusively used alongside Han in Taiwan.
        SCRIPT_HANB => HAN_FLAG | BOPOMOFO_FLAG,
        SCRIPT_HANI => HAN_FLAG,
        SCRIPT_HANS => HAN_FLAG | SIMPLIFIED_CHINESE_FLAG,
        SCRIPT_HANT => HAN_FLAG | TRADITIONAL_CHINESE_FLAG,
        SCRIPT_HIRA => HIRAGANA_FLAG,
        SCRIPT_HRKT => KATAKANA_FLAG | HIRAGANA_FLAG,
        SCRIPT_JPAN => HAN_FLAG | KATAKANA_FLAG | HIRAGANA_FLAG,
        SCRIPT_KANA => KATAKANA_FLAG,
        SCRIPT_KORE => HAN_FLAG | HANGUL_FLAG,
        _ => 0,
    }
}

// ============================================================================
// Validation
// ============================================================================

fn is_lowercase(c: u8) -> bool {
    c.is_ascii_lowercase()
}

fn is_uppercase(c: u8) -> bool {
    c.is_ascii_uppercase()
}

fn is_valid_language_code(token: &str) -> bool {
    let bytes = token.as_bytes();
    (bytes.len() == 2 || bytes.len() == 3) && bytes.iter().all(|&c| is_lowercase(c))
}

fn is_valid_script_code(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 4
        && is_uppercase(bytes[0])
        && bytes[1..].iter().all(|&c| is_lowercase(c))
}

fn is_valid_region_code(token: &str) -> bool {
    let bytes = token.as_bytes();
    (bytes.len() == 2 && bytes.iter().all(|&c| is_uppercase(c)))
        || (bytes.len() == 3 && bytes.iter().all(|&c| c.is_ascii_digit()))
}

// ============================================================================
// LocaleTag
// ============================================================================

/// German orthography variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Variant {
    #[default]
    None = 0,

    /// Traditional German orthography (`de-1901`).
    German1901 = 1,

    /// Reformed German orthography (`de-1996`).
    German1996 = 2,
}

/// Emoji presentation style requested by a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum EmojiStyle {
    /// No style information.
    #[default]
    Empty = 0,

    /// Color emoji presentation (`-u-em-emoji` or script `Zsye`).
    Emoji = 1,

    /// Text presentation (`-u-em-text` or script `Zsym`).
    Text = 2,

    /// Explicitly default presentation (`-u-em-default`).
    Default = 3,
}

/// Selects which subtags a partial-locale projection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtagBits(u8);

impl SubtagBits {
    pub const EMPTY: SubtagBits = SubtagBits(0);
    pub const LANGUAGE: SubtagBits = SubtagBits(1);
    pub const SCRIPT: SubtagBits = SubtagBits(1 << 1);
    pub const REGION: SubtagBits = SubtagBits(1 << 2);
    pub const VARIANT: SubtagBits = SubtagBits(1 << 3);
    pub const EMOJI: SubtagBits = SubtagBits(1 << 4);
    pub const ALL: SubtagBits = SubtagBits(0x1f);

    /// Returns true if every bit of `other` is set in `self`.
    #[inline]
    pub fn contains(self, other: SubtagBits) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SubtagBits {
    type Output = SubtagBits;

    fn bitor(self, rhs: SubtagBits) -> SubtagBits {
        SubtagBits(self.0 | rhs.0)
    }
}

/// A compact BCP-47 subset: language, script, region, German orthography
/// variant, and emoji style, plus derived script-family bits.
///
/// Invalid input never fails lenient parsing; it produces the unpopulated
/// tag whose string form is `und`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LocaleTag {
    language: u16,
    script: u32,
    region: u16,
    sub_script_bits: u8,
    variant: Variant,
    emoji_style: EmojiStyle,
}

impl LocaleTag {
    /// Parse a BCP-47 subset string leniently.
    ///
    /// Tokens are delimited by `-` or `_`. A malformed language token
    /// leaves the whole tag unpopulated; unknown intermediate subtags are
    /// skipped. The `-u-em-{emoji,text,default}` extension is recognized
    /// anywhere after the language.
    pub fn new(input: &str) -> Self {
        let normalized = input.replace('_', "-");
        let mut tag = LocaleTag::default();
        let mut tokens = normalized.split('-');

        let language = tokens.next().unwrap_or("");
        if !is_valid_language_code(language) {
            // We only understand two- and three-letter language codes;
            // nothing after a malformed language is trusted either.
            return tag;
        }
        tag.language = pack_language(language);

        for token in tokens {
            if tag.script == NO_SCRIPT && is_valid_script_code(token) {
                tag.script = pack_script([
                    token.as_bytes()[0],
                    token.as_bytes()[1],
                    token.as_bytes()[2],
                    token.as_bytes()[3],
                ]);
                tag.sub_script_bits = script_to_sub_script_bits(tag.script);
            } else if tag.region == NO_REGION && is_valid_region_code(token) {
                tag.region = pack_region(token);
            } else if language == "de" && tag.variant == Variant::None {
                // Only the German orthography variants are recognized.
                match token {
                    "1901" => tag.variant = Variant::German1901,
                    "1996" => tag.variant = Variant::German1996,
                    _ => {}
                }
            }
        }

        tag.emoji_style = resolve_emoji_style(&normalized);
        if tag.emoji_style == EmojiStyle::Empty {
            tag.emoji_style = script_to_emoji_style(tag.script);
        }
        tag
    }

    /// Returns true if a language subtag is present.
    #[inline]
    pub fn has_language(&self) -> bool {
        self.language != NO_LANGUAGE
    }

    /// The language subtag, if present.
    pub fn language_code(&self) -> Option<String> {
        if self.has_language() {
            Some(unpack_language(self.language))
        } else {
            None
        }
    }

    /// The script subtag, if present.
    pub fn script_code(&self) -> Option<String> {
        if self.script != NO_SCRIPT {
            Some(unpack_script(self.script))
        } else {
            None
        }
    }

    /// The region subtag, if present.
    pub fn region_code(&self) -> Option<String> {
        if self.region != NO_REGION {
            Some(unpack_region(self.region))
        } else {
            None
        }
    }

    /// The German orthography variant.
    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The emoji presentation style.
    #[inline]
    pub fn emoji_style(&self) -> EmojiStyle {
        self.emoji_style
    }

    /// The derived script-family bits.
    #[inline]
    pub fn sub_script_bits(&self) -> u8 {
        self.sub_script_bits
    }

    /// Returns true if both tags carry the same script subtag.
    #[inline]
    pub fn is_equal_script(&self, other: &LocaleTag) -> bool {
        self.script == other.script
    }

    /// Returns true if `provided` covers every script family requested.
    ///
    /// An empty request never matches.
    #[inline]
    pub fn supports_script(provided: u8, requested: u8) -> bool {
        requested != 0 && (provided & requested) == requested
    }

    /// Returns true if this tag can represent text in the given 4-letter
    /// script code, either by exact script equality or through its script
    /// family bits.
    pub fn supports_script_code(&self, script: &str) -> bool {
        if !is_valid_script_code(script) {
            return false;
        }
        let bytes = script.as_bytes();
        let packed = pack_script([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if packed == self.script {
            return true;
        }
        Self::supports_script(self.sub_script_bits, script_to_sub_script_bits(packed))
    }

    /// Rank how well a list of supported locales serves this tag.
    ///
    /// Scores, best first:
    /// - 4: emoji style and language both match a supported tag.
    /// - 3: script (or script family) and language match; or all supported
    ///   tags share this tag's language and their combined script families
    ///   cover it.
    /// - 2: emoji style matches but language does not.
    /// - 1: script-only match.
    /// - 0: no match.
    pub fn match_score(&self, supported: &LocaleList) -> u32 {
        let mut language_script_match = false;
        let mut subtag_match = false;
        let mut script_match = false;

        for other in supported.iter() {
            if self.emoji_style != EmojiStyle::Empty && self.emoji_style == other.emoji_style {
                subtag_match = true;
                if self.language == other.language {
                    return 4;
                }
            }
            if self.is_equal_script(other)
                || Self::supports_script(other.sub_script_bits, self.sub_script_bits)
            {
                script_match = true;
                if self.language == other.language {
                    language_script_match = true;
                }
            }
        }

        if Self::supports_script(supported.union_of_sub_script_bits(), self.sub_script_bits) {
            script_match = true;
            if !supported.is_empty()
                && self.language == supported.get(0).language
                && supported.is_all_the_same_language()
            {
                return 3;
            }
        }

        if language_script_match {
            3
        } else if subtag_match {
            2
        } else if script_match {
            1
        } else {
            0
        }
    }

    /// Project the tag down to a subset of its subtags.
    ///
    /// Dropped subtags become absent; dropping the language yields `und`.
    pub fn partial_locale(&self, bits: SubtagBits) -> LocaleTag {
        let mut out = LocaleTag::default();
        if bits.contains(SubtagBits::LANGUAGE) {
            out.language = self.language;
        }
        if bits.contains(SubtagBits::SCRIPT) {
            out.script = self.script;
            out.sub_script_bits = self.sub_script_bits;
        }
        if bits.contains(SubtagBits::REGION) {
            out.region = self.region;
        }
        if bits.contains(SubtagBits::VARIANT) {
            out.variant = self.variant;
        }
        if bits.contains(SubtagBits::EMOJI) {
            out.emoji_style = self.emoji_style;
        }
        out
    }

    /// A stable 64-bit identity covering every subtag. Used as a map key
    /// by the hyphenator registry.
    pub fn identifier(&self) -> u64 {
        (u64::from(self.language) << 48)
            | (u64::from(self.script) << 28)
            | (u64::from(self.region) << 12)
            | ((self.variant as u64) << 2)
            | self.emoji_style as u64
    }
}

impl fmt::Display for LocaleTag {
    /// Canonical string form. Emoji style is carried by the `-u-em-`
    /// extension on input but is not part of the canonical form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_language() {
            write!(f, "{}", unpack_language(self.language))?;
        } else {
            write!(f, "und")?;
        }
        if self.script != NO_SCRIPT {
            write!(f, "-{}", unpack_script(self.script))?;
        }
        if self.region != NO_REGION {
            write!(f, "-{}", unpack_region(self.region))?;
        }
        match self.variant {
            Variant::German1901 => write!(f, "-1901")?,
            Variant::German1996 => write!(f, "-1996")?,
            Variant::None => {}
        }
        Ok(())
    }
}

impl FromStr for LocaleTag {
    type Err = LocaleError;

    /// Strict parse: rejects input whose language subtag is malformed
    /// instead of degrading to `und`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('_', "-");
        let language = normalized.split('-').next().unwrap_or("");
        if !is_valid_language_code(language) {
            return Err(LocaleError::MalformedLanguage {
                subtag: language.to_string(),
            });
        }
        Ok(LocaleTag::new(s))
    }
}

// Emoji style from the -u-em- extension, if present.
fn resolve_emoji_style(normalized: &str) -> EmojiStyle {
    const PREFIX: &str = "-u-em-";
    let Some(pos) = normalized.find(PREFIX) else {
        return EmojiStyle::Empty;
    };
    let rest = &normalized[pos + PREFIX.len()..];
    let subtag = rest.split('-').next().unwrap_or("");
    match subtag {
        "emoji" => EmojiStyle::Emoji,
        "text" => EmojiStyle::Text,
        "default" => EmojiStyle::Default,
        _ => EmojiStyle::Empty,
    }
}

// Emoji style implied by the script subtag, for tags without the
// explicit extension.
fn script_to_emoji_style(script: u32) -> EmojiStyle {
    if script == SCRIPT_ZSYE {
        EmojiStyle::Emoji
    } else if script == SCRIPT_ZSYM {
        EmojiStyle::Text
    } else {
        EmojiStyle::Empty
    }
}

// ============================================================================
// LocaleList
// ============================================================================

/// An ordered, immutable list of locale tags, with aggregates precomputed
/// for [`LocaleTag::match_score`].
#[derive(Debug, Clone, Default)]
pub struct LocaleList {
    locales: Vec<LocaleTag>,
    union_of_sub_script_bits: u8,
    is_all_the_same_language: bool,
}

impl LocaleList {
    /// Build a list from tags, computing the aggregates.
    pub fn new(locales: Vec<LocaleTag>) -> Self {
        let mut union_of_sub_script_bits = 0u8;
        let mut is_all_the_same_language = !locales.is_empty();
        for tag in &locales {
            union_of_sub_script_bits |= tag.sub_script_bits;
            if tag.language != locales[0].language {
                is_all_the_same_language = false;
            }
        }
        Self {
            locales,
            union_of_sub_script_bits,
            is_all_the_same_language,
        }
    }

    /// Parse a comma-separated list of locale strings.
    pub fn parse(list: &str) -> Self {
        let locales = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(LocaleTag::new)
            .collect();
        Self::new(locales)
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn get(&self, index: usize) -> &LocaleTag {
        &self.locales[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocaleTag> {
        self.locales.iter()
    }

    /// Union of the script-family bits of every entry.
    #[inline]
    pub fn union_of_sub_script_bits(&self) -> u8 {
        self.union_of_sub_script_bits
    }

    /// Returns true if every entry carries the same language subtag.
    #[inline]
    pub fn is_all_the_same_language(&self) -> bool {
        self.is_all_the_same_language
    }

    /// The locale used for word breaking and hyphenation: the first entry,
    /// or the unpopulated tag for an empty list.
    pub fn effective_locale(&self) -> LocaleTag {
        self.locales.first().copied().unwrap_or_default()
    }
}

// ============================================================================
// LocaleListRegistry
// ============================================================================

/// Sentinel id that never names a registered list.
pub const INVALID_LOCALE_LIST_ID: u32 = u32::MAX;

struct RegistryInner {
    lists: Vec<Arc<LocaleList>>,
    ids: FxHashMap<String, u32>,
}

static LOCALE_LIST_REGISTRY: OnceLock<RwLock<RegistryInner>> = OnceLock::new();

/// Process-wide interning of locale-list strings to dense ids.
///
/// Runs carry a `u32` list id rather than the list itself; id 0 is always
/// the empty list. Reads are lock-guarded and safe for concurrent use from
/// parallel paragraph passes.
pub struct LocaleListRegistry;

impl LocaleListRegistry {
    fn inner() -> &'static RwLock<RegistryInner> {
        LOCALE_LIST_REGISTRY.get_or_init(|| {
            let mut ids = FxHashMap::default();
            ids.insert(String::new(), 0);
            RwLock::new(RegistryInner {
                lists: vec![Arc::new(LocaleList::default())],
                ids,
            })
        })
    }

    /// Intern a comma-separated locale-list string, returning its id.
    /// The same string always yields the same id.
    pub fn get_id(locale_string: &str) -> u32 {
        let registry = Self::inner();
        if let Some(&id) = registry
            .read()
            .expect("locale registry poisoned")
            .ids
            .get(locale_string)
        {
            return id;
        }

        let mut guard = registry.write().expect("locale registry poisoned");
        if let Some(&id) = guard.ids.get(locale_string) {
            return id;
        }
        let id = guard.lists.len() as u32;
        guard.lists.push(Arc::new(LocaleList::parse(locale_string)));
        guard.ids.insert(locale_string.to_string(), id);
        id
    }

    /// Fetch a registered list. Unknown ids (including
    /// [`INVALID_LOCALE_LIST_ID`]) resolve to the empty list.
    pub fn get_by_id(id: u32) -> Arc<LocaleList> {
        let guard = Self::inner().read().expect("locale registry poisoned");
        match guard.lists.get(id as usize) {
            Some(list) => Arc::clone(list),
            None => Arc::clone(&guard.lists[0]),
        }
    }

    /// The locale a run with this list id uses for word breaking and
    /// hyphenation.
    pub fn effective_locale(id: u32) -> LocaleTag {
        Self::get_by_id(id).effective_locale()
    }
}
