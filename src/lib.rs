//! Optimal paragraph line breaking for internationalized text
//!
//! parabreak chooses line break positions for a paragraph that has
//! already been shaped: given per-character advances, styled bidi runs,
//! vertical extents, and locale metadata, it minimizes a global cost
//! combining line fit, hyphenation, and line count, and reports the break
//! offsets together with each line's width, extents, and hyphen edits.
//!
//! # Pipeline
//!
//! 1. **Candidate enumeration** ([`candidates`]): one pass over the
//!    measured paragraph collects word breaks, hyphenation breaks, and
//!    last-resort per-grapheme breaks, each annotated with cumulative
//!    widths and penalties.
//! 2. **Optimization** ([`optimizer`]): a dynamic program over the
//!    candidate DAG picks the cheapest break set under a width model with
//!    per-line variable widths and limited whitespace shrinkage.
//!
//! Locale handling ([`locale`]) tags runs with compact BCP-47 values and
//! selects hyphenators; word boundaries and hyphenation patterns come from
//! pluggable providers ([`word_break`], [`hyphen`]) with UAX #14 and Liang
//! pattern implementations included.
//!
//! Shaping, font selection, and bidi analysis are external: the engine
//! only consumes their output through [`measure::MeasuredText`].
//!
//! # Example
//!
//! ```rust,ignore
//! use parabreak::{break_line_optimal, BreakStrategy, HyphenationFrequency};
//! use parabreak::measure::ConstantLineWidth;
//!
//! let result = break_line_optimal(
//!     &text,                    // UTF-16 code units
//!     &measured,                // advances + extents + runs
//!     &ConstantLineWidth(240.0),
//!     BreakStrategy::HighQuality,
//!     HyphenationFrequency::Normal,
//!     false,
//! )?;
//! for (offset, width) in result.break_points.iter().zip(&result.widths) {
//!     println!("line up to {} is {} wide", offset, width);
//! }
//! ```

pub mod candidates;
pub mod error;
pub mod hyphen;
pub mod locale;
pub mod measure;
pub mod optimizer;
pub mod word_break;

pub use candidates::{populate_candidates, Candidate, OptimizeContext};
pub use error::{BreakError, Error, LocaleError, Result};
pub use hyphen::{
    pack_hyphen_edit, unpack_hyphen_edit, EndHyphenEdit, HyphenEdit, HyphenationFrequency,
    HyphenationType, Hyphenator, HyphenatorMap, NullHyphenator, PatternHyphenator,
    StartHyphenEdit,
};
pub use locale::{LocaleList, LocaleListRegistry, LocaleTag, SubtagBits};
pub use measure::{ConstantLineWidth, LineWidth, MeasuredText, Paint, Range, Run, VerticalExtent};
pub use optimizer::{
    break_line_optimal, break_line_optimal_with_breaker, compute_optimal_breaks, BreakStrategy,
    LineBreakResult,
};
pub use word_break::{UaxWordBreaker, WordBreaker};
