use parabreak::locale::Variant;
use parabreak::measure::{ConstantLineWidth, LineWidth, Paint, Range, Run, VerticalExtent};
use parabreak::{
  break_line_optimal, populate_candidates, BreakStrategy, EndHyphenEdit, HyphenationFrequency,
  HyphenatorMap, LocaleListRegistry, LocaleTag, MeasuredText, PatternHyphenator, StartHyphenEdit,
  UaxWordBreaker,
};
use std::sync::Arc;

const LETTER_WIDTH: f32 = 10.0;
const SPACE_WIDTH: f32 = 5.0;
const HYPHEN_WIDTH: f32 = 7.0;

fn utf16(s: &str) -> Vec<u16> {
  s.encode_utf16().collect()
}

struct TestRun {
  range: Range,
  is_rtl: bool,
  locale_list_id: u32,
  can_hyphenate: bool,
  widths: Vec<f32>,
}

impl Run for TestRun {
  fn range(&self) -> Range {
    self.range
  }

  fn is_rtl(&self) -> bool {
    self.is_rtl
  }

  fn locale_list_id(&self) -> u32 {
    self.locale_list_id
  }

  fn can_hyphenate(&self) -> bool {
    self.can_hyphenate
  }

  fn paint(&self) -> Paint {
    Paint::new(10.0, 1.0)
  }

  fn measure_hyphen_piece(
    &self,
    _text: &[u16],
    piece: Range,
    start_edit: StartHyphenEdit,
    end_edit: EndHyphenEdit,
  ) -> f32 {
    let mut width: f32 = piece.iter().map(|i| self.widths[i as usize]).sum();
    if start_edit != StartHyphenEdit::NoEdit {
      width += HYPHEN_WIDTH;
    }
    if end_edit != EndHyphenEdit::NoEdit {
      width += HYPHEN_WIDTH;
    }
    width
  }
}

fn char_widths(text: &str, letter_width: f32) -> Vec<f32> {
  utf16(text)
    .iter()
    .map(|&c| {
      if c == 0x0020 || c == 0x00A0 {
        SPACE_WIDTH
      } else {
        letter_width
      }
    })
    .collect()
}

fn measure(text: &str, locale_list: &str, can_hyphenate: bool, letter_width: f32) -> MeasuredText {
  let widths = char_widths(text, letter_width);
  let len = widths.len() as u32;
  let run = TestRun {
    range: Range::new(0, len),
    is_rtl: false,
    locale_list_id: LocaleListRegistry::get_id(locale_list),
    can_hyphenate,
    widths: widths.clone(),
  };
  MeasuredText {
    widths,
    extents: vec![VerticalExtent::new(8.0, 3.0); len as usize],
    runs: vec![Box::new(run)],
  }
}

fn register_english_hyphenator() {
  let en = LocaleTag::new("en");
  HyphenatorMap::add(
    &en,
    Arc::new(PatternHyphenator::for_locale(&en).expect("embedded patterns")),
  );
}

#[test]
fn empty_text_produces_empty_result() {
  let measured = MeasuredText {
    widths: Vec::new(),
    extents: Vec::new(),
    runs: Vec::new(),
  };
  let result = break_line_optimal(
    &[],
    &measured,
    &ConstantLineWidth(1000.0),
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    false,
  )
  .expect("empty input");
  assert!(result.is_empty());
  assert!(result.widths.is_empty());
  assert!(result.flags.is_empty());
}

#[test]
fn single_word_fits_on_one_line() {
  let text = "Hello";
  let measured = measure(text, "en-US", false, 50.0);
  let result = break_line_optimal(
    &utf16(text),
    &measured,
    &ConstantLineWidth(1000.0),
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    false,
  )
  .expect("break");

  assert_eq!(result.len(), 1);
  assert_eq!(result.break_points, vec![5]);
  assert_eq!(result.widths, vec![250.0]);
  assert_eq!(result.flags, vec![0]);
  assert_eq!(result.ascents, vec![8.0]);
  assert_eq!(result.descents, vec![3.0]);
}

#[test]
fn narrow_column_breaks_after_every_word() {
  let text = "aaaa bbbb cccc dddd";
  let measured = measure(text, "en-US", false, LETTER_WIDTH);
  let result = break_line_optimal(
    &utf16(text),
    &measured,
    &ConstantLineWidth(50.0),
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    false,
  )
  .expect("break");

  assert_eq!(result.len(), 4);
  assert_eq!(result.break_points, vec![5, 10, 15, 19]);
  // Each line is one four-letter word; trailing spaces do not count.
  assert_eq!(result.widths, vec![40.0, 40.0, 40.0, 40.0]);
  assert!(result.flags.iter().all(|&f| f == 0));
}

#[test]
fn desperate_breaks_fire_when_no_word_fits() {
  let text = "aaaa bbbb cccc dddd";
  let measured = measure(text, "en-US", false, LETTER_WIDTH);
  let width = 25.0;
  let result = break_line_optimal(
    &utf16(text),
    &measured,
    &ConstantLineWidth(width),
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    false,
  )
  .expect("break");

  // No word fits, so per-grapheme breaks keep every line within bounds.
  assert!(result.len() >= 7);
  for &w in &result.widths {
    assert!(w <= width, "line width {} exceeds {}", w, width);
  }

  // Break points are strictly increasing and land only on positions with
  // a non-zero advance.
  let mut prev = 0;
  for &bp in &result.break_points {
    assert!(bp > prev, "break points must be strictly increasing");
    prev = bp;
  }

  // Total line width never exceeds the paragraph's total advance.
  let total: f32 = measured.widths.iter().sum();
  let sum: f32 = result.widths.iter().sum();
  assert!(sum <= total + 0.1);
}

#[test]
fn german_1996_locale_round_trips() {
  let tag = LocaleTag::new("de-1996");
  assert_eq!(tag.variant(), Variant::German1996);
  assert_eq!(tag.to_string(), "de-1996");
}

#[test]
fn hyphenation_splits_a_long_word() {
  register_english_hyphenator();
  let text = "hyphenation";
  let measured = measure(text, "en-US", true, LETTER_WIDTH);
  let width = 80.0;
  let result = break_line_optimal(
    &utf16(text),
    &measured,
    &ConstantLineWidth(width),
    BreakStrategy::HighQuality,
    HyphenationFrequency::Full,
    false,
  )
  .expect("break");

  assert!(result.len() >= 2);
  for &w in &result.widths {
    assert!(w <= width, "line width {} exceeds {}", w, width);
  }

  // At least one line ends in an inserted hyphen, and the desperate
  // penalty hierarchy keeps grapheme breaks out when hyphens suffice.
  let hyphen_ends = result
    .flags
    .iter()
    .filter(|&&f| {
      let (_, end) = parabreak::unpack_hyphen_edit(f);
      end == EndHyphenEdit::InsertHyphen
    })
    .count();
  assert!(hyphen_ends >= 1);
}

#[test]
fn candidate_widths_are_consistent() {
  register_english_hyphenator();
  let text = "hyphenation and desperation in narrow columns";
  let measured = measure(text, "en-US", true, LETTER_WIDTH);
  let mut breaker = UaxWordBreaker::new();
  let context = populate_candidates(
    &utf16(text),
    &measured,
    &ConstantLineWidth(30.0),
    HyphenationFrequency::Full,
    false,
    &mut breaker,
  )
  .expect("candidates");

  // The sentinel leads, offsets are monotone, and for every pair i < j
  // the line width between them is non-negative.
  assert_eq!(context.candidates[0].offset, 0);
  assert_eq!(context.candidates[0].pre_break, 0.0);
  for pair in context.candidates.windows(2) {
    assert!(pair[0].offset <= pair[1].offset);
    assert!(pair[0].post_break <= pair[1].post_break + 1e-9);
  }
  for i in 0..context.candidates.len() {
    for j in i + 1..context.candidates.len() {
      assert!(
        context.candidates[j].post_break - context.candidates[i].pre_break >= -1e-9,
        "negative line width between candidates {} and {}",
        i,
        j
      );
    }
  }
}

#[test]
fn tab_rejects_the_paragraph() {
  let text = "before\tafter";
  let measured = measure(text, "en-US", false, LETTER_WIDTH);
  let result = break_line_optimal(
    &utf16(text),
    &measured,
    &ConstantLineWidth(100.0),
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    false,
  );
  assert!(result.is_err());
}

#[test]
fn rtl_run_direction_reaches_candidates() {
  let text = "one two";
  let widths = char_widths(text, LETTER_WIDTH);
  let len = widths.len() as u32;
  let run = TestRun {
    range: Range::new(0, len),
    is_rtl: true,
    locale_list_id: LocaleListRegistry::get_id("he-IL"),
    can_hyphenate: false,
    widths: widths.clone(),
  };
  let measured = MeasuredText {
    widths,
    extents: vec![VerticalExtent::new(8.0, 3.0); len as usize],
    runs: vec![Box::new(run)],
  };

  let mut breaker = UaxWordBreaker::new();
  let context = populate_candidates(
    &utf16(text),
    &measured,
    &ConstantLineWidth(100.0),
    HyphenationFrequency::None,
    false,
    &mut breaker,
  )
  .expect("candidates");
  assert!(context.candidates[1..].iter().all(|c| c.is_rtl));
}

#[test]
fn multiple_runs_with_different_locales() {
  // Two runs over one paragraph, splitting at the space after "first".
  let text = "first second";
  let widths = char_widths(text, LETTER_WIDTH);
  let len = widths.len() as u32;
  let left = TestRun {
    range: Range::new(0, 6),
    is_rtl: false,
    locale_list_id: LocaleListRegistry::get_id("en-US"),
    can_hyphenate: false,
    widths: widths.clone(),
  };
  let right = TestRun {
    range: Range::new(6, len),
    is_rtl: false,
    locale_list_id: LocaleListRegistry::get_id("fr-FR"),
    can_hyphenate: false,
    widths: widths.clone(),
  };
  let measured = MeasuredText {
    widths,
    extents: vec![VerticalExtent::new(8.0, 3.0); len as usize],
    runs: vec![Box::new(left), Box::new(right)],
  };

  let result = break_line_optimal(
    &utf16(text),
    &measured,
    &ConstantLineWidth(60.0),
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    false,
  )
  .expect("break");
  assert_eq!(result.break_points, vec![6, 12]);
  assert_eq!(result.widths, vec![50.0, 60.0]);
}

struct FirstLineWide;

impl LineWidth for FirstLineWide {
  fn at(&self, line_no: u32) -> f32 {
    if line_no == 0 {
      100.0
    } else {
      40.0
    }
  }

  fn min_width(&self) -> f32 {
    40.0
  }
}

#[test]
fn per_line_widths_are_respected() {
  let text = "aaaa bbbb cccc";
  let measured = measure(text, "en-US", false, LETTER_WIDTH);
  let result = break_line_optimal(
    &utf16(text),
    &measured,
    &FirstLineWide,
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    false,
  )
  .expect("break");

  // Two words fit the wide first line; the third drops to a narrow line.
  assert_eq!(result.break_points, vec![10, 14]);
  assert_eq!(result.widths, vec![85.0, 40.0]);
}

#[test]
fn justified_paragraph_prefers_shrinkable_lines() {
  // "aaa bbb" measures 65 against a width of 64. Ragged-right must not
  // shrink spaces, so that line is overfull and the paragraph wraps word
  // by word; justified text compresses the interior space and keeps it.
  let text = "aaa bbb ccc d";
  let measured = measure(text, "en-US", false, LETTER_WIDTH);
  let width = 64.0;

  let ragged = break_line_optimal(
    &utf16(text),
    &measured,
    &ConstantLineWidth(width),
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    false,
  )
  .expect("break");
  let justified = break_line_optimal(
    &utf16(text),
    &measured,
    &ConstantLineWidth(width),
    BreakStrategy::HighQuality,
    HyphenationFrequency::None,
    true,
  )
  .expect("break");

  assert_eq!(ragged.break_points, vec![4, 8, 13]);
  assert_eq!(justified.break_points, vec![8, 13]);
}
