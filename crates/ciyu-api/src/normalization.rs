//! Answer normalization for romanization and headword comparison.
//!
//! Typed pinyin and jyutping vary a lot in form: tone marks or tone numbers or
//! neither, `ü` typed as `v`, apostrophes, spacing. A learner who typed the right
//! syllables should be marked correct regardless of which form they used.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Normalize an answer for comparison.
///
/// Applies, in order:
/// 1. Lowercase
/// 2. NFD decomposition, dropping combining marks (tone diacritics, umlauts)
/// 3. Dropping tone digits `1`-`6` that directly follow a letter (`ni3` -> `ni`)
/// 4. Folding `v` into `u` (`lv4` and `lǜ` both become `lu`)
/// 5. Dropping punctuation, collapsing whitespace
///
/// Han characters pass through untouched, so headword answers compare exactly.
pub fn normalize_answer(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut after_letter = false;

    for c in s.to_lowercase().nfd() {
        if is_combining_mark(c) {
            continue;
        }

        if after_letter && ('1'..='6').contains(&c) {
            continue;
        }

        if c.is_alphanumeric() {
            out.push(if c == 'v' { 'u' } else { c });
            after_letter = c.is_alphabetic();
        } else {
            if c.is_whitespace() {
                out.push(' ');
            }
            after_letter = false;
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a learner's answer matches the expected one.
///
/// Syllable spacing is ignored (`nihao` matches `ni hao`). An expected answer
/// that normalizes to nothing never matches.
pub fn answers_match(expected: &str, given: &str) -> bool {
    let expected = compact(&normalize_answer(expected));
    !expected.is_empty() && expected == compact(&normalize_answer(given))
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
