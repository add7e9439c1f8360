// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS segment counting.
//!
//! A message is billed per segment. Any Cyrillic code point switches the
//! whole message to the 70-character encoding; otherwise 160 characters fit
//! in one segment. Length is counted in Unicode scalar values.

use edusms_core::{AlphabetClass, SegmentResult};

/// Cyrillic block; one hit is enough to change the encoding.
fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

/// Classify the alphabet a message is billed under.
pub fn classify(text: &str) -> AlphabetClass {
    if text.chars().any(is_cyrillic) {
        AlphabetClass::Cyrillic
    } else {
        AlphabetClass::Latin
    }
}

/// Number of billed segments for `text`. Empty text is zero segments.
pub fn compute_segments(text: &str) -> SegmentResult {
    let alphabet = classify(text);
    let size = alphabet.segment_size();
    let len = text.chars().count();
    let segment_count = len.div_ceil(size);
    SegmentResult {
        alphabet,
        segment_count: u32::try_from(segment_count).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn latin_boundaries() {
        assert_eq!(compute_segments(&"a".repeat(160)).segment_count, 1);
        assert_eq!(compute_segments(&"a".repeat(161)).segment_count, 2);
        assert_eq!(compute_segments(&"a".repeat(320)).segment_count, 2);
        assert_eq!(compute_segments("Hello").alphabet, AlphabetClass::Latin);
    }

    #[test]
    fn cyrillic_boundaries() {
        let r = compute_segments(&"я".repeat(70));
        assert_eq!(r.alphabet, AlphabetClass::Cyrillic);
        assert_eq!(r.segment_count, 1);
        assert_eq!(compute_segments(&"я".repeat(71)).segment_count, 2);
    }

    #[test]
    fn one_cyrillic_letter_reclassifies_whole_message() {
        let text = format!("{}ж", "a".repeat(100));
        let r = compute_segments(&text);
        assert_eq!(r.alphabet, AlphabetClass::Cyrillic);
        assert_eq!(r.segment_count, 2);
    }

    #[test]
    fn empty_text_is_zero_segments() {
        let r = compute_segments("");
        assert_eq!(r.alphabet, AlphabetClass::Latin);
        assert_eq!(r.segment_count, 0);
    }

    #[test]
    fn counts_code_points_not_bytes() {
        // Uzbek Latin apostrophes and accented letters are multi-byte but single chars.
        let text = "é".repeat(160);
        assert_eq!(text.len(), 320);
        assert_eq!(compute_segments(&text).segment_count, 1);
    }

    #[test]
    fn block_edges_are_cyrillic() {
        assert_eq!(classify("\u{0400}"), AlphabetClass::Cyrillic);
        assert_eq!(classify("\u{04FF}"), AlphabetClass::Cyrillic);
        assert_eq!(classify("\u{0500}"), AlphabetClass::Latin);
    }

    proptest! {
        #[test]
        fn count_matches_ceiling_division(text in "\\PC{0,500}") {
            let r = compute_segments(&text);
            let len = text.chars().count();
            let size = r.alphabet.segment_size();
            prop_assert_eq!(r.segment_count as usize, len.div_ceil(size));
            prop_assert!(r.segment_count as usize * size >= len);
        }

        #[test]
        fn non_empty_latin_ascii_is_at_least_one(text in "[ -~]{1,400}") {
            let r = compute_segments(&text);
            prop_assert_eq!(r.alphabet, AlphabetClass::Latin);
            prop_assert!(r.segment_count >= 1);
        }
    }
}
