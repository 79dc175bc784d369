//! Sentence splitting on terminal punctuation.

use once_cell::sync::Lazy;
use regex::{Matches, Regex};
use std::iter::FusedIterator;

/// Punctuation that ends a speakable sentence: ". ", a final ".", "!", "?" or ";".
static SENTENCE_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\. |\.$|[!?;]").expect("sentence punctuation regex should compile"));

/// Lazy iterator over the sentences of a text, see [`split_sentences`].
pub struct Sentences<'a> {
    text: &'a str,
    matches: Matches<'static, 'a>,
    /// Start of the segment that has not been yielded yet
    position: usize,
    include_trailing: bool,
    finished: bool,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.finished {
            return None;
        }

        for punctuation in self.matches.by_ref() {
            let start = self.position;
            self.position = punctuation.end();

            // Empty segment: its punctuation goes with it
            if punctuation.start() == start {
                continue;
            }

            return Some(&self.text[start..punctuation.end()]);
        }

        self.finished = true;
        let rest = &self.text[self.position..];
        if self.include_trailing && !rest.is_empty() {
            Some(rest)
        } else {
            None
        }
    }
}

impl FusedIterator for Sentences<'_> {}

/// Split text into sentences, each keeping its terminal punctuation.
///
/// Sentences are borrowed slices of `text`, yielded left to right. Text after
/// the last punctuation mark is yielded only when `include_trailing` is set.
pub fn split_sentences(text: &str, include_trailing: bool) -> Sentences<'_> {
    Sentences {
        text,
        matches: SENTENCE_PUNCTUATION.find_iter(text),
        position: 0,
        include_trailing,
        finished: false,
    }
}
