//! Recursive per-format text splitting.
//!
//! Splits on a prioritized separator cascade: paragraph breaks first,
//! then format-specific breaks (slide markers, tabs, chapter markers),
//! then sentences, words, and finally raw characters as last resort.

use docshard_core::{ChunkGeometry, DocumentFormat};
use std::collections::VecDeque;

/// Name recorded in every fragment's `splitting_method` metadata.
pub const SPLITTING_METHOD: &str = "recursive_character";

/// Separator cascade tuned for a format.
pub fn separators_for(format: DocumentFormat) -> &'static [&'static str] {
    match format {
        DocumentFormat::Pptx => &["\n\n", "\nSlide ", "\n", ". ", " ", ""],
        DocumentFormat::Xlsx | DocumentFormat::Xls | DocumentFormat::Csv => {
            &["\n\n", "\n", "\t", ". ", " ", ""]
        }
        DocumentFormat::Epub | DocumentFormat::Html | DocumentFormat::Mht => {
            &["\n\n", "\nChapter ", "\n", ". ", " ", ""]
        }
        _ => &["\n\n", "\n", ". ", " ", ""],
    }
}

/// Recursive character splitter honoring a [`ChunkGeometry`].
pub struct TextSplitter {
    separators: &'static [&'static str],
    geometry: ChunkGeometry,
}

impl TextSplitter {
    pub fn new(format: DocumentFormat, geometry: ChunkGeometry) -> Self {
        Self {
            separators: separators_for(format),
            geometry,
        }
    }

    /// Split text into chunks of at most `geometry.size` characters,
    /// overlapping by roughly `geometry.overlap`.
    pub fn split(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return vec![];
        }
        if trimmed.chars().count() <= self.geometry.size {
            return vec![trimmed.to_string()];
        }
        self.split_with(trimmed, self.separators)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);

        if separator.is_empty() {
            return self.force_split_by_chars(text);
        }

        let mut chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();

        for piece in text.split(separator) {
            if piece.chars().count() <= self.geometry.size {
                good_splits.push(piece.to_string());
            } else {
                if !good_splits.is_empty() {
                    chunks.extend(self.merge_splits(std::mem::take(&mut good_splits), separator));
                }
                // Oversized piece: descend to the next separator tier.
                chunks.extend(self.split_with(piece, rest));
            }
        }
        if !good_splits.is_empty() {
            chunks.extend(self.merge_splits(good_splits, separator));
        }
        chunks
    }

    /// Greedily merge small splits back into chunks near the target size,
    /// carrying an overlap window between consecutive chunks.
    fn merge_splits(&self, splits: Vec<String>, separator: &str) -> Vec<String> {
        let sep_len = separator.chars().count();
        let mut chunks = Vec::new();
        let mut window: VecDeque<String> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let piece_len = piece.chars().count();
            let join_cost = if window.is_empty() { 0 } else { sep_len };

            if !window.is_empty() && total + piece_len + join_cost > self.geometry.size {
                push_chunk(&mut chunks, &window, separator);
                // Shrink the window down to the overlap budget.
                while total > self.geometry.overlap
                    || (total + piece_len + sep_len > self.geometry.size && total > 0)
                {
                    if let Some(front) = window.pop_front() {
                        total -= front.chars().count();
                        if !window.is_empty() {
                            total -= sep_len;
                        }
                    } else {
                        break;
                    }
                }
            }

            if !window.is_empty() {
                total += sep_len;
            }
            total += piece_len;
            window.push_back(piece);
        }

        push_chunk(&mut chunks, &window, separator);
        chunks
    }

    /// Raw character windows; the last resort for content with no natural
    /// break points.
    fn force_split_by_chars(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.geometry.size.saturating_sub(self.geometry.overlap).max(1);
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.geometry.size).min(chars.len());
            let chunk: String = chars[start..end].iter().collect();
            let chunk = chunk.trim().to_string();
            if !chunk.is_empty() {
                chunks.push(chunk);
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

/// First separator occurring in the text wins; `""` is the fallback.
fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<String>, separator: &str) {
    let joined = window
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
