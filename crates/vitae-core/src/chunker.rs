//! Text chunking for semantic extraction.
//!
//! Turns raw free-form text (a CV, a job description) into an ordered set
//! of short, meaningful fragments suitable for embedding. The pipeline:
//! noise removal → blank-line section split → sentence/list-item units →
//! connector sub-split → noise filter → case-insensitive dedup → cap.
//!
//! `chunk` is a pure function: identical input always yields identical
//! output, and empty input yields an empty sequence rather than an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::{CHUNK_MAX_LEN, CHUNK_MIN_ALPHA, CHUNK_MIN_LEN, MAX_CHUNKS};
use crate::models::Chunk;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("valid regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});

// Digit runs with phone punctuation, 10+ chars. Confined to one line so a
// genuine number list cannot swallow surrounding text.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\(?[\d \-()]{10,}").expect("valid regex"));

// Characters with no signal for entity matching. Bullet and pipe markers
// survive because the splitter keys on them.
static STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,;:!?\-()&+/|*•]").expect("valid regex"));

static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

static SECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

// Sentence punctuation, bullet markers, numbered-list markers, and bare
// line breaks all end a unit. CV lines are list items more often than not.
static UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?]+\s+|\n\s*[-•*]\s*|\n\s*\d+[.)]\s*|\n").expect("valid regex")
});

static CONNECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,;]\s*|\s+and\s+|\s+or\s+|\s*\|\s*").expect("valid regex")
});

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,4}[-/]\d{1,4}([-/]\d{2,4})?$").expect("valid regex"));

static PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^page\s+\d+$").expect("valid regex"));

/// Words carrying no entity signal on their own. A fragment composed only
/// of these is discarded.
const STOP_WORDS: &[&str] = &[
    "and", "or", "the", "a", "an", "of", "in", "on", "at", "to", "for", "with", "from", "by",
    "as", "is", "are", "was", "were", "be", "been", "have", "has", "had", "i", "my", "me", "we",
    "our", "this", "that", "it", "its",
];

/// Split raw text into ordered, deduplicated fragments.
///
/// Output invariants: at most [`MAX_CHUNKS`] fragments, no two equal
/// case-insensitively, original relative order preserved, offsets are byte
/// offsets into the cleaned text and non-decreasing. Empty or whitespace
/// input yields an empty vector.
pub fn chunk(text: &str) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let cleaned = clean_text(text);

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

    for section in split_spans(&cleaned, 0, &SECTION_RE) {
        for unit in split_spans(&cleaned[section.0..section.1], section.0, &UNIT_RE) {
            for (start, end) in
                split_spans(&cleaned[unit.0..unit.1], unit.0, &CONNECTOR_RE)
            {
                let (start, end) = trim_span(&cleaned, start, end);
                if start >= end {
                    continue;
                }
                let fragment = &cleaned[start..end];
                if !is_meaningful(fragment) {
                    continue;
                }
                let key = fragment.to_lowercase();
                if seen.insert(key) {
                    chunks.push(Chunk {
                        text: fragment.to_string(),
                        offset: start,
                    });
                    if chunks.len() == MAX_CHUNKS {
                        return chunks;
                    }
                }
            }
        }
    }

    chunks
}

/// Remove URLs, emails, phone numbers, and stray symbols; normalize
/// horizontal whitespace. Line structure is preserved so section and
/// list-item boundaries survive for the splitter.
fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = URL_RE.replace_all(&text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    let text = PHONE_RE.replace_all(&text, " ");
    let text = STRIP_RE.replace_all(&text, "");
    let text = HSPACE_RE.replace_all(&text, " ");
    text.into_owned()
}

/// Split `slice` on a separator regex, returning byte spans relative to
/// the full cleaned text (`base` is the slice's offset within it). Empty
/// spans between adjacent separators are skipped.
fn split_spans(slice: &str, base: usize, sep: &Regex) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for m in sep.find_iter(slice) {
        if m.start() > cursor {
            spans.push((base + cursor, base + m.start()));
        }
        cursor = m.end();
    }
    if cursor < slice.len() {
        spans.push((base + cursor, base + slice.len()));
    }
    spans
}

/// Shrink a span to exclude leading/trailing whitespace and orphaned list
/// punctuation.
fn trim_span(text: &str, start: usize, end: usize) -> (usize, usize) {
    let slice = &text[start..end];
    let trimmed_start = slice.len() - slice.trim_start_matches([' ', '\n', '-', '•', '*']).len();
    let trimmed_end = slice
        .trim_end_matches([' ', '\n', '.', ',', ';', ':', '!', '?'])
        .len();
    (start + trimmed_start, start + trimmed_end.max(trimmed_start))
}

/// Filter out noise: too short/long, too few letters, date-like strings,
/// page-number artifacts, and all-stop-word fragments.
fn is_meaningful(fragment: &str) -> bool {
    if fragment.len() < CHUNK_MIN_LEN || fragment.len() > CHUNK_MAX_LEN {
        return false;
    }

    let alpha = fragment.chars().filter(|c| c.is_alphabetic()).count();
    if alpha < CHUNK_MIN_ALPHA {
        return false;
    }

    if DATE_RE.is_match(fragment) || PAGE_RE.is_match(fragment) {
        return false;
    }

    fragment
        .split_whitespace()
        .any(|word| !STOP_WORDS.contains(&word.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(chunk("").is_empty());
        assert!(chunk("   \n\n  \t ").is_empty());
    }

    #[test]
    fn test_comma_separated_skills() {
        let chunks = chunk("Python, Django, AWS, machine learning");
        assert_eq!(
            texts(&chunks),
            vec!["Python", "Django", "machine learning"]
        );
        // "AWS" is three characters, below the minimum fragment length.
    }

    #[test]
    fn test_connector_words_split() {
        let chunks = chunk("Experienced with Docker and Kubernetes or Nomad");
        assert_eq!(
            texts(&chunks),
            vec!["Experienced with Docker", "Kubernetes", "Nomad"]
        );
    }

    #[test]
    fn test_pipe_separator_split() {
        let chunks = chunk("Rust | Go | distributed systems");
        assert_eq!(texts(&chunks), vec!["Rust", "distributed systems"]);
        // "Go" falls below the minimum length, as in the length filter test.
    }

    #[test]
    fn test_bullet_list_split() {
        let text = "Skills:\n- project management\n- data analysis\n• public speaking";
        let chunks = chunk(text);
        assert_eq!(
            texts(&chunks),
            vec![
                "Skills",
                "project management",
                "data analysis",
                "public speaking"
            ]
        );
    }

    #[test]
    fn test_numbered_list_split() {
        let text = "1. software development\n2. database administration";
        let chunks = chunk(text);
        assert_eq!(
            texts(&chunks),
            vec!["software development", "database administration"]
        );
    }

    #[test]
    fn test_sentence_split() {
        let chunks = chunk("Built web applications. Led a small team! Shipped weekly?");
        assert_eq!(
            texts(&chunks),
            vec!["Built web applications", "Led a small team", "Shipped weekly"]
        );
    }

    #[test]
    fn test_urls_emails_phones_stripped() {
        let text = "Contact: jane.doe@example.com +1 (555) 123-4567 https://example.com/cv\nPython programming";
        let chunks = chunk(text);
        assert_eq!(texts(&chunks), vec!["Contact", "Python programming"]);
    }

    #[test]
    fn test_page_numbers_and_dates_dropped() {
        let chunks = chunk("Page 3\n2019-2023\n12/2020\nsoftware engineering");
        assert_eq!(texts(&chunks), vec!["software engineering"]);
    }

    #[test]
    fn test_stop_word_only_fragments_dropped() {
        let chunks = chunk("and the, with a, machine learning");
        assert_eq!(texts(&chunks), vec!["machine learning"]);
    }

    #[test]
    fn test_case_insensitive_dedup_preserves_first() {
        let chunks = chunk("Python, python, PYTHON, Django");
        assert_eq!(texts(&chunks), vec!["Python", "Django"]);
    }

    #[test]
    fn test_order_preserved() {
        let chunks = chunk("zebra handling, apple farming, mango picking");
        assert_eq!(
            texts(&chunks),
            vec!["zebra handling", "apple farming", "mango picking"]
        );
    }

    #[test]
    fn test_offsets_non_decreasing_and_aligned() {
        let text = "Python, Django\n\nmachine learning and data science";
        let chunks = chunk(text);
        let mut last = 0;
        for c in &chunks {
            assert!(c.offset >= last, "offsets must be non-decreasing");
            last = c.offset;
        }
        // Every offset points at its fragment in the cleaned text.
        let cleaned = super::clean_text(text);
        for c in &chunks {
            assert_eq!(&cleaned[c.offset..c.offset + c.text.len()], c.text);
        }
    }

    #[test]
    fn test_capped_at_max_chunks() {
        let text = (0..300)
            .map(|i| format!("unique skill number {}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let chunks = chunk(&text);
        assert_eq!(chunks.len(), MAX_CHUNKS);
    }

    #[test]
    fn test_deterministic() {
        let text = "Python, Django. Led a team\n- data analysis\n- machine learning";
        assert_eq!(chunk(text), chunk(text));
    }

    #[test]
    fn test_idempotent_on_clean_fragment() {
        let first = chunk("machine learning");
        assert_eq!(texts(&first), vec!["machine learning"]);
        let second = chunk(&first[0].text);
        assert_eq!(texts(&second), texts(&first));
    }

    #[test]
    fn test_blank_line_sections() {
        let text = "Experience\n\nSoftware engineering at Acme\n\nEducation\n\nComputer science degree";
        let chunks = chunk(text);
        assert_eq!(
            texts(&chunks),
            vec![
                "Experience",
                "Software engineering at Acme",
                "Education",
                "Computer science degree"
            ]
        );
    }

    #[test]
    fn test_overlong_fragment_dropped() {
        let long = "x".repeat(250);
        let chunks = chunk(&format!("{}, short valid fragment", long));
        assert_eq!(texts(&chunks), vec!["short valid fragment"]);
    }
}
