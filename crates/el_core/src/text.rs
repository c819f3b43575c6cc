//! Markup stripping and sentence segmentation.

use scraper::{ElementRef, Html, Node};
use unicode_segmentation::UnicodeSegmentation;

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Titles that precede a name and practically never end a sentence.
const TITLES: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "gen", "gov", "sen", "rep", "lt", "col", "capt", "sgt",
    "mt", "vs", "fig", "approx", "dept",
];

/// Abbreviations that may also close a sentence. Joined only when lowercase text or a
/// number follows ("No. 5", "Acme Inc. shares").
const ABBREVIATIONS: &[&str] = &[
    "st", "sr", "jr", "etc", "inc", "ltd", "co", "corp", "no", "est", "jan", "feb", "mar",
    "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Capitalised words that usually open a new sentence rather than continue a name.
const SENTENCE_OPENERS: &[&str] = &[
    "A", "After", "An", "And", "As", "At", "Before", "But", "He", "Her", "His", "However", "I",
    "If", "In", "It", "Its", "Later", "Meanwhile", "Now", "On", "Or", "Our", "She", "So",
    "That", "The", "Their", "Then", "There", "These", "They", "This", "Those", "Today", "We",
    "When", "While", "Yet", "You",
];

/// Strips HTML markup, turning block-level boundaries into spaces and collapsing whitespace.
pub fn clean_html(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    collect_text(fragment.root_element(), &mut out);
    collapse_whitespace(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    let name = child_element.value().name();
                    if matches!(name, "script" | "style") {
                        continue;
                    }
                    let block = BLOCK_ELEMENTS.contains(&name);
                    if block {
                        out.push(' ');
                    }
                    collect_text(child_element, out);
                    if block {
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits plain text into sentences.
///
/// Unicode sentence boundaries (UAX #29) are refined so that abbreviations, initials and
/// dotted acronyms ("Dr.", "J.", "U.S.") stay attached to the words that follow.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences: Vec<String> = Vec::new();
    for segment in text.unicode_sentences() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match sentences.last_mut() {
            Some(previous) if continues(previous, segment) => {
                previous.push(' ');
                previous.push_str(segment);
            }
            _ => sentences.push(segment.to_string()),
        }
    }
    sentences
}

/// Cleans markup and splits the result into sentences.
pub fn html_sentences(input: &str) -> Vec<String> {
    split_sentences(&clean_html(input))
}

/// Whether `next` continues `previous` across a boundary placed after an abbreviation,
/// an initial ("W.") or a dotted acronym ("U.S.").
fn continues(previous: &str, next: &str) -> bool {
    let Some(token) = previous.split_whitespace().last() else {
        return false;
    };
    let token = token.trim_start_matches(|c: char| c == '(' || c == '"' || c == '\'');
    let Some(stem) = token.strip_suffix('.') else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }
    let lowered = stem.to_lowercase();
    if TITLES.contains(&lowered.as_str()) {
        return true;
    }

    let next_word = next
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric());
    let Some(first) = next_word.chars().next() else {
        return false;
    };
    let lowercase_or_number = first.is_lowercase() || first.is_ascii_digit();

    let initial = stem.chars().count() == 1 && stem.chars().all(char::is_uppercase);
    let acronym = stem.contains('.')
        && stem
            .split('.')
            .all(|part| part.chars().count() == 1 && part.chars().all(char::is_alphabetic));
    if initial || acronym {
        // "George W. Bush", "U.S. Senators", but not "Plan B. The board".
        return lowercase_or_number
            || (first.is_uppercase() && !SENTENCE_OPENERS.contains(&next_word));
    }

    lowercase_or_number && ABBREVIATIONS.contains(&lowered.as_str())
}
