use std::collections::HashSet;
use el_core::text::clean_html;
use el_core::{EntityExtractor, ExtractedEntity, Result};

/// Capitalised words that start sentences far more often than they name anything.
const STOPWORDS: &[&str] = &[
    "A", "After", "All", "Also", "Although", "An", "And", "As", "At", "Before", "Both", "But",
    "By", "Despite", "Each", "Every", "For", "From", "He", "Her", "Here", "His", "How",
    "However", "I", "If", "In", "It", "Its", "Later", "Many", "Meanwhile", "Most", "Mr", "Mrs",
    "Ms", "No", "Nobody", "Not", "Now", "Of", "On", "Or", "Other", "Several", "She", "Since",
    "So", "Some", "Still", "That", "The", "Their", "Then", "There", "These", "They", "This",
    "Those", "To", "Today", "We", "What", "When", "Where", "Which", "While", "Who", "Why",
    "With", "Yesterday", "Yet", "You",
];

/// Lowercase words allowed inside a multi-word name ("Bank of America").
const CONNECTORS: &[&str] = &["of", "de", "del", "la", "van", "von", "&"];

const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Corp", "Corporation", "Company", "Co", "Ltd", "LLC", "Group", "Bank", "University",
    "Institute", "Agency", "Association", "Party", "Ministry", "Council",
];

/// In-process tagger grouping runs of capitalised words into entity spans.
#[derive(Debug, Default, Clone)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Tags capitalised runs as entity spans.
    ///
    /// A single capitalised word opening a clause is kept only when it looks like a name:
    /// it is capitalised somewhere mid-clause, or it never appears in lowercase and is not
    /// an inflected form ("Shares", "Critics", "Reportedly").
    pub fn tag(&self, text: &str) -> Vec<ExtractedEntity> {
        let text = clean_html(text);
        let usage = WordUsage::collect(&text);
        let mut entities = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        let mut at_clause_start = true;
        let mut span_opens_clause = false;

        for raw in text.split_whitespace() {
            let word = trim_word(raw);
            let ends_clause = raw.ends_with(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | '"'));

            if is_name_word(word) {
                if current.is_empty() {
                    span_opens_clause = at_clause_start;
                }
                current.append(&mut pending);
                current.push(word);
            } else if !current.is_empty() && CONNECTORS.contains(&word) {
                pending.push(word);
            } else {
                pending.clear();
                flush(&mut current, span_opens_clause, &usage, &mut entities);
            }

            if ends_clause {
                pending.clear();
                flush(&mut current, span_opens_clause, &usage, &mut entities);
            }
            at_clause_start = closes_clause(raw);
        }
        flush(&mut current, span_opens_clause, &usage, &mut entities);
        entities
    }
}

/// How words are written across a whole text.
struct WordUsage<'a> {
    capitalised_mid_clause: HashSet<&'a str>,
    lowercase: HashSet<&'a str>,
}

impl<'a> WordUsage<'a> {
    fn collect(text: &'a str) -> Self {
        let mut usage = Self {
            capitalised_mid_clause: HashSet::new(),
            lowercase: HashSet::new(),
        };
        let mut at_clause_start = true;
        for raw in text.split_whitespace() {
            let word = trim_word(raw);
            match word.chars().next() {
                Some(first) if first.is_lowercase() => {
                    usage.lowercase.insert(word);
                }
                Some(first) if first.is_uppercase() && !at_clause_start => {
                    usage.capitalised_mid_clause.insert(word);
                }
                _ => {}
            }
            at_clause_start = closes_clause(raw);
        }
        usage
    }

    fn is_common_word(&self, word: &str) -> bool {
        if self.capitalised_mid_clause.contains(word) {
            return false;
        }
        self.lowercase.contains(word.to_lowercase().as_str()) || looks_inflected(word)
    }
}

fn trim_word(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '&')
}

fn closes_clause(raw: &str) -> bool {
    raw.trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')'))
        .ends_with(|c: char| matches!(c, '.' | '!' | '?' | ';' | ':'))
}

/// Plural nouns, third-person verbs and adverbs, leaving "Paris" and "Congress" alone.
fn looks_inflected(word: &str) -> bool {
    if word.chars().count() <= 3 {
        return false;
    }
    if word.ends_with("ly") {
        return true;
    }
    word.ends_with('s') && !["ss", "us", "is", "as"].iter().any(|end| word.ends_with(end))
}

fn is_name_word(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => !STOPWORDS.contains(&word),
        _ => false,
    }
}

fn flush(
    current: &mut Vec<&str>,
    opens_clause: bool,
    usage: &WordUsage<'_>,
    entities: &mut Vec<ExtractedEntity>,
) {
    if current.is_empty() {
        return;
    }
    if opens_clause && current.len() == 1 && usage.is_common_word(current[0]) {
        current.clear();
        return;
    }
    let label = if current.iter().any(|w| ORG_SUFFIXES.contains(w)) {
        "ORG"
    } else {
        "MISC"
    };
    let confidence = (0.5 + 0.15 * (current.len() as f32 - 1.0)).min(0.95);
    entities.push(ExtractedEntity {
        text: current.join(" "),
        label: label.to_string(),
        confidence,
    });
    current.clear();
}

#[async_trait::async_trait]
impl EntityExtractor for HeuristicExtractor {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        Ok(self.tag(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        HeuristicExtractor::new().tag(text).into_iter().map(|e| e.text).collect()
    }

    #[test]
    fn test_tags_capitalised_runs() {
        assert_eq!(
            names("Apple was founded by Steve Jobs. Microsoft competes with Apple."),
            vec!["Apple", "Steve Jobs", "Microsoft", "Apple"]
        );
    }

    #[test]
    fn test_connectors_inside_names() {
        assert_eq!(
            names("The Bank of America said of course it would."),
            vec!["Bank of America"]
        );
    }

    #[test]
    fn test_skips_sentence_starters_and_markup() {
        assert_eq!(names("<p>The market fell.</p><p>In Paris, traders waited.</p>"), vec!["Paris"]);
    }

    #[test]
    fn test_labels_and_confidence() {
        let entities = HeuristicExtractor::new().tag("Shares in Acme Corp rose while Berlin slept");
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "Acme Corp");
        assert_eq!(entities[0].label, "ORG");
        assert_eq!(entities[1].text, "Berlin");
        assert!(entities[0].confidence > entities[1].confidence);
        assert!(entities.iter().all(|e| (0.0..=1.0).contains(&e.confidence)));
    }

    #[test]
    fn test_skips_common_words_opening_clauses() {
        assert!(names("The council voted no. Critics were loud. Supporters cheered. Nobody left.").is_empty());
        assert!(names("Reportedly, the deal stalled.").is_empty());
        assert_eq!(names("Steve Jobs founded Apple."), vec!["Steve Jobs", "Apple"]);
    }

    #[test]
    fn test_clause_opener_kept_with_other_evidence() {
        // Lowercase elsewhere marks a common word, mid-clause capitals mark a name.
        assert!(names("Markets fell as markets do.").is_empty());
        assert_eq!(
            names("Reuters reported the news. Editors at Reuters agreed."),
            vec!["Reuters", "Reuters"]
        );
    }

    #[tokio::test]
    async fn test_extract_trait() {
        let extractor = HeuristicExtractor::new();
        let entities = extractor.extract_or_empty("Rust met Tokio.").await;
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "Rust");
        assert_eq!(entities[1].text, "Tokio");
    }
}
