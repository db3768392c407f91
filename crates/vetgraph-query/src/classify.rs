//! Intent classification and entity extraction.
//!
//! Intent: first matching pattern in a fixed priority table wins, `general`
//! otherwise. Entities: drug names from a gazetteer of ingested drugs plus a
//! spelling heuristic for unknown ones; animals and symptoms from keyword
//! tables. Best-effort, pattern based.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Classification, Entities, Intent};
use vetgraph_core::Result;
use vetgraph_store::{NodeLabel, SqliteStore};

/// Checked in order against the lower-cased question.
static INTENT_PATTERNS: Lazy<Vec<(Intent, Regex)>> = Lazy::new(|| {
    [
        (
            Intent::Usage,
            r"(how|what|when).*(use|give|administer|dose|dosage)",
        ),
        (Intent::SideEffects, r"(side effects|adverse|reactions|problems)"),
        (
            Intent::Contraindications,
            r"(contraindications|warnings|cautions|avoid)",
        ),
        (Intent::Interactions, r"(interact|combination|mixed|together)"),
        (Intent::Storage, r"(store|storage|keep|stability)"),
    ]
    .into_iter()
    .map(|(intent, pattern)| (intent, Regex::new(pattern).unwrap()))
    .collect()
});

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9-]*").unwrap());

/// Common veterinary drug name endings.
static DRUG_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[a-z][a-z-]{2,}(cillin|mycin|micin|cycline|azole|floxacin|prazole|olol|pril|sartan|olone|sone|caine|azepam|zolam|profen|oxicam|mectin|bose|tidine|pramine|barbital|adol|setron|semide|thiazide)$",
    )
    .unwrap()
});

static ANIMAL_TERMS: &[&str] = &[
    "dog", "dogs", "puppy", "puppies", "canine", "cat", "cats", "kitten", "kittens", "feline",
    "horse", "horses", "foal", "equine", "cattle", "cow", "cows", "calf", "calves", "bovine",
    "sheep", "lamb", "ovine", "goat", "goats", "caprine", "pig", "pigs", "swine", "porcine",
    "bird", "birds", "avian", "poultry", "chicken", "chickens", "rabbit", "rabbits", "ferret",
    "ferrets", "rodent", "rodents", "reptile", "reptiles",
];

static SYMPTOM_TERMS: &[&str] = &[
    "vomiting", "diarrhea", "diarrhoea", "nausea", "fever", "cough", "coughing", "seizure",
    "seizures", "itching", "pruritus", "lethargy", "anorexia", "pain", "lameness",
    "inflammation", "infection", "infections", "diabetes", "arthritis", "dehydration",
    "hypoglycemia", "anemia", "anaemia", "allergy", "allergies", "bloating", "flatulence",
    "constipation", "weakness", "tremors", "panting",
];

/// Capitalised words that are never drug names.
static STOPWORDS: &[&str] = &[
    "what", "how", "when", "which", "why", "who", "where", "can", "could", "should", "would",
    "does", "do", "did", "is", "are", "was", "the", "and", "for", "with", "tell", "give",
    "please", "any", "about", "my", "there", "side", "effects", "dosage", "dose",
];

/// Pick the intent for a question. Total: anything unmatched is `general`.
pub fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();
    INTENT_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(&lower))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}

/// Classifier with a drug gazetteer.
#[derive(Debug, Clone, Default)]
pub struct QueryClassifier {
    /// (ascii-lowercased, stored spelling), longest first.
    known_drugs: Vec<(String, String)>,
}

impl QueryClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known_drugs<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known_drugs: Vec<(String, String)> = Vec::new();
        for name in names {
            let name: String = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lower = trimmed.to_ascii_lowercase();
            if !known_drugs.iter().any(|(l, _)| *l == lower) {
                known_drugs.push((lower, trimmed.to_string()));
            }
        }
        known_drugs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { known_drugs }
    }

    /// Seed the gazetteer with every Drug node in the store.
    pub fn from_store(store: &SqliteStore) -> Result<Self> {
        Ok(Self::with_known_drugs(store.node_keys(NodeLabel::Drug)?))
    }

    pub fn known_drug_count(&self) -> usize {
        self.known_drugs.len()
    }

    pub fn classify(&self, text: &str) -> Classification {
        Classification {
            intent: classify_intent(text),
            entities: self.extract_entities(text),
        }
    }

    pub fn extract_entities(&self, text: &str) -> Entities {
        // ASCII lowercasing keeps byte offsets aligned with `text`.
        let lower = text.to_ascii_lowercase();
        let mut mentions: Vec<(usize, usize, String)> = Vec::new();

        for (needle, stored) in &self.known_drugs {
            for (start, _) in lower.match_indices(needle.as_str()) {
                let end = start + needle.len();
                if !is_word_boundary(&lower, start, end)
                    || mentions.iter().any(|&(s, e, _)| start < e && s < end)
                {
                    continue;
                }
                mentions.push((start, end, stored.clone()));
            }
        }
        mentions.sort_by_key(|&(start, _, _)| start);

        let mut entities = Entities::default();
        let mut guessed: Vec<String> = Vec::new();
        for (i, m) in WORD_RE.find_iter(text).enumerate() {
            if mentions
                .iter()
                .any(|&(s, e, _)| m.start() < e && s < m.end())
            {
                continue;
            }
            let word = m.as_str();
            let lw = word.to_ascii_lowercase();
            if ANIMAL_TERMS.contains(&lw.as_str()) {
                push_unique(&mut entities.animals, lw);
            } else if SYMPTOM_TERMS.contains(&lw.as_str()) {
                push_unique(&mut entities.symptoms, lw);
            } else if looks_like_drug(word, &lw, i == 0) {
                push_unique(&mut guessed, word.to_string());
            }
        }

        for (_, _, name) in mentions {
            push_unique(&mut entities.drugs, name);
        }
        for name in guessed {
            push_unique(&mut entities.drugs, name);
        }
        entities
    }
}

fn is_word_boundary(s: &str, start: usize, end: usize) -> bool {
    let before = s[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    let after = s[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
    before && after
}

fn looks_like_drug(word: &str, lower: &str, first: bool) -> bool {
    if word.len() < 3 || STOPWORDS.contains(&lower) {
        return false;
    }
    if DRUG_SUFFIX_RE.is_match(word) {
        return true;
    }
    // ACARBOSE-style monograph headings
    if word.len() >= 4 && !word.chars().any(|c| c.is_ascii_lowercase()) {
        return true;
    }
    !first && word.starts_with(|c: char| c.is_ascii_uppercase())
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.iter().any(|v| v.eq_ignore_ascii_case(&value)) {
        list.push(value);
    }
}
