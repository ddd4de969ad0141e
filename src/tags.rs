//! Frequency-based keyword extraction (simplified TF-IDF).
//!
//! Tag names are normalized to lowercase unaccented ASCII; the display
//! name recovers the first accented form found in the source text. Scores
//! are term frequency over the total token count before stopword
//! filtering, so they are comparable across articles of similar length.

use std::collections::HashMap;

use regex::Regex;

use crate::models::TagCandidate;

/// Default maximum number of tags per article.
pub const DEFAULT_TAG_LIMIT: usize = 8;

/// Minimum token length (characters) for a tag candidate.
const MIN_TOKEN_LENGTH: usize = 4;

/// Spanish stopwords, pre-normalized (lowercase, unaccented).
const STOPWORDS: &[&str] = &[
    "de", "la", "el", "en", "y", "a", "los", "del", "se", "las", "por", "un", "para", "con",
    "una", "su", "al", "es", "lo", "como", "mas", "pero", "sus", "le", "ya", "o", "fue", "este",
    "ha", "si", "porque", "esta", "son", "entre", "cuando", "muy", "sin", "sobre", "tambien",
    "me", "hasta", "hay", "donde", "quien", "desde", "todo", "nos", "durante", "estados",
    "todos", "uno", "ante", "ellos", "esto", "mi", "antes", "algunos", "que", "unos", "yo",
    "otro", "otras", "otra", "tanto", "esa", "estos", "mucho", "quienes", "nada", "muchos",
    "cual", "poco", "ella", "estar", "estas", "tenia", "anos", "ano", "gobierno", "ser", "han",
    "tienen", "segun", "tras", "aunque", "asi", "mismo", "cada", "ayer", "hoy", "puede", "bien",
    "dijo", "dice", "sera", "debe", "tiene", "hacer", "tres", "dos", "part", "via", "vez",
    "dia", "dias", "pais", "solo", "luego", "aun", "sino", "embargo", "ademas", "entonces",
    "mientras", "mayor", "menor", "bajo", "alto", "gran", "nueva", "nuevo", "primera",
    "primero", "segundo", "segunda", "ultima", "ultimo", "menos", "dentro", "fuera", "hacia",
    "mediante", "cuyo", "cuya", "cuyas", "cuyos", "nuestro", "nuestra", "vuestro", "vuestra",
    "ellas", "nosotros", "vosotros", "ustedes", "suyo", "suya",
];

/// Replace Spanish accented vowels and ñ/ü with their base letters.
fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            'Á' => 'A',
            'É' => 'E',
            'Í' => 'I',
            'Ó' => 'O',
            'Ú' | 'Ü' => 'U',
            'Ñ' => 'N',
            _ => c,
        })
        .collect()
}

/// Frequency-based tag extractor for Spanish article bodies.
pub struct TagGenerator {
    word_re: Regex,
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TagGenerator {
    pub fn new() -> Self {
        Self {
            word_re: Regex::new(r"[A-Za-zÁÉÍÓÚÜÑáéíóúüñ]+").expect("valid word regex"),
        }
    }

    /// Generate up to `limit` scored tags from `text`.
    ///
    /// Returns an empty list for empty or stopword-only input. Names are
    /// unique and scores non-increasing; ties keep first-seen order.
    pub fn generate(&self, text: &str, limit: usize) -> Vec<TagCandidate> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let normalized = strip_accents(&text.to_lowercase());
        let normalized: String = normalized
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        let words: Vec<&str> = normalized.split_whitespace().collect();
        let total_words = words.len();
        if total_words == 0 {
            return Vec::new();
        }

        // Count surviving tokens, remembering first-seen order for ties.
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut seen_order: Vec<&str> = Vec::new();
        for word in &words {
            if word.chars().count() < MIN_TOKEN_LENGTH || STOPWORDS.contains(word) {
                continue;
            }
            let count = counts.entry(word).or_insert(0);
            if *count == 0 {
                seen_order.push(word);
            }
            *count += 1;
        }

        if seen_order.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(&str, usize)> = seen_order
            .iter()
            .map(|&word| (word, counts[word]))
            .collect();
        // Stable sort keeps first-seen order among equal frequencies.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);

        ranked
            .into_iter()
            .map(|(word, count)| TagCandidate {
                name: word.to_string(),
                display_name: self.display_name(word, text),
                score: round4(count as f64 / total_words as f64),
            })
            .collect()
    }

    /// Find the first whole word in the original text whose normalized
    /// form equals the tag name, preserving its accents.
    fn display_name(&self, name: &str, original_text: &str) -> String {
        for found in self.word_re.find_iter(original_text) {
            let lowered = found.as_str().to_lowercase();
            if strip_accents(&lowered) == name {
                return lowered;
            }
        }
        name.to_string()
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
