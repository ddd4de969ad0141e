//! Heuristic article segmentation from raw page text.
//!
//! Rule-based fallback used when no AI classifier is configured: page
//! lines are scanned in document order, section markers set context,
//! mostly-uppercase lines open new articles, and everything else feeds
//! the open article's body. Articles whose body ends up shorter than
//! [`MIN_BODY_LENGTH`] characters are discarded as layout noise.

use regex::Regex;

use crate::models::ArticleCandidate;
use crate::pdf::PageText;
use crate::utils::{char_excerpt, normalize_newlines, word_count};

/// Minimum trimmed body length (characters) for a finalized article.
pub const MIN_BODY_LENGTH: usize = 50;

/// Minimum line length (characters) for a headline.
const MIN_HEADLINE_LENGTH: usize = 20;

/// Minimum ratio of uppercase letters for a headline.
const HEADLINE_UPPER_RATIO: f64 = 0.70;

/// Section assigned when no marker was seen before an article opened.
pub const DEFAULT_SECTION: &str = "General";

/// Fixed vocabulary of section markers (uppercased, with and without
/// accents) and their canonical display names.
const KNOWN_SECTIONS: &[(&str, &str)] = &[
    ("POLÍTICA", "Política"),
    ("POLITICA", "Política"),
    ("ECONOMÍA", "Economía"),
    ("ECONOMIA", "Economía"),
    ("DEPORTES", "Deportes"),
    ("CULTURA", "Cultura"),
    ("LOCAL", "Local"),
    ("INTERNACIONAL", "Internacional"),
    ("JUDICIAL", "Judicial"),
    ("SOCIEDAD", "Sociedad"),
    ("OPINIÓN", "Opinión"),
    ("OPINION", "Opinión"),
    ("NEGOCIOS", "Negocios"),
    ("SALUD", "Salud"),
    ("EDUCACIÓN", "Educación"),
    ("EDUCACION", "Educación"),
    ("SUCESOS", "Sucesos"),
    ("NACIONAL", "Nacional"),
    ("MUNDO", "Mundo"),
];

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || "áéíóúüñÁÉÍÓÚÜÑ".contains(c)
}

fn is_uppercase_letter(c: char) -> bool {
    c.is_ascii_uppercase() || "ÁÉÍÓÚÜÑ".contains(c)
}

/// An article being accumulated during the scan. The section is captured
/// when the article opens; markers seen mid-article only affect later
/// articles.
struct OpenArticle {
    title: String,
    body: Vec<String>,
    section: Option<&'static str>,
    page_number: u32,
}

impl OpenArticle {
    fn finalize(self) -> Option<ArticleCandidate> {
        let body = self.body.join("\n");
        let body = body.trim();
        if body.chars().count() < MIN_BODY_LENGTH {
            return None;
        }

        Some(ArticleCandidate {
            title: self.title,
            body: body.to_string(),
            body_excerpt: char_excerpt(body, 500),
            section: Some(self.section.unwrap_or(DEFAULT_SECTION).to_string()),
            page_number: self.page_number,
            word_count: word_count(body),
            tags: Vec::new(),
        })
    }
}

/// Rule-based article segmenter for Spanish newspaper text.
pub struct HeuristicSegmenter {
    date_re: Regex,
    numeric_re: Regex,
}

impl Default for HeuristicSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicSegmenter {
    pub fn new() -> Self {
        Self {
            date_re: Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}").expect("valid date regex"),
            numeric_re: Regex::new(r"^[\d\s.,\-:]+$").expect("valid numeric regex"),
        }
    }

    /// Split pages into candidate articles.
    ///
    /// Lines before the first headline are discarded; a trailing open
    /// article is flushed under the same minimum-body rule.
    pub fn segment(&self, pages: &[PageText]) -> Vec<ArticleCandidate> {
        let mut articles = Vec::new();
        let mut open: Option<OpenArticle> = None;
        let mut current_section: Option<&'static str> = None;

        for page in pages {
            if page.text.is_empty() {
                continue;
            }

            for line in normalize_newlines(&page.text).split('\n') {
                let trimmed = line.trim();

                if trimmed.is_empty() {
                    // Blank lines collapse to one paragraph break.
                    if let Some(article) = open.as_mut() {
                        if matches!(article.body.last(), Some(last) if !last.is_empty()) {
                            article.body.push(String::new());
                        }
                    }
                    continue;
                }

                if let Some(section) = detect_section(trimmed) {
                    current_section = Some(section);
                    continue;
                }

                if self.is_headline(trimmed) {
                    if let Some(previous) = open.take() {
                        articles.extend(previous.finalize());
                    }
                    open = Some(OpenArticle {
                        title: normalize_title(trimmed),
                        body: Vec::new(),
                        section: current_section,
                        page_number: page.page_number,
                    });
                } else if let Some(article) = open.as_mut() {
                    article.body.push(trimmed.to_string());
                }
            }
        }

        if let Some(last) = open.take() {
            articles.extend(last.finalize());
        }

        articles
    }

    /// Whether a trimmed line looks like an article headline.
    pub fn is_headline(&self, line: &str) -> bool {
        if line.chars().count() < MIN_HEADLINE_LENGTH {
            return false;
        }

        if self.date_re.is_match(line) || self.numeric_re.is_match(line) {
            return false;
        }

        let total_letters = line.chars().filter(|&c| is_latin_letter(c)).count();
        if total_letters == 0 {
            return false;
        }
        let upper_letters = line.chars().filter(|&c| is_uppercase_letter(c)).count();

        upper_letters as f64 / total_letters as f64 >= HEADLINE_UPPER_RATIO
    }
}

/// Look a trimmed line up in the section vocabulary (with or without a
/// trailing colon), returning the canonical display name.
fn detect_section(line: &str) -> Option<&'static str> {
    let normalized = line.trim().to_uppercase();
    let without_colon = normalized.strip_suffix(':').unwrap_or(&normalized);

    KNOWN_SECTIONS
        .iter()
        .find(|(marker, _)| without_colon == *marker)
        .map(|(_, display)| *display)
}

/// Strip surrounding punctuation/whitespace and collapse internal runs of
/// whitespace.
fn normalize_title(title: &str) -> String {
    let stripped = title.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '\0' | '.' | ',' | ';' | ':' | '-' | '–' | '—')
    });
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, text: &str) -> PageText {
        PageText {
            page_number: number,
            text: text.to_string(),
            error: None,
        }
    }

    #[test]
    fn test_headline_length_boundary() {
        let segmenter = HeuristicSegmenter::new();
        // 19 uppercase characters: too short.
        assert!(!segmenter.is_headline("ABCDEFGHIJKLMNOPQRS"));
        // 20 uppercase characters: headline.
        assert!(segmenter.is_headline("ABCDEFGHIJKLMNOPQRST"));
    }

    #[test]
    fn test_headline_uppercase_ratio() {
        let segmenter = HeuristicSegmenter::new();
        // 14 upper / 20 letters = 0.70: accepted.
        assert!(segmenter.is_headline("AAAAAAAAAAAAAAbbbbbb"));
        // 13 upper / 20 letters = 0.65: rejected.
        assert!(!segmenter.is_headline("AAAAAAAAAAAAAbbbbbbb"));
    }

    #[test]
    fn test_headline_counts_accented_letters() {
        let segmenter = HeuristicSegmenter::new();
        assert!(segmenter.is_headline("ECONOMÍA CRECIÓ EN EL AÑO"));
    }

    #[test]
    fn test_headline_rejects_dates_and_numbers() {
        let segmenter = HeuristicSegmenter::new();
        assert!(!segmenter.is_headline("12/05/2024 SUPLEMENTO ESPECIAL"));
        assert!(!segmenter.is_headline("12-05-24 SUPLEMENTO ESPECIAL"));
        assert!(!segmenter.is_headline("123.456, 789 - 10: 11 12 13 14"));
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(
            normalize_title("--- TITULAR   CON   ESPACIOS ---"),
            "TITULAR CON ESPACIOS"
        );
        assert_eq!(normalize_title(".,;:TITULAR LIMPIO:;,."), "TITULAR LIMPIO");
    }

    #[test]
    fn test_detect_section_with_colon_and_accents() {
        assert_eq!(detect_section("DEPORTES"), Some("Deportes"));
        assert_eq!(detect_section("DEPORTES:"), Some("Deportes"));
        assert_eq!(detect_section("política"), Some("Política"));
        assert_eq!(detect_section("POLITICA"), Some("Política"));
        assert_eq!(detect_section("FARÁNDULA"), None);
    }

    #[test]
    fn test_section_context_scenario() {
        let segmenter = HeuristicSegmenter::new();
        let text = "DEPORTES\n\
                    EQUIPO LOCAL GANA LA FINAL DEL TORNEO APERTURA\n\
                    El equipo local se impuso anoche por dos goles a uno frente al visitante.\n";
        let articles = segmenter.segment(&[page(1, text)]);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].section.as_deref(), Some("Deportes"));
        assert_eq!(articles[0].page_number, 1);
    }

    #[test]
    fn test_defaults_to_general_section() {
        let segmenter = HeuristicSegmenter::new();
        let text = "TITULAR SIN SECCION PREVIA DETECTADA\n\
                    Cuerpo del artículo suficientemente largo para superar el umbral mínimo.\n";
        let articles = segmenter.segment(&[page(1, text)]);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].section.as_deref(), Some("General"));
    }

    #[test]
    fn test_short_body_discarded() {
        let segmenter = HeuristicSegmenter::new();
        let text = "TITULAR DE ARTICULO DEMASIADO CORTO\nmuy poco cuerpo\n";
        assert!(segmenter.segment(&[page(1, text)]).is_empty());
    }

    #[test]
    fn test_never_emits_body_under_minimum() {
        let segmenter = HeuristicSegmenter::new();
        let text = "PRIMER TITULAR DE LA EDICION DE HOY\n\
                    corto\n\
                    SEGUNDO TITULAR DE LA EDICION DE HOY\n\
                    Este segundo artículo sí tiene un cuerpo con longitud más que suficiente.\n";
        let articles = segmenter.segment(&[page(1, text)]);
        assert_eq!(articles.len(), 1);
        for article in &articles {
            assert!(article.body.trim().chars().count() >= MIN_BODY_LENGTH);
        }
    }

    #[test]
    fn test_lines_before_first_headline_discarded() {
        let segmenter = HeuristicSegmenter::new();
        let text = "texto suelto de cabecera que no pertenece a nada\n\
                    TITULAR QUE ABRE EL PRIMER ARTICULO\n\
                    Cuerpo del artículo con suficiente longitud para ser conservado íntegro.\n";
        let articles = segmenter.segment(&[page(1, text)]);
        assert_eq!(articles.len(), 1);
        assert!(!articles[0].body.contains("cabecera"));
    }

    #[test]
    fn test_mid_article_section_not_retroactive() {
        let segmenter = HeuristicSegmenter::new();
        let text = "TITULAR DEL PRIMER ARTICULO DE PRUEBA\n\
                    Primera parte del cuerpo del artículo, con longitud suficiente de sobra.\n\
                    DEPORTES\n\
                    Segunda parte del cuerpo después del marcador de sección intermedio.\n\
                    TITULAR DEL SEGUNDO ARTICULO DE PRUEBA\n\
                    Cuerpo del segundo artículo, también con longitud más que suficiente.\n";
        let articles = segmenter.segment(&[page(1, text)]);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].section.as_deref(), Some("General"));
        assert_eq!(articles[1].section.as_deref(), Some("Deportes"));
    }

    #[test]
    fn test_blank_lines_collapse_to_paragraph_break() {
        let segmenter = HeuristicSegmenter::new();
        let text = "TITULAR CON PARRAFOS SEPARADOS AQUI\n\
                    Primer párrafo del cuerpo del artículo con longitud suficiente.\n\
                    \n\
                    \n\
                    Segundo párrafo tras varias líneas en blanco consecutivas.\n";
        let articles = segmenter.segment(&[page(1, text)]);
        assert_eq!(articles.len(), 1);
        assert!(articles[0].body.contains("suficiente.\n\nSegundo"));
    }

    #[test]
    fn test_article_spanning_pages_keeps_opening_page() {
        let segmenter = HeuristicSegmenter::new();
        let first = "TITULAR QUE EMPIEZA EN LA PRIMERA PAGINA\n\
                     Inicio del cuerpo en la primera página de la edición impresa.\n";
        let second = "Continuación del cuerpo en la segunda página del periódico.\n";
        let articles = segmenter.segment(&[page(1, first), page(2, second)]);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].page_number, 1);
        assert!(articles[0].body.contains("Continuación"));
    }

    #[test]
    fn test_excerpt_and_word_count() {
        let segmenter = HeuristicSegmenter::new();
        let long_body = "palabra ".repeat(120);
        let text = format!("TITULAR PARA PROBAR EXCERPT Y CONTEO\n{long_body}\n");
        let articles = segmenter.segment(&[page(1, &text)]);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].body_excerpt.chars().count(), 500);
        assert_eq!(articles[0].word_count, 120);
    }

    #[test]
    fn test_crlf_normalization() {
        let segmenter = HeuristicSegmenter::new();
        let text = "TITULAR CON FINALES DE LINEA WINDOWS\r\n\
                    Cuerpo del artículo con longitud suficiente para ser conservado.\r\n";
        let articles = segmenter.segment(&[page(1, text)]);
        assert_eq!(articles.len(), 1);
    }
}
