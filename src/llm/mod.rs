//! AI article extraction.
//!
//! Pages are sent to the model in chunks of four; a failed chunk is logged
//! and skipped so one bad request never loses the whole edition. The reply
//! is expected to be a JSON array of articles, with some tolerance for
//! markdown fences and stray prose around it.

mod client;

pub use client::{ClaudeClient, ClaudeConfig, LlmError, ANTHROPIC_API_URL};

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{ArticleCandidate, TagCandidate};
use crate::pdf::PageText;
use crate::utils;

/// Pages per API request, to stay within context limits.
pub const PAGES_PER_CHUNK: usize = 4;

/// Minimum trimmed body length (characters) for an AI candidate.
const MIN_BODY_LENGTH: usize = 30;

/// Tag constraints applied to model output.
const MIN_TAG_LENGTH: usize = 3;
const MAX_TAGS: usize = 8;

/// AI candidates keep the original's shorter excerpt.
const EXCERPT_LENGTH: usize = 300;

/// Section codes the model is allowed to return.
const VALID_SECTIONS: &[&str] = &[
    "POLITICA",
    "ECONOMIA",
    "DEPORTES",
    "CULTURA",
    "LOCAL",
    "INTERNACIONAL",
    "JUDICIAL",
    "SOCIEDAD",
    "OPINION",
    "NEGOCIOS",
    "SALUD",
    "EDUCACION",
    "SUCESOS",
    "NACIONAL",
    "MUNDO",
];

/// Extracts structured articles from raw page text via the Claude API.
pub struct AiExtractor {
    client: ClaudeClient,
}

impl AiExtractor {
    pub fn new(client: ClaudeClient) -> Self {
        Self { client }
    }

    /// Extract articles from all pages. Chunk failures are logged and the
    /// remaining chunks still run; an all-failed run yields an empty list.
    pub async fn extract_articles(
        &self,
        pages: &[PageText],
        publication_date: NaiveDate,
        newspaper_name: &str,
    ) -> Vec<ArticleCandidate> {
        let chunks: Vec<&[PageText]> = pages.chunks(PAGES_PER_CHUNK).collect();
        let total_chunks = chunks.len();
        let mut articles = Vec::new();

        for (index, chunk) in chunks.into_iter().enumerate() {
            match self
                .process_chunk(chunk, publication_date, newspaper_name)
                .await
            {
                Ok(found) => {
                    info!(
                        chunk = index + 1,
                        of = total_chunks,
                        articles = found.len(),
                        "ai chunk processed"
                    );
                    articles.extend(found);
                }
                Err(e) => {
                    warn!(chunk = index + 1, of = total_chunks, error = %e, "ai chunk failed");
                }
            }
        }

        articles
    }

    async fn process_chunk(
        &self,
        pages: &[PageText],
        publication_date: NaiveDate,
        newspaper_name: &str,
    ) -> Result<Vec<ArticleCandidate>, LlmError> {
        let prompt = build_prompt(pages, publication_date, newspaper_name)?;
        let response = self.client.complete(&prompt).await?;
        Ok(parse_response(&response, pages))
    }
}

/// Build the extraction prompt for one chunk of pages. Fails before any
/// remote call when the chunk has no non-empty page text.
fn build_prompt(
    pages: &[PageText],
    publication_date: NaiveDate,
    newspaper_name: &str,
) -> Result<String, LlmError> {
    let mut pages_text = String::new();
    for page in pages {
        let text = page.text.trim();
        if text.is_empty() {
            continue;
        }
        pages_text.push_str(&format!("\n\n--- PÁGINA {} ---\n{}", page.page_number, text));
    }

    if pages_text.trim().is_empty() {
        return Err(LlmError::EmptyChunk);
    }

    Ok(format!(
        r#"Eres un extractor experto de artículos de periódico latinoamericano. Se te proporcionará texto bruto extraído página por página de una edición de "{newspaper_name}" del {publication_date}.

Tu tarea es identificar TODOS los artículos periodísticos individuales en el texto y extraer sus datos estructurados.

INSTRUCCIONES:
- Un artículo comienza con su TITULAR (normalmente en mayúsculas o muy destacado).
- El cuerpo del artículo es el texto que sigue al titular hasta el próximo titular.
- Ignora: avisos publicitarios, esquelas, tablas de números, cabeceras de sección sueltas, fechas y números de página aislados.
- Si el texto de la página no contiene artículos legibles, devuelve un array vacío [].
- Para "section", usa SOLO uno de estos valores exactos o null: POLITICA, ECONOMIA, DEPORTES, CULTURA, LOCAL, INTERNACIONAL, JUDICIAL, SOCIEDAD, OPINION, NEGOCIOS, SALUD, EDUCACION, SUCESOS, NACIONAL, MUNDO.
- "tags" debe ser un array de 5 a 8 palabras clave relevantes, en minúsculas, sin acentos, sin artículos.
- "body_excerpt" son los primeros 300 caracteres del body.
- "word_count" es la cantidad de palabras del body.

FORMATO DE RESPUESTA:
Devuelve ÚNICAMENTE un array JSON válido, sin texto antes ni después, sin explicaciones, sin markdown. Ejemplo:
[
  {{
    "title": "TITULAR DEL ARTÍCULO EN MAYÚSCULAS",
    "body": "Texto completo del artículo...",
    "body_excerpt": "Primeros 300 caracteres...",
    "section": "POLITICA",
    "page_number": 3,
    "word_count": 245,
    "tags": ["palabra1", "palabra2", "palabra3", "palabra4", "palabra5"]
  }}
]

TEXTO DE LAS PÁGINAS:
{pages_text}

Responde solo con el JSON array:"#
    ))
}

/// Parse a model reply into validated candidates. Unparseable replies are
/// logged and yield an empty list; individual malformed items are skipped.
fn parse_response(response: &str, pages: &[PageText]) -> Vec<ArticleCandidate> {
    let mut clean: String = response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");
    clean = clean.trim().to_string();

    // The model sometimes wraps the array in prose.
    if !clean.starts_with('[') {
        if let (Some(start), Some(end)) = (clean.find('['), clean.rfind(']')) {
            if end > start {
                clean = clean[start..=end].to_string();
            }
        }
    }

    let parsed: Value = match serde_json::from_str(&clean) {
        Ok(value) => value,
        Err(_) => {
            let preview: String = response.chars().take(200).collect();
            warn!(response_preview = %preview, "could not parse ai response as JSON");
            return Vec::new();
        }
    };

    let Some(items) = parsed.as_array() else {
        let preview: String = response.chars().take(200).collect();
        warn!(response_preview = %preview, "ai response is not a JSON array");
        return Vec::new();
    };

    let first_page = pages.first().map(|p| p.page_number).unwrap_or(1);
    let mut candidates = Vec::new();

    for item in items {
        let title = item
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        let body = item
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();

        if title.is_empty() || body.chars().count() < MIN_BODY_LENGTH {
            continue;
        }

        let section = item
            .get("section")
            .and_then(Value::as_str)
            .map(str::to_uppercase)
            .filter(|s| VALID_SECTIONS.contains(&s.as_str()));

        let page_number = item
            .get("page_number")
            .and_then(Value::as_u64)
            .map(|n| n as u32)
            .unwrap_or(first_page);

        let word_count = item
            .get("word_count")
            .and_then(Value::as_u64)
            .map(|n| n as u32)
            .unwrap_or_else(|| utils::word_count(&body));

        let tags: Vec<TagCandidate> = item
            .get("tags")
            .and_then(Value::as_array)
            .map(|raw| {
                raw.iter()
                    .filter_map(Value::as_str)
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty() && t.chars().count() >= MIN_TAG_LENGTH)
                    .take(MAX_TAGS)
                    .enumerate()
                    .map(|(i, name)| TagCandidate {
                        display_name: name.clone(),
                        name,
                        score: 1.0 - 0.05 * i as f64,
                    })
                    .collect()
            })
            .unwrap_or_default();

        candidates.push(ArticleCandidate {
            body_excerpt: utils::char_excerpt(&body, EXCERPT_LENGTH),
            title,
            body,
            section,
            page_number,
            word_count,
            tags,
        });
    }

    candidates
}
