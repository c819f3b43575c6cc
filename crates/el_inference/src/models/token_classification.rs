use std::fmt;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use el_core::text::clean_html;
use el_core::{EntityExtractor, ExtractedEntity, Result};

use crate::config::ModelConfig;

#[derive(Serialize)]
struct TaggingRequest<'a> {
    inputs: &'a str,
    parameters: TaggingParameters,
}

#[derive(Serialize)]
struct TaggingParameters {
    aggregation_strategy: &'static str,
}

#[derive(Deserialize)]
struct TaggedSpan {
    #[serde(alias = "entity")]
    entity_group: String,
    word: String,
    score: f32,
}

/// Some servers wrap the span list in an outer array, one per input.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaggingResponse {
    Flat(Vec<TaggedSpan>),
    Nested(Vec<Vec<TaggedSpan>>),
}

impl TaggingResponse {
    fn into_entities(self) -> Vec<ExtractedEntity> {
        let spans = match self {
            TaggingResponse::Flat(spans) => spans,
            TaggingResponse::Nested(batches) => batches.into_iter().flatten().collect(),
        };
        spans
            .into_iter()
            .filter(|span| !span.word.trim().is_empty())
            .map(|span| ExtractedEntity {
                text: span.word.trim().to_string(),
                label: span
                    .entity_group
                    .trim_start_matches("B-")
                    .trim_start_matches("I-")
                    .to_string(),
                confidence: span.score.clamp(0.0, 1.0),
            })
            .collect()
    }
}

/// Client for token-classification endpoints speaking the Hugging Face inference format.
pub struct TokenClassificationExtractor {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl TokenClassificationExtractor {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.ner_url()?.to_string(),
            api_key: config.ner_api_key.clone(),
        })
    }
}

impl fmt::Debug for TokenClassificationExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClassificationExtractor")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl EntityExtractor for TokenClassificationExtractor {
    fn name(&self) -> &str {
        "http"
    }

    async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        let text = clean_html(text);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let request = TaggingRequest {
            inputs: &text,
            parameters: TaggingParameters {
                aggregation_strategy: "simple",
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder
            .send()
            .await?
            .error_for_status()?
            .json::<TaggingResponse>()
            .await?;

        Ok(response.into_entities())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_response() {
        let body = r#"[
            {"entity_group":"PER","word":"Steve Jobs","score":0.998,"start":21,"end":31},
            {"entity_group":"ORG","word":" Apple","score":0.97,"start":0,"end":5}
        ]"#;
        let response: TaggingResponse = serde_json::from_str(body).unwrap();
        let entities = response.into_entities();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "Steve Jobs");
        assert_eq!(entities[0].label, "PER");
        assert_eq!(entities[1].text, "Apple");
    }

    #[test]
    fn test_nested_response_with_bio_tags() {
        let body = r#"[[{"entity":"B-LOC","word":"Paris","score":0.9}]]"#;
        let response: TaggingResponse = serde_json::from_str(body).unwrap();
        let entities = response.into_entities();
        assert_eq!(entities[0].label, "LOC");
        assert_eq!(entities[0].text, "Paris");
    }

    #[test]
    fn test_requires_endpoint() {
        assert!(TokenClassificationExtractor::new(&ModelConfig::default()).is_err());

        let config = ModelConfig {
            ner_url: Some("http://localhost:8000/ner".to_string()),
            ..Default::default()
        };
        assert!(TokenClassificationExtractor::new(&config).is_ok());
    }
}
