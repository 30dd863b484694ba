use crate::core::verifier::truncate_chars;
use crate::domain::model::{Tone, Verdict};
use crate::domain::ports::{ClaimExtractor, CopyWriter, JudgmentOracle, QueryRewriter};
use crate::utils::error::{Result, VerifyError};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_COPY_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 15_000;

const JUDGE_PROMPT: &str = "You are a meticulous fact-checker. Decide whether the Source Text confirms the Claim.\n\
Answer with a single word: 'Yes' if it does, 'No' if it does not.";

const REWRITE_PROMPT: &str = "You are a search expert. Write one short, focused web search query \
that would find evidence for or against the given factual claim. Return only the query.";

const EXTRACT_PROMPT: &str = "You are an analyst. Extract every specific, objective and verifiable \
factual claim from the product text. Ignore marketing fluff, opinions and vague benefits. \
Respond with a JSON object of the form {\"claims\": [\"...\", \"...\"]}.";

const COPY_PROMPT: &str = "You are an expert marketing copywriter. Write a brief, persuasive and \
trustworthy advertisement using ONLY the verified facts provided. Do not invent features or \
benefits. Output only the ad copy.";

/// Chat-completions client that backs the LLM collaborators.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    copy_temperature: f32,
    max_input_chars: usize,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtractedClaims {
    claims: Vec<String>,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            copy_temperature: DEFAULT_COPY_TEMPERATURE,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_copy_temperature(mut self, temperature: f32) -> Self {
        self.copy_temperature = temperature;
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, system: &str, user: &str, temperature: f32, json: bool) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            response_format: json.then_some(ResponseFormat {
                r#type: "json_object",
            }),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VerifyError::OracleError {
                message: format!("OpenAI API error {}: {}", status, body),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VerifyError::OracleError {
                message: "OpenAI response contained no message".to_string(),
            })?;

        debug!(model = %self.model, chars = content.len(), "Chat completion received");
        Ok(content)
    }
}

/// "Yes..." -> Confirmed, "No..." -> Refuted, anything else -> Indeterminate.
pub fn parse_verdict(reply: &str) -> Verdict {
    let reply = reply.trim().to_lowercase();
    if reply.starts_with("yes") {
        Verdict::Confirmed
    } else if reply.starts_with("no") {
        Verdict::Refuted
    } else {
        Verdict::Indeterminate
    }
}

#[async_trait]
impl JudgmentOracle for OpenAiClient {
    async fn judge(&self, claim: &str, source_text: &str) -> Result<Verdict> {
        let source = truncate_chars(source_text, self.max_input_chars);
        let user = format!("Claim: {}\n\nSource Text: {}", claim, source);
        let reply = self.chat(JUDGE_PROMPT, &user, 0.0, false).await?;
        Ok(parse_verdict(&reply))
    }
}

#[async_trait]
impl QueryRewriter for OpenAiClient {
    async fn rewrite(&self, claim: &str) -> Result<String> {
        let user = format!("Claim: {}", claim);
        let reply = self
            .chat(REWRITE_PROMPT, &user, 0.0, false)
            .await
            .map_err(|e| VerifyError::RewriteError {
                message: e.to_string(),
            })?;
        Ok(reply.trim().trim_matches('"').trim().to_string())
    }
}

#[async_trait]
impl ClaimExtractor for OpenAiClient {
    async fn extract(&self, page_text: &str) -> Result<Vec<String>> {
        let text = truncate_chars(page_text, self.max_input_chars);
        let user = format!("Product text:\n{}", text);
        let reply = self
            .chat(EXTRACT_PROMPT, &user, 0.0, true)
            .await
            .map_err(|e| VerifyError::ExtractionError {
                message: e.to_string(),
            })?;

        let parsed: ExtractedClaims =
            serde_json::from_str(&reply).map_err(|e| VerifyError::ExtractionError {
                message: format!("Unexpected claim format: {}", e),
            })?;

        Ok(parsed
            .claims
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect())
    }
}

#[async_trait]
impl CopyWriter for OpenAiClient {
    async fn write(&self, verified_claims: &[String], tone: Tone) -> Result<String> {
        let facts = verified_claims
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n");
        let user = format!("Tone: {}\n\nVerified Facts:\n{}", tone, facts);
        let reply = self
            .chat(COPY_PROMPT, &user, self.copy_temperature, false)
            .await
            .map_err(|e| VerifyError::CopyError {
                message: e.to_string(),
            })?;
        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new("sk-test", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.url("/v1/"))
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
            ]
        })
    }

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("Yes"), Verdict::Confirmed);
        assert_eq!(parse_verdict("  yes, the text says so"), Verdict::Confirmed);
        assert_eq!(parse_verdict("No."), Verdict::Refuted);
        assert_eq!(parse_verdict("I cannot tell"), Verdict::Indeterminate);
        assert_eq!(parse_verdict(""), Verdict::Indeterminate);
    }

    #[tokio::test]
    async fn test_judge_sends_bearer_and_parses_reply() {
        let server = MockServer::start();
        let chat_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_contains("Claim: Acme blender has a 1200W motor");
            then.status(200).json_body(completion("Yes"));
        });

        let verdict = client(&server)
            .judge("Acme blender has a 1200W motor", "The motor is rated 1200W.")
            .await
            .unwrap();

        chat_mock.assert();
        assert_eq!(verdict, Verdict::Confirmed);
    }

    #[tokio::test]
    async fn test_judge_truncates_source_text() {
        let server = MockServer::start();
        let chat_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Source Text: abcde\"");
            then.status(200).json_body(completion("No"));
        });

        let verdict = client(&server)
            .with_max_input_chars(5)
            .judge("claim", "abcdefghijklmnop")
            .await
            .unwrap();

        chat_mock.assert();
        assert_eq!(verdict, Verdict::Refuted);
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).body("rate limited");
        });

        let err = client(&server).judge("claim", "text").await.unwrap_err();
        assert!(matches!(err, VerifyError::OracleError { .. }));
    }

    #[tokio::test]
    async fn test_rewrite_strips_quotes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .json_body(completion("  \"acme blender motor wattage\"\n"));
        });

        let query = client(&server).rewrite("Acme blender has a 1200W motor").await.unwrap();
        assert_eq!(query, "acme blender motor wattage");
    }

    #[tokio::test]
    async fn test_extract_requests_json_and_parses_claims() {
        let server = MockServer::start();
        let chat_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("json_object");
            then.status(200).json_body(completion(
                r#"{"claims": ["1200W motor", "  ", "Six stainless blades"]}"#,
            ));
        });

        let claims = client(&server).extract("Acme Blender. 1200W motor.").await.unwrap();

        chat_mock.assert();
        assert_eq!(claims, vec!["1200W motor", "Six stainless blades"]);
    }

    #[tokio::test]
    async fn test_extract_rejects_unexpected_format() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion("Here are the claims: ..."));
        });

        let err = client(&server).extract("text").await.unwrap_err();
        assert!(matches!(err, VerifyError::ExtractionError { .. }));
    }

    #[tokio::test]
    async fn test_write_includes_tone_and_facts() {
        let server = MockServer::start();
        let chat_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Tone: Witty")
                .body_contains("- 1200W motor");
            then.status(200).json_body(completion("Blend it like you mean it.\n"));
        });

        let copy = client(&server)
            .write(&["1200W motor".to_string()], Tone::Witty)
            .await
            .unwrap();

        chat_mock.assert();
        assert_eq!(copy, "Blend it like you mean it.");
    }
}
