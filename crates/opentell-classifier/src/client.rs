use serde::{Deserialize, Serialize};
use serde_json::Value;

use opentell_types::{thresholds, Area, Certainty, Classification, DetectionMethod, Pair, RejectionClass, Scope, Signal};

use crate::prompts::CLASSIFIER_SYSTEM_PROMPT;

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 300;
const ASSISTANT_TRUNCATE: usize = 500;
const DEVELOPER_TRUNCATE: usize = 500;
const ERROR_CONTEXT_TRUNCATE: usize = 300;

/// Outcome of one `classify(pair)` call (spec.md §4.6). `classify` never
/// returns `Result` — transport and parse failures collapse into
/// `Unclassifiable` so the caller never has to propagate them.
pub enum ClassifyOutcome {
    Learning(Signal),
    Rejected(RejectionClass),
    Unclassifiable,
}

#[derive(Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<RequestMessage>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

fn build_user_message(
    pair: &Pair,
    error_context: Option<&str>,
    tool_context: Option<&str>,
) -> String {
    let mut msg = format!(
        "Assistant said: {}\nDeveloper replied: {}",
        truncate(&pair.assistant_text, ASSISTANT_TRUNCATE),
        truncate(&pair.developer_text, DEVELOPER_TRUNCATE),
    );
    if let Some(err) = error_context {
        msg.push_str(&format!("\nError context: {}", truncate(err, ERROR_CONTEXT_TRUNCATE)));
    }
    if let Some(tools) = tool_context {
        msg.push_str(&format!("\nTool context:\n{tools}"));
    }
    msg
}

fn parse_response(body: &Value) -> Option<ClassifyOutcome> {
    let classification_str = body.get("classification")?.as_str()?;

    if let Some(rejection) = parse_rejection(classification_str) {
        return Some(ClassifyOutcome::Rejected(rejection));
    }

    let classification = Classification::parse(classification_str)?;
    let text = body.get("learning")?.as_str()?.trim().to_string();
    if text.is_empty() {
        return None;
    }
    let scope = match body.get("scope").and_then(|v| v.as_str()) {
        Some("global") => Scope::Global,
        Some("language") => Scope::Language,
        _ => Scope::Repo,
    };
    let certainty = match body.get("certainty").and_then(|v| v.as_str()) {
        Some("high") => Certainty::High,
        _ => Certainty::Low,
    };
    let area = match body.get("area").and_then(|v| v.as_str()) {
        Some("architecture") => Area::Architecture,
        Some("frontend") => Area::Frontend,
        Some("backend") => Area::Backend,
        Some("testing") => Area::Testing,
        Some("devops") => Area::Devops,
        Some("data") => Area::Data,
        Some("ux") => Area::Ux,
        _ => Area::General,
    };

    let confidence = thresholds::starting_confidence(classification, certainty);
    Some(ClassifyOutcome::Learning(Signal::new(
        text,
        confidence,
        classification,
        scope,
        area,
        DetectionMethod::Llm,
    )))
}

fn parse_rejection(classification_str: &str) -> Option<RejectionClass> {
    match classification_str {
        "SITUATIONAL" => Some(RejectionClass::Situational),
        "FACTUAL" => Some(RejectionClass::Factual),
        "CONTINUATION" => Some(RejectionClass::Continuation),
        _ => None,
    }
}

/// Classify one (assistant, developer) pair against the remote model.
/// Transport failures, non-2xx responses, and malformed JSON all collapse
/// into `Unclassifiable` — the caller must never propagate a classifier
/// failure into the learning pipeline (spec.md §4.6, §7).
pub fn classify(
    client: &reqwest::blocking::Client,
    api_key: &str,
    model: &str,
    pair: &Pair,
    error_context: Option<&str>,
    tool_context: Option<&str>,
) -> ClassifyOutcome {
    let user_message = build_user_message(pair, error_context, tool_context);
    let request = MessagesRequest {
        model,
        max_tokens: MAX_TOKENS,
        system: CLASSIFIER_SYSTEM_PROMPT,
        messages: vec![RequestMessage {
            role: "user",
            content: user_message,
        }],
    };

    let response = client
        .post(ANTHROPIC_MESSAGES_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&request)
        .send();

    let response = match response {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            tracing::warn!(status = %r.status(), "classifier request returned non-success status");
            return ClassifyOutcome::Unclassifiable;
        }
        Err(err) => {
            tracing::warn!(error = %err, "classifier request failed");
            return ClassifyOutcome::Unclassifiable;
        }
    };

    let parsed: Result<MessagesResponse, _> = response.json();
    let Ok(parsed) = parsed else {
        return ClassifyOutcome::Unclassifiable;
    };

    let Some(text) = parsed.content.first().map(|b| b.text.as_str()) else {
        return ClassifyOutcome::Unclassifiable;
    };

    let Ok(body) = serde_json::from_str::<Value>(text.trim()) else {
        return ClassifyOutcome::Unclassifiable;
    };

    parse_response(&body).unwrap_or(ClassifyOutcome::Unclassifiable)
}

/// Send one system/user prompt pair to the language model and return the
/// raw text of the first response block. Used by the consolidator and
/// profile synthesizer, which each parse that text their own way (strict
/// JSON for consolidation, plain prose for the profile). Collapses every
/// transport/parse failure to `None` — same discipline as `classify`.
pub fn synthesize(
    client: &reqwest::blocking::Client,
    api_key: &str,
    model: &str,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
) -> Option<String> {
    let request = MessagesRequest {
        model,
        max_tokens,
        system: system_prompt,
        messages: vec![RequestMessage {
            role: "user",
            content: user_message.to_string(),
        }],
    };

    let response = client
        .post(ANTHROPIC_MESSAGES_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&request)
        .send();

    let response = match response {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            tracing::warn!(status = %r.status(), "synthesis request returned non-success status");
            return None;
        }
        Err(err) => {
            tracing::warn!(error = %err, "synthesis request failed");
            return None;
        }
    };

    let parsed: MessagesResponse = response.json().ok()?;
    parsed.content.into_iter().next().map(|b| b.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pair() -> Pair {
        let now = Utc::now();
        Pair {
            assistant_text: "I'll add a retry loop".to_string(),
            developer_text: "make sure errors surface instead of retrying silently".to_string(),
            assistant_at: now,
            developer_at: now,
        }
    }

    #[test]
    fn build_user_message_includes_contexts() {
        let msg = build_user_message(&pair(), Some("panic: index out of bounds"), Some("bash: cargo test"));
        assert!(msg.contains("Assistant said"));
        assert!(msg.contains("Error context"));
        assert!(msg.contains("Tool context"));
    }

    #[test]
    fn parse_response_builds_learning_from_matrix_confidence() {
        let body: Value = serde_json::from_str(
            r#"{"classification":"QUALITY_STANDARD","learning":"Surfaces errors instead of silent retries","scope":"repo","certainty":"high","area":"backend"}"#,
        )
        .unwrap();
        let outcome = parse_response(&body).unwrap();
        match outcome {
            ClassifyOutcome::Learning(signal) => {
                assert_eq!(signal.classification, Classification::QualityStandard);
                assert_eq!(signal.confidence, 0.35);
            }
            _ => panic!("expected a learning outcome"),
        }
    }

    #[test]
    fn parse_response_recognizes_rejection_classes() {
        let body: Value = serde_json::from_str(r#"{"classification":"FACTUAL"}"#).unwrap();
        let outcome = parse_response(&body).unwrap();
        assert!(matches!(outcome, ClassifyOutcome::Rejected(RejectionClass::Factual)));
    }

    #[test]
    fn parse_response_rejects_malformed_body() {
        let body: Value = serde_json::from_str(r#"{"nonsense": true}"#).unwrap();
        assert!(parse_response(&body).is_none());
    }
}
