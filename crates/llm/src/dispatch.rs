//! Request dispatch for both API families.
//!
//! One `send` call performs the whole exchange: resolve the credential,
//! format the conversation for the model's family, POST it, and pull the
//! reply text out of the response body. No retries and no timeout beyond
//! the transport default; the caller decides what a failure means.

use banter_core::{credentials, AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::format::{chat_messages, flatten_prompt, ChatMessage};
use crate::registry::{ApiFamily, ModelConfig};
use crate::template::PromptTemplate;

/// Chat-completions request body.
///
/// Sampling settings are deliberately fixed, not user-configurable.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    repetition_penalty: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Text-inference request body for raw-template backends.
#[derive(Debug, Serialize)]
struct RawRequest {
    inputs: String,
    parameters: RawParameters,
}

#[derive(Debug, Serialize)]
struct RawParameters {
    return_full_text: bool,
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct RawGeneration {
    generated_text: String,
}

/// Performs the HTTP exchange for any registered model.
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Send the conversation to a model and return the reply text.
    pub async fn send(&self, model: &ModelConfig, conversation: &Conversation) -> AppResult<String> {
        // Only the credential id may be logged, never its value
        tracing::info!(
            model = %model.short_name,
            turns = conversation.len(),
            "Dispatching request"
        );

        let secret = credentials::resolve(&model.credential_id)?;

        match model.api_family {
            ApiFamily::ChatMessage => self.send_chat(model, conversation, &secret).await,
            ApiFamily::RawTemplate => self.send_raw(model, conversation, &secret).await,
        }
    }

    async fn send_chat(
        &self,
        model: &ModelConfig,
        conversation: &Conversation,
        secret: &str,
    ) -> AppResult<String> {
        let body = ChatRequest {
            model: &model.display_name,
            messages: chat_messages(conversation),
            temperature: 0.9,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            repetition_penalty: 1.0,
            top_k: 0,
        };

        let text = self.post_json(&model.endpoint, secret, &body).await?;

        let response: ChatResponse = serde_json::from_str(&text)?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::MalformedResponse("empty choices array".to_string()))?;

        Ok(choice.message.content)
    }

    async fn send_raw(
        &self,
        model: &ModelConfig,
        conversation: &Conversation,
        secret: &str,
    ) -> AppResult<String> {
        let template = model.template.as_ref().ok_or_else(|| {
            AppError::Config(format!(
                "Model {} is raw-template but has no prompt template",
                model.short_name
            ))
        })?;

        let body = RawRequest {
            inputs: flatten_prompt(template, conversation),
            parameters: RawParameters {
                return_full_text: false,
                max_new_tokens: 2500,
                temperature: 1.0,
            },
        };

        let url = format!("{}{}", model.endpoint, model.display_name);
        let text = self.post_json(&url, secret, &body).await?;

        let generations: Vec<RawGeneration> = serde_json::from_str(&text)?;
        let generation = generations
            .into_iter()
            .next()
            .ok_or_else(|| AppError::MalformedResponse("empty generations array".to_string()))?;

        Ok(extract_reply(template, &generation.generated_text))
    }

    /// POST a JSON body with bearer auth and return the response text,
    /// mapping transport failures and non-2xx statuses to their error
    /// variants.
    async fn post_json<T: Serialize>(&self, url: &str, secret: &str, body: &T) -> AppResult<String> {
        let response = self
            .client
            .post(url)
            .bearer_auth(secret)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Backend returned error status");
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!(bytes = text.len(), "Received response body");
        Ok(text)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Isolate the reply from a raw-template completion.
///
/// Some backends echo the full prompt plus continuation, so keep only what
/// follows the LAST assistant prefix. When the assistant suffix is
/// non-empty, additionally cut at its first occurrence; an empty separator
/// would only yield empty segments, so it is skipped. The result is
/// trimmed of surrounding whitespace.
fn extract_reply(template: &PromptTemplate, generated: &str) -> String {
    let prefix = &template.assistant.prefix;
    let suffix = &template.assistant.suffix;

    let mut reply = if prefix.is_empty() {
        generated
    } else {
        generated.rsplit(prefix.as_str()).next().unwrap_or(generated)
    };

    if !suffix.is_empty() {
        reply = reply.split(suffix.as_str()).next().unwrap_or(reply);
    }

    reply.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;
    use crate::template::Delims;
    use serial_test::serial;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn angle_template(assistant_suffix: &str) -> PromptTemplate {
        PromptTemplate {
            system: None,
            user: Delims::new("<user>", ""),
            assistant: Delims::new("<assistant>", assistant_suffix),
        }
    }

    #[test]
    fn test_extract_reply_with_suffix() {
        let template = angle_template("<end>");
        let raw = "<user>Hi\n<assistant>reply text<end>trailing junk";
        assert_eq!(extract_reply(&template, raw), "reply text");
    }

    #[test]
    fn test_extract_reply_without_suffix_keeps_trailing_remainder() {
        let template = angle_template("");
        let raw = "<user>Hi\n<assistant> reply text \n";
        assert_eq!(extract_reply(&template, raw), "reply text");
    }

    #[test]
    fn test_extract_reply_splits_on_last_prefix() {
        let template = angle_template("<end>");
        let raw = "<assistant>old turn<end>\n<user>Hi\n<assistant>new reply<end>";
        assert_eq!(extract_reply(&template, raw), "new reply");
    }

    /// Minimal one-shot HTTP server: accept a single connection, read the
    /// full request, answer with a canned JSON body. The captured request
    /// body is delivered through the returned receiver so tests can assert
    /// what was actually sent on the wire.
    async fn spawn_mock_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::sync::oneshot::Receiver<String>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (request_tx, request_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            // Drain the request: headers, then content-length body bytes
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            let mut body_start = 0;
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                if let Some(headers_end) = request
                    .windows(4)
                    .position(|w| w == b"\r\n\r\n")
                    .map(|p| p + 4)
                {
                    body_start = headers_end;
                    let headers = String::from_utf8_lossy(&request[..headers_end]);
                    let content_length = headers
                        .lines()
                        .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(str::trim).map(String::from))
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= headers_end + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();

            let request_body = String::from_utf8_lossy(&request[body_start..]).to_string();
            let _ = request_tx.send(request_body);
        });

        (format!("http://{}/", addr), request_rx)
    }

    fn raw_model(endpoint: String) -> ModelConfig {
        ModelConfig {
            short_name: "modelB".to_string(),
            display_name: "test/raw-model".to_string(),
            api_family: ApiFamily::RawTemplate,
            endpoint,
            credential_id: "BANTER_DISPATCH_TEST_KEY".to_string(),
            template: Some(angle_template("<end>")),
        }
    }

    fn chat_model(endpoint: String) -> ModelConfig {
        ModelConfig {
            short_name: "modelA".to_string(),
            display_name: "test/chat-model".to_string(),
            api_family: ApiFamily::ChatMessage,
            endpoint,
            credential_id: "BANTER_DISPATCH_TEST_KEY".to_string(),
            template: None,
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_raw_template_end_to_end() {
        std::env::set_var("BANTER_DISPATCH_TEST_KEY", "test-secret");
        let (endpoint, request) =
            spawn_mock_server("200 OK", r#"[{"generated_text": "<user>Hi\n<assistant>Hello!<end>"}]"#)
                .await;

        let registry = ModelRegistry::from_models(vec![
            chat_model("http://unused.invalid/".to_string()),
            raw_model(endpoint),
        ]);
        let model = registry.lookup("modelB").unwrap();

        let mut conversation = Conversation::new("Provide concise replies.");
        conversation.push_user("Hi");

        let reply = Dispatcher::new().send(model, &conversation).await.unwrap();
        assert_eq!(reply, "Hello!");

        let body: serde_json::Value = serde_json::from_str(&request.await.unwrap()).unwrap();
        assert_eq!(body["inputs"], "<user>Provide concise replies.\nHi\n<assistant>");
        assert_eq!(body["parameters"]["return_full_text"], false);
        assert_eq!(body["parameters"]["max_new_tokens"], 2500);
        std::env::remove_var("BANTER_DISPATCH_TEST_KEY");
    }

    #[tokio::test]
    #[serial]
    async fn test_chat_message_end_to_end() {
        std::env::set_var("BANTER_DISPATCH_TEST_KEY", "test-secret");
        let (endpoint, request) = spawn_mock_server(
            "200 OK",
            r#"{"choices": [{"message": {"role": "assistant", "content": "Hi there"}}]}"#,
        )
        .await;

        let model = chat_model(endpoint);
        let mut conversation = Conversation::new("Provide concise replies.");
        conversation.push_user("Hi");

        let reply = Dispatcher::new().send(&model, &conversation).await.unwrap();
        assert_eq!(reply, "Hi there");

        // The wire body must carry the display name, the conversation as a
        // structured message array, and the fixed sampling constants
        let body: serde_json::Value = serde_json::from_str(&request.await.unwrap()).unwrap();
        assert_eq!(body["model"], "test/chat-model");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "Provide concise replies.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Hi");

        assert_eq!(body["temperature"], 0.9);
        assert_eq!(body["top_p"], 1.0);
        assert_eq!(body["frequency_penalty"], 0.0);
        assert_eq!(body["presence_penalty"], 0.0);
        assert_eq!(body["repetition_penalty"], 1.0);
        assert_eq!(body["top_k"], 0);
        std::env::remove_var("BANTER_DISPATCH_TEST_KEY");
    }

    #[tokio::test]
    #[serial]
    async fn test_non_2xx_maps_to_http_status_error() {
        std::env::set_var("BANTER_DISPATCH_TEST_KEY", "test-secret");
        let (endpoint, _request) =
            spawn_mock_server("503 Service Unavailable", r#"{"error": "loading"}"#).await;

        let model = raw_model(endpoint);
        let mut conversation = Conversation::new("sys");
        conversation.push_user("Hi");

        match Dispatcher::new().send(&model, &conversation).await {
            Err(AppError::HttpStatus { status, body }) => {
                assert_eq!(status, 503);
                assert!(body.contains("loading"));
            }
            other => panic!("Expected HttpStatus, got {:?}", other.map(|_| ())),
        }
        std::env::remove_var("BANTER_DISPATCH_TEST_KEY");
    }

    #[tokio::test]
    #[serial]
    async fn test_unexpected_shape_maps_to_malformed_response() {
        std::env::set_var("BANTER_DISPATCH_TEST_KEY", "test-secret");
        let (endpoint, _request) = spawn_mock_server("200 OK", r#"{"choices": []}"#).await;

        let model = chat_model(endpoint);
        let mut conversation = Conversation::new("sys");
        conversation.push_user("Hi");

        assert!(matches!(
            Dispatcher::new().send(&model, &conversation).await,
            Err(AppError::MalformedResponse(_))
        ));
        std::env::remove_var("BANTER_DISPATCH_TEST_KEY");
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_credential_fails_before_any_network_io() {
        std::env::remove_var("BANTER_DISPATCH_TEST_KEY");

        // Endpoint is unroutable; resolution must fail first
        let model = raw_model("http://unused.invalid/".to_string());
        let mut conversation = Conversation::new("sys");
        conversation.push_user("Hi");

        assert!(matches!(
            Dispatcher::new().send(&model, &conversation).await,
            Err(AppError::CredentialNotFound(_))
        ));
    }
}
