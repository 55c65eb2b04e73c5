use serde::{Deserialize, Serialize};

pub struct Client {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub total_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

impl Client {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            http: reqwest::Client::new(),
        }
    }

    pub async fn chat(&self, req: &CompletionRequest) -> Result<Completion, Error> {
        let request = ApiRequest {
            model: self.model.clone(),
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: req.system_prompt.clone(),
                },
                ApiMessage {
                    role: "user",
                    content: req.user_prompt.clone(),
                },
            ],
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        };

        let response = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let total_tokens = api_response.usage.map(|u| u.total_tokens);

        api_response
            .choices
            .first()
            .map(|c| Completion {
                text: c.message.content.clone(),
                total_tokens,
            })
            .ok_or(Error::Empty)
    }
}

#[derive(Debug)]
pub enum Error {
    Http(String),
    Api(String),
    Parse(String),
    Empty,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Api(e) => write!(f, "API error: {e}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
            Error::Empty => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let raw = r#"{
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "gracias!! abrazo grande"},
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 210, "completion_tokens": 12, "total_tokens": 222}
        }"#;

        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "gracias!! abrazo grande");
        assert_eq!(parsed.usage.map(|u| u.total_tokens), Some(222));
    }

    #[test]
    fn test_parse_chat_response_without_usage() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "feliz!"}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn test_request_wire_shape() {
        let request = ApiRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: "instrucciones".to_string(),
                },
                ApiMessage {
                    role: "user",
                    content: "feliz cumple".to_string(),
                },
            ],
            max_tokens: 150,
            temperature: 0.8,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["max_tokens"], 150);
        assert_eq!(value["temperature"], 0.8);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "feliz cumple");
    }
}
