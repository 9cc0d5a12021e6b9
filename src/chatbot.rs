//! Help-chatbot proxy.
//!
//! Stateless forwarder to a hosted LLM (OpenRouter chat completions) with a
//! role-specific system prompt. Like the mailer, this is an isolated failure
//! domain: any error becomes a friendly fallback reply instead of a failed
//! request.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::models::Role;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const MODEL: &str = "meta-llama/llama-3.2-3b-instruct:free";

const TENANT_PROMPT: &str = "You are RentAssist AI, an assistant for an online house rental \
and tenant management system. The user you are helping is a TENANT. Only answer within the \
context of this rental application: searching and viewing properties, sending booking \
requests, understanding booking statuses (Pending / Approved / Rejected), contacting owners \
after approval, and rating properties and owners. Do not invent database records, do not \
give legal or financial advice, and never ask for passwords or personal data. Be friendly, \
concise, and use simple English.";

const OWNER_PROMPT: &str = "You are RentAssist AI, an assistant for an online house rental \
and tenant management system. The user you are helping is an OWNER. Only answer within the \
context of this rental application: adding, editing and deleting properties, viewing tenant \
booking requests, approving or rejecting tenants, and managing listings. Do not invent \
database records, do not give legal or financial advice, and never ask for passwords or \
personal data. Be friendly, concise, and use simple English.";

const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error. Please try again or contact support if the issue persists.";
const UNCONFIGURED_REPLY: &str =
    "Sorry, the chatbot service is not configured correctly. Please contact support.";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

pub struct Chatbot {
    client: Client,
    api_key: Option<String>,
}

impl Chatbot {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Forward a message plus conversation history; never fails outward.
    pub async fn reply(&self, message: &str, role: Role, history: &[ChatMessage]) -> String {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("chatbot request with no OPENROUTER_API_KEY configured");
                return UNCONFIGURED_REPLY.to_string();
            }
        };

        let system = match role {
            Role::Owner => OWNER_PROMPT,
            _ => TENANT_PROMPT,
        };
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: system.to_string(),
        }];
        messages.extend_from_slice(history);
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });

        let response = self
            .client
            .post(format!("{OPENROUTER_BASE_URL}/chat/completions"))
            .bearer_auth(api_key)
            .header("HTTP-Referer", "https://rentalapp.com")
            .header("X-Title", "RentAssist AI")
            .json(&json!({
                "model": MODEL,
                "messages": messages,
                "temperature": 0.7,
                "max_tokens": 500,
            }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("chatbot request failed: {e}");
                return FALLBACK_REPLY.to_string();
            }
        };

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            warn!("chatbot API rejected the configured key");
            return UNCONFIGURED_REPLY.to_string();
        }

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("chatbot response parse failed: {e}");
                return FALLBACK_REPLY.to_string();
            }
        };

        match body["choices"][0]["message"]["content"].as_str() {
            Some(content) if !content.is_empty() => content.to_string(),
            _ => {
                warn!("chatbot returned no content: {body}");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
