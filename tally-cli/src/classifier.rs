//! External category classifier for transactions the rules could not settle.
//!
//! The enrichment core only produces the context block; this module sends it to
//! an LLM and reads back `{"granular": "...", "general": "..."}`.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::future::Future;

use tally_core::RuleCategory;

use crate::auth::AuthState;
use crate::config::ClassifierSection;

const SYSTEM_PROMPT: &str = "You categorize personal-finance transactions. \
You receive a short block describing one transaction (merchant, location, amount, \
payment channel, inferred merchant type, geohash). Reply with a single JSON object \
and nothing else: {\"granular\": \"<specific category>\", \"general\": \"<broad category>\"}. \
Examples of general categories: Food & Dining, Transportation, Shopping, Entertainment, \
Bills & Utilities, Travel, Health, Income, Transfer.";

pub trait Classifier {
    fn classify(&self, ai_context: &str) -> impl Future<Output = Result<RuleCategory>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => bail!("unknown classifier provider '{other}' (expected openai or anthropic)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmClassifier {
    provider: Provider,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    api_key: String,
    client: reqwest::Client,
}

impl LlmClassifier {
    pub fn from_config(section: &ClassifierSection, auth: &AuthState) -> Result<Self> {
        let provider = Provider::parse(&section.provider)?;
        let api_key = match provider {
            Provider::OpenAI => auth
                .openai_key()
                .ok_or_else(|| anyhow!("missing OpenAI key; set OPENAI_API_KEY or run: tally auth paste-openai-api-key"))?,
            Provider::Anthropic => auth
                .anthropic_key()
                .ok_or_else(|| anyhow!("missing Anthropic key; set ANTHROPIC_API_KEY or run: tally auth paste-anthropic-token"))?,
        };

        Ok(Self {
            provider,
            model: section.model.clone(),
            base_url: section.base_url.trim_end_matches('/').to_string(),
            temperature: section.temperature,
            max_tokens: section.max_tokens,
            api_key,
            client: reqwest::Client::new(),
        })
    }

    async fn anthropic_complete(&self, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            system: &'a str,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: SYSTEM_PROMPT,
            messages: vec![Msg { role: "user", content: user }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }

    async fn openai_complete(&self, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &self.model,
            messages: vec![
                Msg { role: "system", content: SYSTEM_PROMPT },
                Msg { role: "user", content: user },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

impl Classifier for LlmClassifier {
    async fn classify(&self, ai_context: &str) -> Result<RuleCategory> {
        let reply = match self.provider {
            Provider::Anthropic => self.anthropic_complete(ai_context).await?,
            Provider::OpenAI => self.openai_complete(ai_context).await?,
        };
        parse_category_reply(&reply)
    }
}

/// Pull the `{granular, general}` object out of a model reply.
/// Tolerates code fences and chatter around the JSON.
pub fn parse_category_reply(reply: &str) -> Result<RuleCategory> {
    let start = reply.find('{').ok_or_else(|| anyhow!("no JSON object in reply: {reply}"))?;
    let end = reply.rfind('}').ok_or_else(|| anyhow!("no JSON object in reply: {reply}"))?;
    if end < start {
        bail!("malformed JSON object in reply: {reply}");
    }

    let category: RuleCategory = serde_json::from_str(&reply[start..=end])
        .with_context(|| format!("parse category from reply: {reply}"))?;

    if category.granular.trim().is_empty() || category.general.trim().is_empty() {
        bail!("classifier returned an empty category: {reply}");
    }
    Ok(RuleCategory::new(category.granular.trim(), category.general.trim()))
}
