//! Gemini proxy: chat replies and structured coin analysis.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("gemini request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gemini returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("gemini returned no text")]
    EmptyResponse,
    #[error("failed to parse analysis response: {0}")]
    AnalysisParse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketContext {
    pub current_trend: String,
    pub volatility: String,
    pub market_sentiment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub decision: String,
    pub confidence: f64,
    pub risk_level: String,
}

/// Structured buy/sell analysis for one coin, as requested from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinAnalysis {
    pub summary: String,
    pub market_context: MarketContext,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub recommendation: Recommendation,
}

pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = self
            .client
            .post(GEMINI_ENDPOINT)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let value: Value = response.json().await?;
        value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or(AssistantError::EmptyResponse)
    }

    /// Answer a user question within the crypto-bot persona.
    pub async fn chat(&self, question: &str) -> Result<String, AssistantError> {
        self.generate(&chat_prompt(question)).await
    }

    /// Ask for a structured analysis of a proposed buy or sell.
    pub async fn coin_analysis(
        &self,
        crypto: &str,
        action: &str,
        amount: f64,
    ) -> Result<CoinAnalysis, AssistantError> {
        let text = self.generate(&analysis_prompt(crypto, action, amount)).await?;
        parse_analysis(&text)
    }
}

/// Parse the model's analysis reply, tolerating a markdown code fence
/// around the JSON object.
pub fn parse_analysis(text: &str) -> Result<CoinAnalysis, AssistantError> {
    Ok(serde_json::from_str(strip_code_fences(text))?)
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

fn chat_prompt(question: &str) -> String {
    format!(
        "You are a cryptocurrency explanation bot. Your only role is to answer questions \
         and provide information about cryptocurrency and blockchain-related topics.\n\
         If the user's question is about cryptocurrency, respond in complete, well-written \
         sentences organized into one or two concise paragraphs. Do not use bullet points, \
         lists, markdown, or formatting of any kind. Keep your response limited to a maximum \
         of five sentences.\n\
         If the user's question is not related to cryptocurrency or blockchain, respond with \
         exactly:\n\
         \"Sorry, I'm a crypto bot. I can not answer that.\"\n\n\
         User's question: {question}"
    )
}

fn analysis_prompt(crypto: &str, action: &str, amount: f64) -> String {
    format!(
        "You are a cryptocurrency market analyst. Analyze {crypto} for a potential {action} \
         decision.\n\n\
         Provide a detailed analysis in JSON format with the following structure:\n\
         {{\n\
           \"summary\": \"2-3 sentence overview of the cryptocurrency\",\n\
           \"market_context\": {{\n\
             \"current_trend\": \"bullish/bearish/neutral\",\n\
             \"volatility\": \"high/medium/low\",\n\
             \"market_sentiment\": \"brief description\"\n\
           }},\n\
           \"pros\": [\"Pro point 1\", \"Pro point 2\", \"Pro point 3\"],\n\
           \"cons\": [\"Con point 1\", \"Con point 2\", \"Con point 3\"],\n\
           \"recommendation\": {{\n\
             \"decision\": \"buy/sell/hold\",\n\
             \"confidence\": 75,\n\
             \"risk_level\": \"low/medium/high\"\n\
           }}\n\
         }}\n\n\
         Important:\n\
         - Be realistic and balanced\n\
         - Base analysis on general market knowledge\n\
         - Confidence should be 0-100\n\
         - For {action} action of {amount} {crypto}, provide relevant context\n\n\
         Respond with ONLY the JSON object, no additional text."
    )
}
