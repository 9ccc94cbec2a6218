use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use radar_core::{RadarError, RadarResult};

use crate::types::{Assessment, ModelPricing};

const SCAN_MODEL: &str = "gpt-4o-mini";
const DEEP_MODEL: &str = "gpt-4o";

/// OpenAI-backed analysis client for the two escalation tiers
#[derive(Debug, Clone)]
pub struct ResearchClient {
    client: Client<OpenAIConfig>,
    scan_model: String,
    deep_model: String,
    scan_pricing: ModelPricing,
    deep_pricing: ModelPricing,
}

/// Shape the prompts ask the model to respond with
#[derive(Debug, Deserialize)]
struct RawVerdict {
    probability: f64,
    confidence: f64,
    summary: String,
    #[serde(default)]
    citations: Vec<String>,
}

impl ResearchClient {
    /// Requires the OPENAI_API_KEY environment variable. A missing key is a
    /// configuration error; callers disable escalation rather than fail.
    pub fn new() -> RadarResult<Self> {
        if std::env::var("OPENAI_API_KEY").is_err() {
            return Err(RadarError::config(
                "OPENAI_API_KEY environment variable not set",
            ));
        }

        // async-openai reads OPENAI_API_KEY from env automatically
        let config = OpenAIConfig::default();
        let client = Client::with_config(config);

        Ok(Self {
            client,
            scan_model: SCAN_MODEL.to_string(),
            deep_model: DEEP_MODEL.to_string(),
            scan_pricing: ModelPricing::scan_default(),
            deep_pricing: ModelPricing::deep_default(),
        })
    }

    pub fn with_models(mut self, scan_model: &str, deep_model: &str) -> Self {
        self.scan_model = scan_model.to_string();
        self.deep_model = deep_model.to_string();
        self
    }

    /// Cheap first-pass read on a market
    #[instrument(skip(self, news_context))]
    pub async fn scan_market(
        &self,
        title: &str,
        price: Decimal,
        news_context: &str,
        max_cost: Decimal,
    ) -> RadarResult<Assessment> {
        let system_prompt = r#"You are a prediction market analyst doing a fast first-pass read.

Given a market question, its current YES price, and recent headlines, estimate the fair YES probability. Only disagree with the market price when the headlines or base rates give a concrete reason.

Respond with valid JSON in this exact format:
{
  "probability": 0.0,
  "confidence": 0.0,
  "summary": "One short paragraph of reasoning"
}

"probability" is your fair YES estimate (0.0 - 1.0). "confidence" is how sure you are of that estimate (0.0 - 1.0); use low values when information is thin."#;

        let user_prompt = format!(
            "## Market\n{}\n\n## Current YES price\n{}\n\n## Recent headlines\n{}",
            title,
            price,
            if news_context.is_empty() {
                "(none)"
            } else {
                news_context
            },
        );

        self.complete(
            &self.scan_model,
            self.scan_pricing,
            system_prompt,
            &user_prompt,
            max_cost,
        )
        .await
    }

    /// Expensive second-pass analysis, run only for escalated markets
    #[instrument(skip(self, initial_summary, news_context))]
    pub async fn deep_dive(
        &self,
        title: &str,
        price: Decimal,
        initial_summary: &str,
        news_context: &str,
        max_cost: Decimal,
    ) -> RadarResult<Assessment> {
        let system_prompt = r#"You are a research analyst producing a thorough assessment for prediction market traders.

A first-pass scan flagged this market as potentially mispriced. Re-examine it carefully: base rates for this type of event, what the current price implies, upcoming catalysts, the case against the scan's conclusion, and exactly how the market resolves.

Respond with valid JSON in this exact format:
{
  "probability": 0.0,
  "confidence": 0.0,
  "summary": "2-3 paragraph assessment covering base rates, catalysts, and the contrarian case",
  "citations": ["url or source name"]
}

Only keep a probability far from the market price if the evidence survives the contrarian case."#;

        let user_prompt = format!(
            "## Market\n{}\n\n## Current YES price\n{}\n\n## First-pass scan\n{}\n\n## Recent headlines\n{}",
            title,
            price,
            initial_summary,
            if news_context.is_empty() {
                "(none)"
            } else {
                news_context
            },
        );

        self.complete(
            &self.deep_model,
            self.deep_pricing,
            system_prompt,
            &user_prompt,
            max_cost,
        )
        .await
    }

    async fn complete(
        &self,
        model: &str,
        pricing: ModelPricing,
        system_prompt: &str,
        user_prompt: &str,
        max_cost: Decimal,
    ) -> RadarResult<Assessment> {
        let max_tokens = pricing.completion_tokens_for_budget(max_cost);

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| RadarError::internal(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| RadarError::internal(e.to_string()))?
                    .into(),
            ])
            .temperature(0.2)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| RadarError::internal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RadarError::api(format!("OpenAI API error: {}", e)))?;

        let cost = response
            .usage
            .as_ref()
            .map(|u| pricing.cost(u.prompt_tokens, u.completion_tokens))
            .unwrap_or(Decimal::ZERO);

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| RadarError::parse("No response from OpenAI"))?;

        debug!("{} answered with {} chars (${})", model, content.len(), cost);

        let json_str = extract_json(content)?;
        let raw: RawVerdict = serde_json::from_str(&json_str)
            .map_err(|e| RadarError::parse(format!("Failed to parse verdict: {}", e)))?;

        Ok(Assessment {
            probability: decimal_probability(raw.probability)?,
            confidence: decimal_probability(raw.confidence)?,
            summary: raw.summary,
            citations: raw.citations,
            cost,
        })
    }
}

/// Extract JSON from a response, tolerating markdown code fences
fn extract_json(content: &str) -> RadarResult<String> {
    for fence in ["```json", "```"] {
        if let Some(start) = content.find(fence) {
            let start = start + fence.len();
            if let Some(end) = content[start..].find("```") {
                return Ok(content[start..start + end].trim().to_string());
            }
        }
    }

    if let Some(start) = content.find('{') {
        if let Some(end) = content.rfind('}') {
            return Ok(content[start..=end].to_string());
        }
    }

    Err(RadarError::parse("No JSON found in response"))
}

/// A model-reported probability as a Decimal clamped to [0, 1]
fn decimal_probability(value: f64) -> RadarResult<Decimal> {
    let decimal = Decimal::from_f64(value)
        .ok_or_else(|| RadarError::parse(format!("non-finite probability: {}", value)))?;
    Ok(decimal.clamp(Decimal::ZERO, Decimal::ONE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn extracts_json_from_code_blocks() {
        let content = "Here you go:\n```json\n{\"probability\": 0.6}\n```\nDone.";
        assert_eq!(extract_json(content).unwrap(), "{\"probability\": 0.6}");

        let bare = "```\n{\"probability\": 0.6}\n```";
        assert_eq!(extract_json(bare).unwrap(), "{\"probability\": 0.6}");
    }

    #[test]
    fn extracts_raw_json() {
        let content = "prefix {\"probability\": 0.6, \"confidence\": 0.4} suffix";
        assert_eq!(
            extract_json(content).unwrap(),
            "{\"probability\": 0.6, \"confidence\": 0.4}"
        );
    }

    #[test]
    fn rejects_responses_without_json() {
        assert!(extract_json("no json here").is_err());
    }

    #[test]
    fn probabilities_are_clamped() {
        assert_eq!(decimal_probability(1.4).unwrap(), Decimal::ONE);
        assert_eq!(decimal_probability(-0.2).unwrap(), Decimal::ZERO);
        assert_eq!(decimal_probability(0.65).unwrap(), dec!(0.65));
        assert!(decimal_probability(f64::NAN).is_err());
    }
}
