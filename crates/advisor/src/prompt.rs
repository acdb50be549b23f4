//! Prompt composition: the instruction text and the message sequence sent to
//! the model.

use lexline_config::AppConfig;
use lexline_core::category::Category;
use lexline_core::context::ContextLedger;
use lexline_core::message::Message;
use lexline_core::provider::ProviderRequest;

use crate::knowledge::profile;

/// Number of prior ledger entries replayed to the model.
pub const CONTEXT_WINDOW: usize = 10;

/// Sampling settings applied to every exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            temperature: 0.1,
            max_tokens: 1500,
            presence_penalty: 0.1,
            frequency_penalty: 0.1,
        }
    }
}

impl PromptSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            max_tokens: config.default_max_tokens,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
        }
    }
}

/// The system instruction for `category`.
pub fn build_instruction(category: Category) -> String {
    let description = profile(category).description;

    format!(
        "You are a specialized UK Legal Rights AI assistant with expertise in {description}.

CRITICAL INSTRUCTIONS:
1. Provide accurate, current UK legal information only
2. Always cite relevant UK legislation, acts, and regulations
3. Include specific sections where applicable
4. Clarify that this is general information, not specific legal advice
5. Recommend consulting a qualified UK solicitor for specific cases
6. Use clear, accessible language while maintaining legal accuracy
7. Structure responses with clear headings and bullet points
8. Include practical next steps where appropriate

RESPONSE FORMAT:
- Start with a brief summary of the legal position
- Provide detailed explanation with relevant law citations
- Include practical advice and next steps
- End with appropriate disclaimers

LEGAL CONTEXT: {description}

Remember: Always maintain a professional tone and provide comprehensive, accurate UK legal information."
    )
}

/// System instruction, then the last [`CONTEXT_WINDOW`] ledger entries in
/// their original order, then the new user message.
pub fn build_message_sequence(
    instruction: &str,
    prior: &ContextLedger,
    new_message: &str,
) -> Vec<Message> {
    let window = prior.window(CONTEXT_WINDOW);

    let mut messages = Vec::with_capacity(window.len() + 2);
    messages.push(Message::system(instruction));
    messages.extend(window.iter().map(|entry| entry.to_message()));
    messages.push(Message::user(new_message));
    messages
}

pub fn build_request(
    category: Category,
    prior: &ContextLedger,
    new_message: &str,
    settings: &PromptSettings,
) -> ProviderRequest {
    let instruction = build_instruction(category);
    let messages = build_message_sequence(&instruction, prior, new_message);

    let mut request = ProviderRequest::new(settings.model.clone(), messages)
        .with_max_tokens(settings.max_tokens);
    request.temperature = settings.temperature;
    request.presence_penalty = Some(settings.presence_penalty);
    request.frequency_penalty = Some(settings.frequency_penalty);
    request
}
