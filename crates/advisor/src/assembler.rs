//! Turns answer text into the caller-facing exchange result.

use chrono::Utc;
use lexline_core::category::Category;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::knowledge::profile;

const MODEL_PREFIX: &str = "LR";
const FALLBACK_PREFIX: &str = "FB";
const ID_SUFFIX_LEN: usize = 6;
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// The answer to one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResult {
    pub response_text: String,
    pub citations: String,
    /// Correlation id: `LR-…` for model answers, `FB-…` for fallbacks.
    pub response_id: String,
    pub category: Category,
}

impl ExchangeResult {
    pub fn is_fallback(&self) -> bool {
        self.response_id.starts_with(FALLBACK_PREFIX)
    }
}

/// Wrap a model answer.
pub fn assemble(category: Category, model_text: impl Into<String>) -> ExchangeResult {
    build(category, model_text.into(), MODEL_PREFIX)
}

/// Wrap a generated fallback answer.
pub fn assemble_fallback(category: Category, fallback_text: impl Into<String>) -> ExchangeResult {
    build(category, fallback_text.into(), FALLBACK_PREFIX)
}

fn build(category: Category, response_text: String, prefix: &str) -> ExchangeResult {
    ExchangeResult {
        response_text,
        citations: profile(category).citations.to_string(),
        response_id: response_id(prefix),
        category,
    }
}

fn response_id(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{prefix}-{}-{suffix}", Utc::now().timestamp_millis())
}
