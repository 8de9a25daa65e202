//! Natural-language result summaries. Best-effort: callers log and drop the
//! error rather than failing the search response.

use crate::config::OpenAiSettings;
use crate::openai::{ChatClient, OpenAiError};
use crate::search::{SearchParams, Shop};
use async_trait::async_trait;
use std::fmt::Write as _;

/// At most this many results are described to the model.
pub const MAX_SHOPS_IN_SUMMARY: usize = 5;

const SYSTEM_PROMPT: &str = "あなたはレストラン検索結果を紹介するアシスタントです。\
ユーザーの要望と検索結果をもとに、日本語で短く親しみやすい紹介文を書いてください。\
結果に含まれない店舗を創作してはいけません。";

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error(transparent)]
    OpenAi(#[from] OpenAiError),
}

/// Seam for the summarization call.
#[async_trait]
pub trait ResultSummarizer: Send + Sync {
    async fn summarize(
        &self,
        query: &str,
        params: &SearchParams,
        shops: &[Shop],
    ) -> Result<String, SummaryError>;
}

pub struct OpenAiSummarizer {
    chat: ChatClient,
}

impl OpenAiSummarizer {
    pub fn from_settings(settings: &OpenAiSettings) -> Result<Self, OpenAiError> {
        Ok(Self {
            chat: ChatClient::from_settings(settings)?,
        })
    }
}

#[async_trait]
impl ResultSummarizer for OpenAiSummarizer {
    async fn summarize(
        &self,
        query: &str,
        params: &SearchParams,
        shops: &[Shop],
    ) -> Result<String, SummaryError> {
        let prompt = build_prompt(query, params, shops);
        Ok(self.chat.complete(SYSTEM_PROMPT, &prompt).await?)
    }
}

fn build_prompt(query: &str, params: &SearchParams, shops: &[Shop]) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "ユーザーの要望: {query}");

    let conditions: Vec<String> = params
        .query_pairs()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if !conditions.is_empty() {
        let _ = writeln!(prompt, "検索条件: {}", conditions.join(", "));
    }

    if shops.is_empty() {
        let _ = writeln!(prompt, "検索結果: 該当する店舗はありませんでした。");
        return prompt;
    }

    let _ = writeln!(prompt, "検索結果:");
    for shop in shops.iter().take(MAX_SHOPS_IN_SUMMARY) {
        let _ = writeln!(
            prompt,
            "- {} ({} / {} / {})",
            shop.name, shop.genre.name, shop.budget.name, shop.access
        );
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop(name: &str) -> Shop {
        Shop {
            name: name.to_string(),
            ..Shop::default()
        }
    }

    #[test]
    fn prompt_includes_query_conditions_and_results() {
        let params = SearchParams {
            genre: Some("G001".to_string()),
            ..SearchParams::default()
        };
        let prompt = build_prompt("天神の居酒屋", &params, &[shop("酒場A")]);
        assert!(prompt.contains("天神の居酒屋"));
        assert!(prompt.contains("genre=G001"));
        assert!(prompt.contains("酒場A"));
    }

    #[test]
    fn prompt_caps_the_number_of_shops() {
        let shops: Vec<Shop> = (0..8).map(|i| shop(&format!("店{i}"))).collect();
        let prompt = build_prompt("居酒屋", &SearchParams::default(), &shops);
        assert!(prompt.contains("店4"));
        assert!(!prompt.contains("店5"));
    }

    #[test]
    fn prompt_mentions_an_empty_result_set() {
        let prompt = build_prompt("火星の居酒屋", &SearchParams::default(), &[]);
        assert!(prompt.contains("該当する店舗はありませんでした"));
    }
}
