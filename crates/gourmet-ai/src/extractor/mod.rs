//! Entity extraction: asks the language model to pull search fields out of a
//! free-form restaurant request. The model returns names and phrases, never
//! codes; resolving them against the taxonomy is the resolver's job.

use crate::config::OpenAiSettings;
use crate::openai::{ChatClient, OpenAiError};
use crate::resolver::raw::{FieldIssue, RawExtraction};
use async_trait::async_trait;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "あなたはレストラン検索の条件抽出アシスタントです。\
ユーザーの入力から検索条件を抽出し、JSONオブジェクトのみで返してください。\
使用できるキー: location, large_area, middle_area, small_area, genre, budget, \
keyword, private_room, lunch, free_food, free_drink, midnight, cocktail, sake, wine。\
確信のないキーは省略してください。エリアやジャンルは入力に現れた名称のまま返し、\
コードに変換しないでください。\
**応答は、先頭から末尾まで純粋なJSONオブジェクトのみで構成してください。\
コメント、説明文、コードブロック記号（```）は厳禁です。**";

#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error(transparent)]
    OpenAi(#[from] OpenAiError),
    #[error("model response contained no JSON object: {response}")]
    NoJsonObject { response: String },
    #[error("model response was not valid JSON: {source}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
    },
}

/// Seam for the language-model extraction call. Field-level decode issues
/// travel with the extraction so callers can report the degradation.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(
        &self,
        query: &str,
    ) -> Result<(RawExtraction, Vec<FieldIssue>), ExtractorError>;
}

/// OpenAI-backed extractor.
pub struct OpenAiExtractor {
    chat: ChatClient,
}

impl OpenAiExtractor {
    pub fn from_settings(settings: &OpenAiSettings) -> Result<Self, OpenAiError> {
        Ok(Self {
            chat: ChatClient::from_settings(settings)?,
        })
    }
}

#[async_trait]
impl EntityExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        query: &str,
    ) -> Result<(RawExtraction, Vec<FieldIssue>), ExtractorError> {
        let response = self.chat.complete(SYSTEM_PROMPT, query).await?;
        let (extraction, issues) = decode_response(&response)?;
        for issue in &issues {
            warn!(field = issue.field, "extraction field degraded to absent");
        }
        Ok((extraction, issues))
    }
}

/// Recovers the JSON object from the model output. Models occasionally wrap
/// the object in prose or code fences despite instructions, so slice from the
/// first `{` to the last `}` before parsing.
fn decode_response(response: &str) -> Result<(RawExtraction, Vec<FieldIssue>), ExtractorError> {
    let start = response.find('{');
    let end = response.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ExtractorError::NoJsonObject {
            response: response.to_string(),
        });
    };
    if end < start {
        return Err(ExtractorError::NoJsonObject {
            response: response.to_string(),
        });
    }

    let payload = &response[start..=end];
    debug!(length = payload.len(), "decoding extraction payload");
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|source| ExtractorError::MalformedJson { source })?;
    Ok(RawExtraction::from_value(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::raw::RawValue;

    #[test]
    fn decodes_a_plain_json_object() {
        let (extraction, issues) =
            decode_response(r#"{ "genre": "居酒屋", "location": "天神" }"#)
                .expect("plain object decodes");
        assert!(issues.is_empty());
        assert_eq!(extraction.genre, RawValue::Text("居酒屋".to_string()));
        assert_eq!(extraction.location, RawValue::Text("天神".to_string()));
    }

    #[test]
    fn strips_code_fences_and_prose() {
        let response = "もちろんです。\n```json\n{ \"genre\": \"ラーメン\" }\n```\n以上です。";
        let (extraction, _) = decode_response(response).expect("fenced object decodes");
        assert_eq!(extraction.genre, RawValue::Text("ラーメン".to_string()));
    }

    #[test]
    fn response_without_braces_is_an_error() {
        assert!(matches!(
            decode_response("すみません、条件が読み取れませんでした。"),
            Err(ExtractorError::NoJsonObject { .. })
        ));
    }

    #[test]
    fn invalid_json_between_braces_is_an_error() {
        assert!(matches!(
            decode_response("{ genre: unquoted }"),
            Err(ExtractorError::MalformedJson { .. })
        ));
    }

    #[test]
    fn malformed_fields_degrade_without_failing() {
        let (extraction, issues) =
            decode_response(r#"{ "genre": { "name": "居酒屋" }, "keyword": "個室" }"#)
                .expect("object decodes");
        assert_eq!(issues.len(), 1);
        assert!(extraction.genre.is_absent());
        assert_eq!(extraction.keyword, RawValue::Text("個室".to_string()));
    }

    struct CannedExtractor(&'static str);

    #[async_trait]
    impl EntityExtractor for CannedExtractor {
        async fn extract(
            &self,
            _query: &str,
        ) -> Result<(RawExtraction, Vec<FieldIssue>), ExtractorError> {
            decode_response(self.0)
        }
    }

    #[tokio::test]
    async fn extractor_seam_carries_field_issues_through() {
        let extractor: std::sync::Arc<dyn EntityExtractor> = std::sync::Arc::new(
            CannedExtractor(r#"{ "genre": "居酒屋", "budget": ["3000"] }"#),
        );
        let (extraction, issues) = extractor
            .extract("居酒屋に行きたい")
            .await
            .expect("canned response decodes");
        assert_eq!(extraction.genre, RawValue::Text("居酒屋".to_string()));
        assert_eq!(issues, vec![FieldIssue { field: "budget" }]);
    }
}
