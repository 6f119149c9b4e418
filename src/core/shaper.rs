//! Response Shaper
//!
//! Converts a raw [`ExecutionResult`] into the content block carried by a
//! JSON-RPC `tools/call` result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool::{CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT, ExecutionResult};

/// One item of a `tools/call` result's `content` array.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Json { json: Value },
    Text { text: String },
}

/// Render one execution result as exactly one content block.
///
/// Unknown content types are wrapped together with their original content
/// type rather than dropped.
pub fn shape(result: &ExecutionResult) -> ContentBlock {
    let content_type = result.content_type.as_str();

    if content_type.eq_ignore_ascii_case(CONTENT_TYPE_JSON) {
        ContentBlock::Json {
            json: result.payload.clone(),
        }
    } else if content_type.eq_ignore_ascii_case(CONTENT_TYPE_TEXT) {
        let text = match &result.payload {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        ContentBlock::Text { text }
    } else {
        ContentBlock::Json {
            json: serde_json::json!({
                "contentType": result.content_type,
                "payload": result.payload,
            }),
        }
    }
}

/// Content array for a `tools/call` result.
pub fn content_items(result: &ExecutionResult) -> Vec<ContentBlock> {
    vec![shape(result)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_payload_is_preserved() {
        let payload = json!({ "message": "Hello", "nested": [1, 2, { "a": null }] });
        let result = ExecutionResult::new("Application/JSON", payload.clone());

        match shape(&result) {
            ContentBlock::Json { json } => assert_eq!(json, payload),
            other => panic!("expected json block, got {other:?}"),
        }
        assert_eq!(result.payload, payload);
    }

    #[test]
    fn text_string_payload_is_used_directly() {
        let result = ExecutionResult::new("TEXT/PLAIN", json!("plain words"));
        assert_eq!(
            shape(&result),
            ContentBlock::Text {
                text: "plain words".to_string()
            }
        );
    }

    #[test]
    fn text_non_string_payload_is_rendered_as_json() {
        let result = ExecutionResult::new("text/plain", json!({ "a": 1 }));
        assert_eq!(
            shape(&result),
            ContentBlock::Text {
                text: r#"{"a":1}"#.to_string()
            }
        );

        let number = ExecutionResult::new("text/plain", json!(42));
        assert_eq!(
            shape(&number),
            ContentBlock::Text {
                text: "42".to_string()
            }
        );
    }

    #[test]
    fn unknown_content_type_is_wrapped() {
        let result = ExecutionResult::new("image/png", json!("aGVsbG8="));
        assert_eq!(
            shape(&result),
            ContentBlock::Json {
                json: json!({ "contentType": "image/png", "payload": "aGVsbG8=" })
            }
        );
    }

    #[test]
    fn blocks_serialize_with_type_tag() {
        let text = serde_json::to_value(ContentBlock::Text {
            text: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(text, json!({ "type": "text", "text": "hi" }));

        let items = content_items(&ExecutionResult::json(json!({ "ok": true })));
        let value = serde_json::to_value(items).unwrap();
        assert_eq!(value, json!([{ "type": "json", "json": { "ok": true } }]));
    }
}
