//! Query-string encoding.
//!
//! A query is any `Serialize` value that turns into a flat JSON object.
//! Fields serialize in declaration order; `null` fields are dropped so
//! optional filters never reach the wire.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Flatten `query` into ordered `(key, value)` pairs.
pub fn to_pairs<Q: Serialize + ?Sized>(query: &Q) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(query).map_err(|e| Error::Encoding(e.to_string()))?;
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(Error::Encoding(format!(
                "query must serialize to an object, got {other}"
            )))
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let rendered = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(Error::Encoding(format!(
                    "query field `{key}` is not a scalar"
                )))
            }
        };
        pairs.push((key, rendered));
    }
    Ok(pairs)
}

/// Percent-encode pairs as `application/x-www-form-urlencoded`.
pub fn encode(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Filter {
        string_id: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        order_by: Option<String>,
        target_language_id: Option<String>,
        resolved: Option<bool>,
    }

    #[test]
    fn absent_fields_are_omitted() {
        let pairs = to_pairs(&Filter {
            string_id: 3,
            order_by: None,
            target_language_id: None,
            resolved: None,
        })
        .unwrap();
        assert_eq!(pairs, vec![("stringId".to_string(), "3".to_string())]);
    }

    #[test]
    fn scalars_are_rendered() {
        let pairs = to_pairs(&Filter {
            string_id: 3,
            order_by: Some("createdAt desc".to_string()),
            target_language_id: Some("uk".to_string()),
            resolved: Some(true),
        })
        .unwrap();
        assert_eq!(
            encode(&pairs),
            "stringId=3&orderBy=createdAt+desc&targetLanguageId=uk&resolved=true"
        );
    }

    #[test]
    fn unit_query_is_empty() {
        assert!(to_pairs(&()).unwrap().is_empty());
    }

    #[test]
    fn non_object_query_is_rejected() {
        let err = to_pairs(&[1, 2]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn nested_value_is_rejected() {
        let err = to_pairs(&serde_json::json!({ "a": { "b": 1 } })).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
