//! Wire format of the reputation service's batch lookup response.
//!
//! The body is JSON wrapping a second JSON document as a string:
//! `{"responseData": "{\"respMap\": {\"<url>\": {\"threatName\": ...,
//! \"zurldblist\": [...]}}}"}`. Anything that does not parse this way
//! (typically an HTML authentication redirect) fails the batch as a unit.

use crate::lookup::LookupError;
use serde::Deserialize;
use std::collections::HashMap;

/// Outer envelope; `responseData` is itself a JSON string.
#[derive(Debug, Deserialize)]
struct LookupEnvelope {
    #[serde(rename = "responseData")]
    response_data: String,
}

#[derive(Debug, Deserialize)]
struct LookupPayload {
    #[serde(rename = "respMap")]
    resp_map: HashMap<String, WireEntry>,
}

/// Per-URL entry in the service's response map.
#[derive(Debug, Clone, Deserialize)]
pub struct WireEntry {
    #[serde(default, rename = "threatName")]
    pub threat_name: Option<String>,
    #[serde(default, rename = "zurldblist")]
    pub categories: Vec<String>,
}

/// Parses a raw response body into the per-URL entry map.
pub fn parse_lookup_response(body: &str) -> Result<HashMap<String, WireEntry>, LookupError> {
    let envelope: LookupEnvelope =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    let payload: LookupPayload = serde_json::from_str(&envelope.response_data)
        .map_err(|e| LookupError::Malformed(e.to_string()))?;
    Ok(payload.resp_map)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a well-formed body with the double-encoded payload.
    pub(crate) fn wire_body(entries: &[(&str, Option<&str>, &[&str])]) -> String {
        let mut resp_map = serde_json::Map::new();
        for (url, threat, cats) in entries {
            let mut entry = serde_json::Map::new();
            if let Some(t) = threat {
                entry.insert("threatName".to_string(), serde_json::json!(t));
            }
            entry.insert("zurldblist".to_string(), serde_json::json!(cats));
            resp_map.insert(url.to_string(), serde_json::Value::Object(entry));
        }
        let inner = serde_json::json!({ "respMap": resp_map }).to_string();
        serde_json::json!({ "responseData": inner }).to_string()
    }

    #[test]
    fn parses_double_encoded_payload() {
        let body = wire_body(&[
            ("bad.example.com", Some("Trojan.Agent"), &["MALWARE"]),
            ("good.example.com", None, &["NEWS_AND_MEDIA"]),
        ]);
        let map = parse_lookup_response(&body).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map["bad.example.com"].threat_name.as_deref(),
            Some("Trojan.Agent")
        );
        assert!(map["good.example.com"].threat_name.is_none());
        assert_eq!(map["good.example.com"].categories, vec!["NEWS_AND_MEDIA"]);
    }

    #[test]
    fn html_body_is_malformed() {
        let err = parse_lookup_response("<html><body>Sign in</body></html>").unwrap_err();
        assert!(matches!(err, LookupError::Malformed(_)));
    }

    #[test]
    fn valid_outer_with_garbage_inner_is_malformed() {
        let body = serde_json::json!({ "responseData": "<html>login</html>" }).to_string();
        assert!(matches!(
            parse_lookup_response(&body),
            Err(LookupError::Malformed(_))
        ));
    }

    #[test]
    fn missing_optional_fields_default() {
        let inner = r#"{"respMap": {"x.com": {}}}"#;
        let body = serde_json::json!({ "responseData": inner }).to_string();
        let map = parse_lookup_response(&body).unwrap();
        assert!(map["x.com"].threat_name.is_none());
        assert!(map["x.com"].categories.is_empty());
    }
}
