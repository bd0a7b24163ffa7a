//! Request payloads and body encoding.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;

/// Data attached to a request: query parameters for read methods
/// (GET/DELETE/HEAD), body content for write methods (POST/PUT).
///
/// The variant is chosen at the call site, so only values that make sense on
/// the wire can be passed at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A pre-formatted value used verbatim: the raw body for write methods,
    /// or a ready-made query fragment (e.g. `"a=1&b=2"`) for read methods.
    Raw(String),
    /// Ordered key/value pairs, the map-like shape.
    Pairs(Vec<(String, Value)>),
    /// A typed record serialized through serde; field renames from
    /// `#[serde(rename = "...")]` are already applied.
    Structured(Value),
}

impl Payload {
    /// A raw string payload.
    pub fn raw(value: impl Into<String>) -> Self {
        Payload::Raw(value.into())
    }

    /// An ordered key/value payload.
    pub fn pairs<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Payload::Pairs(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// A structured payload serialized from any `Serialize` value.
    pub fn structured<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(Payload::Structured(serde_json::to_value(value)?))
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Raw(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Raw(value)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

impl From<Vec<(String, Value)>> for Payload {
    fn from(entries: Vec<(String, Value)>) -> Self {
        Payload::Pairs(entries)
    }
}

/// Render a query value: strings verbatim, everything else JSON-encoded.
pub(crate) fn render_value(value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}

/// Encode the request body for `method`.
///
/// Read methods never carry a body; their payload goes into the query string
/// instead. For write methods the encoding follows the effective
/// Content-Type: JSON when `json` is set, otherwise `key=value` fragments
/// joined with `&`. Form values are deliberately not percent-escaped; pass a
/// `Payload::Raw` body if escaping is required.
pub(crate) fn encode_body(
    method: &Method,
    payload: Option<&Payload>,
    json: bool,
) -> Result<Option<Vec<u8>>, Error> {
    if !sends_body(method) {
        return Ok(None);
    }

    let payload = match payload {
        Some(p) => p,
        None => return Ok(None),
    };

    match payload {
        Payload::Raw(s) => Ok(Some(s.clone().into_bytes())),
        Payload::Pairs(entries) if json => {
            let mut map = serde_json::Map::new();
            for (k, v) in entries {
                map.insert(k.clone(), v.clone());
            }
            Ok(Some(serde_json::to_vec(&Value::Object(map))?))
        }
        Payload::Structured(value) if json => Ok(Some(serde_json::to_vec(value)?)),
        Payload::Pairs(entries) => Ok(Some(encode_form(entries)?)),
        Payload::Structured(Value::Object(map)) => {
            let entries: Vec<(String, Value)> =
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            Ok(Some(encode_form(&entries)?))
        }
        Payload::Structured(_) => Err(Error::InvalidArgument(
            "structured payload must be an object for form encoding".to_string(),
        )),
    }
}

fn encode_form(entries: &[(String, Value)]) -> Result<Vec<u8>, Error> {
    let mut fragments = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        fragments.push(format!("{}={}", k, render_value(v)?));
    }
    Ok(fragments.join("&").into_bytes())
}

/// Whether a method carries a request body at all.
pub(crate) fn sends_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::DELETE && *method != Method::HEAD
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Search {
        #[serde(rename = "q")]
        term: String,
        page: u32,
    }

    fn body_str(bytes: Option<Vec<u8>>) -> String {
        String::from_utf8(bytes.expect("expected a body")).unwrap()
    }

    #[test]
    fn test_read_methods_never_carry_a_body() {
        for method in [Method::GET, Method::DELETE, Method::HEAD] {
            let payload = Payload::pairs([("a", "1")]);
            let body = encode_body(&method, Some(&payload), true).unwrap();
            assert!(body.is_none(), "{method} should not produce a body");
        }
    }

    #[test]
    fn test_no_payload_means_no_body() {
        assert!(encode_body(&Method::POST, None, true).unwrap().is_none());
    }

    #[test]
    fn test_raw_body_is_verbatim() {
        let payload = Payload::raw("raw-body");
        let body = encode_body(&Method::POST, Some(&payload), false).unwrap();
        assert_eq!(body_str(body), "raw-body");
    }

    #[test]
    fn test_pairs_as_json_round_trip() {
        let payload = Payload::pairs([("name", json!("alice")), ("age", json!(30))]);
        let body = encode_body(&Method::POST, Some(&payload), true).unwrap();
        let decoded: Value = serde_json::from_slice(&body.unwrap()).unwrap();
        assert_eq!(decoded, json!({"name": "alice", "age": 30}));
    }

    #[test]
    fn test_pairs_as_form_body() {
        let payload = Payload::pairs([("a", json!("1")), ("b", json!(2))]);
        let body = body_str(encode_body(&Method::POST, Some(&payload), false).unwrap());
        let fragments: Vec<&str> = body.split('&').collect();
        assert_eq!(fragments, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_form_values_json_encoded_when_not_strings() {
        let payload = Payload::pairs([("tags", json!(["x", "y"]))]);
        let body = body_str(encode_body(&Method::PUT, Some(&payload), false).unwrap());
        assert_eq!(body, r#"tags=["x","y"]"#);
    }

    #[test]
    fn test_structured_object_as_form_body() {
        let payload = Payload::structured(&Search {
            term: "rust".to_string(),
            page: 2,
        })
        .unwrap();
        let body = body_str(encode_body(&Method::POST, Some(&payload), false).unwrap());
        let mut fragments: Vec<&str> = body.split('&').collect();
        fragments.sort_unstable();
        assert_eq!(fragments, vec!["page=2", "q=rust"]);
    }

    #[test]
    fn test_structured_non_object_rejected_for_form() {
        let payload = Payload::Structured(json!([1, 2, 3]));
        let err = encode_body(&Method::POST, Some(&payload), false).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_structured_serializes_directly_as_json() {
        let payload = Payload::structured(&Search {
            term: "rust".to_string(),
            page: 1,
        })
        .unwrap();
        let body = encode_body(&Method::POST, Some(&payload), true).unwrap();
        let decoded: Value = serde_json::from_slice(&body.unwrap()).unwrap();
        assert_eq!(decoded, json!({"q": "rust", "page": 1}));
    }

    #[test]
    fn test_payload_from_impls() {
        assert_eq!(Payload::from("x"), Payload::Raw("x".to_string()));
        assert_eq!(
            Payload::from(json!({"a": 1})),
            Payload::Structured(json!({"a": 1}))
        );
    }
}
