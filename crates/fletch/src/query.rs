//! Query-string merging for read methods.

use serde_json::Value;

use crate::error::Error;
use crate::payload::{render_value, Payload};

/// Merge `payload` into the query string of `url`.
///
/// Pre-existing fragments keep their position; payload entries are appended
/// after them. Values follow the same convention as form bodies: strings
/// verbatim, everything else JSON-encoded, no percent-escaping.
pub(crate) fn merge(url: &str, payload: Option<&Payload>) -> Result<String, Error> {
    let (base, existing) = match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    };

    let mut fragments = parse(existing)?;

    match payload {
        None => {}
        Some(Payload::Raw(s)) => {
            if !s.is_empty() {
                fragments.push(s.clone());
            }
        }
        Some(Payload::Pairs(entries)) => {
            for (k, v) in entries {
                fragments.push(format!("{}={}", k, render_value(v)?));
            }
        }
        Some(Payload::Structured(Value::Object(map))) => {
            for (k, v) in map {
                fragments.push(format!("{}={}", k, render_value(v)?));
            }
        }
        Some(Payload::Structured(_)) => {
            return Err(Error::InvalidArgument(
                "structured query payload must be an object".to_string(),
            ));
        }
    }

    if fragments.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{}?{}", base, fragments.join("&")))
    }
}

/// Split an existing query component into `key=value` fragments.
fn parse(query: Option<&str>) -> Result<Vec<String>, Error> {
    let query = match query {
        Some(q) => q,
        None => return Ok(Vec::new()),
    };

    let mut fragments = Vec::new();
    for fragment in query.split('&') {
        if !fragment.contains('=') {
            return Err(Error::MalformedQuery(fragment.to_string()));
        }
        fragments.push(fragment.to_string());
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_payload_leaves_url_unchanged() {
        assert_eq!(merge("http://x/y", None).unwrap(), "http://x/y");
    }

    #[test]
    fn test_existing_query_preserved_without_payload() {
        assert_eq!(
            merge("http://x/y?a=1&b=2", None).unwrap(),
            "http://x/y?a=1&b=2"
        );
    }

    #[test]
    fn test_pairs_appended_after_existing() {
        let payload = Payload::pairs([("b", json!(2))]);
        assert_eq!(
            merge("http://x/y?a=1", Some(&payload)).unwrap(),
            "http://x/y?a=1&b=2"
        );
    }

    #[test]
    fn test_pairs_on_bare_url() {
        let payload = Payload::pairs([("a", "1"), ("b", "2")]);
        assert_eq!(
            merge("http://x/y", Some(&payload)).unwrap(),
            "http://x/y?a=1&b=2"
        );
    }

    #[test]
    fn test_string_values_verbatim_others_json() {
        let payload = Payload::pairs([("s", json!("plain")), ("n", json!(7)), ("l", json!([1]))]);
        assert_eq!(
            merge("http://x/y", Some(&payload)).unwrap(),
            "http://x/y?s=plain&n=7&l=[1]"
        );
    }

    #[test]
    fn test_raw_fragment_appended_verbatim() {
        let payload = Payload::raw("a=1&b=2");
        assert_eq!(
            merge("http://x/y?c=3", Some(&payload)).unwrap(),
            "http://x/y?c=3&a=1&b=2"
        );
    }

    #[test]
    fn test_empty_raw_fragment_ignored() {
        let payload = Payload::raw("");
        assert_eq!(merge("http://x/y", Some(&payload)).unwrap(), "http://x/y");
    }

    #[test]
    fn test_structured_object_appended() {
        let payload = Payload::Structured(json!({"page": 3}));
        assert_eq!(
            merge("http://x/y", Some(&payload)).unwrap(),
            "http://x/y?page=3"
        );
    }

    #[test]
    fn test_structured_non_object_rejected() {
        let payload = Payload::Structured(json!(42));
        let err = merge("http://x/y", Some(&payload)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_fragment_without_separator_is_malformed() {
        let err = merge("http://x/y?badfragment", None).unwrap_err();
        match err {
            Error::MalformedQuery(fragment) => assert_eq!(fragment, "badfragment"),
            other => panic!("expected MalformedQuery, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_question_mark_is_malformed() {
        let err = merge("http://x/y?", None).unwrap_err();
        assert!(matches!(err, Error::MalformedQuery(_)));
    }

    #[test]
    fn test_empty_value_fragment_is_accepted() {
        assert_eq!(merge("http://x/y?a=", None).unwrap(), "http://x/y?a=");
    }
}
