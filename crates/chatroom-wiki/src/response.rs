use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::LookupError;

/// Outcome of a successful lookup round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Found(String),
    NotFound,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    /// Keyed by page id; missing titles get negative ids. Key order is the
    /// order the API sent them in.
    pages: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Page {
    /// Present (usually as `""`) when the title does not exist.
    #[serde(default)]
    missing: Option<Value>,
    #[serde(default)]
    extract: Option<String>,
}

/// Pick the summary out of an `action=query&prop=extracts` response body.
///
/// The first page under `query.pages` decides the outcome. A body without
/// `query.pages`, or with no pages at all, is a parse error rather than
/// "not found".
pub fn extract_summary(body: &str) -> Result<Summary, LookupError> {
    let resp: ApiResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;

    let pages = resp
        .query
        .and_then(|q| q.pages)
        .ok_or_else(|| LookupError::Parse("response has no query.pages".to_string()))?;

    let (_, first) = pages
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::Parse("query.pages is empty".to_string()))?;

    let page: Page =
        serde_json::from_value(first).map_err(|e| LookupError::Parse(e.to_string()))?;

    if page.missing.is_some() {
        return Ok(Summary::NotFound);
    }
    match page.extract {
        Some(text) if !text.trim().is_empty() => Ok(Summary::Found(text)),
        _ => Ok(Summary::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_page_returns_extract() {
        let body = r#"{"batchcomplete":"","query":{"pages":{"4650":{"pageid":4650,"ns":0,"title":"Black hole","extract":"A black hole is a region of spacetime."}}}}"#;
        assert_eq!(
            extract_summary(body).unwrap(),
            Summary::Found("A black hole is a region of spacetime.".to_string())
        );
    }

    #[test]
    fn missing_page_is_not_found() {
        let body = r#"{"query":{"pages":{"-1":{"ns":0,"title":"Qwzxv","missing":""}}}}"#;
        assert_eq!(extract_summary(body).unwrap(), Summary::NotFound);
    }

    #[test]
    fn page_without_extract_is_not_found() {
        let body = r#"{"query":{"pages":{"12":{"pageid":12,"title":"Special"}}}}"#;
        assert_eq!(extract_summary(body).unwrap(), Summary::NotFound);
    }

    #[test]
    fn empty_extract_is_not_found() {
        let body = r#"{"query":{"pages":{"12":{"pageid":12,"title":"X","extract":""}}}}"#;
        assert_eq!(extract_summary(body).unwrap(), Summary::NotFound);
    }

    #[test]
    fn first_page_in_document_order_wins() {
        // "9" would sort after "10" lexically; document order must be kept.
        let body = r#"{"query":{"pages":{"9":{"extract":"first"},"10":{"extract":"second"}}}}"#;
        assert_eq!(
            extract_summary(body).unwrap(),
            Summary::Found("first".to_string())
        );
    }

    #[test]
    fn error_body_without_query_is_parse_error() {
        let body = r#"{"error":{"code":"badvalue","info":"nope"}}"#;
        assert!(matches!(extract_summary(body), Err(LookupError::Parse(_))));
    }

    #[test]
    fn non_json_is_parse_error() {
        assert!(matches!(
            extract_summary("<html>bad gateway</html>"),
            Err(LookupError::Parse(_))
        ));
    }
}
