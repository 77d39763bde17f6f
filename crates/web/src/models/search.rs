//! Flight search query types.

use serde::{Deserialize, Serialize};

/// A flight search request.
///
/// Decodes from the `/search_result` query string; the capitalized serde
/// names match the form fields the search page submits. The same shape is
/// serialized into the deferred `query` cookie when a visitor searches
/// before logging in, so it must round-trip through JSON unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Origin IATA code.
    #[serde(rename = "Location")]
    pub origin: String,
    /// Destination IATA code.
    #[serde(rename = "Destination")]
    pub destination: String,
    /// Departure date, `YYYY-MM-DD`.
    pub date: String,
    /// Number of adult travelers, passed through to the provider verbatim.
    pub travelers: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_serde_names() {
        let query = SearchQuery {
            origin: "LOS".to_string(),
            destination: "LHR".to_string(),
            date: "2025-09-01".to_string(),
            travelers: "2".to_string(),
        };

        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"Location\":\"LOS\""));
        assert!(json.contains("\"Destination\":\"LHR\""));
        assert!(json.contains("\"date\":\"2025-09-01\""));
        assert!(json.contains("\"travelers\":\"2\""));

        let back: SearchQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }

    #[test]
    fn test_search_query_decodes_from_query_string_shape() {
        let json = r#"{"Location":"ABV","Destination":"JFK","date":"2025-12-24","travelers":"1"}"#;
        let query: SearchQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.origin, "ABV");
        assert_eq!(query.destination, "JFK");
    }
}
