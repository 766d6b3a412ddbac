use crate::error::ScrapeError;
use scraper::{Html, Selector};
use serde_json::Value;
use std::path::Path;

pub const NEXT_DATA_ID: &str = "__NEXT_DATA__";

/// Locate the inline `<script id="...">` payload and parse it as JSON.
pub fn extract_embedded_json(html: &str, script_id: &str) -> Result<Value, ScrapeError> {
    let missing = || ScrapeError::MissingData {
        id: script_id.to_string(),
    };

    let doc = Html::parse_document(html);
    let sel = Selector::parse(&format!(r#"script[id="{}"]"#, script_id)).map_err(|_| missing())?;
    let el = doc.select(&sel).next().ok_or_else(missing)?;

    let text: String = el.text().collect();
    if text.trim().is_empty() {
        return Err(ScrapeError::EmptyData {
            id: script_id.to_string(),
        });
    }

    tracing::debug!("Found {} ({} bytes)", script_id, text.len());
    let parsed = serde_json::from_str(&text).map_err(|source| ScrapeError::MalformedJson {
        id: script_id.to_string(),
        source,
    })?;
    tracing::info!("Successfully parsed {} JSON", script_id);
    Ok(parsed)
}

pub fn extract_next_data(html: &str) -> Result<Value, ScrapeError> {
    extract_embedded_json(html, NEXT_DATA_ID)
}

/// Log the top-level shape of the payload to help spot layout changes.
pub fn describe_payload(data: &Value) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    tracing::debug!("Payload keys: {:?}", object_keys(Some(data)));
    let props = data.get("props");
    if props.is_some() {
        tracing::debug!("props keys: {:?}", object_keys(props));
        let page_props = props.and_then(|p| p.get("pageProps"));
        if page_props.is_some() {
            tracing::debug!("pageProps keys: {:?}", object_keys(page_props));
        }
    }
}

fn object_keys(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_object)
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Write the full payload as pretty JSON for offline inspection.
pub fn save_payload(data: &Value, path: &Path) -> Result<(), ScrapeError> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| ScrapeError::Io(std::io::Error::other(e)))?;
    std::fs::write(path, content)?;
    tracing::info!("Full page data saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_next_data_script() {
        let html = r#"
            <html>
            <head>
                <script id="__NEXT_DATA__" type="application/json">
                {"props": {"pageProps": {"products": [{"name": "Shirt", "price": 1.99}]}}}
                </script>
            </head>
            <body></body>
            </html>
        "#;

        let data = extract_next_data(html).unwrap();
        assert_eq!(data["props"]["pageProps"]["products"][0]["name"], "Shirt");
    }

    #[test]
    fn missing_script_is_missing_data() {
        let html = r#"<html><body>No embedded data here</body></html>"#;
        match extract_next_data(html) {
            Err(ScrapeError::MissingData { id }) => assert_eq!(id, "__NEXT_DATA__"),
            other => panic!("expected MissingData, got {:?}", other),
        }
    }

    #[test]
    fn whitespace_script_is_empty_data() {
        let html = "<html><head><script id=\"__NEXT_DATA__\">   \n  </script></head></html>";
        assert!(matches!(
            extract_next_data(html),
            Err(ScrapeError::EmptyData { .. })
        ));
    }

    #[test]
    fn invalid_json_carries_parse_detail() {
        let html = r#"<html><head><script id="__NEXT_DATA__">{"props": </script></head></html>"#;
        let err = extract_next_data(html).unwrap_err();
        match &err {
            ScrapeError::MalformedJson { source, .. } => assert!(source.is_eof()),
            other => panic!("expected MalformedJson, got {:?}", other),
        }
        assert!(err.to_string().starts_with("Failed to parse __NEXT_DATA__ JSON: "));
    }

    #[test]
    fn other_script_ids_are_ignored() {
        let html = r#"<script id="__APOLLO_STATE__">{"a": 1}</script>"#;
        assert!(matches!(
            extract_next_data(html),
            Err(ScrapeError::MissingData { .. })
        ));
        assert_eq!(extract_embedded_json(html, "__APOLLO_STATE__").unwrap()["a"], 1);
    }

    #[test]
    fn saves_pretty_payload() {
        let path = std::env::temp_dir().join(format!("walmart-deals-test-{}.json", std::process::id()));
        let data = serde_json::json!({"props": {"pageProps": {}}});
        save_payload(&data, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(written.contains("\n"));
        assert_eq!(serde_json::from_str::<Value>(&written).unwrap(), data);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("walmart-deals-no-such-dir")
            .join("nested")
            .join("data.json");
        let data = serde_json::json!({});
        assert!(matches!(save_payload(&data, &path), Err(ScrapeError::Io(_))));
    }
}
