const BLOCK_URL_MARKERS: &[&str] = &["/blocked"];

const BLOCK_BODY_MARKERS: &[&str] = &[
    "Robot or human",
    "PRESS & HOLD",
    "Activate and hold the button",
    "walmart.com/blocked",
];

/// Heuristic check for the bot-challenge page. Matching is case-sensitive.
#[derive(Debug, Clone)]
pub struct BlockDetector {
    url_markers: Vec<String>,
    body_markers: Vec<String>,
}

impl Default for BlockDetector {
    fn default() -> Self {
        Self {
            url_markers: BLOCK_URL_MARKERS.iter().map(|s| s.to_string()).collect(),
            body_markers: BLOCK_BODY_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BlockDetector {
    /// Default markers plus any extra challenge phrases.
    pub fn with_extra_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut detector = Self::default();
        detector.body_markers.extend(
            phrases
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty()),
        );
        detector
    }

    pub fn is_blocked(&self, body: &str, final_url: &str) -> bool {
        if let Some(marker) = self.url_markers.iter().find(|m| final_url.contains(m.as_str())) {
            tracing::debug!("Block marker {:?} found in URL", marker);
            return true;
        }
        if let Some(marker) = self.body_markers.iter().find(|m| body.contains(m.as_str())) {
            tracing::debug!("Block marker {:?} found in page body", marker);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_URL: &str = "https://www.walmart.com/search?q=kids+clothes";

    fn is_blocked(body: &str, final_url: &str) -> bool {
        BlockDetector::default().is_blocked(body, final_url)
    }

    #[test]
    fn detects_press_and_hold_challenge() {
        let body = "<html><body><p>PRESS & HOLD to confirm you are a human</p></body></html>";
        assert!(is_blocked(body, SEARCH_URL));
    }

    #[test]
    fn detects_blocked_redirect() {
        assert!(is_blocked(
            "<html></html>",
            "https://www.walmart.com/blocked?url=L3NlYXJjaA=="
        ));
    }

    #[test]
    fn phrases_are_case_sensitive() {
        assert!(!is_blocked("press & hold", SEARCH_URL));
        assert!(is_blocked("Robot or human?", SEARCH_URL));
    }

    #[test]
    fn normal_page_is_not_blocked() {
        let body = r#"<script id="__NEXT_DATA__">{"props":{}}</script>"#;
        assert!(!is_blocked(body, SEARCH_URL));
    }

    #[test]
    fn extra_phrases_extend_defaults() {
        let detector = BlockDetector::with_extra_phrases(["Access Denied", ""]);
        assert!(detector.is_blocked("<h1>Access Denied</h1>", SEARCH_URL));
        assert!(detector.is_blocked("PRESS & HOLD", SEARCH_URL));
        assert!(!detector.is_blocked("<h1>Results</h1>", SEARCH_URL));
    }
}
