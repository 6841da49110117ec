use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

pub struct ResponseParser {
    fence: Regex,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    pub fn new() -> Self {
        // Greedy: spans from the first opening fence to the last closing one.
        let fence = Regex::new(r"(?s)```[A-Za-z0-9_+-]*\n?(.*)```").expect("valid fence regex");
        Self { fence }
    }

    /// Returns the body of the fenced code block, or the trimmed text when
    /// there is none. A lone closing fence (the prompt opened the block) is
    /// stripped.
    pub fn extract_code_block(&self, response: &str) -> String {
        let response = response.trim();

        match self.fence.captures(response).and_then(|c| c.get(1)) {
            Some(body) => body.as_str().trim().to_string(),
            None => {
                debug!("No fenced block in response, using raw text");
                response.trim_end_matches("```").trim_end().to_string()
            }
        }
    }

    pub fn parse_json_payload(&self, response: &str) -> Result<serde_json::Value> {
        let payload = self.extract_code_block(response);
        serde_json::from_str(&payload).context("Model response is not valid JSON")
    }
}
