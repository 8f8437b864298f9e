//! Project Parser: splits `<title>: <description>` and pulls out the first URL.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static URL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProject {
    pub title: String,
    pub url: Option<String>,
    pub description: String,
}

/// Never fails. Without a colon, title and description are both the whole input.
pub fn parse_project(input: &str) -> ParsedProject {
    let (title, description) = match input.split_once(':') {
        Some((title, rest)) => (title.trim(), rest.trim()),
        None => (input, input),
    };

    match URL_TOKEN.find(description) {
        Some(url) => {
            let remaining = format!(
                "{}{}",
                &description[..url.start()],
                &description[url.end()..]
            );
            ParsedProject {
                title: title.to_string(),
                url: Some(url.as_str().to_string()),
                description: remaining.trim().to_string(),
            }
        }
        None => ParsedProject {
            title: title.to_string(),
            url: None,
            description: description.to_string(),
        },
    }
}
