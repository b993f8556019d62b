//! Site scraper - fetch the company site and summarize what it says
//!
//! Tries a short list of candidate URLs and stops at the first 200. Total
//! failure is absorbed into an error-tagged empty summary; an unreachable
//! site never fails the run.

use crate::agent::providers::fetch::PageFetcher;
use crate::agent::types::SiteSummary;

/// Upper bound on the stored text excerpt, in whitespace-separated words.
const EXCERPT_WORDS: usize = 500;

pub async fn scrape(fetcher: &dyn PageFetcher, domain: &str) -> SiteSummary {
    let candidates = [
        format!("https://{}", domain),
        format!("https://www.{}", domain),
    ];

    let mut last_error = String::new();
    for url in &candidates {
        match fetcher.fetch(url).await {
            Ok(page) if page.status == 200 => {
                return SiteSummary {
                    description: extract_meta_description(&page.body),
                    title: extract_title(&page.body),
                    text_excerpt: extract_text_excerpt(&page.body, EXCERPT_WORDS),
                    source_url: Some(page.url),
                    error: None,
                };
            }
            Ok(page) => {
                last_error = format!("HTTP {} from {}", page.status, url);
            }
            Err(e) => {
                last_error = e.to_string();
            }
        }
    }

    log::warn!("[SCRAPER] No candidate URL reachable for {}: {}", domain, last_error);
    SiteSummary::unreachable(last_error)
}

/// Pull the content attribute of `<meta name="description" ...>`, if any.
/// Tag matching is ASCII case-insensitive so byte offsets stay aligned with
/// the original text.
fn extract_meta_description(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find("<meta") {
        let start = search_from + rel;
        let end = match lower[start..].find('>') {
            Some(e) => start + e,
            None => break,
        };
        let tag = &html[start..end];
        let tag_lower = &lower[start..end];
        if tag_lower.contains("name=\"description\"") || tag_lower.contains("name='description'") {
            if let Some(content) = attribute_value(tag, tag_lower, "content=") {
                return content;
            }
        }
        search_from = end;
    }
    String::new()
}

/// Extract a quoted attribute value from a single tag.
fn attribute_value(tag: &str, tag_lower: &str, attr: &str) -> Option<String> {
    let pos = tag_lower.find(attr)? + attr.len();
    let rest = &tag[pos..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let inner = &rest[1..];
    let close = inner.find(quote)?;
    Some(inner[..close].to_string())
}

fn extract_title(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let start = match lower.find("<title") {
        Some(s) => s,
        None => return String::new(),
    };
    let open_end = match lower[start..].find('>') {
        Some(e) => start + e + 1,
        None => return String::new(),
    };
    let close = match lower[open_end..].find("</title") {
        Some(c) => open_end + c,
        None => return String::new(),
    };
    html[open_end..close].trim().to_string()
}

/// Strip tags and scripts and keep the first `max_words` words of visible
/// text, whitespace-normalized.
fn extract_text_excerpt(html: &str, max_words: usize) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    let mut in_script = false;
    let mut in_style = false;
    let mut last_was_space = true;

    let lower = html.to_ascii_lowercase();
    let chars: Vec<char> = html.chars().collect();
    let chars_lower: Vec<char> = lower.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if i + 7 < chars_lower.len() {
            let slice: String = chars_lower[i..i + 7].iter().collect();
            if slice == "<script" {
                in_script = true;
            }
            if slice == "</scrip" {
                in_script = false;
            }
        }
        if i + 6 < chars_lower.len() {
            let slice: String = chars_lower[i..i + 6].iter().collect();
            if slice == "<style" {
                in_style = true;
            }
            if slice == "</styl" {
                in_style = false;
            }
        }

        if c == '<' {
            in_tag = true;
            i += 1;
            continue;
        }
        if c == '>' {
            in_tag = false;
            if !last_was_space {
                text.push(' ');
                last_was_space = true;
            }
            i += 1;
            continue;
        }

        if !in_tag && !in_script && !in_style {
            if c.is_whitespace() {
                if !last_was_space {
                    text.push(' ');
                    last_was_space = true;
                }
            } else {
                text.push(c);
                last_was_space = false;
            }
        }

        i += 1;
    }

    let words: Vec<&str> = text.split_whitespace().take(max_words).collect();
    words.join(" ")
}
