//! Tech detector - fingerprint the site from headers and page source
//!
//! One fetch, then a fixed signature table over the lower-cased body and the
//! response headers. Each signature carries its own confidence. Failure is
//! absorbed into a single Unknown entry with zero confidence.

use crate::agent::providers::fetch::PageFetcher;
use crate::agent::types::TechSignal;

enum Probe {
    /// Substring of the `server` response header.
    ServerHeader(&'static str),
    /// Substring of the lower-cased HTML body.
    Body(&'static str),
}

/// (probe, technology, category, confidence)
const SIGNATURES: &[(Probe, &str, &str, f64)] = &[
    (Probe::ServerHeader("cloudflare"), "Cloudflare", "CDN", 0.95),
    (Probe::ServerHeader("nginx"), "Nginx", "Web Server", 0.9),
    (Probe::Body("data-reactroot"), "React", "Frontend", 0.85),
    (Probe::Body("__next_data__"), "Next.js", "Frontend", 0.85),
    (Probe::Body("vue"), "Vue.js", "Frontend", 0.8),
    (Probe::Body("wp-content"), "WordPress", "CMS", 0.9),
    (Probe::Body("cdn.shopify.com"), "Shopify", "E-commerce", 0.9),
    (Probe::Body("gtag"), "Google Analytics", "Analytics", 0.9),
];

pub async fn detect(fetcher: &dyn PageFetcher, domain: &str) -> Vec<TechSignal> {
    let url = format!("https://{}", domain);
    let page = match fetcher.fetch(&url).await {
        Ok(page) => page,
        Err(e) => {
            log::warn!("[TECH] Fetch failed for {}: {}", domain, e);
            return vec![unknown()];
        }
    };

    let body = page.body.to_lowercase();
    let server = page
        .headers
        .get("server")
        .map(|v| v.to_lowercase())
        .unwrap_or_default();

    let mut signals = Vec::new();
    for (probe, technology, category, confidence) in SIGNATURES {
        let hit = match probe {
            Probe::ServerHeader(needle) => server.contains(*needle),
            Probe::Body(needle) => body.contains(*needle),
        };
        if hit {
            signals.push(TechSignal {
                technology: technology.to_string(),
                category: category.to_string(),
                confidence: *confidence,
            });
        }
    }

    // React also shows up without the root marker in bundled sources.
    if !signals.iter().any(|s| s.technology == "React") && body.contains("react") {
        signals.push(TechSignal {
            technology: "React".to_string(),
            category: "Frontend".to_string(),
            confidence: 0.85,
        });
    }

    signals
}

fn unknown() -> TechSignal {
    TechSignal {
        technology: "Unknown".to_string(),
        category: "N/A".to_string(),
        confidence: 0.0,
    }
}
