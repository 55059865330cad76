//! Request attribute construction for fragment loads.
//!
//! Maps the configured load attributes onto HTTP headers: content-type tag
//! (when configured), character encoding (always), the cross-origin policy
//! (only when the target's origin differs from the document origin), and
//! the integrity nonce (when one has been set).

use url::Url;

use crate::config::ComboConfig;

/// True when `target` does not share an origin with `document_origin`.
///
/// Prefers a real origin comparison; falls back to a prefix check when
/// either side does not parse as an absolute URL (e.g. relative targets,
/// which are same-origin by construction).
fn is_cross_origin(target: &str, document_origin: &str) -> bool {
    match (Url::parse(target), Url::parse(document_origin)) {
        (Ok(t), Ok(d)) => t.origin() != d.origin(),
        _ => !target.starts_with(&format!("{}/", document_origin.trim_end_matches('/'))),
    }
}

/// Headers applied to one load of `target`.
pub(crate) fn request_headers(
    target: &str,
    cfg: &ComboConfig,
    nonce: Option<&str>,
) -> Vec<(String, String)> {
    let mut headers = Vec::new();

    if let Some(content_type) = &cfg.content_type {
        headers.push(("Accept".to_string(), content_type.clone()));
    }
    headers.push(("Accept-Charset".to_string(), cfg.charset.clone()));

    if let Some(nonce) = nonce {
        headers.push(("nonce".to_string(), nonce.to_string()));
    }

    if cfg.cross_origin.is_some() {
        if let Some(origin) = &cfg.document_origin {
            if is_cross_origin(target, origin) {
                headers.push(("Origin".to_string(), origin.clone()));
            }
        }
    }

    headers
}
