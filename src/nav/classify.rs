//! Navigation classifier.
//!
//! Decides whether a navigation towards a candidate URL is eligible for a
//! preview. Everything here fails open: anything that cannot be parsed is
//! left to navigate normally.

use url::Url;

/// Schemes that never load a document and so can never be previewed.
const NON_NAVIGABLE_SCHEMES: &[&str] = &["mailto", "tel", "javascript"];

/// Whether a navigation from `current_page` to `candidate` should be shown
/// in the preview overlay instead of navigating.
pub fn should_intercept(candidate: &str, current_page: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return false;
    }

    let target = match Url::parse(candidate) {
        Ok(u) => u,
        Err(e) => {
            log::debug!("Not intercepting unparseable URL {:?}: {}", candidate, e);
            return false;
        }
    };
    let page = match Url::parse(current_page) {
        Ok(u) => u,
        Err(e) => {
            log::warn!("Current page URL {:?} is unparseable: {}", current_page, e);
            return false;
        }
    };

    // Fragment-only and same-document links. Opaque origins never compare
    // equal, so compare serialized keys instead.
    if page_key(&target) == page_key(&page) {
        return false;
    }

    // Mixed content is blocked by the embedding frame
    if target.scheme() != page.scheme() {
        return false;
    }

    !NON_NAVIGABLE_SCHEMES.contains(&target.scheme())
}

/// The opt-out list key for a URL: origin followed by path, without query
/// or fragment.
pub fn page_key(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// `page_key` for a string URL, `None` when it does not parse.
pub fn page_key_str(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| page_key(&u))
}

/// Resolve a possibly relative URL against the current page.
pub fn resolve_against(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute.to_string());
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}
