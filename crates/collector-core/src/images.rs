use regex::Captures;

use crate::patterns::IMG_SRC;
use crate::resolve::{is_fetchable_href, resolve};

/// Rewrite every relative `<img src>` in assembled content to an absolute URL.
///
/// Only the `src` value changes; its quoting and the rest of the tag are kept.
/// Absolute, empty and `data:` sources are left untouched.
pub fn rewrite_image_urls(content: &str, page_url: &str, base_override: &str) -> String {
    IMG_SRC
        .replace_all(content, |caps: &Captures| {
            rewrite_src(caps, page_url, base_override)
        })
        .into_owned()
}

fn rewrite_src(caps: &Captures, page_url: &str, base_override: &str) -> String {
    let (quote, src) = match (caps.get(2), caps.get(3), caps.get(4)) {
        (Some(m), _, _) => ("\"", m.as_str()),
        (None, Some(m), _) => ("'", m.as_str()),
        (None, None, Some(m)) => ("", m.as_str()),
        _ => return caps[0].to_string(),
    };
    if src.contains("://") || !is_fetchable_href(src) {
        return caps[0].to_string();
    }
    format!(
        "{}{quote}{}{quote}",
        &caps[1],
        resolve(src, page_url, base_override)
    )
}
