//! Anti-forgery token discovery.
//!
//! The backend embeds the token as a hidden `csrfmiddlewaretoken` input in
//! the rendered page and also sets a `csrftoken` cookie. The hidden field
//! wins; the cookie is the fallback.

/// Pulls the `csrfmiddlewaretoken` hidden input value out of page markup.
pub(crate) fn extract_csrf_token(html: &str) -> Option<String> {
    let mut rest = html;
    while let Some(pos) = rest.find("csrfmiddlewaretoken") {
        // scan the surrounding tag for its value attribute
        let tag_start = rest[..pos].rfind('<').map(|i| i + 1).unwrap_or(0);
        let tag_end = rest[pos..].find('>').map(|i| pos + i).unwrap_or(rest.len());
        if let Some(value) = attr_value(&rest[tag_start..tag_end], "value") {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
        rest = &rest[tag_end..];
    }
    None
}

fn attr_value<'a>(tag: &'a str, attr: &str) -> Option<&'a str> {
    for quote in ['"', '\''] {
        let needle = format!("{}={}", attr, quote);
        if let Some(start) = tag.find(&needle) {
            let rest = &tag[start + needle.len()..];
            return rest.find(quote).map(|end| &rest[..end]);
        }
    }
    None
}
