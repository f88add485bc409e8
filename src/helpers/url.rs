//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left alone by `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Characters that could end a CSS `url('...')` or an attribute early
const CSS_URL: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'\\')
    .add(b'<')
    .add(b'>');

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

/// Generate a site-absolute path
///
/// # Examples
/// ```ignore
/// url_for("assets/logo.png") // -> "/assets/logo.png"
/// ```
pub fn url_for(path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }
    format!("/{}", path.trim_start_matches('/'))
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/blog/") // -> "https://example.com/blog/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }
    format!("{}{}", config.url.trim_end_matches('/'), url_for(path))
}

/// Path of a blog post detail page
pub fn article_path(slug: &str) -> String {
    format!("/blog/{}", slug)
}

/// Percent-encode a query component
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Site-absolute URL safe to place inside a CSS `url('...')`
pub fn css_url(path: &str) -> String {
    utf8_percent_encode(&url_for(path), CSS_URL).to_string()
}

/// WhatsApp click-to-chat link with a prefilled message
pub fn whatsapp_url(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if message.is_empty() {
        format!("https://wa.me/{}", digits)
    } else {
        format!("https://wa.me/{}?text={}", digits, encode_component(message))
    }
}
