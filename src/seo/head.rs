//! In-memory `<head>` document the SEO tags are applied to

use indexmap::IndexMap;
use serde_json::Value;

use crate::helpers::{html_escape, script_safe_json};

/// Identifies a `<meta>` element, either by `name` or by `property`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetaKey {
    Name(String),
    Property(String),
}

/// Operations needed to inject SEO tags into a page head
pub trait HeadSink {
    fn set_title(&mut self, title: &str);

    /// Insert or overwrite the meta element identified by `key`
    fn update_tag(&mut self, key: MetaKey, content: &str);

    fn set_canonical(&mut self, href: &str);

    /// Drop the previously injected article structured data, if any
    fn remove_structured_data(&mut self);

    fn append_structured_data(&mut self, data: &Value);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Script {
    article: bool,
    json: String,
}

/// A page head rendered into the layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Head {
    title: Option<String>,
    meta: IndexMap<MetaKey, String>,
    canonical: Option<String>,
    scripts: Vec<Script>,
}

impl Head {
    /// Head for a non-article page
    pub fn page(title: &str, description: &str, canonical: &str) -> Self {
        let mut head = Head::default();
        head.set_title(title);
        if !description.is_empty() {
            head.update_tag(MetaKey::Name("description".to_string()), description);
            head.update_tag(MetaKey::Property("og:description".to_string()), description);
        }
        head.update_tag(MetaKey::Property("og:type".to_string()), "website");
        head.update_tag(MetaKey::Property("og:title".to_string()), title);
        head.update_tag(MetaKey::Property("og:url".to_string()), canonical);
        head.set_canonical(canonical);
        head
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn meta(&self, key: &MetaKey) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref()
    }

    pub fn structured_data_count(&self) -> usize {
        self.scripts.iter().filter(|s| s.article).count()
    }

    /// Render as HTML elements, one per line
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if let Some(title) = &self.title {
            lines.push(format!("<title>{}</title>", html_escape(title)));
        }
        for (key, content) in &self.meta {
            let (attr, value) = match key {
                MetaKey::Name(name) => ("name", name),
                MetaKey::Property(property) => ("property", property),
            };
            lines.push(format!(
                r#"<meta {}="{}" content="{}">"#,
                attr,
                html_escape(value),
                html_escape(content)
            ));
        }
        if let Some(href) = &self.canonical {
            lines.push(format!(r#"<link rel="canonical" href="{}">"#, html_escape(href)));
        }
        for script in &self.scripts {
            let marker = if script.article { r#" data-article="true""# } else { "" };
            lines.push(format!(
                r#"<script type="application/ld+json"{}>{}</script>"#,
                marker,
                script_safe_json(&script.json)
            ));
        }
        lines.join("\n")
    }
}

impl HeadSink for Head {
    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn update_tag(&mut self, key: MetaKey, content: &str) {
        self.meta.insert(key, content.to_string());
    }

    fn set_canonical(&mut self, href: &str) {
        self.canonical = Some(href.to_string());
    }

    fn remove_structured_data(&mut self) {
        self.scripts.retain(|s| !s.article);
    }

    fn append_structured_data(&mut self, data: &Value) {
        self.scripts.push(Script {
            article: true,
            json: data.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_tag_replaces_in_place() {
        let mut head = Head::default();
        head.update_tag(MetaKey::Name("description".into()), "first");
        head.update_tag(MetaKey::Property("og:title".into()), "T");
        head.update_tag(MetaKey::Name("description".into()), "second");

        assert_eq!(head.meta(&MetaKey::Name("description".into())), Some("second"));
        assert_eq!(
            head.render(),
            "<meta name=\"description\" content=\"second\">\n<meta property=\"og:title\" content=\"T\">"
        );
    }

    #[test]
    fn test_structured_data_is_replaced() {
        let mut head = Head::default();
        head.append_structured_data(&json!({"n": 1}));
        head.remove_structured_data();
        head.append_structured_data(&json!({"n": 2}));

        assert_eq!(head.structured_data_count(), 1);
        let html = head.render();
        assert!(html.contains(r#"data-article="true">{"n":2}</script>"#));
        assert!(!html.contains(r#"{"n":1}"#));
    }

    #[test]
    fn test_render_escapes() {
        let mut head = Head::page("Tom & Jerry", "<b>bold</b>", "https://x.example/");
        head.append_structured_data(&json!({"body": "</script><script>"}));
        let html = head.render();

        assert!(html.starts_with("<title>Tom &amp; Jerry</title>"));
        assert!(html.contains(r#"content="&lt;b&gt;bold&lt;/b&gt;""#));
        assert!(html.contains(r#"<link rel="canonical" href="https://x.example/">"#));
        assert!(html.contains(r#"<\/script><script>"#));
        assert_eq!(head.title(), Some("Tom & Jerry"));
        assert_eq!(head.canonical(), Some("https://x.example/"));
    }
}
