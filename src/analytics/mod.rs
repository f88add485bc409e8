//! Analytics sink - forwards named events to a tag manager
//!
//! Every tracking call is gated on the [`Surface`]: during static generation
//! there is nobody to track and the calls are no-ops.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;

/// Where pages are currently being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Pages are served to real visitors
    Live,
    /// Pages are written to disk; no visitor exists
    Headless,
}

impl Surface {
    pub fn is_available(self) -> bool {
        matches!(self, Surface::Live)
    }
}

/// Tag manager command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Config,
    Event,
}

/// One call into the tag manager, shaped like `gtag(command, target, params)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsCall {
    pub command: Command,
    pub target: String,
    pub params: IndexMap<String, Value>,
}

/// Receives tag manager calls
pub trait EventSink: Send + Sync {
    fn dispatch(&self, call: &AnalyticsCall);
}

/// Writes every call to the `analytics` tracing target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn dispatch(&self, call: &AnalyticsCall) {
        let params = serde_json::to_string(&call.params).unwrap_or_default();
        tracing::info!(
            target: "analytics",
            command = ?call.command,
            target_name = %call.target,
            %params,
            "analytics call"
        );
    }
}

/// Keeps every call in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    calls: Mutex<Vec<AnalyticsCall>>,
}

impl MemorySink {
    pub fn calls(&self) -> Vec<AnalyticsCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn dispatch(&self, call: &AnalyticsCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.clone());
        }
    }
}

/// Tracking service used by the views and the dev server
pub struct Analytics<K> {
    sink: K,
    surface: Surface,
    measurement_id: Option<String>,
}

fn params<const N: usize>(pairs: [(&str, Value); N]) -> IndexMap<String, Value> {
    pairs
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

impl<K: EventSink> Analytics<K> {
    pub fn new(sink: K, surface: Surface, measurement_id: Option<String>) -> Self {
        Self {
            sink,
            surface,
            measurement_id: measurement_id.filter(|id| !id.is_empty()),
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Record a page view against the configured measurement id
    pub fn track_page_view(&self, path: &str, title: &str) {
        if !self.surface.is_available() {
            return;
        }
        let Some(id) = &self.measurement_id else {
            return;
        };
        self.sink.dispatch(&AnalyticsCall {
            command: Command::Config,
            target: id.clone(),
            params: params([
                ("page_path", Value::from(path)),
                ("page_title", Value::from(title)),
            ]),
        });
    }

    /// Record a named event
    pub fn track_event(&self, name: &str, params: IndexMap<String, Value>) {
        if !self.surface.is_available() {
            return;
        }
        self.sink.dispatch(&AnalyticsCall {
            command: Command::Event,
            target: name.to_string(),
            params,
        });
    }

    pub fn track_button_click(&self, button: &str, location: Option<&str>) {
        self.track_event(
            "button_click",
            params([
                ("event_category", Value::from("engagement")),
                ("event_label", Value::from(button)),
                ("button_location", Value::from(location)),
            ]),
        );
    }

    pub fn track_form_submit(&self, form: &str) {
        self.track_event(
            "form_submit",
            params([
                ("event_category", Value::from("engagement")),
                ("event_label", Value::from(form)),
            ]),
        );
    }

    pub fn track_article_view(&self, title: &str, slug: &str) {
        self.track_event(
            "article_view",
            params([
                ("event_category", Value::from("content")),
                ("event_label", Value::from(title)),
                ("article_slug", Value::from(slug)),
            ]),
        );
    }

    pub fn track_social_share(&self, platform: &str, title: Option<&str>) {
        self.track_event(
            "social_share",
            params([
                ("event_category", Value::from("social")),
                ("event_label", Value::from(platform)),
                ("article_title", Value::from(title)),
            ]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live() -> Analytics<MemorySink> {
        Analytics::new(
            MemorySink::default(),
            Surface::Live,
            Some("G-TEST".to_string()),
        )
    }

    #[test]
    fn test_headless_surface_is_noop() {
        let analytics = Analytics::new(
            MemorySink::default(),
            Surface::Headless,
            Some("G-TEST".to_string()),
        );
        analytics.track_page_view("/blog", "Blog");
        analytics.track_article_view("Title", "slug");
        assert!(analytics.sink().calls().is_empty());
    }

    #[test]
    fn test_page_view_uses_measurement_id() {
        let analytics = live();
        analytics.track_page_view("/blog", "Blog");

        let calls = analytics.sink().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, Command::Config);
        assert_eq!(calls[0].target, "G-TEST");
        assert_eq!(calls[0].params["page_path"], "/blog");
    }

    #[test]
    fn test_page_view_needs_measurement_id() {
        let analytics = Analytics::new(MemorySink::default(), Surface::Live, Some(String::new()));
        analytics.track_page_view("/", "Home");
        assert!(analytics.sink().calls().is_empty());
    }

    #[test]
    fn test_named_events() {
        let analytics = live();
        analytics.track_article_view("AI 101", "ai-101");
        analytics.track_button_click("cta", None);
        analytics.track_form_submit("contact");
        analytics.track_social_share("linkedin", Some("AI 101"));

        let calls = analytics.sink().calls();
        let names: Vec<_> = calls.iter().map(|c| c.target.as_str()).collect();
        assert_eq!(
            names,
            vec!["article_view", "button_click", "form_submit", "social_share"]
        );
        assert_eq!(calls[0].params["article_slug"], "ai-101");
        assert!(!calls[1].params.contains_key("button_location"));
        assert_eq!(calls[3].params["article_title"], "AI 101");
        assert!(calls.iter().all(|c| c.command == Command::Event));
    }
}
