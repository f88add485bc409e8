//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub site_name: String,
    pub tagline: String,
    pub description: String,
    pub language: String,
    pub locale: String,
    pub timezone: String,

    // URL
    pub url: String,

    // Content sources
    pub data_dir: String,
    pub data_url: Option<String>,
    pub manifest_file: String,
    pub posts_dir: String,

    // Directories
    pub static_dir: String,
    pub public_dir: String,

    // Branding
    pub logo: String,

    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub landing: LandingConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Vitrine".to_string(),
            tagline: String::new(),
            description: String::new(),
            language: "en".to_string(),
            locale: "en_US".to_string(),
            timezone: "UTC".to_string(),

            url: "http://example.com".to_string(),

            data_dir: "assets/data".to_string(),
            data_url: None,
            manifest_file: "blog-data.json".to_string(),
            posts_dir: "blog-posts".to_string(),

            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            logo: "assets/logo.png".to_string(),

            seo: SeoConfig::default(),
            analytics: AnalyticsConfig::default(),
            menu: vec![
                MenuItem::new("Home", "/"),
                MenuItem::new("Blog", "/blog"),
                MenuItem::new("Contact", "/#contact"),
            ],
            landing: LandingConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading {:?}", path.as_ref()))?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        config.normalize_timezone();
        Ok(config)
    }

    /// Replace an empty or unknown timezone with UTC, warning once
    fn normalize_timezone(&mut self) {
        if self.timezone.parse::<chrono_tz::Tz>().is_ok() {
            return;
        }
        if !self.timezone.is_empty() {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
        }
        self.timezone = chrono_tz::UTC.name().to_string();
    }

    /// The configured IANA timezone, UTC when it does not parse
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}

/// SEO defaults used when an article does not carry its own value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    pub default_author: String,
    pub default_author_role: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub robots: String,
    pub twitter_site: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            default_author: "Editorial Team".to_string(),
            default_author_role: "Strategic Insights".to_string(),
            keywords: Vec::new(),
            robots: "index, follow, max-image-preview:large, max-snippet:-1, max-video-preview:-1"
                .to_string(),
            twitter_site: None,
            image_width: 1200,
            image_height: 630,
        }
    }
}

/// Analytics configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub measurement_id: Option<String>,
}

/// Navigation entry shared by header and footer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

impl MenuItem {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

/// Landing page content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    pub hero: LandingHero,
    #[serde(default)]
    pub services: Vec<Service>,
    pub contact: ContactConfig,
    pub whatsapp: Option<WhatsappConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingHero {
    pub badge: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub image_alt: String,
    pub cta: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub title: String,
    pub description: String,
    pub icon: String,
}

/// Third-party form endpoint receiving the contact form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub endpoint: String,
    pub subject: String,
    #[serde(default)]
    pub project_types: Vec<String>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            subject: "New Contact Form".to_string(),
            project_types: Vec::new(),
        }
    }
}

/// Floating WhatsApp button
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsappConfig {
    pub phone: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.site_name, "Vitrine");
        assert_eq!(config.manifest_file, "blog-data.json");
        assert_eq!(config.seo.image_width, 1200);
        assert_eq!(config.menu.len(), 3);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
site_name: Orbit
url: https://orbit.example
timezone: Africa/Casablanca
seo:
  twitter_site: "@orbit"
  keywords: [automation, AI]
landing:
  contact:
    endpoint: https://forms.example/f/abc
  whatsapp:
    phone: "212600000000"
    message: Hello
github_username: orbit
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.site_name, "Orbit");
        assert_eq!(config.seo.twitter_site.as_deref(), Some("@orbit"));
        assert_eq!(config.seo.keywords, vec!["automation", "AI"]);
        assert_eq!(config.seo.image_height, 630);
        assert_eq!(config.landing.contact.endpoint, "https://forms.example/f/abc");
        assert_eq!(config.landing.contact.subject, "New Contact Form");
        assert!(config.extra.contains_key("github_username"));
        assert_eq!(config.tz(), chrono_tz::Africa::Casablanca);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(config.tz(), chrono_tz::UTC);
    }

    #[test]
    fn test_load_normalizes_timezone_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_config.yml");

        fs::write(&path, "site_name: Orbit\ntimezone: Mars/Olympus\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.tz(), chrono_tz::UTC);

        fs::write(&path, "timezone: \"\"\n").unwrap();
        assert_eq!(SiteConfig::load(&path).unwrap().timezone, "UTC");

        fs::write(&path, "timezone: Europe/Paris\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.timezone, "Europe/Paris");
        assert_eq!(config.tz(), chrono_tz::Europe::Paris);
    }
}
