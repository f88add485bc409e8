//! Generator module - writes the site as static HTML files

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analytics::{Analytics, Surface, TracingSink};
use crate::content::page::error_chain;
use crate::content::repository::is_valid_slug;
use crate::content::{
    ArticleSource, ArticleSummary, DataSource, Manifest, PageModelBuilder, PageOutcome,
};
use crate::helpers::{article_path, full_url_for, html_escape, iso_date, plain_text};
use crate::seo::{Clock, SystemClock};
use crate::views::Views;
use crate::Site;

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Detail pages written
    pub articles: usize,
    /// Detail pages written without a body
    pub partial: usize,
    /// Static files copied
    pub assets: usize,
    /// Whether the manifest could be loaded
    pub manifest: bool,
}

/// Static site generator
pub struct Generator<S> {
    site: Site,
    views: Views,
    source: S,
    today: NaiveDate,
    analytics: Analytics<TracingSink>,
}

impl Generator<DataSource> {
    /// Create a generator reading from the configured source
    pub fn new(site: &Site) -> Result<Self> {
        let clock = SystemClock::new(site.config.tz());
        Self::with_source(site, site.source(), &clock)
    }
}

impl<S: ArticleSource> Generator<S> {
    pub fn with_source(site: &Site, source: S, clock: &dyn Clock) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            views: Views::new(&site.config)?,
            source,
            today: clock.today(),
            // Nobody visits a page while it is being written
            analytics: Analytics::new(
                TracingSink,
                Surface::Headless,
                site.config.analytics.measurement_id.clone(),
            ),
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<Report> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("creating {:?}", public_dir))?;

        let mut report = Report {
            assets: self.copy_static_assets()?,
            ..Report::default()
        };

        let manifest = match self.source.fetch_manifest().await {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::warn!("{}; writing an empty blog listing", error_chain(&e));
                None
            }
        };
        report.manifest = manifest.is_some();

        self.write_page("/", self.views.landing(self.today)?)?;
        self.write_page("/blog", self.views.blog(manifest.as_ref(), "", self.today)?)?;

        let empty = Manifest::default();
        let manifest = manifest.as_ref().unwrap_or(&empty);
        let builder = PageModelBuilder::new(&self.source);
        let articles = linkable(manifest);
        let mut written = Vec::new();

        for &(_, slug) in &articles {
            let outcome = builder.build(manifest, slug).await;
            if matches!(outcome, PageOutcome::Partial(_)) {
                report.partial += 1;
            }
            let Some(model) = outcome.model() else {
                continue;
            };

            self.write_page(&article_path(slug), self.views.post(model, self.today)?)?;
            self.analytics
                .track_article_view(&model.article.summary.title, slug);
            let lastmod = model.article.published_date().map(str::to_string);
            written.push((slug.to_string(), lastmod));
            report.articles += 1;
        }

        self.generate_sitemap(&written)?;
        self.generate_search_index(&articles)?;

        tracing::info!(
            "Wrote {} articles ({} without body), copied {} assets",
            report.articles,
            report.partial,
            report.assets
        );
        Ok(report)
    }

    fn write_page(&self, route: &str, html: String) -> Result<()> {
        let relative = output_path(route);
        write_file(&self.site.public_dir.join(&relative), html.as_bytes())?;
        self.analytics.track_page_view(route, &self.site.config.site_name);
        tracing::debug!("Generated {:?}", relative);
        Ok(())
    }

    /// Generate sitemap.xml for every route
    fn generate_sitemap(&self, articles: &[(String, Option<String>)]) -> Result<()> {
        let today = iso_date(&self.today);
        let mut entries = vec![
            (full_url_for(&self.site.config, "/"), today.clone()),
            (full_url_for(&self.site.config, "/blog"), today),
        ];
        entries.extend(articles.iter().map(|(slug, date)| {
            let lastmod = date.clone().unwrap_or_else(|| iso_date(&self.today));
            (full_url_for(&self.site.config, &article_path(slug)), lastmod)
        }));

        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for (loc, lastmod) in entries {
            xml.push_str(&format!(
                "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
                html_escape(&loc),
                html_escape(&lastmod)
            ));
        }
        xml.push_str("</urlset>\n");

        write_file(&self.site.public_dir.join("sitemap.xml"), xml.as_bytes())?;
        tracing::info!("Generated sitemap.xml");
        Ok(())
    }

    /// Generate search.json listing the navigable articles
    fn generate_search_index(&self, articles: &[(&ArticleSummary, &str)]) -> Result<()> {
        let search_data: Vec<serde_json::Value> = articles
            .iter()
            .map(|&(a, slug)| {
                serde_json::json!({
                    "title": a.title,
                    "url": article_path(slug),
                    "description": plain_text(&a.description),
                    "category": a.category,
                    "date": a.published_date,
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&search_data)?;
        write_file(&self.site.public_dir.join("search.json"), json.as_bytes())?;
        tracing::info!("Generated search.json");
        Ok(())
    }

    /// Copy everything under the static directory; returns the number of files
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            tracing::debug!("No static directory at {:?}", static_dir);
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            // Skip dotfiles such as .DS_Store
            if relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
            {
                continue;
            }

            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest).with_context(|| format!("copying {:?}", path))?;
            copied += 1;
        }

        Ok(copied)
    }
}

/// Navigable articles whose slug can become a file name
fn linkable(manifest: &Manifest) -> Vec<(&ArticleSummary, &str)> {
    manifest
        .navigable()
        .into_iter()
        .filter_map(|summary| {
            let slug = summary.link_slug()?;
            if is_valid_slug(slug) {
                Some((summary, slug))
            } else {
                tracing::warn!("Skipping article with unusable slug {:?}", slug);
                None
            }
        })
        .collect()
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

/// Path of the generated file for a route, relative to the public directory
pub fn output_path(route: &str) -> PathBuf {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("index.html")
    } else {
        PathBuf::from(trimmed).join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::FsArticleSource;
    use crate::seo::FixedClock;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "categories": ["AI", "Ops"],
        "featuredArticle": {"id": "0", "slug": "lead", "title": "Lead", "category": "AI",
                            "description": "Featured", "image": "assets/blog/lead.jpg"},
        "articles": [
            {"id": "1", "slug": "lead", "title": "Lead", "category": "AI"},
            {"id": "2", "slug": "ops-101", "title": "Ops 101", "category": "Ops",
             "description": "<b>Runbooks</b>", "publishedDate": "2024-02-02"},
            {"id": "3", "title": "Draft", "category": "Ops"},
            {"id": "4", "slug": "../escape", "title": "Bad", "category": "Ops"}
        ]
    }"#;

    fn site(dir: &TempDir) -> Site {
        let config = SiteConfig {
            site_name: "Orbit".to_string(),
            url: "https://orbit.example".to_string(),
            ..SiteConfig::default()
        };
        Site::with_config(dir.path().to_path_buf(), config)
    }

    fn fixture(dir: &TempDir) {
        let data = dir.path().join("assets/data");
        fs::create_dir_all(data.join("blog-posts")).unwrap();
        fs::write(data.join("blog-data.json"), MANIFEST).unwrap();
        fs::write(
            data.join("blog-posts/lead.json"),
            r#"{"content": [{"contentType": "text", "title": "Intro", "data": "<p>Hello</p>"}]}"#,
        )
        .unwrap();

        let assets = dir.path().join("static/assets/css");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("site.css"), "body{}").unwrap();
        fs::write(dir.path().join("static/.DS_Store"), "").unwrap();
    }

    fn generator(site: &Site) -> Generator<FsArticleSource> {
        let source = FsArticleSource::new(site.data_dir(), "blog-data.json", "blog-posts");
        let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        Generator::with_source(site, source, &clock).unwrap()
    }

    #[tokio::test]
    async fn test_generate_site() {
        let dir = TempDir::new().unwrap();
        fixture(&dir);
        let site = site(&dir);

        let report = generator(&site).generate().await.unwrap();
        assert_eq!(
            report,
            Report {
                articles: 2,
                partial: 1,
                assets: 1,
                manifest: true,
            }
        );

        let public = &site.public_dir;
        assert!(public.join("index.html").exists());
        assert!(public.join("blog/index.html").exists());
        assert!(public.join("assets/css/site.css").exists());
        assert!(!public.join(".DS_Store").exists());
        assert!(!public.join("escape").exists());

        let lead = fs::read_to_string(public.join("blog/lead/index.html")).unwrap();
        assert!(lead.contains("<h2>Intro</h2>"));
        assert!(lead.contains(r#""dateModified":"2025-01-10""#));

        let ops = fs::read_to_string(public.join("blog/ops-101/index.html")).unwrap();
        assert!(ops.contains("<h1>Ops 101</h1>"));
        assert!(ops.contains(r#"href="/blog/lead""#));
    }

    #[tokio::test]
    async fn test_generate_sitemap_and_search_index() {
        let dir = TempDir::new().unwrap();
        fixture(&dir);
        let site = site(&dir);
        generator(&site).generate().await.unwrap();

        let sitemap = fs::read_to_string(site.public_dir.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://orbit.example/</loc>"));
        assert!(sitemap.contains("<loc>https://orbit.example/blog</loc>"));
        assert!(sitemap.contains(
            "<loc>https://orbit.example/blog/ops-101</loc>\n    <lastmod>2024-02-02</lastmod>"
        ));
        assert!(sitemap.contains(
            "<loc>https://orbit.example/blog/lead</loc>\n    <lastmod>2025-01-10</lastmod>"
        ));

        let search: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(site.public_dir.join("search.json")).unwrap())
                .unwrap();
        let urls: Vec<_> = search
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["url"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(urls, vec!["/blog/lead", "/blog/ops-101"]);
        assert_eq!(search[1]["description"], "Runbooks");
    }

    #[tokio::test]
    async fn test_generate_without_manifest() {
        let dir = TempDir::new().unwrap();
        let site = site(&dir);

        let report = generator(&site).generate().await.unwrap();
        assert!(!report.manifest);
        assert_eq!(report.articles, 0);

        let listing = fs::read_to_string(site.public_dir.join("blog/index.html")).unwrap();
        assert!(listing.contains("No articles yet"));
        assert!(site.public_dir.join("index.html").exists());
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path("/"), PathBuf::from("index.html"));
        assert_eq!(output_path("/blog"), PathBuf::from("blog/index.html"));
        assert_eq!(output_path("/blog/a/"), PathBuf::from("blog/a/index.html"));
    }
}
