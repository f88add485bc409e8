//! SEO synthesizer - derives title, meta, canonical and JSON-LD tags for a blog post
//!
//! Synthesis is a pure function of the article and "today"; applying the result
//! to a [`HeadSink`] is idempotent.

mod head;

pub use head::{Head, HeadSink, MetaKey};

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::content::{ArticleDetail, ContentBlock};
use crate::helpers::{article_path, full_url_for, iso_date, plain_text, take_chars};

/// Upper bound on `articleBody`, in characters
pub const ARTICLE_BODY_LIMIT: usize = 5000;

/// Source of the current calendar date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the site's timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: chrono_tz::Tz,
}

impl SystemClock {
    pub fn new(tz: chrono_tz::Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// A clock stuck on one day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// One `<meta>` assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub key: MetaKey,
    pub content: String,
}

impl MetaTag {
    fn name(name: &str, content: impl Into<String>) -> Self {
        Self {
            key: MetaKey::Name(name.to_string()),
            content: content.into(),
        }
    }

    fn property(property: &str, content: impl Into<String>) -> Self {
        Self {
            key: MetaKey::Property(property.to_string()),
            content: content.into(),
        }
    }
}

/// The full set of tags for one post
#[derive(Debug, Clone, PartialEq)]
pub struct SeoTags {
    pub title: String,
    pub meta: Vec<MetaTag>,
    pub canonical: String,
    pub structured_data: Value,
}

impl SeoTags {
    /// Write every tag into `head`, replacing earlier values
    pub fn apply<H: HeadSink + ?Sized>(&self, head: &mut H) {
        head.set_title(&self.title);
        for tag in &self.meta {
            head.update_tag(tag.key.clone(), &tag.content);
        }
        head.set_canonical(&self.canonical);
        head.remove_structured_data();
        head.append_structured_data(&self.structured_data);
    }
}

/// Derives SEO tags from site configuration and an article
#[derive(Debug, Clone)]
pub struct SeoSynthesizer {
    config: SiteConfig,
}

impl SeoSynthesizer {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Absolute URL of the post
    pub fn article_url(&self, article: &ArticleDetail) -> String {
        full_url_for(&self.config, &article_path(article.slug()))
    }

    /// Absolute URL of the post image, or of the site logo when it has none
    pub fn article_image(&self, article: &ArticleDetail) -> String {
        let image = if article.summary.image.is_empty() {
            &self.config.logo
        } else {
            &article.summary.image
        };
        full_url_for(&self.config, image)
    }

    fn author_name<'a>(&'a self, article: &'a ArticleDetail) -> &'a str {
        article
            .summary
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.config.seo.default_author)
    }

    fn author_role<'a>(&'a self, article: &'a ArticleDetail) -> &'a str {
        article
            .summary
            .author
            .as_ref()
            .map(|a| a.role.as_str())
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.config.seo.default_author_role)
    }

    fn keywords(&self, article: &ArticleDetail) -> String {
        let mut keywords = vec![article.summary.category.as_str()];
        keywords.extend(self.config.seo.keywords.iter().map(String::as_str));
        keywords.push(&self.config.site_name);
        keywords.retain(|k| !k.is_empty());
        keywords.join(", ")
    }

    /// Compute every tag for `article` as of `today`
    pub fn synthesize(&self, article: &ArticleDetail, today: NaiveDate) -> SeoTags {
        let summary = &article.summary;
        let site_name = &self.config.site_name;
        let url = self.article_url(article);
        let image = self.article_image(article);
        let author = self.author_name(article);
        let today = iso_date(&today);
        let published = article
            .published_date()
            .map(str::to_string)
            .unwrap_or_else(|| today.clone());

        let mut meta = vec![
            MetaTag::name("description", &summary.description),
            MetaTag::name("keywords", self.keywords(article)),
            MetaTag::name("author", author),
            MetaTag::name("robots", &self.config.seo.robots),
            MetaTag::name("article:published_time", &published),
            MetaTag::name("article:section", &summary.category),
            MetaTag::name("article:tag", &summary.category),
            MetaTag::property("og:type", "article"),
            MetaTag::property("og:title", &summary.title),
            MetaTag::property("og:description", &summary.description),
            MetaTag::property("og:url", &url),
            MetaTag::property("og:image", &image),
            MetaTag::property("og:image:alt", &summary.image_alt),
            MetaTag::property("og:site_name", site_name),
            MetaTag::property("og:locale", &self.config.locale),
        ];
        if summary.author.is_some() {
            meta.push(MetaTag::property("article:author", author));
        }
        meta.extend([
            MetaTag::name("twitter:card", "summary_large_image"),
            MetaTag::name("twitter:title", &summary.title),
            MetaTag::name("twitter:description", &summary.description),
            MetaTag::name("twitter:image", &image),
            MetaTag::name("twitter:image:alt", &summary.image_alt),
        ]);
        if let Some(site) = self.config.seo.twitter_site.as_deref() {
            meta.push(MetaTag::name("twitter:site", site));
        }

        let body = article_body(article);
        let word_count = word_count(&body);

        let structured_data = json!({
            "@context": "https://schema.org",
            "@type": "BlogPosting",
            "headline": summary.title,
            "description": summary.description,
            "image": {
                "@type": "ImageObject",
                "url": image,
                "width": self.config.seo.image_width,
                "height": self.config.seo.image_height,
            },
            "datePublished": published,
            "dateModified": today,
            "author": {
                "@type": "Person",
                "name": author,
                "jobTitle": self.author_role(article),
            },
            "publisher": {
                "@type": "Organization",
                "name": site_name,
                "logo": {
                    "@type": "ImageObject",
                    "url": full_url_for(&self.config, &self.config.logo),
                },
            },
            "mainEntityOfPage": {
                "@type": "WebPage",
                "@id": url,
            },
            "articleSection": summary.category,
            "keywords": summary.category,
            "articleBody": body,
            "url": url,
            "wordCount": word_count,
        });

        SeoTags {
            title: format!("{} | {} Blog", summary.title, site_name),
            meta,
            canonical: url,
            structured_data,
        }
    }
}

/// Plain-text body built from the text blocks, capped at [`ARTICLE_BODY_LIMIT`]
///
/// Each block contributes `"{heading}. {text}"` (or just the text). Falls back
/// to the description when nothing is left.
pub fn article_body(article: &ArticleDetail) -> String {
    let body = article
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { data, .. } => {
                let text = plain_text(data);
                Some(match block.heading() {
                    Some(heading) => format!("{}. {}", heading, text),
                    None => text,
                })
            }
            ContentBlock::Image { .. } => None,
        })
        .collect::<Vec<_>>()
        .join(" ");
    let body = take_chars(&body, ARTICLE_BODY_LIMIT);

    if body.is_empty() {
        article.summary.description.clone()
    } else {
        body
    }
}

/// Number of single-space separated tokens
pub fn word_count(body: &str) -> usize {
    body.split(' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ArticleSummary, Author};

    fn config() -> SiteConfig {
        let mut config = SiteConfig {
            site_name: "Orbit".to_string(),
            url: "https://orbit.example".to_string(),
            logo: "assets/logo.png".to_string(),
            ..SiteConfig::default()
        };
        config.seo.twitter_site = Some("@orbit".to_string());
        config.seo.keywords = vec!["automation".to_string()];
        config
    }

    fn detail(content: Vec<ContentBlock>) -> ArticleDetail {
        ArticleDetail {
            summary: ArticleSummary {
                id: "1".to_string(),
                slug: Some("ai-101".to_string()),
                title: "AI 101".to_string(),
                description: "A primer".to_string(),
                category: "AI".to_string(),
                read_time: "4 min read".to_string(),
                image: "assets/blog/ai.jpg".to_string(),
                image_alt: "Robot".to_string(),
                author: None,
                published_date: None,
            },
            content,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn meta<'a>(tags: &'a SeoTags, key: &MetaKey) -> Option<&'a str> {
        tags.meta
            .iter()
            .find(|t| &t.key == key)
            .map(|t| t.content.as_str())
    }

    #[test]
    fn test_article_body_from_text_blocks() {
        let article = detail(vec![
            ContentBlock::text(Some("Intro"), "<p>Hello  world</p>"),
            ContentBlock::image("assets/x.png"),
            ContentBlock::text(None, "<ul><li>One</li><li>Two</li></ul>"),
            ContentBlock::text(Some(""), "Tail"),
        ]);
        assert_eq!(article_body(&article), "Intro. Hello world One Two Tail");
    }

    #[test]
    fn test_article_body_falls_back_to_description() {
        assert_eq!(article_body(&detail(vec![])), "A primer");
        assert_eq!(
            article_body(&detail(vec![ContentBlock::image("x.png")])),
            "A primer"
        );
    }

    #[test]
    fn test_article_body_is_capped() {
        let long = "word ".repeat(3000);
        let body = article_body(&detail(vec![ContentBlock::text(None, &long)]));
        assert_eq!(body.chars().count(), ARTICLE_BODY_LIMIT);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("Intro. Hello world"), 3);
        assert_eq!(word_count("one"), 1);
    }

    #[test]
    fn test_synthesize_tags() {
        let synthesizer = SeoSynthesizer::new(&config());
        let tags = synthesizer.synthesize(
            &detail(vec![ContentBlock::text(Some("Intro"), "<p>Hello  world</p>")]),
            today(),
        );

        assert_eq!(tags.title, "AI 101 | Orbit Blog");
        assert_eq!(tags.canonical, "https://orbit.example/blog/ai-101");
        assert_eq!(
            meta(&tags, &MetaKey::Name("keywords".into())),
            Some("AI, automation, Orbit")
        );
        assert_eq!(
            meta(&tags, &MetaKey::Name("author".into())),
            Some("Editorial Team")
        );
        assert_eq!(
            meta(&tags, &MetaKey::Property("og:image".into())),
            Some("https://orbit.example/assets/blog/ai.jpg")
        );
        assert_eq!(
            meta(&tags, &MetaKey::Name("twitter:site".into())),
            Some("@orbit")
        );
        assert_eq!(meta(&tags, &MetaKey::Property("article:author".into())), None);

        let data = &tags.structured_data;
        assert_eq!(data["@type"], "BlogPosting");
        assert_eq!(data["articleBody"], "Intro. Hello world");
        assert_eq!(data["wordCount"], 3);
        assert_eq!(data["datePublished"], "2025-06-01");
        assert_eq!(data["dateModified"], "2025-06-01");
        assert_eq!(data["image"]["width"], 1200);
        assert_eq!(data["author"]["jobTitle"], "Strategic Insights");
        assert_eq!(
            data["publisher"]["logo"]["url"],
            "https://orbit.example/assets/logo.png"
        );
    }

    #[test]
    fn test_synthesize_with_author_and_date() {
        let mut article = detail(vec![]);
        article.summary.author = Some(Author {
            name: "Sara".to_string(),
            role: "Editor".to_string(),
            avatar: String::new(),
        });
        article.summary.published_date = Some("2024-11-20".to_string());
        article.summary.image = String::new();

        let tags = SeoSynthesizer::new(&config()).synthesize(&article, today());
        assert_eq!(
            meta(&tags, &MetaKey::Property("article:author".into())),
            Some("Sara")
        );
        assert_eq!(
            meta(&tags, &MetaKey::Name("article:published_time".into())),
            Some("2024-11-20")
        );
        assert_eq!(
            meta(&tags, &MetaKey::Name("twitter:image".into())),
            Some("https://orbit.example/assets/logo.png")
        );
        assert_eq!(tags.structured_data["datePublished"], "2024-11-20");
        assert_eq!(tags.structured_data["dateModified"], "2025-06-01");
        assert_eq!(tags.structured_data["author"]["name"], "Sara");
        assert_eq!(tags.structured_data["articleBody"], "A primer");
        assert_eq!(tags.structured_data["wordCount"], 2);
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let synthesizer = SeoSynthesizer::new(&config());
        let article = detail(vec![ContentBlock::text(None, "Body")]);
        let clock = FixedClock(today());

        let first = synthesizer.synthesize(&article, clock.today());
        let second = synthesizer.synthesize(&article, clock.today());
        assert_eq!(first, second);

        let mut head = Head::default();
        first.apply(&mut head);
        let once = head.clone();
        second.apply(&mut head);
        assert_eq!(head, once);
        assert_eq!(head.structured_data_count(), 1);
    }
}
