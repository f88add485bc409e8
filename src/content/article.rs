//! Article, manifest and detail document models

use serde::{Deserialize, Serialize};

/// Author byline attached to an article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub role: String,
    pub avatar: String,
}

/// An article as listed in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleSummary {
    /// Stable identifier
    pub id: String,

    /// URL slug; entries without one are listed but never linked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    pub title: String,
    pub description: String,
    pub category: String,

    /// Human readable read time ("5 min read")
    pub read_time: String,

    /// Hero image path and its alt text
    pub image: String,
    pub image_alt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    /// Publication date (YYYY-MM-DD) when the manifest already knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl ArticleSummary {
    /// The slug if present and non-empty
    pub fn link_slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether this entry may be rendered as a link
    pub fn is_navigable(&self) -> bool {
        self.link_slug().is_some()
    }
}

/// One ordered unit of article body content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contentType", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Prose, optionally HTML-bearing, with an optional heading
    Text {
        #[serde(default)]
        title: Option<String>,
        data: String,
    },
    /// An image reference
    Image {
        #[serde(default)]
        title: Option<String>,
        data: String,
    },
}

impl ContentBlock {
    pub fn text(title: Option<&str>, data: &str) -> Self {
        ContentBlock::Text {
            title: title.map(str::to_string),
            data: data.to_string(),
        }
    }

    pub fn image(data: &str) -> Self {
        ContentBlock::Image {
            title: None,
            data: data.to_string(),
        }
    }

    /// Heading of the block, ignoring empty strings
    pub fn heading(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { title, .. } | ContentBlock::Image { title, .. } => {
                title.as_deref().filter(|t| !t.is_empty())
            }
        }
    }
}

/// Blog listing hero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlogHero {
    pub badge: String,
    pub title: String,
    pub description: String,
    pub background_image: String,
    pub background_image_alt: String,
}

/// Newsletter call to action shown under the listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Newsletter {
    pub title: String,
    pub description: String,
    pub placeholder: String,
    pub button_text: String,
    pub disclaimer: String,
}

/// The top-level blog document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Manifest {
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_article: Option<ArticleSummary>,
    pub articles: Vec<ArticleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<BlogHero>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newsletter: Option<Newsletter>,
}

impl Manifest {
    /// Every article that can be linked, featured article first, without duplicate slugs
    pub fn navigable(&self) -> Vec<&ArticleSummary> {
        let mut seen = std::collections::HashSet::new();
        self.featured_article
            .iter()
            .chain(self.articles.iter())
            .filter(|a| match a.link_slug() {
                Some(slug) => seen.insert(slug),
                None => false,
            })
            .collect()
    }
}

/// Per-slug document holding the full article body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetailDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// A summary merged with its detail document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    pub content: Vec<ContentBlock>,
}

impl ArticleDetail {
    /// Manifest-only detail with an empty body
    pub fn from_summary(summary: ArticleSummary) -> Self {
        Self {
            summary,
            content: Vec::new(),
        }
    }

    /// Merge a detail document; its publication date wins when present
    pub fn merge(mut self, document: DetailDocument) -> Self {
        self.content = document.content;
        if let Some(date) = document.published_date {
            self.summary.published_date = Some(date);
        }
        self
    }

    pub fn slug(&self) -> &str {
        self.summary.link_slug().unwrap_or_default()
    }

    pub fn published_date(&self) -> Option<&str> {
        self.summary.published_date.as_deref()
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "categories": ["All", "Strategy"],
        "featuredArticle": {
            "id": "f1",
            "slug": "featured-story",
            "title": "Featured",
            "description": "Lead story",
            "category": "Strategy",
            "readTime": "7 min read",
            "image": "assets/blog/featured.jpg",
            "imageAlt": "Featured image",
            "author": {"name": "Sara", "role": "Editor", "avatar": "assets/sara.jpg"}
        },
        "articles": [
            {"id": "1", "slug": "first", "title": "First", "description": "d1", "category": "Strategy",
             "readTime": "3 min read", "image": "a.jpg", "imageAlt": "A"},
            {"id": "2", "title": "Draft", "description": "d2", "category": "AI",
             "readTime": "4 min read", "image": "b.jpg", "imageAlt": "B"}
        ],
        "hero": {"badge": "Blog", "title": "Insights", "description": "News",
                 "backgroundImage": "hero.jpg", "backgroundImageAlt": "Hero"},
        "newsletter": {"title": "Subscribe", "description": "Weekly", "placeholder": "Email",
                       "buttonText": "Join", "disclaimer": "No spam"}
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.categories.len(), 2);
        assert_eq!(manifest.articles.len(), 2);
        assert_eq!(manifest.articles[0].read_time, "3 min read");
        assert_eq!(manifest.articles[1].slug, None);

        let featured = manifest.featured_article.as_ref().unwrap();
        assert_eq!(featured.author.as_ref().unwrap().role, "Editor");
        assert_eq!(manifest.hero.unwrap().background_image_alt, "Hero");
        assert_eq!(manifest.newsletter.unwrap().button_text, "Join");
    }

    #[test]
    fn test_navigable_skips_slugless_and_duplicates() {
        let mut manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        manifest.articles.push(ArticleSummary {
            slug: Some("featured-story".to_string()),
            ..ArticleSummary::default()
        });
        manifest.articles.push(ArticleSummary {
            slug: Some(String::new()),
            ..ArticleSummary::default()
        });

        let slugs: Vec<_> = manifest
            .navigable()
            .iter()
            .filter_map(|a| a.link_slug())
            .collect();
        assert_eq!(slugs, vec!["featured-story", "first"]);
    }

    #[test]
    fn test_parse_content_blocks() {
        let json = r#"{
            "slug": "first",
            "publishedDate": "2024-03-01",
            "content": [
                {"contentType": "text", "title": "Intro", "data": "<p>Hello</p>"},
                {"contentType": "image", "title": null, "data": "assets/x.png"},
                {"contentType": "text", "data": "Bare"}
            ]
        }"#;
        let doc: DetailDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.published_date.as_deref(), Some("2024-03-01"));
        assert_eq!(
            doc.content,
            vec![
                ContentBlock::text(Some("Intro"), "<p>Hello</p>"),
                ContentBlock::image("assets/x.png"),
                ContentBlock::text(None, "Bare"),
            ]
        );
        assert_eq!(doc.content[0].heading(), Some("Intro"));
        assert_eq!(doc.content[2].heading(), None);
    }

    #[test]
    fn test_merge_keeps_manifest_date_without_override() {
        let summary = ArticleSummary {
            slug: Some("first".to_string()),
            published_date: Some("2023-12-31".to_string()),
            ..ArticleSummary::default()
        };

        let merged = ArticleDetail::from_summary(summary.clone()).merge(DetailDocument {
            content: vec![ContentBlock::image("x.png")],
            ..DetailDocument::default()
        });
        assert_eq!(merged.published_date(), Some("2023-12-31"));
        assert!(merged.has_content());

        let merged = ArticleDetail::from_summary(summary).merge(DetailDocument {
            published_date: Some("2024-01-02".to_string()),
            ..DetailDocument::default()
        });
        assert_eq!(merged.published_date(), Some("2024-01-02"));
        assert!(!merged.has_content());
    }
}
