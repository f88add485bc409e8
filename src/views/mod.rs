//! View components - turn page models into HTML through the embedded templates

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tera::Context;

use crate::config::{LandingConfig, MenuItem, SiteConfig};
use crate::content::page::filter_articles;
use crate::content::{
    ArticleDetail, ArticleSummary, BlogHero, ContentBlock, Manifest, Newsletter, PageModel,
};
use crate::helpers::{
    article_path, css_url, encode_component, full_url_for, url_for, whatsapp_url, year,
};
use crate::seo::{Head, SeoSynthesizer};
use crate::templates::TemplateRenderer;

/// Site-wide values used by the header, footer and layout
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub name: String,
    pub tagline: String,
    pub language: String,
    pub logo: String,
    pub menu: Vec<MenuItem>,
    pub year: String,
    pub whatsapp_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorData {
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
}

/// One content block as the post template sees it
#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub kind: &'static str,
    pub title: Option<String>,
    pub data: String,
}

impl From<&ContentBlock> for BlockData {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text { data, .. } => BlockData {
                kind: "text",
                title: block.heading().map(str::to_string),
                data: data.clone(),
            },
            ContentBlock::Image { data, .. } => BlockData {
                kind: "image",
                title: block.heading().map(str::to_string),
                data: url_for(data),
            },
        }
    }
}

/// Article fields for cards and the post header; `href` is set only for linkable entries
#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub id: String,
    pub href: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub read_time: String,
    pub image: String,
    pub image_alt: String,
    pub author: Option<AuthorData>,
    pub published_date: Option<String>,
    pub content: Vec<BlockData>,
}

impl From<&ArticleSummary> for ArticleData {
    fn from(summary: &ArticleSummary) -> Self {
        Self {
            id: summary.id.clone(),
            href: summary.link_slug().map(article_path),
            title: summary.title.clone(),
            description: summary.description.clone(),
            category: summary.category.clone(),
            read_time: summary.read_time.clone(),
            image: if summary.image.is_empty() {
                String::new()
            } else {
                url_for(&summary.image)
            },
            image_alt: summary.image_alt.clone(),
            author: summary.author.as_ref().map(|a| AuthorData {
                name: a.name.clone(),
                role: a.role.clone(),
                avatar: Some(a.avatar.as_str())
                    .filter(|s| !s.is_empty())
                    .map(url_for),
            }),
            published_date: summary.published_date.clone(),
            content: Vec::new(),
        }
    }
}

impl From<&ArticleDetail> for ArticleData {
    fn from(article: &ArticleDetail) -> Self {
        Self {
            content: article.content.iter().map(BlockData::from).collect(),
            ..ArticleData::from(&article.summary)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryData {
    pub id: String,
    pub name: String,
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinks {
    pub linkedin: String,
    pub twitter: String,
}

/// Renders the three routes of the site
pub struct Views {
    renderer: TemplateRenderer,
    config: SiteConfig,
    seo: SeoSynthesizer,
}

impl Views {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
            config: config.clone(),
            seo: SeoSynthesizer::new(config),
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    fn site_data(&self, today: NaiveDate) -> SiteData {
        SiteData {
            name: self.config.site_name.clone(),
            tagline: self.config.tagline.clone(),
            language: self.config.language.clone(),
            logo: url_for(&self.config.logo),
            menu: self.config.menu.clone(),
            year: year(&today),
            whatsapp_url: self
                .config
                .landing
                .whatsapp
                .as_ref()
                .filter(|w| !w.phone.is_empty())
                .map(|w| whatsapp_url(&w.phone, &w.message)),
        }
    }

    fn base_context(&self, path: &str, head: &Head, today: NaiveDate) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site_data(today));
        context.insert("current_path", path);
        context.insert("head", &head.render());
        context
    }

    /// Landing page with the contact form
    pub fn landing(&self, today: NaiveDate) -> Result<String> {
        let title = if self.config.tagline.is_empty() {
            self.config.site_name.clone()
        } else {
            format!("{} | {}", self.config.site_name, self.config.tagline)
        };
        let head = Head::page(
            &title,
            &self.config.description,
            &full_url_for(&self.config, "/"),
        );

        let mut context = self.base_context("/", &head, today);
        context.insert::<LandingConfig, _>("landing", &self.config.landing);
        self.renderer.render("index.html", &context)
    }

    /// Blog listing; `None` renders the empty state
    pub fn blog(&self, manifest: Option<&Manifest>, query: &str, today: NaiveDate) -> Result<String> {
        let title = format!("Blog | {}", self.config.site_name);
        let description = manifest
            .and_then(|m| m.hero.as_ref())
            .map(|h| h.description.as_str())
            .unwrap_or(&self.config.description);
        let head = Head::page(&title, description, &full_url_for(&self.config, "/blog"));

        let query = query.trim();
        let mut context = self.base_context("/blog", &head, today);
        context.insert("query", query);
        context.insert("available", &manifest.is_some());

        let empty = Manifest::default();
        let manifest = manifest.unwrap_or(&empty);
        let featured: Vec<ArticleData> = manifest
            .featured_article
            .iter()
            .map(ArticleData::from)
            .collect();
        let articles: Vec<ArticleData> = filter_articles(&manifest.articles, query)
            .into_iter()
            .map(ArticleData::from)
            .collect();
        let categories: Vec<CategoryData> = manifest
            .categories
            .iter()
            .map(|name| CategoryData {
                id: slug::slugify(name),
                name: name.clone(),
                query: encode_component(name),
            })
            .collect();

        context.insert("featured", &featured);
        context.insert("articles", &articles);
        context.insert("categories", &categories);
        context.insert::<Option<BlogHero>, _>("hero", &manifest.hero);
        context.insert(
            "hero_background",
            &manifest
                .hero
                .as_ref()
                .map(|h| h.background_image.as_str())
                .filter(|s| !s.is_empty())
                .map(css_url),
        );
        context.insert::<Option<Newsletter>, _>("newsletter", &manifest.newsletter);
        self.renderer.render("blog.html", &context)
    }

    /// Blog post detail page with SEO tags as of `today`
    pub fn post(&self, model: &PageModel, today: NaiveDate) -> Result<String> {
        let tags = self.seo.synthesize(&model.article, today);
        let mut head = Head::default();
        tags.apply(&mut head);

        let url = self.seo.article_url(&model.article);
        let title = &model.article.summary.title;
        let share = ShareLinks {
            linkedin: format!(
                "https://www.linkedin.com/sharing/share-offsite/?url={}",
                encode_component(&url)
            ),
            twitter: format!(
                "https://twitter.com/intent/tweet?url={}&text={}",
                encode_component(&url),
                encode_component(&format!(
                    "{} - {}",
                    title, model.article.summary.description
                ))
            ),
        };

        let path = article_path(model.article.slug());
        let mut context = self.base_context(&path, &head, today);
        context.insert("article", &ArticleData::from(&model.article));
        context.insert(
            "related",
            &model
                .related
                .iter()
                .map(ArticleData::from)
                .collect::<Vec<_>>(),
        );
        context.insert("share", &share);
        self.renderer.render("post.html", &context)
    }
}
