//! Page model builder - resolves a slug against the manifest and merges its detail document

use serde::Serialize;
use std::collections::HashSet;

use super::repository::{ArticleSource, ContentError};
use super::{ArticleDetail, ArticleSummary, Manifest};

/// Maximum number of related articles shown under a post
pub const RELATED_LIMIT: usize = 3;

/// Everything the post view needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageModel {
    pub article: ArticleDetail,
    pub related: Vec<ArticleSummary>,
}

/// Terminal states of a page build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The slug is unknown; callers redirect to the listing
    NotFound,
    /// The detail document failed to load; the body is empty
    Partial(PageModel),
    /// Summary and detail merged
    Full(PageModel),
}

impl PageOutcome {
    pub fn model(&self) -> Option<&PageModel> {
        match self {
            PageOutcome::NotFound => None,
            PageOutcome::Partial(model) | PageOutcome::Full(model) => Some(model),
        }
    }

    /// Convert into the model, turning `NotFound` into an error
    pub fn into_model(self, slug: &str) -> Result<PageModel, ContentError> {
        match self {
            PageOutcome::NotFound => Err(ContentError::ArticleNotFound(slug.to_string())),
            PageOutcome::Partial(model) | PageOutcome::Full(model) => Ok(model),
        }
    }
}

/// Builds detail page models from an article source
pub struct PageModelBuilder<'a, S> {
    source: &'a S,
}

impl<'a, S: ArticleSource> PageModelBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Fetch the manifest and build the page for `slug`
    ///
    /// Fails only when the manifest itself is unavailable.
    pub async fn load(&self, slug: &str) -> Result<PageOutcome, ContentError> {
        let manifest = self.source.fetch_manifest().await?;
        Ok(self.build(&manifest, slug).await)
    }

    /// Build the page for `slug` against an already loaded manifest
    pub async fn build(&self, manifest: &Manifest, slug: &str) -> PageOutcome {
        let summary = match resolve(manifest, slug) {
            Some(summary) => summary.clone(),
            None => {
                tracing::debug!("No article with slug {:?}", slug);
                return PageOutcome::NotFound;
            }
        };

        let related = related_articles(manifest, &summary.category, slug);
        let article = ArticleDetail::from_summary(summary);

        match self.source.fetch_detail(slug).await {
            Ok(document) => PageOutcome::Full(PageModel {
                article: article.merge(document),
                related,
            }),
            Err(e) => {
                tracing::warn!("{}; rendering {:?} without a body", error_chain(&e), slug);
                PageOutcome::Partial(PageModel { article, related })
            }
        }
    }
}

/// Find the summary for `slug`, checking the featured article last
pub fn resolve<'m>(manifest: &'m Manifest, slug: &str) -> Option<&'m ArticleSummary> {
    if slug.is_empty() {
        return None;
    }
    manifest
        .articles
        .iter()
        .find(|a| a.slug.as_deref() == Some(slug))
        .or_else(|| {
            manifest
                .featured_article
                .as_ref()
                .filter(|f| f.slug.as_deref() == Some(slug))
        })
}

/// Up to three linkable articles other than `current`, same category first
///
/// Same-category entries keep manifest order and come first; the remainder is
/// filled from the whole manifest in order, skipping anything already chosen.
pub fn related_articles(manifest: &Manifest, category: &str, current: &str) -> Vec<ArticleSummary> {
    let candidates: Vec<(&str, &ArticleSummary)> = manifest
        .articles
        .iter()
        .filter_map(|a| a.link_slug().map(|slug| (slug, a)))
        .filter(|(slug, _)| *slug != current)
        .collect();

    let same_category = candidates.iter().filter(|(_, a)| a.category == category);
    let mut seen = HashSet::new();
    same_category
        .chain(candidates.iter())
        .filter(|(slug, _)| seen.insert(*slug))
        .take(RELATED_LIMIT)
        .map(|(_, a)| (*a).clone())
        .collect()
}

/// Articles whose title, description or category contains `query`, ignoring case
pub fn filter_articles<'m>(articles: &'m [ArticleSummary], query: &str) -> Vec<&'m ArticleSummary> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return articles.iter().collect();
    }
    articles
        .iter()
        .filter(|a| {
            a.title.to_lowercase().contains(&query)
                || a.description.to_lowercase().contains(&query)
                || a.category.to_lowercase().contains(&query)
        })
        .collect()
}

/// Flatten an error and its sources into one log line
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
