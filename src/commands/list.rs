//! List blog content

use anyhow::{bail, Result};
use indexmap::IndexMap;

use crate::content::{ArticleSource, ArticleSummary, Manifest};
use crate::Site;

/// List blog content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    let source = site.source();
    tracing::debug!("Reading manifest from {}", source.describe());
    let manifest = source.fetch_manifest().await?;

    for line in render(&manifest, content_type)? {
        println!("{}", line);
    }
    Ok(())
}

fn describe(article: &ArticleSummary) -> String {
    let date = article.published_date.as_deref().unwrap_or("----------");
    match article.link_slug() {
        Some(slug) => format!("  {} - {} [{}]", date, article.title, slug),
        None => format!("  {} - {} (no slug, not linked)", date, article.title),
    }
}

/// Lines printed for one content type
fn render(manifest: &Manifest, content_type: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    match content_type {
        "article" | "articles" | "post" | "posts" => {
            lines.push(format!("Articles ({}):", manifest.articles.len()));
            lines.extend(manifest.articles.iter().map(describe));
        }
        "category" | "categories" => {
            // Declared categories first, then any only used by articles
            let mut categories: IndexMap<&str, usize> = manifest
                .categories
                .iter()
                .map(|c| (c.as_str(), 0))
                .collect();
            for article in &manifest.articles {
                *categories.entry(article.category.as_str()).or_insert(0) += 1;
            }
            lines.push(format!("Categories ({}):", categories.len()));
            lines.extend(
                categories
                    .into_iter()
                    .map(|(name, count)| format!("  {} ({})", name, count)),
            );
        }
        "featured" => match &manifest.featured_article {
            Some(article) => {
                lines.push("Featured:".to_string());
                lines.push(describe(article));
            }
            None => lines.push("No featured article".to_string()),
        },
        _ => {
            bail!(
                "Unknown type: {}. Available: articles, categories, featured",
                content_type
            );
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        serde_json::from_str(
            r#"{
                "categories": ["AI", "Ops"],
                "featuredArticle": {"slug": "lead", "title": "Lead", "category": "AI"},
                "articles": [
                    {"slug": "a", "title": "A", "category": "AI", "publishedDate": "2024-01-02"},
                    {"title": "Draft", "category": "Growth"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_list_articles() {
        let lines = render(&manifest(), "articles").unwrap();
        assert_eq!(
            lines,
            vec![
                "Articles (2):",
                "  2024-01-02 - A [a]",
                "  ---------- - Draft (no slug, not linked)",
            ]
        );
    }

    #[test]
    fn test_list_categories() {
        let lines = render(&manifest(), "categories").unwrap();
        assert_eq!(
            lines,
            vec!["Categories (3):", "  AI (1)", "  Ops (0)", "  Growth (1)"]
        );
    }

    #[test]
    fn test_list_featured_and_unknown() {
        assert_eq!(
            render(&manifest(), "featured").unwrap(),
            vec!["Featured:", "  ---------- - Lead [lead]"]
        );
        assert!(render(&Manifest::default(), "featured").unwrap()[0].contains("No featured"));
        assert!(render(&manifest(), "tags").is_err());
    }
}
