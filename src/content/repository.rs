//! Article repository - fetches the manifest and per-slug detail documents

use serde::de::DeserializeOwned;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::{DetailDocument, Manifest};
use crate::config::SiteConfig;

/// Errors raised while resolving blog content
#[derive(Debug, Error)]
pub enum ContentError {
    /// The manifest could not be fetched or parsed; fatal for the current page
    #[error("manifest unavailable at {location}")]
    ManifestUnavailable {
        location: String,
        #[source]
        source: LoadError,
    },

    /// The per-slug document is missing or malformed; the page renders without a body
    #[error("detail document for {slug:?} unavailable")]
    DetailUnavailable {
        slug: String,
        #[source]
        source: LoadError,
    },

    /// The slug matches neither an article nor the featured article
    #[error("article {0:?} not found")]
    ArticleNotFound(String),
}

/// Underlying cause of a failed fetch
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("slug contains characters outside [A-Za-z0-9_-]")]
    InvalidSlug,
}

/// A place blog content can be fetched from
pub trait ArticleSource: Send + Sync {
    /// Fetch the manifest listing every article
    fn fetch_manifest(&self) -> impl Future<Output = Result<Manifest, ContentError>> + Send;

    /// Fetch the detail document for one slug
    fn fetch_detail(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<DetailDocument, ContentError>> + Send;
}

/// Slugs become file names and URL segments, so only a conservative alphabet is accepted
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reads content from JSON files on disk
#[derive(Debug, Clone)]
pub struct FsArticleSource {
    data_dir: PathBuf,
    manifest_file: String,
    posts_dir: String,
}

impl FsArticleSource {
    pub fn new<P: AsRef<Path>>(data_dir: P, manifest_file: &str, posts_dir: &str) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            manifest_file: manifest_file.to_string(),
            posts_dir: posts_dir.to_string(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.data_dir.join(&self.manifest_file)
    }

    pub fn detail_path(&self, slug: &str) -> PathBuf {
        self.data_dir
            .join(&self.posts_dir)
            .join(format!("{}.json", slug))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

impl ArticleSource for FsArticleSource {
    async fn fetch_manifest(&self) -> Result<Manifest, ContentError> {
        let path = self.manifest_path();
        tracing::debug!("Loading manifest from {:?}", path);
        read_json(&path)
            .await
            .map_err(|source| ContentError::ManifestUnavailable {
                location: path.display().to_string(),
                source,
            })
    }

    async fn fetch_detail(&self, slug: &str) -> Result<DetailDocument, ContentError> {
        if !is_valid_slug(slug) {
            return Err(ContentError::DetailUnavailable {
                slug: slug.to_string(),
                source: LoadError::InvalidSlug,
            });
        }
        let path = self.detail_path(slug);
        tracing::debug!("Loading detail document from {:?}", path);
        read_json(&path)
            .await
            .map_err(|source| ContentError::DetailUnavailable {
                slug: slug.to_string(),
                source,
            })
    }
}

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches content from a static JSON host
#[derive(Debug, Clone)]
pub struct HttpArticleSource {
    client: reqwest::Client,
    base_url: String,
    manifest_file: String,
    posts_dir: String,
}

impl HttpArticleSource {
    pub fn new(base_url: &str, manifest_file: &str, posts_dir: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            manifest_file: manifest_file.to_string(),
            posts_dir: posts_dir.to_string(),
        }
    }

    pub fn manifest_url(&self) -> String {
        format!("{}/{}", self.base_url, self.manifest_file)
    }

    pub fn detail_url(&self, slug: &str) -> String {
        format!("{}/{}/{}.json", self.base_url, self.posts_dir, slug)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, LoadError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

impl ArticleSource for HttpArticleSource {
    async fn fetch_manifest(&self) -> Result<Manifest, ContentError> {
        let url = self.manifest_url();
        tracing::debug!("Fetching manifest from {}", url);
        self.get_json(&url)
            .await
            .map_err(|source| ContentError::ManifestUnavailable {
                location: url,
                source,
            })
    }

    async fn fetch_detail(&self, slug: &str) -> Result<DetailDocument, ContentError> {
        if !is_valid_slug(slug) {
            return Err(ContentError::DetailUnavailable {
                slug: slug.to_string(),
                source: LoadError::InvalidSlug,
            });
        }
        let url = self.detail_url(slug);
        tracing::debug!("Fetching detail document from {}", url);
        self.get_json(&url)
            .await
            .map_err(|source| ContentError::DetailUnavailable {
                slug: slug.to_string(),
                source,
            })
    }
}

/// The source selected by configuration: `data_url` wins over `data_dir`
#[derive(Debug, Clone)]
pub enum DataSource {
    Fs(FsArticleSource),
    Http(HttpArticleSource),
}

impl DataSource {
    pub fn from_config(config: &SiteConfig, base_dir: &Path) -> Self {
        match config.data_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => DataSource::Http(HttpArticleSource::new(
                url,
                &config.manifest_file,
                &config.posts_dir,
            )),
            None => DataSource::Fs(FsArticleSource::new(
                base_dir.join(&config.data_dir),
                &config.manifest_file,
                &config.posts_dir,
            )),
        }
    }

    /// Human readable location, for log lines
    pub fn describe(&self) -> String {
        match self {
            DataSource::Fs(source) => source.data_dir.display().to_string(),
            DataSource::Http(source) => source.base_url.clone(),
        }
    }
}

impl ArticleSource for DataSource {
    async fn fetch_manifest(&self) -> Result<Manifest, ContentError> {
        match self {
            DataSource::Fs(source) => source.fetch_manifest().await,
            DataSource::Http(source) => source.fetch_manifest().await,
        }
    }

    async fn fetch_detail(&self, slug: &str) -> Result<DetailDocument, ContentError> {
        match self {
            DataSource::Fs(source) => source.fetch_detail(slug).await,
            DataSource::Http(source) => source.fetch_detail(slug).await,
        }
    }
}
