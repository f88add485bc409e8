//! Content module - blog manifest, detail documents and page models

mod article;
pub mod page;
pub mod repository;

pub use article::{
    ArticleDetail, ArticleSummary, Author, BlogHero, ContentBlock, DetailDocument, Manifest,
    Newsletter,
};
pub use page::{PageModel, PageModelBuilder, PageOutcome};
pub use repository::{ArticleSource, ContentError, DataSource, FsArticleSource, HttpArticleSource};
