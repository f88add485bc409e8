//! Helper functions shared by templates, views and the SEO synthesizer

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
