//! Configuration module

mod site;

pub use site::AnalyticsConfig;
pub use site::ContactConfig;
pub use site::LandingConfig;
pub use site::LandingHero;
pub use site::MenuItem;
pub use site::SeoConfig;
pub use site::Service;
pub use site::SiteConfig;
pub use site::WhatsappConfig;
