//! Outbound delivery of curation decisions: social posting and the static-site catalog.

pub mod catalog;
pub mod gateway;
pub mod poster;

pub use catalog::{
    CatalogEntry, CatalogError, CatalogPublisher, CatalogStats, CatalogUpdate, SiteCatalog,
    SortKey, WeeklyDigest,
};
pub use gateway::{GatewayError, PostReceipt, SocialGateway};
pub use poster::{
    PostEntry, PostHistory, PostOutcome, PromotionPoster, PublishError,
    DEFAULT_REPOST_COOLDOWN_DAYS,
};
