pub mod link;
pub mod promo;

pub use link::{build_link, normalize_url};
pub use promo::{
    build_promotional_text, classify, default_variants, hashtags, DeliveryChannel,
    PromoVariant, PromotionConfig, ToolCategory,
};
