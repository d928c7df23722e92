pub mod activity;
pub mod error;
pub mod jwt;
pub mod media;
pub mod top_news;
