pub mod activity;
pub mod middleware;
pub mod top_news;
