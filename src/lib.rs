//! Newsroom backend serving the ranked "top news" list.
//!
//! Top-news entries occupy unique positions; [`services::ranked_list`] keeps
//! them unique across inserts and moves. The HTTP surface lives in
//! [`routes`], storage backends in [`store`].

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;
