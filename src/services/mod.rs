pub mod activity;
pub mod media;
pub mod ranked_list;
