pub mod config;
pub mod jwt_encode;
pub mod state;
