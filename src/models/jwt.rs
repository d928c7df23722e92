use serde::{Deserialize, Serialize};

use crate::models::error::Error;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Passes if the caller holds at least one of `roles`.
    pub fn require_any(&self, roles: &[&str]) -> Result<(), Error> {
        if roles.iter().any(|role| self.has_role(role)) {
            Ok(())
        } else {
            Err(Error::Forbidden("Access denied.".to_string()))
        }
    }
}
