//! The user resolved from a CMS session.

use serde::{Deserialize, Serialize};

/// An authenticated member of an auth-enabled collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    /// Slug of the collection the user belongs to.
    pub collection: String,
}

impl SessionUser {
    /// Portion of the email before `@`, or the whole address when there is none.
    pub fn local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}
