//! Website settings.

use serde::{Deserialize, Serialize};

/// Name shown in the site header.
pub const DEFAULT_WEBSITE_NAME: &str = "CMSmall";

/// Website name singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub name: String,
}
