use serde::{Deserialize, Serialize};

/// Identity attached to a request by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub uid: String,
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn demo() -> Self {
        Self {
            uid: "demo-user".to_string(),
            email: Some("demo@example.com".to_string()),
        }
    }
}
