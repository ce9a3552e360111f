use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateCredentialRequest {
    pub email: String,
    pub password: String,
}

/// An empty or missing password leaves the current hash in place.
#[derive(Debug, Deserialize)]
pub struct UpdateCredentialRequest {
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}
