use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub username: String,
}
