use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub name: String,
}
