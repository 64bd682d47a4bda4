use serde::Deserialize;

/// Response envelope used by every provider endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}
