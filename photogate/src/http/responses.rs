use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    #[serde(rename = "loginCount")]
    pub login_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct PhotosQuery {
    pub username: Option<String>,
}

/// Pulls `username` and `password` out of a login body. Anything other than a
/// string in either field counts as absent.
pub fn login_fields(body: &Value) -> Option<(&str, &str)> {
    let username = body.get("username")?.as_str()?;
    let password = body.get("password")?.as_str()?;
    Some((username, password))
}
