use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    #[serde(default = "default_read")]
    pub read: bool,
}

fn default_read() -> bool {
    true
}
