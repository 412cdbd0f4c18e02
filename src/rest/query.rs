use serde::{Deserialize, Serialize};

/// Renders options as a URL query string, leading `?` included, or an empty
/// string when nothing needs to be sent.
pub trait QueryString {
    fn query_string(&self) -> String;
}

/// Joins already-selected pairs into `?k=v&k=v`.
pub fn build_query(pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let joined = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{joined}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInviteParams {
    /// Ask for approximate member and presence counts.
    #[serde(default)]
    pub with_count: bool,
}

impl QueryString for GetInviteParams {
    fn query_string(&self) -> String {
        let mut pairs = Vec::new();
        if self.with_count {
            pairs.push(("with_count", "true".to_string()));
        }
        build_query(&pairs)
    }
}
