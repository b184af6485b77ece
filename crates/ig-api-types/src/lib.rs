use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier issued by the wallet provider (e.g. `0xab12...`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Navigation-bar form: first six and last four characters.
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }

    /// Avatar label: first two characters, upper-cased.
    pub fn initials(&self) -> String {
        self.0.chars().take(2).collect::<String>().to_uppercase()
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content identifier of an image. Doubles as primary key and as the input
/// of the display-URL derivation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHash(pub String);

impl ImageHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque feed continuation token. The backend currently issues integers but
/// clients must not interpret it, so strings are accepted as well and echoed
/// back in the shape they arrived in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RandomSeed {
    Number(i64),
    Text(String),
}

impl fmt::Display for RandomSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomSeed::Number(value) => write!(f, "{value}"),
            RandomSeed::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for RandomSeed {
    fn from(value: &str) -> Self {
        RandomSeed::Text(value.to_owned())
    }
}

impl From<i64> for RandomSeed {
    fn from(value: i64) -> Self {
        RandomSeed::Number(value)
    }
}

// ── Wire bodies ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub text: String,
    pub wallet_address: Option<String>,
    pub random_seed: Option<RandomSeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub hash: String,
    pub filename: String,
    #[serde(default)]
    pub similarity: Option<f32>,
    #[serde(default)]
    pub random_seed: Option<RandomSeed>,
    #[serde(default)]
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub random_seed: Option<RandomSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRecord {
    pub hash: String,
    pub filename: String,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageListResponse {
    #[serde(default)]
    pub total: Option<u64>,
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeRequest {
    pub wallet_address: String,
    pub image_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserLikesResponse {
    pub liked_images: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub indexed_images: Option<u64>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub index_type: Option<String>,
}

// ── Domain view ──────────────────────────────────────────────────────

/// A search or listing result with its display URL already derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResult {
    pub hash: ImageHash,
    pub filename: String,
    pub display_url: String,
    pub similarity: Option<f32>,
    pub random_seed: Option<RandomSeed>,
    pub extension: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_keeps_head_and_tail() {
        let address = WalletAddress("0xAbCdEf0123456789abcdef0123456789ABCDEF01".to_owned());
        assert_eq!(address.short(), "0xAbCd...EF01");
        assert_eq!(address.initials(), "0X");
    }

    #[test]
    fn short_address_leaves_short_values_alone() {
        let address = WalletAddress("0xabc".to_owned());
        assert_eq!(address.short(), "0xabc");
    }

    #[test]
    fn random_seed_accepts_numbers_and_strings() {
        let numeric: RandomSeed = serde_json::from_str("482913").unwrap();
        assert_eq!(numeric, RandomSeed::Number(482913));
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "482913");

        let text: RandomSeed = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(text, RandomSeed::from("abc123"));
        assert_eq!(text.to_string(), "abc123");
    }

    #[test]
    fn search_request_sends_explicit_nulls() {
        let body = SearchRequest {
            text: String::new(),
            wallet_address: None,
            random_seed: None,
            num_results: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "text": "", "wallet_address": null, "random_seed": null })
        );
    }

    #[test]
    fn search_response_tolerates_missing_optional_fields() {
        let raw = r#"{
            "results": [
                { "hash": "h1", "filename": "cat", "similarity": 0.42, "extension": ".jpg" },
                { "hash": "h2", "filename": "dog" }
            ],
            "total": 2,
            "random_seed": 77
        }"#;
        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].similarity, Some(0.42));
        assert_eq!(response.results[1].similarity, None);
        assert_eq!(response.random_seed, Some(RandomSeed::Number(77)));
    }

    #[test]
    fn newtypes_serialize_as_plain_strings() {
        let hash = ImageHash("bafy123".to_owned());
        assert_eq!(serde_json::to_string(&hash).unwrap(), "\"bafy123\"");
    }
}
