use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Envelope returned by `new_combo_search.php`: `{"data": {"Data": [...]}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamSearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: SearchPayload,
}

/// Inner payload; a missing or null `Data` array means zero results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPayload {
    #[serde(rename = "Data", default, deserialize_with = "null_as_default")]
    pub groups: Vec<ResultGroup>,
}

impl UpstreamSearchResponse {
    /// Result groups in upstream order
    pub fn groups(&self) -> &[ResultGroup] {
        &self.data.groups
    }

    pub fn into_groups(self) -> Vec<ResultGroup> {
        self.data.groups
    }
}

/// One category of hits, e.g. stations or podcasts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultGroup {
    #[serde(rename = "type", default, deserialize_with = "lenient_string_or_empty")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Item>,
}

/// A single hit. Every field is optional; values that are not strings or
/// numbers are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "lenient_string")]
    pub st_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub podcast_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub st_genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub st_shorturl: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deeplink: Option<String>,
}

impl Item {
    /// Station name, else podcast name
    pub fn display_name(&self) -> Option<&str> {
        present(self.st_name.as_deref()).or_else(|| present(self.podcast_name.as_deref()))
    }

    /// Station genre, else category name
    pub fn display_category(&self) -> Option<&str> {
        present(self.st_genre.as_deref()).or_else(|| present(self.category_name.as_deref()))
    }

    /// Explicit deep link, else a canonical link built from `site_url` and the short url
    pub fn display_link(&self, site_url: &str) -> Option<String> {
        if let Some(link) = present(self.deeplink.as_deref()) {
            return Some(link.to_string());
        }
        present(self.st_shorturl.as_deref())
            .map(|short| format!("{}/radioplay/{short}", site_url.trim_end_matches('/')))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}
