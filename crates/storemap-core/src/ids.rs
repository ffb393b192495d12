//! External identifiers: codes supplied by the feeds, or keys derived locally
//! when a feed omits them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record's identifier, either provided by the source feed or synthesized
/// from other fields so the record is never dropped.
///
/// Serializes as its bare key string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExternalId {
    Provided(String),
    Synthesized(String),
}

impl ExternalId {
    /// Use `code` when present and non-blank, otherwise synthesize a key.
    pub fn provided_or_else<F>(code: Option<&str>, fallback: F) -> Self
    where
        F: FnOnce() -> String,
    {
        match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => Self::Provided(code.to_string()),
            None => Self::Synthesized(fallback()),
        }
    }

    /// The key used for deduplication and lookups.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Provided(key) | Self::Synthesized(key) => key,
        }
    }

    #[must_use]
    pub fn is_synthesized(&self) -> bool {
        matches!(self, Self::Synthesized(_))
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExternalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Deserialize a code that feeds send as a string, an integer, or a float.
///
/// Integral floats render without a fractional part (`1.0` → `"1"`); blank
/// strings and `null` become `None`.
///
/// # Errors
///
/// Fails for arrays, objects, and booleans.
pub fn deserialize_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(serde_json::Value::Number(n)) => Ok(Some(render_number(&n))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number code, got {other}"
        ))),
    }
}

fn render_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        #[allow(clippy::cast_possible_truncation)]
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_code")]
        code: Option<String>,
    }

    fn code_of(json: &str) -> Option<String> {
        serde_json::from_str::<Holder>(json).unwrap().code
    }

    #[test]
    fn accepts_string_integer_and_float_codes() {
        assert_eq!(code_of(r#"{"code":"D1"}"#).as_deref(), Some("D1"));
        assert_eq!(code_of(r#"{"code":17}"#).as_deref(), Some("17"));
        assert_eq!(code_of(r#"{"code":17.0}"#).as_deref(), Some("17"));
        assert_eq!(code_of(r#"{"code":17.5}"#).as_deref(), Some("17.5"));
    }

    #[test]
    fn blank_null_and_missing_codes_are_none() {
        assert_eq!(code_of(r#"{"code":"  "}"#), None);
        assert_eq!(code_of(r#"{"code":null}"#), None);
        assert_eq!(code_of("{}"), None);
    }

    #[test]
    fn rejects_structured_codes() {
        assert!(serde_json::from_str::<Holder>(r#"{"code":[1]}"#).is_err());
    }

    #[test]
    fn provided_or_else_prefers_trimmed_code() {
        let id = ExternalId::provided_or_else(Some(" D1 "), || "unused".to_string());
        assert_eq!(id, ExternalId::Provided("D1".to_string()));
        assert!(!id.is_synthesized());
    }

    #[test]
    fn provided_or_else_synthesizes_for_blank() {
        let id = ExternalId::provided_or_else(Some(""), || "dept-A1-0".to_string());
        assert_eq!(id, ExternalId::Synthesized("dept-A1-0".to_string()));
        assert_eq!(id.as_str(), "dept-A1-0");
    }

    #[test]
    fn serializes_as_bare_key() {
        let json = serde_json::to_string(&ExternalId::Synthesized("zone-North".into())).unwrap();
        assert_eq!(json, "\"zone-North\"");
    }
}
