use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use uuid::Uuid;

/// Raw `/verify-sso-token` request body. The payload stays untyped until the
/// hub has vouched for it, since it is forwarded verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifySsoRequest {
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub target_view: Option<String>,
}

/// Identity assertion issued by the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsoPayload {
    /// Upstream user id. Only a hint: the normalized email is the identity key.
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Opaque client preferences, passed back untouched.
    #[serde(default)]
    pub preferences: Option<serde_json::Value>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl SsoPayload {
    /// The upstream id, when it is a UUID the identity provider can adopt.
    pub fn user_id_hint(&self) -> Option<Uuid> {
        self.user_id.as_deref().and_then(|id| Uuid::parse_str(id.trim()).ok())
    }

    /// Non-blank display name.
    pub fn display_name(&self) -> Option<&str> {
        self.full_name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Values above this are taken as milliseconds rather than seconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// Accept unix seconds, unix milliseconds, numeric strings, or RFC 3339.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => {
            let value = n
                .as_f64()
                .ok_or_else(|| D::Error::custom("timestamp out of range"))?;
            from_unix(value).map(Some).ok_or_else(|| D::Error::custom("timestamp out of range"))
        }
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            if let Ok(value) = s.parse::<f64>() {
                return from_unix(value)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom("timestamp out of range"));
            }
            DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| D::Error::custom(format!("invalid timestamp '{s}': {e}")))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected a timestamp, got {other}"
        ))),
    }
}

fn from_unix(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() >= MILLIS_THRESHOLD {
        value
    } else {
        value * 1000.0
    };
    Utc.timestamp_millis_opt(millis.round() as i64).single()
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected an id, got {other}"))),
    }
}
