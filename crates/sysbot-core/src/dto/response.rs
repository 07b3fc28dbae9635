use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payload of a response that carries nothing but its status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Response envelope around a payload `T`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    error: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    payload: T,
}

/// Plain status response
pub type BaseResponse = ApiResponse<Empty>;

impl<T> ApiResponse<T> {
    pub fn success(payload: T) -> Self {
        Self {
            error: None,
            timestamp: None,
            payload,
        }
    }

    /// Error response that still carries whatever payload was gathered
    pub fn failure<S: Into<String>>(message: S, payload: T) -> Self {
        Self {
            error: Some(message.into()),
            timestamp: None,
            payload,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Stamp with the current time
    pub fn stamped(self) -> Self {
        self.with_timestamp(Utc::now())
    }

    /// True iff no error is present
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T: Default> ApiResponse<T> {
    /// Error response with an empty payload
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            error: Some(message.into()),
            timestamp: None,
            payload: T::default(),
        }
    }
}

impl<T: Default> From<crate::Error> for ApiResponse<T> {
    fn from(err: crate::Error) -> Self {
        Self::error(err.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireOut<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    payload: &'a T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireIn<T> {
    // Derived on the way out; ignored on the way in.
    #[serde(default, rename = "success")]
    _success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireOut {
            success: self.is_success(),
            error: self.error.as_deref(),
            timestamp: self.timestamp,
            payload: &self.payload,
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ApiResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireIn::<T>::deserialize(deserializer)?;
        Ok(Self {
            error: wire.error,
            timestamp: wire.timestamp,
            payload: wire.payload,
        })
    }
}
