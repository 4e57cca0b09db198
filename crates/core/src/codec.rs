//! Encode/decode capability shared by the storage path and the schema
//! adapter.
//!
//! Values are re-encoded through a self-describing JSON exchange value:
//! fields are matched by name, unknown fields are dropped and missing
//! defaultable fields take their zero value.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SchemaError;

/// Converts values to and from the JSON exchange format.
pub trait Codec {
    /// Serialize `value` into the exchange format.
    fn encode<T>(&self, value: &T) -> Result<serde_json::Value, SchemaError>
    where
        T: Serialize + ?Sized;

    /// Decode an exchange payload into `T`.
    fn decode<T>(&self, payload: serde_json::Value) -> Result<T, SchemaError>
    where
        T: DeserializeOwned;

    /// Re-encode `value` as a `T` by name-matching its fields.
    fn transcode<S, T>(&self, value: &S) -> Result<T, SchemaError>
    where
        S: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.decode(self.encode(value)?)
    }
}

/// The [`Codec`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T>(&self, value: &T) -> Result<serde_json::Value, SchemaError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value).map_err(SchemaError::Encode)
    }

    fn decode<T>(&self, payload: serde_json::Value) -> Result<T, SchemaError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(payload).map_err(SchemaError::Decode)
    }
}
