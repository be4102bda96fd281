//! Lenient decoding of model output into strict typed records.
//!
//! Models prepend commentary or append remarks even when told to return bare
//! JSON. Decoding runs an ordered list of strategies against the trimmed text:
//! the whole text first, then the slice from the first `{` to the last `}`.
//! The payload is always fully schema-checked. When every strategy fails, the
//! error from the FIRST strategy is reported since it describes the text the
//! model actually sent.

use serde::de::{DeserializeOwned, Error as _};
use thiserror::Error;

/// A typed record the reasoning service is asked to produce.
pub trait ResponseSchema: DeserializeOwned {
    /// Label used in diagnostics.
    const NAME: &'static str;
}

#[derive(Error, Debug)]
#[error("Could not decode {schema} response: {source}")]
pub struct DecodingError {
    pub schema: &'static str,
    #[source]
    pub source: serde_json::Error,
}

type Strategy<T> = fn(&str) -> Result<T, serde_json::Error>;

fn strategies<T: DeserializeOwned>() -> [(&'static str, Strategy<T>); 2] {
    [
        ("strict", decode_strict::<T>),
        ("embedded_object", decode_embedded_object::<T>),
    ]
}

/// Decode `raw` into `T`, tolerating prose around a single JSON object.
pub fn parse<T: ResponseSchema>(raw: &str) -> Result<T, DecodingError> {
    let text = raw.trim();
    let mut first_error: Option<serde_json::Error> = None;

    for (name, strategy) in strategies::<T>() {
        match strategy(text) {
            Ok(value) => {
                tracing::debug!(schema = T::NAME, strategy = name, "Decoded model response");
                return Ok(value);
            }
            Err(e) => {
                tracing::debug!(schema = T::NAME, strategy = name, error = %e, "Decode strategy failed");
                first_error.get_or_insert(e);
            }
        }
    }

    Err(DecodingError {
        schema: T::NAME,
        source: first_error
            .unwrap_or_else(|| serde_json::Error::custom("no decoding strategy applied")),
    })
}

fn decode_strict<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(text)
}

fn decode_embedded_object<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    match embedded_object(text) {
        Some(slice) => serde_json::from_str(slice),
        None => Err(serde_json::Error::custom("no JSON object delimiters found")),
    }
}

/// Slice from the first `{` through the last `}`, if they are in that order.
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
