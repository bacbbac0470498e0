//! Permissive text-to-value conversion.
//!
//! Stages, tried in order:
//! 1. empty input: success, target untouched
//! 2. primitive target: parsed directly (`String` takes the text verbatim)
//! 3. JSON decode of the text
//! 4. JSON decode of the text wrapped in quotes, so `abc` fills a type that
//!    expects the JSON string `"abc"`
//!
//! When the last stage fails the error from stage 3 is returned.

use serde::de::DeserializeOwned;
use std::any::Any;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("cannot parse {value:?} as {target}: {reason}")]
    Primitive {
        value: String,
        target: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Fill `target` from `raw` using the staged fallback.
pub fn unmarshal_into<T>(raw: &str, target: &mut T) -> Result<(), ConversionError>
where
    T: DeserializeOwned + 'static,
{
    if raw.is_empty() {
        return Ok(());
    }
    if let Some(result) = unmarshal_primitive(raw, target) {
        return result;
    }
    match serde_json::from_str::<T>(raw) {
        Ok(value) => {
            *target = value;
            Ok(())
        }
        Err(first) => match serde_json::from_str::<T>(&format!("\"{raw}\"")) {
            Ok(value) => {
                *target = value;
                Ok(())
            }
            Err(_) => Err(first.into()),
        },
    }
}

macro_rules! parse_primitive {
    ($target:ident, $raw:ident, $($ty:ty),+ $(,)?) => {
        $(
            if let Some(slot) = $target.downcast_mut::<$ty>() {
                return Some(
                    $raw.parse::<$ty>()
                        .map(|value| *slot = value)
                        .map_err(|e| ConversionError::Primitive {
                            value: $raw.to_string(),
                            target: stringify!($ty),
                            reason: e.to_string(),
                        }),
                );
            }
        )+
    };
}

/// `None` when the target is not a primitive type.
fn unmarshal_primitive(raw: &str, target: &mut dyn Any) -> Option<Result<(), ConversionError>> {
    if let Some(slot) = target.downcast_mut::<String>() {
        *slot = raw.to_string();
        return Some(Ok(()));
    }
    parse_primitive!(
        target, raw, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    );
    None
}
