//! LocalStorage JSON persistence

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No LocalStorage (native build, private mode, sandboxed iframe)
    Unavailable,
    /// Browser refused the read or write (quota, permissions)
    Access,
    Serialize(String),
    Deserialize(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "local storage unavailable"),
            StorageError::Access => write!(f, "local storage access denied"),
            StorageError::Serialize(e) => write!(f, "serialize failed: {e}"),
            StorageError::Deserialize(e) => write!(f, "deserialize failed: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Decode a stored payload
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T, StorageError> {
    serde_json::from_str(json).map_err(|e| StorageError::Deserialize(e.to_string()))
}

/// Encode a payload for storage
pub fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialize(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or(StorageError::Unavailable)?
        .local_storage()
        .map_err(|_| StorageError::Access)?
        .ok_or(StorageError::Unavailable)
}

/// Load `key`; `Ok(None)` if nothing is stored
#[cfg(target_arch = "wasm32")]
pub fn load_json<T: DeserializeOwned>(key: &str) -> Result<Option<T>, StorageError> {
    let storage = local_storage()?;
    match storage.get_item(key).map_err(|_| StorageError::Access)? {
        Some(json) => decode(&json).map(Some),
        None => Ok(None),
    }
}

#[cfg(target_arch = "wasm32")]
pub fn save_json<T: Serialize>(key: &str, value: &T) -> Result<(), StorageError> {
    let json = encode(value)?;
    local_storage()?
        .set_item(key, &json)
        .map_err(|_| StorageError::Access)
}

/// Native builds have no LocalStorage
#[cfg(not(target_arch = "wasm32"))]
pub fn load_json<T: DeserializeOwned>(_key: &str) -> Result<Option<T>, StorageError> {
    Err(StorageError::Unavailable)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_json<T: Serialize>(_key: &str, _value: &T) -> Result<(), StorageError> {
    Err(StorageError::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_garbage() {
        let err = decode::<Vec<u32>>("{not json").unwrap_err();
        assert!(matches!(err, StorageError::Deserialize(_)));
    }

    #[test]
    fn test_encode_decode() {
        let json = encode(&vec![3u32, 1, 2]).unwrap();
        assert_eq!(decode::<Vec<u32>>(&json).unwrap(), vec![3, 1, 2]);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_is_unavailable() {
        assert_eq!(load_json::<u32>("k"), Err(StorageError::Unavailable));
        assert_eq!(save_json("k", &1u32), Err(StorageError::Unavailable));
        assert_eq!(StorageError::Unavailable.to_string(), "local storage unavailable");
    }
}
