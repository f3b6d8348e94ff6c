//! Message envelope shared by all modules
//!
//! Concrete messages travel as a type name plus a bincode body. The type
//! name selects the decoder; anything not registered by a module is
//! rejected as unrecognized.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SortilegeError;
use crate::traits::SortilegeResult;
use crate::types::Address;

/// Type-tagged message envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedMessage {
    pub type_name: String,
    pub body: Vec<u8>,
}

impl TypedMessage {
    /// Wrap a concrete message under its registered type name
    pub fn encode<T: Serialize>(type_name: &str, msg: &T) -> SortilegeResult<Self> {
        Ok(Self {
            type_name: type_name.to_string(),
            body: bincode::serialize(msg)?,
        })
    }

    /// Decode the body as a concrete message
    pub fn decode_body<T: DeserializeOwned>(&self) -> SortilegeResult<T> {
        bincode::deserialize(&self.body).map_err(|e| {
            SortilegeError::DeserializationError(format!("{}: {}", self.type_name, e))
        })
    }

    /// Module route, the part of the type name before the `/`
    pub fn route(&self) -> &str {
        self.type_name
            .split_once('/')
            .map(|(route, _)| route)
            .unwrap_or(&self.type_name)
    }

    pub fn to_bytes(&self) -> SortilegeResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> SortilegeResult<Self> {
        bincode::deserialize(bytes).map_err(|e| SortilegeError::DeserializationError(e.to_string()))
    }
}

/// Common surface of module messages
pub trait ModuleMessage: Sized {
    /// Registered type name, `route/kind`
    fn type_name(&self) -> &'static str;

    /// Address that must have authorised the message
    fn signer(&self) -> Address;

    /// Wrap into the envelope
    fn to_typed(&self) -> SortilegeResult<TypedMessage>;

    /// Decode from the envelope, `UnrecognizedMessage` for unknown type names
    fn from_typed(msg: &TypedMessage) -> SortilegeResult<Self>;
}
