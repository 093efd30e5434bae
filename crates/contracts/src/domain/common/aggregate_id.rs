use serde::{de::DeserializeOwned, Serialize};
use std::hash::Hash;

use super::ValidationError;

/// Трейт для типов идентификаторов агрегатов
pub trait AggregateId:
    Clone
    + Copy
    + PartialEq
    + Eq
    + Hash
    + Serialize
    + DeserializeOwned
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
{
    /// Сгенерировать новый ID
    fn generate() -> Self;

    /// Преобразовать ID в строку
    fn as_string(&self) -> String;

    /// Создать ID из строки
    fn from_string(s: &str) -> Result<Self, ValidationError>;
}

pub(crate) fn parse_uuid(s: &str) -> Result<uuid::Uuid, ValidationError> {
    uuid::Uuid::parse_str(s.trim())
        .map_err(|e| ValidationError::new("id", format!("Invalid UUID: {}", e)))
}
