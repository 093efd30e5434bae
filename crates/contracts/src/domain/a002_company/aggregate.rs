use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::aggregate_id::parse_uuid;
use crate::domain::common::validation::{ensure_present, ensure_text, IDENTIFICATION_MAX_LEN};
use crate::domain::common::{
    AggregateId, AggregateRoot, EntityMetadata, EntityStatus, ValidationError,
};

pub const NAME_MAX_LEN: usize = 50;
pub const ALIAS_MAX_LEN: usize = 100;
pub const ADDRESS_MAX_LEN: usize = 250;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор компании
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub Uuid);

impl CompanyId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for CompanyId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, ValidationError> {
        parse_uuid(s).map(CompanyId::new)
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Компания (партнёр)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub identification: String,
    pub name: String,
    /// Короткое отображаемое имя
    pub alias: String,
    pub address: String,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Company {
    pub fn validate_identification(value: &str) -> Result<(), ValidationError> {
        ensure_present(
            "identification",
            "Identification",
            value,
            IDENTIFICATION_MAX_LEN,
        )
    }

    pub fn validate_name(value: &str) -> Result<(), ValidationError> {
        ensure_text("name", "Name", value, NAME_MAX_LEN)
    }

    pub fn validate_alias(value: &str) -> Result<(), ValidationError> {
        ensure_text("alias", "Alias", value, ALIAS_MAX_LEN)
    }

    pub fn validate_address(value: &str) -> Result<(), ValidationError> {
        ensure_text("address", "Address", value, ADDRESS_MAX_LEN)
    }

    pub fn display_name(&self) -> &str {
        if self.alias.trim().is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }
}

impl AggregateRoot for Company {
    type Id = CompanyId;
    type Create = CreateCompanyDto;
    type Update = UpdateCompanyDto;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn identification(&self) -> &str {
        &self.identification
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn new_for_insert(dto: CreateCompanyDto) -> Result<Self, ValidationError> {
        let company = Self {
            id: CompanyId::generate(),
            identification: dto.identification,
            name: dto.name,
            alias: dto.alias,
            address: dto.address,
            metadata: EntityMetadata::new(dto.status.unwrap_or_default()),
        };
        company.validate()?;
        Ok(company)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Self::validate_identification(&self.identification)?;
        Self::validate_name(&self.name)?;
        Self::validate_alias(&self.alias)?;
        Self::validate_address(&self.address)
    }

    fn validate_update(dto: &UpdateCompanyDto) -> Result<(), ValidationError> {
        if let Some(identification) = &dto.identification {
            Self::validate_identification(identification)?;
        }
        if let Some(name) = &dto.name {
            Self::validate_name(name)?;
        }
        if let Some(alias) = &dto.alias {
            Self::validate_alias(alias)?;
        }
        if let Some(address) = &dto.address {
            Self::validate_address(address)?;
        }
        Ok(())
    }

    fn requested_identification(dto: &UpdateCompanyDto) -> Option<&str> {
        dto.identification.as_deref()
    }

    fn update(&mut self, dto: &UpdateCompanyDto) -> Result<(), ValidationError> {
        Self::validate_update(dto)?;

        if let Some(identification) = &dto.identification {
            self.identification = identification.clone();
        }
        if let Some(name) = &dto.name {
            self.name = name.clone();
        }
        if let Some(alias) = &dto.alias {
            self.alias = alias.clone();
        }
        if let Some(address) = &dto.address {
            self.address = address.clone();
        }
        if let Some(status) = dto.status {
            self.metadata.status = status;
        }
        self.metadata.touch();
        Ok(())
    }

    fn to_create_dto(&self) -> CreateCompanyDto {
        CreateCompanyDto {
            identification: self.identification.clone(),
            name: self.name.clone(),
            alias: self.alias.clone(),
            address: self.address.clone(),
            status: Some(self.metadata.status),
        }
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "companies"
    }

    fn element_name() -> &'static str {
        "Company"
    }
}

// ============================================================================
// DTOs
// ============================================================================

/// DTO для создания компании
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyDto {
    pub identification: String,
    pub name: String,
    pub alias: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
}

/// DTO для частичного обновления компании
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCompanyDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dto() -> CreateCompanyDto {
        CreateCompanyDto {
            identification: "900123456".into(),
            name: "Acme Holdings".into(),
            alias: "Acme".into(),
            address: "1 Main Street".into(),
            status: Some(EntityStatus::Active),
        }
    }

    #[test]
    fn test_new_for_insert_keeps_requested_status() {
        let company = Company::new_for_insert(sample_dto()).unwrap();
        assert_eq!(company.status(), EntityStatus::Active);
        assert_eq!(company.display_name(), "Acme");
    }

    #[test]
    fn test_address_limit() {
        let mut dto = sample_dto();
        dto.address = "a".repeat(250);
        assert!(Company::new_for_insert(dto.clone()).is_ok());

        dto.address = "a".repeat(251);
        let err = Company::new_for_insert(dto).unwrap_err();
        assert_eq!(err.field, "address");
        assert_eq!(err.message, "Address must not exceed 250 characters");
    }

    #[test]
    fn test_empty_identification_rejected() {
        let mut dto = sample_dto();
        dto.identification = String::new();
        let err = Company::new_for_insert(dto).unwrap_err();
        assert_eq!(err.message, "Identification is required");
    }

    #[test]
    fn test_soft_delete_and_restore() {
        let mut company = Company::new_for_insert(sample_dto()).unwrap();
        company.soft_delete();
        assert!(company.is_deleted());
        assert_eq!(company.status(), EntityStatus::Inactive);

        company.restore();
        assert!(!company.is_deleted());
        assert_eq!(company.status(), EntityStatus::Active);
    }

    #[test]
    fn test_failed_update_leaves_company_untouched() {
        let mut company = Company::new_for_insert(sample_dto()).unwrap();
        let before = company.clone();
        let dto = UpdateCompanyDto {
            identification: Some("NEW-ID".into()),
            alias: Some("   ".into()),
            ..Default::default()
        };
        assert!(company.update(&dto).is_err());
        assert_eq!(company, before);
    }
}
