use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::aggregate_id::parse_uuid;
use crate::domain::common::validation::{ensure_present, ensure_text, IDENTIFICATION_MAX_LEN};
use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata, ValidationError};

pub const NAME_MAX_LEN: usize = 50;
pub const LASTNAME_MAX_LEN: usize = 50;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор клиента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for CustomerId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, ValidationError> {
        parse_uuid(s).map(CustomerId::new)
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Gender
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerGender {
    Male,
    Female,
    Other,
}

impl CustomerGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerGender::Male => "male",
            CustomerGender::Female => "female",
            CustomerGender::Other => "other",
        }
    }
}

impl std::str::FromStr for CustomerGender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(CustomerGender::Male),
            "female" => Ok(CustomerGender::Female),
            "other" => Ok(CustomerGender::Other),
            other => Err(ValidationError::new(
                "gender",
                format!("Unknown gender '{}'", other),
            )),
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Клиент (физическое лицо)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub identification: String,
    pub name: String,
    pub lastname: String,
    pub date_born: NaiveDate,
    pub gender: CustomerGender,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Customer {
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

    pub fn validate_lastname(value: &str) -> Result<(), ValidationError> {
        ensure_text("lastname", "Lastname", value, LASTNAME_MAX_LEN)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.lastname)
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;
    type Create = CreateCustomerDto;
    type Update = UpdateCustomerDto;

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

    fn new_for_insert(dto: CreateCustomerDto) -> Result<Self, ValidationError> {
        let customer = Self {
            id: CustomerId::generate(),
            identification: dto.identification,
            name: dto.name,
            lastname: dto.lastname,
            date_born: dto.date_born,
            gender: dto.gender,
            metadata: EntityMetadata::new(dto.status.unwrap_or_default()),
        };
        customer.validate()?;
        Ok(customer)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Self::validate_identification(&self.identification)?;
        Self::validate_name(&self.name)?;
        Self::validate_lastname(&self.lastname)
    }

    fn validate_update(dto: &UpdateCustomerDto) -> Result<(), ValidationError> {
        if let Some(identification) = &dto.identification {
            Self::validate_identification(identification)?;
        }
        if let Some(name) = &dto.name {
            Self::validate_name(name)?;
        }
        if let Some(lastname) = &dto.lastname {
            Self::validate_lastname(lastname)?;
        }
        Ok(())
    }

    fn requested_identification(dto: &UpdateCustomerDto) -> Option<&str> {
        dto.identification.as_deref()
    }

    fn update(&mut self, dto: &UpdateCustomerDto) -> Result<(), ValidationError> {
        Self::validate_update(dto)?;

        if let Some(identification) = &dto.identification {
            self.identification = identification.clone();
        }
        if let Some(name) = &dto.name {
            self.name = name.clone();
        }
        if let Some(lastname) = &dto.lastname {
            self.lastname = lastname.clone();
        }
        if let Some(date_born) = dto.date_born {
            self.date_born = date_born;
        }
        if let Some(gender) = dto.gender {
            self.gender = gender;
        }
        if let Some(status) = dto.status {
            self.metadata.status = status;
        }
        self.metadata.touch();
        Ok(())
    }

    fn to_create_dto(&self) -> CreateCustomerDto {
        CreateCustomerDto {
            identification: self.identification.clone(),
            name: self.name.clone(),
            lastname: self.lastname.clone(),
            date_born: self.date_born,
            gender: self.gender,
            status: Some(self.metadata.status),
        }
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "customers"
    }

    fn element_name() -> &'static str {
        "Customer"
    }
}

// ============================================================================
// DTOs
// ============================================================================

/// DTO для создания клиента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerDto {
    pub identification: String,
    pub name: String,
    pub lastname: String,
    pub date_born: NaiveDate,
    pub gender: CustomerGender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<crate::domain::common::EntityStatus>,
}

/// DTO для частичного обновления клиента
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCustomerDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_born: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<CustomerGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<crate::domain::common::EntityStatus>,
}
