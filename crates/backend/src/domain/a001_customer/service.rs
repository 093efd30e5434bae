use chrono::NaiveDate;
use contracts::domain::a001_customer::aggregate::{CreateCustomerDto, Customer, CustomerGender};
use contracts::domain::common::EntityStatus;

use crate::domain::common::LifecycleService;
use crate::shared::error::DomainError;

pub type CustomerService = LifecycleService<Customer>;

/// Вставка тестовых данных. Records whose identification already exists
/// are skipped; returns the number of created records.
pub async fn insert_test_data(service: &CustomerService) -> Result<usize, DomainError> {
    let data = vec![
        ("12345678901", "John", "Doe", (1990, 1, 15), CustomerGender::Male, Some(EntityStatus::Active)),
        ("23456789012", "Jane", "Smith", (1985, 3, 20), CustomerGender::Female, None),
        ("34567890123", "Bob", "Johnson", (1992, 7, 10), CustomerGender::Male, None),
    ];

    let mut created = 0;
    for (identification, name, lastname, (y, m, d), gender, status) in data {
        let date_born = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| {
            DomainError::Internal(format!("invalid seed date {}-{}-{}", y, m, d))
        })?;
        let dto = CreateCustomerDto {
            identification: identification.into(),
            name: name.into(),
            lastname: lastname.into(),
            date_born,
            gender,
            status,
        };
        match service.create(dto).await {
            Ok(_) => created += 1,
            Err(DomainError::Conflict { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(created)
}
