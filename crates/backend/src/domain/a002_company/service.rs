use contracts::domain::a002_company::aggregate::{Company, CreateCompanyDto};
use contracts::domain::common::EntityStatus;

use crate::domain::common::LifecycleService;
use crate::shared::error::DomainError;

pub type CompanyService = LifecycleService<Company>;

/// Вставка тестовых данных. Existing identifications are skipped.
pub async fn insert_test_data(service: &CompanyService) -> Result<usize, DomainError> {
    let data = vec![
        CreateCompanyDto {
            identification: "900123456-1".into(),
            name: "Andes Logistics S.A.S.".into(),
            alias: "Andes Logistics".into(),
            address: "Carrera 7 # 71-21, Bogotá".into(),
            status: Some(EntityStatus::Active),
        },
        CreateCompanyDto {
            identification: "800987654-3".into(),
            name: "Pacific Foods Ltda.".into(),
            alias: "Pacific Foods".into(),
            address: "Avenida 6N # 23-45, Cali".into(),
            status: None,
        },
        CreateCompanyDto {
            identification: "901555888-7".into(),
            name: "Caribe Tech Partners".into(),
            alias: "CaribeTech".into(),
            address: "Calle 84 # 52-10, Barranquilla".into(),
            status: None,
        },
    ];

    let mut created = 0;
    for dto in data {
        match service.create(dto).await {
            Ok(_) => created += 1,
            Err(DomainError::Conflict { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(created)
}
