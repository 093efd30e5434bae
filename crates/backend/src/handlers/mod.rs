pub mod a001_customer;
pub mod a002_company;
pub mod error;
pub mod extract;
pub mod health;
pub mod reports;
