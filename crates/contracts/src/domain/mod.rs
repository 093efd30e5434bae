pub mod a001_customer;
pub mod a002_company;
pub mod common;
