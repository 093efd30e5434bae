pub mod cube;
pub mod service;
