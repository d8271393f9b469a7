pub mod factory;
pub mod fines;
pub mod pricing;
