pub mod custom_type;
pub mod entities;

pub use entities::*;
