pub mod prelude;

pub mod car;
pub mod car_type;
pub mod client_profile;
pub mod fine;
pub mod payment;
pub mod rental;
pub mod user;
