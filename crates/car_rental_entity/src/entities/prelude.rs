pub use super::car::Entity as Car;
pub use super::car_type::Entity as CarType;
pub use super::client_profile::Entity as ClientProfile;
pub use super::fine::Entity as Fine;
pub use super::payment::Entity as Payment;
pub use super::rental::Entity as Rental;
pub use super::user::Entity as User;
