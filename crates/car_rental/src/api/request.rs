use car_rental_entity::custom_type::CarStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::service::account::{ProfileUpdate, RegisterClient};
use crate::service::car::{CarFilter, CarInput, CatalogQuery};
use crate::service::rental::{CompleteRental, NewRental};

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub full_name: String,
    #[serde(default)]
    pub address: String,
    pub phone: String,
}

impl From<RegisterRequest> for RegisterClient {
    fn from(value: RegisterRequest) -> Self {
        RegisterClient {
            email: value.email,
            password: value.password,
            password_confirm: value.password_confirm,
            full_name: value.full_name,
            address: value.address,
            phone: value.phone,
        }
    }
}

/// login 可以是用户名或邮箱
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    pub login: String,
    pub password: String,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct CatalogRequest {
    pub brand: Option<String>,
    #[param(value_type = Option<String>)]
    pub price_from: Option<Decimal>,
    #[param(value_type = Option<String>)]
    pub price_to: Option<Decimal>,
    #[param(value_type = Option<String>)]
    pub status: Option<CarStatus>,
    pub rental_start_date: Option<NaiveDate>,
    pub rental_end_date: Option<NaiveDate>,
}

impl From<CatalogRequest> for CatalogQuery {
    fn from(value: CatalogRequest) -> Self {
        CatalogQuery {
            filter: CarFilter {
                brand: value.brand,
                price_from: value.price_from,
                price_to: value.price_to,
                status: value.status,
            },
            rental_start_date: value.rental_start_date,
            rental_end_date: value.rental_end_date,
        }
    }
}

/// 报价与按日期查询空闲车辆共用的日期参数
#[derive(Deserialize, IntoParams)]
pub struct PriceRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct CarRequest {
    pub brand: String,
    pub model: String,
    pub car_type_id: Option<i32>,
    pub new_car_type: Option<String>,
    pub year: i32,
    #[schema(value_type = String)]
    pub daily_price: Decimal,
    pub photo: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub status: Option<CarStatus>,
}

impl From<CarRequest> for CarInput {
    fn from(value: CarRequest) -> Self {
        CarInput {
            brand: value.brand,
            model: value.model,
            car_type_id: value.car_type_id,
            new_car_type: value.new_car_type,
            year: value.year,
            daily_price: value.daily_price,
            photo: value.photo,
            description: value.description,
            status: value.status.unwrap_or(CarStatus::Available),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CarTypeRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct RentalsRequest {
    /// pending、active、completed、overdue 或 cancelled
    pub status: Option<String>,
    pub client_id: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateRentalRequest {
    #[serde(alias = "car_id")]
    pub car: i32,
    pub start_date: NaiveDate,
    pub expected_end_date: NaiveDate,
    /// standard、seasonal、weekend、long_term、by_year 或 combined
    pub strategy: Option<String>,
}

impl From<CreateRentalRequest> for NewRental {
    fn from(value: CreateRentalRequest) -> Self {
        NewRental {
            car_id: value.car,
            start_date: value.start_date,
            end_date: value.expected_end_date,
            strategy: value.strategy,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CompleteRentalRequest {
    pub actual_end_date: NaiveDate,
    #[serde(default)]
    pub damage_level: i32,
    #[serde(default)]
    pub late_days: i32,
}

impl From<CompleteRentalRequest> for CompleteRental {
    fn from(value: CompleteRentalRequest) -> Self {
        CompleteRental {
            actual_end_date: value.actual_end_date,
            damage_level: value.damage_level,
            late_days: value.late_days,
        }
    }
}

#[derive(Deserialize, IntoParams, Default)]
pub struct ClientsRequest {
    pub search: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub full_name: String,
    #[serde(default)]
    pub address: String,
    pub phone: String,
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(value: ProfileRequest) -> Self {
        ProfileUpdate {
            full_name: value.full_name,
            address: value.address,
            phone: value.phone,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AdminClientRequest {
    pub full_name: String,
    #[serde(default)]
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub is_blocked: bool,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct RevenueRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
