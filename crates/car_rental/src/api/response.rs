use car_rental_entity::{car, car_type, client_profile, fine, payment, rental, user};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::rental::pricing::PriceDetails;
use crate::service::account::ClientSummary;
use crate::service::car::{CarFinancialReport, CarRevenue, OccupancyEntry};
use crate::service::rental::RentalStatistics;
use crate::utils::money;

#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_client: bool,
    pub is_superuser: bool,
}

impl From<&user::Model> for UserInfo {
    fn from(value: &user::Model) -> Self {
        UserInfo {
            id: value.id,
            username: value.username.clone(),
            email: value.email.clone(),
            is_client: value.is_client,
            is_superuser: value.is_superuser,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ClientInfo {
    pub id: i32,
    pub user_id: i32,
    pub email: String,
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub is_blocked: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rentals: Option<u64>,
}

impl ClientInfo {
    pub fn new(profile: &client_profile::Model, email: &str) -> Self {
        ClientInfo {
            id: profile.id,
            user_id: profile.user_id,
            email: email.to_string(),
            full_name: profile.full_name.clone(),
            address: profile.address.clone(),
            phone: profile.phone.clone(),
            is_blocked: profile.is_blocked,
            created_at: profile.created_at.clone(),
            total_rentals: None,
        }
    }
}

impl From<ClientSummary> for ClientInfo {
    fn from(value: ClientSummary) -> Self {
        ClientInfo {
            total_rentals: Some(value.total_rentals),
            ..ClientInfo::new(&value.profile, &value.email)
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
    pub client: Option<ClientInfo>,
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserInfo,
    pub client: Option<ClientInfo>,
}

#[derive(Serialize, ToSchema)]
pub struct CarTypeInfo {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<car_type::Model> for CarTypeInfo {
    fn from(value: car_type::Model) -> Self {
        CarTypeInfo {
            id: value.id,
            name: value.name,
            description: value.description,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CarInfo {
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub car_type_id: i32,
    pub year: i32,
    pub daily_price: Decimal,
    pub photo: Option<String>,
    pub description: String,
    pub status: String,
    pub status_display: String,
    pub is_available: bool,
    pub created_at: String,
}

impl From<car::Model> for CarInfo {
    fn from(value: car::Model) -> Self {
        CarInfo {
            is_available: value.is_available(),
            status: value.status.to_string(),
            status_display: value.status.label().to_string(),
            id: value.id,
            brand: value.brand,
            model: value.model,
            car_type_id: value.car_type_id,
            year: value.year,
            daily_price: money::from_cents(value.daily_price_cents),
            photo: value.photo,
            description: value.description,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CatalogCar {
    #[serde(flatten)]
    pub car: CarInfo,
    pub is_busy: bool,
}

#[derive(Serialize, ToSchema)]
pub struct CarDetail {
    #[serde(flatten)]
    pub car: CarInfo,
    pub car_type: CarTypeInfo,
    /// 已完成租赁的次数与收入
    pub total_rentals_count: u64,
    pub total_revenue: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct PriceResponse {
    pub total_cost: Decimal,
    pub deposit: Decimal,
    pub days: i64,
    pub daily_price: Decimal,
    pub details: Option<PriceDetails>,
}

#[derive(Serialize, ToSchema)]
pub struct OccupancyInfo {
    pub car: CarInfo,
    pub status: String,
    pub occupancy_rate: Decimal,
    pub total_rentals: u64,
}

impl From<OccupancyEntry> for OccupancyInfo {
    fn from(value: OccupancyEntry) -> Self {
        OccupancyInfo {
            car: value.car.into(),
            status: value.status.to_string(),
            occupancy_rate: value.occupancy_rate,
            total_rentals: value.total_rentals,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FinancialReportResponse {
    pub car: CarInfo,
    #[serde(flatten)]
    pub report: CarFinancialReport,
}

#[derive(Serialize, ToSchema)]
pub struct TopCarInfo {
    pub car: CarInfo,
    pub revenue: Decimal,
}

impl From<CarRevenue> for TopCarInfo {
    fn from(value: CarRevenue) -> Self {
        TopCarInfo {
            car: value.car.into(),
            revenue: value.revenue,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RentalInfo {
    pub id: i32,
    pub client_id: i32,
    pub car_id: i32,
    pub start_date: NaiveDate,
    pub expected_end_date: NaiveDate,
    pub actual_end_date: Option<NaiveDate>,
    pub deposit: Decimal,
    pub daily_cost: Decimal,
    pub total_cost: Decimal,
    pub status: String,
    pub status_display: String,
    pub damage_level: i32,
    pub late_days: i32,
    pub created_at: String,
    pub updated_at: String,
    pub days_rented: i64,
    pub is_overdue: bool,
}

impl RentalInfo {
    /// 租赁天数与逾期标记都相对 today 计算
    pub fn new(value: rental::Model, today: NaiveDate) -> Self {
        RentalInfo {
            days_rented: value.days_rented(today),
            is_overdue: value.is_overdue(today),
            status: value.status.to_string(),
            status_display: value.status.label().to_string(),
            id: value.id,
            client_id: value.client_id,
            car_id: value.car_id,
            start_date: value.start_date,
            expected_end_date: value.expected_end_date,
            actual_end_date: value.actual_end_date,
            deposit: money::from_cents(value.deposit_cents),
            daily_cost: money::from_cents(value.daily_cost_cents),
            total_cost: money::from_cents(value.total_cost_cents),
            damage_level: value.damage_level,
            late_days: value.late_days,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FineInfo {
    pub id: i32,
    pub reason: String,
    pub amount: Decimal,
    pub created_at: String,
}

impl From<fine::Model> for FineInfo {
    fn from(value: fine::Model) -> Self {
        FineInfo {
            id: value.id,
            reason: value.reason,
            amount: money::from_cents(value.amount_cents),
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaymentInfo {
    pub id: i32,
    pub payment_type: String,
    pub payment_type_display: String,
    pub amount: Decimal,
    pub created_at: String,
}

impl From<payment::Model> for PaymentInfo {
    fn from(value: payment::Model) -> Self {
        PaymentInfo {
            id: value.id,
            payment_type: value.payment_type.to_string(),
            payment_type_display: value.payment_type.label().to_string(),
            amount: money::from_cents(value.amount_cents),
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RentalDetailResponse {
    pub rental: RentalInfo,
    pub car: CarInfo,
    pub client: ClientInfo,
    pub fines: Vec<FineInfo>,
    pub payments: Vec<PaymentInfo>,
    pub days_rented: i64,
}

#[derive(Serialize, ToSchema)]
pub struct CompleteRentalResponse {
    pub rental: RentalInfo,
    pub total_fines: Decimal,
    pub refund: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct ClientDetailResponse {
    pub client: ClientInfo,
    pub rentals: Vec<RentalInfo>,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total_cars: u64,
    pub available_cars: u64,
    pub active_rentals: u64,
    pub total_clients: u64,
    pub monthly_revenue: Decimal,
    pub total_revenue: Decimal,
    pub total_deposits: Decimal,
    pub total_fines: Decimal,
    pub top_cars: Vec<TopCarInfo>,
}

#[derive(Serialize, ToSchema)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct RevenueResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: Decimal,
    pub points: Vec<RevenuePoint>,
}

#[derive(Serialize, ToSchema)]
pub struct RentalStatsResponse {
    #[serde(flatten)]
    pub statistics: RentalStatistics,
    pub average_rental_cost: Decimal,
}
