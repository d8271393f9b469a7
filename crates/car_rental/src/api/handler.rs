use std::sync::Arc;

use axum::extract::Extension;
use car_rental_entity::custom_type::RentalStatus;
use car_rental_entity::rental;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::info;
use utoipa::OpenApi;

use crate::api::auth::{CurrentUser, OpenAPIAuth};
use crate::api::error::InnerApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::request::{
    AdminClientRequest, CarRequest, CarTypeRequest, CatalogRequest, ClientsRequest, CompleteRentalRequest,
    CreateRentalRequest, LoginRequest, PriceRequest, ProfileRequest, RegisterRequest, RentalsRequest,
    RevenueRequest,
};
use crate::api::response::{
    AuthResponse, CarDetail, CarInfo, CarTypeInfo, CatalogCar, ClientDetailResponse, ClientInfo,
    CompleteRentalResponse, DashboardResponse, FinancialReportResponse, MeResponse, OccupancyInfo, PriceResponse,
    RentalDetailResponse, RentalInfo, RentalStatsResponse, RevenuePoint, RevenueResponse,
};
use crate::api::wrapper::{ApiError, ApiResponse};
use crate::auth::SessionStore;
use crate::config::RentalPolicy;
use crate::service::account::{self, Account};
use crate::service::car::CatalogQuery;
use crate::service::rental::{self as rental_service, RentalDetail, RentalFilter};
use crate::service::{car as car_service, car_type as car_type_service, statistics};
use crate::utils::time_format::today;

#[derive(OpenApi)]
#[openapi(
    paths(register, login, logout, me, get_cars, get_available_cars, get_car, get_car_price, get_occupancy, get_financial_report, create_car, update_car, delete_car, get_car_types, create_car_type, update_car_type, delete_car_type, get_rentals, create_rental, get_rental, complete_rental, cancel_rental, get_clients, get_client, update_my_profile, update_client, delete_client, get_dashboard, get_revenue, get_rental_statistics),
    modifiers(&OpenAPIAuth),
    security(
        ("Token" = []),
    )
)]
pub struct ApiDoc;

fn me_response(account: &Account) -> MeResponse {
    MeResponse {
        user: (&account.user).into(),
        client: account
            .profile
            .as_ref()
            .map(|profile| ClientInfo::new(profile, &account.user.email)),
    }
}

fn auth_response(token: String, account: &Account) -> AuthResponse {
    let MeResponse { user, client } = me_response(account);
    AuthResponse { token, user, client }
}

fn rental_detail_response(value: RentalDetail, today: NaiveDate) -> RentalDetailResponse {
    RentalDetailResponse {
        client: ClientInfo::new(&value.client, &value.client_email),
        rental: RentalInfo::new(value.rental, today),
        car: value.car.into(),
        fines: value.fines.into_iter().map(Into::into).collect(),
        payments: value.payments.into_iter().map(Into::into).collect(),
        days_rented: value.days_rented,
    }
}

fn rental_infos(rentals: Vec<rental::Model>, today: NaiveDate) -> Vec<RentalInfo> {
    rentals.into_iter().map(|rental| RentalInfo::new(rental, today)).collect()
}

/// 客户只能看到自己的租赁，其他人的租赁按不存在处理
async fn visible_rental(db: &DatabaseConnection, current: &CurrentUser, id: i32) -> Result<(), ApiError> {
    let rental = rental_service::find_rental(db, id).await?;
    if current.is_admin() {
        return Ok(());
    }
    match current.account.client_profile() {
        Some(profile) if profile.id == rental.client_id => Ok(()),
        _ => Err(InnerApiError::NotFound(id).into()),
    }
}

/// 注册新客户并直接登录
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, body = ApiResponse<AuthResponse>),
    ),
    security(())
)]
pub async fn register(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(sessions): Extension<SessionStore>,
    Extension(policy): Extension<Arc<RentalPolicy>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    let account = account::register_client(db.as_ref(), request.into(), policy.as_ref()).await?;
    let token = sessions.issue(account.user.id);
    Ok(ApiResponse::created(auth_response(token, &account)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, body = ApiResponse<AuthResponse>),
    ),
    security(())
)]
pub async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(sessions): Extension<SessionStore>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    let account = account::authenticate(db.as_ref(), &request.login, &request.password).await?;
    let token = sessions.issue(account.user.id);
    info!("用户 {} 登录成功", account.user.username);
    Ok(ApiResponse::ok(auth_response(token, &account)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, body = ApiResponse<bool>),
    )
)]
pub async fn logout(
    Extension(sessions): Extension<SessionStore>,
    current: CurrentUser,
) -> Result<ApiResponse<bool>, ApiError> {
    Ok(ApiResponse::ok(sessions.revoke(&current.token)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, body = ApiResponse<MeResponse>),
    )
)]
pub async fn me(current: CurrentUser) -> Result<ApiResponse<MeResponse>, ApiError> {
    Ok(ApiResponse::ok(me_response(&current.account)))
}

/// 车辆目录，给出租赁日期时会标记已被占用的车辆
#[utoipa::path(
    get,
    path = "/api/cars",
    params(
        CatalogRequest,
    ),
    responses(
        (status = 200, body = ApiResponse<Vec<CatalogCar>>),
    ),
    security(())
)]
pub async fn get_cars(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ApiQuery(params): ApiQuery<CatalogRequest>,
) -> Result<ApiResponse<Vec<CatalogCar>>, ApiError> {
    let entries = car_service::catalog(db.as_ref(), &params.into(), today()).await?;
    Ok(ApiResponse::ok(
        entries
            .into_iter()
            .map(|entry| CatalogCar {
                car: entry.car.into(),
                is_busy: entry.is_busy,
            })
            .collect(),
    ))
}

/// 不带日期时按车辆状态筛选，带日期时返回该时段内没有被占用的车辆
#[utoipa::path(
    get,
    path = "/api/cars/available",
    params(
        PriceRequest,
    ),
    responses(
        (status = 200, body = ApiResponse<Vec<CarInfo>>),
    )
)]
pub async fn get_available_cars(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ApiQuery(params): ApiQuery<PriceRequest>,
    _current: CurrentUser,
) -> Result<ApiResponse<Vec<CarInfo>>, ApiError> {
    let cars = match (params.start_date, params.end_date) {
        (Some(start), Some(end)) => {
            let query = CatalogQuery {
                rental_start_date: Some(start),
                rental_end_date: Some(end),
                ..Default::default()
            };
            car_service::validate_catalog_query(&query, today())?;
            car_service::cars_available_for_dates(db.as_ref(), start, end).await?
        }
        _ => car_service::available_cars(db.as_ref()).await?,
    };
    Ok(ApiResponse::ok(cars.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<CarDetail>),
    ),
    security(())
)]
pub async fn get_car(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<CarDetail>, ApiError> {
    let car = car_service::find_car(db.as_ref(), id).await?;
    let car_type = car_type_service::find_car_type(db.as_ref(), car.car_type_id).await?;
    let totals = car_service::car_totals(db.as_ref(), id).await?;
    Ok(ApiResponse::ok(CarDetail {
        car: car.into(),
        car_type: car_type.into(),
        total_rentals_count: totals.total_rentals_count,
        total_revenue: totals.total_revenue,
    }))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}/price",
    params(
        ("id" = i32, Path),
        PriceRequest,
    ),
    responses(
        (status = 200, body = ApiResponse<PriceResponse>),
    ),
    security(())
)]
pub async fn get_car_price(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(policy): Extension<Arc<RentalPolicy>>,
    ApiQuery(params): ApiQuery<PriceRequest>,
) -> Result<ApiResponse<PriceResponse>, ApiError> {
    let (Some(start), Some(end)) = (params.start_date, params.end_date) else {
        return Err(InnerApiError::BadRequest("Missing dates".to_string()).into());
    };
    let quote = car_service::price_quote(db.as_ref(), id, start, end, today(), policy.as_ref()).await?;
    Ok(ApiResponse::ok(PriceResponse {
        total_cost: quote.total_cost,
        deposit: quote.deposit,
        days: quote.days,
        daily_price: quote.daily_price,
        details: quote.details,
    }))
}

#[utoipa::path(
    get,
    path = "/api/cars/occupancy",
    responses(
        (status = 200, body = ApiResponse<Vec<OccupancyInfo>>),
    )
)]
pub async fn get_occupancy(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(policy): Extension<Arc<RentalPolicy>>,
    current: CurrentUser,
) -> Result<ApiResponse<Vec<OccupancyInfo>>, ApiError> {
    current.require_admin()?;
    let report = car_service::occupancy_report(db.as_ref(), today(), policy.as_ref()).await?;
    Ok(ApiResponse::ok(report.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}/financial-report",
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<FinancialReportResponse>),
    )
)]
pub async fn get_financial_report(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(policy): Extension<Arc<RentalPolicy>>,
    current: CurrentUser,
) -> Result<ApiResponse<FinancialReportResponse>, ApiError> {
    current.require_admin()?;
    let car = car_service::find_car(db.as_ref(), id).await?;
    let report = car_service::financial_report(db.as_ref(), id, today(), policy.as_ref()).await?;
    Ok(ApiResponse::ok(FinancialReportResponse {
        car: car.into(),
        report,
    }))
}

#[utoipa::path(
    post,
    path = "/api/cars",
    request_body = CarRequest,
    responses(
        (status = 201, body = ApiResponse<CarInfo>),
    )
)]
pub async fn create_car(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
    ApiJson(request): ApiJson<CarRequest>,
) -> Result<ApiResponse<CarInfo>, ApiError> {
    current.require_admin()?;
    let car = car_service::create_car(db.as_ref(), request.into()).await?;
    Ok(ApiResponse::created(car.into()))
}

#[utoipa::path(
    put,
    path = "/api/cars/{id}",
    request_body = CarRequest,
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<CarInfo>),
    )
)]
pub async fn update_car(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
    ApiJson(request): ApiJson<CarRequest>,
) -> Result<ApiResponse<CarInfo>, ApiError> {
    current.require_admin()?;
    let car = car_service::update_car(db.as_ref(), id, request.into()).await?;
    Ok(ApiResponse::ok(car.into()))
}

#[utoipa::path(
    delete,
    path = "/api/cars/{id}",
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<i32>),
    )
)]
pub async fn delete_car(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
) -> Result<ApiResponse<i32>, ApiError> {
    current.require_admin()?;
    car_service::delete_car(db.as_ref(), id).await?;
    Ok(ApiResponse::ok(id))
}

#[utoipa::path(
    get,
    path = "/api/car-types",
    responses(
        (status = 200, body = ApiResponse<Vec<CarTypeInfo>>),
    )
)]
pub async fn get_car_types(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    _current: CurrentUser,
) -> Result<ApiResponse<Vec<CarTypeInfo>>, ApiError> {
    let types = car_type_service::list_car_types(db.as_ref()).await?;
    Ok(ApiResponse::ok(types.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/car-types",
    request_body = CarTypeRequest,
    responses(
        (status = 201, body = ApiResponse<CarTypeInfo>),
    )
)]
pub async fn create_car_type(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
    ApiJson(request): ApiJson<CarTypeRequest>,
) -> Result<ApiResponse<CarTypeInfo>, ApiError> {
    current.require_admin()?;
    let created = car_type_service::create_car_type(db.as_ref(), &request.name, &request.description).await?;
    Ok(ApiResponse::created(created.into()))
}

#[utoipa::path(
    put,
    path = "/api/car-types/{id}",
    request_body = CarTypeRequest,
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<CarTypeInfo>),
    )
)]
pub async fn update_car_type(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
    ApiJson(request): ApiJson<CarTypeRequest>,
) -> Result<ApiResponse<CarTypeInfo>, ApiError> {
    current.require_admin()?;
    let updated = car_type_service::update_car_type(db.as_ref(), id, &request.name, &request.description).await?;
    Ok(ApiResponse::ok(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/car-types/{id}",
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<i32>),
    )
)]
pub async fn delete_car_type(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
) -> Result<ApiResponse<i32>, ApiError> {
    current.require_admin()?;
    car_type_service::delete_car_type(db.as_ref(), id).await?;
    Ok(ApiResponse::ok(id))
}

/// 列表前先刷新逾期状态；客户只能看到自己的租赁
#[utoipa::path(
    get,
    path = "/api/rentals",
    params(
        RentalsRequest,
    ),
    responses(
        (status = 200, body = ApiResponse<Vec<RentalInfo>>),
    )
)]
pub async fn get_rentals(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ApiQuery(params): ApiQuery<RentalsRequest>,
    current: CurrentUser,
) -> Result<ApiResponse<Vec<RentalInfo>>, ApiError> {
    let today = today();
    rental_service::update_overdue_rentals(db.as_ref(), today).await?;

    let rentals = if current.is_admin() {
        let status = match params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<RentalStatus>()
                    .map_err(|_| InnerApiError::BadRequest(format!("Unknown rental status '{raw}'")))?,
            ),
            None => None,
        };
        let filter = RentalFilter {
            status,
            client_id: params.client_id,
        };
        rental_service::list_rentals(db.as_ref(), &filter, today).await?
    } else {
        let profile = current.require_client()?;
        rental_service::client_rentals(db.as_ref(), profile.id).await?
    };
    Ok(ApiResponse::ok(rental_infos(rentals, today)))
}

#[utoipa::path(
    post,
    path = "/api/rentals",
    request_body = CreateRentalRequest,
    responses(
        (status = 201, body = ApiResponse<RentalInfo>),
    )
)]
pub async fn create_rental(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(policy): Extension<Arc<RentalPolicy>>,
    current: CurrentUser,
    ApiJson(request): ApiJson<CreateRentalRequest>,
) -> Result<ApiResponse<RentalInfo>, ApiError> {
    let profile = current.require_client()?;
    let today = today();
    let rental = rental_service::create_rental(db.as_ref(), profile, request.into(), today, policy.as_ref()).await?;
    Ok(ApiResponse::created(RentalInfo::new(rental, today)))
}

#[utoipa::path(
    get,
    path = "/api/rentals/{id}",
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<RentalDetailResponse>),
    )
)]
pub async fn get_rental(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
) -> Result<ApiResponse<RentalDetailResponse>, ApiError> {
    visible_rental(db.as_ref(), &current, id).await?;
    let today = today();
    let detail = rental_service::rental_detail(db.as_ref(), id, today).await?;
    Ok(ApiResponse::ok(rental_detail_response(detail, today)))
}

#[utoipa::path(
    post,
    path = "/api/rentals/{id}/complete",
    request_body = CompleteRentalRequest,
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<CompleteRentalResponse>),
    )
)]
pub async fn complete_rental(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(policy): Extension<Arc<RentalPolicy>>,
    current: CurrentUser,
    ApiJson(request): ApiJson<CompleteRentalRequest>,
) -> Result<ApiResponse<CompleteRentalResponse>, ApiError> {
    current.require_admin()?;
    let today = today();
    let completed = rental_service::complete_rental(db.as_ref(), id, request.into(), today, policy.as_ref()).await?;
    Ok(ApiResponse::ok(CompleteRentalResponse {
        rental: RentalInfo::new(completed.rental, today),
        total_fines: completed.total_fines,
        refund: completed.refund,
    }))
}

#[utoipa::path(
    post,
    path = "/api/rentals/{id}/cancel",
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<RentalInfo>),
    )
)]
pub async fn cancel_rental(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
) -> Result<ApiResponse<RentalInfo>, ApiError> {
    visible_rental(db.as_ref(), &current, id).await?;
    let cancelled = rental_service::cancel_rental(db.as_ref(), id).await?;
    Ok(ApiResponse::ok(RentalInfo::new(cancelled, today())))
}

#[utoipa::path(
    get,
    path = "/api/clients",
    params(
        ClientsRequest,
    ),
    responses(
        (status = 200, body = ApiResponse<Vec<ClientInfo>>),
    )
)]
pub async fn get_clients(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ApiQuery(params): ApiQuery<ClientsRequest>,
    current: CurrentUser,
) -> Result<ApiResponse<Vec<ClientInfo>>, ApiError> {
    if !current.is_admin() {
        let profile = current.require_client()?;
        return Ok(ApiResponse::ok(vec![ClientInfo::new(profile, &current.user().email)]));
    }
    let clients = account::list_clients(db.as_ref(), params.search.as_deref()).await?;
    Ok(ApiResponse::ok(clients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<ClientDetailResponse>),
    )
)]
pub async fn get_client(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
) -> Result<ApiResponse<ClientDetailResponse>, ApiError> {
    if !current.is_admin() && current.require_client()?.id != id {
        return Err(InnerApiError::Forbidden("You can only view your own profile".to_string()).into());
    }
    let (profile, user) = account::find_client(db.as_ref(), id).await?;
    let rentals = rental_service::client_rentals(db.as_ref(), profile.id).await?;
    Ok(ApiResponse::ok(ClientDetailResponse {
        client: ClientInfo {
            total_rentals: Some(rentals.len() as u64),
            ..ClientInfo::new(&profile, &user.email)
        },
        rentals: rental_infos(rentals, today()),
    }))
}

#[utoipa::path(
    put,
    path = "/api/clients/me",
    request_body = ProfileRequest,
    responses(
        (status = 200, body = ApiResponse<ClientInfo>),
    )
)]
pub async fn update_my_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
    ApiJson(request): ApiJson<ProfileRequest>,
) -> Result<ApiResponse<ClientInfo>, ApiError> {
    let client_id = current.require_client()?.id;
    let profile = account::update_profile(db.as_ref(), client_id, request.into()).await?;
    Ok(ApiResponse::ok(ClientInfo::new(&profile, &current.user().email)))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    request_body = AdminClientRequest,
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<ClientInfo>),
    )
)]
pub async fn update_client(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
    ApiJson(request): ApiJson<AdminClientRequest>,
) -> Result<ApiResponse<ClientInfo>, ApiError> {
    current.require_admin()?;
    let is_blocked = request.is_blocked;
    let update = ProfileRequest {
        full_name: request.full_name,
        address: request.address,
        phone: request.phone,
    };
    let profile = account::admin_update_client(db.as_ref(), id, update.into(), is_blocked).await?;
    let (_, user) = account::find_client(db.as_ref(), profile.id).await?;
    Ok(ApiResponse::ok(ClientInfo::new(&profile, &user.email)))
}

/// 删除客户账号并注销其全部会话
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(
        ("id" = i32, Path),
    ),
    responses(
        (status = 200, body = ApiResponse<i32>),
    )
)]
pub async fn delete_client(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(sessions): Extension<SessionStore>,
    current: CurrentUser,
) -> Result<ApiResponse<i32>, ApiError> {
    current.require_admin()?;
    let user_id = account::delete_client(db.as_ref(), id).await?;
    sessions.revoke_user(user_id);
    Ok(ApiResponse::ok(id))
}

#[utoipa::path(
    get,
    path = "/api/statistics/dashboard",
    responses(
        (status = 200, body = ApiResponse<DashboardResponse>),
    )
)]
pub async fn get_dashboard(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(policy): Extension<Arc<RentalPolicy>>,
    current: CurrentUser,
) -> Result<ApiResponse<DashboardResponse>, ApiError> {
    current.require_admin()?;
    let stats = statistics::dashboard(db.as_ref(), today(), policy.as_ref()).await?;
    Ok(ApiResponse::ok(DashboardResponse {
        total_cars: stats.total_cars,
        available_cars: stats.available_cars,
        active_rentals: stats.active_rentals,
        total_clients: stats.total_clients,
        monthly_revenue: stats.monthly_revenue,
        total_revenue: stats.total_revenue,
        total_deposits: stats.total_deposits,
        total_fines: stats.total_fines,
        top_cars: stats.top_cars.into_iter().map(Into::into).collect(),
    }))
}

/// 默认统计最近 30 天
#[utoipa::path(
    get,
    path = "/api/statistics/revenue",
    params(
        RevenueRequest,
    ),
    responses(
        (status = 200, body = ApiResponse<RevenueResponse>),
    )
)]
pub async fn get_revenue(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ApiQuery(params): ApiQuery<RevenueRequest>,
    current: CurrentUser,
) -> Result<ApiResponse<RevenueResponse>, ApiError> {
    current.require_admin()?;
    let end_date = params.end_date.unwrap_or_else(today);
    let start_date = params.start_date.unwrap_or(end_date - Duration::days(30));
    if start_date > end_date {
        return Err(InnerApiError::BadRequest("Start date must not be after the end date".to_string()).into());
    }
    let points = statistics::revenue_by_period(db.as_ref(), start_date, end_date).await?;
    let total = points.iter().map(|(_, revenue)| *revenue).sum::<Decimal>();
    Ok(ApiResponse::ok(RevenueResponse {
        start_date,
        end_date,
        total,
        points: points
            .into_iter()
            .map(|(date, revenue)| RevenuePoint { date, revenue })
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/statistics/rentals",
    responses(
        (status = 200, body = ApiResponse<RentalStatsResponse>),
    )
)]
pub async fn get_rental_statistics(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    current: CurrentUser,
) -> Result<ApiResponse<RentalStatsResponse>, ApiError> {
    current.require_admin()?;
    let stats = rental_service::rental_statistics(db.as_ref(), today()).await?;
    let average_rental_cost = statistics::average_rental_cost(db.as_ref()).await?;
    Ok(ApiResponse::ok(RentalStatsResponse {
        statistics: stats,
        average_rental_cost,
    }))
}
