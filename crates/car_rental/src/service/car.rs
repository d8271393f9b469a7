use std::collections::{HashMap, HashSet};

use car_rental_entity::custom_type::{CarStatus, RentalStatus};
use car_rental_entity::{car, car_type, fine, rental};
use chrono::{Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::config::RentalPolicy;
use crate::error::{ServiceError, ServiceResult};
use crate::rental::factory::calculate_deposit;
use crate::rental::pricing::{rental_days, PriceDetails, PricingStrategy, PricingStrategyEnum};
use crate::utils::money;
use crate::utils::time_format::now_standard_string;
use crate::utils::validation::required_text;

#[derive(Debug, Clone, Default)]
pub struct CarFilter {
    /// 不区分大小写的包含匹配
    pub brand: Option<String>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
    pub status: Option<CarStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub filter: CarFilter,
    pub rental_start_date: Option<NaiveDate>,
    pub rental_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub car: car::Model,
    /// 未同时给出两个日期时始终为 false
    pub is_busy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CarFinancialReport {
    pub total_rentals: u64,
    pub total_revenue: Decimal,
    pub total_fines: Decimal,
    pub net_revenue: Decimal,
    pub avg_rental_duration: Decimal,
    pub occupancy_rate: Decimal,
}

/// 车辆累计指标，只统计已完成的租赁
#[derive(Debug, Clone, PartialEq)]
pub struct CarTotals {
    pub total_rentals_count: u64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone)]
pub struct CarRevenue {
    pub car: car::Model,
    pub revenue: Decimal,
}

#[derive(Debug, Clone)]
pub struct OccupancyEntry {
    pub car: car::Model,
    pub status: &'static str,
    pub occupancy_rate: Decimal,
    pub total_rentals: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PriceQuote {
    pub total_cost: Decimal,
    pub deposit: Decimal,
    pub days: i64,
    pub daily_price: Decimal,
    pub details: Option<PriceDetails>,
}

/// 后台新增或编辑车辆的输入
#[derive(Debug, Clone)]
pub struct CarInput {
    pub brand: String,
    pub model: String,
    pub car_type_id: Option<i32>,
    /// 未选择已有类型时按名称查找或创建
    pub new_car_type: Option<String>,
    pub year: i32,
    pub daily_price: Decimal,
    pub photo: Option<String>,
    pub description: String,
    pub status: CarStatus,
}

/// 与 [start, end] 有交集且仍占用车辆的租赁
fn blocking_overlap(start: NaiveDate, end: NaiveDate) -> Condition {
    Condition::all()
        .add(rental::Column::Status.is_in(RentalStatus::BLOCKING))
        .add(rental::Column::StartDate.lte(end))
        .add(rental::Column::ExpectedEndDate.gte(start))
}

pub async fn find_car<C: ConnectionTrait>(db: &C, id: i32) -> ServiceResult<car::Model> {
    car::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("car", id))
}

pub async fn available_cars<C: ConnectionTrait>(db: &C) -> ServiceResult<Vec<car::Model>> {
    cars_by_status(db, CarStatus::Available).await
}

pub async fn cars_by_status<C: ConnectionTrait>(db: &C, status: CarStatus) -> ServiceResult<Vec<car::Model>> {
    Ok(car::Entity::find()
        .filter(car::Column::Status.eq(status))
        .order_by_desc(car::Column::CreatedAt)
        .order_by_desc(car::Column::Id)
        .all(db)
        .await?)
}

pub async fn list_cars<C: ConnectionTrait>(db: &C, filter: &CarFilter) -> ServiceResult<Vec<car::Model>> {
    let mut query = car::Entity::find();
    if let Some(price_from) = filter.price_from {
        query = query.filter(car::Column::DailyPriceCents.gte(money::to_cents(price_from)));
    }
    if let Some(price_to) = filter.price_to {
        query = query.filter(car::Column::DailyPriceCents.lte(money::to_cents(price_to)));
    }
    if let Some(status) = filter.status {
        query = query.filter(car::Column::Status.eq(status));
    }
    let cars = query
        .order_by_desc(car::Column::CreatedAt)
        .order_by_desc(car::Column::Id)
        .all(db)
        .await?;

    // SQLite 的 LIKE 只对 ASCII 忽略大小写，品牌匹配放在内存中做
    let brand = filter
        .brand
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_lowercase);
    Ok(match brand {
        Some(brand) => cars
            .into_iter()
            .filter(|car| car.brand.to_lowercase().contains(&brand))
            .collect(),
        None => cars,
    })
}

pub async fn is_car_busy_for_dates<C: ConnectionTrait>(
    db: &C,
    car_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> ServiceResult<bool> {
    let count = rental::Entity::find()
        .filter(rental::Column::CarId.eq(car_id))
        .filter(blocking_overlap(start, end))
        .count(db)
        .await?;
    Ok(count > 0)
}

async fn busy_car_ids<C: ConnectionTrait>(db: &C, start: NaiveDate, end: NaiveDate) -> ServiceResult<HashSet<i32>> {
    let ids: Vec<i32> = rental::Entity::find()
        .select_only()
        .column(rental::Column::CarId)
        .distinct()
        .filter(blocking_overlap(start, end))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

/// 指定日期内没有占用的车辆，不看车辆本身的状态字段
pub async fn cars_available_for_dates<C: ConnectionTrait>(
    db: &C,
    start: NaiveDate,
    end: NaiveDate,
) -> ServiceResult<Vec<car::Model>> {
    let busy = busy_car_ids(db, start, end).await?;
    Ok(car::Entity::find()
        .order_by_desc(car::Column::CreatedAt)
        .order_by_desc(car::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .filter(|car| !busy.contains(&car.id))
        .collect())
}

pub fn validate_catalog_query(query: &CatalogQuery, today: NaiveDate) -> ServiceResult<()> {
    if let (Some(start), Some(end)) = (query.rental_start_date, query.rental_end_date) {
        if start < today {
            return Err(ServiceError::validation("Start date cannot be in the past"));
        }
        if end <= start {
            return Err(ServiceError::validation("End date must be after the start date"));
        }
    }
    if let (Some(from), Some(to)) = (query.filter.price_from, query.filter.price_to) {
        if from > to {
            return Err(ServiceError::validation("Price 'from' cannot be greater than price 'to'"));
        }
    }
    Ok(())
}

/// 车辆目录：列出全部符合条件的车辆，并标记所选日期内是否被占用
pub async fn catalog<C: ConnectionTrait>(
    db: &C,
    query: &CatalogQuery,
    today: NaiveDate,
) -> ServiceResult<Vec<CatalogEntry>> {
    validate_catalog_query(query, today)?;
    let cars = list_cars(db, &query.filter).await?;
    let busy = match (query.rental_start_date, query.rental_end_date) {
        (Some(start), Some(end)) => busy_car_ids(db, start, end).await?,
        _ => HashSet::new(),
    };
    Ok(cars
        .into_iter()
        .map(|car| {
            let is_busy = busy.contains(&car.id);
            CatalogEntry { car, is_busy }
        })
        .collect())
}

pub async fn price_quote<C: ConnectionTrait>(
    db: &C,
    car_id: i32,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    policy: &RentalPolicy,
) -> ServiceResult<PriceQuote> {
    let car = find_car(db, car_id).await?;
    if start < today {
        return Err(ServiceError::validation("Start date cannot be in the past"));
    }
    if end <= start {
        return Err(ServiceError::validation("End date must be after the start date"));
    }
    let strategy = PricingStrategyEnum::from_name(&policy.default_strategy);
    let days = rental_days(start, end);
    Ok(PriceQuote {
        total_cost: strategy.calculate_price(&car, start, end, today),
        deposit: calculate_deposit(&car, days, today, policy),
        days,
        daily_price: money::from_cents(car.daily_price_cents),
        details: strategy.price_details(&car, start, end, today),
    })
}

/// 近 window_days 天的出租率（百分比，两位小数）
pub async fn occupancy_rate<C: ConnectionTrait>(
    db: &C,
    car_id: i32,
    today: NaiveDate,
    window_days: i64,
) -> ServiceResult<Decimal> {
    if window_days <= 0 {
        return Ok(money::round(Decimal::ZERO));
    }
    let window_start = today - Duration::days(window_days);
    let rentals = rental::Entity::find()
        .filter(rental::Column::CarId.eq(car_id))
        .filter(rental::Column::StartDate.lte(today))
        .filter(rental::Column::ExpectedEndDate.gte(window_start))
        .filter(rental::Column::Status.is_in([RentalStatus::Active, RentalStatus::Completed]))
        .all(db)
        .await?;

    let rented_days: i64 = rentals
        .iter()
        .map(|rental| {
            let start = rental.start_date.max(window_start);
            let end = rental.end_date().min(today);
            if end >= start {
                (end - start).num_days() + 1
            } else {
                0
            }
        })
        .sum();

    Ok(money::round(
        Decimal::from(rented_days) * Decimal::ONE_HUNDRED / Decimal::from(window_days),
    ))
}

pub async fn financial_report<C: ConnectionTrait>(
    db: &C,
    car_id: i32,
    today: NaiveDate,
    policy: &RentalPolicy,
) -> ServiceResult<CarFinancialReport> {
    let completed = rental::Entity::find()
        .filter(rental::Column::CarId.eq(car_id))
        .filter(rental::Column::Status.eq(RentalStatus::Completed))
        .all(db)
        .await?;

    let total_revenue_cents: i64 = completed.iter().map(|r| r.total_cost_cents).sum();
    let rental_ids: Vec<i32> = completed.iter().map(|r| r.id).collect();
    let total_fines_cents: i64 = if rental_ids.is_empty() {
        0
    } else {
        fine::Entity::find()
            .filter(fine::Column::RentalId.is_in(rental_ids))
            .all(db)
            .await?
            .iter()
            .map(|f| f.amount_cents)
            .sum()
    };

    let avg_rental_duration = if completed.is_empty() {
        Decimal::ZERO
    } else {
        let total_days: i64 = completed.iter().map(|r| r.days_rented(today)).sum();
        (Decimal::from(total_days) / Decimal::from(completed.len() as i64))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
    };

    let total_revenue = money::from_cents(total_revenue_cents);
    let total_fines = money::from_cents(total_fines_cents);
    Ok(CarFinancialReport {
        total_rentals: completed.len() as u64,
        total_revenue,
        total_fines,
        net_revenue: total_revenue - total_fines,
        avg_rental_duration,
        occupancy_rate: occupancy_rate(db, car_id, today, policy.occupancy_window_days).await?,
    })
}

pub async fn car_totals<C: ConnectionTrait>(db: &C, car_id: i32) -> ServiceResult<CarTotals> {
    let completed = rental::Entity::find()
        .filter(rental::Column::CarId.eq(car_id))
        .filter(rental::Column::Status.eq(RentalStatus::Completed));
    let total_rentals_count = completed.clone().count(db).await?;
    let revenue_cents: Option<i64> = completed
        .select_only()
        .column_as(Expr::col(rental::Column::TotalCostCents).sum(), "revenue")
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?
        .flatten();
    Ok(CarTotals {
        total_rentals_count,
        total_revenue: money::from_cents(revenue_cents.unwrap_or(0)),
    })
}

#[derive(Debug, FromQueryResult)]
struct RevenueRow {
    car_id: i32,
    revenue: i64,
}

/// 已完成租赁的收入，按车辆汇总
pub(crate) async fn revenue_by_car<C: ConnectionTrait>(db: &C) -> ServiceResult<HashMap<i32, i64>> {
    let rows = rental::Entity::find()
        .select_only()
        .column(rental::Column::CarId)
        .column_as(Expr::col(rental::Column::TotalCostCents).sum(), "revenue")
        .filter(rental::Column::Status.eq(RentalStatus::Completed))
        .group_by(rental::Column::CarId)
        .into_model::<RevenueRow>()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|row| (row.car_id, row.revenue)).collect())
}

pub async fn top_cars_by_revenue<C: ConnectionTrait>(db: &C, limit: u64) -> ServiceResult<Vec<CarRevenue>> {
    let revenue = revenue_by_car(db).await?;
    let mut cars: Vec<CarRevenue> = car::Entity::find()
        .order_by_asc(car::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|car| {
            let cents = revenue.get(&car.id).copied().unwrap_or(0);
            CarRevenue {
                car,
                revenue: money::from_cents(cents),
            }
        })
        .collect();
    // 排序稳定，收入相同时保持 id 升序
    cars.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    cars.truncate(limit as usize);
    Ok(cars)
}

pub async fn occupancy_report<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
    policy: &RentalPolicy,
) -> ServiceResult<Vec<OccupancyEntry>> {
    let cars = car::Entity::find().order_by_asc(car::Column::Id).all(db).await?;
    let mut report = Vec::with_capacity(cars.len());
    for car in cars {
        let occupancy_rate = occupancy_rate(db, car.id, today, policy.occupancy_window_days).await?;
        let total_rentals = rental::Entity::find()
            .filter(rental::Column::CarId.eq(car.id))
            .count(db)
            .await?;
        report.push(OccupancyEntry {
            status: car.status.label(),
            occupancy_rate,
            total_rentals,
            car,
        });
    }
    report.sort_by(|a, b| b.occupancy_rate.cmp(&a.occupancy_rate));
    Ok(report)
}

fn validate_car_input(input: &CarInput) -> ServiceResult<(String, String)> {
    let brand = required_text("Brand", &input.brand, 50)?;
    let model = required_text("Model", &input.model, 50)?;
    if !(1900..=2100).contains(&input.year) {
        return Err(ServiceError::validation("Year must be between 1900 and 2100"));
    }
    if input.daily_price < Decimal::new(1, 2) {
        return Err(ServiceError::validation("Daily price must be at least 0.01"));
    }
    Ok((brand, model))
}

/// 优先使用已选类型，否则按新类型名称查找或创建
async fn resolve_car_type<C: ConnectionTrait>(db: &C, input: &CarInput) -> ServiceResult<i32> {
    if let Some(id) = input.car_type_id {
        return match car_type::Entity::find_by_id(id).one(db).await? {
            Some(car_type) => Ok(car_type.id),
            None => Err(ServiceError::validation(format!("Car type {id} does not exist"))),
        };
    }

    let name = input.new_car_type.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ServiceError::validation("Select an existing car type or create a new one"));
    }
    let name = required_text("Car type name", name, 50)?;
    if let Some(existing) = car_type::Entity::find()
        .filter(car_type::Column::Name.eq(name.as_str()))
        .one(db)
        .await?
    {
        return Ok(existing.id);
    }
    let created = car_type::ActiveModel {
        description: Set(format!("Car type: {name}")),
        name: Set(name),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("创建车辆类型 {} ({})", created.name, created.id);
    Ok(created.id)
}

pub async fn create_car(db: &DatabaseConnection, input: CarInput) -> ServiceResult<car::Model> {
    let (brand, model) = validate_car_input(&input)?;
    let txn = db.begin().await?;
    let car_type_id = resolve_car_type(&txn, &input).await?;
    let car = car::ActiveModel {
        brand: Set(brand),
        model: Set(model),
        car_type_id: Set(car_type_id),
        year: Set(input.year),
        daily_price_cents: Set(money::to_cents(input.daily_price)),
        photo: Set(input.photo),
        description: Set(input.description),
        status: Set(input.status),
        created_at: Set(now_standard_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!("新增车辆 {} {} ({})", car.brand, car.model, car.id);
    Ok(car)
}

pub async fn update_car(db: &DatabaseConnection, id: i32, input: CarInput) -> ServiceResult<car::Model> {
    let (brand, model) = validate_car_input(&input)?;
    let txn = db.begin().await?;
    let existing = find_car(&txn, id).await?;
    let car_type_id = resolve_car_type(&txn, &input).await?;

    let mut car = existing.into_active_model();
    car.brand = Set(brand);
    car.model = Set(model);
    car.car_type_id = Set(car_type_id);
    car.year = Set(input.year);
    car.daily_price_cents = Set(money::to_cents(input.daily_price));
    car.photo = Set(input.photo);
    car.description = Set(input.description);
    car.status = Set(input.status);
    let car = car.update(&txn).await?;
    txn.commit().await?;
    info!("更新车辆 {}", car.id);
    Ok(car)
}

/// 有进行中的租赁或任何历史租赁时拒绝删除
pub async fn delete_car<C: ConnectionTrait>(db: &C, id: i32) -> ServiceResult<()> {
    let car = find_car(db, id).await?;
    let active = rental::Entity::find()
        .filter(rental::Column::CarId.eq(id))
        .filter(rental::Column::Status.is_in(RentalStatus::BLOCKING))
        .count(db)
        .await?;
    if active > 0 {
        return Err(ServiceError::Conflict(format!(
            "Cannot delete a car with active rentals: {active} active rentals found"
        )));
    }
    let history = rental::Entity::find()
        .filter(rental::Column::CarId.eq(id))
        .count(db)
        .await?;
    if history > 0 {
        return Err(ServiceError::Conflict(format!(
            "Cannot delete the car: it has {history} rentals in history"
        )));
    }
    car::Entity::delete_by_id(car.id).exec(db).await?;
    info!("删除车辆 {} {} ({})", car.brand, car.model, car.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, dec, Fixture, TODAY};
    use assert_matches::assert_matches;

    fn input(brand: &str) -> CarInput {
        CarInput {
            brand: brand.to_string(),
            model: "Model".to_string(),
            car_type_id: None,
            new_car_type: Some("SUV".to_string()),
            year: 2022,
            daily_price: dec("1200"),
            photo: None,
            description: String::new(),
            status: CarStatus::Available,
        }
    }

    #[tokio::test]
    async fn test_list_cars_filters() {
        let fx = Fixture::new().await;
        let toyota = fx.car("Toyota", "Camry", 2022, "1500").await;
        fx.car("Škoda", "Octavia", 2020, "900").await;
        let bmw = fx.car("BMW", "X5", 2024, "3000").await;
        fx.set_car_status(bmw.id, CarStatus::Maintenance).await;

        let by_brand = list_cars(
            &fx.db,
            &CarFilter {
                brand: Some("toy".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_brand.iter().map(|c| c.id).collect::<Vec<_>>(), vec![toyota.id]);

        let unicode = list_cars(
            &fx.db,
            &CarFilter {
                brand: Some("ŠKO".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(unicode.len(), 1);

        let priced = list_cars(
            &fx.db,
            &CarFilter {
                price_from: Some(dec("1000")),
                price_to: Some(dec("3000")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        // 新车在前
        assert_eq!(priced.iter().map(|c| c.id).collect::<Vec<_>>(), vec![bmw.id, toyota.id]);

        assert_eq!(available_cars(&fx.db).await.unwrap().len(), 2);
        assert_eq!(cars_by_status(&fx.db, CarStatus::Maintenance).await.unwrap()[0].id, bmw.id);
    }

    #[tokio::test]
    async fn test_busy_overlap_is_inclusive() {
        let fx = Fixture::new().await;
        let client = fx.client("c@example.com").await;
        let car = fx.car("Kia", "Rio", 2021, "800").await;
        let other = fx.car("Kia", "Ceed", 2021, "900").await;
        fx.rental(client.id, car.id, "2026-06-10", "2026-06-15", RentalStatus::Pending, "0")
            .await;
        fx.rental(client.id, other.id, "2026-06-10", "2026-06-15", RentalStatus::Completed, "0")
            .await;

        let busy = |s: &str, e: &str| is_car_busy_for_dates(&fx.db, car.id, date(s), date(e));
        assert!(busy("2026-06-15", "2026-06-20").await.unwrap());
        assert!(busy("2026-06-01", "2026-06-10").await.unwrap());
        assert!(busy("2026-06-11", "2026-06-12").await.unwrap());
        assert!(!busy("2026-06-16", "2026-06-20").await.unwrap());
        assert!(!busy("2026-06-01", "2026-06-09").await.unwrap());
        // 已完成的租赁不占用
        assert!(!is_car_busy_for_dates(&fx.db, other.id, date("2026-06-10"), date("2026-06-15"))
            .await
            .unwrap());

        let free = cars_available_for_dates(&fx.db, date("2026-06-12"), date("2026-06-13"))
            .await
            .unwrap();
        assert_eq!(free.iter().map(|c| c.id).collect::<Vec<_>>(), vec![other.id]);
    }

    #[tokio::test]
    async fn test_catalog_marks_busy_cars_only_with_both_dates() {
        let fx = Fixture::new().await;
        let client = fx.client("c@example.com").await;
        let car = fx.car("Kia", "Rio", 2021, "800").await;
        fx.rental(client.id, car.id, "2026-06-10", "2026-06-15", RentalStatus::Active, "0")
            .await;
        let today = date(TODAY);

        let with_dates = CatalogQuery {
            rental_start_date: Some(date("2026-06-12")),
            rental_end_date: Some(date("2026-06-20")),
            ..Default::default()
        };
        assert!(catalog(&fx.db, &with_dates, today).await.unwrap()[0].is_busy);

        let only_start = CatalogQuery {
            rental_start_date: Some(date("2026-06-12")),
            ..Default::default()
        };
        assert!(!catalog(&fx.db, &only_start, today).await.unwrap()[0].is_busy);
    }

    #[test]
    fn test_catalog_query_validation() {
        let today = date(TODAY);
        let past = CatalogQuery {
            rental_start_date: Some(date("2026-05-30")),
            rental_end_date: Some(date("2026-06-03")),
            ..Default::default()
        };
        assert_matches!(validate_catalog_query(&past, today), Err(ServiceError::Validation(_)));

        let reversed = CatalogQuery {
            rental_start_date: Some(date("2026-06-03")),
            rental_end_date: Some(date("2026-06-03")),
            ..Default::default()
        };
        assert_matches!(validate_catalog_query(&reversed, today), Err(ServiceError::Validation(_)));

        let prices = CatalogQuery {
            filter: CarFilter {
                price_from: Some(dec("500")),
                price_to: Some(dec("100")),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_matches!(validate_catalog_query(&prices, today), Err(ServiceError::Validation(msg)) if msg.contains("Price"));
        assert!(validate_catalog_query(&CatalogQuery::default(), today).is_ok());
    }

    #[tokio::test]
    async fn test_price_quote() {
        let fx = Fixture::new().await;
        let car = fx.car("Toyota", "Corolla", 2021, "1000").await;
        let policy = RentalPolicy::default();
        let today = date(TODAY);

        let quote = price_quote(&fx.db, car.id, date("2026-06-02"), date("2026-06-04"), today, &policy)
            .await
            .unwrap();
        assert_eq!(quote.days, 3);
        assert_eq!(quote.total_cost, dec("3000.00"));
        assert_eq!(quote.daily_price, dec("1000.00"));
        assert_eq!(quote.deposit, dec("1200.00"));
        assert_eq!(quote.details.unwrap().final_price, quote.total_cost);

        assert_matches!(
            price_quote(&fx.db, car.id, date("2026-05-01"), date("2026-06-04"), today, &policy).await,
            Err(ServiceError::Validation(_))
        );
        assert_matches!(
            price_quote(&fx.db, 404, date("2026-06-02"), date("2026-06-04"), today, &policy).await,
            Err(ServiceError::NotFound { entity: "car", id: 404 })
        );
    }

    #[tokio::test]
    async fn test_occupancy_rate_clips_to_window() {
        let fx = Fixture::new().await;
        let client = fx.client("c@example.com").await;
        let car = fx.car("Kia", "Rio", 2021, "800").await;
        let today = date(TODAY);

        // 窗口起点 2026-03-03，只计入 03-03..03-05 共 3 天
        fx.completed_rental(client.id, car.id, "2026-02-20", "2026-03-05", "100").await;
        // 结束日按 today 截断：05-30..06-01 共 3 天
        fx.rental(client.id, car.id, "2026-05-30", "2026-06-10", RentalStatus::Active, "100")
            .await;
        // 已取消的租赁不计入
        fx.rental(client.id, car.id, "2026-05-01", "2026-05-10", RentalStatus::Cancelled, "0")
            .await;

        let rate = occupancy_rate(&fx.db, car.id, today, 90).await.unwrap();
        assert_eq!(rate, dec("6.67"));
        assert_eq!(occupancy_rate(&fx.db, car.id, today, 0).await.unwrap(), dec("0.00"));
    }

    #[tokio::test]
    async fn test_financial_report_and_rankings() {
        let fx = Fixture::new().await;
        let client = fx.client("c@example.com").await;
        let first = fx.car("Kia", "Rio", 2021, "800").await;
        let second = fx.car("BMW", "X5", 2024, "3000").await;
        let idle = fx.car("Fiat", "500", 2019, "500").await;
        let policy = RentalPolicy::default();
        let today = date(TODAY);

        let r1 = fx.completed_rental(client.id, first.id, "2026-05-01", "2026-05-03", "2400").await;
        fx.completed_rental(client.id, first.id, "2026-05-10", "2026-05-13", "3200").await;
        fx.completed_rental(client.id, second.id, "2026-05-01", "2026-05-02", "9000").await;
        fx.rental(client.id, first.id, "2026-06-05", "2026-06-06", RentalStatus::Pending, "1600")
            .await;
        fine::ActiveModel {
            rental_id: Set(r1.id),
            reason: Set("Damage level 1".into()),
            amount_cents: Set(3000),
            created_at: Set(now_standard_string()),
            ..Default::default()
        }
        .insert(&fx.db)
        .await
        .unwrap();

        let report = financial_report(&fx.db, first.id, today, &policy).await.unwrap();
        assert_eq!(report.total_rentals, 2);
        assert_eq!(report.total_revenue, dec("5600.00"));
        assert_eq!(report.total_fines, dec("30.00"));
        assert_eq!(report.net_revenue, dec("5570.00"));
        // (3 + 4) / 2
        assert_eq!(report.avg_rental_duration, dec("3.5"));
        // 3 + 4 天 / 90
        assert_eq!(report.occupancy_rate, dec("7.78"));

        let empty = financial_report(&fx.db, idle.id, today, &policy).await.unwrap();
        assert_eq!(empty.total_rentals, 0);
        assert_eq!(empty.avg_rental_duration, Decimal::ZERO);

        // 待开始的租赁不计入累计指标
        assert_eq!(
            car_totals(&fx.db, first.id).await.unwrap(),
            CarTotals {
                total_rentals_count: 2,
                total_revenue: dec("5600.00"),
            }
        );
        assert_eq!(
            car_totals(&fx.db, idle.id).await.unwrap(),
            CarTotals {
                total_rentals_count: 0,
                total_revenue: Decimal::ZERO,
            }
        );

        let top = top_cars_by_revenue(&fx.db, 2).await.unwrap();
        assert_eq!(top.iter().map(|c| c.car.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(top[0].revenue, dec("9000.00"));

        let occupancy = occupancy_report(&fx.db, today, &policy).await.unwrap();
        assert_eq!(occupancy[0].car.id, first.id);
        assert_eq!(occupancy[0].total_rentals, 3);
        assert_eq!(occupancy[0].status, "Available");
        assert_eq!(occupancy.last().unwrap().occupancy_rate, dec("0.00"));
    }

    #[tokio::test]
    async fn test_create_car_with_new_type_and_validation() {
        let fx = Fixture::new().await;
        let car = create_car(&fx.db, input("Volvo")).await.unwrap();
        let suv = car_type::Entity::find_by_id(car.car_type_id).one(&fx.db).await.unwrap().unwrap();
        assert_eq!(suv.name, "SUV");
        assert_eq!(suv.description, "Car type: SUV");

        // 同名类型复用
        let again = create_car(&fx.db, input("Volvo")).await.unwrap();
        assert_eq!(again.car_type_id, suv.id);

        let mut bad = input("Volvo");
        bad.year = 1899;
        assert_matches!(create_car(&fx.db, bad).await, Err(ServiceError::Validation(_)));

        let mut bad = input("Volvo");
        bad.daily_price = dec("0");
        assert_matches!(create_car(&fx.db, bad).await, Err(ServiceError::Validation(_)));

        let mut bad = input("  ");
        bad.new_car_type = None;
        assert_matches!(create_car(&fx.db, bad).await, Err(ServiceError::Validation(_)));

        let mut no_type = input("Volvo");
        no_type.new_car_type = None;
        assert_matches!(
            create_car(&fx.db, no_type).await,
            Err(ServiceError::Validation(msg)) if msg.contains("car type")
        );

        let mut missing_type = input("Volvo");
        missing_type.car_type_id = Some(999);
        assert_matches!(create_car(&fx.db, missing_type).await, Err(ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_car() {
        let fx = Fixture::new().await;
        let car = fx.car("Kia", "Rio", 2021, "800").await;
        let mut changes = input("Kia");
        changes.car_type_id = Some(car.car_type_id);
        changes.status = CarStatus::Maintenance;
        changes.daily_price = dec("850.50");

        let updated = update_car(&fx.db, car.id, changes.clone()).await.unwrap();
        assert_eq!(updated.status, CarStatus::Maintenance);
        assert_eq!(updated.daily_price_cents, 85050);
        assert_eq!(updated.car_type_id, car.car_type_id);
        assert_matches!(update_car(&fx.db, 999, changes).await, Err(ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_car_guards() {
        let fx = Fixture::new().await;
        let client = fx.client("c@example.com").await;
        let active = fx.car("Kia", "Rio", 2021, "800").await;
        let history = fx.car("Kia", "Ceed", 2021, "900").await;
        let fresh = fx.car("Fiat", "Panda", 2021, "400").await;
        fx.rental(client.id, active.id, "2026-06-01", "2026-06-03", RentalStatus::Overdue, "0")
            .await;
        fx.completed_rental(client.id, history.id, "2026-05-01", "2026-05-02", "100").await;

        assert_matches!(
            delete_car(&fx.db, active.id).await,
            Err(ServiceError::Conflict(msg)) if msg.contains("1 active rentals")
        );
        assert_matches!(
            delete_car(&fx.db, history.id).await,
            Err(ServiceError::Conflict(msg)) if msg.contains("1 rentals in history")
        );
        delete_car(&fx.db, fresh.id).await.unwrap();
        assert_matches!(find_car(&fx.db, fresh.id).await, Err(ServiceError::NotFound { .. }));
    }
}
