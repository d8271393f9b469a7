use car_rental_entity::custom_type::{CarStatus, PaymentType, RentalStatus};
use car_rental_entity::{car, client_profile, fine, payment, rental, user};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::config::RentalPolicy;
use crate::database::begin_write_transaction;
use crate::error::{ServiceError, ServiceResult};
use crate::rental::fines::{FineCalculator, FineStrategy, StandardFineStrategy};
use crate::rental::pricing::{PricingStrategy, PricingStrategyEnum};
use crate::utils::money;
use crate::utils::time_format::now_standard_string;

pub use crate::rental::factory::{create_rental, NewRental};

/// 管理端租赁列表的筛选条件
#[derive(Debug, Clone, Default)]
pub struct RentalFilter {
    /// `active` 同时包含已到开始日期的 pending
    pub status: Option<RentalStatus>,
    pub client_id: Option<i32>,
}

#[derive(Debug, Clone, Copy)]
pub struct CompleteRental {
    pub actual_end_date: NaiveDate,
    pub damage_level: i32,
    pub late_days: i32,
}

#[derive(Debug, Clone)]
pub struct CompletedRental {
    pub rental: rental::Model,
    pub total_fines: Decimal,
    pub refund: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RentalStatistics {
    pub total_rentals: u64,
    pub active_rentals: u64,
    pub completed_rentals: u64,
    pub overdue_rentals: u64,
    pub total_revenue: Decimal,
    pub total_fines: Decimal,
}

#[derive(Debug, Clone)]
pub struct RentalDetail {
    pub rental: rental::Model,
    pub car: car::Model,
    pub client: client_profile::Model,
    pub client_email: String,
    pub fines: Vec<fine::Model>,
    pub payments: Vec<payment::Model>,
    pub days_rented: i64,
}

pub async fn find_rental<C: ConnectionTrait>(db: &C, id: i32) -> ServiceResult<rental::Model> {
    rental::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("rental", id))
}

pub async fn client_rentals<C: ConnectionTrait>(db: &C, client_id: i32) -> ServiceResult<Vec<rental::Model>> {
    Ok(rental::Entity::find()
        .filter(rental::Column::ClientId.eq(client_id))
        .order_by_desc(rental::Column::CreatedAt)
        .order_by_desc(rental::Column::Id)
        .all(db)
        .await?)
}

fn active_condition(today: NaiveDate) -> sea_orm::Condition {
    sea_orm::Condition::all()
        .add(rental::Column::Status.is_in([RentalStatus::Active, RentalStatus::Pending]))
        .add(rental::Column::StartDate.lte(today))
}

/// 进行中的租赁：active 以及已经开始的 pending
pub async fn active_rentals<C: ConnectionTrait>(db: &C, today: NaiveDate) -> ServiceResult<Vec<rental::Model>> {
    Ok(rental::Entity::find()
        .filter(active_condition(today))
        .order_by_desc(rental::Column::CreatedAt)
        .order_by_desc(rental::Column::Id)
        .all(db)
        .await?)
}

pub async fn list_rentals<C: ConnectionTrait>(
    db: &C,
    filter: &RentalFilter,
    today: NaiveDate,
) -> ServiceResult<Vec<rental::Model>> {
    let mut query = rental::Entity::find();
    match filter.status {
        Some(RentalStatus::Active) => query = query.filter(active_condition(today)),
        Some(status) => query = query.filter(rental::Column::Status.eq(status)),
        None => {}
    }
    if let Some(client_id) = filter.client_id {
        query = query.filter(rental::Column::ClientId.eq(client_id));
    }
    Ok(query
        .order_by_desc(rental::Column::CreatedAt)
        .order_by_desc(rental::Column::Id)
        .all(db)
        .await?)
}

/// 状态巡检：先把已开始的 pending 置为 active，再把超过预计归还日期的 active 置为 overdue
pub async fn update_overdue_rentals<C: ConnectionTrait>(db: &C, today: NaiveDate) -> ServiceResult<u64> {
    let now = now_standard_string();
    let activated = rental::Entity::update_many()
        .col_expr(rental::Column::Status, Expr::value(RentalStatus::Active))
        .col_expr(rental::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(rental::Column::Status.eq(RentalStatus::Pending))
        .filter(rental::Column::StartDate.lte(today))
        .exec(db)
        .await?
        .rows_affected;
    let overdue = rental::Entity::update_many()
        .col_expr(rental::Column::Status, Expr::value(RentalStatus::Overdue))
        .col_expr(rental::Column::UpdatedAt, Expr::value(now))
        .filter(rental::Column::Status.eq(RentalStatus::Active))
        .filter(rental::Column::ExpectedEndDate.lt(today))
        .exec(db)
        .await?
        .rows_affected;
    if activated + overdue > 0 {
        debug!("状态巡检：{} 个租赁开始，{} 个租赁逾期", activated, overdue);
    }
    Ok(activated + overdue)
}

async fn set_car_status<C: ConnectionTrait>(db: &C, car: car::Model, status: CarStatus) -> ServiceResult<car::Model> {
    let mut car = car.into_active_model();
    car.status = Set(status);
    Ok(car.update(db).await?)
}

/// 结束租赁：计算罚款与押金退还，按实际天数重算租金并释放车辆
pub async fn complete_rental(
    db: &DatabaseConnection,
    rental_id: i32,
    input: CompleteRental,
    today: NaiveDate,
    policy: &RentalPolicy,
) -> ServiceResult<CompletedRental> {
    if !(0..=3).contains(&input.damage_level) {
        return Err(ServiceError::validation("Damage level must be between 0 and 3"));
    }
    if input.late_days < 0 {
        return Err(ServiceError::validation("Late days cannot be negative"));
    }

    let txn = begin_write_transaction(db).await?;
    let existing = find_rental(&txn, rental_id).await?;
    match existing.status {
        RentalStatus::Completed => return Err(ServiceError::Conflict("This rental is already completed".to_string())),
        RentalStatus::Cancelled => return Err(ServiceError::Conflict("A cancelled rental cannot be completed".to_string())),
        _ => {}
    }
    if input.actual_end_date < existing.start_date {
        return Err(ServiceError::validation("Return date cannot be before the start date"));
    }
    let car = car::Entity::find_by_id(existing.car_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("car", existing.car_id))?;

    let calculator = FineCalculator::new(StandardFineStrategy::new(policy.late_fine_per_day));
    let deposit = money::from_cents(existing.deposit_cents);
    let total_fines = calculator.total_fines(deposit, input.damage_level, input.late_days);
    let refund = calculator.refund(deposit, total_fines);

    let strategy = PricingStrategyEnum::from_name(&policy.default_strategy);
    let rental_cost = strategy.calculate_price(&car, existing.start_date, input.actual_end_date, today);

    let now = now_standard_string();
    let mut model = existing.into_active_model();
    model.actual_end_date = Set(Some(input.actual_end_date));
    model.damage_level = Set(input.damage_level);
    model.late_days = Set(input.late_days);
    model.status = Set(RentalStatus::Completed);
    model.total_cost_cents = Set(money::to_cents(rental_cost + total_fines));
    model.updated_at = Set(now.clone());
    let rental = model.update(&txn).await?;

    let mut fines = Vec::new();
    if input.damage_level > 0 {
        fines.push((
            format!("Damage level {}", input.damage_level),
            calculator.strategy.damage_fine(deposit, input.damage_level),
        ));
    }
    if input.late_days > 0 {
        fines.push((
            format!("Late by {} days", input.late_days),
            calculator.strategy.late_fine(input.late_days),
        ));
    }
    for (reason, amount) in fines {
        fine::ActiveModel {
            rental_id: Set(rental.id),
            reason: Set(reason),
            amount_cents: Set(money::to_cents(amount)),
            created_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    if refund > Decimal::ZERO {
        payment::ActiveModel {
            rental_id: Set(rental.id),
            payment_type: Set(PaymentType::Refund),
            amount_cents: Set(money::to_cents(refund)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    set_car_status(&txn, car, CarStatus::Available).await?;
    txn.commit().await?;

    info!(
        "租赁 {} 已结束，罚款 {}，退还押金 {}，总费用 {}",
        rental.id,
        total_fines,
        refund,
        money::from_cents(rental.total_cost_cents)
    );
    Ok(CompletedRental {
        rental,
        total_fines,
        refund,
    })
}

/// 取消尚未开始的租赁，全额退还押金
pub async fn cancel_rental(db: &DatabaseConnection, rental_id: i32) -> ServiceResult<rental::Model> {
    let txn = begin_write_transaction(db).await?;
    let existing = find_rental(&txn, rental_id).await?;
    if existing.status != RentalStatus::Pending {
        return Err(ServiceError::Conflict("Only pending rentals can be cancelled".to_string()));
    }

    let now = now_standard_string();
    let deposit_cents = existing.deposit_cents;
    let car_id = existing.car_id;
    let mut model = existing.into_active_model();
    model.status = Set(RentalStatus::Cancelled);
    model.updated_at = Set(now.clone());
    let rental = model.update(&txn).await?;

    payment::ActiveModel {
        rental_id: Set(rental.id),
        payment_type: Set(PaymentType::Refund),
        amount_cents: Set(deposit_cents),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(car) = car::Entity::find_by_id(car_id).one(&txn).await? {
        set_car_status(&txn, car, CarStatus::Available).await?;
    }
    txn.commit().await?;
    info!("租赁 {} 已取消，退还押金 {}", rental.id, money::from_cents(deposit_cents));
    Ok(rental)
}

pub(crate) async fn completed_revenue_cents<C: ConnectionTrait>(db: &C) -> ServiceResult<i64> {
    let total: Option<i64> = rental::Entity::find()
        .select_only()
        .column_as(Expr::col(rental::Column::TotalCostCents).sum(), "total")
        .filter(rental::Column::Status.eq(RentalStatus::Completed))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?
        .flatten();
    Ok(total.unwrap_or(0))
}

pub(crate) async fn total_fines_cents<C: ConnectionTrait>(db: &C) -> ServiceResult<i64> {
    let total: Option<i64> = fine::Entity::find()
        .select_only()
        .column_as(Expr::col(fine::Column::AmountCents).sum(), "total")
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?
        .flatten();
    Ok(total.unwrap_or(0))
}

pub(crate) async fn count_active<C: ConnectionTrait>(db: &C, today: NaiveDate) -> ServiceResult<u64> {
    Ok(rental::Entity::find().filter(active_condition(today)).count(db).await?)
}

pub async fn rental_statistics<C: ConnectionTrait>(db: &C, today: NaiveDate) -> ServiceResult<RentalStatistics> {
    let count_status = |status: RentalStatus| {
        rental::Entity::find()
            .filter(rental::Column::Status.eq(status))
            .count(db)
    };
    Ok(RentalStatistics {
        total_rentals: rental::Entity::find().count(db).await?,
        active_rentals: count_active(db, today).await?,
        completed_rentals: count_status(RentalStatus::Completed).await?,
        overdue_rentals: count_status(RentalStatus::Overdue).await?,
        total_revenue: money::from_cents(completed_revenue_cents(db).await?),
        total_fines: money::from_cents(total_fines_cents(db).await?),
    })
}

pub async fn rental_detail<C: ConnectionTrait>(db: &C, id: i32, today: NaiveDate) -> ServiceResult<RentalDetail> {
    let rental = find_rental(db, id).await?;
    let car = car::Entity::find_by_id(rental.car_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("car", rental.car_id))?;
    let (client, client_user) = client_profile::Entity::find_by_id(rental.client_id)
        .find_also_related(user::Entity)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("client", rental.client_id))?;
    let fines = fine::Entity::find()
        .filter(fine::Column::RentalId.eq(id))
        .order_by_asc(fine::Column::Id)
        .all(db)
        .await?;
    let payments = payment::Entity::find()
        .filter(payment::Column::RentalId.eq(id))
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await?;
    Ok(RentalDetail {
        days_rented: rental.days_rented(today),
        client_email: client_user.map(|u| u.email).unwrap_or_default(),
        rental,
        car,
        client,
        fines,
        payments,
    })
}
