use std::collections::BTreeMap;

use car_rental_entity::custom_type::{CarStatus, PaymentType, RentalStatus};
use car_rental_entity::{car, client_profile, payment, rental};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

use crate::config::RentalPolicy;
use crate::error::ServiceResult;
use crate::service::car::{top_cars_by_revenue, CarRevenue};
use crate::service::rental::{completed_revenue_cents, count_active, total_fines_cents};
use crate::utils::money;
use crate::utils::time_format::month_start;

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_cars: u64,
    pub available_cars: u64,
    pub active_rentals: u64,
    pub total_clients: u64,
    pub monthly_revenue: Decimal,
    pub total_revenue: Decimal,
    pub total_deposits: Decimal,
    pub total_fines: Decimal,
    pub top_cars: Vec<CarRevenue>,
}

/// 结束日期（实际归还日，缺省为预计归还日）落在 [from, to] 内的已完成租赁
fn completed_ending_between(from: NaiveDate, to: Option<NaiveDate>) -> Condition {
    let mut by_actual = Condition::all()
        .add(rental::Column::ActualEndDate.is_not_null())
        .add(rental::Column::ActualEndDate.gte(from));
    let mut by_expected = Condition::all()
        .add(rental::Column::ActualEndDate.is_null())
        .add(rental::Column::ExpectedEndDate.gte(from));
    if let Some(to) = to {
        by_actual = by_actual.add(rental::Column::ActualEndDate.lte(to));
        by_expected = by_expected.add(rental::Column::ExpectedEndDate.lte(to));
    }
    Condition::all()
        .add(rental::Column::Status.eq(RentalStatus::Completed))
        .add(Condition::any().add(by_actual).add(by_expected))
}

pub async fn dashboard<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
    policy: &RentalPolicy,
) -> ServiceResult<DashboardStats> {
    let monthly_revenue: Option<i64> = rental::Entity::find()
        .select_only()
        .column_as(Expr::col(rental::Column::TotalCostCents).sum(), "total")
        .filter(completed_ending_between(month_start(today), None))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?
        .flatten();
    let total_deposits: Option<i64> = payment::Entity::find()
        .select_only()
        .column_as(Expr::col(payment::Column::AmountCents).sum(), "total")
        .filter(payment::Column::PaymentType.eq(PaymentType::Deposit))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?
        .flatten();

    Ok(DashboardStats {
        total_cars: car::Entity::find().count(db).await?,
        available_cars: car::Entity::find()
            .filter(car::Column::Status.eq(CarStatus::Available))
            .count(db)
            .await?,
        active_rentals: count_active(db, today).await?,
        total_clients: client_profile::Entity::find().count(db).await?,
        monthly_revenue: money::from_cents(monthly_revenue.unwrap_or(0)),
        total_revenue: money::from_cents(completed_revenue_cents(db).await?),
        total_deposits: money::from_cents(total_deposits.unwrap_or(0)),
        total_fines: money::from_cents(total_fines_cents(db).await?),
        top_cars: top_cars_by_revenue(db, policy.top_cars_limit).await?,
    })
}

/// 按结束日期汇总的每日收入，日期升序
pub async fn revenue_by_period<C: ConnectionTrait>(
    db: &C,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<(NaiveDate, Decimal)>> {
    let rentals = rental::Entity::find()
        .filter(completed_ending_between(from, Some(to)))
        .all(db)
        .await?;
    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for rental in rentals {
        *by_day.entry(rental.end_date()).or_default() += rental.total_cost_cents;
    }
    Ok(by_day
        .into_iter()
        .map(|(day, cents)| (day, money::from_cents(cents)))
        .collect())
}

pub async fn average_rental_cost<C: ConnectionTrait>(db: &C) -> ServiceResult<Decimal> {
    let completed = rental::Entity::find()
        .filter(rental::Column::Status.eq(RentalStatus::Completed))
        .count(db)
        .await?;
    if completed == 0 {
        return Ok(money::round(Decimal::ZERO));
    }
    let total = money::from_cents(completed_revenue_cents(db).await?);
    Ok(money::round(total / Decimal::from(completed)))
}
