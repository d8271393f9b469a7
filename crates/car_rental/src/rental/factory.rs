//! 租赁创建：日期校验、租金与押金计算、写入租赁与押金支付、更新车辆状态

use car_rental_entity::custom_type::{CarStatus, PaymentType, RentalStatus};
use car_rental_entity::{car, client_profile, payment, rental};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use tracing::info;

use crate::config::RentalPolicy;
use crate::database::begin_write_transaction;
use crate::error::{ServiceError, ServiceResult};
use crate::rental::pricing::{rental_days, PricingStrategy, PricingStrategyEnum};
use crate::service::car as car_service;
use crate::utils::money;
use crate::utils::time_format::now_standard_string;

#[derive(Debug, Clone)]
pub struct NewRental {
    pub car_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 为空时使用策略配置中的默认值
    pub strategy: Option<String>,
}

pub fn validate_rental_dates(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    policy: &RentalPolicy,
) -> ServiceResult<()> {
    if start < today {
        return Err(ServiceError::validation("Start date cannot be in the past"));
    }
    if end <= start {
        return Err(ServiceError::validation("End date must be after the start date"));
    }
    if (end - start).num_days() > policy.max_rental_days {
        return Err(ServiceError::validation(format!(
            "Maximum rental duration is {} days",
            policy.max_rental_days
        )));
    }
    Ok(())
}

/// 押金 = 默认策略下从 today 起 rental_days 天窗口 [today, today + rental_days] 的租金 × 押金比例
pub fn calculate_deposit(car: &car::Model, rental_days: i64, today: NaiveDate, policy: &RentalPolicy) -> Decimal {
    let strategy = PricingStrategyEnum::from_name(&policy.default_strategy);
    let estimated_end = today + Duration::days(rental_days);
    let deposit = money::round(strategy.calculate_price(car, today, estimated_end, today) * policy.deposit_rate);
    deposit.max(Decimal::new(1, 2))
}

pub async fn create_rental(
    db: &DatabaseConnection,
    client: &client_profile::Model,
    request: NewRental,
    today: NaiveDate,
    policy: &RentalPolicy,
) -> ServiceResult<rental::Model> {
    if client.is_blocked {
        return Err(ServiceError::Forbidden("Client account is blocked".to_string()));
    }
    validate_rental_dates(request.start_date, request.end_date, today, policy)?;

    let txn = begin_write_transaction(db).await?;

    let car = car::Entity::find_by_id(request.car_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("car", request.car_id))?;

    if !car.is_available() {
        return Err(ServiceError::Conflict(format!(
            "Car {} {} ({}) is not available for rent",
            car.brand, car.model, car.year
        )));
    }
    if car_service::is_car_busy_for_dates(&txn, car.id, request.start_date, request.end_date).await? {
        return Err(ServiceError::Conflict(
            "Car is already booked for the selected dates".to_string(),
        ));
    }

    let strategy = PricingStrategyEnum::from_name(request.strategy.as_deref().unwrap_or(&policy.default_strategy));
    let total_cost = strategy.calculate_price(&car, request.start_date, request.end_date, today);
    let deposit = calculate_deposit(&car, rental_days(request.start_date, request.end_date), today, policy);
    let status = if request.start_date <= today {
        RentalStatus::Active
    } else {
        RentalStatus::Pending
    };

    let now = now_standard_string();
    let rental = rental::ActiveModel {
        client_id: Set(client.id),
        car_id: Set(car.id),
        start_date: Set(request.start_date),
        expected_end_date: Set(request.end_date),
        actual_end_date: Set(None),
        deposit_cents: Set(money::to_cents(deposit)),
        daily_cost_cents: Set(car.daily_price_cents),
        total_cost_cents: Set(money::to_cents(total_cost)),
        status: Set(status),
        damage_level: Set(0),
        late_days: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    payment::ActiveModel {
        rental_id: Set(rental.id),
        payment_type: Set(PaymentType::Deposit),
        amount_cents: Set(rental.deposit_cents),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut car = car.into_active_model();
    car.status = Set(CarStatus::Rented);
    car.update(&txn).await?;

    txn.commit().await?;

    info!(
        "客户 {} 创建租赁 {}，车辆 {}，策略 {}，押金 {}，租金 {}",
        client.id,
        rental.id,
        rental.car_id,
        strategy.name(),
        deposit,
        total_cost
    );
    Ok(rental)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, dec, Fixture, TODAY};
    use assert_matches::assert_matches;
    use car_rental_entity::prelude::{Car, Payment};

    #[test]
    fn test_validate_rental_dates() {
        let policy = RentalPolicy::default();
        let today = date(TODAY);
        assert!(validate_rental_dates(today, date("2026-06-02"), today, &policy).is_ok());
        assert_matches!(
            validate_rental_dates(date("2026-05-31"), date("2026-06-02"), today, &policy),
            Err(ServiceError::Validation(msg)) if msg.contains("past")
        );
        assert_matches!(
            validate_rental_dates(today, today, today, &policy),
            Err(ServiceError::Validation(msg)) if msg.contains("after the start")
        );
        assert!(validate_rental_dates(today, today + Duration::days(365), today, &policy).is_ok());
        assert_matches!(
            validate_rental_dates(today, today + Duration::days(366), today, &policy),
            Err(ServiceError::Validation(msg)) if msg.contains("365")
        );
    }

    #[tokio::test]
    async fn test_deposit_covers_rental_days_plus_one() {
        let fx = Fixture::new().await;
        let car = fx.car("Toyota", "Corolla", 2021, "1000").await;
        // 7 天租期 -> 报价窗口 8 天，车龄 5 年系数 1.0，8 天折扣 5%
        let deposit = calculate_deposit(&car, 7, date(TODAY), &RentalPolicy::default());
        assert_eq!(deposit, dec("2280.00"));
    }

    #[tokio::test]
    async fn test_create_rental_records_deposit_and_marks_car_rented() {
        let fx = Fixture::new().await;
        let client = fx.client("olena@example.com").await;
        let car = fx.car("Toyota", "Corolla", 2021, "1000").await;

        let rental = create_rental(
            &fx.db,
            &client,
            NewRental {
                car_id: car.id,
                start_date: date(TODAY),
                end_date: date("2026-06-03"),
                strategy: None,
            },
            date(TODAY),
            &RentalPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(rental.status, RentalStatus::Active);
        assert_eq!(money::from_cents(rental.total_cost_cents), dec("3000.00"));
        assert_eq!(money::from_cents(rental.daily_cost_cents), dec("1000.00"));
        // 报价窗口 4 天 -> 4000 × 0.3
        assert_eq!(money::from_cents(rental.deposit_cents), dec("1200.00"));

        let payments = Payment::find().all(&fx.db).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].payment_type, PaymentType::Deposit);
        assert_eq!(payments[0].amount_cents, rental.deposit_cents);

        let car = Car::find_by_id(car.id).one(&fx.db).await.unwrap().unwrap();
        assert_eq!(car.status, CarStatus::Rented);
    }

    #[tokio::test]
    async fn test_future_rental_is_pending_and_uses_requested_strategy() {
        let fx = Fixture::new().await;
        let client = fx.client("taras@example.com").await;
        let car = fx.car("BMW", "X5", 2025, "2000").await;

        let rental = create_rental(
            &fx.db,
            &client,
            NewRental {
                car_id: car.id,
                start_date: date("2026-06-10"),
                end_date: date("2026-06-11"),
                strategy: Some("standard".to_string()),
            },
            date(TODAY),
            &RentalPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(rental.status, RentalStatus::Pending);
        assert_eq!(money::from_cents(rental.total_cost_cents), dec("4000.00"));
    }

    #[tokio::test]
    async fn test_create_rental_rejects_unavailable_car_and_blocked_client() {
        let fx = Fixture::new().await;
        let client = fx.client("ivan@example.com").await;
        let car = fx.car("Audi", "A4", 2020, "1500").await;
        fx.set_car_status(car.id, CarStatus::Maintenance).await;

        let request = NewRental {
            car_id: car.id,
            start_date: date(TODAY),
            end_date: date("2026-06-02"),
            strategy: None,
        };
        let policy = RentalPolicy::default();
        assert_matches!(
            create_rental(&fx.db, &client, request.clone(), date(TODAY), &policy).await,
            Err(ServiceError::Conflict(msg)) if msg.contains("not available")
        );

        let blocked = client_profile::Model {
            is_blocked: true,
            ..client
        };
        assert_matches!(
            create_rental(&fx.db, &blocked, request, date(TODAY), &policy).await,
            Err(ServiceError::Forbidden(_))
        );
        assert_matches!(
            create_rental(
                &fx.db,
                &blocked,
                NewRental {
                    car_id: 9999,
                    start_date: date(TODAY),
                    end_date: date("2026-06-02"),
                    strategy: None,
                },
                date(TODAY),
                &policy,
            )
            .await,
            Err(ServiceError::Forbidden(_))
        );
    }

    #[tokio::test]
    async fn test_create_rental_rejects_overlapping_booking() {
        let fx = Fixture::new().await;
        let first = fx.client("first@example.com").await;
        let second = fx.client("second@example.com").await;
        let car = fx.car("Kia", "Ceed", 2022, "900").await;
        let policy = RentalPolicy::default();

        create_rental(
            &fx.db,
            &first,
            NewRental {
                car_id: car.id,
                start_date: date("2026-06-05"),
                end_date: date("2026-06-08"),
                strategy: None,
            },
            date(TODAY),
            &policy,
        )
        .await
        .unwrap();

        // 车辆状态被后台改回 available 时，档期检查仍然阻止重叠预订
        fx.set_car_status(car.id, CarStatus::Available).await;
        let overlapping = NewRental {
            car_id: car.id,
            start_date: date("2026-06-08"),
            end_date: date("2026-06-10"),
            strategy: None,
        };
        assert_matches!(
            create_rental(&fx.db, &second, overlapping, date(TODAY), &policy).await,
            Err(ServiceError::Conflict(msg)) if msg.contains("already booked")
        );

        let after = NewRental {
            car_id: car.id,
            start_date: date("2026-06-09"),
            end_date: date("2026-06-10"),
            strategy: None,
        };
        assert!(create_rental(&fx.db, &second, after, date(TODAY), &policy).await.is_ok());
    }
}
