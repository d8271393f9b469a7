//! 测试用的内存数据库与数据构造

use std::str::FromStr;

use car_rental_entity::custom_type::{CarStatus, RentalStatus};
use car_rental_entity::{car, car_type, client_profile, rental, user};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::hash_blocking;
use crate::database::{memory_database, setup_database, DatabaseLocation};
use crate::utils::money;
use crate::utils::time_format::now_standard_string;

pub const TODAY: &str = "2026-06-01";
pub const PASSWORD: &str = "correct-horse";

// argon2 较慢，所有测试账号共用一个哈希
static PASSWORD_HASH: Lazy<String> = Lazy::new(|| hash_blocking(PASSWORD).unwrap());

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub struct Fixture {
    pub db: DatabaseConnection,
}

impl Fixture {
    pub async fn new() -> Self {
        Self {
            db: memory_database().await,
        }
    }

    /// 基于文件的连接池，多个连接可以并发写入
    pub async fn file(path: &std::path::Path) -> Self {
        Self {
            db: setup_database(&DatabaseLocation::File(path.to_path_buf())).await.unwrap(),
        }
    }

    pub async fn car_type(&self, name: &str) -> car_type::Model {
        if let Some(existing) = car_type::Entity::find()
            .filter(car_type::Column::Name.eq(name))
            .one(&self.db)
            .await
            .unwrap()
        {
            return existing;
        }
        car_type::ActiveModel {
            name: Set(name.to_string()),
            description: Set(String::new()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn car(&self, brand: &str, model: &str, year: i32, daily_price: &str) -> car::Model {
        let car_type = self.car_type("Sedan").await;
        car::ActiveModel {
            brand: Set(brand.to_string()),
            model: Set(model.to_string()),
            car_type_id: Set(car_type.id),
            year: Set(year),
            daily_price_cents: Set(money::to_cents(dec(daily_price))),
            photo: Set(None),
            description: Set(String::new()),
            status: Set(CarStatus::Available),
            created_at: Set(now_standard_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn set_car_status(&self, car_id: i32, status: CarStatus) {
        car::ActiveModel {
            id: Set(car_id),
            status: Set(status),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .unwrap();
    }

    pub async fn user(&self, email: &str, is_client: bool, is_superuser: bool) -> user::Model {
        user::ActiveModel {
            username: Set(email.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(PASSWORD_HASH.clone()),
            is_client: Set(is_client),
            is_superuser: Set(is_superuser),
            is_active: Set(true),
            created_at: Set(now_standard_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn admin(&self, email: &str) -> user::Model {
        self.user(email, false, true).await
    }

    pub async fn client(&self, email: &str) -> client_profile::Model {
        let user = self.user(email, true, false).await;
        client_profile::ActiveModel {
            user_id: Set(user.id),
            full_name: Set(format!("Client {}", user.id)),
            address: Set("Kyiv".to_string()),
            phone: Set("+380501112233".to_string()),
            is_blocked: Set(false),
            created_at: Set(now_standard_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    /// 直接写入一条租赁，绕过业务校验，用于构造统计场景
    pub async fn rental(
        &self,
        client_id: i32,
        car_id: i32,
        start: &str,
        expected_end: &str,
        status: RentalStatus,
        total_cost: &str,
    ) -> rental::Model {
        let now = now_standard_string();
        rental::ActiveModel {
            client_id: Set(client_id),
            car_id: Set(car_id),
            start_date: Set(date(start)),
            expected_end_date: Set(date(expected_end)),
            actual_end_date: Set(None),
            deposit_cents: Set(money::to_cents(dec("300"))),
            daily_cost_cents: Set(money::to_cents(dec("100"))),
            total_cost_cents: Set(money::to_cents(dec(total_cost))),
            status: Set(status),
            damage_level: Set(0),
            late_days: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn completed_rental(
        &self,
        client_id: i32,
        car_id: i32,
        start: &str,
        actual_end: &str,
        total_cost: &str,
    ) -> rental::Model {
        let rental = self
            .rental(client_id, car_id, start, actual_end, RentalStatus::Completed, total_cost)
            .await;
        rental::ActiveModel {
            id: Set(rental.id),
            actual_end_date: Set(Some(date(actual_end))),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .unwrap()
    }
}
