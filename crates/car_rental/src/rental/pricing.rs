//! 租金计算策略
//!
//! 四种策略可互换，通过 [`PricingStrategyEnum`] 静态分发：
//! - standard：日租金 × 天数
//! - year_based：按车龄加价或折扣
//! - duration_based：按租期长度折扣
//! - combined：车龄系数与租期折扣叠加（默认）

use car_rental_entity::car;
use chrono::{Datelike, NaiveDate};
use enum_dispatch::enum_dispatch;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::utils::money;

/// 租期天数，首尾两天都计入
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

fn base_price(car: &car::Model, days: i64) -> Decimal {
    money::from_cents(car.daily_price_cents) * Decimal::from(days)
}

fn car_age(car: &car::Model, today: NaiveDate) -> i32 {
    today.year() - car.year
}

/// 车龄系数：越新越贵
fn year_multiplier(age: i32) -> (Decimal, String) {
    if age <= 2 {
        (Decimal::new(12, 1), format!("+20% (car {age} years old)"))
    } else if age <= 5 {
        (Decimal::ONE, "No change (car 3-5 years old)".to_string())
    } else if age <= 10 {
        (Decimal::new(9, 1), format!("-10% (car {age} years old)"))
    } else {
        (Decimal::new(8, 1), format!("-20% (car {age} years old)"))
    }
}

fn duration_discount(days: i64) -> (Decimal, &'static str) {
    if days >= 30 {
        (Decimal::new(15, 2), "-15% (30+ day rental)")
    } else if days >= 14 {
        (Decimal::new(10, 2), "-10% (14+ day rental)")
    } else if days >= 7 {
        (Decimal::new(5, 2), "-5% (7+ day rental)")
    } else {
        (Decimal::ZERO, "No discount")
    }
}

#[enum_dispatch]
pub trait PricingStrategy {
    fn name(&self) -> &'static str;

    /// 计算 [start, end] 区间的租金，today 用于计算车龄
    fn calculate_price(&self, car: &car::Model, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Decimal;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPricing;

impl PricingStrategy for StandardPricing {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn calculate_price(&self, car: &car::Model, start: NaiveDate, end: NaiveDate, _today: NaiveDate) -> Decimal {
        money::round(base_price(car, rental_days(start, end)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YearBasedPricing;

impl PricingStrategy for YearBasedPricing {
    fn name(&self) -> &'static str {
        "year_based"
    }

    fn calculate_price(&self, car: &car::Model, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Decimal {
        let (multiplier, _) = year_multiplier(car_age(car, today));
        money::round(base_price(car, rental_days(start, end)) * multiplier)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DurationBasedPricing;

impl PricingStrategy for DurationBasedPricing {
    fn name(&self) -> &'static str {
        "duration_based"
    }

    fn calculate_price(&self, car: &car::Model, start: NaiveDate, end: NaiveDate, _today: NaiveDate) -> Decimal {
        let days = rental_days(start, end);
        let (discount, _) = duration_discount(days);
        money::round(base_price(car, days) * (Decimal::ONE - discount))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CombinedPricing;

/// combined 策略的计算明细，用于报价展示
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PriceDetails {
    pub days: i64,
    pub base_price: Decimal,
    pub year_multiplier: Decimal,
    pub year_description: String,
    pub year_adjustment: Decimal,
    pub price_with_year: Decimal,
    pub duration_discount: Decimal,
    pub duration_description: String,
    pub duration_discount_amount: Decimal,
    pub final_price: Decimal,
}

impl CombinedPricing {
    pub fn price_details(&self, car: &car::Model, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> PriceDetails {
        let days = rental_days(start, end);
        let base = base_price(car, days);
        let (year_multiplier, year_description) = year_multiplier(car_age(car, today));
        let price_with_year = base * year_multiplier;
        let (duration_discount, duration_description) = duration_discount(days);
        let final_price = price_with_year * (Decimal::ONE - duration_discount);

        PriceDetails {
            days,
            base_price: money::round(base),
            year_multiplier,
            year_description,
            year_adjustment: money::round(price_with_year - base),
            price_with_year: money::round(price_with_year),
            duration_discount,
            duration_description: duration_description.to_string(),
            duration_discount_amount: money::round(price_with_year * duration_discount),
            final_price: money::round(final_price),
        }
    }
}

impl PricingStrategy for CombinedPricing {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn calculate_price(&self, car: &car::Model, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Decimal {
        self.price_details(car, start, end, today).final_price
    }
}

#[enum_dispatch(PricingStrategy)]
#[derive(Debug, Clone, Copy)]
pub enum PricingStrategyEnum {
    StandardPricing,
    YearBasedPricing,
    DurationBasedPricing,
    CombinedPricing,
}

impl Default for PricingStrategyEnum {
    fn default() -> Self {
        CombinedPricing.into()
    }
}

impl PricingStrategyEnum {
    /// 按名称创建策略，未知名称回退到 combined
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "standard" => StandardPricing.into(),
            "year_based" => YearBasedPricing.into(),
            "duration_based" => DurationBasedPricing.into(),
            "combined" => CombinedPricing.into(),
            other => {
                tracing::debug!("未知的计价策略 '{}'，使用 combined", other);
                Self::default()
            }
        }
    }

    /// 只有 combined 提供明细
    pub fn price_details(&self, car: &car::Model, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Option<PriceDetails> {
        match self {
            PricingStrategyEnum::CombinedPricing(combined) => Some(combined.price_details(car, start, end, today)),
            _ => None,
        }
    }
}
