//! 存储为字符串列的状态与类型枚举

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 车辆在车队中的状态
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CarStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "rented")]
    Rented,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "unavailable")]
    Unavailable,
}

impl CarStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CarStatus::Available => "Available",
            CarStatus::Rented => "Rented",
            CarStatus::Maintenance => "In maintenance",
            CarStatus::Unavailable => "Unavailable",
        }
    }
}

/// 租赁生命周期状态
///
/// pending -> active -> (overdue ->) completed，pending 也可以被取消
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RentalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "overdue")]
    Overdue,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl RentalStatus {
    /// 占用车辆的状态，用于日期冲突检查
    pub const BLOCKING: [RentalStatus; 3] = [RentalStatus::Active, RentalStatus::Pending, RentalStatus::Overdue];

    pub fn label(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "Awaiting confirmation",
            RentalStatus::Active => "Active",
            RentalStatus::Completed => "Completed",
            RentalStatus::Overdue => "Overdue",
            RentalStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentType {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "additional")]
    Additional,
    #[sea_orm(string_value = "fine")]
    Fine,
}

impl PaymentType {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentType::Deposit => "Deposit",
            PaymentType::Refund => "Deposit refund",
            PaymentType::Additional => "Additional charge",
            PaymentType::Fine => "Fine payment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_from_query_strings() {
        assert_eq!("overdue".parse::<RentalStatus>().unwrap(), RentalStatus::Overdue);
        assert_eq!("maintenance".parse::<CarStatus>().unwrap(), CarStatus::Maintenance);
        assert!("returned".parse::<RentalStatus>().is_err());
        assert_eq!(PaymentType::Refund.to_string(), "refund");
    }
}
