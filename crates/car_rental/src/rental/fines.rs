use rust_decimal::Decimal;

use crate::utils::money;

/// 罚款计算策略
pub trait FineStrategy {
    /// 损伤罚款，按押金比例计算
    fn damage_fine(&self, deposit: Decimal, damage_level: i32) -> Decimal;

    fn late_fine(&self, late_days: i32) -> Decimal;
}

#[derive(Debug, Clone)]
pub struct StandardFineStrategy {
    pub late_fine_per_day: Decimal,
}

impl Default for StandardFineStrategy {
    fn default() -> Self {
        Self {
            late_fine_per_day: Decimal::new(50000, 2),
        }
    }
}

impl StandardFineStrategy {
    pub fn new(late_fine_per_day: Decimal) -> Self {
        Self { late_fine_per_day }
    }

    /// 0 无损伤，1 轻微 10%，2 中等 30%，3 严重 50%；其他等级按 0 处理
    fn damage_multiplier(level: i32) -> Decimal {
        match level {
            1 => Decimal::new(1, 1),
            2 => Decimal::new(3, 1),
            3 => Decimal::new(5, 1),
            _ => Decimal::ZERO,
        }
    }
}

impl FineStrategy for StandardFineStrategy {
    fn damage_fine(&self, deposit: Decimal, damage_level: i32) -> Decimal {
        money::round(deposit * Self::damage_multiplier(damage_level))
    }

    fn late_fine(&self, late_days: i32) -> Decimal {
        if late_days <= 0 {
            return money::round(Decimal::ZERO);
        }
        money::round(self.late_fine_per_day * Decimal::from(late_days))
    }
}

/// 组合损伤与逾期罚款，并计算押金退还额
#[derive(Debug, Clone, Default)]
pub struct FineCalculator<S: FineStrategy = StandardFineStrategy> {
    pub strategy: S,
}

impl<S: FineStrategy> FineCalculator<S> {
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    pub fn total_fines(&self, deposit: Decimal, damage_level: i32, late_days: i32) -> Decimal {
        self.strategy.damage_fine(deposit, damage_level) + self.strategy.late_fine(late_days)
    }

    /// 押金扣除罚款后的退还额，不会为负
    pub fn refund(&self, deposit: Decimal, total_fines: Decimal) -> Decimal {
        money::round((deposit - total_fines).max(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_damage_fine_levels() {
        let strategy = StandardFineStrategy::default();
        let deposit = dec("2394.00");
        assert_eq!(strategy.damage_fine(deposit, 0), dec("0.00"));
        assert_eq!(strategy.damage_fine(deposit, 1), dec("239.40"));
        assert_eq!(strategy.damage_fine(deposit, 2), dec("718.20"));
        assert_eq!(strategy.damage_fine(deposit, 3), dec("1197.00"));
        // 越界等级视为无损伤
        assert_eq!(strategy.damage_fine(deposit, 7), dec("0.00"));
        assert_eq!(strategy.damage_fine(deposit, -1), dec("0.00"));
    }

    #[test]
    fn test_late_fine() {
        let strategy = StandardFineStrategy::default();
        assert_eq!(strategy.late_fine(0), dec("0.00"));
        assert_eq!(strategy.late_fine(-3), dec("0.00"));
        assert_eq!(strategy.late_fine(3), dec("1500.00"));
        assert_eq!(StandardFineStrategy::new(dec("250")).late_fine(2), dec("500.00"));
    }

    #[test]
    fn test_total_and_refund() {
        let calculator = FineCalculator::<StandardFineStrategy>::default();
        let deposit = dec("1000.00");
        let total = calculator.total_fines(deposit, 2, 1);
        assert_eq!(total, dec("800.00"));
        assert_eq!(calculator.refund(deposit, total), dec("200.00"));

        let total = calculator.total_fines(deposit, 3, 2);
        assert_eq!(total, dec("1500.00"));
        assert_eq!(calculator.refund(deposit, total), dec("0.00"));
    }
}
