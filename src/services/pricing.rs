// src/services/pricing.rs

use crate::{
    errors::{AppError, AppResult},
    models::{ServiceProvider, Settings},
};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Platform/provider split of a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionSplit {
    pub commission_amount: Decimal,
    pub provider_earning: Decimal,
}

/// Rounds to cents, halves away from zero.
pub fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub struct PricingService;

impl PricingService {
    /// Splits `price` at `rate` percent. The provider share is the remainder,
    /// so the two parts always add back up to `price`.
    pub fn split(price: Decimal, rate: Decimal) -> CommissionSplit {
        let commission_amount = money(price * rate / dec!(100));
        CommissionSplit {
            commission_amount,
            provider_earning: price - commission_amount,
        }
    }

    /// Rate recorded on a commission: `amount / total * 100`, zero for a zero total.
    pub fn derived_rate(commission_amount: Decimal, total_amount: Decimal) -> Decimal {
        if total_amount.is_zero() {
            return Decimal::ZERO;
        }
        money(commission_amount / total_amount * dec!(100))
    }

    /// Provider override first, then the platform default.
    pub fn resolve_rate(provider: &ServiceProvider, settings: &Settings) -> Decimal {
        provider
            .commission_rate
            .unwrap_or(settings.commission.default_rate)
    }

    pub fn validate_rate(rate: Decimal) -> AppResult<()> {
        if rate < Decimal::ZERO || rate > dec!(100) {
            return Err(AppError::Validation(
                "Commission rate must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_price(price: Decimal) -> AppResult<()> {
        if price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Service price must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
