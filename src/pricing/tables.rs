//! Tier tables and fixed pricing constants.
//!
//! All tier selection is left-inclusive: a value exactly at a boundary
//! selects the lower tier.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::input::{AgeBracket, Country};

// ── Delivery ────────────────────────────────────────────────────────

pub const KOREA_DELIVERY_KRW: Decimal = dec!(2_000_000);
pub const CHINA_DELIVERY_CNY: Decimal = dec!(12_000);
pub const CHINA_DELIVERY_EXTRA_RUB: Decimal = dec!(50_000);

pub const JAPAN_STANDARD_DELIVERY_JPY: Decimal = dec!(150_000);
pub const JAPAN_SPECIAL_DELIVERY_MIN_JPY: Decimal = dec!(70_000);
pub const JAPAN_SPECIAL_DELIVERY_EXTRA_RUB: Decimal = dec!(475_000);
/// Share of the listed price used as the special delivery base.
pub const JAPAN_SPECIAL_COST_SHARE: Decimal = dec!(0.05);
/// Petrol/diesel cars above this displacement use special delivery pricing.
pub const JAPAN_SPECIAL_VOLUME_CM3: u32 = 1900;

// ── Customs payment ─────────────────────────────────────────────────

pub const ELECTRIC_DUTY_SHARE: Decimal = dec!(0.15);
pub const VAT_SHARE: Decimal = dec!(0.20);

/// Excise brackets for electric cars: inclusive hp range → ₽ per hp.
const EXCISE_BRACKETS: [(u32, u32, Decimal); 6] = [
    (91, 150, dec!(61)),
    (151, 200, dec!(583)),
    (201, 300, dec!(955)),
    (301, 400, dec!(1_628)),
    (401, 500, dec!(1_685)),
    (501, u32::MAX, dec!(1_740)),
];

/// Per-horsepower excise rate. Below 91 hp the rate is zero.
pub fn excise_rate_per_hp(power_hp: u32) -> Decimal {
    for (lo, hi, rate) in EXCISE_BRACKETS {
        if power_hp >= lo && power_hp <= hi {
            return rate;
        }
    }
    Decimal::ZERO
}

/// Duty tier for cars younger than 3 years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyTier {
    /// Share of the ruble cost.
    pub cost_share: Decimal,
    /// EUR per cm³ of displacement.
    pub eur_per_cm3: Decimal,
}

/// Tiers keyed on the EUR-denominated cost.
const UNDER_3_TIERS: [(Decimal, DutyTier); 5] = [
    (
        dec!(8_500),
        DutyTier {
            cost_share: dec!(0.54),
            eur_per_cm3: dec!(2.5),
        },
    ),
    (
        dec!(16_700),
        DutyTier {
            cost_share: dec!(0.48),
            eur_per_cm3: dec!(3.5),
        },
    ),
    (
        dec!(42_300),
        DutyTier {
            cost_share: dec!(0.48),
            eur_per_cm3: dec!(5.5),
        },
    ),
    (
        dec!(84_500),
        DutyTier {
            cost_share: dec!(0.48),
            eur_per_cm3: dec!(7.5),
        },
    ),
    (
        dec!(169_000),
        DutyTier {
            cost_share: dec!(0.48),
            eur_per_cm3: dec!(15),
        },
    ),
];

const UNDER_3_TOP_TIER: DutyTier = DutyTier {
    cost_share: dec!(0.48),
    eur_per_cm3: dec!(20),
};

pub fn under3_duty_tier(cost_eur: Decimal) -> DutyTier {
    for (bound, tier) in UNDER_3_TIERS {
        if cost_eur <= bound {
            return tier;
        }
    }
    UNDER_3_TOP_TIER
}

/// Displacement bounds shared by both used-car tables.
const VOLUME_BOUNDS_CM3: [u32; 5] = [1_000, 1_500, 1_800, 2_300, 3_000];

const FROM_3_TO_5_EUR_PER_CM3: [Decimal; 6] = [
    dec!(1.5),
    dec!(1.7),
    dec!(2.5),
    dec!(2.7),
    dec!(3.0),
    dec!(3.6),
];

const OVER_5_EUR_PER_CM3: [Decimal; 6] = [
    dec!(3.0),
    dec!(3.2),
    dec!(3.5),
    dec!(4.8),
    dec!(5.0),
    dec!(5.7),
];

/// Flat EUR-per-cm³ duty rate for used cars (3-5 and >5 brackets).
/// For cars under 3 years use `under3_duty_tier` instead.
pub fn used_duty_eur_per_cm3(age: AgeBracket, volume_cm3: u32) -> Decimal {
    let table = match age {
        AgeBracket::From3To5 => &FROM_3_TO_5_EUR_PER_CM3,
        AgeBracket::Over5 => &OVER_5_EUR_PER_CM3,
        // Not part of the flat-rate scheme; callers branch on age first.
        AgeBracket::Under3 => &FROM_3_TO_5_EUR_PER_CM3,
    };
    for (i, bound) in VOLUME_BOUNDS_CM3.iter().enumerate() {
        if volume_cm3 <= *bound {
            return table[i];
        }
    }
    table[5]
}

// ── Fixed fees ──────────────────────────────────────────────────────

/// Customs clearance fee tiers keyed on the ruble cost.
const CLEARANCE_TIERS: [(Decimal, Decimal); 8] = [
    (dec!(1_200_000), dec!(3_100)),
    (dec!(2_700_000), dec!(8_530)),
    (dec!(4_200_000), dec!(12_000)),
    (dec!(5_500_000), dec!(15_500)),
    (dec!(7_000_000), dec!(20_000)),
    (dec!(8_000_000), dec!(23_000)),
    (dec!(9_000_000), dec!(25_000)),
    (dec!(10_000_000), dec!(27_000)),
];

const CLEARANCE_TOP_FEE: Decimal = dec!(30_000);

pub fn clearance_fee(cost_rub: Decimal) -> Decimal {
    for (bound, fee) in CLEARANCE_TIERS {
        if cost_rub <= bound {
            return fee;
        }
    }
    CLEARANCE_TOP_FEE
}

pub fn utilization_fee(age: AgeBracket) -> Decimal {
    match age {
        AgeBracket::Under3 => dec!(3_400),
        AgeBracket::From3To5 | AgeBracket::Over5 => dec!(5_200),
    }
}

/// Paperwork/broker fee per source country.
pub fn service_fee(country: Country) -> Decimal {
    match country {
        Country::Korea => dec!(80_000),
        Country::China => dec!(105_000),
        Country::Japan => dec!(80_000),
    }
}

pub const COMPANY_COMMISSION_RUB: Decimal = dec!(50_000);

// ── Tests ───────────────────────────────────────────────────────────
