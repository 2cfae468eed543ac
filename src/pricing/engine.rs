//! The pricing engine — pure arithmetic over a validated input.
//!
//! `calculate` maps a `CalculationInput` plus an `ExchangeRates` set to an
//! itemized `CalculationResult`. Every computed quantity is appended to the
//! trace with its formula inputs; the trace is advisory and only ever logged.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValidationError;
use crate::format::{format_num, format_rub};
use crate::rates::{CurrencyCode, ExchangeRates};

use super::input::{AgeBracket, CalculationInput, Country, EngineSpec, FuelType};
use super::tables;

/// Itemized result of one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    pub country: Country,
    /// Listed price in the national currency.
    pub original_cost: Decimal,
    pub original_currency: CurrencyCode,
    /// Listed price converted to rubles.
    pub cost_in_rub: Decimal,
    /// Reference EUR value, used only for duty tier selection.
    pub cost_in_eur: Decimal,
    pub delivery_cost: Decimal,
    /// Duty (+ excise + VAT for electric cars).
    pub customs_payment: Decimal,
    pub clearance_fee: Decimal,
    pub utilization_fee: Decimal,
    pub service_fee: Decimal,
    pub commission: Decimal,
    pub grand_total: Decimal,
    /// Human-readable computation log, append-only.
    pub trace: Vec<String>,
}

/// Compute the full import cost breakdown.
pub fn calculate(
    input: &CalculationInput,
    rates: &ExchangeRates,
) -> Result<CalculationResult, ValidationError> {
    input.validate()?;
    let engine = input.engine.for_fuel(input.fuel)?;

    if rates.eur <= Decimal::ZERO {
        return Err(ValidationError::BadRate { code: "EUR" });
    }
    let national_currency = input.country.currency();
    let national_rate = rates.get(national_currency);
    if national_rate <= Decimal::ZERO {
        return Err(ValidationError::BadRate {
            code: national_currency.as_str(),
        });
    }

    let mut trace = Vec::new();

    // 1. Price in rubles, plus the EUR reference used for tier selection.
    let cost_in_rub = input.cost * national_rate;
    let cost_in_eur =
        (cost_in_rub / rates.eur).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    trace.push(format!(
        "1. car cost ({} {national_currency}): {}",
        format_num(input.cost, 0),
        format_rub(cost_in_rub)
    ));
    trace.push(format!(
        "   (≈ {} EUR @ {} RUB/EUR)",
        format_num(cost_in_eur, 0),
        format_num(rates.eur, 2)
    ));

    // 2. Delivery.
    trace.push("2. delivery:".to_string());
    let delivery_cost = delivery_cost(input, engine, rates, &mut trace);

    // 3. Customs payment.
    trace.push(format!(
        "3. customs payment (age {}, fuel {}):",
        input.age, input.fuel
    ));
    let customs_payment = customs_payment(input, engine, cost_in_rub, cost_in_eur, rates, &mut trace);
    trace.push(format!(
        "   - customs payment total: {}",
        format_rub(customs_payment)
    ));

    // 4-6. Fixed fees.
    let clearance_fee = tables::clearance_fee(cost_in_rub);
    trace.push(format!(
        "4. customs clearance fee: {}",
        format_rub(clearance_fee)
    ));

    let utilization_fee = tables::utilization_fee(input.age);
    trace.push(format!(
        "5. utilization fee: {}",
        format_rub(utilization_fee)
    ));

    let service_fee = tables::service_fee(input.country);
    trace.push(format!(
        "6. paperwork/broker fee ({}): {}",
        input.country,
        format_rub(service_fee)
    ));

    let commission = tables::COMPANY_COMMISSION_RUB;
    trace.push(format!("7. company commission: {}", format_rub(commission)));

    // 7. Grand total.
    let grand_total = cost_in_rub
        + delivery_cost
        + customs_payment
        + clearance_fee
        + utilization_fee
        + service_fee
        + commission;
    trace.push("---".to_string());
    trace.push(format!("TOTAL: {}", format_rub(grand_total)));

    Ok(CalculationResult {
        country: input.country,
        original_cost: input.cost,
        original_currency: national_currency,
        cost_in_rub,
        cost_in_eur,
        delivery_cost,
        customs_payment,
        clearance_fee,
        utilization_fee,
        service_fee,
        commission,
        grand_total,
        trace,
    })
}

/// Delivery cost to the border terminal, in rubles.
fn delivery_cost(
    input: &CalculationInput,
    engine: EngineSpec,
    rates: &ExchangeRates,
    trace: &mut Vec<String>,
) -> Decimal {
    match input.country {
        Country::Korea => {
            let cost = tables::KOREA_DELIVERY_KRW * rates.krw;
            trace.push(format!(
                "   - KOR: {} KRW = {}",
                format_num(tables::KOREA_DELIVERY_KRW, 0),
                format_rub(cost)
            ));
            cost
        }
        Country::China => {
            let cost = tables::CHINA_DELIVERY_CNY * rates.cny + tables::CHINA_DELIVERY_EXTRA_RUB;
            trace.push(format!(
                "   - CHN: ({} CNY + {}) = {}",
                format_num(tables::CHINA_DELIVERY_CNY, 0),
                format_rub(tables::CHINA_DELIVERY_EXTRA_RUB),
                format_rub(cost)
            ));
            cost
        }
        Country::Japan => {
            // Special pricing for hybrids and petrol/diesel above 1900 cm³.
            let special = match (input.fuel, engine) {
                (FuelType::Hybrid, _) => true,
                (FuelType::PetrolDiesel, EngineSpec::Volume(v)) => {
                    v > tables::JAPAN_SPECIAL_VOLUME_CM3
                }
                _ => false,
            };

            if special {
                let share = input.cost * tables::JAPAN_SPECIAL_COST_SHARE;
                let base_jpy = share.max(tables::JAPAN_SPECIAL_DELIVERY_MIN_JPY);
                let cost = base_jpy * rates.jpy + tables::JAPAN_SPECIAL_DELIVERY_EXTRA_RUB;
                trace.push(format!(
                    "   - JPN special: base max(5% of {} JPY [= {}], {} JPY) = {} JPY",
                    format_num(input.cost, 0),
                    format_num(share, 0),
                    format_num(tables::JAPAN_SPECIAL_DELIVERY_MIN_JPY, 0),
                    format_num(base_jpy, 0)
                ));
                trace.push(format!(
                    "     ({} JPY × {} RUB/JPY) + {} = {}",
                    format_num(base_jpy, 0),
                    format_num(rates.jpy, 4),
                    format_rub(tables::JAPAN_SPECIAL_DELIVERY_EXTRA_RUB),
                    format_rub(cost)
                ));
                cost
            } else {
                let cost = tables::JAPAN_STANDARD_DELIVERY_JPY * rates.jpy;
                trace.push(format!(
                    "   - JPN standard: {} JPY × {} RUB/JPY = {}",
                    format_num(tables::JAPAN_STANDARD_DELIVERY_JPY, 0),
                    format_num(rates.jpy, 4),
                    format_rub(cost)
                ));
                cost
            }
        }
    }
}

/// Customs payment: duty + excise + VAT for electric cars, duty alone for
/// combustion and hybrid (excise and VAT are embedded in the per-cm³ rates).
fn customs_payment(
    input: &CalculationInput,
    engine: EngineSpec,
    cost_in_rub: Decimal,
    cost_in_eur: Decimal,
    rates: &ExchangeRates,
    trace: &mut Vec<String>,
) -> Decimal {
    match engine {
        EngineSpec::Power(power_hp) => {
            let duty = cost_in_rub * tables::ELECTRIC_DUTY_SHARE;
            trace.push(format!("   - duty (15%): {}", format_rub(duty)));

            let rate = tables::excise_rate_per_hp(power_hp);
            let excise = Decimal::from(power_hp) * rate;
            trace.push(format!(
                "   - excise ({power_hp} hp × {}): {}",
                format_num(rate, 0),
                format_rub(excise)
            ));

            let vat = (cost_in_rub + duty + excise) * tables::VAT_SHARE;
            trace.push(format!("   - VAT (20% of cost+duty+excise): {}", format_rub(vat)));

            duty + excise + vat
        }
        EngineSpec::Volume(volume_cm3) => match input.age {
            AgeBracket::Under3 => {
                let tier = tables::under3_duty_tier(cost_in_eur);
                let by_share = cost_in_rub * tier.cost_share;
                let by_volume = Decimal::from(volume_cm3) * tier.eur_per_cm3 * rates.eur;
                let duty = by_share.max(by_volume);
                trace.push(format!(
                    "   - duty: max({} [{}%], {} [{volume_cm3} cm³ × {} EUR/cm³])",
                    format_rub(by_share),
                    format_num(tier.cost_share * Decimal::ONE_HUNDRED, 0),
                    format_rub(by_volume),
                    format_num(tier.eur_per_cm3, 1)
                ));
                duty
            }
            AgeBracket::From3To5 | AgeBracket::Over5 => {
                let rate = tables::used_duty_eur_per_cm3(input.age, volume_cm3);
                let duty = Decimal::from(volume_cm3) * rate * rates.eur;
                trace.push(format!(
                    "   - duty: {volume_cm3} cm³ × {} EUR/cm³ × {} RUB/EUR = {}",
                    format_num(rate, 1),
                    format_num(rates.eur, 2),
                    format_rub(duty)
                ));
                duty
            }
        },
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn default_rates() -> ExchangeRates {
        ExchangeRates {
            krw: dec!(0.07),
            cny: dec!(12.5),
            jpy: dec!(0.60),
            eur: dec!(95.0),
        }
    }

    fn input(
        country: Country,
        cost: Decimal,
        fuel: FuelType,
        age: AgeBracket,
        engine: EngineSpec,
    ) -> CalculationInput {
        CalculationInput::new(country, cost, fuel, age, engine).unwrap()
    }

    fn assert_components_sum(result: &CalculationResult) {
        let sum = result.cost_in_rub
            + result.delivery_cost
            + result.customs_payment
            + result.clearance_fee
            + result.utilization_fee
            + result.service_fee
            + result.commission;
        assert_eq!(result.grand_total, sum, "grand total must equal the sum");
    }

    #[test]
    fn korea_used_petrol_end_to_end() {
        let result = calculate(
            &input(
                Country::Korea,
                dec!(15_000_000),
                FuelType::PetrolDiesel,
                AgeBracket::From3To5,
                EngineSpec::Volume(1998),
            ),
            &default_rates(),
        )
        .unwrap();

        assert_eq!(result.cost_in_rub, dec!(1_050_000));
        assert_eq!(result.original_currency, CurrencyCode::KRW);
        // 2 000 000 KRW × 0.07
        assert_eq!(result.delivery_cost, dec!(140_000));
        // 1998 cm³ × 2.7 EUR/cm³ × 95 RUB/EUR
        assert_eq!(result.customs_payment, dec!(1998) * dec!(2.7) * dec!(95.0));
        assert_eq!(result.clearance_fee, dec!(3_100));
        assert_eq!(result.utilization_fee, dec!(5_200));
        assert_eq!(result.service_fee, dec!(80_000));
        assert_eq!(result.commission, dec!(50_000));
        assert_components_sum(&result);
        assert!(!result.trace.is_empty());
    }

    #[test]
    fn grand_total_sums_components_across_fuel_types() {
        let rates = default_rates();
        let cases = [
            input(
                Country::Korea,
                dec!(23_000_000),
                FuelType::Hybrid,
                AgeBracket::Under3,
                EngineSpec::Volume(2500),
            ),
            input(
                Country::China,
                dec!(180_000),
                FuelType::Electric,
                AgeBracket::Under3,
                EngineSpec::Power(313),
            ),
            input(
                Country::Japan,
                dec!(1_400_000),
                FuelType::PetrolDiesel,
                AgeBracket::Over5,
                EngineSpec::Volume(660),
            ),
        ];
        for case in cases {
            let result = calculate(&case, &rates).unwrap();
            assert_components_sum(&result);
        }
    }

    #[test]
    fn japan_electric_rejected() {
        let bad = CalculationInput {
            country: Country::Japan,
            cost: dec!(1_000_000),
            fuel: FuelType::Electric,
            age: AgeBracket::Under3,
            engine: EngineSpec::Power(150),
        };
        let err = calculate(&bad, &default_rates()).unwrap_err();
        assert_eq!(err, ValidationError::JapanElectricUnsupported);
    }

    #[test]
    fn mismatched_engine_spec_rejected() {
        let bad = CalculationInput {
            country: Country::Korea,
            cost: dec!(1_000_000),
            fuel: FuelType::Electric,
            age: AgeBracket::Under3,
            engine: EngineSpec::Volume(2000),
        };
        assert_eq!(
            calculate(&bad, &default_rates()).unwrap_err(),
            ValidationError::EnginePowerRequired
        );

        let bad = CalculationInput {
            fuel: FuelType::Hybrid,
            engine: EngineSpec::Power(120),
            ..bad
        };
        assert_eq!(
            calculate(&bad, &default_rates()).unwrap_err(),
            ValidationError::EngineVolumeRequired
        );
    }

    #[test]
    fn non_positive_rates_rejected() {
        let good = input(
            Country::Korea,
            dec!(1_000_000),
            FuelType::PetrolDiesel,
            AgeBracket::Under3,
            EngineSpec::Volume(1600),
        );

        let mut rates = default_rates();
        rates.eur = dec!(0);
        assert_eq!(
            calculate(&good, &rates).unwrap_err(),
            ValidationError::BadRate { code: "EUR" }
        );

        let mut rates = default_rates();
        rates.krw = dec!(-0.07);
        assert_eq!(
            calculate(&good, &rates).unwrap_err(),
            ValidationError::BadRate { code: "KRW" }
        );
    }

    #[test]
    fn japan_delivery_boundary_at_1900_cm3() {
        let rates = default_rates();
        let standard = calculate(
            &input(
                Country::Japan,
                dec!(1_000_000),
                FuelType::PetrolDiesel,
                AgeBracket::From3To5,
                EngineSpec::Volume(1900),
            ),
            &rates,
        )
        .unwrap();
        // 150 000 JPY × 0.60
        assert_eq!(standard.delivery_cost, dec!(90_000));

        let special = calculate(
            &input(
                Country::Japan,
                dec!(1_000_000),
                FuelType::PetrolDiesel,
                AgeBracket::From3To5,
                EngineSpec::Volume(1901),
            ),
            &rates,
        )
        .unwrap();
        // max(5% × 1 000 000, 70 000) = 50 000 → 70 000 JPY × 0.60 + 475 000
        assert_eq!(special.delivery_cost, dec!(70_000) * dec!(0.60) + dec!(475_000));
    }

    #[test]
    fn japan_hybrid_always_uses_special_delivery() {
        let result = calculate(
            &input(
                Country::Japan,
                dec!(3_000_000),
                FuelType::Hybrid,
                AgeBracket::From3To5,
                EngineSpec::Volume(1500),
            ),
            &default_rates(),
        )
        .unwrap();
        // 5% of 3 000 000 = 150 000 JPY beats the 70 000 minimum
        assert_eq!(
            result.delivery_cost,
            dec!(150_000) * dec!(0.60) + dec!(475_000)
        );
    }

    #[test]
    fn japan_special_minimum_applies_to_cheap_cars() {
        let result = calculate(
            &input(
                Country::Japan,
                dec!(500_000),
                FuelType::Hybrid,
                AgeBracket::Over5,
                EngineSpec::Volume(1300),
            ),
            &default_rates(),
        )
        .unwrap();
        // 5% of 500 000 = 25 000 < 70 000 minimum
        assert_eq!(
            result.delivery_cost,
            dec!(70_000) * dec!(0.60) + dec!(475_000)
        );
    }

    #[test]
    fn china_delivery_includes_ruble_surcharge() {
        let result = calculate(
            &input(
                Country::China,
                dec!(150_000),
                FuelType::PetrolDiesel,
                AgeBracket::Under3,
                EngineSpec::Volume(1500),
            ),
            &default_rates(),
        )
        .unwrap();
        // 12 000 CNY × 12.5 + 50 000
        assert_eq!(result.delivery_cost, dec!(200_000));
    }

    #[test]
    fn electric_customs_includes_duty_excise_vat() {
        let rates = default_rates();
        let result = calculate(
            &input(
                Country::China,
                dec!(180_000),
                FuelType::Electric,
                AgeBracket::Under3,
                EngineSpec::Power(313),
            ),
            &rates,
        )
        .unwrap();

        let cost_rub = dec!(180_000) * dec!(12.5); // 2 250 000
        let duty = cost_rub * dec!(0.15);
        let excise = dec!(313) * dec!(1_628);
        let vat = (cost_rub + duty + excise) * dec!(0.20);
        assert_eq!(result.customs_payment, duty + excise + vat);
        assert_components_sum(&result);
    }

    #[test]
    fn electric_below_91_hp_has_no_excise() {
        let rates = default_rates();
        let result = calculate(
            &input(
                Country::China,
                dec!(80_000),
                FuelType::Electric,
                AgeBracket::Under3,
                EngineSpec::Power(90),
            ),
            &rates,
        )
        .unwrap();

        let cost_rub = dec!(80_000) * dec!(12.5);
        let duty = cost_rub * dec!(0.15);
        let vat = (cost_rub + duty) * dec!(0.20);
        assert_eq!(result.customs_payment, duty + vat);
    }

    #[test]
    fn under3_duty_takes_max_of_share_and_volume() {
        let rates = default_rates();

        // Expensive small engine: the percentage side wins.
        // cost 60 000 000 KRW → 4 200 000 ₽ → ≈ 44 211 EUR → tier 48%/7.5
        let result = calculate(
            &input(
                Country::Korea,
                dec!(60_000_000),
                FuelType::PetrolDiesel,
                AgeBracket::Under3,
                EngineSpec::Volume(1000),
            ),
            &rates,
        )
        .unwrap();
        let by_share = dec!(4_200_000) * dec!(0.48);
        let by_volume = dec!(1000) * dec!(7.5) * dec!(95.0);
        assert!(by_share > by_volume);
        assert_eq!(result.customs_payment, by_share);

        // Cheap big engine: the volume side wins.
        // cost 5 000 000 KRW → 350 000 ₽ → ≈ 3 684 EUR → tier 54%/2.5
        let result = calculate(
            &input(
                Country::Korea,
                dec!(5_000_000),
                FuelType::PetrolDiesel,
                AgeBracket::Under3,
                EngineSpec::Volume(3000),
            ),
            &rates,
        )
        .unwrap();
        let by_share = dec!(350_000) * dec!(0.54);
        let by_volume = dec!(3000) * dec!(2.5) * dec!(95.0);
        assert!(by_volume > by_share);
        assert_eq!(result.customs_payment, by_volume);
    }

    #[test]
    fn trace_mentions_every_component() {
        let result = calculate(
            &input(
                Country::Korea,
                dec!(15_000_000),
                FuelType::PetrolDiesel,
                AgeBracket::From3To5,
                EngineSpec::Volume(1998),
            ),
            &default_rates(),
        )
        .unwrap();

        let trace = result.trace.join("\n");
        for needle in [
            "1. car cost",
            "2. delivery",
            "3. customs payment",
            "4. customs clearance fee",
            "5. utilization fee",
            "6. paperwork/broker fee",
            "7. company commission",
            "TOTAL",
        ] {
            assert!(trace.contains(needle), "trace missing {needle:?}:\n{trace}");
        }
    }
}
