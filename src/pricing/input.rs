//! Input types for the pricing engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::rates::CurrencyCode;

/// Source country of the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    Korea,
    China,
    Japan,
}

impl Country {
    /// Currency the car's listed price is denominated in.
    pub fn currency(&self) -> CurrencyCode {
        match self {
            Self::Korea => CurrencyCode::KRW,
            Self::China => CurrencyCode::CNY,
            Self::Japan => CurrencyCode::JPY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Korea => "korea",
            Self::China => "china",
            Self::Japan => "japan",
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fuel type of the car. Drives which engine figure is collected and how
/// the customs payment is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    PetrolDiesel,
    Hybrid,
    Electric,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PetrolDiesel => "petrol_diesel",
            Self::Hybrid => "hybrid",
            Self::Electric => "electric",
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age bracket of the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "<3")]
    Under3,
    #[serde(rename = "3-5")]
    From3To5,
    #[serde(rename = ">5")]
    Over5,
}

impl AgeBracket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Under3 => "<3",
            Self::From3To5 => "3-5",
            Self::Over5 => ">5",
        }
    }
}

impl std::fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine figure collected from the user: displacement for combustion
/// and hybrid cars, power for electric cars. Exactly one is ever present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineSpec {
    /// Displacement in cm³.
    Volume(u32),
    /// Power in horsepower.
    Power(u32),
}

impl EngineSpec {
    /// Check the spec against the selected fuel type, returning it back on
    /// success so callers can bind the validated value.
    pub fn for_fuel(self, fuel: FuelType) -> Result<Self, ValidationError> {
        match (fuel, self) {
            (FuelType::Electric, Self::Power(_)) => Ok(self),
            (FuelType::Electric, Self::Volume(_)) => Err(ValidationError::EnginePowerRequired),
            (_, Self::Volume(_)) => Ok(self),
            (_, Self::Power(_)) => Err(ValidationError::EngineVolumeRequired),
        }
    }
}

/// A validated set of calculation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationInput {
    pub country: Country,
    /// Price in the national currency.
    pub cost: Decimal,
    pub fuel: FuelType,
    pub age: AgeBracket,
    pub engine: EngineSpec,
}

impl CalculationInput {
    pub fn new(
        country: Country,
        cost: Decimal,
        fuel: FuelType,
        age: AgeBracket,
        engine: EngineSpec,
    ) -> Result<Self, ValidationError> {
        let input = Self {
            country,
            cost,
            fuel,
            age,
            engine,
        };
        input.validate()?;
        Ok(input)
    }

    /// Re-check the invariants. `calculate` calls this as well, so inputs
    /// built directly from the public fields are still validated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cost <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveCost(self.cost));
        }
        self.engine.for_fuel(self.fuel)?;
        if self.country == Country::Japan && self.fuel == FuelType::Electric {
            return Err(ValidationError::JapanElectricUnsupported);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn combustion_requires_volume() {
        let err = CalculationInput::new(
            Country::Korea,
            dec!(1000000),
            FuelType::PetrolDiesel,
            AgeBracket::Under3,
            EngineSpec::Power(150),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EngineVolumeRequired);

        let err = CalculationInput::new(
            Country::Korea,
            dec!(1000000),
            FuelType::Hybrid,
            AgeBracket::Under3,
            EngineSpec::Power(150),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EngineVolumeRequired);
    }

    #[test]
    fn electric_requires_power() {
        let err = CalculationInput::new(
            Country::China,
            dec!(200000),
            FuelType::Electric,
            AgeBracket::Under3,
            EngineSpec::Volume(2000),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EnginePowerRequired);
    }

    #[test]
    fn japan_electric_rejected_for_every_age() {
        for age in [AgeBracket::Under3, AgeBracket::From3To5, AgeBracket::Over5] {
            let err = CalculationInput::new(
                Country::Japan,
                dec!(1500000),
                FuelType::Electric,
                age,
                EngineSpec::Power(200),
            )
            .unwrap_err();
            assert_eq!(err, ValidationError::JapanElectricUnsupported);
        }
    }

    #[test]
    fn non_positive_cost_rejected() {
        for cost in [dec!(0), dec!(-1)] {
            let err = CalculationInput::new(
                Country::Korea,
                cost,
                FuelType::PetrolDiesel,
                AgeBracket::Under3,
                EngineSpec::Volume(1600),
            )
            .unwrap_err();
            assert!(matches!(err, ValidationError::NonPositiveCost(_)));
        }
    }

    #[test]
    fn country_currency_mapping() {
        use crate::rates::CurrencyCode;
        assert_eq!(Country::Korea.currency(), CurrencyCode::KRW);
        assert_eq!(Country::China.currency(), CurrencyCode::CNY);
        assert_eq!(Country::Japan.currency(), CurrencyCode::JPY);
    }

    #[test]
    fn age_bracket_serde_tags() {
        assert_eq!(
            serde_json::to_string(&AgeBracket::Under3).unwrap(),
            "\"<3\""
        );
        assert_eq!(
            serde_json::to_string(&AgeBracket::From3To5).unwrap(),
            "\"3-5\""
        );
        assert_eq!(serde_json::to_string(&AgeBracket::Over5).unwrap(), "\">5\"");
    }
}
