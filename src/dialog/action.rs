//! Action signals — decoded once at the transport boundary.
//!
//! Inline buttons carry an opaque string tag. `decode` turns it into a
//! closed `Action` the state machines can match on; unknown tags are simply
//! dropped by the caller, since another surface may own them.

use crate::pricing::{AgeBracket, Country, FuelType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MainMenu,
    WebsiteMenu,
    StartLead,
    StartCalculator,
    SelectCountry(Country),
    SelectFuel(FuelType),
    SelectAge(AgeBracket),
    Back,
    BackToCountry,
    CancelScene,
    SendLead,
    Recalculate,
}

impl Action {
    /// The callback tag carried by the corresponding button.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MainMenu => "action_main_menu",
            Self::WebsiteMenu => "action_website_menu",
            Self::StartLead => "action_leave_application",
            Self::StartCalculator => "action_calculate_car",
            Self::SelectCountry(Country::Korea) => "calc_country_korea",
            Self::SelectCountry(Country::China) => "calc_country_china",
            Self::SelectCountry(Country::Japan) => "calc_country_japan",
            Self::SelectFuel(FuelType::PetrolDiesel) => "calc_fuel_petrol_diesel",
            Self::SelectFuel(FuelType::Hybrid) => "calc_fuel_hybrid",
            Self::SelectFuel(FuelType::Electric) => "calc_fuel_electric",
            Self::SelectAge(AgeBracket::Under3) => "calc_age_<3",
            Self::SelectAge(AgeBracket::From3To5) => "calc_age_3-5",
            Self::SelectAge(AgeBracket::Over5) => "calc_age_>5",
            Self::Back => "action_back",
            Self::BackToCountry => "action_back_to_country",
            Self::CancelScene => "action_cancel_scene",
            Self::SendLead => "action_send_application",
            Self::Recalculate => "action_calculate_car_again",
        }
    }

    /// Decode a callback tag. Returns `None` for tags this bot does not own.
    pub fn decode(tag: &str) -> Option<Self> {
        Some(match tag {
            "action_main_menu" => Self::MainMenu,
            "action_website_menu" => Self::WebsiteMenu,
            "action_leave_application" => Self::StartLead,
            "action_calculate_car" => Self::StartCalculator,
            "calc_country_korea" => Self::SelectCountry(Country::Korea),
            "calc_country_china" => Self::SelectCountry(Country::China),
            "calc_country_japan" => Self::SelectCountry(Country::Japan),
            "calc_fuel_petrol_diesel" => Self::SelectFuel(FuelType::PetrolDiesel),
            "calc_fuel_hybrid" => Self::SelectFuel(FuelType::Hybrid),
            "calc_fuel_electric" => Self::SelectFuel(FuelType::Electric),
            "calc_age_<3" => Self::SelectAge(AgeBracket::Under3),
            "calc_age_3-5" => Self::SelectAge(AgeBracket::From3To5),
            "calc_age_>5" => Self::SelectAge(AgeBracket::Over5),
            "action_back" => Self::Back,
            "action_back_to_country" => Self::BackToCountry,
            "action_cancel_scene" => Self::CancelScene,
            "action_send_application" => Self::SendLead,
            "action_calculate_car_again" => Self::Recalculate,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Action; 18] = [
        Action::MainMenu,
        Action::WebsiteMenu,
        Action::StartLead,
        Action::StartCalculator,
        Action::SelectCountry(Country::Korea),
        Action::SelectCountry(Country::China),
        Action::SelectCountry(Country::Japan),
        Action::SelectFuel(FuelType::PetrolDiesel),
        Action::SelectFuel(FuelType::Hybrid),
        Action::SelectFuel(FuelType::Electric),
        Action::SelectAge(AgeBracket::Under3),
        Action::SelectAge(AgeBracket::From3To5),
        Action::SelectAge(AgeBracket::Over5),
        Action::Back,
        Action::BackToCountry,
        Action::CancelScene,
        Action::SendLead,
        Action::Recalculate,
    ];

    #[test]
    fn tags_roundtrip() {
        for action in ALL {
            assert_eq!(Action::decode(action.tag()), Some(action));
        }
    }

    #[test]
    fn tags_are_unique() {
        let mut tags: Vec<&str> = ALL.iter().map(|a| a.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), ALL.len());
    }

    #[test]
    fn unknown_tags_decode_to_none() {
        assert_eq!(Action::decode("calc_country_germany"), None);
        assert_eq!(Action::decode(""), None);
        assert_eq!(Action::decode("action_unknown"), None);
    }
}
