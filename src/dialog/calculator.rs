//! Calculator scene — a typed state machine over the question sequence.
//!
//! Each state carries the fields collected so far, so a later step can never
//! observe a missing earlier answer. Backward navigation mirrors the forward
//! transitions and re-issues the prompt the user originally saw.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::channels::Reply;
use crate::pricing::{
    self, AgeBracket, CalculationInput, Country, EngineSpec, FuelType,
};
use crate::rates::RateProvider;
use crate::ui::{keyboards, messages};

use super::action::Action;
use super::{Input, Outcome};

/// Which input the calculator currently expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalcState {
    AwaitCountry,
    AwaitCost {
        country: Country,
    },
    AwaitFuel {
        country: Country,
        cost: Decimal,
    },
    AwaitEngine {
        country: Country,
        cost: Decimal,
        fuel: FuelType,
    },
    AwaitAge {
        country: Country,
        cost: Decimal,
        fuel: FuelType,
        engine: EngineSpec,
    },
    AwaitPostResult {
        country: Country,
        cost: Decimal,
        fuel: FuelType,
        engine: EngineSpec,
    },
}

/// Enter the scene: prompt for the country.
pub fn enter() -> (CalcState, Vec<Reply>) {
    (CalcState::AwaitCountry, vec![country_prompt()])
}

/// Handle one update while the calculator scene is active.
pub async fn handle(state: CalcState, input: Input<'_>, rates: &RateProvider) -> Outcome<CalcState> {
    // The cost-step keyboard offers a shortcut straight back to the country
    // question; honor it from any step.
    if let Input::Action(Action::BackToCountry) = input {
        return Outcome::Continue(CalcState::AwaitCountry, vec![country_prompt()]);
    }
    if let Input::Action(Action::Back) = input {
        return back(state);
    }

    match state {
        CalcState::AwaitCountry => match input {
            Input::Action(Action::SelectCountry(country)) => {
                Outcome::Continue(CalcState::AwaitCost { country }, vec![cost_prompt(country)])
            }
            _ => Outcome::Continue(
                state,
                vec![Reply::text(messages::PLEASE_USE_BUTTONS), country_prompt()],
            ),
        },

        CalcState::AwaitCost { country } => match input {
            Input::Text(text) => match parse_amount(text) {
                Some(cost) => {
                    Outcome::Continue(CalcState::AwaitFuel { country, cost }, vec![fuel_prompt(country)])
                }
                None => Outcome::Continue(
                    state,
                    vec![Reply::text(messages::INVALID_NUMBER), cost_prompt(country)],
                ),
            },
            _ => Outcome::Continue(state, vec![cost_prompt(country)]),
        },

        CalcState::AwaitFuel { country, cost } => match input {
            Input::Action(Action::SelectFuel(fuel)) => {
                if country == Country::Japan && fuel == FuelType::Electric {
                    // Stale or forged tap — the Japan keyboard has no such button.
                    Outcome::Continue(
                        state,
                        vec![
                            Reply::text(messages::JAPAN_ELECTRIC_UNSUPPORTED),
                            fuel_prompt(country),
                        ],
                    )
                } else {
                    Outcome::Continue(
                        CalcState::AwaitEngine { country, cost, fuel },
                        vec![engine_prompt(fuel)],
                    )
                }
            }
            _ => Outcome::Continue(
                state,
                vec![Reply::text(messages::PLEASE_USE_BUTTONS), fuel_prompt(country)],
            ),
        },

        CalcState::AwaitEngine { country, cost, fuel } => match input {
            Input::Text(text) => match parse_positive_int(text) {
                Some(value) => {
                    let engine = match fuel {
                        FuelType::Electric => EngineSpec::Power(value),
                        FuelType::PetrolDiesel | FuelType::Hybrid => EngineSpec::Volume(value),
                    };
                    Outcome::Continue(
                        CalcState::AwaitAge {
                            country,
                            cost,
                            fuel,
                            engine,
                        },
                        vec![age_prompt()],
                    )
                }
                None => Outcome::Continue(
                    state,
                    vec![Reply::text(messages::INVALID_NUMBER), engine_prompt(fuel)],
                ),
            },
            _ => Outcome::Continue(state, vec![engine_prompt(fuel)]),
        },

        CalcState::AwaitAge {
            country,
            cost,
            fuel,
            engine,
        } => match input {
            Input::Action(Action::SelectAge(age)) => {
                run_calculation(country, cost, fuel, engine, age, rates).await
            }
            _ => Outcome::Continue(
                state,
                vec![Reply::text(messages::PLEASE_USE_BUTTONS), age_prompt()],
            ),
        },

        // Recalculate and the menu exit are handled by the dialog engine;
        // anything else just gets the result actions again.
        CalcState::AwaitPostResult { .. } => Outcome::Continue(
            state,
            vec![Reply::with_keyboard(
                messages::USE_RESULT_BUTTONS,
                keyboards::calculator_result(),
            )],
        ),
    }
}

/// Backward navigation — the exact inverse of the forward transitions.
pub fn back(state: CalcState) -> Outcome<CalcState> {
    match state {
        CalcState::AwaitCountry => {
            Outcome::Continue(state, vec![Reply::text(messages::CANT_GO_BACK)])
        }
        CalcState::AwaitCost { .. } => {
            Outcome::Continue(CalcState::AwaitCountry, vec![country_prompt()])
        }
        CalcState::AwaitFuel { country, .. } => {
            Outcome::Continue(CalcState::AwaitCost { country }, vec![cost_prompt(country)])
        }
        CalcState::AwaitEngine { country, cost, .. } => Outcome::Continue(
            CalcState::AwaitFuel { country, cost },
            vec![fuel_prompt(country)],
        ),
        CalcState::AwaitAge {
            country,
            cost,
            fuel,
            ..
        } => Outcome::Continue(
            CalcState::AwaitEngine { country, cost, fuel },
            vec![engine_prompt(fuel)],
        ),
        CalcState::AwaitPostResult {
            country,
            cost,
            fuel,
            engine,
        } => Outcome::Continue(
            CalcState::AwaitAge {
                country,
                cost,
                fuel,
                engine,
            },
            vec![age_prompt()],
        ),
    }
}

/// Invoke the pricing engine and render the breakdown. Failures stay inside
/// the conversation: the user sees a generic message and lands on the
/// post-result step with the usual actions.
async fn run_calculation(
    country: Country,
    cost: Decimal,
    fuel: FuelType,
    engine: EngineSpec,
    age: AgeBracket,
    rates: &RateProvider,
) -> Outcome<CalcState> {
    let next = CalcState::AwaitPostResult {
        country,
        cost,
        fuel,
        engine,
    };
    let mut replies = vec![Reply::text(messages::CALCULATING)];

    let input = match CalculationInput::new(country, cost, fuel, age, engine) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Calculation input rejected");
            replies.push(Reply::text(messages::CALC_ERROR));
            replies.push(Reply::with_keyboard(
                messages::WHAT_NEXT,
                keyboards::calculator_result(),
            ));
            return Outcome::Continue(next, replies);
        }
    };

    let rate_set = rates.get_rates().await;
    match pricing::calculate(&input, &rate_set) {
        Ok(result) => {
            for line in &result.trace {
                tracing::debug!(target: "pricing", "{line}");
            }
            replies.push(Reply::with_keyboard(
                messages::calculation_result(&result),
                keyboards::calculator_result(),
            ));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Calculation failed");
            replies.push(Reply::text(messages::CALC_ERROR));
            replies.push(Reply::with_keyboard(
                messages::WHAT_NEXT,
                keyboards::calculator_result(),
            ));
        }
    }
    Outcome::Continue(next, replies)
}

// ── Prompts ─────────────────────────────────────────────────────────

fn country_prompt() -> Reply {
    Reply::with_keyboard(messages::SELECT_COUNTRY, keyboards::calculator_country())
}

fn cost_prompt(country: Country) -> Reply {
    Reply::with_keyboard(
        messages::enter_car_cost(country.currency()),
        keyboards::back_only(Action::BackToCountry),
    )
}

fn fuel_prompt(country: Country) -> Reply {
    Reply::with_keyboard(messages::SELECT_FUEL, keyboards::fuel_type(country))
}

fn engine_prompt(fuel: FuelType) -> Reply {
    let text = match fuel {
        FuelType::Electric => messages::ENTER_ENGINE_POWER,
        FuelType::PetrolDiesel | FuelType::Hybrid => messages::ENTER_ENGINE_VOLUME,
    };
    Reply::with_keyboard(text, keyboards::back_only(Action::Back))
}

fn age_prompt() -> Reply {
    Reply::with_keyboard(messages::SELECT_CAR_AGE, keyboards::car_age())
}

// ── Parsing ─────────────────────────────────────────────────────────

/// Parse a free-text amount. Spaces are ignored, a comma works as the
/// decimal separator. Must be strictly positive.
fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&cleaned)
        .ok()
        .filter(|v| *v > Decimal::ZERO)
}

/// Parse a free-text positive integer. A fractional tail is dropped.
fn parse_positive_int(text: &str) -> Option<u32> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let integral = cleaned.split('.').next()?;
    integral.parse::<u32>().ok().filter(|v| *v > 0)
}

// ── Tests ───────────────────────────────────────────────────────────
