//! User-facing message texts.
//!
//! All internal errors surface as one of the generic messages here; detailed
//! diagnostics only ever go to the logs.

use crate::format::{format_num, format_rub};
use crate::pricing::{CalculationResult, Country};
use crate::rates::CurrencyCode;

// ── Common ──────────────────────────────────────────────────────────

pub const START: &str = "Здравствуйте! Я помощник по подбору и расчету стоимости \
автомобилей из Азии.\nЧем я могу Вам помочь?";
pub const GENERIC_ERROR: &str =
    "Произошла непредвиденная ошибка. Попробуйте еще раз или вернитесь в главное меню.";
pub const MAIN_MENU: &str = "Вы вернулись в главное меню.";
pub const ACTION_CANCELLED: &str = "Действие отменено.";
pub const PLEASE_USE_BUTTONS: &str = "Пожалуйста, используйте кнопки для навигации.";
pub const INVALID_NUMBER: &str =
    "Неверный формат. Пожалуйста, введите числовое значение (можно с точкой или запятой).";
pub const CANT_GO_BACK: &str = "Не могу вернуться назад с этого шага.";
pub const PROCESSING: &str = "⏳ Обработка...";

// ── Website menu ────────────────────────────────────────────────────

pub const SELECT_WEBSITE: &str = "Выберите страну для подбора авто на нашем сайте:";

// ── Lead flow ───────────────────────────────────────────────────────

pub const LEAD_START: &str = "Чтобы оставить заявку, пожалуйста, ответьте на несколько вопросов.";
pub const LEAD_NAME: &str = "Введите Ваше имя:";
pub const LEAD_PHONE: &str =
    "Введите Ваш номер телефона (например, +79123456789 или 89123456789):";
pub const INVALID_PHONE: &str = "Неверный формат номера телефона. Пожалуйста, введите номер \
в формате +7XXXXXXXXXX или 8XXXXXXXXXX.";
pub const LEAD_SENT: &str =
    "✅ Спасибо! Ваша заявка отправлена менеджеру. Мы скоро с Вами свяжемся.";

pub fn lead_confirm(name: &str, phone: &str) -> String {
    format!("Проверьте данные:\nИмя: {name}\nТелефон: {phone}\n\nОтправить заявку?")
}

pub fn lead_forwarded(name: &str, phone: &str, username: Option<&str>) -> String {
    format!(
        "🔔 Новая заявка от @{}:\n\nИмя: {name}\nТелефон: {phone}",
        username.unwrap_or("пользователя")
    )
}

// ── Calculator flow ─────────────────────────────────────────────────

pub const SELECT_COUNTRY: &str = "Выберите страну происхождения автомобиля для расчета:";
pub const SELECT_FUEL: &str = "Выберите тип топлива:";
pub const ENTER_ENGINE_VOLUME: &str = "Введите объём двигателя в см³ (только цифры):";
pub const ENTER_ENGINE_POWER: &str = "Введите мощность двигателя в л.с. (только цифры):";
pub const SELECT_CAR_AGE: &str = "Выберите возраст автомобиля:";
pub const CALCULATING: &str = "⏳ Рассчитываю стоимость...";
pub const RESULT_TITLE: &str = "⚙️ Предварительный расчет стоимости автомобиля:";
pub const RESULT_DISCLAIMER: &str = "*Обратите внимание, что расчет является предварительным. \
Финальная стоимость может незначительно отличаться.*";
pub const JAPAN_ELECTRIC_UNSUPPORTED: &str =
    "Извините, расчет электромобилей из Японии не поддерживается.";
pub const CALC_ERROR: &str = "Ошибка при расчете. Попробуйте еще раз.";
pub const WHAT_NEXT: &str = "Что вы хотите сделать?";
pub const RECALC_RESTART: &str = "Хорошо, давайте рассчитаем другой автомобиль.";
pub const USE_RESULT_BUTTONS: &str =
    "Пожалуйста, используйте кнопки «Рассчитать другой» или «В Главное меню».";

pub fn enter_car_cost(currency: CurrencyCode) -> String {
    format!("Введите стоимость авто в {currency} (только цифры):")
}

/// Render the itemized breakdown shown to the user.
pub fn calculation_result(result: &CalculationResult) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "- Стоимость авто ({} {}): {}",
        format_num(result.original_cost, 0),
        result.original_currency,
        format_rub(result.cost_in_rub)
    ));
    let destination = match result.country {
        Country::China => "Уссурийска",
        _ => "Владивостока",
    };
    lines.push(format!(
        "- Доставка до {destination}: {}",
        format_rub(result.delivery_cost)
    ));
    lines.push(format!(
        "- Услуги оформления/брокера: {}",
        format_rub(result.service_fee)
    ));
    lines.push(format!(
        "- Таможенный платеж: {}",
        format_rub(result.customs_payment)
    ));
    lines.push(format!(
        "- Таможенные сборы: {}",
        format_rub(result.clearance_fee)
    ));
    lines.push(format!(
        "- Утилизационный сбор: {}",
        format_rub(result.utilization_fee)
    ));
    lines.push(format!(
        "- Комиссия компании: {}",
        format_rub(result.commission)
    ));

    format!(
        "{RESULT_TITLE}\n\n{}\n\n📊 Итоговая стоимость (ориентировочно): {}\n\n{RESULT_DISCLAIMER}",
        lines.join("\n"),
        format_rub(result.grand_total)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{AgeBracket, CalculationInput, EngineSpec, FuelType, calculate};
    use crate::rates::ExchangeRates;
    use rust_decimal_macros::dec;

    #[test]
    fn result_rendering_lists_all_seven_items_and_total() {
        let rates = ExchangeRates {
            krw: dec!(0.07),
            cny: dec!(12.5),
            jpy: dec!(0.60),
            eur: dec!(95.0),
        };
        let input = CalculationInput::new(
            Country::Korea,
            dec!(15_000_000),
            FuelType::PetrolDiesel,
            AgeBracket::From3To5,
            EngineSpec::Volume(1998),
        )
        .unwrap();
        let result = calculate(&input, &rates).unwrap();
        let text = calculation_result(&result);

        for needle in [
            "Стоимость авто",
            "Доставка до Владивостока",
            "Услуги оформления/брокера",
            "Таможенный платеж",
            "Таможенные сборы",
            "Утилизационный сбор",
            "Комиссия компании",
            "Итоговая стоимость",
        ] {
            assert!(text.contains(needle), "missing {needle:?} in:\n{text}");
        }
        // KRW cost with ru-RU grouping
        assert!(text.contains("15\u{a0}000\u{a0}000 KRW"));
    }

    #[test]
    fn china_result_ships_to_ussuriysk() {
        let rates = ExchangeRates {
            krw: dec!(0.07),
            cny: dec!(12.5),
            jpy: dec!(0.60),
            eur: dec!(95.0),
        };
        let input = CalculationInput::new(
            Country::China,
            dec!(150_000),
            FuelType::PetrolDiesel,
            AgeBracket::Under3,
            EngineSpec::Volume(1500),
        )
        .unwrap();
        let result = calculate(&input, &rates).unwrap();
        assert!(calculation_result(&result).contains("Доставка до Уссурийска"));
    }

    #[test]
    fn lead_forwarded_without_username() {
        let text = lead_forwarded("Иван", "+79123456789", None);
        assert!(text.contains("@пользователя"));
        assert!(text.contains("Иван"));
        assert!(text.contains("+79123456789"));
    }
}
