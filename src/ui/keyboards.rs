//! Inline keyboard definitions.
//!
//! A keyboard is a grid of buttons; callback buttons carry an `Action` tag,
//! URL buttons open a link. Labels are content, tags are structure.

use crate::config::SiteLinks;
use crate::dialog::action::Action;
use crate::pricing::Country;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonKind {
    Callback(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub kind: ButtonKind,
}

impl Button {
    pub fn callback(label: &str, action: Action) -> Self {
        Self {
            label: label.to_string(),
            kind: ButtonKind::Callback(action.tag().to_string()),
        }
    }

    pub fn url(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: ButtonKind::Url(url.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    fn rows(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }
}

fn back_button(action: Action) -> Button {
    Button::callback("⬅️ Назад", action)
}

fn main_menu_button() -> Button {
    Button::callback("🏠 В Главное меню", Action::MainMenu)
}

/// Main menu.
pub fn main_menu(links: &SiteLinks) -> Keyboard {
    Keyboard::rows(vec![
        vec![Button::callback(
            "🚗 Подобрать авто на сайте",
            Action::WebsiteMenu,
        )],
        vec![Button::callback(
            "📝 Оставить заявку менеджеру",
            Action::StartLead,
        )],
        vec![Button::callback(
            "🧮 Рассчитать выбранный автомобиль",
            Action::StartCalculator,
        )],
        vec![Button::url("✍️ Написать в Telegram", &links.contact)],
        vec![Button::url("📢 Перейти в наш канал", &links.channel)],
    ])
}

/// Country links for browsing cars on the website.
pub fn website_menu(links: &SiteLinks) -> Keyboard {
    Keyboard::rows(vec![
        vec![Button::url("🇰🇷 Авто из Южной Кореи", &links.korea)],
        vec![Button::url("🇨🇳 Авто из Китая", &links.china)],
        vec![Button::url("🇯🇵 Авто из Японии", &links.japan)],
        vec![back_button(Action::MainMenu)],
    ])
}

pub fn back_to_main_menu() -> Keyboard {
    Keyboard::rows(vec![vec![main_menu_button()]])
}

pub fn back_only(action: Action) -> Keyboard {
    Keyboard::rows(vec![vec![back_button(action)]])
}

/// Cancel the current scene and return to the main menu.
pub fn cancel_scene() -> Keyboard {
    Keyboard::rows(vec![vec![back_button(Action::CancelScene)]])
}

/// Lead flow: confirmation step.
pub fn lead_confirm() -> Keyboard {
    Keyboard::rows(vec![
        vec![Button::callback("✅ Отправить", Action::SendLead)],
        vec![back_button(Action::Back)],
    ])
}

/// Calculator: country selection.
pub fn calculator_country() -> Keyboard {
    Keyboard::rows(vec![
        vec![Button::callback(
            "🇰🇷 Южная Корея",
            Action::SelectCountry(Country::Korea),
        )],
        vec![Button::callback(
            "🇨🇳 Китай",
            Action::SelectCountry(Country::China),
        )],
        vec![Button::callback(
            "🇯🇵 Япония",
            Action::SelectCountry(Country::Japan),
        )],
        vec![main_menu_button()],
    ])
}

/// Calculator: fuel type. Japan's keyboard omits the electric option.
pub fn fuel_type(country: Country) -> Keyboard {
    use crate::pricing::FuelType;

    let mut rows = vec![
        vec![Button::callback(
            "⛽ Бензин/Дизель",
            Action::SelectFuel(FuelType::PetrolDiesel),
        )],
        vec![Button::callback(
            "🌱 Гибрид",
            Action::SelectFuel(FuelType::Hybrid),
        )],
    ];
    if country != Country::Japan {
        rows.push(vec![Button::callback(
            "⚡ Электро",
            Action::SelectFuel(FuelType::Electric),
        )]);
    }
    rows.push(vec![back_button(Action::Back)]);
    Keyboard::rows(rows)
}

/// Calculator: age bracket.
pub fn car_age() -> Keyboard {
    use crate::pricing::AgeBracket;

    Keyboard::rows(vec![
        vec![Button::callback(
            "👶 Моложе 3 лет",
            Action::SelectAge(AgeBracket::Under3),
        )],
        vec![Button::callback(
            "🧑 От 3 до 5 лет",
            Action::SelectAge(AgeBracket::From3To5),
        )],
        vec![Button::callback(
            "👴 Старше 5 лет",
            Action::SelectAge(AgeBracket::Over5),
        )],
        vec![back_button(Action::Back)],
    ])
}

/// Calculator: actions offered under the result.
pub fn calculator_result() -> Keyboard {
    Keyboard::rows(vec![
        vec![Button::callback(
            "🔄 Рассчитать другой автомобиль",
            Action::Recalculate,
        )],
        vec![main_menu_button()],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::FuelType;

    fn callback_tags(keyboard: &Keyboard) -> Vec<String> {
        keyboard
            .rows
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                ButtonKind::Callback(tag) => Some(tag.clone()),
                ButtonKind::Url(_) => None,
            })
            .collect()
    }

    #[test]
    fn japan_fuel_keyboard_omits_electric() {
        let electric_tag = Action::SelectFuel(FuelType::Electric).tag();

        let japan = fuel_type(Country::Japan);
        assert!(!callback_tags(&japan).iter().any(|t| t == electric_tag));

        let korea = fuel_type(Country::Korea);
        assert!(callback_tags(&korea).iter().any(|t| t == electric_tag));
    }

    #[test]
    fn every_callback_tag_decodes() {
        let links = SiteLinks::default();
        let keyboards = [
            main_menu(&links),
            website_menu(&links),
            back_to_main_menu(),
            back_only(Action::Back),
            cancel_scene(),
            lead_confirm(),
            calculator_country(),
            fuel_type(Country::Korea),
            fuel_type(Country::Japan),
            car_age(),
            calculator_result(),
        ];
        for keyboard in &keyboards {
            for tag in callback_tags(keyboard) {
                assert!(
                    Action::decode(&tag).is_some(),
                    "keyboard tag {tag:?} must decode"
                );
            }
        }
    }
}
