//! Row of summary stat cards (icon, number, caption)

use crate::components::action::Action;
use crate::error::{Result, UiError};
use crate::utils::dom;
use crate::utils::format::{escape_html, value_text};
use crate::utils::log_trace::log_warn;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

const LOG: &str = "statistics-cards";
const STAGGER_MS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardLayout {
    #[default]
    Grid,
    Flex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatCard {
    pub title: String,
    pub value: Value,
    pub icon: String,
    /// Bootstrap colour name for the icon badge
    pub color: String,
    pub bg_color: Option<String>,
    pub text_color: Option<String>,
    /// Falls back to the component's `compact`
    pub compact: Option<bool>,
    pub id: Option<String>,
    pub tooltip: Option<String>,
    pub clickable: bool,
}

impl Default for StatCard {
    fn default() -> Self {
        StatCard {
            title: String::new(),
            value: Value::String("0".to_string()),
            icon: "fas fa-chart-bar".to_string(),
            color: "primary".to_string(),
            bg_color: None,
            text_color: None,
            compact: None,
            id: None,
            tooltip: None,
            clickable: false,
        }
    }
}

impl StatCard {
    pub fn new(title: &str, value: impl Into<Value>) -> Self {
        StatCard {
            title: title.to_string(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_icon(mut self, icon: &str, color: &str) -> Self {
        self.icon = icon.to_string();
        self.color = color.to_string();
        self
    }

    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }

    pub fn clickable(mut self) -> Self {
        self.clickable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct StatisticsOptions {
    pub cards: Vec<StatCard>,
    pub layout: CardLayout,
    pub responsive: bool,
    pub compact: bool,
    pub animation: bool,
}

impl Default for StatisticsOptions {
    fn default() -> Self {
        StatisticsOptions {
            cards: Vec::new(),
            layout: CardLayout::Grid,
            responsive: true,
            compact: true,
            animation: true,
        }
    }
}

impl StatisticsOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================
// State
// ============================================

#[derive(Debug, Clone)]
pub struct StatisticsState {
    pub options: StatisticsOptions,
}

impl StatisticsState {
    pub fn new(options: StatisticsOptions) -> Self {
        StatisticsState { options }
    }

    pub fn cards(&self) -> &[StatCard] {
        &self.options.cards
    }

    pub fn set_cards(&mut self, cards: Vec<StatCard>) {
        self.options.cards = cards;
    }

    pub fn add_card(&mut self, card: StatCard) {
        self.options.cards.push(card);
    }

    pub fn remove_card(&mut self, index: usize) -> bool {
        if index >= self.options.cards.len() {
            return false;
        }
        self.options.cards.remove(index);
        true
    }

    /// Shallow-merges `patch` (camelCase keys) into the card
    pub fn update_card(&mut self, index: usize, patch: &Map<String, Value>) -> Result<bool> {
        let Some(card) = self.options.cards.get_mut(index) else {
            return Ok(false);
        };
        let mut merged = match serde_json::to_value(&*card)? {
            Value::Object(map) => map,
            _ => return Err(UiError::InvalidOptions("card is not an object".to_string())),
        };
        merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
        *card = serde_json::from_value(Value::Object(merged))?;
        Ok(true)
    }

    /// Out-of-range indices are skipped
    pub fn update_values<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (usize, Value)>,
    {
        for (index, value) in values {
            if let Some(card) = self.options.cards.get_mut(index) {
                card.value = value;
            }
        }
    }

    pub fn card_html(&self, card: &StatCard, index: usize) -> String {
        let compact = card.compact.unwrap_or(self.options.compact);
        let id = card.id.clone().unwrap_or_else(|| format!("stat-card-{}", index));
        let click = if card.clickable {
            Action::CardClick(index).attrs()
        } else {
            String::new()
        };
        let tooltip = card
            .tooltip
            .as_deref()
            .map(|t| format!(r#" title="{}" data-bs-toggle="tooltip""#, escape_html(t)))
            .unwrap_or_default();
        let mut style = String::new();
        if let Some(bg) = &card.bg_color {
            style.push_str(&format!("background: {};", bg));
        }
        if let Some(color) = &card.text_color {
            style.push_str(&format!("color: {};", color));
        }
        let style = if style.is_empty() {
            String::new()
        } else {
            format!(r#" style="{}""#, escape_html(&style))
        };
        format!(
            r#"<div class="stat-card{}" id="{}"{}{}{}><div class="stat-card-body"><div class="stat-icon bg-{}"><i class="{}"></i></div><div class="stat-content"><h4 class="stat-number">{}</h4><p class="stat-label small">{}</p></div></div></div>"#,
            if compact { " compact" } else { "" },
            escape_html(&id),
            click,
            tooltip,
            style,
            escape_html(&card.color),
            escape_html(&card.icon),
            escape_html(&value_text(&card.value)),
            escape_html(&card.title)
        )
    }

    pub fn render_html(&self) -> String {
        let o = &self.options;
        let cards: String = match o.layout {
            CardLayout::Grid => {
                let column = if o.responsive { "col-lg-3 col-md-6" } else { "col" };
                o.cards
                    .iter()
                    .enumerate()
                    .map(|(i, c)| format!(r#"<div class="{}">{}</div>"#, column, self.card_html(c, i)))
                    .collect()
            }
            CardLayout::Flex => o.cards.iter().enumerate().map(|(i, c)| self.card_html(c, i)).collect(),
        };
        let layout = match o.layout {
            CardLayout::Grid => "row g-3",
            CardLayout::Flex => "d-flex flex-wrap",
        };
        format!(r#"<div class="{} mb-3">{}</div>"#, layout, cards)
    }
}

pub fn loading_html() -> String {
    r#"<div class="row g-3 mb-3"><div class="col-12 text-center"><div class="loading-spinner"><div class="spinner-border text-primary" role="status"><span class="visually-hidden">Yükleniyor...</span></div></div></div></div>"#
        .to_string()
}

pub fn empty_html(message: &str) -> String {
    format!(
        r#"<div class="row g-3 mb-3"><div class="col-12 text-center"><div class="empty-state"><i class="fas fa-chart-line text-muted"></i><p class="text-muted">{}</p></div></div></div>"#,
        escape_html(message)
    )
}

// ============================================
// Browser binding
// ============================================

type CardClickFn = Rc<dyn Fn(usize, &StatCard)>;

struct Inner {
    container: Element,
    state: RefCell<StatisticsState>,
    on_card_click: RefCell<Option<CardClickFn>>,
    listeners: RefCell<Vec<EventListener>>,
}

#[derive(Clone)]
pub struct StatisticsCards {
    inner: Rc<Inner>,
}

impl StatisticsCards {
    pub fn new(container_id: &str, options: StatisticsOptions) -> Result<Self> {
        let container = dom::container(container_id)?;
        let cards = StatisticsCards {
            inner: Rc::new(Inner {
                container,
                state: RefCell::new(StatisticsState::new(options)),
                on_card_click: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        };

        let weak: Weak<Inner> = Rc::downgrade(&cards.inner);
        let actions = dom::listen_actions(&cards.inner.container, LOG, move |action, _| {
            if let (Action::CardClick(index), Some(inner)) = (action, weak.upgrade()) {
                StatisticsCards { inner }.handle_click(index);
            }
        });
        *cards.inner.listeners.borrow_mut() = vec![actions];

        cards.render();
        cards.animate();
        Ok(cards)
    }

    fn handle_click(&self, index: usize) {
        let card = self.inner.state.borrow().cards().get(index).cloned();
        let cb = self.inner.on_card_click.borrow().clone();
        match (cb, card) {
            (Some(cb), Some(card)) => cb(index, &card),
            (_, None) => log_warn(LOG, &format!("No card at index {}", index)),
            _ => {}
        }
    }

    pub fn render(&self) {
        let html = self.inner.state.borrow().render_html();
        self.inner.container.set_inner_html(&html);
    }

    /// Staggered fade-in, one card every 100ms
    fn animate(&self) {
        if !self.inner.state.borrow().options.animation {
            return;
        }
        let cards = dom::find_all(&self.inner.container, ".stat-card");
        for (i, card) in cards.into_iter().enumerate() {
            let Ok(card) = card.dyn_into::<HtmlElement>() else { continue };
            let style = card.style();
            let _ = style.set_property("opacity", "0");
            let _ = style.set_property("transform", "translateY(20px)");
            Timeout::new(i as u32 * STAGGER_MS, move || {
                let style = card.style();
                let _ = style.set_property("transition", "all 0.5s ease");
                let _ = style.set_property("opacity", "1");
                let _ = style.set_property("transform", "translateY(0)");
            })
            .forget();
        }
    }

    pub fn set_cards(&self, cards: Vec<StatCard>) {
        self.inner.state.borrow_mut().set_cards(cards);
        self.render();
        self.animate();
    }

    pub fn add_card(&self, card: StatCard) {
        self.inner.state.borrow_mut().add_card(card);
        self.render();
    }

    pub fn remove_card(&self, index: usize) {
        if self.inner.state.borrow_mut().remove_card(index) {
            self.render();
        }
    }

    pub fn update_card(&self, index: usize, patch: &Map<String, Value>) -> Result<()> {
        if self.inner.state.borrow_mut().update_card(index, patch)? {
            self.render();
        }
        Ok(())
    }

    pub fn update_values<I>(&self, values: I)
    where
        I: IntoIterator<Item = (usize, Value)>,
    {
        self.inner.state.borrow_mut().update_values(values);
        self.render();
    }

    pub fn on_card_click(&self, f: impl Fn(usize, &StatCard) + 'static) -> &Self {
        *self.inner.on_card_click.borrow_mut() = Some(Rc::new(f));
        self
    }

    pub fn show_loading(&self) {
        self.inner.container.set_inner_html(&loading_html());
    }

    pub fn show_empty(&self, message: Option<&str>) {
        self.inner
            .container
            .set_inner_html(&empty_html(message.unwrap_or("İstatistik bulunamadı")));
    }

    pub fn destroy(&self) {
        self.inner.listeners.borrow_mut().clear();
        self.inner.container.set_inner_html("");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> StatisticsState {
        let mut state = StatisticsState::new(StatisticsOptions::default());
        state.set_cards(vec![
            StatCard::new("Açık Talepler", 12).with_icon("fas fa-inbox", "warning"),
            StatCard::new("Onaylanan", "1.250").clickable(),
        ]);
        state
    }

    #[test]
    fn test_grid_markup() {
        let html = state().render_html();
        assert!(html.starts_with(r#"<div class="row g-3 mb-3"><div class="col-lg-3 col-md-6">"#));
        assert!(html.contains(r#"<div class="stat-card compact" id="stat-card-0">"#));
        assert!(html.contains(r#"<div class="stat-icon bg-warning"><i class="fas fa-inbox"></i>"#));
        assert!(html.contains(r#"<h4 class="stat-number">12</h4>"#));
        assert!(html.contains(r#"id="stat-card-1" data-action="card-click" data-args="[1]""#));
    }

    #[test]
    fn test_flex_layout_and_custom_style() {
        let options = StatisticsOptions::from_json(
            r##"{"layout":"flex","compact":false,"cards":[{"title":"Ciro","value":"₺5.000","bgColor":"#222","textColor":"#fff","tooltip":"Bu ay"}]}"##,
        )
        .unwrap();
        let html = StatisticsState::new(options).render_html();
        assert!(html.starts_with(r#"<div class="d-flex flex-wrap mb-3"><div class="stat-card" id="stat-card-0""#));
        assert!(html.contains(r#" title="Bu ay" data-bs-toggle="tooltip""#));
        assert!(html.contains(r#" style="background: #222;color: #fff;""#));
    }

    #[test]
    fn test_update_values_and_remove() {
        let mut state = state();
        state.update_values([(1, json!("1.300")), (7, json!("yok"))]);
        assert_eq!(state.cards()[1].value, json!("1.300"));
        assert_eq!(state.cards().len(), 2);

        assert!(!state.remove_card(5));
        assert!(state.remove_card(0));
        assert_eq!(state.cards()[0].title, "Onaylanan");
    }

    #[test]
    fn test_update_card_merges_fields() {
        let mut state = state();
        let patch = json!({ "value": 15, "color": "danger" });
        assert!(state.update_card(0, patch.as_object().unwrap()).unwrap());
        let card = &state.cards()[0];
        assert_eq!(card.value, json!(15));
        assert_eq!(card.color, "danger");
        assert_eq!(card.icon, "fas fa-inbox");
        assert!(!state.update_card(9, patch.as_object().unwrap()).unwrap());
    }

    #[test]
    fn test_loading_and_empty_markup() {
        assert!(loading_html().contains("spinner-border"));
        assert!(empty_html("<yok>").contains("&lt;yok&gt;"));
    }
}
