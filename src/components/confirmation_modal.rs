//! Yes/no confirmation dialog
//!
//! One instance serves many sequential confirmations: every [`ConfirmationModal::show`]
//! replaces the texts and both callbacks. The confirm callback is async; the modal
//! stays open and reports the error when it fails.

use crate::components::action::Action;
use crate::error::{Result, UiError};
use crate::utils::dom;
use crate::utils::format::escape_html;
use crate::utils::log_trace::{log_debug, log_error, log_info};
use gloo::events::EventListener;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

const LOG: &str = "confirmation-modal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ConfirmationOptions {
    pub title: String,
    pub icon: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub confirm_button_class: String,
    pub show_cancel_button: bool,
}

impl Default for ConfirmationOptions {
    fn default() -> Self {
        ConfirmationOptions {
            title: "Onay".to_string(),
            icon: "fas fa-exclamation-triangle".to_string(),
            message: "Bu işlemi yapmak istediğinize emin misiniz?".to_string(),
            confirm_text: "Evet".to_string(),
            cancel_text: "İptal".to_string(),
            confirm_button_class: "btn-primary".to_string(),
            show_cancel_button: true,
        }
    }
}

impl ConfirmationOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub type ConfirmFuture = Pin<Box<dyn Future<Output = std::result::Result<(), String>>>>;
pub type ConfirmFn = Rc<dyn Fn() -> ConfirmFuture>;
pub type CancelFn = Rc<dyn Fn()>;

fn boxed_confirm<F, Fut>(f: F) -> ConfirmFn
where
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = std::result::Result<(), String>> + 'static,
{
    Rc::new(move || Box::pin(f()) as ConfirmFuture)
}

/// One confirmation round: texts plus callbacks
#[derive(Default, Clone)]
pub struct ConfirmRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    pub description: Option<String>,
    /// Trusted markup, inserted as-is
    pub details: Option<String>,
    pub confirm_text: Option<String>,
    on_confirm: Option<ConfirmFn>,
    on_cancel: Option<CancelFn>,
}

impl ConfirmRequest {
    pub fn new(message: &str) -> Self {
        ConfirmRequest {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }

    pub fn with_confirm_text(mut self, text: &str) -> Self {
        self.confirm_text = Some(text.to_string());
        self
    }

    pub fn on_confirm<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = std::result::Result<(), String>> + 'static,
    {
        self.on_confirm = Some(boxed_confirm(f));
        self
    }

    pub fn on_cancel(mut self, f: impl Fn() + 'static) -> Self {
        self.on_cancel = Some(Rc::new(f));
        self
    }
}

// ============================================
// State
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationState {
    pub options: ConfirmationOptions,
    pub title: String,
    pub message: String,
    pub description: Option<String>,
    pub details: Option<String>,
    pub confirm_text: String,
    /// Last confirmation failure, shown in the details block
    pub error: Option<String>,
    pending: bool,
    confirmed: bool,
    /// Hidden while a confirmation was still running
    dismissed: bool,
}

/// What the modal does once a confirmation settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Close,
    StayOpen,
    /// Already hidden mid-flight and the callback failed
    Cancelled,
}

impl ConfirmationState {
    pub fn new(options: ConfirmationOptions) -> Self {
        ConfirmationState {
            title: options.title.clone(),
            message: options.message.clone(),
            confirm_text: options.confirm_text.clone(),
            description: None,
            details: None,
            error: None,
            pending: false,
            confirmed: false,
            dismissed: false,
            options,
        }
    }

    /// Texts missing from the request fall back to the construction options
    pub fn apply(&mut self, request: &ConfirmRequest) {
        self.title = request.title.clone().unwrap_or_else(|| self.options.title.clone());
        self.message = request.message.clone().unwrap_or_else(|| self.options.message.clone());
        self.confirm_text = request
            .confirm_text
            .clone()
            .unwrap_or_else(|| self.options.confirm_text.clone());
        self.description = request.description.clone().filter(|d| !d.is_empty());
        self.details = request.details.clone().filter(|d| !d.is_empty());
        self.error = None;
        self.confirmed = false;
        self.dismissed = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// False while another confirmation is still running
    pub fn begin_confirm(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        self.error = None;
        true
    }

    pub fn finish_confirm(&mut self, outcome: std::result::Result<(), String>) -> ConfirmOutcome {
        self.pending = false;
        let dismissed = std::mem::take(&mut self.dismissed);
        match outcome {
            // the hidden event is already spent when dismissed
            Ok(()) => {
                self.confirmed = !dismissed;
                ConfirmOutcome::Close
            }
            Err(message) => {
                self.error = Some(message);
                if dismissed {
                    ConfirmOutcome::Cancelled
                } else {
                    ConfirmOutcome::StayOpen
                }
            }
        }
    }

    /// Called on the hidden event; true when `on_cancel` should fire.
    /// A hide during a running confirmation defers to its outcome.
    pub fn take_cancelled(&mut self) -> bool {
        if self.pending {
            self.dismissed = true;
            return false;
        }
        !std::mem::take(&mut self.confirmed)
    }

    pub fn details_html(&self) -> Option<String> {
        match (&self.error, &self.details) {
            (Some(error), _) => Some(format!(
                r#"<i class="fas fa-exclamation-circle me-2"></i>{}"#,
                escape_html(error)
            )),
            (None, Some(details)) => Some(details.clone()),
            (None, None) => None,
        }
    }

    pub fn details_class(&self) -> &'static str {
        if self.error.is_some() {
            "alert alert-danger confirmation-details"
        } else {
            "alert alert-info confirmation-details"
        }
    }

    pub fn confirm_button_html(&self) -> String {
        if self.pending {
            format!(
                r#"<span class="spinner-border spinner-border-sm me-2" role="status"></span>{}"#,
                escape_html(&self.confirm_text)
            )
        } else {
            format!(r#"<i class="fas fa-check me-2"></i>{}"#, escape_html(&self.confirm_text))
        }
    }

    pub fn render_html(&self, modal_id: &str) -> String {
        let o = &self.options;
        let cancel = if o.show_cancel_button {
            format!(
                r#"<button type="button" class="btn btn-secondary" data-bs-dismiss="modal"{}><i class="fas fa-times me-2"></i>{}</button>"#,
                if self.pending { " disabled" } else { "" },
                escape_html(&o.cancel_text)
            )
        } else {
            String::new()
        };
        let details = self.details_html();
        format!(
            r#"<div class="modal fade confirmation-modal" id="{id}" tabindex="-1"><div class="modal-dialog"><div class="modal-content"><div class="modal-header confirmation-modal-header"><h5 class="modal-title"><i class="{icon} me-2"></i><span class="confirmation-title-text">{title}</span></h5><button type="button" class="btn-close btn-close-white" data-bs-dismiss="modal" aria-label="Close"{disabled}></button></div><div class="modal-body"><div class="text-center"><i class="fas fa-question-circle confirmation-icon mb-3"></i><h5 class="confirmation-message">{message}</h5><p class="text-muted confirmation-description" style="display: {desc_display};">{description}</p><div class="{details_class}" style="display: {details_display};">{details}</div></div></div><div class="modal-footer">{cancel}<button type="button" class="btn {confirm_class} confirm-action-btn"{confirm_action}{disabled}>{confirm}</button></div></div></div></div>"#,
            id = escape_html(modal_id),
            icon = escape_html(&o.icon),
            title = escape_html(&self.title),
            message = escape_html(&self.message),
            desc_display = if self.description.is_some() { "block" } else { "none" },
            description = escape_html(self.description.as_deref().unwrap_or("")),
            details_class = self.details_class(),
            details_display = if details.is_some() { "block" } else { "none" },
            details = details.as_deref().unwrap_or(""),
            cancel = cancel,
            confirm_class = escape_html(&o.confirm_button_class),
            confirm_action = Action::Confirm.attrs(),
            disabled = if self.pending { " disabled" } else { "" },
            confirm = self.confirm_button_html(),
        )
    }
}

// ============================================
// Browser binding
// ============================================

#[derive(Clone, Default)]
struct Callbacks {
    on_confirm: Option<ConfirmFn>,
    on_cancel: Option<CancelFn>,
}

struct Inner {
    container: Element,
    modal_id: String,
    state: RefCell<ConfirmationState>,
    callbacks: RefCell<Callbacks>,
    listeners: RefCell<Vec<EventListener>>,
}

#[derive(Clone)]
pub struct ConfirmationModal {
    inner: Rc<Inner>,
}

impl ConfirmationModal {
    pub fn new(container_id: &str, options: ConfirmationOptions) -> Result<Self> {
        let container = dom::container(container_id)?;
        let modal_id = format!("{}-confirmation-modal", container_id);
        let state = ConfirmationState::new(options);
        container.set_inner_html(&state.render_html(&modal_id));

        let inner = Rc::new(Inner {
            container,
            modal_id,
            state: RefCell::new(state),
            callbacks: RefCell::new(Callbacks::default()),
            listeners: RefCell::new(Vec::new()),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        let actions = dom::listen_actions(&inner.container, LOG, move |action, _| {
            if let (Action::Confirm, Some(inner)) = (action, weak.upgrade()) {
                ConfirmationModal { inner }.handle_confirm();
            }
        });
        let mut listeners = vec![actions];

        let modal = ConfirmationModal { inner };
        if let Some(modal_el) = modal.modal_element() {
            let weak = Rc::downgrade(&modal.inner);
            let pending = Rc::downgrade(&modal.inner);
            // Esc and backdrop clicks wait for a running confirmation
            listeners.push(dom::on_modal_hide(&modal_el, move |event| {
                if let Some(inner) = pending.upgrade() {
                    if inner.state.borrow().is_pending() {
                        event.prevent_default();
                    }
                }
            }));
            listeners.push(dom::on_modal_hidden(&modal_el, move |_| {
                if let Some(inner) = weak.upgrade() {
                    ConfirmationModal { inner }.handle_hidden();
                }
            }));
        }
        *modal.inner.listeners.borrow_mut() = listeners;
        Ok(modal)
    }

    fn modal_element(&self) -> Option<Element> {
        dom::find_by_attr(&self.inner.container, "id", &self.inner.modal_id)
    }

    fn find(&self, selector: &str) -> Option<Element> {
        dom::find(&self.inner.container, selector)
    }

    /// Pushes the current state into the mounted markup
    fn sync(&self) {
        let state = self.inner.state.borrow();
        if let Some(el) = self.find(".confirmation-title-text") {
            el.set_text_content(Some(&state.title));
        }
        if let Some(el) = self.find(".confirmation-message") {
            el.set_text_content(Some(&state.message));
        }
        if let Some(el) = self.find(".confirmation-description") {
            el.set_text_content(state.description.as_deref());
            dom::set_display(&el, if state.description.is_some() { "block" } else { "none" });
        }
        if let Some(el) = self.find(".confirmation-details") {
            let details = state.details_html();
            el.set_class_name(state.details_class());
            el.set_inner_html(details.as_deref().unwrap_or(""));
            dom::set_display(&el, if details.is_some() { "block" } else { "none" });
        }
        if let Some(btn) = self.find(".confirm-action-btn") {
            btn.set_inner_html(&state.confirm_button_html());
            dom::set_disabled(&btn, state.is_pending());
        }
        for btn in dom::find_all(&self.inner.container, "[data-bs-dismiss=\"modal\"]") {
            dom::set_disabled(&btn, state.is_pending());
        }
    }

    /// Applies the request, rewires both callbacks and opens the dialog
    pub fn show(&self, request: ConfirmRequest) -> Result<()> {
        self.inner.state.borrow_mut().apply(&request);
        *self.inner.callbacks.borrow_mut() = Callbacks {
            on_confirm: request.on_confirm,
            on_cancel: request.on_cancel,
        };
        self.sync();
        let modal = self.modal_element().ok_or_else(|| UiError::Dom("confirmation modal is not mounted".to_string()))?;
        dom::show_modal(&modal)
    }

    pub fn hide(&self) -> Result<()> {
        match self.modal_element() {
            Some(modal) => dom::hide_modal(&modal),
            None => Ok(()),
        }
    }

    fn handle_confirm(&self) {
        if !self.inner.state.borrow_mut().begin_confirm() {
            log_debug(LOG, "Confirmation already in progress");
            return;
        }
        self.sync();

        let on_confirm = self.inner.callbacks.borrow().on_confirm.clone();
        let modal = self.clone();
        spawn_local(async move {
            let outcome = match on_confirm {
                Some(cb) => cb().await,
                None => Ok(()),
            };
            if let Err(message) = &outcome {
                log_error(LOG, &format!("Confirmation failed: {}", message));
            }
            let next = modal.inner.state.borrow_mut().finish_confirm(outcome);
            modal.sync();
            match next {
                ConfirmOutcome::Close => {
                    log_info(LOG, "Confirmed");
                    if let Err(e) = modal.hide() {
                        log_error(LOG, &format!("Failed to hide modal: {}", e));
                    }
                }
                ConfirmOutcome::Cancelled => modal.fire_cancel(),
                ConfirmOutcome::StayOpen => {}
            }
        });
    }

    fn handle_hidden(&self) {
        if self.inner.state.borrow_mut().take_cancelled() {
            self.fire_cancel();
        }
    }

    fn fire_cancel(&self) {
        let on_cancel = self.inner.callbacks.borrow().on_cancel.clone();
        if let Some(cb) = on_cancel {
            cb();
        }
    }

    pub fn set_on_confirm<F, Fut>(&self, f: F)
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = std::result::Result<(), String>> + 'static,
    {
        self.inner.callbacks.borrow_mut().on_confirm = Some(boxed_confirm(f));
    }

    pub fn set_on_cancel(&self, f: impl Fn() + 'static) {
        self.inner.callbacks.borrow_mut().on_cancel = Some(Rc::new(f));
    }

    pub fn update_message(&self, message: &str) {
        self.inner.state.borrow_mut().message = message.to_string();
        self.sync();
    }

    /// Empty details hide the block
    pub fn update_details(&self, details: &str) {
        self.inner.state.borrow_mut().details = Some(details.to_string()).filter(|d| !d.is_empty());
        self.sync();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_render() {
        let state = ConfirmationState::new(ConfirmationOptions::default());
        let html = state.render_html("m");
        assert!(html.contains("Bu işlemi yapmak istediğinize emin misiniz?"));
        assert!(html.contains("İptal"));
        assert!(html.contains(r#"data-action="confirm""#));
        assert!(html.contains(r#"confirmation-description" style="display: none;""#));
    }

    #[test]
    fn test_hidden_cancel_button() {
        let options = ConfirmationOptions { show_cancel_button: false, ..Default::default() };
        let html = ConfirmationState::new(options).render_html("m");
        assert!(!html.contains("İptal"));
    }

    #[test]
    fn test_apply_replaces_texts() {
        let mut state = ConfirmationState::new(ConfirmationOptions::default());
        state.apply(
            &ConfirmRequest::new("Talep silinsin mi?")
                .with_title("Sil")
                .with_description("Geri alınamaz")
                .with_details("<b>#42</b>"),
        );
        let html = state.render_html("m");
        assert!(html.contains("Talep silinsin mi?"));
        assert!(html.contains("Geri alınamaz"));
        assert!(html.contains("<b>#42</b>"));

        // a second round without extras falls back and hides the blocks
        state.apply(&ConfirmRequest::new("Onaylansın mı?"));
        assert_eq!(state.title, "Onay");
        assert!(state.description.is_none());
        assert!(state.details_html().is_none());
    }

    #[test]
    fn test_failing_confirmation_keeps_modal_open() {
        let mut state = ConfirmationState::new(ConfirmationOptions::default());
        state.apply(&ConfirmRequest::new("Kaydet?"));

        assert!(state.begin_confirm());
        assert!(state.render_html("m").contains(" disabled"));
        let next = state.finish_confirm(Err("Sunucu hatası".to_string()));
        assert_eq!(next, ConfirmOutcome::StayOpen);
        assert!(!state.is_pending());
        assert_eq!(state.details_class(), "alert alert-danger confirmation-details");
        assert!(state.details_html().unwrap().contains("Sunucu hatası"));

        // user dismisses after the failure: that is a cancel
        assert!(state.take_cancelled());
    }

    #[test]
    fn test_successful_confirmation_suppresses_cancel() {
        let mut state = ConfirmationState::new(ConfirmationOptions::default());
        assert!(state.begin_confirm());
        assert_eq!(state.finish_confirm(Ok(())), ConfirmOutcome::Close);
        assert!(!state.take_cancelled());
        // the flag is consumed by one hidden event
        assert!(state.take_cancelled());
    }

    #[test]
    fn test_dismiss_while_pending_defers_to_outcome() {
        let mut state = ConfirmationState::new(ConfirmationOptions::default());
        assert!(state.begin_confirm());
        assert!(!state.take_cancelled());
        assert_eq!(state.finish_confirm(Ok(())), ConfirmOutcome::Close);
        // the next show starts clean
        state.apply(&ConfirmRequest::new("Sil?"));
        assert!(state.take_cancelled());

        assert!(state.begin_confirm());
        assert!(!state.take_cancelled());
        assert_eq!(state.finish_confirm(Err("x".to_string())), ConfirmOutcome::Cancelled);
    }

    #[test]
    fn test_dismiss_buttons_disabled_while_pending() {
        let mut state = ConfirmationState::new(ConfirmationOptions::default());
        assert!(!state.render_html("m").contains(r#"data-bs-dismiss="modal" disabled"#));
        state.begin_confirm();
        let html = state.render_html("m");
        assert!(html.contains(r#"data-bs-dismiss="modal" disabled"#));
        assert!(html.contains(r#"aria-label="Close" disabled"#));
    }

    #[test]
    fn test_reentrant_confirm_is_ignored() {
        let mut state = ConfirmationState::new(ConfirmationOptions::default());
        assert!(state.begin_confirm());
        assert!(!state.begin_confirm());
        state.finish_confirm(Ok(()));
        assert!(state.begin_confirm());
    }

    #[test]
    fn test_retry_clears_previous_error() {
        let mut state = ConfirmationState::new(ConfirmationOptions::default());
        state.begin_confirm();
        state.finish_confirm(Err("x".to_string()));
        state.begin_confirm();
        assert!(state.error.is_none());
    }

    #[test]
    fn test_options_from_json() {
        let options =
            ConfirmationOptions::from_json(r#"{"confirmButtonClass":"btn-danger","showCancelButton":false}"#)
                .unwrap();
        assert_eq!(options.confirm_button_class, "btn-danger");
        assert!(!options.show_cancel_button);
        assert_eq!(options.title, "Onay");
    }
}
