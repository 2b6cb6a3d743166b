//! Browser glue shared by the component bindings
//!
//! Everything here touches web-sys and only runs inside the browser.

use crate::components::action::Action;
use crate::error::{Result, UiError};
use crate::utils::log_trace::{log_debug, log_warn};
use gloo::events::EventListener;
use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlAnchorElement, HtmlElement, Window};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| UiError::Dom("window is not available".to_string()))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| UiError::Dom("document is not available".to_string()))
}

/// Resolves a component container; a missing id is an integration error
pub fn container(id: &str) -> Result<Element> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| UiError::ContainerNotFound(id.to_string()))
}

pub fn find(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn find_all(root: &Element, selector: &str) -> Vec<Element> {
    let mut found = Vec::new();
    if let Ok(list) = root.query_selector_all(selector) {
        for i in 0..list.length() {
            if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                found.push(el);
            }
        }
    }
    found
}

/// Wires the single delegated click listener of a component root.
/// Dropping the returned listener detaches it.
pub fn listen_actions<F>(root: &Element, category: &'static str, handler: F) -> EventListener
where
    F: Fn(Action, Element) + 'static,
{
    let scope = root.clone();
    EventListener::new(root, "click", move |event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(el)) = target.closest("[data-action]") else {
            return;
        };
        if !scope.contains(Some(&el)) {
            return;
        }
        let Some(name) = el.get_attribute("data-action") else {
            return;
        };
        let args = el.get_attribute("data-args");
        match Action::parse(&name, args.as_deref()) {
            Some(action) => {
                log_debug(category, &format!("action: {:?}", action));
                handler(action, el);
            }
            None => log_warn(category, &format!("Unrecognised action \"{}\" ({:?})", name, args)),
        }
    })
}

/// Triggers a client-side download of a text payload
pub fn download_text(content: &str, mime: &str, filename: &str) -> Result<()> {
    let document = document()?;

    let blob_parts = js_sys::Array::new();
    blob_parts.push(&JsValue::from_str(content));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &options)
        .map_err(UiError::dom)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(UiError::dom)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(UiError::dom)?
        .dyn_into()
        .map_err(|_| UiError::Dom("anchor element cast failed".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    if let Some(body) = document.body() {
        let _ = body.append_child(&anchor);
        anchor.click();
        let _ = body.remove_child(&anchor);
    } else {
        anchor.click();
    }
    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

pub async fn copy_to_clipboard(text: &str) -> Result<()> {
    let clipboard = window()?.navigator().clipboard();
    JsFuture::from(clipboard.write_text(text))
        .await
        .map_err(|e| UiError::Clipboard(format!("{:?}", e)))?;
    Ok(())
}

/// Adds `class` to `el` and removes it again after `millis`
pub fn flash_class(el: Element, class: &'static str, millis: u32) {
    let _ = el.class_list().add_1(class);
    spawn_local(async move {
        gloo::timers::future::TimeoutFuture::new(millis).await;
        let _ = el.class_list().remove_1(class);
    });
}

/// Sets the inline `display` style (`"none"`, `"flex"`, `""` ...)
pub fn set_display(el: &Element, display: &str) {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        let _ = el.style().set_property("display", display);
    }
}

pub fn set_disabled(el: &Element, disabled: bool) {
    if disabled {
        let _ = el.set_attribute("disabled", "");
    } else {
        let _ = el.remove_attribute("disabled");
    }
}

/// First descendant whose `attr` equals `value`; avoids building selectors from user ids
pub fn find_by_attr(root: &Element, attr: &str, value: &str) -> Option<Element> {
    find_all(root, &format!("[{}]", attr))
        .into_iter()
        .find(|el| el.get_attribute(attr).as_deref() == Some(value))
}

pub fn alert(message: &str) {
    gloo::dialogs::alert(message);
}

// ============================================
// Bootstrap modal controller
// ============================================

fn modal_instance(el: &Element) -> Result<JsValue> {
    let window = window()?;
    let bootstrap = Reflect::get(&window, &JsValue::from_str("bootstrap")).map_err(UiError::dom)?;
    if bootstrap.is_undefined() {
        return Err(UiError::Dom("bootstrap is not loaded".to_string()));
    }
    let modal = Reflect::get(&bootstrap, &JsValue::from_str("Modal")).map_err(UiError::dom)?;
    let factory: Function = Reflect::get(&modal, &JsValue::from_str("getOrCreateInstance"))
        .map_err(UiError::dom)?
        .dyn_into()
        .map_err(UiError::dom)?;
    factory.call1(&modal, el).map_err(UiError::dom)
}

fn call_method(target: &JsValue, name: &str) -> Result<()> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))
        .map_err(UiError::dom)?
        .dyn_into()
        .map_err(UiError::dom)?;
    method.call0(target).map_err(UiError::dom)?;
    Ok(())
}

pub fn show_modal(el: &Element) -> Result<()> {
    call_method(&modal_instance(el)?, "show")
}

pub fn hide_modal(el: &Element) -> Result<()> {
    call_method(&modal_instance(el)?, "hide")
}

pub fn dispose_modal(el: &Element) -> Result<()> {
    call_method(&modal_instance(el)?, "dispose")
}

/// Bootstrap's cancelable pre-hide event
pub fn on_modal_hide<F>(el: &Element, handler: F) -> EventListener
where
    F: FnMut(&web_sys::Event) + 'static,
{
    EventListener::new(el, "hide.bs.modal", handler)
}

pub fn on_modal_hidden<F>(el: &Element, handler: F) -> EventListener
where
    F: FnMut(&web_sys::Event) + 'static,
{
    EventListener::new(el, "hidden.bs.modal", handler)
}
