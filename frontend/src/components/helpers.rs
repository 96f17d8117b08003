//! Small browser helpers shared by the portal components.

use gloo_net::http::Response;
use num_format::{Locale, ToFormattedString};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const TOAST_MS: u32 = 4000;

const TOAST_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("bottom", "20px"),
    ("left", "50%"),
    ("transform", "translateX(-50%)"),
    ("color", "#fff"),
    ("padding", "10px 20px"),
    ("border-radius", "4px"),
    ("z-index", "10000"),
    ("font-family", "Arial, sans-serif"),
];

/// Failures are tinted red so they stand out from confirmations.
fn toast_background(message: &str) -> &'static str {
    if message.starts_with("Error") || message.starts_with("Warning") {
        "rgba(160, 20, 20, 0.9)"
    } else {
        "rgba(0, 0, 0, 0.8)"
    }
}

/// Displays a temporary notification at the bottom of the screen.
///
/// Every outcome the operator needs to know about (upload done, upload
/// failed, deletion warning) goes through here.
pub fn show_toast(message: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) else {
        return;
    };
    toast.set_text_content(Some(message));
    let toast: HtmlElement = toast.unchecked_into();
    let style = toast.style();
    for (property, value) in TOAST_STYLE {
        style.set_property(property, value).ok();
    }
    style.set_property("background", toast_background(message)).ok();

    if body.append_child(&toast).is_ok() {
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(TOAST_MS).await;
            toast.remove();
        });
    }
}

/// Asks the browser for a yes/no confirmation. `false` when no window.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Text of a failed response. The server sends `Error: <message>`.
pub async fn error_text(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(text) if !text.trim().is_empty() => text,
        _ => format!("Error: request failed with status {}", status),
    }
}

pub fn format_count(count: usize) -> String {
    count.to_formatted_string(&Locale::en)
}

/// Marks and percentages as shown in tables; `NaN` is rendered as a dash.
pub fn format_score(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Percent-encodes a query string value.
pub fn encode_query(value: &str) -> String {
    js_sys::encode_uri_component(value).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_and_warnings_get_the_alert_background() {
        let alert = toast_background("Error: upload failed");
        assert_eq!(toast_background("Warning: stored file kept"), alert);
        assert_ne!(toast_background("Result file deleted"), alert);
    }
}
