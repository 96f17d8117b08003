//! Update function of the upload panel.
//!
//! - `FileChosen` reads the file as text and parses it (`Parsed`).
//! - `Submit` releases the batch from the gate and posts it as a multipart
//!   form with a `json` part (`UploadResultsMeta`) and a `file` part.
//! - `Uploaded` ends the in-flight upload; a success empties the panel.

use chrono::NaiveDate;
use common::csv::{find_numeric_anomalies, parse_results_file, ColumnMapping};
use common::requests::{UploadResultsMeta, UploadResultsResponse};
use gloo_console::{error, log};
use gloo_file::futures::read_as_text;
use gloo_file::Blob;
use gloo_net::http::Request;
use web_sys::FormData;
use yew::platform::spawn_local;
use yew::prelude::*;

use super::messages::Msg;
use super::state::ResultsUploadComponent;
use crate::components::helpers::{error_text, format_count, show_toast};

pub fn update(
    component: &mut ResultsUploadComponent,
    ctx: &Context<ResultsUploadComponent>,
    msg: Msg,
) -> bool {
    match msg {
        Msg::OpenFileDialog => {
            if let Some(input) = component.file_input_ref.cast::<web_sys::HtmlInputElement>() {
                input.click();
            }
            false
        }
        Msg::FileChosen(None) => {
            component.reset();
            true
        }
        Msg::FileChosen(Some(file)) => {
            if component.gate.is_uploading() {
                return false;
            }
            component.forget_file();
            component.reading = true;
            component.parse_error = None;
            let link = ctx.link().clone();
            spawn_local(async move {
                match read_as_text(&Blob::from(file.clone())).await {
                    Ok(text) => {
                        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
                        let result = parse_results_file(&file.name(), text, ColumnMapping::Positional);
                        link.send_message(Msg::Parsed { file, result });
                    }
                    Err(e) => link.send_message(Msg::ReadFailed(e.to_string())),
                }
            });
            true
        }
        Msg::Parsed { file, result } => {
            component.reading = false;
            match result {
                Ok(records) => {
                    component.anomalies = find_numeric_anomalies(&records);
                    component.gate.select_file(file.name(), records);
                    component.file = Some(file);
                    component.parse_error = None;
                }
                Err(e) => {
                    component.forget_file();
                    component.parse_error = Some(e.to_string());
                    show_toast(&format!("Error: {}", e));
                }
            }
            true
        }
        Msg::ReadFailed(reason) => {
            component.reading = false;
            component.forget_file();
            error!(format!("Reading the CSV file failed: {}", reason));
            show_toast(&format!("Error: could not read the file ({})", reason));
            true
        }
        Msg::SetTitle(title) => {
            component.gate.set_exam_title(Some(title.clone()));
            component.title_input = title;
            true
        }
        Msg::SetDate(date) => {
            component
                .gate
                .set_exam_date(NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok());
            component.date_input = date;
            true
        }
        Msg::SetVerified(verified) => {
            component.gate.set_verified(verified);
            true
        }
        Msg::Submit => {
            let Some(file) = component.file.clone() else {
                show_toast("Please choose a CSV file first");
                return false;
            };
            let batch = match component.gate.release() {
                Ok(batch) => batch,
                Err(e) => {
                    show_toast(&e.to_string());
                    return true;
                }
            };
            let meta = UploadResultsMeta {
                exam_title: batch.exam_title.clone(),
                exam_date: batch.exam_date,
                verified: true,
            };
            log!(format!(
                "Uploading {} with {} results",
                batch.file_name,
                batch.records.len()
            ));

            let link = ctx.link().clone();
            spawn_local(async move {
                let outcome = post_batch(&meta, &file).await;
                link.send_message(Msg::Uploaded(outcome));
            });
            true
        }
        Msg::Uploaded(Ok(response)) => {
            component.gate.finish(true);
            component.reset();
            show_toast(&format!(
                "Uploaded {} results for exam {}",
                format_count(response.inserted),
                response.file.exam_id
            ));
            ctx.props().on_uploaded.emit(());
            true
        }
        Msg::Uploaded(Err(message)) => {
            component.gate.finish(false);
            error!(format!("Results upload failed: {}", message));
            show_toast(&message);
            true
        }
        Msg::Clear => {
            if !component.gate.is_uploading() {
                component.reset();
            }
            true
        }
    }
}

async fn post_batch(meta: &UploadResultsMeta, file: &web_sys::File) -> Result<UploadResultsResponse, String> {
    let json = serde_json::to_string(meta).map_err(|e| format!("Error: {}", e))?;
    let form = FormData::new().map_err(|_| "Error: the browser refused to build the form".to_string())?;
    form.append_with_str("json", &json)
        .and_then(|_| form.append_with_blob_and_filename("file", file, &file.name()))
        .map_err(|_| "Error: the browser refused to attach the file".to_string())?;

    let request = Request::post("/api/results/upload")
        .body(form)
        .map_err(|e| format!("Error: {}", e))?;
    match request.send().await {
        Ok(resp) if resp.ok() => resp
            .json::<UploadResultsResponse>()
            .await
            .map_err(|e| format!("Error: unexpected response ({})", e)),
        Ok(resp) => Err(error_text(resp).await),
        Err(e) => Err(format!("Error: {}", e)),
    }
}
