//! Admin list of uploaded result files, with download, export and delete.

use common::model::result_file::ResultFileView;
use common::requests::DeleteResponse;
use gloo_console::{error, warn};
use gloo_net::http::Request;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::components::helpers::{confirm, error_text, format_count, show_toast};

#[derive(Properties, PartialEq, Clone)]
pub struct ResultFilesProps {
    /// Bumped by the parent to force a reload, e.g. after an upload.
    #[prop_or_default]
    pub revision: u32,
}

pub enum Msg {
    Load,
    Loaded(Result<Vec<ResultFileView>, String>),
    Delete(String),
    Deleted(String, Result<DeleteResponse, String>),
}

pub struct ResultFilesComponent {
    files: Vec<ResultFileView>,
    loading: bool,
    error: Option<String>,
    /// Id of the file whose deletion is running.
    deleting: Option<String>,
}

impl Component for ResultFilesComponent {
    type Message = Msg;
    type Properties = ResultFilesProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            files: Vec::new(),
            loading: true,
            error: None,
            deleting: None,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().revision != old_props.revision {
            ctx.link().send_message(Msg::Load);
        }
        false
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.loading = true;
                let link = ctx.link().clone();
                spawn_local(async move {
                    let outcome = match Request::get("/api/results/files").send().await {
                        Ok(resp) if resp.ok() => resp
                            .json::<Vec<ResultFileView>>()
                            .await
                            .map_err(|e| format!("Error: unexpected response ({})", e)),
                        Ok(resp) => Err(error_text(resp).await),
                        Err(e) => Err(format!("Error: {}", e)),
                    };
                    link.send_message(Msg::Loaded(outcome));
                });
                true
            }
            Msg::Loaded(Ok(files)) => {
                self.files = files;
                self.loading = false;
                self.error = None;
                true
            }
            Msg::Loaded(Err(message)) => {
                error!(format!("Loading result files failed: {}", message));
                self.loading = false;
                self.error = Some(message);
                true
            }
            Msg::Delete(id) => {
                if self.deleting.is_some() {
                    return false;
                }
                let name = self
                    .files
                    .iter()
                    .find(|f| f.file.id == id)
                    .map(|f| f.file.file_name.clone())
                    .unwrap_or_else(|| id.clone());
                if !confirm(&format!("Delete '{}' and all of its results?", name)) {
                    return false;
                }
                self.deleting = Some(id.clone());
                let link = ctx.link().clone();
                spawn_local(async move {
                    let outcome = match Request::delete(&format!("/api/results/files/{}", id)).send().await {
                        Ok(resp) if resp.ok() => resp
                            .json::<DeleteResponse>()
                            .await
                            .map_err(|e| format!("Error: unexpected response ({})", e)),
                        Ok(resp) => Err(error_text(resp).await),
                        Err(e) => Err(format!("Error: {}", e)),
                    };
                    link.send_message(Msg::Deleted(id, outcome));
                });
                true
            }
            Msg::Deleted(id, outcome) => {
                self.deleting = None;
                match outcome {
                    Ok(response) => {
                        self.files.retain(|f| f.file.id != id);
                        match response.warning {
                            Some(warning) => {
                                warn!(format!("Result file {} deleted with warning: {}", id, warning));
                                show_toast(&format!("Warning: {}", warning));
                            }
                            None => show_toast("Result file deleted"),
                        }
                    }
                    Err(message) => {
                        error!(format!("Deleting result file {} failed: {}", id, message));
                        show_toast(&message);
                    }
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <section class="panel result-files">
                <h2>{"Uploaded result files"}</h2>
                <button disabled={self.loading} onclick={link.callback(|_| Msg::Load)}>{"Refresh"}</button>
                {
                    if let Some(message) = &self.error {
                        html! { <p class="error">{ message.clone() }</p> }
                    } else if self.loading && self.files.is_empty() {
                        html! { <p class="hint">{"Loading..."}</p> }
                    } else if self.files.is_empty() {
                        html! { <p class="hint">{"No result files uploaded yet."}</p> }
                    } else {
                        html! {
                            <table>
                                <thead>
                                    <tr>
                                        <th>{"File"}</th>
                                        <th>{"Exam ID"}</th>
                                        <th>{"Exam date"}</th>
                                        <th>{"Results"}</th>
                                        <th>{"Uploaded"}</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    { for self.files.iter().map(|view| self.build_row(view, link)) }
                                </tbody>
                            </table>
                        }
                    }
                }
            </section>
        }
    }
}

impl ResultFilesComponent {
    fn build_row(&self, view: &ResultFileView, link: &yew::html::Scope<Self>) -> Html {
        let file = &view.file;
        let id = file.id.clone();
        let busy = self.deleting.as_deref() == Some(file.id.as_str());
        html! {
            <tr key={file.id.clone()}>
                <td><a href={view.public_url.clone()} target="_blank">{ file.file_name.clone() }</a></td>
                <td>{ file.exam_id.clone() }</td>
                <td>{ file.exam_date.format("%Y-%m-%d").to_string() }</td>
                <td>{ format_count(file.total_results as usize) }</td>
                <td>{ file.uploaded_at.format("%Y-%m-%d %H:%M").to_string() }</td>
                <td>
                    <a class="icon-btn" title="Export" href={format!("/api/results/files/{}/export", file.id)}>
                        <i class="material-icons">{"download"}</i>
                    </a>
                    <button
                        class="icon-btn"
                        title="Delete"
                        disabled={self.deleting.is_some()}
                        onclick={link.callback(move |_| Msg::Delete(id.clone()))}
                    >
                        <i class="material-icons">{ if busy { "hourglass_empty" } else { "delete" } }</i>
                    </button>
                </td>
            </tr>
        }
    }
}
