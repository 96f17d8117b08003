//! Notices and study materials: a public list, plus upload and delete
//! controls shown to administrators.

use common::model::document::{DocumentKind, DocumentView};
use common::model::session::Role;
use common::requests::{DeleteResponse, UploadDocumentMeta};
use gloo_console::{error, warn};
use gloo_net::http::Request;
use web_sys::{FormData, HtmlInputElement};
use yew::html::Scope;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::components::helpers::{confirm, error_text, show_toast};
use crate::components::session::RoleGate;

#[derive(Properties, PartialEq, Clone)]
pub struct DocumentsProps {
    pub kind: DocumentKind,
}

pub enum Msg {
    Load,
    Loaded(Result<Vec<DocumentView>, String>),
    SetTitle(String),
    SetDescription(String),
    FileChosen(Option<web_sys::File>),
    Publish,
    Published(Result<DocumentView, String>),
    Delete(String),
    Deleted(String, Result<DeleteResponse, String>),
}

pub struct DocumentsComponent {
    documents: Vec<DocumentView>,
    error: Option<String>,
    title: String,
    description: String,
    file: Option<web_sys::File>,
    publishing: bool,
    file_input_ref: NodeRef,
}

fn heading(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Notice => "Notices",
        DocumentKind::StudyMaterial => "Study materials",
    }
}

impl Component for DocumentsComponent {
    type Message = Msg;
    type Properties = DocumentsProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            documents: Vec::new(),
            error: None,
            title: String::new(),
            description: String::new(),
            file: None,
            publishing: false,
            file_input_ref: NodeRef::default(),
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().kind != old_props.kind {
            self.documents.clear();
            ctx.link().send_message(Msg::Load);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                let url = format!("/api/documents?kind={}", ctx.props().kind.as_str());
                let link = ctx.link().clone();
                spawn_local(async move {
                    let outcome = match Request::get(&url).send().await {
                        Ok(resp) if resp.ok() => resp
                            .json::<Vec<DocumentView>>()
                            .await
                            .map_err(|e| format!("Error: unexpected response ({})", e)),
                        Ok(resp) => Err(error_text(resp).await),
                        Err(e) => Err(format!("Error: {}", e)),
                    };
                    link.send_message(Msg::Loaded(outcome));
                });
                false
            }
            Msg::Loaded(Ok(documents)) => {
                self.documents = documents;
                self.error = None;
                true
            }
            Msg::Loaded(Err(message)) => {
                error!(format!("Loading documents failed: {}", message));
                self.error = Some(message);
                true
            }
            Msg::SetTitle(title) => {
                self.title = title;
                true
            }
            Msg::SetDescription(description) => {
                self.description = description;
                false
            }
            Msg::FileChosen(file) => {
                self.file = file;
                true
            }
            Msg::Publish => {
                if self.publishing {
                    return false;
                }
                let Some(file) = self.file.clone() else {
                    show_toast("Please choose a file first");
                    return false;
                };
                if self.title.trim().is_empty() {
                    show_toast("A title is required");
                    return false;
                }
                let meta = UploadDocumentMeta {
                    kind: ctx.props().kind,
                    title: self.title.trim().to_string(),
                    description: Some(self.description.trim().to_string()).filter(|d| !d.is_empty()),
                };
                self.publishing = true;
                let link = ctx.link().clone();
                spawn_local(async move {
                    let outcome = post_document(&meta, &file).await;
                    link.send_message(Msg::Published(outcome));
                });
                true
            }
            Msg::Published(Ok(view)) => {
                self.publishing = false;
                show_toast(&format!("Published '{}'", view.document.title));
                self.documents.insert(0, view);
                self.title.clear();
                self.description.clear();
                self.file = None;
                if let Some(input) = self.file_input_ref.cast::<HtmlInputElement>() {
                    input.set_value("");
                }
                true
            }
            Msg::Published(Err(message)) => {
                self.publishing = false;
                error!(format!("Publishing document failed: {}", message));
                show_toast(&message);
                true
            }
            Msg::Delete(id) => {
                if !confirm("Unpublish this document?") {
                    return false;
                }
                let link = ctx.link().clone();
                spawn_local(async move {
                    let outcome = match Request::delete(&format!("/api/documents/{}", id)).send().await {
                        Ok(resp) if resp.ok() => resp
                            .json::<DeleteResponse>()
                            .await
                            .map_err(|e| format!("Error: unexpected response ({})", e)),
                        Ok(resp) => Err(error_text(resp).await),
                        Err(e) => Err(format!("Error: {}", e)),
                    };
                    link.send_message(Msg::Deleted(id, outcome));
                });
                false
            }
            Msg::Deleted(id, Ok(response)) => {
                self.documents.retain(|d| d.document.id != id);
                match response.warning {
                    Some(warning) => {
                        warn!(format!("Document {} deleted with warning: {}", id, warning));
                        show_toast(&format!("Warning: {}", warning));
                    }
                    None => show_toast("Document unpublished"),
                }
                true
            }
            Msg::Deleted(id, Err(message)) => {
                error!(format!("Deleting document {} failed: {}", id, message));
                show_toast(&message);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <section class="panel documents">
                <h2>{ heading(ctx.props().kind) }</h2>
                <RoleGate role={Role::Admin}>
                    { self.build_upload_form(link) }
                </RoleGate>
                {
                    if let Some(message) = &self.error {
                        html! { <p class="error">{ message.clone() }</p> }
                    } else if self.documents.is_empty() {
                        html! { <p class="hint">{"Nothing published yet."}</p> }
                    } else {
                        html! {
                            <ul class="document-list">
                                { for self.documents.iter().map(|view| build_item(view, link)) }
                            </ul>
                        }
                    }
                }
            </section>
        }
    }
}

impl DocumentsComponent {
    fn build_upload_form(&self, link: &Scope<Self>) -> Html {
        html! {
            <div class="form-row">
                <input
                    type="text"
                    placeholder="Title"
                    value={self.title.clone()}
                    disabled={self.publishing}
                    oninput={link.callback(|e: InputEvent| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::SetTitle(input.value())
                    })}
                />
                <input
                    type="text"
                    placeholder="Description (optional)"
                    value={self.description.clone()}
                    disabled={self.publishing}
                    oninput={link.callback(|e: InputEvent| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::SetDescription(input.value())
                    })}
                />
                <input
                    type="file"
                    ref={self.file_input_ref.clone()}
                    disabled={self.publishing}
                    onchange={link.callback(|e: Event| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::FileChosen(input.files().and_then(|files| files.get(0)))
                    })}
                />
                <button
                    class="primary"
                    disabled={self.publishing || self.file.is_none() || self.title.trim().is_empty()}
                    onclick={link.callback(|_| Msg::Publish)}
                >
                    { if self.publishing { "Publishing..." } else { "Publish" } }
                </button>
            </div>
        }
    }
}

fn build_item(view: &DocumentView, link: &Scope<DocumentsComponent>) -> Html {
    let document = &view.document;
    let id = document.id.clone();
    html! {
        <li key={document.id.clone()}>
            <a href={view.public_url.clone()} target="_blank">{ document.title.clone() }</a>
            <span class="date">{ document.uploaded_at.format("%Y-%m-%d").to_string() }</span>
            {
                match &document.description {
                    Some(description) => html! { <p>{ description.clone() }</p> },
                    None => html! {},
                }
            }
            <RoleGate role={Role::Admin}>
                <button
                    class="icon-btn"
                    title="Unpublish"
                    onclick={link.callback(move |_| Msg::Delete(id.clone()))}
                >
                    <i class="material-icons">{"delete"}</i>
                </button>
            </RoleGate>
        </li>
    }
}

async fn post_document(meta: &UploadDocumentMeta, file: &web_sys::File) -> Result<DocumentView, String> {
    let json = serde_json::to_string(meta).map_err(|e| format!("Error: {}", e))?;
    let form = FormData::new().map_err(|_| "Error: the browser refused to build the form".to_string())?;
    form.append_with_str("json", &json)
        .and_then(|_| form.append_with_blob_and_filename("file", file, &file.name()))
        .map_err(|_| "Error: the browser refused to attach the file".to_string())?;

    let request = Request::post("/api/documents/upload")
        .body(form)
        .map_err(|e| format!("Error: {}", e))?;
    match request.send().await {
        Ok(resp) if resp.ok() => resp
            .json::<DocumentView>()
            .await
            .map_err(|e| format!("Error: unexpected response ({})", e)),
        Ok(resp) => Err(error_text(resp).await),
        Err(e) => Err(format!("Error: {}", e)),
    }
}
