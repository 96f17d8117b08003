//! View of the upload panel: file picker, operator metadata, a preview of the
//! parsed rows and the confirmation checkbox gating the submit button.

use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::prelude::*;

use super::messages::Msg;
use super::state::ResultsUploadComponent;
use crate::components::helpers::{format_count, format_score};

const PREVIEW_ROWS: usize = 10;

pub fn view(component: &ResultsUploadComponent, ctx: &Context<ResultsUploadComponent>) -> Html {
    let link = ctx.link();
    let uploading = component.gate.is_uploading();

    html! {
        <section class="panel results-upload">
            <h2>{"Upload results"}</h2>
            <input
                type="file"
                accept=".csv,text/csv"
                style="display: none;"
                ref={component.file_input_ref.clone()}
                onchange={link.callback(|e: Event| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    Msg::FileChosen(input.files().and_then(|files| files.get(0)))
                })}
            />
            <div class="toolbar">
                <button disabled={uploading || component.reading} onclick={link.callback(|_| Msg::OpenFileDialog)}>
                    <i class="material-icons">{"upload_file"}</i>
                    {"Choose CSV"}
                </button>
                <button disabled={uploading} onclick={link.callback(|_| Msg::Clear)}>{"Clear"}</button>
            </div>
            {
                if component.reading {
                    html! { <p class="hint">{"Reading file..."}</p> }
                } else {
                    html! {}
                }
            }
            {
                match &component.parse_error {
                    Some(message) => html! { <p class="error">{ message.clone() }</p> },
                    None => html! {},
                }
            }
            { build_metadata(component, link, uploading) }
            { build_summary(component) }
            { build_preview(component) }
            { build_confirmation(component, link, uploading) }
        </section>
    }
}

fn build_metadata(
    component: &ResultsUploadComponent,
    link: &Scope<ResultsUploadComponent>,
    uploading: bool,
) -> Html {
    html! {
        <div class="form-row">
            <label>
                {"Exam title (optional)"}
                <input
                    type="text"
                    value={component.title_input.clone()}
                    disabled={uploading}
                    oninput={link.callback(|e: InputEvent| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::SetTitle(input.value())
                    })}
                />
            </label>
            <label>
                {"Exam date (defaults to today)"}
                <input
                    type="date"
                    value={component.date_input.clone()}
                    disabled={uploading}
                    onchange={link.callback(|e: Event| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::SetDate(input.value())
                    })}
                />
            </label>
        </div>
    }
}

fn build_summary(component: &ResultsUploadComponent) -> Html {
    let Some(summary) = component.gate.summary() else {
        return html! {};
    };
    html! {
        <div class="summary">
            <p><strong>{"File: "}</strong>{ summary.file_name }</p>
            <p><strong>{"Results: "}</strong>{ format_count(summary.total_results) }</p>
            <p><strong>{"Exam ID: "}</strong>{ summary.exam_id.unwrap_or_else(|| "-".to_string()) }</p>
            {
                if component.anomalies.is_empty() {
                    html! {}
                } else {
                    html! {
                        <p class="warning">
                            { format!(
                                "{} row(s) have a mark or percentage that is not a valid number. They will be stored empty.",
                                format_count(component.anomalies.len())
                            ) }
                        </p>
                    }
                }
            }
        </div>
    }
}

fn build_preview(component: &ResultsUploadComponent) -> Html {
    let records = component.gate.records();
    if records.is_empty() {
        return html! {};
    }
    html! {
        <table class="preview">
            <thead>
                <tr>
                    <th>{"Candidate ID"}</th>
                    <th>{"Exam ID"}</th>
                    <th>{"Exam Mark"}</th>
                    <th>{"Exam Rank"}</th>
                    <th>{"Percentage"}</th>
                </tr>
            </thead>
            <tbody>
                { for records.iter().take(PREVIEW_ROWS).map(|r| html! {
                    <tr>
                        <td>{ r.candidate_id.clone() }</td>
                        <td>{ r.exam_id.clone() }</td>
                        <td>{ format_score(r.exam_mark) }</td>
                        <td>{ r.exam_rank.clone() }</td>
                        <td>{ format_score(r.percentage) }</td>
                    </tr>
                }) }
            </tbody>
            {
                if records.len() > PREVIEW_ROWS {
                    html! {
                        <tfoot>
                            <tr><td colspan="5">{ format!("and {} more", format_count(records.len() - PREVIEW_ROWS)) }</td></tr>
                        </tfoot>
                    }
                } else {
                    html! {}
                }
            }
        </table>
    }
}

fn build_confirmation(
    component: &ResultsUploadComponent,
    link: &Scope<ResultsUploadComponent>,
    uploading: bool,
) -> Html {
    if component.gate.summary().is_none() {
        return html! {};
    }
    html! {
        <div class="confirm">
            <label>
                <input
                    type="checkbox"
                    checked={component.gate.is_verified()}
                    disabled={uploading}
                    onchange={link.callback(|e: Event| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::SetVerified(input.checked())
                    })}
                />
                {"I have checked these results and want to publish them"}
            </label>
            <button
                class="primary"
                disabled={component.reading || !component.gate.can_submit()}
                onclick={link.callback(|_| Msg::Submit)}
            >
                { if uploading { "Uploading..." } else { "Upload results" } }
            </button>
        </div>
    }
}
