//! Public result lookup: a candidate enters their ID and sees every stored
//! result, optionally narrowed to one exam.

use common::model::result::CandidateResult;
use gloo_console::error;
use gloo_net::http::Request;
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::components::helpers::{encode_query, error_text, format_score, show_toast};

pub enum Msg {
    SetCandidate(String),
    SetExam(String),
    Search,
    Found(Result<Vec<CandidateResult>, String>),
}

pub struct ResultLookupComponent {
    candidate_id: String,
    exam_id: String,
    searching: bool,
    /// `None` until the first search finished.
    results: Option<Vec<CandidateResult>>,
}

impl Component for ResultLookupComponent {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            candidate_id: String::new(),
            exam_id: String::new(),
            searching: false,
            results: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetCandidate(value) => {
                self.candidate_id = value;
                true
            }
            Msg::SetExam(value) => {
                self.exam_id = value;
                false
            }
            Msg::Search => {
                let candidate = self.candidate_id.trim();
                if candidate.is_empty() || self.searching {
                    return false;
                }
                let mut url = format!("/api/results/lookup?candidate_id={}", encode_query(candidate));
                let exam = self.exam_id.trim();
                if !exam.is_empty() {
                    url.push_str(&format!("&exam_id={}", encode_query(exam)));
                }
                self.searching = true;
                let link = ctx.link().clone();
                spawn_local(async move {
                    let outcome = match Request::get(&url).send().await {
                        Ok(resp) if resp.ok() => resp
                            .json::<Vec<CandidateResult>>()
                            .await
                            .map_err(|e| format!("Error: unexpected response ({})", e)),
                        Ok(resp) => Err(error_text(resp).await),
                        Err(e) => Err(format!("Error: {}", e)),
                    };
                    link.send_message(Msg::Found(outcome));
                });
                true
            }
            Msg::Found(outcome) => {
                self.searching = false;
                match outcome {
                    Ok(results) => self.results = Some(results),
                    Err(message) => {
                        error!(format!("Result lookup failed: {}", message));
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
            <section class="panel result-lookup">
                <h2>{"Check your results"}</h2>
                <form onsubmit={link.callback(|e: SubmitEvent| {
                    e.prevent_default();
                    Msg::Search
                })}>
                    <input
                        type="text"
                        placeholder="Candidate ID"
                        value={self.candidate_id.clone()}
                        oninput={link.callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::SetCandidate(input.value())
                        })}
                    />
                    <input
                        type="text"
                        placeholder="Exam ID (optional)"
                        value={self.exam_id.clone()}
                        oninput={link.callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::SetExam(input.value())
                        })}
                    />
                    <button type="submit" disabled={self.searching || self.candidate_id.trim().is_empty()}>
                        { if self.searching { "Searching..." } else { "Search" } }
                    </button>
                </form>
                { self.build_results() }
            </section>
        }
    }
}

impl ResultLookupComponent {
    fn build_results(&self) -> Html {
        match &self.results {
            None => html! {},
            Some(results) if results.is_empty() => {
                html! { <p class="hint">{"No results found for this candidate."}</p> }
            }
            Some(results) => html! {
                <table>
                    <thead>
                        <tr>
                            <th>{"Exam ID"}</th>
                            <th>{"Exam date"}</th>
                            <th>{"Mark"}</th>
                            <th>{"Rank"}</th>
                            <th>{"Percentage"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for results.iter().map(|r| {
                            let record = &r.result.record;
                            html! {
                                <tr key={r.result.id.clone()}>
                                    <td>{ record.exam_id.clone() }</td>
                                    <td>{ r.exam_date.format("%Y-%m-%d").to_string() }</td>
                                    <td>{ format_score(record.exam_mark) }</td>
                                    <td>{ record.exam_rank.clone() }</td>
                                    <td>{ format_score(record.percentage) }</td>
                                </tr>
                            }
                        }) }
                    </tbody>
                </table>
            },
        }
    }
}
