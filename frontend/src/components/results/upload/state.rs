//! State of the results upload panel.
//!
//! The confirmation rules live in `common::gate::ValidationGate`; this struct
//! adds what only the browser has: the chosen `File`, the raw date input and
//! the last parse problem.

use common::csv::RowAnomaly;
use common::gate::ValidationGate;
use yew::prelude::*;

pub struct ResultsUploadComponent {
    pub gate: ValidationGate,

    /// The file behind the current selection, sent as-is on submit.
    pub file: Option<web_sys::File>,

    /// Header or extension problem of the last chosen file.
    pub parse_error: Option<String>,

    /// Rows whose mark or percentage did not parse, shown as a warning.
    pub anomalies: Vec<RowAnomaly>,

    pub title_input: String,
    pub date_input: String,

    /// True while the chosen file is being read.
    pub reading: bool,

    pub file_input_ref: NodeRef,
}

impl ResultsUploadComponent {
    pub fn new() -> Self {
        Self {
            gate: ValidationGate::new(),
            file: None,
            parse_error: None,
            anomalies: Vec::new(),
            title_input: String::new(),
            date_input: String::new(),
            reading: false,
            file_input_ref: NodeRef::default(),
        }
    }

    /// Forgets the previously parsed file so nothing stale can be submitted.
    pub fn forget_file(&mut self) {
        self.gate.deselect();
        self.file = None;
        self.anomalies.clear();
    }

    /// Empties the panel, including the native file input.
    pub fn reset(&mut self) {
        self.gate.clear();
        self.file = None;
        self.parse_error = None;
        self.anomalies.clear();
        self.title_input.clear();
        self.date_input.clear();
        self.reading = false;
        if let Some(input) = self.file_input_ref.cast::<web_sys::HtmlInputElement>() {
            input.set_value("");
        }
    }
}
