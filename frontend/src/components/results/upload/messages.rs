use common::csv::CsvFormatError;
use common::model::result::StudentResultRecord;
use common::requests::UploadResultsResponse;

pub enum Msg {
    OpenFileDialog,
    FileChosen(Option<web_sys::File>),
    Parsed {
        file: web_sys::File,
        result: Result<Vec<StudentResultRecord>, CsvFormatError>,
    },
    ReadFailed(String),
    SetTitle(String),
    SetDate(String),
    SetVerified(bool),
    Submit,
    Uploaded(Result<UploadResultsResponse, String>),
    Clear,
}
