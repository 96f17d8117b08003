use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ResultsUploadProps {
    /// Called after a batch was stored, so lists can reload.
    #[prop_or_default]
    pub on_uploaded: Callback<()>,
}
