//! Admin panel for bulk result uploads.
//!
//! Choosing a file parses it in the browser and shows a summary. Nothing is
//! sent until the operator ticks the confirmation box; choosing another file
//! withdraws the confirmation. The server re-parses and re-checks the file.

use yew::prelude::*;

mod messages;
mod props;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use props::ResultsUploadProps;
pub use state::ResultsUploadComponent;

impl Component for ResultsUploadComponent {
    type Message = Msg;
    type Properties = ResultsUploadProps;

    fn create(_ctx: &Context<Self>) -> Self {
        ResultsUploadComponent::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }
}
