use crate::components::documents::DocumentsComponent;
use crate::components::results::files::ResultFilesComponent;
use crate::components::results::lookup::ResultLookupComponent;
use crate::components::results::upload::ResultsUploadComponent;
use crate::components::session::{RoleGate, SessionContext, SessionProvider};
use common::model::document::DocumentKind;
use common::model::session::Role;
use yew::context::ContextHandle;
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq)]
pub enum Tab {
    Results,
    Notices,
    Materials,
    Admin,
}

impl Tab {
    fn label(self) -> &'static str {
        match self {
            Tab::Results => "Results",
            Tab::Notices => "Notices",
            Tab::Materials => "Study materials",
            Tab::Admin => "Admin",
        }
    }
}

pub enum Msg {
    SetTab(Tab),
    Uploaded,
}

pub struct App {
    tab: Tab,
    /// Bumped after each upload so the file list reloads.
    files_revision: u32,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            tab: Tab::Results,
            files_revision: 0,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetTab(tab) => {
                self.tab = tab;
                true
            }
            Msg::Uploaded => {
                self.files_revision = self.files_revision.wrapping_add(1);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <SessionProvider>
                <header class="app-header">
                    <h1>{"Institute Portal"}</h1>
                    <SessionBadge />
                </header>
                <nav class="tab-bar">
                    { for [Tab::Results, Tab::Notices, Tab::Materials].into_iter().map(|tab| self.tab_button(tab, link)) }
                    <RoleGate role={Role::Admin}>
                        { self.tab_button(Tab::Admin, link) }
                    </RoleGate>
                </nav>
                <main>
                    {
                        match self.tab {
                            Tab::Results => html! { <ResultLookupComponent /> },
                            Tab::Notices => html! { <DocumentsComponent kind={DocumentKind::Notice} /> },
                            Tab::Materials => html! { <DocumentsComponent kind={DocumentKind::StudyMaterial} /> },
                            Tab::Admin => html! {
                                <RoleGate
                                    role={Role::Admin}
                                    fallback={html! { <p class="error">{"Administrator access required."}</p> }}
                                >
                                    <ResultsUploadComponent on_uploaded={link.callback(|_| Msg::Uploaded)} />
                                    <ResultFilesComponent revision={self.files_revision} />
                                </RoleGate>
                            },
                        }
                    }
                </main>
            </SessionProvider>
        }
    }
}

impl App {
    fn tab_button(&self, tab: Tab, link: &yew::html::Scope<Self>) -> Html {
        html! {
            <button
                class={classes!("tab-btn", if self.tab == tab { "active" } else { "" })}
                onclick={link.callback(move |_| Msg::SetTab(tab))}
            >
                { tab.label() }
            </button>
        }
    }
}

/// Who is signed in, with a button to re-read the session after signing in
/// elsewhere.
struct SessionBadge {
    session: Option<SessionContext>,
    _handle: Option<ContextHandle<SessionContext>>,
}

impl Component for SessionBadge {
    type Message = SessionContext;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (session, handle) = ctx
            .link()
            .context::<SessionContext>(ctx.link().callback(|session: SessionContext| session))
            .unzip();
        Self {
            session,
            _handle: handle,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, session: Self::Message) -> bool {
        self.session = Some(session);
        true
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        let Some(context) = &self.session else {
            return html! {};
        };
        let refresh = context.refresh.reform(|_: MouseEvent| ());
        let label = match (&context.session, context.loaded) {
            (_, false) => "Checking session...".to_string(),
            (Some(session), true) => format!("{} ({})", session.email, session.role.as_str()),
            (None, true) => "Not signed in".to_string(),
        };
        html! {
            <div class="session-badge">
                <span>{ label }</span>
                <button class="icon-btn" title="Refresh session" onclick={refresh}>
                    <i class="material-icons">{"refresh"}</i>
                </button>
            </div>
        }
    }
}
