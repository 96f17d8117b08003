//! Observable session context.
//!
//! `SessionProvider` loads the caller's session from `GET /api/auth/session`
//! once on mount and whenever a consumer calls `refresh`, then publishes it
//! through a yew `ContextProvider`. Components read it with
//! `ctx.link().context::<SessionContext>(..)` and are re-rendered when it
//! changes.

use common::model::session::{Role, Session};
use gloo_console::error;
use gloo_net::http::Request;
use yew::platform::spawn_local;
use yew::prelude::*;

mod role_gate;

pub use role_gate::RoleGate;

#[derive(Clone, PartialEq)]
pub struct SessionContext {
    /// `None` for anonymous visitors or while loading.
    pub session: Option<Session>,
    /// True once the first lookup finished, successfully or not.
    pub loaded: bool,
    pub refresh: Callback<()>,
}

impl SessionContext {
    pub fn has_role(&self, role: Role) -> bool {
        self.session.as_ref().map_or(false, |s| s.role == role)
    }
}

#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    #[prop_or_default]
    pub children: Html,
}

pub enum Msg {
    Load,
    Loaded(Option<Session>),
}

pub struct SessionProvider {
    session: Option<Session>,
    loaded: bool,
    refresh: Callback<()>,
}

impl Component for SessionProvider {
    type Message = Msg;
    type Properties = SessionProviderProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            session: None,
            loaded: false,
            refresh: ctx.link().callback(|_| Msg::Load),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    let session = match Request::get("/api/auth/session").send().await {
                        Ok(resp) if resp.ok() => resp.json::<Option<Session>>().await.unwrap_or_else(|e| {
                            error!(format!("Invalid session response: {}", e));
                            None
                        }),
                        Ok(resp) => {
                            error!(format!("Session lookup failed with status {}", resp.status()));
                            None
                        }
                        Err(e) => {
                            error!(format!("Session lookup failed: {}", e));
                            None
                        }
                    };
                    link.send_message(Msg::Loaded(session));
                });
                false
            }
            Msg::Loaded(session) => {
                let changed = !self.loaded || self.session != session;
                self.session = session;
                self.loaded = true;
                changed
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let context = SessionContext {
            session: self.session.clone(),
            loaded: self.loaded,
            refresh: self.refresh.clone(),
        };
        html! {
            <ContextProvider<SessionContext> {context}>
                { ctx.props().children.clone() }
            </ContextProvider<SessionContext>>
        }
    }
}
