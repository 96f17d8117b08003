use super::SessionContext;
use common::model::session::Role;
use yew::context::ContextHandle;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct RoleGateProps {
    pub role: Role,
    #[prop_or_default]
    pub children: Html,
    /// Shown to everyone else once the session is known.
    #[prop_or_default]
    pub fallback: Html,
}

pub enum Msg {
    SessionChanged(SessionContext),
}

/// Renders its children only for callers holding `role`.
///
/// This only hides controls. Every write is checked again by the server.
pub struct RoleGate {
    session: Option<SessionContext>,
    _handle: Option<ContextHandle<SessionContext>>,
}

impl Component for RoleGate {
    type Message = Msg;
    type Properties = RoleGateProps;

    fn create(ctx: &Context<Self>) -> Self {
        match ctx
            .link()
            .context::<SessionContext>(ctx.link().callback(Msg::SessionChanged))
        {
            Some((session, handle)) => Self {
                session: Some(session),
                _handle: Some(handle),
            },
            None => Self {
                session: None,
                _handle: None,
            },
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SessionChanged(session) => {
                self.session = Some(session);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        match &self.session {
            Some(session) if session.has_role(props.role) => props.children.clone(),
            Some(session) if session.loaded => props.fallback.clone(),
            _ => html! {},
        }
    }
}
