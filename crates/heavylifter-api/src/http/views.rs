//! Askama page templates.
//!
//! Templates live in `templates/` at the crate root. Every `.html` template
//! is HTML-escaped by askama, so transcript content is inserted as-is.

use askama::Template;

use heavylifter_types::chat::{ChatPage, ChatTurn, MessageRole};

/// A sidebar link.
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Sidebar entries, with the current page highlighted.
pub fn nav_links(current: Option<ChatPage>) -> Vec<NavLink> {
    let mut links = vec![NavLink {
        href: "/",
        label: "Home",
        active: current.is_none(),
    }];
    for page in [ChatPage::Lifter, ChatPage::Graphql] {
        links.push(NavLink {
            href: page.path(),
            label: page.title(),
            active: current == Some(page),
        });
    }
    links
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Vec<NavLink>,
    pub graphql_enabled: bool,
}

/// One rendered chat bubble.
pub struct MessageView {
    pub role: &'static str,
    pub label: &'static str,
    pub content: String,
    pub time: String,
}

impl From<&ChatTurn> for MessageView {
    fn from(turn: &ChatTurn) -> Self {
        let (role, label) = match turn.role {
            MessageRole::User => ("user", "You"),
            MessageRole::Assistant => ("assistant", "Heavy Lifter"),
            MessageRole::System => ("system", "System"),
        };
        Self {
            role,
            label,
            content: turn.content.clone(),
            time: turn.created_at.format("%H:%M:%S").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatTemplate {
    pub nav: Vec<NavLink>,
    pub title: &'static str,
    pub action: String,
    pub messages: Vec<MessageView>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub nav: Vec<NavLink>,
    pub status: u16,
    pub reason: &'a str,
    pub message: &'a str,
}
