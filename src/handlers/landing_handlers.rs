//! Admin landing page served at `/`.
//!
//! Session lookup happens in the handler; what gets shown is decided by the
//! pure `landing_view` so it can be exercised without a request.

use crate::{models::user::SessionUser, state::AppState};
use axum::{extract::State, http::HeaderMap, response::Html};

const DEFAULT_HEADING: &str = "Hecta Consulting Content Management";
const DOCS_URL: &str = "https://payloadcms.com/docs";
const LOGO_URL: &str =
    "https://res.cloudinary.com/ddczkq79u/image/upload/v1/media/hecta_logo-1.jpeg";

/// Everything the landing page displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingView {
    pub heading: String,
    pub admin_href: String,
    pub docs_href: &'static str,
    pub logo_src: &'static str,
}

pub fn landing_view(user: Option<&SessionUser>, admin_route: &str) -> LandingView {
    let heading = match user {
        Some(user) => format!("Welcome, {}", user.local_part()),
        None => DEFAULT_HEADING.to_string(),
    };
    LandingView {
        heading,
        admin_href: admin_route.to_string(),
        docs_href: DOCS_URL,
        logo_src: LOGO_URL,
    }
}

impl LandingView {
    pub fn render(&self) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>",
                r#"<html lang="en"><head><meta charset="utf-8">"#,
                "<title>Hecta Consulting CMS</title></head><body>",
                r#"<main class="home">"#,
                r#"<div class="logo"><img alt="Hecta Consulting Logo" height="200" src="{logo}" width="200"></div>"#,
                "<h1>{heading}</h1>",
                r#"<p class="subtitle">Use the admin panel to manage your website&apos;s blog posts and content.</p>"#,
                r#"<div class="links">"#,
                r#"<a class="admin" href="{admin}" rel="noopener noreferrer" target="_blank">Admin Panel</a>"#,
                r#"<a class="docs" href="{docs}" rel="noopener noreferrer" target="_blank">Payload Docs</a>"#,
                "</div>",
                r#"<footer class="footer"><p>This is the CMS homepage. The public-facing website is separate.</p></footer>"#,
                "</main></body></html>"
            ),
            logo = html_escape(self.logo_src),
            heading = html_escape(&self.heading),
            admin = html_escape(&self.admin_href),
            docs = html_escape(self.docs_href),
        )
    }
}

/// `GET /`
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let user = match state.sessions.resolve(&headers).await {
        Ok(Some(user)) => {
            tracing::debug!("landing page for {} user {}", user.collection, user.id);
            Some(user)
        }
        Ok(None) => None,
        Err(err) => {
            tracing::debug!("rendering landing page anonymously: {}", err);
            None
        }
    };
    Html(landing_view(user.as_ref(), &state.config.admin_route).render())
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
