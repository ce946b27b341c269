//! Server-rendered console pages.
//!
//! Only the shell around the session layer lives here. Table and form
//! rendering belong to the console's client-side components.

use axum::http::StatusCode;
use axum::response::Html;

use crate::auth::Session;

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} - Admin Console</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    ))
}

/// Minimal HTML escaping for text and double-quoted attribute values
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Posts the form as JSON to `endpoint`, then follows the callback
fn auth_form_script(endpoint: &str, callback: &str) -> String {
    format!(
        r#"<div id="callback" data-callback="{callback}" hidden></div>
<script>
document.querySelector('form').addEventListener('submit', async (event) => {{
  event.preventDefault();
  const body = Object.fromEntries(new FormData(event.target));
  const res = await fetch('{endpoint}', {{ method: 'POST', headers: {{ 'Content-Type': 'application/json' }}, body: JSON.stringify(body) }});
  if (res.ok) {{ window.location.assign(document.getElementById('callback').dataset.callback); return; }}
  const data = await res.json().catch(() => ({{}}));
  document.querySelector('[role=alert]').textContent = data.error || 'Request failed';
}});
</script>"#,
        endpoint = endpoint,
        callback = escape_html(callback),
    )
}

pub fn login_page(callback: &str) -> Html<String> {
    let body = format!(
        r#"<main>
<h1>Sign in</h1>
<form method="post">
  <label>Email <input name="email" type="email" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Sign in</button>
  <p role="alert"></p>
</form>
<p><a href="/register">Create an account</a></p>
</main>
{}"#,
        auth_form_script("/api/auth/login", callback)
    );
    layout("Sign in", &body)
}

pub fn register_page(callback: &str) -> Html<String> {
    let body = format!(
        r#"<main>
<h1>Create account</h1>
<form method="post">
  <label>First name <input name="firstName" required></label>
  <label>Last name <input name="lastName" required></label>
  <label>Email <input name="email" type="email" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Register</button>
  <p role="alert"></p>
</form>
<p><a href="/login">Already registered? Sign in</a></p>
</main>
{}"#,
        auth_form_script("/api/auth/register", callback)
    );
    layout("Register", &body)
}

/// Dashboard shell. `section` is the part of the path below the landing route.
pub fn dashboard_page(session: &Session, section: Option<&str>) -> Html<String> {
    let heading = match section {
        Some(section) => format!("<h1>{}</h1>", escape_html(section)),
        None => "<h1>Dashboard</h1>".to_string(),
    };
    let body = format!(
        r#"<header>
<span>Signed in as <strong>{name}</strong> ({email})</span>
<button id="logout">Sign out</button>
</header>
<main>
{heading}
<div id="console-root"></div>
</main>
<script>
document.getElementById('logout').addEventListener('click', async () => {{
  await fetch('/api/auth/logout', {{ method: 'POST' }});
  window.location.assign('/login');
}});
</script>"#,
        name = escape_html(&session.user.display_name()),
        email = escape_html(&session.user.email),
        heading = heading,
    );
    layout("Dashboard", &body)
}

/// Rendered in place of a protected page when the backend is down
pub fn service_unavailable(path: &str) -> (StatusCode, Html<String>) {
    let body = format!(
        r#"<main>
<h1>Server unavailable</h1>
<p>The console cannot reach its backend right now. Your session is unchanged.</p>
<p><a href="{}">Retry</a></p>
</main>"#,
        escape_html(path)
    );
    (StatusCode::SERVICE_UNAVAILABLE, layout("Server unavailable", &body))
}

pub fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        layout("Not found", "<main><h1>Page not found</h1><p><a href=\"/\">Back to the console</a></p></main>"),
    )
}
