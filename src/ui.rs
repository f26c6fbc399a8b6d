use crate::view::{Activity, Notice, NoticeLevel, PageView};

pub fn render_index(page: &PageView) -> String {
    let email = page.user_email.as_deref().unwrap_or("");
    let body = fill(
        APP_HTML,
        &[
            ("NOTICE", render_notice(page.notice.as_ref()).as_str()),
            ("EMAIL", escape_html(email).as_str()),
            ("SELECTION", render_selection(page).as_str()),
            ("DATE", page.selected_date.to_string().as_str()),
            ("HEADING", escape_html(&page.heading).as_str()),
            ("LIST", render_activity(&page.activity).as_str()),
            ("CHART", render_chart(page).as_str()),
        ],
    );
    wrap_page("Habit Tracker", &body)
}

pub fn render_config_page(notice: Option<&Notice>) -> String {
    let body = fill(CONFIG_HTML, &[("NOTICE", render_notice(notice).as_str())]);
    wrap_page("Configuration Required", &body)
}

pub fn render_login_page(notice: Option<&Notice>) -> String {
    let body = fill(LOGIN_HTML, &[("NOTICE", render_notice(notice).as_str())]);
    wrap_page("Habit Tracker Login", &body)
}

pub fn render_callback_page() -> String {
    wrap_page("Signing in", CALLBACK_HTML)
}

fn wrap_page(title: &str, body: &str) -> String {
    fill(PAGE_HTML, &[("TITLE", title), ("BODY", body)])
}

/// Substitutes `{{NAME}}` slots in one pass, so inserted text is never
/// scanned for further slots. Unknown slots are kept as written.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let value = tail.find("}}").and_then(|end| {
            let name = &tail[..end];
            slots
                .iter()
                .find(|(slot, _)| *slot == name)
                .map(|(_, value)| (end, *value))
        });
        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn render_notice(notice: Option<&Notice>) -> String {
    let Some(notice) = notice else {
        return String::new();
    };
    let class = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!(
        r#"<p class="notice {class}" role="status">{}</p>"#,
        escape_html(&notice.message)
    )
}

fn render_selection(page: &PageView) -> String {
    let mut html = String::new();

    for (region, message) in [
        ("categories_error", &page.categories_error),
        ("habits_error", &page.habits_error),
    ] {
        if let Some(message) = message {
            html.push_str(&format!(
                r#"<p class="notice error" id="{region}">{}</p>"#,
                escape_html(message)
            ));
        }
    }

    let selected_category = page.selection.category.as_ref();
    html.push_str(
        r#"<form method="post" action="/select/category"><label for="category_dropdown">Category</label><select id="category_dropdown" name="category_id" onchange="this.form.submit()"><option value="">-- Choose a category --</option>"#,
    );
    for category in &page.categories {
        let selected = if selected_category == Some(&category.id) { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{}"{selected}>{}</option>"#,
            escape_html(category.id.as_str()),
            escape_html(&category.name)
        ));
    }
    html.push_str("</select><noscript><button type=\"submit\">Choose</button></noscript></form>");

    if page.selection.habit_list_visible {
        let selected_habit = page.selection.selected_habit.as_ref();
        html.push_str(
            r#"<form method="post" action="/select/habit" id="habit_selection_container"><label for="habit_dropdown">Habit</label><select id="habit_dropdown" name="habit_id" onchange="this.form.submit()"><option value="">-- Choose a habit --</option>"#,
        );
        for option in &page.selection.options {
            let selected = if selected_habit == Some(&option.id) { " selected" } else { "" };
            html.push_str(&format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                escape_html(option.id.as_str()),
                escape_html(&option.name)
            ));
        }
        html.push_str("</select><noscript><button type=\"submit\">Choose</button></noscript></form>");
    }

    if page.selection.record_visible {
        let (disabled, label) = if page.recording {
            (" disabled", "Recording...")
        } else {
            ("", "Record Habit")
        };
        html.push_str(&format!(
            r#"<form method="post" action="/record" id="record_button_container" onsubmit="this.today.value = new Date().toLocaleDateString('en-CA'); this.querySelector('button').disabled = true"><input type="hidden" name="today" value="" /><button type="submit" id="record_habit_button"{disabled}>{label}</button></form>"#
        ));
    }

    html
}

fn render_activity(activity: &Activity) -> String {
    match activity {
        Activity::Loading => "<li>Loading...</li>".to_string(),
        Activity::NoActivity { message } | Activity::Error { message } => {
            format!("<li>{}</li>", escape_html(message))
        }
        Activity::Groups { groups } => groups
            .iter()
            .map(|group| {
                let habits: String = group
                    .habits
                    .iter()
                    .map(|line| {
                        format!(
                            r#"<li style="border-left-color: {}">{}</li>"#,
                            group.color.border,
                            escape_html(line)
                        )
                    })
                    .collect();
                format!(
                    r#"<li class="category" data-category-id="{}" style="border-left-color: {}; background-color: {}">{}<ul>{habits}</ul></li>"#,
                    escape_html(group.category.as_str()),
                    group.color.border,
                    group.color.background,
                    escape_html(&group.label)
                )
            })
            .collect(),
    }
}

fn render_chart(page: &PageView) -> String {
    let max = page.chart.iter().map(|bar| bar.points).max().unwrap_or(0).max(1);
    page.chart
        .iter()
        .map(|bar| {
            let height = bar.points * 100 / max;
            format!(
                r#"<div class="bar" title="{points} {word}"><span class="value">{points}</span><span class="fill" style="height: {height}%; background: {bg}; border-color: {border}"></span><span class="label">{label}</span></div>"#,
                points = bar.points,
                word = crate::view::point_word(bar.points),
                bg = bar.color.background,
                border = bar.color.border,
                label = escape_html(&bar.label),
            )
        })
        .collect()
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #111827;
      --card: #1f2937;
      --ink: #e5e7eb;
      --muted: #9ca3af;
      --accent: #60a5fa;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 20px;
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.6rem, 4vw, 2.2rem);
    }

    form {
      display: grid;
      gap: 8px;
    }

    select, input, button {
      font: inherit;
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid #374151;
      background: #111827;
      color: var(--ink);
    }

    button {
      background: var(--accent);
      color: #0b1220;
      font-weight: 600;
      cursor: pointer;
    }

    button:disabled {
      opacity: 0.6;
      cursor: progress;
    }

    .notice {
      margin: 0;
      padding: 10px 14px;
      border-radius: 10px;
      background: #1e3a5f;
    }

    .notice.ok {
      background: #1a3d2e;
    }

    .notice.error {
      background: #3d1a1a;
    }

    #logged_points_list, #logged_points_list ul {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 8px;
    }

    #logged_points_list li {
      border-left: 4px solid var(--muted);
      padding: 8px 12px;
      border-radius: 8px;
    }

    #logged_points_list ul {
      margin-top: 8px;
    }

    .chart {
      display: flex;
      align-items: flex-end;
      gap: 12px;
      height: 220px;
      padding-top: 12px;
    }

    .bar {
      flex: 1;
      height: 100%;
      display: flex;
      flex-direction: column;
      justify-content: flex-end;
      align-items: center;
      gap: 6px;
    }

    .bar .fill {
      width: 100%;
      min-height: 2px;
      border: 2px solid;
      border-radius: 6px 6px 0 0;
    }

    .bar .label {
      font-size: 0.8rem;
      color: var(--muted);
      text-align: center;
    }
  </style>
</head>
<body>
{{BODY}}
</body>
</html>
"#;

const APP_HTML: &str = r#"<main class="app">
  <header>
    <h1>Habit Tracker</h1>
    <form method="post" action="/logout"><span>{{EMAIL}}</span><button type="submit">Log out</button></form>
  </header>
  {{NOTICE}}
  <section>
    {{SELECTION}}
  </section>
  <section>
    <form method="post" action="/date">
      <label for="date_picker">Date</label>
      <input type="date" id="date_picker" name="date" value="{{DATE}}" onchange="this.form.submit()" />
    </form>
    <h2 id="points_heading">{{HEADING}}</h2>
    <ul id="logged_points_list">{{LIST}}</ul>
  </section>
  <section class="chart" id="points_chart">{{CHART}}</section>
  <form method="post" action="/config/reset" onsubmit="return confirm('Reset the Supabase configuration? You will need to enter it again.')">
    <button type="submit" id="reconfigure_button">Reconfigure</button>
  </form>
</main>"#;

const CONFIG_HTML: &str = r#"<main class="app">
  <h1>Configuration Required</h1>
  {{NOTICE}}
  <form method="post" action="/config">
    <label for="supabase_url">Supabase URL</label>
    <input id="supabase_url" name="supabase_url" required />
    <label for="supabase_key">Supabase API Key</label>
    <input id="supabase_key" name="supabase_key" required />
    <label for="redirect_url">Redirect URL</label>
    <input id="redirect_url" name="redirect_url" required />
    <button type="submit">Save configuration</button>
  </form>
</main>"#;

const LOGIN_HTML: &str = r#"<main class="app">
  <h1>Habit Tracker</h1>
  {{NOTICE}}
  <form method="post" action="/login">
    <label for="email">Email</label>
    <input type="email" id="email" name="email" required />
    <button type="submit">Send login link</button>
  </form>
  <form method="post" action="/config/reset">
    <button type="submit">Reconfigure</button>
  </form>
</main>"#;

const CALLBACK_HTML: &str = r#"<main class="app">
  <h1>Signing in...</h1>
  <p class="notice" id="status">Verifying your login link.</p>
  <script>
    const params = new URLSearchParams(window.location.hash.slice(1));
    const token = params.get('access_token');
    const status = document.getElementById('status');
    if (!token) {
      status.textContent = params.get('error_description') || 'Login link is missing its access token.';
    } else {
      fetch('/api/session', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ access_token: token })
      }).then(async (res) => {
        if (!res.ok) {
          throw new Error((await res.text()) || 'Login failed');
        }
        window.location.replace('/');
      }).catch((err) => {
        status.textContent = err.message;
      });
    }
  </script>
</main>"#;
