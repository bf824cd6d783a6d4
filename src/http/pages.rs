//! Static HTML views. Each page drives the JSON API from the browser.

use axum::extract::Path;
use axum::response::Html;

const STYLE: &str = r"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #222; }
nav { background: #2d3e50; padding: 0.75rem 1.5rem; }
nav a { color: #fff; margin-right: 1.25rem; text-decoration: none; }
main { max-width: 960px; margin: 1.5rem auto; padding: 0 1rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { padding: 0.5rem; border-bottom: 1px solid #e3e5e8; text-align: left; }
form label { display: block; margin-top: 0.75rem; }
input, select, textarea { width: 100%; padding: 0.4rem; box-sizing: border-box; }
button { margin-top: 1rem; padding: 0.5rem 1rem; }
.priority-High { color: #c0392b; font-weight: bold; }
.priority-Medium { color: #d68910; }
.priority-Low { color: #566573; }
#log { background: #fff; min-height: 300px; padding: 1rem; white-space: pre-wrap; }
.day { background: #fff; padding: 0.5rem; margin-bottom: 0.5rem; }
";

fn layout(title: &str, body: &str, script: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - Bug Desk</title>
<style>{STYLE}</style>
</head>
<body>
<nav>
  <a href="/">Issues</a>
  <a href="/calendar">Calendar</a>
  <a href="/issue/new">New issue</a>
  <a href="/users/new">Users</a>
  <a href="/chat">Assistant</a>
</nav>
<main>
<h1>{title}</h1>
{body}
</main>
<script>
function esc(s) {{ const d = document.createElement('div'); d.textContent = s ?? ''; return d.innerHTML; }}
{script}
</script>
</body>
</html>"#
    ))
}

/// `GET /`
pub async fn index() -> Html<String> {
    layout(
        "Issues",
        r#"<form id="filters">
  <input name="title" placeholder="Search title">
  <select name="status"><option value="">Any status</option><option>Open</option><option>In-Progress</option><option>Closed</option></select>
  <input name="assignee" placeholder="Assignee name">
  <button type="submit">Filter</button>
</form>
<table><thead><tr><th>Title</th><th>Status</th><th>Priority</th><th>Assignee</th><th>Due</th><th></th></tr></thead>
<tbody id="rows"></tbody></table>"#,
        r#"
async function load() {
  const params = new URLSearchParams(new FormData(document.getElementById('filters')));
  const issues = await (await fetch('/issues?' + params)).json();
  document.getElementById('rows').innerHTML = issues.map(i => `<tr>
    <td>${esc(i.title)}</td>
    <td><select onchange='setStatus(${i.id}, this.value)'>${['Open','In-Progress','Closed'].map(s => `<option ${s === i.status ? 'selected' : ''}>${s}</option>`).join('')}</select></td>
    <td class='priority-${i.priority}'>${i.priority}</td>
    <td>${esc(i.assignee ? i.assignee.name : 'Unassigned')}</td>
    <td>${i.due_date ? i.due_date.slice(0, 10) : ''}</td>
    <td><a href='/issue/${i.id}/edit'>Edit</a> <a href='#' onclick='remove(${i.id});return false'>Delete</a></td>
  </tr>`).join('');
}
async function setStatus(id, status) {
  await fetch(`/issues/${id}/status`, {method: 'PATCH', headers: {'Content-Type': 'application/json'}, body: JSON.stringify({status})});
}
async function remove(id) {
  if (confirm('Delete this issue?')) { await fetch(`/issues/${id}`, {method: 'DELETE'}); load(); }
}
document.getElementById('filters').addEventListener('submit', e => { e.preventDefault(); load(); });
load();
"#,
    )
}

/// `GET /calendar`
pub async fn calendar() -> Html<String> {
    layout(
        "Calendar",
        r#"<div id="days"></div>"#,
        r#"
async function load() {
  const issues = await (await fetch('/issues')).json();
  const byDay = {};
  for (const i of issues.filter(i => i.due_date)) {
    (byDay[i.due_date.slice(0, 10)] ??= []).push(i);
  }
  document.getElementById('days').innerHTML = Object.keys(byDay).sort().map(day => `<div class='day'>
    <strong>${day}</strong>
    <ul>${byDay[day].map(i => `<li class='priority-${i.priority}'>${esc(i.title)} (${i.status})</li>`).join('')}</ul>
  </div>`).join('');
}
load();
"#,
    )
}

fn issue_form_page(issue_id: Option<i64>) -> Html<String> {
    let id_literal = issue_id.map_or_else(|| "null".to_owned(), |id| id.to_string());
    let title = if issue_id.is_some() { "Edit issue" } else { "New issue" };
    let script = format!(
        r#"
const issueId = {id_literal};
const form = document.getElementById('issue');
async function init() {{
  const users = await (await fetch('/api/users')).json();
  form.elements.assignee_id.innerHTML = '<option value="">Unassigned</option>' +
    users.map(u => `<option value='${{u.id}}'>${{esc(u.name)}}</option>`).join('');
  if (issueId !== null) {{
    const i = await (await fetch(`/issues/${{issueId}}`)).json();
    form.elements.title.value = i.title;
    form.elements.description.value = i.description;
    form.elements.status.value = i.status;
    form.elements.priority.value = i.priority;
    form.elements.assignee_id.value = i.assignee_id ?? '';
    form.elements.due_date.value = i.due_date ? i.due_date.slice(0, 10) : '';
  }}
}}
form.addEventListener('submit', async e => {{
  e.preventDefault();
  const body = Object.fromEntries(new FormData(form));
  const res = await fetch(issueId === null ? '/issues' : `/issues/${{issueId}}`, {{
    method: issueId === null ? 'POST' : 'PUT',
    headers: {{'Content-Type': 'application/json'}},
    body: JSON.stringify(body),
  }});
  if (res.ok) {{ location.href = '/'; }} else {{ alert((await res.json()).error); }}
}});
init();
"#
    );
    layout(
        title,
        r#"<form id="issue">
  <label>Title <input name="title" required></label>
  <label>Description <textarea name="description" rows="4" required></textarea></label>
  <label>Status <select name="status"><option>Open</option><option>In-Progress</option><option>Closed</option></select></label>
  <label>Priority <select name="priority"><option>Low</option><option selected>Medium</option><option>High</option></select></label>
  <label>Assignee <select name="assignee_id"></select></label>
  <label>Due date <input name="due_date" type="date"></label>
  <button type="submit">Save</button>
</form>"#,
        &script,
    )
}

/// `GET /issue/new`
pub async fn issue_form() -> Html<String> {
    issue_form_page(None)
}

/// `GET /issue/{id}/edit`
pub async fn edit_issue_form(Path(id): Path<i64>) -> Html<String> {
    issue_form_page(Some(id))
}

/// `GET /users/new`
pub async fn user_form() -> Html<String> {
    layout(
        "Users",
        r#"<form id="user">
  <label>Name <input name="name" required></label>
  <label>Role <input name="role" required></label>
  <button type="submit">Add user</button>
</form>
<table><thead><tr><th>Name</th><th>Role</th><th></th></tr></thead><tbody id="rows"></tbody></table>"#,
        r#"
const form = document.getElementById('user');
async function load() {
  const users = await (await fetch('/users')).json();
  document.getElementById('rows').innerHTML = users.map(u =>
    `<tr><td>${esc(u.name)}</td><td>${esc(u.role)}</td><td><a href='#' onclick='remove(${u.id});return false'>Delete</a></td></tr>`).join('');
}
async function remove(id) {
  const res = await fetch(`/users/${id}`, {method: 'DELETE'});
  if (!res.ok) { alert((await res.json()).error); }
  load();
}
form.addEventListener('submit', async e => {
  e.preventDefault();
  const res = await fetch('/users', {method: 'POST', headers: {'Content-Type': 'application/json'},
    body: JSON.stringify(Object.fromEntries(new FormData(form)))});
  if (res.ok) { form.reset(); load(); } else { alert((await res.json()).error); }
});
load();
"#,
    )
}

/// `GET /chat`
pub async fn chat() -> Html<String> {
    layout(
        "Assistant",
        r#"<div id="log"></div>
<form id="ask">
  <input name="message" maxlength="500" placeholder="e.g. What is Alex working on? / Suggest a task for me" autocomplete="off">
  <button type="submit">Send</button>
</form>"#,
        r#"
const log = document.getElementById('log');
const form = document.getElementById('ask');
function say(who, text) { log.innerHTML += `<p><strong>${who}:</strong> ${esc(text)}</p>`; }
form.addEventListener('submit', async e => {
  e.preventDefault();
  const message = form.elements.message.value.trim();
  if (!message) return;
  say('You', message);
  form.reset();
  const res = await fetch('/chat', {method: 'POST', headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({message})});
  const data = await res.json();
  say('Assistant', res.ok ? data.message : data.error);
});
"#,
    )
}
