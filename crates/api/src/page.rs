//! Server-rendered admin page with inline style and script.
//!
//! The page drives every lookup action through form-encoded POSTs back to
//! the same endpoint, so it works inside a plain admin-panel iframe with no
//! asset pipeline.

use reflens_shared::LookupConfig;
use serde_json::json;

const STYLE: &str = r#"
:root { color-scheme: light; }
* { box-sizing: border-box; }
body {
  margin: 0;
  padding: 24px;
  background: #f4f6f8;
  color: #1f2933;
  font: 14px/1.5 -apple-system, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
}
h1 { font-size: 20px; margin: 0 0 4px; }
.subtitle { color: #667382; margin: 0 0 20px; }
.panel {
  background: #fff;
  border: 1px solid #dde3ea;
  border-radius: 8px;
  padding: 16px 20px;
  margin-bottom: 16px;
}
.stats { display: flex; gap: 16px; }
.stat { flex: 1; text-align: center; padding: 8px 0; }
.stat .num { font-size: 24px; font-weight: 600; }
.stat .label { color: #667382; font-size: 12px; text-transform: uppercase; letter-spacing: .04em; }
.search-row { display: flex; gap: 8px; }
.search-row input {
  flex: 1;
  padding: 8px 12px;
  border: 1px solid #c6cdd6;
  border-radius: 6px;
  font-size: 14px;
}
button {
  padding: 8px 14px;
  border: 0;
  border-radius: 6px;
  background: #2563eb;
  color: #fff;
  font-size: 14px;
  cursor: pointer;
}
button.danger { background: #dc2626; }
button:disabled { background: #9aa7b5; cursor: default; }
.hint { color: #667382; font-size: 12px; margin-top: 6px; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 8px 10px; border-bottom: 1px solid #eef1f5; }
th { color: #667382; font-size: 12px; text-transform: uppercase; letter-spacing: .04em; }
tr:hover td { background: #f8fafc; }
.badge { display: inline-block; padding: 2px 8px; border-radius: 10px; font-size: 12px; }
.badge.yes { background: #dcfce7; color: #166534; }
.badge.no { background: #e5e7eb; color: #4b5563; }
.badge.high { background: #fee2e2; color: #991b1b; }
.badge.medium { background: #fef3c7; color: #92400e; }
.pager { margin-top: 10px; display: flex; gap: 8px; align-items: center; }
.pager span { color: #667382; font-size: 12px; }
.tree ul { list-style: none; padding-left: 18px; border-left: 1px dashed #c6cdd6; }
.tree > ul { padding-left: 0; border-left: 0; }
.tree li { margin: 4px 0; }
pre {
  background: #0f172a;
  color: #e2e8f0;
  padding: 12px;
  border-radius: 6px;
  overflow: auto;
  font-size: 12px;
}
.error { color: #b91c1c; }
.muted { color: #667382; }
.footer { color: #8a94a1; font-size: 12px; text-align: center; margin-top: 24px; }
"#;

const SCRIPT: &str = r#"
var lastTerm = null;
var lastResults = [];
var page = 0;

function esc(value) {
  var div = document.createElement('div');
  div.textContent = value == null ? '' : String(value);
  return div.innerHTML;
}

function post(fields) {
  return fetch(window.location.pathname, {
    method: 'POST',
    headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
    body: new URLSearchParams(fields).toString(),
  }).then(function (res) { return res.json(); });
}

function show(id, visible) {
  document.getElementById(id).style.display = visible ? '' : 'none';
}

function setDetail(html) {
  document.getElementById('detail-body').innerHTML = html;
  show('detail-panel', true);
}

function runSearch() {
  var term = document.getElementById('term').value.trim();
  var out = document.getElementById('results-body');
  if (term.length < 2) {
    out.innerHTML = '<p class="error">Minimum 2 characters required for search.</p>';
    show('results-panel', true);
    return;
  }
  lastTerm = term;
  post({ action: 'search_clients', term: term }).then(function (res) {
    if (res.status !== 'success') {
      out.innerHTML = '<p class="error">' + esc(res.message || 'Search failed') + '</p>';
      show('results-panel', true);
      return;
    }
    lastResults = res.data;
    page = 0;
    renderResults();
  });
}

function renderResults() {
  var out = document.getElementById('results-body');
  show('results-panel', true);
  if (!lastResults.length) {
    out.innerHTML = '<p class="muted">No clients found matching your search criteria.</p>';
    return;
  }
  var per = SETTINGS.resultsPerPage;
  var pages = Math.max(1, Math.ceil(lastResults.length / per));
  page = Math.min(page, pages - 1);
  var rows = lastResults.slice(page * per, (page + 1) * per).map(function (c) {
    var referrer = c.has_referrer
      ? esc(c.referrer_name) + ' &lt;' + esc(c.referrer_email) + '&gt;'
      : '<span class="muted">none</span>';
    return '<tr>' +
      '<td>#' + esc(c.id) + '</td>' +
      '<td>' + esc(c.name) + '<div class="muted">' + esc(c.company) + '</div></td>' +
      '<td>' + esc(c.email) + '</td>' +
      '<td>' + esc(c.created) + '</td>' +
      '<td>' + referrer + '</td>' +
      '<td>' + (c.is_affiliate ? '<span class="badge yes">affiliate</span>' : '<span class="badge no">no</span>') + '</td>' +
      '<td>' +
      '<button onclick="viewDetails(' + c.id + ')">Details</button> ' +
      '<button onclick="viewTree(' + c.id + ')">Tree</button>' +
      '</td>' +
      '</tr>';
  }).join('');
  out.innerHTML =
    '<table><thead><tr><th>ID</th><th>Name</th><th>Email</th><th>Created</th>' +
    '<th>Referrer</th><th>Affiliate</th><th></th></tr></thead><tbody>' + rows + '</tbody></table>' +
    '<div class="pager">' +
    '<button ' + (page === 0 ? 'disabled' : '') + ' onclick="page--; renderResults()">Prev</button>' +
    '<span>Page ' + (page + 1) + ' of ' + pages + ' (' + lastResults.length + ' results)</span>' +
    '<button ' + (page === pages - 1 ? 'disabled' : '') + ' onclick="page++; renderResults()">Next</button>' +
    '</div>';
}

function viewDetails(id) {
  post({ action: 'get_referral_details', client_id: id }).then(function (res) {
    if (res.status !== 'success') {
      setDetail('<p class="error">' + esc(res.message || 'Lookup failed') + '</p>');
      return;
    }
    var info = res.referral_info;
    var html = '<h3>' + esc(res.client.name) + ' &lt;' + esc(res.client.email) + '&gt;</h3>';
    if (info.has_referrer) {
      html += '<p>Referred by <strong>' + esc(info.referrer.name) + '</strong> &lt;' +
        esc(info.referrer.email) + '&gt; (affiliate #' + esc(info.referrer.affiliate_id) +
        ', service #' + esc(info.referrer.service_id) + ')</p>';
    } else {
      html += '<p class="muted">No referrer on record.</p>';
    }
    if (info.is_affiliate) {
      html += '<p>Affiliate since ' + esc(info.affiliate_stats.signup_date) + ': ' +
        esc(info.affiliate_stats.total_referrals) + ' referrals, ' +
        esc(info.affiliate_stats.total_commissions) + ' in commissions.</p>';
    }
    html += '<p class="muted">' + esc(res.statistics.total_services) + ' services, ' +
      esc(res.statistics.total_invoices) + ' invoices.</p>';
    setDetail(html);
  });
}

function treeHtml(nodes) {
  if (!nodes.length) { return ''; }
  return '<ul>' + nodes.map(function (n) {
    return '<li>#' + esc(n.id) + ' ' + esc(n.name) + ' &lt;' + esc(n.email) + '&gt;' +
      ' <span class="muted">(level ' + esc(n.level) + ')</span>' + treeHtml(n.children) + '</li>';
  }).join('') + '</ul>';
}

function viewTree(id) {
  post({ action: 'get_referral_tree', client_id: id }).then(function (res) {
    if (res.status !== 'success') {
      setDetail('<p class="error">' + esc(res.message || 'Lookup failed') + '</p>');
      return;
    }
    var html = '<h3>Referral tree</h3>';
    html += res.data.length
      ? '<div class="tree">' + treeHtml(res.data) + '</div>'
      : '<p class="muted">This client has not referred anyone.</p>';
    setDetail(html);
  });
}

function checkConflicts() {
  var email = document.getElementById('term').value.trim();
  post({ action: 'check_referral_conflicts', client_email: email }).then(function (res) {
    if (res.status === 'not_found') {
      setDetail('<p class="error">' + esc(res.message) + '</p><ul>' +
        res.suggestions.map(function (s) { return '<li>' + esc(s) + '</li>'; }).join('') + '</ul>');
      return;
    }
    if (res.status !== 'success') {
      setDetail('<p class="error">' + esc(res.message || 'Analysis failed') + '</p>');
      return;
    }
    var a = res.referral_analysis;
    var badge = a.conflict_detected
      ? '<span class="badge ' + (a.conflict_severity === 'High' ? 'high' : 'medium') + '">' +
        esc(a.conflict_severity) + '</span>'
      : '<span class="badge yes">clear</span>';
    var html = '<h3>Conflict analysis for ' + esc(res.client.email) + ' ' + badge + '</h3>';
    html += '<p>' + esc(a.conflict_message) + '</p>';
    if (a.all_referrers.length) {
      html += '<table><thead><tr><th>Type</th><th>Name</th><th>Email</th><th>Source</th>' +
        '<th>Details</th></tr></thead><tbody>' +
        a.all_referrers.map(function (r) {
          return '<tr><td>' + esc(r.type) + '</td><td>' + esc(r.name) + '</td><td>' +
            esc(r.email) + '</td><td>' + esc(r.source) + '</td><td>' + esc(r.details) + '</td></tr>';
        }).join('') + '</tbody></table>';
    }
    if (a.additional_sources.length) {
      html += '<p class="muted">Additional unscored sources: ' +
        a.additional_sources.map(function (s) { return esc(s.source); }).join('; ') + '</p>';
    }
    if (a.unavailable_sources.length) {
      html += '<p class="muted">Unavailable sources: ' +
        a.unavailable_sources.map(function (s) { return esc(s.source); }).join('; ') + '</p>';
    }
    setDetail(html);
  });
}

document.getElementById('search-btn').addEventListener('click', runSearch);
document.getElementById('conflict-btn').addEventListener('click', checkConflicts);
document.getElementById('term').addEventListener('keydown', function (e) {
  if (e.key === 'Enter') { e.preventDefault(); runSearch(); }
});
document.getElementById('term').addEventListener('input', function () {
  var value = this.value.trim();
  document.getElementById('conflict-btn').disabled = value.indexOf('@') === -1;
});

if (SETTINGS.autoRefresh) {
  setInterval(function () { if (lastTerm) { runSearch(); } }, 30000);
}
"#;

/// Renders the full admin page.
#[must_use]
pub fn render(lookup: &LookupConfig, client_count: u64, affiliate_count: u64) -> String {
    let settings = json!({
        "resultsPerPage": lookup.results_per_page,
        "autoRefresh": lookup.auto_refresh,
    });
    let version = env!("CARGO_PKG_VERSION");

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Referral Lookup</title>
<style>{STYLE}</style>
</head>
<body>
<h1>Referral Lookup</h1>
<p class="subtitle">Search clients, inspect referral relationships, and flag conflicting affiliate claims.</p>

<div class="panel stats">
  <div class="stat"><div class="num">{client_count}</div><div class="label">Total Clients</div></div>
  <div class="stat"><div class="num">{affiliate_count}</div><div class="label">Total Affiliates</div></div>
  <div class="stat"><div class="num">Active</div><div class="label">Referral System</div></div>
</div>

<div class="panel">
  <form onsubmit="return false">
    <div class="search-row">
      <input id="term" type="text" autocomplete="off"
             placeholder="Enter name, email, or company name...">
      <button id="search-btn" type="button">Search</button>
      <button id="conflict-btn" class="danger" type="button" disabled
              title="Check for referral conflicts (requires valid email)">Check Conflicts</button>
    </div>
    <div class="hint">Minimum 2 characters required for search. Conflict checks need a full email address.</div>
  </form>
</div>

<div id="results-panel" class="panel" style="display:none">
  <div id="results-body"></div>
</div>

<div id="detail-panel" class="panel" style="display:none">
  <div id="detail-body"></div>
</div>

<div class="footer">Referral Lookup Tool v{version}</div>

<script>var SETTINGS = {settings};</script>
<script>{SCRIPT}</script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_embeds_counts_and_settings() {
        let lookup = LookupConfig {
            results_per_page: 25,
            auto_refresh: true,
            ..LookupConfig::default()
        };

        let html = render(&lookup, 1234, 56);

        assert!(html.contains(">1234<"));
        assert!(html.contains(">56<"));
        assert!(html.contains("\"resultsPerPage\":25"));
        assert!(html.contains("\"autoRefresh\":true"));
        assert!(html.contains("check_referral_conflicts"));
    }

    #[test]
    fn test_render_is_single_document() {
        let html = render(&LookupConfig::default(), 0, 0);
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
