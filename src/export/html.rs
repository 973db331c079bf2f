//! Dashboard page: header, filter widgets, ticket table, toast.

use crate::config::PageSettings;
use crate::core::pipeline::Dashboard;
use crate::errors::AppError;
use crate::models::ticket::{DISPLAY_COLUMNS, TicketRow};
use crate::ui::messages::toast_text;
use crate::utils::date::format_date;
use crate::utils::html::escape;

const STYLE: &str = r#"
    body {
        font-family: "Source Sans Pro", -apple-system, "Segoe UI", Roboto, sans-serif;
        margin: 0;
        padding: 2rem 3rem;
        color: #31333f;
    }
    .container {
        border: 1px solid #e6e6ea;
        border-radius: 8px;
        padding: 1rem 1.25rem;
    }
    .right-aligned-image {
        display: flex;
        justify-content: flex-end;
        margin-bottom: 20px;
    }
    .right-aligned-image img {
        width: 100px;
        height: auto;
    }
    .dataframe-container {
        padding: 0;
        border-radius: 5px;
        background-color: #f8f9fa;
        margin-top: 20px;
        margin-bottom: 20px;
        overflow-x: auto;
        overflow-y: auto;
        max-width: 100%;
        max-height: 600px;
    }
    .header-container {
        display: flex;
        justify-content: space-between;
        align-items: center;
        margin-bottom: 20px;
    }
    .vendor-header {
        display: flex;
        align-items: center;
        gap: 10px;
    }
    .vendor-logo {
        width: 30px;
        height: 30px;
        object-fit: contain;
    }
    .ticket-count {
        font-size: 1.2em;
        margin-top: -10px;
    }
    .ticket-count span {
        font-size: 0.7em;
        color: #757575;
        vertical-align: middle;
    }
    .filters {
        display: grid;
        grid-template-columns: repeat(3, 1fr);
        gap: 1rem;
    }
    .filters label {
        display: flex;
        flex-direction: column;
        font-size: 0.9em;
        gap: 4px;
    }
    .filters select {
        min-height: 6em;
    }
    table {
        width: 100%;
        border-collapse: collapse;
        table-layout: auto;
        margin: 0;
        padding: 0;
        border-radius: 5px;
        overflow: hidden;
    }
    th {
        background-color: #f1f1f1;
        font-weight: bold;
        text-align: left !important;
        padding: 4px 8px;
        border: 1px solid #ddd;
        white-space: nowrap;
        min-width: 120px;
    }
    td {
        padding: 4px 8px;
        border: 1px solid #ddd;
        min-width: 120px;
    }
    th:nth-child(1), td:nth-child(1) { min-width: 100px; }
    th:nth-child(2), td:nth-child(2) { min-width: 150px; }
    th:nth-child(3), td:nth-child(3) { min-width: 200px; }
    th:nth-child(4), td:nth-child(4) { min-width: 250px; }
    th:nth-child(5), td:nth-child(5) { min-width: 100px; }
    th:nth-child(6), td:nth-child(6) { min-width: 150px; }
    th:nth-child(7), td:nth-child(7) { min-width: 150px; }
    th:nth-child(8), td:nth-child(8) { min-width: 150px; }
    tr:nth-child(even) {
        background-color: #ffffff;
    }
    tr:hover {
        background-color: #f1f1f1;
    }
    .dataframe a {
        text-decoration: none;
    }
    .dataframe a:hover {
        text-decoration: underline;
    }
    .error {
        background-color: #ffecec;
        color: #7d353b;
        border-radius: 5px;
        padding: 1rem;
    }
    .toast {
        position: fixed;
        right: 1.5rem;
        bottom: 1.5rem;
        background: #ffffff;
        border: 1px solid #e6e6ea;
        border-radius: 8px;
        box-shadow: 0 4px 12px rgba(0, 0, 0, 0.12);
        padding: 0.75rem 1rem;
        opacity: 0;
        transition: opacity 0.3s;
    }
    .toast.show {
        opacity: 1;
    }
"#;

// AND across widgets, OR within one widget. Mirrors FilterSelection::matches.
const SCRIPT: &str = r#"
(function () {
    var selects = document.querySelectorAll('select[data-filter]');
    var rows = document.querySelectorAll('table.dataframe tbody tr');
    var toast = document.getElementById('toast');
    function chosen(sel) {
        return Array.prototype.filter.call(sel.options, function (o) { return o.selected; })
            .map(function (o) { return o.value; });
    }
    function apply() {
        var active = Array.prototype.map.call(selects, function (s) {
            return { key: s.getAttribute('data-filter'), values: chosen(s) };
        });
        var shown = 0;
        Array.prototype.forEach.call(rows, function (r) {
            var ok = active.every(function (f) {
                return f.values.length === 0 || f.values.indexOf(r.getAttribute('data-' + f.key)) !== -1;
            });
            r.hidden = !ok;
            if (ok) { shown++; }
        });
        toast.textContent = '📊 Found ' + shown + ' records';
        toast.classList.add('show');
        clearTimeout(apply.timer);
        apply.timer = setTimeout(function () { toast.classList.remove('show'); }, 4000);
    }
    Array.prototype.forEach.call(selects, function (s) { s.addEventListener('change', apply); });
    apply.timer = setTimeout(function () { toast.classList.remove('show'); }, 4000);
})();
"#;

fn head(page: &PageSettings) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>{icon}</text></svg>">
<style>{STYLE}
    .dataframe a {{
        color: {color};
    }}
</style>
</head>
"#,
        title = escape(&page.title),
        icon = escape(&page.icon),
        color = escape(&page.link_color),
    )
}

fn company_logo(page: &PageSettings) -> String {
    format!(
        r#"<div class="right-aligned-image">
    <img src="{}" alt="{} Logo">
</div>"#,
        escape(&page.company_logo_url),
        escape(&page.company_name)
    )
}

fn ticket_count(n: usize) -> String {
    format!(r#"<p class="ticket-count"><strong>{n}</strong> <span>Open Tickets</span></p>"#)
}

fn vendor_heading(d: &Dashboard) -> String {
    match (&d.vendor_key, &d.vendor) {
        (Some(_), Some(v)) => match &v.logo_url {
            Some(logo) => format!(
                r#"<div class="vendor-header">
    <img src="{logo}" class="vendor-logo" alt="{name} logo">
    <h3>{name} Tickets</h3>
</div>"#,
                logo = escape(logo),
                name = escape(&v.name)
            ),
            None => format!("<h3>{} Tickets</h3>", escape(&v.name)),
        },
        (Some(key), None) => format!("<h3>{} Tickets</h3>", escape(key)),
        (None, _) => "<h3>All Vendor Tickets</h3>".to_string(),
    }
}

fn select_widget(label: &str, name: &str, options: &[String], selected: &[String]) -> String {
    let mut out = format!(
        r#"<label>{label}<select name="{name}" data-filter="{name}" multiple>"#
    );
    for opt in options {
        let mark = if selected.contains(opt) { " selected" } else { "" };
        let v = escape(opt);
        out.push_str(&format!(r#"<option value="{v}"{mark}>{v}</option>"#));
    }
    out.push_str("</select></label>");
    out
}

fn filters(d: &Dashboard) -> String {
    let dates: Vec<String> = d.options.due_dates.iter().map(format_date).collect();
    let selected_dates: Vec<String> = d.selection.due_dates.iter().map(format_date).collect();

    format!(
        r#"<form class="filters" method="get">
{}
{}
{}
<noscript><button type="submit">Apply filters</button></noscript>
</form>"#,
        select_widget("Type", "type", &d.options.types, &d.selection.types),
        select_widget(
            "Property Name",
            "property",
            &d.options.properties,
            &d.selection.properties
        ),
        select_widget("Due Date", "due", &dates, &selected_dates),
    )
}

fn data_attr(name: &str, value: Option<&str>) -> String {
    value
        .map(|v| format!(r#" data-{name}="{}""#, escape(v)))
        .unwrap_or_default()
}

fn table_row(row: &TicketRow, visible: bool) -> String {
    let mut out = String::from("<tr");
    out.push_str(&data_attr("type", row.kind.as_deref()));
    out.push_str(&data_attr("property", row.property.as_deref()));
    let due = row.due_date.as_ref().map(format_date);
    out.push_str(&data_attr("due", due.as_deref()));
    if !visible {
        out.push_str(" hidden");
    }
    out.push('>');
    for cell in row.html_cells() {
        out.push_str(&format!("<td>{cell}</td>"));
    }
    out.push_str("</tr>\n");
    out
}

fn table(d: &Dashboard) -> String {
    let mut out = String::from(
        "<div class=\"dataframe-container\">\n<table class=\"dataframe\">\n<thead><tr>",
    );
    for h in DISPLAY_COLUMNS {
        out.push_str(&format!("<th>{h}</th>"));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &d.rows {
        out.push_str(&table_row(row, d.selection.matches(row)));
    }
    out.push_str("</tbody>\n</table>\n</div>");
    out
}

/// The full dashboard document. Every row is emitted; rows outside the
/// current selection carry `hidden` so the page script can bring them back.
pub fn render_page(d: &Dashboard, page: &PageSettings) -> String {
    let mut out = head(page);
    out.push_str("<body>\n<main class=\"container\">\n");
    out.push_str(&format!(
        "<div class=\"header-container\">\n<div>\n{}\n{}\n</div>\n{}\n</div>\n",
        vendor_heading(d),
        ticket_count(d.open_count()),
        company_logo(page)
    ));
    out.push_str(&filters(d));
    out.push('\n');
    out.push_str(&table(d));
    out.push_str(&format!(
        "\n<div id=\"toast\" class=\"toast show\" role=\"status\">📊 {}</div>\n",
        toast_text(d.visible_count())
    ));
    out.push_str("</main>\n<script>");
    out.push_str(SCRIPT);
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

/// Inline error shown in place of the table when a load fails.
pub fn render_error_page(err: &AppError, page: &PageSettings) -> String {
    let mut out = head(page);
    out.push_str("<body>\n<main class=\"container\">\n");
    out.push_str(&format!(
        "<div class=\"header-container\">\n<h3>{}</h3>\n{}\n</div>\n",
        escape(&page.title),
        company_logo(page)
    ));
    out.push_str(&format!(
        "<div class=\"error\" role=\"alert\">{}</div>\n",
        escape(&err.to_string())
    ));
    out.push_str("</main>\n</body>\n</html>\n");
    out
}
