//! HTML for the dashboard page and the fatal error page.
//!
//! The page is a static shell. Panels are fetched as JSON and drawn with
//! Leaflet and Plotly, so changing a year only re-requests its own panels.

use landcover_common::{DashboardError, Year};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; display: flex; color: #222; }
aside { width: 240px; padding: 1rem; background: #f3f4f6; min-height: 100vh; box-sizing: border-box; }
aside label { display: block; margin: 1rem 0 0.25rem; font-weight: bold; }
aside select { width: 100%; }
main { flex: 1; padding: 1rem 2rem; min-width: 0; }
section { margin-bottom: 2rem; }
#map { height: 520px; }
.chart { width: 100%; height: 420px; }
.notice { padding: 0.75rem 1rem; border-radius: 4px; margin: 0.5rem 0; }
.notice.error { background: #fde2e2; color: #8a1c1c; }
.notice.warning { background: #fff4d6; color: #7a5a00; }
.notice.info { background: #e1effe; color: #1e4e8c; }
table { border-collapse: collapse; margin: 0.5rem 0; }
th, td { border: 1px solid #ddd; padding: 0.25rem 0.75rem; text-align: left; }
.columns { display: flex; gap: 2rem; flex-wrap: wrap; }
.columns > div { flex: 1; min-width: 320px; }
"#;

const SCRIPT: &str = r#"
const displaySelect = document.getElementById('display-year');
const metricsSelect = document.getElementById('metrics-year');
let map = null;
let mapLayers = [];
let layerControl = null;

function notice(el, status, message) {
  el.innerHTML = '';
  if (!message) return;
  const div = document.createElement('div');
  div.className = 'notice ' + status;
  div.textContent = message;
  el.appendChild(div);
}

function table(el, columns, rows) {
  el.innerHTML = '';
  const t = document.createElement('table');
  const head = t.insertRow();
  for (const c of columns) {
    const th = document.createElement('th');
    th.textContent = c;
    head.appendChild(th);
  }
  for (const row of rows) {
    const tr = t.insertRow();
    for (const v of row) tr.insertCell().textContent = v === null ? '' : v;
  }
  el.appendChild(t);
}

function chart(id, figure) {
  const el = document.getElementById(id);
  if (!figure) { Plotly.purge(el); el.style.display = 'none'; return; }
  el.style.display = '';
  Plotly.react(el, figure.data, figure.layout, {responsive: true});
}

function download(id, href) {
  const a = document.getElementById(id);
  if (href) { a.href = href; a.style.display = ''; } else { a.style.display = 'none'; }
}

async function panel(path) {
  const response = await fetch(path);
  return response.json();
}

async function loadMap(year) {
  const body = await panel('/panels/map?year=' + year);
  notice(document.getElementById('map-notice'), body.status, body.message);
  if (body.status !== 'ok') return;
  const p = body.data;
  if (!map) map = L.map('map');
  map.setView(p.center, p.zoom);
  for (const layer of mapLayers) map.removeLayer(layer);
  if (layerControl) map.removeControl(layerControl);
  mapLayers = [];
  const base = L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors'
  }).addTo(map);
  mapLayers.push(base);
  const overlays = {};
  if (p.boundary) {
    const boundary = L.geoJSON(p.boundary.data, {style: p.boundary.style}).addTo(map);
    mapLayers.push(boundary);
    overlays['Basin boundary'] = boundary;
  }
  const image = L.imageOverlay(p.overlay.url, p.bounds, {opacity: p.overlay.opacity}).addTo(map);
  mapLayers.push(image);
  overlays[p.overlay.name] = image;
  if (p.layer_control) layerControl = L.control.layers({'OpenStreetMap': base}, overlays).addTo(map);
}

async function loadArea(year) {
  const body = await panel('/panels/area?year=' + year);
  notice(document.getElementById('area-notice'), body.status, body.message);
  const d = body.data;
  chart('area-chart', d ? d.chart : null);
  table(document.getElementById('area-table'), d ? d.columns : [], d ? d.rows.map(r => [r.class, r.area_km2.toFixed(2)]) : []);
  download('area-download', d ? d.download : null);
}

async function loadTrends() {
  const body = await panel('/panels/trends');
  notice(document.getElementById('trends-notice'), body.status, body.message);
  const d = body.data;
  chart('total-chart', d ? d.total_chart : null);
  chart('class-chart', d ? d.class_chart : null);
}

async function loadMetrics(year) {
  const body = await panel('/panels/metrics?year=' + year);
  notice(document.getElementById('metrics-notice'), body.status, body.message);
  const d = body.data;
  chart('f1-trend-chart', d ? d.trend_chart : null);
  const detail = d ? d.detail : null;
  chart('f1-bar-chart', detail ? detail.bar_chart : null);
  table(document.getElementById('metrics-table'),
    detail ? ['Classe'].concat(detail.table.columns) : [],
    detail ? detail.table.rows.map(r => [r.class].concat(r.values)) : []);
  download('metrics-download', detail ? detail.download : null);
}

displaySelect.addEventListener('change', () => { loadMap(displaySelect.value); loadArea(displaySelect.value); });
metricsSelect.addEventListener('change', () => loadMetrics(metricsSelect.value));

loadMap(displaySelect.value);
loadArea(displaySelect.value);
loadTrends();
loadMetrics(metricsSelect.value);
"#;

/// Values the page shell is rendered from.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub years: &'a [Year],
    pub display_year: Year,
    pub metrics_year: Year,
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn year_options(years: &[Year], selected: Year) -> String {
    years
        .iter()
        .map(|year| {
            let attr = if *year == selected { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, year, attr)
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Render the dashboard page shell.
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let title = escape_html(ctx.title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="{leaflet_css}">
<script src="{leaflet_js}"></script>
<script src="{plotly_js}"></script>
<style>{style}</style>
</head>
<body>
<aside>
  <h2>Settings</h2>
  <label for="display-year">Year to display</label>
  <select id="display-year">{display_options}</select>
  <label for="metrics-year">Metrics year</label>
  <select id="metrics-year">{metrics_options}</select>
</aside>
<main>
  <h1>{title}</h1>
  <section id="map-section">
    <h2>Land-cover map</h2>
    <div id="map-notice"></div>
    <div id="map"></div>
  </section>
  <section id="area-section">
    <h2>Area by class</h2>
    <div id="area-notice"></div>
    <div class="columns">
      <div><div id="area-chart" class="chart"></div></div>
      <div>
        <div id="area-table"></div>
        <a id="area-download" download>Download table (CSV)</a>
      </div>
    </div>
  </section>
  <section id="trends-section">
    <h2>Time series</h2>
    <div id="trends-notice"></div>
    <div id="total-chart" class="chart"></div>
    <div id="class-chart" class="chart"></div>
  </section>
  <section id="metrics-section">
    <h2>Classification metrics</h2>
    <div id="metrics-notice"></div>
    <div id="f1-trend-chart" class="chart"></div>
    <div id="f1-bar-chart" class="chart"></div>
    <div id="metrics-table"></div>
    <a id="metrics-download" download>Download metrics (CSV)</a>
  </section>
</main>
<script>{script}</script>
</body>
</html>
"#,
        title = title,
        leaflet_css = LEAFLET_CSS,
        leaflet_js = LEAFLET_JS,
        plotly_js = PLOTLY_JS,
        style = STYLE,
        display_options = year_options(ctx.years, ctx.display_year),
        metrics_options = year_options(ctx.years, ctx.metrics_year),
        script = SCRIPT,
    )
}

/// Render the page shown when an input the whole dashboard needs is unusable.
pub fn render_error_page(title: &str, error: &DashboardError) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<main>
  <h1>{title}</h1>
  <div class="notice error">{message}</div>
  <p>{remedy}</p>
</main>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        message = escape_html(&error.to_string()),
        remedy = escape_html(error.remedy()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Água" & 'Solo'</b>"#),
            "&lt;b&gt;&quot;Água&quot; &amp; &#39;Solo&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_page_selects_default_years() {
        let html = render_page(&PageContext {
            title: "Rio da Várzea",
            years: &[2019, 2020, 2021],
            display_year: 2021,
            metrics_year: 2019,
        });

        assert!(html.contains("<title>Rio da Várzea</title>"));
        assert!(html.contains(r#"<select id="display-year"><option value="2019">2019</option><option value="2020">2020</option><option value="2021" selected>2021</option></select>"#));
        assert!(html.contains(r#"<select id="metrics-year"><option value="2019" selected>2019</option>"#));
        assert!(html.contains(LEAFLET_JS));
        assert!(html.contains(PLOTLY_JS));
    }

    #[test]
    fn test_error_page_names_resource_and_remedy() {
        let err = DashboardError::MissingAreaCsv {
            path: "outputs/area_por_classe.csv".into(),
        };
        let html = render_error_page("Dashboard", &err);
        assert!(html.contains("outputs/area_por_classe.csv"));
        assert!(html.contains(err.remedy()));
        assert!(!html.contains("<script"));
    }
}
