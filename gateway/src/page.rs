//! Dashboard page
//!
//! A single self-contained HTML page. The selector is rendered server
//! side; changing it fetches `/api/v1/dashboard?city=` and redraws the
//! map (Leaflet), the top roads table, the category tabs and the trend
//! chart (Chart.js).

use road_risk::CitySelector;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Render the dashboard page with the selector's cities
pub fn render_index(selector: &CitySelector) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Traffic &amp; Road Safety Dashboard</title>
    <link rel="stylesheet" href="{leaflet_css}">
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>Traffic &amp; Road Safety Dashboard</h1>
        {selector}
        <h2 id="map-title">Accident Risk Map</h2>
        <p id="map-empty" class="notice" hidden>No data available for this city.</p>
        <div id="map"></div>
        <h2>Top Risky Roads</h2>
        <table id="top-roads">
            <thead><tr><th>#</th><th>Road</th><th>Risk (%)</th><th>Category</th></tr></thead>
            <tbody></tbody>
        </table>
        <h2>High-Risk Trend (Last 7 Days)</h2>
        <p id="trend-label" class="placeholder"></p>
        <p id="trend-empty" class="notice" hidden>Insufficient data to display risk trend.</p>
        <canvas id="trend" height="110"></canvas>
        <h2>Roads by Risk Category</h2>
        <div class="tabs">
            <button class="tab active" data-bucket="high">High Risk</button>
            <button class="tab" data-bucket="medium">Medium Risk</button>
            <button class="tab" data-bucket="low">Low Risk</button>
        </div>
        <table id="bucket">
            <thead><tr><th>Road</th><th>Score</th></tr></thead>
            <tbody></tbody>
        </table>
    </div>
    <script src="{leaflet_js}"></script>
    <script src="{chart_js}"></script>
    <script>{js}</script>
</body>
</html>"#,
        leaflet_css = LEAFLET_CSS,
        leaflet_js = LEAFLET_JS,
        chart_js = CHART_JS,
        css = inline_css(),
        js = inline_javascript(),
        selector = render_selector(selector),
    )
}

fn render_selector(selector: &CitySelector) -> String {
    if selector.cities().is_empty() {
        return r#"<p class="notice">The dataset has no cities.</p>"#.to_string();
    }

    let options: String = selector
        .cities()
        .iter()
        .map(|city| {
            let city = html_escape(city);
            format!(r#"<option value="{city}">{city}</option>"#)
        })
        .collect();

    format!(
        r#"<label for="city">Select City</label>
        <select id="city">{options}</select>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn inline_css() -> &'static str {
    r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f6f7f9; color: #222; }
.container { max-width: 1100px; margin: 0 auto; padding: 24px; }
h1 { margin-top: 0; }
select { font-size: 1rem; padding: 4px 8px; margin-left: 8px; }
#map { height: 450px; border-radius: 6px; }
table { border-collapse: collapse; width: 100%; background: #fff; }
th, td { text-align: left; padding: 6px 10px; border-bottom: 1px solid #e3e5e8; }
.notice { background: #e8f1fb; padding: 8px 12px; border-radius: 4px; }
.placeholder { color: #8a6d3b; font-style: italic; }
.tabs { margin-bottom: 8px; }
.tab { border: 1px solid #ccd; background: #fff; padding: 6px 14px; cursor: pointer; }
.tab.active { background: #2c3e50; color: #fff; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
const map = L.map('map').setView([30.3753, 69.3451], 5);
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
const markers = L.layerGroup().addTo(map);
let chart = null;
let view = null;
let bucket = 'high';

function cell(text) {
    const td = document.createElement('td');
    td.textContent = text;
    return td;
}

function renderMap(v) {
    markers.clearLayers();
    document.getElementById('map-title').textContent = 'Accident Risk Map of ' + v.city;
    document.getElementById('map-empty').hidden = v.map.markers.length > 0;
    map.setView(v.map.center, v.map.zoom);
    for (const m of v.map.markers) {
        const popup = document.createElement('div');
        popup.textContent = m.label;
        L.circleMarker([m.lat, m.lon], {
            radius: 6, color: m.color, fillColor: m.color, fill: true, fillOpacity: 0.7
        }).bindPopup(popup).addTo(markers);
    }
}

function renderTop(v) {
    const body = document.querySelector('#top-roads tbody');
    body.replaceChildren();
    for (const r of v.top_roads) {
        const tr = document.createElement('tr');
        tr.append(cell(r.rank), cell(r.road_name), cell(r.risk_percent_display), cell(r.category));
        body.append(tr);
    }
}

function renderBucket(v) {
    const body = document.querySelector('#bucket tbody');
    body.replaceChildren();
    for (const r of v.buckets[bucket]) {
        const tr = document.createElement('tr');
        tr.append(cell(r.road_name), cell(r.risk_score.toFixed(2)));
        body.append(tr);
    }
}

function renderTrend(v) {
    document.getElementById('trend-label').textContent = v.trend.placeholder ? v.trend.label : '';
    document.getElementById('trend-empty').hidden = v.trend.points.length > 0;
    if (chart) { chart.destroy(); chart = null; }
    if (v.trend.points.length === 0) { return; }
    chart = new Chart(document.getElementById('trend'), {
        type: 'line',
        data: {
            labels: v.trend.points.map(p => p.day_label),
            datasets: [{
                label: 'Number of High-Risk Segments (' + v.trend.label + ')',
                data: v.trend.points.map(p => p.count),
                pointRadius: 4
            }]
        },
        options: { plugins: { title: { display: true, text: 'High-Risk Trend in ' + v.city } } }
    });
}

async function onCityChanged(city) {
    const res = await fetch('/api/v1/dashboard?city=' + encodeURIComponent(city));
    if (!res.ok) { return; }
    const data = await res.json();
    // a later selection may have finished first
    if (select && data.city !== select.value) { return; }
    view = data;
    renderMap(view);
    renderTop(view);
    renderTrend(view);
    renderBucket(view);
}

document.querySelectorAll('.tab').forEach(btn => btn.addEventListener('click', () => {
    document.querySelectorAll('.tab').forEach(b => b.classList.remove('active'));
    btn.classList.add('active');
    bucket = btn.dataset.bucket;
    if (view) { renderBucket(view); }
}));

const select = document.getElementById('city');
if (select) {
    select.addEventListener('change', () => onCityChanged(select.value));
    onCityChanged(select.value);
}
"#
}
