//! Static HTML pages served by the API

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>octanebuddy API</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; color: #222; }
  code { background: #f2f2f2; padding: 0 .3rem; border-radius: 3px; }
  td { padding: .25rem .75rem; border-bottom: 1px solid #eee; }
</style>
</head>
<body>
<h1>octanebuddy</h1>
<p>Octane number prediction and fiscal classification from chromatographic composition.</p>
<table>
  <tr><td><code>GET /dashboard</code></td><td>Interactive dashboard</td></tr>
  <tr><td><code>GET /health</code></td><td>Service status</td></tr>
  <tr><td><code>POST /predict</code></td><td>Predict from a JSON map of component percentages</td></tr>
  <tr><td><code>POST /export</code></td><td>Same as /predict, returned as a CSV download</td></tr>
  <tr><td><code>GET /info</code></td><td>Model information</td></tr>
  <tr><td><code>GET /ranges</code></td><td>Valid and typical variable ranges</td></tr>
  <tr><td><code>GET /categories</code></td><td>Fiscal categories and NC codes</td></tr>
  <tr><td><code>GET /example</code></td><td>Example sample</td></tr>
  <tr><td><code>GET /stats</code></td><td>Prediction counters</td></tr>
</table>
<p>Example request:</p>
<pre><code>curl -X POST http://localhost:5000/predict -H 'content-type: application/json' \
  -d '{"PARAFINAS":10.5,"ISOPARAFINAS":32.0,"OLEFINAS":8.5,"NAFTENICOS":6.2,
       "AROMATICOS":38.0,"ETANOL":4.8,"MTBE":0,"ETBE":0}'</code></pre>
</body>
</html>
"#;

pub const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>octanebuddy dashboard</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 980px; margin: 1.5rem auto; color: #222; }
  .grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: .75rem; }
  label { display: block; font-size: .85rem; color: #555; }
  input { width: 100%; padding: .35rem; box-sizing: border-box; }
  button { margin: 1rem .5rem 1rem 0; padding: .5rem 1rem; }
  .card { border: 1px solid #ddd; border-radius: 6px; padding: 1rem; margin-top: 1rem; }
  .REGULAR { border-left: 6px solid #d9534f; }
  .PREMIUM { border-left: 6px solid #f0ad4e; }
  .SUPER { border-left: 6px solid #5cb85c; }
  .warn { color: #8a6d3b; background: #fcf8e3; padding: .4rem; margin: .3rem 0; }
  .error { color: #a94442; background: #f2dede; padding: .4rem; }
  .big { font-size: 2.2rem; font-weight: bold; }
</style>
</head>
<body>
<h1>Octane prediction</h1>
<p>Enter the composition in %v/v. Ox is computed as ETANOL + MTBE + ETBE.</p>
<form id="sample">
  <div class="grid">
    <div><label>PARAFINAS</label><input name="PARAFINAS" type="number" step="0.01" required></div>
    <div><label>ISOPARAFINAS</label><input name="ISOPARAFINAS" type="number" step="0.01" required></div>
    <div><label>OLEFINAS</label><input name="OLEFINAS" type="number" step="0.01" required></div>
    <div><label>NAFTÉNICOS</label><input name="NAFTENICOS" type="number" step="0.01" required></div>
    <div><label>AROMÁTICOS</label><input name="AROMATICOS" type="number" step="0.01" required></div>
    <div><label>ETANOL</label><input name="ETANOL" type="number" step="0.01" required></div>
    <div><label>MTBE</label><input name="MTBE" type="number" step="0.01" required></div>
    <div><label>ETBE</label><input name="ETBE" type="number" step="0.01" required></div>
  </div>
  <p id="totals"></p>
  <button type="submit">Predict</button>
  <button type="button" id="load-example">Load example</button>
  <button type="button" id="export">Export CSV</button>
</form>
<div id="output"></div>
<script>
const form = document.getElementById('sample');
const output = document.getElementById('output');

function payload() {
  const body = {};
  for (const input of form.querySelectorAll('input')) body[input.name] = input.value;
  return body;
}

function updateTotals() {
  const v = payload();
  const num = k => parseFloat(v[k]) || 0;
  const ox = num('ETANOL') + num('MTBE') + num('ETBE');
  const sum = ['PARAFINAS','ISOPARAFINAS','OLEFINAS','NAFTENICOS','AROMATICOS']
    .reduce((acc, k) => acc + num(k), 0) + ox;
  document.getElementById('totals').textContent =
    'Ox = ' + ox.toFixed(2) + ' %   |   total = ' + sum.toFixed(2) + ' %';
}

function post(path) {
  return fetch(path, {
    method: 'POST',
    headers: { 'content-type': 'application/json' },
    body: JSON.stringify(payload())
  });
}

function render(r) {
  const c = r.classification;
  let html = '<div class="card ' + c.category + '">'
    + '<div class="big">' + r.predicted_value.toFixed(2) + ' RON</div>'
    + '<div>Rounded: ' + r.rounded_value + ' &middot; band '
    + r.confidence_band.low.toFixed(2) + ' - ' + r.confidence_band.high.toFixed(2) + '</div>'
    + '<h2>' + c.label + '</h2>'
    + '<div>NC ' + c.nc_code + ' &middot; fiscal heading ' + c.fiscal_heading + '</div>'
    + '<div>' + c.description + '</div></div>';
  for (const w of r.out_of_range) {
    html += '<div class="warn">' + w.variable + ' = ' + w.value.toFixed(2) + ' is ' + w.bound
      + ' the training range (' + w.min.toFixed(2) + ' - ' + w.max.toFixed(2) + ')</div>';
  }
  if (r.sum_advisory) {
    html += '<div class="warn">Component sum ' + r.sum_advisory.sum.toFixed(1)
      + ' % deviates from 100 %</div>';
  }
  if (r.critical_zone) {
    html += '<div class="warn">Within ' + r.critical_zone.distance.toFixed(2)
      + ' RON of the ' + r.critical_zone.boundary + ' boundary</div>';
  }
  output.innerHTML = html;
}

async function showError(response) {
  const body = await response.json().catch(() => ({ error: response.statusText }));
  output.innerHTML = '<div class="error">' + body.error + '</div>';
}

form.addEventListener('input', updateTotals);

form.addEventListener('submit', async (event) => {
  event.preventDefault();
  const response = await post('/predict');
  if (response.ok) render(await response.json()); else showError(response);
});

document.getElementById('load-example').addEventListener('click', async () => {
  const response = await fetch('/example');
  const example = await response.json();
  for (const [name, value] of Object.entries(example.sample)) {
    const input = form.querySelector('input[name="' + name + '"]');
    if (input) input.value = value;
  }
  updateTotals();
});

document.getElementById('export').addEventListener('click', async () => {
  const response = await post('/export');
  if (!response.ok) return showError(response);
  const blob = await response.blob();
  const disposition = response.headers.get('content-disposition') || '';
  const match = disposition.match(/filename="([^"]+)"/);
  const link = document.createElement('a');
  link.href = URL.createObjectURL(blob);
  link.download = match ? match[1] : 'octane_prediction.csv';
  link.click();
  URL.revokeObjectURL(link.href);
});

updateTotals();
</script>
</body>
</html>
"#;
