//! Static shell of the generated site.
//!
//! The page, stylesheet, and viewer script are embedded
//! templates written into the output tree on every build.
//! The script is the consumer of the index and buffer
//! contracts: it loads `data/db.json` and
//! `data/points.geojson`, and maps pointer positions on the
//! thermal viewer back into the float32 buffer to read the
//! temperature under the cursor.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};

use crate::render::{COLORMAP, RENDER_MAX, RENDER_MIN};

/// Shown in the page header and the browser tab.
pub const PAGE_TITLE: &str = "Thermal Image Map";
/// Shown in the page footer.
pub const FOOTER_TEXT: &str = "Click a point to load its images. Hover thermal to read temperature. Click to lock/unlock value.";

const COLORBAR_WIDTH: u32 = 28;
const COLORBAR_HEIGHT: u32 = 256;

/// Write the page, stylesheet, script, and colorbar into an
/// already-created output tree.
pub fn write_assets(out_dir: &Path) -> Result<()> {
    fs::write(out_dir.join("index.html"), index_html()).context("writing index.html")?;
    fs::write(out_dir.join("assets/css/styles.css"), STYLES_CSS)
        .context("writing styles.css")?;
    fs::write(out_dir.join("assets/js/main.js"), MAIN_JS).context("writing main.js")?;
    colorbar()
        .save(out_dir.join("assets/img/colorbar.png"))
        .context("writing colorbar.png")?;
    Ok(())
}

/// Vertical gradient strip over the render range, minimum at
/// the bottom. The numeric labels live in the page markup.
fn colorbar() -> RgbImage {
    let mut image = RgbImage::new(COLORBAR_WIDTH, COLORBAR_HEIGHT);
    for row in 0..COLORBAR_HEIGHT {
        let t = 1.0 - row as f64 / (COLORBAR_HEIGHT - 1) as f64;
        let color = COLORMAP.eval_continuous(t);
        for col in 0..COLORBAR_WIDTH {
            image.put_pixel(col, row, Rgb([color.r, color.g, color.b]));
        }
    }
    image
}

fn index_html() -> String {
    INDEX_HTML
        .replace("__PAGE_TITLE__", PAGE_TITLE)
        .replace("__FOOTER_TEXT__", FOOTER_TEXT)
        .replace("__RENDER_MIN__", &format!("{:.0}", RENDER_MIN))
        .replace("__RENDER_MAX__", &format!("{:.0}", RENDER_MAX))
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>__PAGE_TITLE__</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css" />
  <script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
  <link rel="stylesheet" href="assets/css/styles.css" />
</head>
<body class="bg-light">
<div class="container-fluid g-2" style="height:100vh;">
  <div class="row gx-2 gy-2 h-100">
    <div class="col-12" style="height:10%;">
      <div class="h-100 d-flex align-items-center justify-content-between px-3 rounded bg-white shadow-sm">
        <h4 class="mb-0">__PAGE_TITLE__</h4>
        <div class="small text-muted">Static demo</div>
      </div>
    </div>
    <div class="col-12" style="height:80%;">
      <div class="row h-100 gx-2">
        <div class="col-md-6 col-12 h-100">
          <div id="map" class="rounded bg-white shadow-sm h-100"></div>
        </div>
        <div class="col-md-6 col-12 h-100">
          <div class="d-flex flex-column h-100">
            <div class="flex-fill mb-2">
              <div id="rgbView" class="viewer rounded bg-white shadow-sm position-relative">
                <img id="rgbImg" class="fit-contain" alt="RGB" />
                <div class="viewer-title">RGB</div>
                <div id="rgbPlaceholder" class="placeholder">Click the mark on the map to show image</div>
              </div>
            </div>
            <div class="flex-fill">
              <div id="thermView" class="viewer rounded bg-white shadow-sm position-relative">
                <img id="thermImg" class="fit-contain" alt="Thermal" />
                <div id="thermOverlay" class="therm-overlay">&mdash;</div>
                <div class="colorbar">
                  <div class="cb-label">__RENDER_MAX__ &deg;C</div>
                  <img src="assets/img/colorbar.png" alt="Colorbar"/>
                  <div class="cb-label">__RENDER_MIN__ &deg;C</div>
                </div>
                <div class="viewer-title">Thermal (__RENDER_MIN__-__RENDER_MAX__ &deg;C)</div>
                <div id="thermPlaceholder" class="placeholder">Click the mark on the map to show image</div>
              </div>
            </div>
          </div>
        </div>
      </div>
    </div>
    <div class="col-12" style="height:10%;">
      <div class="h-100 d-flex align-items-center justify-content-between px-3 rounded bg-white shadow-sm">
        <div class="small">__FOOTER_TEXT__</div>
        <div class="small text-muted">Generated with thermal-site</div>
      </div>
    </div>
  </div>
</div>
<script src="assets/js/main.js"></script>
</body>
</html>
"#;

const STYLES_CSS: &str = r#"
html, body { height: 100%; }
#map { width: 100%; }
.viewer { overflow: hidden; position: relative; }
.viewer-title { position:absolute; top:8px; left:12px; background:rgba(255,255,255,0.85); padding:2px 8px; border-radius:6px; font-weight:600; font-size:0.9rem; }
.therm-overlay { position:absolute; right:10%; bottom:10%; background:rgba(0,0,0,0.6); color:white; padding:6px 10px; border-radius:8px; font-variant-numeric: tabular-nums; }
.colorbar { position:absolute; left:8px; bottom:8px; background:rgba(255,255,255,0.85); padding:4px; border-radius:8px; }
.colorbar img { display:block; width:28px; height:auto; margin:0 auto; }
.cb-label { font-size:0.7rem; text-align:center; white-space:nowrap; }
.placeholder { position:absolute; inset:0; display:flex; align-items:center; justify-content:center; color:#777; font-style:italic; user-select:none; pointer-events:none; }
.leaflet-container { height: 100%; border-radius: 0.75rem; }
/* Ensure viewer images always fit fully inside their frames */
.viewer img.fit-contain {
  width: 100%;
  height: 100%;
  max-width: 100%;
  max-height: 100%;
  object-fit: contain;
  object-position: center center;
  display: block;
}
"#;

const MAIN_JS: &str = r#"
let DB = {}; let DN_CACHE = {}; let map, markers; let locked = false;

function syncHeights() {
  // Set RGB:Thermal heights to 40% : 60% of map height
  const mapEl = document.getElementById('map');
  const rgbView = document.getElementById('rgbView');
  const thermView = document.getElementById('thermView');
  if (!mapEl || !rgbView || !thermView) return;
  const rect = mapEl.getBoundingClientRect();
  const gap = 8; // px space between viewers
  const usable = Math.max(160, rect.height - gap);
  rgbView.style.height = `${Math.floor(usable * 0.4)}px`;
  thermView.style.height = `${Math.floor(usable * 0.6)}px`;
}

function setPlaceholders(visible) {
  document.getElementById('rgbPlaceholder').style.display = visible ? 'flex' : 'none';
  document.getElementById('thermPlaceholder').style.display = visible ? 'flex' : 'none';
}

window.addEventListener('DOMContentLoaded', async () => {
  // Load DB + points
  DB = await fetch('data/db.json').then(r => r.json());
  const fc = await fetch('data/points.geojson').then(r => r.json());

  // Map + layers
  map = L.map('map', { zoomControl: true });
  const osm  = L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {maxZoom: 19, attribution: '&copy; OpenStreetMap'});
  const esri = L.tileLayer('https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}', {maxZoom: 19, attribution: 'Esri'});
  osm.addTo(map); L.control.layers({'OSM': osm, 'Satellite': esri}, {}).addTo(map);

  // Marker clustering; disable at high zoom to show single markers
  markers = L.markerClusterGroup({ disableClusteringAtZoom: 18 });
  const colors = {}; const palette = ['red','blue','green','purple','orange','darkred','cadetblue'];

  (fc.features || []).forEach((f) => {
    const p = f.properties || {}; const c = f.geometry.coordinates; const cam = p.camera || 'camera';
    if (!(cam in colors)) colors[cam] = palette[Object.keys(colors).length % palette.length];
    const icon = new L.Icon({
      iconUrl: `https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-${colors[cam]}.png`,
      iconSize: [25, 41], iconAnchor: [12, 41], popupAnchor: [1, -34],
      shadowUrl: 'https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.7.1/images/marker-shadow.png', shadowSize: [41,41]
    });
    const m = L.marker([c[1], c[0]], { icon });
    const html = `<div class="d-flex align-items-center">
        <img src="${p.thumb}" width="64" height="64" style="object-fit:cover;border-radius:6px;margin-right:8px;" />
        <div><div><strong>${cam}</strong></div><div class="small text-muted">${p.datetime || ''}</div><div class="small">ID: ${p.id.slice(0,8)}</div></div></div>`;
    m.bindPopup(html); m.on('click', () => loadShot(p.id)); markers.addLayer(m);
  });
  map.addLayer(markers);

  // Fit to points, then zoom in one extra level to reduce clustering
  try {
    const bounds = L.geoJSON(fc).getBounds();
    if (bounds.isValid()) { map.fitBounds(bounds.pad(0.1)); map.once('moveend', () => { map.setZoom(map.getZoom()+1); }); }
    else { map.setView([23.5,121], 8); }
  } catch { map.setView([23.5,121], 8); }

  // Initial layout + placeholders
  syncHeights(); setPlaceholders(true);
  setTimeout(() => { map.invalidateSize(); syncHeights(); }, 50);
  window.addEventListener('resize', () => { map.invalidateSize(); syncHeights(); });
  map.on('resize', () => { syncHeights(); });

  // Thermal hover/click readout
  const thermImg = document.getElementById('thermImg'); const overlay = document.getElementById('thermOverlay');
  thermImg.addEventListener('mousemove', (ev) => { if (!locked) showValueAtEvent(ev, overlay); });
  thermImg.addEventListener('click', (ev) => { if (!locked) { showValueAtEvent(ev, overlay); locked = true; } else { locked = false; } });
  thermImg.addEventListener('mouseleave', () => { if (!locked) overlay.textContent = '—'; });
});

async function loadShot(id) {
  const rec = DB[id]; if (!rec) return;
  const rgbImg = document.getElementById('rgbImg'); const thermImg = document.getElementById('thermImg');
  rgbImg.src = rec.rgb || ''; thermImg.src = rec.thermal_color; thermImg.dataset.id = id;
  setPlaceholders(false);
  if (!DN_CACHE[id]) {
    const buf = await fetch(rec.thermal_dn).then(r => r.arrayBuffer());
    DN_CACHE[id] = { w: rec.size.w, h: rec.size.h, data: new Float32Array(buf) };
  }
}

// Invert the letterboxed rendering to find the buffer cell
// under the pointer: scale = min(fit scales), centered offsets,
// then floor to integer column/row. Outside the rendered area
// there is no value.
function showValueAtEvent(ev, overlay) {
  const img = ev.currentTarget; const id = img.dataset.id;
  if (!id || !DN_CACHE[id]) { overlay.textContent = '—'; return; }
  const dn = DN_CACHE[id]; const rect = img.getBoundingClientRect();
  const xCss = ev.clientX - rect.left; const yCss = ev.clientY - rect.top;
  const scale   = Math.min(rect.width / dn.w, rect.height / dn.h);
  const renderW = dn.w * scale; const renderH = dn.h * scale;
  const xOffset = (rect.width - renderW) / 2; const yOffset = (rect.height - renderH) / 2;
  const x = Math.floor((xCss - xOffset) / scale); const y = Math.floor((yCss - yOffset) / scale);
  if (x < 0 || y < 0 || x >= dn.w || y >= dn.h) { overlay.textContent = '—'; return; }
  const idx = y * dn.w + x; const t = dn.data[idx];
  overlay.textContent = isFinite(t) ? `${t.toFixed(2)} °C` : '—';
}
"#;
