/* standard use */
use std::collections::BTreeSet;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::{from_utf8, FromStr};

/* external crate */
use handlebars::{Handlebars, RenderError};
use itertools::Itertools;
use serde::Serialize;
use serde_json::{json, Value};
use strum_macros::{EnumString, EnumVariantNames};
use thousands::Separable;
use time::{macros::format_description, OffsetDateTime};

/* private use */
use crate::config::DataPaths;
use crate::detail::enrich_max_flow;
use crate::stats::{aggregate_runtime, memory_scatter};
use crate::table::{load_master, parse_master, BenchmarkRow};
use crate::util::{ChartType, GroupKey};

pub const DASHBOARD_HBS: &[u8] = include_bytes!("../hbs/dashboard.hbs");
pub const CUSTOM_CSS: &[u8] = include_bytes!("../etc/custom.css");

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumVariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum DirectedFilter {
    All,
    Directed,
    Undirected,
}

/// Filter widget state. `None` means "no constraint"; an empty algorithm
/// set is a real selection (everything deselected) and matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub algorithms: Option<BTreeSet<String>>,
    pub nodes: Option<(u64, u64)>,
    pub density: Option<(f64, f64)>,
    pub directed: DirectedFilter,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            algorithms: None,
            nodes: None,
            density: None,
            directed: DirectedFilter::All,
        }
    }
}

/// The pure core of the dashboard: which rows survive the current filters.
/// Range filters follow the master table semantics: a row whose value is
/// null cannot prove it lies within the range, so it is excluded.
pub fn apply_filters(rows: &[BenchmarkRow], filters: &FilterParams) -> Vec<BenchmarkRow> {
    rows.iter()
        .filter(|row| {
            if let Some(algorithms) = &filters.algorithms {
                if !algorithms.contains(&row.algorithm) {
                    return false;
                }
            }
            if let Some((lo, hi)) = filters.nodes {
                match row.nodes {
                    Some(n) if n >= lo && n <= hi => {}
                    _ => return false,
                }
            }
            if let Some((lo, hi)) = filters.density {
                match row.density {
                    Some(d) if d >= lo && d <= hi => {}
                    _ => return false,
                }
            }
            match filters.directed {
                DirectedFilter::All => true,
                DirectedFilter::Directed => row.directed == Some(true),
                DirectedFilter::Undirected => row.directed == Some(false),
            }
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: &'static str,
    pub x_label: String,
    pub y_label: String,
    pub note: Option<String>,
    pub datasets: Value,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub charts: Vec<ChartSpec>,
    pub algorithms: Vec<String>,
    pub nodes_bounds: (u64, u64),
    pub density_bounds: (f64, f64),
    pub filters: FilterParams,
    pub total_rows: usize,
    pub visible_rows: usize,
}

fn line_chart(
    chart: ChartType,
    title: &str,
    x_label: &str,
    rows: &[BenchmarkRow],
    key: GroupKey,
) -> ChartSpec {
    let series = aggregate_runtime(rows, key);
    let datasets: Vec<Value> = series
        .iter()
        .map(|s| {
            json!({
                "label": s.algorithm,
                "data": s.points.iter().map(|p| json!({"x": p.x, "y": p.median})).collect::<Vec<_>>(),
            })
        })
        .collect();
    ChartSpec {
        id: chart.to_string(),
        title: title.to_string(),
        kind: "line",
        x_label: x_label.to_string(),
        y_label: "Runtime (ms), median".to_string(),
        note: if series.is_empty() {
            Some("No rows match the current filters.".to_string())
        } else {
            None
        },
        datasets: Value::Array(datasets),
    }
}

fn memory_chart(rows: &[BenchmarkRow]) -> ChartSpec {
    let groups = memory_scatter(rows);
    let datasets: Vec<Value> = groups
        .iter()
        .map(|(algorithm, points)| {
            json!({
                "label": algorithm,
                "data": points.iter().map(|(x, y)| json!({"x": x, "y": y})).collect::<Vec<_>>(),
            })
        })
        .collect();
    ChartSpec {
        id: ChartType::MemoryVsRuntime.to_string(),
        title: "Memory vs Runtime".to_string(),
        kind: "scatter",
        x_label: "Runtime (ms)".to_string(),
        y_label: "Memory Delta (KB)".to_string(),
        note: if groups.is_empty() {
            Some("No rows match the current filters.".to_string())
        } else {
            None
        },
        datasets: Value::Array(datasets),
    }
}

fn maxflow_chart(rows: &[BenchmarkRow], results_dir: &Path) -> ChartSpec {
    let mut spec = ChartSpec {
        id: ChartType::MaxflowFlowVsRuntime.to_string(),
        title: "MaxFlow: Flow Value vs Runtime".to_string(),
        kind: "scatter",
        x_label: "Final Max Flow Value".to_string(),
        y_label: "Runtime (ms)".to_string(),
        note: None,
        datasets: Value::Array(Vec::new()),
    };
    if !rows.iter().any(|row| row.is_max_flow()) {
        spec.note = Some("No max-flow rows in the current selection.".to_string());
        return spec;
    }
    let samples = enrich_max_flow(rows, results_dir);
    let points: Vec<(u64, f64, f64)> = samples
        .iter()
        .filter_map(|s| {
            let row = &rows[s.row_index];
            Some((row.nodes?, s.flow, row.runtime_ms?))
        })
        .collect();
    if points.is_empty() {
        spec.note =
            Some("No max-flow detail files found, or no flow value could be parsed.".to_string());
        return spec;
    }
    // one dataset per node count, mirroring the color-by-nodes scatter
    let node_counts: Vec<u64> = points.iter().map(|p| p.0).unique().sorted().collect();
    let datasets: Vec<Value> = node_counts
        .into_iter()
        .map(|n| {
            json!({
                "label": format!("n={}", n),
                "data": points
                    .iter()
                    .filter(|p| p.0 == n)
                    .map(|p| json!({"x": p.1, "y": p.2}))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    spec.datasets = Value::Array(datasets);
    spec
}

/// Pure function from (full dataset, filter parameters) to the rendered
/// chart set. The HTTP layer and the tests both go through here; nothing in
/// it knows about requests or widgets.
pub fn dashboard_view(
    rows: &[BenchmarkRow],
    filters: &FilterParams,
    results_dir: &Path,
) -> DashboardView {
    let visible = apply_filters(rows, filters);

    let charts = vec![
        line_chart(
            ChartType::RuntimeVsNodes,
            "Runtime vs Nodes",
            "Nodes (V)",
            &visible,
            GroupKey::Nodes,
        ),
        line_chart(
            ChartType::RuntimeVsDensity,
            "Runtime vs Density",
            "Density",
            &visible,
            GroupKey::Density,
        ),
        memory_chart(&visible),
        maxflow_chart(&visible, results_dir),
    ];

    let algorithms: Vec<String> = rows
        .iter()
        .map(|row| row.algorithm.clone())
        .unique()
        .sorted()
        .collect();
    let nodes = rows.iter().filter_map(|row| row.nodes);
    let nodes_bounds = match (nodes.clone().min(), nodes.max()) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => (0, 1000),
    };
    let densities: Vec<f64> = rows.iter().filter_map(|row| row.density).collect();
    let density_bounds = if densities.is_empty() {
        (0.0, 1.0)
    } else {
        let lo = densities.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = densities.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (lo, hi)
    };

    DashboardView {
        charts,
        algorithms,
        nodes_bounds,
        density_bounds,
        filters: filters.clone(),
        total_rows: rows.len(),
        visible_rows: visible.len(),
    }
}

fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut it = pair.splitn(2, '=');
            let key = decode_component(it.next().unwrap_or(""));
            let value = decode_component(it.next().unwrap_or(""));
            (key, value)
        })
        .collect()
}

/// Reconstruct filter state from the query string of a page request. An
/// untouched page (no `filtered` marker) means "no constraints"; once the
/// form has been submitted, the absence of any `algo` value is an explicit
/// empty selection.
pub fn parse_filters(query: &str) -> FilterParams {
    let pairs = parse_query(query);
    let submitted = pairs.iter().any(|(k, _)| k == "filtered");

    let mut filters = FilterParams::default();
    if submitted {
        filters.algorithms = Some(
            pairs
                .iter()
                .filter(|(k, _)| k == "algo")
                .map(|(_, v)| v.clone())
                .collect(),
        );
    }
    let lookup = |name: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    };
    if let (Some(lo), Some(hi)) = (lookup("nodes_min"), lookup("nodes_max")) {
        if let (Ok(lo), Ok(hi)) = (lo.parse(), hi.parse()) {
            filters.nodes = Some((lo, hi));
        }
    }
    if let (Some(lo), Some(hi)) = (lookup("density_min"), lookup("density_max")) {
        if let (Ok(lo), Ok(hi)) = (lo.parse(), hi.parse()) {
            filters.density = Some((lo, hi));
        }
    }
    if let Some(choice) = lookup("directed") {
        if let Ok(choice) = DirectedFilter::from_str(choice) {
            filters.directed = choice;
        }
    }
    filters
}

/// Render the dashboard page. `view` is `None` when no dataset is loaded
/// yet; the page then shows a warning and the upload control only.
pub fn render_dashboard(
    view: Option<&DashboardView>,
    source: &str,
    registry: &mut Handlebars,
) -> Result<String, RenderError> {
    if !registry.has_template("dashboard") {
        registry.register_template_string("dashboard", from_utf8(DASHBOARD_HBS).unwrap())?;
    }

    let now = OffsetDateTime::now_utc();
    let timestamp = now
        .format(&format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        ))
        .expect("static format description");
    let version = option_env!("GIT_HASH").unwrap_or(env!("CARGO_PKG_VERSION"));

    let vars = match view {
        Some(view) => {
            let algorithms: Vec<Value> = view
                .algorithms
                .iter()
                .map(|name| {
                    let selected = view
                        .filters
                        .algorithms
                        .as_ref()
                        .map_or(true, |set| set.contains(name));
                    json!({"name": name, "selected": selected})
                })
                .collect();
            let (nodes_min, nodes_max) = view.nodes_bounds;
            let (nodes_lo, nodes_hi) = view.filters.nodes.unwrap_or(view.nodes_bounds);
            let (density_min, density_max) = view.density_bounds;
            let (density_lo, density_hi) = view.filters.density.unwrap_or(view.density_bounds);
            json!({
                "has_data": true,
                "source": source,
                "custom_css": String::from_utf8_lossy(CUSTOM_CSS),
                "charts": &view.charts,
                "charts_json": serde_json::to_string(&view.charts).expect("chart specs serialize"),
                "algorithms": algorithms,
                "nodes_min": nodes_min,
                "nodes_max": nodes_max,
                "nodes_lo": nodes_lo,
                "nodes_hi": nodes_hi,
                "density_min": format!("{:.3}", density_min),
                "density_max": format!("{:.3}", density_max),
                "density_lo": format!("{:.3}", density_lo),
                "density_hi": format!("{:.3}", density_hi),
                "directed_all": view.filters.directed == DirectedFilter::All,
                "directed_directed": view.filters.directed == DirectedFilter::Directed,
                "directed_undirected": view.filters.directed == DirectedFilter::Undirected,
                "total_rows": view.total_rows.separate_with_commas(),
                "visible_rows": view.visible_rows.separate_with_commas(),
                "version": version,
                "timestamp": timestamp,
            })
        }
        None => json!({
            "has_data": false,
            "source": source,
            "custom_css": String::from_utf8_lossy(CUSTOM_CSS),
            "version": version,
            "timestamp": timestamp,
        }),
    };
    registry.render("dashboard", &vars)
}

fn html_response(body: String) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    tiny_http::Response::from_string(body).with_header(
        tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
            .expect("static header is valid"),
    )
}

fn text_response(status: u16, body: String) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    tiny_http::Response::from_string(body).with_status_code(tiny_http::StatusCode(status))
}

fn redirect_response() -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    tiny_http::Response::from_string("")
        .with_status_code(tiny_http::StatusCode(303))
        .with_header(
            tiny_http::Header::from_bytes(&b"Location"[..], &b"/"[..])
                .expect("static header is valid"),
        )
}

/// Serve the dashboard on 127.0.0.1. Requests are handled one at a time;
/// every filter change is a fresh GET that re-runs the pipeline, an upload
/// replaces the session dataset. A failed render fails that request only.
pub fn serve(paths: &DataPaths, port: u16) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = tiny_http::Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("could not bind {}: {}", addr, e))?;

    let mut registry = Handlebars::new();
    let mut source = paths.master_csv.display().to_string();
    let mut dataset: Option<Vec<BenchmarkRow>> = match load_master(&paths.master_csv) {
        Ok(rows) => Some(rows),
        Err(err) => {
            log::warn!("{:#}; waiting for an uploaded CSV", err);
            None
        }
    };

    log::info!("dashboard listening on http://{}", addr);
    for mut request in server.incoming_requests() {
        let url = request.url().to_string();
        let method = request.method().clone();
        log::debug!("{:?} {}", method, url);

        let response = if method == tiny_http::Method::Post && url == "/upload" {
            let mut body = String::new();
            match request.as_reader().read_to_string(&mut body) {
                Ok(_) => {
                    let mut data = BufReader::new(body.as_bytes());
                    match parse_master(&mut data) {
                        Ok(rows) => {
                            log::info!("uploaded CSV replaces dataset ({} rows)", rows.len());
                            dataset = Some(rows);
                            source = "uploaded CSV".to_string();
                            redirect_response()
                        }
                        Err(err) => {
                            text_response(400, format!("could not parse uploaded CSV: {:#}", err))
                        }
                    }
                }
                Err(err) => text_response(400, format!("could not read upload: {}", err)),
            }
        } else if method == tiny_http::Method::Get && (url == "/" || url.starts_with("/?")) {
            let query = url.splitn(2, '?').nth(1).unwrap_or("");
            let filters = parse_filters(query);
            let rendered = match &dataset {
                Some(rows) => {
                    let view = dashboard_view(rows, &filters, &paths.results_dir);
                    render_dashboard(Some(&view), &source, &mut registry)
                }
                None => render_dashboard(None, &source, &mut registry),
            };
            match rendered {
                Ok(html) => html_response(html),
                Err(err) => {
                    log::error!("render failed: {}", err);
                    text_response(500, format!("render failed: {}", err))
                }
            }
        } else {
            text_response(404, "not found".to_string())
        };

        if let Err(err) = request.respond(response) {
            log::warn!("could not send response: {}", err);
        }
    }
    Ok(())
}
