//! panel-runner: headless runner for the BikeWatch derived-metrics pipeline.
//!
//! Usage:
//!   panel-runner --data-dir ./data --threshold 0.5 --top 10
//!   panel-runner --data-dir ./data --month 2024-06 --compare 2024-01 --json
//!   panel-runner --data-dir ./data --ipc-mode

use anyhow::{Context, Result};
use bikewatch_core::{
    alerts::summarize,
    loader::{load_panel, PanelMeta},
    panel::Panel,
    ranking::{Metric, MetricRow, RankFilters, DEFAULT_TOP_N},
    view::{recompute, DashboardView, RankedRows, ViewRequest},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetMeta,
    Recompute {
        #[serde(flatten)]
        request: ViewRequest,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let (panel, meta) = load_panel(Path::new(data_dir))
        .with_context(|| format!("loading panel from {data_dir}"))?;

    if ipc_mode {
        return run_ipc_loop(&panel, &meta);
    }

    let threshold = parse_arg(&args, "--threshold", meta.thresholds.spike_threshold);
    let month = args
        .windows(2)
        .find(|w| w[0] == "--month")
        .map(|w| w[1].clone())
        .or_else(|| panel.latest_month().cloned())
        .context("panel has no months; nothing to display")?;
    let compare_with = args
        .windows(2)
        .find(|w| w[0] == "--compare")
        .map(|w| w[1].clone());
    let default_metric = if compare_with.is_some() {
        Metric::DeltaRiskIndex
    } else {
        Metric::RiskIndex
    };
    let metric = parse_arg(&args, "--metric", default_metric);
    let top_n = parse_arg(&args, "--top", DEFAULT_TOP_N);
    let filters = RankFilters {
        alerts_only: args.iter().any(|a| a == "--alerts-only"),
        stable_only: args.iter().any(|a| a == "--stable-only"),
    };

    let request = ViewRequest {
        threshold,
        month,
        compare_with,
        metric,
        filters,
        top_n,
    };

    println!("BikeWatch — panel-runner");
    println!("  data_dir:  {data_dir}");
    println!("  threshold: {threshold:.2}");
    println!("  month:     {}", request.month);
    if let Some(a) = &request.compare_with {
        println!("  compare:   {a} -> {}", request.month);
    }
    println!("  metric:    {}", metric.name());
    println!("  top:       {top_n}");
    println!();

    let view = recompute(&panel, &request);

    if let Some(path) = args.windows(2).find(|w| w[0] == "--out").map(|w| &w[1]) {
        let body = serde_json::to_string_pretty(&view)?;
        std::fs::write(path, body).with_context(|| format!("writing {path}"))?;
        println!("Wrote {path}");
    }
    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_summary(&view, metric);
    Ok(())
}

fn run_ipc_loop(panel: &Panel, meta: &PanelMeta) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetMeta => {
                writeln!(stdout, "{}", serde_json::to_string(meta)?)?;
            }
            IpcCommand::Recompute { request } => {
                let view = recompute(panel, &request);
                writeln!(stdout, "{}", serde_json::to_string(&view)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(view: &DashboardView, metric: Metric) {
    println!("=== ALERT SUMMARY ===");
    println!("  {}", summarize(&view.classified));
    println!();

    println!("=== TOP AREAS by {} ===", metric.name());
    match &view.ranked {
        RankedRows::Current(rows) => print_table(rows, metric),
        RankedRows::Comparison(rows) => print_table(rows, metric),
    }
}

fn print_table<T: MetricRow + HasName>(rows: &[T], metric: Metric) {
    if rows.is_empty() {
        println!("  (no rows after filtering)");
        return;
    }
    for (i, row) in rows.iter().enumerate() {
        let value = row.metric(metric).unwrap_or(f64::NAN);
        println!(
            "  {:>2}. {:<24} {:>9.4}  [{}]",
            i + 1,
            row.display_name(),
            value,
            row.alert_level().as_str()
        );
    }
}

trait HasName {
    fn display_name(&self) -> &str;
}

impl HasName for bikewatch_core::model::FeatureRow {
    fn display_name(&self) -> &str {
        &self.area_name
    }
}

impl HasName for bikewatch_core::model::DeltaRow {
    fn display_name(&self) -> &str {
        &self.area_name
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
