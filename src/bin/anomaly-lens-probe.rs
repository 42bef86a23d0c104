//! Headless check of the anomaly service: runs one pipeline and prints the table.

use anomaly_lens::config::{self, ViewerConfig};
use anomaly_lens::egui_app::controller::AnomalyController;
use anomaly_lens::egui_app::state::PipelinePhase;
use anomaly_lens::egui_app::view_model::{
    CellShade, MISSING_PLACEHOLDER, ViewModel, VisibleColumn, display_value, value_text,
};
use anomaly_lens::logging::{self, ConsoleStream};
use std::time::Duration;

const LOADING_CELL: &str = "...";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init(ConsoleStream::Stderr) {
        eprintln!("Logging disabled: {err}");
    }
    let base = config::load_or_default().map_err(|err| err.to_string())?;
    let config = options.apply(base).normalized();
    // Three sequential fetches, each bounded by the request timeout.
    let settle_timeout = config.request_timeout() * 3 + Duration::from_secs(1);

    let mut controller =
        AnomalyController::from_config(config.clone()).map_err(|err| err.to_string())?;
    controller.start();
    if !controller.wait_until_settled(settle_timeout) {
        return Err(format!(
            "Timed out after {settle_timeout:?} while {}",
            controller.pipeline().phase.label()
        ));
    }
    let pipeline = controller.pipeline();
    if pipeline.phase == PipelinePhase::Failed {
        return Err(pipeline
            .failure
            .clone()
            .unwrap_or_else(|| "Pipeline failed".to_string()));
    }

    print_table(controller.view(), &config);
    println!();
    println!("{}", controller.status().text);

    if let Some(index) = options.detail {
        controller
            .select_row(index)
            .map_err(|err| format!("Cannot show record {index}: {err}"))?;
        println!();
        print_detail(controller.view());
    }
    Ok(())
}

fn print_table(view: &ViewModel, config: &ViewerConfig) {
    let columns = view.visible_columns(config.visible_columns);
    let header: Vec<String> = columns
        .iter()
        .map(|column| match column {
            VisibleColumn::Column(descriptor) => descriptor.display_name.clone(),
            VisibleColumn::More { .. } => "...".to_string(),
        })
        .collect();
    println!("{}", header.join("\t"));
    for record in view.visible_rows(config.visible_rows) {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| match column {
                VisibleColumn::Column(descriptor) => {
                    match view.cell_shade(record.id().as_str(), &descriptor.key) {
                        CellShade::Loading => LOADING_CELL.to_string(),
                        _ => display_value(record, &descriptor.key, config.max_cell_length),
                    }
                }
                VisibleColumn::More { .. } => String::new(),
            })
            .collect();
        println!("{}", cells.join("\t"));
    }
}

fn print_detail(view: &ViewModel) {
    let Some(fields) = view.current_detail() else {
        return;
    };
    for field in fields {
        let value = match (&field.value, field.shade) {
            (_, CellShade::Loading) => LOADING_CELL.to_string(),
            (Some(value), _) => value_text(value),
            (None, _) => MISSING_PLACEHOLDER.to_string(),
        };
        println!("{}: {value}", field.display_name);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    base_url: Option<String>,
    rows: Option<usize>,
    columns: Option<usize>,
    max_cell: Option<usize>,
    timeout_secs: Option<u64>,
    detail: Option<usize>,
}

impl CliOptions {
    fn apply(&self, mut config: ViewerConfig) -> ViewerConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(rows) = self.rows {
            config.num_data_rows = rows;
        }
        if let Some(columns) = self.columns {
            config.visible_columns = columns;
        }
        if let Some(max_cell) = self.max_cell {
            config.max_cell_length = max_cell;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.request_timeout_secs = timeout_secs;
        }
        config
    }
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--base-url" => {
                idx += 1;
                options.base_url = Some(value_for(&args, idx, flag)?.to_string());
            }
            "--rows" => {
                idx += 1;
                options.rows = Some(parse_number(value_for(&args, idx, flag)?, flag)?);
            }
            "--columns" => {
                idx += 1;
                options.columns = Some(parse_number(value_for(&args, idx, flag)?, flag)?);
            }
            "--max-cell" => {
                idx += 1;
                options.max_cell = Some(parse_number(value_for(&args, idx, flag)?, flag)?);
            }
            "--timeout-secs" => {
                idx += 1;
                options.timeout_secs = Some(parse_number(value_for(&args, idx, flag)?, flag)?);
            }
            "--detail" => {
                idx += 1;
                options.detail = Some(parse_number(value_for(&args, idx, flag)?, flag)?);
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(Some(options))
}

fn value_for<'a>(args: &'a [String], idx: usize, flag: &str) -> Result<&'a str, String> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got {value:?}"))
}

fn help_text() -> String {
    [
        "anomaly-lens-probe",
        "",
        "Usage:",
        "  anomaly-lens-probe [--base-url <url>] [--rows <n>] [--columns <n>]",
        "                     [--max-cell <n>] [--timeout-secs <n>] [--detail <index>]",
        "",
        "Loads columns, rows and predictions once and prints the table.",
        "Unset options come from the viewer config file.",
    ]
    .join("\n")
}
