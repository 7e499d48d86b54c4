use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output::{self, FilingReport, OutputFormat};
use crate::runner::{self, Failure, Runner};
use crate::utils::{format_kv_line, Console};

fn print_banner() {
    const BANNER: &str = r#"
    __        __    __                  __
   / /_______/ /_  / /__________ ______/ /__
  / //_/ ___/ __ \/ __/ ___/ __ `/ ___/ //_/
 / ,< / /__/ /_/ / /_/ /  / /_/ / /__/ ,<
/_/|_|\___/_.___/\__/_/   \__,_/\___/_/|_|
       STAR-market filing disclosure tracker
"#;
    eprint!("{}", BANNER);
    eprintln!();
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let about = cmd
        .get_long_about()
        .or_else(|| cmd.get_about())
        .map(|a| a.to_string())
        .unwrap_or_default();
    let mut out = format!("{about}\n\nUsage: kcbtrack [OPTIONS]\n\n");

    let args: Vec<&clap::Arg> = cmd.get_arguments().filter(|a| !a.is_hide_set()).collect();
    let headings: Vec<&str> = args
        .iter()
        .map(|a| a.get_help_heading().unwrap_or("Options"))
        .unique()
        .collect();
    for heading in headings {
        out.push_str(&format!("{heading}:\n"));
        for arg in args.iter().filter(|a| a.get_help_heading().unwrap_or("Options") == heading) {
            // Long names are terse; the readable aliases go first.
            let flags = arg
                .get_short()
                .map(|s| format!("-{s}"))
                .into_iter()
                .chain(arg.get_visible_aliases().unwrap_or_default().into_iter().map(|a| format!("--{a}")))
                .chain(arg.get_long().map(|l| format!("--{l}")))
                .join(", ");
            let value = match arg.get_value_names().and_then(|names| names.first()) {
                Some(name) if arg.get_action().takes_values() => format!(" <{name}>"),
                _ => String::new(),
            };
            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            out.push_str(&format!("  {flags}{value}\n          {}\n\n", help.trim()));
        }
    }
    out
}

fn format_opt_value(v: Option<&str>) -> &str {
    match v {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

#[derive(Debug)]
struct RunConfig {
    options: runner::Options,
    workers: usize,
    verbose: u8,
    no_color: bool,
    output: Option<String>,
    output_dir: Option<String>,
    output_format: OutputFormat,
    failed_log: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let inputs: Vec<String> = if args.input.is_empty() {
        cfg.inputs.unwrap_or_default()
    } else {
        args.input
    }
    .into_iter()
    .map(|i| config::expand_tilde_string(i.trim()))
    .filter(|i| !i.is_empty())
    .collect();
    let input_dir = non_empty(args.input_dir.or(cfg.input_dir));
    if inputs.is_empty() && input_dir.is_none() {
        return Err("at least one input must be specified (--input or --input-dir)".to_string());
    }
    let overview = non_empty(args.overview.or(cfg.overview));
    let announce = non_empty(args.announce.or(cfg.announce));

    let static_base = non_empty(args.static_base.or(cfg.static_base))
        .unwrap_or_else(|| crate::disclosure::DEFAULT_STATIC_BASE.to_string());
    let concurrency = args.concurrency.or(cfg.concurrency).unwrap_or(4);
    if concurrency == 0 {
        return Err("invalid concurrency, expected positive integer".to_string());
    }
    let workers = args.workers.or(cfg.workers).unwrap_or(2);
    if workers == 0 {
        return Err("invalid workers, expected positive integer".to_string());
    }

    let output = non_empty(args.output.or(cfg.output)).map(|p| config::expand_tilde_string(&p));
    let output_dir =
        non_empty(args.output_dir.or(cfg.output_dir)).map(|p| config::expand_tilde_string(&p));
    if output.is_some() && output_dir.is_some() {
        return Err("output and output_dir are mutually exclusive".to_string());
    }
    let output_format = match non_empty(args.output_format.or(cfg.output_format)) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json, or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let failed_log =
        non_empty(args.failed_log.or(cfg.failed_log)).map(|p| config::expand_tilde_string(&p));

    Ok(RunConfig {
        options: runner::Options {
            inputs,
            input_dir,
            overview,
            announce,
            static_base,
            concurrency,
        },
        workers,
        verbose: args.verbose,
        no_color,
        output,
        output_dir,
        output_format,
        failed_log,
    })
}

fn render_reports(format: OutputFormat, reports: &[FilingReport]) -> Result<Vec<u8>, String> {
    match format {
        OutputFormat::Text => Ok(output::render_text(reports)),
        OutputFormat::Json => Ok(output::render_json(reports)),
        OutputFormat::Html => match reports {
            [report] => Ok(output::render_html(report)),
            _ => Err(format!(
                "html output holds one filing, got {}; use --output-dir for several inputs",
                reports.len()
            )),
        },
    }
}

/// One file name per source, in order. The source's own extension is kept so
/// `942.json` and `942.jsonp` do not collide; sources that still share a
/// name (same file in two directories) get `-2`, `-3` and so on.
fn report_file_names<'a>(
    sources: impl IntoIterator<Item = &'a str>,
    format: OutputFormat,
) -> Vec<String> {
    let ext = format.extension();
    let mut taken: HashSet<String> = HashSet::new();
    sources
        .into_iter()
        .map(|source| {
            let base = Path::new(source)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("report");
            let mut name = format!("{base}.{ext}");
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}-{n}.{ext}");
                n += 1;
            }
            name
        })
        .collect()
}

async fn write_file(path: &str, contents: &[u8]) -> Result<(), String> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file {path}: {e}"))?;
    outfile
        .write_all(contents)
        .await
        .map_err(|e| format!("failed to write output file {path}: {e}"))
}

async fn write_failed_log(path: &str, failures: &[Failure]) -> Result<(), String> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open failed log {path}: {e}"))?;
    let mut lines = String::new();
    for f in failures {
        lines.push_str(&format!("{}: {}\n", f.path, f.error));
    }
    file.write_all(lines.as_bytes())
        .await
        .map_err(|e| format!("failed to write failed log {path}: {e}"))
}

async fn write_outputs(run: &RunConfig, reports: &[FilingReport], console: &Console) -> Result<(), String> {
    if reports.is_empty() {
        return Ok(());
    }

    if let Some(dir) = run.output_dir.as_deref() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| format!("failed to create output directory {dir}: {e}"))?;
        let names = report_file_names(reports.iter().map(|r| r.source.as_str()), run.output_format);
        for (report, name) in reports.iter().zip(names) {
            let rendered = render_reports(run.output_format, std::slice::from_ref(report))?;
            let path = Path::new(dir).join(name);
            let path = path.to_string_lossy().to_string();
            write_file(&path, &rendered).await?;
            console.debug(format!("wrote {path}"));
        }
        return Ok(());
    }

    let rendered = render_reports(run.output_format, reports)?;
    match run.output.as_deref() {
        Some(path) => {
            write_file(path, &rendered).await?;
            console.debug(format!("wrote {path}"));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&rendered)
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("failed to write report to stdout: {e}"))?;
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let inputs = if run.options.inputs.is_empty() {
        "-".to_string()
    } else {
        run.options.inputs.join(", ")
    };
    eprintln!("{}", format_kv_line("Inputs", &inputs));
    eprintln!("{}", format_kv_line("Input dir", format_opt_value(run.options.input_dir.as_deref())));
    eprintln!("{}", format_kv_line("Overview", format_opt_value(run.options.overview.as_deref())));
    eprintln!("{}", format_kv_line("Announce", format_opt_value(run.options.announce.as_deref())));
    eprintln!("{}", format_kv_line("Static base", &run.options.static_base));
    eprintln!("{}", format_kv_line("Concurrency", &run.options.concurrency.to_string()));
    eprintln!("{}", format_kv_line("Workers", &run.workers.to_string()));
    eprintln!("{}", format_kv_line("Format", run.output_format.extension()));
    let destination = run
        .output_dir
        .as_deref()
        .or(run.output.as_deref())
        .unwrap_or("stdout");
    eprintln!("{}", format_kv_line("Output", destination));
    eprintln!();

    let runner = Runner::new(run.options.clone()).map_err(|e| format!("invalid options: {e}"))?;

    let pb = ProgressBar::new(0);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(200));
    pb.set_style(
        ProgressStyle::with_template(
            ":: Progress: [{pos}/{len}] :: {per_sec} :: Duration: [{elapsed_precise}] :: {msg}",
        )
        .map_err(|e| format!("failed to build progress bar style: {e}"))?
        .progress_chars(r#"#>-"#),
    );
    let console = Console::new(run.verbose).with_progress(pb.clone());

    let batch = runner
        .run_with_progress(pb.clone())
        .await
        .map_err(|e| format!("run failed: {e}"))?;

    for report in batch.reports.iter() {
        console.debug(format!(
            "{} :: {} :: {} documents",
            report.source,
            report.status,
            report.view.placements.len()
        ));
    }
    for failure in batch.failures.iter() {
        console.warn(format!("{}: {}", failure.path, failure.error));
    }
    pb.finish_and_clear();
    let console = Console::new(run.verbose);

    write_outputs(&run, &batch.reports, &console).await?;

    if let Some(path) = run.failed_log.as_deref() {
        if !batch.failures.is_empty() {
            write_failed_log(path, &batch.failures).await?;
            console.info(format!("{} failed inputs logged to {path}", batch.failures.len()));
        }
    }

    eprintln!();
    eprintln!(
        ":: Completed :: {} rendered, {} failed in {}ms ::",
        batch.reports.len(),
        batch.failures.len(),
        batch.elapsed.as_millis()
    );

    if batch.reports.is_empty() && !batch.failures.is_empty() {
        return Err(format!("all {} inputs failed", batch.failures.len()));
    }
    Ok(())
}

fn init_config(path: Option<&str>) -> Result<(), String> {
    let path = match path {
        Some(p) => config::expand_tilde(p),
        None => config::default_config_path()
            .ok_or_else(|| "cannot locate home directory for default config".to_string())?,
    };
    if config::ensure_default_config_file(&path)? {
        eprintln!("{}", format_kv_line("Config", &format!("wrote {}", path.display())));
    } else {
        eprintln!("{}", format_kv_line("Config", &format!("{} already exists", path.display())));
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        return init_config(args.config.as_deref());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
