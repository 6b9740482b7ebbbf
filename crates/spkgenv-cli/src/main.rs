use atty::Stream;
use clap::Parser;
use color_eyre::Result;
use serde_json::Value;
use spkgenv_core::{CommandContext, CommandGroup, CommandInfo, CommandStatus};

mod cli;
mod dispatch;
mod style;

use cli::SpkgenvCli;
use dispatch::dispatch_command;
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = SpkgenvCli::parse();
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let ctx = CommandContext::new();

    let (info, outcome) = dispatch_command(&ctx, &cli)?;
    let code = emit_output(&cli, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 if quiet => "warn",
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!(
        "spkgenv={level},spkgenv_cli={level},spkgenv_core={level},spkgenv_domain={level}"
    );
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_output(
    cli: &SpkgenvCli,
    info: CommandInfo,
    outcome: &spkgenv_core::ExecutionOutcome,
) -> Result<i32> {
    let code = outcome.status.exit_code();
    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = spkgenv_core::to_json_response(info, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    if outcome.status != CommandStatus::Ok {
        let message = spkgenv_core::format_status_message(info, &outcome.message);
        eprintln!("{}", style.status(&outcome.status, &message));
        if let Some(hint) = hint_from_details(&outcome.details) {
            eprintln!("{}", style.info(&format!("Hint: {hint}")));
        }
        return Ok(code);
    }

    if cli.quiet {
        return Ok(code);
    }
    if is_passthrough(&outcome.details) {
        if !outcome.message.is_empty() {
            println!("{}", outcome.message);
        }
        return Ok(code);
    }

    let message = spkgenv_core::format_status_message(info, &outcome.message);
    println!("{}", style.status(&outcome.status, &message));
    match info.group {
        CommandGroup::Generate if cli.verbose > 0 => {
            for file in string_list(&outcome.details, "files") {
                println!("{}", style.path(file));
            }
        }
        CommandGroup::Classify => {
            if let Some(table) = render_classify_table(&style, &outcome.details) {
                println!("{table}");
            }
        }
        _ => {}
    }
    for removed in string_list(&outcome.details, "removed_templates") {
        println!("{}", style.info(&format!("removed stale template {removed}")));
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn is_passthrough(details: &Value) -> bool {
    details
        .as_object()
        .and_then(|map| map.get("passthrough"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn string_list<'a>(details: &'a Value, key: &str) -> Vec<&'a str> {
    details
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn render_classify_table(style: &Style, details: &Value) -> Option<String> {
    let packages = details.get("packages")?.as_array()?;
    if packages.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for pkg in packages {
        let obj = pkg.as_object()?;
        rows.push(PackageRow {
            name: obj.get("name")?.as_str()?.to_string(),
            package_type: obj
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_string(),
            sagelib_only: if obj.get("sagelib_only")?.as_bool()? {
                "yes"
            } else {
                "no"
            }
            .to_string(),
            group: obj.get("group")?.as_str()?.to_string(),
        });
    }

    Some(format_package_table(style, &rows))
}

struct PackageRow {
    name: String,
    package_type: String,
    sagelib_only: String,
    group: String,
}

fn format_package_table(style: &Style, rows: &[PackageRow]) -> String {
    let headers = ["Package", "Type", "Sagelib-only", "Group"];
    let mut widths = headers.map(str::len);

    for row in rows {
        widths[0] = widths[0].max(row.name.len());
        widths[1] = widths[1].max(row.package_type.len());
        widths[2] = widths[2].max(row.sagelib_only.len());
        widths[3] = widths[3].max(row.group.len());
    }

    let format_row = |cells: [&str; 4]| {
        format!(
            "{:<width0$}  {:<width1$}  {:<width2$}  {:<width3$}",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            width0 = widths[0],
            width1 = widths[1],
            width2 = widths[2],
            width3 = widths[3],
        )
        .trim_end()
        .to_string()
    };

    let mut lines = Vec::new();
    lines.push(style.table_header(&format_row(headers)));
    lines.push(format!(
        "{:-<width0$}  {:-<width1$}  {:-<width2$}  {:-<width3$}",
        "",
        "",
        "",
        "",
        width0 = widths[0],
        width1 = widths[1],
        width2 = widths[2],
        width3 = widths[3],
    ));
    for row in rows {
        lines.push(format_row([
            row.name.as_str(),
            row.package_type.as_str(),
            row.sagelib_only.as_str(),
            row.group.as_str(),
        ]));
    }

    lines.join("\n")
}
