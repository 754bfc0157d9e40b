//! Command execution.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use panel_compiler::{CompileReport, Compiler, PluginRegistry, Reparser, Target};
use panel_core::Layout;

use crate::{CliCommand, CliConfig};

/// Run the configured command.
///
/// Documents go to the command's output file, or to `out` when none is set.
///
/// # Errors
///
/// Returns an error if input cannot be read or parsed, output cannot be
/// written, or `--strict` is set and a widget was skipped.
pub fn run(config: &CliConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    let registry = Arc::new(PluginRegistry::with_builtin());
    match &config.command {
        CliCommand::Compile {
            input,
            target,
            all,
            output,
            report,
            strict,
        } => {
            let layout = load_layout(input)?;
            let compiler = Compiler::new(registry, config.options.clone());
            let reports = if *all {
                compiler.compile_all(&layout)
            } else {
                vec![compiler.compile(&layout, *target)]
            };

            let mut skipped = 0;
            for compiled in &reports {
                for diagnostic in &compiled.diagnostics {
                    tracing::warn!(target_name = %compiled.target, "{diagnostic}");
                }
                skipped += compiled.diagnostics.len();
            }

            if *all {
                write_all(&reports, output.as_deref(), *report, out)?;
            } else {
                for compiled in &reports {
                    let text = render(compiled, *report)?;
                    write_text(output.as_deref(), &text, out)?;
                }
            }

            if *strict && skipped > 0 {
                bail!("{skipped} problem(s) reported while compiling");
            }
            Ok(())
        }
        CliCommand::Reparse { input, output } => {
            let text = read_input(input)?;
            let result = Reparser::new(registry).reparse(&text);
            for warning in &result.warnings {
                tracing::warn!("{warning}");
            }
            let json = result.layout.to_json().context("Failed to serialize layout")?;
            write_text(output.as_deref(), &json, out)
        }
        CliCommand::Plugins { json } => {
            if *json {
                let text = serde_json::to_string_pretty(registry.as_ref())?;
                writeln!(out, "{text}")?;
            } else {
                for descriptor in registry.descriptors() {
                    let targets: Vec<&str> = descriptor
                        .supported_modes
                        .iter()
                        .map(|t| t.as_str())
                        .collect();
                    writeln!(
                        out,
                        "{:<14} {:<12} {:<10} {}",
                        descriptor.id,
                        descriptor.name,
                        descriptor.category,
                        targets.join(",")
                    )?;
                }
            }
            Ok(())
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_layout(path: &Path) -> anyhow::Result<Layout> {
    let text = read_input(path)?;
    Layout::from_json(&text).with_context(|| format!("Invalid layout in {}", path.display()))
}

fn render(report: &CompileReport, full_report: bool) -> anyhow::Result<String> {
    if full_report {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(report.output.to_text()?)
    }
}

fn extension(target: Target, full_report: bool) -> &'static str {
    if full_report {
        return "json";
    }
    match target {
        Target::Procedural | Target::RetainedGui => "yaml",
        Target::DeclarativeOepl | Target::DeclarativeOpenDisplay => "json",
    }
}

fn write_text(path: Option<&Path>, text: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None => {
            out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// One file per target in `dir`, or a `--- <target>` separated stream.
fn write_all(
    reports: &[CompileReport],
    dir: Option<&Path>,
    full_report: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    if let Some(dir) = dir {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    for compiled in reports {
        let text = render(compiled, full_report)?;
        match dir {
            Some(dir) => {
                let file: PathBuf = dir.join(format!(
                    "layout.{}.{}",
                    compiled.target,
                    extension(compiled.target, full_report)
                ));
                write_text(Some(&file), &text, out)?;
            }
            None => {
                writeln!(out, "--- {}", compiled.target)?;
                write_text(None, &text, out)?;
            }
        }
    }
    Ok(())
}
