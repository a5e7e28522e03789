use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use olecf_vba::{collect_path, CollectError, CollectionResult, DebugSink};

#[derive(Debug, Parser)]
#[command(name = "olecf-vba")]
#[command(about = "Extracts VBA from an OLE Compound File.")]
struct Cli {
    /// Enable debug output.
    #[arg(short, long)]
    debug: bool,

    /// Emit the collected records as a JSON report instead of text.
    #[arg(long)]
    json: bool,

    /// Path of the OLE Compound File.
    #[arg(value_name = "PATH")]
    source: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("olecf_vba", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    match run(&cli) {
        Ok(code) => code,
        // A closed stdout (e.g. piped into `head`) is not a failure.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("failed to write output: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> io::Result<ExitCode> {
    let mut stdout = io::stdout().lock();

    let Some(source) = cli.source.as_ref() else {
        writeln!(stdout, "Source value is missing.\n")?;
        write!(stdout, "{}", Cli::command().render_help())?;
        writeln!(stdout)?;
        return Ok(ExitCode::FAILURE);
    };

    let mut debug_output = String::new();
    let outcome = {
        let mut sink = if cli.debug {
            DebugSink::new(&mut debug_output)
        } else {
            DebugSink::quiet()
        };
        collect_path(source, &mut sink)
    };

    // Keep stdout parseable in JSON mode.
    if cli.json {
        eprint!("{debug_output}");
    } else {
        write!(stdout, "{debug_output}")?;
    }

    match outcome {
        Ok(result) => {
            report(&mut stdout, &result, cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(CollectError::VbaProject { source: err, partial }) => {
            report(&mut stdout, &partial, cli.json)?;
            eprintln!("{}: {err}", source.display());
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            eprintln!("{}: {err}", source.display());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report(out: &mut impl Write, result: &CollectionResult, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, result)?;
        writeln!(out)?;
        return Ok(());
    }

    if let Some(base_class) = &result.base_class {
        writeln!(out, "Base class: {base_class}")?;
    }
    if let Some(f_stream) = &result.f_stream {
        for entry in &f_stream.entries {
            let name = entry
                .variable_name_text
                .clone()
                .unwrap_or_else(|| String::from_utf8_lossy(&entry.variable_name).into_owned());
            writeln!(
                out,
                "Variable: {name} (o stream entry {})",
                entry.o_stream_entry_index
            )?;
        }
    }
    if let Some(o_stream) = &result.o_stream {
        for (index, entry) in o_stream.entries.iter().enumerate() {
            writeln!(
                out,
                "Control {index}: {:?} font: {}",
                entry.part1.data, entry.part2.font_name
            )?;
        }
    }
    if let Some(vba_project) = &result.vba_project {
        for (index, string) in vba_project.strings.iter().enumerate() {
            writeln!(out, "String {index}: {}", string.text)?;
        }
    }

    if !result.stream_found {
        writeln!(out, "No VBA stream found.")?;
    }
    Ok(())
}
