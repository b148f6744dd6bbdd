mod args;
mod read_records;

use std::{
  fs,
  io::{self, Write},
  process::ExitCode,
  time::Instant,
};

use ansi_term::Colour;
use anyhow::Context;
use args::{InputArgs, OutputArgs};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use packflat::{BundleOutput, Bundler, BundlerOptions, ModuleId};

use crate::read_records::read_records;

#[derive(Parser)]
#[command(version, about = "Flatten a CommonJS module graph into a single scope", long_about = None)]
struct Commands {
  #[clap(flatten)]
  input: InputArgs,

  #[clap(flatten)]
  output: OutputArgs,
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env("PACKFLAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn parse_module_id(id: String) -> ModuleId {
  match id.parse::<u64>() {
    Ok(id) => ModuleId::Int(id),
    Err(_) => ModuleId::Str(id.into()),
  }
}

fn write_output(args: &OutputArgs, output: &BundleOutput) -> anyhow::Result<()> {
  match &args.outfile {
    Some(path) => fs::write(path, &output.code).with_context(|| format!("Failed to write {}", path.display())),
    None => io::stdout().lock().write_all(output.code.as_bytes()).context("Failed to write stdout"),
  }
}

fn main() -> ExitCode {
  init_tracing();
  let args = Commands::parse();
  let InputArgs { input, basedir } = args.input;

  let bundler = Bundler::new(BundlerOptions {
    standalone: args.output.standalone.clone(),
    standalone_module: args.output.standalone_module.clone().map(parse_module_id),
    iife: Some(!args.output.no_iife),
    debug: Some(args.output.debug),
    basedir,
  });

  let start = Instant::now();
  let result = read_records(input.as_deref())
    .inspect(|records| tracing::debug!(records = records.len(), "read module records"))
    .map_err(Into::into)
    .and_then(|records| bundler.bundle(records));

  match result {
    Ok(output) => {
      for warning in &output.warnings {
        eprintln!("{} {}", Colour::Yellow.paint("Warning:"), warning);
      }
      if let Err(error) = write_output(&args.output, &output) {
        eprintln!("{} {:#}", Colour::Red.paint("Error:"), error);
        return ExitCode::FAILURE;
      }
      if args.output.outfile.is_some() {
        let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
        eprintln!("{} Finished in {}", Colour::Green.paint("✔"), Colour::White.bold().paint(elapsed));
      }
      ExitCode::SUCCESS
    }
    Err(errors) => {
      for error in &*errors {
        eprintln!("{} {:#}", Colour::Red.paint("Error:"), error);
      }
      ExitCode::FAILURE
    }
  }
}
