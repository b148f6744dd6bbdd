use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct InputArgs {
  /// JSON array or newline-delimited JSON of module records. Reads stdin when omitted.
  pub input: Option<PathBuf>,

  /// Source map file names are made relative to this directory.
  #[clap(long)]
  pub basedir: Option<PathBuf>,
}

#[derive(Args)]
pub struct OutputArgs {
  #[clap(long, short = 'o')]
  pub outfile: Option<PathBuf>,

  /// Wrap the bundle in UMD, exporting the entry module under this global name.
  #[clap(long, short = 's')]
  pub standalone: Option<String>,

  /// Id of the module whose exports the standalone bundle returns.
  #[clap(long, requires = "standalone")]
  pub standalone_module: Option<String>,

  /// Don't wrap the bundle in an IIFE.
  #[clap(long)]
  pub no_iife: bool,

  /// Inline a source map into the bundle.
  #[clap(long, short = 'd')]
  pub debug: bool,
}
