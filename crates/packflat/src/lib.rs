mod bundler;
mod runtime;
mod stages;
mod types;
mod utils;

pub use crate::{bundler::Bundler, types::bundle_output::BundleOutput};
pub use packflat_common::*;
pub use packflat_error::{BuildError, BuildResult};
pub use packflat_sourcemap::SourceMap;
