use packflat_common::{BundlerOptions, NormalizedBundlerOptions};

pub fn normalize_options(raw_options: BundlerOptions) -> NormalizedBundlerOptions {
  NormalizedBundlerOptions {
    standalone: raw_options.standalone.filter(|name| !name.is_empty()),
    standalone_module: raw_options.standalone_module,
    iife: raw_options.iife.unwrap_or(true),
    debug: raw_options.debug.unwrap_or(false),
    basedir: raw_options.basedir,
  }
}

#[test]
fn test_defaults() {
  let options = normalize_options(BundlerOptions::default());
  assert!(options.iife);
  assert!(!options.debug);
  assert!(options.standalone.is_none());

  let options = normalize_options(BundlerOptions {
    standalone: Some(String::new()),
    iife: Some(false),
    ..BundlerOptions::default()
  });
  assert!(!options.iife);
  assert!(options.standalone.is_none());
}
