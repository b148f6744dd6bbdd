use std::{borrow::Cow, ffi::OsStr, path::Path};

pub trait PathExt {
  /// The name a module is best known by: the file stem, or the directory name for `index.js`.
  ///
  /// It doesn't ensure the name is a valid identifier in JS.
  fn representative_file_name(&self) -> Cow<str>;

  /// Forward-slash path of `self` relative to `base`, or `self` unchanged when `base` is not a prefix.
  fn relative_slash(&self, base: Option<&Path>) -> String;
}

impl PathExt for Path {
  fn representative_file_name(&self) -> Cow<str> {
    let is_index = self.file_name().is_some_and(|name| name == "index.js");
    let name = if is_index {
      self.parent().and_then(Path::file_name).map(OsStr::to_string_lossy)
    } else {
      self.file_stem().map(OsStr::to_string_lossy)
    };

    match name {
      Some(name) if !name.is_empty() => name,
      _ => Cow::Borrowed("module"),
    }
  }

  fn relative_slash(&self, base: Option<&Path>) -> String {
    let relative = base.and_then(|base| self.strip_prefix(base).ok()).unwrap_or(self);
    let lossy = relative.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
      lossy.into_owned()
    } else {
      lossy.replace(std::path::MAIN_SEPARATOR, "/")
    }
  }
}

#[test]
fn test_representative_file_name() {
  let cwd = Path::new(".").join("project");
  let path = cwd.join("src").join("vue.js");
  assert_eq!(path.representative_file_name(), "vue");

  let path = cwd.join("vue").join("index.js");
  assert_eq!(path.representative_file_name(), "vue");

  let path = cwd.join("vue").join("index.ts");
  assert_eq!(path.representative_file_name(), "index");

  assert_eq!(Path::new("index.js").representative_file_name(), "module");
  assert_eq!(Path::new("").representative_file_name(), "module");
}

#[test]
fn test_relative_slash() {
  let base = Path::new("/project");
  assert_eq!(Path::new("/project/src/a.js").relative_slash(Some(base)), "src/a.js");
  assert_eq!(Path::new("/other/a.js").relative_slash(Some(base)), "/other/a.js");
  assert_eq!(Path::new("src/a.js").relative_slash(None), "src/a.js");
}
