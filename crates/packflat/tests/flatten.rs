use packflat::{BundleOutput, Bundler, BundlerOptions, ModuleRecord};
use serde_json::json;

fn module(value: serde_json::Value) -> ModuleRecord {
  serde_json::from_value(value).unwrap()
}

fn bundle(options: BundlerOptions, records: Vec<ModuleRecord>) -> BundleOutput {
  Bundler::new(options).bundle(records).unwrap()
}

fn bundle_code(records: Vec<ModuleRecord>) -> String {
  bundle(BundlerOptions::default(), records).code
}

fn entry_and_a(entry_source: &str, a_source: &str) -> Vec<ModuleRecord> {
  vec![
    module(json!({
      "id": 1, "file": "/src/entry.js", "entry": true,
      "source": entry_source, "deps": { "./a": 2 }
    })),
    module(json!({ "id": 2, "file": "/src/a.js", "source": a_source })),
  ]
}

#[test]
fn inlines_a_simple_export() {
  let output = bundle(
    BundlerOptions::default(),
    entry_and_a("console.log(require('./a'));", "module.exports = 'A';"),
  );
  assert_eq!(
    output.code,
    "(function(){\nvar _$a_2 = 'A';\nvar _$entry_1 = {};\nconsole.log(_$a_2);\n}());\n"
  );
  assert!(output.map.is_none());
  assert!(output.warnings.is_empty());
}

#[test]
fn removes_require_declarators() {
  let code = bundle_code(entry_and_a(
    "var a = require('./a'), b = 1;\nvar c = require('./a');\nexports.x = a + b + c;",
    "exports.a = 1;",
  ));
  assert!(code.contains("var _$a_2 = {};\n_$a_2.a = 1;\n"));
  assert!(code.contains("var _$entry_1 = {};\nvar b = 1;\n/* removed: var c = require('./a'); */;"));
  assert!(code.contains("_$entry_1.x = _$a_2 + b + _$a_2;"));
}

#[test]
fn escapes_comment_terminators_in_removed_declarations() {
  let code = bundle_code(entry_and_a("var a = require('./a' /* a */);\na();", "module.exports = f; function f() {}"));
  assert!(code.contains("/* removed: var a = require('./a' /* a *\\/); */;\n_$f_2();"));
}

#[test]
fn renames_colliding_top_level_bindings() {
  let code = bundle_code(entry_and_a(
    "var x = require('./a'); var helper = 1; console.log(helper, x);",
    "var helper = 2; module.exports = helper;",
  ));
  assert!(code.contains("var helper = 2; var _$helper_2 = helper;"));
  assert!(code.contains("var __helper_1 = 1; console.log(__helper_1, _$helper_2);"));
}

#[test]
fn expands_shorthand_properties() {
  let code = bundle_code(entry_and_a("var a = require('./a');\nmodule.exports = { a };", "exports.x = 1;"));
  assert!(code.contains("var _$entry_1 = { a: _$a_2 };"));
}

#[test]
fn keeps_a_module_object_when_module_escapes() {
  let code = bundle_code(entry_and_a(
    "require('./a');",
    "var m = module; m.exports = 5; if (module.parent) {} exports.y = typeof module;",
  ));
  assert!(code.contains(
    "var _$a_2 = { exports: {} };\nvar m = _$a_2; m.exports = 5; if (({})) {} _$a_2.exports.y = \"object\";\n_$a_2 = _$a_2.exports;"
  ));
}

#[test]
fn module_parent_is_null_in_entry_modules() {
  let output = bundle(
    BundlerOptions { iife: Some(false), ..BundlerOptions::default() },
    vec![module(json!({
      "id": 1, "file": "/src/entry.js", "entry": true, "source": "exports.isMain = !module.parent;"
    }))],
  );
  assert_eq!(
    output.code,
    "var _$entry_1 = { exports: {} };\n_$entry_1.exports.isMain = !null;\n_$entry_1 = _$entry_1.exports;\n"
  );
}

#[test]
fn inlines_typeof_require() {
  let code = bundle_code(vec![module(json!({
    "id": 1, "entry": true, "source": "if (typeof require === 'function') { x(); }"
  }))]);
  assert!(code.contains("if (\"function\" === 'function') { x(); }"));
}

#[test]
fn cyclic_modules_become_factories() {
  let output = bundle(
    BundlerOptions::default(),
    vec![
      module(json!({
        "id": 1, "file": "/src/x.js", "entry": true,
        "source": "exports.y = require('./y');", "deps": { "./y": 2 }
      })),
      module(json!({
        "id": 2, "file": "/src/y.js",
        "source": "exports.x = require('./x');", "deps": { "./x": 1 }
      })),
    ],
  );
  assert_eq!(output.warnings.len(), 1);
  assert_eq!(output.warnings[0].to_string(), "Circular dependency: 1 -> 2 -> 1.");

  let code = output.code;
  assert!(code.starts_with(
    "(function(){\nvar createModuleFactory = function createModuleFactory(factory) {"
  ));
  let y = code
    .find("var _$y_2 = createModuleFactory(function (module, exports) {\nexports.x = _$x_1({});\n});")
    .unwrap();
  let x = code
    .find("var _$x_1 = createModuleFactory(function (module, exports) {\nexports.y = _$y_2({});\n});")
    .unwrap();
  assert!(y < x);
  assert!(code.ends_with("\n_$x_1();\n}());\n"));
}

#[test]
fn deferred_requires_evaluate_on_demand() {
  let code = bundle_code(entry_and_a(
    "module.exports = function () { return require('./a'); };",
    "exports.value = 1;",
  ));
  assert!(code.contains("var _$a_2 = createModuleFactory(function (module, exports) {\nexports.value = 1;\n});"));
  assert!(code.contains("var _$entry_1 = function () { return _$a_2({}); };"));
  assert!(!code.contains("_$entry_1();"));
}

#[test]
fn on_demand_modules_keep_their_dependency_order() {
  let code = bundle_code(vec![
    module(json!({
      "id": 1, "file": "/src/entry.js", "entry": true,
      "source": "exports.f = function () { return [require('./b'), require('./a')]; };",
      "deps": { "./a": 2, "./b": 3 }
    })),
    module(json!({ "id": 2, "file": "/src/a.js", "source": "exports.a = 1;" })),
    module(json!({ "id": 3, "file": "/src/b.js", "source": "exports.b = 1;" })),
  ]);
  let b = code.find("var _$b_3 = createModuleFactory(").unwrap();
  let a = code.find("var _$a_2 = createModuleFactory(").unwrap();
  let entry = code.find("var _$entry_1 = {};").unwrap();
  assert!(b < a && a < entry);
  assert!(code.contains("_$entry_1.f = function () { return [_$b_3({}), _$a_2({})]; };"));
}

#[test]
fn if_tests_are_predictable_but_branches_are_not() {
  let code = bundle_code(vec![
    module(json!({
      "id": 1, "file": "/src/entry.js", "entry": true,
      "source": "if (require('./a')) { require('./b'); }",
      "deps": { "./a": 2, "./b": 3 }
    })),
    module(json!({ "id": 2, "file": "/src/a.js", "source": "module.exports = 1;" })),
    module(json!({ "id": 3, "file": "/src/b.js", "source": "module.exports = 2;" })),
  ]);
  assert!(code.contains("var _$a_2 = 1;"));
  assert!(code.contains("var _$b_3 = createModuleFactory(function (module, exports) {\nmodule.exports = 2;\n});"));
  assert!(code.contains("if (_$a_2) { _$b_3({}); }"));
}

#[test]
fn an_earlier_eager_require_keeps_the_target_eager() {
  let code = bundle_code(entry_and_a(
    "var a = require('./a');\nexports.get = function () { return require('./a'); };",
    "exports.value = 1;",
  ));
  assert!(!code.contains("createModuleFactory"));
  assert!(code.contains("_$entry_1.get = function () { return _$a_2; };"));
}

#[test]
fn immediately_invoked_functions_are_predictable() {
  let code = bundle_code(entry_and_a("(function () { require('./a'); })();", "exports.value = 1;"));
  assert!(!code.contains("createModuleFactory"));
  assert!(code.contains("(function () { _$a_2; })();"));
}

#[test]
fn external_requires_pass_through() {
  let output = bundle(
    BundlerOptions { iife: Some(false), ..BundlerOptions::default() },
    vec![module(json!({
      "id": 1, "entry": true,
      "source": "var fs = require('fs');\nvar gone = require('./gone');",
      "deps": { "fs": false, "./gone": 9 }
    }))],
  );
  assert_eq!(
    output.code,
    "var _$module_1 = {};\nvar fs = require(\"fs\");\nvar gone = require(9);\n"
  );
}

#[test]
fn standalone_bundles_are_umd() {
  let output = bundle(
    BundlerOptions { standalone: Some("Lib".to_string()), ..BundlerOptions::default() },
    vec![module(json!({ "id": 1, "file": "/src/entry.js", "entry": true, "source": "module.exports = 42;" }))],
  );
  let code = output.code;
  assert!(code.starts_with("(function(f){if(typeof exports===\"object\"&&typeof module!==\"undefined\"){module.exports=f()}"));
  assert!(code.contains("g.Lib=f()"));
  assert!(code.ends_with("\nvar _$entry_1 = 42;\nreturn _$entry_1;\n});\n"));
  assert!(!code.contains("}());"));
}

#[test]
fn standalone_module_is_returned() {
  let output = bundle(
    BundlerOptions {
      standalone: Some("Lib".to_string()),
      standalone_module: Some(2.into()),
      ..BundlerOptions::default()
    },
    entry_and_a("require('./a');", "module.exports = 'A';"),
  );
  assert!(output.code.ends_with("\nreturn _$a_2;\n});\n"));
}

#[test]
fn exposed_modules_register_on_require() {
  let code = bundle_code(vec![
    module(json!({
      "id": 1, "file": "/src/entry.js", "entry": true,
      "source": "require('./a');", "deps": { "./a": 2 }
    })),
    module(json!({ "id": 2, "file": "/src/a.js", "expose": "a", "source": "exports.a = 1;" })),
  ]);
  assert!(code.starts_with(
    "require = (function (require) {\nvar exposedRequire = function exposedRequire(m, jumped) {"
  ));
  assert!(code.contains("\nexposedRequire.m = {};\nexposedRequire.r = require;\nvar _$a_2 = {};"));
  assert!(code.ends_with(
    "\nexposedRequire.m[2] = _$a_2;\nreturn exposedRequire;\n}(typeof require === 'function' ? require : void 0));\n"
  ));
}

#[test]
fn on_demand_exposed_modules_register_a_getter() {
  let code = bundle_code(vec![
    module(json!({
      "id": 1, "file": "/src/entry.js", "entry": true,
      "source": "module.exports = function () { return require('./a'); };", "deps": { "./a": 2 }
    })),
    module(json!({ "id": 2, "file": "/src/a.js", "expose": "a", "source": "exports.a = 1;" })),
  ]);
  assert!(code.contains(
    "\nexposedRequire.r = require;\nvar createModuleFactory = function createModuleFactory(factory) {"
  ));
  assert!(code.contains("var _$a_2 = createModuleFactory(function (module, exports) {\nexports.a = 1;\n});"));
  assert!(code.ends_with(
    "\nObject.defineProperty(exposedRequire.m, 2, { get: function() { return _$a_2({}); }});\nreturn exposedRequire;\n}(typeof require === 'function' ? require : void 0));\n"
  ));
}

#[test]
fn debug_bundles_carry_a_source_map() {
  let mut records = entry_and_a("console.log(require('./a'));", "module.exports = 'A';");
  records[0].source_file = Some("/src/entry.js".to_string());
  records[1].source_file = Some("/src/a.js".to_string());
  let output = bundle(
    BundlerOptions { debug: Some(true), basedir: Some("/src".into()), ..BundlerOptions::default() },
    records,
  );

  let (body, comment) = output.code.trim_end().rsplit_once('\n').unwrap();
  assert!(comment.starts_with("//# sourceMappingURL=data:application/json;charset=utf-8;base64,"));
  assert!(body.ends_with("\n}());"));

  let map = output.map.unwrap();
  let sources = map.sources().collect::<Vec<_>>();
  assert_eq!(sources, ["_prelude", "a.js", "entry.js", "_postlude"]);
  let token = map.lookup_token(1, 0).unwrap();
  assert_eq!(token.get_source(), Some("a.js"));
  assert_eq!((token.get_src_line(), token.get_src_col()), (0, 0));
  let token = map.lookup_token(3, 0).unwrap();
  assert_eq!(token.get_source(), Some("entry.js"));
  assert_eq!((token.get_src_line(), token.get_src_col()), (0, 0));
}

#[test]
fn nomap_modules_are_left_out_of_the_map() {
  let mut records = entry_and_a("console.log(require('./a'));", "module.exports = 'A';");
  records[0].source_file = Some("/src/entry.js".to_string());
  records[1].source_file = Some("/src/a.js".to_string());
  records[1].nomap = true;
  let output = bundle(BundlerOptions { debug: Some(true), ..BundlerOptions::default() }, records);
  let map = output.map.unwrap();
  assert_eq!(map.sources().collect::<Vec<_>>(), ["_prelude", "/src/entry.js", "_postlude"]);
}

#[test]
fn output_is_deterministic() {
  let records = || {
    vec![
      module(json!({
        "id": 1, "file": "/src/entry.js", "entry": true,
        "source": "var b = require('./b'); var a = require('./a'); b(a);",
        "deps": { "./a": 2, "./b": 3 }
      })),
      module(json!({ "id": 2, "file": "/src/a.js", "source": "var shared = 1; module.exports = shared;" })),
      module(json!({ "id": 3, "file": "/src/b.js", "source": "var shared = 2; module.exports = function b() {};" })),
    ]
  };
  let first = bundle_code(records());
  assert_eq!(first, bundle_code(records()));
  // `b` is required first, so it runs first.
  assert!(first.find("var shared = 2;").unwrap() < first.find("var __shared_2 = 1;").unwrap());
}

#[test]
fn parse_errors_name_the_module() {
  let error = Bundler::new(BundlerOptions::default())
    .bundle(vec![
      module(json!({ "id": 1, "file": "/src/entry.js", "entry": true, "source": "var = ;" })),
      module(json!({ "id": 2, "file": "/src/ok.js", "source": "exports.ok = 1;" })),
      module(json!({ "id": 3, "file": "/src/bad.js", "source": "function (" })),
    ])
    .unwrap_err();
  assert_eq!(error.len(), 2);
  assert!(error[0].to_string().starts_with("module 1 (/src/entry.js)"));
  assert!(error[1].to_string().starts_with("module 3 (/src/bad.js)"));
}

#[test]
fn debug_bundles_follow_inline_input_maps() {
  // Maps line 0, column 0 to line 4, column 2 of `a.ts`.
  let input_map = "eyJ2ZXJzaW9uIjozLCJzb3VyY2VzIjpbImEudHMiXSwibmFtZXMiOltdLCJtYXBwaW5ncyI6IkFBSUUifQ==";
  let a_source =
    format!("module.exports = 1;\n//# sourceMappingURL=data:application/json;charset=utf-8;base64,{input_map}");
  let mut records = entry_and_a("console.log(require('./a'));", &a_source);
  records[1].source_file = Some("/src/a.js".to_string());
  let output = bundle(BundlerOptions { debug: Some(true), ..BundlerOptions::default() }, records);

  assert!(!output.code.contains(input_map));
  assert_eq!(output.code.matches("sourceMappingURL").count(), 1);
  assert!(output.code.starts_with("(function(){\nvar _$a_2 = 1;\n\nvar _$entry_1 = {};"));

  let map = output.map.unwrap();
  assert_eq!(map.sources().collect::<Vec<_>>(), ["_prelude", "a.ts", "_postlude"]);
  let token = map.lookup_token(1, 0).unwrap();
  assert_eq!(token.get_source(), Some("a.ts"));
  assert_eq!((token.get_src_line(), token.get_src_col()), (4, 2));
}

#[test]
fn source_map_markers_inside_templates_are_code() {
  let source = "var banner = `\n//# sourceMappingURL=data:application/json;base64,e30=\n`;\nconsole.log(banner);";
  let records = vec![module(json!({
    "id": 1, "file": "/src/entry.js", "sourceFile": "/src/entry.js", "entry": true, "source": source
  }))];
  let output = bundle(BundlerOptions { debug: Some(true), ..BundlerOptions::default() }, records);

  assert!(output.code.contains(source));
  let map = output.map.unwrap();
  assert_eq!(map.sources().collect::<Vec<_>>(), ["_prelude", "/src/entry.js", "_postlude"]);
}
