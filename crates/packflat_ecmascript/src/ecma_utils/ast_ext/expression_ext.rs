use oxc_ast::ast;

pub trait ExpressionExt<'ast> {
  fn as_identifier(&self) -> Option<&ast::IdentifierReference<'ast>>;

  /// A bare `require` identifier. Whether it is the module's own `require` is up to scope
  /// resolution.
  fn is_require_identifier(&self) -> bool;

  /// The key of a computed member access when it is written as a string, as in `module["exports"]`.
  fn as_static_property_key(&self) -> Option<&str>;
}

impl<'ast> ExpressionExt<'ast> for ast::Expression<'ast> {
  fn as_identifier(&self) -> Option<&ast::IdentifierReference<'ast>> {
    if let ast::Expression::Identifier(ident) = self { Some(ident) } else { None }
  }

  fn is_require_identifier(&self) -> bool {
    self.as_identifier().is_some_and(|ident| ident.name == "require")
  }

  fn as_static_property_key(&self) -> Option<&str> {
    let ast::Expression::StringLiteral(lit) = self else {
      return None;
    };
    Some(lit.value.as_str())
  }
}

#[cfg(test)]
mod tests {
  use oxc_allocator::Allocator;
  use oxc_parser::Parser;
  use oxc_span::SourceType;

  use super::ExpressionExt;

  fn with_expression(source: &str, check: impl FnOnce(&oxc_ast::ast::Expression)) {
    let allocator = Allocator::default();
    let expr = Parser::new(&allocator, source, SourceType::cjs()).parse_expression().unwrap();
    check(&expr);
  }

  #[test]
  fn recognises_require_identifiers() {
    with_expression("require", |expr| assert!(expr.is_require_identifier()));
    with_expression("requirex", |expr| assert!(!expr.is_require_identifier()));
    with_expression("module.require", |expr| assert!(!expr.is_require_identifier()));
  }

  #[test]
  fn reads_string_keys_only() {
    with_expression("'exports'", |expr| assert_eq!(expr.as_static_property_key(), Some("exports")));
    with_expression("exports", |expr| assert_eq!(expr.as_static_property_key(), None));
  }
}
