use oxc_ast::ast;

pub trait ArgumentsExt<'ast> {
  /// The first argument as a string known without evaluation: a string literal or a template
  /// literal with no substitutions.
  fn first_static_string(&self) -> Option<&str>;
}

impl<'ast> ArgumentsExt<'ast> for oxc_allocator::Vec<'ast, ast::Argument<'ast>> {
  fn first_static_string(&self) -> Option<&str> {
    match self.first()? {
      ast::Argument::StringLiteral(lit) => Some(lit.value.as_str()),
      ast::Argument::TemplateLiteral(template) if template.expressions.is_empty() => {
        let [quasi] = template.quasis.as_slice() else {
          return None;
        };
        quasi.value.cooked.as_ref().map(|cooked| cooked.as_str())
      }
      _ => None,
    }
  }
}
