mod ast_ext;

pub use ast_ext::{arguments_ext::ArgumentsExt, expression_ext::ExpressionExt};
