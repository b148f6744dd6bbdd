pub mod arguments_ext;
pub mod expression_ext;
