mod commonjs;
mod ecma_compiler;
mod ecma_utils;
mod scope;

pub use crate::{
  commonjs::{is_order_unpredictable, RequireCall, RequireDeclarator},
  ecma_compiler::{EcmaCompiler, ModuleAnalysis},
  scope::{
    Binding, BindingId, MemberAssignment, MemberParent, Reference, ReferenceFlags, ReferenceId,
    ReferenceParent, Scope, ScopeId, ScopeKind, ScopeTree, WRAPPER_BINDINGS,
  },
};
