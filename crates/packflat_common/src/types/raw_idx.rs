oxc_index::define_index_type! {
  pub struct ModuleIdx = u32;
}
