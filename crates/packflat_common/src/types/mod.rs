pub mod module_id;
pub mod module_record;
pub mod module_table;
pub mod raw_idx;
