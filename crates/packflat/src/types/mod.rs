pub mod bundle_output;
pub mod rewrite_state;

use std::sync::Arc;

use oxc_index::IndexVec;
use packflat_common::{ModuleIdx, NormalizedBundlerOptions};
use packflat_ecmascript::ModuleAnalysis;

use self::rewrite_state::RewriteState;

pub type SharedOptions = Arc<NormalizedBundlerOptions>;
pub type IndexModuleAnalyses = IndexVec<ModuleIdx, ModuleAnalysis>;
pub type IndexRewriteStates = IndexVec<ModuleIdx, RewriteState>;
