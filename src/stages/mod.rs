pub mod pipeline;
pub mod stage0_normalize;
pub mod stage1_merge;
pub mod stage2_extract;
pub mod stage3_assemble;

pub use pipeline::*;
pub use stage0_normalize::*;
pub use stage1_merge::*;
pub use stage2_extract::*;
pub use stage3_assemble::*;
