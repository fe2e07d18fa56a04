pub mod burn;
pub mod history;
pub mod patient;
pub mod record;
pub mod section;

pub use burn::*;
pub use history::*;
pub use patient::*;
pub use record::*;
pub use section::*;
