pub mod client;
pub mod oracle;
pub mod prompts;
pub mod schema;

pub use client::*;
pub use oracle::*;
pub use prompts::*;
pub use schema::*;
