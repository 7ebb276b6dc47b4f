pub mod entry;
pub mod results;

pub use entry::*;
pub use results::*;
