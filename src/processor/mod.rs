pub mod base;
pub mod traversal;

pub use base::*;
pub use traversal::{ShuffleScanner, StopHandle};
