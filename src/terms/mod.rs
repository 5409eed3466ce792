pub mod store;
pub mod resolver;
pub mod storage;

pub use store::*;
pub use resolver::*;
pub use storage::*;
