pub mod definition;
pub mod factory;
pub mod keys;
pub mod types;

pub use definition::*;
pub use factory::*;
pub use keys::*;
pub use types::*;
