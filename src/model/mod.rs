pub mod table;
pub mod validator;

pub use table::*;
pub use validator::*;
