pub mod category;
pub mod form;
pub mod receipt;
pub mod session;
pub mod transaction;

pub use category::*;
pub use form::*;
pub use receipt::*;
pub use session::*;
pub use transaction::*;
