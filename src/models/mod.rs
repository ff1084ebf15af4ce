pub mod alert;
pub mod quote;
pub mod user;

pub use alert::{Alert, Direction, NewAlert};
pub use quote::Quote;
pub use user::CurrentUser;
