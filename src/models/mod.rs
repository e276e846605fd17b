mod client;
mod phone;

pub use client::{Client, ClientFilter, ClientUpdate, NewClient};
pub use phone::Phone;
pub(crate) use phone::validate_number;
