mod handler;
mod model;

pub use handler::{login, me, profile, register, update_profile};
