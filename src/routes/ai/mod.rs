mod handler;
mod model;

pub use handler::{generate, suggest};
