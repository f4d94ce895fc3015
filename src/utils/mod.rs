//! Small shared helpers.

mod tests;
mod time;

pub use time::current_time_millis;
