pub mod admin;
pub mod display;
pub mod submit;
pub mod watch;
