pub mod post;
pub mod spec;
pub mod state;
