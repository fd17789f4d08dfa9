pub mod play;
pub mod solve;
pub mod train;

mod common;
