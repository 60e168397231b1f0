pub mod compute;
pub mod simulate;
pub mod watch;
