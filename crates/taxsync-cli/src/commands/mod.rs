pub mod oneshot;
pub mod repl;
