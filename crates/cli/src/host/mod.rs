//! Platform backends for the dispatcher: shell sessions standing in for
//! integrated terminals, and `std::process` for external windows.

pub mod shell;
pub mod spawner;

pub use shell::ShellSessionHost;
pub use spawner::SystemSpawner;
