pub mod init;
pub mod list;
pub mod pin;
pub mod run;
pub mod validate;

pub use init::init_command;
pub use list::{list_command, show_command, vars_command};
pub use pin::{forget_command, pin_command, pins_command, unpin_command};
pub use run::run_command;
pub use test::{test_command, test_path_command};
pub use validate::validate_command;
