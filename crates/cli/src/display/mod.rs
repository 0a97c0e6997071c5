pub mod command_details;
pub mod tree;

pub use command_details::{print_command_details, print_variables};
pub use tree::{format_command_line, print_command_tree};
