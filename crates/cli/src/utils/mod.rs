pub mod parser;
pub mod walk;

pub use parser::parse_filepath_with_line;
pub use walk::{collect_tests, collect_tests_in_file};
