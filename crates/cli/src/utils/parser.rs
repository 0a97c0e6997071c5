/// Split `path:line` into the path and a zero-based line
pub fn parse_filepath_with_line(filepath_arg: &str) -> (String, Option<u32>) {
    if let Some(colon_pos) = filepath_arg.rfind(':') {
        let path_part = &filepath_arg[..colon_pos];
        let line_part = &filepath_arg[colon_pos + 1..];

        if let Ok(line_num) = line_part.parse::<u32>() {
            // Convert 1-based to 0-based
            (path_part.to_string(), Some(line_num.saturating_sub(1)))
        } else {
            (filepath_arg.to_string(), None)
        }
    } else {
        (filepath_arg.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filepath_with_line() {
        assert_eq!(
            parse_filepath_with_line("tests/test_api.py:12"),
            ("tests/test_api.py".to_string(), Some(11))
        );
        assert_eq!(
            parse_filepath_with_line("src/app.test.ts"),
            ("src/app.test.ts".to_string(), None)
        );
        assert_eq!(
            parse_filepath_with_line(r"C:\ws\app.test.ts"),
            (r"C:\ws\app.test.ts".to_string(), None)
        );
    }
}
