//! String-level path normalization.
//!
//! These helpers work on forward-slash strings rather than [`std::path::Path`]
//! so that Windows-style inputs behave the same on every host. Each step is a
//! separate function because callers apply them in a fixed order and the
//! order matters.

/// Replace every `\` with `/`
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Replace `/` and `\` with `.`
pub fn separators_to_dots(path: &str) -> String {
    path.replace(['/', '\\'], ".")
}

/// Remove one leading `./`
pub fn strip_leading_dot_slash(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

/// Remove one leading `.`
pub fn strip_leading_dot(path: &str) -> &str {
    path.strip_prefix('.').unwrap_or(path)
}

/// Remove one leading `/`
pub fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Remove every leading `/` and `.` character
pub fn trim_leading_slashes_and_dots(path: &str) -> &str {
    path.trim_start_matches(['/', '.'])
}

/// Remove the extension of the final component, if it has one.
///
/// A component that only starts with a dot (`.env`) has no extension.
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Extension of the final component including the dot, or `""`
pub fn extension(path: &str) -> &str {
    let stripped = strip_extension(path);
    &path[stripped.len()..]
}

/// Final component of a forward-slash path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Lexically normalize: forward slashes, no `.` segments, `..` applied,
/// no duplicate or trailing separators. The root (`/` or `C:`) is kept.
pub fn normalize(path: &str) -> String {
    let path = to_forward_slashes(path);
    let (root, rest) = split_root(&path);
    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match root {
        "" => joined,
        "/" => format!("/{joined}"),
        drive if joined.is_empty() => format!("{drive}/"),
        drive => format!("{drive}/{joined}"),
    }
}

/// Resolve `relative` against `base`, like a shell `cd base && cd relative`
pub fn join(base: &str, relative: &str) -> String {
    if is_absolute(relative) {
        normalize(relative)
    } else {
        normalize(&format!("{base}/{relative}"))
    }
}

/// If `path` lies under `base` (or equals it), return the remainder with its
/// original casing. The remainder keeps its leading `/`.
///
/// With `case_insensitive` the prefix comparison ignores ASCII case, which is
/// how Windows filesystems compare paths.
pub fn strip_base<'a>(path: &'a str, base: &str, case_insensitive: bool) -> Option<&'a str> {
    let base = if base.len() > 1 {
        base.trim_end_matches('/')
    } else {
        base
    };
    if base.is_empty() || path.len() < base.len() || !path.is_char_boundary(base.len()) {
        return None;
    }
    let head = &path[..base.len()];
    let same = if case_insensitive {
        head.eq_ignore_ascii_case(base)
    } else {
        head == base
    };
    if !same {
        return None;
    }
    let rest = &path[base.len()..];
    if rest.is_empty() || rest.starts_with('/') || base.ends_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Relative path from directory `from` to `to`, using `..` where needed.
/// Both inputs should be normalized absolute paths; when they share no root
/// `to` is returned unchanged.
pub fn relative(from: &str, to: &str, case_insensitive: bool) -> String {
    let (from_root, from_rest) = split_root(from);
    let (to_root, to_rest) = split_root(to);
    let roots_match = if case_insensitive {
        from_root.eq_ignore_ascii_case(to_root)
    } else {
        from_root == to_root
    };
    if !roots_match {
        return to.to_string();
    }

    let from_parts: Vec<&str> = from_rest.split('/').filter(|s| !s.is_empty()).collect();
    let to_parts: Vec<&str> = to_rest.split('/').filter(|s| !s.is_empty()).collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| {
            if case_insensitive {
                a.eq_ignore_ascii_case(b)
            } else {
                a == b
            }
        })
        .count();

    let mut parts: Vec<&str> = vec![".."; from_parts.len() - common];
    parts.extend(&to_parts[common..]);
    parts.join("/")
}

fn split_root(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        (&path[..2], &path[2..])
    } else if let Some(rest) = path.strip_prefix('/') {
        ("/", rest)
    } else {
        ("", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_strips_remove_one_occurrence() {
        assert_eq!(strip_leading_dot_slash("././a"), "./a");
        assert_eq!(strip_leading_dot("..a"), ".a");
        assert_eq!(strip_leading_slash("//a"), "/a");
        assert_eq!(trim_leading_slashes_and_dots("/./.a/b"), "a/b");
    }

    #[test]
    fn test_strip_extension_only_touches_file_name() {
        assert_eq!(strip_extension("tests/test_file.py"), "tests/test_file");
        assert_eq!(strip_extension("pkg.v2/test_file"), "pkg.v2/test_file");
        assert_eq!(strip_extension("a/b.test.js"), "a/b.test");
        assert_eq!(strip_extension("conf/.env"), "conf/.env");
        assert_eq!(extension("a/b.test.js"), ".js");
        assert_eq!(extension("Makefile"), "");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/ws/./a//b/../c/"), "/ws/a/c");
        assert_eq!(normalize("C:\\ws\\proj\\..\\src"), "C:/ws/src");
        assert_eq!(normalize("a/../../b"), "../b");
        assert_eq!(normalize("/.."), "/");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/ws", "flowchart"), "/ws/flowchart");
        assert_eq!(join("/ws", "./src/"), "/ws/src");
        assert_eq!(join("/ws", "/opt/app"), "/opt/app");
    }

    #[test]
    fn test_strip_base_requires_segment_boundary() {
        assert_eq!(strip_base("/ws/flowchart/a.py", "/ws/flowchart", false), Some("/a.py"));
        assert_eq!(strip_base("/ws/flowchart2/a.py", "/ws/flowchart", false), None);
        assert_eq!(strip_base("/ws/flowchart", "/ws/flowchart/", false), Some(""));
        assert_eq!(strip_base("/a.py", "/", false), Some("a.py"));
    }

    #[test]
    fn test_strip_base_case_handling() {
        assert_eq!(strip_base("C:/WS/Src/a.py", "c:/ws", false), None);
        assert_eq!(strip_base("C:/WS/Src/a.py", "c:/ws", true), Some("/Src/a.py"));
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative("/ws/app", "/ws/app/tests/a.js", false), "tests/a.js");
        assert_eq!(relative("/ws/app", "/ws/lib/a.js", false), "../lib/a.js");
        assert_eq!(relative("C:/ws", "D:/other/a.js", true), "D:/other/a.js");
    }
}
