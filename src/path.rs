/*!
 * Remote path canonicalization
 */

/// Resolve `.`, `..` and redundant separators into an absolute path
///
/// The result always starts with `/` and is never empty. A `..` that would
/// climb above the root is absorbed rather than rejected, so `../../x`
/// resolves to `/x`. Relative input is treated as relative to the root.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    format!("/{}", parts.join("/"))
}

/// Split a normalized path into its parent directory and final component
///
/// The root splits into (`"/"`, `""`). Parents never carry a trailing `/`
/// except for the root itself.
pub fn split(path: &str) -> (String, String) {
    let path = normalize(path);
    match path.rfind('/') {
        Some(0) => ("/".to_string(), path[1..].to_string()),
        Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
        None => ("/".to_string(), path),
    }
}

/// Join a directory and a child name into a normalized path
pub fn join(dir: &str, name: &str) -> String {
    normalize(&format!("{}/{}", dir, name))
}
