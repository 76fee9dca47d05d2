//! Path arithmetic on absolute navigation paths

/// Split a path on `/` outside of predicates and quoted strings
///
/// The leading `/` of an absolute path does not produce an empty step.
pub fn steps(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, c) in path.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, '/') if depth == 0 => {
                steps.push(&path[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if start < path.len() {
        steps.push(&path[start..]);
    }
    steps
}

/// A step without its predicates: `Lot[@id='1']` becomes `Lot`
pub fn strip_predicates(step: &str) -> &str {
    step.find('[').map_or(step, |index| &step[..index])
}

fn same_step(from: &str, to: &str) -> bool {
    from == to || strip_predicates(from) == to
}

/// Relative path leading from `from` to `to`, both absolute
///
/// Returns `.` when both paths address the same element.
pub fn relative_path(from: &str, to: &str) -> String {
    let from_steps = steps(from);
    let to_steps = steps(to);

    let common = from_steps
        .iter()
        .zip(&to_steps)
        .take_while(|(a, b)| same_step(a, b))
        .count();

    let ups = from_steps.len() - common;
    let mut parts: Vec<&str> = std::iter::repeat_n("..", ups).collect();
    parts.extend(&to_steps[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Append `tail` to `base`, collapsing `.` on either side
pub fn join(base: &str, tail: &str) -> String {
    match (base, tail) {
        (".", tail) => tail.to_string(),
        (base, ".") => base.to_string(),
        (base, tail) => format!("{}/{}", base.trim_end_matches('/'), tail),
    }
}
