/// Expands `$NAME` and `${NAME}` from the process environment; unset
/// variables expand to an empty string.
pub fn expand_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expands variables using `lookup`. A `$` not followed by a variable name,
/// or a `${` with no closing brace, is kept verbatim.
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut rest = input;
    let mut output = String::with_capacity(input.len());

    loop {
        let Some(start) = rest.find('$') else {
            output.push_str(rest);
            break;
        };
        let (before, after_start) = rest.split_at(start);
        output.push_str(before);
        let after = after_start.get(1..).unwrap_or_default();

        if let Some(braced) = after.strip_prefix('{') {
            let Some(end) = braced.find('}') else {
                output.push_str(after_start);
                break;
            };
            let (name, after_end) = braced.split_at(end);
            output.push_str(&lookup(name.trim()).unwrap_or_default());
            rest = after_end.get(1..).unwrap_or_default();
            continue;
        }

        let name_len = after
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .unwrap_or(after.len());
        if name_len == 0 {
            output.push('$');
            rest = after;
            continue;
        }
        let (name, remaining) = after.split_at(name_len);
        output.push_str(&lookup(name).unwrap_or_default());
        rest = remaining;
    }

    output
}
