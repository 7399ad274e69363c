//! Recovery of template arguments from raw declaration text.
//!
//! Introspectors do not always expose template arguments structurally, in
//! particular for non-type arguments such as the length of `std::array<T, N>`.
//! The declaration tokens still carry them.

/// Arguments between the first `<` and the last `>` of `code`.
pub fn template_arguments_from_code(code: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (code.find('<'), code.rfind('>')) else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }
    split_template_arguments(&code[start + 1..end])
}

/// Split on commas that are not nested inside `<>`, `()` or `[]`.
pub fn split_template_arguments(list: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for ch in list.chars() {
        match ch {
            '<' | '(' | '[' => {
                depth += 1;
                current.push(ch);
            }
            '>' | ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let last = current.trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last.to_string());
    }
    args
}
