//! Greedy word wrapping

/// Wrap `text` into lines no wider than `max_width` where possible
///
/// Words are taken greedily: a word joins the current line unless the joined
/// line would measure wider than `max_width` while the current line already
/// has content, in which case the line is flushed and the word starts the
/// next one. A single word wider than `max_width` therefore gets a line of
/// its own and is never truncated.
///
/// # Arguments
/// * `text` - Text to wrap; any run of whitespace separates words
/// * `max_width` - Maximum line width, in the unit `measure` returns
/// * `measure` - Measures the rendered width of a candidate line
pub fn wrap_words<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
