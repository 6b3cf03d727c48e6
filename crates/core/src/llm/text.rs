/// Removes a surrounding Markdown code fence (```html ... ``` or ``` ... ```), if any.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut inner = trimmed;
    if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
        inner = after_first;
    } else {
        return String::new();
    }
    if let Some(end) = inner.rfind("```") {
        inner = &inner[..end];
    }
    inner.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_language_tagged_fence() {
        let fenced = "```html\n<p>Hello</p>\n```\n";
        assert_eq!(strip_code_fences(fenced), "<p>Hello</p>");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  <p>Hi</p> "), "<p>Hi</p>");
    }

    #[test]
    fn lone_fence_is_empty() {
        assert_eq!(strip_code_fences("```"), "");
    }
}
