use crate::mail::OutgoingEmail;

/// Wraps the model-written summary in the email shell. `summary_html` is trusted model output.
pub fn news_summary_email(to: &str, date_label: &str, summary_html: &str) -> OutgoingEmail {
    let html = layout(&format!(
        "<h2>Market news summary</h2>\n<p style=\"color:#9ca3af\">{}</p>\n{}",
        escape_html(date_label),
        summary_html
    ));
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Market News Summary Today - {date_label}"),
        html,
    }
}

pub fn welcome_email(to: &str, name: &str, intro_html: &str) -> OutgoingEmail {
    let html = layout(&format!(
        "<h2>Welcome aboard, {}</h2>\n{}\n<p>Add a few stocks to your watchlist and we will send you a daily digest of the news that moves them.</p>",
        escape_html(name.trim()),
        intro_html
    ));
    OutgoingEmail {
        to: to.to_string(),
        subject: "Welcome to Signalist - your stock market toolkit is ready!".to_string(),
        html,
    }
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><body style=\"background:#050505;color:#e5e7eb;font-family:Arial,sans-serif\">\n\
<div style=\"max-width:600px;margin:0 auto;padding:24px\">\n{body}\n\
<hr style=\"border-color:#30333a\"/>\n<p style=\"font-size:12px;color:#6b7280\">You are receiving this because you have a Signalist account.</p>\n\
</div>\n</body></html>"
    )
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_email_has_dated_subject() {
        let email = news_summary_email("a@b.c", "Sunday, October 18, 2026", "<ul><li>x</li></ul>");
        assert_eq!(email.to, "a@b.c");
        assert_eq!(
            email.subject,
            "Market News Summary Today - Sunday, October 18, 2026"
        );
        assert!(email.html.contains("<ul><li>x</li></ul>"));
    }

    #[test]
    fn welcome_email_escapes_name() {
        let email = welcome_email("a@b.c", "<Ann>", "<p>Hi</p>");
        assert!(email.html.contains("Welcome aboard, &lt;Ann&gt;"));
        assert!(email.html.contains("<p>Hi</p>"));
    }
}
