use signalist_core::llm::prompts::welcome_intro;
use signalist_core::llm::LlmClient;
use signalist_core::mail::templates::welcome_email;
use signalist_core::mail::Mailer;
use signalist_core::storage::{self, Database};

/// Sends the personalised welcome email for a freshly signed-up user.
/// With no mailer (dry-run) the rendered email is only logged.
pub async fn send_welcome(
    db: &Database,
    llm: &dyn LlmClient,
    mailer: Option<&dyn Mailer>,
    email: &str,
) -> anyhow::Result<()> {
    let Some((user, prefs)) = storage::users::preferences_by_email(db.pool(), email).await? else {
        anyhow::bail!("no user found with email {email}");
    };

    let name = display_name(&user.name, &user.email);
    let intro = welcome_intro(llm, name, prefs.as_ref()).await;
    let message = welcome_email(&user.email, name, &intro);

    match mailer {
        Some(mailer) => {
            mailer.send(message).await?;
            tracing::info!(to = %user.email, "welcome email sent");
        }
        None => {
            tracing::info!(to = %message.to, subject = %message.subject, "dry-run: welcome email not sent");
        }
    }
    Ok(())
}

fn display_name<'a>(name: &'a str, email: &'a str) -> &'a str {
    let name = name.trim();
    if !name.is_empty() {
        return name;
    }
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_email_local_part() {
        assert_eq!(display_name(" Ann ", "ann@x.io"), "Ann");
        assert_eq!(display_name("", "ann@x.io"), "ann");
    }
}
