//! Plain-text bodies of account notification mails.

/// Subject and body of one outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContent {
    pub subject: &'static str,
    pub body: String,
}

/// Link the user follows to pick a new password.
pub fn reset_link(app_base_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        app_base_url.trim_end_matches('/'),
        token
    )
}

pub fn password_reset(app_base_url: &str, name: &str, token: &str) -> MailContent {
    MailContent {
        subject: "Password Reset Request",
        body: format!(
            "Hello {name},\n\n\
             You have requested to reset your password. \
             Click the link below to reset your password:\n\n\
             {link}\n\n\
             This link will expire in 15 minutes for security reasons.\n\n\
             If you didn't request this password reset, please ignore this email.\n\n\
             Best regards,\n\
             Your Application Team\n",
            link = reset_link(app_base_url, token),
        ),
    }
}

pub fn password_changed(name: &str) -> MailContent {
    MailContent {
        subject: "Password Changed Successfully",
        body: format!(
            "Hello {name},\n\n\
             Your password has been successfully changed.\n\n\
             If you didn't make this change, please contact support immediately.\n\n\
             Best regards,\n\
             Your Application Team\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_link_strips_trailing_slash() {
        assert_eq!(
            reset_link("https://app.example.com/", "abc"),
            "https://app.example.com/reset-password?token=abc"
        );
    }

    #[test]
    fn test_password_reset_mail() {
        let mail = password_reset("http://localhost:8080", "Alice", "tok.en.value");

        assert_eq!(mail.subject, "Password Reset Request");
        assert!(mail.body.starts_with("Hello Alice,\n\n"));
        assert!(mail
            .body
            .contains("\n\nhttp://localhost:8080/reset-password?token=tok.en.value\n\n"));
        assert!(mail.body.contains("expire in 15 minutes"));
        assert!(mail.body.ends_with("Best regards,\nYour Application Team\n"));
    }

    #[test]
    fn test_password_changed_mail() {
        let mail = password_changed("Bob");

        assert_eq!(mail.subject, "Password Changed Successfully");
        assert!(mail.body.starts_with("Hello Bob,\n\n"));
        assert!(mail.body.contains("contact support immediately"));
    }
}
