//! Fixed mail templates, one per user operation.

use crate::transport::MailMessage;
use domain_users::UserOperation;

pub const FROM_ADDRESS: &str = "raushangalin@yandex.ru";

pub const CREATED_SUBJECT: &str = "Аккаунт успешно создан";
pub const CREATED_BODY: &str =
    "Здравствуйте! Ваш аккаунт на сайте ваш сайт был успешно создан.";

pub const DELETED_SUBJECT: &str = "Аккаунт удалён";
pub const DELETED_BODY: &str = "Здравствуйте! Ваш аккаунт был удалён.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub subject: &'static str,
    pub body: &'static str,
}

pub fn template_for(operation: UserOperation) -> Template {
    match operation {
        UserOperation::Create => Template {
            subject: CREATED_SUBJECT,
            body: CREATED_BODY,
        },
        UserOperation::Delete => Template {
            subject: DELETED_SUBJECT,
            body: DELETED_BODY,
        },
    }
}

/// The message sent to `to` for `operation`.
pub fn render(to: &str, operation: UserOperation) -> MailMessage {
    let template = template_for(operation);
    MailMessage {
        from: FROM_ADDRESS.to_string(),
        to: to.to_string(),
        subject: template.subject.to_string(),
        body: template.body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_create() {
        let message = render("a@b.co", UserOperation::Create);
        assert_eq!(message.from, "raushangalin@yandex.ru");
        assert_eq!(message.to, "a@b.co");
        assert_eq!(message.subject, "Аккаунт успешно создан");
    }

    #[test]
    fn test_render_delete() {
        let message = render("a@b.co", UserOperation::Delete);
        assert_eq!(message.subject, "Аккаунт удалён");
        assert_eq!(message.body, "Здравствуйте! Ваш аккаунт был удалён.");
    }
}
