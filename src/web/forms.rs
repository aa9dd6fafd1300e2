//! Input cleaning for the JSON and form bodies the routes accept. Each
//! `clean_*` function either yields the values the services expect or the
//! full set of field messages.

use email_address::EmailAddress;
use uuid::Uuid;

use crate::db::enums::MessageTemplateType;
use crate::db::services::MessageTemplateInput;
use crate::validation::FieldErrors;
use crate::web::models::{LoginForm, MessageTemplateRequest, TagRequest};

pub const MAX_NAME_LENGTH: usize = 200;

const REQUIRED: &str = "This field is required.";

fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

/// Trims `value` and checks it is present and at most `max` characters.
fn required_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        let length = value.chars().count();
        if length > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {length})."),
            );
        }
    }
    value.to_string()
}

pub fn clean_login(form: &LoginForm) -> Result<(String, String), FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = form.email.trim().to_string();
    if email.is_empty() {
        errors.add("email", REQUIRED);
    } else if !EmailAddress::is_valid(&email) {
        errors.add("email", "Enter a valid email address.");
    }
    // Passwords are taken verbatim.
    if form.password.is_empty() {
        errors.add("password", REQUIRED);
    }

    errors.into_result((email, form.password.clone()))
}

pub fn clean_tag(request: &TagRequest) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = required_text(&mut errors, "name", &request.name, MAX_NAME_LENGTH);
    errors.into_result(name)
}

pub fn clean_message_template(
    request: &MessageTemplateRequest,
) -> Result<MessageTemplateInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let kind = match request.kind.trim() {
        "" => {
            errors.add("type", REQUIRED);
            None
        }
        value => {
            let kind = MessageTemplateType::parse(value);
            if kind.is_none() {
                errors.add("type", invalid_choice(value));
            }
            kind
        }
    };
    let title = required_text(&mut errors, "title", &request.title, MAX_NAME_LENGTH);
    let body = request.body.trim().to_string();
    if body.is_empty() {
        errors.add("body", REQUIRED);
    }

    let mut tag_ids = Vec::with_capacity(request.tags.len());
    for raw in &request.tags {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => tag_ids.push(id),
            Err(_) => errors.add("tags", format!("\u{201c}{raw}\u{201d} is not a valid UUID.")),
        }
    }

    match kind {
        Some(kind) if errors.is_empty() => Ok(MessageTemplateInput {
            kind,
            title,
            body,
            tag_ids,
        }),
        _ => Err(errors),
    }
}
