//! Input forms and their field metadata.
//!
//! Forms are plain `serde` + `validator` structs. Each form also lists its
//! fields with the label and help text shown next to the input, so pages can
//! render them without hard-coding copy.

use std::{borrow::Cow, collections::BTreeMap};

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Maximum length of a username.
pub const USERNAME_MAX_LEN: u64 = 150;

/// Minimum length of a password.
pub const PASSWORD_MIN_LEN: u64 = 8;

/// Label and help text for one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Input name.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Hint shown under the input; empty when there is none.
    pub help_text: &'static str,
}

/// A form with known fields.
pub trait FormFields {
    /// Fields in rendering order.
    const FIELDS: &'static [FieldInfo];

    /// Look up a field by input name.
    #[must_use]
    fn field(name: &str) -> Option<&'static FieldInfo> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }
}

/// Post create/edit form. The image travels separately as a multipart file.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,

    /// Selected group ID; empty means no group.
    pub group: Option<String>,
}

impl PostForm {
    /// The selected group, with an empty choice meaning none.
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.group.as_deref().map(str::trim).filter(|g| !g.is_empty())
    }
}

impl FormFields for PostForm {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "text",
            label: "Текст",
            help_text: "Текст нового поста",
        },
        FieldInfo {
            name: "group",
            label: "Группа",
            help_text: "Группа, в которой будет относиться пост",
        },
        FieldInfo {
            name: "image",
            label: "Картинка",
            help_text: "Картинка",
        },
    ];
}

/// Comment form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

impl FormFields for CommentForm {
    const FIELDS: &'static [FieldInfo] = &[FieldInfo {
        name: "text",
        label: "Текст комментария",
        help_text: "Введите текст Вашего комментария.",
    }];
}

/// Registration form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[validate(
        length(min = 1, max = USERNAME_MAX_LEN),
        custom(function = "username_chars")
    )]
    pub username: String,

    #[validate(length(max = USERNAME_MAX_LEN))]
    pub name: Option<String>,

    #[validate(length(min = PASSWORD_MIN_LEN, max = 128))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Пароли не совпадают."))]
    pub password_confirmation: String,
}

impl FormFields for SignupForm {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "username",
            label: "Имя пользователя",
            help_text: "Не более 150 символов: буквы, цифры и @/./+/-/_",
        },
        FieldInfo {
            name: "name",
            label: "Имя",
            help_text: "",
        },
        FieldInfo {
            name: "password",
            label: "Пароль",
            help_text: "Не менее 8 символов.",
        },
        FieldInfo {
            name: "password_confirmation",
            label: "Подтверждение пароля",
            help_text: "",
        },
    ];
}

/// Login form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "not_blank"))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,

    /// Where to go after logging in.
    pub next: Option<String>,
}

impl FormFields for LoginForm {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "username",
            label: "Имя пользователя",
            help_text: "",
        },
        FieldInfo {
            name: "password",
            label: "Пароль",
            help_text: "",
        },
    ];
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Обязательное поле.")));
    }
    Ok(())
}

fn username_chars(value: &str) -> Result<(), ValidationError> {
    let valid = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        return Err(ValidationError::new("username").with_message(Cow::Borrowed(
            "Допустимы только буквы, цифры и символы @/./+/-/_",
        )));
    }
    Ok(())
}

/// Per-field messages for re-rendering a form.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Flatten validation errors into per-field messages.
///
/// Errors without a custom message get a generic one based on their code.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, kind) in errors.errors() {
        if let ValidationErrorsKind::Field(list) = kind {
            let messages = list.iter().map(message_for).collect();
            out.insert(field.to_string(), messages);
        }
    }
    out
}

fn message_for(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "length" => {
            let bound = |key: &str| error.params.get(key).map(ToString::to_string);
            match (bound("min"), bound("max")) {
                (Some(min), _) if min == "1" => "Обязательное поле.".to_string(),
                (Some(min), Some(max)) => format!("Длина должна быть от {min} до {max} символов."),
                (Some(min), None) => format!("Не менее {min} символов."),
                (None, Some(max)) => format!("Не более {max} символов."),
                (None, None) => "Недопустимая длина.".to_string(),
            }
        }
        _ => "Недопустимое значение.".to_string(),
    }
}
