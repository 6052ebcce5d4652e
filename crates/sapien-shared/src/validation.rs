//! Validation Utilities
//!
//! Custom validators used by the request DTOs, plus the lenient
//! deserializers that let form-encoded and JSON bodies share one shape.

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use sapien_core::domain::{AiModel, LoginMode, ResultType};
use sapien_core::{DomainError, FieldError};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Letters, digits, and underscores only.
pub fn username_validator(username: &str) -> Result<(), ValidationError> {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_]+$").expect("Failed to compile username regex")
    });

    if regex.is_match(username) {
        Ok(())
    } else {
        Err(error(
            "invalid_username",
            "Username can only contain letters, numbers, and underscores",
        ))
    }
}

/// Absolute http(s) URL.
pub fn url_validator(url: &str) -> Result<(), ValidationError> {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX.get_or_init(|| {
        Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("Failed to compile URL regex")
    });

    if regex.is_match(url) && url.len() <= 2048 {
        Ok(())
    } else {
        Err(error("invalid_url", "Please provide a valid URL for avatar"))
    }
}

pub fn result_type_validator(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<ResultType>()
        .map(|_| ())
        .map_err(|_| error("invalid_result_type", "Result type must be text, image, or video"))
}

pub fn login_mode_validator(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<LoginMode>()
        .map(|_| ())
        .map_err(|_| error("invalid_login_mode", "Login mode must be either email or github"))
}

pub fn models_validator(models: &StringList) -> Result<(), ValidationError> {
    if models.iter().all(|model| model.parse::<AiModel>().is_ok()) {
        Ok(())
    } else {
        Err(error("invalid_model", "Invalid model in worksBestWith field"))
    }
}

pub fn uuid_validator(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| error("invalid_id", "Must be a valid ID"))
}

/// Convert `validator` output into API field errors.
///
/// Field names are reported in camelCase to match the JSON body, sorted so
/// the listing is stable.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = to_camel_case(&field);
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                FieldError::new(field.clone(), message)
            })
        })
        .collect()
}

/// Shorthand used by the DTO conversions.
pub fn into_domain_error(errors: ValidationErrors) -> DomainError {
    DomainError::Validation(field_errors(&errors))
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Trim an optional string in place.
pub(crate) fn trim(value: &mut Option<String>) {
    if let Some(v) = value {
        let trimmed = v.trim();
        if trimmed.len() != v.len() {
            *v = trimmed.to_string();
        }
    }
}

/// A list of strings that may arrive as a JSON array or as one
/// comma-separated string (form fields).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl StringList {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<String>),
            Csv(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::List(items) => StringList(
                items
                    .into_iter()
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect(),
            ),
            Repr::Csv(raw) => StringList(sapien_core::query::split_csv(&raw)),
        })
    }
}

/// Accept `true`/`false` either as JSON booleans or as strings.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlexibleBool;

    impl Visitor<'_> for FlexibleBool {
        type Value = Option<bool>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean or \"true\"/\"false\"")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            match v.trim() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(FlexibleBool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(custom(function = "username_validator"))]
        user_name: Option<String>,
        #[validate(required(message = "Avatar URL is required"))]
        avatar_url: Option<String>,
    }

    #[test]
    fn username_rules() {
        assert!(username_validator("ada_99").is_ok());
        assert!(username_validator("ada lovelace").is_err());
        assert!(username_validator("ada-l").is_err());
    }

    #[test]
    fn url_rules() {
        assert!(url_validator("https://example.com/a.png").is_ok());
        assert!(url_validator("ftp://example.com").is_err());
        assert!(url_validator("not a url").is_err());
    }

    #[test]
    fn field_errors_are_camel_cased_and_sorted() {
        let probe = Probe {
            user_name: Some("bad name".to_string()),
            avatar_url: None,
        };
        let errors = probe.validate().unwrap_err();
        let fields = field_errors(&errors);

        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["avatarUrl", "userName"]);
        assert_eq!(fields[0].message, "Avatar URL is required");
    }

    #[test]
    fn string_list_accepts_array_or_csv() {
        let list: StringList = serde_json::from_str(r#"["a", " b ", ""]"#).unwrap();
        assert_eq!(list.0, vec!["a", "b"]);

        let csv: StringList = serde_json::from_str(r#""GPT-4, Claude-3""#).unwrap();
        assert_eq!(csv.0, vec!["GPT-4", "Claude-3"]);
        assert!(models_validator(&csv).is_ok());
    }

    #[test]
    fn flexible_bool_accepts_strings() {
        #[derive(Deserialize)]
        struct Flag {
            #[serde(default, deserialize_with = "flexible_bool")]
            on: Option<bool>,
        }

        let flag: Flag = serde_json::from_str(r#"{"on": "false"}"#).unwrap();
        assert_eq!(flag.on, Some(false));
        let flag: Flag = serde_json::from_str(r#"{"on": true}"#).unwrap();
        assert_eq!(flag.on, Some(true));
        let flag: Flag = serde_json::from_str("{}").unwrap();
        assert_eq!(flag.on, None);
        assert!(serde_json::from_str::<Flag>(r#"{"on": "yes"}"#).is_err());
    }
}
