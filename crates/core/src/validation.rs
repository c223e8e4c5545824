//! Form validation.
//!
//! Each form deserializes into a draft of raw strings. `validate` trims the
//! input and either produces the typed body the API expects or a list of
//! per-field messages to render next to the inputs. Drafts are kept as-is
//! so a rejected form can be re-rendered with what the user typed.

use serde::{Deserialize, Serialize};

use crate::types::{Email, Price, PriceError, Product, ProductPayload, User, UserPayload};

/// One message attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Validation failures in the order the fields appear on the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn require(errors: &mut FieldErrors, field: &'static str, label: &str, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(field, format!("{label} is required"));
    }
    trimmed.to_string()
}

fn require_email(errors: &mut FieldErrors, raw: &str) -> Option<Email> {
    if raw.trim().is_empty() {
        errors.push("email", "Email is required");
        return None;
    }
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.push("email", format!("Email is invalid: {e}"));
            None
        }
    }
}

/// Product create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub price: String,
    pub image: String,
    pub description: String,
}

impl ProductDraft {
    /// Draft from raw form values.
    #[must_use]
    pub fn from_form(name: &str, price: &str, image: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            price: price.to_string(),
            image: image.to_string(),
            description: description.to_string(),
        }
    }

    /// Pre-fill an edit form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product
                .price
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            image: product.image.clone().unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
        }
    }

    /// Validate into an API body.
    ///
    /// A blank or zero price is treated as "no price".
    ///
    /// # Errors
    ///
    /// Returns the field errors when the name is blank or the price is not a
    /// non-negative number.
    pub fn validate(&self) -> Result<ProductPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = require(&mut errors, "name", "Name", &self.name);

        let price = match optional(&self.price).map(|raw| Price::parse(&raw)) {
            None => None,
            Some(Ok(p)) if p.is_zero() => None,
            Some(Ok(p)) => Some(p),
            Some(Err(PriceError::TooLarge)) => {
                errors.push(
                    "price",
                    format!("Price cannot exceed {}", Price::from_units(Price::MAX_UNITS)),
                );
                None
            }
            Some(Err(_)) => {
                errors.push("price", "Price must be a non-negative number");
                None
            }
        };

        errors.finish(|| ProductPayload {
            name,
            price,
            image: optional(&self.image),
            description: optional(&self.description),
        })
    }
}

/// User create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

impl UserDraft {
    #[must_use]
    pub fn from_form(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self::from_form(&user.name, &user.email)
    }

    /// Validate into an API body.
    ///
    /// # Errors
    ///
    /// Returns the field errors when either field is blank or the email is
    /// malformed.
    pub fn validate(&self) -> Result<UserPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = require(&mut errors, "name", "Name", &self.name);
        let email = require_email(&mut errors, &self.email);
        match email {
            Some(email) => errors.finish(|| UserPayload { name, email }),
            None => Err(errors),
        }
    }
}

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// Body of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl RegisterRequest {
    /// The login that follows a successful registration.
    #[must_use]
    pub fn login(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Login form.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    #[must_use]
    pub fn from_form(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns the field errors when either field is blank or the email is
    /// malformed.
    pub fn validate(&self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = require_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }
        match email {
            Some(email) => errors.finish(|| LoginRequest {
                email,
                password: self.password.clone(),
            }),
            None => Err(errors),
        }
    }
}

/// Registration form.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Registration {
    #[must_use]
    pub fn from_form(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns the field errors when any field is blank or the email is
    /// malformed.
    pub fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = require(&mut errors, "name", "Name", &self.name);
        let email = require_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }
        match email {
            Some(email) => errors.finish(|| RegisterRequest {
                name,
                email,
                password: self.password.clone(),
            }),
            None => Err(errors),
        }
    }
}
