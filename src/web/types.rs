//! Most of the structs in `web` module and their implementations live here.
//! Includes structs that need to be validated, their parsing implementations and tests for those

use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable signup request.
/// Every field is optional, absent keys are a validation failure, not a deserialization one.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "recaptchaToken")]
    pub recaptcha_token: Option<String>,
}

/// Validated Signup
/// A signup request with all the fields validated
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub name: ValidName,
    pub email: ValidEmail,
    pub captcha_token: CaptchaToken,
}

impl TryFrom<SignupRequest> for ValidSignup {
    type Error = DataParsingError;

    /// The checks run in a fixed order and the first failing one wins.
    fn try_from(req: SignupRequest) -> Result<Self, Self::Error> {
        let name = req.name.filter(|n| !n.is_empty());
        let email = req.email.filter(|e| !e.is_empty());
        let (Some(name), Some(email)) = (name, email) else {
            return Err(DataParsingError::NameOrEmailMissing);
        };

        let captcha_token = CaptchaToken::parse(req.recaptcha_token.unwrap_or_default())?;

        Ok(ValidSignup {
            name: ValidName::parse(name)?,
            email: ValidEmail::parse(email)?,
            captcha_token,
        })
    }
}

/// Validated Signup Email
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    /// `local@domain.tld`: no whitespace, exactly one `@` and a dot somewhere after it.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", value) {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

/// Validated Signup Name
#[derive(Debug, Clone)]
pub struct ValidName(String);

impl AsRef<str> for ValidName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidName {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(DataParsingError::NameOrEmailMissing);
        }

        Ok(ValidName(value.to_owned()))
    }
}

/// The anti-automation token the client got from solving the reCAPTCHA challenge.
/// Only its presence is checked here, the provider decides whether it is valid.
#[derive(Debug, Clone)]
pub struct CaptchaToken(String);

impl AsRef<str> for CaptchaToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl CaptchaToken {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(DataParsingError::CaptchaTokenMissing);
        }

        Ok(CaptchaToken(value.to_owned()))
    }
}

/// The JSON body of a successful signup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub success: bool,
    pub message: &'static str,
    pub signup_id: i64,
    pub email_id: String,
}

impl SignupResponse {
    pub fn new(signup_id: i64, email_id: String) -> Self {
        SignupResponse {
            success: true,
            message: "Successfully subscribed!",
            signup_id,
            email_id,
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("Name and email are required")]
    NameOrEmailMissing,
    #[error("reCAPTCHA verification required")]
    CaptchaTokenMissing,
    #[error("Invalid email address")]
    EmailInvalid,
}
