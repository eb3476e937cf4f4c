//! Runtime configuration read from the environment.
//!
//! Settings are read once at startup (after loading an optional `.env` file)
//! and passed by reference to the steps that need them. Mail settings are
//! allowed to be missing at startup: the discovery and download steps do not
//! need them, and their absence is only reported when a message is about to
//! be sent.
//!
//! | Variable | Meaning | Required |
//! |----------|---------|----------|
//! | `EMAIL_REMETENTE` | sender address and SMTP login | to send |
//! | `SENHA_REMETENTE` | SMTP password (an app password for Gmail) | to send |
//! | `EMAIL_DESTINATARIO` | recipient address | to send |
//! | `PALAVRAS_CHAVE` | comma-separated keywords; empty disables filtering | no |

use crate::errors::ConfigError;

pub const SENDER_VAR: &str = "EMAIL_REMETENTE";
pub const PASSWORD_VAR: &str = "SENHA_REMETENTE";
pub const RECIPIENT_VAR: &str = "EMAIL_DESTINATARIO";
pub const KEYWORDS_VAR: &str = "PALAVRAS_CHAVE";

/// Everything the pipeline reads from the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub mail: MailConfig,
    /// Keywords a gazette must contain to be sent. Empty means send all.
    pub keywords: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            mail: MailConfig {
                sender: value(SENDER_VAR),
                password: value(PASSWORD_VAR),
                recipient: value(RECIPIENT_VAR),
            },
            keywords: value(KEYWORDS_VAR)
                .map(|raw| parse_keywords(&raw))
                .unwrap_or_default(),
        }
    }
}

/// Mail settings as found in the environment; any of them may be absent.
#[derive(Clone, Default)]
pub struct MailConfig {
    pub sender: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

// The password never reaches the logs.
impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("sender", &self.sender)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("recipient", &self.recipient)
            .finish()
    }
}

/// Complete mail settings, borrowed from a [`MailConfig`].
#[derive(Debug, Clone, Copy)]
pub struct MailSettings<'a> {
    pub sender: &'a str,
    pub password: &'a str,
    pub recipient: &'a str,
}

impl MailConfig {
    /// Check that every mail setting is present.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] naming every absent variable.
    pub fn require(&self) -> Result<MailSettings<'_>, ConfigError> {
        match (&self.sender, &self.password, &self.recipient) {
            (Some(sender), Some(password), Some(recipient)) => Ok(MailSettings {
                sender,
                password,
                recipient,
            }),
            _ => {
                let missing = [
                    (SENDER_VAR, self.sender.is_none()),
                    (PASSWORD_VAR, self.password.is_none()),
                    (RECIPIENT_VAR, self.recipient.is_none()),
                ]
                .into_iter()
                .filter_map(|(var, absent)| absent.then_some(var))
                .collect();
                Err(ConfigError::Missing(missing))
            }
        }
    }
}

/// Split a comma-separated keyword list, dropping blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
