//! Runtime environment for the hosted application.

use std::fmt;

use crate::domain::inputs::TARGET_PORT;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const BUNDESTAG_API_KEY: &str = "BUNDESTAG_API_KEY";

const SECRET_KEYS: &[&str] = &[OPENAI_API_KEY, BUNDESTAG_API_KEY];

/// Optional secrets forwarded verbatim to the application.
#[derive(Default, Clone)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
    pub bundestag_api_key: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("bundestag_api_key", &mask(&self.bundestag_api_key))
            .finish()
    }
}

/// Ordered, key-unique environment variables for the container app.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    vars: Vec<(String, String)>,
}

impl EnvironmentConfig {
    /// Base runtime flags plus any non-empty secret.
    #[must_use]
    pub fn build(secrets: &Secrets) -> Self {
        let mut env = Self { vars: Vec::new() };
        env.set("STREAMLIT_SERVER_HEADLESS", "true");
        env.set("STREAMLIT_SERVER_ENABLE_CORS", "false");
        env.set("STREAMLIT_SERVER_ENABLE_XSRF_PROTECTION", "false");
        env.set("STREAMLIT_SERVER_ADDRESS", "0.0.0.0");
        env.set("STREAMLIT_SERVER_PORT", &TARGET_PORT.to_string());

        for (key, value) in [
            (OPENAI_API_KEY, &secrets.openai_api_key),
            (BUNDESTAG_API_KEY, &secrets.bundestag_api_key),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                env.set(key, v);
            }
        }
        env
    }

    /// Insert or replace `key`, keeping its original position on replace.
    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.vars.iter_mut().find(|(k, _)| k == key) {
            value.clone_into(&mut slot.1);
        } else {
            self.vars.push((key.to_owned(), value.to_owned()));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// `KEY=VALUE` pairs in order, as the control plane expects them.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}

/// Whether a variable holds a secret and must be masked in logs.
#[must_use]
pub fn is_secret(key: &str) -> bool {
    SECRET_KEYS.contains(&key)
}

impl fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(k, v)| (k, if is_secret(k) { "***" } else { v })),
            )
            .finish()
    }
}
