//! Provider family dispatch table.
//!
//! Each family maps a set of model-name prefixes to an endpoint, an auth
//! attachment style, and the minimal request body that elicits a definitive
//! answer. Adding a provider is a data addition here plus catalog lines,
//! not new branching logic.

use crate::ProbeRequest;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Value, json};

/// Characters escaped when a model id is interpolated into a URL path.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Prompt used by every probe body: the cheapest request that still
/// exercises the credential.
const PROBE_PROMPT: &str = "Just say OK";

/// How the secret travels with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <secret>`.
    Bearer,
    /// A custom header carrying the raw secret.
    Header(&'static str),
}

/// A provider family: prefix match, endpoint, auth style, and probe body.
pub struct ProviderFamily {
    /// Family name, matching the model catalog key.
    pub name: &'static str,
    /// Model-name prefixes claimed by this family.
    pub prefixes: &'static [&'static str],
    /// How the secret is attached.
    pub auth: AuthStyle,
    /// Fixed headers beyond auth and content type.
    pub extra_headers: &'static [(&'static str, &'static str)],
    endpoint: fn(&str) -> String,
    body: fn(&str) -> Value,
}

/// Families with a configured probe endpoint. Models outside every family
/// here are unsupported and never probed.
pub const FAMILIES: &[ProviderFamily] = &[
    ProviderFamily {
        name: "gemini",
        prefixes: &["gemini"],
        auth: AuthStyle::Header("x-goog-api-key"),
        extra_headers: &[],
        endpoint: gemini_endpoint,
        body: gemini_body,
    },
    ProviderFamily {
        name: "openai",
        prefixes: &["gpt"],
        auth: AuthStyle::Bearer,
        extra_headers: &[],
        endpoint: openai_endpoint,
        body: openai_body,
    },
    ProviderFamily {
        name: "claude",
        prefixes: &["claude"],
        auth: AuthStyle::Header("x-api-key"),
        extra_headers: &[("anthropic-version", "2023-06-01")],
        endpoint: claude_endpoint,
        body: claude_body,
    },
];

impl ProviderFamily {
    /// Find the family claiming `model` by prefix.
    pub fn for_model(model: &str) -> Option<&'static ProviderFamily> {
        FAMILIES
            .iter()
            .find(|f| f.prefixes.iter().any(|p| model.starts_with(p)))
    }

    /// Assemble the probe request for `model` with `secret` attached.
    pub fn request(&self, secret: &str, model: &str) -> ProbeRequest {
        let mut headers: Vec<(&'static str, String)> =
            vec![("content-type", "application/json".to_owned())];
        match self.auth {
            AuthStyle::Bearer => headers.push(("authorization", format!("Bearer {secret}"))),
            AuthStyle::Header(name) => headers.push((name, secret.to_owned())),
        }
        for (name, value) in self.extra_headers {
            headers.push((name, (*value).to_owned()));
        }
        ProbeRequest {
            url: (self.endpoint)(model),
            headers,
            body: (self.body)(model),
        }
    }
}

fn gemini_endpoint(model: &str) -> String {
    let encoded = utf8_percent_encode(model, PATH_SEGMENT);
    format!("https://generativelanguage.googleapis.com/v1beta/models/{encoded}:generateContent")
}

fn gemini_body(_model: &str) -> Value {
    json!({ "contents": [{ "parts": [{ "text": PROBE_PROMPT }] }] })
}

fn openai_endpoint(_model: &str) -> String {
    "https://api.openai.com/v1/responses".to_owned()
}

fn openai_body(model: &str) -> Value {
    json!({ "model": model, "input": PROBE_PROMPT })
}

fn claude_endpoint(_model: &str) -> String {
    "https://api.anthropic.com/v1/messages".to_owned()
}

fn claude_body(model: &str) -> Value {
    json!({
        "model": model,
        "max_tokens": 1,
        "messages": [{ "role": "user", "content": PROBE_PROMPT }],
    })
}
