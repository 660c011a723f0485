//! The curl command descriptor and its renderer.
//!
//! # Design
//! `CurlBuilder` is configured through `&mut self` setters that return
//! `&mut Self`, so calls chain and the same value can be rendered any number
//! of times. Rendering reads the descriptor without changing it; the only
//! exception is a stream body, which is drained by the first render.
//!
//! Token order is fixed: program, `-k` for `https://` URLs, `-X <method>`,
//! `-d <body>`, `-H` headers sorted by name, form tokens sorted by field
//! name, and the URL last. Headers and form fields are sorted explicitly so
//! the output never depends on insertion order.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::body::Body;
use crate::error::CurlError;
use crate::escape::{escape, mask};
use crate::form::FormType;

/// Program name emitted as the first token.
pub const PROGRAM: &str = "curl";

/// Method used until `set_method` is called.
pub const DEFAULT_METHOD: &str = "GET";

/// Builds a curl command line reproducing an HTTP request.
#[derive(Debug)]
pub struct CurlBuilder {
    url: String,
    method: String,
    body: Option<Body>,
    headers: Vec<(String, String)>,
    form_type: Option<FormType>,
    form_values: Vec<(String, String)>,
    secrets: HashSet<String>,
}

impl Default for CurlBuilder {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: DEFAULT_METHOD.to_string(),
            body: None,
            headers: Vec::new(),
            form_type: None,
            form_values: Vec::new(),
            secrets: HashSet::new(),
        }
    }
}

impl CurlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    /// Set the method token. It is rendered verbatim.
    pub fn set_method(&mut self, method: impl Into<String>) -> &mut Self {
        self.method = method.into();
        self
    }

    /// Replace the body. The last body set wins.
    pub fn set_body(&mut self, body: impl Into<Body>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Replace the body with the canonical JSON encoding of `value`.
    pub fn set_json_body<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.body = Some(Body::json(value));
        self
    }

    /// Replace the body with a reader drained on the first render.
    pub fn set_stream_body(&mut self, reader: impl Read + Send + 'static) -> &mut Self {
        self.body = Some(Body::stream(reader));
        self
    }

    /// Replace the headers with a flat `key, value, key, value, ...` list.
    ///
    /// Keys may repeat; values for the same key are rendered together.
    pub fn set_headers<I, S>(&mut self, headers: I) -> Result<&mut Self, CurlError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = into_pairs("set_headers", headers)?;
        Ok(self)
    }

    /// Replace the headers with already paired values.
    pub fn set_header_pairs<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Replace the form fields with a flat `key, value, ...` list encoded as
    /// `form_type`.
    pub fn set_form_values<I, S>(
        &mut self,
        form_type: FormType,
        values: I,
    ) -> Result<&mut Self, CurlError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.form_values = into_pairs("set_form_values", values)?;
        self.form_type = Some(form_type);
        Ok(self)
    }

    /// Mark header or form field names whose values are masked. Adds to the
    /// names already marked. Header names match regardless of ASCII case;
    /// form field names must match exactly.
    pub fn set_secret<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secrets.extend(names.into_iter().map(Into::into));
        self
    }

    /// Render the command line.
    pub fn render(&self) -> String {
        let mut tokens = vec![PROGRAM.to_string()];

        if self.url.starts_with("https://") {
            tokens.push("-k".to_string());
        }

        tokens.push(format!("-X {}", self.method));

        if let Some(body) = &self.body {
            let content = body.content();
            if !content.is_empty() {
                tokens.push(format!("-d {}", escape(&String::from_utf8_lossy(&content))));
            }
        }

        for (key, value) in self.header_groups() {
            tokens.push(format!("-H {}", escape(&format!("{key}: {value}"))));
        }

        self.push_form_tokens(&mut tokens);

        tokens.push(escape(&self.url));
        tokens.join(" ")
    }

    /// Header names compare ASCII-case-insensitively.
    fn is_secret_header(&self, name: &str) -> bool {
        self.secrets
            .iter()
            .any(|secret| secret.eq_ignore_ascii_case(name))
    }

    /// Form field names compare exactly.
    fn is_secret_field(&self, name: &str) -> bool {
        self.secrets.contains(name)
    }

    /// Header values grouped by name (names ascending, values in the order
    /// given, joined with a space). Secret groups are masked as a whole.
    fn header_groups(&self) -> Vec<(&str, String)> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (key, value) in &self.headers {
            groups.entry(key.as_str()).or_default().push(value.as_str());
        }
        groups
            .into_iter()
            .map(|(key, values)| {
                let joined = values.join(" ");
                if self.is_secret_header(key) {
                    (key, mask(&joined))
                } else {
                    (key, joined)
                }
            })
            .collect()
    }

    fn push_form_tokens(&self, tokens: &mut Vec<String>) {
        let Some(form_type) = self.form_type else {
            return;
        };
        if self.form_values.is_empty() {
            return;
        }

        let mut fields: Vec<(&str, String)> = self
            .form_values
            .iter()
            .map(|(key, value)| {
                if self.is_secret_field(key) {
                    (key.as_str(), mask(value))
                } else {
                    (key.as_str(), value.clone())
                }
            })
            .collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        match form_type {
            FormType::Urlencoded => {
                let encoded = fields
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>()
                    .join("&");
                tokens.push(format!("-d \"{encoded}\""));
            }
            FormType::Multipart => {
                for (key, value) in fields {
                    tokens.push(format!("-F {}", escape(&format!("{key}={value}"))));
                }
            }
        }
    }
}

impl fmt::Display for CurlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Split a flat list into `(key, value)` pairs, rejecting odd lengths.
fn into_pairs<I, S>(setter: &'static str, values: I) -> Result<Vec<(String, String)>, CurlError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values: Vec<String> = values.into_iter().map(Into::into).collect();
    if values.len() % 2 != 0 {
        return Err(CurlError::UnpairedValues {
            setter,
            count: values.len(),
        });
    }
    let mut pairs = Vec::with_capacity(values.len() / 2);
    let mut values = values.into_iter();
    while let (Some(key), Some(value)) = (values.next(), values.next()) {
        pairs.push((key, value));
    }
    Ok(pairs)
}
