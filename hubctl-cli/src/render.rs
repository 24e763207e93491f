//! Value rendering
//!
//! Turns parameter and output values into display text. Secret values are
//! masked unless secrets were requested, in which case their plaintext is
//! looked up. A failed lookup never interrupts rendering: the value degrades
//! to a placeholder and the failure is kept for the caller to report after
//! the whole document has been printed.

use hubctl_client::SecretResolver;
use hubctl_core::domain::instance::{Output, Parameter};
use hubctl_core::domain::value::{Value, ValueKind};
use thiserror::Error;

/// Shown in place of a secret when secrets are not requested
pub const SECRET_MASK: &str = "(secret)";

/// Shown in place of a secret whose plaintext could not be retrieved
pub const UNRESOLVED_SECRET: &str = "(unresolved secret)";

/// A value that could not be rendered faithfully
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to retrieve secret `{reference}` from `{resource}`: {message}")]
pub struct RenderError {
    pub resource: String,
    pub reference: String,
    pub message: String,
}

/// Render a single value
///
/// The secret collaborator is only consulted for secret values when
/// `show_secrets` is set.
pub async fn render_value(
    secrets: &dyn SecretResolver,
    resource_path: &str,
    kind: Option<&ValueKind>,
    value: Option<&Value>,
    show_secrets: bool,
) -> (String, Option<RenderError>) {
    let is_secret = kind.is_some_and(ValueKind::is_secret);
    if !is_secret {
        return (value.map(Value::to_string).unwrap_or_default(), None);
    }
    if !show_secrets {
        return (SECRET_MASK.to_string(), None);
    }

    let Some(reference) = value.and_then(Value::secret_ref) else {
        let error = RenderError {
            resource: resource_path.to_string(),
            reference: value.map(Value::to_string).unwrap_or_default(),
            message: "value carries no secret reference".to_string(),
        };
        return (UNRESOLVED_SECRET.to_string(), Some(error));
    };

    match secrets.resolve_secret(resource_path, reference).await {
        Ok(plaintext) => (plaintext, None),
        Err(err) => {
            let error = RenderError {
                resource: resource_path.to_string(),
                reference: reference.to_string(),
                message: err.to_string(),
            };
            (UNRESOLVED_SECRET.to_string(), Some(error))
        }
    }
}

/// Renders parameter and output entries, collecting failures on the side
pub struct ValueRenderer<'a> {
    secrets: &'a dyn SecretResolver,
    show_secrets: bool,
    errors: Vec<RenderError>,
}

impl<'a> ValueRenderer<'a> {
    pub fn new(secrets: &'a dyn SecretResolver, show_secrets: bool) -> Self {
        Self {
            secrets,
            show_secrets,
            errors: Vec::new(),
        }
    }

    /// Render one output as `kind component:name: value [brief] *messenger*`
    pub async fn output(&mut self, resource_path: &str, output: &Output) -> String {
        let title = title(output.kind.as_ref(), &output.component, &output.name);
        let text = self
            .value(resource_path, output.kind.as_ref(), output.value.as_ref())
            .await;
        let annotations = format!(
            "{}{}",
            bracketed(&output.brief),
            starred(&output.messenger)
        );
        entry(&title, &text, &annotations)
    }

    /// Render one parameter as `kind component:name: value [origin] *messenger* <= from`
    pub async fn parameter(&mut self, resource_path: &str, parameter: &Parameter) -> String {
        let title = title(
            parameter.kind.as_ref(),
            &parameter.component,
            &parameter.name,
        );
        let text = self
            .value(resource_path, parameter.kind.as_ref(), parameter.value.as_ref())
            .await;
        let from = if parameter.from.is_empty() {
            String::new()
        } else {
            format!(" <= {}", parameter.from)
        };
        let annotations = format!(
            "{}{}{}",
            bracketed(&parameter.origin),
            starred(&parameter.messenger),
            from
        );
        entry(&title, &text, &annotations)
    }

    /// Failures collected while rendering
    pub fn into_errors(self) -> Vec<RenderError> {
        self.errors
    }

    async fn value(
        &mut self,
        resource_path: &str,
        kind: Option<&ValueKind>,
        value: Option<&Value>,
    ) -> String {
        let (text, error) =
            render_value(self.secrets, resource_path, kind, value, self.show_secrets).await;
        if let Some(error) = error {
            self.errors.push(error);
        }
        text
    }
}

fn title(kind: Option<&ValueKind>, component: &str, name: &str) -> String {
    let kind = kind.map(ValueKind::as_str).unwrap_or_default();
    let component = if component.is_empty() {
        String::new()
    } else {
        format!("{}:", component)
    };
    format!("{:>7} {}{}:", kind, component, name)
}

fn bracketed(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!(" [{}]", s)
    }
}

fn starred(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!(" *{}*", s)
    }
}

/// Lay out an entry; multi-line text is fenced with `~~`
fn entry(title: &str, text: &str, annotations: &str) -> String {
    if text.contains('\n') {
        let maybe_nl = if text.ends_with('\n') { "" } else { "\n" };
        format!("{} ~~{} {}{}~~", title, annotations, text, maybe_nl)
    } else {
        format!("{} {}{}", title, text, annotations)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use hubctl_client::{ClientError, Result};
    use std::sync::Mutex;

    /// Secret resolver answering from a fixed table and counting calls
    #[derive(Default)]
    pub(crate) struct StaticSecrets {
        pub(crate) known: Vec<(String, String)>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl StaticSecrets {
        pub(crate) fn with(reference: &str, plaintext: &str) -> Self {
            Self {
                known: vec![(reference.to_string(), plaintext.to_string())],
                ..Default::default()
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SecretResolver for StaticSecrets {
        async fn resolve_secret(&self, _resource_path: &str, value_ref: &str) -> Result<String> {
            self.calls.lock().unwrap().push(value_ref.to_string());
            self.known
                .iter()
                .find(|(reference, _)| reference == value_ref)
                .map(|(_, plaintext)| plaintext.clone())
                .ok_or_else(|| ClientError::unexpected_status("fetching secret", 404, &[200]))
        }
    }

    fn secret_kind() -> ValueKind {
        ValueKind::Secret
    }

    #[tokio::test]
    async fn test_plain_values() {
        let secrets = StaticSecrets::default();
        let number: Value = serde_json::from_str("3").unwrap();

        let (text, error) = render_value(&secrets, "r", None, Some(&number), true).await;
        assert_eq!(text, "3");
        assert!(error.is_none());

        let (text, _) = render_value(&secrets, "r", None, None, false).await;
        assert_eq!(text, "");
        assert_eq!(secrets.call_count(), 0);
    }

    #[tokio::test]
    async fn test_masked_secret_never_calls_resolver() {
        let secrets = StaticSecrets::with("abc", "hunter2");
        let value = Value::from("abc");

        let (text, error) =
            render_value(&secrets, "r", Some(&secret_kind()), Some(&value), false).await;

        assert_eq!(text, SECRET_MASK);
        assert!(error.is_none());
        assert_eq!(secrets.call_count(), 0);
    }

    #[tokio::test]
    async fn test_shown_secret_is_resolved() {
        let secrets = StaticSecrets::with("abc", "hunter2");
        let value: Value = serde_json::from_str(r#"{"secret": "abc"}"#).unwrap();

        let (text, error) =
            render_value(&secrets, "r", Some(&secret_kind()), Some(&value), true).await;

        assert_eq!(text, "hunter2");
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn test_failed_lookup_degrades() {
        let secrets = StaticSecrets::default();
        let value = Value::from("missing");

        let (text, error) = render_value(
            &secrets,
            "hub/api/v1/instances/42",
            Some(&secret_kind()),
            Some(&value),
            true,
        )
        .await;

        assert_eq!(text, UNRESOLVED_SECRET);
        let error = error.unwrap();
        assert_eq!(error.reference, "missing");
        assert_eq!(error.resource, "hub/api/v1/instances/42");
    }

    #[tokio::test]
    async fn test_output_entry_layout() {
        let secrets = StaticSecrets::default();
        let mut renderer = ValueRenderer::new(&secrets, false);
        let output = Output {
            name: "url".to_string(),
            component: "ingress".to_string(),
            kind: Some(ValueKind::from("text")),
            value: Some(Value::from("https://app")),
            brief: "Application URL".to_string(),
            messenger: "ops".to_string(),
        };

        let line = renderer.output("r", &output).await;

        assert_eq!(line, "   text ingress:url: https://app [Application URL] *ops*");
    }

    #[tokio::test]
    async fn test_multiline_output_is_fenced() {
        let secrets = StaticSecrets::default();
        let mut renderer = ValueRenderer::new(&secrets, false);
        let output = Output {
            name: "ca".to_string(),
            value: Some(Value::from("line1\nline2")),
            brief: "CA".to_string(),
            ..Default::default()
        };

        let line = renderer.output("r", &output).await;

        assert_eq!(line, "        ca: ~~ [CA] line1\nline2\n~~");
    }

    #[tokio::test]
    async fn test_parameter_annotations() {
        let secrets = StaticSecrets::default();
        let mut renderer = ValueRenderer::new(&secrets, true);
        let parameter = Parameter {
            name: "password".to_string(),
            kind: Some(ValueKind::Secret),
            value: Some(Value::from("nope")),
            from: "env.password".to_string(),
            origin: "default".to_string(),
            ..Default::default()
        };

        let line = renderer.parameter("r", &parameter).await;

        assert_eq!(
            line,
            format!(" secret password: {} [default] <= env.password", UNRESOLVED_SECRET)
        );
        assert_eq!(renderer.into_errors().len(), 1);
    }
}
