//! This module provides a service for rendering digest templates using the
//! minijinja templating engine.

use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

/// Name of the plain-text digest template.
pub const TEXT_TEMPLATE: &str = "digest.txt";

/// Name of the HTML digest template. The `.html` suffix turns on
/// auto-escaping.
pub const HTML_TEMPLATE: &str = "digest.html";

const DEFAULT_TEXT: &str = r#"{{ subject }}
Generated at {{ digest.generated_at }}

Summary: {{ digest.total_alerts }} alert(s) on {{ digest.host_count }} host(s)
{% for count in digest.severity_counts %}
  {{ count.label }}: {{ count.count }}
{% endfor %}
{% for section in digest.sections %}

{{ section.marker }} {{ section.label }} ({{ section.alerts | length }})
{% for alert in section.alerts %}
- {{ alert.host }} | {{ alert.widget_title }} | {{ alert.metric }} = {{ alert.value }} ({{ alert.threshold }}) at {{ alert.received_at }}
{% for key, value in alert.context | items %}
    {{ key }}: {{ value }}
{% endfor %}
{% endfor %}
{% endfor %}
"#;

const DEFAULT_HTML: &str = r#"<html>
<body style="font-family: sans-serif;">
<h2>{{ subject }}</h2>
<p>Generated at {{ digest.generated_at }}</p>
<ul>
{% for count in digest.severity_counts %}
<li>{{ count.label }}: {{ count.count }}</li>
{% endfor %}
</ul>
{% for section in digest.sections %}
<h3 style="color: {{ section.color }};">{{ section.label }} ({{ section.alerts | length }})</h3>
<table border="1" cellpadding="4" cellspacing="0">
<tr><th>Host</th><th>Widget</th><th>Metric</th><th>Value</th><th>Threshold</th><th>Received</th><th>Details</th></tr>
{% for alert in section.alerts %}
<tr>
<td>{{ alert.host }}</td>
<td>{{ alert.widget_title }}</td>
<td>{{ alert.metric }}</td>
<td>{{ alert.value }}</td>
<td>{{ alert.threshold }}</td>
<td>{{ alert.received_at }}</td>
<td>{% for key, value in alert.context | items %}{{ key }}: {{ value }}<br>{% endfor %}</td>
</tr>
{% endfor %}
</table>
{% endfor %}
</body>
</html>
"#;

/// A service for rendering the digest templates.
pub struct TemplateService {
    env: Environment<'static>,
}

/// Error type for the TemplateService.
#[derive(Debug, Error)]
pub enum TemplateServiceError {
    /// An error occurred while compiling or rendering a template.
    #[error("Failed to render template: {0}")]
    RenderError(#[from] minijinja::Error),
}

impl TemplateService {
    /// Creates a `TemplateService` with the built-in digest templates.
    pub fn new() -> Self {
        Self::with_overrides(None, None).expect("built-in digest templates are valid")
    }

    /// Creates a `TemplateService`, replacing the built-in text and/or HTML
    /// template with the given sources.
    pub fn with_overrides(
        text: Option<String>,
        html: Option<String>,
    ) -> Result<Self, TemplateServiceError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        match text {
            Some(source) => env.add_template_owned(TEXT_TEMPLATE, source)?,
            None => env.add_template(TEXT_TEMPLATE, DEFAULT_TEXT)?,
        }
        match html {
            Some(source) => env.add_template_owned(HTML_TEMPLATE, source)?,
            None => env.add_template(HTML_TEMPLATE, DEFAULT_HTML)?,
        }

        Ok(Self { env })
    }

    /// Renders the named template with the given context.
    pub fn render<S: Serialize>(
        &self,
        name: &str,
        context: S,
    ) -> Result<String, TemplateServiceError> {
        tracing::debug!(template = name, "Rendering template.");

        let template = self.env.get_template(name)?;
        match template.render(context) {
            Ok(rendered) => Ok(rendered),
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {}", name, e);
                Err(TemplateServiceError::RenderError(e))
            }
        }
    }
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}
