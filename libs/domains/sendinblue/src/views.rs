//! View rendering for free-form messages.
//!
//! `Mailer::compose` with a view name renders the view's html and text
//! parts through a [`ViewRenderer`]. [`ViewEngine`] is the Handlebars-based
//! default: a view `welcome` is made of the templates `welcome_html` and
//! `welcome_text`, either of which may be missing.

use crate::error::{SendinblueError, SendinblueResult};
use handlebars::{Handlebars, no_escape};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Rendered view content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedView {
    pub html: Option<String>,
    pub text: Option<String>,
}

/// Renders named views into message bodies.
#[cfg_attr(test, mockall::automock)]
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, params: &Value) -> SendinblueResult<RenderedView>;
}

/// Handlebars view engine.
///
/// Html parts are rendered with HTML escaping, text parts raw.
#[derive(Clone)]
pub struct ViewEngine {
    html: Arc<Handlebars<'static>>,
    text: Arc<Handlebars<'static>>,
}

impl Default for ViewEngine {
    fn default() -> Self {
        let mut text = Handlebars::new();
        text.register_escape_fn(no_escape);

        Self {
            html: Arc::new(Handlebars::new()),
            text: Arc::new(text),
        }
    }
}

impl ViewEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view from its html and/or text template source.
    pub fn register_view(
        &mut self,
        name: &str,
        html: Option<&str>,
        text: Option<&str>,
    ) -> SendinblueResult<()> {
        if html.is_none() && text.is_none() {
            return Err(SendinblueError::TemplateError(format!(
                "View '{}' needs an html or a text template",
                name
            )));
        }

        for (part, registry, source) in [
            ("html", &mut self.html, html),
            ("text", &mut self.text, text),
        ] {
            if let Some(source) = source {
                Arc::make_mut(registry)
                    .register_template_string(&format!("{}_{}", name, part), source)
                    .map_err(|e| {
                        SendinblueError::TemplateError(format!(
                            "Failed to register {}_{}: {}",
                            name, part, e
                        ))
                    })?;
            }
        }

        Ok(())
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.html.has_template(&format!("{}_html", name))
            || self.text.has_template(&format!("{}_text", name))
    }

    fn render_part(
        registry: &Handlebars<'static>,
        name: &str,
        part: &str,
        params: &Value,
    ) -> SendinblueResult<Option<String>> {
        let template = format!("{}_{}", name, part);
        if !registry.has_template(&template) {
            return Ok(None);
        }
        Ok(Some(registry.render(&template, params)?))
    }
}

impl ViewRenderer for ViewEngine {
    fn render(&self, view: &str, params: &Value) -> SendinblueResult<RenderedView> {
        if !self.has_view(view) {
            return Err(SendinblueError::TemplateError(format!(
                "View '{}' is not registered",
                view
            )));
        }

        debug!(view = %view, "Rendering view");

        let html = Self::render_part(&self.html, view, "html", params)?;
        let text = match Self::render_part(&self.text, view, "text", params)? {
            Some(text) => Some(text),
            None => html.as_deref().map(html_to_text),
        };

        Ok(RenderedView { html, text })
    }
}

/// Plain-text fallback for a view with only an html part.
///
/// Drops `<head>`, `<style>` and `<script>` blocks and tags, turns block
/// ends into line breaks and collapses blank lines.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let after = &rest[start..];
        let Some(end) = after.find('>') else {
            text.push_str(after);
            rest = "";
            break;
        };

        let tag = after[1..end].trim().to_ascii_lowercase();
        let name = tag
            .split(|c: char| c.is_whitespace() || c == '/')
            .find(|s| !s.is_empty())
            .unwrap_or("");

        if matches!(name, "head" | "style" | "script") && !tag.starts_with('/') {
            let closing = format!("</{}", name);
            match after.to_ascii_lowercase().find(&closing) {
                Some(close) => {
                    let tail = &after[close..];
                    let skip = tail.find('>').map(|i| close + i + 1).unwrap_or(after.len());
                    rest = &after[skip..];
                }
                None => rest = "",
            }
            continue;
        }

        let block = matches!(
            name,
            "br" | "p" | "div" | "tr" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        );
        if block && (name == "br" || tag.starts_with('/'))
        {
            text.push('\n');
        }

        rest = &after[end + 1..];
    }
    text.push_str(rest);

    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
