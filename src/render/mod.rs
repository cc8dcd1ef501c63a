//! Markdown rendering collaborator seam.
//!
//! Rendering and sanitizing markdown to safe HTML is an external concern,
//! consumed here as a pure `render(markdown) -> safe html` function behind
//! the [`MarkdownRender`] trait. The pipeline only calls it for readme files.

use anyhow::Result;

/// External markdown rendering and sanitization collaborator.
pub trait MarkdownRender: Send + Sync {
    /// Render markdown to sanitized HTML.
    fn render(&self, markdown: &str) -> Result<String>;
}

/// Renderer that produces no HTML.
///
/// The default wiring: `rendered_html` stays `None` until a real renderer is
/// injected by the deployment.
pub struct NullRender;

impl MarkdownRender for NullRender {
    fn render(&self, _markdown: &str) -> Result<String> {
        anyhow::bail!("no markdown renderer configured")
    }
}

#[cfg(test)]
pub(crate) struct StubRender;

#[cfg(test)]
impl MarkdownRender for StubRender {
    fn render(&self, markdown: &str) -> Result<String> {
        Ok(format!("<article>{markdown}</article>"))
    }
}
