//! Markup renderers.
//!
//! [`MarkupRenderer`] substitutes `{{placeholders}}`, checks that tags are
//! balanced and points relative asset links at the delivery server.
//! [`PassthroughRenderer`] hands material back untouched.

use tracing::debug;

use quizforge_core::traits::{RenderContext, Renderer};
use quizforge_core::RenderError;

use crate::error::MarkupError;

/// Relative prefix of packaged assets inside authored material.
pub const DEFAULT_ASSET_PREFIX: &str = "webcontent/";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const LINK_ATTRIBUTES: &[&str] = &["src=\"", "href=\"", "src='", "href='"];

/// Returns material unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughRenderer;

impl Renderer for PassthroughRenderer {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn render(&self, _ctx: &RenderContext<'_>, raw: &str) -> Result<String, RenderError> {
        Ok(raw.to_string())
    }
}

/// Renders authored HTML fragments for delivery.
#[derive(Debug, Clone)]
pub struct MarkupRenderer {
    check_balance: bool,
    asset_prefix: String,
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupRenderer {
    pub fn new() -> Self {
        Self {
            check_balance: true,
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
        }
    }

    /// Turn tag balance checking on or off.
    pub fn with_balance_check(mut self, enabled: bool) -> Self {
        self.check_balance = enabled;
        self
    }

    /// Change the relative prefix that marks packaged assets.
    pub fn with_asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_prefix = prefix.into();
        self
    }

    fn substitute(&self, ctx: &RenderContext<'_>, raw: &str) -> Result<String, MarkupError> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            out.push_str(&rest[..start]);

            let name = rest[start + 2..start + 2 + len].trim();
            let value = match name {
                "server_url" => ctx.server_url.trim_end_matches('/'),
                "theme" => ctx.theme_id,
                "resource" => ctx.resource.id.as_str(),
                "resource_title" => ctx.resource.title.as_str(),
                other => return Err(MarkupError::UnknownPlaceholder(other.to_string())),
            };
            out.push_str(value);
            rest = &rest[start + len + 4..];
        }

        out.push_str(rest);
        Ok(out)
    }

    fn rewrite_assets(&self, ctx: &RenderContext<'_>, html: String) -> String {
        if self.asset_prefix.is_empty() || !html.contains(self.asset_prefix.as_str()) {
            return html;
        }

        let base = format!(
            "{}/{}/{}",
            ctx.server_url.trim_end_matches('/'),
            ctx.resource.id,
            self.asset_prefix
        );

        LINK_ATTRIBUTES.iter().fold(html, |acc, attr| {
            acc.replace(
                &format!("{attr}{}", self.asset_prefix),
                &format!("{attr}{base}"),
            )
        })
    }
}

impl Renderer for MarkupRenderer {
    fn name(&self) -> &str {
        "markup"
    }

    fn render(&self, ctx: &RenderContext<'_>, raw: &str) -> Result<String, RenderError> {
        let html = self.substitute(ctx, raw)?;
        if self.check_balance {
            check_balance(&html)?;
        }
        let html = self.rewrite_assets(ctx, html);
        debug!(resource = %ctx.resource.id, bytes = html.len(), "rendered markup");
        Ok(html)
    }
}

/// Verify every non-void element is closed in order.
///
/// A `<` not followed by a letter, `/`, `!` or `?` is treated as text.
pub fn check_balance(html: &str) -> Result<(), MarkupError> {
    let mut open: Vec<String> = Vec::new();
    let mut offset = 0;

    while let Some(pos) = html[offset..].find('<') {
        let start = offset + pos;
        let rest = &html[start..];

        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or(MarkupError::UnterminatedTag { offset: start })?;
            offset = start + end + 3;
            continue;
        }

        let opens_tag = rest[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        if !opens_tag {
            offset = start + 1;
            continue;
        }

        let end = rest
            .find('>')
            .ok_or(MarkupError::UnterminatedTag { offset: start })?;
        let inner = &rest[1..end];
        offset = start + end + 1;

        if inner.starts_with('!') || inner.starts_with('?') {
            continue;
        }

        if let Some(closing) = inner.strip_prefix('/') {
            let tag = tag_name(closing);
            match open.pop() {
                Some(expected) if expected == tag => {}
                Some(expected) => {
                    return Err(MarkupError::MismatchedTag {
                        expected,
                        found: tag,
                    })
                }
                None => return Err(MarkupError::UnexpectedClosingTag { tag }),
            }
        } else {
            let tag = tag_name(inner);
            if inner.ends_with('/') || VOID_ELEMENTS.contains(&tag.as_str()) {
                continue;
            }
            open.push(tag);
        }
    }

    match open.pop() {
        Some(tag) => Err(MarkupError::UnclosedTag { tag }),
        None => Ok(()),
    }
}

fn tag_name(s: &str) -> String {
    s.trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | ':'))
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizforge_core::model::ResourceRef;

    fn resource() -> ResourceRef {
        ResourceRef {
            id: "chem-101".into(),
            title: "Chemistry".into(),
        }
    }

    fn ctx(resource: &ResourceRef) -> RenderContext<'_> {
        RenderContext {
            resource,
            server_url: "https://learn.example.edu/",
            theme_id: "dark",
        }
    }

    #[test]
    fn passthrough_is_identity() {
        let r = resource();
        let out = PassthroughRenderer.render(&ctx(&r), "<p>{{theme}}").unwrap();
        assert_eq!(out, "<p>{{theme}}");
    }

    #[test]
    fn substitutes_placeholders() {
        let r = resource();
        let out = MarkupRenderer::new()
            .render(
                &ctx(&r),
                "<p>{{ resource_title }} on {{server_url}} ({{theme}}, {{resource}})</p>",
            )
            .unwrap();
        assert_eq!(
            out,
            "<p>Chemistry on https://learn.example.edu (dark, chem-101)</p>"
        );
    }

    #[test]
    fn unknown_placeholder_fails() {
        let r = resource();
        let err = MarkupRenderer::new()
            .render(&ctx(&r), "<p>{{student}}</p>")
            .unwrap_err();
        assert!(err.message.contains("{{student}}"));
    }

    #[test]
    fn unterminated_placeholder_is_text() {
        let r = resource();
        let out = MarkupRenderer::new().render(&ctx(&r), "<p>{{ open</p>").unwrap();
        assert_eq!(out, "<p>{{ open</p>");
    }

    #[test]
    fn rewrites_asset_links() {
        let r = resource();
        let out = MarkupRenderer::new()
            .render(
                &ctx(&r),
                r#"<img src="webcontent/cell.png"/><a href='webcontent/a.pdf'>a</a><a href="https://x/webcontent/b">b</a>"#,
            )
            .unwrap();
        assert!(out.contains(r#"src="https://learn.example.edu/chem-101/webcontent/cell.png""#));
        assert!(out.contains("href='https://learn.example.edu/chem-101/webcontent/a.pdf'"));
        assert!(out.contains(r#"href="https://x/webcontent/b""#));
    }

    #[test]
    fn balance_accepts_well_formed_markup() {
        assert!(check_balance("<p>a<br>b<em>c</em></p><!-- <div> --><img src='x'>").is_ok());
        assert!(check_balance("<P>x</p>").is_ok());
        assert!(check_balance("3 < 5 and 6 > 2").is_ok());
        assert!(check_balance("<custom-el/>").is_ok());
    }

    #[test]
    fn balance_reports_problems() {
        assert_eq!(
            check_balance("<p><em>x</p>"),
            Err(MarkupError::MismatchedTag {
                expected: "em".into(),
                found: "p".into()
            })
        );
        assert_eq!(
            check_balance("<div>"),
            Err(MarkupError::UnclosedTag { tag: "div".into() })
        );
        assert_eq!(
            check_balance("</span>"),
            Err(MarkupError::UnexpectedClosingTag { tag: "span".into() })
        );
        assert_eq!(
            check_balance("ok <p"),
            Err(MarkupError::UnterminatedTag { offset: 3 })
        );
    }

    #[test]
    fn balance_check_can_be_disabled() {
        let r = resource();
        let out = MarkupRenderer::new()
            .with_balance_check(false)
            .render(&ctx(&r), "<p>open")
            .unwrap();
        assert_eq!(out, "<p>open");
        assert!(MarkupRenderer::new().render(&ctx(&r), "<p>open").is_err());
    }

    #[test]
    fn custom_asset_prefix() {
        let r = resource();
        let out = MarkupRenderer::new()
            .with_asset_prefix("assets/")
            .render(&ctx(&r), r#"<img src="assets/a.png">"#)
            .unwrap();
        assert_eq!(
            out,
            r#"<img src="https://learn.example.edu/chem-101/assets/a.png">"#
        );
    }
}
