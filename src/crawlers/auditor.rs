use crate::browser::{BrowsingContext, CaptureArea, Session};
use crate::config::AuditConfig;
use crate::errors::AuditError;
use crate::parsers::{self, DomSnapshot};
use crate::results::{AuditResult, ExtractedMetadata, PageAudit, PageTarget, Screenshot};
use crate::utils::screenshot_path;
use std::path::Path;
use url::Url;

/// Audits one target at a time: a desktop pass that navigates, captures and
/// extracts, then an independent mobile pass that re-navigates and captures.
///
/// Screenshots written before a failure stay on disk; the result is still a
/// failure.
pub struct PageAuditor<'a> {
    session: &'a Session,
    config: &'a AuditConfig,
    origin: Url,
}

impl<'a> PageAuditor<'a> {
    pub fn new(session: &'a Session, config: &'a AuditConfig) -> Result<Self, AuditError> {
        Ok(Self {
            session,
            config,
            origin: config.origin()?,
        })
    }

    /// Audit `target`. Every per-target failure becomes a failure result.
    pub async fn audit(&self, target: &PageTarget) -> AuditResult {
        match self.try_audit(target).await {
            Ok(page) => {
                ::log::info!(
                    "Audited {} ({}), status {}",
                    target.name,
                    target.url,
                    page.status_code
                );
                AuditResult::Success(page)
            }
            Err(e) => {
                let result = AuditResult::failure(target, &e);
                ::log::warn!("Audit of {} ({}) failed: {}", result.name(), result.url(), e);
                result
            }
        }
    }

    async fn try_audit(&self, target: &PageTarget) -> Result<PageAudit, AuditError> {
        let url = Url::parse(&target.url).map_err(|e| AuditError::Navigation {
            url: target.url.clone(),
            message: e.to_string(),
        })?;

        let mut context = self.session.open_context(self.config.desktop).await?;
        let desktop = self.desktop_pass(context.as_mut(), target, &url).await;
        self.session.release(context).await;
        let (status_code, metadata, mut screenshots) = desktop?;

        let mut context = self.session.open_context(self.config.mobile).await?;
        let mobile = self.mobile_pass(context.as_mut(), target, &url).await;
        self.session.release(context).await;
        screenshots.extend(mobile?);

        Ok(PageAudit {
            url: target.url.clone(),
            name: target.name.clone(),
            status_code,
            metadata,
            screenshots,
        })
    }

    async fn desktop_pass(
        &self,
        context: &mut dyn BrowsingContext,
        target: &PageTarget,
        url: &Url,
    ) -> Result<(u16, ExtractedMetadata, Vec<Screenshot>), AuditError> {
        let status = self.session.navigate(context, url).await?;
        let screenshots =
            capture_screenshots(context, &self.config.output_dir, &target.name, "desktop").await?;

        let capture = context.capture().await?;
        let snapshot = DomSnapshot::from_capture(capture);
        let metadata = parsers::extract(&snapshot, &self.origin);

        Ok((status, metadata, screenshots))
    }

    async fn mobile_pass(
        &self,
        context: &mut dyn BrowsingContext,
        target: &PageTarget,
        url: &Url,
    ) -> Result<Vec<Screenshot>, AuditError> {
        self.session.navigate(context, url).await?;
        capture_screenshots(context, &self.config.output_dir, &target.name, "mobile").await
    }
}

/// Write the above-the-fold and full-page screenshots tagged `tag` and `{tag}_full`
async fn capture_screenshots(
    context: &mut dyn BrowsingContext,
    dir: &Path,
    name: &str,
    tag: &str,
) -> Result<Vec<Screenshot>, AuditError> {
    let mut written = Vec::with_capacity(2);
    for (area, viewport) in [
        (CaptureArea::Viewport, tag.to_string()),
        (CaptureArea::FullPage, format!("{}_full", tag)),
    ] {
        let path = screenshot_path(dir, name, &viewport);
        let png = context
            .screenshot(area)
            .await
            .map_err(|e| AuditError::Screenshot {
                path: path.clone(),
                message: e.to_string(),
            })?;
        tokio::fs::write(&path, png)
            .await
            .map_err(|e| AuditError::Screenshot {
                path: path.clone(),
                message: e.to_string(),
            })?;
        ::log::debug!("Wrote {}", path.display());
        written.push(Screenshot { viewport, path });
    }
    Ok(written)
}
