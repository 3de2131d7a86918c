use std::sync::Arc;

use crate::exec::driver::{Driver, ToolSettings, create_driver};
use crate::exec::executor::{Executor, ToolOutput};
use crate::exec::probe::Prober;
use crate::exec::temp::TempStore;
use crate::foundation::error::{MagickError, MagickResult, UnsupportedKind};

/// Driver, executor and temp store shared read-only by every image of one entry point.
#[derive(Debug)]
pub(crate) struct ToolContext {
    driver: Box<dyn Driver>,
    executor: Arc<dyn Executor>,
    temp: TempStore,
}

impl ToolContext {
    pub(crate) fn new(settings: &ToolSettings, executor: Arc<dyn Executor>) -> MagickResult<Self> {
        settings.validate()?;
        let ctx = Self {
            driver: create_driver(settings.toolchain, settings),
            executor,
            temp: TempStore::new(settings.temp_dir.clone()),
        };
        if settings.check_version {
            ctx.check_version()?;
        }
        Ok(ctx)
    }

    fn check_version(&self) -> MagickResult<()> {
        let found = self.prober().version()?;
        let required = self.driver.min_version();
        if found < required {
            return Err(MagickError::unsupported(
                UnsupportedKind::Toolchain,
                format!(
                    "ImageMagick {found} ({} requires {required} or higher)",
                    self.driver.name()
                ),
            ));
        }
        tracing::debug!(driver = self.driver.name(), %found, "tool version accepted");
        Ok(())
    }

    pub(crate) fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub(crate) fn temp(&self) -> &TempStore {
        &self.temp
    }

    pub(crate) fn prober(&self) -> Prober<'_> {
        Prober::new(self.driver.as_ref(), self.executor.as_ref())
    }

    /// Run a finished argv and fail with the captured stderr on a non-zero exit.
    pub(crate) fn run(&self, argv: &[String]) -> MagickResult<ToolOutput> {
        tracing::debug!(?argv, "executing");
        let out = self.executor.execute(argv)?;
        if !out.success {
            tracing::warn!(code = ?out.code, stderr = %out.stderr_lossy().trim(), "tool failed");
        }
        out.into_result()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/exec/context.rs"]
mod tests;
