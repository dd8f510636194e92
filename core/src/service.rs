use tracing::{error, info};

use crate::errors::Result;

/// Lifecycle handle of the framework that delivers invocations.
#[allow(async_fn_in_trait)]
pub trait FunctionService {
    /// Serves invocations until the framework stops.
    async fn start(&mut self) -> Result<()>;

    /// Releases the framework's resources.
    async fn close(&mut self) -> Result<()>;
}

/// Runs `service` to completion. A failure while serving is logged and ends
/// the run; `close` is awaited regardless.
pub async fn run_service<S: FunctionService>(service: &mut S) -> Result<()> {
    info!("Starting function service");
    if let Err(e) = service.start().await {
        error!(kind = e.kind(), "Function service failed: {}", e);
    }

    service.close().await.inspect_err(|e| {
        error!("Failed to close function service: {}", e);
    })?;
    info!("Function service stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FunctionError;

    #[derive(Default)]
    struct RecordingService {
        fail_start: bool,
        fail_close: bool,
        started: bool,
        closed: bool,
    }

    impl FunctionService for RecordingService {
        async fn start(&mut self) -> Result<()> {
            self.started = true;
            if self.fail_start {
                return Err(FunctionError::Generic(anyhow::anyhow!("transport lost")));
            }
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            self.closed = true;
            if self.fail_close {
                return Err(FunctionError::Io(std::io::Error::other("flush failed")));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_clean_run_closes() {
        let mut service = RecordingService::default();
        run_service(&mut service).await.unwrap();
        assert!(service.started);
        assert!(service.closed);
    }

    #[tokio::test]
    async fn test_start_failure_is_swallowed_and_closes() {
        let mut service = RecordingService {
            fail_start: true,
            ..Default::default()
        };
        run_service(&mut service).await.unwrap();
        assert!(service.closed);
    }

    #[tokio::test]
    async fn test_close_failure_is_returned() {
        let mut service = RecordingService {
            fail_close: true,
            ..Default::default()
        };
        let err = run_service(&mut service).await.unwrap_err();
        assert!(matches!(err, FunctionError::Io(_)));
    }
}
