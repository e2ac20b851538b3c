//! Shared test utilities for bridge-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use bridge_core::enums::TargetEntity;
    use bridge_core::statement::TargetStatement;

    use crate::BridgeDb;
    use crate::executor::Executor;
    use crate::remote::{LibsqlRemoteWriter, RemoteError, RemoteWriter};
    use crate::service::SyncService;
    use crate::target::TargetDb;

    /// In-memory source and target wired through a libSQL writer.
    pub async fn test_service() -> (SyncService, Arc<TargetDb>) {
        let target = Arc::new(TargetDb::open_local(":memory:").await.unwrap());
        let writer = LibsqlRemoteWriter::new(target.clone());
        let (svc, _) = test_service_with_writer(writer).await;
        (svc, target)
    }

    /// In-memory source with a caller-supplied writer.
    pub async fn test_service_with_writer<W: RemoteWriter + 'static>(
        writer: W,
    ) -> (SyncService, Arc<W>) {
        let source = BridgeDb::open_local(":memory:").await.unwrap();
        let writer = Arc::new(writer);
        let executor = Executor::new(writer.clone(), Duration::from_secs(2));
        (SyncService::new(source, executor), writer)
    }

    /// Always fails with the configured error.
    pub struct FailingWriter {
        error: RemoteError,
    }

    impl FailingWriter {
        pub fn unreachable() -> Self {
            Self {
                error: RemoteError::Unreachable("connection refused".into()),
            }
        }
    }

    #[async_trait]
    impl RemoteWriter for FailingWriter {
        async fn apply(&self, _statement: &TargetStatement) -> Result<u64, RemoteError> {
            Err(self.error.clone())
        }

        async fn exists(&self, _target_type: TargetEntity, _target_id: &str) -> Result<bool, RemoteError> {
            Err(self.error.clone())
        }
    }

    /// Sleeps before succeeding; used to trip the executor timeout.
    pub struct SlowWriter {
        delay: Duration,
    }

    impl SlowWriter {
        pub const fn new(delay: Duration) -> Self {
            Self { delay }
        }
    }

    #[async_trait]
    impl RemoteWriter for SlowWriter {
        async fn apply(&self, _statement: &TargetStatement) -> Result<u64, RemoteError> {
            tokio::time::sleep(self.delay).await;
            Ok(1)
        }

        async fn exists(&self, _target_type: TargetEntity, _target_id: &str) -> Result<bool, RemoteError> {
            tokio::time::sleep(self.delay).await;
            Ok(true)
        }
    }

    /// Delegates to a libSQL writer unless switched off.
    pub struct ToggleWriter {
        inner: LibsqlRemoteWriter,
        down: AtomicBool,
    }

    impl ToggleWriter {
        pub fn new(target: Arc<TargetDb>) -> Self {
            Self {
                inner: LibsqlRemoteWriter::new(target),
                down: AtomicBool::new(false),
            }
        }

        pub fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), RemoteError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(RemoteError::Unreachable("target offline".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteWriter for ToggleWriter {
        async fn apply(&self, statement: &TargetStatement) -> Result<u64, RemoteError> {
            self.check()?;
            self.inner.apply(statement).await
        }

        async fn exists(&self, target_type: TargetEntity, target_id: &str) -> Result<bool, RemoteError> {
            self.check()?;
            self.inner.exists(target_type, target_id).await
        }
    }
}
