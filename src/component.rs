use async_trait::async_trait;
use std::error::Error;

/// Lifecycle seam driven by the host service framework.
///
/// The host calls `on_async_init` once the event loop is running,
/// `on_async_cleanup` when it is about to stop servicing the component,
/// and `drain` when it wants in-flight work flushed. Lifecycle calls are
/// expected to run to completion once invoked; there is no mid-operation
/// cancellation contract.
#[async_trait]
pub trait ServiceComponent: Send + Sync {
    /// Bring the component up against the running event loop.
    ///
    /// **Returns**
    /// - `Ok(())` once the component is ready for steady-state use.
    /// - `Err(..)` if startup is impossible (unsupported configuration,
    ///   socket failure). The host should treat this as fatal.
    async fn on_async_init(&self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Tear the component down ahead of event-loop shutdown.
    async fn on_async_cleanup(&self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any in-flight work.
    ///
    /// Default implementation is a no-op: a datagram transport hands
    /// each payload to the kernel on send and has no flush primitive.
    async fn drain(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
