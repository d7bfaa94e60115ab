use crate::config::{ConfigError, ServiceIdentity};
use crate::env::{
    env_or, LOG_SHIPPER_NODE_ID_ENV, LOG_SHIPPER_SERVICE_NAME_ENV,
    LOG_SHIPPER_SERVICE_TYPE_ENV, LOG_SHIPPER_URL_ENV,
};
use crate::layer::ShipperLayer;
use crate::sender::LogSender;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;
use uuid::Uuid;

/// Конфигурация слоя логирования.
///
/// Управляет минимальным уровнем событий, уходящих в коллектор, а также
/// тем, нужно ли дополнительно печатать логи в консоль через `fmt`‑слой.
///
/// **Поля**
/// - `min_level`: минимальный уровень `tracing`, при котором событие
///   попадает в [`LogSender`].
/// - `enable_stdout`: если `true`, поверх [`ShipperLayer`] добавляется
///   `tracing_subscriber::fmt::Layer` и события печатаются в консоль.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_level: Level,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_level: Level::INFO,
            enable_stdout: true,
        }
    }
}

/// Initialize global `tracing` subscriber using the provided sender and
/// [`LayerConfig`].
///
/// **Parameters**
/// - `sender`: [`LogSender`] that will receive normalized records.
/// - `config`: [`LayerConfig`] controlling level filtering and console
///   echo.
///
/// **Effects**
///
/// This installs a [`Registry`] combined with [`ShipperLayer`] as the
/// global default subscriber, so all `tracing` events in the process
/// are observed by the layer.
pub fn init_tracing_with_config(sender: Arc<LogSender>, config: LayerConfig) {
    let layer = ShipperLayer::new(sender, config.min_level);

    // Всегда подключаем слой, который шлёт записи во внешний коллектор.
    // Дополнительно, при `enable_stdout = true`, подключаем `fmt`‑слой,
    // чтобы видеть события в консоли. Для совместимости типов собираем
    // subscriber в двух вариантах.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    }
}

/// Initialize tracing with sensible defaults.
///
/// **Parameters**
/// - `sender`: [`LogSender`] that will receive normalized records.
///
/// **Behavior**
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`LayerConfig::default`]. This is the recommended entrypoint for
/// typical microservices.
pub fn init_tracing(sender: Arc<LogSender>) {
    init_tracing_with_config(sender, LayerConfig::default());
}

/// Build a [`LogSender`] from the `LOG_SHIPPER_URL` environment
/// variable, falling back to `udp://127.0.0.1:9999`.
pub fn sender_from_env(identity: ServiceIdentity) -> Result<Arc<LogSender>, ConfigError> {
    let url = env_or(LOG_SHIPPER_URL_ENV, "udp://127.0.0.1:9999");
    Ok(Arc::new(LogSender::new(&url, identity)?))
}

/// Build a [`ServiceIdentity`] from the environment, with the given
/// service UUID. Name, type and node id fall back to generic defaults.
pub fn identity_from_env(service_uuid: Uuid) -> ServiceIdentity {
    ServiceIdentity {
        service_uuid,
        service_name: env_or(LOG_SHIPPER_SERVICE_NAME_ENV, "service"),
        service_type: env_or(LOG_SHIPPER_SERVICE_TYPE_ENV, "generic"),
        node_id: env_or(LOG_SHIPPER_NODE_ID_ENV, "local"),
    }
}
