use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ServiceIdentity;
use crate::record::LogRecord;

/// Serialized wire form of a log record.
///
/// The field list is the wire contract: every key is always present so
/// that collectors can distinguish null from absent. `exc_info` and
/// `stack_info` are always null (they are not safely serializable),
/// `args` is always empty (the message is pre-formatted), and a rendered
/// exception string lands in `exc_text` instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordPayload {
    pub name: String,
    pub msg: String,
    pub args: Vec<serde_json::Value>,
    pub levelname: String,
    pub levelno: i64,
    pub pathname: Option<String>,
    pub filename: Option<String>,
    pub module: Option<String>,
    pub lineno: Option<u32>,
    #[serde(rename = "funcName")]
    pub func_name: Option<String>,
    pub created: f64,
    pub msecs: f64,
    #[serde(rename = "relativeCreated")]
    pub relative_created: f64,
    pub thread: Option<u64>,
    #[serde(rename = "threadName")]
    pub thread_name: Option<String>,
    #[serde(rename = "processName")]
    pub process_name: Option<String>,
    pub process: Option<u32>,
    pub stack_info: Option<String>,
    pub exc_info: Option<serde_json::Value>,
    pub exc_text: Option<String>,
    pub chain: Option<Vec<String>>,
    pub service_uuid: Uuid,
    pub service_name: String,
    pub service_type: String,
    pub node_id: String,
}

impl RecordPayload {
    fn from_record(record: &LogRecord, identity: &ServiceIdentity) -> Self {
        let msg = match &record.chain {
            Some(chain) if !chain.is_empty() => {
                format!("[{}] {}", chain.join(":"), record.msg)
            }
            _ => record.msg.clone(),
        };

        RecordPayload {
            name: record.name.clone(),
            msg,
            args: Vec::new(),
            levelname: record.levelname.clone(),
            levelno: record.levelno,
            pathname: record.pathname.clone(),
            filename: record.filename.clone(),
            module: record.module.clone(),
            lineno: record.lineno,
            func_name: record.func_name.clone(),
            created: record.created,
            msecs: record.msecs,
            relative_created: record.relative_created,
            thread: record.thread,
            thread_name: record.thread_name.clone(),
            process_name: record.process_name.clone(),
            process: record.process,
            stack_info: None,
            exc_info: None,
            exc_text: record.exc_info.as_ref().map(|exc| exc.render()),
            chain: record.chain.clone(),
            service_uuid: identity.service_uuid,
            service_name: identity.service_name.clone(),
            service_type: identity.service_type.clone(),
            node_id: identity.node_id.clone(),
        }
    }
}

/// Normalize a log record into its wire payload bytes.
///
/// **Parameters**
/// - `record`: the source [`LogRecord`], read-only.
/// - `identity`: the emitting service's [`ServiceIdentity`], injected
///   into every payload.
///
/// **Returns**
/// - The compact JSON encoding of the payload. Never fails: if
///   serialization goes wrong, a best-effort placeholder document
///   carrying the error text and the service identity is produced
///   instead, so a malformed record can never abort the caller's
///   logging call.
pub fn normalize(record: &LogRecord, identity: &ServiceIdentity) -> Vec<u8> {
    let payload = RecordPayload::from_record(record, identity);
    serde_json::to_vec(&payload).unwrap_or_else(|err| fallback_payload(identity, &err))
}

fn fallback_payload(identity: &ServiceIdentity, err: &serde_json::Error) -> Vec<u8> {
    let doc = serde_json::json!({
        "name": "log_shipper",
        "msg": format!("log record serialization failed: {}", err),
        "levelname": "ERROR",
        "levelno": 40,
        "service_uuid": identity.service_uuid,
        "service_name": identity.service_name,
        "service_type": identity.service_type,
        "node_id": identity.node_id,
    });
    serde_json::to_vec(&doc).unwrap_or_default()
}
