use std::sync::Arc;

use async_trait::async_trait;
use log::trace;
use redis::aio::ConnectionManager;

use crate::{Error, Value};

/// 扫描游标的起始哨兵
pub const SCAN_START: u64 = 0;
/// 游标回到 0 表示整个键空间走完
pub const SCAN_TERMINAL: u64 = 0;

/// 底层存储只被消费两种操作：游标扫描和单键命令转发
#[async_trait]
pub trait Store: Send + Sync {
    /// 一轮游标扫描，pattern 是存储原生的 glob 匹配串
    async fn scan(&self, cursor: u64, pattern: &str) -> Result<(u64, Vec<String>), Error>;

    /// 任意单键命令，key 永远是第一个位置参数
    async fn invoke(&self, command: &str, key: &str, args: &[Value]) -> Result<Value, Error>;
}

pub type StoreHandle = Arc<dyn Store>;

#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    pub async fn connect(url: &str) -> Result<Self, Error> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }

    pub fn handle(self) -> StoreHandle {
        Arc::new(self)
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn scan(&self, cursor: u64, pattern: &str) -> Result<(u64, Vec<String>), Error> {
        let mut conn = self.manager.clone();
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .query_async(&mut conn)
            .await?;
        trace!("scan {pattern:?} cursor {cursor} -> {} keys", keys.len());
        Ok((next, keys))
    }

    async fn invoke(&self, command: &str, key: &str, args: &[Value]) -> Result<Value, Error> {
        let mut conn = self.manager.clone();
        let mut cmd = redis::cmd(command);
        cmd.arg(key);
        for arg in args {
            append_arg(&mut cmd, arg);
        }
        let reply: redis::Value = cmd.query_async(&mut conn).await?;
        Ok(convert_reply(reply))
    }
}

fn append_arg(cmd: &mut redis::Cmd, value: &Value) {
    match value {
        Value::Nil => {
            cmd.arg("");
        }
        Value::Okay => {
            cmd.arg("OK");
        }
        Value::Int(n) => {
            cmd.arg(*n);
        }
        Value::Text(s) => {
            cmd.arg(s.as_str());
        }
        Value::Bytes(b) => {
            cmd.arg(&b[..]);
        }
        Value::Array(items) => {
            for item in items {
                append_arg(cmd, item);
            }
        }
    }
}

fn convert_reply(value: redis::Value) -> Value {
    match value {
        redis::Value::Nil => Value::Nil,
        redis::Value::Okay => Value::Okay,
        redis::Value::Int(n) => Value::Int(n),
        redis::Value::SimpleString(s) => Value::Text(s),
        redis::Value::BulkString(b) => Value::Bytes(b),
        redis::Value::Array(items) => {
            Value::Array(items.into_iter().map(convert_reply).collect())
        }
        redis::Value::Map(pairs) => Value::Array(
            pairs
                .into_iter()
                .flat_map(|(k, v)| [convert_reply(k), convert_reply(v)])
                .collect(),
        ),
        redis::Value::Set(items) => Value::Array(items.into_iter().map(convert_reply).collect()),
        redis::Value::Double(d) => Value::Text(d.to_string()),
        redis::Value::Boolean(b) => Value::Int(b as i64),
        // 其余 RESP3 扩展类型这一层用不到
        _ => Value::Nil,
    }
}
