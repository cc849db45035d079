#![allow(async_fn_in_trait)]

mod bitmap;
mod hash;
mod hyper_log_log;
mod list;
mod set;
mod sorted_set;
mod string;

pub use bitmap::BitmapCommands;
pub use hash::HashCommands;
pub use hyper_log_log::HyperLogLogCommands;
pub use list::ListCommands;
pub use set::SetCommands;
pub use sorted_set::SortedSetCommands;
pub use string::StringCommands;

use crate::{Error, FromValue, RedisEntity, Store as _, Value};

/// 所有实体共有的键级命令。每次转发都是一次新的往返，这一层不做缓存。
pub trait KeyCommands: RedisEntity + Sync {
    /// 通用入口：实体的键永远是第一个位置参数
    async fn invoke<R: FromValue>(&self, command: &str, args: &[Value]) -> Result<R, Error> {
        let reply = self.client()?.invoke(command, &self.key(), args).await?;
        R::from_value(reply)
    }

    async fn del(&self) -> Result<u64, Error> {
        self.invoke("DEL", &[]).await
    }

    async fn exists(&self) -> Result<bool, Error> {
        self.invoke("EXISTS", &[]).await
    }

    async fn expire(&self, seconds: i64) -> Result<bool, Error> {
        self.invoke("EXPIRE", &[seconds.into()]).await
    }

    async fn pexpire(&self, milliseconds: i64) -> Result<bool, Error> {
        self.invoke("PEXPIRE", &[milliseconds.into()]).await
    }

    async fn ttl(&self) -> Result<i64, Error> {
        self.invoke("TTL", &[]).await
    }

    async fn pttl(&self) -> Result<i64, Error> {
        self.invoke("PTTL", &[]).await
    }

    async fn persist(&self) -> Result<bool, Error> {
        self.invoke("PERSIST", &[]).await
    }

    async fn rename(&self, new_key: &str) -> Result<(), Error> {
        self.invoke("RENAME", &[new_key.into()]).await
    }

    async fn unlink(&self) -> Result<u64, Error> {
        self.invoke("UNLINK", &[]).await
    }

    async fn touch(&self) -> Result<u64, Error> {
        self.invoke("TOUCH", &[]).await
    }

    /// TYPE，返回存储侧的数据类型名
    async fn value_type(&self) -> Result<String, Error> {
        self.invoke("TYPE", &[]).await
    }
}

impl<T> KeyCommands for T where T: RedisEntity + Sync {}
