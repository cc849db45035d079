use crate::{Error, Value, commands::KeyCommands};

/// 字符串族命令
pub trait StringCommands: KeyCommands {
    async fn get(&self) -> Result<Option<String>, Error> {
        self.invoke("GET", &[]).await
    }

    async fn set(&self, value: impl Into<Value> + Send) -> Result<(), Error> {
        self.invoke("SET", &[value.into()]).await
    }

    async fn getset(&self, value: impl Into<Value> + Send) -> Result<Option<String>, Error> {
        self.invoke("GETSET", &[value.into()]).await
    }

    async fn setnx(&self, value: impl Into<Value> + Send) -> Result<bool, Error> {
        self.invoke("SETNX", &[value.into()]).await
    }

    async fn setex(&self, seconds: i64, value: impl Into<Value> + Send) -> Result<(), Error> {
        self.invoke("SETEX", &[seconds.into(), value.into()]).await
    }

    async fn append(&self, value: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("APPEND", &[value.into()]).await
    }

    async fn strlen(&self) -> Result<u64, Error> {
        self.invoke("STRLEN", &[]).await
    }

    async fn getrange(&self, start: i64, end: i64) -> Result<String, Error> {
        self.invoke("GETRANGE", &[start.into(), end.into()]).await
    }

    async fn setrange(&self, offset: i64, value: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("SETRANGE", &[offset.into(), value.into()]).await
    }

    async fn incr(&self) -> Result<i64, Error> {
        self.invoke("INCR", &[]).await
    }

    async fn incrby(&self, delta: i64) -> Result<i64, Error> {
        self.invoke("INCRBY", &[delta.into()]).await
    }

    async fn decr(&self) -> Result<i64, Error> {
        self.invoke("DECR", &[]).await
    }

    async fn decrby(&self, delta: i64) -> Result<i64, Error> {
        self.invoke("DECRBY", &[delta.into()]).await
    }
}
