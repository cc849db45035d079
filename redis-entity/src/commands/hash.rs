use crate::{Error, Value, commands::KeyCommands};

/// 哈希族命令
pub trait HashCommands: KeyCommands {
    async fn hget(&self, field: &str) -> Result<Option<String>, Error> {
        self.invoke("HGET", &[field.into()]).await
    }

    async fn hset(&self, field: &str, value: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("HSET", &[field.into(), value.into()]).await
    }

    async fn hsetnx(&self, field: &str, value: impl Into<Value> + Send) -> Result<bool, Error> {
        self.invoke("HSETNX", &[field.into(), value.into()]).await
    }

    async fn hdel(&self, field: &str) -> Result<u64, Error> {
        self.invoke("HDEL", &[field.into()]).await
    }

    async fn hexists(&self, field: &str) -> Result<bool, Error> {
        self.invoke("HEXISTS", &[field.into()]).await
    }

    async fn hgetall(&self) -> Result<Vec<(String, String)>, Error> {
        self.invoke("HGETALL", &[]).await
    }

    async fn hkeys(&self) -> Result<Vec<String>, Error> {
        self.invoke("HKEYS", &[]).await
    }

    async fn hvals(&self) -> Result<Vec<String>, Error> {
        self.invoke("HVALS", &[]).await
    }

    async fn hlen(&self) -> Result<u64, Error> {
        self.invoke("HLEN", &[]).await
    }

    async fn hincrby(&self, field: &str, delta: i64) -> Result<i64, Error> {
        self.invoke("HINCRBY", &[field.into(), delta.into()]).await
    }
}
