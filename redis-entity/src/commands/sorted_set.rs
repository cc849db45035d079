use crate::{Error, Value, commands::KeyCommands};

/// 有序集合族命令
pub trait SortedSetCommands: KeyCommands {
    async fn zadd(&self, score: f64, member: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("ZADD", &[score.into(), member.into()]).await
    }

    async fn zscore(&self, member: impl Into<Value> + Send) -> Result<Option<f64>, Error> {
        self.invoke("ZSCORE", &[member.into()]).await
    }

    async fn zincrby(&self, delta: f64, member: impl Into<Value> + Send) -> Result<f64, Error> {
        self.invoke("ZINCRBY", &[delta.into(), member.into()]).await
    }

    async fn zrem(&self, member: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("ZREM", &[member.into()]).await
    }

    async fn zcard(&self) -> Result<u64, Error> {
        self.invoke("ZCARD", &[]).await
    }

    async fn zcount(&self, min: f64, max: f64) -> Result<u64, Error> {
        self.invoke("ZCOUNT", &[min.into(), max.into()]).await
    }

    async fn zrange(&self, start: i64, stop: i64) -> Result<Vec<String>, Error> {
        self.invoke("ZRANGE", &[start.into(), stop.into()]).await
    }

    async fn zrevrange(&self, start: i64, stop: i64) -> Result<Vec<String>, Error> {
        self.invoke("ZREVRANGE", &[start.into(), stop.into()]).await
    }

    async fn zrank(&self, member: impl Into<Value> + Send) -> Result<Option<u64>, Error> {
        self.invoke("ZRANK", &[member.into()]).await
    }
}
