use crate::{Error, Value, commands::KeyCommands};

/// 列表族命令
pub trait ListCommands: KeyCommands {
    async fn lpush(&self, value: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("LPUSH", &[value.into()]).await
    }

    async fn rpush(&self, value: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("RPUSH", &[value.into()]).await
    }

    async fn lpop(&self) -> Result<Option<String>, Error> {
        self.invoke("LPOP", &[]).await
    }

    async fn rpop(&self) -> Result<Option<String>, Error> {
        self.invoke("RPOP", &[]).await
    }

    async fn llen(&self) -> Result<u64, Error> {
        self.invoke("LLEN", &[]).await
    }

    async fn lrange(&self, start: i64, stop: i64) -> Result<Vec<String>, Error> {
        self.invoke("LRANGE", &[start.into(), stop.into()]).await
    }

    async fn lindex(&self, index: i64) -> Result<Option<String>, Error> {
        self.invoke("LINDEX", &[index.into()]).await
    }

    async fn lset(&self, index: i64, value: impl Into<Value> + Send) -> Result<(), Error> {
        self.invoke("LSET", &[index.into(), value.into()]).await
    }

    async fn lrem(&self, count: i64, value: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("LREM", &[count.into(), value.into()]).await
    }

    async fn ltrim(&self, start: i64, stop: i64) -> Result<(), Error> {
        self.invoke("LTRIM", &[start.into(), stop.into()]).await
    }
}
