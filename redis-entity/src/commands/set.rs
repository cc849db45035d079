use crate::{Error, Value, commands::KeyCommands};

/// 集合族命令
pub trait SetCommands: KeyCommands {
    async fn sadd(&self, member: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("SADD", &[member.into()]).await
    }

    async fn srem(&self, member: impl Into<Value> + Send) -> Result<u64, Error> {
        self.invoke("SREM", &[member.into()]).await
    }

    async fn sismember(&self, member: impl Into<Value> + Send) -> Result<bool, Error> {
        self.invoke("SISMEMBER", &[member.into()]).await
    }

    async fn smembers(&self) -> Result<Vec<String>, Error> {
        self.invoke("SMEMBERS", &[]).await
    }

    async fn scard(&self) -> Result<u64, Error> {
        self.invoke("SCARD", &[]).await
    }

    async fn spop(&self) -> Result<Option<String>, Error> {
        self.invoke("SPOP", &[]).await
    }
}
