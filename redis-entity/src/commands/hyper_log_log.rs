use crate::{Error, Value, commands::KeyCommands};

/// HyperLogLog 族命令
pub trait HyperLogLogCommands: KeyCommands {
    async fn pfadd(&self, member: impl Into<Value> + Send) -> Result<bool, Error> {
        self.invoke("PFADD", &[member.into()]).await
    }

    async fn pfcount(&self) -> Result<u64, Error> {
        self.invoke("PFCOUNT", &[]).await
    }

    /// 把 source_keys 合并进自己的键
    async fn pfmerge(&self, source_keys: &[&str]) -> Result<(), Error> {
        let args = source_keys
            .iter()
            .map(|key| Value::from(*key))
            .collect::<Vec<_>>();
        self.invoke("PFMERGE", &args).await
    }
}
