use crate::{Error, commands::KeyCommands};

/// 位图族命令
pub trait BitmapCommands: KeyCommands {
    async fn setbit(&self, offset: u64, bit: bool) -> Result<bool, Error> {
        self.invoke("SETBIT", &[offset.into(), bit.into()]).await
    }

    async fn getbit(&self, offset: u64) -> Result<bool, Error> {
        self.invoke("GETBIT", &[offset.into()]).await
    }

    async fn bitcount(&self) -> Result<u64, Error> {
        self.invoke("BITCOUNT", &[]).await
    }
}
