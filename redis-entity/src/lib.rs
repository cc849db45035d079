mod descriptor;
mod enumerator;
mod error;
mod key;
mod mem;
mod store;
mod value;

pub mod commands;

pub use commands::{
    BitmapCommands, HashCommands, HyperLogLogCommands, KeyCommands, ListCommands, SetCommands,
    SortedSetCommands, StringCommands,
};
pub use descriptor::{TypeDescriptor, TypeDescriptorBuilder};
pub use enumerator::Enumerator;
pub use error::Error;
pub use key::{AttrMap, KeyBuilder, key_attributes};
pub use mem::MemoryStore;
pub use redis_entity_derive::RedisEntity;
pub use store::{RedisStore, SCAN_START, SCAN_TERMINAL, Store, StoreHandle};
pub use value::{FromValue, Value};

// derive 宏展开里要用
pub use inventory;

use std::sync::RwLock;

// 进程级默认客户端：启动时配置一次，之后只读；后写覆盖先写
static DEFAULT_STORE: RwLock<Option<StoreHandle>> = RwLock::new(None);

pub fn configure(store: StoreHandle) {
    *DEFAULT_STORE.write().unwrap() = Some(store);
}

pub fn default_store() -> Result<StoreHandle, Error> {
    DEFAULT_STORE
        .read()
        .unwrap()
        .clone()
        .ok_or(Error::NotConfigured)
}

/// RedisEntity trait 定义了键类型实体的基本接口
pub trait RedisEntity: Sized {
    /// 返回类型的键元信息
    fn descriptor() -> &'static TypeDescriptor;

    /// 用字面键和按序捕获的属性值组装实体
    fn from_parts(key: String, values: Vec<String>) -> Self;

    /// 实体当前指向的字面键
    fn key(&self) -> String;

    /// 实例级客户端覆盖
    fn client_override(&self) -> Option<StoreHandle> {
        None
    }

    /// 类型级默认客户端
    fn type_client() -> Option<StoreHandle> {
        None
    }

    /// 从字面键构造，先过键正则再按序填属性
    fn from_key(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        let values = Self::descriptor().capture(&key)?;
        Ok(Self::from_parts(key, values))
    }

    /// 从属性表构造，走同一条字面键校验路径
    fn from_map(attr_map: &AttrMap) -> Result<Self, Error> {
        let key = Self::descriptor().build_key(attr_map)?;
        Self::from_key(key)
    }

    /// 解析客户端：实例覆盖 -> 类型默认 -> 进程默认
    fn client(&self) -> Result<StoreHandle, Error> {
        if let Some(client) = self.client_override() {
            return Ok(client);
        }
        if let Some(client) = Self::type_client() {
            return Ok(client);
        }
        default_store()
    }

    /// 不设上限的过滤枚举
    fn query(filters: AttrMap) -> Result<Enumerator<Self>, Error> {
        Enumerator::new(filters, -1, None)
    }
}

// 实体类型元信息，由 derive 宏登记
pub struct EntityMeta {
    pub type_path: &'static str,
    pub key_pattern: &'static str,
}

impl std::fmt::Debug for EntityMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EntityMeta {{ type_path: {}, key_pattern: {} }}",
            self.type_path, self.key_pattern
        )
    }
}

// 用 inventory 收集所有实体类型
inventory::collect!(EntityMeta);

// 列出已注册的实体类型
pub fn all_entities() -> std::collections::HashMap<&'static str, &'static str> {
    inventory::iter::<EntityMeta>()
        .map(|meta| (meta.type_path, meta.key_pattern))
        .collect()
}
