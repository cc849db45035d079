use std::marker::PhantomData;
use std::pin::Pin;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use log::debug;
use regex::Regex;

use crate::{
    AttrMap, Error, RedisEntity, Store as _, StoreHandle, default_store,
    store::{SCAN_START, SCAN_TERMINAL},
};

/// 键空间枚举器。搜索模式和客户端在构造时定死，之后不变。
pub struct Enumerator<T> {
    search_pattern: String,
    key_regex: Regex,
    limit: i64,
    client: StoreHandle,
    _marker: PhantomData<T>,
}

impl<T> std::fmt::Debug for Enumerator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enumerator")
            .field("search_pattern", &self.search_pattern)
            .field("key_regex", &self.key_regex)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<T> Enumerator<T>
where
    T: RedisEntity,
{
    /// limit 为负表示不设上限。client 传 None 时按类型默认、进程默认的顺序解析。
    pub fn new(filters: AttrMap, limit: i64, client: Option<StoreHandle>) -> Result<Self, Error> {
        let descriptor = T::descriptor();
        let client = match client.or_else(T::type_client) {
            Some(client) => client,
            None => default_store()?,
        };

        Ok(Self {
            search_pattern: descriptor.search_pattern(&filters),
            key_regex: descriptor.key_regex().clone(),
            limit,
            client,
            _marker: PhantomData,
        })
    }

    pub fn search_pattern(&self) -> &str {
        &self.search_pattern
    }

    /// 匹配键的惰性序列。glob 只是粗过滤，每个候选还要过一遍键正则。
    /// 消费方随时可以停止拉取，后续的扫描轮不会再发出去。
    pub fn keys(&self) -> Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>> {
        let client = self.client.clone();
        let search_pattern = self.search_pattern.clone();
        let key_regex = self.key_regex.clone();
        let limit = self.limit;

        Box::pin(try_stream! {
            let mut cursor = SCAN_START;
            let mut delivered: i64 = 0;

            'scan: loop {
                let (next, batch) = client.scan(cursor, &search_pattern).await?;
                debug!(
                    "scan {search_pattern:?}: {} candidates, cursor {cursor} -> {next}",
                    batch.len()
                );

                for key in batch {
                    // 越限检查在正则之前，比较的是已交付数，
                    // 所以 limit=L 时恰好交付 L+1 个
                    if limit >= 0 && delivered > limit {
                        break 'scan;
                    }
                    if !key_regex.is_match(&key) {
                        continue;
                    }
                    delivered += 1;
                    yield key;
                }

                if next == SCAN_TERMINAL {
                    break;
                }
                cursor = next;
            }
        })
    }

    /// 实体的惰性序列
    pub fn entities(&self) -> Pin<Box<dyn Stream<Item = Result<T, Error>> + Send>>
    where
        T: Send + 'static,
    {
        Box::pin(self.keys().map(|key| key.and_then(|key| T::from_key(key))))
    }

    /// 走完整个遍历，只数个数
    pub async fn count(&self) -> Result<u64, Error> {
        let mut keys = self.keys();
        let mut count = 0;
        while let Some(key) = keys.next().await {
            key?;
            count += 1;
        }
        Ok(count)
    }

    /// 把整个遍历收进内存
    pub async fn all(&self) -> Result<Vec<T>, Error>
    where
        T: Send + 'static,
    {
        let mut entities = self.entities();
        let mut items = Vec::new();
        while let Some(entity) = entities.next().await {
            items.push(entity?);
        }
        Ok(items)
    }

    /// 删掉遍历到的每一个键，返回删除数
    pub async fn flush(&self) -> Result<u64, Error> {
        let mut keys = self.keys();
        let mut deleted = 0;
        while let Some(key) = keys.next().await {
            let key = key?;
            self.client.invoke("DEL", &key, &[]).await?;
            deleted += 1;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, LazyLock};

    use super::*;
    use crate::{MemoryStore, TypeDescriptor};

    struct NameKey {
        language: String,
        order: String,
    }

    impl RedisEntity for NameKey {
        fn descriptor() -> &'static TypeDescriptor {
            static DESCRIPTOR: LazyLock<TypeDescriptor> = LazyLock::new(|| {
                TypeDescriptor::builder("name:{language}:{order}")
                    .build()
                    .unwrap()
            });
            &DESCRIPTOR
        }

        fn from_parts(_key: String, values: Vec<String>) -> Self {
            let mut values = values.into_iter();
            Self {
                language: values.next().unwrap_or_default(),
                order: values.next().unwrap_or_default(),
            }
        }

        fn key(&self) -> String {
            Self::descriptor().render(&[self.language.as_str(), self.order.as_str()])
        }
    }

    // 自定义正则钉死两段，默认正则会放过的 :extra 尾巴在这里被拒绝
    struct StrictNameKey {
        language: String,
        order: String,
    }

    impl RedisEntity for StrictNameKey {
        fn descriptor() -> &'static TypeDescriptor {
            static DESCRIPTOR: LazyLock<TypeDescriptor> = LazyLock::new(|| {
                TypeDescriptor::builder("name:{language}:{order}")
                    .regex(r"^name:([^:]+):([^:]+)$")
                    .unwrap()
                    .build()
                    .unwrap()
            });
            &DESCRIPTOR
        }

        fn from_parts(_key: String, values: Vec<String>) -> Self {
            let mut values = values.into_iter();
            Self {
                language: values.next().unwrap_or_default(),
                order: values.next().unwrap_or_default(),
            }
        }

        fn key(&self) -> String {
            Self::descriptor().render(&[self.language.as_str(), self.order.as_str()])
        }
    }

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::with_page_size(4));
        // 一定命中
        for index in 0..10 {
            store.insert(format!("name:en:{index}"), "john");
        }
        // 只有默认正则会命中
        for index in 0..3 {
            store.insert(format!("name:en:{index}:extra"), "john");
        }
        // 形状不对
        for index in 0..4 {
            store.insert(format!("name:{index}"), "john");
        }
        // 语言不对
        for index in 0..5 {
            store.insert(format!("name:fr:{index}"), "john");
        }
        store
    }

    fn handle(store: &Arc<MemoryStore>) -> StoreHandle {
        store.clone()
    }

    fn en_filter() -> AttrMap {
        [("language".to_string(), "en".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn search_pattern_uses_filters_and_wildcards() {
        let store = Arc::new(MemoryStore::new());
        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();
        assert_eq!(enumerator.search_pattern(), "name:en:*");
    }

    #[tokio::test]
    async fn default_regex_accepts_trailing_segments() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();

        // 10 个规整的 + 3 个带 :extra 的
        assert_eq!(enumerator.count().await.unwrap(), 13);
    }

    #[tokio::test]
    async fn custom_regex_filters_trailing_segments() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<StrictNameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();

        assert_eq!(enumerator.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn derived_operations_agree() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();

        let mut streamed = 0;
        let mut keys = enumerator.keys();
        while let Some(key) = keys.next().await {
            key.unwrap();
            streamed += 1;
        }

        assert_eq!(streamed, 13);
        assert_eq!(enumerator.count().await.unwrap(), 13);
        assert_eq!(enumerator.all().await.unwrap().len(), 13);
    }

    #[tokio::test]
    async fn repeated_walks_are_idempotent() {
        let store = seeded_store();

        let mut first = Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store)))
            .unwrap()
            .all()
            .await
            .unwrap()
            .iter()
            .map(|entity| entity.key())
            .collect::<Vec<_>>();
        let mut second = Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store)))
            .unwrap()
            .all()
            .await
            .unwrap()
            .iter()
            .map(|entity| entity.key())
            .collect::<Vec<_>>();

        // 批次顺序不保证，集合要一致
        first.sort();
        second.sort();
        assert_eq!(first, second);
        assert_eq!(first.len(), 13);
    }

    #[tokio::test]
    async fn entities_are_populated_from_captures() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<StrictNameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();

        for entity in enumerator.all().await.unwrap() {
            assert_eq!(entity.language, "en");
            assert!(entity.order.parse::<u32>().is_ok());
        }
    }

    #[tokio::test]
    async fn limit_delivers_one_past_the_bound() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), 5, Some(handle(&store))).unwrap();

        // 文档化的差一行为：limit=5 交付 6 个
        assert_eq!(enumerator.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn negative_limit_is_unbounded() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();
        assert_eq!(enumerator.count().await.unwrap(), 13);
    }

    #[tokio::test]
    async fn tripping_the_limit_stops_scanning() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), 0, Some(handle(&store))).unwrap();

        assert_eq!(enumerator.count().await.unwrap(), 1);
        // 页大小 4、22 个键本来要 6 轮，第二轮就该停下来
        assert_eq!(store.scan_rounds(), 2);
    }

    #[tokio::test]
    async fn dropping_the_stream_stops_scanning() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();

        {
            let mut keys = enumerator.keys();
            let first = keys.next().await.unwrap().unwrap();
            assert!(first.starts_with("name:en:"));
        }

        // 第一页全是形状不对的键，第二页才吐出第一个条目
        assert_eq!(store.scan_rounds(), 2);
    }

    #[tokio::test]
    async fn flush_deletes_every_matched_key() {
        let store = seeded_store();
        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();

        assert_eq!(enumerator.flush().await.unwrap(), 13);
        assert_eq!(store.len(), 9);

        let enumerator =
            Enumerator::<NameKey>::new(en_filter(), -1, Some(handle(&store))).unwrap();
        assert_eq!(enumerator.count().await.unwrap(), 0);
    }

    #[test]
    fn missing_client_is_rejected_at_construction() {
        // 不碰进程级默认客户端，类型默认也是 None
        let err = Enumerator::<NameKey>::new(en_filter(), -1, None).unwrap_err();
        assert!(matches!(err, Error::NotConfigured));
    }
}
