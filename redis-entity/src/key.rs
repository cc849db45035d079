use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::Error;

/// 属性表：占位符名 -> 字面值
pub type AttrMap = BTreeMap<String, String>;

// 占位符形如 {name}，名字里不允许出现花括号
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// 按首次出现顺序返回模板里的全部占位符名
pub fn key_attributes(key_pattern: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(key_pattern)
        .map(|c| c[1].to_string())
        .collect()
}

pub struct KeyBuilder<'a> {
    pub key_pattern: &'a str,
    pub attr_map: &'a AttrMap,
}

impl<'a> KeyBuilder<'a> {
    pub fn new(key_pattern: &'a str, attr_map: &'a AttrMap) -> Self {
        Self {
            key_pattern,
            attr_map,
        }
    }

    /// 校验通过后才做替换，不会产生替换到一半的键
    pub fn build(&self) -> Result<String, Error> {
        self.validate_attrs()?;
        Ok(self.populate_key())
    }

    fn validate_attrs(&self) -> Result<(), Error> {
        let key_attributes = key_attributes(self.key_pattern);

        let missing = key_attributes
            .iter()
            .filter(|attr| !self.attr_map.contains_key(*attr))
            .cloned()
            .collect::<Vec<_>>();
        let unexpected = self
            .attr_map
            .keys()
            .filter(|name| !key_attributes.contains(name))
            .cloned()
            .collect::<Vec<_>>();

        // 缺失优先于多余
        if !missing.is_empty() {
            return Err(Error::MissingAttributes(missing));
        }
        if !unexpected.is_empty() {
            return Err(Error::UnexpectedAttributes(unexpected));
        }
        Ok(())
    }

    fn populate_key(&self) -> String {
        let mut key = self.key_pattern.to_string();
        for (attr, value) in self.attr_map {
            key = key.replace(&format!("{{{attr}}}"), value);
        }
        key
    }
}

// 默认键正则：字面段转义，每个占位符替换成一个捕获组
pub(crate) fn derived_regex(key_pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::from("^");
    let mut last = 0;
    for m in PLACEHOLDER.find_iter(key_pattern) {
        source.push_str(&regex::escape(&key_pattern[last..m.start()]));
        source.push_str("(.+)");
        last = m.end();
    }
    source.push_str(&regex::escape(&key_pattern[last..]));
    source.push('$');
    Regex::new(&source)
}

// 搜索模式：过滤值直接代入，没约束的占位符用 * 兜底
pub(crate) fn search_pattern(key_pattern: &str, filters: &AttrMap) -> String {
    let mut search = key_pattern.to_string();
    for attr in key_attributes(key_pattern) {
        let value = filters.get(&attr).map(String::as_str).unwrap_or("*");
        search = search.replace(&format!("{{{attr}}}"), value);
    }
    search
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> AttrMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn extracts_attributes_in_order() {
        let attrs = key_attributes("name:{language}:{order}");
        assert_eq!(attrs, vec!["language".to_string(), "order".to_string()]);
        assert!(key_attributes("plain:key").is_empty());
    }

    #[test]
    fn builds_key_from_complete_map() {
        let map = attrs(&[("language", "en"), ("order", "10")]);
        let key = KeyBuilder::new("name:{language}:{order}", &map)
            .build()
            .unwrap();
        assert_eq!(key, "name:en:10");
    }

    #[test]
    fn build_then_capture_round_trips() {
        let map = attrs(&[("language", "en"), ("order", "10")]);
        let key = KeyBuilder::new("name:{language}:{order}", &map)
            .build()
            .unwrap();

        let regex = derived_regex("name:{language}:{order}").unwrap();
        let caps = regex.captures(&key).unwrap();
        assert_eq!(&caps[1], "en");
        assert_eq!(&caps[2], "10");
    }

    #[test]
    fn missing_attributes_are_listed_exactly() {
        let map = attrs(&[("language", "en")]);
        let err = KeyBuilder::new("name:{language}:{order}", &map)
            .build()
            .unwrap_err();
        match err {
            Error::MissingAttributes(names) => assert_eq!(names, vec!["order".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_wins_over_unexpected() {
        // order 缺失的同时 color 多余，先报缺失
        let map = attrs(&[("language", "en"), ("color", "red")]);
        let err = KeyBuilder::new("name:{language}:{order}", &map)
            .build()
            .unwrap_err();
        match err {
            Error::MissingAttributes(names) => assert_eq!(names, vec!["order".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unexpected_attributes_are_listed_exactly() {
        let map = attrs(&[("language", "en"), ("order", "1"), ("color", "red")]);
        let err = KeyBuilder::new("name:{language}:{order}", &map)
            .build()
            .unwrap_err();
        match err {
            Error::UnexpectedAttributes(names) => assert_eq!(names, vec!["color".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn derived_regex_escapes_literal_segments() {
        let regex = derived_regex("v1.cache:{id}").unwrap();
        assert!(regex.is_match("v1.cache:7"));
        // 点号是字面量，不是任意字符
        assert!(!regex.is_match("v1Xcache:7"));
    }

    #[test]
    fn derived_regex_is_anchored() {
        let regex = derived_regex("name:{language}").unwrap();
        assert!(!regex.is_match("prefix:name:en"));
        // (.+) 贪婪，带冒号的尾巴也会被接受
        assert!(regex.is_match("name:en:extra"));
    }

    #[test]
    fn search_pattern_substitutes_filters_and_wildcards() {
        let filters = attrs(&[("language", "en")]);
        let search = search_pattern("name:{language}:{order}", &filters);
        assert_eq!(search, "name:en:*");

        let search = search_pattern("name:{language}:{order}", &AttrMap::new());
        assert_eq!(search, "name:*:*");
    }

    #[test]
    fn search_pattern_ignores_unknown_filter_names() {
        let filters = attrs(&[("language", "en"), ("color", "red")]);
        let search = search_pattern("name:{language}:{order}", &filters);
        assert_eq!(search, "name:en:*");
    }

    #[test]
    fn values_are_substituted_without_escaping() {
        // 值里带分隔符原样代入，歧义由调用方负责
        let map = attrs(&[("language", "en:us"), ("order", "1")]);
        let key = KeyBuilder::new("name:{language}:{order}", &map)
            .build()
            .unwrap();
        assert_eq!(key, "name:en:us:1");
    }
}
