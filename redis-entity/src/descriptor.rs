use regex::Regex;

use crate::{
    Error,
    key::{self, AttrMap, KeyBuilder},
};

/// 实体类型的键元信息，定义一次后不可变
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    key_pattern: String,
    attributes: Vec<String>,
    key_regex: Regex,
    example: Option<String>,
    description: Option<String>,
}

impl TypeDescriptor {
    pub fn builder(key_pattern: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            key_pattern: key_pattern.into(),
            key_regex: None,
            example: None,
            description: None,
        }
    }

    pub fn key_pattern(&self) -> &str {
        &self.key_pattern
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn key_regex(&self) -> &Regex {
        &self.key_regex
    }

    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn build_key(&self, attr_map: &AttrMap) -> Result<String, Error> {
        KeyBuilder::new(&self.key_pattern, attr_map).build()
    }

    pub fn matches(&self, key: &str) -> bool {
        self.key_regex.is_match(key)
    }

    /// 校验字面键并按顺序取出捕获组
    pub fn capture(&self, key: &str) -> Result<Vec<String>, Error> {
        let Some(caps) = self.key_regex.captures(key) else {
            return Err(Error::InvalidKey {
                pattern: self.key_pattern.clone(),
                key: key.to_string(),
            });
        };
        Ok(caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().to_string())
            .collect())
    }

    /// 按属性顺序代入值，调用方负责值的个数
    pub fn render(&self, values: &[&str]) -> String {
        let mut key = self.key_pattern.clone();
        for (attr, value) in self.attributes.iter().zip(values) {
            key = key.replace(&format!("{{{attr}}}"), value);
        }
        key
    }

    pub fn search_pattern(&self, filters: &AttrMap) -> String {
        key::search_pattern(&self.key_pattern, filters)
    }
}

#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    key_pattern: String,
    key_regex: Option<Regex>,
    example: Option<String>,
    description: Option<String>,
}

impl TypeDescriptorBuilder {
    /// 自定义键正则，必须在 example 之前声明
    pub fn regex(mut self, source: &str) -> Result<Self, Error> {
        if self.example.is_some() {
            return Err(Error::OutOfOrderConfig);
        }
        self.key_regex = Some(Regex::new(source)?);
        Ok(self)
    }

    /// 示例键，声明时立即按当前生效的正则校验
    pub fn example(mut self, example: impl Into<String>) -> Result<Self, Error> {
        let example = example.into();
        let regex = self.effective_regex()?;
        if !regex.is_match(&example) {
            return Err(Error::InvalidExample {
                example,
                regex: regex.to_string(),
            });
        }
        self.example = Some(example);
        Ok(self)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn build(self) -> Result<TypeDescriptor, Error> {
        let attributes = key::key_attributes(&self.key_pattern);
        // 占位符重名在定义期直接拒绝
        for (index, attr) in attributes.iter().enumerate() {
            if attributes[..index].contains(attr) {
                return Err(Error::DuplicateAttribute(attr.clone()));
            }
        }

        let key_regex = match self.key_regex {
            Some(regex) => regex,
            None => key::derived_regex(&self.key_pattern)?,
        };

        Ok(TypeDescriptor {
            key_pattern: self.key_pattern,
            attributes,
            key_regex,
            example: self.example,
            description: self.description,
        })
    }

    fn effective_regex(&self) -> Result<Regex, Error> {
        match &self.key_regex {
            Some(regex) => Ok(regex.clone()),
            None => Ok(key::derived_regex(&self.key_pattern)?),
        }
    }
}
