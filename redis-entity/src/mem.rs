use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::{
    Error, Store, Value,
    store::SCAN_TERMINAL,
};

/// 进程内的假存储，测试和演示用。只实现字符串族的一小撮命令。
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, String>>,
    page_size: usize,
    scan_rounds: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        // 和 redis 默认的 COUNT 保持一致
        Self::with_page_size(10)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            data: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
            scan_rounds: AtomicU64::new(0),
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.lock().unwrap().insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 已经发出的扫描轮数，断言惰性行为用
    pub fn scan_rounds(&self) -> u64 {
        self.scan_rounds.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn scan(&self, cursor: u64, pattern: &str) -> Result<(u64, Vec<String>), Error> {
        self.scan_rounds.fetch_add(1, Ordering::Relaxed);

        let data = self.data.lock().unwrap();
        let keys = data.keys().collect::<Vec<_>>();
        let start = (cursor as usize).min(keys.len());
        let end = (start + self.page_size).min(keys.len());

        // 和 redis 一样：先取一页再过滤，所以批可能是空的
        let batch = keys[start..end]
            .iter()
            .filter(|key| glob_match(pattern, key))
            .map(|key| (*key).clone())
            .collect();
        let next = if end >= keys.len() {
            SCAN_TERMINAL
        } else {
            end as u64
        };
        Ok((next, batch))
    }

    async fn invoke(&self, command: &str, key: &str, args: &[Value]) -> Result<Value, Error> {
        let mut data = self.data.lock().unwrap();
        match command.to_ascii_uppercase().as_str() {
            "SET" => {
                data.insert(key.to_string(), arg_string(args, 0)?);
                Ok(Value::Okay)
            }
            "GET" => Ok(data
                .get(key)
                .map(|value| Value::Bytes(value.clone().into_bytes()))
                .unwrap_or(Value::Nil)),
            "DEL" | "UNLINK" => Ok(Value::Int(data.remove(key).is_some() as i64)),
            "EXISTS" => Ok(Value::Int(data.contains_key(key) as i64)),
            "INCR" => {
                let current = match data.get(key) {
                    Some(value) => value
                        .parse::<i64>()
                        .map_err(|_| Error::Store(format!("value is not an integer: {key}")))?,
                    None => 0,
                };
                let next = current + 1;
                data.insert(key.to_string(), next.to_string());
                Ok(Value::Int(next))
            }
            "APPEND" => {
                let entry = data.entry(key.to_string()).or_default();
                entry.push_str(&arg_string(args, 0)?);
                Ok(Value::Int(entry.len() as i64))
            }
            "STRLEN" => Ok(Value::Int(
                data.get(key).map(|value| value.len()).unwrap_or(0) as i64,
            )),
            "TTL" => Ok(Value::Int(if data.contains_key(key) { -1 } else { -2 })),
            // 没有真实的过期，只回报键在不在
            "EXPIRE" => Ok(Value::Int(data.contains_key(key) as i64)),
            other => Err(Error::Store(format!("unsupported command: {other}"))),
        }
    }
}

fn arg_string(args: &[Value], index: usize) -> Result<String, Error> {
    match args.get(index) {
        Some(Value::Text(s)) => Ok(s.clone()),
        Some(Value::Bytes(b)) => Ok(String::from_utf8(b.clone())?),
        Some(Value::Int(n)) => Ok(n.to_string()),
        other => Err(Error::Store(format!("bad argument: {other:?}"))),
    }
}

// redis 风格的 glob：* 任意串，? 任意单字符，\ 转义
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let mut pi = 0;
    let mut ti = 0;
    let mut star: Option<(usize, usize)> = None;

    loop {
        if ti == t.len() {
            while pi < p.len() && p[pi] == b'*' {
                pi += 1;
            }
            return pi == p.len();
        }
        if pi < p.len() {
            match p[pi] {
                b'*' => {
                    star = Some((pi + 1, ti));
                    pi += 1;
                    continue;
                }
                b'?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                b'\\' if pi + 1 < p.len() => {
                    if p[pi + 1] == t[ti] {
                        pi += 2;
                        ti += 1;
                        continue;
                    }
                }
                c => {
                    if c == t[ti] {
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                }
            }
        }
        // 回溯到最近的 *，多吞一个字符再试
        match star {
            Some((next_pi, star_ti)) => {
                pi = next_pi;
                ti = star_ti + 1;
                star = Some((next_pi, star_ti + 1));
            }
            None => return false,
        }
    }
}
