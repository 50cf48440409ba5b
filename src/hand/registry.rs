use parking_lot::RwLock;
use serde::Deserialize;

use super::rule::PatternRule;
use crate::error::Res;
use crate::model::PatternId;

// [Registry]
// 役IDと役の定義の対応表 (登録順を保持)
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: Vec<(PatternId, PatternRule)>,
}

impl Registry {
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    // 同じIDが登録済みの場合は同じ位置で置き換えて以前の定義を返却
    pub fn register(&mut self, id: impl Into<PatternId>, rule: PatternRule) -> Option<PatternRule> {
        let id = id.into();
        if let Some((_, r)) = self.rules.iter_mut().find(|(k, _)| *k == id) {
            return Some(std::mem::replace(r, rule));
        }
        self.rules.push((id, rule));
        None
    }

    pub fn remove(&mut self, id: &str) -> Option<PatternRule> {
        let i = self.rules.iter().position(|(k, _)| k == id)?;
        Some(self.rules.remove(i).1)
    }

    pub fn has(&self, id: &str) -> bool {
        self.rules.iter().any(|(k, _)| k == id)
    }

    pub fn get(&self, id: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|(k, _)| k == id).map(|(_, r)| r)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.iter().map(|(k, _)| k.as_str())
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    // JSON配列 [{"id": ..., 役の定義}, ...] から登録 (登録した件数を返却)
    pub fn load_json(&mut self, json: &str) -> Res<usize> {
        let entries: Vec<RuleEntry> = serde_json::from_str(json)?;
        let n = entries.len();
        for e in entries {
            log::debug!("load rule: {}", e.id);
            self.register(e.id, e.rule);
        }
        Ok(n)
    }
}

#[derive(Deserialize)]
struct RuleEntry {
    id: PatternId,
    #[serde(flatten)]
    rule: PatternRule,
}

static GLOBAL: RwLock<Registry> = parking_lot::const_rwlock(Registry::new());

// プロセス全体で共有されるRegistry
// 判定処理は読み取りロックのみを使用する
pub fn global() -> &'static RwLock<Registry> {
    &GLOBAL
}

#[test]
fn test_registry() {
    use super::rule::Combine;

    let mut reg = Registry::new();
    assert!(reg.is_empty());
    reg.register("a", PatternRule::default());
    reg.register("b", PatternRule::default());
    let prev = reg.register("a", PatternRule::with_requirements(Combine::Or, vec![]));
    assert!(prev.is_some());
    assert_eq!(reg.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(reg.get("a").unwrap().combine, Combine::Or);

    assert!(reg.remove("a").is_some());
    assert!(reg.remove("a").is_none());
    assert!(!reg.has("a"));
    assert_eq!(reg.len(), 1);
    reg.clear();
    assert!(reg.is_empty());
}

#[test]
fn test_registry_load_json() {
    let json = r#"[
        {"id": "tanyao", "requirements": [{"forbidden_ranks": [1, 9]}]},
        {"id": "riichi", "preconditions": {"closed_required": true}, "predicate": "riichi"}
    ]"#;
    let mut reg = Registry::new();
    assert_eq!(reg.load_json(json).unwrap(), 2);
    assert!(reg.has("tanyao"));
    assert!(reg.get("riichi").unwrap().predicate.is_some());
    assert!(reg.get("riichi").unwrap().preconditions.closed_required);

    assert!(reg.load_json(r#"[{"requirements": []}]"#).is_err());
}
