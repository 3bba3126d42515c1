//! 结构化过滤：规则组间 OR，组内 AND。

use crate::error::FetchError;
use domain::{FilterRule, LocationNode};
use regex::Regex;

struct CompiledRule {
    field: String,
    regex: Regex,
}

/// 预编译的过滤规则。
pub struct CompiledFilter {
    groups: Vec<Vec<CompiledRule>>,
}

impl CompiledFilter {
    pub fn compile(groups: &[Vec<FilterRule>]) -> Result<Self, FetchError> {
        let groups = groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|rule| {
                        let regex = Regex::new(&rule.regex).map_err(|err| FetchError::Filter {
                            regex: rule.regex.clone(),
                            message: err.to_string(),
                        })?;
                        Ok(CompiledRule {
                            field: rule.parameter.clone(),
                            regex,
                        })
                    })
                    .collect::<Result<Vec<_>, FetchError>>()
            })
            .collect::<Result<Vec<_>, FetchError>>()?;
        Ok(Self { groups })
    }

    /// 空过滤保留全部；空组匹配全部；未知字段不匹配。
    pub fn matches(&self, node: &LocationNode) -> bool {
        if self.groups.is_empty() {
            return true;
        }
        self.groups.iter().any(|group| {
            group.iter().all(|rule| {
                node.filter_field(&rule.field)
                    .is_some_and(|value| rule.regex.is_match(value))
            })
        })
    }
}
