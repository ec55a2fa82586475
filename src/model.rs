use std::fmt;

/// 待解析的候选域名
///
/// 由种子任务（字典词 + 根域名）或工作者（字典词 + 已发现域名）生成，
/// 构造后不可修改，只会被某一个工作者取走一次。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    name: String,
    depth: usize, // 在根域名前拼接的字典词层数
}

impl Candidate {
    /// 由字典词和根域名生成第一层候选
    pub fn seed(word: &str, root: &str) -> Self {
        Candidate {
            name: format!("{}.{}", word, root),
            depth: 1,
        }
    }

    /// 以当前域名为后缀派生下一层候选
    pub fn child(&self, word: &str) -> Self {
        Candidate {
            name: format!("{}.{}", word, self.name),
            depth: self.depth + 1,
        }
    }

    /// 完整域名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 层级，种子为1
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_and_child() {
        let seed = Candidate::seed("www", "example.com");
        assert_eq!(seed.name(), "www.example.com");
        assert_eq!(seed.depth(), 1);

        let child = seed.child("api");
        assert_eq!(child.name(), "api.www.example.com");
        assert_eq!(child.depth(), 2);
        assert_eq!(child.to_string(), "api.www.example.com");
    }
}
