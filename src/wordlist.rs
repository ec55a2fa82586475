use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use log::debug;

use crate::error::{Result, ScanError};

/// 从文件加载字典
///
/// 每行一个词，去除首尾空白后跳过空行；顺序和重复项保持不变。
pub fn load_wordlist<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let wordlist_error = |source| ScanError::Wordlist {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(wordlist_error)?;
    let words = read_words(io::BufReader::new(file)).map_err(wordlist_error)?;

    debug!("从 {} 加载 {} 个字典词", path.display(), words.len());
    Ok(words)
}

/// 从任意输入读取字典
pub fn read_words<B: BufRead>(reader: B) -> io::Result<Vec<String>> {
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}
