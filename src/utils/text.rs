/// 文本清理工具
use regex::Regex;

/// 压缩页面文本中的连续空行
///
/// 渲染出的正文常带大量空白，直接交给 LLM 会浪费上下文。
/// 先去掉每行尾部空白，再把三个以上的连续换行折叠为两个。
pub fn collapse_blank_lines(text: &str) -> String {
    let stripped = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    if let Ok(re) = Regex::new(r"\n{3,}") {
        re.replace_all(stripped.trim(), "\n\n").into_owned()
    } else {
        stripped.trim().to_string()
    }
}
