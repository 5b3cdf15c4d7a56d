/// Progressively longer prefixes of `text`, growing by `words_per_chunk`
/// whitespace-delimited words each step. Words are re-joined with single
/// spaces; the last prefix is the whole (normalized) text.
pub fn reveal_prefixes(text: &str, words_per_chunk: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let step = words_per_chunk.max(1);
    let mut prefixes = Vec::with_capacity(words.len().div_ceil(step));
    let mut current = String::with_capacity(text.len());

    for chunk in words.chunks(step) {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&chunk.join(" "));
        prefixes.push(current.clone());
    }

    prefixes
}
