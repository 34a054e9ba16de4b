use std::cmp::Reverse;

use regex::{Regex, RegexBuilder};

/// Case-insensitive matcher for the words typed into the search box, or `None` when
/// there is nothing to highlight.
pub fn query_matcher(query: &str) -> Option<Regex> {
    let mut words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    // Alternation is leftmost-first, so longer words must come before their prefixes.
    words.sort_by_key(|word| Reverse(word.len()));
    let alternation: Vec<String> = words.into_iter().map(regex::escape).collect();
    RegexBuilder::new(&alternation.join("|"))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Cuts `text` into `(matched, slice)` runs so the renderer can style matches separately.
pub fn segments<'a>(text: &'a str, regex: Option<&Regex>) -> Vec<(bool, &'a str)> {
    let Some(re) = regex else {
        return vec![(false, text)];
    };
    let mut out = Vec::new();
    let mut last = 0;
    for mat in re.find_iter(text) {
        if mat.start() > last {
            out.push((false, &text[last..mat.start()]));
        }
        out.push((true, mat.as_str()));
        last = mat.end();
    }
    if last < text.len() || out.is_empty() {
        out.push((false, &text[last..]));
    }
    out
}
