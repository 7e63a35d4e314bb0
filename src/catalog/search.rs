/// Name matching used by catalog search

/// How a record's name matched a search query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Name equals the query (ignoring case)
    Exact,
    /// Name contains the query (ignoring case)
    Partial,
}

/// Classifies `name` against a query that is already trimmed and lowercased
pub fn classify_name(name: &str, needle: &str) -> Option<NameMatch> {
    let haystack = name.to_lowercase();
    if haystack == needle {
        Some(NameMatch::Exact)
    } else if haystack.contains(needle) {
        Some(NameMatch::Partial)
    } else {
        None
    }
}
