use crate::expiry::to_base36;

/// Normalizes a query for exact-match keying.
///
/// Lowercases, trims, collapses whitespace runs into one space and removes
/// the characters `.,;:!?`.
pub fn normalize_query(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
        .collect()
}

/// Cache key of a query: djb2 over the UTF-16 code units of the normalized
/// query, 32-bit wrapping, absolute value in base 36.
pub fn query_key(query: &str) -> String {
    let hash = normalize_query(query)
        .encode_utf16()
        .fold(5381_i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_add(hash)
                .wrapping_add(i32::from(unit))
        });

    to_base36(hash.unsigned_abs())
}
