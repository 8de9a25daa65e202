/// Administrative suffixes stripped before comparison, wherever they occur.
/// Covers the Japanese 市区町村 / 都府県 markers and their romanized forms so
/// that "渋谷区" and "渋谷", or "Tokyo-to" and "tokyo", compare equal.
const ADMIN_SUFFIXES: &[&str] = &[
    "市", "区", "町", "村", "都", "府", "県", "-shi", "-ku", "-cho", "-machi", "-mura", "-to",
    "-fu", "-ken",
];

/// Canonicalizes a free-text label for comparison: lowercase, collapsed
/// whitespace, administrative suffixes removed. Pure and idempotent.
pub fn normalize(value: &str) -> String {
    let lowered = value.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    // Stripping one suffix can expose another (or re-form one from the
    // surrounding characters), so strip to a fixpoint to stay idempotent.
    let mut current = collapsed;
    loop {
        let next = strip_suffixes_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_suffixes_once(value: &str) -> String {
    let mut out = value.to_string();
    for suffix in ADMIN_SUFFIXES {
        out = out.replace(suffix, "");
    }
    out.trim().to_string()
}
