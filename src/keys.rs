//! Logical ↔ physical key mapping for one driver instance.

/// Joins the base prefix and a logical key.
pub const KEY_SEPARATOR: char = ':';

/// The key space a driver owns inside a shared namespace.
///
/// With no base every key maps to itself. With a base `app`, logical `user:1`
/// is stored as `app:user:1`, and listings are scoped to `app:` so that a
/// sibling base such as `apple` never shows up.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct KeySpace {
    base: Option<String>,
}

impl KeySpace {
    /// Builds the key space for `base`.
    ///
    /// `/` and `\` are read as separators, repeated separators collapse and
    /// separators at either end are dropped, so `app:`, `/app` and `app` all
    /// name the same space. A base that normalizes to nothing means no base.
    pub fn new(base: Option<&str>) -> KeySpace {
        let base = base.map(normalize_base).filter(|b| !b.is_empty());
        KeySpace { base }
    }

    /// The normalized base, if any.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Physical key for `key`.
    ///
    /// The logical key is never rewritten. The empty key addresses the root of
    /// the space (`app:`), which listings still see.
    pub fn physical(&self, key: &str) -> String {
        match &self.base {
            None => key.to_string(),
            Some(base) => format!("{}{}{}", base, KEY_SEPARATOR, key),
        }
    }

    /// Physical prefix that scopes a listing to `sub` within this space.
    ///
    /// `sub` is folded like the base (`cache/` scopes to `cache:`) but keeps
    /// its trailing separator. `None` means the whole namespace.
    pub fn list_prefix(&self, sub: &str) -> Option<String> {
        let sub = fold_separators(sub);
        match &self.base {
            Some(base) => Some(format!("{}{}{}", base, KEY_SEPARATOR, sub)),
            None if sub.is_empty() => None,
            None => Some(sub),
        }
    }

    /// Logical key for a physical key returned by a listing.
    pub fn logical(&self, physical: &str) -> String {
        match &self.base {
            None => physical.to_string(),
            Some(base) => physical
                .strip_prefix(base.as_str())
                .and_then(|rest| rest.strip_prefix(KEY_SEPARATOR))
                .unwrap_or(physical)
                .to_string(),
        }
    }
}

fn normalize_base(base: &str) -> String {
    let mut out = fold_separators(base);
    while out.ends_with(KEY_SEPARATOR) {
        out.pop();
    }
    out
}

// `/` and `\` become `:`, runs collapse, a leading separator is dropped
fn fold_separators(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        let c = if c == '/' || c == '\\' { KEY_SEPARATOR } else { c };
        if c == KEY_SEPARATOR && (out.is_empty() || out.ends_with(KEY_SEPARATOR)) {
            continue;
        }
        out.push(c);
    }
    out
}
