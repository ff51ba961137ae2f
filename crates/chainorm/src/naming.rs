//! Field, column and table naming conventions.

/// Pluralization rules, most specific first. Only the first matching suffix applies.
const PLURAL_RULES: &[(&str, &str)] = &[
    ("ch", "ches"),
    ("ss", "sses"),
    ("sh", "shes"),
    ("day", "days"),
    ("y", "ies"),
    ("x", "xes"),
    ("s", "ses"),
];

/// Convert a declared field or type name into its column form.
///
/// An underscore is inserted before every uppercase letter except the first
/// character, then the whole name is lowercased: `CreatedAt` -> `created_at`.
/// Names that are already snake case pass through unchanged.
pub fn declared_to_column(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(ch);
    }
    out.to_lowercase()
}

/// Convert a column name into its accessor form: `created_at` -> `CreatedAt`.
///
/// Result columns are matched to record fields by comparing accessor forms.
pub fn column_to_accessor(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_') {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Infer the table name for a record type: snake case, then pluralized.
///
/// ```
/// use chainorm::naming::table_name_for;
///
/// assert_eq!(table_name_for("User"), "users");
/// assert_eq!(table_name_for("City"), "cities");
/// assert_eq!(table_name_for("Birthday"), "birthdays");
/// ```
pub fn table_name_for(type_name: &str) -> String {
    let base = declared_to_column(type_name);
    for (suffix, replacement) in PLURAL_RULES {
        if let Some(stem) = base.strip_suffix(suffix) {
            return format!("{stem}{replacement}");
        }
    }
    format!("{base}s")
}
