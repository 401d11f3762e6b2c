//! Human-readable rendering of machine-oriented union type strings.

/// Replace `|` separators with a semantically-marked, localized connective.
///
/// `int|string` becomes `int<span class="funcref-type-or"> or </span>string`.
/// A type string with no separator is returned unchanged. The individual
/// type tokens are never validated or canonicalized — this is a
/// presentation transform only.
pub fn humanize(type_string: &str) -> String {
    humanize_with(type_string, " or ", "funcref")
}

/// [`humanize`] with a caller-supplied connective label and CSS class prefix.
pub fn humanize_with(type_string: &str, label: &str, css_prefix: &str) -> String {
    if !type_string.contains('|') {
        return type_string.to_string();
    }

    let connective = format!("<span class=\"{css_prefix}-type-or\">{label}</span>");
    type_string.split('|').collect::<Vec<_>>().join(&connective)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_type_unchanged() {
        assert_eq!(humanize("int"), "int");
        assert_eq!(humanize("WP_Error"), "WP_Error");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn two_way_union() {
        assert_eq!(
            humanize("int|string"),
            "int<span class=\"funcref-type-or\"> or </span>string"
        );
    }

    #[test]
    fn three_way_union_has_two_connectives() {
        let result = humanize("int|string|null");
        assert_eq!(result.matches("funcref-type-or").count(), 2);
        assert!(result.starts_with("int<"));
        assert!(result.ends_with(">null"));
    }

    #[test]
    fn custom_label_and_prefix() {
        assert_eq!(
            humanize_with("int|string", " ou ", "apidocs"),
            "int<span class=\"apidocs-type-or\"> ou </span>string"
        );
    }

    #[test]
    fn tokens_are_not_validated() {
        // Garbage tokens pass through untouched.
        assert_eq!(
            humanize("???|!!!"),
            "???<span class=\"funcref-type-or\"> or </span>!!!"
        );
    }
}
