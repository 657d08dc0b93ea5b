//! Text form of option lists.
//!
//! An option list is stored as a single string formatted exactly as it would
//! appear in a `CREATE TEXT SEARCH DICTIONARY` command, e.g.
//! `stopwords = 'english', "Accept" = E'a\\b'`. This keeps dump tooling
//! deterministic: encoding the same list always yields the same bytes.
//!
//! The decoder also accepts a few forms the encoder never writes (unquoted and
//! double-quoted values) because older headline options were stored that way.

use thiserror::Error;

use super::{OptionEntry, OptionList};

/// Marker placed before an opening quote when the value contains backslashes.
const ESCAPE_STRING_SYNTAX: char = 'E';

/// Options holding a transient local resource path; never serialized.
const TRANSIENT_KEY: &str = "FilePath";

/// Reserved, column-name and type/function-name keywords; all of them must
/// be quoted when used as an option name.
const RESERVED_KEYWORDS: &[&str] = &[
    "all",
    "analyse",
    "analyze",
    "and",
    "any",
    "array",
    "as",
    "asc",
    "asymmetric",
    "authorization",
    "between",
    "bigint",
    "binary",
    "bit",
    "boolean",
    "both",
    "case",
    "cast",
    "char",
    "character",
    "check",
    "coalesce",
    "collate",
    "collation",
    "column",
    "concurrently",
    "constraint",
    "create",
    "cross",
    "current_catalog",
    "current_date",
    "current_role",
    "current_schema",
    "current_time",
    "current_timestamp",
    "current_user",
    "dec",
    "decimal",
    "default",
    "deferrable",
    "desc",
    "distinct",
    "do",
    "else",
    "end",
    "except",
    "exists",
    "extract",
    "false",
    "fetch",
    "float",
    "for",
    "foreign",
    "freeze",
    "from",
    "full",
    "grant",
    "greatest",
    "group",
    "grouping",
    "having",
    "ilike",
    "in",
    "initially",
    "inner",
    "inout",
    "int",
    "integer",
    "intersect",
    "interval",
    "into",
    "is",
    "isnull",
    "join",
    "lateral",
    "leading",
    "least",
    "left",
    "like",
    "limit",
    "localtime",
    "localtimestamp",
    "national",
    "natural",
    "nchar",
    "none",
    "not",
    "notnull",
    "null",
    "nullif",
    "numeric",
    "offset",
    "on",
    "only",
    "or",
    "order",
    "out",
    "outer",
    "overlaps",
    "overlay",
    "placing",
    "position",
    "precision",
    "primary",
    "real",
    "references",
    "returning",
    "right",
    "row",
    "select",
    "session_user",
    "setof",
    "similar",
    "smallint",
    "some",
    "substring",
    "symmetric",
    "table",
    "tablesample",
    "then",
    "time",
    "timestamp",
    "to",
    "trailing",
    "treat",
    "trim",
    "true",
    "union",
    "unique",
    "user",
    "using",
    "values",
    "varchar",
    "variadic",
    "verbose",
    "when",
    "where",
    "window",
    "with",
    "xmlattributes",
    "xmlconcat",
    "xmlelement",
    "xmlexists",
    "xmlforest",
    "xmlparse",
    "xmlpi",
    "xmlroot",
    "xmlserialize",
];

/// Error raised when a stored option list cannot be parsed.
///
/// Carries the complete input for diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid parameter list format: \"{input}\"")]
pub struct FormatError {
    /// The text that failed to parse.
    pub input: String,
}

impl FormatError {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Returns `true` for option names that are never written by [`encode`].
pub fn is_transient_key(key: &str) -> bool {
    key.eq_ignore_ascii_case(TRANSIENT_KEY)
}

fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS.binary_search(&word).is_ok()
}

/// Quotes `ident` with double quotes if it would not survive as a bare name.
///
/// Bare names start with a lowercase ASCII letter or `_`, continue with
/// lowercase letters, digits or `_`, and are not reserved, column-name or
/// type/function-name keywords.
///
/// # Examples
///
/// ```
/// use tsearch_catalog::options::codec::quote_identifier;
///
/// assert_eq!(quote_identifier("stopwords"), "stopwords");
/// assert_eq!(quote_identifier("StopWords"), "\"StopWords\"");
/// assert_eq!(quote_identifier("table"), "\"table\"");
/// assert_eq!(quote_identifier("a$b"), "\"a$b\"");
/// assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_identifier(ident: &str) -> String {
    let mut chars = ident.chars();
    let safe_start = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let safe = safe_start
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !is_reserved_keyword(ident);
    if safe {
        return ident.to_string();
    }

    let mut quoted = String::with_capacity(ident.len() + 2);
    quoted.push('"');
    for ch in ident.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

fn push_quoted_value(buf: &mut String, value: &str) {
    let escape_mode = value.contains('\\');
    if escape_mode {
        buf.push(ESCAPE_STRING_SYNTAX);
    }
    buf.push('\'');
    for ch in value.chars() {
        if ch == '\'' || (escape_mode && ch == '\\') {
            buf.push(ch);
        }
        buf.push(ch);
    }
    buf.push('\'');
}

/// Serializes an option list to its stored text form.
///
/// Pairs are written as `key = 'value'` and joined with `", "`. Options named
/// `FilePath` are skipped.
///
/// # Examples
///
/// ```
/// use tsearch_catalog::options::codec::encode;
/// use tsearch_catalog::OptionEntry;
///
/// let options = vec![
///     OptionEntry::new("a", "x\\y"),
///     OptionEntry::new("b", "it's"),
/// ];
/// assert_eq!(encode(&options), r"a = E'x\\y', b = 'it''s'");
/// ```
pub fn encode(options: &[OptionEntry]) -> String {
    let mut buf = String::new();
    for option in options.iter().filter(|o| !is_transient_key(&o.key)) {
        if !buf.is_empty() {
            buf.push_str(", ");
        }
        buf.push_str(&quote_identifier(&option.key));
        buf.push_str(" = ");
        push_quoted_value(&mut buf, &option.value);
    }
    buf
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    AwaitingKey,
    InBareKey,
    InQuotedKey,
    AwaitingEquals,
    AwaitingValue,
    InSingleQuotedValue,
    InDoubleQuotedValue,
    InBareValue,
}

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

/// Parses the stored text form back into an option list.
///
/// # Errors
///
/// Returns [`FormatError`] carrying `input` if the text is not a well-formed
/// option list.
///
/// # Examples
///
/// ```
/// use tsearch_catalog::options::codec::decode;
/// use tsearch_catalog::OptionEntry;
///
/// let legacy = decode("k1=v1, k2=v2").unwrap();
/// assert_eq!(
///     legacy,
///     vec![OptionEntry::new("k1", "v1"), OptionEntry::new("k2", "v2")]
/// );
/// assert!(decode("k1 = 'unterminated").is_err());
/// ```
pub fn decode(input: &str) -> Result<OptionList, FormatError> {
    use ScanState::*;

    let mut result = OptionList::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut state = AwaitingKey;
    let mut chars = input.chars().peekable();

    let mut finish_pair = |key: &mut String, value: &mut String| {
        result.push(OptionEntry::new(
            std::mem::take(key),
            std::mem::take(value),
        ));
    };

    while let Some(ch) = chars.next() {
        state = match state {
            AwaitingKey => {
                if is_space(ch) || ch == ',' {
                    AwaitingKey
                } else if ch == '"' {
                    InQuotedKey
                } else {
                    key.push(ch);
                    InBareKey
                }
            }
            InBareKey => {
                if is_space(ch) {
                    AwaitingEquals
                } else if ch == '=' {
                    AwaitingValue
                } else {
                    key.push(ch);
                    InBareKey
                }
            }
            InQuotedKey => {
                if ch != '"' {
                    key.push(ch);
                    InQuotedKey
                } else if chars.next_if_eq(&'"').is_some() {
                    key.push('"');
                    InQuotedKey
                } else {
                    AwaitingEquals
                }
            }
            AwaitingEquals => {
                if ch == '=' {
                    AwaitingValue
                } else if is_space(ch) {
                    AwaitingEquals
                } else {
                    return Err(FormatError::new(input));
                }
            }
            AwaitingValue => match ch {
                '\'' => InSingleQuotedValue,
                ESCAPE_STRING_SYNTAX if chars.next_if_eq(&'\'').is_some() => InSingleQuotedValue,
                '"' => InDoubleQuotedValue,
                c if is_space(c) => AwaitingValue,
                c => {
                    value.push(c);
                    InBareValue
                }
            },
            InSingleQuotedValue => match ch {
                '\'' if chars.next_if_eq(&'\'').is_some() => {
                    value.push('\'');
                    InSingleQuotedValue
                }
                '\'' => {
                    finish_pair(&mut key, &mut value);
                    AwaitingKey
                }
                '\\' => {
                    // A doubled backslash collapses; a lone one is literal.
                    chars.next_if_eq(&'\\');
                    value.push('\\');
                    InSingleQuotedValue
                }
                c => {
                    value.push(c);
                    InSingleQuotedValue
                }
            },
            InDoubleQuotedValue => match ch {
                '"' if chars.next_if_eq(&'"').is_some() => {
                    value.push('"');
                    InDoubleQuotedValue
                }
                '"' => {
                    finish_pair(&mut key, &mut value);
                    AwaitingKey
                }
                c => {
                    value.push(c);
                    InDoubleQuotedValue
                }
            },
            InBareValue => {
                if ch == ',' || is_space(ch) {
                    finish_pair(&mut key, &mut value);
                    AwaitingKey
                } else {
                    value.push(ch);
                    InBareValue
                }
            }
        };
    }

    match state {
        AwaitingKey => {}
        InBareValue => finish_pair(&mut key, &mut value),
        _ => return Err(FormatError::new(input)),
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> OptionList {
        pairs.iter().map(|(k, v)| OptionEntry::new(*k, *v)).collect()
    }

    #[test]
    fn keywords_are_sorted_for_binary_search() {
        let mut sorted = RESERVED_KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED_KEYWORDS);
    }

    #[test]
    fn encode_empty_list() {
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn encode_quotes_and_escapes() {
        let options = entries(&[("a", "x\\y"), ("b", "it's")]);
        let text = encode(&options);
        assert_eq!(text, "a = E'x\\\\y', b = 'it''s'");
        assert_eq!(decode(&text).unwrap(), options);
    }

    #[test]
    fn encode_quotes_keys_only_when_needed() {
        let options = entries(&[("simple_key", "1"), ("MixedCase", "2"), ("with space", "3")]);
        assert_eq!(
            encode(&options),
            "simple_key = '1', \"MixedCase\" = '2', \"with space\" = '3'"
        );
    }

    #[test]
    fn dollar_sign_forces_quoting() {
        assert_eq!(quote_identifier("a$b"), "\"a$b\"");
        assert_eq!(encode(&entries(&[("a$b", "1")])), "\"a$b\" = '1'");
        assert_eq!(decode("\"a$b\" = '1'").unwrap(), entries(&[("a$b", "1")]));
    }

    #[test]
    fn column_name_keywords_are_quoted() {
        for keyword in ["xmlelement", "xmlserialize", "grouping", "between", "tablesample"] {
            assert_eq!(quote_identifier(keyword), format!("\"{keyword}\""));
        }
        assert_eq!(encode(&entries(&[("xmlelement", "1")])), "\"xmlelement\" = '1'");
        assert_eq!(quote_identifier("xmlelements"), "xmlelements");
    }

    #[test]
    fn encode_skips_file_path_anywhere() {
        let options = entries(&[("FilePath", "/tmp/x"), ("a", "1"), ("filepath", "/y"), ("b", "2")]);
        assert_eq!(encode(&options), "a = '1', b = '2'");
    }

    #[test]
    fn encode_only_file_path_is_empty() {
        assert_eq!(encode(&entries(&[("FilePath", "/tmp/x")])), "");
    }

    #[test]
    fn decode_legacy_unquoted() {
        assert_eq!(
            decode("k1=v1, k2=v2").unwrap(),
            entries(&[("k1", "v1"), ("k2", "v2")])
        );
    }

    #[test]
    fn decode_bare_value_at_end_of_input() {
        assert_eq!(decode("k = v").unwrap(), entries(&[("k", "v")]));
    }

    #[test]
    fn decode_double_quoted_key_and_value() {
        assert_eq!(
            decode(r#""Say ""hi""" = "a ""b"" c""#).unwrap(),
            entries(&[("Say \"hi\"", "a \"b\" c")])
        );
    }

    #[test]
    fn decode_escape_marker_is_not_part_of_value() {
        assert_eq!(decode(r"k = E'a\\b'").unwrap(), entries(&[("k", "a\\b")]));
    }

    #[test]
    fn decode_lone_backslash_is_literal() {
        assert_eq!(decode(r"k = 'a\b'").unwrap(), entries(&[("k", "a\\b")]));
    }

    #[test]
    fn decode_bare_value_starting_with_e() {
        assert_eq!(decode("k = English").unwrap(), entries(&[("k", "English")]));
    }

    #[test]
    fn decode_empty_input() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("  ,  ").unwrap().is_empty());
    }

    #[test]
    fn decode_empty_quoted_value() {
        assert_eq!(
            decode("a = '', b = 'x'").unwrap(),
            entries(&[("a", ""), ("b", "x")])
        );
    }

    #[test]
    fn decode_rejects_unterminated_value() {
        let err = decode("k1 = 'unterminated").unwrap_err();
        assert_eq!(err.input, "k1 = 'unterminated");
    }

    #[test]
    fn decode_rejects_missing_equals() {
        assert!(decode("k1 'v1'").is_err());
    }

    #[test]
    fn decode_rejects_dangling_key() {
        assert!(decode("k1").is_err());
        assert!(decode("k1 =").is_err());
        assert!(decode("\"k1").is_err());
    }
}
