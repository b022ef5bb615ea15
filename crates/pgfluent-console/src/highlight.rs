//! Regex based highlighters that insert color tags into JSON and SQL text.

use regex::{Captures, Regex};
use std::sync::LazyLock;

const SQL_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC", "ATTACH",
    "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST", "CHECK",
    "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS", "CURRENT",
    "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT", "DEFERRABLE",
    "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH", "ELSE", "END",
    "ESCAPE", "EXCEPT", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL", "FILTER", "FOLLOWING", "FOR",
    "FOREIGN", "FROM", "FULL", "GLOB", "GROUP", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN",
    "INDEX", "INDEXED", "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS",
    "ISNULL", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "MATCH", "NATURAL", "NO", "NOT", "NOTHING",
    "NOTNULL", "NULL", "OF", "OFFSET", "ON", "OR", "ORDER", "OUTER", "OVER", "PARTITION", "PLAN",
    "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE", "RANGE", "RECURSIVE", "REFERENCES",
    "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE", "RESTRICT", "RIGHT", "ROLLBACK", "ROW",
    "ROWS", "SAVEPOINT", "SELECT", "SET", "TABLE", "TEMP", "TEMPORARY", "THEN", "TO",
    "TRANSACTION", "TRIGGER", "UNBOUNDED", "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM",
    "VALUES", "VIEW", "VIRTUAL", "WHEN", "WHERE", "WINDOW", "WITH", "WITHOUT",
];

const SQL_TYPES: &[&str] = &[
    "CHARACTER", "CHAR", "VARCHAR", "BOOLEAN", "SMALLINT", "INTEGER", "INT", "DECIMAL", "NUMERIC",
    "REAL", "FLOAT", "DOUBLE PRECISION", "DATE", "TEXT", "TIME", "TIMESTAMP", "CLOB", "BLOB",
    "DATETIME",
];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile")
}

static JSON_KEY_RE: LazyLock<Regex> = LazyLock::new(|| compile(r#""(.*)":"#));
static JSON_STRING_RE: LazyLock<Regex> = LazyLock::new(|| compile(r#": "(.*)""#));
static JSON_SCALAR_RE: LazyLock<Regex> = LazyLock::new(|| compile(r": (\d+|true|false)"));
static JSON_ITEM_STRING_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\t"(.*?)"([,$\s])"#));
static JSON_ITEM_SCALAR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\t(\d+|true|false)([,$\s])"));

static SQL_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<String> = SQL_KEYWORDS.iter().map(|w| regex::escape(w)).collect();
    compile(&format!(r"\b(?:{})\b", words.join("|")))
});
static SQL_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let types: Vec<String> = SQL_TYPES
        .iter()
        .map(|t| format!(r"\b(?:{})(?:\(.*\))?\b", regex::escape(t)))
        .collect();
    compile(&types.join("|"))
});
static SQL_STRING_RE: LazyLock<Regex> = LazyLock::new(|| compile(r#"[`"'].*?[`"']"#));
static SQL_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\b\d+"));

/// Tag keys, string values and scalars of pretty-printed JSON.
///
/// Indentation is expected as tabs, which is what [`crate::Console::print_json`] produces.
pub fn json(text: &str) -> String {
    let out = JSON_KEY_RE.replace_all(text, "\"<LC>${1}<W>\":");
    let out = JSON_STRING_RE.replace_all(&out, ": <LG>\"${1}\"<W>");
    let out = JSON_SCALAR_RE.replace_all(&out, ": <LB>${1}<W>");
    let out = JSON_ITEM_STRING_RE.replace_all(&out, "\t<LG>\"${1}\"<W>${2}");
    let out = JSON_ITEM_SCALAR_RE.replace_all(&out, "\t<LB>${1}<W>${2}");
    out.into_owned()
}

/// Tag keywords, types, quoted strings and numbers of a SQL statement.
pub fn sql(text: &str) -> String {
    let out = SQL_KEYWORD_RE.replace_all(text, "<Y>${0}<W>");
    let out = SQL_TYPE_RE.replace_all(&out, |caps: &Captures| {
        let matched = caps[0].replace(')', "<LB>)<W>").replace('(', "<LB>(<W>");
        format!("<LB>{matched}<W>")
    });
    let out = SQL_STRING_RE.replace_all(&out, "<LG>${0}<W>");
    let out = SQL_NUMBER_RE.replace_all(&out, "<LM>${0}<W>");
    out.into_owned()
}
