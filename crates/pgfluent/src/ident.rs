//! SQL identifier handling.
//!
//! Every table, column and constraint name that ends up in generated SQL goes through
//! [`Ident`]. Identifiers cannot be bound as parameters, so they are validated instead:
//!
//! - Unquoted names must match `[A-Za-z_][A-Za-z0-9_$]*` and are rendered as given.
//!   PostgreSQL folds them to lower case, which is also their catalog key.
//! - Quoted names (`"CamelCase"`) allow any characters except NUL, escape `"` as `""`
//!   and keep their case in the catalog.
//!
//! # Example
//! ```ignore
//! use pgfluent::Ident;
//!
//! let t = Ident::parse("Users")?;
//! assert_eq!(t.to_sql(), "Users");
//! assert_eq!(t.catalog_name(), "users");
//! # Ok::<(), pgfluent::DbError>(())
//! ```

use crate::error::{DbError, DbResult};

/// A single-part SQL identifier (table, column or constraint name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    name: String,
    quoted: bool,
}

impl Ident {
    /// Create a quoted identifier from a raw name.
    pub fn quoted(name: &str) -> DbResult<Self> {
        if name.is_empty() {
            return Err(DbError::validation("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(DbError::validation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            name: name.to_string(),
            quoted: true,
        })
    }

    /// Parse an identifier, either bare (`users`) or double-quoted (`"User Table"`).
    pub fn parse(s: &str) -> DbResult<Self> {
        if s.is_empty() {
            return Err(DbError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(DbError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut chars = s.chars().peekable();

        if chars.peek() == Some(&'"') {
            chars.next(); // opening quote
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('"') => {
                        // Escaped quote: ""
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            name.push('"');
                        } else {
                            break;
                        }
                    }
                    Some(c) => name.push(c),
                    None => return Err(DbError::validation("Unclosed quoted identifier")),
                }
            }
            if let Some(c) = chars.next() {
                return Err(DbError::validation(format!(
                    "Unexpected '{c}' after quoted identifier '{s}'"
                )));
            }
            return Self::quoted(&name);
        }

        for (i, c) in s.chars().enumerate() {
            let ok = if i == 0 {
                c == '_' || c.is_ascii_alphabetic()
            } else {
                c == '_' || c == '$' || c.is_ascii_alphanumeric()
            };
            if !ok {
                return Err(DbError::validation(format!(
                    "Invalid character '{c}' in identifier '{s}'"
                )));
            }
        }

        Ok(Self {
            name: s.to_string(),
            quoted: false,
        })
    }

    /// The name as PostgreSQL stores it, which is how the catalog keys tables and columns.
    pub fn catalog_name(&self) -> String {
        if self.quoted {
            self.name.clone()
        } else {
            self.name.to_ascii_lowercase()
        }
    }

    /// Whether the identifier is rendered with double quotes.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Derive a new identifier by appending `suffix`, keeping the quoting style.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self {
            name: format!("{}{}", self.name, suffix),
            quoted: self.quoted,
        }
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        if !self.quoted {
            return self.name.clone();
        }
        let mut out = String::with_capacity(self.name.len() + 2);
        out.push('"');
        for ch in self.name.chars() {
            if ch == '"' {
                out.push_str("\"\"");
            } else {
                out.push(ch);
            }
        }
        out.push('"');
        out
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Render a comma-separated identifier list, validating each name.
pub(crate) fn render_list<S: AsRef<str>>(names: &[S]) -> DbResult<String> {
    let rendered = names
        .iter()
        .map(|n| Ident::parse(n.as_ref()).map(|i| i.to_sql()))
        .collect::<DbResult<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("users").unwrap();
        assert_eq!(ident.to_sql(), "users");
        assert_eq!(ident.catalog_name(), "users");
    }

    #[test]
    fn unquoted_folds_for_catalog_only() {
        let ident = Ident::parse("UserAccounts").unwrap();
        assert_eq!(ident.to_sql(), "UserAccounts");
        assert_eq!(ident.catalog_name(), "useraccounts");
    }

    #[test]
    fn ident_quoted_keeps_case() {
        let ident = Ident::parse(r#""CamelCase""#).unwrap();
        assert_eq!(ident.to_sql(), r#""CamelCase""#);
        assert_eq!(ident.catalog_name(), "CamelCase");
    }

    #[test]
    fn ident_quoted_with_escape() {
        let ident = Ident::parse(r#""has""quote""#).unwrap();
        assert_eq!(ident.catalog_name(), r#"has"quote"#);
        assert_eq!(ident.to_sql(), r#""has""quote""#);
    }

    #[test]
    fn ident_with_dollar() {
        assert_eq!(Ident::parse("my_var$1").unwrap().to_sql(), "my_var$1");
    }

    #[test]
    fn suffix_keeps_quoting() {
        let plain = Ident::parse("orders").unwrap().with_suffix("_pk");
        assert_eq!(plain.to_sql(), "orders_pk");
        let quoted = Ident::parse(r#""Orders""#).unwrap().with_suffix("_pk");
        assert_eq!(quoted.to_sql(), r#""Orders_pk""#);
    }

    #[test]
    fn ident_rejects_bad_input() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("1table").is_err());
        assert!(Ident::parse("my table").is_err());
        assert!(Ident::parse("users; DROP TABLE users").is_err());
        assert!(Ident::parse("public.users").is_err());
        assert!(Ident::parse(r#""unclosed"#).is_err());
        assert!(Ident::parse(r#""a"b"#).is_err());
        assert!(Ident::parse(r#""""#).is_err());
    }

    #[test]
    fn render_list_joins_with_commas() {
        assert_eq!(render_list(&["a", "b"]).unwrap(), "a, b");
        assert!(render_list(&["a", "b c"]).is_err());
    }
}
