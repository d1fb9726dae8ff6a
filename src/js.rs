//! JavaScript code builder.
//!
//! A deliberately small expression/statement tree covering what the widget
//! transforms need to generate: identifiers, member access, calls, literals,
//! concatenation and `var` declarations. User expressions pass through as
//! `Expr::Raw` and are emitted verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Expr {
    Identifier(String),
    Member(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    Str(String),
    Null,
    Array(Vec<Expr>),
    /// `a + b + c`
    Concat(Vec<Expr>),
    /// Source text of a template expression, emitted as-is.
    Raw(String),
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Identifier(name.to_string())
    }

    pub fn str(value: &str) -> Self {
        Expr::Str(value.to_string())
    }

    pub fn raw(code: &str) -> Self {
        Expr::Raw(code.trim().to_string())
    }

    pub fn member(self, property: &str) -> Self {
        Expr::Member(Box::new(self), property.to_string())
    }

    pub fn call(self, args: Vec<Expr>) -> Self {
        Expr::Call(Box::new(self), args)
    }

    /// `out`, the output stream every render function receives.
    pub fn out() -> Self {
        Expr::ident("out")
    }

    fn needs_parens(&self) -> bool {
        matches!(self, Expr::Concat(_) | Expr::Raw(_))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(name) => f.write_str(name),
            Expr::Member(object, property) => {
                if object.needs_parens() {
                    write!(f, "({}).{}", object, property)
                } else {
                    write!(f, "{}.{}", object, property)
                }
            }
            Expr::Call(callee, args) => {
                if callee.needs_parens() {
                    write!(f, "({})(", callee)?;
                } else {
                    write!(f, "{}(", callee)?;
                }
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Str(value) => f.write_str(&quote(value)),
            Expr::Null => f.write_str("null"),
            Expr::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Expr::Concat(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    if matches!(part, Expr::Concat(_) | Expr::Raw(_)) {
                        write!(f, "({})", part)?;
                    } else {
                        write!(f, "{}", part)?;
                    }
                }
                Ok(())
            }
            Expr::Raw(code) => f.write_str(code),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Quote a string as a JavaScript string literal.
pub fn quote(value: &str) -> String {
    // A JSON string is a valid JS string literal once the two line separators are escaped.
    serde_json::to_string(value)
        .unwrap_or_else(|_| format!("\"{}\"", value))
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Stmt {
    Var { name: String, init: Expr },
    Expr { expr: Expr },
}

impl Stmt {
    pub fn var(name: &str, init: Expr) -> Self {
        Stmt::Var {
            name: name.to_string(),
            init,
        }
    }

    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr { expr }
    }
}

impl From<Expr> for Stmt {
    fn from(expr: Expr) -> Self {
        Stmt::expr(expr)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Var { name, init } => write!(f, "var {} = {};", name, init),
            Stmt::Expr { expr } => write!(f, "{};", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_rendering() {
        let call = Expr::ident("widget")
            .member("elId")
            .call(vec![Expr::str("0[]")]);
        assert_eq!(call.to_string(), r#"widget.elId("0[]")"#);
    }

    #[test]
    fn test_concat_wraps_raw_parts() {
        let expr = Expr::Concat(vec![
            Expr::raw("a || b"),
            Expr::str("|"),
            Expr::ident("widget").member("id"),
        ]);
        assert_eq!(expr.to_string(), r#"(a || b) + "|" + widget.id"#);
    }

    #[test]
    fn test_quote_escapes_line_separators() {
        assert_eq!(quote("a\u{2028}b"), r#""a\u2028b""#);
        assert_eq!(quote("say \"hi\""), r#""say \"hi\"""#);
    }

    #[test]
    fn test_stmt_rendering() {
        let stmt = Stmt::var("__widgetId3", Expr::Null);
        assert_eq!(stmt.to_string(), "var __widgetId3 = null;");
        let stmt: Stmt = Expr::ident("f").call(vec![Expr::out()]).into();
        assert_eq!(stmt.to_string(), "f(out);");
    }
}
