//! Statement classification.
//!
//! Text is first split into statements on the tokenizer's `;` tokens, so a
//! semicolon inside a string literal, quoted identifier or comment never
//! starts a new statement. Each statement is then parsed with `sqlparser` and
//! mapped from its AST variant. Statements the parser does not understand
//! (many Snowflake commands among them) fall back to their leading keywords,
//! taken from the same token stream: string literals, quoted identifiers and
//! comments are never keywords.
//!
//! Dialects whose tokenizer nests block comments are checked against the
//! non-nesting split the warehouse itself applies. Text the two tokenizers
//! split differently is unrecognized.

use frostgate_core::{SqlDialect, StatementKind};
use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::dialect::{
    AnsiDialect, Dialect, GenericDialect, PostgreSqlDialect, SnowflakeDialect,
};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Classifies free-form statements into [`StatementKind`]s.
///
/// Pure: the same text always yields the same kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementClassifier {
    dialect: SqlDialect,
}

impl StatementClassifier {
    /// Create a classifier for a dialect.
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn sql_dialect(&self) -> Box<dyn Dialect> {
        match self.dialect {
            SqlDialect::Snowflake => Box::new(SnowflakeDialect {}),
            SqlDialect::Generic => Box::new(GenericDialect {}),
            SqlDialect::Postgres => Box::new(PostgreSqlDialect {}),
            SqlDialect::Ansi => Box::new(AnsiDialect {}),
        }
    }

    /// Classify text as a whole.
    ///
    /// A batch whose statements all share one kind yields that kind; a mixed
    /// batch yields `Unrecognized`.
    pub fn classify(&self, text: &str) -> StatementKind {
        let kinds = self.classify_all(text);
        match kinds.split_first() {
            Some((first, rest)) if rest.iter().all(|k| k == first) => *first,
            _ => StatementKind::Unrecognized,
        }
    }

    /// Classify every statement in the text, in order.
    ///
    /// Never empty: text holding no statement classifies as `[Comment]`.
    pub fn classify_all(&self, text: &str) -> Vec<StatementKind> {
        let dialect = self.sql_dialect();
        let tokens = match Tokenizer::new(&*dialect, text).tokenize() {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::debug!(error = %e, "Tokenizer rejected statement text");
                return vec![StatementKind::Unrecognized];
            }
        };

        if dialect.supports_nested_comments() && !splits_agree(text, &tokens) {
            tracing::debug!("Nested and flat comment handling split the text differently");
            return vec![StatementKind::Unrecognized];
        }

        let statements = split_statements(&tokens);
        if statements.is_empty() {
            return vec![StatementKind::Comment];
        }

        statements
            .iter()
            .map(|segment| {
                let kind = self.classify_segment(&*dialect, segment);
                tracing::debug!(kind = %kind, "Classified statement");
                kind
            })
            .collect()
    }

    fn classify_segment(&self, dialect: &dyn Dialect, segment: &[Token]) -> StatementKind {
        let sql: String = segment.iter().map(ToString::to_string).collect();
        match Parser::parse_sql(dialect, &sql) {
            Ok(parsed) if parsed.len() == 1 => {
                statement_kind(&parsed[0]).unwrap_or_else(|| keyword_kind(segment))
            }
            _ => keyword_kind(segment),
        }
    }
}

/// Split tokens into statements, dropping those with no significant token.
fn split_statements(tokens: &[Token]) -> Vec<&[Token]> {
    tokens
        .split(|t| matches!(t, Token::SemiColon))
        .filter(|segment| segment.iter().any(is_significant))
        .collect()
}

fn is_significant(token: &Token) -> bool {
    !matches!(token, Token::Whitespace(_) | Token::EOF)
}

/// Whether a non-nesting tokenizer finds the same statements, token for
/// token, as the nesting one did.
fn splits_agree(text: &str, nested: &[Token]) -> bool {
    let Ok(flat) = Tokenizer::new(&SnowflakeDialect {}, text).tokenize() else {
        return false;
    };
    significant_segments(nested) == significant_segments(&flat)
}

fn significant_segments(tokens: &[Token]) -> Vec<Vec<String>> {
    split_statements(tokens)
        .iter()
        .map(|segment| {
            segment
                .iter()
                .filter(|t| is_significant(t))
                .map(ToString::to_string)
                .collect()
        })
        .collect()
}

/// Merge the kinds found in one statement. Reads defer to anything else;
/// two different non-read kinds cannot be named by one kind.
fn combine(a: StatementKind, b: StatementKind) -> StatementKind {
    match (a, b) {
        (a, b) if a == b => a,
        (StatementKind::Query, other) | (other, StatementKind::Query) => other,
        _ => StatementKind::Unrecognized,
    }
}

/// Kind of a query, looking through its CTEs and nested bodies.
fn query_kind(query: &Query) -> StatementKind {
    let body = set_expr_kind(&query.body);
    match &query.with {
        Some(with) => with
            .cte_tables
            .iter()
            .map(|cte| query_kind(&cte.query))
            .fold(body, combine),
        None => body,
    }
}

fn set_expr_kind(expr: &SetExpr) -> StatementKind {
    match expr {
        // SELECT ... INTO creates a table.
        SetExpr::Select(select) if select.into.is_some() => StatementKind::SchemaCreate,
        SetExpr::Select(_) | SetExpr::Values(_) | SetExpr::Table(_) => StatementKind::Query,
        SetExpr::Query(query) => query_kind(query),
        SetExpr::SetOperation { left, right, .. } => {
            combine(set_expr_kind(left), set_expr_kind(right))
        }
        SetExpr::Insert(_) => StatementKind::MutationInsert,
        SetExpr::Update(_) => StatementKind::MutationUpdate,
        SetExpr::Delete(_) => StatementKind::MutationDelete,
        SetExpr::Merge(_) => StatementKind::MutationMerge,
    }
}

/// Kind of a parsed statement, or `None` to defer to the leading keywords.
fn statement_kind(stmt: &Statement) -> Option<StatementKind> {
    let kind = match stmt {
        Statement::Query(query) => query_kind(query),
        Statement::Explain {
            analyze, statement, ..
        } => {
            if *analyze {
                // EXPLAIN ANALYZE runs the statement it explains.
                return Some(statement_kind(statement).unwrap_or(StatementKind::Unrecognized));
            }
            StatementKind::Describe
        }
        Statement::ExplainTable { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. } => StatementKind::Describe,
        Statement::Insert { .. } => StatementKind::MutationInsert,
        Statement::Update { .. } => StatementKind::MutationUpdate,
        Statement::Delete { .. } => StatementKind::MutationDelete,
        Statement::Merge { .. } => StatementKind::MutationMerge,
        Statement::Truncate { .. } => StatementKind::MutationTruncate,
        Statement::CreateTable { .. }
        | Statement::CreateView { .. }
        | Statement::CreateSchema { .. }
        | Statement::CreateDatabase { .. }
        | Statement::CreateIndex { .. }
        | Statement::CreateRole { .. }
        | Statement::CreateFunction { .. } => StatementKind::SchemaCreate,
        Statement::AlterTable { .. }
        | Statement::AlterIndex { .. }
        | Statement::AlterView { .. }
        | Statement::AlterRole { .. } => StatementKind::SchemaAlter,
        Statement::Drop { .. } => StatementKind::SchemaDrop,
        Statement::StartTransaction { .. }
        | Statement::Commit { .. }
        | Statement::Rollback { .. }
        | Statement::Savepoint { .. }
        | Statement::ReleaseSavepoint { .. } => StatementKind::TransactionControl,
        Statement::Use { .. } => StatementKind::SessionControl,
        Statement::Grant { .. }
        | Statement::Revoke { .. }
        | Statement::Copy { .. }
        | Statement::Kill { .. }
        | Statement::Call { .. } => StatementKind::AdministrativeCommand,
        _ => return None,
    };
    Some(kind)
}

/// Unquoted words of a statement, upper-cased, skipping leading parentheses.
fn leading_words(segment: &[Token]) -> Vec<String> {
    let mut words = Vec::new();
    for token in segment.iter().filter(|t| is_significant(t)) {
        match token {
            Token::LParen if words.is_empty() => continue,
            Token::Word(w) if w.quote_style.is_none() => {
                words.push(w.value.to_ascii_uppercase());
                if words.len() == 2 {
                    break;
                }
            }
            _ => break,
        }
    }
    words
}

/// First top-level verb after a `WITH` clause.
fn verb_after_with(segment: &[Token]) -> Option<String> {
    let mut depth = 0usize;
    for token in segment.iter().filter(|t| is_significant(t)) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Word(w) if depth == 0 && w.quote_style.is_none() => {
                let word = w.value.to_ascii_uppercase();
                if matches!(
                    word.as_str(),
                    "SELECT" | "VALUES" | "INSERT" | "UPDATE" | "DELETE" | "MERGE"
                ) {
                    return Some(word);
                }
            }
            _ => {}
        }
    }
    None
}

/// Kind from the leading keywords of a statement.
fn keyword_kind(segment: &[Token]) -> StatementKind {
    let words = leading_words(segment);
    let Some(first) = words.first() else {
        return StatementKind::Unrecognized;
    };
    let second = words.get(1).map(String::as_str);

    match first.as_str() {
        "WITH" => match verb_after_with(segment).as_deref() {
            Some("SELECT") | Some("VALUES") => StatementKind::Query,
            Some("INSERT") => StatementKind::MutationInsert,
            Some("UPDATE") => StatementKind::MutationUpdate,
            Some("DELETE") => StatementKind::MutationDelete,
            Some("MERGE") => StatementKind::MutationMerge,
            _ => StatementKind::Unrecognized,
        },
        "SELECT" | "VALUES" => StatementKind::Query,
        "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" | "LIST" | "LS" => StatementKind::Describe,
        "INSERT" => StatementKind::MutationInsert,
        "UPDATE" => StatementKind::MutationUpdate,
        "DELETE" => StatementKind::MutationDelete,
        "MERGE" => StatementKind::MutationMerge,
        "TRUNCATE" => StatementKind::MutationTruncate,
        "CREATE" | "UNDROP" => StatementKind::SchemaCreate,
        "ALTER" if second == Some("SESSION") => StatementKind::SessionControl,
        "ALTER" | "COMMENT" => StatementKind::SchemaAlter,
        "DROP" => StatementKind::SchemaDrop,
        "BEGIN" | "START" | "COMMIT" | "ROLLBACK" | "SAVEPOINT" | "RELEASE" | "END"
        | "ABORT" => StatementKind::TransactionControl,
        "USE" | "SET" | "UNSET" | "RESET" => StatementKind::SessionControl,
        "GRANT" | "REVOKE" | "CALL" | "EXECUTE" | "EXEC" | "KILL" | "COPY" | "PUT" | "GET"
        | "REMOVE" | "RM" => StatementKind::AdministrativeCommand,
        _ => StatementKind::Unrecognized,
    }
}
