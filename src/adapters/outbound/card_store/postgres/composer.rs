//! Parameterized query composition for card and set finds.
//!
//! User values only ever reach the database as positional `$n` arguments. One
//! [`Placeholders`] counter is threaded through every predicate in emission
//! order; nested `EXISTS` groups reserve their range from the same counter
//! before rendering, so numbering stays consecutive across the whole query.

use crate::adapters::outbound::card_store::postgres::queries::{
    CARD_COLUMNS, CARD_ORDER, SET_COLUMNS, SET_ORDER,
};
use crate::domain::{any_pattern, CardFilter, RefFilter, SetFilter};
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ComposeError {
    #[error("Placeholder reservation {0:?} exhausted")]
    ReservationExhausted(Range<usize>),
    #[error("Placeholder reservation {range:?} left {unused} numbers unused")]
    ReservationUnused { range: Range<usize>, unused: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SqlArg {
    Text(String),
    Float(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Composed {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

impl Composed {
    /// The text between `WHERE` and `ORDER BY`.
    #[must_use]
    pub fn where_clause(&self) -> &str {
        let start = self.sql.find("WHERE").map_or(0, |index| index + "WHERE".len());
        let end = self.sql.find("ORDER BY").unwrap_or(self.sql.len());
        self.sql[start..end].trim()
    }
}

#[derive(Debug)]
pub struct Placeholders {
    next: usize,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl Placeholders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.next
    }

    pub fn next(&mut self) -> usize {
        let number = self.next;
        self.next += 1;
        number
    }

    /// Claims `count` consecutive numbers starting at the current position.
    pub fn reserve(&mut self, count: usize) -> Reservation {
        let range = self.next..self.next + count;
        self.next = range.end;
        Reservation {
            next: range.start,
            range,
        }
    }
}

#[derive(Debug)]
pub struct Reservation {
    range: Range<usize>,
    next: usize,
}

impl Reservation {
    pub fn take(&mut self) -> Result<usize, ComposeError> {
        if self.next >= self.range.end {
            return Err(ComposeError::ReservationExhausted(self.range.clone()));
        }
        let number = self.next;
        self.next += 1;
        Ok(number)
    }

    pub fn finish(self) -> Result<(), ComposeError> {
        match self.range.end - self.next {
            0 => Ok(()),
            unused => Err(ComposeError::ReservationUnused {
                range: self.range,
                unused,
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Match {
    /// Case-insensitive POSIX regex.
    Regex,
    /// Case-sensitive POSIX regex.
    RegexExact,
    Equal,
    EqualIgnoreCase,
}

impl Match {
    fn render(self, column: &str, number: usize) -> String {
        match self {
            Match::Regex => format!("{column} ~* ${number}"),
            Match::RegexExact => format!("{column} ~ ${number}"),
            Match::Equal => format!("{column} = ${number}"),
            Match::EqualIgnoreCase => format!("lower({column}) = lower(${number})"),
        }
    }
}

struct Condition {
    column: &'static str,
    kind: Match,
    arg: SqlArg,
}

/// An `EXISTS` over a referenced table, correlated on the card's foreign key.
struct SubQuery {
    table: &'static str,
    alias: &'static str,
    correlation: &'static str,
    conditions: Vec<Condition>,
}

impl SubQuery {
    fn reference(
        table: &'static str,
        alias: &'static str,
        correlation: &'static str,
        columns: [&'static str; 3],
        filter: &RefFilter,
    ) -> Self {
        let [id, name, alias_column] = columns;
        let mut conditions = Vec::new();
        if let Some(value) = &filter.id {
            conditions.push(Condition {
                column: id,
                kind: Match::Equal,
                arg: SqlArg::Text(value.clone()),
            });
        }
        if let Some(value) = &filter.name {
            conditions.push(Condition {
                column: name,
                kind: Match::Regex,
                arg: SqlArg::Text(value.clone()),
            });
        }
        if let Some(value) = &filter.alias {
            conditions.push(Condition {
                column: alias_column,
                kind: Match::EqualIgnoreCase,
                arg: SqlArg::Text(value.clone()),
            });
        }

        Self {
            table,
            alias,
            correlation,
            conditions,
        }
    }
}

/// Accumulates predicates and their arguments in emission order.
#[derive(Default)]
struct Composer {
    placeholders: Placeholders,
    predicates: Vec<String>,
    args: Vec<SqlArg>,
}

impl Composer {
    fn push(&mut self, column: &str, kind: Match, arg: SqlArg) {
        let number = self.placeholders.next();
        self.predicates.push(kind.render(column, number));
        self.args.push(arg);
    }

    fn push_with<F>(&mut self, render: F, arg: SqlArg)
    where
        F: FnOnce(usize) -> String,
    {
        let number = self.placeholders.next();
        self.predicates.push(render(number));
        self.args.push(arg);
    }

    fn push_exists(&mut self, sub: SubQuery) -> Result<(), ComposeError> {
        if sub.conditions.is_empty() {
            return Ok(());
        }

        let mut reservation = self.placeholders.reserve(sub.conditions.len());
        let mut rendered = vec![format!("{}.id = {}", sub.alias, sub.correlation)];
        for condition in sub.conditions {
            let number = reservation.take()?;
            rendered.push(condition.kind.render(condition.column, number));
            self.args.push(condition.arg);
        }
        reservation.finish()?;

        self.predicates.push(format!(
            "EXISTS (SELECT 1 FROM {} {} WHERE {})",
            sub.table,
            sub.alias,
            rendered.join(" AND ")
        ));
        Ok(())
    }

    fn finish(self, select: &str, from: &str, live: &str, order: &str) -> Composed {
        let mut clauses = vec![live.to_string()];
        clauses.extend(self.predicates);
        Composed {
            sql: format!(
                "SELECT {select}\nFROM {from}\nWHERE {}\nORDER BY {order}",
                clauses.join("\n  AND ")
            ),
            args: self.args,
        }
    }
}

/// Returns `None` for an empty filter; callers must not query in that case.
pub fn compose_cards(filter: &CardFilter) -> Result<Option<Composed>, ComposeError> {
    if filter.is_empty() {
        return Ok(None);
    }

    let mut composer = Composer::default();

    if let Some(name) = &filter.name {
        composer.push("card.name", Match::Regex, SqlArg::Text(name.clone()));
    }

    if let Some(types) = &filter.types {
        composer.push_with(
            |number| {
                format!(
                    "EXISTS (SELECT 1 FROM unnest(card.types) AS card_type(value) WHERE card_type.value ~* ${number})"
                )
            },
            SqlArg::Text(any_pattern(types)),
        );
    }

    if let Some(costs) = &filter.costs {
        composer.push(
            "array_to_string(card.costs, '')",
            Match::RegexExact,
            SqlArg::Text(any_pattern(costs)),
        );
    }

    if let Some(number_cost) = filter.number_cost {
        composer.push("card.number_cost", Match::Equal, SqlArg::Float(number_cost));
    }

    if let Some(set) = &filter.set {
        composer.push_exists(SubQuery::reference(
            "expansion",
            "s",
            "card.id_set",
            ["s.id", "s.name", "s.alias"],
            set,
        ))?;
    }

    if let Some(rarity) = &filter.rarity {
        composer.push_exists(SubQuery::reference(
            "rarity",
            "r",
            "card.id_rarity",
            ["r.id", "r.name", "r.alias"],
            rarity,
        ))?;
    }

    Ok(Some(composer.finish(
        CARD_COLUMNS,
        "card",
        "card.deleted_at IS NULL",
        CARD_ORDER,
    )))
}

pub fn compose_sets(filter: &SetFilter) -> Result<Composed, ComposeError> {
    let mut composer = Composer::default();

    if let Some(name) = &filter.name {
        composer.push("expansion.name", Match::Regex, SqlArg::Text(name.clone()));
    }

    if let Some(alias) = &filter.alias {
        composer.push(
            "expansion.alias",
            Match::EqualIgnoreCase,
            SqlArg::Text(alias.clone()),
        );
    }

    Ok(composer.finish(
        SET_COLUMNS,
        "expansion",
        "expansion.deleted_at IS NULL",
        SET_ORDER,
    ))
}
