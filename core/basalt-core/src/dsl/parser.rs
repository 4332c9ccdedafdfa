//! Command parsing: from a matched line to an operator descriptor.
//!
//! Classification already happened against the command table, so parsing
//! is argument extraction: take the text between the parentheses, split
//! on commas, strip quotes. Name resolution waits for the executor.

use crate::dsl::commands::{CommandKind, CommandSet};
use crate::engine::kernels::{ExtremeKind, VectorKind};
use crate::engine::plan::DbOperator;
use crate::engine::scan::Comparator;
use crate::error::{BasaltError, BasaltResult};
use crate::storage::IndexKind;

impl CommandSet {
    /// Parse one input line into a descriptor.
    pub fn parse(&self, line: &str) -> BasaltResult<DbOperator> {
        let line = line.trim();
        let Some(kind) = self.classify(line) else {
            return Err(BasaltError::BadFormat(format!(
                "no matching command: '{line}'"
            )));
        };
        match kind {
            CommandKind::CreateDb => {
                let args = split_args(line)?;
                Ok(DbOperator::CreateDb {
                    name: unquote(arg(&args, 1)?).to_string(),
                })
            }
            CommandKind::CreateTable => {
                let args = split_args(line)?;
                let tbl = unquote(arg(&args, 1)?);
                let db = arg(&args, 2)?;
                let columns = parse_number(arg(&args, 3)?)? as usize;
                Ok(DbOperator::CreateTable {
                    name: format!("{db}.{tbl}"),
                    db: db.to_string(),
                    columns,
                })
            }
            CommandKind::CreateColumn => {
                let args = split_args(line)?;
                let col = unquote(arg(&args, 1)?);
                let table = arg(&args, 2)?;
                let sorted = arg(&args, 3)? == "sorted";
                Ok(DbOperator::CreateColumn {
                    name: format!("{table}.{col}"),
                    table: table.to_string(),
                    sorted,
                })
            }
            CommandKind::CreateIndex => {
                let args = split_args(line)?;
                let column = arg(&args, 1)?.to_string();
                let kind = match arg(&args, 2)? {
                    "sorted" => IndexKind::Sorted,
                    "btree" => IndexKind::BTree,
                    other => {
                        return Err(BasaltError::InvalidOperand(format!(
                            "unsupported index kind '{other}'"
                        )));
                    }
                };
                Ok(DbOperator::CreateIndex { column, kind })
            }
            CommandKind::Insert => {
                let args = split_args(line)?;
                let table = arg(&args, 0)?.to_string();
                let values = args[1..]
                    .iter()
                    .map(|v| parse_number(v))
                    .collect::<BasaltResult<Vec<i64>>>()?;
                Ok(DbOperator::Insert { table, values })
            }
            CommandKind::SelectColumn => {
                let (out, rest) = split_binding(line)?;
                let args = split_args(rest)?;
                Ok(DbOperator::Select {
                    column: arg(&args, 0)?.to_string(),
                    input: None,
                    comparator: range_comparator(arg(&args, 1)?, arg(&args, 2)?)?,
                    out,
                })
            }
            CommandKind::SelectPos => {
                let (out, rest) = split_binding(line)?;
                let args = split_args(rest)?;
                Ok(DbOperator::Select {
                    column: arg(&args, 1)?.to_string(),
                    input: Some(arg(&args, 0)?.to_string()),
                    comparator: range_comparator(arg(&args, 2)?, arg(&args, 3)?)?,
                    out,
                })
            }
            CommandKind::Fetch => {
                let (out, rest) = split_binding(line)?;
                let args = split_args(rest)?;
                Ok(DbOperator::Fetch {
                    column: arg(&args, 0)?.to_string(),
                    positions: arg(&args, 1)?.to_string(),
                    out,
                })
            }
            CommandKind::Extreme => {
                let (out, rest) = split_binding(line)?;
                let args = split_args(rest)?;
                Ok(DbOperator::Extreme {
                    vec: arg(&args, 0)?.to_string(),
                    kind: extreme_kind(rest)?,
                    out,
                })
            }
            CommandKind::ExtremeIndex => {
                let (outs, rest) = split_binding(line)?;
                let Some((out_pos, out_val)) = outs.split_once(',') else {
                    return Err(BasaltError::BadFormat(
                        "expected two result names before '='".into(),
                    ));
                };
                let args = split_args(rest)?;
                let vec_pos = match arg(&args, 0)? {
                    "null" => None,
                    name => Some(name.to_string()),
                };
                Ok(DbOperator::ExtremeWithIndex {
                    vec_val: arg(&args, 1)?.to_string(),
                    vec_pos,
                    kind: extreme_kind(rest)?,
                    out_pos: out_pos.to_string(),
                    out_val: out_val.to_string(),
                })
            }
            CommandKind::Average => {
                let (out, rest) = split_binding(line)?;
                let args = split_args(rest)?;
                Ok(DbOperator::Average {
                    vec: arg(&args, 0)?.to_string(),
                    out,
                })
            }
            CommandKind::VectorOp => {
                let (out, rest) = split_binding(line)?;
                let args = split_args(rest)?;
                let kind = if rest.starts_with("add") {
                    VectorKind::Add
                } else {
                    VectorKind::Sub
                };
                Ok(DbOperator::VectorOp {
                    a: arg(&args, 0)?.to_string(),
                    b: arg(&args, 1)?.to_string(),
                    kind,
                    out,
                })
            }
            CommandKind::Tuple => {
                let args = split_args(line)?;
                Ok(DbOperator::Print {
                    columns: args.iter().map(|s| s.to_string()).collect(),
                })
            }
            CommandKind::Load => Ok(DbOperator::Load),
            CommandKind::Shutdown => Ok(DbOperator::Shutdown),
        }
    }
}

/// Text between the first `(` and the last `)`, split on commas.
fn split_args(line: &str) -> BasaltResult<Vec<&str>> {
    let open = line
        .find('(')
        .ok_or_else(|| BasaltError::BadFormat(format!("missing '(' in '{line}'")))?;
    let close = line
        .rfind(')')
        .filter(|&c| c > open)
        .ok_or_else(|| BasaltError::BadFormat(format!("missing ')' in '{line}'")))?;
    Ok(line[open + 1..close].split(',').map(str::trim).collect())
}

/// Split `out=rest` on the first `=`.
fn split_binding(line: &str) -> BasaltResult<(String, &str)> {
    let Some((out, rest)) = line.split_once('=') else {
        return Err(BasaltError::BadFormat(format!(
            "expected a result binding in '{line}'"
        )));
    };
    Ok((out.trim().to_string(), rest))
}

fn arg<'a>(args: &[&'a str], i: usize) -> BasaltResult<&'a str> {
    args.get(i)
        .copied()
        .ok_or_else(|| BasaltError::BadFormat(format!("missing argument {i}")))
}

fn unquote(s: &str) -> &str {
    s.trim_matches('"')
}

fn parse_number(s: &str) -> BasaltResult<i64> {
    s.parse()
        .map_err(|_| BasaltError::BadFormat(format!("'{s}' is not an integer")))
}

/// A bound argument: a number or the word `null`.
fn parse_bound(s: &str) -> BasaltResult<Option<i64>> {
    if s == "null" {
        Ok(None)
    } else {
        parse_number(s).map(Some)
    }
}

fn range_comparator(lo: &str, hi: &str) -> BasaltResult<Comparator> {
    Ok(Comparator::range(parse_bound(lo)?, parse_bound(hi)?))
}

fn extreme_kind(rest: &str) -> BasaltResult<ExtremeKind> {
    if rest.starts_with("min") {
        Ok(ExtremeKind::Min)
    } else if rest.starts_with("max") {
        Ok(ExtremeKind::Max)
    } else {
        Err(BasaltError::BadFormat(format!(
            "unknown aggregate in '{rest}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scan::CompareKind;

    fn parse(line: &str) -> DbOperator {
        CommandSet::new().parse(line).unwrap()
    }

    #[test]
    fn parse_create_db() {
        let DbOperator::CreateDb { name } = parse(r#"create(db,"db1")"#) else {
            panic!("wrong operator");
        };
        assert_eq!(name, "db1");
    }

    #[test]
    fn parse_create_table_qualifies_name() {
        let DbOperator::CreateTable { name, db, columns } = parse(r#"create(tbl,"tbl1",db1,4)"#)
        else {
            panic!("wrong operator");
        };
        assert_eq!(name, "db1.tbl1");
        assert_eq!(db, "db1");
        assert_eq!(columns, 4);
    }

    #[test]
    fn parse_create_column_variants() {
        let DbOperator::CreateColumn { name, table, sorted } =
            parse(r#"create(col,"a",db1.tbl1,sorted)"#)
        else {
            panic!("wrong operator");
        };
        assert_eq!(name, "db1.tbl1.a");
        assert_eq!(table, "db1.tbl1");
        assert!(sorted);

        let DbOperator::CreateColumn { sorted, .. } = parse(r#"create(col,"b",db1.tbl1,unsorted)"#)
        else {
            panic!("wrong operator");
        };
        assert!(!sorted);
    }

    #[test]
    fn parse_create_index() {
        let DbOperator::CreateIndex { column, kind } = parse("create(idx,db1.tbl1.b,btree)") else {
            panic!("wrong operator");
        };
        assert_eq!(column, "db1.tbl1.b");
        assert_eq!(kind, IndexKind::BTree);
    }

    #[test]
    fn parse_insert_values() {
        let DbOperator::Insert { table, values } = parse("relational_insert(db1.tbl1,3,30)") else {
            panic!("wrong operator");
        };
        assert_eq!(table, "db1.tbl1");
        assert_eq!(values, vec![3, 30]);
    }

    #[test]
    fn parse_select_column_builds_range() {
        let DbOperator::Select {
            column,
            input,
            comparator,
            out,
        } = parse("p1=select(db1.tbl1.a,2,null)")
        else {
            panic!("wrong operator");
        };
        assert_eq!(column, "db1.tbl1.a");
        assert!(input.is_none());
        assert_eq!(out, "p1");
        assert_eq!(comparator.clauses.len(), 1);
        assert_eq!(comparator.clauses[0].kind, CompareKind::GreaterEq);
        assert_eq!(comparator.clauses[0].value, 2);
    }

    #[test]
    fn parse_select_pos_carries_input() {
        let DbOperator::Select {
            column,
            input,
            comparator,
            ..
        } = parse("p2=select(p1,v1,2,8)")
        else {
            panic!("wrong operator");
        };
        assert_eq!(column, "v1");
        assert_eq!(input.as_deref(), Some("p1"));
        assert_eq!(comparator.clauses.len(), 2);
    }

    #[test]
    fn parse_fetch() {
        let DbOperator::Fetch {
            column,
            positions,
            out,
        } = parse("v1=fetch(db1.tbl1.b,p1)")
        else {
            panic!("wrong operator");
        };
        assert_eq!(column, "db1.tbl1.b");
        assert_eq!(positions, "p1");
        assert_eq!(out, "v1");
    }

    #[test]
    fn parse_extreme_and_average() {
        let DbOperator::Extreme { vec, kind, out } = parse("m=max(v1)") else {
            panic!("wrong operator");
        };
        assert_eq!((vec.as_str(), kind, out.as_str()), ("v1", ExtremeKind::Max, "m"));

        let DbOperator::Average { vec, out } = parse("a=avg(v1)") else {
            panic!("wrong operator");
        };
        assert_eq!((vec.as_str(), out.as_str()), ("v1", "a"));
    }

    #[test]
    fn parse_extreme_index_with_null_positions() {
        let DbOperator::ExtremeWithIndex {
            vec_val,
            vec_pos,
            kind,
            out_pos,
            out_val,
        } = parse("p,v=min(null,v1)")
        else {
            panic!("wrong operator");
        };
        assert_eq!(vec_val, "v1");
        assert!(vec_pos.is_none());
        assert_eq!(kind, ExtremeKind::Min);
        assert_eq!((out_pos.as_str(), out_val.as_str()), ("p", "v"));
    }

    #[test]
    fn parse_vector_ops() {
        let DbOperator::VectorOp { a, b, kind, out } = parse("s=add(v1,v2)") else {
            panic!("wrong operator");
        };
        assert_eq!((a.as_str(), b.as_str(), kind, out.as_str()), ("v1", "v2", VectorKind::Add, "s"));
    }

    #[test]
    fn parse_tuple() {
        let DbOperator::Print { columns } = parse("tuple(v1,v2,v3)") else {
            panic!("wrong operator");
        };
        assert_eq!(columns, vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn parse_load_and_shutdown() {
        assert!(matches!(parse(r#"load("/tmp/x.csv")"#), DbOperator::Load));
        assert!(matches!(parse("shutdown"), DbOperator::Shutdown));
    }

    #[test]
    fn unknown_command_is_bad_format() {
        let err = CommandSet::new().parse("frobnicate()").unwrap_err();
        assert!(matches!(err, BasaltError::BadFormat(_)));
    }

    #[test]
    fn malformed_insert_value_is_bad_format() {
        let err = CommandSet::new()
            .parse("relational_insert(db1.tbl1,3,thirty)")
            .unwrap_err();
        assert!(matches!(err, BasaltError::BadFormat(_)));
    }
}
