//! A small in-memory stand-in for the deductive engine, used only by
//! this crate's integration tests. It is not a differential evaluator:
//! on every commit it recomputes every declared view from scratch over
//! the post-update input rows and diffs the result against what was
//! previously committed, which is sufficient for the non-recursive,
//! single-source-relation rule shape this facade ever emits.

use std::collections::HashMap;

use ddlog_sql_facade::codec::EngineValue;
use ddlog_sql_facade::engine::{Command, CommandKind, Engine, RelationId};
use ddlog_sql_facade::error::{Error, Result};
use ddlog_sql_facade::ir::{BinOp, BodyFragment, Expr, Literal, Program, RelationRole, Rule};
use ddlog_sql_facade::naming;
use ddlog_sql_facade::Catalog;
use indexmap::IndexSet;

pub type Record = Vec<EngineValue>;

pub struct MockEngine {
    program: Program,
    ids: HashMap<String, RelationId>,
    names: HashMap<RelationId, String>,
    next_id: RelationId,
    committed: HashMap<String, IndexSet<Record>>,
    pending: Vec<Command>,
    pk_indices: HashMap<String, Vec<usize>>,
}

impl MockEngine {
    pub fn new(program: Program, catalog: &Catalog) -> Self {
        let mut engine = MockEngine {
            program: program.clone(),
            ids: HashMap::new(),
            names: HashMap::new(),
            next_id: 0,
            committed: HashMap::new(),
            pending: Vec::new(),
            pk_indices: HashMap::new(),
        };

        for relation in &program.relations {
            let id = engine.next_id;
            engine.next_id += 1;
            engine.ids.insert(relation.name.clone(), id);
            engine.names.insert(id, relation.name.clone());
            engine.committed.insert(relation.name.clone(), IndexSet::new());

            if relation.role == RelationRole::Input {
                let table_name = naming::strip_prefix_to_table_name(&relation.name)
                    .expect("well-formed input relation name");
                let table = catalog
                    .require_table(&table_name)
                    .expect("catalog and program agree on declared tables");
                let indices = table
                    .primary_key
                    .iter()
                    .map(|pk| table.column_index(pk).expect("pk column exists"))
                    .collect();
                engine.pk_indices.insert(relation.name.clone(), indices);
            }
        }

        engine
    }
}

impl Engine for MockEngine {
    fn get_table_id(&self, relation_name: &str) -> Result<RelationId> {
        self.ids
            .get(relation_name)
            .copied()
            .ok_or_else(|| Error::unknown("relation", relation_name))
    }

    fn get_table_name(&self, relation_id: RelationId) -> Result<String> {
        self.names
            .get(&relation_id)
            .cloned()
            .ok_or_else(|| Error::invariant(format!("no relation registered for id {relation_id}")))
    }

    fn transaction_start(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }

    fn apply_updates(&mut self, commands: &[Command]) -> Result<()> {
        self.pending.extend_from_slice(commands);
        Ok(())
    }

    fn transaction_commit_dump_changes(
        &mut self,
        on_change: &mut dyn FnMut(Command) -> Result<()>,
    ) -> Result<()> {
        let mut working = self.committed.clone();

        for command in self.pending.drain(..) {
            let name = self
                .names
                .get(&command.relation)
                .cloned()
                .ok_or_else(|| Error::invariant("staged command names an unknown relation"))?;
            let set = working
                .get_mut(&name)
                .ok_or_else(|| Error::invariant(format!("no working set for `{name}`")))?;
            match command.kind {
                CommandKind::Insert => {
                    set.insert(command.record);
                }
                CommandKind::DeleteKey => {
                    let indices = self
                        .pk_indices
                        .get(&name)
                        .ok_or_else(|| Error::invariant(format!("`{name}` has no primary key indices")))?;
                    let match_pos = set.iter().position(|row| {
                        indices
                            .iter()
                            .zip(&command.record)
                            .all(|(&idx, key_val)| &row[idx] == key_val)
                    });
                    if let Some(pos) = match_pos {
                        set.shift_remove_index(pos);
                    }
                }
                CommandKind::DeleteVal => {
                    set.shift_remove(&command.record);
                }
            }
        }

        // Internal relations (the per-view projection's backing relation,
        // spec §4.3) are recomputed too, in declaration order, since an
        // `Output` relation's rule may read from one instead of directly
        // from an `Input` relation — but only `Input`/`Output` rows are
        // ever reported through the change stream.
        for relation in &self.program.relations {
            if relation.role == RelationRole::Input {
                continue;
            }
            let rule = self
                .program
                .rules
                .iter()
                .find(|r| r.head.relation == relation.name)
                .ok_or_else(|| Error::invariant(format!("relation `{}` has no rule", relation.name)))?;
            let rows = eval_rule(&self.program, rule, &working)?;
            working.insert(relation.name.clone(), rows);
        }

        let mut diffs = Vec::new();
        for relation in &self.program.relations {
            if relation.role == RelationRole::Internal {
                continue;
            }
            let name = &relation.name;
            let new_rows = &working[name];
            let old_rows = &self.committed[name];
            let relation_id = self.ids[name];
            for row in new_rows {
                if !old_rows.contains(row) {
                    diffs.push(Command::insert(relation_id, row.clone()));
                }
            }
            for row in old_rows {
                if !new_rows.contains(row) {
                    diffs.push(Command {
                        relation: relation_id,
                        kind: CommandKind::DeleteVal,
                        record: row.clone(),
                    });
                }
            }
        }

        self.committed = working;
        for command in diffs {
            on_change(command)?;
        }
        Ok(())
    }

    fn transaction_rollback(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }
}

type Env = HashMap<String, (Record, String)>;

fn eval_rule(program: &Program, rule: &Rule, working: &HashMap<String, IndexSet<Record>>) -> Result<IndexSet<Record>> {
    let first = rule
        .body
        .first()
        .ok_or_else(|| Error::invariant("rule body is empty"))?;
    let (source_relation, source_var) = match first {
        BodyFragment::Literal(atom) => {
            let var = atom
                .row
                .as_var()
                .ok_or_else(|| Error::invariant("rule head atom row is not a plain variable"))?;
            (atom.relation.clone(), var.clone())
        }
        BodyFragment::Condition(_) => {
            return Err(Error::invariant("rule body does not start with a source atom"))
        }
    };
    let source_type = program
        .relation(&source_relation)
        .ok_or_else(|| Error::invariant(format!("unknown source relation `{source_relation}`")))?
        .row_type
        .clone();
    let source_rows = working
        .get(&source_relation)
        .ok_or_else(|| Error::invariant(format!("no working rows for `{source_relation}`")))?;

    let head_var = rule
        .head
        .row
        .as_var()
        .ok_or_else(|| Error::invariant("rule head row is not a plain variable"))?;

    let mut out = IndexSet::new();
    'rows: for row in source_rows {
        let mut env: Env = HashMap::new();
        env.insert(source_var.clone(), (row.clone(), source_type.clone()));

        for fragment in &rule.body[1..] {
            match fragment {
                BodyFragment::Literal(_) => {
                    return Err(Error::invariant("joins are not supported by this evaluator"))
                }
                BodyFragment::Condition(Expr::Assign(lhs, rhs)) => {
                    let var = lhs
                        .as_var_decl()
                        .ok_or_else(|| Error::invariant("assign left side is not a declaration"))?;
                    let (record, type_name) = eval_struct_ctor(rhs, &env, program)?;
                    env.insert(var.clone(), (record, type_name));
                }
                BodyFragment::Condition(expr) => {
                    if !eval_bool(expr, &env, program)? {
                        continue 'rows;
                    }
                }
            }
        }

        let (record, _) = env
            .get(head_var)
            .cloned()
            .ok_or_else(|| Error::invariant(format!("head variable `{head_var}` never bound")))?;
        out.insert(record);
    }
    Ok(out)
}

fn eval_struct_ctor(expr: &Expr, env: &Env, program: &Program) -> Result<(Record, String)> {
    match expr {
        Expr::StructCtor(type_name, fields) => {
            let mut record = Vec::with_capacity(fields.len());
            for (_, field_expr) in fields {
                record.push(eval_scalar(field_expr, env, program)?);
            }
            Ok((record, type_name.clone()))
        }
        other => Err(Error::invariant(format!("expected a struct constructor, got {other:?}"))),
    }
}

fn eval_scalar(expr: &Expr, env: &Env, program: &Program) -> Result<EngineValue> {
    match expr {
        Expr::FieldAccess(inner, field) => {
            let var = inner
                .as_var()
                .ok_or_else(|| Error::invariant("field access base is not a plain variable"))?;
            let (record, type_name) = env
                .get(var)
                .ok_or_else(|| Error::invariant(format!("unbound variable `{var}`")))?;
            let type_def = program
                .type_def(type_name)
                .ok_or_else(|| Error::invariant(format!("unknown type-def `{type_name}`")))?;
            let idx = type_def
                .ty
                .fields
                .iter()
                .position(|f| &f.name == field)
                .ok_or_else(|| Error::invariant(format!("unknown field `{field}` on `{type_name}`")))?;
            Ok(record[idx].clone())
        }
        Expr::Literal(Literal::Bool(b)) => Ok(EngineValue::Bool(*b)),
        Expr::Literal(Literal::Int(text)) => text
            .parse()
            .map(EngineValue::Signed)
            .map_err(|_| Error::invariant(format!("invalid integer literal `{text}`"))),
        Expr::Literal(Literal::Str(s)) => Ok(EngineValue::Str(s.clone())),
        other => Err(Error::invariant(format!("expected a scalar expression, got {other:?}"))),
    }
}

fn eval_bool(expr: &Expr, env: &Env, program: &Program) -> Result<bool> {
    match expr {
        Expr::BinOp(BinOp::And, l, r) => Ok(eval_bool(l, env, program)? && eval_bool(r, env, program)?),
        Expr::BinOp(BinOp::Or, l, r) => Ok(eval_bool(l, env, program)? || eval_bool(r, env, program)?),
        Expr::BinOp(op, l, r) => {
            let lv = eval_scalar(l, env, program)?;
            let rv = eval_scalar(r, env, program)?;
            compare(*op, &lv, &rv)
        }
        other => Err(Error::invariant(format!("expected a boolean expression, got {other:?}"))),
    }
}

fn compare(op: BinOp, lv: &EngineValue, rv: &EngineValue) -> Result<bool> {
    use std::cmp::Ordering;
    // A nullable column's value is wrapped (`EngineValue::Option`) while a
    // literal never is; unwrap `Some` before comparing and treat `None` the
    // way SQL treats a comparison against NULL — never satisfied.
    if let EngineValue::Option(opt) = lv {
        return match opt {
            None => Ok(false),
            Some(inner) => compare(op, inner, rv),
        };
    }
    if let EngineValue::Option(opt) = rv {
        return match opt {
            None => Ok(false),
            Some(inner) => compare(op, lv, inner),
        };
    }
    let ordering = match (lv, rv) {
        (EngineValue::Bool(a), EngineValue::Bool(b)) => a.cmp(b),
        (EngineValue::Signed(a), EngineValue::Signed(b)) => a.cmp(b),
        (EngineValue::Str(a), EngineValue::Str(b)) => a.cmp(b),
        (EngineValue::Arbitrary(a), EngineValue::Arbitrary(b)) => {
            let a: i128 = a.parse().map_err(|_| Error::invariant("invalid bigint in comparison"))?;
            let b: i128 = b.parse().map_err(|_| Error::invariant("invalid bigint in comparison"))?;
            a.cmp(&b)
        }
        _ => return Err(Error::invariant("comparison between mismatched engine value kinds")),
    };
    Ok(match op {
        BinOp::Eq => ordering == Ordering::Equal,
        BinOp::NotEq => ordering != Ordering::Equal,
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::LtEq => ordering != Ordering::Greater,
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::GtEq => ordering != Ordering::Less,
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    })
}
