//! Layout of units, declarations, blocks and statements

use super::aligner::{runs, Columns};
use super::Rewriter;
use crate::parser::{
    Block, DataType, Declaration, Expr, ForRange, Handler, IfStmt, Label, LoopScheme, LoopStmt,
    Modifier, OpenSource, PackageDef, Param, ParamList, Script, Statement, StatementKind,
    Subprogram, SubprogramBody, Tok, TriggerDef, TypeArgs, TypeDef, Unit, UnitBody, ViewDef,
};
use crate::profile::LabelPlacement;

/// Gap between aligned declaration cells
const DECLARATION_GAP: usize = 2;

fn last_ends_with_end(statements: &[Statement]) -> bool {
    statements.last().is_some_and(Statement::ends_with_end)
}

impl Rewriter<'_> {
    pub(super) fn script(&mut self, script: &Script) {
        for (i, unit) in script.units.iter().enumerate() {
            self.set_indent(0);
            if i > 0 {
                if self.style.blank_lines_around_declarations {
                    self.w.blank_line();
                } else {
                    self.w.newline();
                }
            }
            self.unit(unit);
        }
        self.set_indent(0);
        self.comments(script.eof);
    }

    fn unit(&mut self, unit: &Unit) {
        match &unit.body {
            UnitBody::Package(package) => self.package(package),
            UnitBody::Subprogram(create) => {
                self.toks(&create.header);
                self.subprogram(&create.subprogram);
            }
            UnitBody::Trigger(trigger) => self.trigger(trigger),
            UnitBody::View(view) => self.view(view),
            UnitBody::Block(block) => self.block(block, false),
            UnitBody::Sql(sql) => self.sql_statement(sql),
        }
        if let Some(slash) = unit.slash {
            self.line(0);
            self.tok(slash);
        }
    }

    fn package(&mut self, package: &PackageDef) {
        let base = self.indent();
        let inner = base + self.style.indent;
        self.toks(&package.header);
        self.name(package.name);
        for modifier in &package.modifiers {
            self.modifier(modifier);
        }
        self.tok(package.is_kw);

        if !package.items.is_empty() {
            self.set_indent(inner);
            self.member_break();
            self.declarations(&package.items, true);
        }
        let mut after_end = package.items.last().is_some_and(Declaration::ends_with_end);
        if let Some((begin, body)) = &package.init {
            self.set_indent(base);
            if self.style.blank_lines_around_declarations {
                self.w.blank_line();
            } else {
                self.w.newline();
            }
            self.tok(*begin);
            self.statements(body, inner);
            after_end = last_ends_with_end(body);
        }

        self.set_indent(base);
        if self.style.blank_lines_around_declarations && !package.items.is_empty() {
            self.w.blank_line();
        }
        self.break_after(after_end);
        self.tok(package.end_kw);
        if let Some(name) = package.end_name {
            self.tok(name);
        }
        self.attach(package.semi);
    }

    /// Header clauses one per line below the name, the body back at the margin
    fn trigger(&mut self, trigger: &TriggerDef) {
        let base = self.indent();
        let inner = base + self.style.indent;
        self.toks(&trigger.header);
        self.name(trigger.name);
        self.line(inner);
        self.toks(&trigger.timing);
        for event in &trigger.events {
            if let Some(or_kw) = event.or_kw {
                self.tok(or_kw);
            }
            self.tok(event.kw);
            if let Some((of, columns)) = &event.of {
                self.tok(*of);
                self.inline_list(columns, |r, column| r.tok(*column));
            }
        }
        self.tok(trigger.on_kw);
        self.name(trigger.table);
        for clause in [&trigger.referencing, &trigger.for_each_row] {
            if !clause.is_empty() {
                self.line(inner);
                self.toks(clause);
            }
        }
        if let Some((when, cond)) = &trigger.when {
            self.line(inner);
            self.tok(*when);
            self.arg_list(cond, true);
        }
        self.line(base);
        self.block(&trigger.body, false);
    }

    fn view(&mut self, view: &ViewDef) {
        let base = self.indent();
        self.toks(&view.header);
        self.name(view.name);
        if let Some(columns) = &view.columns {
            self.arg_list(columns, true);
        }
        self.tok(view.as_kw);
        self.query(&view.query, base);
        if !view.options.is_empty() {
            self.short_clause(&view.options, base);
        }
        self.set_indent(base);
        if let Some(semi) = view.semi {
            self.attach(semi);
        }
    }

    /// Break between `is`/`as` and the first member
    fn member_break(&mut self) {
        if self.layout.header_joins_first_member {
            return;
        }
        if self.style.blank_lines_around_declarations {
            self.w.blank_line();
        } else {
            self.w.newline();
        }
    }

    fn modifier(&mut self, modifier: &Modifier) {
        match modifier {
            Modifier::Word(t) => self.tok(*t),
            Modifier::Authid { kw, value } => {
                self.tok(*kw);
                self.tok(*value);
            }
            Modifier::AccessibleBy {
                kws,
                open,
                accessors,
                close,
            } => {
                self.toks(kws);
                self.tok(*open);
                self.inline_list(accessors, |r, accessor| {
                    if let Some(kind) = accessor.unit_kind {
                        r.tok(kind);
                    }
                    r.name(accessor.name);
                });
                self.tok(*close);
            }
        }
    }

    /// Declarations at the current indentation; the break before the first
    /// one is up to the caller
    fn declarations(&mut self, decls: &[Declaration], package_level: bool) {
        let col = self.indent();
        let widths = self.name_widths(decls);
        for (i, decl) in decls.iter().enumerate() {
            self.set_indent(col);
            if i > 0 {
                let prev = &decls[i - 1];
                let spaced = self.style.blank_lines_around_declarations
                    && (package_level || prev.is_subprogram() || decl.is_subprogram());
                if spaced && !self.glues(prev.ends_with_end()) {
                    self.w.blank_line();
                } else {
                    self.break_after(prev.ends_with_end());
                }
            }
            self.declaration(decl, widths[i]);
        }
    }

    /// Padded name width per declaration, for runs of aligned declarations
    fn name_widths(&self, decls: &[Declaration]) -> Vec<Option<usize>> {
        let mut widths = vec![None; decls.len()];
        if !self.style.align_declarations {
            return widths;
        }
        for (start, end) in runs(decls, |d| d.aligned_name().is_some()) {
            if end - start < 2 {
                continue;
            }
            let mut columns = Columns::new(DECLARATION_GAP);
            for decl in &decls[start..end] {
                if let Some(name) = decl.aligned_name() {
                    columns.observe(0, self.width(name));
                }
            }
            for width in &mut widths[start..end] {
                *width = Some(columns.offset_after(0));
            }
        }
        widths
    }

    /// Write `name`, then pad to `width` if set
    fn padded_name(&mut self, name: Tok, width: Option<usize>) {
        self.tok(name);
        if let Some(width) = width {
            let start = self.w.column().saturating_sub(self.width(name));
            self.w.pad_to(start + width);
        }
    }

    fn declaration(&mut self, decl: &Declaration, name_width: Option<usize>) {
        match decl {
            Declaration::Variable(var) => {
                self.padded_name(var.name, name_width);
                if let Some(constant) = var.constant {
                    self.tok(constant);
                }
                self.data_type(&var.ty);
                self.toks(&var.not_null);
                if let Some((op, value)) = &var.default {
                    self.tok(*op);
                    self.expr(value);
                }
                self.attach(var.semi);
            }
            Declaration::Exception { name, kw, semi } => {
                self.padded_name(*name, name_width);
                self.tok(*kw);
                self.attach(*semi);
            }
            Declaration::Type(decl) => {
                self.tok(decl.kw);
                self.tok(decl.name);
                self.tok(decl.is_kw);
                self.type_def(&decl.def);
                self.attach(decl.semi);
            }
            Declaration::Cursor(cursor) => {
                let base = self.indent();
                self.tok(cursor.kw);
                self.tok(cursor.name);
                if let Some(params) = &cursor.params {
                    self.tok(params.open);
                    self.w.no_space();
                    self.inline_list(&params.params, |r, param| r.param(param, None));
                    self.attach(params.close);
                }
                if let Some((kw, ty)) = &cursor.ret {
                    self.tok(*kw);
                    self.data_type(ty);
                }
                if let Some((is_kw, query)) = &cursor.query {
                    self.tok(*is_kw);
                    let inner = base + self.style.indent;
                    self.line(inner);
                    self.query(query, inner);
                    self.set_indent(base);
                }
                self.attach(cursor.semi);
            }
            Declaration::Pragma {
                kw,
                name,
                args,
                semi,
            } => {
                self.tok(*kw);
                self.tok(*name);
                if let Some(args) = args {
                    self.call_args(args);
                }
                self.attach(*semi);
            }
            Declaration::Subprogram(sub) => self.subprogram(sub),
        }
    }

    fn type_def(&mut self, def: &TypeDef) {
        match def {
            TypeDef::Record {
                kw,
                open,
                fields,
                close,
            } => {
                let base = self.indent();
                let inner = base + self.style.indent;
                self.tok(*kw);
                self.tok(*open);
                let mut columns = Columns::new(DECLARATION_GAP);
                if self.style.align_declarations {
                    for field in &fields.items {
                        columns.observe(0, self.width(field.name));
                    }
                }
                let width = self.style.align_declarations.then(|| columns.offset_after(0));
                self.line(inner);
                self.exploded(fields, inner, |r, field| {
                    r.padded_name(field.name, width);
                    r.data_type(&field.ty);
                    r.toks(&field.not_null);
                    if let Some((op, value)) = &field.default {
                        r.tok(*op);
                        r.expr(value);
                    }
                });
                self.line(base);
                self.tok(*close);
            }
            TypeDef::Collection {
                kind,
                size,
                of,
                elem,
                not_null,
                index_by,
            } => {
                self.tok(*kind);
                if let Some(size) = size {
                    self.type_args(size);
                }
                self.tok(*of);
                self.data_type(elem);
                self.toks(not_null);
                if let Some((kws, ty)) = index_by {
                    self.toks(kws);
                    self.data_type(ty);
                }
            }
            TypeDef::RefCursor { kws, ret } => {
                self.toks(kws);
                if let Some((kw, ty)) = ret {
                    self.tok(*kw);
                    self.data_type(ty);
                }
            }
            TypeDef::Alias { ty, not_null } => {
                self.data_type(ty);
                self.toks(not_null);
            }
        }
    }

    pub(super) fn data_type(&mut self, ty: &DataType) {
        self.name(ty.name);
        if let Some(args) = &ty.args {
            self.type_args(args);
        }
        self.toks(&ty.suffix);
    }

    /// `(30 char)`, `(10, 2)`
    fn type_args(&mut self, args: &TypeArgs) {
        self.attach(args.open);
        for (i, t) in args.toks.iter().enumerate() {
            if i == 0 || self.tree.tokens[*t].is_symbol(",") {
                self.attach(*t);
            } else {
                self.tok(*t);
            }
        }
        self.attach(args.close);
    }

    fn subprogram(&mut self, sub: &Subprogram) {
        let base = self.indent();
        let inner = base + self.style.indent;
        self.tok(sub.kind_kw);
        self.name(sub.name);
        if let Some(params) = &sub.params {
            self.param_list(params, base);
        }
        if let Some((kw, ty)) = &sub.ret {
            self.tok(*kw);
            self.data_type(ty);
        }
        for modifier in &sub.modifiers {
            self.line(inner);
            self.modifier(modifier);
        }
        self.set_indent(base);
        match &sub.body {
            SubprogramBody::Forward(semi) => self.attach(*semi),
            SubprogramBody::Defined { is_kw, block } => {
                if sub.params.is_some() || !sub.modifiers.is_empty() {
                    self.w.newline();
                }
                self.tok(*is_kw);
                self.block(block, true);
            }
        }
    }

    /// Parameters one per line, names and modes aligned
    fn param_list(&mut self, params: &ParamList, base: usize) {
        let inner = base + self.style.indent;
        let columns = self.style.align_declarations.then(|| {
            let mut columns = Columns::new(DECLARATION_GAP);
            for param in &params.params.items {
                columns.observe(0, self.width(param.name));
                columns.observe(1, self.words_width(&param.mode));
            }
            columns
        });
        self.tok(params.open);
        self.line(inner);
        self.exploded(&params.params, inner, |r, param| r.param(param, columns.as_ref()));
        self.line(base);
        self.tok(params.close);
    }

    fn param(&mut self, param: &Param, columns: Option<&Columns>) {
        self.tok(param.name);
        let start = self.w.column().saturating_sub(self.width(param.name));
        if let Some(columns) = columns {
            self.w.pad_to(start + columns.offset_after(0));
        }
        self.toks(&param.mode);
        if let Some(columns) = columns {
            if columns.has(1) {
                self.w.pad_to(start + columns.offset_after(1));
            }
        }
        self.data_type(&param.ty);
        if let Some((op, value)) = &param.default {
            self.tok(*op);
            self.expr(value);
        }
    }

    /// A block at the current indentation; `after_is` when it is the body of a
    /// subprogram whose `is`/`as` was just written
    fn block(&mut self, block: &Block, after_is: bool) {
        let base = self.indent();
        let inner = base + self.style.indent;
        if let Some(declare) = block.declare {
            self.tok(declare);
        }
        if !block.decls.is_empty() {
            self.set_indent(inner);
            if after_is {
                self.member_break();
            } else {
                self.w.newline();
            }
            self.declarations(&block.decls, false);
        }

        self.set_indent(base);
        let last_decl = block.decls.last();
        if self.style.blank_lines_around_declarations
            && last_decl.is_some_and(Declaration::is_subprogram)
            && !self.glues(last_decl.is_some_and(Declaration::ends_with_end))
        {
            self.w.blank_line();
        }
        self.break_after(last_decl.is_some_and(Declaration::ends_with_end));
        self.tok(block.begin);
        self.statements(&block.body, inner);

        let mut after_end = last_ends_with_end(&block.body);
        if let Some(section) = &block.exception {
            self.line(base);
            self.tok(section.kw);
            for handler in &section.handlers {
                self.handler(handler, inner);
            }
            after_end = section
                .handlers
                .last()
                .is_some_and(|h| last_ends_with_end(&h.body));
        }
        self.set_indent(base);
        self.break_after(after_end);
        self.tok(block.end_kw);
        if let Some(name) = block.end_name {
            self.tok(name);
        }
        self.attach(block.semi);
    }

    fn handler(&mut self, handler: &Handler, col: usize) {
        self.line(col);
        self.tok(handler.when);
        for (i, choice) in handler.choices.iter().enumerate() {
            if i > 0 {
                self.tok(handler.ors[i - 1]);
            }
            self.name(*choice);
        }
        self.tok(handler.then_kw);
        self.statements(&handler.body, col + self.style.indent);
    }

    /// Statements one per line at column `col`
    fn statements(&mut self, statements: &[Statement], col: usize) {
        let target_width = self.assignment_width(statements);
        for (i, statement) in statements.iter().enumerate() {
            self.set_indent(col);
            if i > 0 && statements[i - 1].ends_with_end() {
                self.break_after(true);
            } else {
                self.w.newline();
            }
            self.statement(statement, target_width);
        }
        self.set_indent(col);
    }

    /// Width assignment targets are padded to, if assignments are aligned
    fn assignment_width(&self, statements: &[Statement]) -> Option<usize> {
        if !self.style.align_assignments {
            return None;
        }
        let widths: Vec<usize> = statements
            .iter()
            .filter_map(|s| match &s.kind {
                StatementKind::Assign { target, .. } if s.labels.is_empty() => {
                    self.measure(|r| r.expr(target))
                }
                _ => None,
            })
            .collect();
        if widths.len() < 2 {
            return None;
        }
        widths.into_iter().max().map(|w| w + 1)
    }

    fn label(&mut self, label: &Label) {
        self.tok(label.open);
        if self.layout.label_padding {
            self.tok(label.name);
            self.tok(label.close);
        } else {
            self.attach(label.name);
            self.attach(label.close);
        }
        if self.layout.label_placement == LabelPlacement::OwnLine {
            self.w.newline();
        }
    }

    fn statement(&mut self, statement: &Statement, target_width: Option<usize>) {
        for label in &statement.labels {
            self.label(label);
        }
        let base = self.indent();
        match &statement.kind {
            StatementKind::Simple {
                words,
                target,
                semi,
            } => {
                self.toks(words);
                if let Some(target) = target {
                    self.expr(target);
                }
                self.attach(*semi);
            }
            StatementKind::Assign {
                target,
                op,
                value,
                semi,
            } => {
                let measured = target_width.and_then(|_| self.measure(|r| r.expr(target)));
                self.expr(target);
                if let (Some(width), Some(own)) = (target_width, measured) {
                    let start = self.w.column().saturating_sub(own);
                    self.w.pad_to(start + width);
                }
                self.tok(*op);
                self.expr(value);
                self.attach(*semi);
            }
            StatementKind::Call { expr, semi } => {
                self.expr(expr);
                self.attach(*semi);
            }
            StatementKind::If(stmt) => self.if_statement(stmt, base),
            StatementKind::Loop(stmt) => self.loop_statement(stmt, base),
            StatementKind::Exit {
                kw,
                label,
                when,
                semi,
            } => {
                self.tok(*kw);
                if let Some(label) = label {
                    self.tok(*label);
                }
                if let Some((when, cond)) = when {
                    self.tok(*when);
                    self.expr(cond);
                }
                self.attach(*semi);
            }
            StatementKind::Return { kw, value, semi } => {
                self.tok(*kw);
                if let Some(value) = value {
                    self.expr(value);
                }
                self.attach(*semi);
            }
            StatementKind::Block(block) => self.block(block, false),
            StatementKind::Case(stmt) => {
                let inner = base + self.style.indent;
                self.tok(stmt.case_kw);
                if let Some(selector) = &stmt.selector {
                    self.expr(selector);
                }
                for when in &stmt.whens {
                    self.line(inner);
                    self.tok(when.when);
                    self.expr(&when.cond);
                    self.tok(when.then_kw);
                    self.statements(&when.body, inner + self.style.indent);
                }
                let mut after_end = stmt.whens.last().is_some_and(|w| last_ends_with_end(&w.body));
                if let Some((kw, body)) = &stmt.else_branch {
                    self.line(inner);
                    self.tok(*kw);
                    self.statements(body, inner + self.style.indent);
                    after_end = last_ends_with_end(body);
                }
                self.set_indent(base);
                self.break_after(after_end);
                self.toks(&stmt.end);
                self.attach(stmt.semi);
            }
            StatementKind::Sql(sql) => self.sql_statement(sql),
            StatementKind::Open {
                kw,
                cursor,
                source,
                semi,
            } => {
                self.tok(*kw);
                self.expr(cursor);
                match source {
                    Some((for_kw, OpenSource::Query(query))) => {
                        self.tok(*for_kw);
                        let inner = base + self.style.indent;
                        self.line(inner);
                        self.query(query, inner);
                        self.set_indent(base);
                    }
                    Some((for_kw, OpenSource::Dynamic(sql))) => {
                        self.tok(*for_kw);
                        self.expr(sql);
                    }
                    None => {}
                }
                self.attach(*semi);
            }
            StatementKind::Fetch {
                kw,
                cursor,
                into,
                limit,
                semi,
            } => {
                self.tok(*kw);
                self.expr(cursor);
                self.toks(&into.kws);
                self.inline_list(&into.targets, |r, target| r.expr(target));
                if let Some((kw, value)) = limit {
                    self.tok(*kw);
                    self.expr(value);
                }
                self.attach(*semi);
            }
            StatementKind::ExecuteImmediate {
                kws,
                sql,
                into,
                using,
                semi,
            } => {
                self.toks(kws);
                self.expr(sql);
                if let Some(into) = into {
                    self.toks(&into.kws);
                    self.inline_list(&into.targets, |r, target| r.expr(target));
                }
                if let Some((kw, args)) = using {
                    self.tok(*kw);
                    self.inline_list(args, |r, arg| {
                        r.toks(&arg.mode);
                        r.expr(&arg.value);
                    });
                }
                self.attach(*semi);
            }
            StatementKind::PipeRow {
                kws,
                open,
                value,
                close,
                semi,
            } => {
                self.toks(kws);
                self.tok(*open);
                self.w.no_space();
                self.expr(value);
                self.attach(*close);
                self.attach(*semi);
            }
            StatementKind::Forall {
                kw,
                var,
                in_kw,
                range,
                save_exceptions,
                body,
            } => {
                self.tok(*kw);
                self.tok(*var);
                self.tok(*in_kw);
                self.for_range(range, base);
                self.toks(save_exceptions);
                self.line(base + self.style.indent);
                self.statement(body, None);
                self.set_indent(base);
            }
        }
    }

    fn if_statement(&mut self, stmt: &IfStmt, base: usize) {
        let inner = base + self.style.indent;
        self.tok(stmt.if_kw);
        self.condition_then(&stmt.cond, stmt.then_kw, base);
        self.statements(&stmt.body, inner);
        let mut after_end = last_ends_with_end(&stmt.body);
        for elsif in &stmt.elsifs {
            self.line(base);
            self.tok(elsif.kw);
            self.condition_then(&elsif.cond, elsif.then_kw, base);
            self.statements(&elsif.body, inner);
            after_end = last_ends_with_end(&elsif.body);
        }
        if let Some((kw, body)) = &stmt.else_branch {
            self.line(base);
            self.tok(*kw);
            self.statements(body, inner);
            after_end = last_ends_with_end(body);
        }
        self.set_indent(base);
        self.break_after(after_end);
        self.toks(&stmt.end);
        self.attach(stmt.semi);
    }

    /// `cond then`; a condition too long for the line gets one `and` per line
    /// and `then` on a line of its own
    fn condition_then(&mut self, cond: &Expr, then_kw: Tok, base: usize) {
        let conjuncts = self.conjuncts(cond);
        let fits = self.flat
            || conjuncts.len() < 2
            || self.fits(self.measure(|r| {
                r.expr(cond);
                r.tok(then_kw);
            }));
        if fits {
            self.expr(cond);
            self.tok(then_kw);
            return;
        }
        let inner = base + self.style.indent;
        self.set_indent(inner);
        for (and_kw, part) in conjuncts {
            if let Some(and_kw) = and_kw {
                self.line(inner);
                self.tok(and_kw);
            }
            self.expr(part);
        }
        self.line(base);
        self.tok(then_kw);
    }

    fn for_range(&mut self, range: &ForRange, base: usize) {
        match range {
            ForRange::Numeric { low, dots, high } => {
                self.expr(low);
                self.tok(*dots);
                self.expr(high);
            }
            ForRange::Query(sub) => self.subquery_block(sub, base),
            ForRange::Cursor(cursor) => self.expr(cursor),
            ForRange::Collection { kws, collection } => {
                self.toks(kws);
                self.expr(collection);
            }
        }
    }

    fn loop_statement(&mut self, stmt: &LoopStmt, base: usize) {
        match &stmt.scheme {
            LoopScheme::Basic => {}
            LoopScheme::While { kw, cond } => {
                self.tok(*kw);
                self.expr(cond);
            }
            LoopScheme::For {
                kw,
                var,
                in_kw,
                reverse,
                range,
            } => {
                self.tok(*kw);
                self.tok(*var);
                self.tok(*in_kw);
                if let Some(reverse) = reverse {
                    self.tok(*reverse);
                }
                self.for_range(range, base);
            }
        }
        self.tok(stmt.loop_kw);
        self.statements(&stmt.body, base + self.style.indent);
        self.set_indent(base);
        self.break_after(last_ends_with_end(&stmt.body));
        self.toks(&stmt.end);
        if let Some(label) = stmt.end_label {
            self.tok(label);
        }
        self.attach(stmt.semi);
    }
}
