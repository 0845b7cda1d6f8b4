//! Statement execution
//!
//! Every statement form is handled by one routine that takes a [`Mode`]:
//! with [`Mode::Eval`] it runs, with [`Mode::Scan`] it only moves the
//! cursor past the statement. Scanning is how untaken branches, the rest of
//! a block after a `break`/`continue`/`return`, and function bodies being
//! recorded are passed over.

use std::rc::Rc;

use tracing::trace;

use crate::error::{ScriptError, ScriptResult};
use crate::parser::{Punct, Token};
use crate::runtime::{Class, Function, Scope, ScriptFunction, method_key};
use crate::util::ensure_sufficient_stack;
use crate::value::Value;

use super::{Interpreter, Mode, Signal};

/// Statement forms, by their first token
#[derive(Debug, Clone, Copy)]
enum Statement {
    Block,
    Var,
    If,
    While,
    For,
    Break,
    Continue,
    Return,
    Try,
    Function,
    Class,
    Expression,
}

impl<'a> Interpreter<'a> {
    /// Execute one statement, returning the signal it produced
    pub fn evaluate_statement(&mut self, scope: &Scope) -> ScriptResult<Option<Signal>> {
        self.statement(Mode::Eval(scope))
    }

    /// Move past one statement without executing it
    pub fn skip_statement(&mut self) -> ScriptResult<()> {
        self.statement(Mode::Scan).map(|_| ())
    }

    fn statement(&mut self, mode: Mode<'_>) -> ScriptResult<Option<Signal>> {
        ensure_sufficient_stack(|| self.dispatch_statement(mode))
    }

    fn dispatch_statement(&mut self, mode: Mode<'_>) -> ScriptResult<Option<Signal>> {
        let statement = self.classify()?;
        if mode.is_eval() {
            trace!(place = self.place, ?statement, "execute");
        }

        match statement {
            Statement::Block => self.block(mode),
            Statement::Var => self.var_statement(mode).map(|_| None),
            Statement::If => self.if_statement(mode),
            Statement::While => self.while_statement(mode),
            Statement::For => self.for_statement(mode),
            Statement::Break => self.jump(mode, Signal::Break, "break"),
            Statement::Continue => self.jump(mode, Signal::Continue, "continue"),
            Statement::Return => self.return_statement(mode),
            Statement::Try => self.try_statement(mode),
            Statement::Function => self.function_declaration(mode).map(|_| None),
            Statement::Class => self.class_declaration(mode).map(|_| None),
            Statement::Expression => self.expression_statement(mode).map(|_| None),
        }
    }

    /// Identify the next statement, consuming its keyword if it has one
    fn classify(&mut self) -> ScriptResult<Statement> {
        let statement = match self.tokens.peek()? {
            None => return Err(self.unexpected("Unexpected end of code when looking for a statement")),
            Some(t) if t.is_punct(Punct::LBrace) => return Ok(Statement::Block),
            Some(Token::Ident(word)) => match word.as_str() {
                "var" => Statement::Var,
                "if" => Statement::If,
                "while" => Statement::While,
                "for" => Statement::For,
                "break" => Statement::Break,
                "continue" => Statement::Continue,
                "return" => Statement::Return,
                "try" => Statement::Try,
                "function" => Statement::Function,
                "class" => Statement::Class,
                _ => return Ok(Statement::Expression),
            },
            Some(_) => return Ok(Statement::Expression),
        };
        self.tokens.advance();
        Ok(statement)
    }

    /// Expression that must be present; scanning yields null
    fn required_expression(&mut self, mode: Mode<'_>, message: &str) -> ScriptResult<Value> {
        match self.expression(mode)? {
            Some(operand) => operand.get(),
            None => Err(self.unexpected(message)),
        }
    }

    /// `{ statement* }` in a child scope
    ///
    /// After a statement signals, the rest of the block is scanned.
    fn block(&mut self, mode: Mode<'_>) -> ScriptResult<Option<Signal>> {
        self.tokens.advance();
        let inner = match mode {
            Mode::Eval(scope) => Some(scope.child()),
            Mode::Scan => None,
        };

        let mut signal = None;
        loop {
            match self.tokens.peek()? {
                None => return Err(self.unexpected("Unexpected end of statement block")),
                Some(t) if t.is_punct(Punct::RBrace) => {
                    self.tokens.advance();
                    return Ok(signal);
                }
                Some(_) => {}
            }

            let inner_mode = match &inner {
                Some(scope) if signal.is_none() => Mode::Eval(scope),
                _ => Mode::Scan,
            };
            if let Some(s) = self.statement(inner_mode)? {
                signal = Some(s);
            }
        }
    }

    /// `var name [= expr];`
    fn var_statement(&mut self, mode: Mode<'_>) -> ScriptResult<()> {
        let Some(name) = self.tokens.eat_ident()? else {
            return Err(self.unexpected("Var statement: expecting a symbol"));
        };

        let value = if self.tokens.eat(Punct::Eq)? {
            self.required_expression(mode, "Expected expression after '='")?
        } else {
            Value::Undefined
        };
        if let Mode::Eval(scope) = mode {
            scope.define(&name, value)?;
        }

        self.expect(
            Punct::Semicolon,
            &format!("Didn't find expected ';' at end of var statement defining '{}'", name),
        )
    }

    /// `( expr )` after `if`; always false when scanning
    fn condition(&mut self, mode: Mode<'_>, keyword: &str) -> ScriptResult<bool> {
        self.expect(Punct::LParen, &format!("Expecting '(' in {}", keyword))?;
        let value = self.required_expression(mode, &format!("Expecting a condition in {}", keyword))?;
        self.expect(Punct::RParen, &format!("Expecting ')' in {}", keyword))?;
        match mode {
            Mode::Eval(_) => value.to_bool_value(),
            Mode::Scan => Ok(false),
        }
    }

    /// `if (expr) statement [else statement]`
    fn if_statement(&mut self, mode: Mode<'_>) -> ScriptResult<Option<Signal>> {
        let taken = self.condition(mode, "if")?;
        let (then_mode, else_mode) = match mode {
            Mode::Eval(_) if taken => (mode, Mode::Scan),
            Mode::Eval(_) => (Mode::Scan, mode),
            Mode::Scan => (Mode::Scan, Mode::Scan),
        };

        let then_signal = self.statement(then_mode)?;
        let else_signal = if self.tokens.eat_keyword("else")? {
            self.statement(else_mode)?
        } else {
            None
        };
        Ok(then_signal.or(else_signal))
    }

    /// `while (expr) statement`, re-reading the condition each iteration
    fn while_statement(&mut self, mode: Mode<'_>) -> ScriptResult<Option<Signal>> {
        self.expect(Punct::LParen, "Expecting '(' in while")?;
        let condition_begin = self.tokens.position();

        loop {
            let value = self.required_expression(mode, "Expecting a condition in while")?;
            self.expect(Punct::RParen, "Expecting ')' in while")?;

            if !(mode.is_eval() && value.to_bool_value()?) {
                self.skip_statement()?;
                return Ok(None);
            }
            match self.statement(mode)? {
                Some(Signal::Return(value)) => return Ok(Some(Signal::Return(value))),
                Some(Signal::Break) => return Ok(None),
                Some(Signal::Continue) | None => {}
            }

            self.tokens.set_position(condition_begin);
        }
    }

    /// `for (init; condition; update) statement`
    ///
    /// The init clause runs in a scope of its own. The condition and update
    /// are re-read from source on every iteration.
    fn for_statement(&mut self, mode: Mode<'_>) -> ScriptResult<Option<Signal>> {
        self.expect(Punct::LParen, "Expecting '(' in for")?;
        let loop_scope = match mode {
            Mode::Eval(scope) => Some(scope.child()),
            Mode::Scan => None,
        };
        let mode = match &loop_scope {
            Some(scope) => Mode::Eval(scope),
            None => Mode::Scan,
        };

        if !self.tokens.eat(Punct::Semicolon)? {
            if self.tokens.eat_keyword("var")? {
                self.var_statement(mode)?;
            } else {
                self.expression_statement(mode)?;
            }
        }

        let condition_begin = self.tokens.position();
        loop {
            let run = if self.tokens.check(Punct::Semicolon)? {
                mode.is_eval()
            } else {
                let value = self.required_expression(mode, "Expecting a condition in for")?;
                mode.is_eval() && value.to_bool_value()?
            };
            self.expect(Punct::Semicolon, "Expecting ';' after for condition")?;

            let update_begin = self.tokens.position();
            self.for_update(Mode::Scan)?;

            if !run {
                self.skip_statement()?;
                return Ok(None);
            }
            match self.statement(mode)? {
                Some(Signal::Return(value)) => return Ok(Some(Signal::Return(value))),
                Some(Signal::Break) => return Ok(None),
                Some(Signal::Continue) | None => {}
            }

            self.tokens.set_position(update_begin);
            self.for_update(mode)?;
            self.tokens.set_position(condition_begin);
        }
    }

    /// Optional update expression and the closing `)` of a `for` header
    fn for_update(&mut self, mode: Mode<'_>) -> ScriptResult<()> {
        if !self.tokens.check(Punct::RParen)? {
            self.required_expression(mode, "Expecting an update expression in for")?;
        }
        self.expect(Punct::RParen, "Expecting ')' in for")
    }

    /// `break;` and `continue;`
    fn jump(&mut self, mode: Mode<'_>, signal: Signal, keyword: &str) -> ScriptResult<Option<Signal>> {
        self.expect(Punct::Semicolon, &format!("Expecting ';' in {}", keyword))?;
        Ok(mode.is_eval().then_some(signal))
    }

    /// `return [expr];`, where a bare `return` yields null
    fn return_statement(&mut self, mode: Mode<'_>) -> ScriptResult<Option<Signal>> {
        let value = if self.tokens.check(Punct::Semicolon)? {
            Value::Null
        } else {
            self.required_expression(mode, "Expecting a value in return")?
        };
        self.expect(Punct::Semicolon, "Expecting ';' in return")?;
        Ok(mode.is_eval().then_some(Signal::Return(value)))
    }

    /// `try statement [catch (name) statement] [finally statement]`
    ///
    /// Nothing is caught: the guarded statement runs, then the catch body
    /// (with `name` bound to undefined), then the finally body. The signal of
    /// the last of them to produce one wins.
    fn try_statement(&mut self, mode: Mode<'_>) -> ScriptResult<Option<Signal>> {
        let mut signal = self.statement(mode)?;
        let mut handled = false;

        if self.tokens.eat_keyword("catch")? {
            handled = true;
            self.expect(Punct::LParen, "Missing '(' after catch")?;
            let Some(name) = self.tokens.eat_ident()? else {
                return Err(self.unexpected("Missing symbol after catch("));
            };
            self.expect(Punct::RParen, "Missing ')' after catch")?;

            let catch_scope = match mode {
                Mode::Eval(scope) => {
                    let catch_scope = scope.child();
                    catch_scope.define(&name, Value::Undefined)?;
                    Some(catch_scope)
                }
                Mode::Scan => None,
            };
            let catch_mode = match &catch_scope {
                Some(scope) => Mode::Eval(scope),
                None => Mode::Scan,
            };
            if let Some(s) = self.statement(catch_mode)? {
                signal = Some(s);
            }
        }

        if self.tokens.eat_keyword("finally")? {
            handled = true;
            if let Some(s) = self.statement(mode)? {
                signal = Some(s);
            }
        }

        if !handled {
            return Err(self.unexpected("Missing catch or finally"));
        }
        Ok(signal)
    }

    /// `name(params)` of a function or method
    fn function_header(&mut self) -> ScriptResult<(String, Vec<String>)> {
        let Some(name) = self.tokens.eat_ident()? else {
            return Err(self.unexpected("Missing function name"));
        };
        self.expect(Punct::LParen, "Missing '(' after function name")?;

        let mut params = Vec::new();
        if !self.tokens.eat(Punct::RParen)? {
            loop {
                let Some(param) = self.tokens.eat_ident()? else {
                    return Err(self.unexpected("Expecting an argument name"));
                };
                params.push(param);
                if self.tokens.eat(Punct::RParen)? {
                    break;
                }
                self.expect(Punct::Comma, "Expected ','")?;
            }
        }
        Ok((name, params))
    }

    /// Scan the body statement and return its source text
    fn function_body(&mut self) -> ScriptResult<&'a str> {
        let begin = self.tokens.position();
        self.skip_statement()?;
        Ok(self.tokens.chunk(begin))
    }

    /// `function name(params) statement`
    fn function_declaration(&mut self, mode: Mode<'_>) -> ScriptResult<()> {
        let (name, params) = self.function_header()?;
        let body = self.function_body()?;

        if let Mode::Eval(scope) = mode {
            let function = ScriptFunction::new(name.as_str(), params, body, scope.clone(), false);
            scope.define(&name, Value::Function(Rc::new(Function::Script(function))))?;
        }
        Ok(())
    }

    /// `class Name { (var name [= expr]; | function name(params) statement)* }`
    fn class_declaration(&mut self, mode: Mode<'_>) -> ScriptResult<()> {
        let Some(class_name) = self.tokens.eat_ident()? else {
            return Err(self.unexpected("Missing class name"));
        };
        self.expect(Punct::LBrace, "Expecting '{' after class name")?;

        let mut members: Vec<(String, Value)> = Vec::new();
        while !self.tokens.eat(Punct::RBrace)? {
            let (key, value) = if self.tokens.eat_keyword("var")? {
                let Some(name) = self.tokens.eat_ident()? else {
                    return Err(self.unexpected("Expecting a member name"));
                };
                let value = if self.tokens.eat(Punct::Eq)? {
                    self.required_expression(mode, "Expected expression after '='")?
                } else {
                    Value::Undefined
                };
                self.expect(
                    Punct::Semicolon,
                    &format!("Didn't find expected ';' at end of member '{}'", name),
                )?;
                (name, value)
            } else if self.tokens.eat_keyword("function")? {
                let (name, mut params) = self.function_header()?;
                let body = self.function_body()?;
                params.insert(0, "this".to_string());

                let key = if name == class_name {
                    method_key(&class_name, params.len())
                } else {
                    name.clone()
                };
                let value = match mode {
                    Mode::Eval(scope) => Value::Function(Rc::new(Function::Script(
                        ScriptFunction::new(name, params, body, scope.clone(), true),
                    ))),
                    Mode::Scan => Value::Null,
                };
                (key, value)
            } else {
                return Err(self.unexpected("Expecting 'var' or 'function' in class body"));
            };

            if members.iter().any(|(existing, _)| *existing == key) {
                return Err(ScriptError::reference(format!(
                    "Duplicate definition for '{}'",
                    key
                )));
            }
            members.push((key, value));
        }

        if let Mode::Eval(scope) = mode {
            let class = Class::new(class_name.as_str(), members);
            scope.define(&class_name, Value::Class(Rc::new(class)))?;
        }
        Ok(())
    }

    /// `expr;`
    fn expression_statement(&mut self, mode: Mode<'_>) -> ScriptResult<()> {
        if self.expression(mode)?.is_none() {
            return Err(self.unexpected("Expected a statement"));
        }
        self.expect(Punct::Semicolon, "Expecting ';' after expression")
    }
}
