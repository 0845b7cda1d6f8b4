//! Expression evaluation
//!
//! A recursive-descent precedence cascade that evaluates while it parses.
//! From loosest to tightest binding:
//!
//! | level          | operators                              |
//! |----------------|----------------------------------------|
//! | assignment     | `=` `+=` `-=` `*=` `/=` (left to right) |
//! | logical or     | `\|\|`                                 |
//! | logical and    | `&&`                                   |
//! | bitwise or     | `\|`                                   |
//! | bitwise xor    | `^`                                    |
//! | bitwise and    | `&`                                    |
//! | equality       | `==` `!=`                              |
//! | relational     | `<` `<=` `>` `>=`                      |
//! | shift          | `<<` `>>`                              |
//! | additive       | `+` `-`                                |
//! | multiplicative | `*` `/` `%`                            |
//! | unary          | `!` `-` `+` `++` `--` `typeof` `new`   |
//! | postfix        | `++` `--`                              |
//! | trailers       | `.name` `[index]` `(args)`             |
//! | primary        | literals, names, `( expr )`            |
//!
//! Each level returns `Ok(None)` when no expression starts at the cursor.
//! Under [`Mode::Scan`] tokens are consumed but nothing is evaluated, and a
//! null placeholder stands in for every result.

use crate::error::ScriptResult;
use crate::parser::{Punct, Token};
use crate::runtime::{Operand, Reference, RegExpObject};
use crate::util::ensure_sufficient_stack;
use crate::value::Value;

use std::rc::Rc;

use super::operators;
use super::{Interpreter, Mode};

/// Result of one precedence level
pub(crate) type Parsed = ScriptResult<Option<Operand>>;

/// A tighter precedence level
type Level<'a> = for<'m, 's> fn(&'m mut Interpreter<'a>, Mode<'s>) -> Parsed;

fn placeholder() -> Operand {
    Operand::Value(Value::Null)
}

impl<'a> Interpreter<'a> {
    /// Parse (and in eval mode evaluate) a full expression
    pub(crate) fn expression(&mut self, mode: Mode<'_>) -> Parsed {
        ensure_sufficient_stack(|| self.assignment(mode))
    }

    /// Assignment level, left-associative
    fn assignment(&mut self, mode: Mode<'_>) -> Parsed {
        let Some(mut lhs) = self.logical_or(mode)? else {
            return Ok(None);
        };

        loop {
            let op = match self.tokens.peek_operator()? {
                Some(Token::Punct(
                    p @ (Punct::Eq | Punct::PlusEq | Punct::MinusEq | Punct::StarEq | Punct::SlashEq),
                )) => *p,
                _ => return Ok(Some(lhs)),
            };
            self.tokens.advance();
            let rhs = self.operand_after(Self::logical_or, mode, op)?;

            if mode.is_eval() {
                lhs = match operators::compound(op) {
                    // Compound forms yield the reference itself
                    Some(binary) => {
                        let value = operators::binary(binary, &lhs.get()?, &rhs.get()?)?;
                        lhs.set_reference(value)?;
                        lhs
                    }
                    None => {
                        let value = rhs.get()?;
                        lhs.set_reference(value.clone())?;
                        Operand::Value(value)
                    }
                };
            }
        }
    }

    /// Parse the right operand of `op`, which must be present
    fn operand_after(&mut self, level: Level<'a>, mode: Mode<'_>, op: impl std::fmt::Display) -> ScriptResult<Operand> {
        match level(self, mode)? {
            Some(operand) => Ok(operand),
            None => Err(self.tokens.error(format!("Missing expression after '{}'", op), self.place)),
        }
    }

    /// `||` skips evaluating the rest once the left side is true
    fn logical_or(&mut self, mode: Mode<'_>) -> Parsed {
        let Some(mut lhs) = self.logical_and(mode)? else {
            return Ok(None);
        };
        let mut mode = mode;

        while self.tokens.peek_operator()?.is_some_and(|t| t.is_punct(Punct::PipePipe)) {
            self.tokens.advance();
            if mode.is_eval() && lhs.get()?.to_bool_value()? {
                mode = Mode::Scan;
            }
            let rhs = self.operand_after(Self::logical_and, mode, Punct::PipePipe)?;
            if mode.is_eval() {
                let value = lhs.get()?.to_bool_value()? || rhs.get()?.to_bool_value()?;
                lhs = Operand::Value(Value::Bool(value));
            }
        }
        Ok(Some(lhs))
    }

    /// `&&` skips evaluating the rest once the left side is false
    fn logical_and(&mut self, mode: Mode<'_>) -> Parsed {
        let Some(mut lhs) = self.bit_or(mode)? else {
            return Ok(None);
        };
        let mut mode = mode;

        while self.tokens.peek_operator()?.is_some_and(|t| t.is_punct(Punct::AmpAmp)) {
            self.tokens.advance();
            if mode.is_eval() && !lhs.get()?.to_bool_value()? {
                mode = Mode::Scan;
            }
            let rhs = self.operand_after(Self::bit_or, mode, Punct::AmpAmp)?;
            if mode.is_eval() {
                let value = lhs.get()?.to_bool_value()? && rhs.get()?.to_bool_value()?;
                lhs = Operand::Value(Value::Bool(value));
            }
        }
        Ok(Some(lhs))
    }

    /// Left-associative loop shared by the plain binary levels
    fn binary(&mut self, mode: Mode<'_>, next: Level<'a>, ops: &[Punct]) -> Parsed {
        let Some(mut lhs) = next(self, mode)? else {
            return Ok(None);
        };

        loop {
            let op = match self.tokens.peek_operator()? {
                Some(Token::Punct(p)) if ops.contains(p) => *p,
                _ => return Ok(Some(lhs)),
            };
            self.tokens.advance();
            let rhs = self.operand_after(next, mode, op)?;
            if mode.is_eval() {
                lhs = Operand::Value(operators::binary(op, &lhs.get()?, &rhs.get()?)?);
            }
        }
    }

    fn bit_or(&mut self, mode: Mode<'_>) -> Parsed {
        self.binary(mode, Self::bit_xor, &[Punct::Pipe])
    }

    fn bit_xor(&mut self, mode: Mode<'_>) -> Parsed {
        self.binary(mode, Self::bit_and, &[Punct::Caret])
    }

    fn bit_and(&mut self, mode: Mode<'_>) -> Parsed {
        self.binary(mode, Self::equality, &[Punct::Amp])
    }

    fn equality(&mut self, mode: Mode<'_>) -> Parsed {
        self.binary(mode, Self::relational, &[Punct::EqEq, Punct::BangEq])
    }

    fn relational(&mut self, mode: Mode<'_>) -> Parsed {
        self.binary(
            mode,
            Self::shift,
            &[Punct::Lt, Punct::LtEq, Punct::Gt, Punct::GtEq],
        )
    }

    fn shift(&mut self, mode: Mode<'_>) -> Parsed {
        self.binary(mode, Self::additive, &[Punct::LtLt, Punct::GtGt])
    }

    fn additive(&mut self, mode: Mode<'_>) -> Parsed {
        self.binary(mode, Self::multiplicative, &[Punct::Plus, Punct::Minus])
    }

    fn multiplicative(&mut self, mode: Mode<'_>) -> Parsed {
        self.binary(
            mode,
            Self::unary,
            &[Punct::Star, Punct::Slash, Punct::Percent],
        )
    }

    /// Prefix operators, `typeof` and `new`
    fn unary(&mut self, mode: Mode<'_>) -> Parsed {
        enum Prefix {
            Op(Punct),
            TypeOf,
            New,
        }

        let prefix = match self.tokens.peek()? {
            Some(Token::Punct(
                p @ (Punct::Bang | Punct::Minus | Punct::Plus | Punct::PlusPlus | Punct::MinusMinus),
            )) => Prefix::Op(*p),
            Some(t) if t.is_ident("typeof") => Prefix::TypeOf,
            Some(t) if t.is_ident("new") => Prefix::New,
            _ => return self.postfix(mode),
        };
        self.tokens.advance();

        let op = match prefix {
            Prefix::New => return self.new_expression(mode),
            Prefix::TypeOf => None,
            Prefix::Op(op) => Some(op),
        };

        // Prefix chains recurse without passing through `expression`
        let operand = ensure_sufficient_stack(|| match op {
            Some(op) => self.operand_after(Self::unary, mode, op),
            None => self.operand_after(Self::unary, mode, "typeof"),
        })?;
        if !mode.is_eval() {
            return Ok(Some(placeholder()));
        }

        let value = match op {
            None => Value::string(operand.type_of()?),
            Some(Punct::Bang) => Value::Bool(!operand.get()?.to_bool_value()?),
            Some(Punct::Minus) => match operand.get()? {
                Value::Int(i) => i.checked_neg().map_or(Value::Number(-(i as f64)), Value::Int),
                other => Value::Number(-other.to_number_value()?),
            },
            Some(Punct::Plus) => match operand.get()? {
                Value::Int(i) => Value::Int(i),
                other => Value::Number(other.to_number_value()?),
            },
            Some(step) => {
                // Prefix ++/-- yield the updated value
                let delta = if step == Punct::PlusPlus { Punct::Plus } else { Punct::Minus };
                let value = operators::binary(delta, &operand.get()?, &Value::Int(1))?;
                operand.set_reference(value.clone())?;
                value
            }
        };
        Ok(Some(Operand::Value(value)))
    }

    /// `new Name(args)`, with the `new` already consumed
    fn new_expression(&mut self, mode: Mode<'_>) -> Parsed {
        let Some(class_name) = self.tokens.eat_ident()? else {
            return Err(self.unexpected("new expression missing class name"));
        };
        if !self.tokens.eat(Punct::LParen)? {
            return Err(self.unexpected("Constructor argument clause missing"));
        }
        let args = self.arguments(mode)?;

        match mode {
            Mode::Scan => Ok(Some(placeholder())),
            Mode::Eval(scope) => {
                let class = scope.find_symbol(&class_name)?.dereference()?;
                Ok(Some(Operand::Value(class.construct(&args, scope)?)))
            }
        }
    }

    /// Postfix `++`/`--` yield the value before the update
    fn postfix(&mut self, mode: Mode<'_>) -> Parsed {
        let Some(mut operand) = self.trailers(mode)? else {
            return Ok(None);
        };

        loop {
            let delta = match self.tokens.peek_operator()? {
                Some(t) if t.is_punct(Punct::PlusPlus) => Punct::Plus,
                Some(t) if t.is_punct(Punct::MinusMinus) => Punct::Minus,
                _ => return Ok(Some(operand)),
            };
            self.tokens.advance();
            if mode.is_eval() {
                let old = operand.get()?;
                operand.set_reference(operators::binary(delta, &old, &Value::Int(1))?)?;
                operand = Operand::Value(old);
            }
        }
    }

    /// Member access, indexing and calls following a primary
    fn trailers(&mut self, mode: Mode<'_>) -> Parsed {
        let Some(mut operand) = self.primary(mode)? else {
            return Ok(None);
        };

        loop {
            // Operator position: a `/` after an operand divides
            self.tokens.peek_operator()?;

            if self.tokens.eat(Punct::Dot)? {
                let Some(name) = self.tokens.eat_ident()? else {
                    return Err(self.unexpected("Expecting member name"));
                };
                if mode.is_eval() {
                    operand = Operand::Reference(Reference::Member {
                        object: operand.get()?,
                        name,
                    });
                }
            } else if self.tokens.eat(Punct::LBracket)? {
                let Some(index) = self.expression(mode)? else {
                    return Err(self.unexpected("Expecting index value"));
                };
                if !self.tokens.eat(Punct::RBracket)? {
                    return Err(self.unexpected("Expecting ']'"));
                }
                if mode.is_eval() {
                    let index = index.get()?.to_integer_value()?;
                    operand = Operand::Reference(Reference::Member {
                        object: operand.get()?,
                        name: index.to_string(),
                    });
                }
            } else if self.tokens.eat(Punct::LParen)? {
                let args = self.arguments(mode)?;
                operand = match mode {
                    Mode::Scan => placeholder(),
                    Mode::Eval(scope) => Operand::Value(operand.get()?.call(&args, scope)?),
                };
            } else {
                return Ok(Some(operand));
            }
        }
    }

    /// Argument list after a consumed `(`, through the closing `)`
    ///
    /// Arguments are dereferenced as they are evaluated.
    fn arguments(&mut self, mode: Mode<'_>) -> ScriptResult<Vec<Value>> {
        let mut args = Vec::new();
        if self.tokens.eat(Punct::RParen)? {
            return Ok(args);
        }

        loop {
            let Some(arg) = self.expression(mode)? else {
                return Err(self.unexpected("Missing expression in argument list"));
            };
            if mode.is_eval() {
                args.push(arg.get()?);
            }
            if self.tokens.eat(Punct::RParen)? {
                return Ok(args);
            }
            if !self.tokens.eat(Punct::Comma)? {
                return Err(self.unexpected("Missing ',' in argument list"));
            }
        }
    }

    /// Literals, names and parenthesized expressions
    fn primary(&mut self, mode: Mode<'_>) -> Parsed {
        let literal = match self.tokens.peek()? {
            None => return Ok(None),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                "null" => Value::Null,
                _ => {
                    let name = name.clone();
                    self.tokens.advance();
                    return match mode {
                        Mode::Scan => Ok(Some(placeholder())),
                        Mode::Eval(scope) => Ok(Some(Operand::Reference(scope.find_symbol(&name)?))),
                    };
                }
            },
            Some(Token::String(s)) => Value::string(s),
            Some(Token::Int(i)) => Value::Int(*i),
            Some(Token::Float(f)) => Value::Number(*f),
            Some(Token::RegExp {
                pattern,
                global,
                insensitive,
            }) => Value::RegExp(Rc::new(RegExpObject::new(pattern.as_str(), *global, *insensitive))),
            Some(t) if t.is_punct(Punct::LParen) => {
                self.tokens.advance();
                let Some(inner) = self.expression(mode)? else {
                    return Err(self.unexpected("Missing expression after '('"));
                };
                if !self.tokens.eat(Punct::RParen)? {
                    return Err(self.unexpected("Missing right parenthesis"));
                }
                return Ok(Some(inner));
            }
            Some(_) => return Ok(None),
        };

        self.tokens.advance();
        Ok(Some(Operand::Value(literal)))
    }
}
