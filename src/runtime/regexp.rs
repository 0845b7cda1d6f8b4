//! Regular expression objects
//!
//! Patterns are handed to the `regex` crate as written. The `g` flag turns
//! on multi-line mode and `i` turns on case-insensitive matching. Matching
//! is anchored at the start of the subject.

use std::rc::Rc;

use regex::{Regex, RegexBuilder};

use crate::error::ScriptResult;
use crate::value::Value;

use super::function::NativeFunction;
use super::object::{ScriptObject, check_arity};

/// Compiled-on-demand regular expression value
#[derive(Debug, Clone)]
pub struct RegExpObject {
    pattern: String,
    global: bool,
    insensitive: bool,
}

impl RegExpObject {
    pub fn new(pattern: impl Into<String>, global: bool, insensitive: bool) -> Self {
        RegExpObject {
            pattern: pattern.into(),
            global,
            insensitive,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn is_insensitive(&self) -> bool {
        self.insensitive
    }

    /// Compile the pattern with this object's flags
    pub fn compile(&self) -> ScriptResult<Regex> {
        Ok(RegexBuilder::new(&self.pattern)
            .multi_line(self.global)
            .case_insensitive(self.insensitive)
            .build()?)
    }

    /// Check whether the pattern matches at the very start of `text`
    pub fn matches_at_start(&self, text: &str) -> ScriptResult<bool> {
        let regex = self.compile()?;
        Ok(regex.find(text).is_some_and(|m| m.start() == 0))
    }

    /// Replace every match, expanding `$1`/`${name}` in the replacement
    pub fn replace_all(&self, text: &str, replacement: &str) -> ScriptResult<String> {
        let regex = self.compile()?;
        Ok(regex.replace_all(text, replacement).into_owned())
    }
}

impl ScriptObject for RegExpObject {
    fn describe(&self) -> String {
        format!(
            "Regexp /{}/{}{}",
            self.pattern,
            if self.global { "g" } else { "" },
            if self.insensitive { "i" } else { "" }
        )
    }

    fn type_of(&self) -> ScriptResult<String> {
        Ok("regexp".to_string())
    }

    fn get_property(&self, name: &str) -> ScriptResult<Value> {
        match name {
            "test" => {
                let regexp = self.clone();
                Ok(NativeFunction::new("test", move |args, _| {
                    check_arity("test", args, &[1])?;
                    let text = args[0].to_string_value()?;
                    Ok(Value::Bool(regexp.matches_at_start(&text)?))
                })
                .into_value())
            }
            "source" => Ok(Value::String(Rc::from(self.pattern.as_str()))),
            "global" => Ok(Value::Bool(self.global)),
            "ignoreCase" => Ok(Value::Bool(self.insensitive)),
            _ => Err(super::object::no_such_property(&self.describe(), name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScriptError;
    use crate::runtime::Scope;

    #[test]
    fn test_anchored_match() {
        let re = RegExpObject::new("ab+", false, false);
        assert!(re.matches_at_start("abbbc").unwrap());
        assert!(!re.matches_at_start("cab").unwrap());
    }

    #[test]
    fn test_flags() {
        let re = RegExpObject::new("^b", true, true);
        // Multi-line lets ^ match after a newline, but the match must be at 0
        assert!(re.matches_at_start("B\nb").unwrap());
        assert!(!re.matches_at_start("a\nb").unwrap());
        assert_eq!(re.describe(), "Regexp /^b/gi");
    }

    #[test]
    fn test_replace_all_expands_groups() {
        let re = RegExpObject::new("(\\w+)@", false, false);
        assert_eq!(re.replace_all("a@ b@", "<$1>").unwrap(), "<a> <b>");
    }

    #[test]
    fn test_bad_pattern() {
        let re = RegExpObject::new("(", false, false);
        assert!(matches!(re.compile(), Err(ScriptError::Regex(_))));
    }

    #[test]
    fn test_test_method() {
        let re = RegExpObject::new("\\d+", false, false);
        let test = re.get_property("test").unwrap();
        let scope = Scope::new();
        let result = test.call(&[Value::String("42x".into())], &scope).unwrap();
        assert!(matches!(result, Value::Bool(true)));
        assert!(test.call(&[], &scope).is_err());
    }
}
