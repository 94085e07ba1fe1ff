//! Textual pointcut expressions.
//!
//! ```text
//! expr    := or
//! or      := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | "(" expr ")" | primary
//! primary := "execution" "(" RET QUALIFIED "(" PARAMS ")" ")"
//!          | NAME "(" ")"
//! PARAMS  := ".." | "" | GLOB ( "," GLOB )*
//! ```
//!
//! `QUALIFIED` is `package.Type.method`: the last segment is the method, the
//! one before it the type, everything before that the package. The return
//! type pattern is accepted and ignored.

use crate::{
    error::PointcutParseError,
    pattern::Pattern,
    pointcut::{Atom, ParamPattern, Pointcut},
};
use std::str::FromStr;

impl FromStr for Pointcut {
    type Err = PointcutParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse(source)
    }
}

/// Parse a pointcut expression.
pub fn parse(source: &str) -> Result<Pointcut, PointcutParseError> {
    let mut parser = Parser { src: source, pos: 0 };
    let expr = parser.or()?;
    parser.skip_ws();
    if parser.pos < source.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '*')
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error(&self, message: impl Into<String>) -> PointcutParseError {
        PointcutParseError::new(self.pos, message)
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), PointcutParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{token}`")))
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        self.skip_ws();
        let rest = self.rest();
        let len = rest.find(|c| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn or(&mut self) -> Result<Pointcut, PointcutParseError> {
        let mut lhs = self.and()?;
        while self.eat("||") {
            lhs = lhs | self.and()?;
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Pointcut, PointcutParseError> {
        let mut lhs = self.unary()?;
        while self.eat("&&") {
            lhs = lhs & self.unary()?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Pointcut, PointcutParseError> {
        if self.eat("!") {
            return Ok(!self.unary()?);
        }
        if self.eat("(") {
            let inner = self.or()?;
            self.expect(")")?;
            return Ok(inner);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Pointcut, PointcutParseError> {
        let start = self.pos;
        let word = self.take_while(is_name_char);
        if word.is_empty() {
            return Err(self.error("expected a pointcut"));
        }
        self.expect("(")?;

        if word == "execution" {
            let atom = self.execution()?;
            self.expect(")")?;
            return Ok(Pointcut::Atom(atom));
        }

        if word.contains('*') {
            return Err(PointcutParseError::new(
                start,
                format!("pointcut name `{word}` may not contain `*`"),
            ));
        }
        self.expect(")")?;
        Ok(Pointcut::named(word))
    }

    fn execution(&mut self) -> Result<Atom, PointcutParseError> {
        let ret = self.take_while(|c| !c.is_whitespace() && c != '(' && c != ')');
        if ret.is_empty() {
            return Err(self.error("expected a return type pattern"));
        }

        let start = self.pos;
        let qualified = self.take_while(is_name_char);
        let Some((owner, method)) = qualified.rsplit_once('.') else {
            return Err(PointcutParseError::new(
                start,
                "expected `Type.method` after the return type",
            ));
        };
        let (package, type_name) = owner.rsplit_once('.').unwrap_or(("", owner));
        if type_name.is_empty() || method.is_empty() {
            return Err(PointcutParseError::new(start, "empty type or method pattern"));
        }

        self.expect("(")?;
        let params = self.params()?;
        self.expect(")")?;

        Ok(Atom {
            package: Pattern::new(package),
            type_name: Pattern::new(type_name),
            method: Pattern::new(method),
            params,
        })
    }

    fn params(&mut self) -> Result<ParamPattern, PointcutParseError> {
        if self.eat("..") {
            return Ok(ParamPattern::Any);
        }
        let mut patterns = Vec::new();
        loop {
            if !patterns.is_empty() && self.eat("..") {
                if self.eat(",") {
                    return Err(self.error("`..` must be the last parameter pattern"));
                }
                return Ok(ParamPattern::Leading(patterns));
            }
            self.skip_ws();
            let start = self.pos;
            let param = self.take_while(|c| is_name_char(c) || matches!(c, '[' | ']' | '<' | '>'));
            if param.is_empty() {
                if patterns.is_empty() {
                    break;
                }
                return Err(self.error("expected a parameter pattern"));
            }
            if param.contains("..") {
                return Err(PointcutParseError::new(
                    start,
                    format!("invalid parameter pattern `{param}`"),
                ));
            }
            patterns.push(Pattern::new(param));
            if !self.eat(",") {
                break;
            }
        }
        Ok(ParamPattern::Exact(patterns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CallSignature;

    #[test]
    fn test_parse_execution() {
        let p: Pointcut = "execution(* com.luv2code.aopdemo.dao.*.get*(..))".parse().unwrap();
        assert_eq!(
            p,
            Pointcut::execution("com.luv2code.aopdemo.dao", "*", "get*")
        );
    }

    #[test]
    fn test_parse_combination_precedence() {
        let p = parse("forDaoPackage() && !(getter() || setter())").unwrap();
        let expected = Pointcut::named("forDaoPackage")
            & !(Pointcut::named("getter") | Pointcut::named("setter"));
        assert_eq!(p, expected);

        // `&&` binds tighter than `||`
        let p = parse("a() || b() && c()").unwrap();
        assert_eq!(
            p,
            Pointcut::named("a") | (Pointcut::named("b") & Pointcut::named("c"))
        );
    }

    #[test]
    fn test_parse_qualified_reference() {
        let p = parse("com.luv2code.aopdemo.aspect.LuvAopExpressions.forDaoPackageNoGetterSetter()")
            .unwrap();
        assert_eq!(
            p.references(),
            vec!["com.luv2code.aopdemo.aspect.LuvAopExpressions.forDaoPackageNoGetterSetter"]
        );
    }

    #[test]
    fn test_parse_exact_params() {
        let p = parse("execution(* dao.*.findAccounts(*))").unwrap();
        let Pointcut::Atom(atom) = &p else {
            panic!("expected an atom, got {p:?}");
        };
        assert_eq!(atom.params, ParamPattern::Exact(vec![Pattern::new("*")]));
        assert!(atom.matches(&CallSignature::new("dao.AccountDao", "findAccounts").with_params(["bool"])));

        let p = parse("execution(void dao.AccountDao.doWork())").unwrap();
        let Pointcut::Atom(atom) = &p else {
            panic!("expected an atom, got {p:?}");
        };
        assert_eq!(atom.params, ParamPattern::Exact(Vec::new()));
    }

    #[test]
    fn test_parse_trailing_any_params() {
        let p = parse("execution(* dao.*.add*(Account, ..))").unwrap();
        let Pointcut::Atom(atom) = &p else {
            panic!("expected an atom, got {p:?}");
        };
        assert_eq!(atom.params, ParamPattern::Leading(vec![Pattern::new("Account")]));

        let add = |params: &[&str]| {
            CallSignature::new("dao.AccountDao", "addAccount").with_params(params.iter().copied())
        };
        assert!(atom.matches(&add(&["Account"])));
        assert!(atom.matches(&add(&["Account", "boolean"])));
        assert!(!atom.matches(&add(&["boolean", "Account"])));
        assert!(!atom.matches(&add(&[])));

        assert_eq!(parse(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn test_misplaced_any_params_rejected() {
        let err = parse("execution(* dao.*.add*(Account, .., boolean))").unwrap_err();
        assert!(err.message.contains("last parameter"));

        let err = parse("execution(* dao.*.add*(Account..))").unwrap_err();
        assert_eq!(err.offset, 23);
        assert!(parse("execution(* dao.*.add*(.., Account))").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let src = "execution(* dao.*.get*(..)) && !setter()";
        let p = parse(src).unwrap();
        assert_eq!(parse(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn test_parse_errors_report_offset() {
        let err = parse("getter() &&").unwrap_err();
        assert_eq!(err.offset, 11);

        let err = parse("execution(* findAccounts(..))").unwrap_err();
        assert!(err.message.contains("Type.method"));

        assert!(parse("get*()").is_err());
        assert!(parse("getter() )").is_err());
        assert!(parse("").is_err());
    }
}
