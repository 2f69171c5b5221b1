//! A `nom`-based parser for the XPath 1.0 expression language.
//!
//! Precedence, loosest first: `or`, `and`, equality, relational, additive,
//! multiplicative, unary minus, union, path.

use crate::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit0, digit1, multispace0, satisfy},
    combinator::{map, map_res, not, opt, recognize, success},
    error::{Error as NomError, ErrorKind},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

type PResult<'a, O> = IResult<&'a str, O>;

// --- Main Public Parser ---

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    let parsed: PResult<'_, Expression> = terminated(expr, multispace0).parse(input.trim());
    match parsed {
        Ok(("", expression)) => Ok(expression),
        Ok((rest, _)) => Err(XPathError::Parse {
            expression: input.to_string(),
            message: format!("Unexpected input at '{}'", rest),
        }),
        Err(e) => Err(XPathError::Parse {
            expression: input.to_string(),
            message: e.to_string(),
        }),
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn reject<O>(input: &str) -> PResult<'_, O> {
    Err(nom::Err::Error(NomError::new(input, ErrorKind::Verify)))
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// A word operator such as `div`, which must not run into a following name.
fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = NomError<&'a str>> {
    terminated(tag(word), not(satisfy(is_name_char)))
}

/// Parses `operand (operator operand)*` into a left-associative tree. An
/// operator with no valid right operand is left unconsumed.
fn fold_binary<'a>(
    input: &'a str,
    operand: fn(&'a str) -> PResult<'a, Expression>,
    operator: fn(&'a str) -> PResult<'a, BinaryOperator>,
) -> PResult<'a, Expression> {
    let (mut input, mut left) = operand(input)?;
    loop {
        let op_result: PResult<'a, BinaryOperator> = preceded(multispace0, operator).parse(input);
        let Ok((after_op, op)) = op_result else {
            return Ok((input, left));
        };
        match operand(after_op) {
            Ok((rest, right)) => {
                left = Expression::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                };
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, left)),
            Err(e) => return Err(e),
        }
    }
}

// --- Expression Parsers (in order of precedence) ---

fn expr(input: &str) -> PResult<'_, Expression> {
    fold_binary(input, and_expr, or_op)
}

fn and_expr(input: &str) -> PResult<'_, Expression> {
    fold_binary(input, equality_expr, and_op)
}

fn equality_expr(input: &str) -> PResult<'_, Expression> {
    fold_binary(input, relational_expr, equality_op)
}

fn relational_expr(input: &str) -> PResult<'_, Expression> {
    fold_binary(input, additive_expr, relational_op)
}

fn additive_expr(input: &str) -> PResult<'_, Expression> {
    fold_binary(input, multiplicative_expr, additive_op)
}

fn multiplicative_expr(input: &str) -> PResult<'_, Expression> {
    fold_binary(input, unary_expr, multiplicative_op)
}

fn unary_expr(input: &str) -> PResult<'_, Expression> {
    let minus: PResult<'_, char> = preceded(multispace0, char('-')).parse(input);
    match minus {
        Ok((rest, _)) => map(unary_expr, |e| Expression::Negate(Box::new(e))).parse(rest),
        Err(_) => union_expr(input),
    }
}

fn union_expr(input: &str) -> PResult<'_, Expression> {
    fold_binary(input, path_expr, union_op)
}

fn or_op(input: &str) -> PResult<'_, BinaryOperator> {
    map(keyword("or"), |_| BinaryOperator::Or).parse(input)
}

fn and_op(input: &str) -> PResult<'_, BinaryOperator> {
    map(keyword("and"), |_| BinaryOperator::And).parse(input)
}

fn equality_op(input: &str) -> PResult<'_, BinaryOperator> {
    alt((
        map(tag("!="), |_| BinaryOperator::NotEquals),
        map(char('='), |_| BinaryOperator::Equals),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> PResult<'_, BinaryOperator> {
    alt((
        map(tag("<="), |_| BinaryOperator::LessThanOrEqual),
        map(tag(">="), |_| BinaryOperator::GreaterThanOrEqual),
        map(char('<'), |_| BinaryOperator::LessThan),
        map(char('>'), |_| BinaryOperator::GreaterThan),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> PResult<'_, BinaryOperator> {
    alt((
        map(char('+'), |_| BinaryOperator::Plus),
        map(char('-'), |_| BinaryOperator::Minus),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> PResult<'_, BinaryOperator> {
    alt((
        map(char('*'), |_| BinaryOperator::Multiply),
        map(keyword("div"), |_| BinaryOperator::Divide),
        map(keyword("mod"), |_| BinaryOperator::Modulo),
    ))
    .parse(input)
}

fn union_op(input: &str) -> PResult<'_, BinaryOperator> {
    map(char('|'), |_| BinaryOperator::Union).parse(input)
}

// --- Paths ---

/// Primary expressions are tried first so that `position()` is not read as a
/// step named `position`.
fn path_expr(input: &str) -> PResult<'_, Expression> {
    let (input, _) = multispace0(input)?;
    alt((filter_expr, map(location_path, Expression::Path))).parse(input)
}

fn filter_expr(input: &str) -> PResult<'_, Expression> {
    let (input, primary) = primary_expr(input)?;
    let (input, predicates) = many0(predicate).parse(input)?;
    let (input, steps) = relative_steps(input)?;
    if predicates.is_empty() && steps.is_empty() {
        return Ok((input, primary));
    }
    Ok((
        input,
        Expression::Filter {
            primary: Box::new(primary),
            predicates,
            steps,
        },
    ))
}

fn location_path(input: &str) -> PResult<'_, LocationPath> {
    let double_slash: PResult<'_, &str> = tag("//").parse(input);
    if let Ok((rest, _)) = double_slash {
        let (rest, first) = step(rest)?;
        let (rest, more) = relative_steps(rest)?;
        let mut steps = vec![Step::descendant_or_self(), first];
        steps.extend(more);
        return Ok((rest, LocationPath { absolute: true, steps }));
    }

    let slash: PResult<'_, &str> = tag("/").parse(input);
    if let Ok((rest, _)) = slash {
        return match step(rest) {
            Ok((rest, first)) => {
                let (rest, more) = relative_steps(rest)?;
                let mut steps = vec![first];
                steps.extend(more);
                Ok((rest, LocationPath { absolute: true, steps }))
            }
            // A lone `/` selects the root.
            Err(nom::Err::Error(_)) => Ok((
                rest,
                LocationPath {
                    absolute: true,
                    steps: Vec::new(),
                },
            )),
            Err(e) => Err(e),
        };
    }

    let (rest, first) = step(input)?;
    let (rest, more) = relative_steps(rest)?;
    let mut steps = vec![first];
    steps.extend(more);
    Ok((
        rest,
        LocationPath {
            absolute: false,
            steps,
        },
    ))
}

/// `(/ step | // step)*`, expanding `//` into `descendant-or-self::node()`.
fn relative_steps(input: &str) -> PResult<'_, Vec<Step>> {
    let (input, parts) = many0(pair(
        preceded(multispace0, alt((tag("//"), tag("/")))),
        step,
    ))
    .parse(input)?;
    let mut steps = Vec::with_capacity(parts.len());
    for (separator, next) in parts {
        if separator == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next);
    }
    Ok((input, steps))
}

fn step(input: &str) -> PResult<'_, Step> {
    let (input, _) = multispace0(input)?;
    let abbreviated: PResult<'_, Step> = alt((
        map(tag(".."), |_| {
            Step::new(Axis::Parent, NodeTest::Kind(KindTest::Node))
        }),
        map(terminated(char('.'), not(digit1)), |_| {
            Step::new(Axis::SelfAxis, NodeTest::Kind(KindTest::Node))
        }),
    ))
    .parse(input);
    if abbreviated.is_ok() {
        return abbreviated;
    }

    let (input, axis) = alt((
        map(char('@'), |_| Axis::Attribute),
        axis_specifier,
        success(Axis::Child),
    ))
    .parse(input)?;
    let (input, test) = preceded(multispace0, node_test).parse(input)?;
    let (input, predicates) = many0(predicate).parse(input)?;
    Ok((
        input,
        Step {
            axis,
            test,
            predicates,
        },
    ))
}

fn axis_specifier(input: &str) -> PResult<'_, Axis> {
    let (rest, name) = nc_name(input)?;
    let axis = match name {
        "ancestor" => Axis::Ancestor,
        "ancestor-or-self" => Axis::AncestorOrSelf,
        "attribute" => Axis::Attribute,
        "child" => Axis::Child,
        "descendant" => Axis::Descendant,
        "descendant-or-self" => Axis::DescendantOrSelf,
        "following" => Axis::Following,
        "following-sibling" => Axis::FollowingSibling,
        "parent" => Axis::Parent,
        "preceding" => Axis::Preceding,
        "preceding-sibling" => Axis::PrecedingSibling,
        "self" => Axis::SelfAxis,
        _ => return reject(input),
    };
    let (rest, _) = preceded(multispace0, tag("::")).parse(rest)?;
    Ok((rest, axis))
}

fn predicate(input: &str) -> PResult<'_, Expression> {
    delimited(
        preceded(multispace0, char('[')),
        expr,
        preceded(multispace0, char(']')),
    )
    .parse(input)
}

// --- Names and Node Tests ---

fn nc_name(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_name_char),
    ))
    .parse(input)
}

fn q_name(input: &str) -> PResult<'_, (Option<&str>, &str)> {
    let (rest, first) = nc_name(input)?;
    let local: PResult<'_, &str> = preceded(char(':'), nc_name).parse(rest);
    match local {
        Ok((rest, local)) => Ok((rest, (Some(first), local))),
        Err(_) => Ok((rest, (None, first))),
    }
}

fn node_test(input: &str) -> PResult<'_, NodeTest> {
    alt((
        kind_test,
        map(char('*'), |_| NodeTest::Any),
        map(terminated(nc_name, tag(":*")), |prefix: &str| {
            NodeTest::AnyInPrefix(prefix.to_string())
        }),
        map(q_name, |(prefix, local)| NodeTest::Name {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }),
    ))
    .parse(input)
}

fn kind_test(input: &str) -> PResult<'_, NodeTest> {
    let (rest, name) = nc_name(input)?;
    let kind = match name {
        "text" => KindTest::Text,
        "node" => KindTest::Node,
        "comment" => KindTest::Comment,
        "processing-instruction" => KindTest::ProcessingInstruction(None),
        _ => return reject(input),
    };
    let (rest, target) = delimited(
        ws(char('(')),
        opt(string_literal),
        preceded(multispace0, char(')')),
    )
    .parse(rest)?;
    let kind = match (kind, target) {
        (KindTest::ProcessingInstruction(_), target) => KindTest::ProcessingInstruction(target),
        (kind, None) => kind,
        (_, Some(_)) => return reject(input),
    };
    Ok((rest, NodeTest::Kind(kind)))
}

// --- Primary Expressions ---

fn primary_expr(input: &str) -> PResult<'_, Expression> {
    alt((
        delimited(char('('), expr, preceded(multispace0, char(')'))),
        map(string_literal, Expression::Literal),
        map(number, Expression::Number),
        function_call,
    ))
    .parse(input)
}

fn string_literal(input: &str) -> PResult<'_, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

/// `digits ('.' digits?)?` or `'.' digits`. No sign (that is unary minus) and
/// no exponent.
fn number(input: &str) -> PResult<'_, f64> {
    map_res(
        recognize(alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        ))),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn function_call(input: &str) -> PResult<'_, Expression> {
    let (rest, (prefix, local)) = q_name(input)?;
    // Node-type tests like text() are steps, not functions.
    if prefix.is_none() && matches!(local, "text" | "node" | "comment" | "processing-instruction") {
        return reject(input);
    }
    let (rest, args) = delimited(
        preceded(multispace0, char('(')),
        separated_list0(preceded(multispace0, char(',')), expr),
        preceded(multispace0, char(')')),
    )
    .parse(rest)?;
    let name = match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    };
    Ok((rest, Expression::FunctionCall { name, args }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_step(axis: Axis, local: &str) -> Step {
        Step::new(
            axis,
            NodeTest::Name {
                prefix: None,
                local: local.to_string(),
            },
        )
    }

    #[test]
    fn test_parse_simple_path() {
        let result = parse_expression("foo/bar").unwrap();
        assert_eq!(
            result,
            Expression::Path(LocationPath {
                absolute: false,
                steps: vec![name_step(Axis::Child, "foo"), name_step(Axis::Child, "bar")],
            })
        );
    }

    #[test]
    fn test_parse_abbreviations() {
        let result = parse_expression("//a/../@b").unwrap();
        assert_eq!(
            result,
            Expression::Path(LocationPath {
                absolute: true,
                steps: vec![
                    Step::descendant_or_self(),
                    name_step(Axis::Child, "a"),
                    Step::new(Axis::Parent, NodeTest::Kind(KindTest::Node)),
                    name_step(Axis::Attribute, "b"),
                ],
            })
        );
        assert_eq!(
            parse_expression("/").unwrap(),
            Expression::Path(LocationPath {
                absolute: true,
                steps: vec![],
            })
        );
    }

    #[test]
    fn test_parse_axes() {
        let Expression::Path(lp) = parse_expression("following-sibling::foo").unwrap() else {
            panic!("Expected a path");
        };
        assert_eq!(lp.steps[0].axis, Axis::FollowingSibling);

        let Expression::Path(lp) = parse_expression("ancestor-or-self :: *").unwrap() else {
            panic!("Expected a path");
        };
        assert_eq!(lp.steps[0].axis, Axis::AncestorOrSelf);
        assert_eq!(lp.steps[0].test, NodeTest::Any);
    }

    #[test]
    fn test_parse_unary_minus() {
        assert_eq!(
            parse_expression("-5").unwrap(),
            Expression::Negate(Box::new(Expression::Number(5.0)))
        );
        let Expression::Binary { op, right, .. } = parse_expression("10 - -5").unwrap() else {
            panic!("Expected a binary expression");
        };
        assert_eq!(op, BinaryOperator::Minus);
        assert_eq!(*right, Expression::Negate(Box::new(Expression::Number(5.0))));
    }

    #[test]
    fn test_word_operators_need_a_boundary() {
        // `division` and `order` are element names, not operators.
        let Expression::Binary { op, left, right } = parse_expression("division div order").unwrap()
        else {
            panic!("Expected a binary expression");
        };
        assert_eq!(op, BinaryOperator::Divide);
        assert_eq!(
            *left,
            Expression::Path(LocationPath {
                absolute: false,
                steps: vec![name_step(Axis::Child, "division")],
            })
        );
        assert!(matches!(*right, Expression::Path(_)));
    }

    #[test]
    fn test_names_that_look_like_numbers_or_keywords() {
        // nom's float parser would read `info` as infinity.
        let Expression::Path(lp) = parse_expression("/info/nan").unwrap() else {
            panic!("Expected a path");
        };
        assert_eq!(lp.steps.len(), 2);
        assert_eq!(parse_expression(".5").unwrap(), Expression::Number(0.5));
    }

    #[test]
    fn test_parse_predicate() {
        let Expression::Path(lp) = parse_expression("foo[@id = 'a'][1]").unwrap() else {
            panic!("Expected a path");
        };
        let predicates = &lp.steps[0].predicates;
        assert_eq!(predicates.len(), 2);
        assert_eq!(
            predicates[0],
            Expression::Binary {
                op: BinaryOperator::Equals,
                left: Box::new(Expression::Path(LocationPath {
                    absolute: false,
                    steps: vec![name_step(Axis::Attribute, "id")],
                })),
                right: Box::new(Expression::Literal("a".into())),
            }
        );
        assert_eq!(predicates[1], Expression::Number(1.0));
    }

    #[test]
    fn test_parse_function_calls() {
        assert_eq!(
            parse_expression("boolean(/a = 'true')").unwrap(),
            Expression::FunctionCall {
                name: "boolean".to_string(),
                args: vec![Expression::Binary {
                    op: BinaryOperator::Equals,
                    left: Box::new(Expression::Path(LocationPath {
                        absolute: true,
                        steps: vec![name_step(Axis::Child, "a")],
                    })),
                    right: Box::new(Expression::Literal("true".into())),
                }],
            }
        );
        assert!(matches!(
            parse_expression("position() = last()").unwrap(),
            Expression::Binary { op: BinaryOperator::Equals, .. }
        ));
    }

    #[test]
    fn test_parse_filter_expression() {
        let result = parse_expression("(//a)[2]/b").unwrap();
        let Expression::Filter { predicates, steps, .. } = result else {
            panic!("Expected a filter expression");
        };
        assert_eq!(predicates, vec![Expression::Number(2.0)]);
        assert_eq!(steps, vec![name_step(Axis::Child, "b")]);
    }

    #[test]
    fn test_text_is_a_step_not_a_function() {
        let Expression::Path(lp) = parse_expression("/a/text()").unwrap() else {
            panic!("Expected a path");
        };
        assert_eq!(lp.steps[1].test, NodeTest::Kind(KindTest::Text));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_expression(""), Err(XPathError::Parse { .. })));
        assert!(matches!(parse_expression("/a/["), Err(XPathError::Parse { .. })));
        assert!(matches!(parse_expression("count(/a"), Err(XPathError::Parse { .. })));
        assert!(matches!(parse_expression("$var"), Err(XPathError::Parse { .. })));
    }
}
