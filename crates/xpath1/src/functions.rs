//! The XPath 1.0 core function library.

use crate::datasource::DataSourceNode;
use crate::engine::{EvaluationContext, XPathValue};
use crate::error::XPathError;

/// Dispatches a call to a built-in function. Arguments are already evaluated.
pub fn call<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<XPathValue<N>, XPathError> {
    match name {
        // Node-set
        "last" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Number(e_ctx.context_size as f64))
        }
        "position" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Number(e_ctx.context_position as f64))
        }
        "count" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Number(node_set(name, &args[0])?.len() as f64))
        }
        "local-name" | "name" => {
            arity(name, &args, 0, 1)?;
            let node = match args.first() {
                Some(arg) => node_set(name, arg)?.first().copied(),
                None => Some(e_ctx.context_node),
            };
            let q_name = node.and_then(|n| n.name());
            let result = match (name, q_name) {
                (_, None) => String::new(),
                ("name", Some(q)) => match q.prefix {
                    Some(prefix) => format!("{}:{}", prefix, q.local_part),
                    None => q.local_part.to_string(),
                },
                (_, Some(q)) => q.local_part.to_string(),
            };
            Ok(XPathValue::String(result))
        }

        // String
        "string" => {
            arity(name, &args, 0, 1)?;
            Ok(XPathValue::String(string_arg_or_context(&args, e_ctx)))
        }
        "concat" => {
            if args.len() < 2 {
                return Err(XPathError::arity(name, "at least 2", args.len()));
            }
            Ok(XPathValue::String(args.iter().map(|a| a.to_string()).collect()))
        }
        "starts-with" => {
            arity(name, &args, 2, 2)?;
            Ok(XPathValue::Boolean(args[0].to_string().starts_with(&args[1].to_string())))
        }
        "contains" => {
            arity(name, &args, 2, 2)?;
            Ok(XPathValue::Boolean(args[0].to_string().contains(&args[1].to_string())))
        }
        "substring-before" => {
            arity(name, &args, 2, 2)?;
            let (haystack, needle) = (args[0].to_string(), args[1].to_string());
            let result = haystack
                .find(&needle)
                .map(|i| haystack[..i].to_string())
                .unwrap_or_default();
            Ok(XPathValue::String(result))
        }
        "substring-after" => {
            arity(name, &args, 2, 2)?;
            let (haystack, needle) = (args[0].to_string(), args[1].to_string());
            let result = haystack
                .find(&needle)
                .map(|i| haystack[i + needle.len()..].to_string())
                .unwrap_or_default();
            Ok(XPathValue::String(result))
        }
        "substring" => {
            arity(name, &args, 2, 3)?;
            let source = args[0].to_string();
            let start = round_half_up(args[1].to_number());
            let end = args
                .get(2)
                .map_or(f64::INFINITY, |len| start + round_half_up(len.to_number()));
            let result = source
                .chars()
                .enumerate()
                .filter(|(i, _)| {
                    let pos = (*i + 1) as f64;
                    pos >= start && pos < end
                })
                .map(|(_, c)| c)
                .collect();
            Ok(XPathValue::String(result))
        }
        "string-length" => {
            arity(name, &args, 0, 1)?;
            let s = string_arg_or_context(&args, e_ctx);
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            arity(name, &args, 0, 1)?;
            let s = string_arg_or_context(&args, e_ctx);
            Ok(XPathValue::String(s.split_whitespace().collect::<Vec<_>>().join(" ")))
        }
        "translate" => {
            arity(name, &args, 3, 3)?;
            let from: Vec<char> = args[1].to_string().chars().collect();
            let to: Vec<char> = args[2].to_string().chars().collect();
            let result = args[0]
                .to_string()
                .chars()
                .filter_map(|c| match from.iter().position(|&f| f == c) {
                    Some(pos) => to.get(pos).copied(),
                    None => Some(c),
                })
                .collect();
            Ok(XPathValue::String(result))
        }

        // Boolean
        "boolean" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(args[0].to_bool()))
        }
        "not" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(!args[0].to_bool()))
        }
        "true" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Boolean(true))
        }
        "false" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Boolean(false))
        }

        // Number
        "number" => {
            arity(name, &args, 0, 1)?;
            let n = match args.first() {
                Some(arg) => arg.to_number(),
                None => XPathValue::NodeSet(vec![e_ctx.context_node]).to_number(),
            };
            Ok(XPathValue::Number(n))
        }
        "sum" => {
            arity(name, &args, 1, 1)?;
            let total: f64 = node_set(name, &args[0])?
                .iter()
                .map(|n| crate::engine::string_to_number(&n.string_value()))
                .sum();
            Ok(XPathValue::Number(total))
        }
        "floor" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Number(args[0].to_number().floor()))
        }
        "ceiling" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Number(args[0].to_number().ceil()))
        }
        "round" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Number(round_half_up(args[0].to_number())))
        }

        _ => Err(XPathError::UnknownFunction(name.to_string())),
    }
}

fn arity<N>(name: &str, args: &[XPathValue<N>], min: usize, max: usize) -> Result<(), XPathError> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{} to {}", min, max)
    };
    Err(XPathError::arity(name, &expected, args.len()))
}

fn node_set<'v, N>(name: &str, value: &'v XPathValue<N>) -> Result<&'v [N], XPathError> {
    match value {
        XPathValue::NodeSet(nodes) => Ok(nodes.as_slice()),
        _ => Err(XPathError::Function {
            function: format!("{}()", name),
            message: "Argument must be a node-set".to_string(),
        }),
    }
}

fn string_arg_or_context<'a, N: DataSourceNode<'a>>(
    args: &[XPathValue<N>],
    e_ctx: &EvaluationContext<'a, N>,
) -> String {
    match args.first() {
        Some(arg) => arg.to_string(),
        None => e_ctx.context_node.string_value(),
    }
}

/// XPath `round()`: ties go towards positive infinity, NaN and infinities pass through.
fn round_half_up(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{EvaluationContext, XPathValue, evaluate};
    use crate::error::XPathError;
    use crate::parser::parse_expression;
    use crate::tree::{TreeNode, sample_tree};

    fn run(xpath: &str) -> Result<XPathValue<TreeNode<'static>>, XPathError> {
        let tree: &'static _ = Box::leak(Box::new(sample_tree()));
        let expr = parse_expression(xpath)?;
        evaluate(&expr, &EvaluationContext::new(tree.root()))
    }

    fn string(xpath: &str) -> String {
        match run(xpath).unwrap() {
            XPathValue::String(s) => s,
            other => panic!("Expected a string, got {:?}", other),
        }
    }

    fn number(xpath: &str) -> f64 {
        match run(xpath).unwrap() {
            XPathValue::Number(n) => n,
            other => panic!("Expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(string("concat('a', 'b', /root/para)"), "abHello");
        assert_eq!(string("substring-before('2024-01-05', '-')"), "2024");
        assert_eq!(string("substring-after('2024-01-05', '-')"), "01-05");
        assert_eq!(string("substring('12345', 2, 3)"), "234");
        assert_eq!(string("substring('12345', 1.5, 2.6)"), "234");
        assert_eq!(string("normalize-space('  a   b ')"), "a b");
        assert_eq!(string("translate('bar', 'abc', 'ABC')"), "BAr");
        assert_eq!(string("translate('--a--', '-', '')"), "a");
    }

    #[test]
    fn test_node_functions() {
        assert_eq!(number("count(/root/para)"), 2.0);
        assert_eq!(string("name(//@xml:lang)"), "xml:lang");
        assert_eq!(string("local-name(//@xml:lang)"), "lang");
        assert_eq!(string("name(/)"), "");
    }

    #[test]
    fn test_number_functions() {
        assert_eq!(number("round(2.5)"), 3.0);
        assert_eq!(number("round(-2.5)"), -2.0);
        assert_eq!(number("floor(2.7) + ceiling(2.1)"), 5.0);
        assert!(number("number('abc')").is_nan());
        assert_eq!(number("string-length('héllo')"), 5.0);
    }

    #[test]
    fn test_boolean_functions() {
        assert!(matches!(run("not(/root/missing)"), Ok(XPathValue::Boolean(true))));
        assert!(matches!(run("boolean('')"), Ok(XPathValue::Boolean(false))));
        assert!(matches!(run("contains('payload', 'load')"), Ok(XPathValue::Boolean(true))));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(run("frobnicate()"), Err(XPathError::UnknownFunction(_))));
        assert!(matches!(run("count('x')"), Err(XPathError::Function { .. })));
        assert!(matches!(run("true(1)"), Err(XPathError::Function { .. })));
    }
}
