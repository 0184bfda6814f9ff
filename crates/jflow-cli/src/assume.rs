//! Assumption-spec parsing.
//!
//! Grammar: `<class>.<method>[(<index>=<value>)]-><value>`, e.g.
//! `com.example.Client.getOption(0=1001)->true`. Values are `true`/`false`,
//! `null`, integers (`L` suffix for longs), decimals, or quoted strings.

use anyhow::{Context, Result, bail};
use jflow_analysis::Assumption;
use jflow_common::pattern::MethodPattern;
use jflow_graph::ConstantValue;

/// Parse one `--assume` spec.
pub fn parse_assumption(spec: &str) -> Result<Assumption> {
    let (lhs, result) = spec
        .split_once("->")
        .with_context(|| format!("assumption `{spec}` is missing `->result`"))?;
    let assumed_result = parse_value(result.trim())
        .with_context(|| format!("assumption `{spec}` has an unparsable result"))?;

    let lhs = lhs.trim();
    let (target, argument) = match lhs.split_once('(') {
        Some((target, rest)) => {
            let inner = rest
                .strip_suffix(')')
                .with_context(|| format!("assumption `{spec}` has an unclosed argument filter"))?;
            let (index, value) = inner
                .split_once('=')
                .with_context(|| format!("argument filter `{inner}` is not `index=value`"))?;
            let index: usize = index
                .trim()
                .parse()
                .with_context(|| format!("argument index `{index}` is not a number"))?;
            let value = parse_value(value.trim())
                .with_context(|| format!("argument value `{value}` is unparsable"))?;
            (target, Some((index, value)))
        }
        None => (lhs, None),
    };

    let Some((class, method)) = target.rsplit_once('.') else {
        bail!("assumption target `{target}` is not `class.method`");
    };
    let mut assumption =
        Assumption::new(MethodPattern::of(class, method), assumed_result);
    if let Some((index, value)) = argument {
        assumption = assumption.with_argument(index, value);
    }
    Ok(assumption)
}

/// Parse a literal value from an assumption spec.
pub fn parse_value(text: &str) -> Result<ConstantValue> {
    match text {
        "true" => return Ok(ConstantValue::Bool(true)),
        "false" => return Ok(ConstantValue::Bool(false)),
        "null" => return Ok(ConstantValue::Null),
        _ => {}
    }
    if let Some(quoted) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return Ok(ConstantValue::Str(quoted.to_string()));
    }
    if let Some(body) = text.strip_suffix('L').or_else(|| text.strip_suffix('l')) {
        let value: i64 = body
            .parse()
            .with_context(|| format!("`{body}` is not a long literal"))?;
        return Ok(ConstantValue::Long(value));
    }
    if let Ok(value) = text.parse::<i32>() {
        return Ok(ConstantValue::Int(value));
    }
    if let Ok(value) = text.parse::<i64>() {
        return Ok(ConstantValue::Long(value));
    }
    if let Ok(value) = text.parse::<f64>() {
        return Ok(ConstantValue::Double(value));
    }
    bail!("`{text}` is not a recognised constant literal")
}
