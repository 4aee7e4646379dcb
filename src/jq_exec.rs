//! jq pre-filtering of declaration documents (via jaq).
//!
//! Lets one input file carry several documents, or a document nested inside
//! a larger JSON payload: `--jq-expr '.schemas[]'`.

use anyhow::{anyhow, Context, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter_src` over `input`; every output becomes one document.
pub fn select_documents(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut documents = Vec::new();
    for (i, item) in outputs.enumerate() {
        let val = item.map_err(|e| anyhow!("jq output {i}: {e:?}"))?;
        // Val renders as JSON text
        let document = serde_json::from_str::<Value>(&val.to_string())
            .with_context(|| format!("jq output {i} is not valid JSON"))?;
        documents.push(document);
    }
    tracing::debug!(filter = filter_src, documents = documents.len(), "jq selection");
    Ok(documents)
}

fn parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> anyhow::Error {
    let lines: Vec<String> = errs
        .into_iter()
        .map(|(file, err)| format!("parse error: {err:?} in `{}`", file.code))
        .collect();
    anyhow!(lines.join("\n"))
}

fn undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> anyhow::Error {
    let lines: Vec<String> = errs
        .into_iter()
        .flat_map(|(file, list)| {
            list.into_iter()
                .map(move |(name, undef)| format!("undefined `{name}`: {undef:?} in `{}`", file.code))
        })
        .collect();
    anyhow!(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_one_payload_into_documents() {
        let payload = json!({ "schemas": [ { "definitions": {} }, { "definitions": { "A": "string" } } ] });
        let docs = select_documents(".schemas[]", &payload).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["definitions"]["A"], "string");
    }

    #[test]
    fn bad_filters_are_errors() {
        assert!(select_documents(".[", &json!({})).is_err());
    }
}
