mod error;
mod types;

pub use error::ParseError;
pub use types::{DocTag, TaggedFn};

use proc_macro2::{Span, TokenStream};
use syn::{Attribute, Expr, ExprLit, ItemFn, Lit, Meta};
use types::DocLine;

use crate::utils::find_closest_annotation;

/// Must match `specimen::annotations`; the crate's tests compare both parsers.
pub(crate) const RESOURCE_ANNOTATIONS: &[&str] = &[
    "resource",
    "resourcecollection",
    "resourcemodel",
    "resourcestate",
];

/// Parse a function annotated with #[resource_tags]
pub fn parse_tagged_function(input: TokenStream) -> Result<TaggedFn, ParseError> {
    let item: ItemFn = syn::parse2(input.clone()).map_err(|err| {
        ParseError::with_span(
            format!(
                "#[resource_tags] can only be applied to functions\n\
                 note: {err}"
            ),
            err.span(),
        )
    })?;

    let doc_lines: Vec<DocLine> = item.attrs.iter().filter_map(doc_line).collect();
    let tags = parse_doc_lines(&doc_lines)?;

    Ok(TaggedFn {
        name: item.sig.ident,
        tokens: input,
        tags,
    })
}

fn doc_line(attr: &Attribute) -> Option<DocLine> {
    if !attr.path().is_ident("doc") {
        return None;
    }
    let Meta::NameValue(meta) = &attr.meta else {
        return None;
    };
    let Expr::Lit(ExprLit {
        lit: Lit::Str(text), ..
    }) = &meta.value
    else {
        return None;
    };

    Some(DocLine {
        text: text.value(),
        span: text.span(),
    })
}

/// Collect annotations from doc lines, in source order
fn parse_doc_lines(lines: &[DocLine]) -> Result<Vec<DocTag>, ParseError> {
    let mut tags: Vec<DocTag> = Vec::new();
    let mut continuing = false;

    for doc_line in lines {
        let trimmed = doc_line.text.trim();

        if trimmed == "@specimen-ignore" {
            // Stop processing further doc comments
            break;
        }

        if let Some(rest) = trimmed.strip_prefix('@') {
            let (name, content) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if name.is_empty() {
                continuing = false;
                continue;
            }
            check_spelling(name, doc_line.span)?;
            tags.push(DocTag {
                name: name.to_string(),
                content: content.trim().to_string(),
            });
            continuing = true;
        } else if trimmed.is_empty() {
            continuing = false;
        } else if continuing {
            if let Some(tag) = tags.last_mut() {
                if !tag.content.is_empty() {
                    tag.content.push(' ');
                }
                tag.content.push_str(trimmed);
            }
        }
    }

    Ok(tags)
}

/// Reject near misses of the resource annotations; anything else passes through
fn check_spelling(name: &str, span: Span) -> Result<(), ParseError> {
    let lower = name.to_lowercase();
    if RESOURCE_ANNOTATIONS.contains(&lower.as_str()) {
        return Ok(());
    }

    match find_closest_annotation(&lower) {
        Some(suggestion) => Err(ParseError::with_span(
            format!(
                "Unknown resource annotation '@{name}'\n\
                 help: did you mean '@{suggestion}'?\n\
                 note: resource annotations are @resource, @resourcecollection, @resourcemodel, @resourcestate"
            ),
            span,
        )),
        None => Ok(()),
    }
}
