use proc_macro2::{Ident, Span, TokenStream};
use quote::ToTokens;

/// One `@name content` annotation read from the doc comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    pub name: String,
    pub content: String,
}

#[derive(Clone)]
pub struct TaggedFn {
    pub name: Ident,
    pub tokens: TokenStream,
    pub tags: Vec<DocTag>,
}

impl ToTokens for TaggedFn {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.tokens.to_tokens(tokens);
    }
}

pub struct DocLine {
    pub text: String,
    pub span: Span,
}
