use proc_macro::TokenStream;
use quote::quote;

mod parser;
mod utils;
use parser::parse_tagged_function;

/// Macro that exposes the resource annotations of a handler's doc comments.
///
/// Every `@name content` line in the doc comments becomes a `specimen::Tag`,
/// returned in source order by a generated `<fn>_tags()` function. Lines that
/// follow an annotation without a blank line in between are appended to its
/// content.
///
/// # Example
///
/// ```ignore
/// /// Show a single user.
/// ///
/// /// @resource App\Http\Resources\UserResource
/// /// @resourcemodel App\Models\User
/// /// @resourcestate verified, admin
/// #[resource_tags]
/// async fn show_user(Path(id): Path<u64>) -> impl IntoResponse {
///     // ...
/// }
///
/// let tags = show_user_tags();
/// ```
#[proc_macro_attribute]
pub fn resource_tags(_attr: TokenStream, item: TokenStream) -> TokenStream {
    match parse_tagged_function(item.into()) {
        Ok(tagged) => {
            let tags_func_name = quote::format_ident!("{}_tags", tagged.name);
            let names = tagged.tags.iter().map(|tag| &tag.name);
            let contents = tagged.tags.iter().map(|tag| &tag.content);

            let output = quote! {
                #tagged

                pub fn #tags_func_name() -> ::std::vec::Vec<::specimen::Tag> {
                    ::std::vec![
                        #(::specimen::Tag::new(#names, #contents)),*
                    ]
                }
            };

            output.into()
        }
        Err(err) => err.to_compile_error().into(),
    }
}
