use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    FnArg, Ident, ItemFn, Pat, Result as SynResult, Token, Type,
};

/// Options accepted by `#[action(...)]`
///
/// - `name = StructName` overrides the generated type name
/// - `strict` / `strict = false` forces the strict data merge on or off
struct ActionArgs {
    name: Option<Ident>,
    strict: Option<bool>,
}

impl Parse for ActionArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut name = None;
        let mut strict = None;
        let options = Punctuated::<ActionOption, Token![,]>::parse_terminated(input)?;
        for option in options {
            match option {
                ActionOption::Name(ident) => name = Some(ident),
                ActionOption::Strict(value) => strict = Some(value),
            }
        }
        Ok(ActionArgs { name, strict })
    }
}

enum ActionOption {
    Name(Ident),
    Strict(bool),
}

impl Parse for ActionOption {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let key: Ident = input.parse()?;
        match key.to_string().as_str() {
            "name" => {
                input.parse::<Token![=]>()?;
                Ok(ActionOption::Name(input.parse()?))
            }
            "strict" => {
                if input.peek(Token![=]) {
                    input.parse::<Token![=]>()?;
                    let value: syn::LitBool = input.parse()?;
                    Ok(ActionOption::Strict(value.value))
                } else {
                    Ok(ActionOption::Strict(true))
                }
            }
            other => Err(syn::Error::new(
                key.span(),
                format!("unexpected option {}", other),
            )),
        }
    }
}

fn is_option(ty: &Type) -> bool {
    if let Type::Path(p) = ty {
        if let Some(seg) = p.path.segments.last() {
            return seg.ident == "Option";
        }
    }
    false
}

fn is_context(ty: &Type) -> bool {
    matches!(ty, Type::Reference(r) if r.mutability.is_some())
}

fn camel_case(snake: &str) -> String {
    snake
        .trim_start_matches("r#")
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Turn a function into an action type
///
/// The function may take `&mut ActionContext` first; every other argument is
/// a declared parameter, deserialized from the filtered parameter map.
/// `Option<T>` arguments may be absent. The function returns
/// `Result<T, E>` with `T: Into<ActionResult>` and `E: Into<anyhow::Error>`.
///
/// ```rust,ignore
/// #[action]
/// fn show_post(cx: &mut ActionContext, id: i64, preview: Option<bool>) -> anyhow::Result<ActionResult> {
///     ...
/// }
///
/// dispatcher.register("posts::Show", ShowPost);
/// ```
#[proc_macro_attribute]
pub fn action(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ActionArgs);
    let input = parse_macro_input!(item as ItemFn);
    let fn_vis = &input.vis;
    let fn_name = &input.sig.ident;

    let struct_name = args.name.unwrap_or_else(|| {
        Ident::new(&camel_case(&fn_name.to_string()), Span::call_site())
    });

    let mut takes_context = false;
    let mut names = Vec::new();
    let mut extractions = Vec::new();
    let mut call_args = Vec::new();

    for (index, arg) in input.sig.inputs.iter().enumerate() {
        let FnArg::Typed(pat_type) = arg else {
            return syn::Error::new_spanned(arg, "actions cannot take `self`")
                .to_compile_error()
                .into();
        };
        let ty = &pat_type.ty;
        if index == 0 && is_context(ty) {
            takes_context = true;
            continue;
        }
        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return syn::Error::new_spanned(&pat_type.pat, "action parameters must be plain identifiers")
                .to_compile_error()
                .into();
        };
        let ident = &pat_ident.ident;
        let name = ident.to_string().trim_start_matches("r#").to_string();
        let optional = is_option(ty);
        extractions.push(quote! {
            let #ident: #ty = ::brrtaction::dispatcher::extract_parameter(
                __cx.action(), &mut __params, #name, #optional,
            )?;
        });
        names.push(name);
        call_args.push(quote! { #ident });
    }

    let call = if takes_context {
        quote! { #fn_name(__cx, #(#call_args),*) }
    } else {
        quote! { #fn_name(#(#call_args),*) }
    };

    let strict_fn = args.strict.map(|strict| {
        quote! {
            fn strict(&self) -> ::std::option::Option<bool> {
                ::std::option::Option::Some(#strict)
            }
        }
    });

    let expanded = quote! {
        #input

        #[derive(Debug, Clone, Copy, Default)]
        #fn_vis struct #struct_name;

        impl ::brrtaction::dispatcher::Action for #struct_name {
            fn parameters(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }

            #[allow(unused_mut)]
            fn invoke(
                &self,
                __cx: &mut ::brrtaction::context::ActionContext,
                mut __params: ::brrtaction::__private::serde_json::Map<
                    ::std::string::String,
                    ::brrtaction::__private::serde_json::Value,
                >,
            ) -> ::brrtaction::__private::anyhow::Result<::brrtaction::dispatcher::ActionResult> {
                #(#extractions)*
                let __result = #call.map_err(::brrtaction::__private::anyhow::Error::from)?;
                ::std::result::Result::Ok(::std::convert::Into::into(__result))
            }

            #strict_fn
        }
    };
    TokenStream::from(expanded)
}
