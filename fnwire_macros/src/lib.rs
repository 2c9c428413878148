use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    Expr, FnArg, Ident, ItemFn, Pat, Result as SynResult, Token, Type,
};

struct DefaultDef {
    ident: Ident,
    value: Expr,
}

impl Parse for DefaultDef {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let ident: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: Expr = input.parse()?;
        Ok(DefaultDef { ident, value })
    }
}

struct ProcedureArgs {
    defaults: Vec<DefaultDef>,
}

impl Parse for ProcedureArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut defaults = Vec::new();
        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            let content;
            parenthesized!(content in input);
            let defs = Punctuated::<DefaultDef, Token![,]>::parse_terminated(&content)?;
            match ident.to_string().as_str() {
                "defaults" => defaults = defs.into_iter().collect(),
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unexpected section {}", other),
                    ))
                }
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(ProcedureArgs { defaults })
    }
}

struct Param {
    ident: Ident,
    ty: Type,
}

fn collect_params(input: &ItemFn) -> SynResult<Vec<Param>> {
    let mut params = Vec::new();
    for arg in &input.sig.inputs {
        match arg {
            FnArg::Receiver(r) => {
                return Err(syn::Error::new_spanned(r, "methods cannot be procedures"))
            }
            FnArg::Typed(pt) => match pt.pat.as_ref() {
                Pat::Ident(pi) => params.push(Param {
                    ident: pi.ident.clone(),
                    ty: (*pt.ty).clone(),
                }),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "procedure parameters must be plain identifiers",
                    ))
                }
            },
        }
    }
    Ok(params)
}

/// Derives a parameter contract from an ordinary `fn` and emits a
/// `<name>_procedure()` constructor returning a registerable
/// `fnwire::Procedure`.
///
/// Parameter names are taken in declaration order. Defaults are declared in
/// the attribute and must cover a suffix of the parameter list:
///
/// ```ignore
/// #[procedure(defaults(b = 2))]
/// fn add(a: i64, b: i64) -> i64 {
///     a + b
/// }
/// ```
///
/// Arguments are bound positionally from the request fields and converted
/// into the declared types with `serde_json`; declare a parameter as
/// `serde_json::Value` to receive the raw field unchanged. A conversion
/// failure surfaces to the caller as a handler failure, not a binding error.
#[proc_macro_attribute]
pub fn procedure(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ProcedureArgs);
    let input = parse_macro_input!(item as ItemFn);

    if let Some(asyncness) = &input.sig.asyncness {
        return TokenStream::from(
            syn::Error::new_spanned(asyncness, "procedures are invoked synchronously; remove `async`")
                .to_compile_error(),
        );
    }
    if !input.sig.generics.params.is_empty() {
        return TokenStream::from(
            syn::Error::new_spanned(&input.sig.generics, "procedures cannot be generic")
                .to_compile_error(),
        );
    }

    let params = match collect_params(&input) {
        Ok(p) => p,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };
    let param_names: Vec<String> = params.iter().map(|p| p.ident.to_string()).collect();

    // Defaults must name real parameters, exactly once each.
    let mut defaulted: Vec<&DefaultDef> = Vec::new();
    for def in &args.defaults {
        let name = def.ident.to_string();
        if !param_names.iter().any(|p| *p == name) {
            return TokenStream::from(
                syn::Error::new(def.ident.span(), format!("no parameter named `{}`", name))
                    .to_compile_error(),
            );
        }
        if defaulted.iter().any(|d| d.ident == def.ident) {
            return TokenStream::from(
                syn::Error::new(def.ident.span(), format!("duplicate default for `{}`", name))
                    .to_compile_error(),
            );
        }
        defaulted.push(def);
    }

    // Required parameters precede optional ones: the defaulted set must be a
    // suffix of the declaration order.
    let required_count = param_names.len() - defaulted.len();
    for name in &param_names[..required_count] {
        if let Some(def) = defaulted.iter().find(|d| d.ident == *name) {
            return TokenStream::from(
                syn::Error::new(
                    def.ident.span(),
                    format!(
                        "parameter `{}` with a default must come after all required parameters",
                        name
                    ),
                )
                .to_compile_error(),
            );
        }
    }

    let fn_name = &input.sig.ident;
    let ctor_name = format_ident!("{}_procedure", fn_name);
    let fn_vis = &input.vis;
    let name_str = fn_name.to_string();

    let defaults_init = if defaulted.is_empty() {
        quote! { let defaults = ::std::collections::HashMap::new(); }
    } else {
        let inserts = defaulted.iter().map(|def| {
            let name = def.ident.to_string();
            let value = &def.value;
            quote! { defaults.insert(#name.to_string(), ::serde_json::json!(#value)); }
        });
        quote! {
            let mut defaults = ::std::collections::HashMap::new();
            #(#inserts)*
        }
    };

    // The generated locals are prefixed to keep clear of the function's own
    // parameter names.
    let arg_bindings = params.iter().map(|p| {
        let ident = &p.ident;
        let ty = &p.ty;
        let name = p.ident.to_string();
        quote! {
            let #ident: #ty = ::serde_json::from_value(
                __fnwire_args.next().unwrap_or(::serde_json::Value::Null),
            )
            .map_err(|e| {
                ::fnwire::HandlerError::failure(format!(
                    "invalid value for parameter '{}': {}",
                    #name, e
                ))
            })?;
        }
    });

    let args_pat = if params.is_empty() {
        quote! { _args }
    } else {
        quote! { __fnwire_args }
    };
    let args_iter = if params.is_empty() {
        quote! {}
    } else {
        quote! { let mut __fnwire_args = __fnwire_args.into_iter(); }
    };

    let call_idents: Vec<&Ident> = params.iter().map(|p| &p.ident).collect();
    let invoke = quote! { ::fnwire::IntoReply::into_reply(#fn_name(#(#call_idents),*)) };

    let expanded = quote! {
        #input

        #fn_vis fn #ctor_name() -> ::fnwire::Procedure {
            #defaults_init
            let signature = ::fnwire::Signature::from_parts(
                vec![#(#param_names.to_string()),*],
                defaults,
            );
            ::fnwire::Procedure::new(
                #name_str,
                signature,
                move |#args_pat: Vec<::serde_json::Value>| -> ::fnwire::HandlerResult {
                    #args_iter
                    #(#arg_bindings)*
                    #invoke
                },
            )
            .with_module(module_path!())
            .with_source(concat!(file!(), ":", line!()))
        }
    };
    TokenStream::from(expanded)
}
