use super::*;

/// Memoize a function.
pub fn expand(mut func: syn::ItemFn) -> Result<proc_macro2::TokenStream> {
    if !func.sig.generics.params.is_empty() {
        bail!(func.sig.generics, "generic functions are not supported");
    }

    let mut args = vec![];
    let mut types = vec![];
    for input in &func.sig.inputs {
        let typed = match input {
            syn::FnArg::Typed(typed) => typed,
            syn::FnArg::Receiver(_) => {
                bail!(input, "methods are not supported")
            }
        };

        let name = match typed.pat.as_ref() {
            syn::Pat::Ident(syn::PatIdent {
                by_ref: None,
                subpat: None,
                ident,
                ..
            }) => ident,
            pat => bail!(pat, "only simple identifiers are supported"),
        };

        // `impl Trait` in argument position is an anonymous type parameter.
        if contains_impl_trait(typed.ty.to_token_stream()) {
            bail!(typed.ty, "generic functions are not supported");
        }

        args.push(name.clone());
        types.push(typed.ty.as_ref().clone());
    }

    let output: syn::Type = match &func.sig.output {
        syn::ReturnType::Default => parse_quote! { () },
        syn::ReturnType::Type(_, ty) => ty.as_ref().clone(),
    };

    // Construct a tuple from all arguments.
    let arg_tuple = quote! { (#(#args,)*) };

    // Construct assertions that the arguments can be turned into a key.
    let bounds = types.iter().map(|ty| {
        quote! {
            ::argmemo::internal::assert_argument::<#ty>();
        }
    });

    // Construct the inner closure. Parameters declared `mut` stay mutable.
    let mut patterns = vec![];
    for input in &mut func.sig.inputs {
        if let syn::FnArg::Typed(typed) = input {
            patterns.push(typed.pat.as_ref().clone());
            if let syn::Pat::Ident(ident) = typed.pat.as_mut() {
                ident.mutability = None;
            }
        }
    }
    let body = &func.block;
    let closure = quote! { |(#(#patterns,)*)| #body };

    // Adjust the function's body.
    func.block = parse_quote! { {
        #(#bounds)*
        ::std::thread_local! {
            static __ARGMEMO_CACHE: ::argmemo::internal::Cache<#output> =
                const { ::argmemo::internal::Cache::new() };
        }
        ::argmemo::internal::cached(
            &__ARGMEMO_CACHE,
            #arg_tuple,
            #closure,
        )
    } };

    Ok(quote! { #func })
}

/// Whether a type mentions `impl`, at the top level or nested.
fn contains_impl_trait(tokens: proc_macro2::TokenStream) -> bool {
    tokens.into_iter().any(|tree| match tree {
        proc_macro2::TokenTree::Ident(ident) => ident == "impl",
        proc_macro2::TokenTree::Group(group) => contains_impl_trait(group.stream()),
        _ => false,
    })
}
