use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{parse_macro_input, FnArg, ItemFn, PatType, Type};

/// Turns a function with typed parameters into a handler taking `&[Value]`.
///
/// The generated function checks the argument count, converts each argument
/// positionally and fails with `EvalError::Arity` or `EvalError::ArgumentType`.
/// `Value` and `EvalError` must be in scope where the attribute is used.
///
/// Supported parameter types: `i64`, `f64`, `Number`, `bool`, `String`,
/// `Value`, `Vec<Value>` and `ObjectMap`.
#[proc_macro_attribute]
pub fn evaluation_fn(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let fn_name = &input.sig.ident;
    let fn_name_str = fn_name.to_string();
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_output = &input.sig.output;
    let attrs = &input.attrs;

    let mut arg_extractions = Vec::new();

    for (i, arg) in fn_args.iter().enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            return syn::Error::new(arg.span(), "methods are not supported")
                .to_compile_error()
                .into();
        };
        let arg_name = match **pat {
            syn::Pat::Ident(ref ident) => &ident.ident,
            _ => {
                return syn::Error::new(pat.span(), "unsupported argument pattern")
                    .to_compile_error()
                    .into()
            }
        };
        let position = i + 1;

        let type_ident = match **ty {
            Type::Path(ref type_path) => type_path.path.segments.last().map(|s| &s.ident),
            _ => None,
        };
        let Some(type_ident) = type_ident else {
            return syn::Error::new(ty.span(), "unsupported argument type")
                .to_compile_error()
                .into();
        };

        let (conversion, expected) = match type_ident.to_string().as_str() {
            "i64" => (quote! { args[#i].as_i64() }, "numeric"),
            "f64" => (quote! { args[#i].as_f64() }, "numeric"),
            "Number" => (quote! { args[#i].to_number() }, "numeric"),
            "bool" => (quote! { Some(args[#i].is_truthy()) }, "bool"),
            "String" => (quote! { args[#i].to_display_string() }, "string"),
            "Value" => (quote! { Some(args[#i].clone()) }, "mixed"),
            "Vec" => (quote! { args[#i].as_array().map(|a| a.to_vec()) }, "array"),
            "ObjectMap" => (quote! { args[#i].as_object().cloned() }, "object"),
            other => {
                return syn::Error::new(ty.span(), format!("unsupported type {}", other))
                    .to_compile_error()
                    .into()
            }
        };

        arg_extractions.push(quote! {
            let #arg_name: #ty = #conversion.ok_or_else(|| EvalError::ArgumentType {
                function: #fn_name_str.to_string(),
                position: #position,
                expected: #expected,
            })?;
        });
    }

    let args_len = arg_extractions.len();
    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name(args: &[Value]) #fn_output {
            if args.len() != #args_len {
                return Err(EvalError::Arity {
                    function: #fn_name_str.to_string(),
                    expected: #args_len,
                    found: args.len(),
                });
            }

            #(#arg_extractions)*

            #fn_body
        }
    };

    TokenStream::from(expanded)
}
