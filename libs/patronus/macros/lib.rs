extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr, Path};

/// Generates a patch struct next to the annotated struct: every field becomes
/// an `Option` and gets `set_*`, `set_opt_*` and `unset_*` setters.
///
/// Fields marked `#[patronus(skip)]` have no counterpart in the patch. When
/// the patch derives a serde trait, the struct-level `#[serde(...)]`
/// attributes are copied onto it and unset fields are not serialized.
///
/// Usage:
/// `
/// #[patronus(name = "TaskPatch", derives = "Default, Clone, Serialize")]
/// #[derive(Serialize)]
/// struct Task { #[patronus(skip)] id: String, title: String }
/// `
#[proc_macro_attribute]
pub fn patronus(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as DeriveInput);

    let mut patch_name: Option<Ident> = None;
    let mut derives: Vec<Path> = Vec::new();

    let attr_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            let lit: LitStr = meta.value()?.parse()?;
            patch_name = Some(Ident::new(&lit.value(), lit.span()));
            Ok(())
        } else if meta.path.is_ident("derives") {
            let lit: LitStr = meta.value()?.parse()?;
            for derive in lit.value().split(',').map(str::trim) {
                if derive.is_empty() {
                    continue;
                }
                let path = syn::parse_str::<Path>(derive).map_err(|_| {
                    syn::Error::new(lit.span(), format!("'{derive}' is not a derive path"))
                })?;
                derives.push(path);
            }
            Ok(())
        } else {
            Err(meta.error("expected `name` or `derives`"))
        }
    });
    parse_macro_input!(attr with attr_parser);

    let Some(patch_name) = patch_name else {
        return compile_error(Span::call_site(), "missing 'name' field");
    };

    if !input.generics.params.is_empty() {
        return compile_error(input.ident.span(), "generic structs are not supported");
    }

    let fields = match &mut input.data {
        Data::Struct(data) => match &mut data.fields {
            Fields::Named(fields) => &mut fields.named,
            _ => {
                return compile_error(
                    input.ident.span(),
                    "the macro can only be applied on struct with named fields",
                )
            }
        },
        _ => {
            return compile_error(
                input.ident.span(),
                "the macro can only be applied on struct with named fields",
            )
        }
    };

    // field level `#[patronus(...)]` markers are consumed here, the
    // annotated struct is emitted without them
    let mut patch_fields = Vec::new();
    for field in fields.iter_mut() {
        let mut skip = false;
        let mut marker_error = None;

        field.attrs.retain(|attr| {
            if !attr.path().is_ident("patronus") {
                return true;
            }
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `skip`"))
                }
            });
            if let Err(e) = parsed {
                marker_error = Some(e);
            }
            false
        });

        if let Some(e) = marker_error {
            return e.to_compile_error().into();
        }

        if let (false, Some(ident)) = (skip, field.ident.clone()) {
            patch_fields.push((ident, field.ty.clone()));
        }
    }

    let with_serde = derives.iter().any(|path| {
        path.segments
            .last()
            .is_some_and(|s| s.ident == "Serialize" || s.ident == "Deserialize")
    });

    let serde_attrs = input
        .attrs
        .iter()
        .filter(|attr| with_serde && attr.path().is_ident("serde"))
        .cloned()
        .collect::<Vec<_>>();

    let field_definitions = patch_fields.iter().map(|(name, ty)| {
        let serde_attr = with_serde.then(|| {
            quote! { #[serde(default, skip_serializing_if = "Option::is_none")] }
        });
        quote! {
            #serde_attr
            pub #name: Option<#ty>,
        }
    });

    let setters = patch_fields.iter().map(|(name, ty)| {
        let set_opt_fn_name = format_ident!("set_opt_{}", name);
        let set_fn_name = format_ident!("set_{}", name);
        let unset_fn_name = format_ident!("unset_{}", name);
        quote! {
            #[allow(non_snake_case)]
            pub fn #set_opt_fn_name(mut self, value: impl Into<Option<#ty>>) -> Self {
                self.#name = value.into();
                self
            }

            #[allow(non_snake_case)]
            pub fn #set_fn_name(mut self, value: impl Into<#ty>) -> Self {
                self.#name = Some(value.into());
                self
            }

            #[allow(non_snake_case)]
            pub fn #unset_fn_name(mut self) -> Self {
                self.#name = None;
                self
            }
        }
    });

    let field_names = patch_fields.iter().map(|(name, _)| name);
    let vis = &input.vis;

    let expanded = quote! {
        #input

        #[derive(#(#derives),*)]
        #(#serde_attrs)*
        #vis struct #patch_name {
            #(#field_definitions)*
        }

        impl #patch_name {
            #(#setters)*

            /// True when no field is set
            pub fn is_empty(&self) -> bool {
                true #(&& self.#field_names.is_none())*
            }
        }
    };

    TokenStream::from(expanded)
}

fn compile_error(span: Span, message: &str) -> TokenStream {
    syn::Error::new(span, message).to_compile_error().into()
}
