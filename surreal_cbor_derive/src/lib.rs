//! The `#[derive(CborDecode)]` macro.
//!
//! Generates, per struct:
//!   - `impl CborFields`, exposing the struct's own (non-flattened) field declarations so it can
//!     in turn be used as a `#[cbor(flatten)]` field on some other record.
//!   - `bind_entries`, which resolves a materialized list of `(key, raw value bytes)` pairs
//!     against the struct's own fields and, for each `#[cbor(flatten)]` field, against the
//!     embedded type's own fields, recursing into that type's `bind_entries`.
//!   - `impl CborDecode`, which reads the CBOR map into such a list via `decode_map_entries` and
//!     delegates to `bind_entries`.
//!
//! Field attributes: `#[cbor(rename = "...")]` (or, failing that, `#[serde(rename = "...")]`) sets
//! the tag name used for exact/case-folded resolution; `#[cbor(flatten)]` marks an embedded
//! record, walked one level deep; `#[cbor(with_hook)]` decodes the field's raw wire bytes through
//! its `DecodeHook` impl instead of the ordinary `CborDecode::decode` dispatch.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, Lifetime, Lit, Meta, NestedMeta, Type,
};

#[proc_macro_derive(CborDecode, attributes(cbor, serde))]
pub fn derive_cbor_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input).unwrap_or_else(|e| e.to_compile_error()).into()
}

struct FieldAttrs {
    cbor_rename: Option<String>,
    serde_rename: Option<String>,
    flatten: bool,
    with_hook: bool,
}

fn parse_field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs { cbor_rename: None, serde_rename: None, flatten: false, with_hook: false };
    for attr in attrs {
        if attr.path.is_ident("cbor") {
            if let Meta::List(list) = attr.parse_meta()? {
                for nested in list.nested {
                    match nested {
                        NestedMeta::Meta(Meta::NameValue(nv)) if nv.path.is_ident("rename") => {
                            if let Lit::Str(s) = nv.lit {
                                out.cbor_rename = Some(s.value());
                            }
                        }
                        NestedMeta::Meta(Meta::Path(p)) if p.is_ident("flatten") => out.flatten = true,
                        NestedMeta::Meta(Meta::Path(p)) if p.is_ident("with_hook") => out.with_hook = true,
                        other => {
                            return Err(syn::Error::new_spanned(other, "unrecognized #[cbor(...)] attribute"))
                        }
                    }
                }
            }
        } else if attr.path.is_ident("serde") {
            if let Meta::List(list) = attr.parse_meta()? {
                for nested in list.nested {
                    if let NestedMeta::Meta(Meta::NameValue(nv)) = nested {
                        if nv.path.is_ident("rename") {
                            if let Lit::Str(s) = nv.lit {
                                out.serde_rename = Some(s.value());
                            }
                        }
                    }
                }
            }
        }
    }
    if out.flatten && (out.cbor_rename.is_some() || out.serde_rename.is_some() || out.with_hook) {
        return Err(syn::Error::new(
            Span::call_site(),
            "#[cbor(flatten)] cannot be combined with rename or with_hook on the same field",
        ));
    }
    Ok(out)
}

fn is_option_type(ty: &Type) -> bool {
    match ty {
        Type::Path(tp) => tp.path.segments.last().map(|s| s.ident == "Option").unwrap_or(false),
        _ => false,
    }
}

struct FieldInfo<'a> {
    ident: &'a syn::Ident,
    ty: &'a Type,
    tag_name: Option<String>,
    flatten: bool,
    with_hook: bool,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "CborDecode can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "CborDecode can only be derived for structs with named fields",
            ))
        }
    };

    let generics = &input.generics;
    if generics.type_params().next().is_some() || generics.const_params().next().is_some() {
        return Err(syn::Error::new_spanned(
            generics,
            "CborDecode derive does not support generic type or const parameters",
        ));
    }
    let lifetimes: Vec<_> = generics.lifetimes().collect();
    if lifetimes.len() > 1 {
        return Err(syn::Error::new_spanned(generics, "CborDecode derive supports at most one lifetime parameter"));
    }
    let has_own_lifetime = !lifetimes.is_empty();
    let buf_lifetime =
        if let Some(lt) = lifetimes.first() { lt.lifetime.clone() } else { Lifetime::new("'buf", Span::call_site()) };

    let mut infos = Vec::new();
    for f in fields.iter() {
        let ident = f.ident.as_ref().expect("named field");
        let attrs = parse_field_attrs(&f.attrs)?;
        let tag_name = attrs.cbor_rename.or(attrs.serde_rename);
        infos.push(FieldInfo { ident, ty: &f.ty, tag_name, flatten: attrs.flatten, with_hook: attrs.with_hook });
    }

    let mut own_decls = Vec::new();
    let mut field_locals = Vec::new();
    let mut own_binds = Vec::new();
    let mut construct = Vec::new();

    let mut flatten_index_locals = Vec::new();
    let mut flatten_accumulators = Vec::new();
    let mut flatten_try_chain = TokenStream2::new();
    let mut flatten_finalize = Vec::new();

    let mut slot = 0usize;
    let mut flatten_idx = 0usize;
    for info in &infos {
        let ident = info.ident;
        let ty = info.ty;

        if info.flatten {
            let idx_local = format_ident!("__flat_index_{}", flatten_idx);
            let entries_local = format_ident!("__flat_entries_{}", flatten_idx);
            let value_local = format_ident!("__flat_value_{}", flatten_idx);

            flatten_index_locals.push(quote! {
                let #idx_local = surreal_cbor::field_index_for::<#ty>(<#ty as surreal_cbor::CborFields>::FIELDS);
            });
            flatten_accumulators.push(quote! {
                let mut #entries_local: Vec<(&#buf_lifetime str, &#buf_lifetime [u8])> = Vec::new();
            });

            let cond = quote! { #idx_local.resolve(key).is_some() };
            let body = quote! { #entries_local.push((key, raw)); };
            flatten_try_chain = if flatten_idx == 0 {
                quote! { if #cond { #body } }
            } else {
                quote! { #flatten_try_chain else if #cond { #body } }
            };

            flatten_finalize.push(quote! {
                let #value_local = <#ty>::bind_entries(&#entries_local, opts)?;
            });
            construct.push(quote! { #ident: #value_local, });

            flatten_idx += 1;
            continue;
        }

        let local = format_ident!("__field_{}", ident);
        field_locals.push(quote! { let mut #local: ::std::option::Option<#ty> = ::std::option::Option::None; });

        let tag_tokens = match &info.tag_name {
            Some(s) => quote! { ::std::option::Option::Some(#s) },
            None => quote! { ::std::option::Option::None },
        };
        let field_name_str = ident.to_string();
        own_decls.push(quote! {
            surreal_cbor::FieldDeclaration { path: &[#slot], tag_name: #tag_tokens, field_name: #field_name_str }
        });

        let decode_expr = if info.with_hook {
            quote! { surreal_cbor::decode_via_hook(&mut surreal_cbor::Cursor::new(raw))? }
        } else {
            quote! { <#ty as surreal_cbor::CborDecode>::decode(&mut surreal_cbor::Cursor::new(raw), opts)? }
        };
        own_binds.push(quote! {
            [#slot] => { #local = ::std::option::Option::Some(#decode_expr); }
        });

        if is_option_type(ty) {
            construct.push(quote! { #ident: #local.unwrap_or(::std::option::Option::None), });
        } else {
            construct.push(quote! { #ident: #local.ok_or(surreal_cbor::Error::MissingField(#field_name_str))?, });
        }

        slot += 1;
    }

    let self_ty = if has_own_lifetime { quote! { #name<#buf_lifetime> } } else { quote! { #name } };
    let inherent_generics = if has_own_lifetime { quote! { <#buf_lifetime> } } else { quote! {} };
    let fn_lifetime_generics = if has_own_lifetime { quote! {} } else { quote! { <#buf_lifetime> } };
    let fields_impl_generics = if has_own_lifetime { quote! { <#buf_lifetime> } } else { quote! {} };

    let expanded = quote! {
        impl #fields_impl_generics surreal_cbor::CborFields for #self_ty {
            const FIELDS: &'static [surreal_cbor::FieldDeclaration] = &[ #(#own_decls),* ];
        }

        impl #inherent_generics #self_ty {
            /// Resolves already-materialized `(key, raw value bytes)` pairs against this record's
            /// own fields, recursing into any `#[cbor(flatten)]` field's own `bind_entries`.
            pub fn bind_entries #fn_lifetime_generics(
                entries: &[(&#buf_lifetime str, &#buf_lifetime [u8])],
                opts: &surreal_cbor::DecodeOptions,
            ) -> surreal_cbor::Result<Self> {
                let __index = surreal_cbor::field_index_for::<Self>(<Self as surreal_cbor::CborFields>::FIELDS);
                #(#flatten_index_locals)*
                #(#field_locals)*
                #(#flatten_accumulators)*
                for &(key, raw) in entries {
                    if let ::std::option::Option::Some(d) = __index.resolve(key) {
                        match d.path.as_slice() {
                            #(#own_binds)*
                            _ => {}
                        }
                        continue;
                    }
                    #flatten_try_chain
                }
                #(#flatten_finalize)*
                ::std::result::Result::Ok(Self { #(#construct)* })
            }
        }

        impl<#buf_lifetime> surreal_cbor::CborDecode<#buf_lifetime> for #self_ty {
            fn decode(
                cursor: &mut surreal_cbor::Cursor<#buf_lifetime>,
                opts: &surreal_cbor::DecodeOptions,
            ) -> surreal_cbor::Result<Self> {
                let entries = surreal_cbor::decode_map_entries(cursor, opts)?;
                Self::bind_entries(&entries, opts)
            }
        }
    };

    Ok(expanded)
}
