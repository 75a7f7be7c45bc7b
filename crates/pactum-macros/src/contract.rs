//! `#[derive(Contract)]` expansion.
//!
//! Structs with named fields expand to a `Reflect` impl whose descriptor
//! lists every exported field with its binding source, wire name, docs and
//! constraints. Fieldless enums expand to a string enumeration.

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{parse_quote, Data, DataEnum, DeriveInput, Fields, FieldsNamed, Generics};

use crate::parse::{is_exported, variant_rename, ContainerAttrs, FieldAttrs, Source};

pub fn expand_contract(input: DeriveInput) -> syn::Result<TokenStream> {
    let container = ContainerAttrs::parse(&input.attrs)?;

    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => expand_struct(&input, &container, fields),
            _ => Err(syn::Error::new(
                input.ident.span(),
                "Contract can only be derived for structs with named fields",
            )),
        },
        Data::Enum(data) => expand_enum(&input, &container, data),
        Data::Union(_) => Err(syn::Error::new(
            input.ident.span(),
            "Contract cannot be derived for unions",
        )),
    }
}

fn expand_struct(
    input: &DeriveInput,
    container: &ContainerAttrs,
    fields: &FieldsNamed,
) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let generics = with_reflect_bounds(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut descriptors = Vec::new();
    let mut attach_arms = Vec::new();

    for field in &fields.named {
        let attrs = FieldAttrs::parse(field)?;
        let Some(field_ident) = &field.ident else {
            continue;
        };
        if !is_exported(field) || attrs.serde_skip {
            if attrs.source.is_some() || attrs.raw {
                return Err(syn::Error::new(
                    field.span(),
                    "bound fields must be `pub` and serialized",
                ));
            }
            continue;
        }

        let ident_str = field_ident.unraw().to_string();
        let name = attrs.serde_rename.clone().unwrap_or_else(|| {
            container
                .rename_all
                .map_or_else(|| ident_str.clone(), |rule| rule.apply_to_field(&ident_str))
        });
        let ty = &field.ty;

        let mut descriptor = quote! {
            ::pactum_core::FieldDescriptor::new(#ident_str, #name, ::pactum_core::TypeRef::of::<#ty>())
        };

        if let Some((source, wire)) = &attrs.source {
            let variant = Ident::new(source.variant(), Span::call_site());
            descriptor.extend(quote! { .bind(::pactum_core::BindingSource::#variant, #wire) });
        } else if attrs.raw {
            descriptor.extend(quote! { .bind(::pactum_core::BindingSource::Raw, #name) });
        } else if ident_str == "body" {
            descriptor.extend(quote! { .bind(::pactum_core::BindingSource::None, #name) });
        }

        if attrs.required {
            descriptor.extend(quote! { .required() });
        }
        if let Some(doc) = &attrs.doc {
            descriptor.extend(quote! { .doc(#doc) });
        }
        if let Some(constraints) = constraint_tokens(&attrs) {
            descriptor.extend(quote! { .constraints(#constraints) });
        }
        descriptors.push(descriptor);

        // Unannotated fields may be raw-request markers, which is only known
        // from the resolved type.
        if matches!(attrs.source, None | Some((Source::Form, _))) {
            attach_arms.push(quote! {
                #ident_str => ::pactum_core::Reflect::attach(&mut self.#field_ident, attachment),
            });
        }
    }

    let name = if container.inline {
        quote! { ::core::option::Option::None }
    } else {
        let name = container.name.clone().unwrap_or_else(|| ident.to_string());
        quote! { ::core::option::Option::Some(#name) }
    };

    let mut info = quote! {
        ::pactum_core::TypeInfo::structure::<Self>(#name, ::std::vec![#(#descriptors),*])
    };
    info.extend(type_info_modifiers(container));

    let attach_field = if attach_arms.is_empty() {
        TokenStream::new()
    } else {
        quote! {
            fn attach_field(&mut self, field: &str, attachment: &::pactum_core::Attachment) -> bool {
                match field {
                    #(#attach_arms)*
                    _ => false,
                }
            }
        }
    };

    let self_validate = if container.self_validate {
        quote! {
            fn self_validate(&self) -> ::core::result::Result<(), ::pactum_core::AggregateValidationError> {
                <Self as ::pactum_core::SelfValidator>::validate(self)
            }
        }
    } else {
        TokenStream::new()
    };

    Ok(quote! {
        impl #impl_generics ::pactum_core::Reflect for #ident #ty_generics #where_clause {
            fn type_info() -> ::pactum_core::TypeInfo {
                #info
            }

            #attach_field

            #self_validate
        }
    })
}

fn expand_enum(
    input: &DeriveInput,
    container: &ContainerAttrs,
    data: &DataEnum,
) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Contract cannot be derived for generic enums",
        ));
    }

    let mut values = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "Contract can only be derived for enums without variant fields",
            ));
        }
        let variant_name = variant.ident.unraw().to_string();
        let value = match variant_rename(variant)? {
            Some(rename) => rename,
            None => container
                .rename_all
                .map_or(variant_name.clone(), |rule| rule.apply_to_variant(&variant_name)),
        };
        values.push(value);
    }

    let mut info = quote! {
        ::pactum_core::TypeInfo::new::<Self>(
            ::pactum_core::TypeKind::Enumeration(::std::vec![#(#values),*])
        )
    };
    info.extend(type_info_modifiers(container));

    Ok(quote! {
        impl ::pactum_core::Reflect for #ident {
            fn type_info() -> ::pactum_core::TypeInfo {
                #info
            }
        }
    })
}

fn type_info_modifiers(container: &ContainerAttrs) -> TokenStream {
    let mut tokens = TokenStream::new();
    if let Some(doc) = &container.doc {
        tokens.extend(quote! { .with_doc(#doc) });
    }
    if container.schema_provider {
        tokens.extend(quote! {
            .with_schema_provider(<Self as ::pactum_core::SchemaProvider>::json_schema)
        });
    }
    if container.schema_transformer {
        tokens.extend(quote! {
            .with_schema_transformer(<Self as ::pactum_core::SchemaTransformer>::transform_schema)
        });
    }
    tokens
}

fn constraint_tokens(attrs: &FieldAttrs) -> Option<TokenStream> {
    let mut calls = Vec::new();
    if let Some(n) = attrs.min_length {
        calls.push(quote! { .min_length(#n) });
    }
    if let Some(n) = attrs.max_length {
        calls.push(quote! { .max_length(#n) });
    }
    if let Some(pattern) = &attrs.pattern {
        calls.push(quote! { .pattern(#pattern) });
    }
    if let Some(min) = attrs.minimum {
        calls.push(quote! { .minimum(#min) });
    }
    if let Some(max) = attrs.maximum {
        calls.push(quote! { .maximum(#max) });
    }
    if !attrs.enum_values.is_empty() {
        let values = &attrs.enum_values;
        calls.push(quote! { .enum_values(&[#(#values),*]) });
    }
    if let Some(n) = attrs.min_items {
        calls.push(quote! { .min_items(#n) });
    }
    if let Some(n) = attrs.max_items {
        calls.push(quote! { .max_items(#n) });
    }
    if let Some(default) = &attrs.default {
        calls.push(quote! { .default_value(#default) });
    }
    if let Some(example) = &attrs.example {
        calls.push(quote! { .example(#example) });
    }

    (!calls.is_empty()).then(|| quote! { ::pactum_core::ConstraintSet::new() #(#calls)* })
}

fn with_reflect_bounds(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::pactum_core::Reflect));
    }
    generics
}
