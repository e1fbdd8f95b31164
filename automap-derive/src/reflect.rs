//! Implementation of the `#[derive(Reflect)]` macro.
//!
//! The generated `shape()` drives `automap::shape::ShapeBuilder`, so derived
//! and hand-written shapes are indistinguishable to the resolver.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Expr, Field, Fields, GenericArgument, Ident, LitStr,
    PathArguments, Type, parse_macro_input,
};

/// Container-level `#[shape(...)]` options.
#[derive(Debug, Default)]
struct ContainerOptions {
    value: bool,
    default: bool,
    construct: bool,
}

impl ContainerOptions {
    fn parse(attributes: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();
        for attribute in attributes.iter().filter(|attribute| attribute.path().is_ident("shape")) {
            attribute.parse_nested_meta(|meta| {
                if meta.path.is_ident("value") {
                    options.value = true;
                } else if meta.path.is_ident("default") {
                    options.default = true;
                } else if meta.path.is_ident("construct") {
                    options.construct = true;
                } else {
                    return Err(meta.error(
                        "unsupported container attribute; expected `value`, `default` or `construct`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(options)
    }
}

/// Field-level `#[shape(...)]` options.
#[derive(Debug, Default)]
struct FieldOptions {
    field: bool,
    rename: Option<String>,
    markers: Vec<String>,
    skip: bool,
    nested: bool,
    read_only: bool,
    default: Option<Expr>,
    no_default: bool,
}

impl FieldOptions {
    fn parse(attributes: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();
        for attribute in attributes.iter().filter(|attribute| attribute.path().is_ident("shape")) {
            attribute.parse_nested_meta(|meta| {
                if meta.path.is_ident("field") {
                    options.field = true;
                } else if meta.path.is_ident("rename") {
                    let name: LitStr = meta.value()?.parse()?;
                    options.rename = Some(name.value());
                } else if meta.path.is_ident("marker") {
                    let marker: LitStr = meta.value()?.parse()?;
                    options.markers.push(marker.value());
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                } else if meta.path.is_ident("nested") {
                    options.nested = true;
                } else if meta.path.is_ident("read_only") {
                    options.read_only = true;
                } else if meta.path.is_ident("default") {
                    let expression: LitStr = meta.value()?.parse()?;
                    options.default = Some(expression.parse()?);
                } else if meta.path.is_ident("no_default") {
                    options.no_default = true;
                } else {
                    return Err(meta.error("unsupported field attribute"));
                }
                Ok(())
            })?;
        }
        if options.default.is_some() && options.no_default {
            return Err(syn::Error::new(
                Span::call_site(),
                "`default` and `no_default` are mutually exclusive",
            ));
        }
        Ok(options)
    }
}

/// Main implementation of the Reflect derive macro.
pub fn derive_reflect_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    TokenStream::from(expand(&input).unwrap_or_else(syn::Error::into_compile_error))
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let container = ContainerOptions::parse(&input.attrs)?;
    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(named_fields) => named_fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect can only be derived for structs with named fields or unit structs, not tuple structs.",
                ));
            }
        },
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Reflect can only be derived for structs, not enums.",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Reflect cannot be derived for unions.",
            ));
        }
    };

    let mut members = Vec::new();
    let mut nested = Vec::new();
    let mut parameters = Vec::new();
    let mut initializers = Vec::new();

    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;
        let options = FieldOptions::parse(&field.attrs)?;
        if options.skip {
            initializers.push(quote! { #ident: ::core::default::Default::default() });
            continue;
        }
        let member_name = options
            .rename
            .clone()
            .unwrap_or_else(|| ident.to_string());
        let inner = option_inner(&field.ty);
        let value_type = inner.unwrap_or(&field.ty);

        members.push(member_tokens(ident, &member_name, &options, inner.is_some(), field.span())?);
        if options.nested {
            nested.push(quote! { registry.register::<#value_type>(); });
        }
        if container.construct {
            let position = parameters.len();
            parameters.push(parameter_tokens(
                &member_name,
                value_type,
                inner.is_some(),
                &options,
                field.span(),
            )?);
            let take = if inner.is_some() {
                format_ident!("take_optional")
            } else {
                format_ident!("take")
            };
            initializers.push(quote! { #ident: arguments.#take(#position)? });
        }
    }

    let mut construction = Vec::new();
    if container.value {
        construction.push(quote! { .value_type() });
    }
    if container.default {
        construction.push(quote! {
            .default_constructor(<Self as ::core::default::Default>::default)
        });
    }
    if container.construct {
        let arguments = if parameters.is_empty() {
            quote! { _ }
        } else {
            quote! { arguments }
        };
        construction.push(quote! {
            .constructor(
                ::std::vec![#(#parameters),*],
                |#arguments: &mut ::automap::shape::ConstructorArgs| {
                    ::core::result::Result::Ok(Self { #(#initializers),* })
                },
            )
        });
    }

    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();
    let register_nested = if nested.is_empty() {
        TokenStream2::new()
    } else {
        quote! {
            fn register_nested(registry: &::automap::shape::ShapeRegistry) {
                #(#nested)*
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::automap::shape::Reflect for #name #type_generics #where_clause {
            fn shape() -> ::automap::shape::Shape {
                ::automap::shape::Shape::builder::<Self>()
                    #(#members)*
                    #(#construction)*
                    .build()
            }

            #register_nested
        }
    })
}

fn member_tokens(
    ident: &Ident,
    name: &str,
    options: &FieldOptions,
    optional: bool,
    span: Span,
) -> syn::Result<TokenStream2> {
    let method = match (options.field, optional, options.read_only) {
        (false, false, false) => "property",
        (false, true, false) => "optional_property",
        (false, false, true) => "read_only_property",
        (true, false, false) => "field",
        (true, true, false) => "optional_field",
        (true, false, true) => "read_only_field",
        (_, true, true) => {
            return Err(syn::Error::new(
                span,
                "`read_only` cannot be combined with an `Option` field",
            ));
        }
    };
    let method = format_ident!("{method}");
    let markers = options.markers.iter().map(|marker| quote! { .marked(#marker) });
    let getter = quote! { |instance: &Self| ::core::clone::Clone::clone(&instance.#ident) };
    let accessors = if options.read_only {
        getter
    } else {
        quote! { #getter, |instance: &mut Self, value| instance.#ident = value }
    };
    Ok(quote! { .#method(#name, #accessors) #(#markers)* })
}

fn parameter_tokens(
    name: &str,
    value_type: &Type,
    optional: bool,
    options: &FieldOptions,
    span: Span,
) -> syn::Result<TokenStream2> {
    let descriptor = quote! { ::automap::shape::ParameterDescriptor };
    if optional {
        if options.default.is_some() {
            return Err(syn::Error::new(
                span,
                "`default` is not supported on `Option` fields",
            ));
        }
        return Ok(quote! { #descriptor::optional::<#value_type>(#name) });
    }
    Ok(match (&options.default, options.no_default) {
        (Some(default), _) => {
            quote! { #descriptor::defaulted(#name, || -> #value_type { #default }) }
        }
        (None, true) => quote! { #descriptor::new::<#value_type>(#name) },
        (None, false) => quote! { #descriptor::zeroed::<#value_type>(#name) },
    })
}

/// The `T` of an `Option<T>` field type.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    if arguments.args.len() != 1 {
        return None;
    }
    match arguments.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use syn::parse_quote;

    #[rstest]
    #[case(parse_quote!(Option<String>), Some("String"))]
    #[case(parse_quote!(::std::option::Option<u32>), Some("u32"))]
    #[case(parse_quote!(String), None)]
    #[case(parse_quote!(Vec<Option<u8>>), None)]
    fn detects_option_fields(#[case] ty: Type, #[case] expected: Option<&str>) {
        let inner = option_inner(&ty).map(|inner| quote!(#inner).to_string());

        assert_eq!(inner.as_deref(), expected);
    }

    #[rstest]
    fn parses_field_options() {
        let field: Field = parse_quote! {
            #[shape(field, rename = "Name", marker = "a", marker = "b", default = "String::from(\"x\")")]
            name: String
        };

        let options = FieldOptions::parse(&field.attrs).unwrap();

        assert!(options.field);
        assert_eq!(options.rename.as_deref(), Some("Name"));
        assert_eq!(options.markers, vec!["a".to_string(), "b".to_string()]);
        assert!(options.default.is_some());
    }

    #[rstest]
    fn rejects_conflicting_defaults() {
        let field: Field = parse_quote! {
            #[shape(default = "1", no_default)]
            count: u32
        };

        assert!(FieldOptions::parse(&field.attrs).is_err());
    }

    #[rstest]
    fn rejects_unknown_container_option() {
        let input: DeriveInput = parse_quote! {
            #[shape(frozen)]
            struct Sample { id: u32 }
        };

        assert!(expand(&input).is_err());
    }

    #[rstest]
    fn rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Pair(u32, u32);
        };

        assert!(expand(&input).is_err());
    }

    #[rstest]
    fn constructor_takes_fields_in_declaration_order() {
        let input: DeriveInput = parse_quote! {
            #[shape(construct)]
            struct Sample {
                first: u32,
                #[shape(skip)]
                cache: u32,
                second: Option<String>,
            }
        };

        let expanded: String = expand(&input)
            .unwrap()
            .to_string()
            .chars()
            .filter(|character| !character.is_whitespace())
            .collect();

        assert!(expanded.contains("first:arguments.take(0usize)?"));
        assert!(expanded.contains("second:arguments.take_optional(1usize)?"));
        assert!(expanded.contains("cache:::core::default::Default::default()"));
    }
}
