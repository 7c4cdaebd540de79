use proc_macro2::TokenStream;
use quote::quote;
use syn::{ext::IdentExt, Data, DeriveInput, Error, Fields, Result, Visibility};

use crate::attr::{ContainerAttr, FieldAttr};

pub fn derive(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = &input;

    if !generics.params.is_empty() {
        return Err(Error::new_spanned(
            generics,
            "`Describe` can not be derived for generic types",
        ));
    }

    let fields = match data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    ident,
                    "`Describe` can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                ident,
                "`Describe` can only be derived for structs",
            ))
        }
    };

    let container = ContainerAttr::from_attrs(attrs)?;
    let name = container
        .rename
        .clone()
        .unwrap_or_else(|| ident.unraw().to_string());

    let fields = fields
        .iter()
        .map(|field| -> Result<TokenStream> {
            let attr = FieldAttr::from_attrs(&field.attrs)?;
            let Some(field_ident) = &field.ident else {
                return Err(Error::new_spanned(field, "expected a named field"));
            };
            let field_name = match (attr.rename, container.rename_all) {
                (Some(rename), _) => rename,
                (None, Some(inflection)) => inflection.apply(&field_ident.unraw().to_string()),
                (None, None) => field_ident.unraw().to_string(),
            };
            let public = matches!(field.vis, Visibility::Public(_));

            // Fields which never reach the client don't need to be describable.
            if attr.skip || !public {
                let skip = attr.skip;
                return Ok(quote! {
                    ::bindserve::Field {
                        name: ::std::borrow::Cow::Borrowed(#field_name),
                        ty: ::bindserve::DataType::Any,
                        public: #public,
                        skip: #skip,
                    }
                });
            }

            let ty = &field.ty;
            Ok(quote!(::bindserve::Field::new::<#ty>(#field_name)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        #[automatically_derived]
        impl ::bindserve::Describe for #ident {
            fn describe() -> ::bindserve::DataType {
                ::bindserve::DataType::Record(::bindserve::RecordType::new::<Self>(#name, || {
                    ::std::vec![#(#fields),*]
                }))
            }
        }
    })
}
