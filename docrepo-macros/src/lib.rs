//! Procedural macros for the docrepo project.
//!
//! Provides `#[derive(Entity)]`, which implements `docrepo::entity::Entity` for a struct.
//!
//! ```ignore
//! #[derive(Debug, Clone, Serialize, Deserialize, Entity)]
//! #[entity(collection = "people", model = "Person")]
//! pub struct PersonRecord {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<DocumentKey>,
//!     pub name: String,
//! }
//! ```
//!
//! Without attributes the collection name is the lowercased type name with an `s`
//! appended and the model name is the type name.

#[allow(unused_extern_crates)]
extern crate self as docrepo_macros;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, LitStr};

#[derive(Default)]
struct EntityArgs {
    collection: Option<LitStr>,
    model: Option<LitStr>,
}

impl EntityArgs {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut args = EntityArgs::default();

        for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("entity")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    args.collection = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("model") {
                    args.model = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `collection` or `model`"))
                }
            })?;
        }

        Ok(args)
    }
}

#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_entity(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_entity(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let args = EntityArgs::parse(input)?;
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let collection = args.collection.unwrap_or_else(|| {
        LitStr::new(&format!("{}s", ident.to_string().to_lowercase()), Span::call_site())
    });
    let model = args.model.unwrap_or_else(|| LitStr::new(&ident.to_string(), Span::call_site()));

    Ok(quote! {
        impl #impl_generics ::docrepo::entity::Entity for #ident #ty_generics #where_clause {
            fn collection_name() -> &'static str {
                #collection
            }

            fn model_name() -> &'static str {
                #model
            }
        }
    })
}
