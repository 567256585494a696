//! Derive macros for casefold
//!
//! This crate provides procedural macros to reduce boilerplate when defining
//! domain action types for casefold reducers.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `casefold_core::action::Action` for enums and structs
//!
//! # Example
//!
//! ```ignore
//! use casefold_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[action_type("todo/add")]
//!     Add { title: String },
//!
//!     Toggle(usize),
//! }
//!
//! // Generated:
//! assert_eq!(TodoAction::Toggle(0).action_type(), "Toggle");
//! assert_eq!(TodoAction::ACTION_TYPES, &["todo/add", "Toggle"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive macro for action types
///
/// On an enum, each variant's tag is its name, or the string given with
/// `#[action_type("...")]` on the variant. The macro implements
/// `casefold_core::action::Action` and adds an `ACTION_TYPES` constant that
/// lists every tag in declaration order.
///
/// On a struct, `#[action_type("...")]` on the type itself is required and
/// becomes the fixed tag.
///
/// # Attributes
///
/// - `#[action_type("...")]` - Override the tag of a variant, or set the tag of a struct
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a union
/// - Applied to a struct without `#[action_type("...")]`
/// - An `action_type` attribute is not a single string literal
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action_type("session/expired")]
/// struct SessionExpired {
///     user_id: u64,
/// }
///
/// assert_eq!(SessionExpired { user_id: 1 }.action_type(), "session/expired");
/// ```
#[proc_macro_derive(Action, attributes(action_type))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Enum(data_enum) => derive_for_enum(&input, data_enum),
        Data::Struct(_) => derive_for_struct(&input),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input,
            "#[derive(Action)] can only be used on enums and structs",
        )),
    };

    expanded
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn derive_for_enum(
    input: &DeriveInput,
    data_enum: &syn::DataEnum,
) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut tags = Vec::with_capacity(data_enum.variants.len());
    let mut arms = Vec::with_capacity(data_enum.variants.len());

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let tag = match action_type_attr(&variant.attrs)? {
            Some(tag) => tag,
            None => LitStr::new(&variant_name.to_string(), variant_name.span()),
        };

        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
            Fields::Unit => quote! { Self::#variant_name },
        };

        arms.push(quote! { #pattern => #tag, });
        tags.push(tag);
    }

    // Empty enums have no values to match on
    let body = if arms.is_empty() {
        quote! { match *self {} }
    } else {
        quote! {
            match self {
                #(#arms)*
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Every action tag of this type, in declaration order
            pub const ACTION_TYPES: &'static [&'static str] = &[#(#tags),*];
        }

        impl #impl_generics ::casefold_core::action::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> &str {
                #body
            }
        }
    })
}

fn derive_for_struct(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Some(tag) = action_type_attr(&input.attrs)? else {
        return Err(syn::Error::new_spanned(
            name,
            "structs deriving Action need #[action_type(\"...\")]",
        ));
    };

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// The action tag of this type
            pub const ACTION_TYPE: &'static str = #tag;
        }

        impl #impl_generics ::casefold_core::action::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> &str {
                #tag
            }
        }
    })
}

/// Read `#[action_type("...")]`, if present
fn action_type_attr(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    attrs
        .iter()
        .find(|attr| attr.path().is_ident("action_type"))
        .map(Attribute::parse_args::<LitStr>)
        .transpose()
}
