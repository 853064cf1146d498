/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

#![forbid(unsafe_code)]

//! Ensemble Macro Library
//!
//! Attribute macros that remove the boilerplate of declaring message types and
//! actor state types for the Ensemble runtime.
//!
//! ```ignore
//! #[ensemble_message]
//! pub struct Increment {
//!     pub amount: u32,
//! }
//!
//! #[ensemble_actor]
//! pub struct Counter {
//!     count: u32,
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Options accepted by `#[ensemble_actor(...)]`.
#[derive(Default)]
struct ActorOptions {
    /// Skip deriving `Default`; the user supplies it.
    no_default: bool,
}

impl ActorOptions {
    fn parse(attr: &TokenStream) -> Self {
        let mut options = Self::default();
        for part in attr.to_string().split(',') {
            if part.trim() == "no_default" {
                options.no_default = true;
            }
        }
        options
    }
}

/// Derives what a type needs to travel between Ensemble actors.
///
/// Adds `#[derive(Clone, Debug)]` for whichever of the two is missing and a
/// compile-time assertion that the type is `Send + Sync + 'static`, which is
/// what the blanket `ActorMessage` implementation requires.
///
/// ```ignore
/// use ensemble_macro::ensemble_message;
///
/// #[ensemble_message]
/// pub struct Ping;
/// ```
#[proc_macro_attribute]
pub fn ensemble_message(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut traits = Vec::new();
    if !has_derive(&input, "Clone") {
        traits.push(quote!(Clone));
    }
    if !has_derive(&input, "Debug") {
        traits.push(quote!(Debug));
    }
    let derives = if traits.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#traits),*)])
    };

    let assert_ident = quote::format_ident!("_AssertEnsembleMessage_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}

/// Derives what a type needs to serve as the state of an Ensemble actor.
///
/// Adds `#[derive(Default, Debug)]` for whichever is missing and asserts at
/// compile time that the type is `Send + 'static`. Every instance of an actor
/// type starts from `Default::default()`, including each worker of a troupe.
///
/// Pass `no_default` when the type implements `Default` by hand:
///
/// ```ignore
/// #[ensemble_actor(no_default)]
/// struct Printer {
///     prefix: String,
/// }
///
/// impl Default for Printer {
///     fn default() -> Self {
///         Self { prefix: "> ".into() }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn ensemble_actor(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = ActorOptions::parse(&attr);
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut traits = Vec::new();
    if !options.no_default && !has_derive(&input, "Default") {
        traits.push(quote!(Default));
    }
    if !has_derive(&input, "Debug") {
        traits.push(quote!(Debug));
    }
    let derives = if traits.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#traits),*)])
    };

    let assert_ident = quote::format_ident!("_AssertEnsembleActor_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
