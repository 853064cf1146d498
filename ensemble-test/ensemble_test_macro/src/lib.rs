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

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Turns an `async fn` into a `#[test]` running on a fresh multi-threaded
/// Tokio runtime.
///
/// Panics raised anywhere in the process while the test runs (including in
/// actor tasks, which would otherwise be swallowed by Tokio) are recorded and
/// re-raised once the body finishes, so a crashed actor fails the test.
#[proc_macro_attribute]
pub fn ensemble_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;
    let attrs = &input.attrs;
    let name = &sig.ident;
    let inputs = &sig.inputs;
    let output = &sig.output;

    let async_name = syn::Ident::new(&format!("__{name}_async"), name.span());

    let expanded = quote! {
        #[test]
        #(#attrs)*
        #vis fn #name() {
            use std::panic;
            use std::sync::atomic::{AtomicBool, Ordering};
            use std::sync::Arc;
            use ::ensemble_test::__private::{parking_lot, tokio, tracing};

            #[derive(Clone, Default)]
            struct PanicRecord {
                occurred: Arc<AtomicBool>,
                message: Arc<parking_lot::Mutex<Option<String>>>,
                location: Arc<parking_lot::Mutex<Option<String>>>,
            }

            let record = PanicRecord::default();
            let hook_record = record.clone();

            let previous_hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                hook_record.occurred.store(true, Ordering::SeqCst);
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned());
                *hook_record.message.lock() = message.clone();
                *hook_record.location.lock() = info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
                tracing::error!(
                    "Panic: {}",
                    message
                        .unwrap_or_else(|| "No error message".to_string())
                        .trim()
                        .replace('\n', " ")
                );
                previous_hook(info);
            }));

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("failed to build test runtime");

            let result = runtime.block_on(async {
                let test_span = tracing::info_span!("ensemble_test", name = stringify!(#name));
                let _enter = test_span.enter();
                #async_name().await
            });

            if record.occurred.load(Ordering::SeqCst) {
                let location = record
                    .location
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "unknown location".to_string());
                let message = record
                    .message
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "No error message".to_string());
                panic!("Panic at {}: {}", location, message.trim().replace('\n', " "));
            }

            result.unwrap()
        }

        async fn #async_name(#inputs) #output #body
    };

    expanded.into()
}
