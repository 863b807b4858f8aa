use proc_macro::TokenStream;
use quote::quote;
use quote::quote_spanned;
use syn::spanned::Spanned;

#[proc_macro_attribute]
pub fn deterministic_destination_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    destination_test(
        attrs,
        item,
        quote! { shadow_destinations::DestinationKind::Deterministic },
    )
}

#[proc_macro_attribute]
pub fn fault_destination_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    destination_test(
        attrs,
        item,
        quote! { shadow_destinations::DestinationKind::FaultInjection },
    )
}

fn destination_test(
    attrs: TokenStream,
    item: TokenStream,
    destination_kind: proc_macro2::TokenStream,
) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    if args.len() > 1 {
        return quote! {
            compile_error!("At most one configuration function can be passed to the macro");
        }
        .into();
    }

    let configuration_call = match args.first() {
        None => quote! {},
        Some(syn::NestedMeta::Meta(syn::Meta::Path(function_path))) => quote! {
            #function_path(&mut __destination_configuration);
        },
        Some(other) => {
            return quote_spanned! {other.span()=>
                compile_error!("The argument should be a configuration function!");
            }
            .into();
        }
    };

    if input.sig.inputs.len() != 1 {
        return quote_spanned! {input.sig.span()=>
            compile_error!("The test function should take a single `&TestDestination` argument!");
        }
        .into();
    }

    let attributes = &input.attrs;
    let visibility = &input.vis;
    let name = &input.sig.ident;
    let inputs = &input.sig.inputs;
    let output = &input.sig.output;
    let block = &input.block;

    let expanded = quote! {
        #[test]
        #(#attributes)*
        #visibility fn #name() #output {
            fn __destination_test_body(#inputs) #output #block

            let mut __destination_configuration =
                shadow_destinations::DestinationConfiguration::new(#destination_kind);
            __destination_configuration
                .set_host(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
            __destination_configuration.set_port(0);
            #configuration_call

            let __destination = shadow_destinations::TestDestination::start(__destination_configuration)
                .unwrap_or_else(|e| panic!("Destination Error: {}", e));

            let __result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                __destination_test_body(&__destination)
            }));

            if let Err(e) = __destination.stop() {
                panic!("Destination Error: {}", e);
            }

            match __result {
                Ok(result) => result,
                Err(e) => std::panic::resume_unwind(e),
            }
        }
    };

    TokenStream::from(expanded)
}
