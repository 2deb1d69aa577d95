use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Ident, LitInt, Path, Result, Token, Type, braced, bracketed, parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Slots 0..3 of every table belong to IUnknown.
const FIRST_SLOT: usize = 3;

/// A single method in the COM interface
struct Method {
    attrs: Vec<Attribute>,
    slot: usize,
    slot_span: proc_macro2::Span,
    name: Ident,
    args: Vec<(Ident, Type)>,
    ret: Option<Type>,
}

/// One `interface Name { iid: ..., [N] fn ...; }` block
struct Interface {
    attrs: Vec<Attribute>,
    name: Ident,
    iid: Path,
    methods: Vec<Method>,
}

/// The full com_interface input: one or more interface blocks
struct Interfaces(Vec<Interface>);

impl Parse for Method {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;

        // [N]
        let slot_content;
        bracketed!(slot_content in input);
        let slot_lit: LitInt = slot_content.parse()?;
        let slot = slot_lit.base10_parse::<usize>()?;

        // fn Name(args) [-> Ret];
        input.parse::<Token![fn]>()?;
        let name: Ident = input.parse()?;

        let args_content;
        parenthesized!(args_content in input);
        let args_parsed: Punctuated<(Ident, Type), Token![,]> = args_content.parse_terminated(
            |input| {
                let name: Ident = input.parse()?;
                input.parse::<Token![:]>()?;
                let ty: Type = input.parse()?;
                Ok((name, ty))
            },
            Token![,],
        )?;

        let ret = if input.peek(Token![->]) {
            input.parse::<Token![->]>()?;
            Some(input.parse::<Type>()?)
        } else {
            None
        };
        input.parse::<Token![;]>()?;

        Ok(Method {
            attrs,
            slot,
            slot_span: slot_lit.span(),
            name,
            args: args_parsed.into_iter().collect(),
            ret,
        })
    }
}

impl Parse for Interface {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;

        let kw: Ident = input.parse()?;
        if kw != "interface" {
            return Err(syn::Error::new(kw.span(), "expected `interface`"));
        }
        let name: Ident = input.parse()?;

        let content;
        braced!(content in input);

        // iid: IID_NAME,
        let iid_kw: Ident = content.parse()?;
        if iid_kw != "iid" {
            return Err(syn::Error::new(iid_kw.span(), "expected `iid`"));
        }
        content.parse::<Token![:]>()?;
        let iid: Path = content.parse()?;
        content.parse::<Token![,]>()?;

        let mut methods: Vec<Method> = Vec::new();
        while !content.is_empty() {
            let method: Method = content.parse()?;
            let expected = FIRST_SLOT + methods.len();
            if method.slot != expected {
                return Err(syn::Error::new(
                    method.slot_span,
                    format!(
                        "`{}::{}` declared at slot {}, expected slot {}",
                        name, method.name, method.slot, expected
                    ),
                ));
            }
            methods.push(method);
        }

        Ok(Interface {
            attrs,
            name,
            iid,
            methods,
        })
    }
}

impl Parse for Interfaces {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut interfaces = Vec::new();
        while !input.is_empty() {
            interfaces.push(input.parse()?);
        }
        Ok(Interfaces(interfaces))
    }
}

/// Reads the function pointer at `slot`, then calls it with the receiver prepended.
fn generate_call(slot: usize, args: &[(Ident, Type)], ret: &TokenStream2) -> TokenStream2 {
    let arg_names: Vec<_> = args.iter().map(|(name, _)| name).collect();
    let arg_types: Vec<_> = args.iter().map(|(_, ty)| ty).collect();

    quote! {
        unsafe {
            let entry = *self.vtbl.add(#slot);
            let func = ::std::mem::transmute::<
                *const ::std::ffi::c_void,
                unsafe extern "system" fn(*mut Self #(, #arg_types)*) -> #ret,
            >(entry);
            func(self as *const Self as *mut Self #(, #arg_names)*)
        }
    }
}

fn generate_method(method: &Method) -> TokenStream2 {
    let attrs = &method.attrs;
    let name = &method.name;
    let ret = match &method.ret {
        Some(ty) => quote! { #ty },
        None => quote! { () },
    };
    let args_def: Vec<_> = method
        .args
        .iter()
        .map(|(name, ty)| quote! { #name: #ty })
        .collect();
    let call = generate_call(method.slot, &method.args, &ret);

    quote! {
        #(#attrs)*
        #[inline]
        pub unsafe fn #name(&self #(, #args_def)*) -> #ret {
            #call
        }
    }
}

fn generate_interface(interface: &Interface) -> TokenStream2 {
    let attrs = &interface.attrs;
    let name = &interface.name;
    let iid = &interface.iid;
    let name_str = name.to_string();

    let unknown_methods = [
        Method {
            attrs: Vec::new(),
            slot: 0,
            slot_span: proc_macro2::Span::call_site(),
            name: Ident::new("QueryInterface", proc_macro2::Span::call_site()),
            args: vec![
                (
                    Ident::new("riid", proc_macro2::Span::call_site()),
                    syn::parse_quote!(*const crate::GUID),
                ),
                (
                    Ident::new("ppvObject", proc_macro2::Span::call_site()),
                    syn::parse_quote!(*mut *mut ::std::ffi::c_void),
                ),
            ],
            ret: Some(syn::parse_quote!(crate::HRESULT)),
        },
        Method {
            attrs: Vec::new(),
            slot: 1,
            slot_span: proc_macro2::Span::call_site(),
            name: Ident::new("AddRef", proc_macro2::Span::call_site()),
            args: Vec::new(),
            ret: Some(syn::parse_quote!(u32)),
        },
        Method {
            attrs: Vec::new(),
            slot: 2,
            slot_span: proc_macro2::Span::call_site(),
            name: Ident::new("Release", proc_macro2::Span::call_site()),
            args: Vec::new(),
            ret: Some(syn::parse_quote!(u32)),
        },
    ];

    let all: Vec<&Method> = unknown_methods.iter().chain(&interface.methods).collect();
    let methods: Vec<_> = all.iter().map(|m| generate_method(m)).collect();
    let slot_entries: Vec<_> = all
        .iter()
        .map(|m| {
            let method_name = m.name.to_string();
            let slot = m.slot;
            quote! { (#method_name, #slot) }
        })
        .collect();
    let slot_count = all.len();

    quote! {
        #(#attrs)*
        #[repr(C)]
        pub struct #name {
            /// Function table of the object.
            pub vtbl: *const *const ::std::ffi::c_void,
        }

        #[allow(non_snake_case)]
        impl #name {
            /// Number of entries in the function table.
            pub const SLOT_COUNT: usize = #slot_count;

            /// Operation names paired with their function table index.
            pub const SLOTS: &'static [(&'static str, usize)] = &[#(#slot_entries),*];

            #(#methods)*
        }

        unsafe impl crate::Interface for #name {
            const IID: crate::GUID = #iid;
            const NAME: &'static str = #name_str;
        }

        impl ::std::fmt::Debug for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({:p})", #name_str, self as *const Self)
            }
        }
    }
}

/// Declares COM interfaces as opaque handles with slot-indexed call shims.
///
/// ```ignore
/// com_interface! {
///     interface IDxcBlob {
///         iid: IID_IDxcBlob,
///         [3] fn GetBufferPointer() -> LPVOID;
///         [4] fn GetBufferSize() -> SIZE_T;
///     }
/// }
/// ```
///
/// Slots 0 to 2 (`QueryInterface`, `AddRef`, `Release`) are generated for every
/// interface. Declared methods must be numbered contiguously from slot 3.
#[proc_macro]
pub fn com_interface(input: TokenStream) -> TokenStream {
    let Interfaces(interfaces) = parse_macro_input!(input as Interfaces);
    let expanded: Vec<_> = interfaces.iter().map(generate_interface).collect();
    TokenStream::from(quote! { #(#expanded)* })
}
