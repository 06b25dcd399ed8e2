use quote::quote;
use syn::{Data, Field, Fields, GenericArgument, Ident, PathArguments, Type, punctuated::Punctuated};

const OMIT: &str = "omit";
const OMIT_SORT: &str = "sort";
const ATTRIBUTES_SUFFIX: &str = "Attributes";

fn is_omitted(f: &Field, omit: &str) -> syn::Result<bool> {
    for attr in &f.attrs {
        if attr.path().is_ident(OMIT) {
            let params =
                attr.parse_args_with(Punctuated::<Ident, syn::Token![,]>::parse_terminated)?;
            if params.into_iter().any(|n| n == omit) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn last_ident(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(p) if p.qself.is_none() => p.path.segments.last(),
        _ => None,
    }
}

/// Kind of stored value, looking through `Option<_>`
fn column_kind(ty: &Type) -> syn::Result<proc_macro2::TokenStream> {
    let mut segment = last_ident(ty);
    if let Some(seg) = segment {
        if seg.ident == "Option" {
            segment = match &seg.arguments {
                PathArguments::AngleBracketed(args) => match args.args.first() {
                    Some(GenericArgument::Type(inner)) => last_ident(inner),
                    _ => None,
                },
                _ => None,
            };
        }
    }
    let kind = segment.map(|s| s.ident.to_string());
    let kind = match kind.as_deref() {
        Some("String") => quote!(Text),
        Some("i64" | "i32" | "i16" | "i8" | "u32" | "u16" | "u8") => quote!(Integer),
        Some("f64" | "f32") => quote!(Real),
        Some("bool") => quote!(Boolean),
        _ => {
            return Err(syn::Error::new_spanned(
                ty,
                "Unsupported column type, should be (optional) String, integer, float or bool",
            ));
        }
    };
    Ok(quote!(crate::ColumnKind::#kind))
}

/// `start_date` -> `startDate`, same as serde's `rename_all = "camelCase"`
fn camel_case(name: &str) -> String {
    let mut camel = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            camel.extend(c.to_uppercase());
            upper_next = false;
        } else {
            camel.push(c);
        }
    }
    camel
}

pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = input.ident.clone();
    let name = struct_name.to_string();
    let entity_name = match name.strip_suffix(ATTRIBUTES_SUFFIX) {
        Some(entity_name) if !entity_name.is_empty() => entity_name.to_string(),
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                format!(
                    "Unexpected name {}, should end with {}",
                    name, ATTRIBUTES_SUFFIX
                ),
            ));
        }
    };
    let table_name = entity_name.to_lowercase();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Unexpected struct, should have named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Unexpected data type, should be struct",
            ));
        }
    };

    let mut idents = Vec::with_capacity(fields.len());
    let mut column_names = Vec::with_capacity(fields.len());
    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        // named fields always have ident
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let column_name = ident.to_string();
        let column_name = column_name
            .strip_prefix("r#")
            .unwrap_or(&column_name)
            .to_string();
        let attribute = camel_case(&column_name);
        let sortable = !is_omitted(field, OMIT_SORT)?;
        let kind = column_kind(&field.ty)?;

        columns.push(quote! {
            crate::Column {
                name: #column_name,
                attribute: #attribute,
                kind: #kind,
                sortable: #sortable,
            }
        });
        idents.push(ident);
        column_names.push(column_name);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics crate::Entity for #struct_name #ty_generics #where_clause {
            const NAME: &'static str = #entity_name;
            const TABLE: &'static str = #table_name;
            const KIND: &'static str = #table_name;
            const COLUMNS: &'static [crate::Column] = &[#(#columns),*];

            fn bind_columns<'q>(&self, query: crate::ChosenQuery<'q>) -> crate::ChosenQuery<'q> {
                query #(.bind(::std::clone::Clone::clone(&self.#idents)))*
            }

            fn from_row(row: &crate::ChosenRow) -> ::std::result::Result<Self, sqlx::Error> {
                use sqlx::Row as _;
                ::std::result::Result::Ok(Self {
                    #(#idents: row.try_get(#column_names)?,)*
                })
            }
        }
    })
}
