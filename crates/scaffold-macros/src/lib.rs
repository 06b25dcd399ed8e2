mod entity;

#[proc_macro_derive(Entity, attributes(omit))]
pub fn entity(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    entity::derive(input)
}
