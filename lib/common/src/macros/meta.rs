/// Stamp out an [item](https://doc.rust-lang.org/nightly/reference/items.html) `$imp` once per
/// scalar type `$Real`, visible within `$imp` under the alias `$RealAlias`.
///
/// Used for impls that can't be written generically, e.g. operator impls on a foreign
/// right-hand side. Please use traits instead of this, where reasonable.
#[macro_export]
macro_rules! item_with {
    {$RealAlias:ident: $($Real:ty),+ => $imp:item} => {
        $(
            const _: () = { // anonymous module
                type $RealAlias = $Real;
                $imp
            };
        )+
    };
}
