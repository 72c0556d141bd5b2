/// Repeat `$imp` once for each listed type, with that type aliased as `$Alias` inside the item.
///
/// Lets a trait be implemented identically for `f32` and `f64` without copy/paste. Prefer
/// generic impls where the trait allows it.
#[macro_export]
macro_rules! item_with {
    {$Alias:ident: $($Ty:ty),+ => $imp:item} => {
        $(
            const _: () = {
                type $Alias = $Ty;
                $imp
            };
        )+
    };
}
