mod from_repr;

use proc_macro::TokenStream;

/// Derives `fn from_repr(discriminant: <repr>) -> Option<Self>` for a
/// fieldless enum whose variants all carry an explicit discriminant.
///
/// Used throughout `csdemo` for the small closed enumerations the wire
/// format is built from: frame commands, property kinds, float encodings,
/// game-event value kinds.
#[proc_macro_derive(FromRepr)]
pub fn derive_from_repr(input: TokenStream) -> TokenStream {
	from_repr::derive(input).into()
}
